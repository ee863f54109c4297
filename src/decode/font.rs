//! `FTBL` - font id to name table.

use std::collections::HashMap;

use crate::buffer::ByteBuffer;
use crate::error::Result;
use crate::transcode;

pub const FTBL: [u8; 4] = *b"FTBL";

#[derive(Debug, Clone, Default)]
pub struct FontTable {
    pub names: HashMap<i16, String>,
}

impl FontTable {
    /// Missing ids resolve to the empty string, never an error.
    pub fn name(&self, id: i16) -> &str {
        self.names.get(&id).map(String::as_str).unwrap_or("")
    }
}

pub fn decode(data: &ByteBuffer) -> Result<FontTable> {
    let count = data.be_i16(6)?;
    let mut names = HashMap::new();
    let mut offs = 12usize; // 6 (count) + 2 (padding to id) + 4 reserved

    for _ in 0..count.max(0) {
        let id = data.be_i16(offs)?;
        offs += 2;
        let (name_bytes, next) = data.c_string_at(offs);
        let name = transcode::decode(name_bytes);
        offs = next;
        if offs % 2 != 0 {
            offs += 1; // align to an even byte after each record
        }
        names.insert(id, name);
    }

    Ok(FontTable { names })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn font_table_bytes(entries: &[(i16, &str)]) -> Vec<u8> {
        let mut bytes = vec![0u8; 12];
        bytes[6..8].copy_from_slice(&(entries.len() as i16).to_be_bytes());
        for (id, name) in entries {
            bytes.extend_from_slice(&id.to_be_bytes());
            bytes.extend_from_slice(name.as_bytes());
            bytes.push(0);
            if bytes.len() % 2 != 0 {
                bytes.push(0);
            }
        }
        bytes
    }

    #[test]
    fn decodes_multiple_entries_and_aligns() {
        let bytes = font_table_bytes(&[(3, "Geneva"), (4, "Chicago")]);
        let table = decode(&ByteBuffer::from_vec(bytes)).unwrap();
        assert_eq!(table.name(3), "Geneva");
        assert_eq!(table.name(4), "Chicago");
    }

    #[test]
    fn missing_id_resolves_to_empty_string() {
        let table = FontTable::default();
        assert_eq!(table.name(99), "");
    }
}
