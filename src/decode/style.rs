//! `STBL` - style table and emitted stylesheet.

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::buffer::ByteBuffer;
use crate::decode::font::FontTable;
use crate::error::Result;
use crate::schema::flags::StyleFlags;

pub const STBL: [u8; 4] = *b"STBL";

const RECORD_SIZE: usize = 24;
const FIRST_RECORD_OFFSET: usize = 14;

#[derive(Debug, Clone)]
pub struct StyleEntry {
    pub id: i16,
    pub font_id: i16,
    pub font_name: Option<String>,
    pub flags: Option<StyleFlags>,
    pub size: Option<i16>,
}

impl StyleEntry {
    pub fn bold(&self) -> bool {
        self.flags.is_some_and(|f| f.contains(StyleFlags::BOLD))
    }
    pub fn italic(&self) -> bool {
        self.flags.is_some_and(|f| f.contains(StyleFlags::ITALIC))
    }
    pub fn underline(&self) -> bool {
        self.flags.is_some_and(|f| f.contains(StyleFlags::UNDERLINE))
    }
    pub fn outline(&self) -> bool {
        self.flags.is_some_and(|f| f.contains(StyleFlags::OUTLINE))
    }
    pub fn shadow(&self) -> bool {
        self.flags.is_some_and(|f| f.contains(StyleFlags::SHADOW))
    }
    pub fn condense(&self) -> bool {
        self.flags.is_some_and(|f| f.contains(StyleFlags::CONDENSE))
    }
    pub fn extend(&self) -> bool {
        self.flags.is_some_and(|f| f.contains(StyleFlags::EXTEND))
    }
    pub fn group(&self) -> bool {
        self.flags.is_some_and(|f| f.contains(StyleFlags::GROUP))
    }
}

#[derive(Debug, Clone, Default)]
pub struct StyleTable {
    pub next_style_id: i16,
    pub styles: HashMap<i16, StyleEntry>,
}

impl StyleTable {
    pub fn get(&self, id: i16) -> Option<&StyleEntry> {
        self.styles.get(&id)
    }
}

pub fn decode(data: &ByteBuffer, fonts: &FontTable) -> Result<StyleTable> {
    let style_count = data.be_i32(4)?;
    let next_style_id = data.be_i16(10)?;

    let mut styles = HashMap::new();
    let mut offs = FIRST_RECORD_OFFSET;
    for _ in 0..style_count.max(0) {
        let id = data.be_i16(offs)?;
        let font_id = data.be_i16(offs + 10)?;
        let font_name = (font_id != -1).then(|| fonts.name(font_id).to_string());
        let raw_flags = data.be_i16(offs + 12)?;
        let flags = match raw_flags {
            0 => None,          // plain
            -1 => None,         // inherit from field
            other => Some(StyleFlags::from_bits_retain(other as u16)),
        };
        let font_size = data.be_i16(offs + 14)?;
        let size = (font_size != -1).then_some(font_size);

        styles.insert(id, StyleEntry { id, font_id, font_name, flags, size });
        offs += RECORD_SIZE;
    }

    Ok(StyleTable { next_style_id, styles })
}

/// Renders the `.styleN` CSS rule set for one entry.
pub fn css_rule(style: &StyleEntry) -> String {
    let mut out = String::new();
    let _ = writeln!(out, ".style{} {{", style.id);
    if let Some(name) = &style.font_name {
        let _ = writeln!(out, "  font-family: \"{name}\";");
    }
    if style.flags.is_none() {
        let _ = writeln!(out, "  font-style: normal;");
    } else {
        if style.group() {
            out.push_str("  /* group text style */\n");
        }
        if style.extend() {
            out.push_str("  letter-spacing: 0.1em;\n");
        }
        if style.condense() {
            out.push_str("  letter-spacing: -0.1em;\n");
        }
        if style.shadow() {
            out.push_str("  text-shadow: 1px 1px #000000;\n");
        }
        if style.outline() {
            out.push_str(
                "  color: white; -webkit-text-stroke-width: 1pt; -webkit-text-stroke-color: #000;\n",
            );
        }
        if style.underline() {
            out.push_str("  text-decoration: underline;\n");
        }
        if style.italic() {
            out.push_str("  font-style: italic;\n");
        }
        if style.bold() {
            out.push_str("  font-weight: bold;\n");
        }
    }
    if let Some(size) = style.size {
        let _ = writeln!(out, "  font-size: {size}pt;");
    }
    out.push_str("}\n");
    out
}

pub fn stylesheet(table: &StyleTable) -> String {
    let mut ids: Vec<_> = table.styles.keys().copied().collect();
    ids.sort_unstable();
    let mut out = String::new();
    for id in ids {
        out.push_str(&css_rule(&table.styles[&id]));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style_table_bytes(entries: &[(i16, i16, i16, i16)]) -> Vec<u8> {
        let mut bytes = vec![0u8; FIRST_RECORD_OFFSET];
        bytes[4..8].copy_from_slice(&(entries.len() as i32).to_be_bytes());
        for (id, font_id, flags, size) in entries {
            let mut rec = vec![0u8; RECORD_SIZE];
            rec[0..2].copy_from_slice(&id.to_be_bytes());
            rec[10..12].copy_from_slice(&font_id.to_be_bytes());
            rec[12..14].copy_from_slice(&flags.to_be_bytes());
            rec[14..16].copy_from_slice(&size.to_be_bytes());
            bytes.extend_from_slice(&rec);
        }
        bytes
    }

    #[test]
    fn emits_bold_italic_rule_with_font_and_size() {
        // bits 9 (italic) and 8 (bold) of the style flags word.
        let bytes = style_table_bytes(&[(7, 3, 0x0300, 12)]);
        let mut fonts = FontTable::default();
        fonts.names.insert(3, "Geneva".to_string());
        let table = decode(&ByteBuffer::from_vec(bytes), &fonts).unwrap();
        let css = stylesheet(&table);
        assert!(css.contains(".style7"));
        assert!(css.contains("font-family: \"Geneva\";"));
        assert!(css.contains("font-style: italic;"));
        assert!(css.contains("font-weight: bold;"));
        assert!(css.contains("font-size: 12pt;"));
    }

    #[test]
    fn zero_flags_is_plain() {
        let bytes = style_table_bytes(&[(1, -1, 0, -1)]);
        let table = decode(&ByteBuffer::from_vec(bytes), &FontTable::default()).unwrap();
        let style = table.get(1).unwrap();
        assert!(!style.bold());
        assert!(style.font_name.is_none());
        assert!(style.size.is_none());
    }
}
