//! `STAK` - stack metadata, pattern table, and the top-level script.

use crate::buffer::ByteBuffer;
use crate::error::Result;
use crate::schema::enums::VersionStage;
use crate::schema::flags::StackFlags;
use crate::transcode;

pub const STAK: [u8; 4] = *b"STAK";
pub const STACK_ID: i32 = -1;

/// A 4-byte binary-coded-decimal version record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumVersion(pub [u8; 4]);

impl NumVersion {
    pub fn from_be_bytes(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    /// Formats as `M.m`, `M.mxN`, `M.m.p`, or `M.m.pxN`, matching the
    /// legacy importer's four-shape `NumVersionToStr`.
    pub fn format(self) -> String {
        let [major, minor_patch, stage, counter] = self.0;
        let major_digit = hex_digit(major);
        let minor = hex_digit(minor_patch >> 4);
        let patch = minor_patch & 0x0f;
        let stage_letter = VersionStage::letter_for_byte(stage);

        if counter == 0 && patch == 0 {
            format!("{major_digit}.{minor}")
        } else if patch == 0 {
            format!("{major_digit}.{minor}{stage_letter}{counter}")
        } else if counter == 0 {
            format!("{major_digit}.{minor}.{}", hex_digit(patch))
        } else {
            format!("{major_digit}.{minor}.{}{stage_letter}{counter}", hex_digit(patch))
        }
    }
}

/// Renders a byte as a lowercase hex digit string the way `%x` would for a
/// single BCD nibble-pair value (e.g. 0x21 -> "21", not decimal 33).
fn hex_digit(byte: u8) -> String {
    format!("{byte:x}")
}

#[derive(Debug, Clone)]
pub struct Stack {
    pub card_count: i32,
    pub first_card_id: i32,
    pub list_block_id: i32,
    pub user_level: i16,
    pub flags: StackFlags,
    pub created_by_version: NumVersion,
    pub last_compacted_version: NumVersion,
    pub last_edited_version: NumVersion,
    pub first_edited_version: NumVersion,
    pub font_table_id: i32,
    pub style_table_id: i32,
    pub card_width: i16,
    pub card_height: i16,
    pub patterns: Vec<[u8; 8]>,
    pub script: String,
}

fn version_at(data: &ByteBuffer, offs: usize) -> Result<NumVersion> {
    let v = data.be_u32(offs)?;
    Ok(NumVersion::from_be_bytes(v.to_be_bytes()))
}

pub fn decode(data: &ByteBuffer) -> Result<Stack> {
    let card_count = data.be_i32(32)?;
    let first_card_id = data.be_i32(36)?;
    let list_block_id = data.be_i32(40)?;
    let user_level = data.be_i16(60)?;
    let flags = StackFlags::from_bits_retain(data.be_u16(64)? as u16);

    let created_by_version = version_at(data, 84)?;
    let last_compacted_version = version_at(data, 88)?;
    let last_edited_version = version_at(data, 92)?;
    let first_edited_version = version_at(data, 96)?;

    let font_table_id = data.be_i32(420)?;
    let style_table_id = data.be_i32(424)?;

    let mut card_height = data.be_i16(428)?;
    if card_height == 0 {
        card_height = 342;
    }
    let mut card_width = data.be_i16(430)?;
    if card_width == 0 {
        card_width = 512;
    }

    let mut patterns = Vec::with_capacity(40);
    let mut offs = 692;
    for _ in 0..40 {
        let bytes = data.slice(offs, 8)?;
        let mut pat = [0u8; 8];
        pat.copy_from_slice(bytes);
        patterns.push(pat);
        offs += 8;
    }

    let (script_bytes, _) = data.c_string_at(1524);
    let script = transcode::decode(script_bytes);

    Ok(Stack {
        card_count,
        first_card_id,
        list_block_id,
        user_level,
        flags,
        created_by_version,
        last_compacted_version,
        last_edited_version,
        first_edited_version,
        font_table_id,
        style_table_id,
        card_width,
        card_height,
        patterns,
        script,
    })
}
