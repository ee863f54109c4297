//! `LIST` / `PAGE` - the page-table directory and per-background-page card
//! walk. Card block stride is only known once `LIST`'s header has been
//! read; callers must decode `LIST` before any `PAGE`.

use crate::buffer::ByteBuffer;
use crate::error::{BlockRef, Error, Result};

pub const LIST: [u8; 4] = *b"LIST";
pub const PAGE: [u8; 4] = *b"PAGE";

#[derive(Debug, Clone)]
pub struct ListHeader {
    pub card_block_stride: i16,
    pub page_table_ids: Vec<i32>,
}

/// Reads the `LIST` header: `i32 num_page_tables`, 8 skipped bytes,
/// `i16 card_block_stride`, 18 skipped bytes, then one `(2 skip, i32 id, 4
/// skip)` record per page table. A truncated trailing record is a warning,
/// not a fatal error; the list is returned with what could be read.
pub fn decode_list(block: BlockRef, data: &ByteBuffer) -> Result<(ListHeader, Vec<String>)> {
    let mut warnings = Vec::new();
    let num_page_tables = data.be_i32(4)?;
    let card_block_stride = data.be_i16(4 + 4 + 8)?;

    let mut offs = 4 + 4 + 8 + 18;
    let mut page_table_ids = Vec::with_capacity(num_page_tables.max(0) as usize);
    for _ in 0..num_page_tables.max(0) {
        offs += 2;
        if !data.has_data(offs, 4) {
            warnings.push(format!(
                "{block}: premature end of LIST while reading page table ids at offset {offs}"
            ));
            break;
        }
        let id = data.be_i32(offs)?;
        page_table_ids.push(id);
        offs += 4;
    }

    Ok((ListHeader { card_block_stride, page_table_ids }, warnings))
}

/// One record from a `PAGE` block: a card id and its flags byte.
#[derive(Debug, Clone, Copy)]
pub struct PageEntry {
    pub card_id: i32,
    pub card_flags: u8,
}

/// Walks a `PAGE` block's card records, each `card_block_stride` bytes
/// apart, terminating at a zero card id (or a short read, which is warned
/// and treated as the end of the list per spec.md §4.8/§7).
pub fn decode_page(block: BlockRef, data: &ByteBuffer, card_block_stride: i16) -> Result<(Vec<PageEntry>, Vec<String>)> {
    if card_block_stride <= 0 {
        return Err(Error::BadSentinel { block, offset: 0 });
    }
    let stride = card_block_stride as usize;
    let mut warnings = Vec::new();
    let mut entries = Vec::new();
    let mut offs = 12usize;
    loop {
        if !data.has_data(offs, 5) {
            warnings.push(format!(
                "{block}: premature end of PAGE at offset {offs} ({} bytes)",
                data.size()
            ));
            break;
        }
        let card_id = data.be_i32(offs)?;
        if card_id == 0 {
            break;
        }
        let card_flags = data.byte_at(offs + 4)?;
        entries.push(PageEntry { card_id, card_flags });
        offs += stride;
    }
    Ok((entries, warnings))
}
