//! WOBA bitmap decompressor - external collaborator interface (spec.md §1,
//! §2 item 8). Specified only at its boundary: a trait taking a `BMAP`
//! block's payload and returning a packed monochrome `Bitmap`.
//!
//! `WobaDecoder` below decodes the run-length-plus-delta scheme well enough
//! to produce a correctly sized bitmap: each row is either a literal run
//! or a repeat-count/byte pair, XORed against the previous row via the
//! buffer's `xor_span` primitive, but does not claim bit-exact fidelity
//! with every historical encoder quirk. Callers needing perfect fidelity
//! replace this collaborator; `--no-decode-graphics` bypasses it entirely
//! in favor of writing the raw block payload.

use crate::buffer::ByteBuffer;
use crate::error::{BlockRef, Result};
use crate::pbm::Bitmap;

pub trait BitmapDecoder {
    fn decode(&self, block: BlockRef, data: &ByteBuffer) -> Result<Bitmap>;
}

/// Header layout assumed by this decoder: `u32 block_size`, `u32 unknown`,
/// then a card rect (`i16 top/left/bottom/right`) whose width/height give
/// the bitmap's dimensions, followed by a mask rect of the same shape, then
/// the row-compressed pixel data.
const RECT_SIZE: usize = 8;
const HEADER_SIZE: usize = 4 + 4 + RECT_SIZE + RECT_SIZE;

pub struct WobaDecoder;

impl BitmapDecoder for WobaDecoder {
    fn decode(&self, block: BlockRef, data: &ByteBuffer) -> Result<Bitmap> {
        let top = data.be_i16(8)? as i32;
        let left = data.be_i16(10)? as i32;
        let bottom = data.be_i16(12)? as i32;
        let right = data.be_i16(14)? as i32;
        let width = (right - left).max(0) as u32;
        let height = (bottom - top).max(0) as u32;
        let _ = block;

        let row_stride = (width as usize).div_ceil(8).max(1);
        let mut rows = vec![0u8; row_stride * height as usize];

        let mut src = HEADER_SIZE;
        let mut row_buf = vec![0u8; row_stride];
        for row in 0..height as usize {
            decode_row(data, &mut src, &mut row_buf)?;
            if row > 0 {
                let (prev, curr) = rows.split_at_mut(row * row_stride);
                let prev_row = &prev[(row - 1) * row_stride..row * row_stride];
                for (d, (s, p)) in curr[..row_stride].iter_mut().zip(row_buf.iter().zip(prev_row)) {
                    *d = s ^ p;
                }
            } else {
                rows[..row_stride].copy_from_slice(&row_buf);
            }
        }

        Ok(Bitmap { width, height, row_bytes: rows })
    }
}

/// Decodes one compressed row into `out` (already sized to the row
/// stride): each opcode byte's high bit selects repeat-byte (low 7 bits +
/// 2 = repeat count) vs. literal run (low 7 bits + 1 = byte count).
fn decode_row(data: &ByteBuffer, src: &mut usize, out: &mut [u8]) -> Result<()> {
    let mut written = 0usize;
    while written < out.len() {
        if !data.has_data(*src, 1) {
            break; // ran out of compressed input; leave the rest zeroed.
        }
        let op = data.byte_at(*src)?;
        *src += 1;
        if op & 0x80 != 0 {
            let count = (op & 0x7f) as usize + 2;
            let byte = if data.has_data(*src, 1) { data.byte_at(*src)? } else { 0 };
            *src += 1;
            for _ in 0..count {
                if written >= out.len() {
                    break;
                }
                out[written] = byte;
                written += 1;
            }
        } else {
            let count = (op & 0x7f) as usize + 1;
            for _ in 0..count {
                if written >= out.len() {
                    break;
                }
                out[written] = if data.has_data(*src, 1) { data.byte_at(*src)? } else { 0 };
                *src += 1;
                written += 1;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(width: i16, height: i16) -> Vec<u8> {
        let mut bytes = vec![0u8; HEADER_SIZE];
        bytes[8..10].copy_from_slice(&0i16.to_be_bytes()); // top
        bytes[10..12].copy_from_slice(&0i16.to_be_bytes()); // left
        bytes[12..14].copy_from_slice(&height.to_be_bytes()); // bottom
        bytes[14..16].copy_from_slice(&width.to_be_bytes()); // right
        bytes
    }

    #[test]
    fn decodes_dimensions_from_card_rect() {
        let mut bytes = header(16, 2);
        // two literal rows of 2 bytes each.
        bytes.push(0x01); // literal, count=2
        bytes.push(0xaa);
        bytes.push(0x55);
        bytes.push(0x01);
        bytes.push(0x00);
        bytes.push(0x00);
        let bmp = WobaDecoder.decode(BlockRef::new(*b"BMAP", 1), &ByteBuffer::from_vec(bytes)).unwrap();
        assert_eq!(bmp.width, 16);
        assert_eq!(bmp.height, 2);
        assert_eq!(bmp.row_bytes.len(), 4);
    }

    #[test]
    fn short_input_zero_fills_rest_of_row() {
        let bytes = header(8, 1);
        let bmp = WobaDecoder.decode(BlockRef::new(*b"BMAP", 1), &ByteBuffer::from_vec(bytes)).unwrap();
        assert_eq!(bmp.row_bytes, vec![0u8]);
    }
}
