//! Binary portable bitmap (netpbm P4) writer. The one piece of the
//! "pattern/bitmap rasterization" external collaborator (spec.md §2 item 8)
//! that this crate implements directly: spec.md §6 requires the literal
//! output files `PAT_<n>.pbm` and `BMAP_<id>.pbm` to exist, and the P4
//! format is simple enough to not warrant a true external dependency.

use std::io::{self, Write};

/// A decoded monochrome bitmap: `width` x `height`, one bit per pixel,
/// MSB-first, each row padded to a whole byte, matching the netpbm P4 row layout.
#[derive(Debug, Clone)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub row_bytes: Vec<u8>,
}

impl Bitmap {
    pub fn row_stride(&self) -> usize {
        (self.width as usize).div_ceil(8)
    }
}

/// Writes `bitmap` as a binary (P4) portable bitmap.
pub fn write_pbm(out: &mut impl Write, bitmap: &Bitmap) -> io::Result<()> {
    write!(out, "P4\n{} {}\n", bitmap.width, bitmap.height)?;
    out.write_all(&bitmap.row_bytes)
}

/// Rasterizes an 8x8 legacy pattern (spec.md §4.4's 40 pattern bitmaps)
/// into a `Bitmap`; the pattern is already a tightly packed 8-row,
/// 1-byte-per-row monochrome bitmap, so no repacking is needed.
pub fn pattern_bitmap(pattern: &[u8; 8]) -> Bitmap {
    Bitmap { width: 8, height: 8, row_bytes: pattern.to_vec() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_p4_header_and_raw_rows() {
        let bmp = pattern_bitmap(&[0xff, 0, 0, 0, 0, 0, 0, 0x01]);
        let mut out = Vec::new();
        write_pbm(&mut out, &bmp).unwrap();
        assert!(out.starts_with(b"P4\n8 8\n"));
        assert_eq!(&out[out.len() - 8..], &[0xff, 0, 0, 0, 0, 0, 0, 0x01]);
    }

    #[test]
    fn row_stride_rounds_up_to_byte() {
        let bmp = Bitmap { width: 17, height: 1, row_bytes: vec![0; 3] };
        assert_eq!(bmp.row_stride(), 3);
    }
}
