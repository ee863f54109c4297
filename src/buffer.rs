//! A shared, copy-on-write byte region with big-endian accessors.
//!
//! Modeled on the original `CBuf`/`shared_buffer` pair: a buffer may be
//! held by any number of views, and a mutating access detaches a private
//! copy rather than mutating shared storage out from under another holder.

use std::rc::Rc;
use std::{error, fmt, fs, io};

#[derive(Debug, Clone)]
pub enum Error {
    OutOfBounds { offset: usize, amount: usize, size: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds { offset, amount, size } => write!(
                f,
                "out of bounds: offset {offset} + amount {amount} > size {size}"
            ),
        }
    }
}

impl error::Error for Error {}

/// A reference-counted, copy-on-write byte buffer.
///
/// Cloning is cheap (bumps the `Rc`); the first call to a mutating method
/// on a clone detaches it into a private `Vec` via `Rc::make_mut`.
#[derive(Clone)]
pub struct ByteBuffer {
    data: Rc<Vec<u8>>,
}

impl ByteBuffer {
    /// A zero-initialized buffer of `size` bytes.
    pub fn new(size: usize) -> Self {
        Self { data: Rc::new(vec![0u8; size]) }
    }

    pub fn from_vec(data: Vec<u8>) -> Self {
        Self { data: Rc::new(data) }
    }

    /// A sub-view of `self`, copied into its own storage (this type has no
    /// zero-copy slicing; callers that need a view without copying should
    /// use `as_slice` directly).
    pub fn sub(&self, start_offs: usize, amount: usize) -> Result<Self, Error> {
        let bytes = self.slice(start_offs, amount)?;
        Ok(Self::from_vec(bytes.to_vec()))
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn resize(&mut self, size: usize) {
        let buf = Rc::make_mut(&mut self.data);
        buf.resize(size, 0);
    }

    pub fn has_data(&self, offs: usize, amount: usize) -> bool {
        offs.checked_add(amount).is_some_and(|end| end <= self.data.len())
    }

    fn check(&self, offs: usize, amount: usize) -> Result<(), Error> {
        if self.has_data(offs, amount) {
            Ok(())
        } else {
            Err(Error::OutOfBounds { offset: offs, amount, size: self.data.len() })
        }
    }

    pub fn slice(&self, offs: usize, amount: usize) -> Result<&[u8], Error> {
        self.check(offs, amount)?;
        Ok(&self.data[offs..offs + amount])
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn byte_at(&self, offs: usize) -> Result<u8, Error> {
        self.check(offs, 1)?;
        Ok(self.data[offs])
    }

    pub fn set_byte_at(&mut self, offs: usize, value: u8) -> Result<(), Error> {
        self.check(offs, 1)?;
        Rc::make_mut(&mut self.data)[offs] = value;
        Ok(())
    }

    pub fn be_u16(&self, offs: usize) -> Result<u16, Error> {
        let b = self.slice(offs, 2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub fn be_i16(&self, offs: usize) -> Result<i16, Error> {
        self.be_u16(offs).map(|v| v as i16)
    }

    pub fn be_u32(&self, offs: usize) -> Result<u32, Error> {
        let b = self.slice(offs, 4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn be_i32(&self, offs: usize) -> Result<i32, Error> {
        self.be_u32(offs).map(|v| v as i32)
    }

    /// Reads bytes up to (but excluding) the next NUL, or the end of the
    /// buffer, whichever comes first. Returns the bytes and the offset
    /// just past the terminating NUL (or past the last byte, if unterminated).
    pub fn c_string_at(&self, offs: usize) -> (&[u8], usize) {
        let rest = &self.data[offs.min(self.data.len())..];
        match rest.iter().position(|&b| b == 0) {
            Some(nul) => (&rest[..nul], offs + nul + 1),
            None => (rest, offs + rest.len()),
        }
    }

    pub fn memcpy_in(&mut self, to_offs: usize, from: &[u8], from_offs: usize, amount: usize) -> Result<(), Error> {
        self.check(to_offs, amount)?;
        let src = from
            .get(from_offs..from_offs + amount)
            .ok_or(Error::OutOfBounds { offset: from_offs, amount, size: from.len() })?
            .to_vec();
        let buf = Rc::make_mut(&mut self.data);
        buf[to_offs..to_offs + amount].copy_from_slice(&src);
        Ok(())
    }

    pub fn xor_span(&mut self, dst_offs: usize, src: &[u8], src_offs: usize, amount: usize) -> Result<(), Error> {
        self.check(dst_offs, amount)?;
        let src = src
            .get(src_offs..src_offs + amount)
            .ok_or(Error::OutOfBounds { offset: src_offs, amount, size: src.len() })?
            .to_vec();
        let buf = Rc::make_mut(&mut self.data);
        for (d, s) in buf[dst_offs..dst_offs + amount].iter_mut().zip(src) {
            *d ^= s;
        }
        Ok(())
    }

    /// Shifts `amount` bytes starting at `dst_offs`, treated as one big
    /// bitstring (MSB-first), left by `shift_amount` bits.
    pub fn shift_span(&mut self, dst_offs: usize, amount: usize, shift_amount: u32) -> Result<(), Error> {
        self.check(dst_offs, amount)?;
        let buf = Rc::make_mut(&mut self.data);
        let span = &mut buf[dst_offs..dst_offs + amount];
        let byte_shift = (shift_amount / 8) as usize;
        let bit_shift = shift_amount % 8;
        let mut shifted = vec![0u8; span.len()];
        for (i, dst) in shifted.iter_mut().enumerate() {
            let src_i = i + byte_shift;
            let hi = span.get(src_i).copied().unwrap_or(0);
            let lo = span.get(src_i + 1).copied().unwrap_or(0);
            *dst = if bit_shift == 0 {
                hi
            } else {
                (hi << bit_shift) | (lo >> (8 - bit_shift))
            };
        }
        span.copy_from_slice(&shifted);
        Ok(())
    }

    pub fn to_file(&self, path: &std::path::Path) -> io::Result<()> {
        fs::write(path, self.as_slice())
    }
}

impl fmt::Debug for ByteBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteBuffer")
            .field("size", &self.data.len())
            .field("strong_count", &Rc::strong_count(&self.data))
            .finish()
    }
}
