//! Bounds-checked read and write cursors
//!
//! All record walking goes through these two cursors. They track a byte
//! position, refuse to move past the end of the buffer, and centralize the
//! section-padding discipline: `pad_to` advances to the next aligned offset,
//! zero-filling on the write side and skipping on the read side.
//!
//! Alignment is measured from the cursor's origin. Record walkers always
//! place the origin at a protocol-aligned boundary (the start of a record or
//! of a reply body), so cursor-relative and wire-absolute alignment agree.
//!
//! Scalars are read and written in native byte order. The X11 connection
//! setup declares the client's byte order and the server replies in kind,
//! so this layer never swaps.

use crate::align::pad_for;
use crate::error::{Error, Result};

use alloc::vec;
use alloc::vec::Vec;

/// Read cursor over a borrowed buffer with position tracking
#[derive(Debug, Clone)]
pub struct ReadCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ReadCursor<'a> {
    /// Create a cursor at the start of `buf`
    #[inline]
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current offset from the cursor origin
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left between the position and the end of the buffer
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Check if the cursor has consumed the whole buffer
    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.buf.len()
    }

    /// Skip `n` bytes without interpreting them
    #[inline]
    pub fn skip(&mut self, n: usize) -> Result<()> {
        let end = self.pos.checked_add(n).ok_or(Error::TruncatedBuffer)?;
        if end > self.buf.len() {
            return Err(Error::TruncatedBuffer);
        }
        self.pos = end;
        Ok(())
    }

    /// Skip the pad bytes needed to reach the next multiple of `align`
    ///
    /// Pad contents are not interpreted; writers emit zeroes.
    #[inline]
    pub fn pad_to(&mut self, align: usize) -> Result<()> {
        self.skip(pad_for(self.pos, align))
    }

    /// Borrow `len` raw bytes and advance past them
    #[inline]
    pub fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(len).ok_or(Error::TruncatedBuffer)?;
        if end > self.buf.len() {
            return Err(Error::TruncatedBuffer);
        }
        let bytes = &self.buf[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    /// Read a u8 value
    #[inline]
    pub fn get_u8(&mut self) -> Result<u8> {
        if self.pos >= self.buf.len() {
            return Err(Error::TruncatedBuffer);
        }
        let value = self.buf[self.pos];
        self.pos += 1;
        Ok(value)
    }

    /// Read an i8 value
    #[inline]
    pub fn get_i8(&mut self) -> Result<i8> {
        Ok(self.get_u8()? as i8)
    }

    /// Read a u16 value (native byte order)
    #[inline]
    pub fn get_u16(&mut self) -> Result<u16> {
        if self.pos + 2 > self.buf.len() {
            return Err(Error::TruncatedBuffer);
        }
        let bytes = [self.buf[self.pos], self.buf[self.pos + 1]];
        self.pos += 2;
        Ok(u16::from_ne_bytes(bytes))
    }

    /// Read an i16 value (native byte order)
    #[inline]
    pub fn get_i16(&mut self) -> Result<i16> {
        Ok(self.get_u16()? as i16)
    }

    /// Read a u32 value (native byte order)
    #[inline]
    pub fn get_u32(&mut self) -> Result<u32> {
        if self.pos + 4 > self.buf.len() {
            return Err(Error::TruncatedBuffer);
        }
        let bytes = [
            self.buf[self.pos],
            self.buf[self.pos + 1],
            self.buf[self.pos + 2],
            self.buf[self.pos + 3],
        ];
        self.pos += 4;
        Ok(u32::from_ne_bytes(bytes))
    }

    /// Bytes between an earlier position and the current one
    ///
    /// `start` must be a position previously returned by `position()`.
    #[inline]
    pub fn span(&self, start: usize) -> &'a [u8] {
        debug_assert!(start <= self.pos);
        &self.buf[start..self.pos]
    }

    /// Peek at the next byte without advancing
    #[inline]
    pub fn peek_u8(&self) -> Result<u8> {
        if self.pos >= self.buf.len() {
            return Err(Error::TruncatedBuffer);
        }
        Ok(self.buf[self.pos])
    }

    /// Byte at `offset` from the current position, without advancing
    #[inline]
    pub fn peek_u8_at(&self, offset: usize) -> Result<u8> {
        let at = self.pos.checked_add(offset).ok_or(Error::TruncatedBuffer)?;
        if at >= self.buf.len() {
            return Err(Error::TruncatedBuffer);
        }
        Ok(self.buf[at])
    }
}

/// Write cursor over a borrowed mutable buffer
#[derive(Debug)]
pub struct WriteCursor<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> WriteCursor<'a> {
    /// Create a cursor at the start of `buf`
    #[inline]
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current offset from the cursor origin
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Remaining capacity
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Zero-fill up to the next multiple of `align`
    #[inline]
    pub fn pad_to(&mut self, align: usize) -> Result<()> {
        let pad = pad_for(self.pos, align);
        let end = self.pos.checked_add(pad).ok_or(Error::ShortBuffer)?;
        if end > self.buf.len() {
            return Err(Error::ShortBuffer);
        }
        for b in &mut self.buf[self.pos..end] {
            *b = 0;
        }
        self.pos = end;
        Ok(())
    }

    /// Write `n` zero bytes
    #[inline]
    pub fn put_zeros(&mut self, n: usize) -> Result<()> {
        let end = self.pos.checked_add(n).ok_or(Error::ShortBuffer)?;
        if end > self.buf.len() {
            return Err(Error::ShortBuffer);
        }
        for b in &mut self.buf[self.pos..end] {
            *b = 0;
        }
        self.pos = end;
        Ok(())
    }

    /// Write a u8 value
    #[inline]
    pub fn put_u8(&mut self, value: u8) -> Result<()> {
        if self.pos >= self.buf.len() {
            return Err(Error::ShortBuffer);
        }
        self.buf[self.pos] = value;
        self.pos += 1;
        Ok(())
    }

    /// Write an i8 value
    #[inline]
    pub fn put_i8(&mut self, value: i8) -> Result<()> {
        self.put_u8(value as u8)
    }

    /// Write a u16 value (native byte order)
    #[inline]
    pub fn put_u16(&mut self, value: u16) -> Result<()> {
        if self.pos + 2 > self.buf.len() {
            return Err(Error::ShortBuffer);
        }
        self.buf[self.pos..self.pos + 2].copy_from_slice(&value.to_ne_bytes());
        self.pos += 2;
        Ok(())
    }

    /// Write an i16 value (native byte order)
    #[inline]
    pub fn put_i16(&mut self, value: i16) -> Result<()> {
        self.put_u16(value as u16)
    }

    /// Write a u32 value (native byte order)
    #[inline]
    pub fn put_u32(&mut self, value: u32) -> Result<()> {
        if self.pos + 4 > self.buf.len() {
            return Err(Error::ShortBuffer);
        }
        self.buf[self.pos..self.pos + 4].copy_from_slice(&value.to_ne_bytes());
        self.pos += 4;
        Ok(())
    }

    /// Write raw bytes
    #[inline]
    pub fn put_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let end = self.pos.checked_add(bytes.len()).ok_or(Error::ShortBuffer)?;
        if end > self.buf.len() {
            return Err(Error::ShortBuffer);
        }
        self.buf[self.pos..end].copy_from_slice(bytes);
        self.pos = end;
        Ok(())
    }
}

/// Allocate `len` bytes, emit into them, and require the emitter to fill
/// the buffer exactly
pub(crate) fn serialize_exact<F>(len: usize, emit: F) -> Result<Vec<u8>>
where
    F: FnOnce(&mut WriteCursor<'_>) -> Result<()>,
{
    let mut buf = vec![0u8; len];
    let mut cur = WriteCursor::new(&mut buf);
    emit(&mut cur)?;
    debug_assert_eq!(cur.position(), len);
    Ok(buf)
}
