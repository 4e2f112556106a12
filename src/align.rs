//! Alignment and padding arithmetic
//!
//! Every variable-length record on the wire is built from sections whose
//! elements carry a natural alignment of 1, 2 or 4 bytes. The pad inserted
//! before a section is a pure function of the offset reached so far and the
//! section's element alignment, computed with the two's-complement identity
//! `(-offset) & (align - 1)`.

use crate::error::{Error, Result};

/// Bytes of padding needed to advance `offset` to a multiple of `align`
///
/// `align` must be a nonzero power of two. Alignments in this crate come
/// from `Wire::ALIGN` constants, which are always 1, 2 or 4.
#[inline]
pub const fn pad_for(offset: usize, align: usize) -> usize {
    debug_assert!(align.is_power_of_two());
    offset.wrapping_neg() & (align - 1)
}

/// Smallest multiple of `align` that is >= `offset`
///
/// Fails with `Overflow` if the rounded value does not fit in `usize`.
#[inline]
pub fn align_up(offset: usize, align: usize) -> Result<usize> {
    offset.checked_add(pad_for(offset, align)).ok_or(Error::Overflow)
}
