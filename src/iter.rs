//! Typed windows and iterators over record runs
//!
//! Fixed-stride runs get `FixedSlice`, a borrowed window with O(1) length
//! and random access. Variable-length runs get `VarSlice`, a window whose
//! extent was established by a validating parse; its iterator re-walks the
//! records lazily, advancing by each record's own parsed size.

use core::fmt;
use core::marker::PhantomData;

use crate::cursor::ReadCursor;
use crate::error::Result;
use crate::wire::{run_len, Wire};

/// A variable-length record view borrowed from a buffer
///
/// `parse` consumes exactly the record's bytes, interior padding included,
/// leaving the cursor at the start of the next record.
pub trait WireView<'a>: Sized {
    /// Decode one record at the cursor position
    fn parse(cur: &mut ReadCursor<'a>) -> Result<Self>;
}

/// Borrowed window over `n` fixed-size records
#[derive(Clone, Copy)]
pub struct FixedSlice<'a, T: Wire> {
    bytes: &'a [u8],
    count: usize,
    _marker: PhantomData<T>,
}

impl<'a, T: Wire> FixedSlice<'a, T> {
    /// Take `count` records at the cursor position, padding to the
    /// element alignment first
    #[inline]
    pub fn parse(cur: &mut ReadCursor<'a>, count: usize) -> Result<Self> {
        cur.pad_to(T::ALIGN)?;
        let bytes = cur.take(run_len::<T>(count)?)?;
        Ok(Self {
            bytes,
            count,
            _marker: PhantomData,
        })
    }

    /// An empty window
    #[inline]
    pub fn empty() -> Self {
        Self {
            bytes: &[],
            count: 0,
            _marker: PhantomData,
        }
    }

    /// Number of records
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Check for zero records
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The raw bytes backing the window
    #[inline]
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Decode the record at `index`
    #[inline]
    pub fn get(&self, index: usize) -> Option<T> {
        if index >= self.count {
            return None;
        }
        let mut cur = ReadCursor::new(&self.bytes[index * T::SIZE..]);
        T::read(&mut cur).ok()
    }

    /// Narrow the window to `count` records starting at `start`
    #[inline]
    pub fn slice(&self, start: usize, count: usize) -> Option<Self> {
        let end = start.checked_add(count)?;
        if end > self.count {
            return None;
        }
        Some(Self {
            bytes: &self.bytes[start * T::SIZE..end * T::SIZE],
            count,
            _marker: PhantomData,
        })
    }

    /// Iterate over the records
    #[inline]
    pub fn iter(&self) -> FixedIter<'a, T> {
        FixedIter {
            bytes: self.bytes,
            rem: self.count,
            _marker: PhantomData,
        }
    }
}

impl<'a, T: Wire + fmt::Debug> fmt::Debug for FixedSlice<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, T: Wire> IntoIterator for FixedSlice<'a, T> {
    type Item = T;
    type IntoIter = FixedIter<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T: Wire> Default for FixedSlice<'a, T> {
    #[inline]
    fn default() -> Self {
        Self::empty()
    }
}

/// Iterator over a `FixedSlice`, advancing one stride per step
#[derive(Clone)]
pub struct FixedIter<'a, T: Wire> {
    bytes: &'a [u8],
    rem: usize,
    _marker: PhantomData<T>,
}

impl<'a, T: Wire> Iterator for FixedIter<'a, T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        if self.rem == 0 {
            return None;
        }
        let mut cur = ReadCursor::new(self.bytes);
        let value = T::read(&mut cur).ok()?;
        self.bytes = &self.bytes[T::SIZE..];
        self.rem -= 1;
        Some(value)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.rem, Some(self.rem))
    }
}

impl<'a, T: Wire> ExactSizeIterator for FixedIter<'a, T> {}

/// Borrowed window over `n` variable-length records
///
/// Built by draining the records once with a validating parse, so the
/// window covers exactly their bytes and later iteration cannot fail.
pub struct VarSlice<'a, T: WireView<'a>> {
    bytes: &'a [u8],
    count: usize,
    _marker: PhantomData<T>,
}

impl<'a, T: WireView<'a>> Clone for VarSlice<'a, T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T: WireView<'a>> Copy for VarSlice<'a, T> {}

impl<'a, T: WireView<'a>> VarSlice<'a, T> {
    /// Parse `count` records at the cursor position and capture their span
    pub fn parse(cur: &mut ReadCursor<'a>, count: usize) -> Result<Self> {
        let start = cur.position();
        for _ in 0..count {
            T::parse(cur)?;
        }
        Ok(Self {
            bytes: cur.span(start),
            count,
            _marker: PhantomData,
        })
    }

    /// An empty window
    #[inline]
    pub fn empty() -> Self {
        Self {
            bytes: &[],
            count: 0,
            _marker: PhantomData,
        }
    }

    /// Number of records
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Check for zero records
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The raw bytes backing the window
    #[inline]
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Iterate over the records, re-parsing lazily
    #[inline]
    pub fn iter(&self) -> VarIter<'a, T> {
        VarIter {
            cur: ReadCursor::new(self.bytes),
            rem: self.count,
            _marker: PhantomData,
        }
    }
}

impl<'a, T: WireView<'a> + fmt::Debug> fmt::Debug for VarSlice<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, T: WireView<'a>> IntoIterator for VarSlice<'a, T> {
    type Item = T;
    type IntoIter = VarIter<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T: WireView<'a>> Default for VarSlice<'a, T> {
    #[inline]
    fn default() -> Self {
        Self::empty()
    }
}

/// Iterator over a `VarSlice`, advancing by each record's parsed size
#[derive(Clone)]
pub struct VarIter<'a, T: WireView<'a>> {
    cur: ReadCursor<'a>,
    rem: usize,
    _marker: PhantomData<T>,
}

impl<'a, T: WireView<'a>> Iterator for VarIter<'a, T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        if self.rem == 0 {
            return None;
        }
        self.rem -= 1;
        T::parse(&mut self.cur).ok()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.rem, Some(self.rem))
    }
}

impl<'a, T: WireView<'a>> ExactSizeIterator for VarIter<'a, T> {}
