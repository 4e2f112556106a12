//! Key symbol map records
//!
//! One record per key: which key type applies in each group, how many
//! symbols the key carries, and the flattened symbol array indexed by
//! `group * width + level`.

use alloc::vec::Vec;

use crate::cursor::{serialize_exact, ReadCursor, WriteCursor};
use crate::error::{Error, Result};
use crate::iter::{FixedSlice, WireView};
use crate::types::KeySym;
use crate::wire::{put_run, run_len};

/// Borrowed view of one key symbol map record
#[derive(Debug, Clone, Copy)]
pub struct KeySymMap<'a> {
    /// Key type index per group
    pub kt_index: [u8; 4],
    /// Group count and wrap behavior, packed
    pub group_info: u8,
    /// Widest group's level count
    pub width: u8,
    syms: FixedSlice<'a, KeySym>,
}

impl<'a> KeySymMap<'a> {
    /// Number of groups, from the low nibble of `group_info`
    #[inline]
    pub fn num_groups(&self) -> u8 {
        self.group_info & 0x0F
    }

    /// The flattened symbol array
    #[inline]
    pub fn syms(&self) -> FixedSlice<'a, KeySym> {
        self.syms
    }

    /// Symbol at a group and shift level
    #[inline]
    pub fn sym_at(&self, group: u8, level: u8) -> Option<KeySym> {
        let index = group as usize * self.width as usize + level as usize;
        self.syms.get(index)
    }

    /// Decode a record at the start of `buf`, returning the view and the
    /// number of bytes it occupies
    pub fn unpack(buf: &'a [u8]) -> Result<(Self, usize)> {
        let mut cur = ReadCursor::new(buf);
        let view = Self::parse(&mut cur)?;
        Ok((view, cur.position()))
    }

    /// Number of bytes the record at the start of `buf` occupies
    #[inline]
    pub fn size_of(buf: &'a [u8]) -> Result<usize> {
        Ok(Self::unpack(buf)?.1)
    }
}

impl<'a> WireView<'a> for KeySymMap<'a> {
    fn parse(cur: &mut ReadCursor<'a>) -> Result<Self> {
        let mut kt_index = [0u8; 4];
        kt_index.copy_from_slice(cur.take(4)?);
        let group_info = cur.get_u8()?;
        let width = cur.get_u8()?;
        let n_syms = cur.get_u16()? as usize;
        let syms = FixedSlice::parse(cur, n_syms)?;
        Ok(Self {
            kt_index,
            group_info,
            width,
            syms,
        })
    }
}

/// Builder for one key symbol map record
#[derive(Debug, Clone, Copy)]
pub struct KeySymMapSpec<'a> {
    /// Key type index per group
    pub kt_index: [u8; 4],
    /// Group count and wrap behavior, packed
    pub group_info: u8,
    /// Widest group's level count
    pub width: u8,
    /// Flattened symbol array, `group * width + level` order
    pub syms: &'a [KeySym],
}

impl<'a> KeySymMapSpec<'a> {
    /// Encoded size of the record
    pub fn wire_len(&self) -> Result<usize> {
        if self.syms.len() > u16::MAX as usize {
            return Err(Error::CountOverflow);
        }
        8usize
            .checked_add(run_len::<KeySym>(self.syms.len())?)
            .ok_or(Error::Overflow)
    }

    /// Encode the record at the cursor position
    pub fn emit(&self, cur: &mut WriteCursor<'_>) -> Result<()> {
        if self.syms.len() > u16::MAX as usize {
            return Err(Error::CountOverflow);
        }
        cur.put_bytes(&self.kt_index)?;
        cur.put_u8(self.group_info)?;
        cur.put_u8(self.width)?;
        cur.put_u16(self.syms.len() as u16)?;
        put_run(cur, self.syms)
    }

    /// Encode the record into a fresh buffer
    pub fn serialize(&self) -> Result<Vec<u8>> {
        serialize_exact(self.wire_len()?, |cur| self.emit(cur))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    const XK_A: KeySym = 0x61;
    const XK_CAP_A: KeySym = 0x41;
    const XK_AE: KeySym = 0xE6;
    const XK_CAP_AE: KeySym = 0xC6;

    #[test]
    fn test_roundtrip_two_groups() {
        let syms = [XK_A, XK_CAP_A, XK_AE, XK_CAP_AE];
        let spec = KeySymMapSpec {
            kt_index: [1, 1, 0, 0],
            group_info: 2,
            width: 2,
            syms: &syms,
        };
        let bytes = spec.serialize().unwrap();
        assert_eq!(bytes.len(), 8 + 16);

        let (view, consumed) = KeySymMap::unpack(&bytes).unwrap();
        assert_eq!(consumed, 24);
        assert_eq!(view.kt_index, [1, 1, 0, 0]);
        assert_eq!(view.num_groups(), 2);
        assert_eq!(view.width, 2);
        assert_eq!(view.syms().len(), 4);
        assert_eq!(view.sym_at(0, 0), Some(XK_A));
        assert_eq!(view.sym_at(0, 1), Some(XK_CAP_A));
        assert_eq!(view.sym_at(1, 0), Some(XK_AE));
        assert_eq!(view.sym_at(1, 1), Some(XK_CAP_AE));
        assert_eq!(view.sym_at(2, 0), None);
    }

    #[test]
    fn test_empty_sym_list() {
        let spec = KeySymMapSpec {
            kt_index: [0; 4],
            group_info: 0,
            width: 0,
            syms: &[],
        };
        let bytes = spec.serialize().unwrap();
        assert_eq!(bytes.len(), 8);
        let (view, _) = KeySymMap::unpack(&bytes).unwrap();
        assert!(view.syms().is_empty());
    }

    #[test]
    fn test_truncated_sym_list() {
        let syms = [XK_A, XK_CAP_A];
        let spec = KeySymMapSpec {
            kt_index: [0; 4],
            group_info: 1,
            width: 2,
            syms: &syms,
        };
        let bytes = spec.serialize().unwrap();
        let err = KeySymMap::unpack(&bytes[..10]).unwrap_err();
        assert_eq!(err, Error::TruncatedBuffer);
    }

    #[test]
    fn test_count_overflow() {
        let syms = vec![0u32; u16::MAX as usize + 1];
        let spec = KeySymMapSpec {
            kt_index: [0; 4],
            group_info: 1,
            width: 1,
            syms: &syms,
        };
        assert_eq!(spec.wire_len(), Err(Error::CountOverflow));
    }

    #[test]
    fn test_records_abut_in_sequence() {
        let first = KeySymMapSpec {
            kt_index: [0; 4],
            group_info: 1,
            width: 1,
            syms: &[XK_A],
        };
        let second = KeySymMapSpec {
            kt_index: [1; 4],
            group_info: 1,
            width: 2,
            syms: &[XK_A, XK_CAP_A],
        };

        let mut bytes = first.serialize().unwrap();
        bytes.extend_from_slice(&second.serialize().unwrap());

        let mut cur = ReadCursor::new(&bytes);
        let a = KeySymMap::parse(&mut cur).unwrap();
        let b = KeySymMap::parse(&mut cur).unwrap();
        assert_eq!(a.syms().len(), 1);
        assert_eq!(b.syms().len(), 2);
        assert!(cur.is_at_end());
    }
}
