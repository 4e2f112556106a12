//! Compatibility map sections
//!
//! A compatibility map travels as a run of symbol interpretations whose
//! count sits in the fixed part, followed by one group modifier definition
//! per set bit of the groups mask.

use alloc::vec::Vec;

use crate::cursor::{serialize_exact, ReadCursor, WriteCursor};
use crate::error::{Error, Result};
use crate::iter::FixedSlice;
use crate::mask::{popcount, rank_of};
use crate::types::{ModDef, SymInterp};
use crate::wire::{put_run, run_len};

/// Fixed part of a compatibility map reply
///
/// The same 32-byte layout opens the standalone reply and the embedded form
/// inside a keyboard-by-name reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompatHeader {
    /// Reply discriminant byte
    pub response_type: u8,
    /// Keyboard the map describes
    pub device_id: u8,
    /// Low bits of the request sequence number
    pub sequence: u16,
    /// Remaining reply length in 4-byte units
    pub length: u32,
    /// Groups covered by the group modifier run
    pub groups_rtrn: u8,
    /// First interpretation returned
    pub first_si_rtrn: u16,
    /// Number of interpretations returned
    pub n_si_rtrn: u16,
    /// Total interpretations the server holds
    pub n_total_si: u16,
}

impl CompatHeader {
    /// Encoded size of the fixed part
    pub const SIZE: usize = 32;

    /// Decode the fixed part at the cursor position
    pub fn parse(cur: &mut ReadCursor<'_>) -> Result<Self> {
        let response_type = cur.get_u8()?;
        let device_id = cur.get_u8()?;
        let sequence = cur.get_u16()?;
        let length = cur.get_u32()?;
        let groups_rtrn = cur.get_u8()?;
        cur.skip(1)?;
        let first_si_rtrn = cur.get_u16()?;
        let n_si_rtrn = cur.get_u16()?;
        let n_total_si = cur.get_u16()?;
        cur.skip(16)?;
        Ok(Self {
            response_type,
            device_id,
            sequence,
            length,
            groups_rtrn,
            first_si_rtrn,
            n_si_rtrn,
            n_total_si,
        })
    }

    /// Encode the fixed part at the cursor position
    pub fn emit(&self, cur: &mut WriteCursor<'_>) -> Result<()> {
        cur.put_u8(self.response_type)?;
        cur.put_u8(self.device_id)?;
        cur.put_u16(self.sequence)?;
        cur.put_u32(self.length)?;
        cur.put_u8(self.groups_rtrn)?;
        cur.put_zeros(1)?;
        cur.put_u16(self.first_si_rtrn)?;
        cur.put_u16(self.n_si_rtrn)?;
        cur.put_u16(self.n_total_si)?;
        cur.put_zeros(16)
    }
}

/// Borrowed view of the variable part of a compatibility map
#[derive(Debug, Clone, Copy)]
pub struct CompatParts<'a> {
    /// Groups covered by the trailing modifier definitions
    pub groups: u8,
    si: FixedSlice<'a, SymInterp>,
    group_mods: FixedSlice<'a, ModDef>,
}

impl<'a> CompatParts<'a> {
    /// Decode `n_si` interpretations and the group run at the cursor
    /// position
    ///
    /// `n_si` and `groups` come from the enclosing fixed part.
    pub fn parse(cur: &mut ReadCursor<'a>, n_si: usize, groups: u8) -> Result<Self> {
        let si = FixedSlice::parse(cur, n_si)?;
        let group_mods = FixedSlice::parse(cur, popcount(groups as u32))?;
        Ok(Self {
            groups,
            si,
            group_mods,
        })
    }

    /// The symbol interpretations
    #[inline]
    pub fn si(&self) -> FixedSlice<'a, SymInterp> {
        self.si
    }

    /// Group modifier definitions, one per set bit of `groups`, ascending
    #[inline]
    pub fn group_mods(&self) -> FixedSlice<'a, ModDef> {
        self.group_mods
    }

    /// Modifier definition for the group selected by `bit`, when covered
    #[inline]
    pub fn group_mods_for(&self, bit: u8) -> Option<ModDef> {
        self.group_mods
            .get(rank_of(self.groups as u32, bit as u32)?)
    }
}

/// Builder for the variable part of a compatibility map
#[derive(Debug, Clone, Copy)]
pub struct CompatPartsSpec<'a> {
    /// Groups covered by the trailing modifier definitions
    pub groups: u8,
    /// Symbol interpretations
    pub si: &'a [SymInterp],
    /// One modifier definition per set bit of `groups`, ascending
    pub group_mods: &'a [ModDef],
}

impl<'a> CompatPartsSpec<'a> {
    fn check_counts(&self) -> Result<()> {
        if self.si.len() > u16::MAX as usize {
            return Err(Error::CountOverflow);
        }
        if self.group_mods.len() != popcount(self.groups as u32) {
            return Err(Error::CountMismatch);
        }
        Ok(())
    }

    /// Encoded size of the section
    pub fn wire_len(&self) -> Result<usize> {
        self.check_counts()?;
        let si = run_len::<SymInterp>(self.si.len())?;
        let mods = run_len::<ModDef>(self.group_mods.len())?;
        si.checked_add(mods).ok_or(Error::Overflow)
    }

    /// Encode the section at the cursor position
    pub fn emit(&self, cur: &mut WriteCursor<'_>) -> Result<()> {
        self.check_counts()?;
        put_run(cur, self.si)?;
        put_run(cur, self.group_mods)
    }

    /// Encode the section into a fresh buffer
    pub fn serialize(&self) -> Result<Vec<u8>> {
        serialize_exact(self.wire_len()?, |cur| self.emit(cur))
    }
}
