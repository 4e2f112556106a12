//! Key type records
//!
//! A key type describes how modifier state selects a shift level. On the
//! wire it is an 8-byte header followed by a run of level-map entries and,
//! when the preserve flag is set, a run of preserved-modifier definitions
//! of the same length.

use alloc::vec::Vec;

use crate::cursor::{serialize_exact, ReadCursor, WriteCursor};
use crate::error::{Error, Result};
use crate::iter::{FixedSlice, WireView};
use crate::types::{KtMapEntry, KtSetMapEntry, ModDef};
use crate::wire::{put_run, run_len};

/// Borrowed view of one key type record
#[derive(Debug, Clone, Copy)]
pub struct KeyType<'a> {
    /// Effective core modifier mask consulted by this type
    pub mods_mask: u8,
    /// Real modifiers consulted
    pub mods_mods: u8,
    /// Virtual modifiers consulted
    pub mods_vmods: u16,
    /// Number of shift levels the type produces
    pub num_levels: u8,
    /// The preserve run is present
    pub has_preserve: bool,
    map: FixedSlice<'a, KtMapEntry>,
    preserve: FixedSlice<'a, ModDef>,
}

impl<'a> KeyType<'a> {
    /// Level-map entries
    #[inline]
    pub fn map(&self) -> FixedSlice<'a, KtMapEntry> {
        self.map
    }

    /// Preserved modifiers per map entry; empty when not carried
    #[inline]
    pub fn preserve(&self) -> FixedSlice<'a, ModDef> {
        self.preserve
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

impl<'a> WireView<'a> for KeyType<'a> {
    fn parse(cur: &mut ReadCursor<'a>) -> Result<Self> {
        let mods_mask = cur.get_u8()?;
        let mods_mods = cur.get_u8()?;
        let mods_vmods = cur.get_u16()?;
        let num_levels = cur.get_u8()?;
        let n_map_entries = cur.get_u8()? as usize;
        let has_preserve = cur.get_u8()? != 0;
        cur.skip(1)?;

        let map = FixedSlice::parse(cur, n_map_entries)?;
        let preserve = if has_preserve {
            FixedSlice::parse(cur, n_map_entries)?
        } else {
            FixedSlice::empty()
        };

        Ok(Self {
            mods_mask,
            mods_mods,
            mods_vmods,
            num_levels,
            has_preserve,
            map,
            preserve,
        })
    }
}

/// Builder for one key type record
#[derive(Debug, Clone, Copy)]
pub struct KeyTypeSpec<'a> {
    /// Effective core modifier mask consulted by this type
    pub mods_mask: u8,
    /// Real modifiers consulted
    pub mods_mods: u8,
    /// Virtual modifiers consulted
    pub mods_vmods: u16,
    /// Number of shift levels the type produces
    pub num_levels: u8,
    /// Level-map entries
    pub map: &'a [KtMapEntry],
    /// Preserved modifiers, one per map entry when present
    pub preserve: Option<&'a [ModDef]>,
}

impl<'a> KeyTypeSpec<'a> {
    fn check_counts(&self) -> Result<()> {
        if self.map.len() > u8::MAX as usize {
            return Err(Error::CountOverflow);
        }
        if let Some(preserve) = self.preserve {
            if preserve.len() != self.map.len() {
                return Err(Error::CountMismatch);
            }
        }
        Ok(())
    }

    /// Encoded size of the record
    pub fn wire_len(&self) -> Result<usize> {
        self.check_counts()?;
        let mut len = 8usize;
        len = len
            .checked_add(run_len::<KtMapEntry>(self.map.len())?)
            .ok_or(Error::Overflow)?;
        if self.preserve.is_some() {
            len = len
                .checked_add(run_len::<ModDef>(self.map.len())?)
                .ok_or(Error::Overflow)?;
        }
        Ok(len)
    }

    /// Encode the record at the cursor position
    pub fn emit(&self, cur: &mut WriteCursor<'_>) -> Result<()> {
        self.check_counts()?;
        cur.put_u8(self.mods_mask)?;
        cur.put_u8(self.mods_mods)?;
        cur.put_u16(self.mods_vmods)?;
        cur.put_u8(self.num_levels)?;
        cur.put_u8(self.map.len() as u8)?;
        cur.put_u8(self.preserve.is_some() as u8)?;
        cur.put_zeros(1)?;

        put_run(cur, self.map)?;
        if let Some(preserve) = self.preserve {
            put_run(cur, preserve)?;
        }
        Ok(())
    }

    /// Encode the record into a fresh buffer
    pub fn serialize(&self) -> Result<Vec<u8>> {
        serialize_exact(self.wire_len()?, |cur| self.emit(cur))
    }
}

/// Borrowed view of one key type record in the compact set form
#[derive(Debug, Clone, Copy)]
pub struct SetKeyType<'a> {
    /// Effective core modifier mask consulted by this type
    pub mask: u8,
    /// Real modifiers consulted
    pub real_mods: u8,
    /// Virtual modifiers consulted
    pub virtual_mods: u16,
    /// Number of shift levels the type produces
    pub num_levels: u8,
    /// The preserve run is present
    pub has_preserve: bool,
    entries: FixedSlice<'a, KtSetMapEntry>,
    preserve: FixedSlice<'a, ModDef>,
}

impl<'a> SetKeyType<'a> {
    /// Level-map entries
    #[inline]
    pub fn entries(&self) -> FixedSlice<'a, KtSetMapEntry> {
        self.entries
    }

    /// Preserved modifiers per entry; empty when not carried
    #[inline]
    pub fn preserve(&self) -> FixedSlice<'a, ModDef> {
        self.preserve
    }
}

impl<'a> WireView<'a> for SetKeyType<'a> {
    fn parse(cur: &mut ReadCursor<'a>) -> Result<Self> {
        let mask = cur.get_u8()?;
        let real_mods = cur.get_u8()?;
        let virtual_mods = cur.get_u16()?;
        let num_levels = cur.get_u8()?;
        let n_map_entries = cur.get_u8()? as usize;
        let has_preserve = cur.get_u8()? != 0;
        cur.skip(1)?;

        let entries = FixedSlice::parse(cur, n_map_entries)?;
        let preserve = if has_preserve {
            FixedSlice::parse(cur, n_map_entries)?
        } else {
            FixedSlice::empty()
        };

        Ok(Self {
            mask,
            real_mods,
            virtual_mods,
            num_levels,
            has_preserve,
            entries,
            preserve,
        })
    }
}

/// Builder for one key type record in the compact set form
#[derive(Debug, Clone, Copy)]
pub struct SetKeyTypeSpec<'a> {
    /// Effective core modifier mask consulted by this type
    pub mask: u8,
    /// Real modifiers consulted
    pub real_mods: u8,
    /// Virtual modifiers consulted
    pub virtual_mods: u16,
    /// Number of shift levels the type produces
    pub num_levels: u8,
    /// Level-map entries
    pub entries: &'a [KtSetMapEntry],
    /// Preserved modifiers, one per entry when present
    pub preserve: Option<&'a [ModDef]>,
}

impl<'a> SetKeyTypeSpec<'a> {
    fn check_counts(&self) -> Result<()> {
        if self.entries.len() > u8::MAX as usize {
            return Err(Error::CountOverflow);
        }
        if let Some(preserve) = self.preserve {
            if preserve.len() != self.entries.len() {
                return Err(Error::CountMismatch);
            }
        }
        Ok(())
    }

    /// Encoded size of the record
    pub fn wire_len(&self) -> Result<usize> {
        self.check_counts()?;
        let mut len = 8usize;
        len = len
            .checked_add(run_len::<KtSetMapEntry>(self.entries.len())?)
            .ok_or(Error::Overflow)?;
        if self.preserve.is_some() {
            len = len
                .checked_add(run_len::<ModDef>(self.entries.len())?)
                .ok_or(Error::Overflow)?;
        }
        Ok(len)
    }

    /// Encode the record at the cursor position
    pub fn emit(&self, cur: &mut WriteCursor<'_>) -> Result<()> {
        self.check_counts()?;
        cur.put_u8(self.mask)?;
        cur.put_u8(self.real_mods)?;
        cur.put_u16(self.virtual_mods)?;
        cur.put_u8(self.num_levels)?;
        cur.put_u8(self.entries.len() as u8)?;
        cur.put_u8(self.preserve.is_some() as u8)?;
        cur.put_zeros(1)?;

        put_run(cur, self.entries)?;
        if let Some(preserve) = self.preserve {
            put_run(cur, preserve)?;
        }
        Ok(())
    }

    /// Encode the record into a fresh buffer
    pub fn serialize(&self) -> Result<Vec<u8>> {
        serialize_exact(self.wire_len()?, |cur| self.emit(cur))
    }
}
