//! Symbolic name lists
//!
//! Keyboard component names travel as a single mask-gated value list: six
//! leading atoms selected by presence bits, then atom runs sized by counts
//! from the fixed part, by set bits of secondary masks, or by the sum of a
//! per-type count run.

use alloc::vec::Vec;

use crate::align::align_up;
use crate::cursor::{serialize_exact, ReadCursor, WriteCursor};
use crate::error::{Error, Result};
use crate::iter::FixedSlice;
use crate::mask::{popcount, rank_of, sum_of};
use crate::types::{Atom, KeyAlias, KeyName, Keycode};
use crate::wire::{put_run, run_len, Wire};

/// Name component bits for the `which` mask of a name list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameDetail;

impl NameDetail {
    /// Keycodes file name atom
    pub const KEYCODES: u32 = 0x0001;
    /// Geometry file name atom
    pub const GEOMETRY: u32 = 0x0002;
    /// Symbols file name atom
    pub const SYMBOLS: u32 = 0x0004;
    /// Physical symbols file name atom
    pub const PHYS_SYMBOLS: u32 = 0x0008;
    /// Types file name atom
    pub const TYPES: u32 = 0x0010;
    /// Compatibility file name atom
    pub const COMPAT: u32 = 0x0020;
    /// One name atom per key type
    pub const KEY_TYPE_NAMES: u32 = 0x0040;
    /// Per-type level counts plus the flattened level name atoms
    pub const KT_LEVEL_NAMES: u32 = 0x0080;
    /// One name atom per set indicator bit
    pub const INDICATOR_NAMES: u32 = 0x0100;
    /// One four-byte name per key
    pub const KEY_NAMES: u32 = 0x0200;
    /// Key alias pairs
    pub const KEY_ALIASES: u32 = 0x0400;
    /// One name atom per set virtual modifier bit
    pub const VIRTUAL_MOD_NAMES: u32 = 0x0800;
    /// One name atom per set group bit
    pub const GROUP_NAMES: u32 = 0x1000;
    /// One name atom per radio group
    pub const RG_NAMES: u32 = 0x2000;
    /// Every component
    pub const ALL: u32 = 0x3FFF;
}

/// Fixed part of a names reply
///
/// The same 32-byte layout opens the standalone reply and the embedded form
/// inside a keyboard-by-name reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NamesHeader {
    /// Reply discriminant byte
    pub response_type: u8,
    /// Keyboard the names describe
    pub device_id: u8,
    /// Low bits of the request sequence number
    pub sequence: u16,
    /// Remaining reply length in 4-byte units
    pub length: u32,
    /// Components present in the value list
    pub which: u32,
    /// Lowest keycode the key name run covers
    pub min_key_code: Keycode,
    /// Highest keycode the key name run covers
    pub max_key_code: Keycode,
    /// Number of key type name atoms
    pub n_types: u8,
    /// Groups whose names follow
    pub group_names: u8,
    /// Virtual modifiers whose names follow
    pub virtual_mods: u16,
    /// First key the key name run covers
    pub first_key: Keycode,
    /// Number of key names
    pub n_keys: u8,
    /// Indicators whose names follow
    pub indicators: u32,
    /// Number of radio group names
    pub n_radio_groups: u8,
    /// Number of key alias pairs
    pub n_key_aliases: u8,
    /// Number of per-type level counts
    pub n_kt_levels: u16,
}

impl NamesHeader {
    /// Encoded size of the fixed part
    pub const SIZE: usize = 32;

    /// Decode the fixed part at the cursor position
    pub fn parse(cur: &mut ReadCursor<'_>) -> Result<Self> {
        let response_type = cur.get_u8()?;
        let device_id = cur.get_u8()?;
        let sequence = cur.get_u16()?;
        let length = cur.get_u32()?;
        let which = cur.get_u32()?;
        let min_key_code = cur.get_u8()?;
        let max_key_code = cur.get_u8()?;
        let n_types = cur.get_u8()?;
        let group_names = cur.get_u8()?;
        let virtual_mods = cur.get_u16()?;
        let first_key = cur.get_u8()?;
        let n_keys = cur.get_u8()?;
        let indicators = cur.get_u32()?;
        let n_radio_groups = cur.get_u8()?;
        let n_key_aliases = cur.get_u8()?;
        let n_kt_levels = cur.get_u16()?;
        cur.skip(4)?;
        Ok(Self {
            response_type,
            device_id,
            sequence,
            length,
            which,
            min_key_code,
            max_key_code,
            n_types,
            group_names,
            virtual_mods,
            first_key,
            n_keys,
            indicators,
            n_radio_groups,
            n_key_aliases,
            n_kt_levels,
        })
    }

    /// Encode the fixed part at the cursor position
    pub fn emit(&self, cur: &mut WriteCursor<'_>) -> Result<()> {
        cur.put_u8(self.response_type)?;
        cur.put_u8(self.device_id)?;
        cur.put_u16(self.sequence)?;
        cur.put_u32(self.length)?;
        cur.put_u32(self.which)?;
        cur.put_u8(self.min_key_code)?;
        cur.put_u8(self.max_key_code)?;
        cur.put_u8(self.n_types)?;
        cur.put_u8(self.group_names)?;
        cur.put_u16(self.virtual_mods)?;
        cur.put_u8(self.first_key)?;
        cur.put_u8(self.n_keys)?;
        cur.put_u32(self.indicators)?;
        cur.put_u8(self.n_radio_groups)?;
        cur.put_u8(self.n_key_aliases)?;
        cur.put_u16(self.n_kt_levels)?;
        cur.put_zeros(4)
    }

    /// Parse parameters for the value list this header announces
    #[inline]
    pub fn layout(&self) -> NameListLayout {
        NameListLayout {
            which: self.which,
            n_types: self.n_types,
            n_kt_levels: self.n_kt_levels,
            indicators: self.indicators,
            virtual_mods: self.virtual_mods,
            group_names: self.group_names,
            n_keys: self.n_keys,
            n_key_aliases: self.n_key_aliases,
            n_radio_groups: self.n_radio_groups,
        }
    }
}

/// Counts and masks that govern a name list's shape
///
/// These all live outside the list itself, in the reply fixed part or the
/// set-request fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NameListLayout {
    /// Components present
    pub which: u32,
    /// Number of key type name atoms
    pub n_types: u8,
    /// Number of per-type level counts
    pub n_kt_levels: u16,
    /// Indicators whose names are listed
    pub indicators: u32,
    /// Virtual modifiers whose names are listed
    pub virtual_mods: u16,
    /// Groups whose names are listed
    pub group_names: u8,
    /// Number of key names
    pub n_keys: u8,
    /// Number of key alias pairs
    pub n_key_aliases: u8,
    /// Number of radio group names
    pub n_radio_groups: u8,
}

/// Borrowed view of a name list value list
#[derive(Debug, Clone, Copy)]
pub struct NameList<'a> {
    layout: NameListLayout,
    /// Keycodes file name, when listed
    pub keycodes_name: Option<Atom>,
    /// Geometry file name, when listed
    pub geometry_name: Option<Atom>,
    /// Symbols file name, when listed
    pub symbols_name: Option<Atom>,
    /// Physical symbols file name, when listed
    pub phys_symbols_name: Option<Atom>,
    /// Types file name, when listed
    pub types_name: Option<Atom>,
    /// Compatibility file name, when listed
    pub compat_name: Option<Atom>,
    type_names: FixedSlice<'a, Atom>,
    levels_per_type: FixedSlice<'a, u8>,
    kt_level_names: FixedSlice<'a, Atom>,
    indicator_names: FixedSlice<'a, Atom>,
    virtual_mod_names: FixedSlice<'a, Atom>,
    group_names: FixedSlice<'a, Atom>,
    key_names: FixedSlice<'a, KeyName>,
    key_aliases: FixedSlice<'a, KeyAlias>,
    radio_group_names: FixedSlice<'a, Atom>,
}

impl<'a> NameList<'a> {
    /// Decode a value list whose shape `layout` describes
    pub fn parse(cur: &mut ReadCursor<'a>, layout: &NameListLayout) -> Result<Self> {
        let which = layout.which;

        let mut lead = |bit: u32| -> Result<Option<Atom>> {
            if which & bit != 0 {
                Ok(Some(cur.get_u32()?))
            } else {
                Ok(None)
            }
        };
        let keycodes_name = lead(NameDetail::KEYCODES)?;
        let geometry_name = lead(NameDetail::GEOMETRY)?;
        let symbols_name = lead(NameDetail::SYMBOLS)?;
        let phys_symbols_name = lead(NameDetail::PHYS_SYMBOLS)?;
        let types_name = lead(NameDetail::TYPES)?;
        let compat_name = lead(NameDetail::COMPAT)?;

        let type_names = if which & NameDetail::KEY_TYPE_NAMES != 0 {
            FixedSlice::parse(cur, layout.n_types as usize)?
        } else {
            FixedSlice::empty()
        };

        let (levels_per_type, kt_level_names) = if which & NameDetail::KT_LEVEL_NAMES != 0 {
            let counts = FixedSlice::<u8>::parse(cur, layout.n_kt_levels as usize)?;
            let names = FixedSlice::parse(cur, sum_of(counts.bytes()))?;
            (counts, names)
        } else {
            (FixedSlice::empty(), FixedSlice::empty())
        };

        let indicator_names = if which & NameDetail::INDICATOR_NAMES != 0 {
            FixedSlice::parse(cur, popcount(layout.indicators))?
        } else {
            FixedSlice::empty()
        };
        let virtual_mod_names = if which & NameDetail::VIRTUAL_MOD_NAMES != 0 {
            FixedSlice::parse(cur, popcount(layout.virtual_mods as u32))?
        } else {
            FixedSlice::empty()
        };
        let group_names = if which & NameDetail::GROUP_NAMES != 0 {
            FixedSlice::parse(cur, popcount(layout.group_names as u32))?
        } else {
            FixedSlice::empty()
        };
        let key_names = if which & NameDetail::KEY_NAMES != 0 {
            FixedSlice::parse(cur, layout.n_keys as usize)?
        } else {
            FixedSlice::empty()
        };
        let key_aliases = if which & NameDetail::KEY_ALIASES != 0 {
            FixedSlice::parse(cur, layout.n_key_aliases as usize)?
        } else {
            FixedSlice::empty()
        };
        let radio_group_names = if which & NameDetail::RG_NAMES != 0 {
            FixedSlice::parse(cur, layout.n_radio_groups as usize)?
        } else {
            FixedSlice::empty()
        };

        Ok(Self {
            layout: *layout,
            keycodes_name,
            geometry_name,
            symbols_name,
            phys_symbols_name,
            types_name,
            compat_name,
            type_names,
            levels_per_type,
            kt_level_names,
            indicator_names,
            virtual_mod_names,
            group_names,
            key_names,
            key_aliases,
            radio_group_names,
        })
    }

    /// Decode a value list at the start of `buf`, returning the view and
    /// the number of bytes it occupies
    pub fn unpack(buf: &'a [u8], layout: &NameListLayout) -> Result<(Self, usize)> {
        let mut cur = ReadCursor::new(buf);
        let view = Self::parse(&mut cur, layout)?;
        Ok((view, cur.position()))
    }

    /// Number of bytes the value list at the start of `buf` occupies
    #[inline]
    pub fn size_of(buf: &'a [u8], layout: &NameListLayout) -> Result<usize> {
        Ok(Self::unpack(buf, layout)?.1)
    }

    /// Components present in the list
    #[inline]
    pub fn which(&self) -> u32 {
        self.layout.which
    }

    /// Key type name atoms
    #[inline]
    pub fn type_names(&self) -> FixedSlice<'a, Atom> {
        self.type_names
    }

    /// Levels per key type, indexing the flattened level name run
    #[inline]
    pub fn levels_per_type(&self) -> FixedSlice<'a, u8> {
        self.levels_per_type
    }

    /// Level name atoms for every type, flattened in type order
    #[inline]
    pub fn kt_level_names(&self) -> FixedSlice<'a, Atom> {
        self.kt_level_names
    }

    /// Level name atoms belonging to the type at `type_ndx`
    pub fn level_names(&self, type_ndx: usize) -> Option<FixedSlice<'a, Atom>> {
        let counts = self.levels_per_type.bytes();
        let count = *counts.get(type_ndx)? as usize;
        let start = sum_of(&counts[..type_ndx]);
        self.kt_level_names.slice(start, count)
    }

    /// Indicator name atoms, one per set bit of the indicators mask
    #[inline]
    pub fn indicator_names(&self) -> FixedSlice<'a, Atom> {
        self.indicator_names
    }

    /// Name atom for the indicator selected by `bit`, when listed
    #[inline]
    pub fn indicator_name_for(&self, bit: u32) -> Option<Atom> {
        self.indicator_names.get(rank_of(self.layout.indicators, bit)?)
    }

    /// Virtual modifier name atoms, one per set bit of the vmods mask
    #[inline]
    pub fn virtual_mod_names(&self) -> FixedSlice<'a, Atom> {
        self.virtual_mod_names
    }

    /// Name atom for the virtual modifier selected by `bit`, when listed
    #[inline]
    pub fn virtual_mod_name_for(&self, bit: u16) -> Option<Atom> {
        self.virtual_mod_names
            .get(rank_of(self.layout.virtual_mods as u32, bit as u32)?)
    }

    /// Group name atoms, one per set bit of the group mask
    #[inline]
    pub fn group_names(&self) -> FixedSlice<'a, Atom> {
        self.group_names
    }

    /// Name atom for the group selected by `bit`, when listed
    #[inline]
    pub fn group_name_for(&self, bit: u8) -> Option<Atom> {
        self.group_names
            .get(rank_of(self.layout.group_names as u32, bit as u32)?)
    }

    /// Four-byte key names
    #[inline]
    pub fn key_names(&self) -> FixedSlice<'a, KeyName> {
        self.key_names
    }

    /// Key alias pairs
    #[inline]
    pub fn key_aliases(&self) -> FixedSlice<'a, KeyAlias> {
        self.key_aliases
    }

    /// Radio group name atoms
    #[inline]
    pub fn radio_group_names(&self) -> FixedSlice<'a, Atom> {
        self.radio_group_names
    }
}

/// A mask-gated atom run paired with its gating mask
#[derive(Debug, Clone, Copy)]
pub struct MaskedNames<'a, M> {
    /// Gating mask; one atom follows per set bit
    pub mask: M,
    /// Name atoms in ascending bit order
    pub atoms: &'a [Atom],
}

impl<'a, M: Copy + Into<u32>> MaskedNames<'a, M> {
    fn check_counts(&self) -> Result<()> {
        if self.atoms.len() != popcount(self.mask.into()) {
            return Err(Error::CountMismatch);
        }
        Ok(())
    }
}

/// Per-type level counts paired with the flattened level name atoms
#[derive(Debug, Clone, Copy)]
pub struct KtLevelNames<'a> {
    /// Number of named levels per type
    pub counts: &'a [u8],
    /// Level name atoms, concatenated in type order
    pub names: &'a [Atom],
}

impl<'a> KtLevelNames<'a> {
    fn check_counts(&self) -> Result<()> {
        if self.counts.len() > u8::MAX as usize || self.names.len() > u16::MAX as usize {
            return Err(Error::CountOverflow);
        }
        if sum_of(self.counts) != self.names.len() {
            return Err(Error::CountMismatch);
        }
        Ok(())
    }
}

/// Builder for a name list value list
///
/// `None` sections are left out entirely; the computed `which` mask carries
/// a bit only for present sections.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameListSpec<'a> {
    /// Keycodes file name
    pub keycodes_name: Option<Atom>,
    /// Geometry file name
    pub geometry_name: Option<Atom>,
    /// Symbols file name
    pub symbols_name: Option<Atom>,
    /// Physical symbols file name
    pub phys_symbols_name: Option<Atom>,
    /// Types file name
    pub types_name: Option<Atom>,
    /// Compatibility file name
    pub compat_name: Option<Atom>,
    /// One name atom per key type
    pub type_names: Option<&'a [Atom]>,
    /// Per-type level counts and the flattened level names
    pub kt_level_names: Option<KtLevelNames<'a>>,
    /// Indicator names keyed by the indicator mask
    pub indicator_names: Option<MaskedNames<'a, u32>>,
    /// Virtual modifier names keyed by the vmod mask
    pub virtual_mod_names: Option<MaskedNames<'a, u16>>,
    /// Group names keyed by the group mask
    pub group_names: Option<MaskedNames<'a, u8>>,
    /// Four-byte key names
    pub key_names: Option<&'a [KeyName]>,
    /// Key alias pairs
    pub key_aliases: Option<&'a [KeyAlias]>,
    /// Radio group name atoms
    pub radio_group_names: Option<&'a [Atom]>,
}

impl<'a> NameListSpec<'a> {
    /// The `which` mask matching the present sections
    pub fn which(&self) -> u32 {
        let mut which = 0;
        if self.keycodes_name.is_some() {
            which |= NameDetail::KEYCODES;
        }
        if self.geometry_name.is_some() {
            which |= NameDetail::GEOMETRY;
        }
        if self.symbols_name.is_some() {
            which |= NameDetail::SYMBOLS;
        }
        if self.phys_symbols_name.is_some() {
            which |= NameDetail::PHYS_SYMBOLS;
        }
        if self.types_name.is_some() {
            which |= NameDetail::TYPES;
        }
        if self.compat_name.is_some() {
            which |= NameDetail::COMPAT;
        }
        if self.type_names.is_some() {
            which |= NameDetail::KEY_TYPE_NAMES;
        }
        if self.kt_level_names.is_some() {
            which |= NameDetail::KT_LEVEL_NAMES;
        }
        if self.indicator_names.is_some() {
            which |= NameDetail::INDICATOR_NAMES;
        }
        if self.virtual_mod_names.is_some() {
            which |= NameDetail::VIRTUAL_MOD_NAMES;
        }
        if self.group_names.is_some() {
            which |= NameDetail::GROUP_NAMES;
        }
        if self.key_names.is_some() {
            which |= NameDetail::KEY_NAMES;
        }
        if self.key_aliases.is_some() {
            which |= NameDetail::KEY_ALIASES;
        }
        if self.radio_group_names.is_some() {
            which |= NameDetail::RG_NAMES;
        }
        which
    }

    fn check_counts(&self) -> Result<()> {
        if let Some(names) = self.type_names {
            if names.len() > u8::MAX as usize {
                return Err(Error::CountOverflow);
            }
        }
        if let Some(kt) = &self.kt_level_names {
            kt.check_counts()?;
        }
        if let Some(run) = &self.indicator_names {
            run.check_counts()?;
        }
        if let Some(run) = &self.virtual_mod_names {
            run.check_counts()?;
        }
        if let Some(run) = &self.group_names {
            run.check_counts()?;
        }
        if let Some(names) = self.key_names {
            if names.len() > u8::MAX as usize {
                return Err(Error::CountOverflow);
            }
        }
        if let Some(aliases) = self.key_aliases {
            if aliases.len() > u8::MAX as usize {
                return Err(Error::CountOverflow);
            }
        }
        if let Some(names) = self.radio_group_names {
            if names.len() > u8::MAX as usize {
                return Err(Error::CountOverflow);
            }
        }
        Ok(())
    }

    /// Counts and masks to carry in the fixed part for this list
    pub fn layout(&self) -> Result<NameListLayout> {
        self.check_counts()?;
        Ok(NameListLayout {
            which: self.which(),
            n_types: self.type_names.map_or(0, |n| n.len() as u8),
            n_kt_levels: self
                .kt_level_names
                .as_ref()
                .map_or(0, |kt| kt.counts.len() as u16),
            indicators: self.indicator_names.as_ref().map_or(0, |run| run.mask),
            virtual_mods: self.virtual_mod_names.as_ref().map_or(0, |run| run.mask),
            group_names: self.group_names.as_ref().map_or(0, |run| run.mask),
            n_keys: self.key_names.map_or(0, |n| n.len() as u8),
            n_key_aliases: self.key_aliases.map_or(0, |a| a.len() as u8),
            n_radio_groups: self.radio_group_names.map_or(0, |n| n.len() as u8),
        })
    }

    /// Total level name atoms across all types
    #[inline]
    pub fn total_kt_level_names(&self) -> usize {
        self.kt_level_names.as_ref().map_or(0, |kt| kt.names.len())
    }

    /// Encoded size of the value list
    pub fn wire_len(&self) -> Result<usize> {
        self.check_counts()?;
        let lead = [
            self.keycodes_name,
            self.geometry_name,
            self.symbols_name,
            self.phys_symbols_name,
            self.types_name,
            self.compat_name,
        ];
        let mut len = 4 * lead.iter().filter(|a| a.is_some()).count();

        let mut grow = |len: &mut usize, add: usize| -> Result<()> {
            *len = len.checked_add(add).ok_or(Error::Overflow)?;
            Ok(())
        };
        if let Some(names) = self.type_names {
            grow(&mut len, run_len::<Atom>(names.len())?)?;
        }
        if let Some(kt) = &self.kt_level_names {
            grow(&mut len, kt.counts.len())?;
            len = align_up(len, Atom::ALIGN)?;
            grow(&mut len, run_len::<Atom>(kt.names.len())?)?;
        }
        if let Some(run) = &self.indicator_names {
            grow(&mut len, run_len::<Atom>(run.atoms.len())?)?;
        }
        if let Some(run) = &self.virtual_mod_names {
            grow(&mut len, run_len::<Atom>(run.atoms.len())?)?;
        }
        if let Some(run) = &self.group_names {
            grow(&mut len, run_len::<Atom>(run.atoms.len())?)?;
        }
        if let Some(names) = self.key_names {
            grow(&mut len, run_len::<KeyName>(names.len())?)?;
        }
        if let Some(aliases) = self.key_aliases {
            grow(&mut len, run_len::<KeyAlias>(aliases.len())?)?;
        }
        if let Some(names) = self.radio_group_names {
            grow(&mut len, run_len::<Atom>(names.len())?)?;
        }
        Ok(len)
    }

    /// Encode the value list at the cursor position
    pub fn emit(&self, cur: &mut WriteCursor<'_>) -> Result<()> {
        self.check_counts()?;
        for atom in [
            self.keycodes_name,
            self.geometry_name,
            self.symbols_name,
            self.phys_symbols_name,
            self.types_name,
            self.compat_name,
        ]
        .into_iter()
        .flatten()
        {
            cur.put_u32(atom)?;
        }

        if let Some(names) = self.type_names {
            put_run(cur, names)?;
        }
        if let Some(kt) = &self.kt_level_names {
            cur.put_bytes(kt.counts)?;
            put_run(cur, kt.names)?;
        }
        if let Some(run) = &self.indicator_names {
            put_run(cur, run.atoms)?;
        }
        if let Some(run) = &self.virtual_mod_names {
            put_run(cur, run.atoms)?;
        }
        if let Some(run) = &self.group_names {
            put_run(cur, run.atoms)?;
        }
        if let Some(names) = self.key_names {
            put_run(cur, names)?;
        }
        if let Some(aliases) = self.key_aliases {
            put_run(cur, aliases)?;
        }
        if let Some(names) = self.radio_group_names {
            put_run(cur, names)?;
        }
        Ok(())
    }

    /// Encode the value list into a fresh buffer
    pub fn serialize(&self) -> Result<Vec<u8>> {
        serialize_exact(self.wire_len()?, |cur| self.emit(cur))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_name(text: &[u8]) -> KeyName {
        let mut name = [0u8; 4];
        name[..text.len()].copy_from_slice(text);
        KeyName { name }
    }

    #[test]
    fn test_header_roundtrip() {
        let hdr = NamesHeader {
            response_type: 1,
            device_id: 3,
            sequence: 7,
            length: 12,
            which: NameDetail::ALL,
            min_key_code: 8,
            max_key_code: 255,
            n_types: 4,
            group_names: 0b11,
            virtual_mods: 0x0303,
            first_key: 8,
            n_keys: 248,
            indicators: 0b1111,
            n_radio_groups: 0,
            n_key_aliases: 2,
            n_kt_levels: 4,
        };
        let mut buf = std::vec![0u8; NamesHeader::SIZE];
        let mut cur = WriteCursor::new(&mut buf);
        hdr.emit(&mut cur).unwrap();
        assert_eq!(cur.remaining(), 0);

        let mut cur = ReadCursor::new(&buf);
        assert_eq!(NamesHeader::parse(&mut cur).unwrap(), hdr);
    }

    #[test]
    fn test_value_list_order_and_padding() {
        // keycodes atom, types atom, two type names, level counts [2, 1]
        // padded to four, three level names, two key names
        let spec = NameListSpec {
            keycodes_name: Some(0x100),
            types_name: Some(0x101),
            type_names: Some(&[0x200, 0x201]),
            kt_level_names: Some(KtLevelNames {
                counts: &[2, 1],
                names: &[0x300, 0x301, 0x302],
            }),
            key_names: Some(&[key_name(b"AE01"), key_name(b"AE02")]),
            ..Default::default()
        };
        assert_eq!(
            spec.which(),
            NameDetail::KEYCODES
                | NameDetail::TYPES
                | NameDetail::KEY_TYPE_NAMES
                | NameDetail::KT_LEVEL_NAMES
                | NameDetail::KEY_NAMES
        );
        assert_eq!(spec.wire_len().unwrap(), 4 + 4 + 8 + 2 + 2 + 12 + 8);

        let bytes = spec.serialize().unwrap();
        assert_eq!(&bytes[0..4], &0x100u32.to_ne_bytes());
        assert_eq!(&bytes[4..8], &0x101u32.to_ne_bytes());
        assert_eq!(&bytes[16..18], &[2, 1]);
        assert_eq!(&bytes[18..20], &[0, 0]);
        assert_eq!(&bytes[20..24], &0x300u32.to_ne_bytes());
        assert_eq!(&bytes[32..36], b"AE01");
    }

    #[test]
    fn test_roundtrip_all_sections() {
        let spec = NameListSpec {
            keycodes_name: Some(1),
            geometry_name: Some(2),
            symbols_name: Some(3),
            phys_symbols_name: Some(4),
            types_name: Some(5),
            compat_name: Some(6),
            type_names: Some(&[10, 11, 12]),
            kt_level_names: Some(KtLevelNames {
                counts: &[1, 2, 0],
                names: &[20, 21, 22],
            }),
            indicator_names: Some(MaskedNames {
                mask: 0b101,
                atoms: &[30, 31],
            }),
            virtual_mod_names: Some(MaskedNames {
                mask: 0x0003,
                atoms: &[40, 41],
            }),
            group_names: Some(MaskedNames {
                mask: 0b1001,
                atoms: &[50, 51],
            }),
            key_names: Some(&[key_name(b"TLDE")]),
            key_aliases: Some(&[KeyAlias {
                real: *b"LSGT",
                alias: *b"LESS",
            }]),
            radio_group_names: Some(&[60]),
        };

        let bytes = spec.serialize().unwrap();
        let layout = spec.layout().unwrap();
        let (view, consumed) = NameList::unpack(&bytes, &layout).unwrap();
        assert_eq!(consumed, bytes.len());

        assert_eq!(view.which(), NameDetail::ALL);
        assert_eq!(view.keycodes_name, Some(1));
        assert_eq!(view.compat_name, Some(6));
        assert_eq!(view.type_names().get(2), Some(12));
        assert_eq!(view.levels_per_type().bytes(), &[1, 2, 0]);
        assert_eq!(view.kt_level_names().len(), 3);
        assert_eq!(view.indicator_name_for(0b100), Some(31));
        assert_eq!(view.indicator_name_for(0b10), None);
        assert_eq!(view.virtual_mod_name_for(0x0002), Some(41));
        assert_eq!(view.group_name_for(0b1000), Some(51));
        assert_eq!(view.key_names().get(0), Some(key_name(b"TLDE")));
        assert_eq!(view.key_aliases().get(0).unwrap().alias, *b"LESS");
        assert_eq!(view.radio_group_names().get(0), Some(60));
    }

    #[test]
    fn test_level_name_partitions() {
        let spec = NameListSpec {
            kt_level_names: Some(KtLevelNames {
                counts: &[2, 0, 1],
                names: &[100, 101, 102],
            }),
            ..Default::default()
        };
        let bytes = spec.serialize().unwrap();
        let layout = spec.layout().unwrap();
        let (view, _) = NameList::unpack(&bytes, &layout).unwrap();

        let first = view.level_names(0).unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first.get(0), Some(100));
        assert_eq!(first.get(1), Some(101));
        assert!(view.level_names(1).unwrap().is_empty());
        assert_eq!(view.level_names(2).unwrap().get(0), Some(102));
        assert!(view.level_names(3).is_none());
    }

    #[test]
    fn test_level_name_sum_mismatch() {
        let spec = NameListSpec {
            kt_level_names: Some(KtLevelNames {
                counts: &[2, 2],
                names: &[1, 2, 3],
            }),
            ..Default::default()
        };
        assert_eq!(spec.wire_len(), Err(Error::CountMismatch));
    }

    #[test]
    fn test_masked_run_mismatch() {
        let spec = NameListSpec {
            indicator_names: Some(MaskedNames {
                mask: 0b111,
                atoms: &[1, 2],
            }),
            ..Default::default()
        };
        assert_eq!(spec.serialize(), Err(Error::CountMismatch));
    }

    #[test]
    fn test_empty_list() {
        let spec = NameListSpec::default();
        assert_eq!(spec.which(), 0);
        let bytes = spec.serialize().unwrap();
        assert!(bytes.is_empty());

        let layout = spec.layout().unwrap();
        let mut cur = ReadCursor::new(&bytes);
        let view = NameList::parse(&mut cur, &layout).unwrap();
        assert_eq!(view.keycodes_name, None);
        assert!(view.key_names().is_empty());
    }

    #[test]
    fn test_truncated_list() {
        let spec = NameListSpec {
            type_names: Some(&[1, 2, 3]),
            ..Default::default()
        };
        let bytes = spec.serialize().unwrap();
        let layout = spec.layout().unwrap();
        let err = NameList::unpack(&bytes[..bytes.len() - 1], &layout).unwrap_err();
        assert_eq!(err, Error::TruncatedBuffer);
    }
}
