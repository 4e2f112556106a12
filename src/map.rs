//! Keyboard map composites
//!
//! A keyboard map travels as up to eight sections gated by a present mask,
//! laid out in declared order with each section padded to its element
//! alignment. The counts governing every section live in the enclosing
//! fixed part, never in the sections themselves.
//!
//! The keyboard-by-name reply concatenates whole sub-replies, each padded
//! to a four-byte boundary; [`KbdByNameReplies`] walks them.

use alloc::vec::Vec;

use crate::align::align_up;
use crate::compat::{CompatHeader, CompatParts};
use crate::cursor::{serialize_exact, ReadCursor, WriteCursor};
use crate::error::{Error, Result};
use crate::geometry::{GeometryHeader, KbGeometry};
use crate::indicator::{IndicatorMapHeader, IndicatorMaps};
use crate::iter::{FixedSlice, VarSlice, WireView};
use crate::keytype::{KeyType, SetKeyTypeSpec};
use crate::mask::{popcount, rank_of, sum_of};
use crate::names::{NameList, NamesHeader};
use crate::symmap::{KeySymMap, KeySymMapSpec};
use crate::types::{Action, KeyModMap, KeyVModMap, Keycode, SetBehavior, SetExplicit};
use crate::wire::{put_run, run_len, Wire};

/// Map section bits for the present mask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapPart;

impl MapPart {
    /// Key type records
    pub const KEY_TYPES: u16 = 0x0001;
    /// Key symbol map records
    pub const KEY_SYMS: u16 = 0x0002;
    /// Modifier map entries
    pub const MODIFIER_MAP: u16 = 0x0004;
    /// Explicit component overrides
    pub const EXPLICIT_COMPONENTS: u16 = 0x0008;
    /// Per-key action counts and the flattened action list
    pub const KEY_ACTIONS: u16 = 0x0010;
    /// Key behavior entries
    pub const KEY_BEHAVIORS: u16 = 0x0020;
    /// Virtual modifier bindings
    pub const VIRTUAL_MODS: u16 = 0x0040;
    /// Virtual modifier map entries
    pub const VIRTUAL_MOD_MAP: u16 = 0x0080;
    /// Every section
    pub const ALL: u16 = 0x00FF;
}

/// Fixed part of a keyboard map reply
///
/// The same 40-byte layout opens the standalone reply and the embedded form
/// inside a keyboard-by-name reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MapHeader {
    /// Reply discriminant byte
    pub response_type: u8,
    /// Keyboard the map describes
    pub device_id: u8,
    /// Low bits of the request sequence number
    pub sequence: u16,
    /// Remaining reply length in 4-byte units
    pub length: u32,
    /// Lowest keycode in use
    pub min_key_code: Keycode,
    /// Highest keycode in use
    pub max_key_code: Keycode,
    /// Sections present in the value list
    pub present: u16,
    /// Index of the first key type returned
    pub first_type: u8,
    /// Number of key types returned
    pub n_types: u8,
    /// Total key types the server holds
    pub total_types: u8,
    /// First key the symbol run covers
    pub first_key_sym: Keycode,
    /// Total symbols across all returned symbol maps
    pub total_syms: u16,
    /// Number of symbol map records
    pub n_key_syms: u8,
    /// First key the action run covers
    pub first_key_action: Keycode,
    /// Total actions across all keys
    pub total_actions: u16,
    /// Number of per-key action counts
    pub n_key_actions: u8,
    /// First key the behavior run covers
    pub first_key_behavior: Keycode,
    /// Keys the behavior run spans
    pub n_key_behaviors: u8,
    /// Number of behavior entries
    pub total_key_behaviors: u8,
    /// First key the explicit run covers
    pub first_key_explicit: Keycode,
    /// Keys the explicit run spans
    pub n_key_explicit: u8,
    /// Number of explicit entries
    pub total_key_explicit: u8,
    /// First key the modifier map covers
    pub first_mod_map_key: Keycode,
    /// Keys the modifier map spans
    pub n_mod_map_keys: u8,
    /// Number of modifier map entries
    pub total_mod_map_keys: u8,
    /// First key the virtual modifier map covers
    pub first_v_mod_map_key: Keycode,
    /// Keys the virtual modifier map spans
    pub n_v_mod_map_keys: u8,
    /// Number of virtual modifier map entries
    pub total_v_mod_map_keys: u8,
    /// Virtual modifiers whose bindings follow
    pub virtual_mods: u16,
}

impl MapHeader {
    /// Encoded size of the fixed part
    pub const SIZE: usize = 40;

    /// Decode the fixed part at the cursor position
    pub fn parse(cur: &mut ReadCursor<'_>) -> Result<Self> {
        let response_type = cur.get_u8()?;
        let device_id = cur.get_u8()?;
        let sequence = cur.get_u16()?;
        let length = cur.get_u32()?;
        cur.skip(2)?;
        let min_key_code = cur.get_u8()?;
        let max_key_code = cur.get_u8()?;
        let present = cur.get_u16()?;
        let first_type = cur.get_u8()?;
        let n_types = cur.get_u8()?;
        let total_types = cur.get_u8()?;
        let first_key_sym = cur.get_u8()?;
        let total_syms = cur.get_u16()?;
        let n_key_syms = cur.get_u8()?;
        let first_key_action = cur.get_u8()?;
        let total_actions = cur.get_u16()?;
        let n_key_actions = cur.get_u8()?;
        let first_key_behavior = cur.get_u8()?;
        let n_key_behaviors = cur.get_u8()?;
        let total_key_behaviors = cur.get_u8()?;
        let first_key_explicit = cur.get_u8()?;
        let n_key_explicit = cur.get_u8()?;
        let total_key_explicit = cur.get_u8()?;
        let first_mod_map_key = cur.get_u8()?;
        let n_mod_map_keys = cur.get_u8()?;
        let total_mod_map_keys = cur.get_u8()?;
        let first_v_mod_map_key = cur.get_u8()?;
        let n_v_mod_map_keys = cur.get_u8()?;
        let total_v_mod_map_keys = cur.get_u8()?;
        cur.skip(1)?;
        let virtual_mods = cur.get_u16()?;
        Ok(Self {
            response_type,
            device_id,
            sequence,
            length,
            min_key_code,
            max_key_code,
            present,
            first_type,
            n_types,
            total_types,
            first_key_sym,
            total_syms,
            n_key_syms,
            first_key_action,
            total_actions,
            n_key_actions,
            first_key_behavior,
            n_key_behaviors,
            total_key_behaviors,
            first_key_explicit,
            n_key_explicit,
            total_key_explicit,
            first_mod_map_key,
            n_mod_map_keys,
            total_mod_map_keys,
            first_v_mod_map_key,
            n_v_mod_map_keys,
            total_v_mod_map_keys,
            virtual_mods,
        })
    }

    /// Encode the fixed part at the cursor position
    pub fn emit(&self, cur: &mut WriteCursor<'_>) -> Result<()> {
        cur.put_u8(self.response_type)?;
        cur.put_u8(self.device_id)?;
        cur.put_u16(self.sequence)?;
        cur.put_u32(self.length)?;
        cur.put_zeros(2)?;
        cur.put_u8(self.min_key_code)?;
        cur.put_u8(self.max_key_code)?;
        cur.put_u16(self.present)?;
        cur.put_u8(self.first_type)?;
        cur.put_u8(self.n_types)?;
        cur.put_u8(self.total_types)?;
        cur.put_u8(self.first_key_sym)?;
        cur.put_u16(self.total_syms)?;
        cur.put_u8(self.n_key_syms)?;
        cur.put_u8(self.first_key_action)?;
        cur.put_u16(self.total_actions)?;
        cur.put_u8(self.n_key_actions)?;
        cur.put_u8(self.first_key_behavior)?;
        cur.put_u8(self.n_key_behaviors)?;
        cur.put_u8(self.total_key_behaviors)?;
        cur.put_u8(self.first_key_explicit)?;
        cur.put_u8(self.n_key_explicit)?;
        cur.put_u8(self.total_key_explicit)?;
        cur.put_u8(self.first_mod_map_key)?;
        cur.put_u8(self.n_mod_map_keys)?;
        cur.put_u8(self.total_mod_map_keys)?;
        cur.put_u8(self.first_v_mod_map_key)?;
        cur.put_u8(self.n_v_mod_map_keys)?;
        cur.put_u8(self.total_v_mod_map_keys)?;
        cur.put_zeros(1)?;
        cur.put_u16(self.virtual_mods)
    }

    /// Parse parameters for the value list this header announces
    #[inline]
    pub fn layout(&self) -> MapLayout {
        MapLayout {
            present: self.present,
            n_types: self.n_types,
            n_key_syms: self.n_key_syms,
            n_key_actions: self.n_key_actions,
            total_actions: self.total_actions,
            total_key_behaviors: self.total_key_behaviors,
            virtual_mods: self.virtual_mods,
            total_key_explicit: self.total_key_explicit,
            total_mod_map_keys: self.total_mod_map_keys,
            total_v_mod_map_keys: self.total_v_mod_map_keys,
        }
    }
}

/// Counts and masks that govern a map value list's shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MapLayout {
    /// Sections present
    pub present: u16,
    /// Number of key type records
    pub n_types: u8,
    /// Number of symbol map records
    pub n_key_syms: u8,
    /// Number of per-key action counts
    pub n_key_actions: u8,
    /// Total actions across all keys
    pub total_actions: u16,
    /// Number of behavior entries
    pub total_key_behaviors: u8,
    /// Virtual modifiers whose bindings are listed
    pub virtual_mods: u16,
    /// Number of explicit entries
    pub total_key_explicit: u8,
    /// Number of modifier map entries
    pub total_mod_map_keys: u8,
    /// Number of virtual modifier map entries
    pub total_v_mod_map_keys: u8,
}

/// Borrowed view of a map value list
///
/// `T` is the key type record form: [`KeyType`] in replies, `SetKeyType`
/// when reading back a set-form body.
#[derive(Debug, Clone, Copy)]
pub struct MapParts<'a, T: WireView<'a> = KeyType<'a>> {
    layout: MapLayout,
    types: VarSlice<'a, T>,
    syms: VarSlice<'a, KeySymMap<'a>>,
    action_counts: FixedSlice<'a, u8>,
    actions: FixedSlice<'a, Action>,
    behaviors: FixedSlice<'a, SetBehavior>,
    vmods: FixedSlice<'a, u8>,
    explicit: FixedSlice<'a, SetExplicit>,
    modmap: FixedSlice<'a, KeyModMap>,
    vmodmap: FixedSlice<'a, KeyVModMap>,
}

impl<'a, T: WireView<'a>> MapParts<'a, T> {
    /// Decode a value list whose shape `layout` describes
    ///
    /// The per-key action counts must sum to the layout's total action
    /// count; a disagreement fails with `CountMismatch`.
    pub fn parse(cur: &mut ReadCursor<'a>, layout: &MapLayout) -> Result<Self> {
        let present = layout.present;

        let types = if present & MapPart::KEY_TYPES != 0 {
            VarSlice::parse(cur, layout.n_types as usize)?
        } else {
            VarSlice::empty()
        };
        let syms = if present & MapPart::KEY_SYMS != 0 {
            VarSlice::parse(cur, layout.n_key_syms as usize)?
        } else {
            VarSlice::empty()
        };
        let (action_counts, actions) = if present & MapPart::KEY_ACTIONS != 0 {
            let counts = FixedSlice::<u8>::parse(cur, layout.n_key_actions as usize)?;
            if sum_of(counts.bytes()) != layout.total_actions as usize {
                return Err(Error::CountMismatch);
            }
            let actions = FixedSlice::parse(cur, layout.total_actions as usize)?;
            (counts, actions)
        } else {
            (FixedSlice::empty(), FixedSlice::empty())
        };
        let behaviors = if present & MapPart::KEY_BEHAVIORS != 0 {
            FixedSlice::parse(cur, layout.total_key_behaviors as usize)?
        } else {
            FixedSlice::empty()
        };
        let vmods = if present & MapPart::VIRTUAL_MODS != 0 {
            FixedSlice::parse(cur, popcount(layout.virtual_mods as u32))?
        } else {
            FixedSlice::empty()
        };
        let explicit = if present & MapPart::EXPLICIT_COMPONENTS != 0 {
            FixedSlice::parse(cur, layout.total_key_explicit as usize)?
        } else {
            FixedSlice::empty()
        };
        let modmap = if present & MapPart::MODIFIER_MAP != 0 {
            FixedSlice::parse(cur, layout.total_mod_map_keys as usize)?
        } else {
            FixedSlice::empty()
        };
        let vmodmap = if present & MapPart::VIRTUAL_MOD_MAP != 0 {
            FixedSlice::parse(cur, layout.total_v_mod_map_keys as usize)?
        } else {
            FixedSlice::empty()
        };

        Ok(Self {
            layout: *layout,
            types,
            syms,
            action_counts,
            actions,
            behaviors,
            vmods,
            explicit,
            modmap,
            vmodmap,
        })
    }

    /// Decode a value list at the start of `buf`, returning the view and
    /// the number of bytes it occupies
    pub fn unpack(buf: &'a [u8], layout: &MapLayout) -> Result<(Self, usize)> {
        let mut cur = ReadCursor::new(buf);
        let view = Self::parse(&mut cur, layout)?;
        Ok((view, cur.position()))
    }

    /// Number of bytes the value list at the start of `buf` occupies
    #[inline]
    pub fn size_of(buf: &'a [u8], layout: &MapLayout) -> Result<usize> {
        Ok(Self::unpack(buf, layout)?.1)
    }

    /// Sections present in the list
    #[inline]
    pub fn present(&self) -> u16 {
        self.layout.present
    }

    /// Key type records
    #[inline]
    pub fn types(&self) -> VarSlice<'a, T> {
        self.types
    }

    /// Symbol map records
    #[inline]
    pub fn syms(&self) -> VarSlice<'a, KeySymMap<'a>> {
        self.syms
    }

    /// Per-key action counts, indexing the flattened action list
    #[inline]
    pub fn action_counts(&self) -> FixedSlice<'a, u8> {
        self.action_counts
    }

    /// Actions for every key, flattened in key order
    #[inline]
    pub fn actions(&self) -> FixedSlice<'a, Action> {
        self.actions
    }

    /// Actions belonging to the key at `ndx` of the action count run
    pub fn key_actions(&self, ndx: usize) -> Option<FixedSlice<'a, Action>> {
        let counts = self.action_counts.bytes();
        let count = *counts.get(ndx)? as usize;
        let start = sum_of(&counts[..ndx]);
        self.actions.slice(start, count)
    }

    /// Key behavior entries
    #[inline]
    pub fn behaviors(&self) -> FixedSlice<'a, SetBehavior> {
        self.behaviors
    }

    /// Virtual modifier bindings, one byte per set bit of the vmod mask
    #[inline]
    pub fn vmods(&self) -> FixedSlice<'a, u8> {
        self.vmods
    }

    /// Binding byte for the virtual modifier selected by `bit`
    #[inline]
    pub fn vmod_for(&self, bit: u16) -> Option<u8> {
        self.vmods
            .get(rank_of(self.layout.virtual_mods as u32, bit as u32)?)
    }

    /// Explicit component overrides
    #[inline]
    pub fn explicit(&self) -> FixedSlice<'a, SetExplicit> {
        self.explicit
    }

    /// Modifier map entries
    #[inline]
    pub fn modmap(&self) -> FixedSlice<'a, KeyModMap> {
        self.modmap
    }

    /// Virtual modifier map entries
    #[inline]
    pub fn vmodmap(&self) -> FixedSlice<'a, KeyVModMap> {
        self.vmodmap
    }
}

/// Per-key action counts paired with the flattened action list
#[derive(Debug, Clone, Copy)]
pub struct KeyActionsSpec<'a> {
    /// Number of actions per key
    pub counts: &'a [u8],
    /// Actions for every key, concatenated in key order
    pub actions: &'a [Action],
}

impl<'a> KeyActionsSpec<'a> {
    fn check_counts(&self) -> Result<()> {
        if self.counts.len() > u8::MAX as usize || self.actions.len() > u16::MAX as usize {
            return Err(Error::CountOverflow);
        }
        if sum_of(self.counts) != self.actions.len() {
            return Err(Error::CountMismatch);
        }
        Ok(())
    }
}

/// Virtual modifier binding bytes paired with their gating mask
#[derive(Debug, Clone, Copy)]
pub struct VModsSpec<'a> {
    /// Gating mask; one binding byte follows per set bit
    pub mask: u16,
    /// Binding bytes in ascending bit order
    pub values: &'a [u8],
}

impl<'a> VModsSpec<'a> {
    fn check_counts(&self) -> Result<()> {
        if self.values.len() != popcount(self.mask as u32) {
            return Err(Error::CountMismatch);
        }
        Ok(())
    }
}

/// Builder for a map value list in the set form
///
/// `None` sections are left out entirely; the computed present mask
/// carries a bit only for present sections.
#[derive(Debug, Clone, Copy, Default)]
pub struct MapPartsSpec<'a> {
    /// Key type records in the compact set form
    pub types: Option<&'a [SetKeyTypeSpec<'a>]>,
    /// Symbol map records
    pub syms: Option<&'a [KeySymMapSpec<'a>]>,
    /// Per-key action counts and the flattened action list
    pub actions: Option<KeyActionsSpec<'a>>,
    /// Key behavior entries
    pub behaviors: Option<&'a [SetBehavior]>,
    /// Virtual modifier bindings keyed by their mask
    pub vmods: Option<VModsSpec<'a>>,
    /// Explicit component overrides
    pub explicit: Option<&'a [SetExplicit]>,
    /// Modifier map entries
    pub modmap: Option<&'a [KeyModMap]>,
    /// Virtual modifier map entries
    pub vmodmap: Option<&'a [KeyVModMap]>,
}

impl<'a> MapPartsSpec<'a> {
    /// The present mask matching the present sections
    pub fn present(&self) -> u16 {
        let mut present = 0;
        if self.types.is_some() {
            present |= MapPart::KEY_TYPES;
        }
        if self.syms.is_some() {
            present |= MapPart::KEY_SYMS;
        }
        if self.actions.is_some() {
            present |= MapPart::KEY_ACTIONS;
        }
        if self.behaviors.is_some() {
            present |= MapPart::KEY_BEHAVIORS;
        }
        if self.vmods.is_some() {
            present |= MapPart::VIRTUAL_MODS;
        }
        if self.explicit.is_some() {
            present |= MapPart::EXPLICIT_COMPONENTS;
        }
        if self.modmap.is_some() {
            present |= MapPart::MODIFIER_MAP;
        }
        if self.vmodmap.is_some() {
            present |= MapPart::VIRTUAL_MOD_MAP;
        }
        present
    }

    fn check_counts(&self) -> Result<()> {
        if let Some(types) = self.types {
            if types.len() > u8::MAX as usize {
                return Err(Error::CountOverflow);
            }
        }
        if let Some(syms) = self.syms {
            if syms.len() > u8::MAX as usize {
                return Err(Error::CountOverflow);
            }
        }
        if let Some(actions) = &self.actions {
            actions.check_counts()?;
        }
        if let Some(behaviors) = self.behaviors {
            if behaviors.len() > u8::MAX as usize {
                return Err(Error::CountOverflow);
            }
        }
        if let Some(vmods) = &self.vmods {
            vmods.check_counts()?;
        }
        if let Some(explicit) = self.explicit {
            if explicit.len() > u8::MAX as usize {
                return Err(Error::CountOverflow);
            }
        }
        if let Some(modmap) = self.modmap {
            if modmap.len() > u8::MAX as usize {
                return Err(Error::CountOverflow);
            }
        }
        if let Some(vmodmap) = self.vmodmap {
            if vmodmap.len() > u8::MAX as usize {
                return Err(Error::CountOverflow);
            }
        }
        Ok(())
    }

    /// Counts and masks to carry in the fixed part for this list
    pub fn layout(&self) -> Result<MapLayout> {
        self.check_counts()?;
        Ok(MapLayout {
            present: self.present(),
            n_types: self.types.map_or(0, |t| t.len() as u8),
            n_key_syms: self.syms.map_or(0, |s| s.len() as u8),
            n_key_actions: self.actions.as_ref().map_or(0, |a| a.counts.len() as u8),
            total_actions: self.actions.as_ref().map_or(0, |a| a.actions.len() as u16),
            total_key_behaviors: self.behaviors.map_or(0, |b| b.len() as u8),
            virtual_mods: self.vmods.as_ref().map_or(0, |v| v.mask),
            total_key_explicit: self.explicit.map_or(0, |e| e.len() as u8),
            total_mod_map_keys: self.modmap.map_or(0, |m| m.len() as u8),
            total_v_mod_map_keys: self.vmodmap.map_or(0, |v| v.len() as u8),
        })
    }

    /// Encoded size of the value list
    pub fn wire_len(&self) -> Result<usize> {
        self.check_counts()?;
        let mut len = 0usize;
        let mut grow = |len: &mut usize, add: usize| -> Result<()> {
            *len = len.checked_add(add).ok_or(Error::Overflow)?;
            Ok(())
        };
        if let Some(types) = self.types {
            for ty in types {
                grow(&mut len, ty.wire_len()?)?;
            }
        }
        if let Some(syms) = self.syms {
            for sym in syms {
                grow(&mut len, sym.wire_len()?)?;
            }
        }
        if let Some(actions) = &self.actions {
            grow(&mut len, actions.counts.len())?;
            len = align_up(len, Action::ALIGN)?;
            grow(&mut len, run_len::<Action>(actions.actions.len())?)?;
        }
        if let Some(behaviors) = self.behaviors {
            grow(&mut len, run_len::<SetBehavior>(behaviors.len())?)?;
        }
        if let Some(vmods) = &self.vmods {
            grow(&mut len, vmods.values.len())?;
        }
        if let Some(explicit) = self.explicit {
            grow(&mut len, run_len::<SetExplicit>(explicit.len())?)?;
        }
        if let Some(modmap) = self.modmap {
            grow(&mut len, run_len::<KeyModMap>(modmap.len())?)?;
        }
        if let Some(vmodmap) = self.vmodmap {
            len = align_up(len, KeyVModMap::ALIGN)?;
            grow(&mut len, run_len::<KeyVModMap>(vmodmap.len())?)?;
        }
        Ok(len)
    }

    /// Encode the value list at the cursor position
    pub fn emit(&self, cur: &mut WriteCursor<'_>) -> Result<()> {
        self.check_counts()?;
        if let Some(types) = self.types {
            for ty in types {
                ty.emit(cur)?;
            }
        }
        if let Some(syms) = self.syms {
            for sym in syms {
                sym.emit(cur)?;
            }
        }
        if let Some(actions) = &self.actions {
            cur.put_bytes(actions.counts)?;
            put_run(cur, actions.actions)?;
        }
        if let Some(behaviors) = self.behaviors {
            put_run(cur, behaviors)?;
        }
        if let Some(vmods) = &self.vmods {
            cur.put_bytes(vmods.values)?;
        }
        if let Some(explicit) = self.explicit {
            put_run(cur, explicit)?;
        }
        if let Some(modmap) = self.modmap {
            put_run(cur, modmap)?;
        }
        if let Some(vmodmap) = self.vmodmap {
            put_run(cur, vmodmap)?;
        }
        Ok(())
    }

    /// Encode the value list into a fresh buffer
    pub fn serialize(&self) -> Result<Vec<u8>> {
        serialize_exact(self.wire_len()?, |cur| self.emit(cur))
    }
}

/// Component bits for the keyboard-by-name reported mask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GbnDetail;

impl GbnDetail {
    /// Key types
    pub const TYPES: u8 = 0x01;
    /// Compatibility map
    pub const COMPAT_MAP: u8 = 0x02;
    /// Client-side symbols
    pub const CLIENT_SYMBOLS: u8 = 0x04;
    /// Server-side symbols
    pub const SERVER_SYMBOLS: u8 = 0x08;
    /// Indicator maps
    pub const INDICATOR_MAPS: u8 = 0x10;
    /// Key names and aliases
    pub const KEY_NAMES: u8 = 0x20;
    /// Keyboard geometry
    pub const GEOMETRY: u8 = 0x40;
    /// Remaining symbolic names
    pub const OTHER_NAMES: u8 = 0x80;
}

/// Fixed part of a keyboard-by-name reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KbdByNameHeader {
    /// Reply discriminant byte
    pub response_type: u8,
    /// Keyboard the reply describes
    pub device_id: u8,
    /// Low bits of the request sequence number
    pub sequence: u16,
    /// Remaining reply length in 4-byte units
    pub length: u32,
    /// Lowest keycode in use
    pub min_key_code: Keycode,
    /// Highest keycode in use
    pub max_key_code: Keycode,
    /// The server loaded the keymap
    pub loaded: bool,
    /// The keymap became the new active keyboard description
    pub new_keyboard: bool,
    /// Components the server found
    pub found: u16,
    /// Components whose sub-replies follow
    pub reported: u16,
}

impl KbdByNameHeader {
    /// Encoded size of the fixed part
    pub const SIZE: usize = 32;

    /// Decode the fixed part at the cursor position
    pub fn parse(cur: &mut ReadCursor<'_>) -> Result<Self> {
        let response_type = cur.get_u8()?;
        let device_id = cur.get_u8()?;
        let sequence = cur.get_u16()?;
        let length = cur.get_u32()?;
        let min_key_code = cur.get_u8()?;
        let max_key_code = cur.get_u8()?;
        let loaded = cur.get_u8()? != 0;
        let new_keyboard = cur.get_u8()? != 0;
        let found = cur.get_u16()?;
        let reported = cur.get_u16()?;
        cur.skip(16)?;
        Ok(Self {
            response_type,
            device_id,
            sequence,
            length,
            min_key_code,
            max_key_code,
            loaded,
            new_keyboard,
            found,
            reported,
        })
    }

    /// Encode the fixed part at the cursor position
    pub fn emit(&self, cur: &mut WriteCursor<'_>) -> Result<()> {
        cur.put_u8(self.response_type)?;
        cur.put_u8(self.device_id)?;
        cur.put_u16(self.sequence)?;
        cur.put_u32(self.length)?;
        cur.put_u8(self.min_key_code)?;
        cur.put_u8(self.max_key_code)?;
        cur.put_u8(self.loaded as u8)?;
        cur.put_u8(self.new_keyboard as u8)?;
        cur.put_u16(self.found)?;
        cur.put_u16(self.reported)?;
        cur.put_zeros(16)
    }
}

/// The sub-replies concatenated inside a keyboard-by-name reply
///
/// Each present component is a whole reply of its own kind, header
/// included, padded to a four-byte boundary.
#[derive(Debug, Clone, Copy, Default)]
pub struct KbdByNameReplies<'a> {
    /// Keyboard map, under any of the types or symbols bits
    pub map: Option<(MapHeader, MapParts<'a>)>,
    /// Compatibility map
    pub compat: Option<(CompatHeader, CompatParts<'a>)>,
    /// Indicator maps
    pub indicator_maps: Option<(IndicatorMapHeader, IndicatorMaps<'a>)>,
    /// Symbolic names, under the key names or other names bits
    pub names: Option<(NamesHeader, NameList<'a>)>,
    /// Keyboard geometry
    pub geometry: Option<(GeometryHeader, KbGeometry<'a>)>,
}

impl<'a> KbdByNameReplies<'a> {
    /// Decode the sub-replies selected by `reported`
    pub fn parse(cur: &mut ReadCursor<'a>, reported: u16) -> Result<Self> {
        let map_bits =
            (GbnDetail::TYPES | GbnDetail::CLIENT_SYMBOLS | GbnDetail::SERVER_SYMBOLS) as u16;
        let map = if reported & map_bits != 0 {
            let header = MapHeader::parse(cur)?;
            let parts = MapParts::parse(cur, &header.layout())?;
            cur.pad_to(4)?;
            Some((header, parts))
        } else {
            None
        };
        let compat = if reported & GbnDetail::COMPAT_MAP as u16 != 0 {
            let header = CompatHeader::parse(cur)?;
            let parts =
                CompatParts::parse(cur, header.n_si_rtrn as usize, header.groups_rtrn)?;
            cur.pad_to(4)?;
            Some((header, parts))
        } else {
            None
        };
        let indicator_maps = if reported & GbnDetail::INDICATOR_MAPS as u16 != 0 {
            let header = IndicatorMapHeader::parse(cur)?;
            let maps = IndicatorMaps::parse(cur, header.which)?;
            cur.pad_to(4)?;
            Some((header, maps))
        } else {
            None
        };
        let name_bits = (GbnDetail::KEY_NAMES | GbnDetail::OTHER_NAMES) as u16;
        let names = if reported & name_bits != 0 {
            let header = NamesHeader::parse(cur)?;
            let list = NameList::parse(cur, &header.layout())?;
            cur.pad_to(4)?;
            Some((header, list))
        } else {
            None
        };
        let geometry = if reported & GbnDetail::GEOMETRY as u16 != 0 {
            let header = GeometryHeader::parse(cur)?;
            let body = KbGeometry::parse(cur, &header.layout())?;
            cur.pad_to(4)?;
            Some((header, body))
        } else {
            None
        };
        Ok(Self {
            map,
            compat,
            indicator_maps,
            names,
            geometry,
        })
    }

    /// Decode the sub-replies at the start of `buf`, returning the views
    /// and the number of bytes they occupy
    pub fn unpack(buf: &'a [u8], reported: u16) -> Result<(Self, usize)> {
        let mut cur = ReadCursor::new(buf);
        let views = Self::parse(&mut cur, reported)?;
        Ok((views, cur.position()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compat::CompatPartsSpec;
    use crate::keytype::KeyTypeSpec;
    use crate::types::{
        Behavior, Group, IndicatorMap, KtMapEntry, KtSetMapEntry, ModMask, SymInterp,
    };
    use std::vec::Vec;

    fn set_types() -> [KtSetMapEntry; 2] {
        [
            KtSetMapEntry {
                level: 1,
                real_mods: ModMask::SHIFT,
                virtual_mods: 0,
            },
            KtSetMapEntry {
                level: 1,
                real_mods: ModMask::LOCK,
                virtual_mods: 0,
            },
        ]
    }

    #[test]
    fn test_map_header_roundtrip() {
        let hdr = MapHeader {
            response_type: 1,
            device_id: 3,
            sequence: 0x4242,
            length: 50,
            min_key_code: 8,
            max_key_code: 255,
            present: MapPart::ALL,
            first_type: 0,
            n_types: 12,
            total_types: 12,
            first_key_sym: 8,
            total_syms: 500,
            n_key_syms: 248,
            first_key_action: 8,
            total_actions: 100,
            n_key_actions: 248,
            first_key_behavior: 8,
            n_key_behaviors: 248,
            total_key_behaviors: 2,
            first_key_explicit: 8,
            n_key_explicit: 248,
            total_key_explicit: 3,
            first_mod_map_key: 8,
            n_mod_map_keys: 248,
            total_mod_map_keys: 8,
            first_v_mod_map_key: 8,
            n_v_mod_map_keys: 248,
            total_v_mod_map_keys: 4,
            virtual_mods: 0xFFFF,
        };
        let mut buf = std::vec![0u8; MapHeader::SIZE];
        let mut cur = WriteCursor::new(&mut buf);
        hdr.emit(&mut cur).unwrap();
        assert_eq!(cur.remaining(), 0);

        let mut cur = ReadCursor::new(&buf);
        assert_eq!(MapHeader::parse(&mut cur).unwrap(), hdr);
        assert_eq!(cur.position(), MapHeader::SIZE);
    }

    #[test]
    fn test_set_form_all_sections_roundtrip() {
        let entries = set_types();
        let types = [SetKeyTypeSpec {
            mask: ModMask::SHIFT,
            real_mods: ModMask::SHIFT,
            virtual_mods: 0,
            num_levels: 2,
            entries: &entries,
            preserve: None,
        }];
        let syms = [KeySymMapSpec {
            kt_index: [1, 0, 0, 0],
            group_info: 1,
            width: 2,
            syms: &[0x61, 0x41],
        }];
        let actions = KeyActionsSpec {
            counts: &[2, 0, 1],
            actions: &[Action::default(); 3],
        };
        let behaviors = [SetBehavior {
            keycode: 64,
            behavior: Behavior { kind: 1, data: 0 },
        }];
        let vmods = VModsSpec {
            mask: 0b101,
            values: &[ModMask::MOD1, ModMask::MOD4],
        };
        let explicit = [SetExplicit {
            keycode: 64,
            explicit: 0x0F,
        }];
        let modmap = [KeyModMap {
            keycode: 64,
            mods: ModMask::CONTROL,
        }];
        let vmodmap = [KeyVModMap {
            keycode: 64,
            vmods: 0b100,
        }];
        let spec = MapPartsSpec {
            types: Some(&types),
            syms: Some(&syms),
            actions: Some(actions),
            behaviors: Some(&behaviors),
            vmods: Some(vmods),
            explicit: Some(&explicit),
            modmap: Some(&modmap),
            vmodmap: Some(&vmodmap),
        };
        assert_eq!(spec.present(), MapPart::ALL);

        // types 16, syms 16, counts 3 + pad 1 + actions 24, behaviors 4,
        // vmods 2, explicit 2, modmap 2, vmodmap 4
        assert_eq!(spec.wire_len().unwrap(), 16 + 16 + 28 + 4 + 2 + 2 + 2 + 4);

        let bytes = spec.serialize().unwrap();
        let layout = spec.layout().unwrap();
        let (view, consumed) =
            MapParts::<crate::keytype::SetKeyType>::unpack(&bytes, &layout).unwrap();
        assert_eq!(consumed, bytes.len());
        assert_eq!(view.present(), MapPart::ALL);
        assert_eq!(view.types().len(), 1);
        assert_eq!(view.syms().len(), 1);
        assert_eq!(view.action_counts().bytes(), &[2, 0, 1]);
        assert_eq!(view.actions().len(), 3);
        assert_eq!(view.behaviors().get(0), Some(behaviors[0]));
        assert_eq!(view.vmods().bytes(), &[ModMask::MOD1, ModMask::MOD4]);
        assert_eq!(view.vmod_for(0b100), Some(ModMask::MOD4));
        assert_eq!(view.vmod_for(0b010), None);
        assert_eq!(view.explicit().get(0), Some(explicit[0]));
        assert_eq!(view.modmap().get(0), Some(modmap[0]));
        assert_eq!(view.vmodmap().get(0), Some(vmodmap[0]));

        let ty = view.types().iter().next().unwrap();
        assert_eq!(ty.entries().get(1), Some(entries[1]));
        let sym = view.syms().iter().next().unwrap();
        assert_eq!(sym.sym_at(0, 1), Some(0x41));
    }

    #[test]
    fn test_get_form_types_only() {
        let map = [KtMapEntry {
            active: true,
            mods_mask: ModMask::SHIFT,
            level: 1,
            mods_mods: ModMask::SHIFT,
            mods_vmods: 0,
        }];
        let ty = KeyTypeSpec {
            mods_mask: ModMask::SHIFT,
            mods_mods: ModMask::SHIFT,
            mods_vmods: 0,
            num_levels: 2,
            map: &map,
            preserve: None,
        };
        let bytes = ty.serialize().unwrap();
        let layout = MapLayout {
            present: MapPart::KEY_TYPES,
            n_types: 1,
            ..Default::default()
        };
        let (view, consumed) = MapParts::<KeyType>::unpack(&bytes, &layout).unwrap();
        assert_eq!(consumed, bytes.len());
        let ty = view.types().iter().next().unwrap();
        assert_eq!(ty.num_levels, 2);
        assert_eq!(ty.map().get(0), Some(map[0]));
        assert!(view.syms().is_empty());
        assert!(view.actions().is_empty());
    }

    #[test]
    fn test_action_partitions() {
        let actions = [
            Action {
                kind: 1,
                data: [1, 0, 0, 0, 0, 0, 0],
            },
            Action {
                kind: 2,
                data: [2, 0, 0, 0, 0, 0, 0],
            },
            Action {
                kind: 3,
                data: [3, 0, 0, 0, 0, 0, 0],
            },
        ];
        let spec = MapPartsSpec {
            actions: Some(KeyActionsSpec {
                counts: &[2, 0, 1],
                actions: &actions,
            }),
            ..Default::default()
        };
        let bytes = spec.serialize().unwrap();
        let layout = spec.layout().unwrap();
        let (view, _) = MapParts::<KeyType>::unpack(&bytes, &layout).unwrap();

        let first = view.key_actions(0).unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first.get(0), Some(actions[0]));
        assert!(view.key_actions(1).unwrap().is_empty());
        assert_eq!(view.key_actions(2).unwrap().get(0), Some(actions[2]));
        assert!(view.key_actions(3).is_none());
    }

    #[test]
    fn test_action_sum_disagrees_with_total() {
        let spec = MapPartsSpec {
            actions: Some(KeyActionsSpec {
                counts: &[1, 1],
                actions: &[Action::default(); 2],
            }),
            ..Default::default()
        };
        let bytes = spec.serialize().unwrap();
        let mut layout = spec.layout().unwrap();
        layout.total_actions = 3;
        let err = MapParts::<KeyType>::unpack(&bytes, &layout).unwrap_err();
        assert_eq!(err, Error::CountMismatch);
    }

    #[test]
    fn test_spec_count_mismatches() {
        let spec = MapPartsSpec {
            actions: Some(KeyActionsSpec {
                counts: &[2],
                actions: &[Action::default(); 3],
            }),
            ..Default::default()
        };
        assert_eq!(spec.wire_len(), Err(Error::CountMismatch));

        let spec = MapPartsSpec {
            vmods: Some(VModsSpec {
                mask: 0b11,
                values: &[0],
            }),
            ..Default::default()
        };
        assert_eq!(spec.serialize(), Err(Error::CountMismatch));
    }

    #[test]
    fn test_vmod_run_padding_before_vmodmap() {
        let spec = MapPartsSpec {
            vmods: Some(VModsSpec {
                mask: 0b1,
                values: &[ModMask::MOD3],
            }),
            vmodmap: Some(&[KeyVModMap {
                keycode: 100,
                vmods: 0b1,
            }]),
            ..Default::default()
        };
        // one vmod byte, one pad byte, then the 4-byte vmodmap entry
        assert_eq!(spec.wire_len().unwrap(), 6);
        let bytes = spec.serialize().unwrap();
        assert_eq!(bytes[0], ModMask::MOD3);
        assert_eq!(bytes[1], 0);

        let layout = spec.layout().unwrap();
        let (view, consumed) = MapParts::<KeyType>::unpack(&bytes, &layout).unwrap();
        assert_eq!(consumed, 6);
        assert_eq!(view.vmodmap().get(0).unwrap().keycode, 100);
    }

    #[test]
    fn test_kbd_by_name_header_roundtrip() {
        let hdr = KbdByNameHeader {
            response_type: 1,
            device_id: 3,
            sequence: 11,
            length: 200,
            min_key_code: 8,
            max_key_code: 255,
            loaded: true,
            new_keyboard: false,
            found: 0x3F,
            reported: 0x3F,
        };
        let mut buf = std::vec![0u8; KbdByNameHeader::SIZE];
        let mut cur = WriteCursor::new(&mut buf);
        hdr.emit(&mut cur).unwrap();
        assert_eq!(cur.remaining(), 0);

        let mut cur = ReadCursor::new(&buf);
        assert_eq!(KbdByNameHeader::parse(&mut cur).unwrap(), hdr);
    }

    #[test]
    fn test_kbd_by_name_replies_walk() {
        let mut buf = Vec::new();

        // Map sub-reply: one key type, nothing else
        let map = [KtMapEntry {
            active: true,
            mods_mask: ModMask::SHIFT,
            level: 1,
            mods_mods: ModMask::SHIFT,
            mods_vmods: 0,
        }];
        let ty = KeyTypeSpec {
            mods_mask: ModMask::SHIFT,
            mods_mods: ModMask::SHIFT,
            mods_vmods: 0,
            num_levels: 2,
            map: &map,
            preserve: None,
        };
        let map_hdr = MapHeader {
            response_type: 1,
            device_id: 3,
            present: MapPart::KEY_TYPES,
            n_types: 1,
            ..Default::default()
        };
        let mut hdr_bytes = std::vec![0u8; MapHeader::SIZE];
        let mut wr = WriteCursor::new(&mut hdr_bytes);
        map_hdr.emit(&mut wr).unwrap();
        buf.extend_from_slice(&hdr_bytes);
        buf.extend_from_slice(&ty.serialize().unwrap());

        // Compat sub-reply: two interpretations, one group
        let si = [SymInterp::default(), SymInterp::default()];
        let group_mods = [crate::types::ModDef::default()];
        let compat = CompatPartsSpec {
            groups: Group::ONE,
            si: &si,
            group_mods: &group_mods,
        };
        let compat_hdr = CompatHeader {
            response_type: 1,
            device_id: 3,
            groups_rtrn: Group::ONE,
            n_si_rtrn: 2,
            n_total_si: 2,
            ..Default::default()
        };
        let mut hdr_bytes = std::vec![0u8; CompatHeader::SIZE];
        let mut wr = WriteCursor::new(&mut hdr_bytes);
        compat_hdr.emit(&mut wr).unwrap();
        buf.extend_from_slice(&hdr_bytes);
        buf.extend_from_slice(&compat.serialize().unwrap());

        // Indicator sub-reply: one map
        let ind_hdr = IndicatorMapHeader {
            response_type: 1,
            device_id: 3,
            which: 0b10,
            n_indicators: 2,
            ..Default::default()
        };
        let mut hdr_bytes = std::vec![0u8; IndicatorMapHeader::SIZE];
        let mut wr = WriteCursor::new(&mut hdr_bytes);
        ind_hdr.emit(&mut wr).unwrap();
        buf.extend_from_slice(&hdr_bytes);
        let maps = crate::indicator::IndicatorMapsSpec {
            which: 0b10,
            maps: &[IndicatorMap::default()],
        };
        buf.extend_from_slice(&maps.serialize().unwrap());

        let reported = (GbnDetail::TYPES | GbnDetail::COMPAT_MAP | GbnDetail::INDICATOR_MAPS)
            as u16;
        let (views, consumed) = KbdByNameReplies::unpack(&buf, reported).unwrap();
        assert_eq!(consumed, buf.len());

        let (map_hdr_back, map_parts) = views.map.unwrap();
        assert_eq!(map_hdr_back, map_hdr);
        assert_eq!(map_parts.types().len(), 1);

        let (compat_hdr_back, compat_parts) = views.compat.unwrap();
        assert_eq!(compat_hdr_back.n_si_rtrn, 2);
        assert_eq!(compat_parts.si().len(), 2);
        assert_eq!(compat_parts.group_mods().len(), 1);

        let (ind_hdr_back, ind_maps) = views.indicator_maps.unwrap();
        assert_eq!(ind_hdr_back.which, 0b10);
        assert_eq!(ind_maps.maps().len(), 1);

        assert!(views.names.is_none());
        assert!(views.geometry.is_none());
    }
}
