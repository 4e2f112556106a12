//! Fixed-size protocol records and shared scalar types
//!
//! Each record here has an exact wire layout, interior pad bytes included,
//! and implements [`Wire`] in field order. Writers emit zero for every pad
//! byte; readers skip pads without interpreting them.

use crate::cursor::{ReadCursor, WriteCursor};
use crate::error::Result;
use crate::wire::Wire;

/// Interned string identifier assigned by the server
pub type Atom = u32;

/// Hardware key number
pub type Keycode = u8;

/// Symbol bound to a key position
pub type KeySym = u32;

/// Device specifier field values
///
/// A device spec is either a device id from the input extension or one of
/// these core-device escapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceSpec;

impl DeviceSpec {
    /// Address the core keyboard regardless of its id
    pub const USE_CORE_KBD: u16 = 0x100;

    /// Address the core pointer regardless of its id
    pub const USE_CORE_PTR: u16 = 0x200;
}

/// Core modifier mask bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModMask;

impl ModMask {
    /// Shift modifier (bit 0)
    pub const SHIFT: u8 = 0x01;
    /// Lock modifier (bit 1)
    pub const LOCK: u8 = 0x02;
    /// Control modifier (bit 2)
    pub const CONTROL: u8 = 0x04;
    /// Mod1 (bit 3)
    pub const MOD1: u8 = 0x08;
    /// Mod2 (bit 4)
    pub const MOD2: u8 = 0x10;
    /// Mod3 (bit 5)
    pub const MOD3: u8 = 0x20;
    /// Mod4 (bit 6)
    pub const MOD4: u8 = 0x40;
    /// Mod5 (bit 7)
    pub const MOD5: u8 = 0x80;
}

/// Keyboard group mask bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Group;

impl Group {
    /// First group (bit 0)
    pub const ONE: u8 = 0x01;
    /// Second group (bit 1)
    pub const TWO: u8 = 0x02;
    /// Third group (bit 2)
    pub const THREE: u8 = 0x04;
    /// Fourth group (bit 3)
    pub const FOUR: u8 = 0x08;
}

/// Per-client flag bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerClientFlag;

impl PerClientFlag {
    /// Report key release only on physical release
    pub const DETECTABLE_AUTO_REPEAT: u32 = 0x01;
    /// Grabs see extension state rather than core state
    pub const GRABS_USE_XKB_STATE: u32 = 0x02;
    /// Reset controls when the client disconnects
    pub const AUTO_RESET_CONTROLS: u32 = 0x04;
    /// Event state fields use extension state while grabbed
    pub const LOOKUP_STATE_WHEN_GRABBED: u32 = 0x08;
    /// SendEvent preserves extension state fields
    pub const SEND_EVENT_USES_XKB_STATE: u32 = 0x10;
}

/// Modifier definition: core mask, real modifiers and virtual modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModDef {
    /// Effective core modifier mask
    pub mask: u8,
    /// Real modifiers bound
    pub real_mods: u8,
    /// Virtual modifiers bound
    pub vmods: u16,
}

impl Wire for ModDef {
    const SIZE: usize = 4;
    const ALIGN: usize = 2;

    #[inline]
    fn read(cur: &mut ReadCursor<'_>) -> Result<Self> {
        Ok(Self {
            mask: cur.get_u8()?,
            real_mods: cur.get_u8()?,
            vmods: cur.get_u16()?,
        })
    }

    #[inline]
    fn write(&self, cur: &mut WriteCursor<'_>) -> Result<()> {
        cur.put_u8(self.mask)?;
        cur.put_u8(self.real_mods)?;
        cur.put_u16(self.vmods)
    }
}

/// One shift-level mapping entry of a key type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KtMapEntry {
    /// Entry participates in level computation
    pub active: bool,
    /// Core modifier mask matched by this entry
    pub mods_mask: u8,
    /// Shift level produced on a match
    pub level: u8,
    /// Real modifiers matched
    pub mods_mods: u8,
    /// Virtual modifiers matched
    pub mods_vmods: u16,
}

impl Wire for KtMapEntry {
    const SIZE: usize = 8;
    const ALIGN: usize = 2;

    #[inline]
    fn read(cur: &mut ReadCursor<'_>) -> Result<Self> {
        let entry = Self {
            active: cur.get_u8()? != 0,
            mods_mask: cur.get_u8()?,
            level: cur.get_u8()?,
            mods_mods: cur.get_u8()?,
            mods_vmods: cur.get_u16()?,
        };
        cur.skip(2)?;
        Ok(entry)
    }

    #[inline]
    fn write(&self, cur: &mut WriteCursor<'_>) -> Result<()> {
        cur.put_u8(self.active as u8)?;
        cur.put_u8(self.mods_mask)?;
        cur.put_u8(self.level)?;
        cur.put_u8(self.mods_mods)?;
        cur.put_u16(self.mods_vmods)?;
        cur.put_zeros(2)
    }
}

/// Level mapping entry in the compact form used when setting key types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KtSetMapEntry {
    /// Shift level produced on a match
    pub level: u8,
    /// Real modifiers matched
    pub real_mods: u8,
    /// Virtual modifiers matched
    pub virtual_mods: u16,
}

impl Wire for KtSetMapEntry {
    const SIZE: usize = 4;
    const ALIGN: usize = 2;

    #[inline]
    fn read(cur: &mut ReadCursor<'_>) -> Result<Self> {
        Ok(Self {
            level: cur.get_u8()?,
            real_mods: cur.get_u8()?,
            virtual_mods: cur.get_u16()?,
        })
    }

    #[inline]
    fn write(&self, cur: &mut WriteCursor<'_>) -> Result<()> {
        cur.put_u8(self.level)?;
        cur.put_u8(self.real_mods)?;
        cur.put_u16(self.virtual_mods)
    }
}

/// Symbol interpretation: maps a keysym and modifier pattern to behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SymInterp {
    /// Keysym this interpretation applies to
    pub sym: KeySym,
    /// Real modifiers matched
    pub mods: u8,
    /// Match operation against the modifier set
    pub match_op: u8,
    /// Virtual modifier bound by this interpretation
    pub virtual_mod: u8,
    /// Interpretation flags
    pub flags: u8,
}

impl Wire for SymInterp {
    const SIZE: usize = 8;
    const ALIGN: usize = 4;

    #[inline]
    fn read(cur: &mut ReadCursor<'_>) -> Result<Self> {
        Ok(Self {
            sym: cur.get_u32()?,
            mods: cur.get_u8()?,
            match_op: cur.get_u8()?,
            virtual_mod: cur.get_u8()?,
            flags: cur.get_u8()?,
        })
    }

    #[inline]
    fn write(&self, cur: &mut WriteCursor<'_>) -> Result<()> {
        cur.put_u32(self.sym)?;
        cur.put_u8(self.mods)?;
        cur.put_u8(self.match_op)?;
        cur.put_u8(self.virtual_mod)?;
        cur.put_u8(self.flags)
    }
}

/// Key behavior: discriminant plus one argument byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Behavior {
    /// Behavior discriminant
    pub kind: u8,
    /// Behavior argument byte
    pub data: u8,
}

impl Wire for Behavior {
    const SIZE: usize = 2;
    const ALIGN: usize = 1;

    #[inline]
    fn read(cur: &mut ReadCursor<'_>) -> Result<Self> {
        Ok(Self {
            kind: cur.get_u8()?,
            data: cur.get_u8()?,
        })
    }

    #[inline]
    fn write(&self, cur: &mut WriteCursor<'_>) -> Result<()> {
        cur.put_u8(self.kind)?;
        cur.put_u8(self.data)
    }
}

/// Per-key behavior assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SetBehavior {
    /// Key the behavior applies to
    pub keycode: Keycode,
    /// The behavior assigned
    pub behavior: Behavior,
}

impl Wire for SetBehavior {
    const SIZE: usize = 4;
    const ALIGN: usize = 1;

    #[inline]
    fn read(cur: &mut ReadCursor<'_>) -> Result<Self> {
        let keycode = cur.get_u8()?;
        let behavior = Behavior::read(cur)?;
        cur.skip(1)?;
        Ok(Self { keycode, behavior })
    }

    #[inline]
    fn write(&self, cur: &mut WriteCursor<'_>) -> Result<()> {
        cur.put_u8(self.keycode)?;
        self.behavior.write(cur)?;
        cur.put_zeros(1)
    }
}

/// Per-key explicit-component override flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SetExplicit {
    /// Key the override applies to
    pub keycode: Keycode,
    /// Components the client controls explicitly
    pub explicit: u8,
}

impl Wire for SetExplicit {
    const SIZE: usize = 2;
    const ALIGN: usize = 1;

    #[inline]
    fn read(cur: &mut ReadCursor<'_>) -> Result<Self> {
        Ok(Self {
            keycode: cur.get_u8()?,
            explicit: cur.get_u8()?,
        })
    }

    #[inline]
    fn write(&self, cur: &mut WriteCursor<'_>) -> Result<()> {
        cur.put_u8(self.keycode)?;
        cur.put_u8(self.explicit)
    }
}

/// Key to core-modifier binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyModMap {
    /// Key carrying the modifiers
    pub keycode: Keycode,
    /// Core modifier mask bound to the key
    pub mods: u8,
}

impl Wire for KeyModMap {
    const SIZE: usize = 2;
    const ALIGN: usize = 1;

    #[inline]
    fn read(cur: &mut ReadCursor<'_>) -> Result<Self> {
        Ok(Self {
            keycode: cur.get_u8()?,
            mods: cur.get_u8()?,
        })
    }

    #[inline]
    fn write(&self, cur: &mut WriteCursor<'_>) -> Result<()> {
        cur.put_u8(self.keycode)?;
        cur.put_u8(self.mods)
    }
}

/// Key to virtual-modifier binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyVModMap {
    /// Key carrying the virtual modifiers
    pub keycode: Keycode,
    /// Virtual modifier mask bound to the key
    pub vmods: u16,
}

impl Wire for KeyVModMap {
    const SIZE: usize = 4;
    const ALIGN: usize = 2;

    #[inline]
    fn read(cur: &mut ReadCursor<'_>) -> Result<Self> {
        let keycode = cur.get_u8()?;
        cur.skip(1)?;
        Ok(Self {
            keycode,
            vmods: cur.get_u16()?,
        })
    }

    #[inline]
    fn write(&self, cur: &mut WriteCursor<'_>) -> Result<()> {
        cur.put_u8(self.keycode)?;
        cur.put_zeros(1)?;
        cur.put_u16(self.vmods)
    }
}

/// Key action: discriminant byte plus seven argument bytes
///
/// The argument layout depends on the discriminant; this layer carries the
/// bytes through uninterpreted. Runs of actions start on a 4-byte boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Action {
    /// Action discriminant
    pub kind: u8,
    /// Argument bytes, meaning determined by `kind`
    pub data: [u8; 7],
}

impl Wire for Action {
    const SIZE: usize = 8;
    const ALIGN: usize = 4;

    #[inline]
    fn read(cur: &mut ReadCursor<'_>) -> Result<Self> {
        let kind = cur.get_u8()?;
        let mut data = [0u8; 7];
        data.copy_from_slice(cur.take(7)?);
        Ok(Self { kind, data })
    }

    #[inline]
    fn write(&self, cur: &mut WriteCursor<'_>) -> Result<()> {
        cur.put_u8(self.kind)?;
        cur.put_bytes(&self.data)
    }
}

/// Indicator map: what keyboard state an indicator reflects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndicatorMap {
    /// Indicator behavior flags
    pub flags: u8,
    /// Which group components drive the indicator
    pub which_groups: u8,
    /// Group mask
    pub groups: u8,
    /// Which modifier components drive the indicator
    pub which_mods: u8,
    /// Effective modifier mask
    pub mods: u8,
    /// Real modifier mask
    pub real_mods: u8,
    /// Virtual modifier mask
    pub vmods: u16,
    /// Boolean controls driving the indicator
    pub ctrls: u32,
}

impl Wire for IndicatorMap {
    const SIZE: usize = 12;
    const ALIGN: usize = 4;

    #[inline]
    fn read(cur: &mut ReadCursor<'_>) -> Result<Self> {
        Ok(Self {
            flags: cur.get_u8()?,
            which_groups: cur.get_u8()?,
            groups: cur.get_u8()?,
            which_mods: cur.get_u8()?,
            mods: cur.get_u8()?,
            real_mods: cur.get_u8()?,
            vmods: cur.get_u16()?,
            ctrls: cur.get_u32()?,
        })
    }

    #[inline]
    fn write(&self, cur: &mut WriteCursor<'_>) -> Result<()> {
        cur.put_u8(self.flags)?;
        cur.put_u8(self.which_groups)?;
        cur.put_u8(self.groups)?;
        cur.put_u8(self.which_mods)?;
        cur.put_u8(self.mods)?;
        cur.put_u8(self.real_mods)?;
        cur.put_u16(self.vmods)?;
        cur.put_u32(self.ctrls)
    }
}

/// Four-character key name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyName {
    /// Name bytes, NUL-padded
    pub name: [u8; 4],
}

impl Wire for KeyName {
    const SIZE: usize = 4;
    const ALIGN: usize = 1;

    #[inline]
    fn read(cur: &mut ReadCursor<'_>) -> Result<Self> {
        let mut name = [0u8; 4];
        name.copy_from_slice(cur.take(4)?);
        Ok(Self { name })
    }

    #[inline]
    fn write(&self, cur: &mut WriteCursor<'_>) -> Result<()> {
        cur.put_bytes(&self.name)
    }
}

/// Alias from one key name to another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyAlias {
    /// Canonical key name
    pub real: [u8; 4],
    /// Alias name
    pub alias: [u8; 4],
}

impl Wire for KeyAlias {
    const SIZE: usize = 8;
    const ALIGN: usize = 1;

    #[inline]
    fn read(cur: &mut ReadCursor<'_>) -> Result<Self> {
        let mut real = [0u8; 4];
        real.copy_from_slice(cur.take(4)?);
        let mut alias = [0u8; 4];
        alias.copy_from_slice(cur.take(4)?);
        Ok(Self { real, alias })
    }

    #[inline]
    fn write(&self, cur: &mut WriteCursor<'_>) -> Result<()> {
        cur.put_bytes(&self.real)?;
        cur.put_bytes(&self.alias)
    }
}

/// Point in keyboard-geometry units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    /// Horizontal position
    pub x: i16,
    /// Vertical position
    pub y: i16,
}

impl Wire for Point {
    const SIZE: usize = 4;
    const ALIGN: usize = 2;

    #[inline]
    fn read(cur: &mut ReadCursor<'_>) -> Result<Self> {
        Ok(Self {
            x: cur.get_i16()?,
            y: cur.get_i16()?,
        })
    }

    #[inline]
    fn write(&self, cur: &mut WriteCursor<'_>) -> Result<()> {
        cur.put_i16(self.x)?;
        cur.put_i16(self.y)
    }
}

/// Physical key within a geometry row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Key {
    /// Key name, NUL-padded
    pub name: [u8; 4],
    /// Gap before the key, in geometry units
    pub gap: i16,
    /// Index of the key's shape
    pub shape_ndx: u8,
    /// Index of the key's color
    pub color_ndx: u8,
}

impl Wire for Key {
    const SIZE: usize = 8;
    const ALIGN: usize = 2;

    #[inline]
    fn read(cur: &mut ReadCursor<'_>) -> Result<Self> {
        let mut name = [0u8; 4];
        name.copy_from_slice(cur.take(4)?);
        Ok(Self {
            name,
            gap: cur.get_i16()?,
            shape_ndx: cur.get_u8()?,
            color_ndx: cur.get_u8()?,
        })
    }

    #[inline]
    fn write(&self, cur: &mut WriteCursor<'_>) -> Result<()> {
        cur.put_bytes(&self.name)?;
        cur.put_i16(self.gap)?;
        cur.put_u8(self.shape_ndx)?;
        cur.put_u8(self.color_ndx)
    }
}

/// Key position remapped while an overlay is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverlayKey {
    /// Name the key reports while the overlay is active
    pub over: [u8; 4],
    /// Name of the underlying key
    pub under: [u8; 4],
}

impl Wire for OverlayKey {
    const SIZE: usize = 8;
    const ALIGN: usize = 1;

    #[inline]
    fn read(cur: &mut ReadCursor<'_>) -> Result<Self> {
        let mut over = [0u8; 4];
        over.copy_from_slice(cur.take(4)?);
        let mut under = [0u8; 4];
        under.copy_from_slice(cur.take(4)?);
        Ok(Self { over, under })
    }

    #[inline]
    fn write(&self, cur: &mut WriteCursor<'_>) -> Result<()> {
        cur.put_bytes(&self.over)?;
        cur.put_bytes(&self.under)
    }
}
