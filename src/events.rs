//! Event selection details
//!
//! Selecting extension events sends, after the fixed request fields, one
//! (affect, details) field pair for every event type being reconfigured.
//! A pair is on the wire exactly when its bit survives
//! `affect_which & !clear & !select_all`; pairs appear in ascending bit
//! order, each at its field width. The map-notify bit carries no pair
//! because its details travel in the fixed part of the request.

use alloc::vec::Vec;

use crate::cursor::{serialize_exact, ReadCursor, WriteCursor};
use crate::error::Result;

/// Event type mask bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventType;

impl EventType {
    /// Keyboard geometry or range changed (bit 0)
    pub const NEW_KEYBOARD_NOTIFY: u16 = 0x0001;
    /// Keyboard mapping changed (bit 1)
    pub const MAP_NOTIFY: u16 = 0x0002;
    /// Keyboard state changed (bit 2)
    pub const STATE_NOTIFY: u16 = 0x0004;
    /// Controls changed (bit 3)
    pub const CONTROLS_NOTIFY: u16 = 0x0008;
    /// Indicator lit state changed (bit 4)
    pub const INDICATOR_STATE_NOTIFY: u16 = 0x0010;
    /// Indicator map changed (bit 5)
    pub const INDICATOR_MAP_NOTIFY: u16 = 0x0020;
    /// Names changed (bit 6)
    pub const NAMES_NOTIFY: u16 = 0x0040;
    /// Compatibility map changed (bit 7)
    pub const COMPAT_MAP_NOTIFY: u16 = 0x0080;
    /// Keyboard bell rung (bit 8)
    pub const BELL_NOTIFY: u16 = 0x0100;
    /// Keyboard action message (bit 9)
    pub const ACTION_MESSAGE: u16 = 0x0200;
    /// AccessX state changed (bit 10)
    pub const ACCESS_X_NOTIFY: u16 = 0x0400;
    /// Extension device changed (bit 11)
    pub const EXTENSION_DEVICE_NOTIFY: u16 = 0x0800;

    /// Every event type bit
    pub const ALL: u16 = 0x0FFF;
}

/// One (affect, details) pair at the event's field width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Detail<T> {
    /// Which detail bits the request changes
    pub affect: T,
    /// New values for the affected bits
    pub details: T,
}

/// Detail pairs for every selectable event type
///
/// Only the pairs whose event bit is gated in contribute bytes; the rest
/// are ignored by `emit` and left default by `parse`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventDetails {
    /// New-keyboard detail pair
    pub new_keyboard: Detail<u16>,
    /// State detail pair
    pub state: Detail<u16>,
    /// Controls detail pair
    pub ctrls: Detail<u32>,
    /// Indicator-state detail pair
    pub indicator_state: Detail<u32>,
    /// Indicator-map detail pair
    pub indicator_map: Detail<u32>,
    /// Names detail pair
    pub names: Detail<u16>,
    /// Compatibility-map detail pair
    pub compat: Detail<u8>,
    /// Bell detail pair
    pub bell: Detail<u8>,
    /// Action-message detail pair
    pub action_message: Detail<u8>,
    /// AccessX detail pair
    pub access_x: Detail<u16>,
    /// Extension-device detail pair
    pub extension_device: Detail<u16>,
}

impl EventDetails {
    /// The bits whose pairs are on the wire for the given request fields
    #[inline]
    pub fn gate(affect_which: u16, clear: u16, select_all: u16) -> u16 {
        affect_which & !clear & !select_all & !EventType::MAP_NOTIFY
    }

    /// Encoded size of the pairs gated in by `gated`
    pub fn wire_len(&self, gated: u16) -> usize {
        let mut len = 0usize;
        let mut pair = |width: usize, bit: u16| {
            if gated & bit != 0 {
                len += crate::align::pad_for(len, width) + 2 * width;
            }
        };
        pair(2, EventType::NEW_KEYBOARD_NOTIFY);
        pair(2, EventType::STATE_NOTIFY);
        pair(4, EventType::CONTROLS_NOTIFY);
        pair(4, EventType::INDICATOR_STATE_NOTIFY);
        pair(4, EventType::INDICATOR_MAP_NOTIFY);
        pair(2, EventType::NAMES_NOTIFY);
        pair(1, EventType::COMPAT_MAP_NOTIFY);
        pair(1, EventType::BELL_NOTIFY);
        pair(1, EventType::ACTION_MESSAGE);
        pair(2, EventType::ACCESS_X_NOTIFY);
        pair(2, EventType::EXTENSION_DEVICE_NOTIFY);
        len
    }

    /// Encode the gated pairs at the cursor position
    pub fn emit(&self, gated: u16, cur: &mut WriteCursor<'_>) -> Result<()> {
        if gated & EventType::NEW_KEYBOARD_NOTIFY != 0 {
            cur.pad_to(2)?;
            cur.put_u16(self.new_keyboard.affect)?;
            cur.put_u16(self.new_keyboard.details)?;
        }
        if gated & EventType::STATE_NOTIFY != 0 {
            cur.pad_to(2)?;
            cur.put_u16(self.state.affect)?;
            cur.put_u16(self.state.details)?;
        }
        if gated & EventType::CONTROLS_NOTIFY != 0 {
            cur.pad_to(4)?;
            cur.put_u32(self.ctrls.affect)?;
            cur.put_u32(self.ctrls.details)?;
        }
        if gated & EventType::INDICATOR_STATE_NOTIFY != 0 {
            cur.pad_to(4)?;
            cur.put_u32(self.indicator_state.affect)?;
            cur.put_u32(self.indicator_state.details)?;
        }
        if gated & EventType::INDICATOR_MAP_NOTIFY != 0 {
            cur.pad_to(4)?;
            cur.put_u32(self.indicator_map.affect)?;
            cur.put_u32(self.indicator_map.details)?;
        }
        if gated & EventType::NAMES_NOTIFY != 0 {
            cur.pad_to(2)?;
            cur.put_u16(self.names.affect)?;
            cur.put_u16(self.names.details)?;
        }
        if gated & EventType::COMPAT_MAP_NOTIFY != 0 {
            cur.put_u8(self.compat.affect)?;
            cur.put_u8(self.compat.details)?;
        }
        if gated & EventType::BELL_NOTIFY != 0 {
            cur.put_u8(self.bell.affect)?;
            cur.put_u8(self.bell.details)?;
        }
        if gated & EventType::ACTION_MESSAGE != 0 {
            cur.put_u8(self.action_message.affect)?;
            cur.put_u8(self.action_message.details)?;
        }
        if gated & EventType::ACCESS_X_NOTIFY != 0 {
            cur.pad_to(2)?;
            cur.put_u16(self.access_x.affect)?;
            cur.put_u16(self.access_x.details)?;
        }
        if gated & EventType::EXTENSION_DEVICE_NOTIFY != 0 {
            cur.pad_to(2)?;
            cur.put_u16(self.extension_device.affect)?;
            cur.put_u16(self.extension_device.details)?;
        }
        Ok(())
    }

    /// Encode the gated pairs into a fresh buffer
    pub fn serialize(&self, gated: u16) -> Result<Vec<u8>> {
        serialize_exact(self.wire_len(gated), |cur| self.emit(gated, cur))
    }

    /// Decode the gated pairs at the cursor position
    pub fn parse(cur: &mut ReadCursor<'_>, gated: u16) -> Result<Self> {
        let mut out = Self::default();
        if gated & EventType::NEW_KEYBOARD_NOTIFY != 0 {
            cur.pad_to(2)?;
            out.new_keyboard.affect = cur.get_u16()?;
            out.new_keyboard.details = cur.get_u16()?;
        }
        if gated & EventType::STATE_NOTIFY != 0 {
            cur.pad_to(2)?;
            out.state.affect = cur.get_u16()?;
            out.state.details = cur.get_u16()?;
        }
        if gated & EventType::CONTROLS_NOTIFY != 0 {
            cur.pad_to(4)?;
            out.ctrls.affect = cur.get_u32()?;
            out.ctrls.details = cur.get_u32()?;
        }
        if gated & EventType::INDICATOR_STATE_NOTIFY != 0 {
            cur.pad_to(4)?;
            out.indicator_state.affect = cur.get_u32()?;
            out.indicator_state.details = cur.get_u32()?;
        }
        if gated & EventType::INDICATOR_MAP_NOTIFY != 0 {
            cur.pad_to(4)?;
            out.indicator_map.affect = cur.get_u32()?;
            out.indicator_map.details = cur.get_u32()?;
        }
        if gated & EventType::NAMES_NOTIFY != 0 {
            cur.pad_to(2)?;
            out.names.affect = cur.get_u16()?;
            out.names.details = cur.get_u16()?;
        }
        if gated & EventType::COMPAT_MAP_NOTIFY != 0 {
            out.compat.affect = cur.get_u8()?;
            out.compat.details = cur.get_u8()?;
        }
        if gated & EventType::BELL_NOTIFY != 0 {
            out.bell.affect = cur.get_u8()?;
            out.bell.details = cur.get_u8()?;
        }
        if gated & EventType::ACTION_MESSAGE != 0 {
            out.action_message.affect = cur.get_u8()?;
            out.action_message.details = cur.get_u8()?;
        }
        if gated & EventType::ACCESS_X_NOTIFY != 0 {
            cur.pad_to(2)?;
            out.access_x.affect = cur.get_u16()?;
            out.access_x.details = cur.get_u16()?;
        }
        if gated & EventType::EXTENSION_DEVICE_NOTIFY != 0 {
            cur.pad_to(2)?;
            out.extension_device.affect = cur.get_u16()?;
            out.extension_device.details = cur.get_u16()?;
        }
        Ok(out)
    }
}
