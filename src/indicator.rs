//! Indicator map sets and per-device LED records
//!
//! Indicator data is mask-gated: a `which`-style bitmask in the fixed part
//! announces which indicators follow, and the list carries exactly
//! `popcount(mask)` elements in ascending bit order.

use alloc::vec::Vec;

use crate::cursor::{serialize_exact, ReadCursor, WriteCursor};
use crate::error::{Error, Result};
use crate::iter::{FixedSlice, VarSlice, WireView};
use crate::mask::{popcount, rank_of};
use crate::text::CountedString16;
use crate::types::{Action, Atom, IndicatorMap};
use crate::wire::{put_run, run_len};

/// Borrowed view of a mask-gated indicator map run
#[derive(Debug, Clone, Copy)]
pub struct IndicatorMaps<'a> {
    /// Which indicators the run covers
    pub which: u32,
    maps: FixedSlice<'a, IndicatorMap>,
}

impl<'a> IndicatorMaps<'a> {
    /// Decode `popcount(which)` maps at the cursor position
    pub fn parse(cur: &mut ReadCursor<'a>, which: u32) -> Result<Self> {
        let maps = FixedSlice::parse(cur, popcount(which))?;
        Ok(Self { which, maps })
    }

    /// The maps, one per set bit of `which`, ascending
    #[inline]
    pub fn maps(&self) -> FixedSlice<'a, IndicatorMap> {
        self.maps
    }

    /// Map for the indicator selected by `bit`, when covered
    #[inline]
    pub fn map_for(&self, bit: u32) -> Option<IndicatorMap> {
        self.maps.get(rank_of(self.which, bit)?)
    }
}

/// Builder for a mask-gated indicator map run
#[derive(Debug, Clone, Copy)]
pub struct IndicatorMapsSpec<'a> {
    /// Which indicators the run covers
    pub which: u32,
    /// One map per set bit of `which`, ascending
    pub maps: &'a [IndicatorMap],
}

impl<'a> IndicatorMapsSpec<'a> {
    fn check_counts(&self) -> Result<()> {
        if self.maps.len() != popcount(self.which) {
            return Err(Error::CountMismatch);
        }
        Ok(())
    }

    /// Encoded size of the run
    pub fn wire_len(&self) -> Result<usize> {
        self.check_counts()?;
        run_len::<IndicatorMap>(self.maps.len())
    }

    /// Encode the run at the cursor position
    pub fn emit(&self, cur: &mut WriteCursor<'_>) -> Result<()> {
        self.check_counts()?;
        put_run(cur, self.maps)
    }

    /// Encode the run into a fresh buffer
    pub fn serialize(&self) -> Result<Vec<u8>> {
        serialize_exact(self.wire_len()?, |cur| self.emit(cur))
    }
}

/// Fixed part of an indicator map reply
///
/// The same 32-byte layout opens the standalone reply and the embedded form
/// inside a keyboard-by-name reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndicatorMapHeader {
    /// Reply discriminant byte
    pub response_type: u8,
    /// Keyboard the maps describe
    pub device_id: u8,
    /// Low bits of the request sequence number
    pub sequence: u16,
    /// Remaining reply length in 4-byte units
    pub length: u32,
    /// Indicators whose maps follow
    pub which: u32,
    /// Indicators backed by a physical light
    pub real_indicators: u32,
    /// Number of indicators the server knows
    pub n_indicators: u8,
}

impl IndicatorMapHeader {
    /// Encoded size of the fixed part
    pub const SIZE: usize = 32;

    /// Decode the fixed part at the cursor position
    pub fn parse(cur: &mut ReadCursor<'_>) -> Result<Self> {
        let response_type = cur.get_u8()?;
        let device_id = cur.get_u8()?;
        let sequence = cur.get_u16()?;
        let length = cur.get_u32()?;
        let which = cur.get_u32()?;
        let real_indicators = cur.get_u32()?;
        let n_indicators = cur.get_u8()?;
        cur.skip(15)?;
        Ok(Self {
            response_type,
            device_id,
            sequence,
            length,
            which,
            real_indicators,
            n_indicators,
        })
    }

    /// Encode the fixed part at the cursor position
    pub fn emit(&self, cur: &mut WriteCursor<'_>) -> Result<()> {
        cur.put_u8(self.response_type)?;
        cur.put_u8(self.device_id)?;
        cur.put_u16(self.sequence)?;
        cur.put_u32(self.length)?;
        cur.put_u32(self.which)?;
        cur.put_u32(self.real_indicators)?;
        cur.put_u8(self.n_indicators)?;
        cur.put_zeros(15)
    }
}

/// Borrowed view of one per-device LED description record
#[derive(Debug, Clone, Copy)]
pub struct DeviceLedInfo<'a> {
    /// Feedback class of the LED bank
    pub led_class: u16,
    /// Feedback id within the class
    pub led_id: u16,
    /// Indicators whose names follow
    pub names_present: u32,
    /// Indicators whose maps follow
    pub maps_present: u32,
    /// Indicators backed by a physical light
    pub phys_indicators: u32,
    /// Current lit state
    pub state: u32,
    names: FixedSlice<'a, Atom>,
    maps: FixedSlice<'a, IndicatorMap>,
}

impl<'a> DeviceLedInfo<'a> {
    /// Name atoms, one per set bit of `names_present`, ascending
    #[inline]
    pub fn names(&self) -> FixedSlice<'a, Atom> {
        self.names
    }

    /// Maps, one per set bit of `maps_present`, ascending
    #[inline]
    pub fn maps(&self) -> FixedSlice<'a, IndicatorMap> {
        self.maps
    }

    /// Name atom for the indicator selected by `bit`, when present
    #[inline]
    pub fn name_for(&self, bit: u32) -> Option<Atom> {
        self.names.get(rank_of(self.names_present, bit)?)
    }

    /// Map for the indicator selected by `bit`, when present
    #[inline]
    pub fn map_for(&self, bit: u32) -> Option<IndicatorMap> {
        self.maps.get(rank_of(self.maps_present, bit)?)
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

impl<'a> WireView<'a> for DeviceLedInfo<'a> {
    fn parse(cur: &mut ReadCursor<'a>) -> Result<Self> {
        let led_class = cur.get_u16()?;
        let led_id = cur.get_u16()?;
        let names_present = cur.get_u32()?;
        let maps_present = cur.get_u32()?;
        let phys_indicators = cur.get_u32()?;
        let state = cur.get_u32()?;
        let names = FixedSlice::parse(cur, popcount(names_present))?;
        let maps = FixedSlice::parse(cur, popcount(maps_present))?;
        Ok(Self {
            led_class,
            led_id,
            names_present,
            maps_present,
            phys_indicators,
            state,
            names,
            maps,
        })
    }
}

/// Builder for one per-device LED description record
#[derive(Debug, Clone, Copy)]
pub struct DeviceLedInfoSpec<'a> {
    /// Feedback class of the LED bank
    pub led_class: u16,
    /// Feedback id within the class
    pub led_id: u16,
    /// Indicators whose names follow
    pub names_present: u32,
    /// Indicators whose maps follow
    pub maps_present: u32,
    /// Indicators backed by a physical light
    pub phys_indicators: u32,
    /// Current lit state
    pub state: u32,
    /// One name atom per set bit of `names_present`, ascending
    pub names: &'a [Atom],
    /// One map per set bit of `maps_present`, ascending
    pub maps: &'a [IndicatorMap],
}

impl<'a> DeviceLedInfoSpec<'a> {
    fn check_counts(&self) -> Result<()> {
        if self.names.len() != popcount(self.names_present)
            || self.maps.len() != popcount(self.maps_present)
        {
            return Err(Error::CountMismatch);
        }
        Ok(())
    }

    /// Encoded size of the record
    pub fn wire_len(&self) -> Result<usize> {
        self.check_counts()?;
        let names = run_len::<Atom>(self.names.len())?;
        let maps = run_len::<IndicatorMap>(self.maps.len())?;
        20usize
            .checked_add(names)
            .and_then(|l| l.checked_add(maps))
            .ok_or(Error::Overflow)
    }

    /// Encode the record at the cursor position
    pub fn emit(&self, cur: &mut WriteCursor<'_>) -> Result<()> {
        self.check_counts()?;
        cur.put_u16(self.led_class)?;
        cur.put_u16(self.led_id)?;
        cur.put_u32(self.names_present)?;
        cur.put_u32(self.maps_present)?;
        cur.put_u32(self.phys_indicators)?;
        cur.put_u32(self.state)?;
        put_run(cur, self.names)?;
        put_run(cur, self.maps)
    }

    /// Encode the record into a fresh buffer
    pub fn serialize(&self) -> Result<Vec<u8>> {
        serialize_exact(self.wire_len()?, |cur| self.emit(cur))
    }
}

/// Fixed part of a device info reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceInfoHeader {
    /// Reply discriminant byte
    pub response_type: u8,
    /// Device the reply describes
    pub device_id: u8,
    /// Low bits of the request sequence number
    pub sequence: u16,
    /// Remaining reply length in 4-byte units
    pub length: u32,
    /// Features present on the device
    pub present: u16,
    /// Features the server supports changing
    pub supported: u16,
    /// Features requested but not supported
    pub unsupported: u16,
    /// Number of LED description records
    pub n_device_led_fbs: u16,
    /// First button the request asked about
    pub first_btn_wanted: u8,
    /// Buttons the request asked about
    pub n_btns_wanted: u8,
    /// First button whose actions follow
    pub first_btn_rtrn: u8,
    /// Number of button actions returned
    pub n_btns_rtrn: u8,
    /// Buttons on the device
    pub total_btns: u8,
    /// The device keeps its own keyboard state
    pub has_own_state: bool,
    /// Default keyboard feedback id
    pub dflt_kbd_fb: u16,
    /// Default LED feedback id
    pub dflt_led_fb: u16,
    /// Device type atom
    pub dev_type: Atom,
}

impl DeviceInfoHeader {
    /// Encoded size of the fixed part
    pub const SIZE: usize = 32;

    /// Decode the fixed part at the cursor position
    pub fn parse(cur: &mut ReadCursor<'_>) -> Result<Self> {
        let response_type = cur.get_u8()?;
        let device_id = cur.get_u8()?;
        let sequence = cur.get_u16()?;
        let length = cur.get_u32()?;
        let present = cur.get_u16()?;
        let supported = cur.get_u16()?;
        let unsupported = cur.get_u16()?;
        let n_device_led_fbs = cur.get_u16()?;
        let first_btn_wanted = cur.get_u8()?;
        let n_btns_wanted = cur.get_u8()?;
        let first_btn_rtrn = cur.get_u8()?;
        let n_btns_rtrn = cur.get_u8()?;
        let total_btns = cur.get_u8()?;
        let has_own_state = cur.get_u8()? != 0;
        let dflt_kbd_fb = cur.get_u16()?;
        let dflt_led_fb = cur.get_u16()?;
        cur.skip(2)?;
        let dev_type = cur.get_u32()?;
        Ok(Self {
            response_type,
            device_id,
            sequence,
            length,
            present,
            supported,
            unsupported,
            n_device_led_fbs,
            first_btn_wanted,
            n_btns_wanted,
            first_btn_rtrn,
            n_btns_rtrn,
            total_btns,
            has_own_state,
            dflt_kbd_fb,
            dflt_led_fb,
            dev_type,
        })
    }

    /// Encode the fixed part at the cursor position
    pub fn emit(&self, cur: &mut WriteCursor<'_>) -> Result<()> {
        cur.put_u8(self.response_type)?;
        cur.put_u8(self.device_id)?;
        cur.put_u16(self.sequence)?;
        cur.put_u32(self.length)?;
        cur.put_u16(self.present)?;
        cur.put_u16(self.supported)?;
        cur.put_u16(self.unsupported)?;
        cur.put_u16(self.n_device_led_fbs)?;
        cur.put_u8(self.first_btn_wanted)?;
        cur.put_u8(self.n_btns_wanted)?;
        cur.put_u8(self.first_btn_rtrn)?;
        cur.put_u8(self.n_btns_rtrn)?;
        cur.put_u8(self.total_btns)?;
        cur.put_u8(self.has_own_state as u8)?;
        cur.put_u16(self.dflt_kbd_fb)?;
        cur.put_u16(self.dflt_led_fb)?;
        cur.put_zeros(2)?;
        cur.put_u32(self.dev_type)
    }

    /// Parse parameters for the body this header announces
    #[inline]
    pub fn layout(&self) -> DeviceInfoLayout {
        DeviceInfoLayout {
            n_btns_rtrn: self.n_btns_rtrn,
            n_device_led_fbs: self.n_device_led_fbs,
        }
    }
}

/// Counts that govern a device info body's shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceInfoLayout {
    /// Number of button actions
    pub n_btns_rtrn: u8,
    /// Number of LED description records
    pub n_device_led_fbs: u16,
}

/// Borrowed view of a device info body
///
/// Device name, button action run, then the LED description records.
#[derive(Debug, Clone, Copy)]
pub struct DeviceInfoParts<'a> {
    name: CountedString16<'a>,
    btn_actions: FixedSlice<'a, Action>,
    leds: VarSlice<'a, DeviceLedInfo<'a>>,
}

impl<'a> DeviceInfoParts<'a> {
    /// Decode a body whose shape `layout` describes
    pub fn parse(cur: &mut ReadCursor<'a>, layout: &DeviceInfoLayout) -> Result<Self> {
        let name = CountedString16::parse(cur)?;
        let btn_actions = FixedSlice::parse(cur, layout.n_btns_rtrn as usize)?;
        let leds = VarSlice::parse(cur, layout.n_device_led_fbs as usize)?;
        Ok(Self {
            name,
            btn_actions,
            leds,
        })
    }

    /// Decode a body at the start of `buf`, returning the view and the
    /// number of bytes it occupies
    pub fn unpack(buf: &'a [u8], layout: &DeviceInfoLayout) -> Result<(Self, usize)> {
        let mut cur = ReadCursor::new(buf);
        let view = Self::parse(&mut cur, layout)?;
        Ok((view, cur.position()))
    }

    /// Number of bytes the body at the start of `buf` occupies
    #[inline]
    pub fn size_of(buf: &'a [u8], layout: &DeviceInfoLayout) -> Result<usize> {
        Ok(Self::unpack(buf, layout)?.1)
    }

    /// The device name
    #[inline]
    pub fn name(&self) -> CountedString16<'a> {
        self.name
    }

    /// Button actions, starting at the first returned button
    #[inline]
    pub fn btn_actions(&self) -> FixedSlice<'a, Action> {
        self.btn_actions
    }

    /// LED description records
    #[inline]
    pub fn leds(&self) -> VarSlice<'a, DeviceLedInfo<'a>> {
        self.leds
    }
}

/// Builder for a device info body
#[derive(Debug, Clone, Copy)]
pub struct DeviceInfoPartsSpec<'a> {
    /// The device name
    pub name: CountedString16<'a>,
    /// Button actions, starting at the first button being set
    pub btn_actions: &'a [Action],
    /// LED description records
    pub leds: &'a [DeviceLedInfoSpec<'a>],
}

impl<'a> DeviceInfoPartsSpec<'a> {
    fn check_counts(&self) -> Result<()> {
        if self.btn_actions.len() > u8::MAX as usize || self.leds.len() > u16::MAX as usize {
            return Err(Error::CountOverflow);
        }
        Ok(())
    }

    /// Counts to carry in the fixed part for this body
    pub fn layout(&self) -> Result<DeviceInfoLayout> {
        self.check_counts()?;
        Ok(DeviceInfoLayout {
            n_btns_rtrn: self.btn_actions.len() as u8,
            n_device_led_fbs: self.leds.len() as u16,
        })
    }

    /// Encoded size of the body
    pub fn wire_len(&self) -> Result<usize> {
        self.check_counts()?;
        let mut len = self.name.wire_len();
        len = len
            .checked_add(run_len::<Action>(self.btn_actions.len())?)
            .ok_or(Error::Overflow)?;
        for led in self.leds {
            len = len.checked_add(led.wire_len()?).ok_or(Error::Overflow)?;
        }
        Ok(len)
    }

    /// Encode the body at the cursor position
    pub fn emit(&self, cur: &mut WriteCursor<'_>) -> Result<()> {
        self.check_counts()?;
        self.name.emit(cur)?;
        put_run(cur, self.btn_actions)?;
        for led in self.leds {
            led.emit(cur)?;
        }
        Ok(())
    }

    /// Encode the body into a fresh buffer
    pub fn serialize(&self) -> Result<Vec<u8>> {
        serialize_exact(self.wire_len()?, |cur| self.emit(cur))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps_map() -> IndicatorMap {
        IndicatorMap {
            flags: 0x80,
            which_groups: 0,
            groups: 0,
            which_mods: 0x03,
            mods: 0x02,
            real_mods: 0x02,
            vmods: 0,
            ctrls: 0,
        }
    }

    #[test]
    fn test_indicator_maps_roundtrip() {
        let which = 0b11;
        let maps = [caps_map(), IndicatorMap::default()];
        let spec = IndicatorMapsSpec { which, maps: &maps };
        let bytes = spec.serialize().unwrap();
        assert_eq!(bytes.len(), 24);

        let mut cur = ReadCursor::new(&bytes);
        let view = IndicatorMaps::parse(&mut cur, which).unwrap();
        assert_eq!(view.maps().len(), 2);
        assert_eq!(view.map_for(0b01), Some(caps_map()));
        assert_eq!(view.map_for(0b10), Some(IndicatorMap::default()));
        assert_eq!(view.map_for(0b100), None);
        assert!(cur.is_at_end());
    }

    #[test]
    fn test_indicator_maps_count_mismatch() {
        let maps = [caps_map()];
        let spec = IndicatorMapsSpec {
            which: 0b11,
            maps: &maps,
        };
        assert_eq!(spec.wire_len(), Err(Error::CountMismatch));
    }

    #[test]
    fn test_device_led_info_layout() {
        // names_present selects bits 0 and 2: two atoms, then maps at 28
        let names = [40u32, 41];
        let maps = [caps_map()];
        let spec = DeviceLedInfoSpec {
            led_class: 0,
            led_id: 1,
            names_present: 0b101,
            maps_present: 0b100,
            phys_indicators: 0b101,
            state: 0b001,
            names: &names,
            maps: &maps,
        };
        let len = spec.wire_len().unwrap();
        assert_eq!(len, 20 + 8 + 12);

        let bytes = spec.serialize().unwrap();
        let mut expect = [0u8; 12];
        let mut wr = WriteCursor::new(&mut expect);
        crate::wire::Wire::write(&caps_map(), &mut wr).unwrap();
        assert_eq!(&bytes[28..40], &expect);
    }

    #[test]
    fn test_device_led_info_roundtrip() {
        let names = [100u32, 101, 102];
        let maps = [caps_map(), IndicatorMap::default()];
        let spec = DeviceLedInfoSpec {
            led_class: 0x0301,
            led_id: 2,
            names_present: 0b0111,
            maps_present: 0b0011,
            phys_indicators: 0xFFFF_FFFF,
            state: 0b0101,
            names: &names,
            maps: &maps,
        };
        let bytes = spec.serialize().unwrap();
        let (view, consumed) = DeviceLedInfo::unpack(&bytes).unwrap();
        assert_eq!(consumed, bytes.len());
        assert_eq!(view.led_class, 0x0301);
        assert_eq!(view.names_present, 0b0111);
        assert_eq!(view.name_for(0b100), Some(102));
        assert_eq!(view.name_for(0b1000), None);
        assert_eq!(view.map_for(0b10), Some(IndicatorMap::default()));
        assert_eq!(view.names().len(), 3);
        assert_eq!(view.maps().len(), 2);
    }

    #[test]
    fn test_device_led_info_empty_masks() {
        let spec = DeviceLedInfoSpec {
            led_class: 0,
            led_id: 0,
            names_present: 0,
            maps_present: 0,
            phys_indicators: 0,
            state: 0,
            names: &[],
            maps: &[],
        };
        let bytes = spec.serialize().unwrap();
        assert_eq!(bytes.len(), 20);
        let (view, consumed) = DeviceLedInfo::unpack(&bytes).unwrap();
        assert_eq!(consumed, 20);
        assert!(view.names().is_empty());
        assert!(view.maps().is_empty());
    }

    #[test]
    fn test_device_led_info_truncated() {
        let names = [1u32];
        let spec = DeviceLedInfoSpec {
            led_class: 0,
            led_id: 0,
            names_present: 0b1,
            maps_present: 0,
            phys_indicators: 0,
            state: 0,
            names: &names,
            maps: &[],
        };
        let bytes = spec.serialize().unwrap();
        let err = DeviceLedInfo::unpack(&bytes[..22]).unwrap_err();
        assert_eq!(err, Error::TruncatedBuffer);
    }

    #[test]
    fn test_device_info_header_roundtrip() {
        let hdr = DeviceInfoHeader {
            response_type: 1,
            device_id: 3,
            sequence: 9,
            length: 12,
            present: 0x001F,
            supported: 0x003F,
            unsupported: 0,
            n_device_led_fbs: 2,
            first_btn_wanted: 0,
            n_btns_wanted: 0,
            first_btn_rtrn: 1,
            n_btns_rtrn: 3,
            total_btns: 5,
            has_own_state: true,
            dflt_kbd_fb: 0,
            dflt_led_fb: 1,
            dev_type: 70,
        };
        let mut buf = std::vec![0u8; DeviceInfoHeader::SIZE];
        let mut cur = WriteCursor::new(&mut buf);
        hdr.emit(&mut cur).unwrap();
        assert_eq!(cur.remaining(), 0);

        let mut cur = ReadCursor::new(&buf);
        assert_eq!(DeviceInfoHeader::parse(&mut cur).unwrap(), hdr);
        assert_eq!(hdr.layout().n_btns_rtrn, 3);
        assert_eq!(hdr.layout().n_device_led_fbs, 2);
    }

    #[test]
    fn test_device_info_parts_roundtrip() {
        let actions = [
            Action {
                kind: 2,
                data: [0; 7],
            },
            Action {
                kind: 5,
                data: [1, 2, 3, 4, 5, 6, 7],
            },
        ];
        let names = [77u32];
        let leds = [DeviceLedInfoSpec {
            led_class: 0,
            led_id: 1,
            names_present: 0b1,
            maps_present: 0,
            phys_indicators: 0b1,
            state: 0b1,
            names: &names,
            maps: &[],
        }];
        let spec = DeviceInfoPartsSpec {
            name: CountedString16::new(b"Virtual keyboard").unwrap(),
            btn_actions: &actions,
            leds: &leds,
        };
        // 16-byte name plus count rounds to 20, then 16 of actions, 24 of LED
        assert_eq!(spec.wire_len().unwrap(), 20 + 16 + 24);

        let bytes = spec.serialize().unwrap();
        let layout = spec.layout().unwrap();
        let (view, consumed) = DeviceInfoParts::unpack(&bytes, &layout).unwrap();
        assert_eq!(consumed, bytes.len());
        assert_eq!(view.name().bytes(), b"Virtual keyboard");
        assert_eq!(view.btn_actions().get(1), Some(actions[1]));
        let led = view.leds().iter().next().unwrap();
        assert_eq!(led.led_id, 1);
        assert_eq!(led.name_for(0b1), Some(77));
    }
}
