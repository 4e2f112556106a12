//! Length-prefixed string records
//!
//! Two shapes occur on the wire: `CountedString16`, whose total size is
//! rounded up to a 4-byte boundary, and `Listing`, a flags-plus-name pair
//! rounded up to a 2-byte boundary. Contents are raw bytes; the protocol
//! does not promise any particular text encoding.

use crate::cursor::{ReadCursor, WriteCursor};
use crate::error::{Error, Result};
use crate::iter::{VarSlice, WireView};

/// String record with a 16-bit length, padded to a 4-byte total
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountedString16<'a> {
    bytes: &'a [u8],
}

impl<'a> CountedString16<'a> {
    /// Wrap `bytes` for emission
    ///
    /// Fails with `CountOverflow` when the length does not fit the 16-bit
    /// count field.
    #[inline]
    pub fn new(bytes: &'a [u8]) -> Result<Self> {
        if bytes.len() > u16::MAX as usize {
            return Err(Error::CountOverflow);
        }
        Ok(Self { bytes })
    }

    /// The string contents, without length or padding
    #[inline]
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Content length in bytes
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check for empty contents
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The contents as UTF-8, when they happen to be valid
    #[inline]
    pub fn to_str(&self) -> Option<&'a str> {
        core::str::from_utf8(self.bytes).ok()
    }

    /// Total encoded size: length field plus contents, rounded up to 4
    #[inline]
    pub fn wire_len(&self) -> usize {
        // 2 + u16::MAX rounds within usize on every target
        (2 + self.bytes.len() + 3) & !3
    }

    /// Encode the record, zero-filling the trailing pad
    pub fn emit(&self, cur: &mut WriteCursor<'_>) -> Result<()> {
        cur.put_u16(self.bytes.len() as u16)?;
        cur.put_bytes(self.bytes)?;
        cur.pad_to(4)
    }
}

impl<'a> WireView<'a> for CountedString16<'a> {
    fn parse(cur: &mut ReadCursor<'a>) -> Result<Self> {
        let len = cur.get_u16()? as usize;
        let bytes = cur.take(len)?;
        cur.pad_to(4)?;
        Ok(Self { bytes })
    }
}

/// Component listing entry: flags plus a name, padded to a 2-byte total
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Listing<'a> {
    /// Listing flags for the named component
    pub flags: u16,
    name: &'a [u8],
}

impl<'a> Listing<'a> {
    /// Wrap a flags-and-name pair for emission
    #[inline]
    pub fn new(flags: u16, name: &'a [u8]) -> Result<Self> {
        if name.len() > u16::MAX as usize {
            return Err(Error::CountOverflow);
        }
        Ok(Self { flags, name })
    }

    /// The component name bytes
    #[inline]
    pub fn name(&self) -> &'a [u8] {
        self.name
    }

    /// Total encoded size: two count fields plus name, rounded up to 2
    #[inline]
    pub fn wire_len(&self) -> usize {
        (4 + self.name.len() + 1) & !1
    }

    /// Encode the record, zero-filling the trailing pad
    pub fn emit(&self, cur: &mut WriteCursor<'_>) -> Result<()> {
        cur.put_u16(self.flags)?;
        cur.put_u16(self.name.len() as u16)?;
        cur.put_bytes(self.name)?;
        cur.pad_to(2)
    }
}

impl<'a> WireView<'a> for Listing<'a> {
    fn parse(cur: &mut ReadCursor<'a>) -> Result<Self> {
        let flags = cur.get_u16()?;
        let len = cur.get_u16()? as usize;
        let name = cur.take(len)?;
        cur.pad_to(2)?;
        Ok(Self { flags, name })
    }
}

/// Counts for the six listing runs of a component inventory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ComponentCounts {
    /// Keymap listings
    pub n_keymaps: u16,
    /// Keycode set listings
    pub n_keycodes: u16,
    /// Key type set listings
    pub n_types: u16,
    /// Compatibility map listings
    pub n_compat_maps: u16,
    /// Symbol set listings
    pub n_symbols: u16,
    /// Geometry listings
    pub n_geometries: u16,
}

/// The six listing runs a component inventory reply carries back-to-back
#[derive(Debug, Clone, Copy)]
pub struct ComponentNames<'a> {
    keymaps: VarSlice<'a, Listing<'a>>,
    keycodes: VarSlice<'a, Listing<'a>>,
    types: VarSlice<'a, Listing<'a>>,
    compat_maps: VarSlice<'a, Listing<'a>>,
    symbols: VarSlice<'a, Listing<'a>>,
    geometries: VarSlice<'a, Listing<'a>>,
}

impl<'a> ComponentNames<'a> {
    /// Decode the six runs whose lengths `counts` declares
    pub fn parse(cur: &mut ReadCursor<'a>, counts: &ComponentCounts) -> Result<Self> {
        Ok(Self {
            keymaps: VarSlice::parse(cur, counts.n_keymaps as usize)?,
            keycodes: VarSlice::parse(cur, counts.n_keycodes as usize)?,
            types: VarSlice::parse(cur, counts.n_types as usize)?,
            compat_maps: VarSlice::parse(cur, counts.n_compat_maps as usize)?,
            symbols: VarSlice::parse(cur, counts.n_symbols as usize)?,
            geometries: VarSlice::parse(cur, counts.n_geometries as usize)?,
        })
    }

    /// Decode the runs at the start of `buf`, returning the view and the
    /// number of bytes it occupies
    pub fn unpack(buf: &'a [u8], counts: &ComponentCounts) -> Result<(Self, usize)> {
        let mut cur = ReadCursor::new(buf);
        let view = Self::parse(&mut cur, counts)?;
        Ok((view, cur.position()))
    }

    /// Number of bytes the runs at the start of `buf` occupy
    #[inline]
    pub fn size_of(buf: &'a [u8], counts: &ComponentCounts) -> Result<usize> {
        Ok(Self::unpack(buf, counts)?.1)
    }

    /// Keymap listings
    #[inline]
    pub fn keymaps(&self) -> VarSlice<'a, Listing<'a>> {
        self.keymaps
    }

    /// Keycode set listings
    #[inline]
    pub fn keycodes(&self) -> VarSlice<'a, Listing<'a>> {
        self.keycodes
    }

    /// Key type set listings
    #[inline]
    pub fn types(&self) -> VarSlice<'a, Listing<'a>> {
        self.types
    }

    /// Compatibility map listings
    #[inline]
    pub fn compat_maps(&self) -> VarSlice<'a, Listing<'a>> {
        self.compat_maps
    }

    /// Symbol set listings
    #[inline]
    pub fn symbols(&self) -> VarSlice<'a, Listing<'a>> {
        self.symbols
    }

    /// Geometry listings
    #[inline]
    pub fn geometries(&self) -> VarSlice<'a, Listing<'a>> {
        self.geometries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::{align_up, pad_for};
    use alloc::vec;

    #[test]
    fn test_counted_string_wire_len() {
        for (len, expect) in [(0usize, 4usize), (1, 4), (2, 4), (3, 8), (6, 8), (7, 12)] {
            let data = vec![b'x'; len];
            let s = CountedString16::new(&data).unwrap();
            assert_eq!(s.wire_len(), expect, "len {}", len);
            assert_eq!(s.wire_len(), align_up(2 + len, 4).unwrap());
        }
    }

    #[test]
    fn test_counted_string_roundtrip() {
        let s = CountedString16::new(b"pc105").unwrap();
        let mut buf = vec![0xAAu8; s.wire_len()];
        let mut wr = WriteCursor::new(&mut buf);
        s.emit(&mut wr).unwrap();
        assert_eq!(wr.position(), s.wire_len());

        let mut rd = ReadCursor::new(&buf);
        let back = CountedString16::parse(&mut rd).unwrap();
        assert_eq!(back.bytes(), b"pc105");
        assert_eq!(back.to_str(), Some("pc105"));
        assert_eq!(rd.position(), s.wire_len());
    }

    #[test]
    fn test_counted_string_pad_is_zero() {
        let s = CountedString16::new(b"abc").unwrap();
        let mut buf = vec![0xFFu8; s.wire_len()];
        let mut wr = WriteCursor::new(&mut buf);
        s.emit(&mut wr).unwrap();
        assert_eq!(&buf[5..8], &[0, 0, 0]);
    }

    #[test]
    fn test_counted_string_empty() {
        let s = CountedString16::new(b"").unwrap();
        assert_eq!(s.wire_len(), 4);
        let mut buf = [0xFFu8; 4];
        let mut wr = WriteCursor::new(&mut buf);
        s.emit(&mut wr).unwrap();
        assert_eq!(buf, [0, 0, 0, 0]);
    }

    #[test]
    fn test_counted_string_truncated() {
        // Length field promises five content bytes; none follow
        let len_only = 5u16.to_ne_bytes();
        let mut rd = ReadCursor::new(&len_only);
        assert_eq!(
            CountedString16::parse(&mut rd),
            Err(Error::TruncatedBuffer)
        );

        let mut rd = ReadCursor::new(&len_only[..1]);
        assert!(CountedString16::parse(&mut rd).is_err());
    }

    #[test]
    fn test_listing_roundtrip() {
        let l = Listing::new(0x0001, b"evdev").unwrap();
        assert_eq!(l.wire_len(), 4 + 5 + pad_for(5, 2));
        let mut buf = vec![0u8; l.wire_len()];
        let mut wr = WriteCursor::new(&mut buf);
        l.emit(&mut wr).unwrap();

        let mut rd = ReadCursor::new(&buf);
        let back = Listing::parse(&mut rd).unwrap();
        assert_eq!(back.flags, 0x0001);
        assert_eq!(back.name(), b"evdev");
        assert!(rd.is_at_end());
    }

    #[test]
    fn test_listing_even_name_has_no_pad() {
        let l = Listing::new(0, b"presets").unwrap();
        assert_eq!(l.wire_len(), 12);
        let l = Listing::new(0, b"pc").unwrap();
        assert_eq!(l.wire_len(), 6);
    }

    #[test]
    fn test_component_names_runs() {
        let entries = [
            Listing::new(0, b"us").unwrap(),
            Listing::new(0, b"de").unwrap(),
            Listing::new(0, b"evdev").unwrap(),
        ];
        let total: usize = entries.iter().map(|l| l.wire_len()).sum();
        let mut buf = vec![0u8; total];
        let mut wr = WriteCursor::new(&mut buf);
        for l in &entries {
            l.emit(&mut wr).unwrap();
        }

        // Two symbol sets, one keycode set, all other runs empty
        let counts = ComponentCounts {
            n_keycodes: 1,
            n_symbols: 2,
            ..Default::default()
        };
        let mut rd = ReadCursor::new(&buf);
        let names = ComponentNames::parse(&mut rd, &counts).unwrap();
        assert!(rd.is_at_end());

        assert_eq!(names.keycodes().len(), 1);
        assert_eq!(names.keycodes().iter().next().unwrap().name(), b"us");
        let mut syms = names.symbols().iter();
        assert_eq!(syms.next().unwrap().name(), b"de");
        assert_eq!(syms.next().unwrap().name(), b"evdev");
        assert!(names.keymaps().is_empty());
        assert!(names.geometries().is_empty());
        assert_eq!(
            ComponentNames::size_of(&buf, &counts).unwrap(),
            buf.len()
        );
    }
}
