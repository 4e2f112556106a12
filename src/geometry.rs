//! Keyboard geometry records
//!
//! Geometry data nests deeply: shapes hold outlines hold points, sections
//! hold rows, doodads and overlays, and the whole body ends with counted
//! strings and alias pairs. Every fixed part is a multiple of four bytes
//! and counted strings round themselves up, so consecutive records stay
//! aligned without padding between them.

use alloc::vec::Vec;

use crate::cursor::{serialize_exact, ReadCursor, WriteCursor};
use crate::error::{Error, Result};
use crate::iter::{FixedSlice, VarSlice, WireView};
use crate::text::CountedString16;
use crate::types::{Atom, Key, KeyAlias, OverlayKey, Point};
use crate::wire::{put_run, run_len};

/// Doodad discriminant values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoodadKind;

impl DoodadKind {
    /// Hollow shape drawn in one color
    pub const OUTLINE: u8 = 1;
    /// Filled shape drawn in one color
    pub const SOLID: u8 = 2;
    /// Text label
    pub const TEXT: u8 = 3;
    /// Indicator lamp
    pub const INDICATOR: u8 = 4;
    /// Vendor logo
    pub const LOGO: u8 = 5;
}

/// Fixed part of a geometry reply
///
/// The same 32-byte layout opens the standalone reply and the embedded form
/// inside a keyboard-by-name reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GeometryHeader {
    /// Reply discriminant byte
    pub response_type: u8,
    /// Keyboard the geometry describes
    pub device_id: u8,
    /// Low bits of the request sequence number
    pub sequence: u16,
    /// Remaining reply length in 4-byte units
    pub length: u32,
    /// Name atom of the geometry
    pub name: Atom,
    /// The server had a geometry to return
    pub found: bool,
    /// Keyboard width in millimeters
    pub width_mm: u16,
    /// Keyboard height in millimeters
    pub height_mm: u16,
    /// Number of properties in the body
    pub n_properties: u16,
    /// Number of color names in the body
    pub n_colors: u16,
    /// Number of shapes in the body
    pub n_shapes: u16,
    /// Number of sections in the body
    pub n_sections: u16,
    /// Number of top-level doodads in the body
    pub n_doodads: u16,
    /// Number of key alias pairs in the body
    pub n_key_aliases: u16,
    /// Color index of the keyboard base
    pub base_color_ndx: u8,
    /// Color index used for labels
    pub label_color_ndx: u8,
}

impl GeometryHeader {
    /// Encoded size of the fixed part
    pub const SIZE: usize = 32;

    /// Decode the fixed part at the cursor position
    pub fn parse(cur: &mut ReadCursor<'_>) -> Result<Self> {
        let response_type = cur.get_u8()?;
        let device_id = cur.get_u8()?;
        let sequence = cur.get_u16()?;
        let length = cur.get_u32()?;
        let name = cur.get_u32()?;
        let found = cur.get_u8()? != 0;
        cur.skip(1)?;
        let width_mm = cur.get_u16()?;
        let height_mm = cur.get_u16()?;
        let n_properties = cur.get_u16()?;
        let n_colors = cur.get_u16()?;
        let n_shapes = cur.get_u16()?;
        let n_sections = cur.get_u16()?;
        let n_doodads = cur.get_u16()?;
        let n_key_aliases = cur.get_u16()?;
        let base_color_ndx = cur.get_u8()?;
        let label_color_ndx = cur.get_u8()?;
        Ok(Self {
            response_type,
            device_id,
            sequence,
            length,
            name,
            found,
            width_mm,
            height_mm,
            n_properties,
            n_colors,
            n_shapes,
            n_sections,
            n_doodads,
            n_key_aliases,
            base_color_ndx,
            label_color_ndx,
        })
    }

    /// Encode the fixed part at the cursor position
    pub fn emit(&self, cur: &mut WriteCursor<'_>) -> Result<()> {
        cur.put_u8(self.response_type)?;
        cur.put_u8(self.device_id)?;
        cur.put_u16(self.sequence)?;
        cur.put_u32(self.length)?;
        cur.put_u32(self.name)?;
        cur.put_u8(self.found as u8)?;
        cur.put_zeros(1)?;
        cur.put_u16(self.width_mm)?;
        cur.put_u16(self.height_mm)?;
        cur.put_u16(self.n_properties)?;
        cur.put_u16(self.n_colors)?;
        cur.put_u16(self.n_shapes)?;
        cur.put_u16(self.n_sections)?;
        cur.put_u16(self.n_doodads)?;
        cur.put_u16(self.n_key_aliases)?;
        cur.put_u8(self.base_color_ndx)?;
        cur.put_u8(self.label_color_ndx)
    }

    /// Parse parameters for the body this header announces
    #[inline]
    pub fn layout(&self) -> GeometryLayout {
        GeometryLayout {
            n_properties: self.n_properties,
            n_colors: self.n_colors,
            n_shapes: self.n_shapes,
            n_sections: self.n_sections,
            n_doodads: self.n_doodads,
            n_key_aliases: self.n_key_aliases,
        }
    }
}

/// Counts that govern a geometry body's shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GeometryLayout {
    /// Number of properties
    pub n_properties: u16,
    /// Number of color names
    pub n_colors: u16,
    /// Number of shapes
    pub n_shapes: u16,
    /// Number of sections
    pub n_sections: u16,
    /// Number of top-level doodads
    pub n_doodads: u16,
    /// Number of key alias pairs
    pub n_key_aliases: u16,
}

/// Borrowed view of one outline record
#[derive(Debug, Clone, Copy)]
pub struct Outline<'a> {
    /// Corner rounding radius in geometry units
    pub corner_radius: u8,
    points: FixedSlice<'a, Point>,
}

impl<'a> Outline<'a> {
    /// The outline's points
    #[inline]
    pub fn points(&self) -> FixedSlice<'a, Point> {
        self.points
    }
}

impl<'a> WireView<'a> for Outline<'a> {
    fn parse(cur: &mut ReadCursor<'a>) -> Result<Self> {
        let n_points = cur.get_u8()? as usize;
        let corner_radius = cur.get_u8()?;
        cur.skip(2)?;
        let points = FixedSlice::parse(cur, n_points)?;
        Ok(Self {
            corner_radius,
            points,
        })
    }
}

/// Builder for one outline record
#[derive(Debug, Clone, Copy)]
pub struct OutlineSpec<'a> {
    /// Corner rounding radius in geometry units
    pub corner_radius: u8,
    /// The outline's points
    pub points: &'a [Point],
}

impl<'a> OutlineSpec<'a> {
    fn check_counts(&self) -> Result<()> {
        if self.points.len() > u8::MAX as usize {
            return Err(Error::CountOverflow);
        }
        Ok(())
    }

    /// Encoded size of the record
    pub fn wire_len(&self) -> Result<usize> {
        self.check_counts()?;
        Ok(4 + run_len::<Point>(self.points.len())?)
    }

    /// Encode the record at the cursor position
    pub fn emit(&self, cur: &mut WriteCursor<'_>) -> Result<()> {
        self.check_counts()?;
        cur.put_u8(self.points.len() as u8)?;
        cur.put_u8(self.corner_radius)?;
        cur.put_zeros(2)?;
        put_run(cur, self.points)
    }
}

/// Borrowed view of one shape record
#[derive(Debug, Clone, Copy)]
pub struct Shape<'a> {
    /// Name atom of the shape
    pub name: Atom,
    /// Index of the primary outline
    pub primary_ndx: u8,
    /// Index of the approximating outline
    pub approx_ndx: u8,
    outlines: VarSlice<'a, Outline<'a>>,
}

impl<'a> Shape<'a> {
    /// The shape's outlines
    #[inline]
    pub fn outlines(&self) -> VarSlice<'a, Outline<'a>> {
        self.outlines
    }

    /// Outline at `ndx`
    #[inline]
    pub fn outline(&self, ndx: u8) -> Option<Outline<'a>> {
        self.outlines.iter().nth(ndx as usize)
    }

    /// The primary outline
    #[inline]
    pub fn primary(&self) -> Option<Outline<'a>> {
        self.outline(self.primary_ndx)
    }

    /// The approximating outline
    #[inline]
    pub fn approx(&self) -> Option<Outline<'a>> {
        self.outline(self.approx_ndx)
    }
}

impl<'a> WireView<'a> for Shape<'a> {
    fn parse(cur: &mut ReadCursor<'a>) -> Result<Self> {
        let name = cur.get_u32()?;
        let n_outlines = cur.get_u8()? as usize;
        let primary_ndx = cur.get_u8()?;
        let approx_ndx = cur.get_u8()?;
        cur.skip(1)?;
        let outlines = VarSlice::parse(cur, n_outlines)?;
        Ok(Self {
            name,
            primary_ndx,
            approx_ndx,
            outlines,
        })
    }
}

/// Builder for one shape record
#[derive(Debug, Clone, Copy)]
pub struct ShapeSpec<'a> {
    /// Name atom of the shape
    pub name: Atom,
    /// Index of the primary outline
    pub primary_ndx: u8,
    /// Index of the approximating outline
    pub approx_ndx: u8,
    /// The shape's outlines
    pub outlines: &'a [OutlineSpec<'a>],
}

impl<'a> ShapeSpec<'a> {
    fn check_counts(&self) -> Result<()> {
        if self.outlines.len() > u8::MAX as usize {
            return Err(Error::CountOverflow);
        }
        Ok(())
    }

    /// Encoded size of the record
    pub fn wire_len(&self) -> Result<usize> {
        self.check_counts()?;
        let mut len = 8usize;
        for outline in self.outlines {
            len = len.checked_add(outline.wire_len()?).ok_or(Error::Overflow)?;
        }
        Ok(len)
    }

    /// Encode the record at the cursor position
    pub fn emit(&self, cur: &mut WriteCursor<'_>) -> Result<()> {
        self.check_counts()?;
        cur.put_u32(self.name)?;
        cur.put_u8(self.outlines.len() as u8)?;
        cur.put_u8(self.primary_ndx)?;
        cur.put_u8(self.approx_ndx)?;
        cur.put_zeros(1)?;
        for outline in self.outlines {
            outline.emit(cur)?;
        }
        Ok(())
    }
}

/// Borrowed view of one row of keys within a section
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    /// Offset from the section top
    pub top: i16,
    /// Offset from the section left edge
    pub left: i16,
    /// Keys run vertically rather than horizontally
    pub vertical: bool,
    keys: FixedSlice<'a, Key>,
}

impl<'a> Row<'a> {
    /// The row's keys
    #[inline]
    pub fn keys(&self) -> FixedSlice<'a, Key> {
        self.keys
    }
}

impl<'a> WireView<'a> for Row<'a> {
    fn parse(cur: &mut ReadCursor<'a>) -> Result<Self> {
        let top = cur.get_i16()?;
        let left = cur.get_i16()?;
        let n_keys = cur.get_u8()? as usize;
        let vertical = cur.get_u8()? != 0;
        cur.skip(2)?;
        let keys = FixedSlice::parse(cur, n_keys)?;
        Ok(Self {
            top,
            left,
            vertical,
            keys,
        })
    }
}

/// Builder for one row of keys
#[derive(Debug, Clone, Copy)]
pub struct RowSpec<'a> {
    /// Offset from the section top
    pub top: i16,
    /// Offset from the section left edge
    pub left: i16,
    /// Keys run vertically rather than horizontally
    pub vertical: bool,
    /// The row's keys
    pub keys: &'a [Key],
}

impl<'a> RowSpec<'a> {
    fn check_counts(&self) -> Result<()> {
        if self.keys.len() > u8::MAX as usize {
            return Err(Error::CountOverflow);
        }
        Ok(())
    }

    /// Encoded size of the record
    pub fn wire_len(&self) -> Result<usize> {
        self.check_counts()?;
        Ok(8 + run_len::<Key>(self.keys.len())?)
    }

    /// Encode the record at the cursor position
    pub fn emit(&self, cur: &mut WriteCursor<'_>) -> Result<()> {
        self.check_counts()?;
        cur.put_i16(self.top)?;
        cur.put_i16(self.left)?;
        cur.put_u8(self.keys.len() as u8)?;
        cur.put_u8(self.vertical as u8)?;
        cur.put_zeros(2)?;
        put_run(cur, self.keys)
    }
}

/// Borrowed view of one overlay row
#[derive(Debug, Clone, Copy)]
pub struct OverlayRow<'a> {
    /// Index of the section row this overlay row covers
    pub row_under: u8,
    keys: FixedSlice<'a, OverlayKey>,
}

impl<'a> OverlayRow<'a> {
    /// The overlay key pairs
    #[inline]
    pub fn keys(&self) -> FixedSlice<'a, OverlayKey> {
        self.keys
    }
}

impl<'a> WireView<'a> for OverlayRow<'a> {
    fn parse(cur: &mut ReadCursor<'a>) -> Result<Self> {
        let row_under = cur.get_u8()?;
        let n_keys = cur.get_u8()? as usize;
        cur.skip(2)?;
        let keys = FixedSlice::parse(cur, n_keys)?;
        Ok(Self { row_under, keys })
    }
}

/// Builder for one overlay row
#[derive(Debug, Clone, Copy)]
pub struct OverlayRowSpec<'a> {
    /// Index of the section row this overlay row covers
    pub row_under: u8,
    /// The overlay key pairs
    pub keys: &'a [OverlayKey],
}

impl<'a> OverlayRowSpec<'a> {
    fn check_counts(&self) -> Result<()> {
        if self.keys.len() > u8::MAX as usize {
            return Err(Error::CountOverflow);
        }
        Ok(())
    }

    /// Encoded size of the record
    pub fn wire_len(&self) -> Result<usize> {
        self.check_counts()?;
        Ok(4 + run_len::<OverlayKey>(self.keys.len())?)
    }

    /// Encode the record at the cursor position
    pub fn emit(&self, cur: &mut WriteCursor<'_>) -> Result<()> {
        self.check_counts()?;
        cur.put_u8(self.row_under)?;
        cur.put_u8(self.keys.len() as u8)?;
        cur.put_zeros(2)?;
        put_run(cur, self.keys)
    }
}

/// Borrowed view of one overlay record
#[derive(Debug, Clone, Copy)]
pub struct Overlay<'a> {
    /// Name atom of the overlay
    pub name: Atom,
    rows: VarSlice<'a, OverlayRow<'a>>,
}

impl<'a> Overlay<'a> {
    /// The overlay's rows
    #[inline]
    pub fn rows(&self) -> VarSlice<'a, OverlayRow<'a>> {
        self.rows
    }
}

impl<'a> WireView<'a> for Overlay<'a> {
    fn parse(cur: &mut ReadCursor<'a>) -> Result<Self> {
        let name = cur.get_u32()?;
        let n_rows = cur.get_u8()? as usize;
        cur.skip(3)?;
        let rows = VarSlice::parse(cur, n_rows)?;
        Ok(Self { name, rows })
    }
}

/// Builder for one overlay record
#[derive(Debug, Clone, Copy)]
pub struct OverlaySpec<'a> {
    /// Name atom of the overlay
    pub name: Atom,
    /// The overlay's rows
    pub rows: &'a [OverlayRowSpec<'a>],
}

impl<'a> OverlaySpec<'a> {
    fn check_counts(&self) -> Result<()> {
        if self.rows.len() > u8::MAX as usize {
            return Err(Error::CountOverflow);
        }
        Ok(())
    }

    /// Encoded size of the record
    pub fn wire_len(&self) -> Result<usize> {
        self.check_counts()?;
        let mut len = 8usize;
        for row in self.rows {
            len = len.checked_add(row.wire_len()?).ok_or(Error::Overflow)?;
        }
        Ok(len)
    }

    /// Encode the record at the cursor position
    pub fn emit(&self, cur: &mut WriteCursor<'_>) -> Result<()> {
        self.check_counts()?;
        cur.put_u32(self.name)?;
        cur.put_u8(self.rows.len() as u8)?;
        cur.put_zeros(3)?;
        for row in self.rows {
            row.emit(cur)?;
        }
        Ok(())
    }
}

/// Placement fields shared by every doodad kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DoodadCommon {
    /// Name atom of the doodad
    pub name: Atom,
    /// Drawing priority
    pub priority: u8,
    /// Offset from the enclosing origin's top
    pub top: i16,
    /// Offset from the enclosing origin's left edge
    pub left: i16,
    /// Rotation in tenths of a degree
    pub angle: i16,
}

/// One geometry doodad, discriminated by its kind byte
///
/// The shape-based kinds are fixed twenty-byte records; text and logo
/// doodads carry counted strings after the fixed part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Doodad<'a> {
    /// Hollow shape drawn in one color
    Outline {
        /// Placement fields
        common: DoodadCommon,
        /// Color index
        color_ndx: u8,
        /// Shape index
        shape_ndx: u8,
    },
    /// Filled shape drawn in one color
    Solid {
        /// Placement fields
        common: DoodadCommon,
        /// Color index
        color_ndx: u8,
        /// Shape index
        shape_ndx: u8,
    },
    /// Text label
    Text {
        /// Placement fields
        common: DoodadCommon,
        /// Label width in geometry units
        width: u16,
        /// Label height in geometry units
        height: u16,
        /// Color index
        color_ndx: u8,
        /// Label text
        text: CountedString16<'a>,
        /// Font name
        font: CountedString16<'a>,
    },
    /// Indicator lamp with on and off colors
    Indicator {
        /// Placement fields
        common: DoodadCommon,
        /// Color index while lit
        on_color_ndx: u8,
        /// Color index while unlit
        off_color_ndx: u8,
        /// Shape index
        shape_ndx: u8,
    },
    /// Vendor logo
    Logo {
        /// Placement fields
        common: DoodadCommon,
        /// Color index
        color_ndx: u8,
        /// Shape index
        shape_ndx: u8,
        /// Logo name
        logo_name: CountedString16<'a>,
    },
}

impl<'a> Doodad<'a> {
    /// The discriminant byte for this kind
    #[inline]
    pub fn kind(&self) -> u8 {
        match self {
            Self::Outline { .. } => DoodadKind::OUTLINE,
            Self::Solid { .. } => DoodadKind::SOLID,
            Self::Text { .. } => DoodadKind::TEXT,
            Self::Indicator { .. } => DoodadKind::INDICATOR,
            Self::Logo { .. } => DoodadKind::LOGO,
        }
    }

    /// The placement fields every kind carries
    #[inline]
    pub fn common(&self) -> DoodadCommon {
        match self {
            Self::Outline { common, .. }
            | Self::Solid { common, .. }
            | Self::Text { common, .. }
            | Self::Indicator { common, .. }
            | Self::Logo { common, .. } => *common,
        }
    }

    /// Encoded size of the record
    pub fn wire_len(&self) -> usize {
        match self {
            Self::Outline { .. } | Self::Solid { .. } | Self::Indicator { .. } => 20,
            Self::Text { text, font, .. } => 20 + text.wire_len() + font.wire_len(),
            Self::Logo { logo_name, .. } => 20 + logo_name.wire_len(),
        }
    }

    /// Encode the record at the cursor position
    pub fn emit(&self, cur: &mut WriteCursor<'_>) -> Result<()> {
        let common = self.common();
        cur.put_u32(common.name)?;
        cur.put_u8(self.kind())?;
        cur.put_u8(common.priority)?;
        cur.put_i16(common.top)?;
        cur.put_i16(common.left)?;
        cur.put_i16(common.angle)?;
        match self {
            Self::Outline {
                color_ndx,
                shape_ndx,
                ..
            }
            | Self::Solid {
                color_ndx,
                shape_ndx,
                ..
            } => {
                cur.put_u8(*color_ndx)?;
                cur.put_u8(*shape_ndx)?;
                cur.put_zeros(6)
            }
            Self::Text {
                width,
                height,
                color_ndx,
                text,
                font,
                ..
            } => {
                cur.put_u16(*width)?;
                cur.put_u16(*height)?;
                cur.put_u8(*color_ndx)?;
                cur.put_zeros(3)?;
                text.emit(cur)?;
                font.emit(cur)
            }
            Self::Indicator {
                on_color_ndx,
                off_color_ndx,
                shape_ndx,
                ..
            } => {
                cur.put_u8(*on_color_ndx)?;
                cur.put_u8(*off_color_ndx)?;
                cur.put_u8(*shape_ndx)?;
                cur.put_zeros(5)
            }
            Self::Logo {
                color_ndx,
                shape_ndx,
                logo_name,
                ..
            } => {
                cur.put_u8(*color_ndx)?;
                cur.put_u8(*shape_ndx)?;
                cur.put_zeros(6)?;
                logo_name.emit(cur)
            }
        }
    }

    /// Encode the record into a fresh buffer
    pub fn serialize(&self) -> Result<Vec<u8>> {
        serialize_exact(self.wire_len(), |cur| self.emit(cur))
    }
}

impl<'a> WireView<'a> for Doodad<'a> {
    fn parse(cur: &mut ReadCursor<'a>) -> Result<Self> {
        let name = cur.get_u32()?;
        let kind = cur.get_u8()?;
        let priority = cur.get_u8()?;
        let top = cur.get_i16()?;
        let left = cur.get_i16()?;
        let angle = cur.get_i16()?;
        let common = DoodadCommon {
            name,
            priority,
            top,
            left,
            angle,
        };
        match kind {
            DoodadKind::OUTLINE | DoodadKind::SOLID => {
                let color_ndx = cur.get_u8()?;
                let shape_ndx = cur.get_u8()?;
                cur.skip(6)?;
                if kind == DoodadKind::OUTLINE {
                    Ok(Self::Outline {
                        common,
                        color_ndx,
                        shape_ndx,
                    })
                } else {
                    Ok(Self::Solid {
                        common,
                        color_ndx,
                        shape_ndx,
                    })
                }
            }
            DoodadKind::TEXT => {
                let width = cur.get_u16()?;
                let height = cur.get_u16()?;
                let color_ndx = cur.get_u8()?;
                cur.skip(3)?;
                let text = CountedString16::parse(cur)?;
                let font = CountedString16::parse(cur)?;
                Ok(Self::Text {
                    common,
                    width,
                    height,
                    color_ndx,
                    text,
                    font,
                })
            }
            DoodadKind::INDICATOR => {
                let on_color_ndx = cur.get_u8()?;
                let off_color_ndx = cur.get_u8()?;
                let shape_ndx = cur.get_u8()?;
                cur.skip(5)?;
                Ok(Self::Indicator {
                    common,
                    on_color_ndx,
                    off_color_ndx,
                    shape_ndx,
                })
            }
            DoodadKind::LOGO => {
                let color_ndx = cur.get_u8()?;
                let shape_ndx = cur.get_u8()?;
                cur.skip(6)?;
                let logo_name = CountedString16::parse(cur)?;
                Ok(Self::Logo {
                    common,
                    color_ndx,
                    shape_ndx,
                    logo_name,
                })
            }
            _ => Err(Error::UnknownTag),
        }
    }
}

/// Name and value string pair attached to a geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Property<'a> {
    /// Property name
    pub name: CountedString16<'a>,
    /// Property value
    pub value: CountedString16<'a>,
}

impl<'a> Property<'a> {
    /// Encoded size of the record
    #[inline]
    pub fn wire_len(&self) -> usize {
        self.name.wire_len() + self.value.wire_len()
    }

    /// Encode the record at the cursor position
    pub fn emit(&self, cur: &mut WriteCursor<'_>) -> Result<()> {
        self.name.emit(cur)?;
        self.value.emit(cur)
    }
}

impl<'a> WireView<'a> for Property<'a> {
    fn parse(cur: &mut ReadCursor<'a>) -> Result<Self> {
        let name = CountedString16::parse(cur)?;
        let value = CountedString16::parse(cur)?;
        Ok(Self { name, value })
    }
}

/// Borrowed view of one section record
#[derive(Debug, Clone, Copy)]
pub struct Section<'a> {
    /// Name atom of the section
    pub name: Atom,
    /// Offset from the keyboard top
    pub top: i16,
    /// Offset from the keyboard left edge
    pub left: i16,
    /// Section width in geometry units
    pub width: u16,
    /// Section height in geometry units
    pub height: u16,
    /// Rotation in tenths of a degree
    pub angle: i16,
    /// Drawing priority
    pub priority: u8,
    rows: VarSlice<'a, Row<'a>>,
    doodads: VarSlice<'a, Doodad<'a>>,
    overlays: VarSlice<'a, Overlay<'a>>,
}

impl<'a> Section<'a> {
    /// The section's key rows
    #[inline]
    pub fn rows(&self) -> VarSlice<'a, Row<'a>> {
        self.rows
    }

    /// Doodads drawn within the section
    #[inline]
    pub fn doodads(&self) -> VarSlice<'a, Doodad<'a>> {
        self.doodads
    }

    /// Overlays covering the section
    #[inline]
    pub fn overlays(&self) -> VarSlice<'a, Overlay<'a>> {
        self.overlays
    }
}

impl<'a> WireView<'a> for Section<'a> {
    fn parse(cur: &mut ReadCursor<'a>) -> Result<Self> {
        let name = cur.get_u32()?;
        let top = cur.get_i16()?;
        let left = cur.get_i16()?;
        let width = cur.get_u16()?;
        let height = cur.get_u16()?;
        let angle = cur.get_i16()?;
        let priority = cur.get_u8()?;
        let n_rows = cur.get_u8()? as usize;
        let n_doodads = cur.get_u8()? as usize;
        let n_overlays = cur.get_u8()? as usize;
        cur.skip(2)?;
        let rows = VarSlice::parse(cur, n_rows)?;
        let doodads = VarSlice::parse(cur, n_doodads)?;
        let overlays = VarSlice::parse(cur, n_overlays)?;
        Ok(Self {
            name,
            top,
            left,
            width,
            height,
            angle,
            priority,
            rows,
            doodads,
            overlays,
        })
    }
}

/// Builder for one section record
#[derive(Debug, Clone, Copy)]
pub struct SectionSpec<'a> {
    /// Name atom of the section
    pub name: Atom,
    /// Offset from the keyboard top
    pub top: i16,
    /// Offset from the keyboard left edge
    pub left: i16,
    /// Section width in geometry units
    pub width: u16,
    /// Section height in geometry units
    pub height: u16,
    /// Rotation in tenths of a degree
    pub angle: i16,
    /// Drawing priority
    pub priority: u8,
    /// The section's key rows
    pub rows: &'a [RowSpec<'a>],
    /// Doodads drawn within the section
    pub doodads: &'a [Doodad<'a>],
    /// Overlays covering the section
    pub overlays: &'a [OverlaySpec<'a>],
}

impl<'a> SectionSpec<'a> {
    fn check_counts(&self) -> Result<()> {
        if self.rows.len() > u8::MAX as usize
            || self.doodads.len() > u8::MAX as usize
            || self.overlays.len() > u8::MAX as usize
        {
            return Err(Error::CountOverflow);
        }
        Ok(())
    }

    /// Encoded size of the record
    pub fn wire_len(&self) -> Result<usize> {
        self.check_counts()?;
        let mut len = 20usize;
        for row in self.rows {
            len = len.checked_add(row.wire_len()?).ok_or(Error::Overflow)?;
        }
        for doodad in self.doodads {
            len = len.checked_add(doodad.wire_len()).ok_or(Error::Overflow)?;
        }
        for overlay in self.overlays {
            len = len.checked_add(overlay.wire_len()?).ok_or(Error::Overflow)?;
        }
        Ok(len)
    }

    /// Encode the record at the cursor position
    pub fn emit(&self, cur: &mut WriteCursor<'_>) -> Result<()> {
        self.check_counts()?;
        cur.put_u32(self.name)?;
        cur.put_i16(self.top)?;
        cur.put_i16(self.left)?;
        cur.put_u16(self.width)?;
        cur.put_u16(self.height)?;
        cur.put_i16(self.angle)?;
        cur.put_u8(self.priority)?;
        cur.put_u8(self.rows.len() as u8)?;
        cur.put_u8(self.doodads.len() as u8)?;
        cur.put_u8(self.overlays.len() as u8)?;
        cur.put_zeros(2)?;
        for row in self.rows {
            row.emit(cur)?;
        }
        for doodad in self.doodads {
            doodad.emit(cur)?;
        }
        for overlay in self.overlays {
            overlay.emit(cur)?;
        }
        Ok(())
    }
}

/// Borrowed view of a complete keyboard geometry body
#[derive(Debug, Clone, Copy)]
pub struct KbGeometry<'a> {
    label_font: CountedString16<'a>,
    properties: VarSlice<'a, Property<'a>>,
    colors: VarSlice<'a, CountedString16<'a>>,
    shapes: VarSlice<'a, Shape<'a>>,
    sections: VarSlice<'a, Section<'a>>,
    doodads: VarSlice<'a, Doodad<'a>>,
    key_aliases: FixedSlice<'a, KeyAlias>,
}

impl<'a> KbGeometry<'a> {
    /// Decode a body whose shape `layout` describes
    pub fn parse(cur: &mut ReadCursor<'a>, layout: &GeometryLayout) -> Result<Self> {
        let label_font = CountedString16::parse(cur)?;
        let properties = VarSlice::parse(cur, layout.n_properties as usize)?;
        let colors = VarSlice::parse(cur, layout.n_colors as usize)?;
        let shapes = VarSlice::parse(cur, layout.n_shapes as usize)?;
        let sections = VarSlice::parse(cur, layout.n_sections as usize)?;
        let doodads = VarSlice::parse(cur, layout.n_doodads as usize)?;
        let key_aliases = FixedSlice::parse(cur, layout.n_key_aliases as usize)?;
        Ok(Self {
            label_font,
            properties,
            colors,
            shapes,
            sections,
            doodads,
            key_aliases,
        })
    }

    /// Decode a body at the start of `buf`, returning the view and the
    /// number of bytes it occupies
    pub fn unpack(buf: &'a [u8], layout: &GeometryLayout) -> Result<(Self, usize)> {
        let mut cur = ReadCursor::new(buf);
        let view = Self::parse(&mut cur, layout)?;
        Ok((view, cur.position()))
    }

    /// Number of bytes the body at the start of `buf` occupies
    #[inline]
    pub fn size_of(buf: &'a [u8], layout: &GeometryLayout) -> Result<usize> {
        Ok(Self::unpack(buf, layout)?.1)
    }

    /// Font used to draw key labels
    #[inline]
    pub fn label_font(&self) -> CountedString16<'a> {
        self.label_font
    }

    /// Properties attached to the geometry
    #[inline]
    pub fn properties(&self) -> VarSlice<'a, Property<'a>> {
        self.properties
    }

    /// Color names; indexes elsewhere refer into this list
    #[inline]
    pub fn colors(&self) -> VarSlice<'a, CountedString16<'a>> {
        self.colors
    }

    /// Color name at `ndx`
    #[inline]
    pub fn color(&self, ndx: u8) -> Option<CountedString16<'a>> {
        self.colors.iter().nth(ndx as usize)
    }

    /// Key shapes; indexes elsewhere refer into this list
    #[inline]
    pub fn shapes(&self) -> VarSlice<'a, Shape<'a>> {
        self.shapes
    }

    /// Shape at `ndx`
    #[inline]
    pub fn shape(&self, ndx: u8) -> Option<Shape<'a>> {
        self.shapes.iter().nth(ndx as usize)
    }

    /// The keyboard's sections
    #[inline]
    pub fn sections(&self) -> VarSlice<'a, Section<'a>> {
        self.sections
    }

    /// Doodads drawn outside any section
    #[inline]
    pub fn doodads(&self) -> VarSlice<'a, Doodad<'a>> {
        self.doodads
    }

    /// Key alias pairs
    #[inline]
    pub fn key_aliases(&self) -> FixedSlice<'a, KeyAlias> {
        self.key_aliases
    }
}

/// Builder for a complete keyboard geometry body
#[derive(Debug, Clone, Copy)]
pub struct KbGeometrySpec<'a> {
    /// Font used to draw key labels
    pub label_font: CountedString16<'a>,
    /// Properties attached to the geometry
    pub properties: &'a [Property<'a>],
    /// Color names
    pub colors: &'a [CountedString16<'a>],
    /// Key shapes
    pub shapes: &'a [ShapeSpec<'a>],
    /// The keyboard's sections
    pub sections: &'a [SectionSpec<'a>],
    /// Doodads drawn outside any section
    pub doodads: &'a [Doodad<'a>],
    /// Key alias pairs
    pub key_aliases: &'a [KeyAlias],
}

impl<'a> KbGeometrySpec<'a> {
    fn check_counts(&self) -> Result<()> {
        if self.properties.len() > u16::MAX as usize
            || self.colors.len() > u16::MAX as usize
            || self.shapes.len() > u16::MAX as usize
            || self.sections.len() > u16::MAX as usize
            || self.doodads.len() > u16::MAX as usize
            || self.key_aliases.len() > u16::MAX as usize
        {
            return Err(Error::CountOverflow);
        }
        Ok(())
    }

    /// Counts to carry in the fixed part for this body
    pub fn layout(&self) -> Result<GeometryLayout> {
        self.check_counts()?;
        Ok(GeometryLayout {
            n_properties: self.properties.len() as u16,
            n_colors: self.colors.len() as u16,
            n_shapes: self.shapes.len() as u16,
            n_sections: self.sections.len() as u16,
            n_doodads: self.doodads.len() as u16,
            n_key_aliases: self.key_aliases.len() as u16,
        })
    }

    /// Encoded size of the body
    pub fn wire_len(&self) -> Result<usize> {
        self.check_counts()?;
        let mut len = self.label_font.wire_len();
        let mut grow = |len: &mut usize, add: usize| -> Result<()> {
            *len = len.checked_add(add).ok_or(Error::Overflow)?;
            Ok(())
        };
        for property in self.properties {
            grow(&mut len, property.wire_len())?;
        }
        for color in self.colors {
            grow(&mut len, color.wire_len())?;
        }
        for shape in self.shapes {
            grow(&mut len, shape.wire_len()?)?;
        }
        for section in self.sections {
            grow(&mut len, section.wire_len()?)?;
        }
        for doodad in self.doodads {
            grow(&mut len, doodad.wire_len())?;
        }
        grow(&mut len, run_len::<KeyAlias>(self.key_aliases.len())?)?;
        Ok(len)
    }

    /// Encode the body at the cursor position
    pub fn emit(&self, cur: &mut WriteCursor<'_>) -> Result<()> {
        self.check_counts()?;
        self.label_font.emit(cur)?;
        for property in self.properties {
            property.emit(cur)?;
        }
        for color in self.colors {
            color.emit(cur)?;
        }
        for shape in self.shapes {
            shape.emit(cur)?;
        }
        for section in self.sections {
            section.emit(cur)?;
        }
        for doodad in self.doodads {
            doodad.emit(cur)?;
        }
        put_run(cur, self.key_aliases)
    }

    /// Encode the body into a fresh buffer
    pub fn serialize(&self) -> Result<Vec<u8>> {
        serialize_exact(self.wire_len()?, |cur| self.emit(cur))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_points() -> [Point; 3] {
        [
            Point { x: 0, y: 0 },
            Point { x: 190, y: 0 },
            Point { x: 190, y: 190 },
        ]
    }

    #[test]
    fn test_header_roundtrip() {
        let hdr = GeometryHeader {
            response_type: 1,
            device_id: 3,
            sequence: 9,
            length: 100,
            name: 0x123,
            found: true,
            width_mm: 470,
            height_mm: 180,
            n_properties: 1,
            n_colors: 2,
            n_shapes: 3,
            n_sections: 1,
            n_doodads: 1,
            n_key_aliases: 2,
            base_color_ndx: 0,
            label_color_ndx: 1,
        };
        let mut buf = std::vec![0u8; GeometryHeader::SIZE];
        let mut cur = WriteCursor::new(&mut buf);
        hdr.emit(&mut cur).unwrap();
        assert_eq!(cur.remaining(), 0);

        let mut cur = ReadCursor::new(&buf);
        assert_eq!(GeometryHeader::parse(&mut cur).unwrap(), hdr);
    }

    #[test]
    fn test_outline_roundtrip() {
        let points = sample_points();
        let spec = OutlineSpec {
            corner_radius: 10,
            points: &points,
        };
        assert_eq!(spec.wire_len().unwrap(), 4 + 12);

        let mut buf = std::vec![0u8; 16];
        let mut wr = WriteCursor::new(&mut buf);
        spec.emit(&mut wr).unwrap();

        let mut rd = ReadCursor::new(&buf);
        let view = Outline::parse(&mut rd).unwrap();
        assert_eq!(view.corner_radius, 10);
        assert_eq!(view.points().len(), 3);
        assert_eq!(view.points().get(1), Some(Point { x: 190, y: 0 }));
        assert!(rd.is_at_end());
    }

    #[test]
    fn test_shape_outline_indexes() {
        let points = sample_points();
        let outlines = [
            OutlineSpec {
                corner_radius: 0,
                points: &points,
            },
            OutlineSpec {
                corner_radius: 5,
                points: &points[..1],
            },
        ];
        let spec = ShapeSpec {
            name: 0x42,
            primary_ndx: 1,
            approx_ndx: 0,
            outlines: &outlines,
        };
        assert_eq!(spec.wire_len().unwrap(), 8 + 16 + 8);

        let mut buf = std::vec![0u8; 32];
        let mut wr = WriteCursor::new(&mut buf);
        spec.emit(&mut wr).unwrap();

        let mut rd = ReadCursor::new(&buf);
        let view = Shape::parse(&mut rd).unwrap();
        assert_eq!(view.name, 0x42);
        assert_eq!(view.outlines().len(), 2);
        assert_eq!(view.primary().unwrap().corner_radius, 5);
        assert_eq!(view.approx().unwrap().points().len(), 3);
        assert!(view.outline(2).is_none());
    }

    #[test]
    fn test_row_roundtrip() {
        let keys = [
            Key {
                name: *b"AE01",
                gap: 0,
                shape_ndx: 0,
                color_ndx: 0,
            },
            Key {
                name: *b"AE02",
                gap: 5,
                shape_ndx: 1,
                color_ndx: 0,
            },
        ];
        let spec = RowSpec {
            top: 0,
            left: 19,
            vertical: false,
            keys: &keys,
        };
        assert_eq!(spec.wire_len().unwrap(), 8 + 16);

        let mut buf = std::vec![0u8; 24];
        let mut wr = WriteCursor::new(&mut buf);
        spec.emit(&mut wr).unwrap();

        let mut rd = ReadCursor::new(&buf);
        let view = Row::parse(&mut rd).unwrap();
        assert_eq!(view.left, 19);
        assert!(!view.vertical);
        assert_eq!(view.keys().get(1), Some(keys[1]));
    }

    #[test]
    fn test_overlay_roundtrip() {
        let keys = [OverlayKey {
            over: *b"KPEN",
            under: *b"KP3\0",
        }];
        let rows = [OverlayRowSpec {
            row_under: 2,
            keys: &keys,
        }];
        let spec = OverlaySpec {
            name: 0x77,
            rows: &rows,
        };
        assert_eq!(spec.wire_len().unwrap(), 8 + 4 + 8);

        let mut buf = std::vec![0u8; 20];
        let mut wr = WriteCursor::new(&mut buf);
        spec.emit(&mut wr).unwrap();

        let mut rd = ReadCursor::new(&buf);
        let view = Overlay::parse(&mut rd).unwrap();
        assert_eq!(view.name, 0x77);
        let row = view.rows().iter().next().unwrap();
        assert_eq!(row.row_under, 2);
        assert_eq!(row.keys().get(0).unwrap().over, *b"KPEN");
    }

    #[test]
    fn test_doodad_fixed_kinds() {
        let common = DoodadCommon {
            name: 0x10,
            priority: 3,
            top: 10,
            left: -20,
            angle: 900,
        };
        for doodad in [
            Doodad::Outline {
                common,
                color_ndx: 1,
                shape_ndx: 2,
            },
            Doodad::Solid {
                common,
                color_ndx: 1,
                shape_ndx: 2,
            },
            Doodad::Indicator {
                common,
                on_color_ndx: 1,
                off_color_ndx: 2,
                shape_ndx: 3,
            },
        ] {
            let bytes = doodad.serialize().unwrap();
            assert_eq!(bytes.len(), 20);
            assert_eq!(bytes[4], doodad.kind());

            let mut rd = ReadCursor::new(&bytes);
            let back = Doodad::parse(&mut rd).unwrap();
            assert_eq!(back, doodad);
            assert_eq!(back.common(), common);
        }
    }

    #[test]
    fn test_doodad_text_strings() {
        let doodad = Doodad::Text {
            common: DoodadCommon::default(),
            width: 40,
            height: 10,
            color_ndx: 1,
            text: CountedString16::new(b"Esc").unwrap(),
            font: CountedString16::new(b"fixed").unwrap(),
        };
        // 20 fixed + 8 text + 8 font
        assert_eq!(doodad.wire_len(), 36);
        let bytes = doodad.serialize().unwrap();
        assert_eq!(&bytes[22..25], b"Esc");

        let mut rd = ReadCursor::new(&bytes);
        let back = Doodad::parse(&mut rd).unwrap();
        assert_eq!(back, doodad);
        assert!(rd.is_at_end());
    }

    #[test]
    fn test_doodad_logo_roundtrip() {
        let doodad = Doodad::Logo {
            common: DoodadCommon::default(),
            color_ndx: 0,
            shape_ndx: 4,
            logo_name: CountedString16::new(b"acme").unwrap(),
        };
        assert_eq!(doodad.wire_len(), 28);
        let bytes = doodad.serialize().unwrap();

        let mut rd = ReadCursor::new(&bytes);
        assert_eq!(Doodad::parse(&mut rd).unwrap(), doodad);
    }

    #[test]
    fn test_doodad_unknown_kind() {
        let doodad = Doodad::Solid {
            common: DoodadCommon::default(),
            color_ndx: 0,
            shape_ndx: 0,
        };
        let mut bytes = doodad.serialize().unwrap();
        bytes[4] = 9;
        let mut rd = ReadCursor::new(&bytes);
        assert_eq!(Doodad::parse(&mut rd), Err(Error::UnknownTag));
    }

    #[test]
    fn test_property_roundtrip() {
        let prop = Property {
            name: CountedString16::new(b"vendor").unwrap(),
            value: CountedString16::new(b"acme kb").unwrap(),
        };
        let mut buf = std::vec![0u8; prop.wire_len()];
        let mut wr = WriteCursor::new(&mut buf);
        prop.emit(&mut wr).unwrap();
        assert_eq!(wr.remaining(), 0);

        let mut rd = ReadCursor::new(&buf);
        let back = Property::parse(&mut rd).unwrap();
        assert_eq!(back.name.bytes(), b"vendor");
        assert_eq!(back.value.bytes(), b"acme kb");
    }

    #[test]
    fn test_section_roundtrip() {
        let keys = [
            Key {
                name: *b"ESC\0",
                gap: 0,
                shape_ndx: 0,
                color_ndx: 0,
            },
            Key {
                name: *b"FK01",
                gap: 19,
                shape_ndx: 0,
                color_ndx: 0,
            },
        ];
        let rows = [RowSpec {
            top: 0,
            left: 0,
            vertical: false,
            keys: &keys,
        }];
        let doodads = [Doodad::Indicator {
            common: DoodadCommon {
                name: 0x30,
                priority: 0,
                top: 5,
                left: 400,
                angle: 0,
            },
            on_color_ndx: 3,
            off_color_ndx: 4,
            shape_ndx: 1,
        }];
        let okeys = [OverlayKey {
            over: *b"KP0\0",
            under: *b"INS\0",
        }];
        let orows = [OverlayRowSpec {
            row_under: 0,
            keys: &okeys,
        }];
        let overlays = [OverlaySpec {
            name: 0x31,
            rows: &orows,
        }];
        let spec = SectionSpec {
            name: 0x20,
            top: 0,
            left: 0,
            width: 1900,
            height: 190,
            angle: 0,
            priority: 1,
            rows: &rows,
            doodads: &doodads,
            overlays: &overlays,
        };
        // 20 fixed + (8 + 16) row + 20 doodad + (8 + 4 + 8) overlay
        assert_eq!(spec.wire_len().unwrap(), 84);

        let mut buf = std::vec![0u8; 84];
        let mut wr = WriteCursor::new(&mut buf);
        spec.emit(&mut wr).unwrap();
        assert_eq!(wr.remaining(), 0);

        let mut rd = ReadCursor::new(&buf);
        let view = Section::parse(&mut rd).unwrap();
        assert_eq!(view.name, 0x20);
        assert_eq!(view.width, 1900);
        assert_eq!(view.rows().len(), 1);
        assert_eq!(view.doodads().len(), 1);
        assert_eq!(view.overlays().len(), 1);
        let row = view.rows().iter().next().unwrap();
        assert_eq!(row.keys().get(0).unwrap().name, *b"ESC\0");
        assert!(rd.is_at_end());
    }

    #[test]
    fn test_section_count_overflow() {
        let rows = [RowSpec {
            top: 0,
            left: 0,
            vertical: false,
            keys: &[],
        }; 256];
        let spec = SectionSpec {
            name: 0,
            top: 0,
            left: 0,
            width: 0,
            height: 0,
            angle: 0,
            priority: 0,
            rows: &rows,
            doodads: &[],
            overlays: &[],
        };
        assert_eq!(spec.wire_len(), Err(Error::CountOverflow));
    }

    #[test]
    fn test_geometry_body_roundtrip() {
        let points = sample_points();
        let outlines = [OutlineSpec {
            corner_radius: 0,
            points: &points,
        }];
        let shapes = [ShapeSpec {
            name: 0x200,
            primary_ndx: 0,
            approx_ndx: 0,
            outlines: &outlines,
        }];
        let keys = [Key {
            name: *b"AE01",
            gap: 0,
            shape_ndx: 0,
            color_ndx: 1,
        }];
        let rows = [RowSpec {
            top: 0,
            left: 0,
            vertical: false,
            keys: &keys,
        }];
        let sections = [SectionSpec {
            name: 0x201,
            top: 0,
            left: 0,
            width: 1900,
            height: 190,
            angle: 0,
            priority: 0,
            rows: &rows,
            doodads: &[],
            overlays: &[],
        }];
        let properties = [Property {
            name: CountedString16::new(b"model").unwrap(),
            value: CountedString16::new(b"pc105").unwrap(),
        }];
        let colors = [
            CountedString16::new(b"black").unwrap(),
            CountedString16::new(b"white").unwrap(),
        ];
        let doodads = [Doodad::Logo {
            common: DoodadCommon::default(),
            color_ndx: 1,
            shape_ndx: 0,
            logo_name: CountedString16::new(b"acme").unwrap(),
        }];
        let aliases = [KeyAlias {
            real: *b"LSGT",
            alias: *b"LESS",
        }];
        let spec = KbGeometrySpec {
            label_font: CountedString16::new(b"helvetica").unwrap(),
            properties: &properties,
            colors: &colors,
            shapes: &shapes,
            sections: &sections,
            doodads: &doodads,
            key_aliases: &aliases,
        };

        let bytes = spec.serialize().unwrap();
        let layout = spec.layout().unwrap();
        assert_eq!(
            layout,
            GeometryLayout {
                n_properties: 1,
                n_colors: 2,
                n_shapes: 1,
                n_sections: 1,
                n_doodads: 1,
                n_key_aliases: 1,
            }
        );

        let (view, consumed) = KbGeometry::unpack(&bytes, &layout).unwrap();
        assert_eq!(consumed, bytes.len());
        assert_eq!(view.label_font().bytes(), b"helvetica");
        assert_eq!(view.properties().len(), 1);
        assert_eq!(view.color(1).unwrap().bytes(), b"white");
        assert_eq!(view.color(2), None);
        assert_eq!(view.shape(0).unwrap().name, 0x200);
        assert_eq!(view.sections().len(), 1);
        assert_eq!(view.doodads().iter().next().unwrap().kind(), DoodadKind::LOGO);
        assert_eq!(view.key_aliases().get(0), Some(aliases[0]));
    }

    #[test]
    fn test_geometry_body_truncated() {
        let spec = KbGeometrySpec {
            label_font: CountedString16::new(b"fixed").unwrap(),
            properties: &[],
            colors: &[],
            shapes: &[],
            sections: &[],
            doodads: &[],
            key_aliases: &[],
        };
        let bytes = spec.serialize().unwrap();
        let layout = spec.layout().unwrap();
        let err = KbGeometry::unpack(&bytes[..bytes.len() - 2], &layout).unwrap_err();
        assert_eq!(err, Error::TruncatedBuffer);
    }
}
