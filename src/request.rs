//! Request assembly and the transport seam
//!
//! Builders turn typed arguments and payload specs into a [`ScatterList`]
//! of owned segments holding everything after the 4-byte request prologue
//! (major opcode, minor opcode, length), which the transport owns. The
//! [`Transport`] implementation sends the segments and later hands back an
//! owned reply buffer; reply wrappers validate the generic 32-byte reply
//! prologue and expose variable bodies through the view codecs.
//!
//! Nothing here connects, blocks, or tracks sequence numbers. That is the
//! transport's job, on the far side of the trait.

use core::fmt;
use core::marker::PhantomData;

use alloc::vec;
use alloc::vec::Vec;

use crate::align::pad_for;
use crate::compat::{CompatHeader, CompatParts, CompatPartsSpec};
use crate::cursor::{serialize_exact, ReadCursor};
use crate::error::{Error, Result};
use crate::events::EventDetails;
use crate::geometry::{GeometryHeader, KbGeometry, KbGeometrySpec};
use crate::indicator::{
    DeviceInfoHeader, DeviceInfoParts, DeviceLedInfoSpec, IndicatorMapHeader, IndicatorMaps,
    IndicatorMapsSpec,
};
use crate::map::{KbdByNameHeader, KbdByNameReplies, MapHeader, MapParts, MapPartsSpec};
use crate::names::{NameList, NameListSpec, NamesHeader};
use crate::text::{ComponentCounts, ComponentNames};
use crate::types::{Action, Atom, Keycode};
use crate::wire::{put_run, run_len};

/// Compile-time descriptor of the extension this crate speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extension {
    /// Name presented to the server during extension query
    pub name: &'static str,
    /// Major protocol version the client implements
    pub major_version: u16,
    /// Minor protocol version the client implements
    pub minor_version: u16,
}

/// The keyboard extension
///
/// The transport resolves the server-assigned major opcode for this name
/// once at connection setup; this crate only deals in minor opcodes.
pub const EXTENSION: Extension = Extension {
    name: "XKEYBOARD",
    major_version: 1,
    minor_version: 0,
};

/// Minor request opcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode;

impl Opcode {
    /// Negotiate extension versions
    pub const USE_EXTENSION: u8 = 0;
    /// Select event delivery
    pub const SELECT_EVENTS: u8 = 1;
    /// Ring or configure the bell
    pub const BELL: u8 = 3;
    /// Query keyboard state
    pub const GET_STATE: u8 = 4;
    /// Latch and lock modifiers and groups
    pub const LATCH_LOCK_STATE: u8 = 5;
    /// Query keyboard controls
    pub const GET_CONTROLS: u8 = 6;
    /// Query the keyboard map
    pub const GET_MAP: u8 = 8;
    /// Replace parts of the keyboard map
    pub const SET_MAP: u8 = 9;
    /// Query the compatibility map
    pub const GET_COMPAT_MAP: u8 = 10;
    /// Replace the compatibility map
    pub const SET_COMPAT_MAP: u8 = 11;
    /// Query indicator lit state
    pub const GET_INDICATOR_STATE: u8 = 12;
    /// Query indicator maps
    pub const GET_INDICATOR_MAP: u8 = 13;
    /// Replace indicator maps
    pub const SET_INDICATOR_MAP: u8 = 14;
    /// Query symbolic names
    pub const GET_NAMES: u8 = 17;
    /// Replace symbolic names
    pub const SET_NAMES: u8 = 18;
    /// Query keyboard geometry
    pub const GET_GEOMETRY: u8 = 19;
    /// Replace keyboard geometry
    pub const SET_GEOMETRY: u8 = 20;
    /// Change per-client flags
    pub const PER_CLIENT_FLAGS: u8 = 21;
    /// List server keymap components
    pub const LIST_COMPONENTS: u8 = 22;
    /// Build a keyboard description by component names
    pub const GET_KBD_BY_NAME: u8 = 23;
    /// Query an input device's buttons and indicators
    pub const GET_DEVICE_INFO: u8 = 24;
    /// Change an input device's buttons and indicators
    pub const SET_DEVICE_INFO: u8 = 25;
}

/// Flag bits for the set-map request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetMapFlag;

impl SetMapFlag {
    /// Grow or shrink the key type table to fit
    pub const RESIZE_TYPES: u16 = 0x0001;
    /// Recompute actions for the changed keys
    pub const RECOMPUTE_ACTIONS: u16 = 0x0002;
}

/// What one protocol operation looks like to the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestInfo {
    /// Minor opcode within the extension
    pub opcode: u8,
    /// The request produces no reply
    pub is_void: bool,
}

/// Owned request segments, in send order
///
/// Holds everything after the 4-byte request prologue. The total is padded
/// to the 4-byte request unit before sending.
#[derive(Debug, Clone, Default)]
pub struct ScatterList {
    segments: Vec<Vec<u8>>,
}

impl ScatterList {
    /// An empty list
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one segment
    #[inline]
    pub fn push(&mut self, segment: Vec<u8>) {
        self.segments.push(segment);
    }

    /// Total byte length across all segments
    pub fn total_len(&self) -> usize {
        self.segments.iter().map(Vec::len).sum()
    }

    /// Pad the total to a multiple of the 4-byte request unit
    pub fn pad_to_unit(&mut self) {
        let pad = pad_for(self.total_len(), crate::REQUEST_UNIT);
        if pad > 0 {
            self.segments.push(vec![0; pad]);
        }
    }

    /// The segments in send order
    #[inline]
    pub fn segments(&self) -> &[Vec<u8>] {
        &self.segments
    }

    /// Copy all segments into one contiguous buffer
    pub fn concat(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.total_len());
        for segment in &self.segments {
            out.extend_from_slice(segment);
        }
        out
    }
}

/// Sends assembled requests and returns raw reply buffers
///
/// Implementations own the connection, the major opcode, and sequence
/// number bookkeeping. `send_request` returns an opaque handle that
/// `wait_for_reply` later redeems for the reply bytes.
pub trait Transport {
    /// Transport-level failure type
    type Error;

    /// Queue one request for sending
    fn send_request(
        &mut self,
        info: &RequestInfo,
        body: &ScatterList,
    ) -> core::result::Result<u64, Self::Error>;

    /// Block until the reply for `handle` arrives and hand over its buffer
    fn wait_for_reply(&mut self, handle: u64) -> core::result::Result<Vec<u8>, Self::Error>;
}

/// Failure of a request round-trip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyError<E> {
    /// The transport failed to send or receive
    Transport(E),
    /// The reply bytes failed wire validation
    Wire(Error),
}

impl<E> From<Error> for ReplyError<E> {
    #[inline]
    fn from(err: Error) -> Self {
        Self::Wire(err)
    }
}

#[cfg(feature = "std")]
impl<E: fmt::Display> fmt::Display for ReplyError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(err) => write!(f, "transport error: {}", err),
            Self::Wire(err) => write!(f, "wire error: {}", err),
        }
    }
}

#[cfg(feature = "std")]
impl<E: fmt::Debug + fmt::Display> std::error::Error for ReplyError<E> {}

/// Outcome of building and sending a request, or fetching its reply
pub type SendResult<R, E> = core::result::Result<R, ReplyError<E>>;

/// Decode a typed reply from an owned transport buffer
pub trait FromReply: Sized {
    /// Validate and decode `buf`
    fn from_reply(buf: Vec<u8>) -> Result<Self>;
}

/// Typed handle for a pending reply
pub struct Cookie<R> {
    id: u64,
    _marker: PhantomData<fn() -> R>,
}

impl<R> Cookie<R> {
    #[inline]
    fn new(id: u64) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }

    /// The transport handle this cookie redeems
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl<R: FromReply> Cookie<R> {
    /// Block on the transport and decode the reply
    pub fn fetch_reply<T: Transport>(self, transport: &mut T) -> SendResult<R, T::Error> {
        let buf = transport
            .wait_for_reply(self.id)
            .map_err(ReplyError::Transport)?;
        Ok(R::from_reply(buf)?)
    }
}

impl<R> fmt::Debug for Cookie<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Cookie").field(&self.id).finish()
    }
}

impl<R> Clone for Cookie<R> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for Cookie<R> {}

/// Handle for a request that produces no reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoidCookie {
    id: u64,
}

impl VoidCookie {
    /// The transport handle assigned when the request was sent
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Discriminant byte opening every successful reply
const REPLY_CODE: u8 = 1;

/// Validate the generic 32-byte reply prologue
///
/// The declared length counts 4-byte units past the fixed 32 bytes; it is
/// checked against the actual buffer, never trusted.
pub fn check_reply(buf: &[u8]) -> Result<()> {
    let mut cur = ReadCursor::new(buf);
    if cur.get_u8()? != REPLY_CODE {
        return Err(Error::BadReply);
    }
    cur.skip(3)?;
    let units = cur.get_u32()? as usize;
    let need = units
        .checked_mul(4)
        .and_then(|n| n.checked_add(crate::REPLY_BASE_SIZE))
        .ok_or(Error::Overflow)?;
    if buf.len() < need {
        return Err(Error::TruncatedBuffer);
    }
    Ok(())
}

fn send<T: Transport>(
    transport: &mut T,
    opcode: u8,
    is_void: bool,
    mut body: ScatterList,
) -> SendResult<u64, T::Error> {
    body.pad_to_unit();
    let info = RequestInfo { opcode, is_void };
    transport
        .send_request(&info, &body)
        .map_err(ReplyError::Transport)
}

/// Version negotiation reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UseExtensionReply {
    /// The server accepts the client's major version
    pub supported: bool,
    /// Low bits of the request sequence number
    pub sequence: u16,
    /// Major version the server implements
    pub server_major: u16,
    /// Minor version the server implements
    pub server_minor: u16,
}

impl FromReply for UseExtensionReply {
    fn from_reply(buf: Vec<u8>) -> Result<Self> {
        check_reply(&buf)?;
        let mut cur = ReadCursor::new(&buf);
        cur.skip(1)?;
        let supported = cur.get_u8()? != 0;
        let sequence = cur.get_u16()?;
        cur.skip(4)?;
        let server_major = cur.get_u16()?;
        let server_minor = cur.get_u16()?;
        Ok(Self {
            supported,
            sequence,
            server_major,
            server_minor,
        })
    }
}

/// Keyboard state reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateReply {
    /// Keyboard the state describes
    pub device_id: u8,
    /// Low bits of the request sequence number
    pub sequence: u16,
    /// Effective modifiers
    pub mods: u8,
    /// Base modifiers
    pub base_mods: u8,
    /// Latched modifiers
    pub latched_mods: u8,
    /// Locked modifiers
    pub locked_mods: u8,
    /// Effective group
    pub group: u8,
    /// Locked group
    pub locked_group: u8,
    /// Base group
    pub base_group: i16,
    /// Latched group
    pub latched_group: i16,
    /// Compatibility state
    pub compat_state: u8,
    /// Modifiers in effect for grabs
    pub grab_mods: u8,
    /// Compatibility grab modifiers
    pub compat_grab_mods: u8,
    /// Modifiers in effect for symbol lookup
    pub lookup_mods: u8,
    /// Compatibility lookup modifiers
    pub compat_lookup_mods: u8,
    /// Core pointer button state
    pub ptr_btn_state: u16,
}

impl FromReply for StateReply {
    fn from_reply(buf: Vec<u8>) -> Result<Self> {
        check_reply(&buf)?;
        let mut cur = ReadCursor::new(&buf);
        cur.skip(1)?;
        let device_id = cur.get_u8()?;
        let sequence = cur.get_u16()?;
        cur.skip(4)?;
        let mods = cur.get_u8()?;
        let base_mods = cur.get_u8()?;
        let latched_mods = cur.get_u8()?;
        let locked_mods = cur.get_u8()?;
        let group = cur.get_u8()?;
        let locked_group = cur.get_u8()?;
        let base_group = cur.get_i16()?;
        let latched_group = cur.get_i16()?;
        let compat_state = cur.get_u8()?;
        let grab_mods = cur.get_u8()?;
        let compat_grab_mods = cur.get_u8()?;
        let lookup_mods = cur.get_u8()?;
        let compat_lookup_mods = cur.get_u8()?;
        cur.skip(1)?;
        let ptr_btn_state = cur.get_u16()?;
        Ok(Self {
            device_id,
            sequence,
            mods,
            base_mods,
            latched_mods,
            locked_mods,
            group,
            locked_group,
            base_group,
            latched_group,
            compat_state,
            grab_mods,
            compat_grab_mods,
            lookup_mods,
            compat_lookup_mods,
            ptr_btn_state,
        })
    }
}

/// Keyboard controls reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlsReply {
    /// Keyboard the controls describe
    pub device_id: u8,
    /// Low bits of the request sequence number
    pub sequence: u16,
    /// Default mouse keys button
    pub mouse_keys_dflt_btn: u8,
    /// Number of keyboard groups
    pub num_groups: u8,
    /// Group wrap behavior
    pub groups_wrap: u8,
    /// Internal modifier mask
    pub internal_mods: u8,
    /// Modifiers ignored for locking
    pub ignore_lock_mods: u8,
    /// Real modifiers behind the internal mask
    pub internal_real_mods: u8,
    /// Real modifiers behind the ignore-lock mask
    pub ignore_lock_real_mods: u8,
    /// Virtual modifiers behind the internal mask
    pub internal_vmods: u16,
    /// Virtual modifiers behind the ignore-lock mask
    pub ignore_lock_vmods: u16,
    /// Autorepeat delay in milliseconds
    pub repeat_delay: u16,
    /// Autorepeat interval in milliseconds
    pub repeat_interval: u16,
    /// Slow keys acceptance delay
    pub slow_keys_delay: u16,
    /// Bounce keys debounce delay
    pub debounce_delay: u16,
    /// Mouse keys delay before motion
    pub mouse_keys_delay: u16,
    /// Mouse keys motion interval
    pub mouse_keys_interval: u16,
    /// Mouse keys ramp-up time
    pub mouse_keys_time_to_max: u16,
    /// Mouse keys maximum speed
    pub mouse_keys_max_speed: u16,
    /// Mouse keys acceleration curve
    pub mouse_keys_curve: i16,
    /// AccessX options
    pub access_x_options: u16,
    /// AccessX timeout in seconds
    pub access_x_timeout: u16,
    /// Options changed when the timeout fires
    pub access_x_timeout_options_mask: u16,
    /// Option values applied when the timeout fires
    pub access_x_timeout_options_values: u16,
    /// Controls changed when the timeout fires
    pub access_x_timeout_mask: u32,
    /// Control values applied when the timeout fires
    pub access_x_timeout_values: u32,
    /// Controls currently enabled
    pub enabled_controls: u32,
    /// Per-key autorepeat bitmap
    pub per_key_repeat: [u8; 32],
}

impl FromReply for ControlsReply {
    fn from_reply(buf: Vec<u8>) -> Result<Self> {
        check_reply(&buf)?;
        let mut cur = ReadCursor::new(&buf);
        cur.skip(1)?;
        let device_id = cur.get_u8()?;
        let sequence = cur.get_u16()?;
        cur.skip(4)?;
        let mouse_keys_dflt_btn = cur.get_u8()?;
        let num_groups = cur.get_u8()?;
        let groups_wrap = cur.get_u8()?;
        let internal_mods = cur.get_u8()?;
        let ignore_lock_mods = cur.get_u8()?;
        let internal_real_mods = cur.get_u8()?;
        let ignore_lock_real_mods = cur.get_u8()?;
        cur.skip(1)?;
        let internal_vmods = cur.get_u16()?;
        let ignore_lock_vmods = cur.get_u16()?;
        let repeat_delay = cur.get_u16()?;
        let repeat_interval = cur.get_u16()?;
        let slow_keys_delay = cur.get_u16()?;
        let debounce_delay = cur.get_u16()?;
        let mouse_keys_delay = cur.get_u16()?;
        let mouse_keys_interval = cur.get_u16()?;
        let mouse_keys_time_to_max = cur.get_u16()?;
        let mouse_keys_max_speed = cur.get_u16()?;
        let mouse_keys_curve = cur.get_i16()?;
        let access_x_options = cur.get_u16()?;
        let access_x_timeout = cur.get_u16()?;
        let access_x_timeout_options_mask = cur.get_u16()?;
        let access_x_timeout_options_values = cur.get_u16()?;
        cur.skip(2)?;
        let access_x_timeout_mask = cur.get_u32()?;
        let access_x_timeout_values = cur.get_u32()?;
        let enabled_controls = cur.get_u32()?;
        let mut per_key_repeat = [0u8; 32];
        per_key_repeat.copy_from_slice(cur.take(32)?);
        Ok(Self {
            device_id,
            sequence,
            mouse_keys_dflt_btn,
            num_groups,
            groups_wrap,
            internal_mods,
            ignore_lock_mods,
            internal_real_mods,
            ignore_lock_real_mods,
            internal_vmods,
            ignore_lock_vmods,
            repeat_delay,
            repeat_interval,
            slow_keys_delay,
            debounce_delay,
            mouse_keys_delay,
            mouse_keys_interval,
            mouse_keys_time_to_max,
            mouse_keys_max_speed,
            mouse_keys_curve,
            access_x_options,
            access_x_timeout,
            access_x_timeout_options_mask,
            access_x_timeout_options_values,
            access_x_timeout_mask,
            access_x_timeout_values,
            enabled_controls,
            per_key_repeat,
        })
    }
}

/// Indicator lit state reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorStateReply {
    /// Keyboard the state describes
    pub device_id: u8,
    /// Low bits of the request sequence number
    pub sequence: u16,
    /// Lit state, one bit per indicator
    pub state: u32,
}

impl FromReply for IndicatorStateReply {
    fn from_reply(buf: Vec<u8>) -> Result<Self> {
        check_reply(&buf)?;
        let mut cur = ReadCursor::new(&buf);
        cur.skip(1)?;
        let device_id = cur.get_u8()?;
        let sequence = cur.get_u16()?;
        cur.skip(4)?;
        let state = cur.get_u32()?;
        Ok(Self {
            device_id,
            sequence,
            state,
        })
    }
}

/// Per-client flags reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerClientFlagsReply {
    /// Keyboard the flags apply to
    pub device_id: u8,
    /// Low bits of the request sequence number
    pub sequence: u16,
    /// Flags the server supports
    pub supported: u32,
    /// Flag values now in effect
    pub value: u32,
    /// Controls changed by auto-reset
    pub auto_ctrls: u32,
    /// Control values applied by auto-reset
    pub auto_ctrls_values: u32,
}

impl FromReply for PerClientFlagsReply {
    fn from_reply(buf: Vec<u8>) -> Result<Self> {
        check_reply(&buf)?;
        let mut cur = ReadCursor::new(&buf);
        cur.skip(1)?;
        let device_id = cur.get_u8()?;
        let sequence = cur.get_u16()?;
        cur.skip(4)?;
        let supported = cur.get_u32()?;
        let value = cur.get_u32()?;
        let auto_ctrls = cur.get_u32()?;
        let auto_ctrls_values = cur.get_u32()?;
        Ok(Self {
            device_id,
            sequence,
            supported,
            value,
            auto_ctrls,
            auto_ctrls_values,
        })
    }
}

/// Keyboard map reply owning its transport buffer
#[derive(Debug, Clone)]
pub struct MapReply {
    header: MapHeader,
    buf: Vec<u8>,
}

impl FromReply for MapReply {
    fn from_reply(buf: Vec<u8>) -> Result<Self> {
        check_reply(&buf)?;
        let mut cur = ReadCursor::new(&buf);
        let header = MapHeader::parse(&mut cur)?;
        Ok(Self { header, buf })
    }
}

impl MapReply {
    /// The fixed part
    #[inline]
    pub fn header(&self) -> &MapHeader {
        &self.header
    }

    /// Decode the value list
    pub fn parts(&self) -> Result<MapParts<'_>> {
        let mut cur = ReadCursor::new(&self.buf);
        cur.skip(MapHeader::SIZE)?;
        MapParts::parse(&mut cur, &self.header.layout())
    }
}

/// Compatibility map reply owning its transport buffer
#[derive(Debug, Clone)]
pub struct CompatMapReply {
    header: CompatHeader,
    buf: Vec<u8>,
}

impl FromReply for CompatMapReply {
    fn from_reply(buf: Vec<u8>) -> Result<Self> {
        check_reply(&buf)?;
        let mut cur = ReadCursor::new(&buf);
        let header = CompatHeader::parse(&mut cur)?;
        Ok(Self { header, buf })
    }
}

impl CompatMapReply {
    /// The fixed part
    #[inline]
    pub fn header(&self) -> &CompatHeader {
        &self.header
    }

    /// Decode the symbol interpretation and group modifier runs
    pub fn parts(&self) -> Result<CompatParts<'_>> {
        let mut cur = ReadCursor::new(&self.buf);
        cur.skip(CompatHeader::SIZE)?;
        CompatParts::parse(&mut cur, self.header.n_si_rtrn as usize, self.header.groups_rtrn)
    }
}

/// Indicator map reply owning its transport buffer
#[derive(Debug, Clone)]
pub struct IndicatorMapReply {
    header: IndicatorMapHeader,
    buf: Vec<u8>,
}

impl FromReply for IndicatorMapReply {
    fn from_reply(buf: Vec<u8>) -> Result<Self> {
        check_reply(&buf)?;
        let mut cur = ReadCursor::new(&buf);
        let header = IndicatorMapHeader::parse(&mut cur)?;
        Ok(Self { header, buf })
    }
}

impl IndicatorMapReply {
    /// The fixed part
    #[inline]
    pub fn header(&self) -> &IndicatorMapHeader {
        &self.header
    }

    /// Decode the map run
    pub fn maps(&self) -> Result<IndicatorMaps<'_>> {
        let mut cur = ReadCursor::new(&self.buf);
        cur.skip(IndicatorMapHeader::SIZE)?;
        IndicatorMaps::parse(&mut cur, self.header.which)
    }
}

/// Symbolic names reply owning its transport buffer
#[derive(Debug, Clone)]
pub struct NamesReply {
    header: NamesHeader,
    buf: Vec<u8>,
}

impl FromReply for NamesReply {
    fn from_reply(buf: Vec<u8>) -> Result<Self> {
        check_reply(&buf)?;
        let mut cur = ReadCursor::new(&buf);
        let header = NamesHeader::parse(&mut cur)?;
        Ok(Self { header, buf })
    }
}

impl NamesReply {
    /// The fixed part
    #[inline]
    pub fn header(&self) -> &NamesHeader {
        &self.header
    }

    /// Decode the name value list
    pub fn names(&self) -> Result<NameList<'_>> {
        let mut cur = ReadCursor::new(&self.buf);
        cur.skip(NamesHeader::SIZE)?;
        NameList::parse(&mut cur, &self.header.layout())
    }
}

/// Geometry reply owning its transport buffer
#[derive(Debug, Clone)]
pub struct GeometryReply {
    header: GeometryHeader,
    buf: Vec<u8>,
}

impl FromReply for GeometryReply {
    fn from_reply(buf: Vec<u8>) -> Result<Self> {
        check_reply(&buf)?;
        let mut cur = ReadCursor::new(&buf);
        let header = GeometryHeader::parse(&mut cur)?;
        Ok(Self { header, buf })
    }
}

impl GeometryReply {
    /// The fixed part
    #[inline]
    pub fn header(&self) -> &GeometryHeader {
        &self.header
    }

    /// Decode the geometry body
    pub fn geometry(&self) -> Result<KbGeometry<'_>> {
        let mut cur = ReadCursor::new(&self.buf);
        cur.skip(GeometryHeader::SIZE)?;
        KbGeometry::parse(&mut cur, &self.header.layout())
    }
}

/// Component inventory reply owning its transport buffer
#[derive(Debug, Clone)]
pub struct ListComponentsReply {
    /// Keyboard the inventory was queried against
    pub device_id: u8,
    /// Low bits of the request sequence number
    pub sequence: u16,
    /// Listing counts for the six runs
    pub counts: ComponentCounts,
    /// Components matching the pattern beyond the returned listings
    pub extra: u16,
    buf: Vec<u8>,
}

impl FromReply for ListComponentsReply {
    fn from_reply(buf: Vec<u8>) -> Result<Self> {
        check_reply(&buf)?;
        let mut cur = ReadCursor::new(&buf);
        cur.skip(1)?;
        let device_id = cur.get_u8()?;
        let sequence = cur.get_u16()?;
        cur.skip(4)?;
        let counts = ComponentCounts {
            n_keymaps: cur.get_u16()?,
            n_keycodes: cur.get_u16()?,
            n_types: cur.get_u16()?,
            n_compat_maps: cur.get_u16()?,
            n_symbols: cur.get_u16()?,
            n_geometries: cur.get_u16()?,
        };
        let extra = cur.get_u16()?;
        Ok(Self {
            device_id,
            sequence,
            counts,
            extra,
            buf,
        })
    }
}

impl ListComponentsReply {
    /// Decode the six listing runs
    pub fn names(&self) -> Result<ComponentNames<'_>> {
        let mut cur = ReadCursor::new(&self.buf);
        cur.skip(crate::REPLY_BASE_SIZE)?;
        ComponentNames::parse(&mut cur, &self.counts)
    }
}

/// Keyboard-by-name reply owning its transport buffer
#[derive(Debug, Clone)]
pub struct KbdByNameReply {
    header: KbdByNameHeader,
    buf: Vec<u8>,
}

impl FromReply for KbdByNameReply {
    fn from_reply(buf: Vec<u8>) -> Result<Self> {
        check_reply(&buf)?;
        let mut cur = ReadCursor::new(&buf);
        let header = KbdByNameHeader::parse(&mut cur)?;
        Ok(Self { header, buf })
    }
}

impl KbdByNameReply {
    /// The fixed part
    #[inline]
    pub fn header(&self) -> &KbdByNameHeader {
        &self.header
    }

    /// Decode the reported sub-replies
    pub fn replies(&self) -> Result<KbdByNameReplies<'_>> {
        let mut cur = ReadCursor::new(&self.buf);
        cur.skip(KbdByNameHeader::SIZE)?;
        KbdByNameReplies::parse(&mut cur, self.header.reported)
    }
}

/// Device info reply owning its transport buffer
#[derive(Debug, Clone)]
pub struct DeviceInfoReply {
    header: DeviceInfoHeader,
    buf: Vec<u8>,
}

impl FromReply for DeviceInfoReply {
    fn from_reply(buf: Vec<u8>) -> Result<Self> {
        check_reply(&buf)?;
        let mut cur = ReadCursor::new(&buf);
        let header = DeviceInfoHeader::parse(&mut cur)?;
        Ok(Self { header, buf })
    }
}

impl DeviceInfoReply {
    /// The fixed part
    #[inline]
    pub fn header(&self) -> &DeviceInfoHeader {
        &self.header
    }

    /// Decode the name, button action, and LED runs
    pub fn parts(&self) -> Result<DeviceInfoParts<'_>> {
        let mut cur = ReadCursor::new(&self.buf);
        cur.skip(DeviceInfoHeader::SIZE)?;
        DeviceInfoParts::parse(&mut cur, &self.header.layout())
    }
}

/// Arguments for the select-events request
///
/// The event detail pairs ride separately; only the pairs for event types
/// named by the computed gate are encoded.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectEventsArgs {
    /// Keyboard the selection applies to
    pub device_spec: u16,
    /// Event types whose selection changes
    pub affect_which: u16,
    /// Event types to deselect entirely
    pub clear: u16,
    /// Event types to select with every detail
    pub select_all: u16,
    /// Map notify parts whose selection changes
    pub affect_map: u16,
    /// Map notify parts to select
    pub map: u16,
}

/// Arguments for the bell request
#[derive(Debug, Clone, Copy, Default)]
pub struct BellArgs {
    /// Keyboard to ring
    pub device_spec: u16,
    /// Bell feedback class
    pub bell_class: u16,
    /// Bell feedback id
    pub bell_id: u16,
    /// Volume relative to the base volume
    pub percent: i8,
    /// Ring even when audible bells are disabled
    pub force_sound: bool,
    /// Deliver only the bell event, without sound
    pub event_only: bool,
    /// Pitch override in Hz, 0 for the default
    pub pitch: i16,
    /// Duration override in milliseconds, 0 for the default
    pub duration: i16,
    /// Name reported in the bell event
    pub name: Atom,
    /// Event window
    pub window: u32,
}

/// Arguments for the latch-lock-state request
#[derive(Debug, Clone, Copy, Default)]
pub struct LatchLockStateArgs {
    /// Keyboard to change
    pub device_spec: u16,
    /// Modifier locks to change
    pub affect_mod_locks: u8,
    /// New modifier lock values
    pub mod_locks: u8,
    /// Change the locked group
    pub lock_group: bool,
    /// New locked group
    pub group_lock: u8,
    /// Modifier latches to change
    pub affect_mod_latches: u8,
    /// Change the latched group
    pub latch_group: bool,
    /// New latched group
    pub group_latch: u16,
}

/// Arguments for the get-map request
#[derive(Debug, Clone, Copy, Default)]
pub struct GetMapArgs {
    /// Keyboard to query
    pub device_spec: u16,
    /// Sections wanted in full
    pub full: u16,
    /// Sections wanted over the ranges below
    pub partial: u16,
    /// First key type, for partial type queries
    pub first_type: u8,
    /// Number of key types
    pub n_types: u8,
    /// First key for symbol maps
    pub first_key_sym: Keycode,
    /// Number of keys for symbol maps
    pub n_key_syms: u8,
    /// First key for actions
    pub first_key_action: Keycode,
    /// Number of keys for actions
    pub n_key_actions: u8,
    /// First key for behaviors
    pub first_key_behavior: Keycode,
    /// Number of keys for behaviors
    pub n_key_behaviors: u8,
    /// Virtual modifiers wanted
    pub virtual_mods: u16,
    /// First key for explicit components
    pub first_key_explicit: Keycode,
    /// Number of keys for explicit components
    pub n_key_explicit: u8,
    /// First key for the modifier map
    pub first_mod_map_key: Keycode,
    /// Number of keys for the modifier map
    pub n_mod_map_keys: u8,
    /// First key for the virtual modifier map
    pub first_v_mod_map_key: Keycode,
    /// Number of keys for the virtual modifier map
    pub n_v_mod_map_keys: u8,
}

/// Arguments for the set-map request
///
/// Counts and masks for the value list come from the payload spec; these
/// are the key ranges the sections apply to.
#[derive(Debug, Clone, Copy, Default)]
pub struct SetMapArgs {
    /// Keyboard to change
    pub device_spec: u16,
    /// Set-map flag bits
    pub flags: u16,
    /// Lowest keycode in use
    pub min_key_code: Keycode,
    /// Highest keycode in use
    pub max_key_code: Keycode,
    /// First key type replaced
    pub first_type: u8,
    /// First key the symbol maps cover
    pub first_key_sym: Keycode,
    /// First key the actions cover
    pub first_key_action: Keycode,
    /// First key the behaviors cover
    pub first_key_behavior: Keycode,
    /// Keys the behaviors span
    pub n_key_behaviors: u8,
    /// First key the explicit components cover
    pub first_key_explicit: Keycode,
    /// Keys the explicit components span
    pub n_key_explicit: u8,
    /// First key the modifier map covers
    pub first_mod_map_key: Keycode,
    /// Keys the modifier map spans
    pub n_mod_map_keys: u8,
    /// First key the virtual modifier map covers
    pub first_v_mod_map_key: Keycode,
    /// Keys the virtual modifier map spans
    pub n_v_mod_map_keys: u8,
}

/// Arguments for the per-client-flags request
#[derive(Debug, Clone, Copy, Default)]
pub struct PerClientFlagsArgs {
    /// Keyboard the flags apply to
    pub device_spec: u16,
    /// Flags to change
    pub change: u32,
    /// New flag values
    pub value: u32,
    /// Auto-reset controls to change
    pub ctrls_to_change: u32,
    /// New auto-reset control mask
    pub auto_ctrls: u32,
    /// New auto-reset control values
    pub auto_ctrls_values: u32,
}

/// Arguments for the set-geometry request
///
/// Counts for the value lists come from the payload spec.
#[derive(Debug, Clone, Copy, Default)]
pub struct SetGeometryArgs {
    /// Keyboard to change
    pub device_spec: u16,
    /// Geometry name atom
    pub name: Atom,
    /// Keyboard width in millimeters
    pub width_mm: u16,
    /// Keyboard height in millimeters
    pub height_mm: u16,
    /// Base color index
    pub base_color_ndx: u8,
    /// Label color index
    pub label_color_ndx: u8,
}

/// Arguments for the get-device-info request
#[derive(Debug, Clone, Copy, Default)]
pub struct GetDeviceInfoArgs {
    /// Device to query
    pub device_spec: u16,
    /// Features wanted
    pub wanted: u16,
    /// Return actions for every button
    pub all_buttons: bool,
    /// First button wanted
    pub first_button: u8,
    /// Number of buttons wanted
    pub n_buttons: u8,
    /// LED feedback class filter
    pub led_class: u16,
    /// LED feedback id filter
    pub led_id: u16,
}

/// Announce the client's extension version and learn the server's
pub fn use_extension<T: Transport>(
    transport: &mut T,
) -> SendResult<Cookie<UseExtensionReply>, T::Error> {
    let mut body = ScatterList::new();
    body.push(serialize_exact(4, |cur| {
        cur.put_u16(EXTENSION.major_version)?;
        cur.put_u16(EXTENSION.minor_version)
    })?);
    let id = send(transport, Opcode::USE_EXTENSION, false, body)?;
    Ok(Cookie::new(id))
}

/// Select which events the server delivers to this client
pub fn select_events<T: Transport>(
    transport: &mut T,
    args: &SelectEventsArgs,
    details: &EventDetails,
) -> SendResult<VoidCookie, T::Error> {
    let gated = EventDetails::gate(args.affect_which, args.clear, args.select_all);
    let mut body = ScatterList::new();
    body.push(serialize_exact(12, |cur| {
        cur.put_u16(args.device_spec)?;
        cur.put_u16(args.affect_which)?;
        cur.put_u16(args.clear)?;
        cur.put_u16(args.select_all)?;
        cur.put_u16(args.affect_map)?;
        cur.put_u16(args.map)
    })?);
    body.push(details.serialize(gated)?);
    let id = send(transport, Opcode::SELECT_EVENTS, true, body)?;
    Ok(VoidCookie { id })
}

/// Ring the bell or deliver a bell event
pub fn bell<T: Transport>(transport: &mut T, args: &BellArgs) -> SendResult<VoidCookie, T::Error> {
    let mut body = ScatterList::new();
    body.push(serialize_exact(24, |cur| {
        cur.put_u16(args.device_spec)?;
        cur.put_u16(args.bell_class)?;
        cur.put_u16(args.bell_id)?;
        cur.put_i8(args.percent)?;
        cur.put_u8(args.force_sound as u8)?;
        cur.put_u8(args.event_only as u8)?;
        cur.put_zeros(1)?;
        cur.put_i16(args.pitch)?;
        cur.put_i16(args.duration)?;
        cur.put_zeros(2)?;
        cur.put_u32(args.name)?;
        cur.put_u32(args.window)
    })?);
    let id = send(transport, Opcode::BELL, true, body)?;
    Ok(VoidCookie { id })
}

/// Query the current keyboard state
pub fn get_state<T: Transport>(
    transport: &mut T,
    device_spec: u16,
) -> SendResult<Cookie<StateReply>, T::Error> {
    let mut body = ScatterList::new();
    body.push(serialize_exact(4, |cur| {
        cur.put_u16(device_spec)?;
        cur.put_zeros(2)
    })?);
    let id = send(transport, Opcode::GET_STATE, false, body)?;
    Ok(Cookie::new(id))
}

/// Latch and lock modifiers and groups
pub fn latch_lock_state<T: Transport>(
    transport: &mut T,
    args: &LatchLockStateArgs,
) -> SendResult<VoidCookie, T::Error> {
    let mut body = ScatterList::new();
    body.push(serialize_exact(12, |cur| {
        cur.put_u16(args.device_spec)?;
        cur.put_u8(args.affect_mod_locks)?;
        cur.put_u8(args.mod_locks)?;
        cur.put_u8(args.lock_group as u8)?;
        cur.put_u8(args.group_lock)?;
        cur.put_u8(args.affect_mod_latches)?;
        cur.put_zeros(1)?;
        cur.put_u8(args.latch_group as u8)?;
        cur.put_zeros(1)?;
        cur.put_u16(args.group_latch)
    })?);
    let id = send(transport, Opcode::LATCH_LOCK_STATE, true, body)?;
    Ok(VoidCookie { id })
}

/// Query the keyboard controls
pub fn get_controls<T: Transport>(
    transport: &mut T,
    device_spec: u16,
) -> SendResult<Cookie<ControlsReply>, T::Error> {
    let mut body = ScatterList::new();
    body.push(serialize_exact(4, |cur| {
        cur.put_u16(device_spec)?;
        cur.put_zeros(2)
    })?);
    let id = send(transport, Opcode::GET_CONTROLS, false, body)?;
    Ok(Cookie::new(id))
}

/// Query parts of the keyboard map
pub fn get_map<T: Transport>(
    transport: &mut T,
    args: &GetMapArgs,
) -> SendResult<Cookie<MapReply>, T::Error> {
    let mut body = ScatterList::new();
    body.push(serialize_exact(24, |cur| {
        cur.put_u16(args.device_spec)?;
        cur.put_u16(args.full)?;
        cur.put_u16(args.partial)?;
        cur.put_u8(args.first_type)?;
        cur.put_u8(args.n_types)?;
        cur.put_u8(args.first_key_sym)?;
        cur.put_u8(args.n_key_syms)?;
        cur.put_u8(args.first_key_action)?;
        cur.put_u8(args.n_key_actions)?;
        cur.put_u8(args.first_key_behavior)?;
        cur.put_u8(args.n_key_behaviors)?;
        cur.put_u16(args.virtual_mods)?;
        cur.put_u8(args.first_key_explicit)?;
        cur.put_u8(args.n_key_explicit)?;
        cur.put_u8(args.first_mod_map_key)?;
        cur.put_u8(args.n_mod_map_keys)?;
        cur.put_u8(args.first_v_mod_map_key)?;
        cur.put_u8(args.n_v_mod_map_keys)?;
        cur.put_zeros(2)
    })?);
    let id = send(transport, Opcode::GET_MAP, false, body)?;
    Ok(Cookie::new(id))
}

/// Replace parts of the keyboard map
pub fn set_map<T: Transport>(
    transport: &mut T,
    args: &SetMapArgs,
    spec: &MapPartsSpec<'_>,
) -> SendResult<VoidCookie, T::Error> {
    let layout = spec.layout()?;
    let total_syms: usize = spec
        .syms
        .map_or(0, |maps| maps.iter().map(|m| m.syms.len()).sum());
    if total_syms > u16::MAX as usize {
        return Err(Error::CountOverflow.into());
    }
    let mut body = ScatterList::new();
    body.push(serialize_exact(32, |cur| {
        cur.put_u16(args.device_spec)?;
        cur.put_u16(layout.present)?;
        cur.put_u16(args.flags)?;
        cur.put_u8(args.min_key_code)?;
        cur.put_u8(args.max_key_code)?;
        cur.put_u8(args.first_type)?;
        cur.put_u8(layout.n_types)?;
        cur.put_u8(args.first_key_sym)?;
        cur.put_u8(layout.n_key_syms)?;
        cur.put_u16(total_syms as u16)?;
        cur.put_u8(args.first_key_action)?;
        cur.put_u8(layout.n_key_actions)?;
        cur.put_u16(layout.total_actions)?;
        cur.put_u8(args.first_key_behavior)?;
        cur.put_u8(args.n_key_behaviors)?;
        cur.put_u8(layout.total_key_behaviors)?;
        cur.put_u8(args.first_key_explicit)?;
        cur.put_u8(args.n_key_explicit)?;
        cur.put_u8(layout.total_key_explicit)?;
        cur.put_u8(args.first_mod_map_key)?;
        cur.put_u8(args.n_mod_map_keys)?;
        cur.put_u8(layout.total_mod_map_keys)?;
        cur.put_u8(args.first_v_mod_map_key)?;
        cur.put_u8(args.n_v_mod_map_keys)?;
        cur.put_u8(layout.total_v_mod_map_keys)?;
        cur.put_u16(layout.virtual_mods)
    })?);
    body.push(spec.serialize()?);
    let id = send(transport, Opcode::SET_MAP, true, body)?;
    Ok(VoidCookie { id })
}

/// Query the compatibility map
pub fn get_compat_map<T: Transport>(
    transport: &mut T,
    device_spec: u16,
    groups: u8,
    get_all_si: bool,
    first_si: u16,
    n_si: u16,
) -> SendResult<Cookie<CompatMapReply>, T::Error> {
    let mut body = ScatterList::new();
    body.push(serialize_exact(8, |cur| {
        cur.put_u16(device_spec)?;
        cur.put_u8(groups)?;
        cur.put_u8(get_all_si as u8)?;
        cur.put_u16(first_si)?;
        cur.put_u16(n_si)
    })?);
    let id = send(transport, Opcode::GET_COMPAT_MAP, false, body)?;
    Ok(Cookie::new(id))
}

/// Replace part of the compatibility map
pub fn set_compat_map<T: Transport>(
    transport: &mut T,
    device_spec: u16,
    recompute_actions: bool,
    truncate_si: bool,
    first_si: u16,
    spec: &CompatPartsSpec<'_>,
) -> SendResult<VoidCookie, T::Error> {
    if spec.si.len() > u16::MAX as usize {
        return Err(Error::CountOverflow.into());
    }
    let n_si = spec.si.len() as u16;
    let mut body = ScatterList::new();
    body.push(serialize_exact(12, |cur| {
        cur.put_u16(device_spec)?;
        cur.put_zeros(1)?;
        cur.put_u8(recompute_actions as u8)?;
        cur.put_u8(truncate_si as u8)?;
        cur.put_u8(spec.groups)?;
        cur.put_u16(first_si)?;
        cur.put_u16(n_si)?;
        cur.put_zeros(2)
    })?);
    body.push(spec.serialize()?);
    let id = send(transport, Opcode::SET_COMPAT_MAP, true, body)?;
    Ok(VoidCookie { id })
}

/// Query which indicators are lit
pub fn get_indicator_state<T: Transport>(
    transport: &mut T,
    device_spec: u16,
) -> SendResult<Cookie<IndicatorStateReply>, T::Error> {
    let mut body = ScatterList::new();
    body.push(serialize_exact(4, |cur| {
        cur.put_u16(device_spec)?;
        cur.put_zeros(2)
    })?);
    let id = send(transport, Opcode::GET_INDICATOR_STATE, false, body)?;
    Ok(Cookie::new(id))
}

/// Query the maps for the selected indicators
pub fn get_indicator_map<T: Transport>(
    transport: &mut T,
    device_spec: u16,
    which: u32,
) -> SendResult<Cookie<IndicatorMapReply>, T::Error> {
    let mut body = ScatterList::new();
    body.push(serialize_exact(8, |cur| {
        cur.put_u16(device_spec)?;
        cur.put_zeros(2)?;
        cur.put_u32(which)
    })?);
    let id = send(transport, Opcode::GET_INDICATOR_MAP, false, body)?;
    Ok(Cookie::new(id))
}

/// Replace the maps for the selected indicators
pub fn set_indicator_map<T: Transport>(
    transport: &mut T,
    device_spec: u16,
    spec: &IndicatorMapsSpec<'_>,
) -> SendResult<VoidCookie, T::Error> {
    let mut body = ScatterList::new();
    body.push(serialize_exact(8, |cur| {
        cur.put_u16(device_spec)?;
        cur.put_zeros(2)?;
        cur.put_u32(spec.which)
    })?);
    body.push(spec.serialize()?);
    let id = send(transport, Opcode::SET_INDICATOR_MAP, true, body)?;
    Ok(VoidCookie { id })
}

/// Query the selected symbolic names
pub fn get_names<T: Transport>(
    transport: &mut T,
    device_spec: u16,
    which: u32,
) -> SendResult<Cookie<NamesReply>, T::Error> {
    let mut body = ScatterList::new();
    body.push(serialize_exact(8, |cur| {
        cur.put_u16(device_spec)?;
        cur.put_zeros(2)?;
        cur.put_u32(which)
    })?);
    let id = send(transport, Opcode::GET_NAMES, false, body)?;
    Ok(Cookie::new(id))
}

/// Replace the selected symbolic names
pub fn set_names<T: Transport>(
    transport: &mut T,
    device_spec: u16,
    first_type: u8,
    first_kt_level: u8,
    first_key: Keycode,
    spec: &NameListSpec<'_>,
) -> SendResult<VoidCookie, T::Error> {
    let layout = spec.layout()?;
    let total_kt_level_names = spec.total_kt_level_names();
    let mut body = ScatterList::new();
    body.push(serialize_exact(24, |cur| {
        cur.put_u16(device_spec)?;
        cur.put_u16(layout.virtual_mods)?;
        cur.put_u32(layout.which)?;
        cur.put_u8(first_type)?;
        cur.put_u8(layout.n_types)?;
        cur.put_u8(first_kt_level)?;
        cur.put_u8(layout.n_kt_levels as u8)?;
        cur.put_u32(layout.indicators)?;
        cur.put_u8(layout.group_names)?;
        cur.put_u8(layout.n_radio_groups)?;
        cur.put_u8(first_key)?;
        cur.put_u8(layout.n_keys)?;
        cur.put_u8(layout.n_key_aliases)?;
        cur.put_zeros(1)?;
        cur.put_u16(total_kt_level_names as u16)
    })?);
    body.push(spec.serialize()?);
    let id = send(transport, Opcode::SET_NAMES, true, body)?;
    Ok(VoidCookie { id })
}

/// Query the keyboard geometry
pub fn get_geometry<T: Transport>(
    transport: &mut T,
    device_spec: u16,
    name: Atom,
) -> SendResult<Cookie<GeometryReply>, T::Error> {
    let mut body = ScatterList::new();
    body.push(serialize_exact(8, |cur| {
        cur.put_u16(device_spec)?;
        cur.put_zeros(2)?;
        cur.put_u32(name)
    })?);
    let id = send(transport, Opcode::GET_GEOMETRY, false, body)?;
    Ok(Cookie::new(id))
}

/// Replace the keyboard geometry
pub fn set_geometry<T: Transport>(
    transport: &mut T,
    args: &SetGeometryArgs,
    spec: &KbGeometrySpec<'_>,
) -> SendResult<VoidCookie, T::Error> {
    let layout = spec.layout()?;
    if layout.n_shapes > u8::MAX as u16 || layout.n_sections > u8::MAX as u16 {
        return Err(Error::CountOverflow.into());
    }
    let mut body = ScatterList::new();
    body.push(serialize_exact(24, |cur| {
        cur.put_u16(args.device_spec)?;
        cur.put_u8(layout.n_shapes as u8)?;
        cur.put_u8(layout.n_sections as u8)?;
        cur.put_u32(args.name)?;
        cur.put_u16(args.width_mm)?;
        cur.put_u16(args.height_mm)?;
        cur.put_u16(layout.n_properties)?;
        cur.put_u16(layout.n_colors)?;
        cur.put_u16(layout.n_doodads)?;
        cur.put_u16(layout.n_key_aliases)?;
        cur.put_u8(args.base_color_ndx)?;
        cur.put_u8(args.label_color_ndx)?;
        cur.put_zeros(2)
    })?);
    body.push(spec.serialize()?);
    let id = send(transport, Opcode::SET_GEOMETRY, true, body)?;
    Ok(VoidCookie { id })
}

/// Change this client's per-client flags
pub fn per_client_flags<T: Transport>(
    transport: &mut T,
    args: &PerClientFlagsArgs,
) -> SendResult<Cookie<PerClientFlagsReply>, T::Error> {
    let mut body = ScatterList::new();
    body.push(serialize_exact(24, |cur| {
        cur.put_u16(args.device_spec)?;
        cur.put_zeros(2)?;
        cur.put_u32(args.change)?;
        cur.put_u32(args.value)?;
        cur.put_u32(args.ctrls_to_change)?;
        cur.put_u32(args.auto_ctrls)?;
        cur.put_u32(args.auto_ctrls_values)
    })?);
    let id = send(transport, Opcode::PER_CLIENT_FLAGS, false, body)?;
    Ok(Cookie::new(id))
}

/// List the server's keymap components matching a pattern
pub fn list_components<T: Transport>(
    transport: &mut T,
    device_spec: u16,
    max_names: u16,
) -> SendResult<Cookie<ListComponentsReply>, T::Error> {
    let mut body = ScatterList::new();
    body.push(serialize_exact(4, |cur| {
        cur.put_u16(device_spec)?;
        cur.put_u16(max_names)
    })?);
    let id = send(transport, Opcode::LIST_COMPONENTS, false, body)?;
    Ok(Cookie::new(id))
}

/// Build a keyboard description from component names
pub fn get_kbd_by_name<T: Transport>(
    transport: &mut T,
    device_spec: u16,
    need: u16,
    want: u16,
    load: bool,
) -> SendResult<Cookie<KbdByNameReply>, T::Error> {
    let mut body = ScatterList::new();
    body.push(serialize_exact(8, |cur| {
        cur.put_u16(device_spec)?;
        cur.put_u16(need)?;
        cur.put_u16(want)?;
        cur.put_u8(load as u8)?;
        cur.put_zeros(1)
    })?);
    let id = send(transport, Opcode::GET_KBD_BY_NAME, false, body)?;
    Ok(Cookie::new(id))
}

/// Query an input device's buttons and indicators
pub fn get_device_info<T: Transport>(
    transport: &mut T,
    args: &GetDeviceInfoArgs,
) -> SendResult<Cookie<DeviceInfoReply>, T::Error> {
    let mut body = ScatterList::new();
    body.push(serialize_exact(12, |cur| {
        cur.put_u16(args.device_spec)?;
        cur.put_u16(args.wanted)?;
        cur.put_u8(args.all_buttons as u8)?;
        cur.put_u8(args.first_button)?;
        cur.put_u8(args.n_buttons)?;
        cur.put_zeros(1)?;
        cur.put_u16(args.led_class)?;
        cur.put_u16(args.led_id)
    })?);
    let id = send(transport, Opcode::GET_DEVICE_INFO, false, body)?;
    Ok(Cookie::new(id))
}

/// Change an input device's button actions and LED descriptions
pub fn set_device_info<T: Transport>(
    transport: &mut T,
    device_spec: u16,
    first_btn: u8,
    change: u16,
    btn_actions: &[Action],
    leds: &[DeviceLedInfoSpec<'_>],
) -> SendResult<VoidCookie, T::Error> {
    if btn_actions.len() > u8::MAX as usize || leds.len() > u16::MAX as usize {
        return Err(Error::CountOverflow.into());
    }
    let mut body = ScatterList::new();
    body.push(serialize_exact(8, |cur| {
        cur.put_u16(device_spec)?;
        cur.put_u8(first_btn)?;
        cur.put_u8(btn_actions.len() as u8)?;
        cur.put_u16(change)?;
        cur.put_u16(leds.len() as u16)
    })?);
    if !btn_actions.is_empty() {
        body.push(serialize_exact(run_len::<Action>(btn_actions.len())?, |cur| {
            put_run(cur, btn_actions)
        })?);
    }
    for led in leds {
        body.push(led.serialize()?);
    }
    let id = send(transport, Opcode::SET_DEVICE_INFO, true, body)?;
    Ok(VoidCookie { id })
}
