//! xkbwire: wire codec for the X11 keyboard extension protocol
//!
//! This crate encodes and decodes the keyboard extension's requests and
//! replies: borrowed zero-copy views over reply buffers on the way in,
//! builder specs that compute layouts and sizes on the way out, and a
//! small transport trait in between so the crate never owns a socket.
//!
//! # Value Lists
//!
//! Every variable-length reply body is a value list: a fixed header whose
//! count and mask fields describe which sections follow, then the present
//! sections back to back, each padded to its element alignment first.
//! Offsets are relative to the start of the body, which itself begins on
//! a 4-byte boundary.
//!
//! ```text
//! +--------------------------------------------------+
//! | fixed reply header (32 or 40 bytes)              |
//! +--------------------------------------------------+
//! | pad to elem align | section: records back to     |
//! |                   | back, count from the header  |
//! +--------------------------------------------------+
//! | pad to elem align | next present section ...     |
//! +--------------------------------------------------+
//! ```
//!
//! Mask-shaped sections carry one record per set bit, so counts are
//! popcounts and lookups are bit ranks. Paired-length sections carry a
//! count run and a record run that must agree; disagreement is a decode
//! error, never trusted arithmetic.
//!
//! # Features
//!
//! - Zero-copy views: parsing records section bounds, records decode lazily
//! - Builder specs validate counts before any byte is written
//! - Request assembly into scatter lists behind a [`request::Transport`]
//! - Reply prologue validation against the declared length
//! - `no_std` support with `alloc`
//!
//! # Example
//!
//! ```rust
//! use xkbwire::iter::WireView;
//! use xkbwire::keytype::{KeyType, KeyTypeSpec};
//! use xkbwire::types::{KtMapEntry, ModMask};
//! use xkbwire::ReadCursor;
//!
//! // Describe a two-level shifted type and encode it
//! let map = [KtMapEntry {
//!     active: true,
//!     mods_mask: ModMask::SHIFT,
//!     level: 1,
//!     mods_mods: ModMask::SHIFT,
//!     mods_vmods: 0,
//! }];
//! let spec = KeyTypeSpec {
//!     mods_mask: ModMask::SHIFT,
//!     mods_mods: ModMask::SHIFT,
//!     mods_vmods: 0,
//!     num_levels: 2,
//!     map: &map,
//!     preserve: None,
//! };
//! let bytes = spec.serialize()?;
//!
//! // Decode it back as a borrowed view
//! let mut cur = ReadCursor::new(&bytes);
//! let ty = KeyType::parse(&mut cur)?;
//! assert_eq!(ty.num_levels, 2);
//! assert_eq!(ty.map().len(), 1);
//! # Ok::<(), xkbwire::Error>(())
//! ```

#![no_std]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

pub mod align;
pub mod compat;
pub mod cursor;
pub mod error;
pub mod events;
pub mod geometry;
pub mod indicator;
pub mod iter;
pub mod keytype;
pub mod map;
pub mod mask;
pub mod names;
pub mod request;
pub mod symmap;
pub mod text;
pub mod types;
pub mod wire;

// Re-export main types
pub use cursor::{ReadCursor, WriteCursor};
pub use error::{Error, Result};
pub use request::{Cookie, ReplyError, Transport, VoidCookie};
pub use wire::Wire;

/// Request length unit in bytes
pub const REQUEST_UNIT: usize = 4;

/// Fixed size of the generic reply prologue
pub const REPLY_BASE_SIZE: usize = 32;
