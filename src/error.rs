//! Error types for the XKEYBOARD wire codec

/// Errors that can occur while sizing, serializing or unpacking wire records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Destination buffer too small for the bytes being written
    ShortBuffer,
    /// Source buffer ended before the record's declared contents
    TruncatedBuffer,
    /// Integer overflow while computing a wire length
    Overflow,
    /// Native-side element count does not fit the record's count field
    CountOverflow,
    /// Paired sections disagree on element count
    CountMismatch,
    /// Unknown discriminant byte in a tagged record
    UnknownTag,
    /// Reply prologue inconsistent with the received buffer
    BadReply,
}

impl Error {
    /// Returns a human-readable description of the error
    pub const fn description(&self) -> &'static str {
        match self {
            Error::ShortBuffer => "destination buffer too small",
            Error::TruncatedBuffer => "buffer ended before declared contents",
            Error::Overflow => "integer overflow in wire length calculation",
            Error::CountOverflow => "element count exceeds wire count field",
            Error::CountMismatch => "paired sections disagree on element count",
            Error::UnknownTag => "unknown discriminant in tagged record",
            Error::BadReply => "reply prologue inconsistent with buffer",
        }
    }
}

#[cfg(feature = "std")]
impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias for codec operations
pub type Result<T> = core::result::Result<T, Error>;
