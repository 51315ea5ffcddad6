//! Error types for giztoy-pubsub.

/// Result type alias for giztoy-pubsub.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for giztoy-pubsub operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Channel failed to parse.
    #[error("invalid channel: {0}")]
    InvalidChannel(#[from] Violation),

    /// Encoded ssid could not be decoded.
    #[error("invalid ssid: {0}")]
    InvalidSsid(String),
}

/// First rule a channel broke while being parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    /// No `/` between the key and the channel path.
    #[error("missing key separator")]
    MissingSeparator,

    /// Key is empty.
    #[error("empty key")]
    EmptyKey,

    /// Key contains a byte outside `[A-Za-z0-9_-]`.
    #[error("invalid key byte {0:#04x}")]
    KeyByte(u8),

    /// Segment contains a byte outside the topic alphabet.
    #[error("invalid byte {byte:#04x} in segment {segment}")]
    SegmentByte { segment: usize, byte: u8 },

    /// `+` or `#` mixed with other bytes in one segment.
    #[error("wildcard must be a whole segment (segment {0})")]
    WildcardSegment(usize),

    /// `#` followed by more segments.
    #[error("# must be the last segment (segment {0})")]
    WildcardNotLast(usize),

    /// Option pair without exactly one `=`, or with an empty side.
    #[error("malformed option {0}")]
    OptionPair(usize),

    /// Option key outside `[A-Za-z0-9_]`.
    #[error("invalid option key {0}")]
    OptionKey(usize),

    /// Option value outside `[A-Za-z0-9.:-]`.
    #[error("invalid option value {0}")]
    OptionValue(usize),

    /// More options than a channel may carry.
    #[error("too many options (max {max})")]
    TooManyOptions { max: usize },
}
