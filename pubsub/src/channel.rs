//! Channel parsing.
//!
//! A channel string has the form `key/path[?option&option...]`:
//!
//! - `key` is the raw access key, handed to the security layer untouched
//! - `path` is a `/` separated list of segments, where `+` matches one level
//!   and `#` matches every remaining level (last segment only)
//! - options are `name=value` pairs, at most [`MAX_OPTIONS`] of them
//!
//! Parsing never fails loudly. A malformed channel comes back with
//! [`ChannelType::Invalid`] and the first [`Violation`] seen, so the hot path
//! can branch on the type inline.

use std::fmt;

use tracing::trace;

use crate::error::{Error, Result, Violation};
use crate::hash::{Fnv32, hash};

/// Maximum number of options a channel may carry.
pub const MAX_OPTIONS: usize = 3;

/// Option holding the message time-to-live in seconds.
pub const OPTION_TTL: &str = "ttl";

/// Option holding the number of stored messages to replay.
pub const OPTION_LAST: &str = "last";

/// Classification of a parsed channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelType {
    /// The channel broke the grammar. Nothing else in it can be trusted.
    Invalid,
    /// Plain path without wildcards.
    Static,
    /// Path with at least one `+` or `#` segment.
    Wildcard,
}

impl fmt::Display for ChannelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelType::Invalid => write!(f, "invalid"),
            ChannelType::Static => write!(f, "static"),
            ChannelType::Wildcard => write!(f, "wildcard"),
        }
    }
}

/// A `name=value` pair from the channel query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelOption<'a> {
    pub key: &'a str,
    pub value: &'a str,
}

/// A parsed channel, borrowing from the raw input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel<'a> {
    /// Raw access key bytes (not verified here).
    pub key: &'a [u8],
    /// Raw path bytes between the key and the query string.
    pub channel: &'a [u8],
    /// One hash per path segment, wildcards included.
    pub query: Vec<u32>,
    /// Options in the order they were written.
    pub options: Vec<ChannelOption<'a>>,
    /// Parse outcome.
    pub channel_type: ChannelType,
    violation: Option<Violation>,
}

/// Kind of a single path segment.
enum Segment {
    Literal,
    MatchAny,
    MatchAll,
}

impl<'a> Channel<'a> {
    /// Parses a raw channel string in a single forward pass.
    pub fn parse(raw: &'a [u8]) -> Self {
        let (head, opts) = match raw.iter().position(|&b| b == b'?') {
            Some(idx) => (&raw[..idx], Some(&raw[idx + 1..])),
            None => (raw, None),
        };

        let mut c = Channel {
            key: &[],
            channel: &[],
            query: Vec::new(),
            options: Vec::new(),
            channel_type: ChannelType::Static,
            violation: None,
        };

        match head.iter().position(|&b| b == b'/') {
            Some(idx) => {
                c.key = &head[..idx];
                c.channel = &head[idx + 1..];
            }
            None => {
                c.key = head;
                c.reject(Violation::MissingSeparator);
            }
        }

        c.parse_key();
        let wildcard = c.parse_path();
        if let Some(opts) = opts {
            c.parse_options(opts);
        }

        c.channel_type = match c.violation {
            Some(v) => {
                trace!("Invalid channel {:?}: {}", String::from_utf8_lossy(raw), v);
                ChannelType::Invalid
            }
            None if wildcard => ChannelType::Wildcard,
            None => ChannelType::Static,
        };
        c
    }

    fn reject(&mut self, v: Violation) {
        if self.violation.is_none() {
            self.violation = Some(v);
        }
    }

    fn parse_key(&mut self) {
        if self.key.is_empty() {
            self.reject(Violation::EmptyKey);
            return;
        }
        if let Some(&b) = self.key.iter().find(|&&b| !is_key_byte(b)) {
            self.reject(Violation::KeyByte(b));
        }
    }

    /// Hashes every segment into `query`. Returns whether a wildcard was seen.
    fn parse_path(&mut self) -> bool {
        let path = self.channel;
        let mut query = Vec::with_capacity(path.iter().filter(|&&b| b == b'/').count() + 1);
        let mut wildcard = false;
        let mut match_all_at = None;

        for (i, segment) in path.split(|&b| b == b'/').enumerate() {
            query.push(hash(segment));

            if let Some(at) = match_all_at.take() {
                self.reject(Violation::WildcardNotLast(at));
            }
            match classify_segment(i, segment) {
                Ok(Segment::Literal) => {}
                Ok(Segment::MatchAny) => wildcard = true,
                Ok(Segment::MatchAll) => {
                    wildcard = true;
                    match_all_at = Some(i);
                }
                Err(v) => self.reject(v),
            }
        }

        self.query = query;
        wildcard
    }

    fn parse_options(&mut self, raw: &'a [u8]) {
        for (i, pair) in raw.split(|&b| b == b'&').enumerate() {
            if i == MAX_OPTIONS {
                self.reject(Violation::TooManyOptions { max: MAX_OPTIONS });
            }

            let mut parts = pair.splitn(3, |&b| b == b'=');
            let (key, value) = match (parts.next(), parts.next(), parts.next()) {
                (Some(k), Some(v), None) if !k.is_empty() && !v.is_empty() => (k, v),
                _ => {
                    self.reject(Violation::OptionPair(i));
                    continue;
                }
            };
            if !key.iter().all(|&b| is_option_key_byte(b)) {
                self.reject(Violation::OptionKey(i));
                continue;
            }
            if !value.iter().all(|&b| is_option_value_byte(b)) {
                self.reject(Violation::OptionValue(i));
                continue;
            }

            // Both sides are ASCII at this point.
            if let (Ok(key), Ok(value)) = (std::str::from_utf8(key), std::str::from_utf8(value)) {
                self.options.push(ChannelOption { key, value });
            }
        }
    }

    /// Returns the first rule the channel broke, if any.
    pub fn violation(&self) -> Option<Violation> {
        self.violation
    }

    /// Returns true unless the channel is [`ChannelType::Invalid`].
    pub fn is_valid(&self) -> bool {
        self.channel_type != ChannelType::Invalid
    }

    /// Returns true for channels containing `+` or `#`.
    pub fn is_wildcard(&self) -> bool {
        self.channel_type == ChannelType::Wildcard
    }

    /// Turns the parse outcome into a `Result` for callers off the hot path.
    pub fn check(&self) -> Result<()> {
        match self.violation {
            Some(v) => Err(Error::InvalidChannel(v)),
            None => Ok(()),
        }
    }

    /// Returns the value of the first option named `name`.
    pub fn option(&self, name: &str) -> Option<&'a str> {
        self.options.iter().find(|o| o.key == name).map(|o| o.value)
    }

    /// Time-to-live in seconds from the `ttl` option.
    pub fn ttl(&self) -> Option<u32> {
        self.option(OPTION_TTL).and_then(parse_u32)
    }

    /// Number of stored messages to replay from the `last` option.
    pub fn last(&self) -> Option<u32> {
        self.option(OPTION_LAST).and_then(parse_u32)
    }

    /// Content-addressed key over the path and the raw `ttl` value.
    ///
    /// Other options do not affect the result.
    pub fn target(&self) -> u32 {
        let mut h = Fnv32::new();
        h.write(self.channel);
        if let Some(ttl) = self.option(OPTION_TTL) {
            h.write(ttl.as_bytes());
        }
        h.finish()
    }
}

fn classify_segment(index: usize, segment: &[u8]) -> std::result::Result<Segment, Violation> {
    match segment {
        b"+" => Ok(Segment::MatchAny),
        b"#" => Ok(Segment::MatchAll),
        _ => {
            for &b in segment {
                match b {
                    b'+' | b'#' | b'*' => return Err(Violation::WildcardSegment(index)),
                    b if is_topic_byte(b) => {}
                    byte => return Err(Violation::SegmentByte { segment: index, byte }),
                }
            }
            Ok(Segment::Literal)
        }
    }
}

/// `-./0-9:` and `A-Z[\]^_\`a-z`.
#[inline]
fn is_topic_byte(b: u8) -> bool {
    matches!(b, b'-'..=b':' | b'A'..=b'z')
}

#[inline]
fn is_key_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}

#[inline]
fn is_option_key_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

#[inline]
fn is_option_value_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b':')
}

/// Strict base-10 `u32`: digits only, no sign.
fn parse_u32(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
