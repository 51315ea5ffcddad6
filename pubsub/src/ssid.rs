//! Subscription ids.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Serialize, Serializer};

use crate::channel::Channel;
use crate::error::{Error, Result};

/// Separator between words in the encoded form.
const ENCODED_SEPARATOR: char = '.';

/// Canonical routing key for a channel within a contract.
///
/// Element 0 is the contract id, the rest are the segment hashes of the
/// channel. Cloning is cheap; the words are shared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ssid(Arc<[u32]>);

impl Ssid {
    /// Builds the ssid of `channel` under `contract`.
    pub fn new(contract: u32, channel: &Channel<'_>) -> Self {
        let mut words = Vec::with_capacity(channel.query.len() + 1);
        words.push(contract);
        words.extend_from_slice(&channel.query);
        Self(words.into())
    }

    /// Returns the contract id.
    pub fn contract(&self) -> u32 {
        self.0.first().copied().unwrap_or_default()
    }

    /// Returns the segment hashes, without the contract.
    pub fn query(&self) -> &[u32] {
        self.0.get(1..).unwrap_or_default()
    }

    /// Returns every word, contract first.
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    /// Number of words, contract included.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the ssid has no words at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// XOR of every word.
    ///
    /// Permutations of the same words collide. Use it to pick a bucket, then
    /// compare whole ssids.
    pub fn hash_code(&self) -> u32 {
        self.0.iter().fold(0, |acc, w| acc ^ w)
    }

    /// Encodes the ssid as lowercase hex words joined by `.`.
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Decodes the form produced by [`Ssid::encode`].
    pub fn decode(s: &str) -> Result<Self> {
        s.parse()
    }
}

impl From<Vec<u32>> for Ssid {
    fn from(words: Vec<u32>) -> Self {
        Self(words.into())
    }
}

impl From<&[u32]> for Ssid {
    fn from(words: &[u32]) -> Self {
        Self(words.into())
    }
}

impl fmt::Display for Ssid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, w) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", ENCODED_SEPARATOR)?;
            }
            write!(f, "{:x}", w)?;
        }
        Ok(())
    }
}

impl FromStr for Ssid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::InvalidSsid("empty".to_string()));
        }
        let words = s
            .split(ENCODED_SEPARATOR)
            .map(|w| {
                if w.is_empty() || !w.bytes().all(|b| b.is_ascii_hexdigit()) {
                    return Err(Error::InvalidSsid(format!("bad word {:?}", w)));
                }
                u32::from_str_radix(w, 16)
                    .map_err(|e| Error::InvalidSsid(format!("bad word {:?}: {}", w, e)))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(words.into())
    }
}

impl Serialize for Ssid {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
