//! Subscription counters.
//!
//! [`Counters`] tracks how many subscriptions exist for each distinct
//! [`Ssid`]. [`Counters::increment`] reports the first subscriber arriving and
//! [`Counters::decrement`] reports the last one leaving, so the caller can
//! announce or withdraw interest elsewhere.
//!
//! Counters are bucketed by [`Ssid::hash_code`] and disambiguated by the full
//! ssid, so two ssids with the same hash code never share a count. Buckets
//! are spread over independently locked shards by the low bits of the hash
//! code.

use std::collections::HashMap;

use bytes::Bytes;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize, Serializer};
use tracing::{debug, trace};

use crate::ssid::Ssid;

/// Default number of registry shards.
pub const DEFAULT_SHARDS: usize = 16;

/// Reference count of the subscriptions sharing one ssid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Counter {
    /// Routing key.
    pub ssid: Ssid,
    /// Channel name given by the first subscriber.
    #[serde(serialize_with = "serialize_channel")]
    pub channel: Bytes,
    /// Number of active subscriptions.
    pub count: usize,
}

impl Counter {
    fn new(ssid: Ssid, channel: &[u8]) -> Self {
        Self {
            ssid,
            channel: Bytes::copy_from_slice(channel),
            count: 0,
        }
    }
}

fn serialize_channel<S: Serializer>(channel: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&String::from_utf8_lossy(channel))
}

/// Registry configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CountersConfig {
    /// Number of independently locked shards. Rounded up to a power of two.
    pub shards: usize,
}

impl Default for CountersConfig {
    fn default() -> Self {
        Self {
            shards: DEFAULT_SHARDS,
        }
    }
}

impl CountersConfig {
    /// Set the number of shards.
    pub fn shards(mut self, shards: usize) -> Self {
        self.shards = shards;
        self
    }
}

/// Counters sharing one hash code.
type Bucket = Vec<Counter>;

/// Concurrency-safe subscription counter registry.
///
/// Construct once and share it by reference or `Arc` between the connection
/// handlers. Every operation holds a single shard lock for a bounded map
/// update and never calls back into caller code.
pub struct Counters {
    shards: Box<[RwLock<HashMap<u32, Bucket>>]>,
    mask: u32,
}

impl Default for Counters {
    fn default() -> Self {
        Self::new()
    }
}

impl Counters {
    /// Creates an empty registry with the default configuration.
    pub fn new() -> Self {
        Self::with_config(CountersConfig::default())
    }

    /// Creates an empty registry.
    pub fn with_config(config: CountersConfig) -> Self {
        let n = config.shards.max(1).next_power_of_two();
        let shards = (0..n).map(|_| RwLock::new(HashMap::new())).collect();
        Self {
            shards,
            mask: (n - 1) as u32,
        }
    }

    fn shard(&self, hash: u32) -> &RwLock<HashMap<u32, Bucket>> {
        &self.shards[(hash & self.mask) as usize]
    }

    /// Returns the counter for `ssid`, creating it with a zero count.
    ///
    /// Calling it again for the same ssid returns the same counter and keeps
    /// the first channel name.
    pub fn get_or_create(&self, ssid: &Ssid, channel: &[u8]) -> Counter {
        let hash = ssid.hash_code();
        let mut shard = self.shard(hash).write();
        slot(&mut shard, hash, ssid, channel).clone()
    }

    /// Adds a subscription to `ssid`.
    ///
    /// Returns true if this is the first subscription.
    pub fn increment(&self, ssid: &Ssid, channel: &[u8]) -> bool {
        let hash = ssid.hash_code();
        let mut shard = self.shard(hash).write();
        let counter = slot(&mut shard, hash, ssid, channel);
        counter.count += 1;

        let first = counter.count == 1;
        if first {
            debug!(
                "First subscriber for {} ({})",
                ssid,
                String::from_utf8_lossy(&counter.channel)
            );
        }
        first
    }

    /// Removes a subscription from `ssid`.
    ///
    /// Returns true if this was the last subscription; the counter is then
    /// dropped from the registry. Unknown or zero counters are left alone and
    /// return false.
    pub fn decrement(&self, ssid: &Ssid) -> bool {
        let hash = ssid.hash_code();
        let mut shard = self.shard(hash).write();

        let Some(bucket) = shard.get_mut(&hash) else {
            return false;
        };
        let Some(idx) = bucket.iter().position(|c| c.ssid == *ssid) else {
            return false;
        };

        let counter = &mut bucket[idx];
        if counter.count == 0 {
            return false;
        }
        counter.count -= 1;
        if counter.count > 0 {
            return false;
        }

        debug!(
            "Last subscriber left {} ({})",
            ssid,
            String::from_utf8_lossy(&counter.channel)
        );
        bucket.swap_remove(idx);
        if bucket.is_empty() {
            shard.remove(&hash);
        }
        true
    }

    /// Returns a copy of the counter for `ssid`.
    pub fn get(&self, ssid: &Ssid) -> Option<Counter> {
        let hash = ssid.hash_code();
        let shard = self.shard(hash).read();
        shard
            .get(&hash)?
            .iter()
            .find(|c| c.ssid == *ssid)
            .cloned()
    }

    /// Returns a snapshot of every counter.
    ///
    /// Each shard is copied under its own lock; the result does not change
    /// when the registry does. Counters created by [`Counters::get_or_create`]
    /// and never incremented show up with a zero count.
    pub fn all(&self) -> Vec<Counter> {
        let mut out = Vec::new();
        for shard in self.shards.iter() {
            let shard = shard.read();
            out.extend(shard.values().flatten().cloned());
        }
        out
    }

    /// Number of counters in the registry.
    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|s| s.read().values().map(Vec::len).sum::<usize>())
            .sum()
    }

    /// Returns true if the registry holds no counters.
    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(|s| s.read().is_empty())
    }
}

/// Finds or inserts the counter for `ssid` in its bucket.
fn slot<'m>(
    buckets: &'m mut HashMap<u32, Bucket>,
    hash: u32,
    ssid: &Ssid,
    channel: &[u8],
) -> &'m mut Counter {
    let bucket = buckets.entry(hash).or_default();
    let idx = match bucket.iter().position(|c| c.ssid == *ssid) {
        Some(idx) => idx,
        None => {
            trace!("New counter for {}", ssid);
            bucket.push(Counter::new(ssid.clone(), channel));
            bucket.len() - 1
        }
    };
    &mut bucket[idx]
}
