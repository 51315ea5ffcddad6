//! Topic addressing core for the pub/sub broker.
//!
//! This crate turns channel strings into routing keys and keeps track of
//! how many subscriptions share each key:
//!
//! - [`Channel`]: single-pass parser for `key/path?options`, with `+` and `#`
//!   wildcards and typed `ttl` / `last` options
//! - [`Ssid`]: contract id followed by one hash per channel segment
//! - [`Counters`]: sharded subscription counters reporting the first and the
//!   last subscriber of each ssid
//!
//! Transport, the dispatch trie, storage and key verification live elsewhere.
//!
//! # Example
//!
//! ```rust
//! use giztoy_pubsub::{Channel, ChannelType, Counters, Ssid};
//!
//! let channel = Channel::parse(b"key/device/+/state?ttl=30");
//! assert_eq!(channel.channel_type, ChannelType::Wildcard);
//! assert_eq!(channel.ttl(), Some(30));
//!
//! let ssid = Ssid::new(42, &channel);
//! let counters = Counters::new();
//! assert!(counters.increment(&ssid, channel.channel));
//! assert!(!counters.increment(&ssid, channel.channel));
//! assert!(!counters.decrement(&ssid));
//! assert!(counters.decrement(&ssid));
//! ```

mod channel;
mod counters;
mod error;
pub mod hash;
mod ssid;

pub use channel::{Channel, ChannelOption, ChannelType, MAX_OPTIONS, OPTION_LAST, OPTION_TTL};
pub use counters::{Counter, Counters, CountersConfig, DEFAULT_SHARDS};
pub use error::{Error, Result, Violation};
pub use ssid::Ssid;
