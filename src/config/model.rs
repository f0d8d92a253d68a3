//! Serde data structures for the Herald channel configuration file.
//!
//! The file is a flat mapping from channel name to [`Channel`]. All
//! types derive `Serialize` and `Deserialize` with `deny_unknown_fields`
//! for strict parsing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

fn is_false(v: &bool) -> bool {
    !*v
}

/// The full channel configuration: a name-keyed map of channels.
///
/// `BTreeMap` gives a deterministic, name-ordered iteration order, which
/// is also the order channels are selected and dispatched in.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Config {
    pub channels: BTreeMap<String, Channel>,
}

/// One configured notification destination.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Channel {
    /// Delivery URL understood by the sender binary, e.g.
    /// `telegram://token@telegram?chats=ops`. Never interpreted by Herald
    /// beyond validation and the MarkdownV2 marker check.
    pub url: String,

    /// Receives untagged messages when true.
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_default: bool,

    /// Routing labels. Lower-cased at load time so tag matching is
    /// case-insensitive on both sides.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Config {
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    #[must_use]
    pub fn default_channel_count(&self) -> usize {
        self.channels.values().filter(|c| c.is_default).count()
    }

    /// Lower-case every channel tag in place. Called once at load time.
    pub fn normalize_tags(&mut self) {
        for channel in self.channels.values_mut() {
            for tag in &mut channel.tags {
                *tag = tag.to_lowercase();
            }
        }
    }
}
