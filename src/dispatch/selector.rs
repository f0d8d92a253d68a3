//! Tag-based channel selection.
//!
//! [`select`] decides which configured channels receive a message. With
//! no requested tags the default channels are chosen; with tags, every
//! channel whose tag set intersects the (lower-cased) requested set.
//! An empty result is a normal outcome, not an error.

use crate::config::model::{Channel, Config};

/// Return the channels that should receive a message, in the store's
/// name-ordered iteration order.
///
/// Requested tags are lower-cased here; channel tags were lower-cased at
/// load time, so the comparison is case-insensitive on both sides. A
/// channel with no tags can only be reached through the default rule.
#[must_use]
pub fn select<'a>(config: &'a Config, requested_tags: &[String]) -> Vec<(&'a str, &'a Channel)> {
    if requested_tags.is_empty() {
        return config
            .channels
            .iter()
            .filter(|(_, channel)| channel.is_default)
            .map(|(name, channel)| (name.as_str(), channel))
            .collect();
    }

    let wanted: Vec<String> = requested_tags.iter().map(|t| t.to_lowercase()).collect();

    config
        .channels
        .iter()
        .filter(|(_, channel)| {
            channel
                .tags
                .iter()
                .any(|tag| wanted.iter().any(|w| w == tag))
        })
        .map(|(name, channel)| (name.as_str(), channel))
        .collect()
}
