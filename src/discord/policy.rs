//! Decides whether a message is sent at all and whether it mentions roles.
//!
//! Every list can be set per channel and globally. A non empty channel list
//! wins over the global one.

use crate::{digest::Digest, discord::settings::ChannelSettings, settings::Settings};

/// prefix written in front of the mentioned roles
const MENTION_INDENT: &str = "    ";

/// channel list if it's not empty, the global list otherwise
fn effective<'a>(channel: &'a [String], global: &'a [String]) -> &'a [String] {
	if channel.is_empty() {
		global
	} else {
		channel
	}
}

/// Returns true if every severity present in the batch is one that should be
/// ignored when alone. Without a configured list nothing is ignored.
pub fn only_ignored_severities(
	digest: &Digest,
	channel: &ChannelSettings,
	settings: &Settings,
) -> bool {
	let ignored = effective(
		&channel.severities_to_ignore_when_alone,
		&settings.severities_to_ignore_when_alone,
	);

	if ignored.is_empty() {
		return false;
	}

	digest.count_by_severity.keys().all(|severity| ignored.contains(severity))
}

/// any severity to mention was seen in the batch
fn mention_by_severity(digest: &Digest, channel: &ChannelSettings, settings: &Settings) -> bool {
	effective(&channel.severities_to_mention, &settings.severities_to_mention)
		.iter()
		.any(|severity| digest.count_by_severity.get(severity).copied().unwrap_or(0) > 0)
}

/// enough alerts are firing
fn mention_by_firing_count(digest: &Digest, settings: &Settings) -> bool {
	let threshold = settings.firing_count_to_mention;

	threshold > 0 && digest.firing_count as i64 >= threshold
}

/// Returns the content prefix mentioning the channel's roles, or `None` if
/// neither the severities nor the firing count call for a mention.
pub fn mention(digest: &Digest, channel: &ChannelSettings, settings: &Settings) -> Option<String> {
	if !mention_by_severity(digest, channel, settings) && !mention_by_firing_count(digest, settings)
	{
		return None;
	}

	let roles = effective(&channel.roles_to_mention, &settings.roles_to_mention);

	Some(format!("{MENTION_INDENT}{}", roles.join(" ")))
}
