//! config file options for discord channels

use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
/// a discord channel alerts can be posted to
pub struct ChannelSettings {
	#[serde(default)]
	pub name: String,
	/// discord webhook of the channel
	#[serde(rename = "webhookURL")]
	pub webhook_url: Url,
	/// overrides the global roles to mention if not empty
	#[serde(default)]
	pub roles_to_mention: Vec<String>,
	/// overrides the global severities to mention if not empty
	#[serde(default)]
	pub severities_to_mention: Vec<String>,
	/// overrides the global severities to ignore when alone if not empty
	#[serde(default)]
	pub severities_to_ignore_when_alone: Vec<String>,
}
