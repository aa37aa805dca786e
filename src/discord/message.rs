//! payload of a discord webhook execution

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// message posted to a channel webhook
pub struct WebhookMessage {
	pub content: String,
	pub embeds: Vec<Embed>,
	pub username: String,
	pub avatar_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// a colored block of a message, one per alert name
pub struct Embed {
	pub title: String,
	pub description: String,
	pub color: u32,
}
