//! Turns alertmanager batches into discord webhook messages and delivers them.
//!
//! Batches are received from [alertmanager_webhook_receiver](crate::alertmanager_webhook_receiver),
//! aggregated into a [Digest], filtered by [policy], rendered by [embeds] and
//! [links] and posted with [http_client::Client].

use std::collections::BTreeMap;

use thiserror::Error;

use self::{message::WebhookMessage, settings::ChannelSettings};
use crate::{alert, digest::Digest, settings::Settings};

pub mod embeds;
pub mod http_client;
pub mod links;
pub mod message;
pub mod policy;
pub mod settings;
pub mod time_display;

mod metrics;

pub use http_client::Client;

/// Reasons a batch didn't end up in a discord channel
#[derive(Error, Debug)]
pub enum SendError {
	#[error("the discord channel {0} could not be found")]
	UnknownChannel(String),
	/// not a failure, the batch only held severities to ignore when alone
	#[error("there are only alerts with severities to be ignored, message not sent. severity count: {0:?}")]
	SeveritiesIgnored(BTreeMap<String, usize>),
	#[error("no matching message type for {0}")]
	InvalidMessageType(String),
	#[error("failed to serialize discord message")]
	Serialize(#[from] serde_json::Error),
	#[error("failed to post alert to discord")]
	Transport(#[source] reqwest::Error),
	#[error("problem with post, status code is not 204. status code: {status}, message: {status_text}, request body: {request_body}, response body: {response_body}")]
	UnexpectedStatus {
		status: u16,
		status_text: String,
		request_body: String,
		response_body: String,
	},
}

impl SendError {
	/// true if the message was deliberately not sent
	pub fn is_suppression(&self) -> bool {
		matches!(self, Self::SeveritiesIgnored(_))
	}
}

/// Builds the message for `digest`: role mentions and links as content, one
/// embed per alert name.
pub fn build_message(
	digest: &Digest,
	channel: &ChannelSettings,
	settings: &Settings,
) -> Result<WebhookMessage, SendError> {
	let mut content = policy::mention(digest, channel, settings).unwrap_or_default();
	links::write_links(&mut content, digest, settings);

	let embeds = embeds::build_embeds(digest, settings)?;

	Ok(WebhookMessage {
		content,
		embeds,
		username: settings.username.clone(),
		avatar_url: settings.avatar_url.clone(),
	})
}

/// Sends the alerts of `data` to the discord channel named `channel_name`.
///
/// Returns [SendError::SeveritiesIgnored] without contacting discord if the
/// batch only contains severities to ignore when alone.
pub async fn send_alerts(
	channel_name: &str,
	data: &alert::Data,
	settings: &Settings,
	client: &Client,
) -> Result<(), SendError> {
	let channel = settings
		.channels
		.get(channel_name)
		.ok_or_else(|| SendError::UnknownChannel(channel_name.to_owned()))?;

	let digest = Digest::new(data, settings);

	if policy::only_ignored_severities(&digest, channel, settings) {
		metrics::WebhookMetrics::global().record_suppressed(channel_name);
		return Err(SendError::SeveritiesIgnored(digest.count_by_severity));
	}

	let message = build_message(&digest, channel, settings)?;
	let body = serde_json::to_string(&message)?;

	tracing::debug!(
		channel = channel_name,
		firing = digest.firing_count,
		resolved = digest.resolved_count,
		embeds = message.embeds.len(),
		"posting alerts to discord"
	);

	client.post(channel_name, &channel.webhook_url, body).await
}
