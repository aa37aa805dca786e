//! posts messages to discord webhooks and records metrics about the requests
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{header::CONTENT_TYPE, StatusCode};
use url::Url;

use super::{metrics::WebhookMetrics, SendError};

#[derive(Debug, Clone)]
/// http client shared by all requests. Failed deliveries are not retried.
pub struct Client {
	/// http client
	client: reqwest::Client,
	/// prometheus meters for webhook requests
	metrics: &'static WebhookMetrics,
}

impl Client {
	/// construct http client, every request times out after `timeout`
	pub fn new(timeout: Duration) -> Result<Self> {
		Ok(Self {
			client: reqwest::Client::builder()
				.timeout(timeout)
				.build()
				.context("failed to build reqwest client")?,
			metrics: WebhookMetrics::global(),
		})
	}

	/// Posts the json `body` to `webhook`. Discord answers a successful
	/// webhook execution with 204, every other status is an error.
	pub async fn post(&self, channel: &str, webhook: &Url, body: String) -> Result<(), SendError> {
		let _timer = self.metrics.start_request(channel);

		let response = self
			.client
			.post(webhook.clone())
			.header(CONTENT_TYPE, "application/json")
			.body(body.clone())
			.send()
			.await
			.map_err(|err| {
				self.metrics.record_failure(channel, "");
				SendError::Transport(err)
			})?;

		let status = response.status();
		if status == StatusCode::NO_CONTENT {
			return Ok(());
		}

		self.metrics.record_failure(channel, status.as_str());

		let response_body = match response.text().await {
			Ok(text) => text,
			Err(err) => {
				tracing::error!(channel, "failed to read response body: {err}");
				String::new()
			}
		};

		Err(SendError::UnexpectedStatus {
			status: status.as_u16(),
			status_text: status.canonical_reason().unwrap_or_default().to_owned(),
			request_body: body,
			response_body,
		})
	}
}
