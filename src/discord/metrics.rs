//! prometheus meters for discord webhook deliveries

use once_cell::sync::OnceCell;
use prometheus::{
	exponential_buckets, histogram_opts, opts, register_histogram_vec, register_int_counter_vec,
	HistogramVec, IntCounterVec,
};

static METRICS: OnceCell<WebhookMetrics> = OnceCell::new();

#[derive(Debug)]
/// prometheus meters for the discord webhook client
pub(crate) struct WebhookMetrics {
	/// total number of webhook requests
	requests: IntCounterVec,
	/// number of failed webhook requests
	requests_failed: IntCounterVec,
	/// time spent by webhook requests
	request_duration: HistogramVec,
	/// number of messages not sent because only ignored severities were present
	suppressed: IntCounterVec,
}

impl WebhookMetrics {
	/// construct and register prometheus meters
	fn new() -> Result<Self, prometheus::Error> {
		let requests = register_int_counter_vec!(
			opts!("webhook_requests_total", "total number of discord webhook requests")
				.namespace("alertmanager_discord")
				.subsystem("discord"),
			&["channel"]
		)?;

		let requests_failed = register_int_counter_vec!(
			opts!("webhook_requests_failed", "number of failed discord webhook requests")
				.namespace("alertmanager_discord")
				.subsystem("discord"),
			&["channel", "status_code"]
		)?;

		let request_duration = register_histogram_vec!(
			histogram_opts!(
				"webhook_request_duration_seconds",
				"total time of a discord webhook request in seconds",
				exponential_buckets(0.01, 2., 12)?
			)
			.namespace("alertmanager_discord")
			.subsystem("discord"),
			&["channel"]
		)?;

		let suppressed = register_int_counter_vec!(
			opts!("suppressed_messages", "messages not sent because of ignored severities")
				.namespace("alertmanager_discord")
				.subsystem("discord"),
			&["channel"]
		)?;

		Ok(Self { requests, requests_failed, request_duration, suppressed })
	}

	/// meters shared by all clients of the process
	pub(crate) fn global() -> &'static Self {
		#[allow(clippy::expect_used)]
		METRICS.get_or_init(|| Self::new().expect("failed to register discord webhook meters"))
	}

	/// starts timing a request, the duration is recorded when the timer drops
	pub(crate) fn start_request(&self, channel: &str) -> prometheus::HistogramTimer {
		self.requests.with_label_values(&[channel]).inc();
		self.request_duration.with_label_values(&[channel]).start_timer()
	}

	/// counts a failed request, `status_code` is empty for transport errors
	pub(crate) fn record_failure(&self, channel: &str, status_code: &str) {
		self.requests_failed.with_label_values(&[channel, status_code]).inc();
	}

	/// counts a message dropped by the severity filter
	pub(crate) fn record_suppressed(&self, channel: &str) {
		self.suppressed.with_label_values(&[channel]).inc();
	}
}
