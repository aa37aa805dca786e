//! prometheus alertmanager receiver that forwards alerts into discord channels
//!
//! Features:
//! - forwards different webhook url paths into different discord channels
//! - groups alerts by name into embeds colored by status or severity
//! - mentions roles for severe or numerous alerts
//! - drops batches which only contain severities to ignore

use anyhow::{Context, Result};
use settings::Settings;

mod alert;
mod alertmanager_webhook_receiver;
mod digest;
mod discord;
mod log;
mod settings;
mod telemetry_endpoint;

/// exit the complete program if one thread panics
fn setup_panic_handler() {
	let default_panic = std::panic::take_hook();
	std::panic::set_hook(Box::new(move |info| {
		default_panic(info);
		std::process::exit(1);
	}));
}

/// the entry point of the program
#[tokio::main]
pub async fn main() -> Result<()> {
	setup_panic_handler();

	let settings = Settings::global();

	log::setup_logging().context("could not setup logging")?;

	if settings::file_format(&settings.config_path).is_none() {
		tracing::warn!(
			"config file {:?} has no json or yaml extension, using default settings",
			settings.config_path
		);
	}

	match serde_json::to_string_pretty(settings) {
		Ok(config) => tracing::debug!("using the following config:\n{config}"),
		Err(err) => tracing::warn!("failed to serialize config: {err}"),
	}

	let client = discord::Client::new(settings.webhook_timeout)
		.context("failed to construct discord webhook client")?;

	if let Some(telemetry) = &settings.telemetry_endpoint {
		tokio::spawn(async move {
			#[allow(clippy::expect_used)]
			telemetry_endpoint::run_telemetry_endpoint(telemetry)
				.await
				.expect("telemetry endpoint failed to start or crashed");
		});
	}

	alertmanager_webhook_receiver::run_prometheus_receiver(client)
		.await
		.context("prometheus alertmanager receiver endpoint failed to start or crashed")
}
