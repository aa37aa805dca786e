use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
	error_handling::HandleErrorLayer,
	extract::{rejection::JsonRejection, Extension, Json, Path},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
	BoxError, Router,
};
use once_cell::sync::OnceCell;
use prometheus::{IntCounter, IntCounterVec};
use serde_json::json;
use tower::{timeout::TimeoutLayer, ServiceBuilder};

use crate::{
	alert,
	discord::{self, Client},
	settings::Settings,
};

static METRICS: OnceCell<ReceiverMetrics> = OnceCell::new();

/// prometheus meters for incoming batches
struct ReceiverMetrics {
	/// decoded batches per channel
	received: IntCounterVec,
	/// bodies which failed to decode
	invalid: IntCounter,
}

impl ReceiverMetrics {
	fn new() -> Result<Self, prometheus::Error> {
		use prometheus::{opts, register_int_counter, register_int_counter_vec};

		let received = register_int_counter_vec!(
			opts!("received_batches", "total number of deserialized alert batches")
				.namespace("alertmanager_discord")
				.subsystem("alertmanager_webhook"),
			&["channel"]
		)?;

		let invalid = register_int_counter!(opts!(
			"invalid_batches",
			"number of alert batches which failed to deserialize"
		)
		.namespace("alertmanager_discord")
		.subsystem("alertmanager_webhook"))?;

		Ok(Self { received, invalid })
	}

	fn global() -> &'static Self {
		#[allow(clippy::expect_used)]
		METRICS.get_or_init(|| Self::new().expect("failed to register receiver meters"))
	}
}

struct State {
	settings: &'static Settings,
	client: Client,
	metrics: &'static ReceiverMetrics,
}

async fn health() -> impl IntoResponse {
	Json(json!({ "status": "Application is healthy!" }))
}

/// Decodes the batch and forwards it to the discord channel named in the path.
/// Once the body is decoded the caller always gets 200, failures to deliver
/// are only logged.
async fn prometheus_receiver(
	Extension(state): Extension<Arc<State>>,
	Path(channel): Path<String>,
	alert: Result<Json<alert::Data>, JsonRejection>,
) -> Response {
	let State { settings, client, metrics } = &*state;

	let alert = match alert {
		Ok(Json(alert)) => alert,
		Err(err) => {
			tracing::debug!("failed to deserialize alert: {:?}", err);
			metrics.invalid.inc();
			return (StatusCode::BAD_REQUEST, Json(json!({ "error": err.to_string() })))
				.into_response();
		}
	};

	let label = if settings.channels.contains_key(&channel) { channel.as_str() } else { "unknown_channel" };
	metrics.received.with_label_values(&[label]).inc();

	match discord::send_alerts(&channel, &alert, settings, client).await {
		Ok(()) => {
			tracing::info!(channel = %channel, alerts = alert.alerts.len(), "sent alerts to discord");
		}
		Err(err) if err.is_suppression() => {
			tracing::info!(channel = %channel, "{err}");
		}
		Err(err) => {
			tracing::error!(channel = %channel, "{:#}", anyhow::Error::from(err));
		}
	}

	(StatusCode::OK, format!("Channel: {channel}")).into_response()
}

async fn handle_timeout(err: BoxError) -> (StatusCode, String) {
	if err.is::<tower::timeout::error::Elapsed>() {
		(StatusCode::REQUEST_TIMEOUT, "request took too long".to_owned())
	} else {
		(StatusCode::INTERNAL_SERVER_ERROR, format!("unhandled internal error: {err}"))
	}
}

/// routes of the receiver, requests are aborted after the configured request
/// timeout
pub fn router(settings: &'static Settings, client: Client) -> Router {
	let state = Arc::new(State { settings, client, metrics: ReceiverMetrics::global() });

	Router::new()
		.route("/", get(health))
		.route("/:channel", post(prometheus_receiver))
		.layer(Extension(state))
		.layer(
			ServiceBuilder::new()
				.layer(HandleErrorLayer::new(handle_timeout))
				.layer(TimeoutLayer::new(settings.request_timeout)),
		)
}

pub async fn run_prometheus_receiver(client: Client) -> Result<()> {
	let settings = Settings::global();
	let addr = settings.to_socket_addr()?;

	tracing::info!("listening for alertmanager webhooks on {addr}");

	axum::Server::try_bind(&addr)
		.context(format!("failed to bind {addr}"))?
		.serve(router(settings, client).into_make_service())
		.await
		.context("prometheus endpoint crashed")?;

	Ok(())
}
