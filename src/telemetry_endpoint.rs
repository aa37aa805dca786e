//! Here we expose prometheus metrics about the bridge
use anyhow::{Context, Result};
use axum::{
	http::{header::CONTENT_TYPE, StatusCode},
	response::{IntoResponse, Response},
	routing::get,
	Router,
};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};

use crate::settings::parse_listen_address;

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryEndpointSettings {
	pub listen_address: String,
}

async fn metrics_handler() -> Response {
	let mut buffer = vec![];
	let encoder = TextEncoder::new();
	let metric_families = prometheus::gather();

	if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
		tracing::error!("failed to encode metrics: {err}");
		return StatusCode::INTERNAL_SERVER_ERROR.into_response();
	}

	([(CONTENT_TYPE, encoder.format_type().to_owned())], buffer).into_response()
}

pub fn router() -> Router {
	Router::new().route("/metrics", get(metrics_handler))
}

pub async fn run_telemetry_endpoint(settings: &TelemetryEndpointSettings) -> Result<()> {
	let addr = parse_listen_address(&settings.listen_address)?;

	tracing::info!("serving metrics on {addr}");

	axum::Server::try_bind(&addr)
		.context(format!("failed to bind {addr}"))?
		.serve(router().into_make_service())
		.await
		.context("telemetry endpoint crashed")?;

	Ok(())
}

#[cfg(test)]
mod tests {
	use axum::{body::Body, http::Request};
	use tower::ServiceExt;

	use super::*;

	#[tokio::test]
	async fn serves_text_format() {
		let response = router()
			.oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
			.await
			.unwrap();

		assert_eq!(response.status(), StatusCode::OK);
		assert!(response.headers()[CONTENT_TYPE].to_str().unwrap().starts_with("text/plain"));
	}
}
