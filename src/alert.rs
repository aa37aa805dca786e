//! data structures for deserializing incoming alerts
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// status value of an alert which is currently active
pub const FIRING: &str = "firing";
/// status value of an alert which stopped being active
pub const RESOLVED: &str = "resolved";

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
/// data from prometheus received by the alertmanager webhook receiver
#[allow(clippy::missing_docs_in_private_items)]
pub struct Data {
	pub version: String,
	pub group_key: String,
	pub truncated_alerts: u64,

	pub receiver: String,
	pub status: String,
	pub alerts: Vec<Alert>,
	pub group_labels: HashMap<String, String>,
	pub common_labels: HashMap<String, String>,
	pub common_annotations: HashMap<String, String>,
	#[serde(rename = "externalURL")]
	pub external_url: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
#[allow(clippy::missing_docs_in_private_items)]
pub struct Alert {
	pub status: String,
	pub labels: HashMap<String, String>,
	pub annotations: HashMap<String, String>,
	/// kept as received, parsed only when rendering the time block so a
	/// malformed timestamp doesn't reject the whole batch
	pub starts_at: String,
	pub ends_at: String,
	#[serde(rename = "generatorURL")]
	pub generator_url: String,
	pub fingerprint: String,
}

impl Alert {
	/// value of label `name`, empty values count as absent
	pub fn label(&self, name: &str) -> Option<&str> {
		self.labels.get(name).map(String::as_str).filter(|value| !value.is_empty())
	}

	/// value of annotation `name`, empty values count as absent
	pub fn annotation(&self, name: &str) -> Option<&str> {
		self.annotations.get(name).map(String::as_str).filter(|value| !value.is_empty())
	}
}
