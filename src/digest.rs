//! Aggregates an alertmanager batch into the per alert name groups and counts
//! the message is built from.

use std::collections::{BTreeMap, HashMap};

use crate::{
	alert::{self, Alert},
	settings::{Settings, UNKNOWN_SEVERITY},
};

/// label used to group alerts
pub const ALERTNAME_LABEL: &str = "alertname";

/// alerts sharing the same `alertname` label
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Group {
	pub alerts: Vec<Alert>,
	/// group labels of the batch the alerts arrived in
	pub group_labels: HashMap<String, String>,
}

/// groups keyed by alert name, iterated in lexicographic order
pub type Groups = BTreeMap<String, Group>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Digest {
	pub firing_count: usize,
	pub resolved_count: usize,
	/// number of alerts per severity, alerts without severity label are
	/// counted as `unknown`
	pub count_by_severity: BTreeMap<String, usize>,
	pub firing: Groups,
	pub resolved: Groups,
	pub group_labels: HashMap<String, String>,
	pub common_labels: HashMap<String, String>,
	pub common_annotations: HashMap<String, String>,
	pub external_url: String,
}

impl Digest {
	/// Aggregates `data` in a single pass.
	///
	/// The grouped alerts are copies of the received ones, alerts without a
	/// severity label get the label set to `unknown` in their copy. Alerts
	/// with a status other than firing or resolved are only counted by
	/// severity.
	pub fn new(data: &alert::Data, settings: &Settings) -> Self {
		let severity_label = settings.severity.label.as_str();

		let mut digest = Self {
			group_labels: data.group_labels.clone(),
			common_labels: data.common_labels.clone(),
			common_annotations: data.common_annotations.clone(),
			external_url: data.external_url.clone(),
			..Default::default()
		};

		for alert in data.alerts.iter() {
			let mut alert = alert.clone();

			let severity = alert
				.labels
				.entry(severity_label.to_owned())
				.or_insert_with(|| UNKNOWN_SEVERITY.to_owned())
				.clone();
			*digest.count_by_severity.entry(severity).or_default() += 1;

			let groups = match alert.status.as_str() {
				alert::FIRING => {
					digest.firing_count += 1;
					&mut digest.firing
				}
				alert::RESOLVED => {
					digest.resolved_count += 1;
					&mut digest.resolved
				}
				_ => continue,
			};

			let name = alert.labels.get(ALERTNAME_LABEL).cloned().unwrap_or_default();
			let group = groups.entry(name).or_insert_with(|| Group {
				alerts: Vec::new(),
				group_labels: data.group_labels.clone(),
			});
			group.alerts.push(alert);
		}

		digest
	}

	/// firing groups followed by resolved groups
	pub fn groups(&self) -> impl Iterator<Item = &Group> {
		self.firing.values().chain(self.resolved.values())
	}
}
