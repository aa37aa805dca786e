//! dashboard and generator links written into the message content

use crate::{digest::Digest, settings::Settings};

/// First non empty value of the configured dashboard label, looked up in the
/// group labels, the common labels and the common annotations.
pub fn dashboard_url<'a>(digest: &'a Digest, settings: &Settings) -> Option<&'a str> {
	let label = settings.dashboard_link.label.as_str();

	[&digest.group_labels, &digest.common_labels, &digest.common_annotations]
		.into_iter()
		.filter_map(|map| map.get(label))
		.map(String::as_str)
		.find(|url| !url.is_empty())
}

/// first non empty generator url of the firing alerts, then of the resolved
/// ones
pub fn generator_url(digest: &Digest) -> Option<&str> {
	digest
		.groups()
		.flat_map(|group| group.alerts.iter())
		.map(|alert| alert.generator_url.as_str())
		.find(|url| !url.is_empty())
}

/// Appends the enabled links to `content`, each on its own line. The
/// dashboard link always starts with a newline, the generator link whenever
/// something was written before it.
pub fn write_links(content: &mut String, digest: &Digest, settings: &Settings) {
	if settings.dashboard_link.enabled {
		if let Some(url) = dashboard_url(digest, settings) {
			content.push_str(&format!("\n[{}]({url})", settings.dashboard_link.text));
		}
	}

	if settings.generator_link.enabled {
		if let Some(url) = generator_url(digest) {
			if !content.is_empty() {
				content.push('\n');
			}
			content.push_str(&format!("[{}]({url})", settings.generator_link.text));
		}
	}
}
