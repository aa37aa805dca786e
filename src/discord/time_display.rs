//! start, end and duration of an alert shown below its description

use chrono::{DateTime, Duration, FixedOffset};

use crate::{alert::Alert, settings::TimeDisplaySettings};

/// Renders the time block of `alert`. Returns an empty string if the time
/// display is disabled or the start time can't be parsed. End time and
/// duration are only shown for resolved alerts.
pub fn time_block(alert: &Alert, resolved: bool, settings: &TimeDisplaySettings) -> String {
	if !settings.enabled {
		return String::new();
	}

	let starts_at = match DateTime::parse_from_rfc3339(&alert.starts_at) {
		Ok(starts_at) => starts_at,
		Err(err) => {
			tracing::error!(fingerprint = %alert.fingerprint, "failed to parse startsAt {:?}: {err}", alert.starts_at);
			return String::new();
		}
	};

	let mut block = format!("🕑\n{} {}", settings.starts_at_text, format_time(&starts_at));

	if resolved && !alert.ends_at.is_empty() {
		match DateTime::parse_from_rfc3339(&alert.ends_at) {
			Ok(ends_at) => {
				block.push_str(&format!("\n{} {}", settings.ends_at_text, format_time(&ends_at)));
				block.push_str(&format!(
					"\n{} {}",
					settings.duration_text,
					format_duration(ends_at.signed_duration_since(starts_at))
				));
			}
			Err(err) => {
				tracing::error!(fingerprint = %alert.fingerprint, "failed to parse endsAt {:?}: {err}", alert.ends_at);
			}
		}
	}

	block
}

/// `DD.MM.YYYY HH:MM:SS` followed by `UTC` or the numeric offset
fn format_time(time: &DateTime<FixedOffset>) -> String {
	let zone = if time.offset().local_minus_utc() == 0 {
		"UTC".to_owned()
	} else {
		time.format("%z").to_string()
	};

	format!("{} {zone}", time.format("%d.%m.%Y %H:%M:%S"))
}

/// Formats as `1d 3h 4m 5s`, leaving out zero components. Zero or negative
/// durations are formatted as `0s`.
pub fn format_duration(duration: Duration) -> String {
	let seconds = duration.num_seconds().max(0);

	let parts: Vec<String> = [
		(seconds / 86400, 'd'),
		(seconds / 3600 % 24, 'h'),
		(seconds / 60 % 60, 'm'),
		(seconds % 60, 's'),
	]
	.into_iter()
	.filter(|(value, _)| *value > 0)
	.map(|(value, unit)| format!("{value}{unit}"))
	.collect();

	if parts.is_empty() {
		"0s".to_owned()
	} else {
		parts.join(" ")
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn enabled() -> TimeDisplaySettings {
		TimeDisplaySettings { enabled: true, ..Default::default() }
	}

	fn alert(starts_at: &str, ends_at: &str) -> Alert {
		Alert { starts_at: starts_at.to_owned(), ends_at: ends_at.to_owned(), ..Default::default() }
	}

	#[test]
	fn resolved_alert_shows_duration() {
		let block = time_block(&alert("2024-01-01T00:00:00Z", "2024-01-02T03:04:05Z"), true, &enabled());

		assert_eq!(
			block,
			"🕑\nStarted at: 01.01.2024 00:00:00 UTC\nEnded at: 02.01.2024 03:04:05 UTC\nDuration: 1d 3h 4m 5s"
		);
	}

	#[test]
	fn firing_alert_shows_start_only() {
		let block = time_block(&alert("2024-01-01T00:00:00Z", "0001-01-01T00:00:00Z"), false, &enabled());

		assert_eq!(block, "🕑\nStarted at: 01.01.2024 00:00:00 UTC");
	}

	#[test]
	fn keeps_numeric_offset() {
		let block = time_block(&alert("2024-03-05T14:30:00+02:00", ""), true, &enabled());

		assert_eq!(block, "🕑\nStarted at: 05.03.2024 14:30:00 +0200");
	}

	#[test]
	fn invalid_start_omits_block() {
		assert_eq!(time_block(&alert("yesterday", ""), false, &enabled()), "");
	}

	#[test]
	fn invalid_end_keeps_start() {
		let block = time_block(&alert("2024-01-01T00:00:00Z", "later"), true, &enabled());

		assert_eq!(block, "🕑\nStarted at: 01.01.2024 00:00:00 UTC");
	}

	#[test]
	fn disabled_renders_nothing() {
		let block = time_block(&alert("2024-01-01T00:00:00Z", ""), false, &TimeDisplaySettings::default());

		assert_eq!(block, "");
	}

	#[test]
	fn duration_components() {
		assert_eq!(format_duration(Duration::seconds(0)), "0s");
		assert_eq!(format_duration(Duration::seconds(-30)), "0s");
		assert_eq!(format_duration(Duration::seconds(59)), "59s");
		assert_eq!(format_duration(Duration::seconds(3600)), "1h");
		assert_eq!(format_duration(Duration::seconds(86400 + 60)), "1d 1m");
		assert_eq!(format_duration(Duration::seconds(2 * 86400 + 5 * 3600 + 7)), "2d 5h 7s");
	}
}
