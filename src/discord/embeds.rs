//! Builds one embed per alert name and orders them by severity priority.

use crate::{
	alert::{self, Alert},
	digest::{Digest, Group, ALERTNAME_LABEL},
	discord::{message::Embed, time_display, SendError},
	settings::{MessageType, Settings},
};

/// title if no summary or alert name is available
const UNKNOWN_TITLE: &str = "Unknown Alert";
/// description of alerts without description annotation
const NO_DESCRIPTION: &str = "No description provided";

/// color, emoji and priority an embed is rendered with
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Appearance {
	color: u32,
	emoji: Option<String>,
	priority: i32,
}

/// Title of a group: the first non empty value of the group summary, any
/// alert's summary annotation, the group alert name and the first alert's
/// alert name.
fn title(group: &Group) -> &str {
	let group_label =
		|name: &str| group.group_labels.get(name).map(String::as_str).filter(|v| !v.is_empty());

	group_label("summary")
		.or_else(|| group.alerts.iter().find_map(|alert| alert.annotation("summary")))
		.or_else(|| group_label(ALERTNAME_LABEL))
		.or_else(|| group.alerts.first().and_then(|alert| alert.label(ALERTNAME_LABEL)))
		.unwrap_or(UNKNOWN_TITLE)
}

/// Resolves the appearance of a group from its status, or for firing groups
/// in severity mode from the severity of its first alert.
fn appearance(status: &str, first: Option<&Alert>, settings: &Settings) -> Result<Appearance, SendError> {
	let from_status = |status: &str| {
		let status = settings.status.get(status).cloned().unwrap_or_default();
		Appearance { color: status.color, emoji: Some(status.emoji), priority: 0 }
	};

	if status == alert::RESOLVED {
		return Ok(from_status(alert::RESOLVED));
	}

	match &settings.message_type {
		MessageType::Status => Ok(from_status(alert::FIRING)),
		MessageType::Severity => {
			let severity = first.and_then(|alert| alert.labels.get(&settings.severity.label));

			// without severity label the embed stays uncolored
			Ok(severity.map_or_else(Appearance::default, |severity| {
				let severity = settings.severity.appearance(severity);
				Appearance {
					color: severity.color,
					emoji: Some(severity.emoji),
					priority: severity.priority,
				}
			}))
		}
		MessageType::Unsupported(message_type) => {
			Err(SendError::InvalidMessageType(message_type.clone()))
		}
	}
}

/// description block of a single alert, fenced as code
fn alert_block(alert: &Alert, resolved: bool, settings: &Settings) -> String {
	let time_display = &settings.time_display;

	let mut block = String::from("```");

	if time_display.enabled {
		block.push_str("🔔\n");
	}

	match alert.annotation("description") {
		Some(description) => block.push_str(description.trim_end_matches('\n')),
		None => block.push_str(NO_DESCRIPTION),
	}
	block.push('\n');

	let time = time_display::time_block(alert, resolved, time_display);
	if !time.is_empty() {
		block.push('\n');
		block.push_str(&time);
	}

	block.push_str("```");

	block
}

/// Builds the embed of `group` and returns it together with its priority.
fn build_embed(group: &Group, status: &str, settings: &Settings) -> Result<(i32, Embed), SendError> {
	let resolved = status == alert::RESOLVED;
	let appearance = appearance(status, group.alerts.first(), settings)?;

	let alerts: String =
		group.alerts.iter().map(|alert| alert_block(alert, resolved, settings)).collect();

	let title = match &appearance.emoji {
		Some(emoji) => format!("{emoji} {}", title(group)),
		None => title(group).to_owned(),
	};

	let mut description = format!("### {title}\n\n{alerts}");
	if let Some(len) = description.strip_suffix("\n\n").map(str::len) {
		description.truncate(len);
	}

	Ok((appearance.priority, Embed { title: String::new(), description, color: appearance.color }))
}

/// Builds the embeds of all firing and resolved groups, sorted by priority
/// descending. Groups of equal priority keep firing before resolved and
/// alert name order.
pub fn build_embeds(digest: &Digest, settings: &Settings) -> Result<Vec<Embed>, SendError> {
	let firing = digest.firing.values().map(|group| build_embed(group, alert::FIRING, settings));
	let resolved =
		digest.resolved.values().map(|group| build_embed(group, alert::RESOLVED, settings));

	let mut embeds = firing.chain(resolved).collect::<Result<Vec<_>, _>>()?;
	embeds.sort_by(|(a, _), (b, _)| b.cmp(a));

	Ok(embeds.into_iter().map(|(_, embed)| embed).collect())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::digest::tests::{alert, batch};

	fn severity_settings() -> Settings {
		Settings { message_type: MessageType::Severity, ..Default::default() }
	}

	fn with_description(mut alert: Alert, description: &str) -> Alert {
		alert.annotations.insert("description".to_owned(), description.to_owned());
		alert
	}

	#[test]
	fn single_critical_in_severity_mode() {
		let digest = Digest::new(
			&batch(vec![with_description(alert("firing", "Down", Some("critical")), "api is down\n\n")]),
			&severity_settings(),
		);

		let embeds = build_embeds(&digest, &severity_settings()).unwrap();

		assert_eq!(embeds.len(), 1);
		assert_eq!(embeds[0].color, 11027200);
		assert_eq!(embeds[0].title, "");
		assert_eq!(embeds[0].description, "### :rotating_light: Down\n\n```api is down\n```");
	}

	#[test]
	fn status_mode_colors_by_status() {
		let settings = Settings::default();
		let digest = Digest::new(
			&batch(vec![alert("firing", "Down", Some("critical")), alert("resolved", "Up", None)]),
			&settings,
		);

		let embeds = build_embeds(&digest, &settings).unwrap();

		assert_eq!(embeds[0].color, 10038562);
		assert!(embeds[0].description.starts_with("### :rotating_light: Down\n\n"));
		assert_eq!(embeds[1].color, 3066993);
		assert_eq!(
			embeds[1].description,
			"### :white_check_mark: Up\n\n```No description provided\n```"
		);
	}

	#[test]
	fn sorted_by_priority_descending() {
		let settings = severity_settings();
		let digest = Digest::new(
			&batch(vec![
				alert("firing", "A", Some("info")),
				alert("firing", "B", Some("warning")),
				alert("resolved", "C", Some("disaster")),
				alert("firing", "D", Some("disaster")),
				alert("firing", "E", Some("critical")),
			]),
			&settings,
		);

		let titles: Vec<String> = build_embeds(&digest, &settings)
			.unwrap()
			.into_iter()
			.map(|embed| embed.description.lines().next().unwrap_or_default().to_owned())
			.collect();

		assert_eq!(
			titles,
			vec![
				"### :fire: D",
				"### :rotating_light: E",
				"### :warning: B",
				"### :information_source: A",
				"### :white_check_mark: C",
			]
		);
	}

	#[test]
	fn unknown_severity_uses_fallback_appearance() {
		let settings = severity_settings();
		let digest = Digest::new(&batch(vec![alert("firing", "Odd", Some("bogus"))]), &settings);

		let embeds = build_embeds(&digest, &settings).unwrap();

		assert_eq!(embeds[0].color, 9807270);
		assert!(embeds[0].description.starts_with("### :grey_question: Odd"));
	}

	#[test]
	fn missing_severity_label_leaves_embed_uncolored() {
		let settings = severity_settings();
		let group = Group { alerts: vec![alert("firing", "Bare", None)], ..Default::default() };

		let (priority, embed) = build_embed(&group, alert::FIRING, &settings).unwrap();

		assert_eq!(priority, 0);
		assert_eq!(embed.color, 0);
		assert!(embed.description.starts_with("### Bare\n\n"));
	}

	#[test]
	fn unsupported_message_type_fails() {
		let settings =
			Settings { message_type: MessageType::Unsupported("rainbow".to_owned()), ..Default::default() };
		let digest = Digest::new(&batch(vec![alert("firing", "Down", Some("critical"))]), &settings);

		assert!(matches!(
			build_embeds(&digest, &settings),
			Err(SendError::InvalidMessageType(message_type)) if message_type == "rainbow"
		));
	}

	#[test]
	fn unsupported_message_type_only_matters_for_firing() {
		let settings =
			Settings { message_type: MessageType::Unsupported("rainbow".to_owned()), ..Default::default() };
		let digest = Digest::new(&batch(vec![alert("resolved", "Up", Some("critical"))]), &settings);

		assert_eq!(build_embeds(&digest, &settings).unwrap().len(), 1);
	}

	#[test]
	fn title_precedence() {
		let mut group = Group { alerts: vec![alert("firing", "Name", None)], ..Default::default() };
		assert_eq!(title(&group), "Name");

		group.group_labels.insert("alertname".to_owned(), "GroupName".to_owned());
		assert_eq!(title(&group), "GroupName");

		let mut summarized = alert("firing", "Name", None);
		summarized.annotations.insert("summary".to_owned(), "from annotation".to_owned());
		group.alerts.push(summarized);
		assert_eq!(title(&group), "from annotation");

		group.group_labels.insert("summary".to_owned(), "from group".to_owned());
		assert_eq!(title(&group), "from group");

		assert_eq!(title(&Group::default()), UNKNOWN_TITLE);
	}

	#[test]
	fn concatenates_alert_blocks_in_order() {
		let settings = Settings::default();
		let digest = Digest::new(
			&batch(vec![
				with_description(alert("firing", "Load", Some("warning")), "node-1"),
				with_description(alert("firing", "Load", Some("warning")), "node-2"),
			]),
			&settings,
		);

		let embeds = build_embeds(&digest, &settings).unwrap();

		assert_eq!(embeds[0].description, "### :rotating_light: Load\n\n```node-1\n``````node-2\n```");
	}

	#[test]
	fn time_display_adds_bell_and_time_block() {
		let mut settings = Settings::default();
		settings.time_display.enabled = true;
		let mut resolved = with_description(alert("resolved", "Disk", Some("warning")), "disk full");
		resolved.ends_at = "2024-01-02T03:04:05Z".to_owned();
		let digest = Digest::new(&batch(vec![resolved]), &settings);

		let embeds = build_embeds(&digest, &settings).unwrap();

		assert_eq!(
			embeds[0].description,
			"### :white_check_mark: Disk\n\n```🔔\ndisk full\n\n🕑\nStarted at: 01.01.2024 00:00:00 UTC\nEnded at: 02.01.2024 03:04:05 UTC\nDuration: 1d 3h 4m 5s```"
		);
	}

	#[test]
	fn time_display_without_parsable_start() {
		let mut settings = Settings::default();
		settings.time_display.enabled = true;
		let mut firing = alert("firing", "Load", Some("warning"));
		firing.starts_at = "soon".to_owned();
		let digest = Digest::new(&batch(vec![firing]), &settings);

		let embeds = build_embeds(&digest, &settings).unwrap();

		assert_eq!(embeds[0].description, "### :rotating_light: Load\n\n```🔔\nNo description provided\n```");
	}
}
