use std::{
	collections::HashMap,
	ffi::OsStr,
	net::{SocketAddr, ToSocketAddrs},
	path::{Path, PathBuf},
	time::Duration,
};

use anyhow::{bail, Context, Result};
use clap::{Arg, Command};
use config::{Config, FileFormat};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSeconds};

use crate::{
	discord::settings::ChannelSettings, log::LogSettings,
	telemetry_endpoint::TelemetryEndpointSettings,
};

static SETTINGS: OnceCell<Settings> = OnceCell::new();

/// avatar shown for messages when none is configured
pub const DEFAULT_AVATAR_URL: &str =
	"https://raw.githubusercontent.com/kolesaev/alertmanager-discord/master/assets/images/prometheus-logo.png";

/// severity assigned to alerts without a severity label
pub const UNKNOWN_SEVERITY: &str = "unknown";

/// Keys missing from the merged sources take their default value, the default
/// layer loses its empty lists and tables when converted into a config source.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
	#[serde(rename = "avatarURL")]
	pub avatar_url: String,
	pub listen_address: String,
	pub username: String,
	pub message_type: MessageType,
	pub status: HashMap<String, StatusAppearance>,
	/// mention roles once this many alerts are firing, disabled if <= 0
	pub firing_count_to_mention: i64,
	pub roles_to_mention: Vec<String>,
	pub severities_to_mention: Vec<String>,
	pub severities_to_ignore_when_alone: Vec<String>,
	pub severity: SeverityDefinition,
	pub dashboard_link: DashboardLinkSettings,
	pub generator_link: GeneratorLinkSettings,
	pub time_display: TimeDisplaySettings,
	pub channels: HashMap<String, ChannelSettings>,
	pub log: LogSettings,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub telemetry_endpoint: Option<TelemetryEndpointSettings>,
	#[serde_as(as = "DurationSeconds<f64>")]
	pub request_timeout: Duration,
	#[serde_as(as = "DurationSeconds<f64>")]
	pub webhook_timeout: Duration,
	/// file the settings were loaded from
	#[serde(skip)]
	pub config_path: PathBuf,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			avatar_url: DEFAULT_AVATAR_URL.to_owned(),
			listen_address: ":8080".to_owned(),
			username: "alertmanager".to_owned(),
			message_type: MessageType::Status,
			status: HashMap::from([
				("firing".to_owned(), StatusAppearance::new(10038562, ":rotating_light:")),
				("resolved".to_owned(), StatusAppearance::new(3066993, ":white_check_mark:")),
			]),
			firing_count_to_mention: -1,
			roles_to_mention: Vec::new(),
			severities_to_mention: Vec::new(),
			severities_to_ignore_when_alone: Vec::new(),
			severity: SeverityDefinition::default(),
			dashboard_link: DashboardLinkSettings::default(),
			generator_link: GeneratorLinkSettings::default(),
			time_display: TimeDisplaySettings::default(),
			channels: HashMap::new(),
			log: LogSettings::default(),
			telemetry_endpoint: None,
			request_timeout: Duration::from_secs(10),
			webhook_timeout: Duration::from_secs(10),
			config_path: PathBuf::new(),
		}
	}
}

impl Settings {
	pub fn global() -> &'static Self {
		SETTINGS.get_or_init(|| {
			match Self::from_args().context("failed to load config and command line arguments") {
				Ok(settings) => settings,
				Err(err) => {
					// tracing wasn't setup yet
					panic!("{:#?}", err);
				}
			}
		})
	}

	fn from_args() -> Result<Self> {
		let opts = Command::new(clap::crate_name!())
			.version(clap::crate_version!())
			.about(clap::crate_description!())
			.author(clap::crate_authors!())
			.args(&[
				Arg::new("config")
					.help("path of config file")
					.takes_value(true)
					.short('c')
					.long("config")
					.env("CONFIG_PATH")
					.default_value("./config.yaml"),
				Arg::new("level")
					.help("log level")
					.possible_values(["Error", "Warn", "Info", "Debug", "Trace"])
					.ignore_case(true)
					.takes_value(true)
					.long("log"),
			])
			.get_matches();

		let config_path = opts.value_of("config").context("no config path given")?;

		let mut settings = Self::load(Path::new(config_path))?;

		if let Some(level) = opts.value_of("level") {
			settings.log.level = level.to_string();
		}

		Ok(settings)
	}

	/// Loads the file at `path` and merges it over the defaults.
	///
	/// Files with an extension other than json, yaml or yml are only checked
	/// for existence and leave the defaults untouched.
	pub fn load(path: &Path) -> Result<Self> {
		if !path.is_file() {
			bail!("config file {:?} doesn't exist", path);
		}

		let file = file_format(path).map(|format| config::File::from(path).format(format));

		let mut settings = Self::merge(file).context(format!("can't load config {:?}", path))?;
		settings.config_path = path.to_path_buf();

		Ok(settings)
	}

	/// Deep merges `source` over the default settings. Tables are merged key
	/// by key, scalars and lists replace their defaults.
	pub fn merge<S>(source: Option<S>) -> Result<Self>
	where
		S: config::Source + Send + Sync + 'static,
	{
		let defaults =
			Config::try_from(&Self::default()).context("can't serialize default settings")?;

		let mut builder = Config::builder().add_source(defaults);
		if let Some(source) = source {
			builder = builder.add_source(source);
		}

		builder
			.build()
			.context("can't merge config")?
			.try_deserialize()
			.context("invalid config")
	}

	/// socket address of the alertmanager webhook receiver
	pub fn to_socket_addr(&self) -> Result<SocketAddr> {
		parse_listen_address(&self.listen_address)
	}
}

/// format of a config file, chosen by its extension
pub fn file_format(path: &Path) -> Option<FileFormat> {
	match path.extension().and_then(OsStr::to_str) {
		Some("json") => Some(FileFormat::Json),
		Some("yaml" | "yml") => Some(FileFormat::Yaml),
		_ => None,
	}
}

/// Resolves `host:port` or `:port` (all interfaces) to a socket address.
pub fn parse_listen_address(address: &str) -> Result<SocketAddr> {
	let address = match address.strip_prefix(':') {
		Some(port) => format!("0.0.0.0:{port}"),
		None => address.to_owned(),
	};

	address
		.to_socket_addrs()
		.context(format!("invalid listen address {address}"))?
		.next()
		.context(format!("listen address {address} doesn't resolve"))
}

/// Selects how firing embeds are colored. Unsupported values are kept so that
/// message building can report them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MessageType {
	/// color by alert status
	Status,
	/// color by severity of the group's first alert
	Severity,
	Unsupported(String),
}

impl From<String> for MessageType {
	fn from(value: String) -> Self {
		match value.as_str() {
			"status" => Self::Status,
			"severity" => Self::Severity,
			_ => Self::Unsupported(value),
		}
	}
}

impl From<MessageType> for String {
	fn from(value: MessageType) -> Self {
		match value {
			MessageType::Status => "status".to_owned(),
			MessageType::Severity => "severity".to_owned(),
			MessageType::Unsupported(value) => value,
		}
	}
}

/// Embed color and title emoji for an alert status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusAppearance {
	pub color: u32,
	pub emoji: String,
}

impl StatusAppearance {
	fn new(color: u32, emoji: &str) -> Self {
		Self { color, emoji: emoji.to_owned() }
	}
}

/// Embed color, title emoji and ordering priority for a severity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityAppearance {
	pub color: u32,
	pub emoji: String,
	/// embeds with higher priority are listed first
	pub priority: i32,
}

impl SeverityAppearance {
	fn new(color: u32, emoji: &str, priority: i32) -> Self {
		Self { color, emoji: emoji.to_owned(), priority }
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityDefinition {
	/// name of the label carrying the severity
	pub label: String,
	pub values: HashMap<String, SeverityAppearance>,
}

impl Default for SeverityDefinition {
	fn default() -> Self {
		let grey = 9807270;
		let blue = 3447003;
		let gold = 15844367;
		let dark_orange = 11027200;
		let dark_red = 10038562;

		Self {
			label: "severity".to_owned(),
			values: HashMap::from([
				(UNKNOWN_SEVERITY.to_owned(), SeverityAppearance::new(grey, ":grey_question:", 0)),
				("information".to_owned(), SeverityAppearance::new(blue, ":information_source:", 0)),
				("info".to_owned(), SeverityAppearance::new(blue, ":information_source:", 0)),
				("warning".to_owned(), SeverityAppearance::new(gold, ":warning:", 1)),
				("warn".to_owned(), SeverityAppearance::new(gold, ":warning:", 1)),
				("critical".to_owned(), SeverityAppearance::new(dark_orange, ":rotating_light:", 2)),
				("disaster".to_owned(), SeverityAppearance::new(dark_red, ":fire:", 3)),
			]),
		}
	}
}

impl SeverityDefinition {
	/// appearance of `severity`, falling back to the appearance of unknown
	/// severities
	pub fn appearance(&self, severity: &str) -> SeverityAppearance {
		self.values
			.get(severity)
			.or_else(|| self.values.get(UNKNOWN_SEVERITY))
			.cloned()
			.unwrap_or_default()
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardLinkSettings {
	pub enabled: bool,
	/// label or annotation holding the dashboard url
	pub label: String,
	pub text: String,
}

impl Default for DashboardLinkSettings {
	fn default() -> Self {
		Self { enabled: false, label: "url".to_owned(), text: "Open in Dashboard".to_owned() }
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorLinkSettings {
	pub enabled: bool,
	pub text: String,
}

impl Default for GeneratorLinkSettings {
	fn default() -> Self {
		Self { enabled: false, text: "Open in PromQL".to_owned() }
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimeDisplaySettings {
	pub enabled: bool,
	pub starts_at_text: String,
	pub ends_at_text: String,
	pub duration_text: String,
	/// accepted for compatibility, time blocks are currently shown for every
	/// severity
	pub hidden_for_severities: Vec<String>,
}

impl Default for TimeDisplaySettings {
	fn default() -> Self {
		Self {
			enabled: false,
			starts_at_text: "Started at:".to_owned(),
			ends_at_text: "Ended at:".to_owned(),
			duration_text: "Duration:".to_owned(),
			hidden_for_severities: Vec::new(),
		}
	}
}
