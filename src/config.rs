use std::{fmt, str::FromStr};

use tracing::level_filters::LevelFilter;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("{name} is not valid: {value:?}")]
	Invalid { name: &'static str, value: String },
	#[error("{0} is set without {1}")]
	Incomplete(&'static str, &'static str),
}

/// Credentials of an account that must exist at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct Admin {
	pub username: String,
	pub password: String,
}

impl fmt::Debug for Admin {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Admin")
			.field("username", &self.username)
			.field("password", &"<redacted>")
			.finish()
	}
}

/// Server configuration loaded from environment variables.
///
/// | Env Var            | Default       |
/// |--------------------|---------------|
/// | `DATABASE_URL`     | in-memory     |
/// | `HOST`             | `127.0.0.1`   |
/// | `PORT`             | `3000`        |
/// | `LOG_LEVEL`        | `info`        |
/// | `OTLP_ENABLED`     | `false`       |
/// | `LOGIN_RATE_LIMIT` | `true`        |
/// | `COOKIE_SECURE`    | `false`       |
/// | `ADMIN_USERNAME`   | unset         |
/// | `ADMIN_PASSWORD`   | unset         |
#[derive(Debug, Clone)]
pub struct Config {
	/// Postgres connection string. Without one, data lives in memory only.
	pub database_url: Option<String>,
	pub host: String,
	pub port: u16,
	pub log_level: LevelFilter,
	/// Export traces over OTLP.
	pub otlp_enabled: bool,
	/// Throttle login attempts per client address.
	pub login_rate_limit: bool,
	/// Mark the session cookie `Secure`.
	pub secure_cookies: bool,
	pub admin: Option<Admin>,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			database_url: None,
			host: "127.0.0.1".into(),
			port: 3000,
			log_level: LevelFilter::INFO,
			otlp_enabled: false,
			login_rate_limit: true,
			secure_cookies: false,
			admin: None,
		}
	}
}

impl Config {
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Builds the configuration from any variable source. Empty values count
	/// as unset.
	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
		let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
		let defaults = Self::default();

		let admin = match (var("ADMIN_USERNAME"), var("ADMIN_PASSWORD")) {
			(Some(username), Some(password)) => Some(Admin { username, password }),
			(None, None) => None,
			(Some(_), None) => return Err(ConfigError::Incomplete("ADMIN_USERNAME", "ADMIN_PASSWORD")),
			(None, Some(_)) => return Err(ConfigError::Incomplete("ADMIN_PASSWORD", "ADMIN_USERNAME")),
		};

		Ok(Self {
			database_url: var("DATABASE_URL"),
			host: var("HOST").unwrap_or(defaults.host),
			port: parse("PORT", var("PORT"), defaults.port)?,
			log_level: parse("LOG_LEVEL", var("LOG_LEVEL"), defaults.log_level)?,
			otlp_enabled: flag("OTLP_ENABLED", var("OTLP_ENABLED"), defaults.otlp_enabled)?,
			login_rate_limit: flag(
				"LOGIN_RATE_LIMIT",
				var("LOGIN_RATE_LIMIT"),
				defaults.login_rate_limit,
			)?,
			secure_cookies: flag("COOKIE_SECURE", var("COOKIE_SECURE"), defaults.secure_cookies)?,
			admin,
		})
	}
}

fn parse<T: FromStr>(
	name: &'static str,
	value: Option<String>,
	default: T,
) -> Result<T, ConfigError> {
	match value {
		Some(value) => value
			.trim()
			.parse()
			.map_err(|_| ConfigError::Invalid { name, value }),
		None => Ok(default),
	}
}

fn flag(name: &'static str, value: Option<String>, default: bool) -> Result<bool, ConfigError> {
	let Some(value) = value else {
		return Ok(default);
	};

	match value.trim().to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Ok(true),
		"0" | "false" | "no" | "off" => Ok(false),
		_ => Err(ConfigError::Invalid { name, value }),
	}
}
