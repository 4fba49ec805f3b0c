//! Configuration for the unimcp server.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! and translation to `unimcp_core::ControllerConfig`. The binary layers
//! its command-line flags on top through [`Overrides`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use unimcp_core::{ControllerConfig, PlatformHint, TlsVerification};

/// Keyring service name; entries are keyed `<profile>/api-key`.
pub const KEYRING_SERVICE: &str = "unimcp";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no API key for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{name}' not found in config")]
    UnknownProfile { name: String },

    #[error("no controller configured")]
    NoController,

    #[error("could not read configuration: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── File model ───────────────────────────────────────────────────────

/// `config.toml` as a whole.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named on the command line.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Keyed by the name passed to `--profile`.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

/// One `[profiles.<name>]` table.
#[derive(Debug, Deserialize, Serialize)]
pub struct Profile {
    /// Console or controller root URL.
    pub controller: String,

    /// Site token used when a tool call leaves `site_id` blank.
    pub site: Option<String>,

    /// "auto", "unifi-os", or "classic".
    #[serde(default = "default_platform")]
    pub platform: String,

    /// API key (plaintext; prefer keyring or env var).
    pub api_key: Option<String>,

    /// Name of an env var to read the key from.
    pub api_key_env: Option<String>,

    /// Extra PEM trust root.
    pub ca_cert: Option<PathBuf>,

    /// Beats `defaults.insecure`.
    pub insecure: Option<bool>,

    /// Seconds; beats `defaults.timeout`.
    pub timeout: Option<u64>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            controller: String::new(),
            site: None,
            platform: default_platform(),
            api_key: None,
            api_key_env: None,
            ca_cert: None,
            insecure: None,
            timeout: None,
        }
    }
}

fn default_platform() -> String {
    "auto".into()
}

// ── Locations & loading ──────────────────────────────────────────────

/// `config.toml` under the platform config dir (XDG on Linux).
pub fn config_path() -> PathBuf {
    match ProjectDirs::from("com", "unimcp", "unimcp") {
        Some(dirs) => dirs.config_dir().join("config.toml"),
        None => home_config_dir().join("config.toml"),
    }
}

// No resolvable home directory from `directories`; fall back to $HOME.
fn home_config_dir() -> PathBuf {
    let home = std::env::var_os("HOME").map_or_else(|| PathBuf::from("."), PathBuf::from);
    home.join(".config").join("unimcp")
}

/// Merge built-in defaults, the TOML file at `path`, then `UNIFI_*` env.
/// A missing file just yields the defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = file_figment(path).merge(config_env()).extract()?;
    Ok(config)
}

fn file_figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
}

/// `UNIFI_DEFAULT_PROFILE`, `UNIFI_DEFAULTS_<FIELD>` and
/// `UNIFI_PROFILES_<NAME>_<FIELD>`. Field names keep their underscores, so
/// a profile addressed this way needs a name without one. Other `UNIFI_*`
/// variables are CLI flags and are skipped.
fn config_env() -> Env {
    Env::prefixed("UNIFI_").filter_map(|key| {
        let key = key.as_str().to_ascii_lowercase();
        if key == "default_profile" {
            return Some(key.into());
        }
        if let Some(field) = key.strip_prefix("defaults_") {
            return Some(format!("defaults.{field}").into());
        }
        let (name, field) = key.strip_prefix("profiles_")?.split_once('_')?;
        Some(format!("profiles.{name}.{field}").into())
    })
}

// ── Credential resolution ───────────────────────────────────────────

/// Find the API key for a profile: its `api_key_env` variable, then the
/// keyring entry `<profile>/api-key`, then a plaintext `api_key`.
pub fn resolve_api_key(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    let from_env = profile
        .api_key_env
        .as_deref()
        .and_then(|var| std::env::var(var).ok());

    let key = from_env
        .or_else(|| keyring_key(profile_name))
        .or_else(|| profile.api_key.clone())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.to_owned(),
        })?;

    Ok(SecretString::from(key))
}

fn keyring_key(profile_name: &str) -> Option<String> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/api-key"))
        .and_then(|entry| entry.get_password())
        .ok()
}

pub fn parse_platform(value: &str) -> Result<PlatformHint, ConfigError> {
    match value {
        "auto" => Ok(PlatformHint::Auto),
        "unifi-os" => Ok(PlatformHint::UnifiOs),
        "classic" => Ok(PlatformHint::Classic),
        other => Err(ConfigError::Validation {
            field: "platform".into(),
            reason: format!("expected 'auto', 'unifi-os', or 'classic', got '{other}'"),
        }),
    }
}

// ── Translation to ControllerConfig ─────────────────────────────────

/// Values supplied on the command line (or their env fallbacks).
/// Each one beats the profile.
#[derive(Debug, Default)]
pub struct Overrides {
    pub profile: Option<String>,
    pub controller: Option<String>,
    pub api_key: Option<SecretString>,
    pub site: Option<String>,
    pub insecure: bool,
    pub timeout: Option<u64>,
}

/// The profile name in effect: flag > `default_profile` > `"default"`.
pub fn active_profile_name(overrides: &Overrides, config: &Config) -> String {
    overrides
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build a `ControllerConfig` from the active profile plus overrides.
///
/// Without a matching profile, `--controller` and `--api-key` alone are
/// enough; naming a profile that does not exist is an error.
pub fn resolve_controller_config(
    config: &Config,
    overrides: &Overrides,
) -> Result<ControllerConfig, ConfigError> {
    let profile_name = active_profile_name(overrides, config);
    let adhoc = Profile::default();

    let profile = match config.profiles.get(&profile_name) {
        Some(profile) => profile,
        None if overrides.profile.is_some() => {
            return Err(ConfigError::UnknownProfile { name: profile_name });
        }
        None if overrides.controller.is_some() => &adhoc,
        None => return Err(ConfigError::NoController),
    };

    // clap already folds env vars into the overrides
    let url_str = overrides
        .controller
        .as_deref()
        .unwrap_or(&profile.controller);
    if url_str.is_empty() {
        return Err(ConfigError::NoController);
    }
    let url: url::Url = url_str.parse().map_err(|_| ConfigError::Validation {
        field: "controller".into(),
        reason: format!("invalid URL: {url_str}"),
    })?;

    let api_key = match overrides.api_key {
        Some(ref key) => key.clone(),
        None => resolve_api_key(profile, &profile_name)?,
    };

    let insecure = overrides.insecure || profile.insecure.unwrap_or(config.defaults.insecure);
    let tls = if insecure {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let site = overrides.site.clone().or_else(|| profile.site.clone());

    let timeout = Duration::from_secs(
        overrides
            .timeout
            .or(profile.timeout)
            .unwrap_or(config.defaults.timeout),
    );

    Ok(ControllerConfig {
        url,
        api_key,
        site,
        platform: parse_platform(&profile.platform)?,
        tls,
        timeout,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::io::Write;

    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    const SAMPLE: &str = r#"
default_profile = "home"

[defaults]
timeout = 12

[profiles.home]
controller = "https://192.168.1.1"
site = "Home"
platform = "unifi-os"
api_key = "plain-key"

[profiles.lab]
controller = "https://lab.local:8443"
platform = "classic"
api_key = "lab-key"
ca_cert = "/etc/unifi/ca.pem"
timeout = 5
"#;

    /// Defaults plus the file, without the process environment.
    fn load_file(path: &Path) -> Config {
        file_figment(path).extract().unwrap()
    }

    fn sample() -> Config {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        load_file(file.path())
    }

    #[test]
    fn loads_profiles_from_toml() {
        let config = sample();
        assert_eq!(config.default_profile.as_deref(), Some("home"));
        assert_eq!(config.defaults.timeout, 12);
        assert_eq!(config.profiles.len(), 2);
        assert_eq!(config.profiles["lab"].platform, "classic");
        assert_eq!(config.profiles["home"].ca_cert, None);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_file(&dir.path().join("absent.toml"));
        assert_eq!(config.default_profile.as_deref(), Some("default"));
        assert_eq!(config.defaults.timeout, 30);
        assert!(config.profiles.is_empty());
    }

    #[test]
    fn serialized_config_loads_back() {
        let mut config = Config::default();
        config.profiles.insert(
            "office".into(),
            Profile {
                controller: "https://10.0.0.1".into(),
                platform: "auto".into(),
                api_key: Some("k".into()),
                ..Profile::default()
            },
        );

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(toml::to_string_pretty(&config).unwrap().as_bytes())
            .unwrap();

        let loaded = load_file(file.path());
        assert_eq!(loaded.profiles["office"].controller, "https://10.0.0.1");
    }

    #[test]
    fn default_profile_is_used() {
        let cfg = resolve_controller_config(&sample(), &Overrides::default()).unwrap();
        assert_eq!(cfg.url.as_str(), "https://192.168.1.1/");
        assert_eq!(cfg.api_key.expose_secret(), "plain-key");
        assert_eq!(cfg.site.as_deref(), Some("Home"));
        assert_eq!(cfg.platform, PlatformHint::UnifiOs);
        assert_eq!(cfg.tls, TlsVerification::SystemDefaults);
        assert_eq!(cfg.timeout, Duration::from_secs(12));
    }

    #[test]
    fn named_profile_settings() {
        let overrides = Overrides {
            profile: Some("lab".into()),
            ..Overrides::default()
        };
        let cfg = resolve_controller_config(&sample(), &overrides).unwrap();
        assert_eq!(cfg.platform, PlatformHint::Classic);
        assert_eq!(cfg.site, None);
        assert_eq!(
            cfg.tls,
            TlsVerification::CustomCa(PathBuf::from("/etc/unifi/ca.pem"))
        );
        assert_eq!(cfg.timeout, Duration::from_secs(5));
    }

    #[test]
    fn flags_beat_profile() {
        let overrides = Overrides {
            controller: Some("https://10.1.1.1".into()),
            api_key: Some(SecretString::from("flag-key".to_owned())),
            site: Some("Office".into()),
            insecure: true,
            timeout: Some(60),
            ..Overrides::default()
        };
        let cfg = resolve_controller_config(&sample(), &overrides).unwrap();
        assert_eq!(cfg.url.host_str(), Some("10.1.1.1"));
        assert_eq!(cfg.api_key.expose_secret(), "flag-key");
        assert_eq!(cfg.site.as_deref(), Some("Office"));
        assert_eq!(cfg.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(cfg.timeout, Duration::from_secs(60));
    }

    #[test]
    fn adhoc_controller_without_profile() {
        let overrides = Overrides {
            controller: Some("https://192.168.1.1".into()),
            api_key: Some(SecretString::from("k".to_owned())),
            ..Overrides::default()
        };
        let cfg = resolve_controller_config(&Config::default(), &overrides).unwrap();
        assert_eq!(cfg.platform, PlatformHint::Auto);
        assert_eq!(cfg.site, None);
        assert_eq!(cfg.timeout, Duration::from_secs(30));
    }

    #[test]
    fn nothing_configured() {
        let err = resolve_controller_config(&Config::default(), &Overrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::NoController));
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let overrides = Overrides {
            profile: Some("nope".into()),
            controller: Some("https://192.168.1.1".into()),
            ..Overrides::default()
        };
        let err = resolve_controller_config(&sample(), &overrides).unwrap_err();
        assert_eq!(err.to_string(), "profile 'nope' not found in config");
    }

    #[test]
    fn invalid_controller_url() {
        let overrides = Overrides {
            controller: Some("not a url".into()),
            api_key: Some(SecretString::from("k".to_owned())),
            ..Overrides::default()
        };
        let err = resolve_controller_config(&Config::default(), &overrides).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "controller"));
    }

    #[test]
    fn platform_names() {
        assert_eq!(parse_platform("auto").unwrap(), PlatformHint::Auto);
        assert_eq!(parse_platform("unifi-os").unwrap(), PlatformHint::UnifiOs);
        assert_eq!(parse_platform("classic").unwrap(), PlatformHint::Classic);
        assert!(parse_platform("cloud").is_err());
    }

    #[test]
    fn plaintext_key_is_last_resort() {
        let profile = Profile {
            controller: "https://192.168.1.1".into(),
            api_key_env: Some("UNIMCP_TEST_KEY_THAT_IS_NEVER_SET".into()),
            api_key: Some("from-file".into()),
            ..Profile::default()
        };
        let key = resolve_api_key(&profile, "unimcp-test-no-such-profile").unwrap();
        assert_eq!(key.expose_secret(), "from-file");
    }

    #[test]
    fn env_overrides_config_keys() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("config.toml", SAMPLE)?;
            jail.set_env("UNIFI_DEFAULT_PROFILE", "lab");
            jail.set_env("UNIFI_DEFAULTS_TIMEOUT", "45");
            jail.set_env("UNIFI_PROFILES_LAB_SITE", "Office");
            jail.set_env("UNIFI_PROFILES_LAB_API_KEY_ENV", "LAB_KEY");
            // CLI-only variables must not disturb extraction
            jail.set_env("UNIFI_API_KEY", "from-flag");
            jail.set_env("UNIFI_PROFILES_DANGLING", "x");

            let cfg = load_config_from(Path::new("config.toml")).map_err(|e| e.to_string())?;
            assert_eq!(cfg.default_profile.as_deref(), Some("lab"));
            assert_eq!(cfg.defaults.timeout, 45);

            let lab = &cfg.profiles["lab"];
            assert_eq!(lab.site.as_deref(), Some("Office"));
            assert_eq!(lab.api_key_env.as_deref(), Some("LAB_KEY"));
            assert_eq!(lab.controller, "https://lab.local:8443");
            Ok(())
        });
    }

}
