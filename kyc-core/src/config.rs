//! # Configuration
//!
//! Two layers:
//! - [`KycConfig`]: a plain string key/value store (`config.set("api.url", ...)`)
//!   that callers fill however they like, typically via [`load_env_config`].
//! - [`KycSettings`]: the typed, validated view the clients and the wizard are
//!   built from. Nothing reads the environment after this point.
//!
//! ```rust
//! use kyc_core::{KycConfig, KycSettings};
//!
//! let mut config = KycConfig::new();
//! config.set("api.url", "https://api.example.com");
//! config.set("upload.preset", "kyc_unsigned");
//! config.set("upload.cloud_name", "openscore");
//!
//! let settings = KycSettings::from_snapshot(&config.snapshot()).unwrap();
//! assert_eq!(settings.capture.jpeg_quality, 0.8);
//! ```
//!
//! Environment overrides use a prefix and double underscores for nesting:
//!
//! ```bash
//! export KYC__API__URL=https://api.example.com
//! export KYC__UPLOAD__CLOUD_NAME=openscore
//! ```

use std::collections::HashMap;
use std::time::Duration;

use crate::errors::{KycError, KycResult};

pub const DEFAULT_UPLOAD_ENDPOINT: &str = "https://api.cloudinary.com";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_GEOLOCATION_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_JPEG_QUALITY: f32 = 0.8;

/// Raw settings keyed by dotted name (`api.url`, `upload.cloud_name`,
/// `capture.jpeg_quality`, ...). Values stay strings until [`KycSettings`]
/// validates them.
#[derive(Debug, Default)]
pub struct KycConfig {
    values: HashMap<String, String>,
}

impl KycConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later writes to the same key win, so defaults go in before overrides.
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Freeze the current values for [`KycSettings::from_snapshot`].
    pub fn snapshot(&self) -> KycConfigSnapshot {
        KycConfigSnapshot {
            values: self.values.clone(),
        }
    }
}

/// Copy `KYC__*`-style variables into `config`.
///
/// `KYC__UPLOAD__CLOUD_NAME` with prefix `KYC__` becomes `upload.cloud_name`.
/// Variables set to an empty string are skipped, so an exported but blank
/// `KYC__UPLOAD__ENDPOINT` leaves the provider default in place.
pub fn load_env_config(config: &mut KycConfig, prefix: &str) {
    load_config_from(config, prefix, std::env::vars());
}

fn load_config_from<I>(config: &mut KycConfig, prefix: &str, vars: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    for (name, value) in vars {
        let Some(key) = name.strip_prefix(prefix) else {
            continue;
        };
        if value.trim().is_empty() {
            continue;
        }
        config.set(key.to_lowercase().replace("__", "."), value);
    }
}

/// Read-only copy of a [`KycConfig`] with typed lookups. Unparseable values
/// read as absent, so the typed defaults apply.
#[derive(Debug, Clone, Default)]
pub struct KycConfigSnapshot {
    values: HashMap<String, String>,
}

impl KycConfigSnapshot {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get(key).map(str::to_string)
    }

    /// Whole seconds, e.g. `http.timeout_secs`.
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.trim().parse().ok())
    }

    pub fn get_f32(&self, key: &str) -> Option<f32> {
        self.get(key).and_then(|v| v.trim().parse().ok())
    }

    /// `true`/`false`, as in `form.bank_details`.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| v.trim().parse().ok())
    }

    fn required(&self, key: &str) -> KycResult<String> {
        match self.get(key).map(str::trim) {
            Some(value) if !value.is_empty() => Ok(value.to_string()),
            _ => Err(KycError::configuration(format!("Missing {key}"))),
        }
    }
}

/// Verification backend settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiSettings {
    /// Base URL without trailing slash
    pub base_url: String,
    pub timeout: Duration,
}

/// Storage provider settings for the unsigned image upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadSettings {
    pub endpoint: String,
    pub preset: String,
    pub cloud_name: String,
    pub timeout: Duration,
}

impl UploadSettings {
    /// `{endpoint}/v1_1/{cloud_name}/image/upload`
    pub fn upload_url(&self) -> String {
        format!("{}/v1_1/{}/image/upload", self.endpoint, self.cloud_name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaptureSettings {
    /// JPEG quality in `(0, 1]`
    pub jpeg_quality: f32,
    /// Upper bound on a single geolocation request
    pub geolocation_timeout: Duration,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            geolocation_timeout: Duration::from_secs(DEFAULT_GEOLOCATION_TIMEOUT_SECS),
        }
    }
}

/// Typed settings for the whole capture flow.
#[derive(Debug, Clone, PartialEq)]
pub struct KycSettings {
    pub api: ApiSettings,
    pub upload: UploadSettings,
    pub capture: CaptureSettings,
    /// Show the bank-details form before the first capture step
    pub bank_details_form: bool,
}

impl KycSettings {
    pub fn from_snapshot(snapshot: &KycConfigSnapshot) -> KycResult<Self> {
        let base_url = snapshot.required("api.url")?.trim_end_matches('/').to_string();
        let preset = snapshot.required("upload.preset")?;
        let cloud_name = snapshot.required("upload.cloud_name")?;
        let endpoint = snapshot
            .get("upload.endpoint")
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_UPLOAD_ENDPOINT)
            .trim_end_matches('/')
            .to_string();

        let timeout = Duration::from_secs(
            snapshot
                .get_u64("http.timeout_secs")
                .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
        );
        let geolocation_timeout = Duration::from_secs(
            snapshot
                .get_u64("capture.geolocation_timeout_secs")
                .unwrap_or(DEFAULT_GEOLOCATION_TIMEOUT_SECS),
        );

        let jpeg_quality = snapshot
            .get_f32("capture.jpeg_quality")
            .unwrap_or(DEFAULT_JPEG_QUALITY);
        if !(jpeg_quality > 0.0 && jpeg_quality <= 1.0) {
            return Err(KycError::configuration(format!(
                "capture.jpeg_quality must be in (0, 1], got {jpeg_quality}"
            )));
        }

        Ok(Self {
            api: ApiSettings { base_url, timeout },
            upload: UploadSettings {
                endpoint,
                preset,
                cloud_name,
                timeout,
            },
            capture: CaptureSettings {
                jpeg_quality,
                geolocation_timeout,
            },
            bank_details_form: snapshot.get_bool("form.bank_details").unwrap_or(false),
        })
    }

    /// Shortcut for `load_env_config` + `from_snapshot`.
    pub fn from_env(prefix: &str) -> KycResult<Self> {
        let mut config = KycConfig::new();
        load_env_config(&mut config, prefix);
        Self::from_snapshot(&config.snapshot())
    }
}
