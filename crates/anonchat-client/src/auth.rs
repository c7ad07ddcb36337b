//! Query-string authentication and device fingerprinting.
//!
//! The service authenticates on connect via query parameters: caller
//! credentials (`cookie`, `secret`) merged over a generated
//! device/platform fingerprint. Field names and value spellings match
//! what the official client puts on the wire.

use url::Url;
use uuid::Uuid;

use anonchat_core::error::{AnonchatError, Result};

use crate::config;

/// Caller-supplied credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub cookie: String,
    pub secret: String,
}

/// Extract `cookie`/`secret` credentials from a `ws://`/`wss://` URI.
pub fn credentials_from_uri(uri: &str) -> Result<Credentials> {
    let parsed =
        Url::parse(uri).map_err(|e| AnonchatError::InvalidUri(format!("{uri}: {e}")))?;

    match parsed.scheme() {
        "ws" | "wss" => {}
        other => {
            return Err(AnonchatError::InvalidUri(format!(
                "unsupported scheme: {other}"
            )))
        }
    }
    if parsed.query().is_none() {
        return Err(AnonchatError::InvalidUri("no query string".into()));
    }

    let mut cookie = None;
    let mut secret = None;
    for (key, value) in parsed.query_pairs() {
        match key.as_ref() {
            "cookie" => cookie = Some(value.into_owned()),
            "secret" => secret = Some(value.into_owned()),
            _ => {}
        }
    }

    Ok(Credentials {
        cookie: cookie.ok_or(AnonchatError::MissingCredentials("cookie"))?,
        secret: secret.ok_or(AnonchatError::MissingCredentials("secret"))?,
    })
}

/// Device/platform fingerprint merged into the connection query string.
///
/// Ordered field list; the order is preserved when flattening so the query
/// string matches the official client's shape.
#[derive(Debug, Clone)]
pub struct Fingerprint {
    fields: Vec<(&'static str, String)>,
}

impl Fingerprint {
    /// Generate a fingerprint for this process: locale from the
    /// environment, platform/arch from the target, a fresh 16-hex-char
    /// device id.
    pub fn generate() -> Self {
        let raw_language = std::env::var("LANG")
            .ok()
            .and_then(|l| l.split('.').next().map(str::to_string))
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| "en_US".to_string());
        let language = raw_language
            .split('_')
            .next()
            .unwrap_or("en")
            .to_string();
        let device_id: String = Uuid::new_v4().simple().to_string()[..16].to_string();

        let fields = vec![
            ("version", config::APP_VERSION.to_string()),
            ("systemLanguage", language),
            ("systemRawLanguage", raw_language),
            ("platform", std::env::consts::OS.to_string()),
            (
                "systemInfo",
                format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH),
            ),
            // Spellings match the official client's wire form.
            ("isEmulator", "False".to_string()),
            ("admin", "None".to_string()),
            ("deviceId", device_id),
            ("cookie", String::new()),
            ("secret", String::new()),
            ("EIO", config::ENGINE_VERSION.to_string()),
            ("transport", config::TRANSPORT_NAME.to_string()),
        ];
        Self { fields }
    }

    /// Merge caller credentials over the fingerprint placeholders.
    pub fn with_credentials(mut self, creds: &Credentials) -> Self {
        for (key, value) in &mut self.fields {
            match *key {
                "cookie" => *value = creds.cookie.clone(),
                "secret" => *value = creds.secret.clone(),
                _ => {}
            }
        }
        self
    }

    /// Flatten into a `key=value&...` query string. Values are emitted
    /// verbatim, matching the wire convention of the service.
    pub fn query_string(&self) -> String {
        self.fields
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Build the full connection URI from a base endpoint and a fingerprint.
pub fn build_uri(base: &str, fingerprint: &Fingerprint) -> String {
    let query = fingerprint.query_string();
    if query.is_empty() {
        base.to_string()
    } else {
        format!("{base}?{query}")
    }
}
