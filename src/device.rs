//! Device boundary: connection parameters, TLS/port selection and the shared
//! authentication state.

use std::time::Duration;

use parking_lot::{Mutex, MutexGuard};

use crate::DEFAULT_HTTP_TIMEOUT;
use crate::auth::AuthState;
use crate::errors::Tr064Error;

/// Default realm advertised in the InitChallenge header.
pub const DEFAULT_REALM: &str = "F!Box SOAP-Auth";

/// Default protocol path segment dropped from SCPD URLs when a device
/// advertises a non-default API URL prefix.
const DEFAULT_URL_SEGMENT: &str = "/tr064";

/// Connection parameters for one gateway device.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    pub host: String,
    pub port: u16,

    /// When set, action requests switch to HTTPS on this port and server
    /// certificate verification is disabled.
    pub ssl_port: Option<u16>,

    /// Non-default API URL segment; when present, SCPD URLs are rewritten to
    /// drop the default `/tr064` segment and prepend this prefix.
    pub url_prefix: Option<String>,

    pub friendly_name: String,
    pub username: String,
    pub password: String,
    pub realm: String,
    pub timeout: Duration,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            host: "192.168.178.1".to_string(),
            port: 49000,
            ssl_port: None,
            url_prefix: None,
            friendly_name: String::new(),
            username: String::new(),
            password: String::new(),
            realm: DEFAULT_REALM.to_string(),
            timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }
}

/// One gateway device: configuration, HTTP client and the single mutable
/// authentication state shared by all of its services.
#[derive(Debug)]
pub struct Device {
    config: DeviceConfig,
    auth: Mutex<AuthState>,
    http: reqwest::Client,
}

impl Device {
    pub fn new(config: DeviceConfig) -> Result<Self, Tr064Error> {
        let mut builder = reqwest::Client::builder().timeout(config.timeout);
        if config.ssl_port.is_some() {
            builder = builder.danger_accept_invalid_certs(true);
        }
        let http = builder.build()?;

        let auth = Mutex::new(AuthState::new(
            config.username.clone(),
            config.password.clone(),
            config.realm.clone(),
        ));

        Ok(Self { config, auth, http })
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn friendly_name(&self) -> &str {
        &self.config.friendly_name
    }

    /// Lock the shared authentication state.
    ///
    /// Mutations race across concurrently in-flight invocations of the same
    /// device; the mutex serializes individual updates but imposes no
    /// ordering between invocations.
    pub fn auth(&self) -> MutexGuard<'_, AuthState> {
        self.auth.lock()
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Base URL for action requests: HTTPS on the TLS port when configured,
    /// plain HTTP otherwise.
    pub fn control_base_url(&self) -> String {
        match self.config.ssl_port {
            Some(ssl_port) => format!("https://{}:{}", self.config.host, ssl_port),
            None => format!("http://{}:{}", self.config.host, self.config.port),
        }
    }

    /// Full URL of a service description document. Descriptions are always
    /// fetched over plain HTTP on the regular port.
    pub(crate) fn description_url(&self, scpd_url: &str) -> String {
        let path = match &self.config.url_prefix {
            Some(prefix) if !prefix.is_empty() => {
                format!("{}{}", prefix, scpd_url.replacen(DEFAULT_URL_SEGMENT, "", 1))
            }
            _ => scpd_url.to_string(),
        };
        format!("http://{}:{}{}", self.config.host, self.config.port, path)
    }
}
