//! Authentication and authorization settings.

use std::env;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::password::PasswordOptions;

/// Default redirect for authenticated callers denied by a policy.
pub const DEFAULT_ACCESS_DENIED_PATH: &str = "/Administration/AccessDenied";

/// Default redirect for callers that must sign in first.
pub const DEFAULT_LOGIN_PATH: &str = "/Account/Login";

/// Default query key carrying the original request target on redirects.
pub const DEFAULT_RETURN_URL_PARAMETER: &str = "ReturnUrl";

/// Settings consumed by the web boundary and the account store.
///
/// # Examples
///
/// ```
/// use admin_authz::AuthConfig;
///
/// let config = AuthConfig::from_json(r#"{ "access_denied_path": "/Denied" }"#).unwrap();
/// assert_eq!(config.access_denied_path, "/Denied");
/// assert_eq!(config.login_path, "/Account/Login");
/// assert!(config.require_authenticated_user);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Redirect target when a signed-in caller is denied
    pub access_denied_path: String,
    /// Redirect target when a caller must sign in
    pub login_path: String,
    /// Query key used to carry the original target on redirects
    pub return_url_parameter: String,
    /// Apply the authenticated-user fallback to every protected endpoint
    pub require_authenticated_user: bool,
    /// Password rules for the account store
    pub password: PasswordOptions,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_denied_path: DEFAULT_ACCESS_DENIED_PATH.to_string(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            return_url_parameter: DEFAULT_RETURN_URL_PARAMETER.to_string(),
            require_authenticated_user: true,
            password: PasswordOptions::default(),
        }
    }
}

impl AuthConfig {
    /// Parses a JSON document; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for malformed JSON or unrooted redirect paths.
    pub fn from_json(document: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(document)?;
        config.validate()?;
        Ok(config)
    }

    /// Builds the configuration from defaults plus environment overrides.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidValue`] if a boolean or numeric variable does
    ///   not parse
    /// - [`ConfigError::InvalidPath`] for unrooted redirect paths
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self::default().with_overrides(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("AUTH_ACCESS_DENIED_PATH") {
            self.access_denied_path = v;
        }
        if let Some(v) = lookup("AUTH_LOGIN_PATH") {
            self.login_path = v;
        }
        if let Some(v) = lookup("AUTH_RETURN_URL_PARAMETER") {
            self.return_url_parameter = v;
        }
        if let Some(v) = lookup("AUTH_REQUIRE_AUTHENTICATED_USER") {
            self.require_authenticated_user = parse_bool("AUTH_REQUIRE_AUTHENTICATED_USER", v)?;
        }
        if let Some(v) = lookup("AUTH_PASSWORD_REQUIRED_LENGTH") {
            self.password.required_length = parse_number("AUTH_PASSWORD_REQUIRED_LENGTH", v)?;
        }
        if let Some(v) = lookup("AUTH_PASSWORD_REQUIRED_UNIQUE_CHARS") {
            self.password.required_unique_chars =
                parse_number("AUTH_PASSWORD_REQUIRED_UNIQUE_CHARS", v)?;
        }
        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("access_denied_path", &self.access_denied_path),
            ("login_path", &self.login_path),
        ] {
            if !value.starts_with('/') {
                return Err(ConfigError::InvalidPath {
                    field,
                    value: value.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Accepts `true`/`false` in any letter case, so `"False"` works too.
fn parse_bool(field: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim() {
        v if v.eq_ignore_ascii_case("true") => Ok(true),
        v if v.eq_ignore_ascii_case("false") => Ok(false),
        _ => Err(ConfigError::InvalidValue { field, value }),
    }
}

fn parse_number(field: &'static str, value: String) -> Result<usize, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { field, value })
}
