//! Client configuration and credentials.

use std::fmt;

use serde::Deserialize;
use url::Url;

use crate::error::{CrowdinError, Result};

/// Default root of the project API.
pub const DEFAULT_API_BASE: &str = "https://api.crowdin.com/api/project";

/// How requests authenticate against Crowdin.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Account API key plus the account login (`account-key` + `login`).
    Login { login: String, account_key: String },
    /// Project API key (`key`).
    ApiKey { key: String },
}

impl Credentials {
    /// Account-key authentication.
    pub fn login(login: impl Into<String>, account_key: impl Into<String>) -> Self {
        Credentials::Login {
            login: login.into(),
            account_key: account_key.into(),
        }
    }

    /// Project API key authentication.
    pub fn api_key(key: impl Into<String>) -> Self {
        Credentials::ApiKey { key: key.into() }
    }

    /// Query parameters carried by every request.
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        match self {
            Credentials::Login { login, account_key } => {
                vec![("account-key", account_key.as_str()), ("login", login.as_str())]
            }
            Credentials::ApiKey { key } => vec![("key", key.as_str())],
        }
    }

    fn missing_field(&self) -> Option<&'static str> {
        match self {
            Credentials::Login { login, account_key } => {
                if account_key.is_empty() {
                    Some("accountKey")
                } else if login.is_empty() {
                    Some("login")
                } else {
                    None
                }
            }
            Credentials::ApiKey { key } if key.is_empty() => Some("key"),
            Credentials::ApiKey { .. } => None,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Login { login, .. } => f
                .debug_struct("Login")
                .field("login", login)
                .field("account_key", &"<redacted>")
                .finish(),
            Credentials::ApiKey { .. } => f
                .debug_struct("ApiKey")
                .field("key", &"<redacted>")
                .finish(),
        }
    }
}

/// Loose options object, as read from a settings file or assembled by hand.
///
/// Empty strings count as missing. `ClientConfig::from_options` decides which
/// authentication scheme applies.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientOptions {
    /// Crowdin project identifier
    #[serde(default, alias = "projectId")]
    pub project: Option<String>,
    /// Project API key
    #[serde(default)]
    pub key: Option<String>,
    /// Account login, used together with `account_key`
    #[serde(default)]
    pub login: Option<String>,
    /// Account API key, used together with `login`
    #[serde(default, alias = "account_key")]
    pub account_key: Option<String>,
    /// Override for the API root
    #[serde(default, alias = "api_base")]
    pub api_base: Option<String>,
}

/// Validated, immutable connection settings.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    project: String,
    credentials: Credentials,
    api_base: Url,
}

impl ClientConfig {
    /// Create a configuration for `project` using `credentials`.
    pub fn new(project: impl Into<String>, credentials: Credentials) -> Result<Self> {
        let project = project.into();
        if project.is_empty() {
            return Err(missing_project());
        }
        if let Some(field) = credentials.missing_field() {
            return Err(missing_credential(field, &project));
        }
        Ok(Self {
            project,
            credentials,
            api_base: default_api_base()?,
        })
    }

    /// Build a configuration from a loose options object.
    ///
    /// A present `key` selects API-key authentication, otherwise both
    /// `login` and `account_key` must be present.
    pub fn from_options(options: ClientOptions) -> Result<Self> {
        let project = non_empty(options.project).ok_or_else(missing_project)?;

        let credentials = match (
            non_empty(options.key),
            non_empty(options.login),
            non_empty(options.account_key),
        ) {
            (Some(key), _, _) => Credentials::ApiKey { key },
            (None, Some(login), Some(account_key)) => Credentials::Login { login, account_key },
            (None, Some(_), None) => return Err(missing_credential("accountKey", &project)),
            (None, None, Some(_)) => return Err(missing_credential("login", &project)),
            (None, None, None) => return Err(missing_credential("key", &project)),
        };

        let config = Self::new(project, credentials)?;
        match non_empty(options.api_base) {
            Some(base) => config.with_api_base(&base),
            None => Ok(config),
        }
    }

    /// Point the client at a different API root.
    ///
    /// The project id and endpoint path are appended to this URL.
    pub fn with_api_base(mut self, api_base: &str) -> Result<Self> {
        let url = Url::parse(api_base).map_err(|e| {
            CrowdinError::Configuration(format!("Invalid API base URL `{}`: {}", api_base, e))
        })?;
        if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
            return Err(CrowdinError::Configuration(format!(
                "API base URL `{}` must be an absolute http(s) URL",
                api_base
            )));
        }
        self.api_base = url;
        Ok(self)
    }

    /// Crowdin project identifier.
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Authentication scheme in use.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// API root URL.
    pub fn api_base(&self) -> &Url {
        &self.api_base
    }
}

fn default_api_base() -> Result<Url> {
    Url::parse(DEFAULT_API_BASE)
        .map_err(|e| CrowdinError::Configuration(format!("Invalid default API base: {}", e)))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn missing_project() -> CrowdinError {
    CrowdinError::Configuration(
        "Key `project` should be specified and contain the Crowdin project ID.".to_string(),
    )
}

fn missing_credential(field: &str, project: &str) -> CrowdinError {
    let what = match field {
        "key" => "the Crowdin project API key",
        "accountKey" => "the Crowdin account API key",
        _ => "the Crowdin account username",
    };
    CrowdinError::Configuration(format!(
        "Key `{}` should be specified and contain {}.\nCheck https://crowdin.com/project/{}/settings#api",
        field, what, project
    ))
}
