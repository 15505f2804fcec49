//! Platform token model and resolution from multiple sources

use chrono::{DateTime, FixedOffset};
use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{api, credentials};
use crate::error::{PlatformError, Result};

/// Which kind of principal a token authenticates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A user account, sent as a bearer token
    User,
    /// An application, sent through the application header pair
    Application,
}

impl TokenKind {
    fn private_key_env(self) -> &'static str {
        match self {
            TokenKind::User => credentials::USER_PRIVATE_KEY_ENV,
            TokenKind::Application => credentials::APP_PRIVATE_KEY_ENV,
        }
    }

    fn base_url_env(self) -> &'static str {
        match self {
            TokenKind::User => credentials::USER_BASE_URL_ENV,
            TokenKind::Application => credentials::APP_BASE_URL_ENV,
        }
    }

    fn token_path_env(self) -> &'static str {
        match self {
            TokenKind::User => credentials::USER_TOKEN_PATH_ENV,
            TokenKind::Application => credentials::APP_TOKEN_PATH_ENV,
        }
    }

    fn file_name(self) -> &'static str {
        match self {
            TokenKind::User => credentials::USER_TOKEN_FILE,
            TokenKind::Application => credentials::APP_TOKEN_FILE,
        }
    }

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            TokenKind::User => "API",
            TokenKind::Application => "application",
        }
    }
}

/// Token file structure
#[derive(Serialize, Deserialize, Debug)]
struct TokenFile {
    access_token: AccessToken,
}

/// Credential entry inside a token file
#[derive(Serialize, Deserialize, Debug)]
struct AccessToken {
    private_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    base_api_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_at: Option<String>,
}

/// Immutable Platform credential
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    kind: TokenKind,
    private_key: String,
    base_api_url: String,
    token_id: Option<String>,
    created_at: Option<String>,
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("kind", &self.kind)
            .field("private_key", &mask_key(&self.private_key))
            .field("base_api_url", &self.base_api_url)
            .field("token_id", &self.token_id)
            .field("created_at", &self.created_at)
            .finish()
    }
}

impl Token {
    /// Create a token from a private key
    ///
    /// `base_api_url` falls back to the production API when `None`.
    pub fn new(
        kind: TokenKind,
        private_key: impl Into<String>,
        base_api_url: Option<String>,
    ) -> Result<Self> {
        let private_key = private_key.into();
        if private_key.trim().is_empty() {
            return Err(PlatformError::Credential(format!(
                "{} token has an empty private key",
                kind.label()
            )));
        }
        if HeaderValue::from_str(&private_key).is_err() {
            return Err(PlatformError::Credential(format!(
                "{} token private key contains characters not allowed in a header",
                kind.label()
            )));
        }

        let base_api_url = base_api_url
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| api::DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            kind,
            private_key,
            base_api_url,
            token_id: None,
            created_at: None,
        })
    }

    /// Parse a token from the JSON contents of a token file
    pub fn from_json_str(kind: TokenKind, content: &str) -> Result<Self> {
        let file: TokenFile = serde_json::from_str(content)
            .map_err(|e| PlatformError::Credential(format!("Could not parse token: {}", e)))?;
        let access = file.access_token;

        if access.base_api_url.is_none() {
            warn!(
                "No base API URL found in {} token; using default '{}'",
                kind.label(),
                api::DEFAULT_BASE_URL
            );
        }

        let mut token = Self::new(kind, access.private_key, access.base_api_url)?;
        token.token_id = access.token_id;
        token.created_at = access.created_at;
        Ok(token)
    }

    /// Load a token from a file on disk
    pub fn from_file(kind: TokenKind, path: &Path) -> Result<Self> {
        debug!("Loading {} token from {}", kind.label(), path.display());
        let content = fs::read_to_string(path).map_err(|e| {
            PlatformError::Credential(format!(
                "Could not read token file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json_str(kind, &content)
    }

    /// Serialize to the token file format
    pub fn to_json_string(&self) -> Result<String> {
        let file = TokenFile {
            access_token: AccessToken {
                private_key: self.private_key.clone(),
                base_api_url: Some(self.base_api_url.clone()),
                token_id: self.token_id.clone(),
                created_at: self.created_at.clone(),
            },
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn private_key(&self) -> &str {
        &self.private_key
    }

    pub fn base_api_url(&self) -> &str {
        &self.base_api_url
    }

    pub fn token_id(&self) -> Option<&str> {
        self.token_id.as_deref()
    }

    /// Creation time, if present and RFC 3339
    pub fn created_at(&self) -> Option<DateTime<FixedOffset>> {
        self.created_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
    }

    /// Private key with all but the last four characters hidden
    pub fn masked_key(&self) -> String {
        mask_key(&self.private_key)
    }

    /// Authentication headers for this token
    ///
    /// `user` is only honoured for application tokens.
    pub fn auth_headers(&self, user: Option<&str>) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        match self.kind {
            TokenKind::User => {
                headers.insert(
                    AUTHORIZATION,
                    header_value(&format!("Bearer {}", self.private_key))?,
                );
            }
            TokenKind::Application => {
                headers.insert(
                    credentials::APP_KEY_HEADER,
                    header_value(&self.private_key)?,
                );
                if let Some(user) = user {
                    headers.insert(credentials::APP_USER_HEADER, header_value(user)?);
                }
            }
        }
        Ok(headers)
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| PlatformError::Credential(format!("Invalid header value '{}'", value)))
}

fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}

/// Default location of the activated token for a kind (~/.voxel51/...)
pub fn default_token_path(kind: TokenKind) -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(credentials::DIR_NAME).join(kind.file_name()))
}

/// Raw values consulted during resolution
#[derive(Debug, Clone, Default)]
pub struct TokenSources {
    pub private_key: Option<String>,
    pub base_url: Option<String>,
    pub token_path: Option<PathBuf>,
    pub default_path: Option<PathBuf>,
}

impl TokenSources {
    /// Snapshot the process environment for the given token kind
    pub fn from_env(kind: TokenKind) -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        Self {
            private_key: var(kind.private_key_env()),
            base_url: var(kind.base_url_env()),
            token_path: var(kind.token_path_env()).map(PathBuf::from),
            default_path: default_token_path(kind),
        }
    }
}

/// Behaviour switches for token resolution
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolutionPolicy {
    /// Continue to the default file when the token path variable names a missing file
    pub fall_through_missing_path: bool,
}

/// Token resolution with a fixed precedence chain
pub struct TokenResolver {
    kind: TokenKind,
    sources: TokenSources,
    policy: ResolutionPolicy,
}

impl TokenResolver {
    /// Create a resolver reading the process environment
    pub fn new(kind: TokenKind) -> Self {
        Self::with_sources(kind, TokenSources::from_env(kind))
    }

    /// Create a resolver over explicit sources
    pub fn with_sources(kind: TokenKind, sources: TokenSources) -> Self {
        Self {
            kind,
            sources,
            policy: ResolutionPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ResolutionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Resolve a token:
    /// 1. Explicit token (if provided)
    /// 2. Private key environment variable, with optional base URL variable
    /// 3. Token path environment variable (missing file is an error unless
    ///    the policy allows falling through)
    /// 4. Activated token file under the home directory
    pub fn resolve(&self, explicit: Option<Token>) -> Result<Token> {
        if let Some(token) = explicit {
            debug!("Using explicitly provided {} token", self.kind.label());
            return Ok(token);
        }

        if let Some(key) = &self.sources.private_key {
            debug!(
                "Using {} token from {} environment variable",
                self.kind.label(),
                self.kind.private_key_env()
            );
            return Token::new(self.kind, key.clone(), self.sources.base_url.clone());
        }

        if let Some(path) = &self.sources.token_path {
            if path.is_file() {
                debug!(
                    "Using {} token from {} = {}",
                    self.kind.label(),
                    self.kind.token_path_env(),
                    path.display()
                );
                return Token::from_file(self.kind, path);
            }
            if !self.policy.fall_through_missing_path {
                return Err(PlatformError::Credential(format!(
                    "{} points to '{}', which does not exist",
                    self.kind.token_path_env(),
                    path.display()
                )));
            }
            debug!(
                "Token path '{}' does not exist, falling through to the default file",
                path.display()
            );
        }

        match &self.sources.default_path {
            Some(path) if path.is_file() => {
                debug!(
                    "Using activated {} token from {}",
                    self.kind.label(),
                    path.display()
                );
                Token::from_file(self.kind, path)
            }
            other => Err(PlatformError::Credential(
                self.token_not_found_message(other.as_deref()),
            )),
        }
    }

    /// Generate helpful error message when no token is found
    fn token_not_found_message(&self, default_path: Option<&Path>) -> String {
        let file_info = default_path
            .map(|p| format!(" or at {}", p.display()))
            .unwrap_or_default();
        let activate = match self.kind {
            TokenKind::User => "voxctl auth activate <PATH>",
            TokenKind::Application => "voxctl --app auth activate <PATH>",
        };

        format!(
            "No {} token found. Provide one using:\n\
             \n\
             1. Environment var:  export {}=<KEY>  (optionally {}=<URL>)\n\
             2. Token file:       export {}=<PATH>\n\
             3. Activation:       {}\n\
             \n\
             Checked: env vars{}",
            self.kind.label(),
            self.kind.private_key_env(),
            self.kind.base_url_env(),
            self.kind.token_path_env(),
            activate,
            file_info
        )
    }
}
