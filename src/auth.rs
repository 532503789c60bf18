//! Bearer credential lookup.
//!
//! Session storage lives outside this crate; the scanner only needs to read
//! the stored bearer token. A missing token means "not authenticated" and
//! stops the flow before the camera or the network is touched.

use crate::config::Config;

/// Something that can hand out the stored bearer token.
pub trait CredentialSource: Send + Sync {
    /// The bearer token, or `None` when the user is not signed in.
    fn bearer_token(&self) -> Option<String>;
}

/// A fixed credential, typically read from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    token: Option<String>,
}

impl StaticCredentials {
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.auth_token.clone())
    }
}

impl CredentialSource for StaticCredentials {
    fn bearer_token(&self) -> Option<String> {
        // Blank tokens are as good as none
        self.token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
    }
}
