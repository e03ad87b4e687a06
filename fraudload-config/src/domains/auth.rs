//! Identity provider configuration for the client-credentials exchange

use crate::error::ConfigResult;
use crate::loader::{ENV_AUTH0_AUDIENCE, ENV_AUTH0_CLIENT_ID, ENV_AUTH0_CLIENT_SECRET, ENV_AUTH0_DOMAIN};
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};
use std::fmt;

const REDACTED: &str = "***";

/// Client-credentials settings for the identity provider.
///
/// When `disabled` is set the run never requests a token and no
/// `Authorization` header is sent to the target.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Skip the token exchange entirely (`NO_AUTH`)
    #[serde(default = "crate::domains::utils::default_false")]
    pub disabled: bool,

    /// Identity provider domain, e.g. `tenant.us.auth0.com`
    pub domain: String,

    /// OAuth client id
    pub client_id: String,

    /// OAuth client secret
    pub client_secret: String,

    /// API audience the token is requested for
    pub audience: String,
}

impl AuthConfig {
    /// Configuration for a run without authentication
    pub fn disabled() -> Self {
        Self {
            disabled: true,
            ..Self::default()
        }
    }

    /// Whether a bearer token has to be obtained for this run
    pub fn is_enabled(&self) -> bool {
        !self.disabled
    }

    /// Whether all four credential fields carry a value
    pub fn is_complete(&self) -> bool {
        self.missing_credentials().is_empty()
    }

    /// Environment names of the credential fields that are blank
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        [
            (ENV_AUTH0_DOMAIN, &self.domain),
            (ENV_AUTH0_CLIENT_ID, &self.client_id),
            (ENV_AUTH0_CLIENT_SECRET, &self.client_secret),
            (ENV_AUTH0_AUDIENCE, &self.audience),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// Token endpoint for the configured domain.
    ///
    /// A bare domain becomes `https://{domain}/oauth/token`. A domain that
    /// already carries an `http://` or `https://` scheme is used as the base
    /// as-is.
    pub fn token_endpoint(&self) -> String {
        let domain = self.domain.trim().trim_end_matches('/');
        if domain.starts_with("http://") || domain.starts_with("https://") {
            format!("{}/oauth/token", domain)
        } else {
            format!("https://{}/oauth/token", domain)
        }
    }

    /// Short form of the domain for banners (first 20 characters)
    pub fn display_domain(&self) -> String {
        if self.domain.is_empty() {
            "Not configured".to_string()
        } else {
            let prefix: String = self.domain.chars().take(20).collect();
            format!("{}...", prefix)
        }
    }

    /// Copy with the client secret masked
    pub fn redacted(&self) -> Self {
        Self {
            client_secret: if self.client_secret.is_empty() {
                String::new()
            } else {
                REDACTED.to_string()
            },
            ..self.clone()
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("disabled", &self.disabled)
            .field("domain", &self.domain)
            .field("client_id", &self.client_id)
            .field("client_secret", &REDACTED)
            .field("audience", &self.audience)
            .finish()
    }
}

impl Validatable for AuthConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.disabled {
            return Ok(());
        }

        let missing = self.missing_credentials();
        if !missing.is_empty() {
            return Err(self.validation_error(format!(
                "{} not set and NO_AUTH is not true. Set NO_AUTH=true for no-auth mode",
                missing.join(", ")
            )));
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "auth"
    }
}
