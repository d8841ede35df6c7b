//! Credential lookup for workers that call external integrations.
//!
//! A worker declares an [`AuthRequirement`] naming the integration and secret
//! it needs; the executor's [`AuthProvider`] resolves it per invocation. A
//! required credential that cannot be resolved fails the stage with
//! [`AuthError::MissingCredential`] *before* any remote call is attempted.
//!
//! Two providers ship with the crate: [`EnvAuthProvider`] reads environment
//! variables (optionally seeded from `.env` via dotenvy), and
//! [`StaticAuthProvider`] holds an in-memory map, which is what tests and
//! embedding applications with their own secret stores use.

use miette::Diagnostic;
use rustc_hash::FxHashMap;
use std::fmt;
use thiserror::Error;

/// A named external secret a worker needs before it can run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthRequirement {
    /// Integration qualifier, e.g. `"google_forms"`.
    pub integration: &'static str,
    /// Secret qualifier within the integration, e.g. `"api_key"`.
    pub secret: &'static str,
    /// Whether the stage must fail fast when the secret is absent.
    pub required: bool,
}

impl AuthRequirement {
    /// A requirement whose absence fails the stage before it runs.
    #[must_use]
    pub fn required(integration: &'static str, secret: &'static str) -> Self {
        Self {
            integration,
            secret,
            required: true,
        }
    }

    /// A requirement the stage can run without.
    #[must_use]
    pub fn optional(integration: &'static str, secret: &'static str) -> Self {
        Self {
            integration,
            secret,
            required: false,
        }
    }
}

/// An opaque secret value.
///
/// `Debug` output is redacted so tracing a context or an error never leaks
/// the credential; call [`expose`](Self::expose) at the point of use.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the underlying secret value.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Errors raised while resolving credentials.
#[derive(Debug, Error, Diagnostic)]
pub enum AuthError {
    /// A credential marked required could not be resolved.
    #[error("missing required credential `{secret}` for integration `{integration}`")]
    #[diagnostic(
        code(formweaver::auth::missing_credential),
        help("Provide the secret through the graph's AuthProvider; EnvAuthProvider reads `<INTEGRATION>_<SECRET>` from the environment.")
    )]
    MissingCredential { integration: String, secret: String },
}

/// Resolves credentials by integration and secret qualifier.
///
/// Lookups happen per invocation; providers must therefore be cheap to query
/// and safe to share across concurrent runs.
pub trait AuthProvider: Send + Sync {
    /// Looks up one secret.
    ///
    /// Returns `Ok(None)` when an *optional* secret is absent. When
    /// `required` is set and the secret is absent, returns
    /// [`AuthError::MissingCredential`].
    fn get(
        &self,
        integration: &str,
        secret: &str,
        required: bool,
    ) -> Result<Option<Secret>, AuthError>;
}

/// Provider backed by process environment variables.
///
/// The variable name for `("google_forms", "api_key")` is
/// `GOOGLE_FORMS_API_KEY`: both qualifiers uppercased and joined with `_`.
#[derive(Clone, Debug, Default)]
pub struct EnvAuthProvider;

impl EnvAuthProvider {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Loads `.env` into the process environment first, then behaves like
    /// [`new`](Self::new). Missing `.env` files are ignored.
    #[must_use]
    pub fn from_dotenv() -> Self {
        dotenvy::dotenv().ok();
        Self
    }

    fn var_name(integration: &str, secret: &str) -> String {
        format!(
            "{}_{}",
            integration.to_uppercase(),
            secret.to_uppercase()
        )
    }
}

impl AuthProvider for EnvAuthProvider {
    fn get(
        &self,
        integration: &str,
        secret: &str,
        required: bool,
    ) -> Result<Option<Secret>, AuthError> {
        match std::env::var(Self::var_name(integration, secret)) {
            Ok(value) if !value.is_empty() => Ok(Some(Secret::new(value))),
            _ if required => Err(AuthError::MissingCredential {
                integration: integration.to_string(),
                secret: secret.to_string(),
            }),
            _ => Ok(None),
        }
    }
}

/// In-memory provider for tests and embedders with their own secret store.
#[derive(Clone, Debug, Default)]
pub struct StaticAuthProvider {
    secrets: FxHashMap<(String, String), Secret>,
}

impl StaticAuthProvider {
    #[must_use]
    pub fn new() -> Self {
        Self {
            secrets: FxHashMap::default(),
        }
    }

    /// Registers one secret fluently.
    #[must_use]
    pub fn with_secret(
        mut self,
        integration: impl Into<String>,
        secret: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.secrets
            .insert((integration.into(), secret.into()), Secret::new(value.into()));
        self
    }
}

impl AuthProvider for StaticAuthProvider {
    fn get(
        &self,
        integration: &str,
        secret: &str,
        required: bool,
    ) -> Result<Option<Secret>, AuthError> {
        match self
            .secrets
            .get(&(integration.to_string(), secret.to_string()))
        {
            Some(found) => Ok(Some(found.clone())),
            None if required => Err(AuthError::MissingCredential {
                integration: integration.to_string(),
                secret: secret.to_string(),
            }),
            None => Ok(None),
        }
    }
}
