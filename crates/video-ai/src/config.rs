//! Credential resolution for the analysis collaborators.
//!
//! Credentials are resolved once, at construction time, via an explicit
//! fallback chain: caller override, then the environment, then the
//! built-in development default. Collaborators receive the resolved
//! [`AnalysisConfig`] by value; nothing reads the environment after
//! construction.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Environment variable consulted when no explicit credential is given.
pub const CREDENTIAL_ENV_VAR: &str = "MIXCUT_ANALYSIS_KEY";

/// Shared development credential. Fine for the local heuristic analyzer;
/// a real backend will reject it.
const BUILTIN_CREDENTIAL: &str = "mixcut-local-dev";

/// Where a resolved credential came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CredentialSource {
    Explicit,
    Environment,
    BuiltIn,
}

/// Resolved configuration handed to analysis and thumbnail collaborators.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    credential: String,
    source: CredentialSource,
}

impl AnalysisConfig {
    /// Resolve from the live environment.
    pub fn resolve(explicit: Option<&str>) -> Self {
        let env_value = std::env::var(CREDENTIAL_ENV_VAR).ok();
        Self::resolve_from(explicit, env_value.as_deref())
    }

    /// Resolution with the environment value injected. `resolve` routes
    /// through here; tests call it directly to stay independent of
    /// process state.
    pub fn resolve_from(explicit: Option<&str>, env_value: Option<&str>) -> Self {
        let non_empty = |s: &&str| !s.trim().is_empty();
        let (credential, source) = if let Some(key) = explicit.filter(non_empty) {
            (key.to_string(), CredentialSource::Explicit)
        } else if let Some(key) = env_value.filter(non_empty) {
            (key.to_string(), CredentialSource::Environment)
        } else {
            (BUILTIN_CREDENTIAL.to_string(), CredentialSource::BuiltIn)
        };
        debug!(?source, "analysis credential resolved");
        Self { credential, source }
    }

    pub fn credential(&self) -> &str {
        &self.credential
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }
}
