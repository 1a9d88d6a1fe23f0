//! Player identity
//!
//! One opaque token per session, fixed for the session's lifetime.

use rand::Rng;
use std::fmt;

use crate::config::PlayerConfig;

/// Identifies this client to the game server and the other player.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlayerIdentity(String);

impl PlayerIdentity {
    /// `{prefix}{n}` with `n` drawn from `0..1000`.
    pub fn generate(prefix: &str) -> Self {
        let n: u32 = rand::rng().random_range(0..1000);
        Self(format!("{}{}", prefix, n))
    }

    pub fn fixed(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Uses the configured name when present, otherwise generates one.
    pub fn from_config(config: &PlayerConfig) -> Self {
        match config.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => Self::fixed(name),
            _ => Self::generate(config.name_prefix.trim()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
