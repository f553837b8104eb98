//! Service bind configuration, in the workspace's single-source-of-truth
//! style (env var with a sensible default, validated once at startup).

use std::env;

/// Bind configuration for the crisis-web HTTP adapter.
pub struct CrisisWebBind;

impl CrisisWebBind {
    pub const DEFAULT_BIND: &'static str = "127.0.0.1:8900";
    pub const ENV_VAR: &'static str = "CRISIS_WEB_BIND";

    pub fn bind() -> String {
        env::var(Self::ENV_VAR).unwrap_or_else(|_| Self::DEFAULT_BIND.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bind_is_stable() {
        assert_eq!(CrisisWebBind::DEFAULT_BIND, "127.0.0.1:8900");
    }
}
