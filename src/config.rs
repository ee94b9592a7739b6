//! Engine configuration.

/// Options controlling how the engine treats content it did not create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Reuse pre-existing nodes whose kind matches the `Spec` instead of
    /// creating new ones (default: true).
    pub adopt_existing: bool,
    /// Remove stray foreign children when an adopted parent is refined
    /// (default: true). Raw wrappers are never pruned.
    pub prune_foreign: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            adopt_existing: true,
            prune_foreign: true,
        }
    }
}

impl Config {
    /// Config that always creates fresh nodes.
    pub fn fresh() -> Self {
        Self {
            adopt_existing: false,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.adopt_existing);
        assert!(config.prune_foreign);

        let fresh = Config::fresh();
        assert!(!fresh.adopt_existing);
        assert!(fresh.prune_foreign);
    }
}
