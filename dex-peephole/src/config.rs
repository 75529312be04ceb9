//! Pass configuration.

use crate::rules;

/// What the pass is allowed to do.
///
/// The default configuration enables every catalog rule except the
/// ones on [`rules::default_disabled`] and runs the redundant
/// check-cast remover after the peephole rules.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct PeepholeConfig {
    /// Stable rule names that must not fire. Unknown names are
    /// ignored.
    pub disabled_rules: Vec<String>,
    /// Whether to run the redundant check-cast remover after the
    /// peephole rules.
    pub run_cast_removal: bool,
}

impl Default for PeepholeConfig {
    fn default() -> Self {
        Self {
            disabled_rules: rules::default_disabled()
                .iter()
                .map(|name| (*name).to_string())
                .collect(),
            run_cast_removal: true,
        }
    }
}

impl PeepholeConfig {
    /// A configuration with every catalog rule enabled and the cast
    /// remover off; the shape most tests want.
    pub fn all_rules() -> Self {
        Self {
            disabled_rules: Vec::new(),
            run_cast_removal: false,
        }
    }
}
