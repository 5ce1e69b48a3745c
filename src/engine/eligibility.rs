//! Provider eligibility by tier label.
//!
//! The allow-set is a fixed pair of labels. It is chosen in code, not per run,
//! and settings cannot change it.

use crate::model::Provider;

/// Tier labels tracked by default: chief and associate chief physician.
pub const DEFAULT_TIERS: [&str; 2] = ["主任医师", "副主任医师"];

/// Accepts providers whose tier is one of exactly two labels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TierFilter {
    allowed: [String; 2],
}

impl Default for TierFilter {
    fn default() -> Self {
        Self::new(DEFAULT_TIERS)
    }
}

impl TierFilter {
    pub fn new(allowed: [&str; 2]) -> Self {
        Self {
            allowed: allowed.map(str::to_string),
        }
    }

    pub fn accepts(&self, provider: &Provider) -> bool {
        self.allowed.iter().any(|t| *t == provider.tier)
    }

    /// Keeps accepted providers in their original order.
    pub fn apply(&self, providers: Vec<Provider>) -> Vec<Provider> {
        providers.into_iter().filter(|p| self.accepts(p)).collect()
    }
}
