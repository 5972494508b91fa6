//! Runtime knobs for the async derivation entry points.

use serde::{Deserialize, Serialize};

/// Default ceiling on PRF evaluations run inline on the calling task.
pub const DEFAULT_INLINE_ITERATION_LIMIT: u32 = 10_000;

/// Options controlling where async derivations run.
///
/// Never affects derived output or which error a request fails with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeriveConfig {
    /// Derivations needing at most this many PRF evaluations
    /// (`iterations × blocks`) run inline; heavier ones move to the
    /// blocking pool.
    pub inline_iteration_limit: u32,
}

impl Default for DeriveConfig {
    fn default() -> Self {
        Self {
            inline_iteration_limit: DEFAULT_INLINE_ITERATION_LIMIT,
        }
    }
}

impl DeriveConfig {
    pub fn with_inline_iteration_limit(mut self, limit: u32) -> Self {
        self.inline_iteration_limit = limit;
        self
    }

    /// Whether `blocks` PBKDF2 blocks of `iterations` rounds should leave the
    /// calling task.
    pub(crate) fn should_offload(&self, iterations: u32, blocks: usize) -> bool {
        (iterations as u64).saturating_mul(blocks as u64) > self.inline_iteration_limit as u64
    }
}
