//! Bridge-ID acceptance policy — the embedding application's hook.
//!
//! The engine never hardcodes which drawbridges exist.  The host supplies a
//! [`BridgePolicy`] distinguishing canonical (real) bridge IDs from synthetic
//! (test-only) ones; graph validation and the scorer's accepted/rejected
//! partition both consult it.

use std::collections::BTreeSet;

/// Pluggable bridge-ID acceptance policy.
///
/// Implementations must be `Send + Sync` — the policy is shared by scorers
/// across worker threads.
pub trait BridgePolicy: Send + Sync {
    /// `true` if `id` names a canonical (production) bridge.
    fn is_valid_bridge_id(&self, id: &str) -> bool;

    /// `true` if `id` is canonical, or — when `allow_synthetic` — a known
    /// synthetic/test id.
    fn is_accepted_bridge_id(&self, id: &str, allow_synthetic: bool) -> bool;

    /// All canonical IDs, sorted ascending.
    fn canonical_ids(&self) -> Vec<String>;
}

/// Set-backed policy: explicit canonical and synthetic ID sets.
///
/// The reference implementation; embedding applications with richer rules
/// (prefix conventions, registries) implement [`BridgePolicy`] themselves.
#[derive(Clone, Debug, Default)]
pub struct StaticBridgePolicy {
    canonical: BTreeSet<String>,
    synthetic: BTreeSet<String>,
}

impl StaticBridgePolicy {
    pub fn new(
        canonical: impl IntoIterator<Item = impl Into<String>>,
        synthetic: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            canonical: canonical.into_iter().map(Into::into).collect(),
            synthetic: synthetic.into_iter().map(Into::into).collect(),
        }
    }

    /// Policy accepting only the given canonical IDs.
    pub fn canonical_only(ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::new(ids, std::iter::empty::<String>())
    }
}

impl BridgePolicy for StaticBridgePolicy {
    fn is_valid_bridge_id(&self, id: &str) -> bool {
        self.canonical.contains(id)
    }

    fn is_accepted_bridge_id(&self, id: &str, allow_synthetic: bool) -> bool {
        self.canonical.contains(id) || (allow_synthetic && self.synthetic.contains(id))
    }

    fn canonical_ids(&self) -> Vec<String> {
        // BTreeSet iteration is already ascending.
        self.canonical.iter().cloned().collect()
    }
}
