//! Node identifier type.
//!
//! Node IDs are opaque strings chosen by the embedding application (street
//! intersections, OSM node references, synthetic test labels).  The total
//! lexicographic order is load-bearing: every tie-break in routing and
//! enumeration falls back to `NodeId` ordering so results are deterministic
//! across runs and platforms.

use std::fmt;

/// An opaque, totally ordered node identifier.
///
/// Cheap to clone for typical ID lengths; used as a map key throughout the
/// engine.  Ordering is lexicographic on the underlying string.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        NodeId(id.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId(s.to_owned())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        NodeId(s)
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
