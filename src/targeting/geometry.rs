//! Target-selection geometries.

use serde::{Deserialize, Serialize};

/// The six target-finding algorithms.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Geometry {
    #[default]
    SingleTarget,
    Chain,
    Cone,
    Circle,
    Beam,
    Pierce,
}

impl Geometry {
    /// Map a canonical geometry tag to its algorithm. Aliases are resolved by the registry.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "single_target" => Some(Geometry::SingleTarget),
            "chain" => Some(Geometry::Chain),
            "cone" => Some(Geometry::Cone),
            "circle" => Some(Geometry::Circle),
            "beam" => Some(Geometry::Beam),
            "pierce" => Some(Geometry::Pierce),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Geometry::SingleTarget => "single_target",
            Geometry::Chain => "chain",
            Geometry::Cone => "cone",
            Geometry::Circle => "circle",
            Geometry::Beam => "beam",
            Geometry::Pierce => "pierce",
        }
    }

    /// Per-hop magnitude multiplier for target index `index`.
    ///
    /// Only chain and pierce fall off: `(1 - falloff)^index`, with the
    /// falloff read from `chain_falloff` (0.3) or `pierce_falloff` (0.1).
    #[must_use]
    pub fn magnitude(self, index: usize, params: &crate::core::Params) -> f64 {
        let falloff = match self {
            Geometry::Chain => params.f64_or("chain_falloff", 0.3),
            Geometry::Pierce => params.f64_or("pierce_falloff", 0.1),
            _ => return 1.0,
        };
        let exponent = i32::try_from(index).unwrap_or(i32::MAX);
        (1.0 - falloff).max(0.0).powi(exponent)
    }
}

impl std::fmt::Display for Geometry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
