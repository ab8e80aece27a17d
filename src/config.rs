//! Tunable constants for shortening, splitting and the invariant-lamination
//! search.

/// Search constants. The defaults are heuristic; none of them is known to be
/// optimal, so they are kept adjustable rather than hard-coded.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Integer resolution of the coarse projective hash.
    pub initial_resolution: u64,
    /// Run the reducing-curve scan after this many hash collisions.
    pub extra_test_every: usize,
    /// Multiply the resolution by 10 after this many collisions at it.
    pub escalate_after: usize,
    /// Iterate at most `iteration_factor · max_order` times ...
    pub iteration_factor: usize,
    /// ... but never fewer than this before the exhaustive fallback.
    pub min_iterations: usize,
    /// Denominator of the projective hash used by splitting sequences.
    pub projective_denominator: u64,
    /// Flip rounds a splitting sequence may take before giving up.
    pub splitting_max_steps: usize,
    /// Flip cap for `conjugate_short`.
    pub shorten_max_flips: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            initial_resolution: 100,
            extra_test_every: 4,
            escalate_after: 6,
            iteration_factor: 10,
            min_iterations: 100,
            projective_denominator: 1000,
            splitting_max_steps: 500,
            shorten_max_flips: 1000,
        }
    }
}

impl SearchConfig {
    /// Iterations before falling back to enumerating every PL cell.
    pub fn iteration_limit(&self, max_order: usize) -> usize {
        (self.iteration_factor * max_order).max(self.min_iterations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_limits() {
        let cfg = SearchConfig::default();
        assert_eq!(cfg.iteration_limit(6), 100);
        assert_eq!(cfg.iteration_limit(14), 140);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: SearchConfig = serde_json::from_str(r#"{"escalate_after": 3}"#).unwrap();
        assert_eq!(cfg.escalate_after, 3);
        assert_eq!(cfg.initial_resolution, 100);
    }
}
