use serde::{Deserialize, Serialize};

/// Default prefix marking relation batches.
pub const DEFAULT_JOIN_PREFIX: &str = "_Join";

/// Default key wrapping the record list in hosted per-class exports.
pub const DEFAULT_RESULTS_KEY: &str = "results";

/// Configuration for an import run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Emit progress lines at `info` level. Has no effect on results.
    pub trace: bool,
    /// Prefix that marks a batch (or file) as a relation batch.
    pub join_prefix: String,
    /// Key under which a per-file export may wrap its record list.
    pub results_key: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            trace: false,
            join_prefix: DEFAULT_JOIN_PREFIX.to_string(),
            results_key: DEFAULT_RESULTS_KEY.to_string(),
        }
    }
}

impl ImportConfig {
    /// Returns a copy with tracing switched on or off.
    #[must_use]
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }
}
