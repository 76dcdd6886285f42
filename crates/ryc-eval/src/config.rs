use serde::{Deserialize, Serialize};

/// Default limit on nested user-function calls.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 2000;

/// Evaluator limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Nested calls beyond this raise a runtime error.
    pub max_call_depth: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: EvalConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, EvalConfig::default());
        let config: EvalConfig = serde_json::from_str(r#"{"max_call_depth": 10}"#).unwrap();
        assert_eq!(config.max_call_depth, 10);
    }
}
