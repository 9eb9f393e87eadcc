use serde::{Deserialize, Serialize};

/// Evaluator tunables. Defaults match the trigger lengths and limits the
/// IDE front end assumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Minimum typed prefix used to filter variable completions.
    pub variable_trigger_len: usize,
    /// Short-name index key length for function completions.
    pub function_trigger_len: usize,
    /// Maximum number of lines in a synthesized calltip.
    pub calltip_line_limit: usize,
    /// Per-expression evaluation budget of the recursion guard.
    pub max_eval_count: u32,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            variable_trigger_len: 1,
            function_trigger_len: 3,
            calltip_line_limit: 5,
            max_eval_count: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EvalConfig::default();
        assert_eq!(config.variable_trigger_len, 1);
        assert_eq!(config.function_trigger_len, 3);
        assert_eq!(config.calltip_line_limit, 5);
        assert_eq!(config.max_eval_count, 10);
    }

    #[test]
    fn test_partial_overrides_keep_defaults() {
        let config: EvalConfig = serde_json::from_str(r#"{"function_trigger_len": 4}"#).unwrap();
        assert_eq!(config.function_trigger_len, 4);
        assert_eq!(config.variable_trigger_len, 1);
    }
}
