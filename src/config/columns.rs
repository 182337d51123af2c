use serde::{Deserialize, Serialize};

/// Names of the benchmark columns the scorer and optimizer read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    pub memory: String,
    pub energy: String,
    pub llm_score: String,
    pub params: String,
    /// Label columns encoded before optimization
    pub categorical: Vec<String>,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            memory: "Memory (MB)".to_string(),
            energy: "Energy (tokens/kWh)".to_string(),
            llm_score: "Open LLM Score (%)".to_string(),
            params: "Params (B)".to_string(),
            categorical: vec![
                "Backend".to_string(),
                "Precision".to_string(),
                "Quantization".to_string(),
                "Attention".to_string(),
                "Kernel".to_string(),
            ],
        }
    }
}
