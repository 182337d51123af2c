use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default file names for each pipeline stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    pub input_csv: String,
    pub scored_csv: String,
    pub optimum_csv: String,
    pub recommendation_json: String,
    pub recommendation_csv: String,
    pub output_dir: String,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            input_csv: "llm_perf_data.csv".to_string(),
            scored_csv: "normalized_scored_data.csv".to_string(),
            optimum_csv: "optimal_mem_solutions.csv".to_string(),
            recommendation_json: "recommendation.json".to_string(),
            recommendation_csv: "recommendation.csv".to_string(),
            output_dir: ".".to_string(),
        }
    }
}

impl PathConfig {
    pub fn scored_file(&self) -> PathBuf {
        PathBuf::from(&self.output_dir).join(&self.scored_csv)
    }

    pub fn optimum_file(&self) -> PathBuf {
        PathBuf::from(&self.output_dir).join(&self.optimum_csv)
    }

    pub fn recommendation_file(&self) -> PathBuf {
        PathBuf::from(&self.output_dir).join(&self.recommendation_json)
    }

    pub fn recommendation_table_file(&self) -> PathBuf {
        PathBuf::from(&self.output_dir).join(&self.recommendation_csv)
    }
}
