//! End-to-end scoring and optimization
//!
//! Runs the feature codec, scorer and bucket optimizer in order over one
//! dataset and hands back everything a caller may want to persist.

use crate::codec::{fit_encode, CodecTable};
use crate::config::Config;
use crate::data::Dataset;
use crate::error::PipelineResult;
use crate::optimizer::{bucketize, select_optima, OptimumTable};
use crate::scorer::{score, ScoredDataset, Scorer};

/// Output of one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Scored rows with categorical fields still encoded
    pub scored: ScoredDataset,
    pub codec: CodecTable,
    pub optima: OptimumTable,
}

impl PipelineOutput {
    /// The scored dataset with categorical codes decoded back to labels.
    pub fn scored_labels(&self) -> PipelineResult<Dataset> {
        self.codec.decode_dataset(self.scored.table())
    }
}

pub struct Pipeline {
    config: Config,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn scorer(&self) -> Scorer {
        Scorer::new(self.config.columns.clone(), self.config.scoring.clone())
    }

    /// Encode, normalize, score and select per-bucket optima.
    pub fn run(&self, dataset: Dataset) -> PipelineResult<PipelineOutput> {
        let input_rows = dataset.len();
        let (encoded, codec) = fit_encode(dataset, &self.config.columns.categorical)?;
        let scored = score(self.scorer().normalize(encoded)?);
        let optima = {
            let buckets = bucketize(&scored)?;
            select_optima(&buckets, &codec)?
        };

        tracing::info!(
            input_rows,
            scored_rows = scored.len(),
            buckets = optima.len(),
            "pipeline complete"
        );
        Ok(PipelineOutput {
            scored,
            codec,
            optima,
        })
    }

    /// Normalize and score only, keeping categorical labels as they are.
    pub fn score(&self, dataset: Dataset) -> PipelineResult<ScoredDataset> {
        let scored = score(self.scorer().normalize(dataset)?);
        tracing::info!(rows = scored.len(), "scored dataset");
        Ok(scored)
    }

    /// Select optima from a dataset that was scored by an earlier run.
    pub fn optimize_scored(&self, dataset: Dataset) -> PipelineResult<(CodecTable, OptimumTable)> {
        let (encoded, codec) = fit_encode(dataset, &self.config.columns.categorical)?;
        let scored = ScoredDataset::from_dataset(encoded, &self.config.columns)?;
        let optima = select_optima(&bucketize(&scored)?, &codec)?;

        tracing::info!(rows = scored.len(), buckets = optima.len(), "selected optima");
        Ok((codec, optima))
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
