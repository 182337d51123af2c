//! Fixed-width memory buckets

use crate::error::{PipelineError, PipelineResult};
use crate::scorer::{ScoredDataset, ScoredRecord};
use std::collections::BTreeMap;

/// Width of one memory bucket in MB
pub const BUCKET_WIDTH_MB: i64 = 1000;

/// Lower bound of the 1000 MB bucket containing `memory_mb`.
///
/// Floors the quotient, so every non-negative footprint lands in a
/// non-negative bucket: 999 -> 0, 1000 -> 1000, 1999.9 -> 1000.
/// Returns `None` when the key does not fit in an `i64`.
pub fn bucket_key(memory_mb: f64) -> Option<i64> {
    let quotient = (memory_mb / BUCKET_WIDTH_MB as f64).floor();
    if !quotient.is_finite() || quotient < i64::MIN as f64 || quotient >= i64::MAX as f64 {
        return None;
    }
    (quotient as i64).checked_mul(BUCKET_WIDTH_MB)
}

/// Scored rows grouped by bucket, each group in input order
#[derive(Debug, Clone, PartialEq)]
pub struct Buckets<'a> {
    pub(crate) columns: &'a [String],
    pub(crate) groups: BTreeMap<i64, Vec<ScoredRecord<'a>>>,
}

impl<'a> Buckets<'a> {
    /// Column names of the rows in every group
    pub fn columns(&self) -> &'a [String] {
        self.columns
    }

    pub fn get(&self, key: i64) -> Option<&[ScoredRecord<'a>]> {
        self.groups.get(&key).map(Vec::as_slice)
    }

    /// Bucket keys in ascending order
    pub fn keys(&self) -> impl Iterator<Item = i64> + '_ {
        self.groups.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, &[ScoredRecord<'a>])> + '_ {
        self.groups.iter().map(|(&k, v)| (k, v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Group every scored row by the bucket of its memory footprint.
///
/// The scorer only admits footprints with a valid key, so a row without one
/// is a [`PipelineError::Internal`].
pub fn bucketize(scored: &ScoredDataset) -> PipelineResult<Buckets<'_>> {
    let mut groups: BTreeMap<i64, Vec<ScoredRecord<'_>>> = BTreeMap::new();
    for record in scored.records() {
        let key = bucket_key(record.memory_mb).ok_or_else(|| {
            PipelineError::Internal(format!(
                "row {} has memory {} outside the bucket range",
                record.position, record.memory_mb
            ))
        })?;
        groups.entry(key).or_default().push(record);
    }

    tracing::debug!(rows = scored.len(), buckets = groups.len(), "bucketized scored rows");
    Ok(Buckets {
        columns: scored.table().columns(),
        groups,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(bucket_key(0.0), Some(0));
        assert_eq!(bucket_key(999.0), Some(0));
        assert_eq!(bucket_key(999.999), Some(0));
        assert_eq!(bucket_key(1000.0), Some(1000));
        assert_eq!(bucket_key(1999.0), Some(1000));
        assert_eq!(bucket_key(1500.0), Some(1000));
        assert_eq!(bucket_key(73_412.8), Some(73_000));
    }

    #[test]
    fn test_bucket_key_out_of_range() {
        assert_eq!(bucket_key(1e19), None);
        assert_eq!(bucket_key(9.3e18), None);
        assert_eq!(bucket_key(f64::MAX), None);
        assert_eq!(bucket_key(f64::INFINITY), None);
        assert_eq!(bucket_key(f64::NAN), None);
        // largest quotient whose key still fits
        assert_eq!(bucket_key(9.0e18), Some(9_000_000_000_000_000_000));
    }

    #[test]
    fn test_bucket_key_is_deterministic() {
        for m in [0.0, 12.5, 999.0, 1000.0, 4321.0] {
            assert_eq!(bucket_key(m), bucket_key(m));
        }
    }
}
