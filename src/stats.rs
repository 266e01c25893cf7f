//! Token length statistics over stored fragments.

use crate::error::Result;
use crate::tokenizer::Tokenizer;
use serde::Serialize;

/// Length thresholds reported by [`LengthStats`], in tokens.
pub const LENGTH_THRESHOLDS: [usize; 3] = [512, 1024, 2048];

/// Token length distribution of a set of texts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LengthStats {
    pub count: usize,
    pub mean: f64,
    pub min: usize,
    pub max: usize,
    /// `(threshold, number of texts strictly longer than threshold)`.
    pub over: Vec<(usize, usize)>,
}

impl LengthStats {
    /// Measure `texts` with `tokenizer`. Returns `None` for no texts.
    pub fn compute<S: AsRef<str>>(texts: &[S], tokenizer: &dyn Tokenizer) -> Result<Option<Self>> {
        if texts.is_empty() {
            return Ok(None);
        }

        let lengths = texts
            .iter()
            .map(|t| tokenizer.count(t.as_ref()))
            .collect::<Result<Vec<usize>>>()?;

        let total: usize = lengths.iter().sum();
        let over = LENGTH_THRESHOLDS
            .iter()
            .map(|&limit| (limit, lengths.iter().filter(|&&l| l > limit).count()))
            .collect();

        Ok(Some(Self {
            count: lengths.len(),
            mean: total as f64 / lengths.len() as f64,
            min: lengths.iter().copied().min().unwrap_or_default(),
            max: lengths.iter().copied().max().unwrap_or_default(),
            over,
        }))
    }

    /// Texts longer than `limit` tokens, if `limit` is one of the reported thresholds.
    pub fn count_over(&self, limit: usize) -> Option<usize> {
        self.over.iter().find(|(l, _)| *l == limit).map(|(_, n)| *n)
    }
}
