use std::cmp::Reverse;

use tracing::debug;

use crate::error::{EngineError, Result};
use crate::model::{Model, Slice, Token, TokenTable};
use crate::services::builders::ModelBuilder;

/// Ranks tokens by descending frequency and scores each against the most
/// frequent one. Equal frequencies are ordered by ascending token value.
#[derive(Debug, Default, Clone, Copy)]
pub struct DescendingFrequency {
    truncate_below: Option<f64>,
}

impl DescendingFrequency {
    pub fn new(truncate_below: Option<f64>) -> Self {
        Self { truncate_below }
    }
}

impl ModelBuilder for DescendingFrequency {
    fn build(&self, tokens: &TokenTable, max_value: u64) -> Result<Model> {
        let mut ranked: Vec<Token> = Vec::new();
        ranked.try_reserve_exact(tokens.len()).map_err(|e| EngineError::alloc("model", e))?;
        ranked.extend(tokens.tokens());
        ranked.sort_unstable_by_key(|t| (Reverse(t.frequency), t.value));

        let Some(&denominator) = ranked.first() else {
            return Ok(Model { max_value, ..Model::empty(tokens.dimension()) });
        };

        let mut slices = Vec::new();
        slices.try_reserve_exact(ranked.len()).map_err(|e| EngineError::alloc("model", e))?;
        for numerator in ranked {
            let score = numerator.frequency as f64 / denominator.frequency as f64;
            if self.truncate_below.is_some_and(|t| score < t) {
                break;
            }
            slices.push(Slice { denominator, numerator, score });
        }
        debug!(
            distinct = tokens.len(),
            kept = slices.len(),
            denominator = denominator.value,
            "model ranked"
        );

        Ok(Model { dimension: tokens.dimension(), max_value, denominator: Some(denominator), slices })
    }

    fn name(&self) -> &'static str {
        "descending-frequency"
    }

    fn description(&self) -> &'static str {
        "Tokens ranked by descending frequency, scored against the most frequent token"
    }
}
