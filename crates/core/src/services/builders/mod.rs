//! Model building strategies.

use std::collections::HashMap;

use crate::error::{EngineError, Result, StrategyKind};
use crate::model::{Model, TokenTable};

mod descending;

pub use descending::DescendingFrequency;

/// Turns a sparse token table into a ranked, ratio-scored [`Model`].
pub trait ModelBuilder: Send + Sync {
    fn build(&self, tokens: &TokenTable, max_value: u64) -> Result<Model>;
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
}

/// Registry for model builders; callers select by name.
#[derive(Default)]
pub struct ModelRegistry {
    builders: HashMap<String, Box<dyn ModelBuilder>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self { builders: HashMap::new() }
    }

    pub fn register<B: ModelBuilder + 'static>(&mut self, builder: B) -> &mut Self {
        self.builders.insert(builder.name().to_string(), Box::new(builder));
        self
    }

    pub fn get(&self, name: &str) -> Option<&dyn ModelBuilder> {
        self.builders.get(name).map(|b| &**b)
    }

    pub fn resolve(&self, name: &str) -> Result<&dyn ModelBuilder> {
        self.get(name).ok_or_else(|| EngineError::UnknownStrategy {
            kind: StrategyKind::Model,
            name: name.to_string(),
            available: self.names(),
        })
    }

    /// Return a sorted list of registered builder names for error messages/help.
    pub fn names(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.builders.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// `(name, description)` pairs, sorted by name.
    pub fn describe(&self) -> Vec<(String, String)> {
        self.names()
            .into_iter()
            .filter_map(|n| self.get(&n).map(|b| (n.clone(), b.description().to_string())))
            .collect()
    }
}

/// Registry populated with every built-in builder.
///
/// `truncate_below` is handed to builders that support truncation.
pub fn default_model_registry(truncate_below: Option<f64>) -> ModelRegistry {
    let mut registry = ModelRegistry::new();
    registry.register(DescendingFrequency::new(truncate_below));
    registry
}
