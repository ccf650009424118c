use anyhow::Result;
use serde::Serialize;

use ngram_core::services::{default_model_registry, default_region_registry};

#[derive(Debug, Serialize)]
pub struct StrategyInfo {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct StrategyListing {
    pub region: Vec<StrategyInfo>,
    pub model: Vec<StrategyInfo>,
}

/// Collect the region selectors and model builders known to this binary.
pub fn strategy_listing() -> StrategyListing {
    let to_info = |(name, description): (String, String)| StrategyInfo { name, description };
    StrategyListing {
        region: default_region_registry().describe().into_iter().map(to_info).collect(),
        model: default_model_registry(None).describe().into_iter().map(to_info).collect(),
    }
}

/// List available region selectors and model builders.
pub fn list_strategies_command(json: bool) -> Result<()> {
    let listing = strategy_listing();

    if json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    println!("Region selectors:");
    for entry in &listing.region {
        println!("- {}: {}", entry.name, entry.description);
    }
    println!("Model builders:");
    for entry in &listing.model {
        println!("- {}: {}", entry.name, entry.description);
    }

    Ok(())
}
