//! Region selection strategies.

use std::collections::HashMap;

use crate::error::{EngineError, Result, StrategyKind};
use crate::model::{EntropyProfile, RegionSet, SectionDescriptor};

mod max_entropy;
mod plateaus;

pub use max_entropy::MaxEntropySection;
pub use plateaus::{deviation_threshold, find_plateaus, PlateausInMaxSection};

/// Narrows the analysis to the statistically interesting byte ranges.
///
/// `profiles` is aligned with `sections`; empty sections have `None`.
pub trait RegionSelector: Send + Sync {
    fn select(
        &self,
        sections: &[SectionDescriptor],
        profiles: &[Option<EntropyProfile>],
    ) -> Result<RegionSet>;
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
}

/// Registry for region selectors; callers select by name.
#[derive(Default)]
pub struct RegionRegistry {
    selectors: HashMap<String, Box<dyn RegionSelector>>,
}

impl RegionRegistry {
    pub fn new() -> Self {
        Self { selectors: HashMap::new() }
    }

    pub fn register<S: RegionSelector + 'static>(&mut self, selector: S) -> &mut Self {
        self.selectors.insert(selector.name().to_string(), Box::new(selector));
        self
    }

    pub fn get(&self, name: &str) -> Option<&dyn RegionSelector> {
        self.selectors.get(name).map(|s| &**s)
    }

    /// Like [`get`](Self::get), but an unknown name is an error listing the alternatives.
    pub fn resolve(&self, name: &str) -> Result<&dyn RegionSelector> {
        self.get(name).ok_or_else(|| EngineError::UnknownStrategy {
            kind: StrategyKind::Region,
            name: name.to_string(),
            available: self.names(),
        })
    }

    /// Return a sorted list of registered selector names for error messages/help.
    pub fn names(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.selectors.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// `(name, description)` pairs, sorted by name.
    pub fn describe(&self) -> Vec<(String, String)> {
        self.names()
            .into_iter()
            .filter_map(|n| self.get(&n).map(|s| (n.clone(), s.description().to_string())))
            .collect()
    }
}

/// Registry populated with every built-in selector.
pub fn default_region_registry() -> RegionRegistry {
    let mut registry = RegionRegistry::new();
    registry.register(MaxEntropySection).register(PlateausInMaxSection);
    registry
}

/// Non-empty section with the strictly greatest average entropy; the first wins ties.
pub fn max_average_section<'a>(
    sections: &'a [SectionDescriptor],
    profiles: &'a [Option<EntropyProfile>],
) -> Option<(&'a SectionDescriptor, &'a EntropyProfile)> {
    let mut best: Option<(&SectionDescriptor, &EntropyProfile)> = None;
    for (section, profile) in sections.iter().zip(profiles) {
        let Some(profile) = profile else { continue };
        if section.is_empty() {
            continue;
        }
        match best {
            Some((_, b)) if profile.avg <= b.avg => {}
            _ => best = Some((section, profile)),
        }
    }
    best
}
