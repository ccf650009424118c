use crate::error::Result;
use crate::model::{EntropyProfile, RangeInterval, Region, RegionSet, SectionDescriptor};
use crate::services::regions::{max_average_section, RegionSelector};

/// Whole block range of the section with the highest average entropy.
#[derive(Debug, Default, Clone, Copy)]
pub struct MaxEntropySection;

impl RegionSelector for MaxEntropySection {
    fn select(
        &self,
        sections: &[SectionDescriptor],
        profiles: &[Option<EntropyProfile>],
    ) -> Result<RegionSet> {
        let Some((section, profile)) = max_average_section(sections, profiles) else {
            return Ok(RegionSet::empty());
        };
        let ranges = RangeInterval::new(0, profile.num_blocks()).into_iter().collect();
        Ok(RegionSet { regions: vec![Region { section: section.index, ranges }] })
    }

    fn name(&self) -> &'static str {
        "max-entropy-section"
    }

    fn description(&self) -> &'static str {
        "Entire section with the highest average block entropy"
    }
}
