use tracing::debug;

use crate::error::Result;
use crate::model::{EntropyProfile, RangeInterval, Region, RegionSet, SectionDescriptor};
use crate::services::regions::{max_average_section, RegionSelector};

/// Runs of high, stable entropy inside the section with the highest average.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlateausInMaxSection;

impl RegionSelector for PlateausInMaxSection {
    fn select(
        &self,
        sections: &[SectionDescriptor],
        profiles: &[Option<EntropyProfile>],
    ) -> Result<RegionSet> {
        let Some((section, profile)) = max_average_section(sections, profiles) else {
            return Ok(RegionSet::empty());
        };
        let ranges = find_plateaus(&profile.blocks, profile.avg);
        debug!(section = section.index, plateaus = ranges.len(), "plateau scan finished");
        if ranges.is_empty() {
            return Ok(RegionSet::empty());
        }
        Ok(RegionSet { regions: vec![Region { section: section.index, ranges }] })
    }

    fn name(&self) -> &'static str {
        "plateaus-in-max-section"
    }

    fn description(&self) -> &'static str {
        "Above-average entropy plateaus within the highest-entropy section"
    }
}

/// Mean absolute delta over adjacent block pairs that are both `>= avg`.
///
/// Zero when no such pair exists.
pub fn deviation_threshold(blocks: &[f64], avg: f64) -> f64 {
    let (sum, count) = blocks
        .windows(2)
        .filter(|pair| pair[0] >= avg && pair[1] >= avg)
        .fold((0.0, 0usize), |(sum, count), pair| (sum + (pair[1] - pair[0]).abs(), count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Split `blocks` into plateaus: maximal runs of blocks `>= avg` whose
/// consecutive deltas stay within [`deviation_threshold`].
///
/// A run closes at the first block that drops below `avg` or jumps by more
/// than the threshold; scanning resumes at that block.
pub fn find_plateaus(blocks: &[f64], avg: f64) -> Vec<RangeInterval> {
    let threshold = deviation_threshold(blocks, avg);
    let mut plateaus = Vec::new();
    let mut i = 0;
    while i < blocks.len() {
        if blocks[i] < avg {
            i += 1;
            continue;
        }
        let start = i;
        let mut end = i + 1;
        while end < blocks.len()
            && blocks[end] >= avg
            && (blocks[end] - blocks[end - 1]).abs() <= threshold
        {
            end += 1;
        }
        plateaus.extend(RangeInterval::new(start, end));
        i = end;
    }
    plateaus
}
