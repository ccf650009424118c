//! Text renderings of entropy profiles, the n-gram model, and the plot script.

use std::fmt::Write;

use crate::model::{EntropyProfile, Model, SectionDescriptor};

/// Per-section attributes followed by max/avg/min and every block entropy.
pub fn render_entropy_report(
    sections: &[SectionDescriptor],
    profiles: &[Option<EntropyProfile>],
) -> String {
    let mut out = String::new();
    let _ = write!(out, "Total: {} sections.\n\n", sections.len());

    for (i, section) in sections.iter().enumerate() {
        let _ = writeln!(out, "[Section #{i}]");
        let _ = writeln!(out, "Section    Name: {}", section.name);
        let _ = writeln!(out, "Characteristics: 0x{:08x}", section.characteristics);
        let _ = writeln!(out, "Raw      Offset: 0x{:08x}", section.raw_offset);
        let _ = writeln!(out, "Raw        Size: 0x{:08x}", section.raw_size);

        match profiles.get(i).and_then(Option::as_ref) {
            None => out.push_str("\tThe empty section.\n\n"),
            Some(profile) => {
                let _ = writeln!(out, "\tMax Entropy: {:.3}", profile.max);
                let _ = writeln!(out, "\tAvg Entropy: {:.3}", profile.avg);
                let _ = writeln!(out, "\tMin Entropy: {:.3}", profile.min);
                for (j, e) in profile.blocks.iter().enumerate() {
                    let _ = writeln!(out, "\t\tBlk #{j}: {e:.3}");
                }
                out.push('\n');
            }
        }
    }
    out
}

/// One row per slice: `index  score  #(0xNUM:freq)  (0xDEN:freq)`.
///
/// Everything after `#` is a gnuplot comment, so the file plots as `index score`.
pub fn render_ngram_report(model: &Model) -> String {
    let mut out = String::new();
    for (i, slice) in model.slices.iter().enumerate() {
        let _ = writeln!(
            out,
            "{i}\t{:.3}\t#(0x{:08x}:{})\t(0x{:08x}:{})",
            slice.score,
            slice.numerator.value,
            slice.numerator.frequency,
            slice.denominator.value,
            slice.denominator.frequency
        );
    }
    out
}

/// Gnuplot script drawing the n-gram report as a line chart.
///
/// `data` and `image` are written verbatim, so pass paths relative to the
/// directory the plotter runs in.
pub fn render_plot_script(sample: &str, data: &str, image: &str, width: u32, height: u32) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "set terminal png size {width}, {height}");
    let _ = writeln!(out, "set output \"{}\"", escape(image));
    let _ = writeln!(out, "set title \"{}\"", escape(sample));
    out.push_str("set xlabel \"Slice Index\"\n");
    out.push_str("set ylabel \"Frequency Ratio\"\n");
    let _ = writeln!(out, "plot \"{}\" title \"\" with lines", escape(data));
    out.push_str("exit\n");
    out
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
