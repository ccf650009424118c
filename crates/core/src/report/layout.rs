use std::path::{Path, PathBuf};

pub const ENTROPY_SUFFIX: &str = ".entropy.txt";
pub const NGRAM_SUFFIX: &str = ".ngram.txt";
pub const PLOT_SCRIPT_SUFFIX: &str = ".ngram.plt";
pub const IMAGE_SUFFIX: &str = ".ngram.png";

/// Report paths for one sample inside an output directory.
///
/// This does *not* perform any IO itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLayout {
    /// Directory holding every artifact.
    pub out_dir: PathBuf,
    /// Sample name the artifacts are prefixed with.
    pub sample: String,
    pub entropy_path: PathBuf,
    pub ngram_path: PathBuf,
    pub plot_script_path: PathBuf,
    pub image_path: PathBuf,
}

impl ReportLayout {
    pub fn new(out_dir: impl AsRef<Path>, sample: impl Into<String>) -> Self {
        let out_dir = out_dir.as_ref().to_path_buf();
        let sample = sample.into();
        let entropy_path = out_dir.join(format!("{sample}{ENTROPY_SUFFIX}"));
        let ngram_path = out_dir.join(format!("{sample}{NGRAM_SUFFIX}"));
        let plot_script_path = out_dir.join(format!("{sample}{PLOT_SCRIPT_SUFFIX}"));
        let image_path = out_dir.join(format!("{sample}{IMAGE_SUFFIX}"));

        Self { out_dir, sample, entropy_path, ngram_path, plot_script_path, image_path }
    }

    /// Every artifact path, in write order.
    pub fn artifacts(&self) -> [&Path; 4] {
        [&self.entropy_path, &self.ngram_path, &self.plot_script_path, &self.image_path]
    }
}

/// Sample name for `path`: the file name without its last extension.
pub fn sample_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|os| os.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("sample")
        .to_string()
}
