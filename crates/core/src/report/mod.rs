//! Report sink: entropy text report, n-gram text report, gnuplot script and image.
//!
//! Every file is written to a temporary file in the output directory and
//! persisted over its final name, so a report is either complete or absent.

use std::fmt;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::config::ReportConfig;
use crate::error::{EngineError, Result};
use crate::model::{EntropyProfile, Model, SectionDescriptor};

pub mod layout;
pub mod text;

pub use layout::{sample_name, ReportLayout};
pub use text::{render_entropy_report, render_ngram_report, render_plot_script};

/// Which reports to produce, parsed from a flag string over `e`, `t`, `i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReportFlags {
    /// `e`: per-section entropy report.
    pub entropy: bool,
    /// `t`: n-gram model text report.
    pub ngram: bool,
    /// `i`: gnuplot script and rendered image.
    pub image: bool,
}

impl ReportFlags {
    pub const ALL: Self = Self { entropy: true, ngram: true, image: true };

    /// Unknown characters are ignored and an empty string selects everything,
    /// but a non-empty string without any known flag is rejected.
    pub fn parse(flags: &str) -> Result<Self> {
        if flags.is_empty() {
            return Ok(Self::ALL);
        }
        let parsed = Self {
            entropy: flags.contains('e'),
            ngram: flags.contains('t'),
            image: flags.contains('i'),
        };
        if !parsed.any() {
            return Err(EngineError::InvalidConfig(format!(
                "report flags '{flags}' select nothing (use any of e, t, i)"
            )));
        }
        Ok(parsed)
    }

    pub fn any(&self) -> bool {
        self.entropy || self.ngram || self.image
    }
}

impl Default for ReportFlags {
    fn default() -> Self {
        Self::ALL
    }
}

impl fmt::Display for ReportFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (on, c) in [(self.entropy, "e"), (self.ngram, "t"), (self.image, "i")] {
            if on {
                f.write_str(c)?;
            }
        }
        Ok(())
    }
}

impl TryFrom<String> for ReportFlags {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<ReportFlags> for String {
    fn from(flags: ReportFlags) -> String {
        flags.to_string()
    }
}

/// Paths of the artifacts written by one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPaths {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entropy: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ngram: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot_script: Option<PathBuf>,
    /// Only set when the plotter ran successfully and produced the image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<PathBuf>,
}

/// Renders pipeline outputs into the output directory.
#[derive(Debug, Clone)]
pub struct ReportSink {
    layout: ReportLayout,
    config: ReportConfig,
}

impl ReportSink {
    pub fn new(layout: ReportLayout, config: ReportConfig) -> Self {
        Self { layout, config }
    }

    pub fn layout(&self) -> &ReportLayout {
        &self.layout
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Create the output directory and drop artifacts left by an earlier run.
    pub fn prepare(&self) -> Result<()> {
        let dir = &self.layout.out_dir;
        fs::create_dir_all(dir).map_err(|e| EngineError::io("create directory", dir, e))?;
        for path in self.layout.artifacts() {
            match fs::remove_file(path) {
                Ok(()) => info!(path = %path.display(), "removed stale report"),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(EngineError::io("remove", path, e)),
            }
        }
        Ok(())
    }

    /// Write every selected report. `prepare` must have run first.
    pub fn emit(
        &self,
        sections: &[SectionDescriptor],
        profiles: &[Option<EntropyProfile>],
        model: &Model,
    ) -> Result<ReportPaths> {
        let flags = self.config.flags;
        let mut paths = ReportPaths::default();

        if flags.entropy {
            let body = render_entropy_report(sections, profiles);
            write_atomic(&self.layout.out_dir, &self.layout.entropy_path, &body)?;
            paths.entropy = Some(self.layout.entropy_path.clone());
        }
        if flags.ngram {
            write_atomic(&self.layout.out_dir, &self.layout.ngram_path, &render_ngram_report(model))?;
            paths.ngram = Some(self.layout.ngram_path.clone());
        }
        if flags.image {
            if paths.ngram.is_none() {
                warn!("image report needs the n-gram text report of the same run; skipping plot");
            } else {
                paths.plot_script = Some(self.write_plot_script()?);
                if self.run_plotter() {
                    paths.image = Some(self.layout.image_path.clone());
                }
            }
        }
        Ok(paths)
    }

    fn write_plot_script(&self) -> Result<PathBuf> {
        let script = render_plot_script(
            &self.layout.sample,
            &file_name(&self.layout.ngram_path),
            &file_name(&self.layout.image_path),
            self.config.image_width,
            self.config.image_height,
        );
        write_atomic(&self.layout.out_dir, &self.layout.plot_script_path, &script)?;
        Ok(self.layout.plot_script_path.clone())
    }

    /// Run the plotter on the script. Failures are warnings, never errors.
    fn run_plotter(&self) -> bool {
        let plotter = &self.config.plotter;
        let output = Command::new(plotter)
            .arg(file_name(&self.layout.plot_script_path))
            .current_dir(&self.layout.out_dir)
            .output();
        match output {
            Ok(out) if out.status.success() => {
                if self.layout.image_path.is_file() {
                    true
                } else {
                    warn!(plotter = %plotter.display(), "plotter exited cleanly but wrote no image");
                    false
                }
            }
            Ok(out) => {
                warn!(
                    plotter = %plotter.display(),
                    status = %out.status,
                    stderr = %String::from_utf8_lossy(&out.stderr).trim(),
                    "plotter failed; image not rendered"
                );
                false
            }
            Err(e) => {
                warn!(plotter = %plotter.display(), error = %e, "failed to spawn plotter; image not rendered");
                false
            }
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default()
}

/// Write `contents` to `dest` via a temporary file in `dir`.
pub fn write_atomic(dir: &Path, dest: &Path, contents: &str) -> Result<()> {
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| EngineError::io("create", dir, e))?;
    tmp.write_all(contents.as_bytes()).map_err(|e| EngineError::io("write", dest, e))?;
    tmp.as_file().sync_all().map_err(|e| EngineError::io("sync", dest, e))?;
    tmp.persist(dest).map_err(|e| EngineError::io("persist", dest, e.error))?;
    Ok(())
}
