//! SVG flamegraph rendering using the inferno library.
//!
//! The flamegraph is drawn straight from the collapsed stack file, the same
//! input the hot method trees are built from. Rendering is delegated to
//! inferno entirely; nothing here interprets frames.

use crate::utils::error::FlamegraphError;
use inferno::flamegraph::{self, Options};
use log::info;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Flamegraph configuration
#[derive(Debug, Clone)]
pub struct FlamegraphConfig {
    pub title: String,
    pub width: Option<usize>,
    /// Unit shown in frame tooltips
    pub count_name: String,
}

impl Default for FlamegraphConfig {
    fn default() -> Self {
        Self {
            title: "Hot Method Flame Graph".to_string(),
            width: None,
            count_name: "samples".to_string(),
        }
    }
}

impl FlamegraphConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = Some(width);
        self
    }

    /// Unit of the counts, e.g. "samples" for CPU profiles or "ms" for wall time
    pub fn with_count_name(mut self, count_name: impl Into<String>) -> Self {
        self.count_name = count_name.into();
        self
    }

    fn to_options(&self) -> Options<'static> {
        let mut options = Options::default();
        options.title = self.title.clone();
        options.count_name = self.count_name.clone();
        options.image_width = self.width;
        options
    }
}

/// Render a collapsed stack file as an SVG flamegraph
///
/// # Arguments
/// * `collapsed_path` - Collapsed stack file
/// * `svg_path` - Destination; parent directories are created
/// * `config` - Rendering options (defaults when `None`)
///
/// # Errors
/// * `FlamegraphError::IoError` - destination not writable
/// * `FlamegraphError::RenderFailed` - inferno rejected the input
pub fn render_flamegraph(
    collapsed_path: &Path,
    svg_path: &Path,
    config: Option<&FlamegraphConfig>,
) -> Result<(), FlamegraphError> {
    let config = config.cloned().unwrap_or_default();
    info!(
        "Rendering flamegraph: {} -> {}",
        collapsed_path.display(),
        svg_path.display()
    );

    if let Some(parent) = svg_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = BufWriter::new(File::create(svg_path)?);
    let mut options = config.to_options();
    let inputs = [PathBuf::from(collapsed_path)];

    flamegraph::from_files(&mut options, &inputs, &mut writer)
        .map_err(|e| FlamegraphError::RenderFailed(e.to_string()))?;
    writer.flush()?;

    info!("Flamegraph written to: {}", svg_path.display());
    Ok(())
}

/// SVG path for a collapsed file: same stem, `.svg` extension, in `dir`
pub fn svg_path_for(collapsed_path: &Path, dir: &Path) -> PathBuf {
    let stem = collapsed_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "flamegraph".to_string());
    dir.join(format!("{}.svg", stem))
}
