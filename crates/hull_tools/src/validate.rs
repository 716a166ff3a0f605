//! Layout file validation.

use std::path::{Path, PathBuf};

use hull_core::data::ShipLayoutData;
use hull_core::hull::ShipHull;
use hull_core::transform::ShipTransform;
use serde::Serialize;

use crate::{Result, ToolError};

/// Outcome for one layout file.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutReport {
    /// File that was checked.
    pub path: PathBuf,
    /// Design name, when the file parsed.
    pub name: Option<String>,
    /// Grid size in cells, when the hull built.
    pub grid: Option<(u32, u32)>,
    /// Module count, when the file parsed.
    pub modules: usize,
    /// Failure message, if any.
    pub error: Option<String>,
}

impl LayoutReport {
    /// Whether the layout parsed and built.
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }
}

/// Results for a whole directory.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationSummary {
    /// One report per `.ron` file, sorted by path.
    pub reports: Vec<LayoutReport>,
}

impl ValidationSummary {
    /// Number of files that failed.
    pub fn failed(&self) -> usize {
        self.reports.iter().filter(|r| !r.is_valid()).count()
    }

    /// Whether every file passed.
    pub fn all_valid(&self) -> bool {
        self.failed() == 0
    }
}

/// Parse a layout file and build its hull at the origin.
pub fn validate_layout_file(path: &Path) -> LayoutReport {
    let mut report = LayoutReport {
        path: path.to_path_buf(),
        name: None,
        grid: None,
        modules: 0,
        error: None,
    };

    let layout = match ShipLayoutData::load_file(path) {
        Ok(layout) => layout,
        Err(e) => {
            report.error = Some(e.to_string());
            return report;
        }
    };
    report.name = Some(layout.name.clone());
    report.modules = layout.modules.len();

    match layout.build_hull(ShipTransform::default()) {
        Ok(hull) => report.grid = Some((hull.grid().width(), hull.grid().height())),
        Err(e) => report.error = Some(e.to_string()),
    }
    report
}

/// Validate every `.ron` layout in a directory.
///
/// Individual failures are collected in the summary rather than returned
/// as errors.
///
/// # Errors
///
/// Returns an error if the directory cannot be read or holds no layouts.
pub fn validate_layout_directory(path: &Path) -> Result<ValidationSummary> {
    let io_err = |source| ToolError::Io {
        path: path.display().to_string(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(path).map_err(io_err)? {
        let file = entry.map_err(io_err)?.path();
        if file.extension().is_some_and(|ext| ext == "ron") {
            files.push(file);
        }
    }
    if files.is_empty() {
        return Err(ToolError::NoLayouts(path.display().to_string()));
    }
    files.sort();

    let reports: Vec<LayoutReport> = files.iter().map(|f| validate_layout_file(f)).collect();
    for report in &reports {
        match &report.error {
            None => tracing::debug!(path = %report.path.display(), "Layout OK"),
            Some(e) => tracing::warn!(path = %report.path.display(), error = %e, "Layout invalid"),
        }
    }
    Ok(ValidationSummary { reports })
}

/// Load and build a single layout, failing on the first problem.
///
/// # Errors
///
/// Returns the parse or build error.
pub fn load_hull(path: &Path, transform: ShipTransform) -> Result<(ShipLayoutData, ShipHull)> {
    let layout = ShipLayoutData::load_file(path)?;
    let hull = layout.build_hull(transform)?;
    Ok((layout, hull))
}
