//! HTML dashboard sink.
//!
//! Consumes a structured analytics payload ([`DashboardSpec`]) and emits a
//! single self-contained HTML document with no JavaScript or external assets,
//! so the output works offline and survives being mailed around. The chart
//! is a pure-CSS horizontal bar chart; everything interpolated into the
//! page is HTML-escaped.
//!
//! This crate is a presentation sink only: it knows nothing about the graph
//! store or the ingestion pipeline.

pub mod payload;
mod render;

use std::path::{Path, PathBuf};

use anyhow::Context;

pub use payload::{Chart, DashboardSpec, Kpi, Table};
pub use render::render_dashboard;

/// Output directory override for saved dashboards.
pub const OUTPUT_DIR_ENV: &str = "OUTPUT_DIR";
/// Default output directory, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "outputs";

/// Render `spec` and write it to `<out_dir>/<prefix>_<timestamp>.html`,
/// creating the directory if needed. Returns the written path.
pub fn save_dashboard(
    spec: &DashboardSpec,
    out_dir: &Path,
    prefix: &str,
) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let out_path = out_dir.join(format!("{prefix}_{stamp}.html"));
    std::fs::write(&out_path, render_dashboard(spec))
        .with_context(|| format!("writing dashboard to {}", out_path.display()))?;
    Ok(out_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_writes_a_timestamped_html_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let spec = DashboardSpec {
            title: "Quarterly Review".to_string(),
            ..DashboardSpec::default()
        };
        let path = save_dashboard(&spec, dir.path(), "dashboard").expect("save");
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("dashboard_"), "{name}");
        assert!(name.ends_with(".html"), "{name}");
        let html = std::fs::read_to_string(&path).expect("read back");
        assert!(html.starts_with("<!doctype html>"));
        assert!(html.contains("Quarterly Review"));
    }
}
