use ferry_engine::RunReport;

use crate::cli::OutputFormat;

/// Render the end-of-run report.
///
/// Text output appends the per-item listings when `verbose` is set; JSON
/// always carries everything.
pub fn render(report: &RunReport, format: OutputFormat, verbose: bool) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(report)?)),
        OutputFormat::Text if verbose => Ok(format!("{report}{}", report.details())),
        OutputFormat::Text => Ok(report.to_string()),
    }
}
