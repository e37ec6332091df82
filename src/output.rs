use anyhow::{Context, Result};
use rust_xlsxwriter::{Color, Format, Workbook};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::report::RepoReport;

#[derive(Debug, Error, PartialEq)]
pub enum FormatError {
    #[error("cannot infer output format from \"{0}\": use a .xlsx or .json extension or pass --format")]
    UnknownExtension(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Xlsx,
    Json,
}

impl OutputFormat {
    /// Resolves the output format before any scanning starts: an explicit
    /// choice wins, otherwise the path extension decides.
    pub fn resolve(path: &Path, explicit: Option<OutputFormat>) -> Result<Self, FormatError> {
        if let Some(format) = explicit {
            return Ok(format);
        }
        match path.extension().and_then(|e| e.to_str()) {
            Some("xlsx") => Ok(OutputFormat::Xlsx),
            Some("json") => Ok(OutputFormat::Json),
            _ => Err(FormatError::UnknownExtension(path.display().to_string())),
        }
    }
}

/// Writes all repository reports to one file in the chosen format.
pub fn write_reports(path: &Path, format: OutputFormat, reports: &[RepoReport]) -> Result<()> {
    match format {
        OutputFormat::Xlsx => write_xlsx(path, reports)?,
        OutputFormat::Json => write_json(path, reports)?,
    }
    info!("Results saved to {}", path.display());
    Ok(())
}

const HEADERS: [&str; 6] =
    ["Rank", "Function Name", "File Path", "Start Line", "End Line", "Lines of Code"];

const COLUMN_WIDTHS: [f64; 6] = [8.0, 30.0, 50.0, 12.0, 12.0, 15.0];

fn write_xlsx(path: &Path, reports: &[RepoReport]) -> Result<()> {
    let mut workbook = Workbook::new();
    let mut used_names = HashSet::new();

    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(0x366092));
    let label_format = Format::new().set_bold();

    for report in reports {
        let sheet_name =
            uniquify_name(&mut used_names, sanitize_sheet_name(&report.name), SHEET_NAME_MAX);
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(sheet_name)
            .with_context(|| format!("Invalid sheet name for repository {}", report.name))?;

        for (col, header) in HEADERS.iter().enumerate() {
            worksheet.write_with_format(0, col as u16, *header, &header_format)?;
        }
        for (col, width) in COLUMN_WIDTHS.iter().enumerate() {
            worksheet.set_column_width(col as u16, *width)?;
        }

        let mut row = 1u32;
        for (rank, func) in report.functions.iter().enumerate() {
            worksheet.write(row, 0, (rank + 1) as u32)?;
            worksheet.write(row, 1, func.name.as_str())?;
            worksheet.write(row, 2, func.path.to_string_lossy().as_ref())?;
            worksheet.write(row, 3, func.start_line)?;
            worksheet.write(row, 4, func.end_line)?;
            worksheet.write(row, 5, func.size)?;
            row += 1;
        }

        // Summary block over the filtered set, one blank row below the data
        row += 1;
        let summary = &report.summary;
        worksheet.write_with_format(row, 0, "Functions \u{2265} threshold", &label_format)?;
        worksheet.write(row, 1, summary.count as u32)?;
        worksheet.write_with_format(row + 1, 0, "Average", &label_format)?;
        worksheet.write(row + 1, 1, summary.average)?;
        worksheet.write_with_format(row + 2, 0, "Max", &label_format)?;
        worksheet.write(row + 2, 1, summary.max)?;
        worksheet.write_with_format(row + 3, 0, "Min", &label_format)?;
        worksheet.write(row + 3, 1, summary.min)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("Failed to write workbook to {}", path.display()))?;
    Ok(())
}

fn write_json(path: &Path, reports: &[RepoReport]) -> Result<()> {
    let mut used_names = HashSet::new();
    let mut document = serde_json::Map::new();
    for report in reports {
        let key = uniquify_name(&mut used_names, report.name.clone(), usize::MAX);
        document.insert(key, serde_json::to_value(report)?);
    }
    let contents = serde_json::to_string_pretty(&document)?;
    fs::write(path, contents)
        .with_context(|| format!("Failed to write results to {}", path.display()))?;
    Ok(())
}

const SHEET_NAME_MAX: usize = 31;

/// Excel sheet names: path separators replaced, hard 31-character cap.
pub fn sanitize_sheet_name(name: &str) -> String {
    name.replace(['/', '\\'], "_").chars().take(SHEET_NAME_MAX).collect()
}

/// Repositories may share a display name (same basename, or long names that
/// truncate alike); colliding names get a numeric suffix within `max_len`
/// so no repository's entry is lost.
fn uniquify_name(used: &mut HashSet<String>, base: String, max_len: usize) -> String {
    if used.insert(base.clone()) {
        return base;
    }
    let mut counter = 2;
    loop {
        let suffix = format!("_{counter}");
        let keep = max_len.saturating_sub(suffix.len());
        let mut candidate: String = base.chars().take(keep).collect();
        candidate.push_str(&suffix);
        if used.insert(candidate.clone()) {
            return candidate;
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::build_report;
    use crate::scanner::FunctionRecord;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn sample_report(name: &str) -> RepoReport {
        let functions = vec![
            FunctionRecord {
                name: "large".to_string(),
                path: PathBuf::from("src/large.js"),
                start_line: 10,
                end_line: 29,
                size: 20,
            },
            FunctionRecord {
                name: "small".to_string(),
                path: PathBuf::from("src/small.js"),
                start_line: 1,
                end_line: 3,
                size: 3,
            },
        ];
        build_report(name.to_string(), functions, 1, 5)
    }

    #[test]
    fn test_format_inference() {
        assert_eq!(
            OutputFormat::resolve(Path::new("out.xlsx"), None),
            Ok(OutputFormat::Xlsx)
        );
        assert_eq!(
            OutputFormat::resolve(Path::new("out.json"), None),
            Ok(OutputFormat::Json)
        );
        assert!(OutputFormat::resolve(Path::new("out.csv"), None).is_err());
        assert!(OutputFormat::resolve(Path::new("noext"), None).is_err());
    }

    #[test]
    fn test_explicit_format_overrides_extension() {
        assert_eq!(
            OutputFormat::resolve(Path::new("out.dat"), Some(OutputFormat::Json)),
            Ok(OutputFormat::Json)
        );
    }

    #[test]
    fn test_sanitize_sheet_name() {
        let long = "very/long/repository/name/that/exceeds/thirty/one/characters";
        let sanitized = sanitize_sheet_name(long);
        assert!(sanitized.chars().count() <= 31);
        assert!(!sanitized.contains('/'));
        assert_eq!(sanitize_sheet_name("back\\slash"), "back_slash");
        assert_eq!(sanitize_sheet_name("plain"), "plain");
    }

    #[test]
    fn test_write_json_shape() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("results.json");
        write_reports(&out, OutputFormat::Json, &[sample_report("test-repo")]).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        let repo = &value["test-repo"];
        assert_eq!(repo["summary"]["count"], 2);
        assert_eq!(repo["summary"]["max"], 20);
        assert_eq!(repo["summary"]["min"], 3);
        let functions = repo["functions"].as_array().unwrap();
        assert_eq!(functions.len(), 2);
        assert_eq!(functions[0]["name"], "large");
        assert_eq!(functions[0]["size"], 20);
        assert_eq!(functions[0]["path"], "src/large.js");
        assert_eq!(functions[0]["start_line"], 10);
        assert_eq!(functions[0]["end_line"], 29);
    }

    #[test]
    fn test_write_xlsx_creates_workbook() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("results.xlsx");
        write_reports(
            &out,
            OutputFormat::Xlsx,
            &[sample_report("repo-a"), sample_report("b/with/slashes")],
        )
        .unwrap();
        let metadata = fs::metadata(&out).unwrap();
        assert!(metadata.len() > 0);
    }

    #[test]
    fn test_write_xlsx_with_colliding_repo_names() {
        // same basename in two parent directories sanitizes to one name;
        // the workbook must still hold a sheet per repository
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("results.xlsx");
        write_reports(
            &out,
            OutputFormat::Xlsx,
            &[sample_report("widget"), sample_report("widget")],
        )
        .unwrap();
        assert!(fs::metadata(&out).unwrap().len() > 0);
    }

    #[test]
    fn test_write_json_keeps_both_colliding_repos() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("results.json");
        write_reports(
            &out,
            OutputFormat::Json,
            &[sample_report("widget"), sample_report("widget")],
        )
        .unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 2);
        assert!(object.contains_key("widget"));
        assert!(object.contains_key("widget_2"));
    }

    #[test]
    fn test_uniquify_name_respects_length_cap() {
        let mut used = HashSet::new();
        let long = "a".repeat(SHEET_NAME_MAX);
        let first = uniquify_name(&mut used, long.clone(), SHEET_NAME_MAX);
        let second = uniquify_name(&mut used, long.clone(), SHEET_NAME_MAX);
        let third = uniquify_name(&mut used, long, SHEET_NAME_MAX);

        assert_eq!(first.chars().count(), SHEET_NAME_MAX);
        assert!(second.ends_with("_2"));
        assert!(third.ends_with("_3"));
        assert!(second.chars().count() <= SHEET_NAME_MAX);
        assert!(third.chars().count() <= SHEET_NAME_MAX);
        assert_ne!(first, second);
        assert_ne!(second, third);
    }
}
