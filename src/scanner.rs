use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::lang::{BoundaryStyle, LanguageProfile};

/// One detected function. Line numbers are 1-indexed and `end_line` is
/// inclusive, so `size == end_line - start_line + 1` always holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionRecord {
    pub name: String,
    pub path: PathBuf,
    pub start_line: u32,
    pub end_line: u32,
    pub size: u32,
}

impl FunctionRecord {
    fn new(name: String, path: &Path, start: usize, end: usize) -> Self {
        // start/end are 0-based line indices here
        FunctionRecord {
            name,
            path: path.to_path_buf(),
            start_line: (start + 1) as u32,
            end_line: (end + 1) as u32,
            size: (end - start + 1) as u32,
        }
    }
}

/// Scans file content with the language's boundary heuristic. `path` is
/// stamped onto every record as-is; the walker passes repo-relative paths.
pub fn scan_source(profile: &LanguageProfile, path: &Path, content: &str) -> Vec<FunctionRecord> {
    let lines: Vec<&str> = content.lines().collect();
    match profile.style {
        BoundaryStyle::Brace => scan_brace(profile, path, &lines),
        BoundaryStyle::Indent => scan_indent(profile, path, &lines),
    }
}

fn match_header(profile: &LanguageProfile, line: &str) -> Option<String> {
    // First matching pattern wins.
    profile
        .headers
        .iter()
        .find_map(|re| re.captures(line))
        .map(|caps| caps[1].to_string())
}

fn brace_delta(line: &str) -> i32 {
    let opens = line.matches('{').count() as i32;
    let closes = line.matches('}').count() as i32;
    opens - closes
}

fn paren_delta(line: &str) -> i32 {
    let opens = line.matches('(').count() as i32;
    let closes = line.matches(')').count() as i32;
    opens - closes
}

fn indent_width(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

/// Brace-counted scanning for JS/TS/Java-like sources. Tracks at most one
/// function at a time; scanning resumes on the line after a recorded body.
fn scan_brace(profile: &LanguageProfile, path: &Path, lines: &[&str]) -> Vec<FunctionRecord> {
    let mut records = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        let Some(name) = match_header(profile, lines[i]) else {
            i += 1;
            continue;
        };

        let mut depth = brace_delta(lines[i]);
        if depth == 0 {
            // Whole body on the header line
            records.push(FunctionRecord::new(name, path, i, i));
            i += 1;
            continue;
        }

        let mut end = None;
        let mut j = i + 1;
        while j < lines.len() {
            depth += brace_delta(lines[j]);
            if depth <= 0 {
                if depth == 0 {
                    end = Some(j);
                }
                break;
            }
            j += 1;
        }

        match end {
            Some(end) => {
                records.push(FunctionRecord::new(name, path, i, end));
                i = end + 1;
            }
            // Body never closed before EOF: discard the candidate
            None => i += 1,
        }
    }
    records
}

/// Indentation-scoped scanning for Python-like sources. Supports multi-line
/// signatures by tracking paren balance until a colon closes the header.
fn scan_indent(profile: &LanguageProfile, path: &Path, lines: &[&str]) -> Vec<FunctionRecord> {
    let mut records = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        let Some(name) = match_header(profile, lines[i]) else {
            i += 1;
            continue;
        };

        let base_indent = indent_width(lines[i]);

        // Close the signature: a multi-line parameter list keeps the paren
        // balance open until the line holding the colon at zero balance.
        let mut sig_end = i;
        let mut balance = paren_delta(lines[i]);
        if balance != 0 {
            let mut closed = false;
            let mut j = i + 1;
            while j < lines.len() {
                balance += paren_delta(lines[j]);
                if balance == 0 && lines[j].contains(':') {
                    sig_end = j;
                    closed = true;
                    break;
                }
                j += 1;
            }
            if !closed {
                i += 1;
                continue;
            }
        }

        // Body: blank and comment-only lines never decide the boundary. The
        // first substantive line at or below the base indent ends the
        // function just before it.
        let mut last_substantive = sig_end;
        let mut end = None;
        let mut j = sig_end + 1;
        while j < lines.len() {
            let trimmed = lines[j].trim_start();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                j += 1;
                continue;
            }
            if indent_width(lines[j]) <= base_indent {
                end = Some(last_substantive);
                break;
            }
            last_substantive = j;
            j += 1;
        }

        let end = end.unwrap_or(last_substantive);
        records.push(FunctionRecord::new(name, path, i, end));
        i = end + 1;
    }
    records
}
