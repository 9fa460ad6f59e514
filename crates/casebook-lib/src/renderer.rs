//! HTML report rendering
//!
//! The report is a template holding two markers, each exactly once.
//! [`SUMMARY_MARKER`] receives the pretty-printed run summary and
//! [`CLASS_SET_MARKER`] receives the class filter entries. Each token is
//! replaced in place, so text around it on the same line is kept and both
//! markers may share a line:
//!
//! ```text
//!     summary: #CaseSummaryString,
//!     caseSetList: #CaseSetListString,
//! ```
//!
//! Every other byte of the template is copied unchanged.

use crate::error::{ReportError, ReportResult};
use crate::summary::{class_set, RunSummary};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Marker replaced by the run summary JSON
pub const SUMMARY_MARKER: &str = "#CaseSummaryString";

/// Marker replaced by the class-set JSON
pub const CLASS_SET_MARKER: &str = "#CaseSetListString";

/// Report filename used when none is configured
pub const DEFAULT_REPORT_FILENAME: &str = "report.html";

/// Renders a [`RunSummary`] through a marker template
#[derive(Debug, Clone)]
pub struct ReportRenderer {
    template_path: PathBuf,
}

impl ReportRenderer {
    pub fn new(template_path: impl Into<PathBuf>) -> Self {
        Self {
            template_path: template_path.into(),
        }
    }

    pub fn template_path(&self) -> &Path {
        &self.template_path
    }

    /// Render the report in memory
    pub fn render_to_bytes(&self, summary: &RunSummary, class_list: &[String]) -> ReportResult<Vec<u8>> {
        let template = std::fs::read(&self.template_path)
            .map_err(|e| ReportError::template_read(&self.template_path, e))?;

        let summary_json = to_pretty_json(summary)?;
        let class_set_json = to_pretty_json(&class_set(class_list))?;

        substitute(&template, &summary_json, &class_set_json, &self.template_path)
    }

    /// Render and write the report to `output_path`, returning its absolute path.
    ///
    /// Nothing is written unless the whole report rendered. The file is
    /// written next to its destination and moved into place in one step.
    pub fn render(
        &self,
        summary: &RunSummary,
        class_list: &[String],
        output_path: &Path,
    ) -> ReportResult<PathBuf> {
        let content = self.render_to_bytes(summary, class_list)?;

        let output_path =
            std::path::absolute(output_path).map_err(|e| ReportError::output_write(output_path, e))?;
        let dir = output_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        std::fs::create_dir_all(&dir).map_err(|e| ReportError::output_write(&output_path, e))?;

        let mut staged = tempfile::Builder::new()
            .prefix(".casebook-")
            .suffix(".tmp")
            .tempfile_in(&dir)
            .map_err(|e| ReportError::output_write(&output_path, e))?;
        staged
            .write_all(&content)
            .and_then(|_| staged.flush())
            .map_err(|e| ReportError::output_write(&output_path, e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            staged
                .as_file()
                .set_permissions(std::fs::Permissions::from_mode(0o644))
                .map_err(|e| ReportError::output_write(&output_path, e))?;
        }

        staged
            .persist(&output_path)
            .map_err(|e| ReportError::output_write(&output_path, e.error))?;

        info!(
            path = %output_path.display(),
            bytes = content.len(),
            "Report written"
        );
        Ok(output_path)
    }
}

/// Pretty JSON with four-space indentation; non-ASCII text is kept as is.
///
/// Every `<` is written as `\u003c` so a string holding `</script>` cannot
/// close the inline script the JSON lands in. `<` only occurs inside JSON
/// strings, where the escape decodes to the same value.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> ReportResult<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(escape_script_close(buf))
}

fn escape_script_close(json: Vec<u8>) -> Vec<u8> {
    if !json.contains(&b'<') {
        return json;
    }
    let mut out = Vec::with_capacity(json.len() + 16);
    for byte in json {
        if byte == b'<' {
            out.extend_from_slice(b"\\u003c");
        } else {
            out.push(byte);
        }
    }
    out
}

/// Replace both marker tokens in `template`, leaving every other byte untouched.
///
/// Each marker must appear exactly once. Both markers may share a line.
pub fn substitute(
    template: &[u8],
    summary_json: &[u8],
    class_set_json: &[u8],
    template_path: &Path,
) -> ReportResult<Vec<u8>> {
    let mut out = Vec::with_capacity(template.len() + summary_json.len() + class_set_json.len());
    let mut summary_seen = false;
    let mut class_set_seen = false;

    for line in template.split_inclusive(|&b| b == b'\n') {
        let mut hits = Vec::with_capacity(2);
        for (marker, json, seen) in [
            (SUMMARY_MARKER, summary_json, &mut summary_seen),
            (CLASS_SET_MARKER, class_set_json, &mut class_set_seen),
        ] {
            let Some(pos) = find(line, marker.as_bytes()) else {
                continue;
            };
            let again = find(&line[pos + marker.len()..], marker.as_bytes()).is_some();
            if *seen || again {
                return Err(ReportError::DuplicateMarker {
                    path: template_path.to_path_buf(),
                    marker,
                });
            }
            *seen = true;
            hits.push((pos, marker.len(), json));
        }

        if hits.is_empty() {
            out.extend_from_slice(line);
            continue;
        }
        hits.sort_by_key(|&(pos, _, _)| pos);
        let mut copied = 0;
        for (pos, len, json) in hits {
            out.extend_from_slice(&line[copied..pos]);
            out.extend_from_slice(json);
            copied = pos + len;
        }
        out.extend_from_slice(&line[copied..]);
    }

    for (seen, marker) in [(summary_seen, SUMMARY_MARKER), (class_set_seen, CLASS_SET_MARKER)] {
        if !seen {
            return Err(ReportError::MissingMarker {
                path: template_path.to_path_buf(),
                marker,
            });
        }
    }

    debug!(bytes = out.len(), "Template substituted");
    Ok(out)
}

/// Configured filename, defaulted and forced to end in `.html`
pub fn report_filename(filename: Option<&str>) -> String {
    match filename.filter(|f| !f.is_empty()) {
        None => DEFAULT_REPORT_FILENAME.to_string(),
        Some(f) if f.ends_with(".html") => f.to_string(),
        Some(f) => format!("{f}.html"),
    }
}

/// Absolute report path for `report_dir` and the configured filename
pub fn resolve_report_path(report_dir: &Path, filename: Option<&str>) -> std::io::Result<PathBuf> {
    std::path::absolute(report_dir.join(report_filename(filename)))
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
