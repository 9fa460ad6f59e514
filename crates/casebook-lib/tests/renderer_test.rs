//! Tests for report rendering

use casebook_lib::renderer::{resolve_report_path, to_pretty_json};
use casebook_lib::{
    CaseDescriptor, CaseFailure, ReportError, ReportRenderer, RunAggregator, RunListener,
    RunSummary, ALL_CLASSES_LABEL, CLASS_SET_MARKER, SUMMARY_MARKER,
};
use serde_json::{json, Value};
use std::path::Path;

fn finished_summary() -> RunSummary {
    let mut agg = RunAggregator::new().with_name("render");
    agg.on_run_start();

    let pass = CaseDescriptor::new("m", "Suite", "ok").with_doc("title: 通过\ntag: a,b");
    agg.on_case_start(&pass);
    agg.on_success(&pass);
    agg.on_case_finish(&pass);

    let fail = CaseDescriptor::new("m", "Other", "bad").with_class_doc("title: Other suite");
    agg.on_case_start(&fail);
    agg.on_failure(&fail, &CaseFailure::new("panic", "boom", "panicked at x"));
    agg.on_case_finish(&fail);

    agg.on_run_finish();
    agg.into_summary()
}

fn write_template(dir: &Path, content: &str) -> std::path::PathBuf {
    let path = dir.join("template.html");
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_round_trip_with_bare_marker_lines() {
    let dir = tempfile::tempdir().unwrap();
    let template = format!(
        "<html>\r\n<script>\n  const data = {{\n{SUMMARY_MARKER}\n  }};\n{CLASS_SET_MARKER}\n</script>\n</html>"
    );
    let template_path = write_template(dir.path(), &template);
    let summary = finished_summary();

    let out = ReportRenderer::new(&template_path)
        .render(&summary, &summary.class_list, &dir.path().join("out.html"))
        .unwrap();
    assert!(out.is_absolute());

    let rendered = std::fs::read_to_string(&out).unwrap();
    let summary_json = String::from_utf8(to_pretty_json(&summary).unwrap()).unwrap();
    let class_set_json = String::from_utf8(to_pretty_json(&summary.class_set()).unwrap()).unwrap();

    let expected = format!(
        "<html>\r\n<script>\n  const data = {{\n{summary_json}\n  }};\n{class_set_json}\n</script>\n</html>"
    );
    assert_eq!(rendered, expected);

    let parsed: Value = serde_json::from_str(&summary_json).unwrap();
    assert_eq!(parsed, serde_json::to_value(&summary).unwrap());
    assert_eq!(parsed["result"]["testRun"], 2);
    assert_eq!(parsed["success"], false);
    assert_eq!(parsed["details"][0]["name"], "通过");
    assert_eq!(parsed["details"][0]["status"], "pass");
    assert_eq!(parsed["details"][1]["reason"], "boom");
    assert_eq!(parsed["details"][1]["excInfo"], "panicked at x");

    let classes: Value = serde_json::from_str(&class_set_json).unwrap();
    assert_eq!(
        classes,
        json!([
            {"key": null, "value": ALL_CLASSES_LABEL},
            {"key": "Suite", "value": "Suite"},
            {"key": "Other suite", "value": "Other suite"},
        ])
    );
}

#[test]
fn test_marker_framing_is_preserved() {
    let dir = tempfile::tempdir().unwrap();
    let template = format!("    summary: {SUMMARY_MARKER},\n    caseSetList: {CLASS_SET_MARKER},\n");
    let template_path = write_template(dir.path(), &template);
    let summary = RunSummary::default();

    let bytes = ReportRenderer::new(&template_path)
        .render_to_bytes(&summary, &[])
        .unwrap();
    let rendered = String::from_utf8(bytes).unwrap();

    assert!(rendered.starts_with("    summary: {\n"));
    assert!(rendered.ends_with(
        "    caseSetList: [\n    {\n        \"key\": null,\n        \"value\": \"\\u003cAll>\"\n    }\n],\n"
    ));
}

#[test]
fn test_summary_schema_keys() {
    let summary = finished_summary();
    let value = serde_json::to_value(&summary).unwrap();

    for key in ["name", "success", "result", "time", "details", "classList"] {
        assert!(value.get(key).is_some(), "missing summary key {key}");
    }
    for key in ["beginTime", "finishTime", "duration"] {
        assert!(value["time"].get(key).is_some(), "missing time key {key}");
    }
    let detail = &value["details"][0];
    for key in [
        "name", "casePath", "description", "status", "tags", "level", "time", "className",
        "classDocs", "moduleName", "code", "output", "excInfo", "reason",
    ] {
        assert!(detail.get(key).is_some(), "missing detail key {key}");
    }
    assert!(detail.get("classPath").is_none());
    assert_eq!(detail["casePath"], "m::Suite::ok");
    assert_eq!(detail["tags"], json!(["a", "b"]));
    assert_eq!(detail["level"], 2);
}

#[test]
fn test_missing_marker_is_fatal_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let template_path = write_template(dir.path(), &format!("<html>\n{SUMMARY_MARKER}\n</html>\n"));
    let output = dir.path().join("report.html");

    let err = ReportRenderer::new(&template_path)
        .render(&RunSummary::default(), &[], &output)
        .unwrap_err();

    assert!(matches!(err, ReportError::MissingMarker { marker, .. } if marker == CLASS_SET_MARKER));
    assert!(!output.exists());
}

#[test]
fn test_duplicate_marker_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let template_path = write_template(
        dir.path(),
        &format!("{SUMMARY_MARKER}\n{CLASS_SET_MARKER}\n{SUMMARY_MARKER}\n"),
    );

    let err = ReportRenderer::new(&template_path)
        .render_to_bytes(&RunSummary::default(), &[])
        .unwrap_err();
    assert!(matches!(err, ReportError::DuplicateMarker { marker, .. } if marker == SUMMARY_MARKER));
}

#[test]
fn test_unreadable_template_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let err = ReportRenderer::new(dir.path().join("absent.html"))
        .render_to_bytes(&RunSummary::default(), &[])
        .unwrap_err();
    assert!(matches!(err, ReportError::TemplateRead { .. }));
}

#[test]
fn test_render_creates_report_dir_and_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    let template_path = write_template(dir.path(), &format!("{SUMMARY_MARKER}\n{CLASS_SET_MARKER}\n"));
    let output = resolve_report_path(&dir.path().join("nested/reports"), Some("nightly")).unwrap();
    assert!(output.ends_with("nested/reports/nightly.html"));

    std::fs::create_dir_all(output.parent().unwrap()).unwrap();
    std::fs::write(&output, "stale").unwrap();

    let written = ReportRenderer::new(&template_path)
        .render(&RunSummary::default(), &[], &output)
        .unwrap();
    assert_eq!(written, output);

    let rendered = std::fs::read_to_string(&output).unwrap();
    assert!(rendered.contains("\"classList\": []"));

    let leftovers: Vec<_> = std::fs::read_dir(output.parent().unwrap())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn test_script_close_in_case_data_stays_inside_script() {
    let dir = tempfile::tempdir().unwrap();
    let template = format!(
        "<script>\n  const report = {{\n    summary: {SUMMARY_MARKER},\n    caseSetList: {CLASS_SET_MARKER},\n  }};\n</script>\n"
    );
    let template_path = write_template(dir.path(), &template);

    let mut agg = RunAggregator::new();
    agg.on_run_start();
    let case = CaseDescriptor::new("m", "Markup", "closes_tag");
    agg.on_case_start(&case);
    agg.on_failure(
        &case,
        &CaseFailure::new("panic", "<div></div></script><b>x</b>", "panicked at </script>"),
    );
    agg.on_case_finish(&case);
    agg.on_run_finish();
    let summary = agg.into_summary();

    let bytes = ReportRenderer::new(&template_path)
        .render_to_bytes(&summary, &summary.class_list)
        .unwrap();
    let rendered = String::from_utf8(bytes).unwrap();

    let close = rendered.find("</script>").unwrap();
    assert!(close > rendered.find("caseSetList").unwrap());
    assert_eq!(rendered.matches("</script>").count(), 1);

    let json_start = rendered.find("summary: ").unwrap() + "summary: ".len();
    let json_end = rendered.find(",\n    caseSetList").unwrap();
    let parsed: Value = serde_json::from_str(&rendered[json_start..json_end]).unwrap();
    assert_eq!(parsed["details"][0]["reason"], "<div></div></script><b>x</b>");
    assert_eq!(parsed["details"][0]["excInfo"], "panicked at </script>");
}

#[test]
fn test_both_markers_on_one_line() {
    let dir = tempfile::tempdir().unwrap();
    let template = format!("<script>\nconst r = {{ s: {SUMMARY_MARKER}, c: {CLASS_SET_MARKER} }};\n</script>\n");
    let template_path = write_template(dir.path(), &template);
    let summary = RunSummary::default();

    let bytes = ReportRenderer::new(&template_path)
        .render_to_bytes(&summary, &[])
        .unwrap();
    let rendered = String::from_utf8(bytes).unwrap();

    let summary_json = String::from_utf8(to_pretty_json(&summary).unwrap()).unwrap();
    let class_set_json = String::from_utf8(to_pretty_json(&summary.class_set()).unwrap()).unwrap();
    assert_eq!(
        rendered,
        format!("<script>\nconst r = {{ s: {summary_json}, c: {class_set_json} }};\n</script>\n")
    );
}

#[test]
fn test_class_set_marker_before_summary_on_one_line() {
    let dir = tempfile::tempdir().unwrap();
    let template_path = write_template(dir.path(), &format!("[{CLASS_SET_MARKER}, {SUMMARY_MARKER}]\n"));
    let summary = RunSummary::default();

    let bytes = ReportRenderer::new(&template_path)
        .render_to_bytes(&summary, &[])
        .unwrap();
    let documents: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(documents[0], json!([{"key": null, "value": ALL_CLASSES_LABEL}]));
    assert_eq!(documents[1], serde_json::to_value(&summary).unwrap());
}

#[test]
fn test_repeated_marker_on_one_line_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let template_path = write_template(
        dir.path(),
        &format!("{SUMMARY_MARKER} {SUMMARY_MARKER}\n{CLASS_SET_MARKER}\n"),
    );

    let err = ReportRenderer::new(&template_path)
        .render_to_bytes(&RunSummary::default(), &[])
        .unwrap_err();
    assert!(matches!(err, ReportError::DuplicateMarker { marker, .. } if marker == SUMMARY_MARKER));
}
