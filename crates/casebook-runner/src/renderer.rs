use ascii_tree::{write_tree, Tree};
use casebook_lib::{CaseRecord, CaseStatus, RunSummary};
use tracing::warn;

/// Renders a `RunSummary` into a human-readable ASCII tree.
///
/// One node per class in first-seen order, one leaf per case. Gives a quick
/// overview of the run in the terminal next to the HTML report.
pub fn render_summary_as_tree(summary: &RunSummary) -> String {
    let status_icon = if summary.success { "✅" } else { "❌" };
    let counts = &summary.result;
    let duration = summary.time.duration.unwrap_or_default();
    let root_label = format!(
        "{} {} ({} run: {} passed, {} failed, {} skipped) in {:.3}s",
        status_icon,
        summary.name.as_deref().unwrap_or("Test run"),
        counts.test_run,
        counts.successes,
        counts.failures,
        counts.skipped,
        duration
    );

    let class_nodes = summary
        .class_list
        .iter()
        .map(|class_name| {
            let leaves = summary
                .details
                .iter()
                .filter(|record| &record.class_name == class_name)
                .map(render_case_leaf)
                .collect();
            Tree::Node(class_name.clone(), leaves)
        })
        .collect();

    let tree = Tree::Node(root_label, class_nodes);
    let mut buffer = String::new();
    if let Err(e) = write_tree(&mut buffer, &tree) {
        warn!(error = %e, "Failed to render summary tree");
    }
    buffer
}

fn status_icon(status: CaseStatus) -> &'static str {
    match status {
        CaseStatus::Pass => "✅",
        CaseStatus::Fail => "❌",
        CaseStatus::Skip => "⏭️",
        CaseStatus::Pending => "⏳",
    }
}

/// Renders a single case into a leaf; the reason goes on its own line
fn render_case_leaf(record: &CaseRecord) -> Tree {
    let title = if record.title.is_empty() {
        record.id.as_str()
    } else {
        record.title.as_str()
    };
    let mut lines = vec![format!(
        "{} [{}] {} ({:.3}s)",
        status_icon(record.status),
        record.status,
        title,
        record.time.duration.unwrap_or_default()
    )];
    if let Some(reason) = &record.reason {
        lines.push(format!("   {reason}"));
    }
    Tree::Leaf(lines)
}
