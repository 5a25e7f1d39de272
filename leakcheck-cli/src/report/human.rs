//! The human-readable grouped listing (spec.md §6's "Human" format).

use std::fmt::Write as _;

use leakcheck_analyze::Leak;
use leakcheck_util::Severity;

/// Renders `leaks` as the grouped, file-ordered human report.
pub fn render(leaks: &[Leak]) -> String {
    if leaks.is_empty() {
        return "[OK] No potential memory leaks detected.".to_string();
    }

    let mut sorted: Vec<&Leak> = leaks.iter().collect();
    sorted.sort_by(|a, b| (a.file.as_str(), a.line).cmp(&(b.file.as_str(), b.line)));

    let mut out = String::new();
    let mut current_file: Option<&str> = None;
    let mut errors = 0usize;
    let mut warnings = 0usize;

    for leak in &sorted {
        match leak.severity {
            Severity::Error => errors += 1,
            Severity::Warning => warnings += 1,
        }

        if current_file != Some(leak.file.as_str()) {
            if current_file.is_some() {
                out.push('\n');
            }
            let _ = writeln!(out, "{}", basename(&leak.file));
            current_file = Some(leak.file.as_str());
        }

        let _ = writeln!(
            out,
            "  {} Line {} [{}::{}]: {}",
            leak.severity.icon(),
            leak.line,
            leak.class,
            leak.variable,
            leak.reason
        );
    }

    let _ = write!(out, "Summary: {} error(s), {} warning(s)", errors, warnings);
    out
}

fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}
