//! The structured reporter (spec.md §6's "Structured" format): a single
//! `{ "leaks": [...], "summary": {...} }` object.

use serde::Serialize;

use leakcheck_analyze::Leak;
use leakcheck_util::Severity;

#[derive(Serialize)]
struct Report<'a> {
    leaks: &'a [Leak],
    summary: Summary,
}

#[derive(Serialize)]
struct Summary {
    total_issues: usize,
    errors: usize,
    warnings: usize,
}

/// Renders `leaks` as a pretty-printed JSON report. `leaks` is always
/// present in the output, even when empty (never serialized as null).
pub fn render(leaks: &[Leak]) -> String {
    let errors = leaks.iter().filter(|l| l.severity == Severity::Error).count();
    let warnings = leaks.len() - errors;

    let report = Report {
        leaks,
        summary: Summary {
            total_issues: leaks.len(),
            errors,
            warnings,
        },
    };

    serde_json::to_string_pretty(&report).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leak(severity: Severity) -> Leak {
        Leak {
            file: "widget.h".to_string(),
            line: 10,
            class: "Widget".to_string(),
            variable: "data".to_string(),
            reason: "allocated with 'new' but not deleted in destructor".to_string(),
            severity,
        }
    }

    #[test]
    fn empty_leaks_serializes_to_empty_array_not_null() {
        let rendered = render(&[]);
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["leaks"], serde_json::json!([]));
        assert_eq!(value["summary"]["total_issues"], 0);
    }

    #[test]
    fn counts_errors_and_warnings_separately() {
        let leaks = vec![
            leak(Severity::Error),
            leak(Severity::Warning),
            leak(Severity::Error),
        ];
        let rendered = render(&leaks);
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["summary"]["total_issues"], 3);
        assert_eq!(value["summary"]["errors"], 2);
        assert_eq!(value["summary"]["warnings"], 1);
    }

    #[test]
    fn leak_object_has_exactly_the_spec_keys() {
        let rendered = render(&[leak(Severity::Error)]);
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        let obj = value["leaks"][0].as_object().unwrap();
        let mut keys: Vec<_> = obj.keys().cloned().collect();
        keys.sort();
        assert_eq!(
            keys,
            vec!["class", "file", "line", "reason", "severity", "variable"]
        );
    }

    #[test]
    fn is_pretty_printed_with_two_space_indentation() {
        let rendered = render(&[leak(Severity::Error)]);
        assert!(rendered.contains("\n  \""));
    }
}
