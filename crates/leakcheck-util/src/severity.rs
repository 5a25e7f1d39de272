//! Defect severity.

/// How serious a reported defect is.
///
/// `Error` marks defects the analyzer is confident are real bugs (a missing
/// deallocation, an arity mismatch, a double free). `Warning` marks cases
/// where the rule is intentionally conservative (scalar allocated but freed
/// with `delete[]`, a reassignment the analyzer can't rule out on some
/// control-flow path).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    /// The bracketed icon used by the human reporter.
    ///
    /// The warning icon carries a trailing space so both icons print at the
    /// same width (`[ERROR]` and `[WARN] ` are both seven characters).
    pub const fn icon(self) -> &'static str {
        match self {
            Severity::Error => "[ERROR]",
            Severity::Warning => "[WARN] ",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}
