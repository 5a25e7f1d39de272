use leakcheck_util::Severity;

/// One reported defect, ready for a reporter to render.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Leak {
    pub file: String,
    pub line: u32,
    pub class: String,
    pub variable: String,
    pub reason: String,
    pub severity: Severity,
}
