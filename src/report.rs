//! Run reports for the resolve and merge stages.
//!
//! Neither stage fails on a dangling reference under the lenient policy,
//! so the report is where such problems surface. It tracks element counts
//! going in and coming out, plus one issue per notable event.

use serde::Serialize;
use std::fmt;

/// Summary of one resolve or merge run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct RunReport {
    /// Stage name (`resolve` or `merge`).
    pub stage: String,
    /// Number of documents processed.
    pub files: usize,
    /// Counts summed over all input documents.
    pub input: RunCounts,
    /// Counts over everything written out.
    pub output: RunCounts,
    pub issues: Vec<RunIssue>,
}

impl RunReport {
    pub fn new(stage: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            ..Default::default()
        }
    }

    pub fn add(&mut self, issue: RunIssue) {
        self.issues.push(issue);
    }

    /// Folds another report of the same stage into this one.
    pub fn absorb(&mut self, other: RunReport) {
        self.files += other.files;
        self.input += other.input;
        self.output += other.output;
        self.issues.extend(other.issues);
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == RunSeverity::Warning)
            .count()
    }

    pub fn info_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == RunSeverity::Info)
            .count()
    }

    /// Number of issues carrying the given code.
    pub fn count_of(&self, code: RunIssueCode) -> usize {
        self.issues.iter().filter(|i| i.code == code).count()
    }

    /// True when every reference resolved.
    pub fn is_clean(&self) -> bool {
        self.warning_count() == 0
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}: {} file(s)", self.stage, self.files)?;
        writeln!(
            f,
            "  input: {} images, {} categories, {} annotations",
            self.input.images, self.input.categories, self.input.annotations
        )?;
        if self.output != self.input {
            writeln!(
                f,
                "  output: {} images, {} categories, {} annotations",
                self.output.images, self.output.categories, self.output.annotations
            )?;
        }

        let warnings = self.warning_count();
        if warnings > 0 {
            writeln!(f)?;
            writeln!(f, "Warnings ({}):", warnings)?;
            for issue in self
                .issues
                .iter()
                .filter(|i| i.severity == RunSeverity::Warning)
            {
                writeln!(f, "  - {}", issue.message)?;
            }
        }

        let infos = self.info_count();
        if infos > 0 {
            writeln!(f)?;
            writeln!(f, "Notes ({}):", infos)?;
            for issue in self
                .issues
                .iter()
                .filter(|i| i.severity == RunSeverity::Info)
            {
                writeln!(f, "  - {}", issue.message)?;
            }
        }

        Ok(())
    }
}

/// Counts of document elements.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunCounts {
    pub images: usize,
    pub categories: usize,
    pub annotations: usize,
}

impl RunCounts {
    pub fn from_tuple((images, categories, annotations): (usize, usize, usize)) -> Self {
        Self {
            images,
            categories,
            annotations,
        }
    }
}

impl std::ops::AddAssign for RunCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.images += rhs.images;
        self.categories += rhs.categories;
        self.annotations += rhs.annotations;
    }
}

/// A single event worth reporting.
#[derive(Clone, Debug, Serialize)]
pub struct RunIssue {
    pub severity: RunSeverity,
    pub code: RunIssueCode,
    pub message: String,
}

impl RunIssue {
    pub fn warning(code: RunIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: RunSeverity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn info(code: RunIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: RunSeverity::Info,
            code,
            message: message.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunSeverity {
    /// Output is missing something the input implied.
    Warning,
    /// A policy was applied; nothing lost.
    Info,
}

/// Stable issue codes, part of the `--report json` schema.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunIssueCode {
    /// An annotation's image reference matched nothing.
    UnresolvedImage,
    /// An annotation's category reference matched nothing.
    UnresolvedCategory,
    /// A category name was already merged; the later entry was dropped.
    DuplicateCategory,
    /// Several merged images share a file name; name lookups pick the last.
    DuplicateFileName,
    /// Crowd flags were reset to 0 during merge.
    CrowdFlagReset,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report_is_clean() {
        let report = RunReport::new("merge");
        assert!(report.is_clean());
        assert_eq!(report.info_count(), 0);
    }

    #[test]
    fn warning_makes_report_unclean() {
        let mut report = RunReport::new("resolve");
        report.add(RunIssue::warning(
            RunIssueCode::UnresolvedImage,
            "annotation 3: no image with id 9",
        ));
        assert!(!report.is_clean());
        assert_eq!(report.count_of(RunIssueCode::UnresolvedImage), 1);
    }

    #[test]
    fn absorb_sums_counts_and_issues() {
        let mut total = RunReport::new("resolve");
        let mut one = RunReport::new("resolve");
        one.files = 1;
        one.input = RunCounts::from_tuple((1, 2, 3));
        one.add(RunIssue::info(RunIssueCode::DuplicateCategory, "dup"));

        total.absorb(one.clone());
        total.absorb(one);

        assert_eq!(total.files, 2);
        assert_eq!(total.input, RunCounts::from_tuple((2, 4, 6)));
        assert_eq!(total.info_count(), 2);
    }

    #[test]
    fn display_lists_warnings_then_notes() {
        let mut report = RunReport::new("merge");
        report.files = 2;
        report.add(RunIssue::info(RunIssueCode::DuplicateCategory, "dropped 'person'"));
        report.add(RunIssue::warning(RunIssueCode::UnresolvedCategory, "no 'dog'"));

        let text = report.to_string();
        let warn_at = text.find("Warnings (1):").expect("warnings section");
        let notes_at = text.find("Notes (1):").expect("notes section");
        assert!(warn_at < notes_at);
        assert!(text.starts_with("merge: 2 file(s)"));
    }

    #[test]
    fn report_serializes_to_json() {
        let mut report = RunReport::new("merge");
        report.add(RunIssue::info(RunIssueCode::CrowdFlagReset, "reset"));

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"stage\":\"merge\""));
        assert!(json.contains("\"severity\":\"info\""));
        assert!(json.contains("\"code\":\"crowd_flag_reset\""));
    }
}
