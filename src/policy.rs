//! What to do when a reference does not resolve.

use crate::error::CocoMergeError;
use crate::report::{RunIssue, RunIssueCode, RunReport};

/// Handling of annotations whose image or category reference matches
/// nothing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReferencePolicy {
    /// Leave the field out, log a warning and record it in the report.
    #[default]
    Lenient,
    /// Abort the run with [`CocoMergeError::UnresolvedReference`].
    Strict,
}

impl ReferencePolicy {
    /// Applies the policy to a lookup result.
    ///
    /// `Some` passes through. `None` becomes an error under `Strict`, or a
    /// report warning under `Lenient`.
    pub(crate) fn settle<T>(
        self,
        found: Option<T>,
        stage: &'static str,
        annotation: u64,
        code: RunIssueCode,
        reference: impl FnOnce() -> String,
        report: &mut RunReport,
    ) -> Result<Option<T>, CocoMergeError> {
        if found.is_some() {
            return Ok(found);
        }

        let reference = reference();
        match self {
            ReferencePolicy::Strict => Err(CocoMergeError::UnresolvedReference {
                stage,
                annotation,
                reference,
            }),
            ReferencePolicy::Lenient => {
                log::warn!("{stage}: annotation {annotation} has unresolved {reference}");
                report.add(RunIssue::warning(
                    code,
                    format!("annotation {annotation}: unresolved {reference}"),
                ));
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn found_values_pass_through() {
        let mut report = RunReport::new("merge");
        let got = ReferencePolicy::Strict
            .settle(Some(3), "merge", 1, RunIssueCode::UnresolvedImage, String::new, &mut report)
            .unwrap();
        assert_eq!(got, Some(3));
        assert!(report.is_clean());
    }

    #[test]
    fn lenient_records_a_warning() {
        let mut report = RunReport::new("merge");
        let got: Option<u64> = ReferencePolicy::Lenient
            .settle(
                None,
                "merge",
                4,
                RunIssueCode::UnresolvedCategory,
                || "category 'dog'".to_string(),
                &mut report,
            )
            .unwrap();
        assert_eq!(got, None);
        assert_eq!(report.count_of(RunIssueCode::UnresolvedCategory), 1);
        assert!(report.issues[0].message.contains("category 'dog'"));
    }

    #[test]
    fn strict_fails() {
        let mut report = RunReport::new("resolve");
        let err = ReferencePolicy::Strict
            .settle::<u64>(
                None,
                "resolve",
                2,
                RunIssueCode::UnresolvedImage,
                || "image id 9".to_string(),
                &mut report,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            CocoMergeError::UnresolvedReference { annotation: 2, .. }
        ));
    }
}
