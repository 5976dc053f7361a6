//! Diagnostics collected while a resource operation runs.

use hemmer_provider_sdk::schema::{Diagnostic, DiagnosticSeverity};
use std::error::Error;
use std::fmt::Write as _;

/// Ordered collection of diagnostics from one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// A single error diagnostic.
    #[must_use]
    pub fn error(summary: impl Into<String>) -> Self {
        Self(vec![Diagnostic::error(summary)])
    }

    /// A single warning diagnostic.
    #[must_use]
    pub fn warning(summary: impl Into<String>) -> Self {
        Self(vec![Diagnostic::warning(summary)])
    }

    /// An error diagnostic from an error value. Its source chain becomes the detail.
    #[must_use]
    pub fn from_err(err: &dyn Error) -> Self {
        let mut diagnostic = Diagnostic::error(err.to_string());

        let mut detail = String::new();
        let mut source = err.source();
        while let Some(cause) = source {
            if !detail.is_empty() {
                detail.push_str(": ");
            }
            let _ = write!(detail, "{cause}");
            source = cause.source();
        }
        if !detail.is_empty() {
            diagnostic = diagnostic.with_detail(detail);
        }

        Self(vec![diagnostic])
    }

    /// Collect every failure from a batch of attribute writes.
    pub fn from_results<E: Error>(results: impl IntoIterator<Item = Result<(), E>>) -> Self {
        results
            .into_iter()
            .filter_map(Result::err)
            .map(|e| Diagnostic::error(e.to_string()))
            .collect()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.0.extend(other.0);
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    /// Error diagnostics only.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0
            .iter()
            .filter(|d| d.severity == DiagnosticSeverity::Error)
    }

    /// Warning diagnostics only.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0
            .iter()
            .filter(|d| d.severity == DiagnosticSeverity::Warning)
    }

    /// One line per error: `summary` or `summary: detail`, joined with `"; "`.
    #[must_use]
    pub fn error_message(&self) -> String {
        self.errors()
            .map(|d| match &d.detail {
                Some(detail) => format!("{}: {detail}", d.summary),
                None => d.summary.clone(),
            })
            .collect::<Vec<_>>()
            .join("; ")
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.0
    }
}

impl FromIterator<Diagnostic> for Diagnostics {
    fn from_iter<I: IntoIterator<Item = Diagnostic>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
