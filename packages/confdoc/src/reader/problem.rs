//! Problem reporting: where reader failures end up.
//!
//! The reader never aborts on a failing directive by itself. Each failure is
//! turned into a [`Problem`] and handed to a [`ProblemReporter`], which
//! decides whether to collect it and continue or to escalate it.

use std::error::Error as _;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use roxmltree::Node;
use serde::Serialize;

use crate::error::{ProblemKind, ReaderError, Result};
use crate::resource::Resource;
use crate::xml::{position, qualified_tag_name};

/// Where in which document a problem was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    /// Resource description, e.g. `file [/etc/app/beans.xml]`.
    pub resource: String,
    /// Qualified tag name of the offending element.
    pub element: String,
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    /// Location of an element within a resource.
    #[must_use]
    pub fn of(node: Node<'_, '_>, resource: &Resource) -> Self {
        let (line, column) = position(node);
        Self {
            resource: resource.description().to_string(),
            element: qualified_tag_name(node),
            line,
            column,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{}> in {} at line {}, column {}",
            self.element, self.resource, self.line, self.column
        )
    }
}

/// A failure found while reading a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Problem {
    pub kind: ProblemKind,
    pub message: String,
    pub location: SourceLocation,
    /// Underlying cause chain, if the failure wraps another error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

impl Problem {
    /// Build a problem from an error raised while processing `node`.
    #[must_use]
    pub fn from_error(error: &ReaderError, node: Node<'_, '_>, resource: &Resource) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
            location: SourceLocation::of(node, resource),
            cause: cause_chain(error),
        }
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.location)?;
        if let Some(cause) = &self.cause {
            write!(f, "; caused by: {cause}")?;
        }
        Ok(())
    }
}

fn cause_chain(error: &ReaderError) -> Option<String> {
    let mut causes = Vec::new();
    let mut current = error.source();
    while let Some(cause) = current {
        causes.push(cause.to_string());
        current = cause.source();
    }
    if causes.is_empty() {
        None
    } else {
        Some(causes.join(": "))
    }
}

/// Sink for problems found while reading.
pub trait ProblemReporter: Send + Sync {
    /// Report an error.
    ///
    /// Returning `Err` escalates: the reader stops and hands the error to
    /// its caller.
    fn error(&self, problem: Problem) -> Result<()>;

    /// Report a warning. Warnings never escalate.
    fn warning(&self, problem: Problem) {
        tracing::warn!(
            kind = problem.kind.as_str(),
            location = %problem.location,
            "{}",
            problem.message
        );
    }
}

/// Reporter that records every problem and lets reading continue.
///
/// Warnings are kept apart from errors and do not count towards [`len`](Self::len).
#[derive(Debug, Default)]
pub struct CollectingProblemReporter {
    problems: Mutex<Vec<Problem>>,
    warnings: Mutex<Vec<Problem>>,
}

impl CollectingProblemReporter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all problems reported so far.
    #[must_use]
    pub fn problems(&self) -> Vec<Problem> {
        self.problems
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Remove and return all recorded problems.
    pub fn take(&self) -> Vec<Problem> {
        std::mem::take(&mut *self.problems.lock().unwrap_or_else(PoisonError::into_inner))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.problems
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Kinds of the recorded problems, in report order.
    #[must_use]
    pub fn kinds(&self) -> Vec<ProblemKind> {
        self.problems().iter().map(|p| p.kind).collect()
    }

    /// Messages of the recorded problems, in report order.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.problems().into_iter().map(|p| p.message).collect()
    }

    /// Copy of all warnings reported so far.
    #[must_use]
    pub fn warnings(&self) -> Vec<Problem> {
        self.warnings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ProblemReporter for CollectingProblemReporter {
    fn error(&self, problem: Problem) -> Result<()> {
        tracing::debug!(
            kind = problem.kind.as_str(),
            location = %problem.location,
            "{}",
            problem.message
        );
        self.problems
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(problem);
        Ok(())
    }

    fn warning(&self, problem: Problem) {
        tracing::warn!(
            kind = problem.kind.as_str(),
            location = %problem.location,
            "{}",
            problem.message
        );
        self.warnings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(problem);
    }
}

/// Reporter that escalates the first error.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailFastProblemReporter;

impl ProblemReporter for FailFastProblemReporter {
    fn error(&self, problem: Problem) -> Result<()> {
        Err(ReaderError::Escalated(Box::new(problem)))
    }
}
