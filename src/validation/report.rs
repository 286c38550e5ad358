//! Validation report types for structured error reporting.
//!
//! This module provides rich, structured validation results that can be
//! displayed to users, written to files, or processed programmatically.

use std::fmt;

/// The result of validating an annotation tree.
///
/// Contains all issues found during validation, categorized by severity.
#[derive(Clone, Debug, Default)]
pub struct ValidationReport {
    /// All issues found during validation.
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Creates a new empty report.
    pub fn new() -> Self {
        Self { issues: Vec::new() }
    }

    /// Adds an issue to the report.
    pub fn add(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    /// Returns the number of errors in the report.
    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count()
    }

    /// Returns the number of warnings in the report.
    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }

    /// Returns true if there are no errors.
    pub fn is_ok(&self) -> bool {
        self.error_count() == 0
    }

    /// Returns true if there are no issues at all.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.issues.is_empty() {
            return writeln!(f, "Validation passed: no issues found");
        }

        writeln!(
            f,
            "Validation completed with {} error(s) and {} warning(s):",
            self.error_count(),
            self.warning_count()
        )?;
        writeln!(f)?;

        for issue in &self.issues {
            writeln!(f, "  {}", issue)?;
        }

        Ok(())
    }
}

/// A single validation issue (error or warning).
#[derive(Clone, Debug)]
pub struct ValidationIssue {
    /// The severity of the issue.
    pub severity: Severity,

    /// A stable code for the issue type.
    pub code: IssueCode,

    /// A human-readable description of the issue.
    pub message: String,

    /// Context about where the issue occurred.
    pub context: IssueContext,
}

impl ValidationIssue {
    /// Creates a new validation issue.
    pub fn new(
        severity: Severity,
        code: IssueCode,
        message: impl Into<String>,
        context: IssueContext,
    ) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            context,
        }
    }

    /// Creates a new error.
    pub fn error(code: IssueCode, message: impl Into<String>, context: IssueContext) -> Self {
        Self::new(Severity::Error, code, message, context)
    }

    /// Creates a new warning.
    pub fn warning(code: IssueCode, message: impl Into<String>, context: IssueContext) -> Self {
        Self::new(Severity::Warning, code, message, context)
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARN ",
        };
        write!(
            f,
            "[{}] {:?} in {}: {}",
            severity, self.code, self.context, self.message
        )
    }
}

/// The severity of a validation issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    /// A warning that doesn't block use but may indicate problems.
    Warning,
    /// An error that indicates invalid or corrupt annotation state.
    Error,
}

/// A stable code identifying the type of validation issue.
///
/// These codes can be used for filtering, ignoring specific issues,
/// or programmatic handling of validation results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IssueCode {
    // Identity issues
    /// Multiple regions share the same result id.
    DuplicateResultId,
    /// A region has an empty result id.
    EmptyResultId,

    // Geometry issues
    /// Geometry contains non-finite coordinates (NaN or Infinity).
    GeometryNotFinite,
    /// Normalized geometry lies outside the 0–100 domain.
    GeometryOutOfDomain,
    /// Geometry has zero or negative extent.
    DegenerateGeometry,
    /// A closed polygon has fewer than three vertices.
    PolygonTooFewPoints,
    /// A brush mask's run lengths do not cover its raster grid.
    InconsistentMask,
    /// Rotation lies outside [0, 360).
    RotationOutOfRange,
    /// A region still carries legacy pixel-domain geometry.
    LegacyPixelGeometry,

    // Label issues
    /// A label state carries no values.
    EmptyLabelValues,

    // Relation issues
    /// A relation references a region that does not exist.
    MissingRelationEndpoint,
    /// A relation links a region to itself.
    SelfRelation,
}

/// Context about where a validation issue occurred.
#[derive(Clone, Debug)]
pub enum IssueContext {
    /// Issue with the annotation as a whole.
    Tree,
    /// Issue with a specific region, by result id.
    Region { id: String },
    /// Issue with a specific relation, by position.
    Relation { index: usize },
}

impl fmt::Display for IssueContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueContext::Tree => write!(f, "annotation"),
            IssueContext::Region { id } => write!(f, "region '{}'", id),
            IssueContext::Relation { index } => write!(f, "relation {}", index),
        }
    }
}
