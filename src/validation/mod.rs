//! Annotation validation for regionkit.
//!
//! This module provides comprehensive validation of annotation state,
//! checking for:
//! - Identity integrity (unique, non-empty result ids)
//! - Geometric validity (finite, in-domain, non-degenerate geometry)
//! - Mask consistency (run lengths covering the raster grid)
//! - Relation integrity (resolvable, non-self endpoints)

mod report;

pub use report::{IssueCode, IssueContext, Severity, ValidationIssue, ValidationReport};

use std::collections::HashMap;

use crate::geom::NORM_EXTENT;
use crate::region::{CoordMode, MaskData, Region, RegionId, Shape, MIN_POLYGON_POINTS};
use crate::relations::RelationGraph;
use crate::tree::AnnotationTree;

/// Options for validation behavior.
#[derive(Clone, Debug, Default)]
pub struct ValidateOptions {
    /// If true, treat warnings as errors.
    pub strict: bool,
}

/// Validates an annotation tree and returns a report of all issues found.
pub fn validate_tree(tree: &AnnotationTree, _opts: &ValidateOptions) -> ValidationReport {
    let mut report = ValidationReport::new();
    validate_regions(tree.regions(), &mut report);
    validate_relations(tree.regions(), tree.relations(), &mut report);
    report
}

/// Validates all regions.
fn validate_regions(regions: &[Region], report: &mut ValidationReport) {
    let mut seen_ids: HashMap<&str, usize> = HashMap::new();

    for (idx, region) in regions.iter().enumerate() {
        let context = || IssueContext::Region {
            id: region.result_id.clone(),
        };

        if region.result_id.is_empty() {
            report.add(ValidationIssue::error(
                IssueCode::EmptyResultId,
                format!("Region at index {idx} has an empty result id"),
                context(),
            ));
        } else if let Some(first_idx) = seen_ids.get(region.result_id.as_str()) {
            report.add(ValidationIssue::error(
                IssueCode::DuplicateResultId,
                format!(
                    "Duplicate result id '{}' (first seen at index {})",
                    region.result_id, first_idx
                ),
                context(),
            ));
        } else {
            seen_ids.insert(&region.result_id, idx);
        }

        if !(0.0..360.0).contains(&region.rotation) {
            report.add(ValidationIssue::warning(
                IssueCode::RotationOutOfRange,
                format!("Rotation {} lies outside [0, 360)", region.rotation),
                context(),
            ));
        }

        if region.coord_mode == CoordMode::Pixel {
            report.add(ValidationIssue::warning(
                IssueCode::LegacyPixelGeometry,
                "Region carries legacy pixel-domain geometry awaiting migration",
                context(),
            ));
        }

        for label in &region.labels {
            if label.values.is_empty() {
                report.add(ValidationIssue::warning(
                    IssueCode::EmptyLabelValues,
                    format!("Label state from '{}' has no values", label.from_name),
                    context(),
                ));
            }
        }

        validate_geometry(region, &context(), report);
    }
}

/// Validates one region's geometry.
fn validate_geometry(region: &Region, context: &IssueContext, report: &mut ValidationReport) {
    // Domain checks only apply to normalized geometry.
    let normalized = region.coord_mode == CoordMode::Normalized;

    match &region.shape {
        Shape::Rect(rect) => {
            let coords = [rect.x, rect.y, rect.width, rect.height];
            if coords.iter().any(|v| !v.is_finite()) {
                report.add(ValidationIssue::error(
                    IssueCode::GeometryNotFinite,
                    "Rectangle has non-finite coordinates",
                    context.clone(),
                ));
                return;
            }
            if rect.width <= 0.0 || rect.height <= 0.0 {
                report.add(ValidationIssue::warning(
                    IssueCode::DegenerateGeometry,
                    format!("Rectangle extent {}x{} is degenerate", rect.width, rect.height),
                    context.clone(),
                ));
            }
            if normalized && out_of_domain(&[rect.x, rect.y, rect.x + rect.width, rect.y + rect.height]) {
                report.add(out_of_domain_issue(context));
            }
        }
        Shape::Ellipse(ellipse) => {
            let coords = [ellipse.x, ellipse.y, ellipse.radius_x, ellipse.radius_y];
            if coords.iter().any(|v| !v.is_finite()) {
                report.add(ValidationIssue::error(
                    IssueCode::GeometryNotFinite,
                    "Ellipse has non-finite coordinates",
                    context.clone(),
                ));
                return;
            }
            if ellipse.radius_x <= 0.0 || ellipse.radius_y <= 0.0 {
                report.add(ValidationIssue::warning(
                    IssueCode::DegenerateGeometry,
                    format!(
                        "Ellipse radii {}x{} are degenerate",
                        ellipse.radius_x, ellipse.radius_y
                    ),
                    context.clone(),
                ));
            }
            if normalized && out_of_domain(&[ellipse.x, ellipse.y]) {
                report.add(out_of_domain_issue(context));
            }
        }
        Shape::Polygon(polygon) => {
            if polygon
                .points
                .iter()
                .any(|point| !point.is_finite())
            {
                report.add(ValidationIssue::error(
                    IssueCode::GeometryNotFinite,
                    "Polygon has non-finite vertices",
                    context.clone(),
                ));
                return;
            }
            if polygon.closed && polygon.points.len() < MIN_POLYGON_POINTS {
                report.add(ValidationIssue::error(
                    IssueCode::PolygonTooFewPoints,
                    format!(
                        "Closed polygon has {} vertex(es); at least {} are required",
                        polygon.points.len(),
                        MIN_POLYGON_POINTS
                    ),
                    context.clone(),
                ));
            }
            if normalized
                && polygon
                    .points
                    .iter()
                    .any(|point| out_of_domain(&[point.x, point.y]))
            {
                report.add(out_of_domain_issue(context));
            }
        }
        Shape::Brush(brush) => {
            if let MaskData::Rle(rle) = &brush.data {
                if brush.has_grid() {
                    let expected =
                        brush.mask_width as u64 * brush.mask_height as u64;
                    let total: u64 = rle.runs.iter().map(|&r| r as u64).sum();
                    if total != expected {
                        report.add(ValidationIssue::error(
                            IssueCode::InconsistentMask,
                            format!(
                                "Mask run lengths cover {total} pixel(s) but the grid has {expected}"
                            ),
                            context.clone(),
                        ));
                    }
                }
            }
            if brush.bounding_box().is_none() {
                report.add(ValidationIssue::warning(
                    IssueCode::DegenerateGeometry,
                    "Mask has no painted pixels",
                    context.clone(),
                ));
            }
        }
        Shape::KeyPoint(point) => {
            if !point.x.is_finite() || !point.y.is_finite() {
                report.add(ValidationIssue::error(
                    IssueCode::GeometryNotFinite,
                    "Key point has non-finite coordinates",
                    context.clone(),
                ));
                return;
            }
            if normalized && out_of_domain(&[point.x, point.y]) {
                report.add(out_of_domain_issue(context));
            }
        }
        Shape::TextSpan(span) => {
            if span.is_empty() {
                report.add(ValidationIssue::warning(
                    IssueCode::DegenerateGeometry,
                    format!("Text span [{}, {}) covers no characters", span.start, span.end),
                    context.clone(),
                ));
            }
        }
    }
}

/// Validates all relations against the region list.
fn validate_relations(
    regions: &[Region],
    relations: &RelationGraph,
    report: &mut ValidationReport,
) {
    let ids: Vec<RegionId> = regions.iter().map(|region| region.id).collect();

    for (index, relation) in relations.iter().enumerate() {
        if relation.node1 == relation.node2 {
            report.add(ValidationIssue::error(
                IssueCode::SelfRelation,
                format!("Relation links region {} to itself", relation.node1),
                IssueContext::Relation { index },
            ));
        }
        for endpoint in [relation.node1, relation.node2] {
            if !ids.contains(&endpoint) {
                report.add(ValidationIssue::error(
                    IssueCode::MissingRelationEndpoint,
                    format!("Relation references missing region {}", endpoint),
                    IssueContext::Relation { index },
                ));
            }
        }
    }
}

fn out_of_domain(values: &[f64]) -> bool {
    values.iter().any(|&v| !(0.0..=NORM_EXTENT).contains(&v))
}

fn out_of_domain_issue(context: &IssueContext) -> ValidationIssue {
    ValidationIssue::warning(
        IssueCode::GeometryOutOfDomain,
        format!("Normalized geometry lies outside the 0-{NORM_EXTENT} domain"),
        context.clone(),
    )
}
