#![allow(dead_code)]

use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

use regionkit::geom::Coord;
use regionkit::region::{
    Ellipse, KeyPoint, LabelState, Polygon, Rect, Region, Shape, TextSpan,
};
use regionkit::registry::ControlKind;

/// Tolerance for wire round trips, as a fraction of the 0-100 domain.
pub const EPS_WIRE: f64 = 1e-6;

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// A shape plus the rotation carried by its owning region.
pub type ShapeSpec = (Shape, f64);

pub fn arb_rotation() -> impl Strategy<Value = f64> {
    prop_oneof![Just(0.0), 0.0..360.0]
}

pub fn arb_rect_shape() -> impl Strategy<Value = ShapeSpec> {
    (0.0..80.0, 0.0..80.0, 0.1..20.0, 0.1..20.0, arb_rotation())
        .prop_map(|(x, y, w, h, rot)| (Shape::Rect(Rect::new(x, y, w, h)), rot))
}

pub fn arb_ellipse_shape() -> impl Strategy<Value = ShapeSpec> {
    (10.0..90.0, 10.0..90.0, 0.1..10.0, 0.1..10.0, arb_rotation())
        .prop_map(|(x, y, rx, ry, rot)| (Shape::Ellipse(Ellipse::new(x, y, rx, ry)), rot))
}

pub fn arb_polygon_shape() -> impl Strategy<Value = ShapeSpec> {
    proptest::collection::vec((0.0..100.0, 0.0..100.0), 3..8).prop_map(|vertices| {
        let points = vertices.iter().map(|(x, y)| Coord::new(*x, *y)).collect();
        (Shape::Polygon(Polygon::from_points(points, true)), 0.0)
    })
}

pub fn arb_keypoint_shape() -> impl Strategy<Value = ShapeSpec> {
    (0.0..100.0, 0.0..100.0, 1.0..20.0)
        .prop_map(|(x, y, w)| (Shape::KeyPoint(KeyPoint::new(x, y, w)), 0.0))
}

pub fn arb_span_shape() -> impl Strategy<Value = ShapeSpec> {
    (0u64..1000, 1u64..100, ".{0,12}").prop_map(|(start, len, text)| {
        (
            Shape::TextSpan(TextSpan::new(start, start + len, text)),
            0.0,
        )
    })
}

pub fn arb_shape() -> impl Strategy<Value = ShapeSpec> {
    prop_oneof![
        arb_rect_shape(),
        arb_ellipse_shape(),
        arb_polygon_shape(),
        arb_keypoint_shape(),
        arb_span_shape(),
    ]
}

pub fn arb_shapes(max: usize) -> impl Strategy<Value = Vec<ShapeSpec>> {
    proptest::collection::vec(arb_shape(), 0..max)
}

/// Whether to attach a label to each shape, and with what value.
pub fn arb_label_values() -> impl Strategy<Value = Option<Vec<String>>> {
    prop_oneof![
        Just(None),
        proptest::collection::vec("[a-z]{1,8}", 1..3).prop_map(Some),
    ]
}

/// A label state matching the shape's own control kind.
pub fn matching_label(shape: &Shape, values: Vec<String>) -> LabelState {
    LabelState::new(
        "label",
        ControlKind::for_region_kind(shape.kind()),
        values,
    )
}

/// Compares two region lists for geometric equivalence within `eps`.
pub fn assert_regions_equivalent(
    left: &[Region],
    right: &[Region],
    eps: f64,
) -> Result<(), String> {
    if left.len() != right.len() {
        return Err(format!(
            "region count mismatch: {} vs {}",
            left.len(),
            right.len()
        ));
    }

    for (a, b) in left.iter().zip(right.iter()) {
        if a.result_id != b.result_id {
            return Err(format!(
                "result id mismatch: '{}' vs '{}'",
                a.result_id, b.result_id
            ));
        }
        if (a.rotation - b.rotation).abs() > eps {
            return Err(format!(
                "rotation mismatch for '{}': {} vs {}",
                a.result_id, a.rotation, b.rotation
            ));
        }
        if a.labels != b.labels {
            return Err(format!("label mismatch for '{}'", a.result_id));
        }
        shape_equivalent(&a.shape, &b.shape, eps)
            .map_err(|msg| format!("shape mismatch for '{}': {msg}", a.result_id))?;
    }

    Ok(())
}

fn shape_equivalent(a: &Shape, b: &Shape, eps: f64) -> Result<(), String> {
    let close = |x: f64, y: f64| (x - y).abs() <= eps;

    match (a, b) {
        (Shape::Rect(a), Shape::Rect(b)) => {
            if close(a.x, b.x) && close(a.y, b.y) && close(a.width, b.width) && close(a.height, b.height)
            {
                Ok(())
            } else {
                Err(format!("{a:?} vs {b:?}"))
            }
        }
        (Shape::Ellipse(a), Shape::Ellipse(b)) => {
            if close(a.x, b.x)
                && close(a.y, b.y)
                && close(a.radius_x, b.radius_x)
                && close(a.radius_y, b.radius_y)
            {
                Ok(())
            } else {
                Err(format!("{a:?} vs {b:?}"))
            }
        }
        (Shape::Polygon(a), Shape::Polygon(b)) => {
            if a.closed != b.closed || a.points.len() != b.points.len() {
                return Err(format!("{a:?} vs {b:?}"));
            }
            for (pa, pb) in a.points.iter().zip(b.points.iter()) {
                if !close(pa.x, pb.x) || !close(pa.y, pb.y) {
                    return Err(format!("{a:?} vs {b:?}"));
                }
            }
            Ok(())
        }
        (Shape::Brush(a), Shape::Brush(b)) => {
            if a == b {
                Ok(())
            } else {
                Err("mask mismatch".to_string())
            }
        }
        (Shape::KeyPoint(a), Shape::KeyPoint(b)) => {
            if close(a.x, b.x) && close(a.y, b.y) && close(a.width, b.width) {
                Ok(())
            } else {
                Err(format!("{a:?} vs {b:?}"))
            }
        }
        (Shape::TextSpan(a), Shape::TextSpan(b)) => {
            if a == b {
                Ok(())
            } else {
                Err(format!("{a:?} vs {b:?}"))
            }
        }
        (a, b) => Err(format!("kind mismatch: {:?} vs {:?}", a.kind(), b.kind())),
    }
}
