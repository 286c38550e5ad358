//! Wire-format results codec.
//!
//! This module maps regions to and from the durable "result" record: the
//! JSON shape used for both storage and API exchange. Geometry fields are
//! 0–100 normalized percentages, rotation is degrees, and brush RLE data
//! is raw pixel run lengths always paired with `original_width` /
//! `original_height`.
//!
//! A full annotation serializes to a flat array: each region contributes
//! one record per attached label state (or one bare geometry record when
//! unlabeled), and relations contribute trailing `type: "relation"`
//! records. Deserialization is the exact inverse and is insensitive to
//! record order, except that relations resolve only after every geometry
//! record has been processed (two passes).

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::RegionKitError;
use crate::geom::Coord;
use crate::region::{
    Brush, CoordMode, Ellipse, KeyPoint, LabelState, MaskData, Polygon, Rect, Region, RegionId,
    RegionKind, RleMask, Shape, Stroke, TextSpan, MIN_POLYGON_POINTS,
};
use crate::registry::ControlKind;

// ============================================================================
// Wire schema types
// ============================================================================

/// One externally durable result record.
///
/// Geometry, label-state, and relation records all share this shape;
/// which fields are present depends on the record type, so most are
/// optional and absent fields are omitted from the JSON.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Stable region correlation id; absent on relation records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Name of the control that produced the record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_name: Option<String>,

    /// Name of the annotated object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_name: Option<String>,

    /// Record type: a control tag, a bare geometry tag, or "relation".
    #[serde(rename = "type")]
    pub kind: String,

    /// Type-specific payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,

    /// Intrinsic pixel width of the annotated item.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_width: Option<u32>,

    /// Intrinsic pixel height of the annotated item.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_height: Option<u32>,

    /// Rotation of the displayed item, in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_rotation: Option<f64>,

    /// Source region result id; relation records only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_id: Option<String>,

    /// Target region result id; relation records only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_id: Option<String>,

    /// Display direction hint; relation records only. The relation graph
    /// itself is undirected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
}

/// Wire type tag of relation records.
pub const RELATION_TYPE: &str = "relation";

/// Legacy pixel-domain tag accepted in `value.coordstype`.
const COORDSTYPE_PIXEL: &str = "px";

#[derive(Debug, Serialize, Deserialize)]
struct RectangleValue {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    #[serde(default)]
    rotation: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct EllipseValue {
    x: f64,
    y: f64,
    #[serde(rename = "radiusX")]
    radius_x: f64,
    #[serde(rename = "radiusY")]
    radius_y: f64,
    #[serde(default)]
    rotation: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct PolygonValue {
    points: Vec<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    closed: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RleBrushValue {
    format: String,
    rle: Vec<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StrokesBrushValue {
    format: String,
    strokes: Vec<Stroke>,
}

#[derive(Debug, Serialize, Deserialize)]
struct KeyPointValue {
    x: f64,
    y: f64,
    #[serde(default)]
    width: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct TextSpanValue {
    start: u64,
    end: u64,
    #[serde(default)]
    text: String,
}

// ============================================================================
// File and string entry points
// ============================================================================

/// Reads a flat result array from a JSON file.
pub fn read_results_json(path: &Path) -> Result<Vec<ResultRecord>, RegionKitError> {
    let file = File::open(path).map_err(RegionKitError::Io)?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|source| RegionKitError::ResultsParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes a flat result array to a JSON file.
pub fn write_results_json(path: &Path, results: &[ResultRecord]) -> Result<(), RegionKitError> {
    let file = File::create(path).map_err(RegionKitError::Io)?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, results).map_err(|source| {
        RegionKitError::ResultsWrite {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Parses a flat result array from a JSON string.
///
/// Useful for testing without file I/O.
pub fn from_results_str(json: &str) -> Result<Vec<ResultRecord>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Serializes a flat result array to a JSON string.
///
/// Useful for testing without file I/O.
pub fn to_results_string(results: &[ResultRecord]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(results)
}

// ============================================================================
// Serialization: regions -> records
// ============================================================================

/// Serializes one region to its wire records.
///
/// Emits one record per attached label state, or a single bare geometry
/// record when the region is unlabeled. Returns None when the geometry
/// cannot currently be serialized (an open polygon below three points, an
/// empty mask grid with no strokes); the caller filters these out instead
/// of emitting invalid data.
pub fn serialize_region(
    region: &Region,
    default_from_name: &str,
    to_name: &str,
    original: Option<(u32, u32)>,
    image_rotation: f64,
) -> Option<Vec<ResultRecord>> {
    let geometry = geometry_value(region)?;

    let base = |from_name: &str, kind: &str, value: serde_json::Value| ResultRecord {
        id: Some(region.result_id.clone()),
        from_name: Some(from_name.to_string()),
        to_name: Some(to_name.to_string()),
        kind: kind.to_string(),
        value: Some(value),
        original_width: original.map(|(w, _)| w),
        original_height: original.map(|(_, h)| h),
        image_rotation: Some(image_rotation),
        from_id: None,
        to_id: None,
        direction: None,
    };

    let mut records = Vec::new();

    if region.labels.is_empty() {
        records.push(base(
            default_from_name,
            region.kind().bare_type(),
            serde_json::Value::Object(geometry),
        ));
        return Some(records);
    }

    for label in &region.labels {
        match label.kind {
            ControlKind::Choices => {
                let mut value = serde_json::Map::new();
                value.insert(
                    "choices".to_string(),
                    serde_json::json!(label.values.clone()),
                );
                records.push(base(
                    &label.from_name,
                    ControlKind::Choices.tag(),
                    serde_json::Value::Object(value),
                ));
            }
            kind => {
                let mut value = geometry.clone();
                value.insert(kind.tag().to_string(), serde_json::json!(label.values.clone()));
                records.push(base(
                    &label.from_name,
                    kind.tag(),
                    serde_json::Value::Object(value),
                ));
            }
        }
    }

    Some(records)
}

/// Serializes one relation to its wire record.
pub fn serialize_relation(from_result_id: &str, to_result_id: &str) -> ResultRecord {
    ResultRecord {
        kind: RELATION_TYPE.to_string(),
        from_id: Some(from_result_id.to_string()),
        to_id: Some(to_result_id.to_string()),
        direction: Some("right".to_string()),
        ..ResultRecord::default()
    }
}

fn geometry_value(region: &Region) -> Option<serde_json::Map<String, serde_json::Value>> {
    let value = match &region.shape {
        Shape::Rect(rect) => to_map(&RectangleValue {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            rotation: region.rotation,
        }),
        Shape::Ellipse(ellipse) => to_map(&EllipseValue {
            x: ellipse.x,
            y: ellipse.y,
            radius_x: ellipse.radius_x,
            radius_y: ellipse.radius_y,
            rotation: region.rotation,
        }),
        Shape::Polygon(polygon) => {
            if polygon.points.len() < MIN_POLYGON_POINTS {
                return None;
            }
            to_map(&PolygonValue {
                points: polygon.points.iter().map(|p| [p.x, p.y]).collect(),
                closed: Some(polygon.closed),
            })
        }
        Shape::Brush(brush) => brush_value(brush)?,
        Shape::KeyPoint(point) => to_map(&KeyPointValue {
            x: point.x,
            y: point.y,
            width: point.width,
        }),
        Shape::TextSpan(span) => to_map(&TextSpanValue {
            start: span.start,
            end: span.end,
            text: span.text.clone(),
        }),
    };
    Some(value)
}

/// Brush geometry: the canonical RLE when the raster grid is known, raw
/// strokes otherwise (the incremental-save path).
fn brush_value(brush: &Brush) -> Option<serde_json::Map<String, serde_json::Value>> {
    match &brush.data {
        MaskData::Rle(rle) => Some(to_map(&RleBrushValue {
            format: "rle".to_string(),
            rle: rle.runs.clone(),
        })),
        MaskData::Strokes(strokes) => {
            if brush.has_grid() {
                let bitmap = brush.rasterize()?;
                Some(to_map(&RleBrushValue {
                    format: "rle".to_string(),
                    rle: RleMask::encode(&bitmap).runs,
                }))
            } else if strokes.is_empty() {
                None
            } else {
                Some(to_map(&StrokesBrushValue {
                    format: "strokes".to_string(),
                    strokes: strokes.clone(),
                }))
            }
        }
    }
}

fn to_map<T: Serialize>(value: &T) -> serde_json::Map<String, serde_json::Value> {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::Object(map)) => map,
        // Geometry payloads are plain structs; anything else is a bug in
        // this module, not in caller data.
        _ => serde_json::Map::new(),
    }
}

// ============================================================================
// Deserialization: records -> regions
// ============================================================================

/// The outcome of deserializing a flat result array.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeserializedTree {
    /// Reconstructed regions, in order of first wire occurrence.
    pub regions: Vec<Region>,
    /// Resolved relation endpoints.
    pub relations: Vec<(RegionId, RegionId)>,
    /// Intrinsic item dimensions, when any record carried them.
    pub original: Option<(u32, u32)>,
    /// Displayed item rotation, when any record carried it.
    pub image_rotation: Option<f64>,
}

/// Reconstructs regions and relations from a flat result array.
///
/// Records are grouped by result id: the first occurrence creates the
/// region, subsequent records attach additional label state. Text-span
/// records also match on their `start`/`end` geometry key, and
/// classification-only records fall back to the first region with the
/// same `to_name`. Relations resolve in a second pass once every region
/// exists, and any malformed record aborts the whole call — a partially
/// reconstructed annotation is never returned.
pub fn deserialize_results(
    results: &[ResultRecord],
) -> Result<DeserializedTree, RegionKitError> {
    let mut out = DeserializedTree::default();
    let mut by_result_id: BTreeMap<String, usize> = BTreeMap::new();
    let mut first_by_to_name: BTreeMap<String, usize> = BTreeMap::new();

    // Pass 1: geometry and label state.
    for (idx, record) in results.iter().enumerate() {
        if record.kind == RELATION_TYPE {
            continue;
        }

        if out.original.is_none() {
            if let (Some(w), Some(h)) = (record.original_width, record.original_height) {
                out.original = Some((w, h));
            }
        }
        if out.image_rotation.is_none() {
            out.image_rotation = record.image_rotation;
        }

        process_record(
            record,
            idx,
            &mut out.regions,
            &mut by_result_id,
            &mut first_by_to_name,
        )?;
    }

    // Pass 2: relations, now that every region id is resolvable.
    for record in results.iter().filter(|r| r.kind == RELATION_TYPE) {
        let from = resolve_endpoint(record.from_id.as_deref(), "from_id", &by_result_id)?;
        let to = resolve_endpoint(record.to_id.as_deref(), "to_id", &by_result_id)?;
        out.relations
            .push((out.regions[from].id, out.regions[to].id));
    }

    Ok(out)
}

fn resolve_endpoint(
    id: Option<&str>,
    field: &str,
    by_result_id: &BTreeMap<String, usize>,
) -> Result<usize, RegionKitError> {
    let id = id.ok_or_else(|| RegionKitError::MalformedResult {
        id: RELATION_TYPE.to_string(),
        message: format!("relation record is missing {field}"),
    })?;
    by_result_id
        .get(id)
        .copied()
        .ok_or_else(|| RegionKitError::UnknownRegion { id: id.to_string() })
}

fn process_record(
    record: &ResultRecord,
    idx: usize,
    regions: &mut Vec<Region>,
    by_result_id: &mut BTreeMap<String, usize>,
    first_by_to_name: &mut BTreeMap<String, usize>,
) -> Result<(), RegionKitError> {
    let display_id = record
        .id
        .clone()
        .unwrap_or_else(|| format!("result[{idx}]"));

    // Classification-only records attach to an existing region and never
    // create one.
    if record.kind == ControlKind::Choices.tag() {
        return attach_choices(record, &display_id, regions, by_result_id, first_by_to_name);
    }

    let (region_kind, control) = match ControlKind::from_tag(&record.kind) {
        Some(control) => match control.region_kind() {
            Some(kind) => (kind, Some(control)),
            None => unreachable!("choices handled above"),
        },
        None => match RegionKind::from_bare_type(&record.kind) {
            Some(kind) => (kind, None),
            None => {
                return Err(malformed(
                    &display_id,
                    format!("unsupported result type '{}'", record.kind),
                ));
            }
        },
    };

    let id = record.id.clone().ok_or_else(|| {
        malformed(&display_id, "geometry record is missing its result id")
    })?;

    let label = control.map(|control| -> Result<LabelState, RegionKitError> {
        let values = label_values(record, control.tag(), &display_id)?;
        let from_name = record.from_name.clone().unwrap_or_default();
        Ok(LabelState::new(from_name, control, values))
    });
    let label = label.transpose()?;

    // Existing region with the same result id: attach, don't recreate.
    if let Some(&index) = by_result_id.get(&id) {
        if let Some(label) = label {
            regions[index].labels.push(label);
        }
        return Ok(());
    }

    let (shape, rotation, coord_mode) = parse_geometry(record, region_kind, &display_id)?;

    // Text spans share a geometry key across controls: a new id over the
    // same [start, end) attaches to the existing span region.
    if let Shape::TextSpan(span) = &shape {
        let existing = regions.iter().position(|region| {
            matches!(&region.shape, Shape::TextSpan(other) if other.start == span.start && other.end == span.end)
        });
        if let Some(index) = existing {
            by_result_id.insert(id, index);
            if let Some(label) = label {
                regions[index].labels.push(label);
            }
            return Ok(());
        }
    }

    let region_id = RegionId::new(regions.len() as u64 + 1);
    let mut region = Region::new(region_id, id.clone(), shape);
    region.rotation = rotation;
    region.coord_mode = coord_mode;
    if let Some(label) = label {
        region.labels.push(label);
    }

    by_result_id.insert(id, regions.len());
    if let Some(to_name) = record.to_name.as_ref().filter(|name| !name.is_empty()) {
        first_by_to_name
            .entry(to_name.clone())
            .or_insert(regions.len());
    }
    regions.push(region);

    Ok(())
}

fn attach_choices(
    record: &ResultRecord,
    display_id: &str,
    regions: &mut [Region],
    by_result_id: &BTreeMap<String, usize>,
    first_by_to_name: &BTreeMap<String, usize>,
) -> Result<(), RegionKitError> {
    let values = label_values(record, "choices", display_id)?;

    let index = record
        .id
        .as_ref()
        .and_then(|id| by_result_id.get(id).copied())
        .or_else(|| {
            record
                .to_name
                .as_ref()
                .and_then(|name| first_by_to_name.get(name).copied())
        })
        .ok_or_else(|| {
            malformed(
                display_id,
                "choices record does not reference any known region",
            )
        })?;

    let from_name = record.from_name.clone().unwrap_or_default();
    regions[index]
        .labels
        .push(LabelState::new(from_name, ControlKind::Choices, values));
    Ok(())
}

fn parse_geometry(
    record: &ResultRecord,
    kind: RegionKind,
    display_id: &str,
) -> Result<(Shape, f64, CoordMode), RegionKitError> {
    let coord_mode = match coordstype(record) {
        Some(tag) if tag == COORDSTYPE_PIXEL => CoordMode::Pixel,
        _ => CoordMode::Normalized,
    };

    let (shape, rotation) = match kind {
        RegionKind::Rect => {
            let value: RectangleValue = parse_value(record, display_id)?;
            (
                Shape::Rect(Rect::new(value.x, value.y, value.width, value.height)),
                value.rotation,
            )
        }
        RegionKind::Ellipse => {
            let value: EllipseValue = parse_value(record, display_id)?;
            (
                Shape::Ellipse(Ellipse::new(
                    value.x,
                    value.y,
                    value.radius_x,
                    value.radius_y,
                )),
                value.rotation,
            )
        }
        RegionKind::Polygon => {
            let value: PolygonValue = parse_value(record, display_id)?;
            if value.points.len() < MIN_POLYGON_POINTS {
                return Err(malformed(
                    display_id,
                    format!(
                        "polygon has {} point(s); at least {} are required",
                        value.points.len(),
                        MIN_POLYGON_POINTS
                    ),
                ));
            }
            let points = value
                .points
                .iter()
                .map(|[x, y]| Coord::new(*x, *y))
                .collect();
            (
                Shape::Polygon(Polygon::from_points(points, value.closed.unwrap_or(true))),
                0.0,
            )
        }
        RegionKind::Brush => (Shape::Brush(parse_brush(record, display_id)?), 0.0),
        RegionKind::KeyPoint => {
            let value: KeyPointValue = parse_value(record, display_id)?;
            (
                Shape::KeyPoint(KeyPoint::new(value.x, value.y, value.width)),
                0.0,
            )
        }
        RegionKind::TextSpan => {
            let value: TextSpanValue = parse_value(record, display_id)?;
            (
                Shape::TextSpan(TextSpan::new(value.start, value.end, value.text)),
                0.0,
            )
        }
    };

    Ok((shape, rotation.rem_euclid(360.0), coord_mode))
}

fn parse_brush(record: &ResultRecord, display_id: &str) -> Result<Brush, RegionKitError> {
    let raw = raw_value(record, display_id)?;
    let format = raw
        .get("format")
        .and_then(|f| f.as_str())
        .ok_or_else(|| malformed(display_id, "brush value is missing 'format'"))?;

    match format {
        "rle" => {
            // The run lengths are meaningless without the raster grid, so
            // the record must carry the item dimensions.
            let (width, height) = match (record.original_width, record.original_height) {
                (Some(w), Some(h)) => (w, h),
                _ => {
                    return Err(malformed(
                        display_id,
                        "brush rle record is missing original_width/original_height",
                    ));
                }
            };
            let value: RleBrushValue = parse_value(record, display_id)?;
            Ok(Brush::from_rle(width, height, RleMask { runs: value.rle }))
        }
        "strokes" => {
            let value: StrokesBrushValue = parse_value(record, display_id)?;
            let width = record.original_width.unwrap_or(0);
            let height = record.original_height.unwrap_or(0);
            let mut brush = Brush::new(width, height);
            brush.data = MaskData::Strokes(value.strokes);
            Ok(brush)
        }
        other => Err(malformed(
            display_id,
            format!("unsupported brush format '{other}'"),
        )),
    }
}

fn parse_value<T: DeserializeOwned>(
    record: &ResultRecord,
    display_id: &str,
) -> Result<T, RegionKitError> {
    let raw = raw_value(record, display_id)?;
    serde_json::from_value(raw.clone()).map_err(|source| {
        malformed(
            display_id,
            format!("invalid {} value: {source}", record.kind),
        )
    })
}

fn raw_value<'a>(
    record: &'a ResultRecord,
    display_id: &str,
) -> Result<&'a serde_json::Value, RegionKitError> {
    record
        .value
        .as_ref()
        .ok_or_else(|| malformed(display_id, "record is missing its value object"))
}

fn label_values(
    record: &ResultRecord,
    key: &str,
    display_id: &str,
) -> Result<Vec<String>, RegionKitError> {
    let raw = raw_value(record, display_id)?;
    match raw.get(key) {
        None => Ok(Vec::new()),
        Some(values) => serde_json::from_value(values.clone()).map_err(|source| {
            malformed(display_id, format!("invalid '{key}' list: {source}"))
        }),
    }
}

fn coordstype(record: &ResultRecord) -> Option<String> {
    record
        .value
        .as_ref()
        .and_then(|value| value.get("coordstype"))
        .and_then(|tag| tag.as_str())
        .map(str::to_string)
}

fn malformed(id: &str, message: impl Into<String>) -> RegionKitError {
    RegionKitError::MalformedResult {
        id: id.to_string(),
        message: message.into(),
    }
}

// ============================================================================
// Tests
// ============================================================================
