//! The annotation tree: the aggregate owning regions, relations, and
//! history.
//!
//! One tree instance owns the region list and relation graph for one
//! annotation exclusively. All mutation flows through it on a single
//! logical thread: drawing tools feed it canvas points, committed
//! mutations record history snapshots, composite gestures freeze the
//! history so they cost exactly one snapshot, and the serialize /
//! deserialize entry points are what external persistence calls.

use std::sync::Arc;

use rand::RngExt;

use crate::error::RegionKitError;
use crate::geom::{Canvas, Coord, ItemViewport};
use crate::history::HistoryEngine;
use crate::region::{
    Brush, Compose, CoordMode, Ellipse, KeyPoint, Polygon, Rect, Region, RegionId, RegionKind,
    Shape,
};
use crate::registry::{ControlKind, ControlRegistry};
use crate::relations::RelationGraph;
use crate::wire::{self, ResultRecord};

/// Display diameter given to key points created by drawing.
const DEFAULT_KEYPOINT_WIDTH: f64 = 8.0;

/// Alphabet for generated result ids.
const ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Length of generated result ids.
const ID_LENGTH: usize = 10;

/// The whole mutable state captured by one history snapshot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TreeSnapshot {
    pub regions: Vec<Region>,
    pub relations: RelationGraph,
}

/// A region being drawn: transient until committed or cancelled.
#[derive(Clone, Debug)]
struct DrawingRegion {
    region: Region,
    /// Canvas points clicked so far (anchor, then optional direction edge).
    points: Vec<Coord<Canvas>>,
}

/// The aggregate annotation state for one item.
#[derive(Debug)]
pub struct AnnotationTree {
    regions: Vec<Region>,
    relations: RelationGraph,
    history: HistoryEngine<TreeSnapshot>,
    registry: ControlRegistry,
    viewport: ItemViewport,
    original: Option<(u32, u32)>,
    image_rotation: f64,
    to_name: String,
    next_region_id: u64,
    drawing: Option<DrawingRegion>,
}

impl AnnotationTree {
    /// Creates an empty tree for an object named `to_name`, displayed at
    /// the given canvas size, with no registered controls.
    pub fn new(to_name: impl Into<String>, viewport: ItemViewport) -> Self {
        Self {
            regions: Vec::new(),
            relations: RelationGraph::new(),
            history: HistoryEngine::new(TreeSnapshot::default()),
            registry: ControlRegistry::new(),
            viewport,
            original: None,
            image_rotation: 0.0,
            to_name: to_name.into(),
            next_region_id: 1,
            drawing: None,
        }
    }

    /// Creates a tree with a validated control configuration.
    ///
    /// Fails fast with [`RegionKitError::UnregisteredControl`] when the
    /// configuration names a control tag the engine has no handler for;
    /// this is the fatal configuration error of the attach phase, raised
    /// before any annotation state exists.
    pub fn with_controls<'a>(
        to_name: impl Into<String>,
        viewport: ItemViewport,
        controls: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, RegionKitError> {
        let registry = ControlRegistry::with_controls(controls)?;
        let mut tree = Self::new(to_name, viewport);
        tree.registry = registry;
        Ok(tree)
    }

    /// Sets the intrinsic pixel size of the annotated item.
    pub fn set_original_size(&mut self, width: u32, height: u32) {
        self.original = Some((width, height));
    }

    /// Sets the displayed rotation of the item. A viewport property: it
    /// travels on wire records but does not touch stored geometry.
    pub fn set_image_rotation(&mut self, degrees: f64) {
        self.image_rotation = degrees.rem_euclid(360.0);
    }

    /// Current canvas viewport.
    pub fn viewport(&self) -> ItemViewport {
        self.viewport
    }

    /// The committed regions, in insertion order.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Looks up a committed region by id.
    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.regions.iter().find(|region| region.id == id)
    }

    /// The relation graph.
    pub fn relations(&self) -> &RelationGraph {
        &self.relations
    }

    /// The control registry.
    pub fn registry(&self) -> &ControlRegistry {
        &self.registry
    }

    fn snapshot(&self) -> TreeSnapshot {
        TreeSnapshot {
            regions: self.regions.clone(),
            relations: self.relations.clone(),
        }
    }

    fn apply_snapshot(&mut self, snapshot: &Arc<TreeSnapshot>) {
        self.regions = snapshot.regions.clone();
        self.relations = snapshot.relations.clone();
    }

    fn record_history(&mut self) {
        let snapshot = self.snapshot();
        self.history.record(snapshot);
    }

    fn allocate_region_id(&mut self) -> RegionId {
        let id = RegionId::new(self.next_region_id);
        self.next_region_id += 1;
        id
    }

    // ------------------------------------------------------------------
    // Drawing lifecycle
    // ------------------------------------------------------------------

    /// Starts drawing a region of the given kind at a canvas point.
    ///
    /// The drawing region is transient: it is not part of the committed
    /// region list, records no history, and is simply discarded on
    /// cancel. Any previous unfinished drawing is dropped.
    pub fn begin_region(&mut self, kind: RegionKind, at: Coord<Canvas>) {
        let norm = self.viewport.to_norm(at);
        let shape = match kind {
            RegionKind::Rect => Shape::Rect(Rect::new(norm.x, norm.y, 0.0, 0.0)),
            RegionKind::Ellipse => Shape::Ellipse(Ellipse::new(norm.x, norm.y, 0.0, 0.0)),
            RegionKind::Polygon => {
                let mut polygon = Polygon::new();
                polygon.add_point(norm);
                Shape::Polygon(polygon)
            }
            RegionKind::Brush => {
                let (width, height) = self.original.unwrap_or((0, 0));
                Shape::Brush(Brush::new(width, height))
            }
            RegionKind::KeyPoint => {
                Shape::KeyPoint(KeyPoint::new(norm.x, norm.y, DEFAULT_KEYPOINT_WIDTH))
            }
            RegionKind::TextSpan => Shape::TextSpan(Default::default()),
        };

        let id = self.allocate_region_id();
        let region = Region::new(id, generate_result_id(), shape);
        self.drawing = Some(DrawingRegion {
            region,
            points: vec![at],
        });
    }

    /// Registers another click point on the drawing region: the direction
    /// edge for rotated rectangles and ellipses, or the next polygon
    /// vertex.
    pub fn anchor_point(&mut self, at: Coord<Canvas>) {
        let norm = self.viewport.to_norm(at);
        if let Some(drawing) = &mut self.drawing {
            if let Shape::Polygon(polygon) = &mut drawing.region.shape {
                polygon.add_point(norm);
            } else {
                drawing.points.push(at);
            }
        }
    }

    /// Starts a mask stroke on a drawing brush region.
    pub fn begin_mask_stroke(&mut self, width: f64, mode: Compose) {
        if let Some(drawing) = &mut self.drawing {
            if let Shape::Brush(brush) = &mut drawing.region.shape {
                brush.begin_stroke(width, mode);
            }
        }
    }

    /// Incremental drag update of the drawing region.
    pub fn draw_to(&mut self, cursor: Coord<Canvas>) {
        if let Some(drawing) = &mut self.drawing {
            drawing
                .region
                .draw(cursor, &drawing.points, &self.viewport);
        }
    }

    /// The region currently being drawn, if any.
    pub fn drawing_region(&self) -> Option<&Region> {
        self.drawing.as_ref().map(|drawing| &drawing.region)
    }

    /// Commits the drawing region into the tree and records one history
    /// snapshot.
    ///
    /// A polygon must be closable (at least three vertices); otherwise
    /// the drawing is kept open and None is returned so the user can keep
    /// adding points.
    pub fn commit_region(&mut self) -> Option<RegionId> {
        let mut drawing = self.drawing.take()?;

        if let Shape::Polygon(polygon) = &mut drawing.region.shape {
            if !polygon.close() {
                self.drawing = Some(drawing);
                return None;
            }
        }

        let id = drawing.region.id;
        self.regions.push(drawing.region);
        self.record_history();
        Some(id)
    }

    /// Discards the drawing region. No result is ever emitted for a
    /// cancelled drawing.
    pub fn cancel_region(&mut self) {
        self.drawing = None;
    }

    /// Inserts an externally built shape as a committed region and
    /// records one history snapshot.
    pub fn insert_region(&mut self, shape: Shape) -> RegionId {
        let id = self.allocate_region_id();
        let region = Region::new(id, generate_result_id(), shape);
        self.regions.push(region);
        self.record_history();
        id
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Deletes a region, destroying every relation that references it,
    /// and records one history snapshot. No dangling relation endpoint
    /// survives a deletion.
    pub fn delete_region(&mut self, id: RegionId) -> bool {
        let before = self.regions.len();
        self.regions.retain(|region| region.id != id);
        if self.regions.len() == before {
            return false;
        }
        self.relations.remove_region(id);
        self.record_history();
        true
    }

    /// Applies a mutation to one region and records one history snapshot.
    /// Returns false (recording nothing) when the region does not exist.
    pub fn update_region<F>(&mut self, id: RegionId, mutate: F) -> bool
    where
        F: FnOnce(&mut Region),
    {
        let Some(region) = self.regions.iter_mut().find(|region| region.id == id) else {
            return false;
        };
        mutate(region);
        self.record_history();
        true
    }

    /// Selects one region exclusively.
    ///
    /// Selection is view state, not annotation state: it records no
    /// history.
    pub fn select_region(&mut self, id: RegionId) -> bool {
        let mut found = false;
        for region in &mut self.regions {
            region.selected = region.id == id;
            found |= region.selected;
        }
        found
    }

    /// Clears all selection flags.
    pub fn deselect_all(&mut self) {
        for region in &mut self.regions {
            region.selected = false;
        }
    }

    /// Sets one region's highlight flag. View state, like selection.
    pub fn set_highlighted(&mut self, id: RegionId, highlighted: bool) -> bool {
        match self.regions.iter_mut().find(|region| region.id == id) {
            Some(region) => {
                region.highlighted = highlighted;
                true
            }
            None => false,
        }
    }

    /// Topmost committed region under a canvas point.
    pub fn hit_test(&self, probe: Coord<Canvas>) -> Option<RegionId> {
        self.regions
            .iter()
            .rev()
            .find(|region| region.contains(probe, &self.viewport))
            .map(|region| region.id)
    }

    /// Adds a relation between two committed regions and records one
    /// history snapshot. Deduplicated: re-adding an existing unordered
    /// pair is a no-op and records nothing.
    pub fn add_relation(&mut self, a: RegionId, b: RegionId) -> bool {
        if self.region(a).is_none() || self.region(b).is_none() {
            return false;
        }
        if !self.relations.add(a, b) {
            return false;
        }
        self.record_history();
        true
    }

    /// Removes the relation between two regions, if present, recording
    /// one history snapshot.
    pub fn delete_relation(&mut self, a: RegionId, b: RegionId) -> bool {
        if !self.relations.remove(a, b) {
            return false;
        }
        self.record_history();
        true
    }

    // ------------------------------------------------------------------
    // Gestures and re-projection
    // ------------------------------------------------------------------

    /// Freezes the history for the duration of a composite gesture.
    pub fn freeze(&mut self) {
        self.history.freeze();
    }

    /// Unfreezes the history, capturing the whole gesture as one
    /// snapshot if anything mutated while frozen.
    pub fn unfreeze(&mut self) {
        let snapshot = self.snapshot();
        self.history.unfreeze(snapshot);
    }

    /// Re-projects every region after the displayed item's pixel size
    /// changes.
    ///
    /// The whole region list updates inside one freeze/unfreeze pair, so
    /// the resize cascade is a single batched operation: no caller can
    /// observe a half-projected list, and the gesture costs at most one
    /// history snapshot (none when nothing needed migrating).
    pub fn update_item_size(&mut self, width: u32, height: u32) {
        let prev = self.viewport;
        let next = ItemViewport::new(width, height);

        let migrating = self
            .regions
            .iter()
            .any(|region| region.coord_mode == CoordMode::Pixel);

        self.history.freeze();
        for region in &mut self.regions {
            region.update_item_size(&prev, &next);
        }
        self.viewport = next;
        if migrating {
            self.record_history();
        }
        let snapshot = self.snapshot();
        self.history.unfreeze(snapshot);
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    /// True when an undo step is available.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// True when a redo step is available.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Steps the annotation state back one snapshot.
    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(snapshot) => {
                self.apply_snapshot(&snapshot);
                self.history.resume();
                true
            }
            None => false,
        }
    }

    /// Steps the annotation state forward one snapshot.
    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(snapshot) => {
                self.apply_snapshot(&snapshot);
                self.history.resume();
                true
            }
            None => false,
        }
    }

    /// Jumps back to the state the history was created with, keeping the
    /// ability to redo forward again.
    pub fn reset(&mut self) {
        let snapshot = self.history.reset();
        self.apply_snapshot(&snapshot);
        self.history.resume();
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Serializes the annotation to its flat wire array: one record per
    /// region label state (or bare geometry record), relations trailing.
    /// Regions whose geometry cannot currently be serialized are filtered
    /// out. The drawing region, if any, is never included.
    pub fn serialize(&self) -> Vec<ResultRecord> {
        let mut records = Vec::new();

        for region in &self.regions {
            let from_name = self.from_name_for(region.kind());
            if let Some(region_records) = wire::serialize_region(
                region,
                &from_name,
                &self.to_name,
                self.original,
                self.image_rotation,
            ) {
                records.extend(region_records);
            }
        }

        for relation in self.relations.iter() {
            let endpoints = self
                .region(relation.node1)
                .zip(self.region(relation.node2));
            if let Some((from, to)) = endpoints {
                records.push(wire::serialize_relation(&from.result_id, &to.result_id));
            }
        }

        records
    }

    /// Replaces the annotation state with the deserialization of a flat
    /// wire array.
    ///
    /// All-or-nothing: any malformed record or unresolved relation aborts
    /// the call with the tree untouched. On success the history restarts
    /// with the loaded state as its creation snapshot.
    pub fn deserialize(&mut self, results: &[ResultRecord]) -> Result<(), RegionKitError> {
        let loaded = wire::deserialize_results(results)?;

        // A non-empty registry also gates which controls may appear.
        if !self.registry.is_empty() {
            for region in &loaded.regions {
                for label in &region.labels {
                    if !label.from_name.is_empty() {
                        self.registry.kind_for(&label.from_name)?;
                    }
                }
            }
        }

        let mut relations = RelationGraph::new();
        for (a, b) in &loaded.relations {
            relations.add(*a, *b);
        }

        self.next_region_id = loaded.regions.len() as u64 + 1;
        self.regions = loaded.regions;
        self.relations = relations;
        self.original = loaded.original.or(self.original);
        if let Some(rotation) = loaded.image_rotation {
            self.image_rotation = rotation;
        }
        self.drawing = None;

        let snapshot = self.snapshot();
        self.history = HistoryEngine::new(snapshot);
        Ok(())
    }

    /// The control name used for records of regions without label state:
    /// the first registered control of the matching kind, or "label".
    fn from_name_for(&self, kind: RegionKind) -> String {
        let wanted = ControlKind::for_region_kind(kind);
        self.registry
            .iter()
            .find(|(_, control)| *control == wanted)
            .map(|(name, _)| name.to_string())
            .unwrap_or_else(|| "label".to_string())
    }
}

/// Generates a stable 10-character alphanumeric result id.
fn generate_result_id() -> String {
    let mut rng = rand::rng();
    (0..ID_LENGTH)
        .map(|_| ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::{LabelState, MIN_POLYGON_POINTS};

    fn tree_1000x800() -> AnnotationTree {
        AnnotationTree::with_controls(
            "image",
            ItemViewport::new(1000, 800),
            [("label", "rectanglelabels"), ("outline", "polygonlabels")],
        )
        .expect("valid controls")
    }

    fn draw_rect(tree: &mut AnnotationTree, from: (f64, f64), to: (f64, f64)) -> RegionId {
        tree.begin_region(RegionKind::Rect, Coord::new(from.0, from.1));
        tree.draw_to(Coord::new(to.0, to.1));
        tree.commit_region().expect("rect commits")
    }

    #[test]
    fn test_unregistered_control_fails_at_construction() {
        let err = AnnotationTree::with_controls(
            "image",
            ItemViewport::new(100, 100),
            [("label", "frobnicatorlabels")],
        )
        .expect_err("unknown tag");
        assert!(matches!(err, RegionKitError::UnregisteredControl { .. }));
    }

    #[test]
    fn test_draw_commit_rect_normalizes_geometry() {
        let mut tree = tree_1000x800();
        let id = draw_rect(&mut tree, (100.0, 100.0), (300.0, 250.0));

        let region = tree.region(id).expect("committed");
        let Shape::Rect(rect) = &region.shape else {
            panic!("expected rect");
        };
        assert!((rect.x - 10.0).abs() < 1e-9);
        assert!((rect.y - 12.5).abs() < 1e-9);
        assert!((rect.width - 20.0).abs() < 1e-9);
        assert!((rect.height - 18.75).abs() < 1e-9);
    }

    #[test]
    fn test_cancelled_drawing_emits_nothing() {
        let mut tree = tree_1000x800();
        tree.begin_region(RegionKind::Rect, Coord::new(10.0, 10.0));
        tree.draw_to(Coord::new(200.0, 200.0));
        tree.cancel_region();

        assert!(tree.regions().is_empty());
        assert!(tree.serialize().is_empty());
        assert!(!tree.can_undo());
    }

    #[test]
    fn test_polygon_commit_refused_below_three_points() {
        let mut tree = tree_1000x800();
        tree.begin_region(RegionKind::Polygon, Coord::new(100.0, 100.0));
        tree.anchor_point(Coord::new(200.0, 100.0));

        assert!(tree.commit_region().is_none());
        assert!(tree.drawing_region().is_some());

        tree.anchor_point(Coord::new(150.0, 200.0));
        let id = tree.commit_region().expect("triangle commits");
        let region = tree.region(id).expect("committed");
        let Shape::Polygon(polygon) = &region.shape else {
            panic!("expected polygon");
        };
        assert!(polygon.closed);
        assert_eq!(polygon.points.len(), MIN_POLYGON_POINTS);
    }

    #[test]
    fn test_delete_region_cascades_relations() {
        let mut tree = tree_1000x800();
        let a = draw_rect(&mut tree, (0.0, 0.0), (100.0, 100.0));
        let b = draw_rect(&mut tree, (200.0, 200.0), (300.0, 300.0));
        assert!(tree.add_relation(a, b));
        assert_eq!(tree.relations().len(), 1);

        assert!(tree.delete_region(a));
        assert!(tree.relations().is_empty());
        assert!(tree.region(a).is_none());
    }

    #[test]
    fn test_relation_dedup_is_noop() {
        let mut tree = tree_1000x800();
        let a = draw_rect(&mut tree, (0.0, 0.0), (100.0, 100.0));
        let b = draw_rect(&mut tree, (200.0, 200.0), (300.0, 300.0));

        assert!(tree.add_relation(a, b));
        assert!(!tree.add_relation(b, a));
        assert_eq!(tree.relations().len(), 1);
    }

    #[test]
    fn test_n_mutations_n_undos_restores_initial_state() {
        let mut tree = tree_1000x800();
        let initial = tree.serialize();

        let a = draw_rect(&mut tree, (0.0, 0.0), (100.0, 100.0));
        let b = draw_rect(&mut tree, (200.0, 200.0), (300.0, 300.0));
        tree.add_relation(a, b);

        for _ in 0..3 {
            assert!(tree.undo());
        }
        assert!(!tree.can_undo());
        assert_eq!(tree.serialize(), initial);
    }

    #[test]
    fn test_redo_restores_undone_state() {
        let mut tree = tree_1000x800();
        draw_rect(&mut tree, (0.0, 0.0), (100.0, 100.0));
        let with_rect = tree.serialize();

        assert!(tree.undo());
        assert!(tree.serialize().is_empty());
        assert!(tree.redo());
        assert_eq!(tree.serialize(), with_rect);
    }

    #[test]
    fn test_gesture_freeze_costs_one_snapshot() {
        let mut tree = tree_1000x800();
        let id = draw_rect(&mut tree, (0.0, 0.0), (100.0, 100.0));

        tree.freeze();
        for step in 1..=10 {
            tree.update_region(id, |region| {
                if let Shape::Rect(rect) = &mut region.shape {
                    rect.x = step as f64;
                }
            });
        }
        tree.unfreeze();

        // One undo rewinds the whole drag.
        assert!(tree.undo());
        let region = tree.region(id).expect("still there");
        let Shape::Rect(rect) = &region.shape else {
            panic!("expected rect");
        };
        assert_eq!(rect.x, 0.0);
    }

    #[test]
    fn test_update_item_size_is_drift_free() {
        let mut tree = tree_1000x800();
        let id = draw_rect(&mut tree, (100.0, 100.0), (300.0, 250.0));
        let before = tree.serialize();

        tree.update_item_size(500, 400);
        tree.update_item_size(2000, 1600);
        tree.update_item_size(1000, 800);

        assert_eq!(tree.serialize(), before);
        assert!(tree.region(id).is_some());
        // Re-projection of normalized regions is not an undoable edit;
        // only the original draw remains on the history.
        assert!(tree.can_undo());
        tree.undo();
        assert!(!tree.can_undo());
    }

    #[test]
    fn test_hit_test_returns_topmost() {
        let mut tree = tree_1000x800();
        let bottom = draw_rect(&mut tree, (0.0, 0.0), (500.0, 500.0));
        let top = draw_rect(&mut tree, (100.0, 100.0), (300.0, 300.0));

        assert_eq!(tree.hit_test(Coord::new(200.0, 200.0)), Some(top));
        assert_eq!(tree.hit_test(Coord::new(450.0, 450.0)), Some(bottom));
        assert_eq!(tree.hit_test(Coord::new(900.0, 700.0)), None);
    }

    #[test]
    fn test_selection_is_exclusive_and_not_undoable() {
        let mut tree = tree_1000x800();
        let a = draw_rect(&mut tree, (0.0, 0.0), (100.0, 100.0));
        let b = draw_rect(&mut tree, (200.0, 200.0), (300.0, 300.0));

        assert!(tree.select_region(a));
        assert!(tree.select_region(b));
        let selected: Vec<_> = tree
            .regions()
            .iter()
            .filter(|region| region.selected)
            .map(|region| region.id)
            .collect();
        assert_eq!(selected, vec![b]);

        // Two draws recorded two snapshots; selection added none.
        tree.undo();
        tree.undo();
        assert!(!tree.can_undo());
    }

    #[test]
    fn test_serialize_deserialize_roundtrip() {
        let mut tree = tree_1000x800();
        tree.set_original_size(1000, 800);
        let a = draw_rect(&mut tree, (100.0, 100.0), (300.0, 250.0));
        let b = draw_rect(&mut tree, (500.0, 400.0), (700.0, 600.0));
        tree.update_region(a, |region| {
            region.add_label(LabelState::new(
                "label",
                ControlKind::RectangleLabels,
                vec!["car".to_string()],
            ));
        });
        tree.add_relation(a, b);

        let records = tree.serialize();

        let mut restored = tree_1000x800();
        restored.deserialize(&records).expect("roundtrip");

        assert_eq!(restored.regions().len(), 2);
        assert_eq!(restored.relations().len(), 1);
        assert_eq!(restored.serialize(), records);
        // Loaded state is the new creation snapshot.
        assert!(!restored.can_undo());
    }

    #[test]
    fn test_deserialize_failure_leaves_tree_untouched() {
        let mut tree = tree_1000x800();
        draw_rect(&mut tree, (0.0, 0.0), (100.0, 100.0));
        let before = tree.serialize();

        let bad = vec![ResultRecord {
            id: Some("zz".to_string()),
            kind: "hypercube".to_string(),
            value: Some(serde_json::json!({})),
            ..ResultRecord::default()
        }];
        assert!(tree.deserialize(&bad).is_err());
        assert_eq!(tree.serialize(), before);
    }

    #[test]
    fn test_deserialize_rejects_unregistered_label_control() {
        let mut source = AnnotationTree::new("image", ItemViewport::new(100, 100));
        let id = source.insert_region(Shape::Rect(Rect::new(1.0, 2.0, 3.0, 4.0)));
        source.update_region(id, |region| {
            region.add_label(LabelState::new(
                "mystery",
                ControlKind::RectangleLabels,
                vec!["x".to_string()],
            ));
        });
        let records = source.serialize();

        let mut strict = tree_1000x800();
        let err = strict.deserialize(&records).expect_err("unknown control");
        assert!(matches!(err, RegionKitError::UnregisteredControl { .. }));
    }

    #[test]
    fn test_generated_result_ids_are_wire_safe() {
        let id = generate_result_id();
        assert_eq!(id.len(), ID_LENGTH);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
