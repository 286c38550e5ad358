//! Brush (freehand mask) region geometry.
//!
//! A brush region carries its geometry in one of two encodings: an
//! ordered list of freehand strokes (each with its own width and a
//! paint/erase compose mode) recorded during drawing, or the canonical
//! run-length-encoded bitmap over the item's intrinsic pixel grid.
//! Strokes are flattened into the canonical RLE before serialization;
//! the raw strokes only go over the wire on the incremental-save path
//! when no raster grid is known.
//!
//! The RLE is a list of alternating run lengths over the row-major
//! bitmap, starting with a run of unset pixels (which may be zero). It is
//! only meaningful together with the grid dimensions, which is why wire
//! records always pair it with `original_width`/`original_height`.

use serde::{Deserialize, Serialize};

use crate::geom::{BBox, Canvas, Coord, ItemViewport, Norm, NORM_EXTENT};

/// How a stroke composes into the mask.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compose {
    /// The stroke paints pixels into the mask.
    Add,
    /// The stroke subtracts pixels from the mask.
    Eraser,
}

/// One freehand stroke: a polyline with a thickness and a compose mode.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    /// Polyline vertices, normalized 0–100.
    pub points: Vec<Coord<Norm>>,
    /// Stroke thickness in raster-grid pixels.
    pub width: f64,
    /// Paint or erase.
    pub mode: Compose,
}

/// The two geometry encodings a brush region can hold.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum MaskData {
    /// Ordered strokes as drawn; not yet flattened.
    Strokes(Vec<Stroke>),
    /// Canonical run-length-encoded bitmap.
    Rle(RleMask),
}

/// A run-length-encoded bitmap over a pixel grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RleMask {
    /// Alternating run lengths, starting with unset pixels.
    pub runs: Vec<u32>,
}

/// A decoded row-major bitmap.
#[derive(Clone, Debug, PartialEq)]
pub struct MaskBitmap {
    pub width: u32,
    pub height: u32,
    pub data: Vec<bool>,
}

/// A brush region: a mask over the item's intrinsic pixel grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Brush {
    /// Raster grid width (the item's intrinsic pixel width).
    pub mask_width: u32,
    /// Raster grid height (the item's intrinsic pixel height).
    pub mask_height: u32,
    pub data: MaskData,
}

impl RleMask {
    /// Encodes a bitmap into alternating run lengths.
    pub fn encode(bitmap: &MaskBitmap) -> Self {
        let mut runs = Vec::new();
        let mut current = false;
        let mut count: u32 = 0;

        for &pixel in &bitmap.data {
            if pixel == current {
                count += 1;
            } else {
                runs.push(count);
                current = pixel;
                count = 1;
            }
        }
        runs.push(count);

        Self { runs }
    }

    /// Decodes into a bitmap of the given dimensions.
    ///
    /// Returns None when the run lengths do not cover the grid exactly.
    pub fn decode(&self, width: u32, height: u32) -> Option<MaskBitmap> {
        let expected = width as usize * height as usize;
        let total: usize = self.runs.iter().map(|&r| r as usize).sum();
        if total != expected {
            return None;
        }

        let mut data = Vec::with_capacity(expected);
        let mut value = false;
        for &run in &self.runs {
            data.extend(std::iter::repeat(value).take(run as usize));
            value = !value;
        }

        Some(MaskBitmap {
            width,
            height,
            data,
        })
    }

    /// Reads one pixel by walking the runs, without decoding the bitmap.
    pub fn pixel(&self, x: u32, y: u32, width: u32) -> bool {
        let index = (y as u64 * width as u64 + x as u64) as u64;
        let mut seen: u64 = 0;
        let mut value = false;
        for &run in &self.runs {
            seen += run as u64;
            if index < seen {
                return value;
            }
            value = !value;
        }
        false
    }

    /// Number of set pixels.
    pub fn set_count(&self) -> u64 {
        self.runs
            .iter()
            .enumerate()
            .filter(|(i, _)| i % 2 == 1)
            .map(|(_, &r)| r as u64)
            .sum()
    }
}

impl MaskBitmap {
    /// Creates an empty bitmap.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![false; width as usize * height as usize],
        }
    }

    #[inline]
    fn set(&mut self, x: i64, y: i64, value: bool) {
        if x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height {
            self.data[y as usize * self.width as usize + x as usize] = value;
        }
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> bool {
        if x < self.width && y < self.height {
            self.data[y as usize * self.width as usize + x as usize]
        } else {
            false
        }
    }

    /// Stamps a filled disc, painting or clearing pixels.
    fn stamp(&mut self, cx: f64, cy: f64, radius: f64, value: bool) {
        let r = radius.max(0.5);
        let x0 = (cx - r).floor() as i64;
        let x1 = (cx + r).ceil() as i64;
        let y0 = (cy - r).floor() as i64;
        let y1 = (cy + r).ceil() as i64;

        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f64 + 0.5 - cx;
                let dy = y as f64 + 0.5 - cy;
                if dx * dx + dy * dy <= r * r {
                    self.set(x, y, value);
                }
            }
        }
    }
}

impl Brush {
    /// Creates an empty stroke-encoded brush over the given raster grid.
    pub fn new(mask_width: u32, mask_height: u32) -> Self {
        Self {
            mask_width,
            mask_height,
            data: MaskData::Strokes(Vec::new()),
        }
    }

    /// Creates a brush from an already-encoded mask.
    pub fn from_rle(mask_width: u32, mask_height: u32, rle: RleMask) -> Self {
        Self {
            mask_width,
            mask_height,
            data: MaskData::Rle(rle),
        }
    }

    /// Whether the raster grid dimensions are known.
    pub fn has_grid(&self) -> bool {
        self.mask_width > 0 && self.mask_height > 0
    }

    /// Begins a new stroke.
    ///
    /// Starting a stroke on an RLE-encoded brush discards the encoded
    /// mask and begins a fresh stroke list; converting an RLE back into
    /// strokes is not supported.
    pub fn begin_stroke(&mut self, width: f64, mode: Compose) {
        if !matches!(self.data, MaskData::Strokes(_)) {
            self.data = MaskData::Strokes(Vec::new());
        }
        if let MaskData::Strokes(strokes) = &mut self.data {
            strokes.push(Stroke {
                points: Vec::new(),
                width,
                mode,
            });
        }
    }

    /// Extends the current stroke with a canvas point.
    pub fn extend_stroke(&mut self, point: Coord<Canvas>, viewport: &ItemViewport) {
        if let MaskData::Strokes(strokes) = &mut self.data {
            if let Some(stroke) = strokes.last_mut() {
                stroke.points.push(viewport.to_norm(point));
            }
        }
    }

    /// Rasterizes the stroke list over the brush's grid.
    ///
    /// Strokes compose in order: paint strokes set pixels, eraser strokes
    /// clear them. Discs are stamped along each segment densely enough
    /// that no gaps appear at any stroke width.
    pub fn rasterize(&self) -> Option<MaskBitmap> {
        if !self.has_grid() {
            return None;
        }

        let mut bitmap = MaskBitmap::new(self.mask_width, self.mask_height);

        let strokes = match &self.data {
            MaskData::Strokes(strokes) => strokes,
            MaskData::Rle(rle) => {
                return rle.decode(self.mask_width, self.mask_height);
            }
        };

        let sx = self.mask_width as f64 / NORM_EXTENT;
        let sy = self.mask_height as f64 / NORM_EXTENT;

        for stroke in strokes {
            let value = stroke.mode == Compose::Add;
            let radius = stroke.width / 2.0;

            let grid: Vec<(f64, f64)> = stroke
                .points
                .iter()
                .map(|p| (p.x * sx, p.y * sy))
                .collect();

            match grid.len() {
                0 => {}
                1 => bitmap.stamp(grid[0].0, grid[0].1, radius, value),
                _ => {
                    for pair in grid.windows(2) {
                        let (x0, y0) = pair[0];
                        let (x1, y1) = pair[1];
                        let length = ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt();
                        let step = (radius / 2.0).max(0.5);
                        let samples = (length / step).ceil() as usize + 1;
                        for s in 0..=samples {
                            let t = s as f64 / samples as f64;
                            bitmap.stamp(
                                x0 + (x1 - x0) * t,
                                y0 + (y1 - y0) * t,
                                radius,
                                value,
                            );
                        }
                    }
                }
            }
        }

        Some(bitmap)
    }

    /// Flattens the stroke encoding into the canonical RLE encoding.
    ///
    /// A no-op for an already-encoded brush. Returns false when no raster
    /// grid is known (the brush stays in stroke form).
    pub fn flatten(&mut self) -> bool {
        if matches!(self.data, MaskData::Rle(_)) {
            return true;
        }
        match self.rasterize() {
            Some(bitmap) => {
                self.data = MaskData::Rle(RleMask::encode(&bitmap));
                true
            }
            None => false,
        }
    }

    /// Hit test against the mask.
    ///
    /// RLE form reads the pixel under the probe directly from the runs;
    /// stroke form replays the strokes in order, so an eraser stroke over
    /// the probe unpaints it again.
    pub fn contains(&self, probe: Coord<Canvas>, viewport: &ItemViewport) -> bool {
        if !self.has_grid() {
            return false;
        }

        let norm = viewport.to_norm(probe);
        let gx = norm.x * self.mask_width as f64 / NORM_EXTENT;
        let gy = norm.y * self.mask_height as f64 / NORM_EXTENT;

        match &self.data {
            MaskData::Rle(rle) => {
                if gx < 0.0 || gy < 0.0 {
                    return false;
                }
                let (x, y) = (gx as u32, gy as u32);
                if x >= self.mask_width || y >= self.mask_height {
                    return false;
                }
                rle.pixel(x, y, self.mask_width)
            }
            MaskData::Strokes(strokes) => {
                let mut painted = false;
                for stroke in strokes {
                    if self.stroke_covers(stroke, gx, gy) {
                        painted = stroke.mode == Compose::Add;
                    }
                }
                painted
            }
        }
    }

    fn stroke_covers(&self, stroke: &Stroke, gx: f64, gy: f64) -> bool {
        let sx = self.mask_width as f64 / NORM_EXTENT;
        let sy = self.mask_height as f64 / NORM_EXTENT;
        let radius = stroke.width / 2.0;

        let grid: Vec<(f64, f64)> = stroke
            .points
            .iter()
            .map(|p| (p.x * sx, p.y * sy))
            .collect();

        match grid.len() {
            0 => false,
            1 => {
                let (x, y) = grid[0];
                ((gx - x).powi(2) + (gy - y).powi(2)).sqrt() <= radius
            }
            _ => grid
                .windows(2)
                .any(|pair| segment_distance(pair[0], pair[1], (gx, gy)) <= radius),
        }
    }

    /// Bounding box of the painted area, normalized, or None when the
    /// mask is empty.
    ///
    /// Recomputed on read: the RLE scan touches every run, which is the
    /// one place recomputation cost shows up, so callers that paint
    /// continuously should cache the box across a gesture.
    pub fn bounding_box(&self) -> Option<BBox<Norm>> {
        if !self.has_grid() {
            return None;
        }

        match &self.data {
            MaskData::Rle(rle) => self.rle_bounding_box(rle),
            MaskData::Strokes(strokes) => self.stroke_bounding_box(strokes),
        }
    }

    fn rle_bounding_box(&self, rle: &RleMask) -> Option<BBox<Norm>> {
        let width = self.mask_width as u64;
        let mut min_x = u64::MAX;
        let mut min_y = u64::MAX;
        let mut max_x = 0u64;
        let mut max_y = 0u64;
        let mut any = false;

        let mut offset: u64 = 0;
        let mut value = false;
        for &run in &rle.runs {
            if value && run > 0 {
                any = true;
                for index in offset..offset + run as u64 {
                    let (x, y) = (index % width, index / width);
                    min_x = min_x.min(x);
                    min_y = min_y.min(y);
                    max_x = max_x.max(x);
                    max_y = max_y.max(y);
                }
            }
            offset += run as u64;
            value = !value;
        }

        if !any {
            return None;
        }

        let sx = NORM_EXTENT / self.mask_width as f64;
        let sy = NORM_EXTENT / self.mask_height as f64;
        Some(BBox::from_ltrb(
            min_x as f64 * sx,
            min_y as f64 * sy,
            (max_x + 1) as f64 * sx,
            (max_y + 1) as f64 * sy,
        ))
    }

    fn stroke_bounding_box(&self, strokes: &[Stroke]) -> Option<BBox<Norm>> {
        let rx_scale = NORM_EXTENT / self.mask_width as f64;
        let ry_scale = NORM_EXTENT / self.mask_height as f64;

        let mut bbox: Option<BBox<Norm>> = None;
        for stroke in strokes {
            // Eraser strokes only shrink the mask; the box stays an
            // envelope without tracking them.
            if stroke.mode != Compose::Add || stroke.points.is_empty() {
                continue;
            }
            let rx = stroke.width / 2.0 * rx_scale;
            let ry = stroke.width / 2.0 * ry_scale;

            for point in &stroke.points {
                let candidate = BBox::from_ltrb(
                    point.x - rx,
                    point.y - ry,
                    point.x + rx,
                    point.y + ry,
                );
                bbox = Some(match bbox {
                    Some(existing) => existing.union(&candidate),
                    None => candidate,
                });
            }
        }
        bbox
    }
}

/// Distance from a point to a line segment.
fn segment_distance(a: (f64, f64), b: (f64, f64), p: (f64, f64)) -> f64 {
    let (ax, ay) = a;
    let (bx, by) = b;
    let (px, py) = p;

    let dx = bx - ax;
    let dy = by - ay;
    let len_sq = dx * dx + dy * dy;

    if len_sq < f64::EPSILON {
        return ((px - ax).powi(2) + (py - ay).powi(2)).sqrt();
    }

    let t = (((px - ax) * dx + (py - ay) * dy) / len_sq).clamp(0.0, 1.0);
    let cx = ax + t * dx;
    let cy = ay + t * dy;
    ((px - cx).powi(2) + (py - cy).powi(2)).sqrt()
}
