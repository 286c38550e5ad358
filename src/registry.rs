//! Control registry: the closed set of annotation control kinds.
//!
//! The original configuration layer dispatches on control tag names read
//! from project configuration at runtime. Here the set of control kinds
//! is a closed enum, and a registration table maps configured control
//! names onto it. The table is validated when the annotation tree is
//! constructed: a configuration that names an unknown tag fails fast
//! instead of surfacing later as a missing handler.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::RegionKitError;
use crate::region::RegionKind;

/// The closed set of control kinds a configuration can reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlKind {
    /// Labels attached to rectangle regions.
    RectangleLabels,
    /// Labels attached to ellipse regions.
    EllipseLabels,
    /// Labels attached to polygon regions.
    PolygonLabels,
    /// Labels attached to brush regions.
    BrushLabels,
    /// Labels attached to key point regions.
    KeyPointLabels,
    /// Labels attached to text span regions.
    Labels,
    /// Whole-region classification choices (no geometry of their own).
    Choices,
}

impl ControlKind {
    /// Parses a configuration tag name.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "rectanglelabels" => Some(Self::RectangleLabels),
            "ellipselabels" => Some(Self::EllipseLabels),
            "polygonlabels" => Some(Self::PolygonLabels),
            "brushlabels" => Some(Self::BrushLabels),
            "keypointlabels" => Some(Self::KeyPointLabels),
            "labels" => Some(Self::Labels),
            "choices" => Some(Self::Choices),
            _ => None,
        }
    }

    /// The wire tag for this control kind.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::RectangleLabels => "rectanglelabels",
            Self::EllipseLabels => "ellipselabels",
            Self::PolygonLabels => "polygonlabels",
            Self::BrushLabels => "brushlabels",
            Self::KeyPointLabels => "keypointlabels",
            Self::Labels => "labels",
            Self::Choices => "choices",
        }
    }

    /// The region kind this control draws, or None for classification-only
    /// controls.
    pub fn region_kind(&self) -> Option<RegionKind> {
        match self {
            Self::RectangleLabels => Some(RegionKind::Rect),
            Self::EllipseLabels => Some(RegionKind::Ellipse),
            Self::PolygonLabels => Some(RegionKind::Polygon),
            Self::BrushLabels => Some(RegionKind::Brush),
            Self::KeyPointLabels => Some(RegionKind::KeyPoint),
            Self::Labels => Some(RegionKind::TextSpan),
            Self::Choices => None,
        }
    }

    /// The control kind that labels regions of the given kind.
    pub fn for_region_kind(kind: RegionKind) -> Self {
        match kind {
            RegionKind::Rect => Self::RectangleLabels,
            RegionKind::Ellipse => Self::EllipseLabels,
            RegionKind::Polygon => Self::PolygonLabels,
            RegionKind::Brush => Self::BrushLabels,
            RegionKind::KeyPoint => Self::KeyPointLabels,
            RegionKind::TextSpan => Self::Labels,
        }
    }
}

/// Maps configured control names (wire `from_name`s) onto control kinds.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ControlRegistry {
    controls: BTreeMap<String, ControlKind>,
}

impl ControlRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from `(control name, tag)` pairs, failing on the
    /// first pair whose tag is not a known control kind.
    pub fn with_controls<'a>(
        entries: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, RegionKitError> {
        let mut registry = Self::new();
        for (name, tag) in entries {
            let kind = ControlKind::from_tag(tag).ok_or_else(|| {
                RegionKitError::UnregisteredControl {
                    name: format!("{name} ({tag})"),
                }
            })?;
            registry.controls.insert(name.to_string(), kind);
        }
        Ok(registry)
    }

    /// Registers one control by kind.
    pub fn register(&mut self, name: impl Into<String>, kind: ControlKind) {
        self.controls.insert(name.into(), kind);
    }

    /// Looks up a control by name.
    pub fn get(&self, name: &str) -> Option<ControlKind> {
        self.controls.get(name).copied()
    }

    /// Looks up a control by name, failing when it is not registered.
    pub fn kind_for(&self, name: &str) -> Result<ControlKind, RegionKitError> {
        self.get(name)
            .ok_or_else(|| RegionKitError::UnregisteredControl {
                name: name.to_string(),
            })
    }

    /// Number of registered controls.
    pub fn len(&self) -> usize {
        self.controls.len()
    }

    /// True when no controls are registered.
    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    /// Iterates over registered `(name, kind)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, ControlKind)> {
        self.controls.iter().map(|(name, kind)| (name.as_str(), *kind))
    }
}
