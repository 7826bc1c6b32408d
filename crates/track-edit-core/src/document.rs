//! Track document model.
//!
//! A `TrackDocument` splits into two parts with different owners:
//! `TrackContent` (name, geometry, metadata) is what the user edits and what
//! history snapshots capture, while `layers` belong to the map renderer and
//! must always be read from the live document. The remaining flags are
//! transient signals for downstream consumers.

use serde::{Deserialize, Serialize};

use crate::history::generate_local_track_name;

/// A single recorded position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    pub lat: f64,
    pub lng: f64,
    /// Elevation in meters, if known.
    pub ele: Option<f64>,
}

impl TrackPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            ele: None,
        }
    }
}

/// An ordered run of track points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Segment {
    pub points: Vec<TrackPoint>,
}

impl Segment {
    pub fn new(points: Vec<TrackPoint>) -> Self {
        Self { points }
    }
}

/// A named point of interest attached to the track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub name: String,
    pub point: TrackPoint,
}

/// Editable styling and routing metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackMetadata {
    /// Routing profile used when recomputing segments (e.g. "car", "bicycle").
    pub profile: String,
    /// Line color as a hex string.
    pub color: Option<String>,
    /// Line width in pixels.
    pub width: Option<u32>,
    pub description: String,
}

/// The user-editable fields of a track.
///
/// This is exactly what a history snapshot captures. The default value is
/// the canonical empty content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackContent {
    pub name: String,
    pub segments: Vec<Segment>,
    pub waypoints: Vec<Waypoint>,
    pub metadata: TrackMetadata,
}

impl TrackContent {
    /// True when no segment holds a point and there are no waypoints.
    ///
    /// Name and metadata are ignored: a named track with a profile but no
    /// geometry is still empty.
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty() && self.segments.iter().all(|s| s.points.is_empty())
    }

    /// Total number of track points across all segments.
    pub fn point_count(&self) -> usize {
        self.segments.iter().map(|s| s.points.len()).sum()
    }
}

/// Handle to a geometry layer drawn by the map renderer.
///
/// The core never interprets these; it only carries the live value forward.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerHandle {
    pub id: u64,
    pub kind: String,
}

impl LayerHandle {
    pub fn new(id: u64, kind: impl Into<String>) -> Self {
        Self {
            id,
            kind: kind.into(),
        }
    }
}

/// The track currently being edited.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackDocument {
    pub content: TrackContent,
    /// Renderer-owned layers. Never restored from a snapshot.
    pub layers: Vec<LayerHandle>,
    /// Asks the renderer to rebuild `layers` from `content`.
    pub update_layers: bool,
    /// Asks the router to recompute segments for the current profile.
    pub get_routing: bool,
    /// Asks the surrounding UI to open the save dialog.
    pub save: bool,
}

impl TrackDocument {
    /// Creates a document around existing content with no layers or flags.
    pub fn new(content: TrackContent) -> Self {
        Self {
            content,
            ..Self::default()
        }
    }

    /// Creates an empty local track with a generated name and the given
    /// routing profile.
    pub fn new_local(profile: &str) -> Self {
        Self::new(TrackContent {
            name: generate_local_track_name(),
            metadata: TrackMetadata {
                profile: profile.to_string(),
                ..TrackMetadata::default()
            },
            ..TrackContent::default()
        })
    }

    pub fn name(&self) -> &str {
        &self.content.name
    }
}

/// Whether `doc` carries no geometry. See [`TrackContent::is_empty`].
pub fn is_empty_track(doc: &TrackDocument) -> bool {
    doc.content.is_empty()
}
