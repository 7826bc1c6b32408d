/// Replay scripts: a JSON list of session events run against a fresh store.
use serde::{Deserialize, Serialize};

use track_edit_core::{
    CommandAvailability, DocumentStore, HistorySummary, LayerHandle, ObjectType, Segment,
    SessionController, TrackContent, TrackDocument, TrackPoint, TrackStore,
};

/// One event of a replay script.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Open a track as the active edit target.
    Open {
        track: TrackContent,
        #[serde(default = "default_object_type")]
        object_type: ObjectType,
    },
    /// Open a new empty local track with the configured profile.
    New,
    /// Replace the track content, as an external editing tool would.
    Edit { track: TrackContent },
    /// Append a point to the last segment.
    AddPoint { lat: f64, lng: f64 },
    /// The renderer replaced its layers.
    SetLayers { layers: Vec<LayerHandle> },
    Undo,
    Redo,
    Clear,
    Close,
    /// Deliver pending store notifications.
    Pump,
}

fn default_object_type() -> ObjectType {
    ObjectType::LocalClientTrack
}

/// Outcome of a single step.
#[derive(Debug, Clone, Serialize)]
pub struct StepResult {
    pub step: usize,
    pub op: &'static str,
    /// Whether the step did anything (undo/redo/edit can be unavailable).
    pub applied: bool,
    pub summary: HistorySummary,
}

/// Final state after a replay.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub steps: Vec<StepResult>,
    pub summary: HistorySummary,
    pub availability: CommandAvailability,
    pub document: Option<TrackDocument>,
}

impl Step {
    fn name(&self) -> &'static str {
        match self {
            Step::Open { .. } => "open",
            Step::New => "new",
            Step::Edit { .. } => "edit",
            Step::AddPoint { .. } => "add_point",
            Step::SetLayers { .. } => "set_layers",
            Step::Undo => "undo",
            Step::Redo => "redo",
            Step::Clear => "clear",
            Step::Close => "close",
            Step::Pump => "pump",
        }
    }
}

/// Parses a script from JSON text.
pub fn parse(json: &str) -> anyhow::Result<Vec<Step>> {
    Ok(serde_json::from_str(json)?)
}

/// Runs `steps` in order against `session` and `store`.
///
/// Store notifications are delivered after every step, the way the UI event
/// loop forwards them.
pub fn replay(
    session: &mut SessionController,
    store: &mut TrackStore,
    steps: Vec<Step>,
    default_profile: &str,
) -> Report {
    let mut results = Vec::with_capacity(steps.len());
    for (i, step) in steps.into_iter().enumerate() {
        let op = step.name();
        let applied = match step {
            Step::Open { track, object_type } => {
                session.open(store, TrackDocument::new(track), object_type);
                true
            }
            Step::New => {
                session.open(
                    store,
                    TrackDocument::new_local(default_profile),
                    ObjectType::LocalClientTrack,
                );
                true
            }
            Step::Edit { track } => store.edit(|doc| doc.content = track),
            Step::AddPoint { lat, lng } => store.edit(|doc| {
                if doc.content.segments.is_empty() {
                    doc.content.segments.push(Segment::default());
                }
                if let Some(segment) = doc.content.segments.last_mut() {
                    segment.points.push(TrackPoint::new(lat, lng));
                }
            }),
            Step::SetLayers { layers } => store.set_layers(layers),
            Step::Undo => session.undo(store).is_some(),
            Step::Redo => session.redo(store).is_some(),
            Step::Clear => {
                session.clear(store);
                true
            }
            Step::Close => {
                session.close(store);
                true
            }
            Step::Pump => true,
        };
        session.on_external_change(store);
        if !applied {
            tracing::warn!("Step {i} ({op}) was not applied");
        }
        results.push(StepResult {
            step: i,
            op,
            applied,
            summary: session.summary(),
        });
    }

    Report {
        steps: results,
        summary: session.summary(),
        availability: session.availability(store),
        document: store.get().cloned(),
    }
}
