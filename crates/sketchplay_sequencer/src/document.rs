// SPDX-License-Identifier: MIT OR Apache-2.0
//! JSON documents describing one recorded sketch.
//!
//! A sketch directory holds `meta.json`, `actions.json` and `input.json`,
//! plus `playback.json`, `offsets.json` and `editing.json` when a video of
//! the artist was recorded.

use crate::error::{LoadError, Result};
use crate::straight_edge::StraightEdgeAction;
use crate::track::StrokeId;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Parse a fetched document, tagging errors with its name
pub fn parse<T: DeserializeOwned>(document: &str, text: &str) -> Result<T> {
    serde_json::from_str(text).map_err(|source| LoadError::Parse {
        document: document.to_string(),
        source,
    })
}

/// Reference to the artist video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRef {
    /// Path of the video relative to the media root
    pub source: String,
}

/// Contents of `meta.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SketchMeta {
    /// Video recorded alongside the sketch, if any
    pub video: Option<VideoRef>,
    /// Presentation settings chosen by the artist
    pub artist_settings: serde_json::Value,
    /// Post-processing settings for the view
    pub postprocessing: serde_json::Value,
}

impl SketchMeta {
    /// Whether a video was recorded
    pub fn has_video(&self) -> bool {
        self.video.is_some()
    }
}

/// Contents of `editing.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditingMeta {
    /// Saved cut list to load for edit playback
    pub test_edit: Option<String>,
}

/// `metadata` block of the action log
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionMetadata {
    /// Brush names indexed by the `brush` field of strokes
    #[serde(rename = "BrushIndex", default)]
    pub brush_index: Vec<String>,
}

/// A recorded control point: `t` plus `pos = [[x, y, z], [qx, qy, qz, qw]]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    /// Time in canonical milliseconds
    pub t: f64,
    /// Position and orientation
    pub pos: ([f32; 3], [f32; 4]),
}

/// Payload of a `STROKE` action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeData {
    /// Stroke identifier referenced by deletions
    pub id: u64,
    /// Index into [`ActionMetadata::brush_index`]
    pub brush: usize,
    /// Brush size
    #[serde(default)]
    pub b_size: f32,
    /// RGB(A) colour
    #[serde(default)]
    pub color: Vec<f32>,
    /// Sub-paths of control points
    #[serde(default)]
    pub points: Vec<Vec<ControlPoint>>,
}

/// Payload of a `DELETE` action
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeleteData {
    /// Deleted stroke
    #[serde(rename = "strokeID")]
    pub stroke_id: u64,
}

/// Payload of a `STRAIGHT_TOOL_START` action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StraightToolData {
    /// Anchor position followed by the tool orientation
    pub pos: Vec<Vec<f32>>,
    /// Time the tool was released
    #[serde(rename = "endTime")]
    pub end_time: f64,
}

impl StraightToolData {
    /// Anchor point of the guide
    pub fn anchor(&self) -> [f32; 3] {
        let mut anchor = [0.0; 3];
        if let Some(position) = self.pos.first() {
            for (dst, src) in anchor.iter_mut().zip(position) {
                *dst = *src;
            }
        }
        anchor
    }
}

/// One entry of the action log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Action {
    /// A stroke was drawn
    #[serde(rename = "STROKE")]
    Stroke {
        /// Action time
        time: f64,
        /// Stroke geometry
        data: StrokeData,
    },
    /// A stroke was erased
    #[serde(rename = "DELETE")]
    Delete {
        /// Deletion time
        time: f64,
        /// Deleted stroke
        data: DeleteData,
    },
    /// The straight-edge tool was engaged
    #[serde(rename = "STRAIGHT_TOOL_START")]
    StraightToolStart {
        /// Start time
        time: f64,
        /// Guide placement
        data: StraightToolData,
    },
    /// Any action the player does not replay
    #[serde(other)]
    Other,
}

/// Contents of `actions.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionLog {
    /// Brush table
    #[serde(default)]
    pub metadata: ActionMetadata,
    /// Actions in recording order
    #[serde(default)]
    pub actions: Vec<Action>,
}

impl ActionLog {
    /// Stroke payloads in recording order
    pub fn strokes(&self) -> impl Iterator<Item = &StrokeData> {
        self.actions.iter().filter_map(|action| match action {
            Action::Stroke { data, .. } => Some(data),
            _ => None,
        })
    }

    /// Deletion markers in recording order
    pub fn deletions(&self) -> impl Iterator<Item = (StrokeId, f64)> + '_ {
        self.actions.iter().filter_map(|action| match action {
            Action::Delete { time, data } => Some((StrokeId(data.stroke_id), *time)),
            _ => None,
        })
    }

    /// Straight-edge tool uses in recording order
    pub fn straight_edge_actions(&self) -> Vec<StraightEdgeAction> {
        self.actions
            .iter()
            .filter_map(|action| match action {
                Action::StraightToolStart { time, data } => Some(StraightEdgeAction {
                    position: data.anchor(),
                    time: *time,
                    end_time: data.end_time,
                }),
                _ => None,
            })
            .collect()
    }

    /// Name of a brush index
    pub fn brush_name(&self, brush: usize) -> Option<&str> {
        self.metadata.brush_index.get(brush).map(String::as_str)
    }
}
