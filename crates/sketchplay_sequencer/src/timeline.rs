// SPDX-License-Identifier: MIT OR Apache-2.0
//! The timeline coordinator.
//!
//! Owns the canonical time and fans every update or seek out to the
//! registered tracks. Raw times are seconds on the driving clock; canonical
//! times are milliseconds on the recording, shifted by the calibration
//! offset:
//!
//! ```text
//! canonical = (raw - offsets.time) * 1000
//! ```

use crate::clock::round_ratio;
use crate::signal::Signal;
use crate::track::{PlaybackTrack, TrackId};
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Placement tweak for one side of the artist capture
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpatialAdjustment {
    /// X offset
    pub x: f32,
    /// Y offset
    pub y: f32,
    /// Z offset
    pub z: f32,
    /// Pitch in degrees
    pub pitch: f32,
    /// Yaw in degrees
    pub yaw: f32,
    /// Roll in degrees
    pub roll: f32,
}

/// Calibration values for one loaded sketch.
///
/// These are live-tunable: the timeline reads `time` on every call.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimelineOffsets {
    /// Sync offset between the video and the recording, in seconds
    pub time: f64,
    /// Last published playhead ratio, written every frame
    pub playhead: f64,
    /// Height of the ground plane
    pub position_ground: f32,
    /// Height the orbit camera looks at
    pub camera_target_height: Option<f32>,
    /// Front capture placement
    pub position_a: SpatialAdjustment,
    /// Back capture placement
    pub position_b: SpatialAdjustment,
    /// Placement of both captures
    pub position_both: SpatialAdjustment,
    /// Recording start time
    pub sketch_start_time: f64,
    /// Video start offset
    pub video_offset_time: f64,
}

/// Offsets shared between the loader, the timeline and the view
pub type SharedOffsets = Arc<RwLock<TimelineOffsets>>;

/// Wrap offsets for sharing
pub fn shared_offsets(offsets: TimelineOffsets) -> SharedOffsets {
    Arc::new(RwLock::new(offsets))
}

/// Timeline transport state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimelineState {
    /// Not advancing
    #[default]
    Stopped,
    /// Advancing
    Playing,
}

/// Registers tracks before the duration is fixed
pub struct TimelineBuilder {
    tracks: IndexMap<TrackId, Box<dyn PlaybackTrack>>,
    offsets: SharedOffsets,
}

impl TimelineBuilder {
    /// Start a timeline reading the given offsets
    pub fn new(offsets: SharedOffsets) -> Self {
        Self {
            tracks: IndexMap::new(),
            offsets,
        }
    }

    /// Register a track
    pub fn add_track(&mut self, track: Box<dyn PlaybackTrack>) -> TrackId {
        let id = TrackId::new();
        self.tracks.insert(id, track);
        id
    }

    /// Fix the duration and create the coordinator
    pub fn build(self) -> TimelineCoordinator {
        let total_duration = self
            .tracks
            .values()
            .map(|t| t.end_time())
            .fold(0.0, f64::max);
        debug!(
            "Timeline built with {} tracks, {:.0}ms long",
            self.tracks.len(),
            total_duration
        );

        TimelineCoordinator {
            tracks: self.tracks,
            offsets: self.offsets,
            state: TimelineState::Stopped,
            time: 0.0,
            canonical_time: 0.0,
            total_duration,
            on_tick: Signal::new(),
            on_seek: Signal::new(),
        }
    }
}

/// Drives every registered track from one canonical time
pub struct TimelineCoordinator {
    tracks: IndexMap<TrackId, Box<dyn PlaybackTrack>>,
    offsets: SharedOffsets,
    state: TimelineState,
    /// Raw time in seconds, never negative
    time: f64,
    canonical_time: f64,
    total_duration: f64,
    /// Fired after every update with the canonical time
    pub on_tick: Signal<f64>,
    /// Fired after every seek with the canonical time
    pub on_seek: Signal<f64>,
}

impl TimelineCoordinator {
    fn set_time(&mut self, raw: f64) -> f64 {
        self.time = if raw > 0.0 { raw } else { 0.0 };
        let offset = self.offsets.read().time;
        self.canonical_time = (raw - offset) * 1000.0;
        self.canonical_time
    }

    /// Move to `raw` seconds and advance every track
    pub fn update(&mut self, raw: f64) {
        let canonical = self.set_time(raw);
        for track in self.tracks.values_mut() {
            track.advance_to(canonical);
        }
        self.on_tick.emit(&canonical);
    }

    /// Jump to `raw` seconds.
    ///
    /// Tracks are only reset here; they catch up on the next
    /// [`update`](Self::update).
    pub fn seek(&mut self, raw: f64) {
        let canonical = self.set_time(raw);
        debug!("Timeline seek to {raw:.3}s ({canonical:.0}ms)");
        for track in self.tracks.values_mut() {
            track.reset();
        }
        self.on_seek.emit(&canonical);
    }

    /// Jump to a ratio of the duration
    pub fn seek_to_ratio(&mut self, ratio: f64) {
        self.seek(self.duration_seconds() * ratio);
    }

    /// Start advancing
    pub fn play(&mut self) {
        self.state = TimelineState::Playing;
    }

    /// Stop advancing
    pub fn pause(&mut self) {
        self.state = TimelineState::Stopped;
    }

    /// Whether the timeline is playing
    pub fn is_playing(&self) -> bool {
        self.state == TimelineState::Playing
    }

    /// Transport state
    pub fn state(&self) -> TimelineState {
        self.state
    }

    /// Raw time in seconds
    pub fn current_time(&self) -> f64 {
        self.time
    }

    /// Canonical time in milliseconds
    pub fn canonical_time(&self) -> f64 {
        self.canonical_time
    }

    /// Duration in canonical milliseconds
    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    /// Duration in seconds
    pub fn duration_seconds(&self) -> f64 {
        self.total_duration / 1000.0
    }

    /// Canonical time as a ratio of the duration.
    ///
    /// A timeline without duration is always complete.
    pub fn percentage(&self) -> f64 {
        if self.total_duration > 0.0 {
            self.canonical_time / self.total_duration
        } else {
            1.0
        }
    }

    /// Whether the canonical time reached the end
    pub fn is_finished(&self) -> bool {
        round_ratio(self.percentage()) >= 1.0
    }

    /// Canonical milliseconds at a ratio of the duration
    pub fn time_at_ratio(&self, ratio: f64) -> f64 {
        let offset = self.offsets.read().time;
        (self.duration_seconds() * ratio - offset) * 1000.0
    }

    /// Shared calibration offsets
    pub fn offsets(&self) -> &SharedOffsets {
        &self.offsets
    }

    /// Look up a registered track
    pub fn track(&self, id: TrackId) -> Option<&dyn PlaybackTrack> {
        self.tracks.get(&id).map(|t| t.as_ref())
    }

    /// Number of registered tracks
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }
}
