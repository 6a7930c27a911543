// SPDX-License-Identifier: MIT OR Apache-2.0
//! Playback and synchronization engine for recorded sketch sessions.
//!
//! A sketch session is recorded as several independent time series:
//! - Stroke creation and deletion events
//! - VR input samples (headset, controllers, mirror)
//! - Straight-edge tool uses
//! - Optionally, a video of the artist
//!
//! ## Architecture
//!
//! The engine is built on:
//! - Clock sources (media-driven or synthetic)
//! - Event tracks replayed by monotonic cursors
//! - A timeline coordinator fanning one canonical time out to every track
//! - An edit overlay restricting playback to user-defined cuts
//! - A playback orchestrator exposing the transport surface

pub mod clock;
pub mod config;
pub mod cuts;
pub mod document;
pub mod error;
pub mod input;
pub mod loader;
pub mod player;
pub mod pose;
pub mod session;
pub mod signal;
pub mod straight_edge;
pub mod stroke;
pub mod timeline;
pub mod track;

#[cfg(test)]
mod testing;

pub use clock::{round_ratio, ClockSource, ClockTick, MediaBackend, MediaClock, SyntheticClock};
pub use config::{PlayerConfig, VideoContainer, VideoResolution, VideoSettings, VideoSource};
pub use cuts::{CutList, CutRange, EditAction, EditPlayback, SavedCut};
pub use document::{ActionLog, EditingMeta, SketchMeta};
pub use error::{ConfigError, LoadError, Result};
pub use input::{InputSample, InputTrack, PoseSink};
pub use loader::{DirectorySource, LoadedSketch, MediaProvider, MemorySource, NoMedia, SketchLoader, SketchSource};
pub use player::{PlayOutcome, SketchPlayer, ViewBindings};
pub use pose::{Interpolation, Pose, RigPose};
pub use session::SketchSession;
pub use signal::{Signal, SubscriptionId};
pub use straight_edge::{StraightEdgeAction, StraightEdgeSink, StraightEdgeTrack};
pub use stroke::{build_stroke_tracks, StrokeSegment, StrokeSinkFactory};
pub use timeline::{SharedOffsets, TimelineBuilder, TimelineCoordinator, TimelineOffsets, TimelineState};
pub use track::{EventTrack, EventTrackBuilder, NullSink, PlaybackTrack, RevealSink, SeekCursor, StrokeId, TrackId};
