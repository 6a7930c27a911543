// SPDX-License-Identifier: MIT OR Apache-2.0
//! Event tracks replayed by monotonic cursors.
//!
//! An [`EventTrack`] holds entries sorted by time. Each frame the timeline
//! calls [`PlaybackTrack::advance_to`], which moves two forward-only cursors:
//! one over reveal times and one over deletion times. The cost per frame is
//! proportional to the number of entries crossed, not to the track length.
//! Moving backwards needs a [`PlaybackTrack::reset`] followed by a fresh
//! advance; that reset is O(n), which is acceptable since it only happens on
//! seeks.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Unique identifier for a registered track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackId(pub Uuid);

impl TrackId {
    /// Create a new random track ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TrackId {
    fn default() -> Self {
        Self::new()
    }
}

/// Stable identifier of a stroke across all tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StrokeId(pub u64);

/// A track the timeline can drive.
///
/// Times are canonical milliseconds.
pub trait PlaybackTrack {
    /// Track name for diagnostics
    fn name(&self) -> &str;

    /// Replay every change up to `time`
    fn advance_to(&mut self, time: f64);

    /// Rewind to the start and clear all state
    fn reset(&mut self);

    /// Time of the last change on the track
    fn end_time(&self) -> f64;
}

/// Receives reveal and hide notifications for entry payloads
pub trait RevealSink<P> {
    /// Make the payload live
    fn reveal(&mut self, payload: &P);
    /// Hide the payload
    fn hide(&mut self, payload: &P);
}

/// Sink that discards every notification
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl<P> RevealSink<P> for NullSink {
    fn reveal(&mut self, _payload: &P) {}
    fn hide(&mut self, _payload: &P) {}
}

/// One timed entry of an event track
#[derive(Debug, Clone, PartialEq)]
pub struct EventTrackEntry<P> {
    /// Stroke this entry belongs to
    pub stroke_id: StrokeId,
    /// Reveal time
    pub time: f64,
    /// Deletion time, infinite when never deleted
    pub deletion_time: f64,
    /// State applied on reveal and withdrawn on hide
    pub payload: P,
}

/// A deletion marker referencing a stroke by identifier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Deletion {
    /// Deleted stroke
    pub stroke_id: StrokeId,
    /// Deletion time
    pub time: f64,
}

/// Read positions of an event track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeekCursor {
    /// Next entry to reveal
    pub reveal_index: usize,
    /// Next deletion to apply
    pub delete_index: usize,
}

/// Collects entries and deletions for an [`EventTrack`]
#[derive(Debug, Clone)]
pub struct EventTrackBuilder<P> {
    name: String,
    entries: Vec<EventTrackEntry<P>>,
    deletions: Vec<Deletion>,
}

impl<P> EventTrackBuilder<P> {
    /// Start an empty track
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
            deletions: Vec::new(),
        }
    }

    /// Add an entry revealed at `time`
    pub fn push(&mut self, stroke_id: StrokeId, time: f64, payload: P) {
        self.entries.push(EventTrackEntry {
            stroke_id,
            time,
            deletion_time: f64::INFINITY,
            payload,
        });
    }

    /// Mark every entry of `stroke_id` as deleted at `time`.
    ///
    /// Markers for strokes this track never holds are ignored.
    pub fn delete(&mut self, stroke_id: StrokeId, time: f64) {
        self.deletions.push(Deletion { stroke_id, time });
    }

    /// Number of entries collected so far
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entry was collected
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sort, index and hand the entries to a track
    pub fn build(self, sink: Box<dyn RevealSink<P>>) -> EventTrack<P> {
        let Self {
            name,
            mut entries,
            deletions,
        } = self;

        // Stable: equal times keep their insertion order
        entries.sort_by(|a, b| a.time.total_cmp(&b.time));

        let mut stroke_index: HashMap<StrokeId, Vec<usize>> = HashMap::new();
        for (idx, entry) in entries.iter().enumerate() {
            stroke_index.entry(entry.stroke_id).or_default().push(idx);
        }

        for deletion in &deletions {
            let Some(indices) = stroke_index.get(&deletion.stroke_id) else {
                continue;
            };
            for &idx in indices {
                let entry = &mut entries[idx];
                if deletion.time < entry.deletion_time {
                    entry.deletion_time = deletion.time;
                }
            }
        }

        let mut deletion_order: Vec<usize> = (0..entries.len())
            .filter(|&idx| entries[idx].deletion_time.is_finite())
            .collect();
        deletion_order.sort_by(|&a, &b| entries[a].deletion_time.total_cmp(&entries[b].deletion_time));

        let end_time = entries.last().map_or(0.0, |e| e.time);
        let live = vec![false; entries.len()];

        let mut track = EventTrack {
            name,
            entries,
            deletion_order,
            stroke_index,
            cursor: SeekCursor::default(),
            live,
            sink,
            end_time,
        };
        track.reset();
        track
    }
}

/// Sorted, immutable log of reveal/hide changes
pub struct EventTrack<P> {
    name: String,
    entries: Vec<EventTrackEntry<P>>,
    /// Entry indices ordered by deletion time
    deletion_order: Vec<usize>,
    stroke_index: HashMap<StrokeId, Vec<usize>>,
    cursor: SeekCursor,
    live: Vec<bool>,
    sink: Box<dyn RevealSink<P>>,
    end_time: f64,
}

impl<P> EventTrack<P> {
    /// All entries in replay order
    pub fn entries(&self) -> &[EventTrackEntry<P>] {
        &self.entries
    }

    /// Indices of the entries belonging to a stroke
    pub fn entries_for(&self, stroke_id: StrokeId) -> &[usize] {
        self.stroke_index
            .get(&stroke_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether the entry at `index` is currently revealed
    pub fn is_revealed(&self, index: usize) -> bool {
        self.live.get(index).copied().unwrap_or(false)
    }

    /// Number of currently revealed entries
    pub fn revealed_count(&self) -> usize {
        self.live.iter().filter(|&&live| live).count()
    }

    /// Current read positions
    pub fn cursor(&self) -> SeekCursor {
        self.cursor
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the track holds no entry
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<P> PlaybackTrack for EventTrack<P> {
    fn name(&self) -> &str {
        &self.name
    }

    fn advance_to(&mut self, time: f64) {
        while let Some(entry) = self.entries.get(self.cursor.reveal_index) {
            if entry.time >= time {
                break;
            }
            // An entry whose deletion already passed stays hidden
            if entry.deletion_time > time {
                self.live[self.cursor.reveal_index] = true;
                self.sink.reveal(&entry.payload);
            }
            self.cursor.reveal_index += 1;
        }

        while let Some(&idx) = self.deletion_order.get(self.cursor.delete_index) {
            let entry = &self.entries[idx];
            if entry.deletion_time > time {
                break;
            }
            if self.live[idx] {
                self.live[idx] = false;
                self.sink.hide(&entry.payload);
            }
            self.cursor.delete_index += 1;
        }
    }

    fn reset(&mut self) {
        self.cursor = SeekCursor::default();
        for (entry, live) in self.entries.iter().zip(self.live.iter_mut()) {
            *live = false;
            self.sink.hide(&entry.payload);
        }
    }

    fn end_time(&self) -> f64 {
        self.end_time
    }
}
