// SPDX-License-Identifier: MIT OR Apache-2.0
//! Replay of the straight-edge guide line.

use crate::track::{NullSink, PlaybackTrack};

/// One use of the straight-edge tool
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StraightEdgeAction {
    /// Anchor point of the guide line
    pub position: [f32; 3],
    /// Time the tool was engaged
    pub time: f64,
    /// Time the tool was released
    pub end_time: f64,
}

/// Receives guide line visibility
pub trait StraightEdgeSink {
    /// Called every frame the guide is active; the free end follows the
    /// right controller
    fn show(&mut self, anchor: [f32; 3]);
    /// Called when the guide goes away
    fn hide(&mut self);
}

impl StraightEdgeSink for NullSink {
    fn show(&mut self, _anchor: [f32; 3]) {}
    fn hide(&mut self) {}
}

/// Track replaying straight-edge tool uses
pub struct StraightEdgeTrack {
    actions: Vec<StraightEdgeAction>,
    next: usize,
    anchor: [f32; 3],
    active_until: f64,
    visible: bool,
    sink: Box<dyn StraightEdgeSink>,
}

impl StraightEdgeTrack {
    /// Create a track over actions sorted by time
    pub fn new(actions: Vec<StraightEdgeAction>, sink: Box<dyn StraightEdgeSink>) -> Self {
        Self {
            actions,
            next: 0,
            anchor: [0.0; 3],
            active_until: f64::NEG_INFINITY,
            visible: false,
            sink,
        }
    }

    /// Whether the guide is currently shown
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Anchor of the current or last guide
    pub fn anchor(&self) -> [f32; 3] {
        self.anchor
    }
}

impl PlaybackTrack for StraightEdgeTrack {
    fn name(&self) -> &str {
        "straight-edge"
    }

    fn advance_to(&mut self, time: f64) {
        while let Some(action) = self.actions.get(self.next) {
            if time < action.time {
                break;
            }
            self.anchor = action.position;
            self.active_until = action.end_time;
            self.next += 1;
        }

        if time <= self.active_until {
            self.visible = true;
            self.sink.show(self.anchor);
        } else if self.visible {
            self.visible = false;
            self.sink.hide();
        }
    }

    fn reset(&mut self) {
        self.next = 0;
        self.active_until = f64::NEG_INFINITY;
        self.visible = false;
        self.sink.hide();
    }

    fn end_time(&self) -> f64 {
        self.actions
            .iter()
            .map(|a| a.end_time)
            .fold(0.0, f64::max)
    }
}
