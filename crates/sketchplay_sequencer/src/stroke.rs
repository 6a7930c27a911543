// SPDX-License-Identifier: MIT OR Apache-2.0
//! Stroke tracks built from the action log.
//!
//! Geometry is merged per brush by the view, so there is one event track per
//! brush index. Each recorded control point is an entry; revealing it grows
//! the stroke by one segment.

use crate::document::ActionLog;
use crate::track::{EventTrack, EventTrackBuilder, NullSink, RevealSink, StrokeId};
use std::collections::BTreeMap;
use tracing::debug;

/// Payload of a stroke entry: one control point of one sub-path
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeSegment {
    /// Owning stroke
    pub stroke_id: StrokeId,
    /// Brush index
    pub brush: usize,
    /// Sub-path within the stroke
    pub path: usize,
    /// Control point within the sub-path
    pub point: usize,
    /// Control point position
    pub position: [f32; 3],
    /// Control point orientation
    pub rotation: [f32; 4],
}

/// Hands out the view sink for each brush track
pub trait StrokeSinkFactory {
    /// Sink for the brush at `brush`, named `name` in the brush table
    fn sink_for(&mut self, brush: usize, name: &str) -> Box<dyn RevealSink<StrokeSegment>>;
}

impl StrokeSinkFactory for NullSink {
    fn sink_for(&mut self, _brush: usize, _name: &str) -> Box<dyn RevealSink<StrokeSegment>> {
        Box::new(NullSink)
    }
}

impl<F> StrokeSinkFactory for F
where
    F: FnMut(usize, &str) -> Box<dyn RevealSink<StrokeSegment>>,
{
    fn sink_for(&mut self, brush: usize, name: &str) -> Box<dyn RevealSink<StrokeSegment>> {
        self(brush, name)
    }
}

/// Build one event track per brush used in the log.
///
/// Tracks are returned by ascending brush index. Every deletion is offered to
/// every track; tracks that never hold the stroke ignore it.
pub fn build_stroke_tracks(
    log: &ActionLog,
    sinks: &mut dyn StrokeSinkFactory,
) -> Vec<EventTrack<StrokeSegment>> {
    let mut builders: BTreeMap<usize, EventTrackBuilder<StrokeSegment>> = BTreeMap::new();

    for stroke in log.strokes() {
        let stroke_id = StrokeId(stroke.id);
        let builder = builders.entry(stroke.brush).or_insert_with(|| {
            let name = log.brush_name(stroke.brush).unwrap_or("unknown");
            EventTrackBuilder::new(format!("brush:{name}"))
        });

        for (path, points) in stroke.points.iter().enumerate() {
            for (point, control) in points.iter().enumerate() {
                builder.push(
                    stroke_id,
                    control.t,
                    StrokeSegment {
                        stroke_id,
                        brush: stroke.brush,
                        path,
                        point,
                        position: control.pos.0,
                        rotation: control.pos.1,
                    },
                );
            }
        }
    }

    for (stroke_id, time) in log.deletions() {
        for builder in builders.values_mut() {
            builder.delete(stroke_id, time);
        }
    }

    builders
        .into_iter()
        .map(|(brush, builder)| {
            let name = log.brush_name(brush).unwrap_or("unknown");
            debug!("Brush {name} replays {} control points", builder.len());
            builder.build(sinks.sink_for(brush, name))
        })
        .collect()
}
