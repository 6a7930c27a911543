// SPDX-License-Identifier: MIT OR Apache-2.0
//! Replay of recorded VR input.
//!
//! The input log is a flat list of numbers, one fixed-width tuple per
//! sample: the sample time followed by position and rotation of the
//! headset, right controller, left controller and mirror.

use crate::pose::{Pose, RigPose};
use crate::track::{NullSink, PlaybackTrack};
use tracing::warn;

/// Numbers per input sample: time + 4 × (position₃ + quaternion₄)
pub const SAMPLE_WIDTH: usize = 29;

/// Depth a mirror is parked at when the recording has none
pub const MIRROR_HIDDEN_Z: f32 = 100_000.0;

/// One recorded input sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputSample {
    /// Sample time in canonical milliseconds
    pub time: f64,
    /// Device poses
    pub pose: RigPose,
}

impl InputSample {
    /// Split a flat input log into samples.
    ///
    /// A trailing incomplete tuple is dropped.
    pub fn unpack(raw: &[f64]) -> Vec<InputSample> {
        let chunks = raw.chunks_exact(SAMPLE_WIDTH);
        if !chunks.remainder().is_empty() {
            warn!(
                "Dropping {} trailing input values (not a whole sample)",
                chunks.remainder().len()
            );
        }
        chunks.map(Self::from_tuple).collect()
    }

    fn from_tuple(values: &[f64]) -> InputSample {
        let pose_at = |offset: usize| {
            let v = |i: usize| values[offset + i] as f32;
            Pose {
                position: [v(0), v(1), v(2)],
                rotation: [v(3), v(4), v(5), v(6)],
            }
        };

        let mut mirror = pose_at(22);
        if mirror.position == [0.0, 0.0, 0.0] {
            mirror.position[2] = MIRROR_HIDDEN_Z;
        }

        InputSample {
            time: values[0],
            pose: RigPose {
                hmd: pose_at(1),
                right_hand: pose_at(8),
                left_hand: pose_at(15),
                mirror,
            },
        }
    }
}

/// Receives the interpolated rig pose each frame
pub trait PoseSink {
    /// Place the devices
    fn pose(&mut self, rig: &RigPose);
}

impl PoseSink for NullSink {
    fn pose(&mut self, _rig: &RigPose) {}
}

/// Track posing the VR devices between recorded samples
pub struct InputTrack {
    samples: Vec<InputSample>,
    seek_index: usize,
    last_pose: Option<RigPose>,
    sink: Box<dyn PoseSink>,
}

impl InputTrack {
    /// Create a track over samples sorted by time
    pub fn new(samples: Vec<InputSample>, sink: Box<dyn PoseSink>) -> Self {
        Self {
            samples,
            seek_index: 0,
            last_pose: None,
            sink,
        }
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the track has no sample
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Last pose handed to the sink
    pub fn last_pose(&self) -> Option<&RigPose> {
        self.last_pose.as_ref()
    }
}

impl PlaybackTrack for InputTrack {
    fn name(&self) -> &str {
        "input"
    }

    fn advance_to(&mut self, time: f64) {
        while self
            .samples
            .get(self.seek_index)
            .is_some_and(|s| s.time <= time)
        {
            self.seek_index += 1;
        }

        // Before the first sample or past the last one the rig holds still
        let (Some(previous), Some(current)) = (
            self.seek_index
                .checked_sub(1)
                .and_then(|i| self.samples.get(i)),
            self.samples.get(self.seek_index),
        ) else {
            return;
        };

        let span = current.time - previous.time;
        let alpha = if span > 0.0 {
            ((time - previous.time) / span) as f32
        } else {
            1.0
        };
        let pose = previous.pose.interpolate(&current.pose, alpha);
        self.sink.pose(&pose);
        self.last_pose = Some(pose);
    }

    fn reset(&mut self) {
        self.seek_index = 0;
    }

    fn end_time(&self) -> f64 {
        self.samples.last().map_or(0.0, |s| s.time)
    }
}
