// SPDX-License-Identifier: MIT OR Apache-2.0
//! Clock sources driving the timeline.
//!
//! A sketch is driven either by its video ([`MediaClock`]) or, when it has
//! none, by a free-running accumulator ([`SyntheticClock`]). The choice is
//! made once at load time.

use tracing::debug;

/// Round a ratio to three decimal places.
///
/// Media positions oscillate around the end of the stream, so every
/// "finished" test goes through this.
pub fn round_ratio(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Events observed while ticking a clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClockTick {
    /// The clock started playing on its own since the last tick
    pub started: bool,
    /// The clock reached its end during this tick
    pub ended: bool,
    /// The clock stopped on its own since the last tick, short of its end
    pub stopped: bool,
}

/// Source of the current playback time, in seconds
pub trait ClockSource {
    /// Current time in seconds
    fn current_time(&self) -> f64;

    /// Total duration in seconds
    fn duration(&self) -> f64;

    /// Current time as a ratio of the duration
    fn percentage(&self) -> f64 {
        let duration = self.duration();
        if duration > 0.0 && duration.is_finite() {
            self.current_time() / duration
        } else {
            0.0
        }
    }

    /// Jump to a time in seconds
    fn seek(&mut self, time: f64);

    /// Jump to a ratio of the duration
    fn seek_to_ratio(&mut self, ratio: f64) {
        let target = self.duration() * ratio;
        self.seek(target);
    }

    /// Start or resume playback.
    ///
    /// Playback may be refused (autoplay policies); callers must check
    /// [`ClockSource::is_playing`] right after.
    fn play(&mut self);

    /// Pause playback
    fn pause(&mut self);

    /// Set the playback rate multiplier
    fn set_rate(&mut self, rate: f64);

    /// Current playback rate multiplier
    fn rate(&self) -> f64;

    /// Whether the clock is advancing
    fn is_playing(&self) -> bool;

    /// Whether the clock has reached its end
    fn is_finished(&self) -> bool;

    /// Advance by one frame
    fn tick(&mut self, elapsed_ms: f64) -> ClockTick;

    /// Whether time comes from a media element rather than accumulation
    fn is_media_driven(&self) -> bool;
}

/// A decodable media resource with its own native clock
pub trait MediaBackend {
    /// Native position in seconds
    fn current_time(&self) -> f64;
    /// Move the native position
    fn set_current_time(&mut self, time: f64);
    /// Duration in seconds
    fn duration(&self) -> f64;
    /// Ask the resource to start playing; it may refuse
    fn request_play(&mut self);
    /// Pause the resource
    fn pause(&mut self);
    /// Whether the resource is paused
    fn is_paused(&self) -> bool;
    /// Whether the resource played through to its end
    fn has_ended(&self) -> bool;
    /// Whether enough data is buffered to play
    fn is_ready(&self) -> bool;
    /// Set the native playback rate
    fn set_playback_rate(&mut self, rate: f64);
}

/// Clock backed by a media resource
pub struct MediaClock {
    backend: Box<dyn MediaBackend>,
    /// Playback was requested and confirmed
    playing: bool,
    finished: bool,
    was_playing: bool,
    rate: f64,
}

impl MediaClock {
    /// Wrap a media backend
    pub fn new(backend: Box<dyn MediaBackend>) -> Self {
        Self {
            backend,
            playing: false,
            finished: false,
            was_playing: false,
            rate: 1.0,
        }
    }

    /// Access the wrapped backend
    pub fn backend(&self) -> &dyn MediaBackend {
        self.backend.as_ref()
    }
}

impl ClockSource for MediaClock {
    fn current_time(&self) -> f64 {
        self.backend.current_time()
    }

    fn duration(&self) -> f64 {
        self.backend.duration()
    }

    fn seek(&mut self, time: f64) {
        // Long fractional positions upset some decoders
        let target = (time * 1000.0).round() / 1000.0;
        let current = (self.backend.current_time() * 1000.0).round() / 1000.0;
        if target != current {
            self.backend.set_current_time(target);
        }

        if round_ratio(self.percentage()) < 1.0 {
            self.finished = false;
        }
    }

    fn play(&mut self) {
        self.backend.request_play();
        self.finished = false;
        self.playing = self.is_playing();
        if !self.playing {
            debug!("Media refused to start playing");
        }
    }

    fn pause(&mut self) {
        self.playing = false;
        if !self.backend.is_paused() {
            self.backend.pause();
        }
    }

    fn set_rate(&mut self, rate: f64) {
        self.rate = rate;
        self.backend.set_playback_rate(rate);
    }

    fn rate(&self) -> f64 {
        self.rate
    }

    fn is_playing(&self) -> bool {
        !self.backend.is_paused()
            && !self.backend.has_ended()
            && self.backend.is_ready()
    }

    fn is_finished(&self) -> bool {
        self.finished
    }

    fn tick(&mut self, _elapsed_ms: f64) -> ClockTick {
        let now_playing = self.is_playing();
        let mut tick = ClockTick {
            started: now_playing && !self.was_playing,
            ..ClockTick::default()
        };
        if tick.started {
            self.playing = true;
        }

        let at_end = round_ratio(self.percentage()) >= 1.0;
        if !self.finished && (self.backend.has_ended() || (at_end && self.playing)) {
            self.finished = true;
            self.playing = false;
            tick.ended = true;
        }

        if self.playing && !now_playing && !tick.ended && !self.finished {
            self.playing = false;
            tick.stopped = true;
        }

        self.was_playing = now_playing;
        tick
    }

    fn is_media_driven(&self) -> bool {
        true
    }
}

/// Clock advanced manually by elapsed wall time
#[derive(Debug, Clone)]
pub struct SyntheticClock {
    time: f64,
    duration: f64,
    rate: f64,
    playing: bool,
    finished: bool,
}

impl SyntheticClock {
    /// Create a stopped clock at zero with the given duration in seconds
    pub fn new(duration: f64) -> Self {
        Self {
            time: 0.0,
            duration: duration.max(0.0),
            rate: 1.0,
            playing: false,
            finished: false,
        }
    }
}

impl ClockSource for SyntheticClock {
    fn current_time(&self) -> f64 {
        self.time
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn seek(&mut self, time: f64) {
        self.time = time.clamp(0.0, self.duration);
        if round_ratio(self.percentage()) < 1.0 {
            self.finished = false;
        }
    }

    fn play(&mut self) {
        self.playing = true;
        self.finished = false;
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn set_rate(&mut self, rate: f64) {
        self.rate = rate;
    }

    fn rate(&self) -> f64 {
        self.rate
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn is_finished(&self) -> bool {
        self.finished
    }

    fn tick(&mut self, elapsed_ms: f64) -> ClockTick {
        let mut tick = ClockTick::default();
        if !self.playing {
            return tick;
        }

        self.time += elapsed_ms * self.rate / 1000.0;
        if self.time >= self.duration {
            self.time = self.duration;
            self.playing = false;
            if !self.finished {
                self.finished = true;
                tick.ended = true;
            }
        }
        tick
    }

    fn is_media_driven(&self) -> bool {
        false
    }
}
