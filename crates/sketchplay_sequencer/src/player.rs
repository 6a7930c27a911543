// SPDX-License-Identifier: MIT OR Apache-2.0
//! The playback orchestrator.
//!
//! [`SketchPlayer`] owns the clock, the timeline and the edit overlay of one
//! loaded sketch and exposes the transport surface. Call
//! [`SketchPlayer::tick`] once per frame.

use crate::clock::{round_ratio, ClockSource, MediaClock, SyntheticClock};
use crate::config::PlayerConfig;
use crate::cuts::{CutList, CutRange, EditAction, EditPlayback, SavedCut};
use crate::input::{InputSample, InputTrack, PoseSink};
use crate::loader::LoadedSketch;
use crate::signal::Signal;
use crate::straight_edge::{StraightEdgeSink, StraightEdgeTrack};
use crate::stroke::{build_stroke_tracks, StrokeSinkFactory};
use crate::timeline::{shared_offsets, SharedOffsets, TimelineBuilder, TimelineCoordinator, TimelineOffsets};
use crate::track::NullSink;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Clamp a seek ratio into `[0, 1]`; NaN becomes 0
fn clamp_ratio(ratio: f64) -> f64 {
    if ratio.is_nan() {
        0.0
    } else {
        ratio.clamp(0.0, 1.0)
    }
}

/// Result of a play request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    /// Playback started
    Started,
    /// The media refused to start; wait for a user gesture
    AutoplayBlocked,
}

/// View collaborators receiving replay output
pub struct ViewBindings {
    /// Sinks for the stroke geometry, one per brush
    pub strokes: Box<dyn StrokeSinkFactory>,
    /// Sink for the VR rig pose
    pub input: Box<dyn PoseSink>,
    /// Sink for the straight-edge guide
    pub straight_edge: Box<dyn StraightEdgeSink>,
}

impl Default for ViewBindings {
    fn default() -> Self {
        Self {
            strokes: Box::new(NullSink),
            input: Box::new(NullSink),
            straight_edge: Box::new(NullSink),
        }
    }
}

/// Plays one loaded sketch
pub struct SketchPlayer {
    name: String,
    clock: Box<dyn ClockSource>,
    timeline: TimelineCoordinator,
    edit: EditPlayback,
    cut_list: CutList,
    offsets: SharedOffsets,
    config: PlayerConfig,
    playing: bool,
    end_signaled: bool,
    pov: bool,
    /// Playback started
    pub begin_play: Signal<()>,
    /// Playback paused
    pub end_play: Signal<()>,
    /// The end of the sketch was reached
    pub playback_complete: Signal<()>,
    /// A seek landed, with the final ratio
    pub seeked: Signal<f64>,
    /// A play request was refused by the media
    pub autoplay_blocked: Signal<()>,
    /// Artist point of view toggled
    pub pov_changed: Signal<bool>,
}

impl SketchPlayer {
    /// Assemble tracks and clock for a loaded sketch.
    ///
    /// Without media the player runs on a synthetic clock spanning the
    /// recorded data and ignores the calibration offsets. The player starts
    /// paused at the beginning.
    pub fn build(loaded: LoadedSketch, bindings: ViewBindings, config: PlayerConfig) -> Self {
        let LoadedSketch {
            name,
            actions,
            input,
            offsets,
            saved_cuts,
            media,
            ..
        } = loaded;
        let ViewBindings {
            mut strokes,
            input: pose_sink,
            straight_edge,
        } = bindings;

        let offsets = match (&media, offsets) {
            (Some(_), Some(offsets)) => offsets,
            _ => TimelineOffsets::default(),
        };
        let offsets = shared_offsets(offsets);

        let mut builder = TimelineBuilder::new(Arc::clone(&offsets));
        for track in build_stroke_tracks(&actions, strokes.as_mut()) {
            builder.add_track(Box::new(track));
        }
        let samples = InputSample::unpack(&input);
        if !samples.is_empty() {
            builder.add_track(Box::new(InputTrack::new(samples, pose_sink)));
        }
        let guides = actions.straight_edge_actions();
        if !guides.is_empty() {
            builder.add_track(Box::new(StraightEdgeTrack::new(guides, straight_edge)));
        }
        let timeline = builder.build();

        let clock: Box<dyn ClockSource> = match media {
            Some(backend) => Box::new(MediaClock::new(backend)),
            None => Box::new(SyntheticClock::new(timeline.duration_seconds())),
        };

        let mut player = Self {
            name,
            clock,
            timeline,
            edit: EditPlayback::new(),
            cut_list: CutList::default(),
            offsets,
            config,
            playing: false,
            end_signaled: false,
            pov: false,
            begin_play: Signal::new(),
            end_play: Signal::new(),
            playback_complete: Signal::new(),
            seeked: Signal::new(),
            autoplay_blocked: Signal::new(),
            pov_changed: Signal::new(),
        };
        if let Some(saved) = saved_cuts {
            player.load_saved_cuts(&saved);
        }

        player.seek(0.0);
        player.pause();
        info!(
            "Sketch {} ready: {} tracks, {:.1}s, {} clock",
            player.name,
            player.timeline.track_count(),
            player.data_duration(),
            if player.clock.is_media_driven() { "media" } else { "synthetic" }
        );
        player
    }

    /// Sketch name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Start playback.
    ///
    /// A finished sketch restarts from the beginning. When the media refuses
    /// to start, [`PlayOutcome::AutoplayBlocked`] is returned and nothing is
    /// retried.
    pub fn play(&mut self) -> PlayOutcome {
        if round_ratio(self.progress()) >= 1.0 {
            self.seek(0.0);
        }

        self.clock.play();
        if !self.clock.is_playing() {
            warn!("Playback of {} blocked, waiting for a user gesture", self.name);
            self.autoplay_blocked.emit(&());
            return PlayOutcome::AutoplayBlocked;
        }

        self.start_playing();
        PlayOutcome::Started
    }

    fn start_playing(&mut self) {
        self.playing = true;
        self.timeline.play();
        info!("Playing {}", self.name);
        self.begin_play.emit(&());
    }

    /// Pause playback
    pub fn pause(&mut self) {
        self.clock.pause();
        self.timeline.pause();
        if self.playing {
            self.playing = false;
            info!("Paused {}", self.name);
            self.end_play.emit(&());
        }
    }

    /// Seek to the beginning
    pub fn rewind(&mut self) {
        self.seek(0.0);
    }

    /// Seek to a ratio of the duration.
    ///
    /// The ratio is clamped into `[0, 1]` and, during edit playback,
    /// redirected into the cuts. The clock moves before the timeline.
    pub fn seek(&mut self, ratio: f64) {
        let mut ratio = clamp_ratio(ratio);
        if self.edit.is_active() {
            ratio = self.edit.resolve_seek(ratio);
        }

        self.clock.seek_to_ratio(ratio);
        self.timeline.seek(self.clock.current_time());
        self.offsets.write().playhead = ratio;

        debug!("Seek to {ratio:.3}");
        self.seeked.emit(&ratio);
    }

    /// Seek by `delta` seconds of the clock
    pub fn skip(&mut self, delta: f64) {
        let duration = self.clock.duration();
        if !duration.is_finite() || duration <= 0.0 {
            return;
        }
        self.seek(self.clock.percentage() + delta / duration);
    }

    /// Skip forward by the configured step
    pub fn skip_forward(&mut self) {
        self.skip(self.config.skip_seconds);
    }

    /// Skip back by the configured step
    pub fn skip_back(&mut self) {
        self.skip(-self.config.skip_seconds);
    }

    /// Set the playback rate, clamped to the configured ceiling
    pub fn set_playback_rate(&mut self, rate: f64) {
        match self.config.clamp_rate(rate) {
            Some(rate) => {
                debug!("Playback rate {rate}");
                self.clock.set_rate(rate);
            }
            None => warn!("Ignoring playback rate {rate}"),
        }
    }

    /// Current playback rate
    pub fn playback_rate(&self) -> f64 {
        self.clock.rate()
    }

    /// Time on the driving clock, in seconds
    pub fn get_current_time(&self) -> f64 {
        self.clock.current_time()
    }

    /// Whether playback is running
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Position as a ratio: the media position when a video drives
    /// playback, the timeline position otherwise
    pub fn progress(&self) -> f64 {
        if self.clock.is_media_driven() {
            self.clock.percentage()
        } else {
            self.timeline.percentage()
        }
    }

    /// Advance one frame of `elapsed_ms` wall time.
    ///
    /// The edit overlay runs against the clock before the timeline moves, so
    /// a jump between cuts and the following advance share one canonical time.
    pub fn tick(&mut self, elapsed_ms: f64) {
        let tick = self.clock.tick(elapsed_ms);
        if tick.started && !self.playing {
            self.start_playing();
        }

        if self.edit.is_active() && self.playing {
            match self.edit.on_update(self.clock.percentage()) {
                EditAction::Continue => {}
                EditAction::Pause => self.pause(),
                EditAction::SeekTo(ratio) => self.seek(ratio),
            }
        }

        self.timeline.update(self.clock.current_time());

        if tick.stopped && self.playing {
            debug!("Media paused outside the player");
            self.pause();
        }

        let progress = self.progress();
        if round_ratio(progress) >= 1.0 {
            if !self.end_signaled {
                self.end_signaled = true;
                info!("Playback of {} complete", self.name);
                self.playback_complete.emit(&());
            }
        } else {
            self.end_signaled = false;
        }

        if tick.ended {
            self.pause();
        }

        self.offsets.write().playhead = progress.min(1.0);
    }

    /// Duration of the video, or of the synthetic clock without one
    pub fn video_duration(&self) -> f64 {
        self.clock.duration()
    }

    /// Duration of the recorded data in seconds
    pub fn data_duration(&self) -> f64 {
        self.timeline.duration_seconds()
    }

    /// Ratio of a video time
    pub fn ratio_at_video_time(&self, time: f64) -> f64 {
        let duration = self.video_duration();
        if duration > 0.0 {
            time / duration
        } else {
            0.0
        }
    }

    /// Video time at a ratio
    pub fn video_time_at_ratio(&self, ratio: f64) -> f64 {
        ratio * self.video_duration()
    }

    /// Canonical data time at a ratio, in milliseconds
    pub fn data_time_at_ratio(&self, ratio: f64) -> f64 {
        self.timeline.time_at_ratio(ratio)
    }

    /// Shared calibration offsets
    pub fn offsets(&self) -> &SharedOffsets {
        &self.offsets
    }

    /// The timeline driven by this player
    pub fn timeline(&self) -> &TimelineCoordinator {
        &self.timeline
    }

    /// Timeline for subscribing to tick and seek signals
    pub fn timeline_mut(&mut self) -> &mut TimelineCoordinator {
        &mut self.timeline
    }

    /// Whether a video drives playback
    pub fn is_media_driven(&self) -> bool {
        self.clock.is_media_driven()
    }

    /// Whether the artist point of view is shown
    pub fn is_pov(&self) -> bool {
        self.pov
    }

    /// Show or leave the artist point of view
    pub fn set_pov(&mut self, pov: bool) {
        if self.pov != pov {
            self.pov = pov;
            self.pov_changed.emit(&pov);
        }
    }

    /// Flip the artist point of view
    pub fn toggle_pov(&mut self) {
        self.set_pov(!self.pov);
    }

    // Cut editing

    /// Cuts being edited
    pub fn cut_list(&self) -> &CutList {
        &self.cut_list
    }

    /// Mutable access to the cuts being edited
    pub fn cut_list_mut(&mut self) -> &mut CutList {
        &mut self.cut_list
    }

    /// Replace the cuts with saved ones, in video seconds
    pub fn load_saved_cuts(&mut self, saved: &[SavedCut]) {
        self.cut_list = CutList::from_saved(saved, self.video_duration());
        debug!("Loaded {} saved cuts", self.cut_list.len());
    }

    /// The cuts in video seconds, for saving
    pub fn saved_cuts(&self) -> Vec<SavedCut> {
        self.cut_list.to_saved(self.video_duration())
    }

    /// Split the cut under the playhead
    pub fn create_cut(&mut self) -> Option<usize> {
        self.cut_list.create_cut(self.progress())
    }

    /// Remove the selected cut
    pub fn remove_selected_cut(&mut self) -> Option<CutRange> {
        self.cut_list.remove_selected()
    }

    /// Select a cut and move the playhead to its start
    pub fn select_cut(&mut self, index: usize) {
        if self.cut_list.select(index) {
            self.goto_start_of_selected_cut();
        }
    }

    /// Move the playhead to the start of the selected cut
    pub fn goto_start_of_selected_cut(&mut self) {
        if let Some(start) = self.cut_list.selected_start() {
            self.seek(start);
        }
    }

    /// Move the playhead to the end of the selected cut
    pub fn goto_end_of_selected_cut(&mut self) {
        if let Some(end) = self.cut_list.selected_end() {
            self.seek(end);
        }
    }

    /// Move the start of the selected cut to the playhead
    pub fn move_start_of_selected_cut(&mut self) {
        let playhead = self.progress();
        self.cut_list.move_start_of_selected(playhead);
    }

    /// Move the end of the selected cut to the playhead
    pub fn move_end_of_selected_cut(&mut self) {
        let playhead = self.progress();
        self.cut_list.move_end_of_selected(playhead);
    }

    /// Restrict playback to `cuts`, starting at the first one.
    ///
    /// An empty list is ignored.
    pub fn start_edit_playback(&mut self, cuts: &[CutRange]) -> bool {
        match self.edit.start(cuts) {
            Some(start) => {
                self.seek(start);
                true
            }
            None => false,
        }
    }

    /// Restrict playback to the cuts being edited
    pub fn start_edit_playback_from_cut_list(&mut self) -> bool {
        let cuts = self.cut_list.cuts().to_vec();
        self.start_edit_playback(&cuts)
    }

    /// Leave edit playback without moving the playhead
    pub fn end_edit_playback(&mut self) {
        self.edit.end();
    }

    /// Whether edit playback is active
    pub fn is_edit_playback(&self) -> bool {
        self.edit.is_active()
    }

    /// The edit overlay
    pub fn edit_playback(&self) -> &EditPlayback {
        &self.edit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MediaBackend;
    use crate::document::{Action, ActionLog, ControlPoint, SketchMeta, StrokeData};
    use crate::testing::{FakeMedia, FakeMediaHandle};
    use crate::stroke::StrokeSegment;
    use crate::track::RevealSink;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    /// Tracks how many stroke segments are on screen
    struct LiveCount(Rc<Cell<i32>>);

    impl RevealSink<StrokeSegment> for LiveCount {
        fn reveal(&mut self, _segment: &StrokeSegment) {
            self.0.set(self.0.get() + 1);
        }

        fn hide(&mut self, _segment: &StrokeSegment) {
            self.0.set((self.0.get() - 1).max(0));
        }
    }

    fn point(t: f64) -> ControlPoint {
        ControlPoint {
            t,
            pos: ([0.0; 3], [0.0, 0.0, 0.0, 1.0]),
        }
    }

    /// One stroke spanning 100 seconds
    fn sketch(media: Option<Box<dyn MediaBackend>>, offsets: Option<TimelineOffsets>) -> LoadedSketch {
        LoadedSketch {
            name: "test".to_string(),
            meta: SketchMeta::default(),
            actions: ActionLog {
                actions: vec![Action::Stroke {
                    time: 0.0,
                    data: StrokeData {
                        id: 1,
                        brush: 0,
                        b_size: 1.0,
                        color: vec![1.0, 1.0, 1.0],
                        points: vec![vec![point(0.0), point(50_000.0), point(100_000.0)]],
                    },
                }],
                ..Default::default()
            },
            input: Vec::new(),
            playback: None,
            offsets,
            editing: None,
            saved_cuts: None,
            media,
        }
    }

    fn synthetic() -> SketchPlayer {
        SketchPlayer::build(sketch(None, None), ViewBindings::default(), PlayerConfig::default())
    }

    fn media(duration: f64) -> (SketchPlayer, FakeMediaHandle) {
        let (media, handle) = FakeMedia::new(duration);
        let player = SketchPlayer::build(
            sketch(Some(Box::new(media)), Some(TimelineOffsets::default())),
            ViewBindings::default(),
            PlayerConfig::default(),
        );
        (player, handle)
    }

    fn counter(signal: &mut Signal<()>) -> Rc<Cell<u32>> {
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        signal.subscribe(move |_| c.set(c.get() + 1));
        count
    }

    #[test]
    fn test_synthetic_playback_follows_data() {
        let mut player = synthetic();
        assert!(!player.is_media_driven());
        assert_eq!(player.data_duration(), 100.0);
        assert_eq!(player.video_duration(), 100.0);
        assert!(!player.is_playing());

        let began = counter(&mut player.begin_play);
        assert_eq!(player.play(), PlayOutcome::Started);
        assert_eq!(began.get(), 1);

        player.tick(10_000.0);
        assert!((player.get_current_time() - 10.0).abs() < 1e-9);
        assert!((player.progress() - 0.1).abs() < 1e-9);
        assert!((player.offsets().read().playhead - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_seek_round_trip_and_clamping() {
        let mut player = synthetic();
        for ratio in [0.0, 0.25, 0.5, 0.999, 1.0] {
            player.seek(ratio);
            let back = player.get_current_time() / player.video_duration();
            assert!((back - ratio).abs() < 1e-3);
        }

        player.seek(1.5);
        assert_eq!(player.progress(), 1.0);
        player.seek(-2.0);
        assert_eq!(player.progress(), 0.0);
        player.seek(f64::NAN);
        assert_eq!(player.get_current_time(), 0.0);
    }

    #[test]
    fn test_skip_uses_clock_duration() {
        let mut player = synthetic();
        player.skip(25.0);
        assert!((player.progress() - 0.25).abs() < 1e-9);
        player.skip_back();
        assert!((player.get_current_time() - 24.0).abs() < 1e-9);
        player.skip(1000.0);
        assert_eq!(player.progress(), 1.0);
    }

    #[test]
    fn test_playback_rate_is_clamped() {
        let mut player = synthetic();
        player.set_playback_rate(2.0);
        assert_eq!(player.playback_rate(), 2.0);
        player.set_playback_rate(100.0);
        assert_eq!(player.playback_rate(), 10.0);
        player.set_playback_rate(f64::NAN);
        assert_eq!(player.playback_rate(), 10.0);

        player.set_playback_rate(2.0);
        player.play();
        player.tick(1000.0);
        assert!((player.get_current_time() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_completion_latch_fires_once_and_rearms() {
        let mut player = synthetic();
        let completed = counter(&mut player.playback_complete);
        let paused = counter(&mut player.end_play);

        player.play();
        player.tick(200_000.0);
        player.tick(16.0);
        player.tick(16.0);
        assert_eq!(completed.get(), 1);
        assert_eq!(paused.get(), 1);
        assert!(!player.is_playing());

        player.seek(0.5);
        player.tick(16.0);
        player.play();
        player.tick(60_000.0);
        assert_eq!(completed.get(), 2);
    }

    #[test]
    fn test_play_after_finish_restarts() {
        let mut player = synthetic();
        player.seek(1.0);
        player.play();
        assert_eq!(player.progress(), 0.0);
        assert!(player.is_playing());
    }

    #[test]
    fn test_edit_playback_jumps_between_cuts() {
        let mut player = synthetic();
        let cuts = [CutRange::new(0.0, 0.3), CutRange::new(0.5, 1.0)];

        assert!(player.start_edit_playback(&cuts));
        assert_eq!(player.edit_playback().active_index(), Some(0));
        assert_eq!(player.progress(), 0.0);

        player.play();
        player.tick(31_000.0);
        assert_eq!(player.edit_playback().active_index(), Some(1));
        assert!((player.progress() - 0.5).abs() < 1e-9);

        // Seeking into the gap snaps forward
        player.seek(0.4);
        assert!((player.progress() - 0.5).abs() < 1e-9);

        player.tick(60_000.0);
        assert!(!player.is_playing());

        player.end_edit_playback();
        assert!(!player.is_edit_playback());
        assert!(!player.start_edit_playback(&[]));
        assert!(!player.is_edit_playback());
    }

    #[test]
    fn test_cut_jump_keeps_strokes_visible() {
        let mut loaded = sketch(None, None);
        if let Action::Stroke { data, .. } = &mut loaded.actions.actions[0] {
            data.points = vec![(0..=10).map(|i| point(f64::from(i) * 10_000.0)).collect()];
        }
        let live = Rc::new(Cell::new(0_i32));
        let sink_live = Rc::clone(&live);
        let bindings = ViewBindings {
            strokes: Box::new(move |_brush: usize, _name: &str| -> Box<dyn RevealSink<StrokeSegment>> {
                Box::new(LiveCount(Rc::clone(&sink_live)))
            }),
            ..Default::default()
        };
        let mut player = SketchPlayer::build(loaded, bindings, PlayerConfig::default());

        let canonical = Rc::new(RefCell::new(Vec::new()));
        let ticks = Rc::clone(&canonical);
        player.timeline_mut().on_tick.subscribe(move |t| ticks.borrow_mut().push(*t));

        player.start_edit_playback(&[CutRange::new(0.0, 0.3), CutRange::new(0.5, 1.0)]);
        player.play();
        player.tick(31_000.0);

        assert!((player.progress() - 0.5).abs() < 1e-9);
        assert_eq!(*canonical.borrow(), vec![50_000.0]);
        assert_eq!(live.get(), 5);
    }

    #[test]
    fn test_native_media_pause_stops_player() {
        let (mut player, handle) = media(100.0);
        let paused = counter(&mut player.end_play);

        player.play();
        handle.advance(10.0);
        player.tick(16.0);
        assert!(player.is_playing());

        handle.pause_natively();
        player.tick(16.0);
        assert!(!player.is_playing());
        assert!(!player.timeline().is_playing());
        assert_eq!(paused.get(), 1);

        handle.advance(10.0);
        player.tick(16.0);
        assert_eq!(player.get_current_time(), 10.0);
        assert_eq!(paused.get(), 1);

        // Resuming from the native controls is picked up again
        handle.start_natively();
        player.tick(16.0);
        assert!(player.is_playing());
    }

    #[test]
    fn test_zero_length_sketch_completes() {
        let mut loaded = sketch(None, None);
        if let Action::Stroke { data, .. } = &mut loaded.actions.actions[0] {
            data.points = vec![vec![point(0.0), point(0.0)]];
        }
        let mut player = SketchPlayer::build(loaded, ViewBindings::default(), PlayerConfig::default());
        let completed = counter(&mut player.playback_complete);
        assert_eq!(player.data_duration(), 0.0);

        assert_eq!(player.play(), PlayOutcome::Started);
        player.tick(16.0);
        player.tick(16.0);
        assert_eq!(completed.get(), 1);
        assert!(!player.is_playing());
    }

    #[test]
    fn test_cut_editing_follows_playhead() {
        let mut player = synthetic();
        player.seek(0.4);
        assert_eq!(player.create_cut(), Some(1));
        assert_eq!(player.cut_list().len(), 2);

        player.select_cut(0);
        assert_eq!(player.progress(), 0.0);
        player.goto_end_of_selected_cut();
        assert!((player.progress() - 0.4).abs() < 1e-9);

        player.seek(0.2);
        player.move_end_of_selected_cut();
        assert!((player.cut_list().cuts()[0].end - 0.2).abs() < 1e-9);

        assert!(player.remove_selected_cut().is_some());
        assert_eq!(player.cut_list().len(), 1);
        assert!(player.start_edit_playback_from_cut_list());
        assert!((player.progress() - 0.4).abs() < 1e-9);

        let saved = player.saved_cuts();
        assert!((saved[0].start - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_autoplay_block_is_reported() {
        let (mut player, handle) = media(100.0);
        let blocked = counter(&mut player.autoplay_blocked);
        let began = counter(&mut player.begin_play);

        handle.block_autoplay(true);
        assert_eq!(player.play(), PlayOutcome::AutoplayBlocked);
        assert!(!player.is_playing());
        assert_eq!(blocked.get(), 1);
        assert_eq!(began.get(), 0);

        // The user presses play on the video itself
        handle.start_natively();
        handle.advance(1.0);
        player.tick(16.0);
        assert!(player.is_playing());
        assert_eq!(began.get(), 1);
    }

    #[test]
    fn test_media_drives_timeline_with_offset() {
        let (mut player, handle) = media(100.0);
        player.offsets().write().time = 2.0;
        assert!(player.is_media_driven());

        player.play();
        handle.advance(50.0);
        player.tick(16.0);

        assert_eq!(player.get_current_time(), 50.0);
        assert!((player.progress() - 0.5).abs() < 1e-9);
        assert_eq!(player.timeline().canonical_time(), 48_000.0);
        assert!((player.offsets().read().playhead - 0.5).abs() < 1e-9);
        assert!((player.data_time_at_ratio(0.5) - 48_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_media_follows_transport() {
        let (mut player, handle) = media(100.0);
        player.set_playback_rate(1.5);
        assert_eq!(handle.rate(), 1.5);

        player.play();
        assert!(!handle.is_paused());
        player.pause();
        assert!(handle.is_paused());
        assert!(!player.is_playing());
    }

    #[test]
    fn test_media_completion() {
        let (mut player, handle) = media(10.0);
        let completed = counter(&mut player.playback_complete);

        player.play();
        handle.advance(20.0);
        player.tick(16.0);
        player.tick(16.0);
        assert_eq!(completed.get(), 1);
        assert!(!player.is_playing());
    }

    #[test]
    fn test_pov_toggle_notifies() {
        let mut player = synthetic();
        let seen = Rc::new(Cell::new(false));
        let s = Rc::clone(&seen);
        player.pov_changed.subscribe(move |pov| s.set(*pov));

        player.toggle_pov();
        assert!(player.is_pov());
        assert!(seen.get());
        player.set_pov(false);
        assert!(!seen.get());
    }
}
