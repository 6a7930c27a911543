// SPDX-License-Identifier: MIT OR Apache-2.0
//! Test doubles shared by the unit tests.

use crate::clock::MediaBackend;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug)]
struct FakeMediaState {
    time: f64,
    duration: f64,
    paused: bool,
    ended: bool,
    ready: bool,
    rate: f64,
    block_autoplay: bool,
}

/// Scriptable media element
pub struct FakeMedia {
    state: Rc<RefCell<FakeMediaState>>,
}

/// Test-side handle onto a [`FakeMedia`] after it has been boxed
#[derive(Clone)]
pub struct FakeMediaHandle {
    state: Rc<RefCell<FakeMediaState>>,
}

impl FakeMedia {
    pub fn new(duration: f64) -> (Self, FakeMediaHandle) {
        let state = Rc::new(RefCell::new(FakeMediaState {
            time: 0.0,
            duration,
            paused: true,
            ended: false,
            ready: true,
            rate: 1.0,
            block_autoplay: false,
        }));
        (
            Self {
                state: Rc::clone(&state),
            },
            FakeMediaHandle { state },
        )
    }
}

impl FakeMediaHandle {
    /// Play for `seconds` of wall time at the current rate
    pub fn advance(&self, seconds: f64) {
        let mut s = self.state.borrow_mut();
        if s.paused {
            return;
        }
        s.time += seconds * s.rate;
        if s.time >= s.duration {
            s.time = s.duration;
            s.ended = true;
            s.paused = true;
        }
    }

    pub fn block_autoplay(&self, block: bool) {
        self.state.borrow_mut().block_autoplay = block;
    }

    /// Simulate the user pressing the native play control
    pub fn start_natively(&self) {
        let mut s = self.state.borrow_mut();
        s.paused = false;
        s.ended = false;
    }

    /// Simulate the user pressing the native pause control
    pub fn pause_natively(&self) {
        self.state.borrow_mut().paused = true;
    }

    pub fn time(&self) -> f64 {
        self.state.borrow().time
    }

    pub fn rate(&self) -> f64 {
        self.state.borrow().rate
    }

    pub fn is_paused(&self) -> bool {
        self.state.borrow().paused
    }
}

impl MediaBackend for FakeMedia {
    fn current_time(&self) -> f64 {
        self.state.borrow().time
    }

    fn set_current_time(&mut self, time: f64) {
        let mut s = self.state.borrow_mut();
        s.time = time.clamp(0.0, s.duration);
        s.ended = false;
    }

    fn duration(&self) -> f64 {
        self.state.borrow().duration
    }

    fn request_play(&mut self) {
        let mut s = self.state.borrow_mut();
        if !s.block_autoplay {
            s.paused = false;
            s.ended = false;
        }
    }

    fn pause(&mut self) {
        self.state.borrow_mut().paused = true;
    }

    fn is_paused(&self) -> bool {
        self.state.borrow().paused
    }

    fn has_ended(&self) -> bool {
        self.state.borrow().ended
    }

    fn is_ready(&self) -> bool {
        self.state.borrow().ready
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.state.borrow_mut().rate = rate;
    }
}
