// SPDX-License-Identifier: MIT OR Apache-2.0
//! Edit cuts and cut-restricted playback.
//!
//! A cut is a sub-range of the timeline expressed as ratios in `[0, 1]`.
//! [`CutList`] is what the editing tool mutates; [`EditPlayback`] is the
//! overlay consulted every frame while edit playback is active.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// A sub-range of the timeline, as ratios of its duration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CutRange {
    /// Start ratio
    pub start: f64,
    /// End ratio
    pub end: f64,
}

impl CutRange {
    /// Create a cut
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Whether `ratio` lies strictly inside the cut
    pub fn strictly_contains(&self, ratio: f64) -> bool {
        self.start < ratio && ratio < self.end
    }
}

/// A cut as persisted, in absolute media seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SavedCut {
    /// Start in seconds
    pub start: f64,
    /// End in seconds
    pub end: f64,
}

fn sort_by_start(cuts: &mut [CutRange]) {
    cuts.sort_by(|a, b| a.start.total_cmp(&b.start));
}

/// Cuts being edited, with an optional selection
#[derive(Debug, Clone, PartialEq)]
pub struct CutList {
    cuts: Vec<CutRange>,
    selected: Option<usize>,
}

impl Default for CutList {
    fn default() -> Self {
        Self {
            cuts: vec![CutRange::new(0.0, 1.0)],
            selected: None,
        }
    }
}

impl CutList {
    /// Build a list from cuts in any order
    pub fn from_cuts(mut cuts: Vec<CutRange>) -> Self {
        sort_by_start(&mut cuts);
        Self {
            cuts,
            selected: None,
        }
    }

    /// Convert saved cuts (seconds) to ratios of `duration`
    pub fn from_saved(saved: &[SavedCut], duration: f64) -> Self {
        let ratio = |seconds: f64| if duration > 0.0 { seconds / duration } else { 0.0 };
        Self::from_cuts(
            saved
                .iter()
                .map(|cut| CutRange::new(ratio(cut.start), ratio(cut.end)))
                .collect(),
        )
    }

    /// Convert the cuts to seconds of `duration`
    pub fn to_saved(&self, duration: f64) -> Vec<SavedCut> {
        self.cuts
            .iter()
            .map(|cut| SavedCut {
                start: cut.start * duration,
                end: cut.end * duration,
            })
            .collect()
    }

    /// Cuts sorted by start
    pub fn cuts(&self) -> &[CutRange] {
        &self.cuts
    }

    /// Number of cuts
    pub fn len(&self) -> usize {
        self.cuts.len()
    }

    /// Whether there is no cut
    pub fn is_empty(&self) -> bool {
        self.cuts.is_empty()
    }

    /// Index of the selected cut
    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    /// The selected cut
    pub fn selected(&self) -> Option<&CutRange> {
        self.selected.and_then(|i| self.cuts.get(i))
    }

    /// Start of the selected cut
    pub fn selected_start(&self) -> Option<f64> {
        self.selected().map(|cut| cut.start)
    }

    /// End of the selected cut
    pub fn selected_end(&self) -> Option<f64> {
        self.selected().map(|cut| cut.end)
    }

    /// Split the cut containing `playhead` in two.
    ///
    /// The old cut now ends at the playhead and the new one runs from the
    /// playhead to the old end. The new cut is selected and its index
    /// returned. A playhead on a boundary or in a gap creates nothing.
    pub fn create_cut(&mut self, playhead: f64) -> Option<usize> {
        let index = self
            .cuts
            .iter()
            .position(|cut| cut.strictly_contains(playhead))?;

        let old_end = self.cuts[index].end;
        self.cuts[index].end = playhead;
        self.cuts.insert(index + 1, CutRange::new(playhead, old_end));
        self.selected = Some(index + 1);

        debug!("Split cut {index} at {playhead:.3}");
        self.selected
    }

    /// Remove the selected cut and clear the selection
    pub fn remove_selected(&mut self) -> Option<CutRange> {
        let index = self.selected.take()?;
        (index < self.cuts.len()).then(|| self.cuts.remove(index))
    }

    /// Select a cut by index; out-of-range indices are ignored
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.cuts.len() {
            self.selected = Some(index);
            true
        } else {
            false
        }
    }

    /// Move the start of the selected cut to `playhead`
    pub fn move_start_of_selected(&mut self, playhead: f64) -> bool {
        let Some(index) = self.selected else {
            return false;
        };
        let Some(cut) = self.cuts.get_mut(index) else {
            return false;
        };
        cut.start = playhead;
        self.resort();
        true
    }

    /// Move the end of the selected cut to `playhead`
    pub fn move_end_of_selected(&mut self, playhead: f64) -> bool {
        let Some(cut) = self.selected.and_then(|i| self.cuts.get_mut(i)) else {
            return false;
        };
        cut.end = playhead;
        true
    }

    /// Remove every cut
    pub fn clear(&mut self) {
        self.cuts.clear();
        self.selected = None;
    }

    /// Restore ascending start order, keeping the selection on its cut
    fn resort(&mut self) {
        let selected = self.selected().copied();
        sort_by_start(&mut self.cuts);
        if let Some(cut) = selected {
            self.selected = self.cuts.iter().position(|c| *c == cut);
        }
    }
}

/// What the overlay asks the player to do after a frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditAction {
    /// Keep playing
    Continue,
    /// The last cut ended
    Pause,
    /// Jump to the start of the next cut
    SeekTo(f64),
}

/// Edit playback overlay: restricts playback to a list of cuts
#[derive(Debug, Clone, Default)]
pub struct EditPlayback {
    cuts: Vec<CutRange>,
    active: Option<usize>,
}

impl EditPlayback {
    /// Create an inactive overlay
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter edit playback on a copy of `cuts`.
    ///
    /// Returns the ratio to seek to, or `None` for an empty list, which
    /// leaves the overlay inactive.
    pub fn start(&mut self, cuts: &[CutRange]) -> Option<f64> {
        if cuts.is_empty() {
            debug!("Edit playback requested with no cuts");
            return None;
        }
        let mut cuts = cuts.to_vec();
        sort_by_start(&mut cuts);
        let start = cuts[0].start;
        self.cuts = cuts;
        self.active = Some(0);
        debug!("Edit playback over {} cuts", self.cuts.len());
        Some(start)
    }

    /// Leave edit playback
    pub fn end(&mut self) {
        self.active = None;
        self.cuts.clear();
    }

    /// Whether edit playback is active
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Index of the cut being played
    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    /// The cut being played
    pub fn active_cut(&self) -> Option<&CutRange> {
        self.active.and_then(|i| self.cuts.get(i))
    }

    /// Evaluate one frame at `ratio`
    pub fn on_update(&mut self, ratio: f64) -> EditAction {
        let Some(index) = self.active else {
            return EditAction::Continue;
        };
        let Some(cut) = self.cuts.get(index) else {
            return EditAction::Continue;
        };
        if ratio < cut.end {
            return EditAction::Continue;
        }

        match self.cuts.get(index + 1) {
            Some(next) => {
                self.active = Some(index + 1);
                debug!("Cut {index} ended, moving to cut {}", index + 1);
                EditAction::SeekTo(next.start)
            }
            None => EditAction::Pause,
        }
    }

    /// Redirect a seek target into the cuts.
    ///
    /// The first cut ending after `ratio` becomes active; a target in the gap
    /// before it snaps forward to its start. Past the last cut the target is
    /// returned unchanged.
    pub fn resolve_seek(&mut self, ratio: f64) -> f64 {
        if self.active.is_none() {
            return ratio;
        }
        let Some(index) = self.cuts.iter().position(|cut| cut.end > ratio) else {
            return ratio;
        };
        self.active = Some(index);
        ratio.max(self.cuts[index].start)
    }
}
