// SPDX-License-Identifier: MIT OR Apache-2.0
//! Lifecycle of the sketch being shown.

use crate::config::PlayerConfig;
use crate::error::Result;
use crate::loader::{MediaProvider, NoMedia, SketchLoader, SketchSource};
use crate::player::{SketchPlayer, ViewBindings};
use crate::signal::Signal;
use tracing::info;

/// Holds at most one loaded sketch.
///
/// Loading always unloads the previous sketch first, so two players never
/// coexist.
pub struct SketchSession<S, M = NoMedia> {
    loader: SketchLoader<S, M>,
    config: PlayerConfig,
    player: Option<SketchPlayer>,
    /// Fired with the sketch name once its player is ready
    pub sketch_loaded: Signal<String>,
}

impl<S: SketchSource, M: MediaProvider> SketchSession<S, M> {
    /// Create an empty session
    pub fn new(loader: SketchLoader<S, M>, config: PlayerConfig) -> Self {
        Self {
            loader,
            config,
            player: None,
            sketch_loaded: Signal::new(),
        }
    }

    /// Unload the current sketch, then load `name`.
    ///
    /// On failure the session is left empty.
    pub async fn load(&mut self, name: &str, bindings: ViewBindings) -> Result<&mut SketchPlayer> {
        self.unload();
        let loaded = self.loader.load(name).await?;
        let player = SketchPlayer::build(loaded, bindings, self.config.clone());
        self.sketch_loaded.emit(&name.to_string());
        Ok(self.player.insert(player))
    }

    /// Drop the current sketch, if any
    pub fn unload(&mut self) {
        if let Some(mut player) = self.player.take() {
            player.pause();
            info!("Unloaded sketch {}", player.name());
        }
    }

    /// Whether a sketch is loaded
    pub fn is_loaded(&self) -> bool {
        self.player.is_some()
    }

    /// The current player
    pub fn player(&self) -> Option<&SketchPlayer> {
        self.player.as_ref()
    }

    /// The current player, mutably
    pub fn player_mut(&mut self) -> Option<&mut SketchPlayer> {
        self.player.as_mut()
    }

    /// Player configuration
    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }
}
