// SPDX-License-Identifier: MIT OR Apache-2.0
//! Loading the documents and media of a sketch.
//!
//! Fetches run as one-shot futures joined together; the first failure of a
//! required document rejects the whole load and nothing is played.

use crate::clock::MediaBackend;
use crate::config::VideoSettings;
use crate::cuts::SavedCut;
use crate::document::{parse, ActionLog, EditingMeta, SketchMeta};
use crate::error::{LoadError, Result};
use crate::timeline::TimelineOffsets;
use futures::try_join;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::future::{ready, Future};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Where sketch documents come from
pub trait SketchSource {
    /// Fetch the document at `path`, relative to the data root
    fn fetch(&self, path: &str) -> impl Future<Output = Result<String>>;
}

/// Reads documents from `<root>/<sketch>/<document>`
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    /// Read from the given data root
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl SketchSource for DirectorySource {
    fn fetch(&self, path: &str) -> impl Future<Output = Result<String>> {
        let full = self.root.join(path);
        let document = path.to_string();
        async move {
            tokio::fs::read_to_string(&full)
                .await
                .map_err(|e| LoadError::from_io(document, e))
        }
    }
}

/// Documents held in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    documents: HashMap<String, String>,
}

impl MemorySource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a document
    pub fn insert(&mut self, path: impl Into<String>, text: impl Into<String>) {
        self.documents.insert(path.into(), text.into());
    }
}

impl SketchSource for MemorySource {
    fn fetch(&self, path: &str) -> impl Future<Output = Result<String>> {
        ready(
            self.documents
                .get(path)
                .cloned()
                .ok_or_else(|| LoadError::Missing {
                    document: path.to_string(),
                }),
        )
    }
}

/// Opens the media resource of a sketch
pub trait MediaProvider {
    /// Whether media can be opened at all
    fn is_available(&self) -> bool {
        true
    }

    /// Open the media at `url`
    fn open(&self, url: &str) -> impl Future<Output = Result<Box<dyn MediaBackend>>>;
}

/// Provider for hosts without media playback
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMedia;

impl MediaProvider for NoMedia {
    fn is_available(&self) -> bool {
        false
    }

    fn open(&self, url: &str) -> impl Future<Output = Result<Box<dyn MediaBackend>>> {
        ready(Err(LoadError::Media {
            url: url.to_string(),
            reason: "no media backend".to_string(),
        }))
    }
}

/// Everything fetched for one sketch
pub struct LoadedSketch {
    /// Sketch name
    pub name: String,
    /// `meta.json`
    pub meta: SketchMeta,
    /// `actions.json`
    pub actions: ActionLog,
    /// `input.json`, flat
    pub input: Vec<f64>,
    /// `playback.json`, kept opaque
    pub playback: Option<serde_json::Value>,
    /// `offsets.json`
    pub offsets: Option<TimelineOffsets>,
    /// `editing.json`
    pub editing: Option<EditingMeta>,
    /// Cut list referenced by `editing.json`
    pub saved_cuts: Option<Vec<SavedCut>>,
    /// Opened video
    pub media: Option<Box<dyn MediaBackend>>,
}

/// Loads sketches from a source, with optional media
pub struct SketchLoader<S, M = NoMedia> {
    source: S,
    media: M,
    video: VideoSettings,
}

impl<S: SketchSource> SketchLoader<S, NoMedia> {
    /// Loader without media playback
    pub fn new(source: S, video: VideoSettings) -> Self {
        Self {
            source,
            media: NoMedia,
            video,
        }
    }
}

impl<S: SketchSource, M: MediaProvider> SketchLoader<S, M> {
    /// Use `media` to open sketch videos
    pub fn with_media<N: MediaProvider>(self, media: N) -> SketchLoader<S, N> {
        SketchLoader {
            source: self.source,
            media,
            video: self.video,
        }
    }

    async fn fetch_json<T: DeserializeOwned>(&self, name: &str, document: &str) -> Result<T> {
        let path = format!("{name}/{document}");
        let text = self.source.fetch(&path).await?;
        parse(&path, &text)
    }

    /// Like `fetch_json`, but a missing document is `None`
    async fn fetch_optional<T: DeserializeOwned>(&self, name: &str, document: &str) -> Result<Option<T>> {
        let path = format!("{name}/{document}");
        match self.source.fetch(&path).await {
            Ok(text) => parse(&path, &text).map(Some),
            Err(LoadError::Missing { .. }) => {
                debug!("Skipping absent {path}");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Load every document of sketch `name`.
    ///
    /// A sketch recording a video only gets media, offsets and editing data
    /// when a media provider is available; otherwise it plays from data
    /// alone.
    pub async fn load(&self, name: &str) -> Result<LoadedSketch> {
        info!("Loading sketch {name}");
        let meta: SketchMeta = self.fetch_json(name, "meta.json").await?;

        let video_url = match &meta.video {
            Some(video) if self.media.is_available() => Some(self.video.resolve_path(&video.source)),
            Some(_) => {
                warn!("Sketch {name} has a video but no media backend, playing from data only");
                None
            }
            None => None,
        };

        let mut loaded = match video_url {
            Some(url) => {
                debug!("Opening media {url}");
                let (actions, input, playback, offsets, editing, media) = try_join!(
                    self.fetch_json::<ActionLog>(name, "actions.json"),
                    self.fetch_json::<Vec<f64>>(name, "input.json"),
                    self.fetch_json::<serde_json::Value>(name, "playback.json"),
                    self.fetch_json::<TimelineOffsets>(name, "offsets.json"),
                    self.fetch_optional::<EditingMeta>(name, "editing.json"),
                    self.media.open(&url),
                )?;
                LoadedSketch {
                    name: name.to_string(),
                    meta,
                    actions,
                    input,
                    playback: Some(playback),
                    offsets: Some(offsets),
                    editing,
                    saved_cuts: None,
                    media: Some(media),
                }
            }
            None => {
                let (actions, input) = try_join!(
                    self.fetch_json::<ActionLog>(name, "actions.json"),
                    self.fetch_json::<Vec<f64>>(name, "input.json"),
                )?;
                LoadedSketch {
                    name: name.to_string(),
                    meta,
                    actions,
                    input,
                    playback: None,
                    offsets: None,
                    editing: None,
                    saved_cuts: None,
                    media: None,
                }
            }
        };

        if loaded.actions.strokes().next().is_none() {
            return Err(LoadError::EmptySketch(name.to_string()));
        }

        if let Some(edit) = loaded.editing.as_ref().and_then(|e| e.test_edit.clone()) {
            loaded.saved_cuts = self.fetch_optional::<Vec<SavedCut>>(name, &edit).await?;
        }

        info!(
            "Loaded sketch {name}: {} actions, {} input values",
            loaded.actions.actions.len(),
            loaded.input.len()
        );
        Ok(loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeMedia;
    use futures::executor::block_on;
    use uuid::Uuid;

    const ACTIONS: &str = r#"{
        "metadata": { "BrushIndex": ["Ink"] },
        "actions": [
            { "type": "STROKE", "time": 0, "data": { "id": 1, "brush": 0, "points": [[
                { "t": 0, "pos": [[0, 0, 0], [0, 0, 0, 1]] },
                { "t": 1000, "pos": [[1, 0, 0], [0, 0, 0, 1]] }
            ]]}}
        ]
    }"#;

    struct FakeProvider {
        fail: bool,
    }

    impl MediaProvider for FakeProvider {
        fn open(&self, url: &str) -> impl Future<Output = Result<Box<dyn MediaBackend>>> {
            let result: Result<Box<dyn MediaBackend>> = if self.fail {
                Err(LoadError::Media {
                    url: url.to_string(),
                    reason: "decode error".to_string(),
                })
            } else {
                Ok(Box::new(FakeMedia::new(1.0).0))
            };
            ready(result)
        }
    }

    fn data_only() -> MemorySource {
        let mut source = MemorySource::new();
        source.insert("s/meta.json", "{}");
        source.insert("s/actions.json", ACTIONS);
        source.insert("s/input.json", "[]");
        source
    }

    fn with_video() -> MemorySource {
        let mut source = data_only();
        source.insert("s/meta.json", r#"{ "video": { "source": "s" } }"#);
        source.insert("s/playback.json", r#"{ "speed": 1 }"#);
        source.insert("s/offsets.json", r#"{ "time": 0.5, "positionA": { "x": 1 } }"#);
        source
    }

    #[test]
    fn test_load_data_only_sketch() {
        let loader = SketchLoader::new(data_only(), VideoSettings::default());
        let loaded = block_on(loader.load("s")).unwrap();

        assert_eq!(loaded.name, "s");
        assert_eq!(loaded.actions.actions.len(), 1);
        assert!(loaded.media.is_none());
        assert!(loaded.offsets.is_none());
    }

    #[test]
    fn test_missing_required_document_rejects_load() {
        let mut source = MemorySource::new();
        source.insert("s/meta.json", "{}");
        source.insert("s/actions.json", ACTIONS);
        let loader = SketchLoader::new(source, VideoSettings::default());

        let err = block_on(loader.load("s")).err().unwrap();
        assert!(matches!(err, LoadError::Missing { ref document } if document == "s/input.json"));
    }

    #[test]
    fn test_empty_action_log_is_rejected() {
        let mut source = data_only();
        source.insert("s/actions.json", r#"{ "actions": [] }"#);
        let loader = SketchLoader::new(source, VideoSettings::default());

        assert!(matches!(block_on(loader.load("s")), Err(LoadError::EmptySketch(_))));
    }

    #[test]
    fn test_video_without_media_backend_degrades() {
        // offsets.json and playback.json are never fetched
        let mut source = data_only();
        source.insert("s/meta.json", r#"{ "video": { "source": "s" } }"#);
        let loader = SketchLoader::new(source, VideoSettings::default());

        let loaded = block_on(loader.load("s")).unwrap();
        assert!(loaded.meta.has_video());
        assert!(loaded.media.is_none());
    }

    #[test]
    fn test_load_with_media_and_saved_cuts() {
        let mut source = with_video();
        source.insert("s/editing.json", r#"{ "test_edit": "edit.json" }"#);
        source.insert("s/edit.json", r#"[{ "start": 0.0, "end": 0.5 }]"#);
        let loader = SketchLoader::new(source, VideoSettings::default())
            .with_media(FakeProvider { fail: false });

        let loaded = block_on(loader.load("s")).unwrap();
        assert!(loaded.media.is_some());
        let offsets = loaded.offsets.unwrap();
        assert_eq!(offsets.time, 0.5);
        assert_eq!(offsets.position_a.x, 1.0);
        assert_eq!(loaded.saved_cuts.unwrap(), vec![SavedCut { start: 0.0, end: 0.5 }]);
    }

    #[test]
    fn test_editing_document_is_optional() {
        let loader = SketchLoader::new(with_video(), VideoSettings::default())
            .with_media(FakeProvider { fail: false });

        let loaded = block_on(loader.load("s")).unwrap();
        assert!(loaded.editing.is_none());
        assert!(loaded.saved_cuts.is_none());
    }

    #[test]
    fn test_media_failure_rejects_load() {
        let loader = SketchLoader::new(with_video(), VideoSettings::default())
            .with_media(FakeProvider { fail: true });

        assert!(matches!(block_on(loader.load("s")), Err(LoadError::Media { .. })));
    }

    #[test]
    fn test_directory_source_reads_files() {
        let root = std::env::temp_dir().join(format!("sketchplay-{}", Uuid::new_v4()));
        std::fs::create_dir_all(root.join("s")).unwrap();
        std::fs::write(root.join("s/meta.json"), "{}").unwrap();
        std::fs::write(root.join("s/actions.json"), ACTIONS).unwrap();
        std::fs::write(root.join("s/input.json"), "[]").unwrap();

        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let loader = SketchLoader::new(DirectorySource::new(&root), VideoSettings::default());
        let loaded = runtime.block_on(loader.load("s"));
        let missing = runtime.block_on(loader.load("other"));
        std::fs::remove_dir_all(&root).unwrap();

        assert_eq!(loaded.unwrap().actions.actions.len(), 1);
        assert!(matches!(missing, Err(LoadError::Missing { .. })));
    }

    /// Source whose reads of one document fail with an I/O error
    struct Unreadable {
        inner: MemorySource,
        path: &'static str,
    }

    impl SketchSource for Unreadable {
        fn fetch(&self, path: &str) -> impl Future<Output = Result<String>> {
            let denied = (path == self.path).then(|| path.to_string());
            let inner = self.inner.fetch(path);
            async move {
                match denied {
                    Some(document) => Err(LoadError::from_io(
                        document,
                        std::io::Error::from(std::io::ErrorKind::PermissionDenied),
                    )),
                    None => inner.await,
                }
            }
        }
    }

    #[test]
    fn test_unreadable_optional_document_rejects_load() {
        let loader = SketchLoader::new(
            Unreadable {
                inner: with_video(),
                path: "s/editing.json",
            },
            VideoSettings::default(),
        )
        .with_media(FakeProvider { fail: false });

        let err = block_on(loader.load("s")).err().unwrap();
        assert!(matches!(err, LoadError::Fetch { ref document, .. } if document == "s/editing.json"));
    }
}
