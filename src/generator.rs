//! Renders one queue message into a check and persists the PNG.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, instrument};

use crate::error::{CheckError, StorageError};
use crate::message::InboundMessage;
use crate::output::{artifact_name, encode_png, write_local};
use crate::ports::{BlobContainer, BlobContentInfo, FontSource};
use crate::render::CheckRenderer;

/// What happened to the artifact at one destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SinkOutcome {
    /// The destination is switched off.
    Disabled,
    /// An earlier persistence step failed, so this one was skipped.
    NotAttempted,
    /// The artifact was written.
    Stored {
        /// File path or `container/blob`.
        location: String,
        /// Storage-assigned sequence number, when the destination has one.
        sequence_number: Option<i64>,
    },
    /// Writing failed; the error was logged and swallowed.
    Failed {
        /// Error message.
        error: String,
    },
}

impl SinkOutcome {
    fn failed(error: &impl std::fmt::Display) -> Self {
        Self::Failed { error: error.to_string() }
    }
}

/// Result of handling one message.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    /// Identifier of the message that was handled.
    pub message_id: String,
    /// Artifact name used for both destinations.
    pub blob_name: String,
    /// Local folder destination.
    pub local: SinkOutcome,
    /// Blob container destination.
    pub remote: SinkOutcome,
}

impl GenerationReport {
    /// True when no enabled destination failed or was skipped.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        [&self.local, &self.remote]
            .iter()
            .all(|o| matches!(o, SinkOutcome::Disabled | SinkOutcome::Stored { .. }))
    }
}

/// Turns queue messages into check images.
///
/// The font is loaded once at construction; a missing or invalid font is
/// reported there and no generator is built.
pub struct CheckGenerator {
    renderer: Arc<CheckRenderer>,
    container: Arc<dyn BlobContainer>,
    local_folder: Option<PathBuf>,
    clock: fn() -> DateTime<Utc>,
}

impl CheckGenerator {
    /// Build a generator.
    ///
    /// `local_folder` enables the local sink when set.
    ///
    /// # Errors
    ///
    /// Returns an error if the font cannot be loaded.
    pub fn new(
        font: &dyn FontSource,
        container: Arc<dyn BlobContainer>,
        local_folder: Option<PathBuf>,
    ) -> Result<Self, CheckError> {
        let renderer = Arc::new(CheckRenderer::new(font.load()?));
        info!(font = %font.describe(), container = container.name(), "Check generator ready");
        Ok(Self { renderer, container, local_folder, clock: Utc::now })
    }

    /// Replace the clock used for artifact names.
    #[cfg(test)]
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Render `message` and store the PNG.
    ///
    /// Rendering and encoding run on the blocking pool. Persistence failures
    /// never escape: they are logged and reported in the returned
    /// [`GenerationReport`].
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::Render`] if the render task panicked or was
    /// cancelled.
    #[instrument(skip_all, fields(message_id = %message.id))]
    pub async fn handle(&self, message: &InboundMessage) -> Result<GenerationReport, CheckError> {
        info!("Queue trigger function executed");
        info!(
            inserted_on = ?message.inserted_on,
            expires_on = ?message.expires_on,
            dequeue_count = ?message.dequeue_count,
            body = %message.body,
            "Message received"
        );

        let renderer = Arc::clone(&self.renderer);
        let body = message.body.clone();
        let encoded = off_executor(move || encode_png(&renderer.render(&body))).await?;
        let blob_name = artifact_name((self.clock)());
        info!(%blob_name, "Blob name");

        let (local, remote) = self.persist(encoded, &blob_name).await;
        Ok(GenerationReport { message_id: message.id.clone(), blob_name, local, remote })
    }

    async fn persist(
        &self,
        encoded: Result<Vec<u8>, CheckError>,
        blob_name: &str,
    ) -> (SinkOutcome, SinkOutcome) {
        let png = match encoded {
            Ok(png) => png,
            Err(e) => {
                error!(error = %e, "{e}");
                let local = match self.local_folder {
                    Some(_) => SinkOutcome::failed(&e),
                    None => SinkOutcome::Disabled,
                };
                return (local, SinkOutcome::failed(&e));
            }
        };

        let local = match &self.local_folder {
            None => SinkOutcome::Disabled,
            Some(folder) => match write_local(folder, blob_name, &png).await {
                Ok(path) => {
                    info!(folder = %folder.display(), "Blobs folder");
                    let location = path.display().to_string();
                    SinkOutcome::Stored { location, sequence_number: None }
                }
                Err(e) => {
                    error!(error = %e, "{e}");
                    return (SinkOutcome::failed(&e), SinkOutcome::NotAttempted);
                }
            },
        };

        let remote = match self.upload(blob_name, png).await {
            Ok(info) => {
                info!(
                    sequence_number = ?info.sequence_number,
                    etag = ?info.etag,
                    last_modified = ?info.last_modified,
                    "Blob sequence number"
                );
                SinkOutcome::Stored {
                    location: format!("{}/{blob_name}", self.container.name()),
                    sequence_number: info.sequence_number,
                }
            }
            Err(e) => {
                error!(error = %e, "{e}");
                SinkOutcome::failed(&e)
            }
        };

        (local, remote)
    }

    async fn upload(&self, blob_name: &str, png: Vec<u8>) -> Result<BlobContentInfo, StorageError> {
        let creation = self.container.create_if_not_exists().await?;
        debug!(container = self.container.name(), ?creation, "Container ready");
        self.container.upload_blob(blob_name, png).await
    }
}

/// Run CPU-bound work on the blocking pool so the executor keeps serving
/// other invocations.
async fn off_executor<T, F>(work: F) -> Result<T, CheckError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(work).await.map_err(|e| {
        error!(error = %e, "Render task failed");
        CheckError::Render(e.to_string())
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use chrono::TimeZone;

    use super::*;
    use crate::adapters::fs_font::FileFontSource;
    use crate::adapters::memory::MemoryBlobContainer;
    use crate::render::{BACKGROUND, CANVAS_HEIGHT, CANVAS_WIDTH};

    fn bundled_font() -> FileFontSource {
        FileFontSource::new(
            PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fonts/DejaVuSerif-BoldItalic.ttf"),
        )
    }

    fn afternoon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 2, 14, 5, 9).unwrap()
    }

    fn a_second_later() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 2, 14, 5, 10).unwrap()
    }

    fn generator(
        container: &Arc<MemoryBlobContainer>,
        local_folder: Option<PathBuf>,
    ) -> CheckGenerator {
        let container: Arc<dyn BlobContainer> = Arc::clone(container) as Arc<dyn BlobContainer>;
        CheckGenerator::new(&bundled_font(), container, local_folder)
            .unwrap()
            .with_clock(afternoon)
    }

    async fn handle(generator: &CheckGenerator, id: &str, body: &str) -> GenerationReport {
        generator.handle(&InboundMessage::new(id, body)).await.unwrap()
    }

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(name);
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[tokio::test]
    async fn uploads_png_under_artifact_name() {
        let container = Arc::new(MemoryBlobContainer::default());
        let report = handle(&generator(&container, None), "m1", "$1,234.56").await;

        assert_eq!(report.message_id, "m1");
        assert_eq!(report.blob_name, "2024-03-02-02-05-09.png");
        assert_eq!(report.local, SinkOutcome::Disabled);
        assert_eq!(
            report.remote,
            SinkOutcome::Stored {
                location: "memory/2024-03-02-02-05-09.png".into(),
                sequence_number: None
            }
        );
        assert!(report.is_complete());

        let png = container.blob("2024-03-02-02-05-09.png").unwrap();
        let image = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(image.dimensions(), (CANVAS_WIDTH, CANVAS_HEIGHT));
        let text_inked = (200..400).any(|y| (100..1100).any(|x| *image.get_pixel(x, y) != BACKGROUND));
        assert!(text_inked);
        assert_ne!(*image.get_pixel(50, 300), BACKGROUND);
    }

    #[tokio::test]
    async fn local_sink_creates_folder_then_reuses_it() {
        let dir = scratch("checkgen_generator_local_test");
        let folder = dir.join("blobs");
        let container = Arc::new(MemoryBlobContainer::default());

        let first = generator(&container, Some(folder.clone()))
            .handle(&InboundMessage::new("m1", "$1"))
            .await
            .unwrap();
        assert!(folder.is_dir());
        assert_eq!(
            first.local,
            SinkOutcome::Stored {
                location: folder.join("2024-03-02-02-05-09.png").display().to_string(),
                sequence_number: None
            }
        );

        let second = generator(&container, Some(folder.clone()))
            .with_clock(a_second_later)
            .handle(&InboundMessage::new("m2", "$2"))
            .await
            .unwrap();
        assert!(second.is_complete(), "{second:?}");
        assert!(folder.join("2024-03-02-02-05-10.png").exists());
        assert_eq!(container.len(), 2);
        assert_eq!(container.create_calls(), 2);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn failed_upload_is_reported_not_raised() {
        let container = Arc::new(MemoryBlobContainer::failing("storage is down"));
        let report = handle(&generator(&container, None), "m1", "$1").await;

        match &report.remote {
            SinkOutcome::Failed { error } => assert!(error.contains("storage is down"), "{error}"),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(!report.is_complete());
    }

    #[tokio::test]
    async fn local_failure_skips_upload() {
        let dir = scratch("checkgen_generator_local_failure_test");
        std::fs::create_dir_all(&dir).unwrap();
        let blocker = dir.join("blobs");
        std::fs::write(&blocker, b"a file, not a folder").unwrap();
        let container = Arc::new(MemoryBlobContainer::default());

        let report =
            handle(&generator(&container, Some(blocker)), "m1", "$1").await;

        assert!(matches!(report.local, SinkOutcome::Failed { .. }));
        assert_eq!(report.remote, SinkOutcome::NotAttempted);
        assert_eq!(container.len(), 0);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn same_second_overwrites_locally_but_not_remotely() {
        let dir = scratch("checkgen_generator_collision_test");
        let folder = dir.join("blobs");
        let container = Arc::new(MemoryBlobContainer::default());
        let generator = generator(&container, Some(folder.clone()));

        let first = handle(&generator, "m1", "$1").await;
        let second = handle(&generator, "m2", "$2").await;

        assert!(first.is_complete());
        assert!(matches!(second.local, SinkOutcome::Stored { .. }));
        match &second.remote {
            SinkOutcome::Failed { error } => assert!(error.contains("already exists"), "{error}"),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(container.len(), 1);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn rendering_leaves_the_executor_free() {
        let container = Arc::new(MemoryBlobContainer::default());
        let generator = generator(&container, None);
        let done = AtomicBool::new(false);
        let ticks = AtomicUsize::new(0);

        let (report, ()) = tokio::join!(
            async {
                let report = handle(&generator, "m1", "$1,234.56").await;
                done.store(true, Ordering::SeqCst);
                report
            },
            async {
                while !done.load(Ordering::SeqCst) {
                    ticks.fetch_add(1, Ordering::SeqCst);
                    tokio::task::yield_now().await;
                }
            }
        );

        assert!(report.is_complete());
        // the single executor thread kept running other work while rendering
        assert!(ticks.load(Ordering::SeqCst) > 1);
    }

    #[tokio::test]
    async fn panicking_render_task_is_fatal() {
        let result: Result<u8, CheckError> = off_executor(|| panic!("glyph table corrupted")).await;
        assert!(matches!(result, Err(CheckError::Render(_))));
    }

    #[test]
    fn missing_font_prevents_construction() {
        let container: Arc<dyn BlobContainer> = Arc::new(MemoryBlobContainer::default());
        let font = FileFontSource::new("/nonexistent/fonts/Caveat-Regular.ttf");
        assert!(matches!(CheckGenerator::new(&font, container, None), Err(CheckError::Font(_))));
    }

    #[test]
    fn report_serializes_with_status_tags() {
        let report = GenerationReport {
            message_id: "m1".into(),
            blob_name: "x.png".into(),
            local: SinkOutcome::Disabled,
            remote: SinkOutcome::Failed { error: "boom".into() },
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["local"]["status"], "disabled");
        assert_eq!(json["remote"]["status"], "failed");
        assert_eq!(json["remote"]["error"], "boom");
    }
}
