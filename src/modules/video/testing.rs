//! In-memory stand-ins for the collaborators of `VideoService`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::model::Video;
use super::repository::VideoStore;
use super::service::VideoService;
use crate::config::settings::PipelineConfig;
use crate::infrastructure::media::{
    ContainerRewriter, MediaError, MediaResult, StreamInspector, VideoDimensions,
};
use crate::infrastructure::storage::{
    ObjectStore, SignedUrl, StorageError, StorageResult, StoredPointer,
};

pub const BUCKET: &str = "tubely-videos";

pub fn sample_video(owner: Uuid) -> Video {
    let now = OffsetDateTime::now_utc();
    Video {
        id: Uuid::new_v4(),
        user_id: owner,
        title: "Boot.dev launch".to_string(),
        description: Some("A short clip".to_string()),
        thumbnail_url: None,
        video_url: None,
        created_at: now,
        updated_at: now,
    }
}

#[derive(Default)]
pub struct MemoryVideos {
    videos: Mutex<HashMap<Uuid, Video>>,
    fail_updates: AtomicBool,
    pub updates: AtomicUsize,
}

impl MemoryVideos {
    pub fn with(video: Video) -> Self {
        let store = Self::default();
        store.insert(video);
        store
    }

    pub fn insert(&self, video: Video) {
        self.videos.lock().unwrap().insert(video.id, video);
    }

    pub fn stored(&self, id: Uuid) -> Option<Video> {
        self.videos.lock().unwrap().get(&id).cloned()
    }

    pub fn fail_updates(&self) {
        self.fail_updates.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl VideoStore for MemoryVideos {
    async fn get_video(&self, id: Uuid) -> Result<Option<Video>> {
        Ok(self.stored(id))
    }

    async fn set_video_url(&self, id: Uuid, pointer: &StoredPointer) -> Result<Video> {
        if self.fail_updates.load(Ordering::SeqCst) {
            anyhow::bail!("database unavailable");
        }
        self.updates.fetch_add(1, Ordering::SeqCst);

        let mut videos = self.videos.lock().unwrap();
        let Some(video) = videos.get_mut(&id) else {
            anyhow::bail!("video {id} no longer exists");
        };
        video.video_url = Some(pointer.to_string());
        video.updated_at = OffsetDateTime::now_utc();
        Ok(video.clone())
    }
}

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<(String, String), StoredObject>>,
    fail_puts: AtomicBool,
    signatures: AtomicUsize,
}

impl MemoryObjectStore {
    pub fn fail_puts(&self) {
        self.fail_puts.store(true, Ordering::SeqCst);
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects
            .lock()
            .unwrap()
            .keys()
            .map(|(_, key)| key.clone())
            .collect()
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn signatures(&self) -> usize {
        self.signatures.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put_file(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
        content_type: &str,
    ) -> StorageResult<()> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(StorageError::UploadFailed("connection reset".to_string()));
        }
        let bytes = tokio::fs::read(path).await?;
        self.objects.lock().unwrap().insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn presign_get(&self, bucket: &str, key: &str, ttl: Duration) -> StorageResult<SignedUrl> {
        let n = self.signatures.fetch_add(1, Ordering::SeqCst);
        let expires_at = OffsetDateTime::now_utc() + ttl;
        Ok(SignedUrl {
            url: format!(
                "https://store.test/{bucket}/{key}?expires={}&sig={n}",
                expires_at.unix_timestamp()
            ),
            expires_at,
        })
    }
}

type RewriteHook = Box<dyn FnOnce() + Send>;

/// Copies the input verbatim, recording every call.
#[derive(Default)]
pub struct CopyRewriter {
    fail: bool,
    pub calls: AtomicUsize,
    during: Mutex<Option<RewriteHook>>,
}

impl CopyRewriter {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Runs `hook` once, while the next rewrite is in flight.
    pub fn during_next(&self, hook: impl FnOnce() + Send + 'static) {
        *self.during.lock().unwrap() = Some(Box::new(hook));
    }
}

#[async_trait]
impl ContainerRewriter for CopyRewriter {
    async fn rewrite(&self, input: &Path, output: &Path) -> MediaResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let hook = self.during.lock().unwrap().take();
        if let Some(hook) = hook {
            hook();
        }
        if self.fail {
            return Err(MediaError::ToolFailed {
                tool: "ffmpeg".to_string(),
                stderr: "moov atom not found".to_string(),
                exit_code: Some(1),
            });
        }
        tokio::fs::copy(input, output).await?;
        Ok(())
    }
}

pub struct FixedInspector(pub Option<VideoDimensions>);

impl FixedInspector {
    pub fn sized(width: u32, height: u32) -> Self {
        Self(Some(VideoDimensions::new(width, height)))
    }
}

#[async_trait]
impl StreamInspector for FixedInspector {
    async fn inspect(&self, path: &Path) -> MediaResult<VideoDimensions> {
        if !path.exists() {
            return Err(MediaError::FileNotFound(path.to_path_buf()));
        }
        self.0.ok_or(MediaError::NoVideoStream)
    }
}

pub struct Harness {
    pub temp_dir: tempfile::TempDir,
    pub videos: Arc<MemoryVideos>,
    pub store: Arc<MemoryObjectStore>,
    pub rewriter: Arc<CopyRewriter>,
    pub service: VideoService,
}

impl Harness {
    pub fn new(video: Video, rewriter: CopyRewriter, inspector: FixedInspector) -> Self {
        Self::with_limit(video, rewriter, inspector, 1 << 20)
    }

    pub fn with_limit(
        video: Video,
        rewriter: CopyRewriter,
        inspector: FixedInspector,
        max_upload_bytes: u64,
    ) -> Self {
        Self::build(video, rewriter, inspector, max_upload_bytes, None)
    }

    /// A harness whose scratch directory does not exist, so any attempt to
    /// create a temp file fails with an IO error.
    pub fn without_scratch_dir(video: Video, rewriter: CopyRewriter, inspector: FixedInspector) -> Self {
        Self::build(video, rewriter, inspector, 1 << 20, Some(PathBuf::from("missing")))
    }

    fn build(
        video: Video,
        rewriter: CopyRewriter,
        inspector: FixedInspector,
        max_upload_bytes: u64,
        scratch_subdir: Option<PathBuf>,
    ) -> Self {
        let temp_dir = tempfile::tempdir().unwrap();
        let scratch = match scratch_subdir {
            Some(sub) => temp_dir.path().join(sub),
            None => temp_dir.path().to_path_buf(),
        };
        let videos = Arc::new(MemoryVideos::with(video));
        let store = Arc::new(MemoryObjectStore::default());
        let rewriter = Arc::new(rewriter);

        let config = PipelineConfig {
            bucket: BUCKET.to_string(),
            accepted_media_type: "video/mp4".to_string(),
            max_upload_bytes,
            signed_url_ttl: Duration::from_secs(3600),
            temp_dir: scratch,
        };

        let service = VideoService::new(
            config,
            videos.clone(),
            store.clone(),
            rewriter.clone(),
            Arc::new(inspector),
        );

        Self {
            temp_dir,
            videos,
            store,
            rewriter,
            service,
        }
    }

    /// Files currently left in the scratch directory.
    pub fn leftover_files(&self) -> usize {
        std::fs::read_dir(self.temp_dir.path()).unwrap().count()
    }
}
