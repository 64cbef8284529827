use crate::devices::DeviceEnumerator;
use crate::recognize::Recognizer;
use crate::source::{self, CameraFeed};
use crate::types::{DataUrl, Device, DeviceKind, RecognitionResult, Status};
use failure::Error;
use log::{error, info};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

struct State {
    devices: Vec<Device>,
    active_device: Option<String>,
    captured: Option<DataUrl>,
    result: Option<RecognitionResult>,
    status: Status,
    last_accepted: u64,
}

/// Mediates between device selection, image acquisition, and the
/// recognition round trip, holding the latest accepted result.
///
/// Cloning shares the underlying state, so captures and uploads may run on
/// separate tasks; overlapping submissions are ordered by sequence number
/// and a response older than the last accepted one is dropped.
#[derive(Clone)]
pub struct Controller {
    state: Arc<Mutex<State>>,
    feed: Arc<Mutex<Option<Arc<dyn CameraFeed>>>>,
    enumerator: Arc<dyn DeviceEnumerator>,
    recognizer: Arc<Recognizer>,
    next_seq: Arc<AtomicU64>,
}

impl Controller {
    pub fn new(enumerator: Arc<dyn DeviceEnumerator>, recognizer: Recognizer) -> Controller {
        Controller {
            state: Arc::new(Mutex::new(State {
                devices: vec![],
                active_device: None,
                captured: None,
                result: None,
                status: Status::Idle,
                last_accepted: 0,
            })),
            feed: Arc::new(Mutex::new(None)),
            enumerator,
            recognizer: Arc::new(recognizer),
            next_seq: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Enumerates devices, keeps the video inputs, and selects the first
    /// one as active. With no video inputs the selection stays unset.
    pub async fn initialize(&self) -> Result<(), Error> {
        let devices = self.enumerator.enumerate().await?;
        let mut state = self.state.lock().await;
        state.devices = devices
            .into_iter()
            .filter(|d| d.kind == DeviceKind::VideoInput)
            .collect();
        state.active_device = state.devices.first().map(|d| d.id.clone());
        match &state.active_device {
            Some(id) => info!("Selected default video device {}", id),
            None => info!("No video input devices found"),
        }
        Ok(())
    }

    /// Sets the active device. The id is not checked against the known
    /// set; an already-captured image is unaffected.
    pub async fn select_device(&self, id: &str) {
        self.state.lock().await.active_device = Some(id.to_string());
    }

    pub async fn bind_feed(&self, feed: Arc<dyn CameraFeed>) {
        *self.feed.lock().await = Some(feed);
    }

    /// Grabs one frame from the bound feed, stores it as the captured
    /// image, and submits it.
    pub async fn capture_from_camera(&self) -> Result<(), Error> {
        let feed = self
            .feed
            .lock()
            .await
            .clone()
            .ok_or_else(|| format_err!("No camera feed bound"))?;
        let frame = DataUrl::parse(&feed.grab_frame().await?)?;
        self.state.lock().await.captured = Some(frame.clone());
        self.submit(frame).await;
        Ok(())
    }

    /// Reads the file fully, stores it as the captured image, and submits
    /// it. Submission never starts before the read has finished.
    pub async fn upload_from_file(&self, path: &Path) -> Result<(), Error> {
        let image = source::read_image_file(path).await?;
        self.state.lock().await.captured = Some(image.clone());
        self.submit(image).await;
        Ok(())
    }

    async fn submit(&self, image: DataUrl) {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.state.lock().await.status = Status::Pending;
        let outcome = self.recognizer.recognize(&image).await;
        let mut state = self.state.lock().await;
        if seq < state.last_accepted {
            info!("Dropping stale response for submission {}", seq);
            return;
        }
        state.last_accepted = seq;
        match outcome {
            Ok(result) => {
                info!("Recognized {} plates", result.plates.len());
                state.result = Some(result);
                state.status = Status::Ready;
            }
            Err(e) => {
                // The previous result stays in place; only the status flips.
                error!("Error submitting image: {:?}", e);
                state.status = Status::Failed(e.to_string());
            }
        }
    }

    pub async fn devices(&self) -> Vec<Device> {
        self.state.lock().await.devices.clone()
    }

    pub async fn active_device(&self) -> Option<String> {
        self.state.lock().await.active_device.clone()
    }

    pub async fn captured(&self) -> Option<DataUrl> {
        self.state.lock().await.captured.clone()
    }

    pub async fn result(&self) -> Option<RecognitionResult> {
        self.state.lock().await.result.clone()
    }

    pub async fn status(&self) -> Status {
        self.state.lock().await.status.clone()
    }
}
