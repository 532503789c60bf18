//! In-memory camera used by unit tests.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use super::backend::{CaptureDevice, CaptureStream, HardwareTrack};
use crate::error::{CaptureError, DeviceError};

/// Ordered record of everything that happened, shareable with test listeners.
pub(crate) type EventLog = Arc<Mutex<Vec<String>>>;

#[derive(Default)]
struct Shared {
    events: EventLog,
    opens: Mutex<usize>,
    track_stops: Mutex<HashMap<(usize, usize), usize>>,
    open_requested: Notify,
    open_gate: Notify,
}

impl Shared {
    fn record(&self, event: impl Into<String>) {
        self.events.lock().unwrap().push(event.into());
    }
}

#[derive(Clone)]
pub(crate) struct FakeCamera {
    tracks: usize,
    gated: bool,
    open_error: Option<DeviceError>,
    library_stop_error: Option<CaptureError>,
    track_error: Option<CaptureError>,
    shared: Arc<Shared>,
}

impl FakeCamera {
    pub(crate) fn new() -> Self {
        Self {
            tracks: 1,
            gated: false,
            open_error: None,
            library_stop_error: None,
            track_error: None,
            shared: Arc::default(),
        }
    }

    pub(crate) fn with_tracks(mut self, tracks: usize) -> Self {
        self.tracks = tracks;
        self
    }

    pub(crate) fn with_open_error(mut self, error: DeviceError) -> Self {
        self.open_error = Some(error);
        self
    }

    pub(crate) fn with_library_stop_error(mut self, error: CaptureError) -> Self {
        self.library_stop_error = Some(error);
        self
    }

    pub(crate) fn with_track_error(mut self, error: CaptureError) -> Self {
        self.track_error = Some(error);
        self
    }

    /// Hold every `open` until [`FakeCamera::release_open`] is called.
    pub(crate) fn gated(mut self) -> Self {
        self.gated = true;
        self
    }

    pub(crate) async fn wait_for_open_request(&self) {
        self.shared.open_requested.notified().await;
    }

    pub(crate) fn release_open(&self) {
        self.shared.open_gate.notify_one();
    }

    pub(crate) fn event_log(&self) -> EventLog {
        self.shared.events.clone()
    }

    pub(crate) fn events(&self) -> Vec<String> {
        self.shared.events.lock().unwrap().clone()
    }

    pub(crate) fn track_stops(&self) -> usize {
        self.shared.track_stops.lock().unwrap().values().sum()
    }

    pub(crate) fn max_stops_per_track(&self) -> usize {
        self.shared
            .track_stops
            .lock()
            .unwrap()
            .values()
            .copied()
            .max()
            .unwrap_or(0)
    }
}

impl CaptureDevice for FakeCamera {
    type Stream = FakeStream;

    fn open(&self) -> impl Future<Output = Result<FakeStream, DeviceError>> + Send {
        let camera = self.clone();
        async move {
            camera.shared.record("open");
            camera.shared.open_requested.notify_one();
            if camera.gated {
                camera.shared.open_gate.notified().await;
            }

            if let Some(error) = camera.open_error.clone() {
                return Err(error);
            }

            let generation = {
                let mut opens = camera.shared.opens.lock().unwrap();
                *opens += 1;
                *opens
            };

            Ok(FakeStream {
                generation,
                tracks: camera.tracks,
                library_stop_error: camera.library_stop_error.clone(),
                track_error: camera.track_error.clone(),
                shared: camera.shared.clone(),
            })
        }
    }
}

pub(crate) struct FakeStream {
    generation: usize,
    tracks: usize,
    library_stop_error: Option<CaptureError>,
    track_error: Option<CaptureError>,
    shared: Arc<Shared>,
}

impl CaptureStream for FakeStream {
    type Track = FakeTrack;

    fn stop(&mut self) -> impl Future<Output = Result<(), CaptureError>> + Send {
        self.shared.record("library-stop");
        let result = match self.library_stop_error.clone() {
            Some(error) => Err(error),
            None => Ok(()),
        };
        std::future::ready(result)
    }

    fn video_tracks(&mut self) -> Vec<FakeTrack> {
        (0..self.tracks)
            .map(|index| FakeTrack {
                key: (self.generation, index),
                error: self.track_error.clone(),
                shared: self.shared.clone(),
            })
            .collect()
    }
}

pub(crate) struct FakeTrack {
    key: (usize, usize),
    error: Option<CaptureError>,
    shared: Arc<Shared>,
}

impl HardwareTrack for FakeTrack {
    fn label(&self) -> String {
        format!("track-{}", self.key.1)
    }

    fn stop(&mut self) -> Result<(), CaptureError> {
        self.shared.record(format!("{}-stop", self.label()));
        *self
            .shared
            .track_stops
            .lock()
            .unwrap()
            .entry(self.key)
            .or_default() += 1;

        match self.error.clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
