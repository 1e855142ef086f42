//! Audio playback
//!
//! `MediaPlayer` is the seam between the controller and whatever actually
//! produces sound. `AudioBackend` implements it with rodio: streams are
//! downloaded through the catalog client, decoded in memory and appended to a
//! single `Sink`. Transport changes are reported as `PlayerEvent`s.

use std::io::Cursor;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Result, anyhow};
use rodio::{Decoder, OutputStream, Sink, Source};
use tokio::sync::mpsc;

use crate::model::SaavnClient;

/// Something the player can load
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaItem {
    pub id: String,
    pub url: String,
    /// Used when the decoder cannot tell the duration
    pub duration_hint_ms: u64,
}

/// Asynchronous transport notifications. Each carries the id of the media it refers to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlayerEvent {
    Loading { media_id: String },
    Ready { media_id: String, duration_ms: u64 },
    Playing { media_id: String },
    Paused { media_id: String },
    Seeked { media_id: String, position_ms: u64 },
    Stopped,
    LoadFailed { media_id: String, error: String },
}

pub type PlayerEventChannel = mpsc::UnboundedReceiver<PlayerEvent>;

pub trait MediaPlayer: Send + Sync {
    /// Start loading `media`, replacing whatever was loaded. Returns immediately.
    fn load(&self, media: MediaItem);
    fn play(&self);
    fn pause(&self);
    fn stop(&self);
    fn seek(&self, position_ms: u64) -> Result<()>;
    /// Volume in percent, 0..=100
    fn set_volume(&self, volume: u8);
    fn is_playing(&self) -> bool;
    fn position_ms(&self) -> u64;
    /// Id of the media that ran out since the last call, if any
    fn take_end_of_track(&self) -> Option<String>;
    /// Event stream; only the first caller gets it
    fn subscribe(&self) -> Option<PlayerEventChannel>;
}

struct BackendShared {
    sink: Sink,
    catalog: SaavnClient,
    generation: AtomicU64,
    loaded: AtomicBool,
    current_media: Mutex<Option<String>>,
    events: mpsc::UnboundedSender<PlayerEvent>,
}

impl BackendShared {
    fn emit(&self, event: PlayerEvent) {
        tracing::trace!(?event, "Player event");
        let _ = self.events.send(event);
    }

    fn current_media(&self) -> Option<String> {
        self.current_media.lock().map(|m| m.clone()).unwrap_or_default()
    }

    fn set_current_media(&self, media_id: Option<String>) {
        if let Ok(mut current) = self.current_media.lock() {
            *current = media_id;
        }
    }

    fn is_current_generation(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }
}

/// Keeps the output thread (and with it the `OutputStream`) alive
struct OutputGuard {
    shutdown: std::sync::mpsc::Sender<()>,
}

impl Drop for OutputGuard {
    fn drop(&mut self) {
        let _ = self.shutdown.send(());
    }
}

/// rodio-backed media player
#[derive(Clone)]
pub struct AudioBackend {
    shared: Arc<BackendShared>,
    receiver: Arc<Mutex<Option<PlayerEventChannel>>>,
    _output: Arc<OutputGuard>,
}

impl AudioBackend {
    /// Open the default output device. Blocks until the device is ready.
    pub fn new(catalog: SaavnClient, volume: u8) -> Result<Self> {
        let (ready_tx, ready_rx) = std::sync::mpsc::channel();
        let (shutdown_tx, shutdown_rx) = std::sync::mpsc::channel::<()>();

        // OutputStream is not Send, so it lives and dies on its own thread
        std::thread::Builder::new()
            .name("audio-output".to_string())
            .spawn(move || {
                let opened = OutputStream::try_default()
                    .map_err(|e| e.to_string())
                    .and_then(|(stream, handle)| {
                        Sink::try_new(&handle)
                            .map(|sink| (stream, sink))
                            .map_err(|e| e.to_string())
                    });

                match opened {
                    Ok((_stream, sink)) => {
                        if ready_tx.send(Ok(sink)).is_ok() {
                            let _ = shutdown_rx.recv();
                        }
                        tracing::debug!("Audio output thread exiting");
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                    }
                }
            })?;

        let sink = ready_rx
            .recv()?
            .map_err(|e| anyhow!("Audio output unavailable: {}", e))?;
        sink.set_volume(volume_to_gain(volume));

        let (events, receiver) = mpsc::unbounded_channel();
        tracing::info!(volume, "Audio backend initialized");

        Ok(Self {
            shared: Arc::new(BackendShared {
                sink,
                catalog,
                generation: AtomicU64::new(0),
                loaded: AtomicBool::new(false),
                current_media: Mutex::new(None),
                events,
            }),
            receiver: Arc::new(Mutex::new(Some(receiver))),
            _output: Arc::new(OutputGuard { shutdown: shutdown_tx }),
        })
    }
}

fn volume_to_gain(volume: u8) -> f32 {
    volume.min(100) as f32 / 100.0
}

impl MediaPlayer for AudioBackend {
    fn load(&self, media: MediaItem) {
        let shared = self.shared.clone();
        let generation = shared.generation.fetch_add(1, Ordering::SeqCst) + 1;

        shared.loaded.store(false, Ordering::SeqCst);
        shared.sink.clear();
        shared.set_current_media(Some(media.id.clone()));
        shared.emit(PlayerEvent::Loading { media_id: media.id.clone() });
        tracing::info!(media_id = %media.id, "Loading media");

        tokio::spawn(async move {
            let bytes = shared.catalog.fetch_stream(&media.url).await;

            if !shared.is_current_generation(generation) {
                tracing::debug!(media_id = %media.id, "Load superseded, dropping stream");
                return;
            }

            let decoded = bytes
                .map_err(anyhow::Error::from)
                .and_then(|bytes| Decoder::new(Cursor::new(bytes)).map_err(anyhow::Error::from));

            match decoded {
                Ok(source) => {
                    let duration_ms = source
                        .total_duration()
                        .map(|d| d.as_millis() as u64)
                        .filter(|ms| *ms > 0)
                        .unwrap_or(media.duration_hint_ms);

                    shared.sink.append(source);
                    shared.sink.play();
                    shared.loaded.store(true, Ordering::SeqCst);

                    tracing::info!(media_id = %media.id, duration_ms, "Media ready");
                    shared.emit(PlayerEvent::Ready { media_id: media.id.clone(), duration_ms });
                    shared.emit(PlayerEvent::Playing { media_id: media.id });
                }
                Err(e) => {
                    tracing::error!(media_id = %media.id, error = %e, "Failed to load media");
                    shared.set_current_media(None);
                    shared.emit(PlayerEvent::LoadFailed {
                        media_id: media.id,
                        error: e.to_string(),
                    });
                }
            }
        });
    }

    fn play(&self) {
        if !self.shared.loaded.load(Ordering::SeqCst) {
            return;
        }
        self.shared.sink.play();
        if let Some(media_id) = self.shared.current_media() {
            self.shared.emit(PlayerEvent::Playing { media_id });
        }
    }

    fn pause(&self) {
        self.shared.sink.pause();
        if let Some(media_id) = self.shared.current_media() {
            self.shared.emit(PlayerEvent::Paused { media_id });
        }
    }

    fn stop(&self) {
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
        self.shared.loaded.store(false, Ordering::SeqCst);
        self.shared.sink.clear();
        self.shared.set_current_media(None);
        self.shared.emit(PlayerEvent::Stopped);
    }

    fn seek(&self, position_ms: u64) -> Result<()> {
        if !self.shared.loaded.load(Ordering::SeqCst) {
            return Err(anyhow!("Nothing is loaded"));
        }
        self.shared
            .sink
            .try_seek(Duration::from_millis(position_ms))
            .map_err(|e| anyhow!("Seek failed: {}", e))?;
        if let Some(media_id) = self.shared.current_media() {
            self.shared.emit(PlayerEvent::Seeked { media_id, position_ms });
        }
        Ok(())
    }

    fn set_volume(&self, volume: u8) {
        self.shared.sink.set_volume(volume_to_gain(volume));
    }

    fn is_playing(&self) -> bool {
        self.shared.loaded.load(Ordering::SeqCst)
            && !self.shared.sink.is_paused()
            && !self.shared.sink.empty()
    }

    fn position_ms(&self) -> u64 {
        self.shared.sink.get_pos().as_millis() as u64
    }

    fn take_end_of_track(&self) -> Option<String> {
        if !self.shared.sink.empty() {
            return None;
        }
        if self.shared.loaded.swap(false, Ordering::SeqCst) {
            let media_id = self.shared.current_media();
            tracing::debug!(?media_id, "End of track");
            media_id
        } else {
            None
        }
    }

    fn subscribe(&self) -> Option<PlayerEventChannel> {
        self.receiver.lock().ok().and_then(|mut r| r.take())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_maps_to_unit_gain() {
        assert_eq!(volume_to_gain(0), 0.0);
        assert_eq!(volume_to_gain(50), 0.5);
        assert_eq!(volume_to_gain(100), 1.0);
        assert_eq!(volume_to_gain(180), 1.0);
    }
}
