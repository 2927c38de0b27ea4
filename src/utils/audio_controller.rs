//! Native media engine: a rodio sink driven from a dedicated audio thread.
//!
//! The UI thread sends commands over an mpsc channel and drains engine events
//! (loaded / time-advance / ended / error) once per frame. Every event is
//! tagged with the track id it belongs to so the app can drop stale events
//! after a track switch.

use crate::constants::ENGINE_POLL_INTERVAL_MILLIS;
use crate::state::playback::MediaEngine;
use crate::utils::errors::PlayerError;
use rodio::{Decoder, OutputStream, Sink, Source};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;

pub enum AudioCommand {
    Load {
        track_id: String,
        path: PathBuf,
        /// Advisory duration from the catalog, used when the decoder cannot
        /// report one. The engine-reported value is authoritative otherwise.
        fallback_duration: f64,
    },
    Play,
    Pause,
    SetVolume(f32),
    Seek(f64),
}

#[derive(Debug, Clone)]
pub enum EngineEvent {
    Loaded { track_id: String, duration: f64 },
    TimeAdvanced { track_id: String, position: f64 },
    Ended { track_id: String },
    Error { track_id: String, message: String },
}

pub struct AudioController {
    command_tx: Sender<AudioCommand>,
    event_rx: Receiver<EngineEvent>,
    device_ready: Arc<AtomicBool>,
}

struct LoadedTrack {
    track_id: String,
    sink: Sink,
    duration: f64,
    ended_sent: bool,
}

impl LoadedTrack {
    /// Sink-reported position, clamped to the known duration.
    fn position(&self) -> Duration {
        self.sink
            .get_pos()
            .min(Duration::from_secs_f64(self.duration.max(0.0)))
    }
}

impl AudioController {
    pub fn new() -> Self {
        let (command_tx, command_rx): (Sender<AudioCommand>, Receiver<AudioCommand>) = channel();
        let (event_tx, event_rx) = channel();
        let device_ready = Arc::new(AtomicBool::new(false));
        let device_ready_clone = device_ready.clone();

        std::thread::spawn(move || {
            engine_loop(command_rx, event_tx, device_ready_clone);
        });

        Self {
            command_tx,
            event_rx,
            device_ready,
        }
    }

    pub fn load(&self, track_id: String, path: PathBuf, fallback_duration: f64) {
        let _ = self.command_tx.send(AudioCommand::Load {
            track_id,
            path,
            fallback_duration,
        });
    }

    pub fn set_volume(&self, volume: f32) {
        let _ = self.command_tx.send(AudioCommand::SetVolume(volume));
    }

    /// Non-blocking drain of pending engine events.
    pub fn try_event(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }
}

impl Default for AudioController {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaEngine for AudioController {
    fn seek(&mut self, position: f64) {
        let _ = self.command_tx.send(AudioCommand::Seek(position.max(0.0)));
    }

    fn play(&mut self) -> Result<(), PlayerError> {
        if !self.device_ready.load(Ordering::Relaxed) {
            return Err(PlayerError::PlaybackRejected);
        }
        let _ = self.command_tx.send(AudioCommand::Play);
        Ok(())
    }

    fn pause(&mut self) {
        let _ = self.command_tx.send(AudioCommand::Pause);
    }
}

fn engine_loop(
    command_rx: Receiver<AudioCommand>,
    event_tx: Sender<EngineEvent>,
    device_ready: Arc<AtomicBool>,
) {
    // The output stream must live on this thread for the lifetime of playback.
    let stream = match OutputStream::try_default() {
        Ok((stream, handle)) => {
            device_ready.store(true, Ordering::Relaxed);
            Some((stream, handle))
        }
        Err(e) => {
            log::error!("[Engine] No audio output device: {}", e);
            None
        }
    };

    let mut current: Option<LoadedTrack> = None;
    let mut volume: f32 = 1.0;

    loop {
        while let Ok(cmd) = command_rx.try_recv() {
            match cmd {
                AudioCommand::Load {
                    track_id,
                    path,
                    fallback_duration,
                } => {
                    log::info!("[Engine] Load {} from {}", track_id, path.display());
                    // Tear down the previous sink before creating a new one.
                    if let Some(old) = current.take() {
                        old.sink.stop();
                    }

                    let Some((_, handle)) = &stream else {
                        let _ = event_tx.send(EngineEvent::Error {
                            track_id,
                            message: "no audio output device".to_string(),
                        });
                        continue;
                    };

                    match load_sink(handle, &path, volume) {
                        Ok((sink, reported)) => {
                            let duration = reported.unwrap_or(fallback_duration);
                            if reported.is_none() {
                                log::warn!(
                                    "[Engine] Decoder reported no duration for {}, using advisory {:.0}s",
                                    track_id,
                                    fallback_duration
                                );
                            }
                            let _ = event_tx.send(EngineEvent::Loaded {
                                track_id: track_id.clone(),
                                duration,
                            });
                            current = Some(LoadedTrack {
                                track_id,
                                sink,
                                duration,
                                ended_sent: false,
                            });
                        }
                        Err(message) => {
                            log::error!("[Engine] Load failed for {}: {}", track_id, message);
                            let _ = event_tx.send(EngineEvent::Error { track_id, message });
                        }
                    }
                }
                AudioCommand::Play => {
                    if let Some(cur) = current.as_ref() {
                        cur.sink.play();
                    }
                }
                AudioCommand::Pause => {
                    if let Some(cur) = current.as_ref() {
                        cur.sink.pause();
                    }
                }
                AudioCommand::SetVolume(v) => {
                    volume = v;
                    if let Some(cur) = current.as_ref() {
                        cur.sink.set_volume(v);
                    }
                }
                AudioCommand::Seek(position) => {
                    if let Some(cur) = current.as_mut() {
                        let target = Duration::from_secs_f64(position.min(cur.duration));
                        match cur.sink.try_seek(target) {
                            Ok(()) => {
                                cur.ended_sent = false;
                            }
                            Err(e) => {
                                log::error!("[Engine] Seek to {:.1}s failed: {}", position, e);
                            }
                        }
                    }
                }
            }
        }

        // Poll playback progress, mirroring the media element's timeupdate.
        if let Some(cur) = current.as_mut() {
            if cur.sink.empty() && !cur.ended_sent {
                log::info!("[Engine] Track {} ended", cur.track_id);
                cur.ended_sent = true;
                let _ = event_tx.send(EngineEvent::Ended {
                    track_id: cur.track_id.clone(),
                });
            } else if !cur.sink.is_paused() && !cur.sink.empty() {
                let _ = event_tx.send(EngineEvent::TimeAdvanced {
                    track_id: cur.track_id.clone(),
                    position: cur.position().as_secs_f64(),
                });
            }
        }

        std::thread::sleep(Duration::from_millis(ENGINE_POLL_INTERVAL_MILLIS));
    }
}

fn load_sink(
    handle: &rodio::OutputStreamHandle,
    path: &std::path::Path,
    volume: f32,
) -> Result<(Sink, Option<f64>), String> {
    let file = File::open(path).map_err(|e| format!("open {}: {}", path.display(), e))?;
    let source =
        Decoder::new(BufReader::new(file)).map_err(|e| format!("decode {}: {}", path.display(), e))?;
    let reported = source.total_duration().map(|d| d.as_secs_f64());
    let sink = Sink::try_new(handle).map_err(|e| format!("create sink: {}", e))?;
    sink.pause();
    sink.set_volume(volume);
    sink.append(source);
    Ok((sink, reported))
}
