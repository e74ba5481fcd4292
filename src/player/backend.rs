//! Sermon audio playback backend using rodio.

use std::io::{BufReader, Cursor};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use color_eyre::Result;
use rodio::{Decoder, OutputStream, Sink, Source};
use tokio::sync::mpsc;

use crate::action::PlayerState;

/// Messages sent to the player thread.
#[derive(Debug)]
pub enum PlayerCommand {
    Play { url: String },
    Pause,
    Resume,
    Stop,
    SetVolume(f32),
    Seek(Duration),
}

/// Messages sent from the player thread.
#[derive(Debug, Clone)]
pub enum PlayerEvent {
    StateChanged(PlayerState),
    Progress {
        position: Duration,
        duration: Duration,
    },
    TrackEnded,
    Error(String),
}

/// Audio player that runs in a separate thread.
pub struct Player {
    command_tx: mpsc::UnboundedSender<PlayerCommand>,
    event_rx: mpsc::UnboundedReceiver<PlayerEvent>,
}

/// Playback state shared with the player thread.
struct PlayerStateShared {
    is_playing: AtomicBool,
    position_ms: AtomicU64,
}

impl Player {
    /// Create a new audio player.
    pub fn new(volume: u8) -> Result<Self> {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let state = Arc::new(PlayerStateShared {
            is_playing: AtomicBool::new(false),
            position_ms: AtomicU64::new(0),
        });

        let initial_volume = volume as f32 / 100.0;

        // Spawn the player thread
        std::thread::spawn(move || {
            if let Err(e) = run_player_thread(command_rx, event_tx, state, initial_volume) {
                tracing::error!("Player thread error: {}", e);
            }
        });

        Ok(Self {
            command_tx,
            event_rx,
        })
    }

    /// Play a sermon recording from a URL.
    pub fn play(&self, url: String) -> Result<()> {
        self.command_tx.send(PlayerCommand::Play { url })?;
        Ok(())
    }

    /// Pause playback.
    pub fn pause(&self) -> Result<()> {
        self.command_tx.send(PlayerCommand::Pause)?;
        Ok(())
    }

    /// Resume playback.
    pub fn resume(&self) -> Result<()> {
        self.command_tx.send(PlayerCommand::Resume)?;
        Ok(())
    }

    /// Stop playback.
    pub fn stop(&self) -> Result<()> {
        self.command_tx.send(PlayerCommand::Stop)?;
        Ok(())
    }

    /// Seek to a position.
    pub fn seek(&self, position: Duration) -> Result<()> {
        self.command_tx.send(PlayerCommand::Seek(position))?;
        Ok(())
    }

    /// Set playback volume (0-100).
    pub fn set_volume(&self, volume: u8) -> Result<()> {
        self.command_tx
            .send(PlayerCommand::SetVolume(volume as f32 / 100.0))?;
        Ok(())
    }

    /// Try to receive a player event (non-blocking).
    pub fn try_recv_event(&mut self) -> Option<PlayerEvent> {
        self.event_rx.try_recv().ok()
    }
}

/// Run the player thread.
fn run_player_thread(
    mut command_rx: mpsc::UnboundedReceiver<PlayerCommand>,
    event_tx: mpsc::UnboundedSender<PlayerEvent>,
    state: Arc<PlayerStateShared>,
    initial_volume: f32,
) -> Result<()> {
    // Initialize audio output
    let (_stream, stream_handle) = OutputStream::try_default()?;
    let sink = Arc::new(Mutex::new(Sink::try_new(&stream_handle)?));

    let mut current_duration: Option<Duration> = None;
    let mut current_audio_data: Option<Vec<u8>> = None;
    let mut current_volume: f32 = initial_volume;

    loop {
        // Check for commands (non-blocking)
        match command_rx.try_recv() {
            Ok(cmd) => match cmd {
                PlayerCommand::Play { url } => {
                    // Stop current playback
                    {
                        let s = sink.lock().unwrap();
                        s.stop();
                    }
                    // Create new sink after stop
                    *sink.lock().unwrap() = Sink::try_new(&stream_handle)?;

                    // Fetch and decode the audio stream
                    match fetch_audio_data(&url) {
                        Ok(audio_data) => {
                            current_audio_data = Some(audio_data.clone());
                            match play_audio_data(
                                &audio_data,
                                &sink,
                                current_volume,
                                Duration::ZERO,
                            ) {
                                Ok(duration) => {
                                    // Duration comes from the decoder; VBR
                                    // streams may not report one.
                                    current_duration = duration;
                                    state.is_playing.store(true, Ordering::SeqCst);
                                    state.position_ms.store(0, Ordering::SeqCst);
                                    let _ = event_tx
                                        .send(PlayerEvent::StateChanged(PlayerState::Playing));
                                }
                                Err(e) => {
                                    let _ = event_tx.send(PlayerEvent::Error(e.to_string()));
                                }
                            }
                        }
                        Err(e) => {
                            let _ = event_tx.send(PlayerEvent::Error(e.to_string()));
                        }
                    }
                }
                PlayerCommand::Pause => {
                    sink.lock().unwrap().pause();
                    state.is_playing.store(false, Ordering::SeqCst);
                    let _ = event_tx.send(PlayerEvent::StateChanged(PlayerState::Paused));
                }
                PlayerCommand::Resume => {
                    sink.lock().unwrap().play();
                    state.is_playing.store(true, Ordering::SeqCst);
                    let _ = event_tx.send(PlayerEvent::StateChanged(PlayerState::Playing));
                }
                PlayerCommand::Stop => {
                    {
                        let s = sink.lock().unwrap();
                        s.stop();
                    }
                    *sink.lock().unwrap() = Sink::try_new(&stream_handle)?;
                    current_audio_data = None;
                    state.is_playing.store(false, Ordering::SeqCst);
                    state.position_ms.store(0, Ordering::SeqCst);
                    let _ = event_tx.send(PlayerEvent::StateChanged(PlayerState::Stopped));
                }
                PlayerCommand::SetVolume(vol) => {
                    current_volume = vol;
                    sink.lock().unwrap().set_volume(vol);
                }
                PlayerCommand::Seek(position) => {
                    // Seek by recreating the source with skip_duration
                    if let Some(ref audio_data) = current_audio_data {
                        {
                            let s = sink.lock().unwrap();
                            s.stop();
                        }
                        *sink.lock().unwrap() = Sink::try_new(&stream_handle)?;

                        // Play from the new position
                        if let Err(e) = play_audio_data(audio_data, &sink, current_volume, position)
                        {
                            let _ =
                                event_tx.send(PlayerEvent::Error(format!("Seek failed: {}", e)));
                        } else {
                            state
                                .position_ms
                                .store(position.as_millis() as u64, Ordering::SeqCst);
                            state.is_playing.store(true, Ordering::SeqCst);
                            let _ = event_tx.send(PlayerEvent::StateChanged(PlayerState::Playing));
                        }
                    }
                }
            },
            Err(mpsc::error::TryRecvError::Empty) => {}
            Err(mpsc::error::TryRecvError::Disconnected) => {
                // Channel closed, exit thread
                break;
            }
        }

        // Check if track ended
        if sink.lock().unwrap().empty() && state.is_playing.load(Ordering::SeqCst) {
            state.is_playing.store(false, Ordering::SeqCst);
            let _ = event_tx.send(PlayerEvent::TrackEnded);
        }

        // Update progress (approximate based on time elapsed)
        if state.is_playing.load(Ordering::SeqCst) {
            let current = state.position_ms.load(Ordering::SeqCst);
            state.position_ms.store(current + 100, Ordering::SeqCst);

            let _ = event_tx.send(PlayerEvent::Progress {
                position: Duration::from_millis(current),
                duration: current_duration.unwrap_or(Duration::ZERO),
            });
        }

        // Sleep to avoid busy waiting
        std::thread::sleep(Duration::from_millis(100));
    }

    Ok(())
}

/// Fetch audio data from URL.
fn fetch_audio_data(url: &str) -> Result<Vec<u8>> {
    let response = reqwest::blocking::get(url)?;
    let bytes = response.bytes()?;
    Ok(bytes.to_vec())
}

/// Play audio data with optional skip duration for seeking. Returns the
/// decoded duration when the container reports one.
fn play_audio_data(
    audio_data: &[u8],
    sink: &Arc<Mutex<Sink>>,
    volume: f32,
    skip: Duration,
) -> Result<Option<Duration>> {
    let cursor = Cursor::new(audio_data.to_vec());
    let source = Decoder::new(BufReader::new(cursor))?;
    let duration = source.total_duration();

    let s = sink.lock().unwrap();
    if skip > Duration::ZERO {
        s.append(source.skip_duration(skip));
    } else {
        s.append(source);
    }
    s.set_volume(volume);
    s.play();

    Ok(duration)
}
