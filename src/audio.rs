//! Audio cues
//!
//! Named cues with shared volume/mute state. Short effects are synthesized
//! sine blips; the background track is loaded from disk and falls back to a
//! quiet looping tone when it cannot be loaded. Actual output goes through an
//! [`AudioBackend`] so the game never depends on a sound device.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Sound cue names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    /// Player jumped
    Jump,
    /// Run ended
    GameOver,
    /// New high score
    Score,
    /// Menu cursor moved
    MenuSelect,
    /// Menu item chosen
    MenuConfirm,
    /// Looping background music
    Background,
}

impl Cue {
    pub const ALL: [Cue; 6] = [
        Cue::Jump,
        Cue::GameOver,
        Cue::Score,
        Cue::MenuSelect,
        Cue::MenuConfirm,
        Cue::Background,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Cue::Jump => "jump",
            Cue::GameOver => "gameOver",
            Cue::Score => "score",
            Cue::MenuSelect => "menuSelect",
            Cue::MenuConfirm => "menuConfirm",
            Cue::Background => "background",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Synthesized sound for this cue
    pub fn tone(&self) -> Tone {
        match self {
            Cue::Jump => Tone::new(800.0, 0.1),
            Cue::GameOver => Tone::new(200.0, 0.3),
            Cue::Score => Tone::new(1200.0, 0.1),
            Cue::MenuSelect => Tone::new(600.0, 0.1),
            Cue::MenuConfirm => Tone::new(1000.0, 0.1),
            Cue::Background => Tone {
                looping: true,
                ..Tone::new(440.0, 0.05)
            },
        }
    }
}

/// A sine blip with an exponential fade
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    /// Hz
    pub frequency: f32,
    /// Seconds
    pub duration: f32,
    pub looping: bool,
}

/// Level the fade ends at
const FADE_FLOOR: f32 = 0.01;

impl Tone {
    pub fn new(frequency: f32, duration: f32) -> Self {
        Self {
            frequency,
            duration,
            looping: false,
        }
    }

    /// Gain at `t` seconds: exponential ramp from `volume` down to 0.01
    pub fn gain_at(&self, volume: f32, t: f32) -> f32 {
        if volume <= 0.0 {
            return 0.0;
        }
        if volume <= FADE_FLOOR || self.duration <= 0.0 {
            return volume;
        }
        let progress = (t / self.duration).clamp(0.0, 1.0);
        volume * (FADE_FLOOR / volume).powf(progress)
    }

    /// Mono PCM samples for one pass of the tone
    pub fn render(&self, volume: f32, sample_rate: u32) -> Vec<f32> {
        let count = (self.duration.max(0.0) * sample_rate as f32).round() as usize;
        let step = std::f32::consts::TAU * self.frequency / sample_rate as f32;
        (0..count)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                (step * i as f32).sin() * self.gain_at(volume, t)
            })
            .collect()
    }
}

/// Audio failures
#[derive(thiserror::Error, Debug)]
pub enum AudioError {
    /// A track could not be loaded
    #[error("Failed to load {path}: {reason}")]
    Load { path: PathBuf, reason: String },
}

/// Handle to a loaded track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrackId(pub u32);

/// Where sounds actually go
pub trait AudioBackend {
    fn load_track(&mut self, path: &Path) -> Result<TrackId, AudioError>;
    fn play_track(&mut self, track: TrackId, volume: f32, looping: bool);
    fn stop_track(&mut self, track: TrackId);
    fn set_track_volume(&mut self, track: TrackId, volume: f32);
    fn play_tone(&mut self, tone: &Tone, volume: f32);
    fn stop_tones(&mut self);
}

/// Backend with no device: tracks playback state and logs
#[derive(Debug, Default)]
pub struct SilentBackend {
    next_track: u32,
    playing: HashSet<TrackId>,
    looping_tone: Option<Tone>,
}

impl SilentBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_track_playing(&self, track: TrackId) -> bool {
        self.playing.contains(&track)
    }

    pub fn looping_tone(&self) -> Option<Tone> {
        self.looping_tone
    }
}

impl AudioBackend for SilentBackend {
    fn load_track(&mut self, path: &Path) -> Result<TrackId, AudioError> {
        std::fs::metadata(path).map_err(|e| AudioError::Load {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        self.next_track += 1;
        Ok(TrackId(self.next_track))
    }

    fn play_track(&mut self, track: TrackId, volume: f32, looping: bool) {
        log::debug!("Track {:?} playing (volume {:.2}, loop {})", track, volume, looping);
        self.playing.insert(track);
    }

    fn stop_track(&mut self, track: TrackId) {
        self.playing.remove(&track);
    }

    fn set_track_volume(&mut self, _track: TrackId, _volume: f32) {}

    fn play_tone(&mut self, tone: &Tone, volume: f32) {
        log::debug!("Tone {:.0} Hz for {:.2}s at {:.2}", tone.frequency, tone.duration, volume);
        if tone.looping {
            self.looping_tone = Some(*tone);
        }
    }

    fn stop_tones(&mut self) {
        self.looping_tone = None;
    }
}

/// What the background cue plays
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundSource {
    Track(TrackId),
    /// Fallback when the track failed to load
    Tone(Tone),
}

/// Sound manager for the game
pub struct SoundManager<B: AudioBackend> {
    backend: B,
    background: BackgroundSource,
    background_playing: bool,
    volume: f32,
    muted: bool,
}

impl<B: AudioBackend> SoundManager<B> {
    /// Default volume before settings are applied
    pub const DEFAULT_VOLUME: f32 = 0.5;

    /// Set up cues; `track` is the background music file, if any
    pub fn new(mut backend: B, track: Option<&Path>) -> Self {
        let background = match track.map(|p| backend.load_track(p)) {
            Some(Ok(id)) => {
                log::info!("Background music loaded successfully");
                BackgroundSource::Track(id)
            }
            Some(Err(e)) => {
                log::warn!("Failed to load background music: {}", e);
                BackgroundSource::Tone(Cue::Background.tone())
            }
            None => BackgroundSource::Tone(Cue::Background.tone()),
        };

        Self {
            backend,
            background,
            background_playing: false,
            volume: Self::DEFAULT_VOLUME,
            muted: false,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn background_source(&self) -> BackgroundSource {
        self.background
    }

    /// Play a cue (no-op while muted)
    pub fn play(&mut self, cue: Cue) {
        if self.muted {
            return;
        }
        match cue {
            Cue::Background => self.play_background_music(),
            _ => self.backend.play_tone(&cue.tone(), self.volume),
        }
    }

    /// Stop a cue; short effects end on their own
    pub fn stop(&mut self, cue: Cue) {
        if cue == Cue::Background {
            self.stop_background_music();
        }
    }

    pub fn stop_all(&mut self) {
        self.stop_background_music();
        self.backend.stop_tones();
    }

    /// Set volume (0.0 - 1.0)
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            0.0
        };
        if let BackgroundSource::Track(id) = self.background {
            self.backend.set_track_volume(id, self.volume);
        }
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Flip mute; muting stops everything. Returns the new state.
    pub fn toggle_mute(&mut self) -> bool {
        self.set_muted(!self.muted);
        self.muted
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if muted {
            self.stop_all();
        } else if let BackgroundSource::Track(id) = self.background {
            self.backend.set_track_volume(id, self.volume);
        }
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn play_background_music(&mut self) {
        if self.muted || self.background_playing {
            return;
        }
        match self.background {
            BackgroundSource::Track(id) => self.backend.play_track(id, self.volume, true),
            BackgroundSource::Tone(tone) => self.backend.play_tone(&tone, self.volume),
        }
        self.background_playing = true;
    }

    pub fn stop_background_music(&mut self) {
        if !self.background_playing {
            return;
        }
        match self.background {
            BackgroundSource::Track(id) => self.backend.stop_track(id),
            BackgroundSource::Tone(_) => self.backend.stop_tones(),
        }
        self.background_playing = false;
    }

    pub fn is_background_playing(&self) -> bool {
        self.background_playing
    }
}
