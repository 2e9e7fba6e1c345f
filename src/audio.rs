//! Audio capability
//!
//! The simulation only asks for sounds; whoever drives it decides what a
//! sound actually is. Every request is best-effort: failures are logged by
//! [`dispatch`] and never reach the game state.

use thiserror::Error;

use crate::sim::GameEvent;

/// Sound effect ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sound {
    /// Player took damage
    Hit,
    /// Item collected
    Pickup,
    /// Menu button pressed
    MenuClick,
}

impl Sound {
    /// Asset name (without extension)
    pub fn name(&self) -> &'static str {
        match self {
            Sound::Hit => "hit",
            Sound::Pickup => "pickup",
            Sound::MenuClick => "menu_click",
        }
    }
}

/// Music track ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Track {
    Background,
}

impl Track {
    pub fn name(&self) -> &'static str {
        match self {
            Track::Background => "bg_loop",
        }
    }
}

/// Why an audio request could not be honored
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("audio device unavailable")]
    Unavailable,
    #[error("playback failed: {0}")]
    Playback(String),
}

/// Something that can play sounds. Every method defaults to a silent no-op.
pub trait AudioSink {
    fn play_sound(&mut self, _sound: Sound) -> Result<(), AudioError> {
        Ok(())
    }

    fn play_music_loop(&mut self, _track: Track) -> Result<(), AudioError> {
        Ok(())
    }

    fn stop_music(&mut self) -> Result<(), AudioError> {
        Ok(())
    }
}

/// Silent sink
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioSink for NullAudio {}

/// Sink that only logs what would have played (headless runs)
#[derive(Debug, Default)]
pub struct LogAudio {
    music_playing: Option<Track>,
}

impl LogAudio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track currently looping, if any
    pub fn music_playing(&self) -> Option<Track> {
        self.music_playing
    }
}

impl AudioSink for LogAudio {
    fn play_sound(&mut self, sound: Sound) -> Result<(), AudioError> {
        log::debug!("Sound: {}", sound.name());
        Ok(())
    }

    fn play_music_loop(&mut self, track: Track) -> Result<(), AudioError> {
        log::info!("Music loop: {}", track.name());
        self.music_playing = Some(track);
        Ok(())
    }

    fn stop_music(&mut self) -> Result<(), AudioError> {
        if let Some(track) = self.music_playing.take() {
            log::info!("Music stopped: {}", track.name());
        }
        Ok(())
    }
}

/// Forward the audio-relevant `events` to `sink`.
///
/// Sound effects and music start are dropped while `enabled` is false; stop
/// requests always go through. Errors are logged and swallowed.
pub fn dispatch(sink: &mut dyn AudioSink, events: &[GameEvent], enabled: bool) {
    for event in events {
        let result = match *event {
            GameEvent::SoundRequested(sound) if enabled => sink.play_sound(sound),
            GameEvent::MusicStarted(track) if enabled => sink.play_music_loop(track),
            GameEvent::MusicStopped => sink.stop_music(),
            _ => Ok(()),
        };
        if let Err(e) = result {
            log::warn!("Audio request {:?} failed: {}", event, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records calls; optionally fails every one of them
    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
        fail: bool,
    }

    impl Recorder {
        fn record(&mut self, call: String) -> Result<(), AudioError> {
            self.calls.push(call);
            if self.fail {
                Err(AudioError::Unavailable)
            } else {
                Ok(())
            }
        }
    }

    impl AudioSink for Recorder {
        fn play_sound(&mut self, sound: Sound) -> Result<(), AudioError> {
            self.record(format!("sound:{}", sound.name()))
        }

        fn play_music_loop(&mut self, track: Track) -> Result<(), AudioError> {
            self.record(format!("music:{}", track.name()))
        }

        fn stop_music(&mut self) -> Result<(), AudioError> {
            self.record("stop".to_string())
        }
    }

    fn sample_events() -> Vec<GameEvent> {
        vec![
            GameEvent::SoundRequested(Sound::Pickup),
            GameEvent::MusicStarted(Track::Background),
            GameEvent::PlayerHit { health: 3 },
            GameEvent::MusicStopped,
        ]
    }

    #[test]
    fn test_dispatch_forwards_audio_events() {
        let mut rec = Recorder::default();
        dispatch(&mut rec, &sample_events(), true);
        assert_eq!(rec.calls, vec!["sound:pickup", "music:bg_loop", "stop"]);
    }

    #[test]
    fn test_dispatch_muted_only_stops() {
        let mut rec = Recorder::default();
        dispatch(&mut rec, &sample_events(), false);
        assert_eq!(rec.calls, vec!["stop"]);
    }

    #[test]
    fn test_dispatch_swallows_failures() {
        let mut rec = Recorder {
            fail: true,
            ..Default::default()
        };
        dispatch(&mut rec, &sample_events(), true);
        // Every request was still attempted
        assert_eq!(rec.calls.len(), 3);
    }

    #[test]
    fn test_null_audio_accepts_everything() {
        let mut sink = NullAudio;
        assert!(sink.play_sound(Sound::Hit).is_ok());
        assert!(sink.play_music_loop(Track::Background).is_ok());
        assert!(sink.stop_music().is_ok());
    }

    #[test]
    fn test_log_audio_tracks_music() {
        let mut sink = LogAudio::new();
        dispatch(&mut sink, &[GameEvent::MusicStarted(Track::Background)], true);
        assert_eq!(sink.music_playing(), Some(Track::Background));
        dispatch(&mut sink, &[GameEvent::MusicStopped], true);
        assert_eq!(sink.music_playing(), None);
    }

    #[test]
    fn test_log_audio_plays_sounds_without_touching_music() {
        let mut sink = LogAudio::new();
        sink.play_music_loop(Track::Background).unwrap();
        for sound in [Sound::Hit, Sound::Pickup, Sound::MenuClick] {
            assert!(sink.play_sound(sound).is_ok());
        }
        assert_eq!(sink.music_playing(), Some(Track::Background));
    }
}
