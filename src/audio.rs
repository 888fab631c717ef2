//! Music transitions
//!
//! Playback itself is left to the host; the tracker only asks for a
//! crossfade to a level's track.

/// Plays background music
pub trait Music {
    /// Fade from the current track to `track` over `secs` seconds
    fn fade_to(&mut self, secs: f32, track: &str);
}

/// Keeps track of the requested song and logs transitions
#[derive(Debug, Clone)]
pub struct Jukebox {
    current: Option<String>,
    music_volume: f32,
}

impl Default for Jukebox {
    fn default() -> Self {
        Self::new(0.7)
    }
}

impl Jukebox {
    pub fn new(music_volume: f32) -> Self {
        Self {
            current: None,
            music_volume: music_volume.clamp(0.0, 1.0),
        }
    }

    /// Track currently playing (or fading in)
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn is_muted(&self) -> bool {
        self.music_volume <= 0.0
    }
}

impl Music for Jukebox {
    fn fade_to(&mut self, secs: f32, track: &str) {
        if self.current.as_deref() == Some(track) {
            return;
        }
        if track.is_empty() {
            log::debug!("Fading out music over {:.1}s", secs);
            self.current = None;
            return;
        }
        if !self.is_muted() {
            log::info!("Fading to '{}' over {:.1}s", track, secs);
        }
        self.current = Some(track.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fade_tracks_song() {
        let mut jukebox = Jukebox::default();
        assert_eq!(jukebox.current(), None);

        jukebox.fade_to(2.0, "bgm/track1.ogg");
        assert_eq!(jukebox.current(), Some("bgm/track1.ogg"));

        jukebox.fade_to(2.0, "");
        assert_eq!(jukebox.current(), None);
    }

    #[test]
    fn test_volume_clamped() {
        assert!(Jukebox::new(-1.0).is_muted());
        assert!(!Jukebox::new(3.0).is_muted());
    }
}
