use url::Url;

/// Volume icon shown next to the volume slider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeLevel {
    Mute,
    Down,
    Up,
}

/// Playback state of the podcast player
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    is_playing: bool,
    current_time: f64,
    duration: f64,
    volume: f64,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            is_playing: false,
            current_time: 0.0,
            duration: 0.0,
            volume: 1.0,
        }
    }
}

impl PlayerState {
    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn toggle(&mut self) -> bool {
        self.is_playing = !self.is_playing;
        self.is_playing
    }

    /// Media metadata arrived
    pub fn set_duration(&mut self, seconds: f64) {
        self.duration = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
        self.current_time = self.current_time.min(self.duration);
    }

    /// Playback position advanced
    pub fn set_time(&mut self, seconds: f64) {
        self.seek(seconds);
    }

    pub fn seek(&mut self, seconds: f64) {
        if seconds.is_finite() {
            self.current_time = seconds.clamp(0.0, self.duration);
        }
    }

    /// Volume snaps to tenths within 0..=1
    pub fn set_volume(&mut self, volume: f64) {
        if volume.is_finite() {
            self.volume = (volume.clamp(0.0, 1.0) * 10.0).round() / 10.0;
        }
    }

    pub fn volume_level(&self) -> VolumeLevel {
        if self.volume == 0.0 {
            VolumeLevel::Mute
        } else if self.volume < 0.5 {
            VolumeLevel::Down
        } else {
            VolumeLevel::Up
        }
    }

    /// Command-line flags handing this state to an mpv process: audio only,
    /// at the current volume, muted when the volume is zero
    pub fn mpv_args(&self) -> Vec<String> {
        let mut args = vec![
            "--no-video".to_string(),
            format!("--volume={}", (self.volume * 100.0).round()),
        ];
        if self.volume_level() == VolumeLevel::Mute {
            args.push("--mute=yes".to_string());
        }
        args
    }

    /// `current / duration`, e.g. `1:05 / 12:00`
    pub fn position_label(&self) -> String {
        format!(
            "{} / {}",
            format_time(self.current_time),
            format_time(self.duration)
        )
    }
}

/// Format seconds as `m:ss`
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

/// Turn a podcast's `file_location` into something a player can open.
///
/// Absolute URLs are used as is; anything else is resolved against the API
/// base.
pub fn resolve_audio_source(api_base: &Url, location: &str) -> Result<Url, url::ParseError> {
    Url::parse(location).or_else(|_| api_base.join(location))
}
