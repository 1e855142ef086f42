//! Playback settings and the render snapshot of the player

use super::content::Song;
use super::queue::PlayerState;

pub const VOLUME_STEP: u8 = 5;

/// Settings related to playback
#[derive(Clone, Debug)]
pub struct PlaybackSettings {
    pub volume: u8,
    pub seek_step_ms: u64,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            volume: 100,
            seek_step_ms: 10_000,
        }
    }
}

impl PlaybackSettings {
    pub fn volume_up(&mut self) -> u8 {
        self.volume = self.volume.saturating_add(VOLUME_STEP).min(100);
        self.volume
    }

    pub fn volume_down(&mut self) -> u8 {
        self.volume = self.volume.saturating_sub(VOLUME_STEP);
        self.volume
    }
}

/// Complete playback information for rendering the UI
#[derive(Clone, Debug, Default)]
pub struct PlaybackInfo {
    pub current_song: Option<Song>,
    pub is_playing: bool,
    /// A stream is being downloaded or decoded
    pub is_buffering: bool,
    pub position_ms: u64,
    pub duration_ms: u64,
    pub queue: Vec<Song>,
    pub current_index: Option<usize>,
    /// Position as a fraction of the duration, 0.0 when unknown
    pub progress_ratio: f64,
    pub has_next: bool,
    pub has_previous: bool,
    pub settings: PlaybackSettings,
}

impl PlaybackInfo {
    pub fn from_state(state: &PlayerState, settings: PlaybackSettings, is_buffering: bool) -> Self {
        Self {
            current_song: state.current_song.clone(),
            is_playing: state.is_playing,
            is_buffering,
            position_ms: state.position_ms,
            duration_ms: state.duration_ms,
            queue: state.queue.clone(),
            current_index: state.current_index,
            progress_ratio: state.progress_ratio(),
            has_next: state.has_next(),
            has_previous: state.has_previous(),
            settings,
        }
    }

    /// Songs queued after the current one. With no cursor the whole queue is upcoming.
    pub fn up_next(&self) -> &[Song] {
        match self.current_index {
            Some(index) => self.queue.get(index + 1..).unwrap_or(&[]),
            None => &self.queue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::content::test_song;

    #[test]
    fn volume_steps_saturate() {
        let mut settings = PlaybackSettings { volume: 97, ..Default::default() };
        assert_eq!(settings.volume_up(), 100);
        assert_eq!(settings.volume_up(), 100);

        settings.volume = 3;
        assert_eq!(settings.volume_down(), 0);
    }

    #[test]
    fn up_next_follows_cursor() {
        let mut state = PlayerState::default();
        let queue = vec![test_song("a", "X"), test_song("b", "X"), test_song("c", "X")];
        state.play_song(queue[1].clone(), queue);

        let info = PlaybackInfo::from_state(&state, PlaybackSettings::default(), false);
        let ids: Vec<&str> = info.up_next().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["c"]);
        assert!(info.has_next);
        assert!(info.has_previous);

        state.remove("b");
        let info = PlaybackInfo::from_state(&state, PlaybackSettings::default(), false);
        assert_eq!(info.up_next().len(), 2);
        assert!(info.has_next);
        assert!(!info.has_previous);
    }

    #[test]
    fn snapshot_carries_progress() {
        let mut state = PlayerState::default();
        state.play_song(test_song("a", "X"), Vec::new());
        state.set_duration(200_000);
        state.set_position(50_000);

        let info = PlaybackInfo::from_state(&state, PlaybackSettings::default(), false);
        assert_eq!(info.progress_ratio, 0.25);
        assert!(!info.has_next);
    }
}
