//! Playback queue state machine
//!
//! `PlayerState` is the single record the UI renders from: the current song,
//! the ordered queue, the queue cursor and the transport counters mirrored
//! from the media player. Every mutation keeps the cursor either `None` or a
//! valid index into `queue`.

use super::content::Song;

/// Outcome of removing a song from the queue
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemoveOutcome {
    NotFound,
    Removed,
    /// The removed song was the current one; the media player must be stopped
    RemovedCurrent,
}

#[derive(Clone, Debug, Default)]
pub struct PlayerState {
    pub current_song: Option<Song>,
    pub is_playing: bool,
    pub position_ms: u64,
    pub duration_ms: u64,
    pub queue: Vec<Song>,
    pub current_index: Option<usize>,
}

impl PlayerState {
    /// Replace the whole queue and make `song` current.
    ///
    /// Returns the song the media player has to load.
    pub fn play_song(&mut self, song: Song, queue: Vec<Song>) -> Song {
        let mut queue = if queue.is_empty() { vec![song.clone()] } else { queue };

        let index = match queue.iter().position(|s| s.id == song.id) {
            Some(index) => index,
            None => {
                queue.insert(0, song.clone());
                0
            }
        };

        self.queue = queue;
        self.current_index = Some(index);
        self.start(song.clone());
        song
    }

    /// Move the cursor forward. With no cursor the first queued song is next.
    pub fn next(&mut self) -> Option<Song> {
        let next_index = match self.current_index {
            Some(index) => index + 1,
            None => 0,
        };
        self.move_to(next_index)
    }

    pub fn previous(&mut self) -> Option<Song> {
        match self.current_index {
            Some(index) if index > 0 => self.move_to(index - 1),
            _ => None,
        }
    }

    /// Make the song at `index` current
    pub fn jump_to(&mut self, index: usize) -> Option<Song> {
        self.move_to(index)
    }

    /// Append `song` unless a song with the same id is already queued
    pub fn add(&mut self, song: Song) -> bool {
        if self.queue.iter().any(|s| s.id == song.id) {
            return false;
        }
        self.queue.push(song);
        true
    }

    pub fn remove(&mut self, song_id: &str) -> RemoveOutcome {
        let Some(removed_index) = self.queue.iter().position(|s| s.id == song_id) else {
            return RemoveOutcome::NotFound;
        };

        self.queue.remove(removed_index);

        match self.current_index {
            Some(current) if removed_index < current => {
                self.current_index = Some(current - 1);
                RemoveOutcome::Removed
            }
            Some(current) if removed_index == current => {
                self.current_index = None;
                self.current_song = None;
                self.is_playing = false;
                self.position_ms = 0;
                self.duration_ms = 0;
                RemoveOutcome::RemovedCurrent
            }
            _ => RemoveOutcome::Removed,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn has_next(&self) -> bool {
        match self.current_index {
            Some(index) => index + 1 < self.queue.len(),
            None => !self.queue.is_empty(),
        }
    }

    pub fn has_previous(&self) -> bool {
        matches!(self.current_index, Some(index) if index > 0)
    }

    pub fn is_current(&self, song_id: &str) -> bool {
        self.current_song.as_ref().is_some_and(|s| s.id == song_id)
    }

    pub fn cursor_is_valid(&self) -> bool {
        self.current_index.is_none_or(|index| index < self.queue.len())
    }

    pub fn set_playing(&mut self, is_playing: bool) {
        self.is_playing = is_playing;
    }

    pub fn set_duration(&mut self, duration_ms: u64) {
        self.duration_ms = duration_ms;
    }

    pub fn set_position(&mut self, position_ms: u64) {
        self.position_ms = self.clamp_position(position_ms);
    }

    /// Mirror the player transport; ignored unless playing
    pub fn sync_progress(&mut self, position_ms: u64, duration_ms: Option<u64>) {
        if !self.is_playing {
            return;
        }
        if let Some(duration_ms) = duration_ms.filter(|d| *d > 0) {
            self.duration_ms = duration_ms;
        }
        self.position_ms = self.clamp_position(position_ms);
    }

    /// Where a seek to `position_ms` would land, without moving there
    pub fn seek_target(&self, position_ms: u64) -> u64 {
        self.clamp_position(position_ms)
    }

    /// Apply a seek the player accepted, returning the clamped position
    pub fn seek(&mut self, position_ms: u64) -> u64 {
        self.position_ms = self.seek_target(position_ms);
        self.position_ms
    }

    pub fn progress_ratio(&self) -> f64 {
        if self.duration_ms > 0 {
            (self.position_ms as f64 / self.duration_ms as f64).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    fn clamp_position(&self, position_ms: u64) -> u64 {
        if self.duration_ms > 0 {
            position_ms.min(self.duration_ms)
        } else {
            position_ms
        }
    }

    fn move_to(&mut self, index: usize) -> Option<Song> {
        let song = self.queue.get(index)?.clone();
        self.current_index = Some(index);
        self.start(song.clone());
        Some(song)
    }

    fn start(&mut self, song: Song) {
        self.current_song = Some(song);
        self.is_playing = false;
        self.position_ms = 0;
        self.duration_ms = 0;
        debug_assert!(self.cursor_is_valid());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::content::test_song;

    fn queue_of(ids: &[&str]) -> Vec<Song> {
        ids.iter().map(|id| test_song(id, "Artist")).collect()
    }

    fn playing_at(ids: &[&str], current: &str) -> PlayerState {
        let mut state = PlayerState::default();
        let queue = queue_of(ids);
        let song = queue.iter().find(|s| s.id == current).cloned().unwrap();
        state.play_song(song, queue);
        state.set_playing(true);
        state
    }

    fn ids(state: &PlayerState) -> Vec<&str> {
        state.queue.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn play_song_replaces_queue_and_points_at_song() {
        let mut state = playing_at(&["a", "b"], "b");
        let song = state.play_song(test_song("y", "Artist"), queue_of(&["x", "y", "z"]));

        assert_eq!(song.id, "y");
        assert_eq!(ids(&state), vec!["x", "y", "z"]);
        assert_eq!(state.current_index, Some(1));
        assert!(state.is_current("y"));
        assert!(!state.is_playing);
        assert_eq!(state.position_ms, 0);
    }

    #[test]
    fn play_song_with_empty_context_queues_only_that_song() {
        let mut state = PlayerState::default();
        state.play_song(test_song("solo", "Artist"), Vec::new());

        assert_eq!(ids(&state), vec!["solo"]);
        assert_eq!(state.current_index, Some(0));
    }

    #[test]
    fn play_song_missing_from_context_is_prepended() {
        let mut state = PlayerState::default();
        state.play_song(test_song("new", "Artist"), queue_of(&["a", "b"]));

        assert_eq!(ids(&state), vec!["new", "a", "b"]);
        assert_eq!(state.current_index, Some(0));
        assert!(state.cursor_is_valid());
    }

    #[test]
    fn remove_before_cursor_decrements_it() {
        let mut state = playing_at(&["a", "b", "c"], "c");

        assert_eq!(state.remove("a"), RemoveOutcome::Removed);
        assert_eq!(state.current_index, Some(1));
        assert!(state.is_current("c"));
        assert_eq!(state.queue[1].id, "c");
        assert!(state.is_playing);
    }

    #[test]
    fn remove_at_cursor_clears_current_song() {
        let mut state = playing_at(&["a", "b", "c"], "b");

        assert_eq!(state.remove("b"), RemoveOutcome::RemovedCurrent);
        assert_eq!(state.current_index, None);
        assert!(state.current_song.is_none());
        assert!(!state.is_playing);
        assert_eq!(ids(&state), vec!["a", "c"]);
    }

    #[test]
    fn remove_after_cursor_keeps_it() {
        let mut state = playing_at(&["a", "b", "c"], "b");

        assert_eq!(state.remove("c"), RemoveOutcome::Removed);
        assert_eq!(state.current_index, Some(1));
        assert!(state.is_current("b"));
    }

    #[test]
    fn remove_from_empty_queue_is_noop() {
        let mut state = PlayerState::default();
        assert_eq!(state.remove("a"), RemoveOutcome::NotFound);
        assert_eq!(state.current_index, None);
        assert!(state.queue.is_empty());
    }

    #[test]
    fn remove_only_song_empties_queue() {
        let mut state = playing_at(&["a"], "a");

        assert_eq!(state.remove("a"), RemoveOutcome::RemovedCurrent);
        assert!(state.queue.is_empty());
        assert_eq!(state.current_index, None);
        assert!(state.cursor_is_valid());
    }

    #[test]
    fn remove_unknown_id_changes_nothing() {
        let mut state = playing_at(&["a", "b"], "b");
        assert_eq!(state.remove("zzz"), RemoveOutcome::NotFound);
        assert_eq!(ids(&state), vec!["a", "b"]);
        assert_eq!(state.current_index, Some(1));
    }

    #[test]
    fn next_and_previous_stop_at_bounds() {
        let mut state = playing_at(&["a", "b"], "a");

        assert!(state.previous().is_none());
        assert_eq!(state.current_index, Some(0));

        assert_eq!(state.next().map(|s| s.id), Some("b".to_string()));
        assert!(state.next().is_none());
        assert_eq!(state.current_index, Some(1));
        assert!(state.is_current("b"));

        assert_eq!(state.previous().map(|s| s.id), Some("a".to_string()));
    }

    #[test]
    fn next_after_removing_current_starts_from_head() {
        let mut state = playing_at(&["a", "b", "c"], "b");
        state.remove("b");

        assert!(state.has_next());
        assert!(!state.has_previous());
        assert_eq!(state.next().map(|s| s.id), Some("a".to_string()));
        assert_eq!(state.current_index, Some(0));
    }

    #[test]
    fn add_skips_duplicates() {
        let mut state = playing_at(&["a"], "a");

        assert!(state.add(test_song("b", "Artist")));
        assert!(!state.add(test_song("a", "Artist")));
        assert_eq!(ids(&state), vec!["a", "b"]);
        assert_eq!(state.current_index, Some(0));
    }

    #[test]
    fn jump_to_ignores_out_of_range() {
        let mut state = playing_at(&["a", "b", "c"], "a");

        assert!(state.jump_to(3).is_none());
        assert_eq!(state.current_index, Some(0));

        assert_eq!(state.jump_to(2).map(|s| s.id), Some("c".to_string()));
        assert_eq!(state.current_index, Some(2));
    }

    #[test]
    fn progress_sync_only_while_playing() {
        let mut state = playing_at(&["a"], "a");
        state.set_duration(10_000);

        state.sync_progress(4_000, None);
        assert_eq!(state.position_ms, 4_000);

        state.set_playing(false);
        state.sync_progress(6_000, Some(12_000));
        assert_eq!(state.position_ms, 4_000);
        assert_eq!(state.duration_ms, 10_000);
    }

    #[test]
    fn seek_is_clamped_to_duration() {
        let mut state = playing_at(&["a"], "a");
        state.set_duration(5_000);

        assert_eq!(state.seek_target(9_000), 5_000);
        assert_eq!(state.position_ms, 0);

        assert_eq!(state.seek(9_000), 5_000);
        assert_eq!(state.progress_ratio(), 1.0);
        assert_eq!(state.seek(2_500), 2_500);
        assert_eq!(state.progress_ratio(), 0.5);
    }
}
