//! Playback control methods

use rand::seq::SliceRandom;

use crate::audio::MediaItem;
use crate::model::{RemoveOutcome, Song};

use super::AppController;

impl AppController {
    /// Replace the queue with `context` and start `song`
    pub async fn play_song(&self, song: Song, context: Vec<Song>) {
        let song = {
            let model = self.model.lock().await;
            model.play_song(song, context).await
        };
        tracing::info!(song_id = %song.id, song = %song.name, "Playing song");
        self.load_song(&song).await;
    }

    /// Hand `song` to the media player
    pub(crate) async fn load_song(&self, song: &Song) {
        match self.current_player().await {
            Some(player) => {
                self.model.lock().await.set_buffering(true).await;
                player.load(MediaItem {
                    id: song.id.clone(),
                    url: song.stream_url.clone(),
                    duration_hint_ms: song.duration_ms(),
                });
            }
            None => {
                tracing::warn!(song_id = %song.id, "No audio output, cannot load song");
                let model = self.model.lock().await;
                model.set_error("Audio output is not ready yet.".to_string()).await;
            }
        }
    }

    pub async fn toggle_playback(&self) {
        let (has_song, is_playing) = {
            let model = self.model.lock().await;
            (model.current_song().await.is_some(), model.is_playing().await)
        };
        tracing::debug!(has_song, is_playing, "Toggling playback");

        if !has_song {
            // Nothing current: start from the head of the queue, if any
            self.next_track().await;
            return;
        }

        let Some(player) = self.current_player().await else {
            return;
        };

        let model = self.model.lock().await;
        if is_playing {
            player.pause();
            model.set_playing(false).await;
        } else {
            player.play();
            if player.is_playing() {
                model.set_playing(true).await;
            }
        }
    }

    pub async fn next_track(&self) {
        let next = self.model.lock().await.next_song().await;
        match next {
            Some(song) => {
                tracing::info!(song_id = %song.id, "Skipped to next song");
                self.load_song(&song).await;
            }
            None => tracing::debug!("No next song"),
        }
    }

    pub async fn previous_track(&self) {
        let previous = self.model.lock().await.previous_song().await;
        match previous {
            Some(song) => {
                tracing::info!(song_id = %song.id, "Back to previous song");
                self.load_song(&song).await;
            }
            None => tracing::debug!("No previous song"),
        }
    }

    pub async fn play_queue_entry(&self, index: usize) {
        let song = self.model.lock().await.jump_to_queue_index(index).await;
        if let Some(song) = song {
            tracing::info!(index, song_id = %song.id, "Jumping to queue entry");
            self.load_song(&song).await;
        }
    }

    async fn seek_player(&self, target: Option<u64>) {
        let Some(position_ms) = target else {
            return;
        };
        let Some(player) = self.current_player().await else {
            return;
        };
        let model = self.model.lock().await;
        // Nothing is decoded yet, so there is nowhere to seek to
        if model.is_buffering().await {
            tracing::debug!(position_ms, "Seek ignored while buffering");
            return;
        }
        match player.seek(position_ms) {
            Ok(()) => {
                model.seek_to(position_ms).await;
            }
            Err(e) => {
                tracing::warn!(position_ms, error = %e, "Seek failed");
                model.set_error(Self::format_error(&e)).await;
            }
        }
    }

    pub async fn seek_relative(&self, forward: bool) {
        let target = {
            let model = self.model.lock().await;
            let step = model.seek_step_ms().await as i64;
            model.seek_offset(if forward { step } else { -step }).await
        };
        self.seek_player(target).await;
    }

    pub async fn seek_to_percent(&self, percent: u8) {
        let target = self.model.lock().await.seek_percent(percent).await;
        self.seek_player(target).await;
    }

    pub async fn volume_up(&self) {
        let volume = self.model.lock().await.volume_up().await;
        if let Some(player) = self.current_player().await {
            player.set_volume(volume);
        }
    }

    pub async fn volume_down(&self) {
        let volume = self.model.lock().await.volume_down().await;
        if let Some(player) = self.current_player().await {
            player.set_volume(volume);
        }
    }

    pub async fn add_selected_to_queue(&self) {
        let model = self.model.lock().await;
        let Some(song) = model.get_selected_song().await else {
            return;
        };
        if model.add_to_queue(song.clone()).await {
            tracing::info!(song_id = %song.id, "Added song to queue");
        } else {
            tracing::debug!(song_id = %song.id, "Song already queued");
        }
    }

    pub async fn remove_selected_from_queue(&self) {
        let outcome = {
            let model = self.model.lock().await;
            let Some(index) = model.get_selected_queue_index().await else {
                return;
            };
            let Some(song) = model.player_state().await.queue.get(index).cloned() else {
                return;
            };
            tracing::info!(index, song_id = %song.id, "Removing song from queue");
            model.remove_from_queue(&song.id).await
        };

        if outcome == RemoveOutcome::RemovedCurrent {
            if let Some(player) = self.current_player().await {
                player.stop();
            }
            self.model.lock().await.set_buffering(false).await;
        }
    }

    pub async fn clear_queue(&self) {
        self.model.lock().await.clear_queue().await;
        if let Some(player) = self.current_player().await {
            player.stop();
        }
        tracing::info!("Queue cleared");
    }

    /// Play every song on the visible artist page, optionally shuffled
    pub async fn play_artist(&self, shuffle: bool) {
        let songs = self.model.lock().await.visible_artist_songs().await;
        let Some(mut songs) = songs else {
            return;
        };
        if songs.is_empty() {
            let model = self.model.lock().await;
            model.set_error("No playable songs for this artist.".to_string()).await;
            return;
        }
        if shuffle {
            songs.shuffle(&mut rand::rng());
        }
        let first = songs[0].clone();
        self.play_song(first, songs).await;
    }

    /// Called when the player ran out of audio for `media_id`
    pub(crate) async fn handle_end_of_track(&self, media_id: &str) {
        let next = {
            let model = self.model.lock().await;
            if !model.is_current_song(media_id).await {
                return;
            }
            let next = model.next_song().await;
            if next.is_none() {
                model.finish_playback().await;
            }
            next
        };

        match next {
            Some(song) => {
                tracing::info!(finished = media_id, next = %song.id, "Advancing to next song");
                self.load_song(&song).await;
            }
            None => tracing::info!(finished = media_id, "Reached the end of the queue"),
        }
    }
}
