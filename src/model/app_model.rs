//! Main application model with state management
//!
//! Lock order: `player_state` before `content_state` whenever both are held.

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

use super::types::{
    ActiveSection, ArtistDetailSection, SearchTab, SelectedItem, UiState,
};
use super::playback::{PlaybackInfo, PlaybackSettings};
use super::content::{
    AlbumDetail, ArtistDetail, ContentState, ContentView, PlaylistDetail, SearchResults, Song,
};
use super::queue::{PlayerState, RemoveOutcome};
use super::saavn_client::SaavnClient;

/// Main application model containing all state
pub struct AppModel {
    pub catalog: Option<SaavnClient>,
    player_state: Arc<Mutex<PlayerState>>,
    playback_settings: Arc<Mutex<PlaybackSettings>>,
    buffering: Arc<Mutex<bool>>,
    pub ui_state: Arc<Mutex<UiState>>,
    pub content_state: Arc<Mutex<ContentState>>,
    pub should_quit: Arc<Mutex<bool>>,
}

fn push_view(state: &mut ContentState, view: ContentView) {
    if !matches!(state.view, ContentView::Empty) {
        let previous_view = std::mem::take(&mut state.view);
        state.navigation_stack.push(previous_view);
    }
    state.view = view;
    state.is_loading = false;
}

impl AppModel {
    pub fn new() -> Self {
        Self {
            catalog: None,
            player_state: Arc::new(Mutex::new(PlayerState::default())),
            playback_settings: Arc::new(Mutex::new(PlaybackSettings::default())),
            buffering: Arc::new(Mutex::new(false)),
            ui_state: Arc::new(Mutex::new(UiState::default())),
            content_state: Arc::new(Mutex::new(ContentState::default())),
            should_quit: Arc::new(Mutex::new(false)),
        }
    }

    pub fn set_catalog(&mut self, client: SaavnClient) {
        self.catalog = Some(client);
    }

    pub async fn get_catalog(&self) -> Option<SaavnClient> {
        self.catalog.clone()
    }

    // ========================================================================
    // Queue & Playback State
    // ========================================================================

    pub async fn play_song(&self, song: Song, queue: Vec<Song>) -> Song {
        self.player_state.lock().await.play_song(song, queue)
    }

    pub async fn next_song(&self) -> Option<Song> {
        self.player_state.lock().await.next()
    }

    pub async fn previous_song(&self) -> Option<Song> {
        self.player_state.lock().await.previous()
    }

    pub async fn jump_to_queue_index(&self, index: usize) -> Option<Song> {
        self.player_state.lock().await.jump_to(index)
    }

    pub async fn add_to_queue(&self, song: Song) -> bool {
        self.player_state.lock().await.add(song)
    }

    pub async fn remove_from_queue(&self, song_id: &str) -> RemoveOutcome {
        let mut player = self.player_state.lock().await;
        let outcome = player.remove(song_id);
        let queue_len = player.queue.len();
        drop(player);

        if outcome != RemoveOutcome::NotFound {
            self.clamp_queue_selection(queue_len).await;
        }
        outcome
    }

    pub async fn clear_queue(&self) {
        self.player_state.lock().await.clear();
    }

    pub async fn player_state(&self) -> PlayerState {
        self.player_state.lock().await.clone()
    }

    pub async fn current_song(&self) -> Option<Song> {
        self.player_state.lock().await.current_song.clone()
    }

    pub async fn is_current_song(&self, song_id: &str) -> bool {
        self.player_state.lock().await.is_current(song_id)
    }

    pub async fn is_playing(&self) -> bool {
        self.player_state.lock().await.is_playing
    }

    pub async fn set_playing(&self, is_playing: bool) {
        self.player_state.lock().await.set_playing(is_playing);
    }

    pub async fn set_duration(&self, duration_ms: u64) {
        self.player_state.lock().await.set_duration(duration_ms);
    }

    pub async fn set_position(&self, position_ms: u64) {
        self.player_state.lock().await.set_position(position_ms);
    }

    pub async fn sync_progress(&self, position_ms: u64, duration_ms: Option<u64>) {
        self.player_state.lock().await.sync_progress(position_ms, duration_ms);
    }

    /// Seek target `delta_ms` away from the current position
    pub async fn seek_offset(&self, delta_ms: i64) -> Option<u64> {
        let player = self.player_state.lock().await;
        player.current_song.as_ref()?;
        let target = player.position_ms.saturating_add_signed(delta_ms);
        Some(player.seek_target(target))
    }

    /// Seek target at `percent` of the known duration
    pub async fn seek_percent(&self, percent: u8) -> Option<u64> {
        let player = self.player_state.lock().await;
        if player.current_song.is_none() || player.duration_ms == 0 {
            return None;
        }
        let target = player.duration_ms * percent.min(100) as u64 / 100;
        Some(player.seek_target(target))
    }

    /// Move the position after the player accepted a seek
    pub async fn seek_to(&self, position_ms: u64) -> u64 {
        self.player_state.lock().await.seek(position_ms)
    }

    /// Stop without touching the queue (end of the last track)
    pub async fn finish_playback(&self) {
        let mut player = self.player_state.lock().await;
        player.set_playing(false);
        let duration_ms = player.duration_ms;
        player.set_position(duration_ms);
    }

    pub async fn set_buffering(&self, buffering: bool) {
        *self.buffering.lock().await = buffering;
    }

    pub async fn is_buffering(&self) -> bool {
        *self.buffering.lock().await
    }

    pub async fn get_playback_info(&self) -> PlaybackInfo {
        let player = self.player_state.lock().await;
        let settings = self.playback_settings.lock().await.clone();
        let buffering = *self.buffering.lock().await;
        PlaybackInfo::from_state(&player, settings, buffering)
    }

    pub async fn get_volume(&self) -> u8 {
        self.playback_settings.lock().await.volume
    }

    pub async fn set_volume(&self, volume: u8) {
        self.playback_settings.lock().await.volume = volume.min(100);
    }

    pub async fn volume_up(&self) -> u8 {
        self.playback_settings.lock().await.volume_up()
    }

    pub async fn volume_down(&self) -> u8 {
        self.playback_settings.lock().await.volume_down()
    }

    pub async fn seek_step_ms(&self) -> u64 {
        self.playback_settings.lock().await.seek_step_ms
    }

    pub async fn set_seek_step_ms(&self, step_ms: u64) {
        self.playback_settings.lock().await.seek_step_ms = step_ms;
    }

    // ========================================================================
    // UI State
    // ========================================================================

    pub async fn should_quit(&self) -> bool {
        *self.should_quit.lock().await
    }

    pub async fn set_should_quit(&self, quit: bool) {
        *self.should_quit.lock().await = quit;
    }

    pub async fn get_ui_state(&self) -> UiState {
        self.ui_state.lock().await.clone()
    }

    pub async fn cycle_section_forward(&self) {
        let mut state = self.ui_state.lock().await;
        state.active_section = state.active_section.next();
    }

    pub async fn cycle_section_backward(&self) {
        let mut state = self.ui_state.lock().await;
        state.active_section = state.active_section.prev();
    }

    pub async fn set_active_section(&self, section: ActiveSection) {
        let mut state = self.ui_state.lock().await;
        state.active_section = section;
    }

    pub async fn move_selection_up(&self) {
        let mut state = self.ui_state.lock().await;
        if state.active_section == ActiveSection::Library && state.library_selected > 0 {
            state.library_selected -= 1;
        }
    }

    pub async fn move_selection_down(&self) {
        let mut state = self.ui_state.lock().await;
        if state.active_section == ActiveSection::Library
            && state.library_selected < state.library_items.len().saturating_sub(1)
        {
            state.library_selected += 1;
        }
    }

    pub async fn append_to_search(&self, c: char) {
        let mut state = self.ui_state.lock().await;
        state.search_query.push(c);
    }

    pub async fn backspace_search(&self) {
        let mut state = self.ui_state.lock().await;
        state.search_query.pop();
    }

    pub async fn take_search_query(&self) -> String {
        let mut state = self.ui_state.lock().await;
        std::mem::take(&mut state.search_query)
    }

    pub async fn set_error(&self, message: String) {
        tracing::warn!(message = %message, "Showing error");
        let mut state = self.ui_state.lock().await;
        state.error_message = Some(message);
        state.error_timestamp = Some(Instant::now());
    }

    pub async fn clear_error(&self) {
        let mut state = self.ui_state.lock().await;
        state.error_message = None;
        state.error_timestamp = None;
    }

    pub async fn has_error(&self) -> bool {
        self.ui_state.lock().await.error_message.is_some()
    }

    pub async fn auto_clear_old_errors(&self) {
        let mut state = self.ui_state.lock().await;
        if let Some(timestamp) = state.error_timestamp {
            if timestamp.elapsed().as_secs() > 5 {
                state.error_message = None;
                state.error_timestamp = None;
            }
        }
    }

    pub async fn show_help_popup(&self) {
        let mut state = self.ui_state.lock().await;
        state.show_help_popup = true;
    }

    pub async fn hide_help_popup(&self) {
        let mut state = self.ui_state.lock().await;
        state.show_help_popup = false;
    }

    pub async fn is_help_popup_open(&self) -> bool {
        self.ui_state.lock().await.show_help_popup
    }

    // ========================================================================
    // Content Views
    // ========================================================================

    pub async fn get_content_state(&self) -> ContentState {
        self.content_state.lock().await.clone()
    }

    pub async fn set_featured(&self, songs: Vec<Song>) {
        let mut state = self.content_state.lock().await;
        state.navigation_stack.clear();
        state.view = ContentView::Featured {
            songs,
            selected_index: 0,
        };
        state.is_loading = false;
    }

    pub async fn set_search_results(&self, results: SearchResults) {
        let mut state = self.content_state.lock().await;

        // A new search starts a new history
        state.navigation_stack.clear();
        let initial_tab = results.best_match;
        state.view = ContentView::SearchResults {
            results,
            tab: initial_tab,
            song_index: 0,
            artist_index: 0,
            album_index: 0,
            playlist_index: 0,
        };
        state.is_loading = false;
    }

    pub async fn set_album_detail(&self, detail: AlbumDetail) {
        let mut state = self.content_state.lock().await;
        push_view(&mut state, ContentView::AlbumDetail {
            detail,
            selected_index: 0,
        });
    }

    pub async fn set_playlist_detail(&self, detail: PlaylistDetail) {
        let mut state = self.content_state.lock().await;
        push_view(&mut state, ContentView::PlaylistDetail {
            detail,
            selected_index: 0,
        });
    }

    pub async fn set_artist_detail(&self, detail: ArtistDetail) {
        let mut state = self.content_state.lock().await;
        push_view(&mut state, ContentView::ArtistDetail {
            detail,
            section: ArtistDetailSection::Songs,
            song_index: 0,
            album_index: 0,
        });
    }

    /// Show the queue, selecting the current song when there is one
    pub async fn show_queue(&self) {
        let current_index = self.player_state.lock().await.current_index;
        let mut state = self.content_state.lock().await;
        if matches!(state.view, ContentView::Queue { .. }) {
            return;
        }
        push_view(&mut state, ContentView::Queue {
            selected_index: current_index.unwrap_or(0),
        });
    }

    pub async fn show_now_playing(&self) {
        let mut state = self.content_state.lock().await;
        if matches!(state.view, ContentView::NowPlaying) {
            return;
        }
        push_view(&mut state, ContentView::NowPlaying);
    }

    pub async fn is_queue_view_visible(&self) -> bool {
        matches!(self.content_state.lock().await.view, ContentView::Queue { .. })
    }

    pub async fn is_now_playing_visible(&self) -> bool {
        matches!(self.content_state.lock().await.view, ContentView::NowPlaying)
    }

    async fn clamp_queue_selection(&self, queue_len: usize) {
        let mut state = self.content_state.lock().await;
        if let ContentView::Queue { selected_index } = &mut state.view {
            *selected_index = (*selected_index).min(queue_len.saturating_sub(1));
        }
    }

    pub async fn set_content_loading(&self, loading: bool) {
        let mut state = self.content_state.lock().await;
        state.is_loading = loading;
    }

    pub async fn navigate_back(&self) -> bool {
        let mut state = self.content_state.lock().await;
        if let Some(previous_view) = state.navigation_stack.pop() {
            state.view = previous_view;
            true
        } else {
            state.view = ContentView::Empty;
            false
        }
    }

    pub async fn navigate_tab(&self, forward: bool) {
        let mut state = self.content_state.lock().await;
        match &mut state.view {
            ContentView::SearchResults { tab, .. } => {
                *tab = if forward { tab.next() } else { tab.prev() };
            }
            ContentView::ArtistDetail { section, .. } => {
                // Two sections, so both directions toggle
                *section = section.next();
            }
            _ => {}
        }
    }

    pub async fn content_move_up(&self) {
        let mut state = self.content_state.lock().await;
        let index = match &mut state.view {
            ContentView::SearchResults {
                tab,
                song_index,
                artist_index,
                album_index,
                playlist_index,
                ..
            } => match tab {
                SearchTab::Songs => song_index,
                SearchTab::Artists => artist_index,
                SearchTab::Albums => album_index,
                SearchTab::Playlists => playlist_index,
            },
            ContentView::ArtistDetail {
                section,
                song_index,
                album_index,
                ..
            } => match section {
                ArtistDetailSection::Songs => song_index,
                ArtistDetailSection::Albums => album_index,
            },
            ContentView::Featured { selected_index, .. }
            | ContentView::AlbumDetail { selected_index, .. }
            | ContentView::PlaylistDetail { selected_index, .. }
            | ContentView::Queue { selected_index } => selected_index,
            ContentView::NowPlaying | ContentView::Empty => return,
        };
        *index = index.saturating_sub(1);
    }

    pub async fn content_move_down(&self) {
        let queue_len = self.player_state.lock().await.queue.len();
        let mut state = self.content_state.lock().await;
        let (index, len) = match &mut state.view {
            ContentView::SearchResults {
                results,
                tab,
                song_index,
                artist_index,
                album_index,
                playlist_index,
            } => match tab {
                SearchTab::Songs => (song_index, results.songs.len()),
                SearchTab::Artists => (artist_index, results.artists.len()),
                SearchTab::Albums => (album_index, results.albums.len()),
                SearchTab::Playlists => (playlist_index, results.playlists.len()),
            },
            ContentView::ArtistDetail {
                detail,
                section,
                song_index,
                album_index,
            } => match section {
                ArtistDetailSection::Songs => (song_index, detail.songs.len()),
                ArtistDetailSection::Albums => (album_index, detail.albums.len()),
            },
            ContentView::Featured { songs, selected_index } => (selected_index, songs.len()),
            ContentView::AlbumDetail { detail, selected_index } => {
                (selected_index, detail.songs.len())
            }
            ContentView::PlaylistDetail { detail, selected_index } => {
                (selected_index, detail.songs.len())
            }
            ContentView::Queue { selected_index } => (selected_index, queue_len),
            ContentView::NowPlaying | ContentView::Empty => return,
        };
        if *index < len.saturating_sub(1) {
            *index += 1;
        }
    }

    pub async fn get_selected_content_item(&self) -> Option<SelectedItem> {
        let state = self.content_state.lock().await;
        let song_in = |songs: &[Song], index: usize| {
            songs.get(index).map(|song| SelectedItem::Song {
                song: song.clone(),
                context: songs.to_vec(),
            })
        };

        match &state.view {
            ContentView::SearchResults {
                results,
                tab,
                song_index,
                artist_index,
                album_index,
                playlist_index,
            } => match tab {
                SearchTab::Songs => song_in(&results.songs, *song_index),
                SearchTab::Artists => results.artists.get(*artist_index).map(|a| {
                    SelectedItem::Artist { id: a.id.clone(), name: a.name.clone() }
                }),
                SearchTab::Albums => results.albums.get(*album_index).map(|a| {
                    SelectedItem::Album { id: a.id.clone() }
                }),
                SearchTab::Playlists => results.playlists.get(*playlist_index).map(|p| {
                    SelectedItem::Playlist { id: p.id.clone() }
                }),
            },
            ContentView::Featured { songs, selected_index } => song_in(songs, *selected_index),
            ContentView::AlbumDetail { detail, selected_index } => {
                song_in(&detail.songs, *selected_index)
            }
            ContentView::PlaylistDetail { detail, selected_index } => {
                song_in(&detail.songs, *selected_index)
            }
            ContentView::ArtistDetail {
                detail,
                section,
                song_index,
                album_index,
            } => match section {
                ArtistDetailSection::Songs => song_in(&detail.songs, *song_index),
                ArtistDetailSection::Albums => detail.albums.get(*album_index).map(|a| {
                    SelectedItem::Album { id: a.id.clone() }
                }),
            },
            ContentView::Queue { selected_index } => {
                Some(SelectedItem::QueueEntry { index: *selected_index })
            }
            ContentView::NowPlaying | ContentView::Empty => None,
        }
    }

    /// The song under the cursor, wherever it is listed
    pub async fn get_selected_song(&self) -> Option<Song> {
        match self.get_selected_content_item().await? {
            SelectedItem::Song { song, .. } => Some(song),
            SelectedItem::QueueEntry { index } => {
                self.player_state.lock().await.queue.get(index).cloned()
            }
            _ => None,
        }
    }

    pub async fn get_selected_queue_index(&self) -> Option<usize> {
        let state = self.content_state.lock().await;
        if let ContentView::Queue { selected_index } = &state.view {
            Some(*selected_index)
        } else {
            None
        }
    }

    /// Songs of the artist page currently shown
    pub async fn visible_artist_songs(&self) -> Option<Vec<Song>> {
        let state = self.content_state.lock().await;
        if let ContentView::ArtistDetail { detail, .. } = &state.view {
            Some(detail.songs.clone())
        } else {
            None
        }
    }
}

impl Default for AppModel {
    fn default() -> Self {
        Self::new()
    }
}
