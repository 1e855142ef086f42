//! Navigation-related controller methods (discover, search, artists, albums, playlists)

use crate::model::{
    ActiveSection, SelectedItem, LIBRARY_DISCOVER, LIBRARY_NOW_PLAYING, LIBRARY_QUEUE,
};
use super::AppController;

impl AppController {
    async fn report_load_error(&self, error: anyhow::Error) {
        let model = self.model.lock().await;
        model.set_content_loading(false).await;
        model.set_error(Self::format_error(&error)).await;
    }

    async fn focus_main_content(&self) {
        let model = self.model.lock().await;
        model.set_active_section(ActiveSection::MainContent).await;
    }

    /// Fill the discover page with a few popular songs
    pub async fn load_featured(&self) {
        let Some(catalog) = self.catalog().await else {
            return;
        };
        self.model.lock().await.set_content_loading(true).await;

        match catalog.featured_songs().await {
            Ok(songs) => {
                tracing::info!(count = songs.len(), "Featured songs loaded");
                self.model.lock().await.set_featured(songs).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load featured songs");
                self.report_load_error(e.into()).await;
            }
        }
    }

    pub async fn perform_search(&self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }
        tracing::debug!(query, "Performing search");
        let Some(catalog) = self.catalog().await else {
            return;
        };
        self.model.lock().await.set_content_loading(true).await;

        match catalog.search(query).await {
            Ok(results) => {
                tracing::info!(
                    query,
                    songs = results.songs.len(),
                    artists = results.artists.len(),
                    albums = results.albums.len(),
                    playlists = results.playlists.len(),
                    "Search completed successfully"
                );
                self.model.lock().await.set_search_results(results).await;
                self.focus_main_content().await;
            }
            Err(e) => {
                tracing::error!(query, error = %e, "Search failed");
                self.report_load_error(e.into()).await;
            }
        }
    }

    pub async fn open_library_item(&self, index: usize) {
        match index {
            LIBRARY_DISCOVER => self.load_featured().await,
            LIBRARY_NOW_PLAYING => self.model.lock().await.show_now_playing().await,
            LIBRARY_QUEUE => self.model.lock().await.show_queue().await,
            _ => return,
        }
        self.focus_main_content().await;
    }

    /// Open an artist page by id, or assemble one from a name search
    pub async fn open_artist(&self, id: Option<String>, name: &str) {
        let Some(catalog) = self.catalog().await else {
            return;
        };
        self.model.lock().await.set_content_loading(true).await;

        let result = match id.as_deref() {
            Some(artist_id) => match catalog.get_artist(artist_id).await {
                Ok(detail) => Ok(detail),
                Err(e) => {
                    tracing::warn!(artist_id, error = %e, "Artist lookup failed, searching by name");
                    catalog.artist_by_name(name).await
                }
            },
            None => catalog.artist_by_name(name).await,
        };

        match result {
            Ok(detail) => {
                tracing::info!(artist = %detail.name, songs = detail.songs.len(), "Artist opened");
                self.model.lock().await.set_artist_detail(detail).await;
            }
            Err(e) => self.report_load_error(e.into()).await,
        }
    }

    pub async fn open_album(&self, album_id: &str) {
        let Some(catalog) = self.catalog().await else {
            return;
        };
        self.model.lock().await.set_content_loading(true).await;

        match catalog.get_album(album_id).await {
            Ok(detail) => self.model.lock().await.set_album_detail(detail).await,
            Err(e) => self.report_load_error(e.into()).await,
        }
    }

    pub async fn open_playlist(&self, playlist_id: &str) {
        let Some(catalog) = self.catalog().await else {
            return;
        };
        self.model.lock().await.set_content_loading(true).await;

        match catalog.get_playlist(playlist_id).await {
            Ok(detail) => self.model.lock().await.set_playlist_detail(detail).await,
            Err(e) => self.report_load_error(e.into()).await,
        }
    }

    /// Look a song up and play it on its own
    pub async fn play_song_by_id(&self, song_id: &str) {
        let Some(catalog) = self.catalog().await else {
            return;
        };
        match catalog.get_song(song_id).await {
            Ok(Some(song)) => self.play_song(song, Vec::new()).await,
            Ok(None) => {
                let model = self.model.lock().await;
                model.set_error(format!("Song {} has no playable stream.", song_id)).await;
            }
            Err(e) => self.report_load_error(e.into()).await,
        }
    }

    pub async fn handle_selected_item(&self, item: SelectedItem) {
        match item {
            SelectedItem::Song { song, context } => self.play_song(song, context).await,
            SelectedItem::Artist { id, name } => self.open_artist(id, &name).await,
            SelectedItem::Album { id } => self.open_album(&id).await,
            SelectedItem::Playlist { id } => self.open_playlist(&id).await,
            SelectedItem::QueueEntry { index } => self.play_queue_entry(index).await,
        }
    }
}
