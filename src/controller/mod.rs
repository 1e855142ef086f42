//! Controller module - Application logic and event handling
//!
//! This module contains the application controller that handles user input,
//! coordinates between the model and view, and drives the media player.
//! It is organized into submodules by responsibility:
//!
//! - `input`: Key event handling
//! - `playback`: Queue and transport commands
//! - `navigation`: Discover/search/artist/album/playlist navigation
//! - `player_events`: Media player event listener and progress loop

mod input;
mod playback;
mod navigation;
mod player_events;

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::audio::MediaPlayer;
use crate::model::{AppModel, CatalogError, SaavnClient};

/// Slot for the media player; empty until the audio device is open
pub type SharedPlayer = Arc<Mutex<Option<Arc<dyn MediaPlayer>>>>;

#[derive(Clone)]
pub struct AppController {
    pub(crate) model: Arc<Mutex<AppModel>>,
    pub(crate) player: SharedPlayer,
    event_listener_started: Arc<Mutex<bool>>,
    progress_task: Arc<Mutex<Option<JoinHandle<()>>>>,
    progress_poll: Duration,
}

impl AppController {
    pub fn new(model: Arc<Mutex<AppModel>>, player: SharedPlayer, progress_poll: Duration) -> Self {
        Self {
            model,
            player,
            event_listener_started: Arc::new(Mutex::new(false)),
            progress_task: Arc::new(Mutex::new(None)),
            progress_poll,
        }
    }

    /// Install a ready media player and start listening to it
    pub async fn attach_player(&self, player: Arc<dyn MediaPlayer>) {
        let volume = self.model.lock().await.get_volume().await;
        player.set_volume(volume);
        *self.player.lock().await = Some(player);
        self.try_start_event_listener().await;
    }

    pub(crate) async fn current_player(&self) -> Option<Arc<dyn MediaPlayer>> {
        self.player.lock().await.clone()
    }

    /// Try to start the player event listener if the player is ready and not already started
    pub(crate) async fn try_start_event_listener(&self) {
        let mut started = self.event_listener_started.lock().await;
        if *started {
            return;
        }

        if let Some(player) = self.current_player().await {
            if let Some(event_channel) = player.subscribe() {
                *started = true;
                drop(started);
                self.start_player_event_listener(event_channel);
            }
        }
    }

    pub(crate) async fn catalog(&self) -> Option<SaavnClient> {
        let model = self.model.lock().await;
        let catalog = model.get_catalog().await;
        if catalog.is_none() {
            model.set_error("Catalog is not configured.".to_string()).await;
        }
        catalog
    }

    /// Stop background work and silence the player
    pub async fn shutdown(&self) {
        self.model.lock().await.set_should_quit(true).await;
        if let Some(task) = self.progress_task.lock().await.take() {
            task.abort();
        }
        if let Some(player) = self.current_player().await {
            player.stop();
        }
        tracing::info!("Controller shut down");
    }

    pub(crate) fn format_error(error: &anyhow::Error) -> String {
        if let Some(catalog_error) = error.downcast_ref::<CatalogError>() {
            return match catalog_error {
                CatalogError::Http(e) if e.is_timeout() => {
                    "The catalog took too long to answer. Try again.".to_string()
                }
                CatalogError::Http(e) if e.is_connect() => {
                    "Cannot reach the catalog. Check your connection or --api-url.".to_string()
                }
                CatalogError::Http(e) => match e.status().map(|s| s.as_u16()) {
                    Some(404) => "Not found in the catalog.".to_string(),
                    Some(429) => "Rate limited. Please wait a moment.".to_string(),
                    _ => format!("Error: {}", e),
                },
                CatalogError::Unsuccessful(_) => {
                    "The catalog could not answer that request.".to_string()
                }
                other => format!("Error: {}", other),
            };
        }
        format!("Error: {}", error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{MediaItem, PlayerEvent, PlayerEventChannel};
    use crate::model::{ContentView, Song, test_song};
    use std::sync::Mutex as StdMutex;

    /// Records every call instead of making sound
    #[derive(Default)]
    struct FakePlayer {
        calls: StdMutex<Vec<String>>,
        finished: StdMutex<Option<String>>,
        position_ms: StdMutex<u64>,
        fail_seek: StdMutex<bool>,
    }

    impl FakePlayer {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn finish(&self, media_id: &str) {
            *self.finished.lock().unwrap() = Some(media_id.to_string());
        }
    }

    impl MediaPlayer for FakePlayer {
        fn load(&self, media: MediaItem) {
            self.record(format!("load:{}", media.id));
        }
        fn play(&self) {
            self.record("play".to_string());
        }
        fn pause(&self) {
            self.record("pause".to_string());
        }
        fn stop(&self) {
            self.record("stop".to_string());
        }
        fn seek(&self, position_ms: u64) -> anyhow::Result<()> {
            self.record(format!("seek:{}", position_ms));
            if *self.fail_seek.lock().unwrap() {
                anyhow::bail!("Nothing is loaded");
            }
            Ok(())
        }
        fn set_volume(&self, volume: u8) {
            self.record(format!("volume:{}", volume));
        }
        fn is_playing(&self) -> bool {
            false
        }
        fn position_ms(&self) -> u64 {
            *self.position_ms.lock().unwrap()
        }
        fn take_end_of_track(&self) -> Option<String> {
            self.finished.lock().unwrap().take()
        }
        fn subscribe(&self) -> Option<PlayerEventChannel> {
            None
        }
    }

    async fn setup() -> (AppController, Arc<FakePlayer>) {
        let model = Arc::new(Mutex::new(AppModel::new()));
        let controller = AppController::new(model, Arc::new(Mutex::new(None)), Duration::from_millis(50));
        let player = Arc::new(FakePlayer::default());
        controller.attach_player(player.clone()).await;
        (controller, player)
    }

    fn songs(ids: &[&str]) -> Vec<Song> {
        ids.iter().map(|id| test_song(id, "Artist")).collect()
    }

    async fn ready(controller: &AppController, id: &str) {
        controller
            .apply_player_event(PlayerEvent::Ready { media_id: id.to_string(), duration_ms: 200_000 })
            .await;
        controller
            .apply_player_event(PlayerEvent::Playing { media_id: id.to_string() })
            .await;
    }

    #[tokio::test]
    async fn playing_a_song_loads_it() {
        let (controller, player) = setup().await;
        let queue = songs(&["a", "b"]);
        controller.play_song(queue[1].clone(), queue).await;

        assert_eq!(player.calls(), vec!["volume:100", "load:b"]);
        let state = controller.model.lock().await.player_state().await;
        assert_eq!(state.current_index, Some(1));
    }

    #[tokio::test]
    async fn stale_events_are_ignored() {
        let (controller, _player) = setup().await;
        let queue = songs(&["a", "b"]);
        controller.play_song(queue[0].clone(), queue.clone()).await;
        controller.play_song(queue[1].clone(), queue).await;

        controller
            .apply_player_event(PlayerEvent::Ready { media_id: "a".to_string(), duration_ms: 1_000 })
            .await;
        controller
            .apply_player_event(PlayerEvent::Playing { media_id: "a".to_string() })
            .await;
        let state = controller.model.lock().await.player_state().await;
        assert_eq!(state.duration_ms, 0);
        assert!(!state.is_playing);

        ready(&controller, "b").await;
        let state = controller.model.lock().await.player_state().await;
        assert_eq!(state.duration_ms, 200_000);
        assert!(state.is_playing);
    }

    #[tokio::test]
    async fn removing_the_current_song_stops_the_player() {
        let (controller, player) = setup().await;
        let queue = songs(&["a", "b", "c"]);
        controller.play_song(queue[1].clone(), queue).await;
        ready(&controller, "b").await;

        {
            let model = controller.model.lock().await;
            model.show_queue().await;
        }
        controller.remove_selected_from_queue().await;

        assert_eq!(player.calls().last().map(String::as_str), Some("stop"));
        let state = controller.model.lock().await.player_state().await;
        assert!(state.current_song.is_none());
        assert_eq!(state.current_index, None);
        assert_eq!(state.queue.len(), 2);
    }

    #[tokio::test]
    async fn removing_another_song_keeps_playing() {
        let (controller, player) = setup().await;
        let queue = songs(&["a", "b", "c"]);
        controller.play_song(queue[2].clone(), queue).await;
        {
            let model = controller.model.lock().await;
            model.show_queue().await;
            model.content_move_up().await;
            model.content_move_up().await;
        }
        controller.remove_selected_from_queue().await;

        assert!(!player.calls().contains(&"stop".to_string()));
        let state = controller.model.lock().await.player_state().await;
        assert_eq!(state.current_index, Some(1));
    }

    #[tokio::test]
    async fn end_of_track_advances_then_stops_at_the_end() {
        let (controller, player) = setup().await;
        let queue = songs(&["a", "b"]);
        controller.play_song(queue[0].clone(), queue).await;
        ready(&controller, "a").await;

        player.finish("a");
        controller.progress_tick().await;
        assert_eq!(player.calls().last().map(String::as_str), Some("load:b"));

        ready(&controller, "b").await;
        player.finish("b");
        controller.progress_tick().await;

        let state = controller.model.lock().await.player_state().await;
        assert!(!state.is_playing);
        assert_eq!(state.current_index, Some(1));
        assert_eq!(state.position_ms, state.duration_ms);
    }

    #[tokio::test]
    async fn progress_follows_the_player_while_playing() {
        let (controller, player) = setup().await;
        controller.play_song(test_song("a", "Artist"), Vec::new()).await;
        ready(&controller, "a").await;

        *player.position_ms.lock().unwrap() = 42_000;
        controller.progress_tick().await;
        assert_eq!(controller.model.lock().await.player_state().await.position_ms, 42_000);

        controller
            .apply_player_event(PlayerEvent::Paused { media_id: "a".to_string() })
            .await;
        *player.position_ms.lock().unwrap() = 50_000;
        controller.progress_tick().await;
        assert_eq!(controller.model.lock().await.player_state().await.position_ms, 42_000);
    }

    #[tokio::test]
    async fn accepted_seek_moves_the_position() {
        let (controller, player) = setup().await;
        controller.play_song(test_song("a", "Artist"), Vec::new()).await;
        ready(&controller, "a").await;

        controller.seek_to_percent(50).await;
        assert!(player.calls().contains(&"seek:100000".to_string()));
        assert_eq!(controller.model.lock().await.player_state().await.position_ms, 100_000);

        controller.seek_relative(true).await;
        assert_eq!(controller.model.lock().await.player_state().await.position_ms, 110_000);
    }

    #[tokio::test]
    async fn rejected_seek_keeps_the_position() {
        let (controller, player) = setup().await;
        controller.play_song(test_song("a", "Artist"), Vec::new()).await;
        ready(&controller, "a").await;
        *player.fail_seek.lock().unwrap() = true;

        controller.seek_relative(true).await;
        controller.seek_to_percent(90).await;

        assert_eq!(player.calls().iter().filter(|c| c.starts_with("seek:")).count(), 2);
        let model = controller.model.lock().await;
        assert_eq!(model.player_state().await.position_ms, 0);
        assert!(model.has_error().await);
    }

    #[tokio::test]
    async fn seeking_while_buffering_does_nothing() {
        let (controller, player) = setup().await;
        controller.play_song(test_song("a", "Artist"), Vec::new()).await;

        // No Ready yet, and the duration is unknown
        controller.seek_relative(true).await;
        controller.seek_relative(true).await;

        assert!(!player.calls().iter().any(|c| c.starts_with("seek:")));
        let model = controller.model.lock().await;
        assert_eq!(model.player_state().await.position_ms, 0);
        assert!(!model.has_error().await);
    }

    #[tokio::test]
    async fn load_failure_is_reported() {
        let (controller, _player) = setup().await;
        controller.play_song(test_song("a", "Artist"), Vec::new()).await;
        controller
            .apply_player_event(PlayerEvent::LoadFailed {
                media_id: "a".to_string(),
                error: "404".to_string(),
            })
            .await;

        let model = controller.model.lock().await;
        assert!(model.has_error().await);
        assert!(!model.get_playback_info().await.is_buffering);
    }

    #[tokio::test]
    async fn shuffle_play_covers_the_whole_artist_page() {
        let (controller, player) = setup().await;
        {
            let model = controller.model.lock().await;
            model
                .set_artist_detail(crate::model::ArtistDetail {
                    id: None,
                    name: "Artist".to_string(),
                    songs: songs(&["1", "2", "3"]),
                    albums: Vec::new(),
                })
                .await;
        }
        controller.play_artist(true).await;

        let state = controller.model.lock().await.player_state().await;
        assert_eq!(state.queue.len(), 3);
        assert_eq!(state.current_index, Some(0));
        assert!(player.calls().iter().any(|c| c.starts_with("load:")));
        assert!(matches!(
            controller.model.lock().await.get_content_state().await.view,
            ContentView::ArtistDetail { .. }
        ));
    }

    #[test]
    fn unsuccessful_catalog_reply_has_a_friendly_message() {
        let error = anyhow::Error::from(CatalogError::Unsuccessful("songs".to_string()));
        assert_eq!(
            AppController::format_error(&error),
            "The catalog could not answer that request."
        );
    }
}
