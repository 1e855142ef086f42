//! Media player event listener and progress loop

use crate::audio::{PlayerEvent, PlayerEventChannel};
use super::AppController;

impl AppController {
    pub fn start_player_event_listener(&self, mut event_channel: PlayerEventChannel) {
        let controller = self.clone();
        tracing::info!("Starting player event listener");

        tokio::spawn(async move {
            while let Some(event) = event_channel.recv().await {
                if controller.model.lock().await.should_quit().await {
                    tracing::debug!("Player event listener shutting down");
                    break;
                }
                controller.apply_player_event(event).await;
            }
        });
    }

    /// Mirror one player event into the queue state. Events for a song that is
    /// no longer current are dropped.
    pub(crate) async fn apply_player_event(&self, event: PlayerEvent) {
        let model = self.model.lock().await;

        let media_id = match &event {
            PlayerEvent::Stopped => {
                tracing::debug!("PlayerEvent::Stopped");
                model.set_playing(false).await;
                model.set_buffering(false).await;
                return;
            }
            PlayerEvent::Loading { media_id }
            | PlayerEvent::Ready { media_id, .. }
            | PlayerEvent::Playing { media_id }
            | PlayerEvent::Paused { media_id }
            | PlayerEvent::Seeked { media_id, .. }
            | PlayerEvent::LoadFailed { media_id, .. } => media_id,
        };

        let Some(current) = model.current_song().await.filter(|s| &s.id == media_id) else {
            tracing::trace!(media_id = %media_id, "Ignoring event for a stale song");
            return;
        };

        match event {
            PlayerEvent::Loading { .. } => {
                tracing::debug!(song_id = %current.id, "PlayerEvent::Loading");
                model.set_buffering(true).await;
            }
            PlayerEvent::Ready { duration_ms, .. } => {
                let duration_ms = if duration_ms > 0 { duration_ms } else { current.duration_ms() };
                tracing::debug!(song_id = %current.id, duration_ms, "PlayerEvent::Ready");
                model.set_duration(duration_ms).await;
                model.set_buffering(false).await;
            }
            PlayerEvent::Playing { .. } => {
                tracing::trace!(song_id = %current.id, "PlayerEvent::Playing");
                model.set_playing(true).await;
            }
            PlayerEvent::Paused { .. } => {
                tracing::debug!(song_id = %current.id, "PlayerEvent::Paused");
                model.set_playing(false).await;
            }
            PlayerEvent::Seeked { position_ms, .. } => {
                tracing::debug!(song_id = %current.id, position_ms, "PlayerEvent::Seeked");
                model.set_position(position_ms).await;
            }
            PlayerEvent::LoadFailed { error, .. } => {
                tracing::error!(song_id = %current.id, error = %error, "PlayerEvent::LoadFailed");
                model.set_buffering(false).await;
                model.set_playing(false).await;
                model.set_error(format!("Could not play \"{}\": {}", current.name, error)).await;
            }
            PlayerEvent::Stopped => {}
        }
    }

    /// Poll the player on a fixed interval until the app quits
    pub async fn start_progress_loop(&self) {
        let controller = self.clone();
        let poll = self.progress_poll;
        tracing::debug!(poll_ms = poll.as_millis() as u64, "Starting progress loop");

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(poll);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if controller.model.lock().await.should_quit().await {
                    break;
                }
                controller.progress_tick().await;
            }
        });

        if let Some(previous) = self.progress_task.lock().await.replace(task) {
            previous.abort();
        }
    }

    pub(crate) async fn progress_tick(&self) {
        let Some(player) = self.current_player().await else {
            return;
        };

        if let Some(finished) = player.take_end_of_track() {
            self.handle_end_of_track(&finished).await;
            return;
        }

        let model = self.model.lock().await;
        if model.is_playing().await {
            model.sync_progress(player.position_ms(), None).await;
        }
    }
}
