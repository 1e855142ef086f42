//! View module - UI rendering
//!
//! This module handles all UI rendering for the application using ratatui.
//! It is organized into submodules by component type:
//!
//! - `utils`: Shared utility functions (formatting, scrollable lists)
//! - `layout`: Main layout structure (top bar, sidebar)
//! - `content`: Main content area rendering
//! - `progress`: Progress bar rendering
//! - `overlays`: Modal overlays (error, help)

mod utils;
mod layout;
mod content;
mod progress;
mod overlays;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::model::{ContentState, PlaybackInfo, UiState};

pub struct AppView;

impl AppView {
    pub fn render(frame: &mut Frame, playback: &PlaybackInfo, ui_state: &UiState, content_state: &ContentState) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Search bar + volume
                Constraint::Min(0),    // Main content (sidebar + content)
                Constraint::Length(3), // Progress bar with playback info
            ])
            .split(frame.area());

        layout::render_top_bar(frame, chunks[0], ui_state, playback.settings.volume);

        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(30), // Sidebar (Library + Up next)
                Constraint::Percentage(70), // Main content
            ])
            .split(chunks[1]);

        layout::render_sidebar(frame, main_chunks[0], ui_state, playback);
        content::render_main_content(frame, main_chunks[1], ui_state, content_state, playback);
        progress::render_progress_bar(frame, chunks[2], playback);

        if ui_state.error_message.is_some() {
            overlays::render_error_notification(frame, ui_state);
        }

        if ui_state.show_help_popup {
            overlays::render_help_popup(frame);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContentView, test_song};
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(playback: &PlaybackInfo, ui_state: &UiState, content_state: &ContentState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal
            .draw(|f| AppView::render(f, playback, ui_state, content_state))
            .unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn renders_queue_and_now_playing() {
        let queue = vec![test_song("a", "Singer"), test_song("b", "Singer")];
        let playback = PlaybackInfo {
            current_song: Some(queue[0].clone()),
            is_playing: true,
            duration_ms: 200_000,
            position_ms: 65_000,
            progress_ratio: 0.325,
            current_index: Some(0),
            has_next: true,
            queue,
            ..Default::default()
        };
        let ui_state = UiState::default();

        let content_state = ContentState {
            view: ContentView::Queue { selected_index: 0 },
            ..Default::default()
        };
        let screen = draw(&playback, &ui_state, &content_state);
        assert!(screen.contains("Queue (2)"));
        assert!(screen.contains("1:05 / 3:20"));

        let content_state = ContentState {
            view: ContentView::NowPlaying,
            ..Default::default()
        };
        let screen = draw(&playback, &ui_state, &content_state);
        assert!(screen.contains("Now Playing"));
        assert!(screen.contains("Song a"));
    }

    #[test]
    fn error_overlay_is_drawn() {
        let ui_state = UiState {
            error_message: Some("Cannot reach the catalog".to_string()),
            ..Default::default()
        };
        let screen = draw(&PlaybackInfo::default(), &ui_state, &ContentState::default());
        assert!(screen.contains("Cannot reach the catalog"));
    }
}
