//! Key event handling

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::model::{ActiveSection, ContentView, SelectedItem};
use super::AppController;

impl AppController {
    pub async fn handle_key_event(&self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        let model = self.model.lock().await;

        // Error popup blocks all other interactions
        if model.has_error().await {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                model.clear_error().await;
            }
            return Ok(());
        }

        if model.is_help_popup_open().await {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('H')) {
                model.hide_help_popup().await;
            }
            return Ok(());
        }

        let ui_state = model.get_ui_state().await;

        if ui_state.active_section == ActiveSection::Search {
            match key.code {
                KeyCode::Tab => {
                    if key.modifiers.contains(KeyModifiers::SHIFT) {
                        model.cycle_section_backward().await;
                    } else {
                        model.cycle_section_forward().await;
                    }
                    return Ok(());
                }
                KeyCode::Enter => {
                    let query = model.take_search_query().await;
                    drop(model);
                    // Run in the background so the loading state gets drawn
                    let controller = self.clone();
                    tokio::spawn(async move {
                        controller.perform_search(&query).await;
                    });
                    return Ok(());
                }
                KeyCode::Esc => {
                    model.take_search_query().await;
                    return Ok(());
                }
                KeyCode::Backspace => {
                    model.backspace_search().await;
                    return Ok(());
                }
                KeyCode::Char(c) => {
                    // Ctrl+Q still quits while typing
                    if (c == 'q' || c == 'Q') && key.modifiers.contains(KeyModifiers::CONTROL) {
                        model.set_should_quit(true).await;
                        return Ok(());
                    }
                    model.append_to_search(c).await;
                    return Ok(());
                }
                _ => {}
            }
        }

        if ui_state.active_section == ActiveSection::MainContent {
            let view = model.get_content_state().await.view;
            let now_playing = matches!(view, ContentView::NowPlaying);
            let artist_page = matches!(view, ContentView::ArtistDetail { .. });

            match key.code {
                KeyCode::Up => {
                    model.content_move_up().await;
                    return Ok(());
                }
                KeyCode::Down => {
                    model.content_move_down().await;
                    return Ok(());
                }
                KeyCode::Left if now_playing => {
                    drop(model);
                    self.seek_relative(false).await;
                    return Ok(());
                }
                KeyCode::Right if now_playing => {
                    drop(model);
                    self.seek_relative(true).await;
                    return Ok(());
                }
                KeyCode::Left => {
                    model.navigate_tab(false).await;
                    return Ok(());
                }
                KeyCode::Right => {
                    model.navigate_tab(true).await;
                    return Ok(());
                }
                KeyCode::Enter => {
                    let selected = model.get_selected_content_item().await;
                    drop(model);
                    match selected {
                        // Detail pages come from the catalog
                        Some(item @ (SelectedItem::Artist { .. }
                        | SelectedItem::Album { .. }
                        | SelectedItem::Playlist { .. })) => {
                            let controller = self.clone();
                            tokio::spawn(async move {
                                controller.handle_selected_item(item).await;
                            });
                        }
                        Some(item) => self.handle_selected_item(item).await,
                        None => {}
                    }
                    return Ok(());
                }
                KeyCode::Backspace | KeyCode::Esc => {
                    model.navigate_back().await;
                    return Ok(());
                }
                KeyCode::Char('k') | KeyCode::Char('K') => {
                    drop(model);
                    self.add_selected_to_queue().await;
                    return Ok(());
                }
                KeyCode::Delete | KeyCode::Char('d') | KeyCode::Char('D') => {
                    drop(model);
                    self.remove_selected_from_queue().await;
                    return Ok(());
                }
                KeyCode::Char('a') | KeyCode::Char('A') if artist_page => {
                    drop(model);
                    self.play_artist(false).await;
                    return Ok(());
                }
                KeyCode::Char('s') | KeyCode::Char('S') if artist_page => {
                    drop(model);
                    self.play_artist(true).await;
                    return Ok(());
                }
                _ => {}
            }
        }

        // Global keybindings
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                model.set_should_quit(true).await;
            }
            KeyCode::Tab => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    model.cycle_section_backward().await;
                } else {
                    model.cycle_section_forward().await;
                }
            }
            KeyCode::BackTab => {
                model.cycle_section_backward().await;
            }
            KeyCode::Up => {
                model.move_selection_up().await;
            }
            KeyCode::Down => {
                model.move_selection_down().await;
            }
            KeyCode::Enter => {
                if ui_state.active_section == ActiveSection::Library {
                    let selected = ui_state.library_selected;
                    drop(model);
                    let controller = self.clone();
                    tokio::spawn(async move {
                        controller.open_library_item(selected).await;
                    });
                }
            }
            KeyCode::Char(' ') => {
                drop(model);
                self.toggle_playback().await;
            }
            KeyCode::Char('n') | KeyCode::Char('N') => {
                drop(model);
                self.next_track().await;
            }
            KeyCode::Char('p') | KeyCode::Char('P') => {
                drop(model);
                self.previous_track().await;
            }
            KeyCode::Char('f') | KeyCode::Char('F') => {
                drop(model);
                self.seek_relative(true).await;
            }
            KeyCode::Char('b') | KeyCode::Char('B') => {
                drop(model);
                self.seek_relative(false).await;
            }
            // 0-9 jump to 0%..90% of the song
            KeyCode::Char(c) if c.is_ascii_digit() => {
                drop(model);
                let percent = (c as u8 - b'0') * 10;
                self.seek_to_percent(percent).await;
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                drop(model);
                self.volume_up().await;
            }
            KeyCode::Char('-') => {
                drop(model);
                self.volume_down().await;
            }
            KeyCode::Char('c') | KeyCode::Char('C') => {
                drop(model);
                self.clear_queue().await;
            }
            KeyCode::Char('g') | KeyCode::Char('G') => {
                model.set_active_section(ActiveSection::Search).await;
            }
            KeyCode::Char('u') | KeyCode::Char('U') => {
                model.show_queue().await;
                model.set_active_section(ActiveSection::MainContent).await;
            }
            KeyCode::Char('o') | KeyCode::Char('O') => {
                model.show_now_playing().await;
                model.set_active_section(ActiveSection::MainContent).await;
            }
            KeyCode::Char('h') | KeyCode::Char('H') => {
                model.show_help_popup().await;
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Mutex;

    use crate::model::AppModel;

    fn controller() -> AppController {
        AppController::new(
            Arc::new(Mutex::new(AppModel::new())),
            Arc::new(Mutex::new(None)),
            Duration::from_millis(50),
        )
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[tokio::test]
    async fn typing_in_search_builds_the_query() {
        let controller = controller();
        for c in "arijit q".chars() {
            controller.handle_key_event(press(KeyCode::Char(c))).await.unwrap();
        }
        controller.handle_key_event(press(KeyCode::Backspace)).await.unwrap();

        let model = controller.model.lock().await;
        assert_eq!(model.get_ui_state().await.search_query, "arijit ");
        assert!(!model.should_quit().await);
    }

    #[tokio::test]
    async fn error_popup_swallows_keys_until_dismissed() {
        let controller = controller();
        controller.model.lock().await.set_error("boom".to_string()).await;

        controller.handle_key_event(press(KeyCode::Char('x'))).await.unwrap();
        assert_eq!(controller.model.lock().await.get_ui_state().await.search_query, "");

        controller.handle_key_event(press(KeyCode::Esc)).await.unwrap();
        assert!(!controller.model.lock().await.has_error().await);
    }

    #[tokio::test]
    async fn queue_key_opens_queue_view() {
        let controller = controller();
        controller.handle_key_event(press(KeyCode::Tab)).await.unwrap();
        controller.handle_key_event(press(KeyCode::Char('u'))).await.unwrap();

        let model = controller.model.lock().await;
        assert!(model.is_queue_view_visible().await);
        assert_eq!(model.get_ui_state().await.active_section, ActiveSection::MainContent);
    }

    #[tokio::test]
    async fn now_playing_view_turns_arrows_into_seeks() {
        let controller = controller();
        controller.handle_key_event(press(KeyCode::Tab)).await.unwrap();
        controller.handle_key_event(press(KeyCode::Char('o'))).await.unwrap();
        assert!(controller.model.lock().await.is_now_playing_visible().await);

        // Nothing is playing, so the seek is a no-op and the view stays put
        controller.handle_key_event(press(KeyCode::Right)).await.unwrap();
        assert!(controller.model.lock().await.is_now_playing_visible().await);
    }

    async fn wait_for_error(controller: &AppController) -> bool {
        for _ in 0..50 {
            if controller.model.lock().await.has_error().await {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }

    #[tokio::test]
    async fn search_runs_after_the_key_handler_returns() {
        let controller = controller();
        controller.handle_key_event(press(KeyCode::Char('x'))).await.unwrap();
        controller.handle_key_event(press(KeyCode::Enter)).await.unwrap();

        // The query is taken at once; the catalog call finishes later
        assert_eq!(controller.model.lock().await.get_ui_state().await.search_query, "");
        assert!(wait_for_error(&controller).await);
        assert_eq!(
            controller.model.lock().await.get_ui_state().await.error_message.as_deref(),
            Some("Catalog is not configured.")
        );
    }

    #[tokio::test]
    async fn opening_an_artist_runs_in_the_background() {
        let controller = controller();
        {
            let model = controller.model.lock().await;
            model
                .set_search_results(crate::model::SearchResults {
                    artists: vec![crate::model::SearchArtist { id: None, name: "Singer".to_string() }],
                    best_match: crate::model::SearchTab::Artists,
                    ..Default::default()
                })
                .await;
            model.set_active_section(ActiveSection::MainContent).await;
        }
        controller.handle_key_event(press(KeyCode::Enter)).await.unwrap();
        assert!(wait_for_error(&controller).await);
    }

    #[tokio::test]
    async fn q_quits_outside_search() {
        let controller = controller();
        controller.handle_key_event(press(KeyCode::Tab)).await.unwrap();
        controller.handle_key_event(press(KeyCode::Char('q'))).await.unwrap();
        assert!(controller.model.lock().await.should_quit().await);
    }
}
