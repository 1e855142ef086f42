//! Progress bar rendering

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Gauge},
    Frame,
};

use crate::model::PlaybackInfo;
use super::utils::format_duration;

fn status_text(playback: &PlaybackInfo) -> String {
    let Some(song) = &playback.current_song else {
        return " No song playing".to_string();
    };
    let icon = if playback.is_buffering {
        "⏳"
    } else if playback.is_playing {
        "▶"
    } else {
        "⏸"
    };
    format!(" {} {} | {}", icon, song.name, song.artists)
}

/// Queue position, with arrows where next/previous would go somewhere
fn queue_text(playback: &PlaybackInfo) -> String {
    let position = match playback.current_index {
        Some(index) => format!("Queue: {}/{}", index + 1, playback.queue.len()),
        None => format!("Queue: {}", playback.queue.len()),
    };
    let previous = if playback.has_previous { "◀ " } else { "" };
    let next = if playback.has_next { " ▶" } else { "" };
    format!("{}{}{}", previous, position, next)
}

pub fn render_progress_bar(frame: &mut Frame, area: Rect, playback: &PlaybackInfo) {
    let time_str = if playback.is_buffering {
        "Buffering...".to_string()
    } else {
        format!(
            "{} / {}",
            format_duration(playback.position_ms),
            format_duration(playback.duration_ms)
        )
    };

    let controls_info = format!(" {} | Vol: {}% ", queue_text(playback), playback.settings.volume);

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("{} ", status_text(playback)))
                .title_bottom(Line::from(controls_info).right_aligned()),
        )
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(playback.progress_ratio)
        .label(time_str);

    frame.render_widget(gauge, area);
}
