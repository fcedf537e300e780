use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use photowall_core::WallState;

use crate::app::App;

pub struct StatusBarWidget;

impl StatusBarWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let status_text = match app.wall() {
            Some(wall) => {
                let state_str = match wall.state() {
                    WallState::Running => "RUNNING",
                    WallState::Paused => "PAUSED",
                    WallState::Stopped => "STOPPED",
                };
                let loading = app.photos.loading_count();
                let loading_str = if loading > 0 {
                    format!(" | Loading: {}", loading)
                } else {
                    String::new()
                };
                format!(
                    " {} | {} | Lanes: {}{}",
                    state_str,
                    wall.config().direction.as_str(),
                    wall.lane_count(),
                    loading_str
                )
            }
            None => " no wall ".to_string(),
        };

        let help_hint = " q:quit space:pause r:refresh ";
        let padding_len = area
            .width
            .saturating_sub(status_text.len() as u16 + help_hint.len() as u16)
            as usize;

        let bg = Color::Rgb(0x45, 0x40, 0x3d);
        let line = Line::from(vec![
            Span::styled(
                status_text,
                Style::default().fg(Color::Rgb(0xd4, 0xbe, 0x98)).bg(bg),
            ),
            Span::styled(" ".repeat(padding_len), Style::default().bg(bg)),
            Span::styled(
                help_hint,
                Style::default().fg(Color::Rgb(0x92, 0x83, 0x74)).bg(bg),
            ),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }
}
