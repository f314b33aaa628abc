//! UI module: View components for the TUI.

pub mod bmi;
pub mod form;
pub mod model_info;
pub mod result;

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::tui::styles::ScreeningTheme;

pub fn render_disclaimer(f: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(vec![Span::styled(
            "DISCLAIMER: This screening gives a risk estimate and is not a medical diagnosis.",
            ScreeningTheme::text_muted(),
        )]),
        Line::from(vec![Span::styled(
            "The decision threshold is low, so false alarms are more likely than missed cases.",
            ScreeningTheme::text_muted(),
        )]),
    ];

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(ScreeningTheme::border());

    let p = Paragraph::new(text).block(block).wrap(Wrap { trim: true });

    f.render_widget(p, area);
}
