//! Assessment result view.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

use crate::application::Assessment;
use crate::domain::{format_risk_percentage, RiskTier, TierDisplay};
use crate::tui::styles::ScreeningTheme;

/// Result screen state
#[derive(Debug, Clone, Default)]
pub enum ResultState {
    /// Nothing submitted yet
    #[default]
    Idle,
    /// Assessment finished
    Complete { assessment: Box<Assessment> },
    /// Submission failed; nothing was scored
    Error { message: String },
}

/// Render the result view
pub fn render_result(f: &mut Frame, area: Rect, state: &ResultState, display: TierDisplay) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_result_header(f, chunks[0]);
    match state {
        ResultState::Idle => render_idle(f, chunks[1]),
        ResultState::Complete { assessment } => {
            render_assessment(f, chunks[1], assessment, display);
        }
        ResultState::Error { message } => render_error(f, chunks[1], message),
    }
    render_result_footer(f, chunks[2]);
}

fn render_result_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", ScreeningTheme::text()),
        Span::styled("Risk Assessment", ScreeningTheme::title()),
        Span::styled(" │ Screening estimate", ScreeningTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(ScreeningTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_idle(f: &mut Frame, area: Rect) {
    let content = Paragraph::new(Line::from(Span::styled(
        "Fill in the survey to get an assessment",
        ScreeningTheme::text_muted(),
    )))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(ScreeningTheme::border()),
    );

    f.render_widget(content, area);
}

fn tier_icon(tier: RiskTier) -> &'static str {
    match tier {
        RiskTier::Low => "OK",
        RiskTier::Medium | RiskTier::High => "!",
    }
}

fn render_assessment(f: &mut Frame, area: Rect, assessment: &Assessment, display: TierDisplay) {
    let block = Block::default()
        .title(Span::styled(" Result ", ScreeningTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(ScreeningTheme::border_focused());

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tier
            Constraint::Length(3), // Probability
            Constraint::Min(0),    // Recommendation
        ])
        .margin(1)
        .split(inner);

    let result = &assessment.result;
    let tier_style = ScreeningTheme::risk_tier(result.tier);

    let tier = Paragraph::new(vec![
        Line::from(Span::styled(
            format!(
                "{} {}",
                tier_icon(result.tier),
                result.tier.display_label(display)
            ),
            tier_style.add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            result.tier.description(),
            ScreeningTheme::text_secondary(),
        )),
    ])
    .alignment(Alignment::Center);
    f.render_widget(tier, chunks[0]);

    let percent = (result.probability * 100.0).round().clamp(0.0, 100.0) as u16;
    let gauge = Gauge::default()
        .block(
            Block::default()
                .title(Span::styled(" Risk score ", ScreeningTheme::text_secondary()))
                .borders(Borders::ALL)
                .border_style(ScreeningTheme::border()),
        )
        .gauge_style(tier_style)
        .percent(percent)
        .label(format_risk_percentage(result.probability));
    f.render_widget(gauge, chunks[1]);

    let rec = &assessment.recommendation;
    let mut lines = vec![
        Line::from(Span::styled(
            rec.headline,
            ScreeningTheme::decision(assessment.decision),
        )),
        Line::from(""),
        Line::from(Span::styled(rec.score_line.as_str(), ScreeningTheme::text())),
        Line::from(Span::styled(
            rec.threshold_line.as_str(),
            ScreeningTheme::text_secondary(),
        )),
        Line::from(""),
        Line::from(Span::styled("Recommendations:", ScreeningTheme::subtitle())),
    ];
    lines.extend(rec.advice.iter().map(|item| {
        Line::from(vec![
            Span::styled("  • ", ScreeningTheme::text_muted()),
            Span::styled(*item, ScreeningTheme::text()),
        ])
    }));
    if let Some(note) = rec.note {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(note, ScreeningTheme::warning())));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!(
            "Assessed {}",
            assessment.assessed_at.format("%Y-%m-%d %H:%M UTC")
        ),
        ScreeningTheme::text_muted(),
    )));

    f.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: true }),
        chunks[2],
    );
}

fn render_error(f: &mut Frame, area: Rect, message: &str) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("! Error", ScreeningTheme::danger())),
        Line::from(""),
        Line::from(Span::styled(message, ScreeningTheme::text())),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(ScreeningTheme::danger()),
    );

    f.render_widget(content, area);
}

fn render_result_footer(f: &mut Frame, area: Rect) {
    let content = Line::from(vec![
        Span::styled("[N/Enter] ", ScreeningTheme::key_hint()),
        Span::styled("New assessment ", ScreeningTheme::key_desc()),
        Span::styled("[M] ", ScreeningTheme::key_hint()),
        Span::styled("Model info ", ScreeningTheme::key_desc()),
        Span::styled("[Q] ", ScreeningTheme::key_hint()),
        Span::styled("Quit", ScreeningTheme::key_desc()),
    ]);

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(ScreeningTheme::border()),
    );

    f.render_widget(footer, area);
}
