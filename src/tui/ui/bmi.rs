//! BMI calculator for respondents who don't know their BMI.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use zeroize::Zeroize;

use crate::domain::bmi::{compute_bmi, BmiCategory};
use crate::tui::styles::ScreeningTheme;

const MAX_INPUT_LEN: usize = 6;

#[derive(Debug, Default)]
pub struct BmiCalculatorState {
    pub height_cm: String,
    pub weight_kg: String,
    /// 0 = height, 1 = weight
    pub selected_field: usize,
    pub result: Option<Result<f64, String>>,
}

impl BmiCalculatorState {
    pub fn next_field(&mut self) {
        self.selected_field = (self.selected_field + 1) % 2;
    }

    fn current(&mut self) -> &mut String {
        if self.selected_field == 0 {
            &mut self.height_cm
        } else {
            &mut self.weight_kg
        }
    }

    pub fn input_char(&mut self, c: char) {
        let value = self.current();
        let accepted = c.is_ascii_digit() || (c == '.' && !value.contains('.'));
        if accepted && value.len() < MAX_INPUT_LEN {
            value.push(c);
            self.result = None;
        }
    }

    pub fn delete_char(&mut self) {
        self.current().pop();
        self.result = None;
    }

    /// Compute BMI from the typed height and weight.
    pub fn calculate(&mut self) {
        let parse = |raw: &str, label: &str| {
            raw.parse::<f64>()
                .map_err(|_| format!("{label}: Invalid number"))
        };
        self.result = Some(
            parse(&self.height_cm, "Height")
                .and_then(|h| parse(&self.weight_kg, "Weight").map(|w| (h, w)))
                .and_then(|(h, w)| compute_bmi(h, w)),
        );
    }

    /// BMI from the last successful calculation.
    #[must_use]
    pub fn bmi(&self) -> Option<f64> {
        match &self.result {
            Some(Ok(bmi)) => Some(*bmi),
            _ => None,
        }
    }

    /// Wipe height and weight.
    pub fn clear_sensitive(&mut self) {
        self.height_cm.zeroize();
        self.weight_kg.zeroize();
        self.result = None;
        self.selected_field = 0;
    }
}

/// Render the BMI calculator
pub fn render_bmi_calculator(f: &mut Frame, area: Rect, state: &BmiCalculatorState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Height
            Constraint::Length(3), // Weight
            Constraint::Min(0),    // Result
            Constraint::Length(3), // Footer
        ])
        .split(area);

    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", ScreeningTheme::text()),
        Span::styled("BMI Calculator", ScreeningTheme::title()),
        Span::styled(" │ weight / height²", ScreeningTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(ScreeningTheme::border()),
    );
    f.render_widget(header, chunks[0]);

    render_input(f, chunks[1], "Height (cm)", &state.height_cm, state.selected_field == 0);
    render_input(f, chunks[2], "Weight (kg)", &state.weight_kg, state.selected_field == 1);

    let result = match &state.result {
        None => vec![Line::from(Span::styled(
            "Press Enter to calculate",
            ScreeningTheme::text_muted(),
        ))],
        Some(Ok(bmi)) => {
            let category = BmiCategory::from_bmi(*bmi);
            let style = match category {
                BmiCategory::Normal => ScreeningTheme::success(),
                BmiCategory::Underweight | BmiCategory::Overweight => ScreeningTheme::warning(),
                BmiCategory::Obese => ScreeningTheme::danger(),
            };
            vec![
                Line::from(vec![
                    Span::styled("BMI: ", ScreeningTheme::text_secondary()),
                    Span::styled(format!("{bmi:.1}"), ScreeningTheme::title()),
                ]),
                Line::from(Span::styled(category.label(), style)),
            ]
        }
        Some(Err(e)) => vec![Line::from(Span::styled(e.as_str(), ScreeningTheme::danger()))],
    };
    f.render_widget(
        Paragraph::new(result).alignment(Alignment::Center),
        chunks[3],
    );

    let footer = Paragraph::new(Line::from(vec![
        Span::styled("[Tab] ", ScreeningTheme::key_hint()),
        Span::styled("Switch ", ScreeningTheme::key_desc()),
        Span::styled("[Enter] ", ScreeningTheme::key_hint()),
        Span::styled("Calculate ", ScreeningTheme::key_desc()),
        Span::styled("[A] ", ScreeningTheme::key_hint()),
        Span::styled("Use in form ", ScreeningTheme::key_desc()),
        Span::styled("[Esc] ", ScreeningTheme::key_hint()),
        Span::styled("Back", ScreeningTheme::key_desc()),
    ]))
    .block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(ScreeningTheme::border()),
    );
    f.render_widget(footer, chunks[4]);
}

fn render_input(f: &mut Frame, area: Rect, label: &str, value: &str, selected: bool) {
    let (border_style, title_style) = if selected {
        (ScreeningTheme::border_focused(), ScreeningTheme::focused())
    } else {
        (ScreeningTheme::border(), ScreeningTheme::text_secondary())
    };

    let mut spans = vec![Span::raw(" "), Span::styled(value, ScreeningTheme::text())];
    if selected {
        spans.push(Span::styled("▌", ScreeningTheme::cursor()));
    }

    let input = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .title(Span::styled(format!(" {label} "), title_style))
            .borders(Borders::ALL)
            .border_style(border_style),
    );
    f.render_widget(input, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_str(state: &mut BmiCalculatorState, s: &str) {
        for c in s.chars() {
            state.input_char(c);
        }
    }

    #[test]
    fn test_calculates_bmi() {
        let mut state = BmiCalculatorState::default();
        type_str(&mut state, "175");
        state.next_field();
        type_str(&mut state, "80");
        state.calculate();
        let bmi = state.bmi().expect("bmi");
        assert!((bmi - 26.12).abs() < 0.01);
    }

    #[test]
    fn test_reports_invalid_input() {
        let mut state = BmiCalculatorState::default();
        state.calculate();
        assert!(matches!(state.result, Some(Err(ref e)) if e.starts_with("Height")));

        type_str(&mut state, "90");
        state.next_field();
        type_str(&mut state, "70");
        state.calculate();
        assert!(state.bmi().is_none());
    }

    #[test]
    fn test_clear_sensitive() {
        let mut state = BmiCalculatorState::default();
        type_str(&mut state, "180");
        state.next_field();
        type_str(&mut state, "75");
        state.calculate();
        state.clear_sensitive();
        assert!(state.height_cm.is_empty());
        assert!(state.weight_kg.is_empty());
        assert!(state.bmi().is_none());
    }
}
