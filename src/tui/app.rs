//! Main TUI application state machine.
//!
//! Handles:
//! - Screen navigation
//! - Input event handling
//! - Submitting the survey to the assessment service

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};

use crate::adapters::gbdt::GbdtClassifier;
use crate::application::RiskAssessmentService;
use crate::domain::TierDisplay;
use crate::DiabscreenError;

use super::ui::{
    bmi::{render_bmi_calculator, BmiCalculatorState},
    form::{render_survey_form, SurveyFormState},
    model_info::{render_model_info, ModelInfo},
    render_disclaimer,
    result::{render_result, ResultState},
};

/// Current screen/view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Form,
    Result,
    BmiCalculator,
    ModelInfo,
}

/// Main application state
pub struct App {
    screen: Screen,

    /// Screen to return to when leaving the model information view
    previous_screen: Screen,

    should_quit: bool,

    service: RiskAssessmentService<GbdtClassifier>,

    tier_display: TierDisplay,

    form_state: SurveyFormState,

    result_state: ResultState,

    bmi_state: BmiCalculatorState,

    model_info: ModelInfo,
}

impl App {
    /// Create the application around a ready assessment service.
    #[must_use]
    pub fn new(service: RiskAssessmentService<GbdtClassifier>, tier_display: TierDisplay) -> Self {
        let model_info = ModelInfo::from_service(&service);
        Self {
            screen: Screen::Form,
            previous_screen: Screen::Form,
            should_quit: false,
            service,
            tier_display,
            form_state: SurveyFormState::default(),
            result_state: ResultState::default(),
            bmi_state: BmiCalculatorState::default(),
            model_info,
        }
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        // Nothing typed outlives the session.
        self.form_state.clear_sensitive();
        self.bmi_state.clear_sensitive();

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(0), Constraint::Length(3)])
                    .split(f.area());

                let content_area = chunks[0];
                match self.screen {
                    Screen::Form => render_survey_form(f, content_area, &self.form_state),
                    Screen::Result => {
                        render_result(f, content_area, &self.result_state, self.tier_display);
                    }
                    Screen::BmiCalculator => {
                        render_bmi_calculator(f, content_area, &self.bmi_state);
                    }
                    Screen::ModelInfo => render_model_info(f, content_area, &self.model_info),
                }

                render_disclaimer(f, chunks[1]);
            })?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        // Global quit handling
        if modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key, KeyCode::Char('q') | KeyCode::Char('c'))
        {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Form => self.handle_form_key(key),
            Screen::Result => self.handle_result_key(key),
            Screen::BmiCalculator => self.handle_bmi_key(key),
            Screen::ModelInfo => self.handle_model_info_key(key),
        }
    }

    fn show_model_info(&mut self) {
        self.previous_screen = self.screen;
        self.screen = Screen::ModelInfo;
    }

    fn handle_form_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Up | KeyCode::BackTab => self.form_state.prev_field(),
            KeyCode::Down | KeyCode::Tab => self.form_state.next_field(),
            KeyCode::Left => self.form_state.step(-1),
            KeyCode::Right | KeyCode::Char(' ') => self.form_state.step(1),
            KeyCode::Char('s') | KeyCode::Char('S') => self.form_state.load_sample_data(),
            KeyCode::Char('b') | KeyCode::Char('B') => self.screen = Screen::BmiCalculator,
            KeyCode::Char('m') | KeyCode::Char('M') => self.show_model_info(),
            KeyCode::Char(c) => self.form_state.input_char(c),
            KeyCode::Backspace => self.form_state.delete_char(),
            KeyCode::Delete => self.form_state.clear_field(),
            KeyCode::Enter => self.submit_survey(),
            _ => {}
        }
    }

    fn handle_result_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.result_state = ResultState::Idle;
                self.form_state = SurveyFormState::default();
                self.screen = Screen::Form;
            }
            KeyCode::Char('m') | KeyCode::Char('M') => self.show_model_info(),
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_bmi_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.bmi_state.clear_sensitive();
                self.screen = Screen::Form;
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.bmi_state.next_field();
            }
            KeyCode::Enter => self.bmi_state.calculate(),
            KeyCode::Char('a') | KeyCode::Char('A') => {
                if let Some(bmi) = self.bmi_state.bmi() {
                    self.form_state.set_bmi(bmi);
                    self.bmi_state.clear_sensitive();
                    self.screen = Screen::Form;
                }
            }
            KeyCode::Char(c) => self.bmi_state.input_char(c),
            KeyCode::Backspace => self.bmi_state.delete_char(),
            _ => {}
        }
    }

    fn handle_model_info_key(&mut self, key: KeyCode) {
        if matches!(key, KeyCode::Esc | KeyCode::Enter) {
            self.screen = self.previous_screen;
        }
    }

    fn submit_survey(&mut self) {
        let inputs = match self.form_state.to_survey_inputs() {
            Ok(inputs) => inputs,
            Err(e) => {
                self.form_state.error_message = Some(e);
                return;
            }
        };

        self.result_state = match self.service.assess(&inputs) {
            Ok(assessment) => ResultState::Complete {
                assessment: Box::new(assessment),
            },
            Err(DiabscreenError::OutOfDomain(errors)) => {
                self.form_state.error_message = Some(errors.join(", "));
                return;
            }
            Err(e) => {
                tracing::error!("Assessment failed: {}", e);
                ResultState::Error {
                    message: e.to_string(),
                }
            }
        };

        // Clear typed answers from the UI immediately.
        self.form_state.clear_sensitive();
        self.screen = Screen::Result;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::artifacts::{load_artifacts, LoadOptions};
    use crate::domain::{Decision, RiskTier, ThresholdPolicy};
    use std::path::Path;
    use std::sync::Arc;

    fn app() -> App {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("models");
        let artifact = load_artifacts(&dir, LoadOptions::default()).expect("bundled model");
        let service = RiskAssessmentService::new(Arc::new(artifact), ThresholdPolicy::default());
        App::new(service, TierDisplay::ThreeTier)
    }

    fn press(app: &mut App, key: KeyCode) {
        app.handle_key(key, KeyModifiers::NONE);
    }

    #[test]
    fn test_sample_submission_shows_result_and_clears_form() {
        let mut app = app();
        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.screen, Screen::Result);
        match &app.result_state {
            ResultState::Complete { assessment } => {
                assert_eq!(assessment.result.tier, RiskTier::High);
                assert_eq!(assessment.decision, Decision::RiskDetected);
            }
            other => panic!("unexpected state: {other:?}"),
        }
        assert!(app.form_state.fields.iter().all(|f| f.value.is_empty()));

        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.screen, Screen::Form);
        assert!(app.form_state.to_survey_inputs().is_ok());
    }

    #[test]
    fn test_invalid_form_stays_on_form() {
        let mut app = app();
        // BMI field
        for _ in 0..4 {
            press(&mut app, KeyCode::Down);
        }
        press(&mut app, KeyCode::Delete);
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.screen, Screen::Form);
        assert!(app.form_state.error_message.is_some());
        assert!(matches!(app.result_state, ResultState::Idle));
    }

    #[test]
    fn test_bmi_calculator_applies_clamped_value() {
        let mut app = app();
        press(&mut app, KeyCode::Char('b'));
        assert_eq!(app.screen, Screen::BmiCalculator);
        for c in "150".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Tab);
        for c in "140".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('a'));

        assert_eq!(app.screen, Screen::Form);
        let inputs = app.form_state.to_survey_inputs().expect("valid form");
        // 140 / 1.5^2 = 62.2, pulled down to the form maximum
        assert!((inputs.bmi - 50.0).abs() < f64::EPSILON);
        assert!(app.bmi_state.height_cm.is_empty());
    }

    #[test]
    fn test_model_info_returns_to_previous_screen() {
        let mut app = app();
        press(&mut app, KeyCode::Char('m'));
        assert_eq!(app.screen, Screen::ModelInfo);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.screen, Screen::Form);
        assert!(!app.should_quit);

        app.handle_key(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(app.should_quit);
    }
}
