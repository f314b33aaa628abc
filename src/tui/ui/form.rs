//! Survey input form.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use zeroize::Zeroize;

use crate::domain::survey::{
    age_bracket_label, education_label, gen_hlth_label, income_label, AGE_RANGE, BMI_RANGE,
    DAYS_RANGE, EDUCATION_RANGE, GEN_HLTH_RANGE, INCOME_RANGE,
};
use crate::domain::{Sex, SurveyInputs};
use crate::tui::styles::ScreeningTheme;

/// Longest value a field accepts from the keyboard.
const MAX_INPUT_LEN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldId {
    Age,
    Sex,
    Education,
    Income,
    Bmi,
    GenHlth,
    MentHlth,
    PhysHlth,
    HighBp,
    HighChol,
    Smoker,
    PhysActivity,
    DiffWalk,
}

/// How a field is edited and checked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// Yes/no, toggled
    Flag,
    /// Integer code stepped within its domain
    Code { min: u8, max: u8 },
    /// Typed decimal
    Decimal { min: f64, max: f64 },
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub id: FieldId,
    pub label: &'static str,
    pub kind: FieldKind,
    pub value: String,
}

impl FormField {
    fn new(id: FieldId, label: &'static str, kind: FieldKind) -> Self {
        Self {
            id,
            label,
            kind,
            value: String::new(),
        }
    }

    /// Readable rendering of the current value.
    #[must_use]
    pub fn display(&self) -> String {
        match self.kind {
            FieldKind::Flag => match self.value.as_str() {
                "1" => "Yes".to_string(),
                "0" => "No".to_string(),
                _ => String::new(),
            },
            FieldKind::Code { .. } => match self.value.parse::<u8>() {
                Ok(code) => format!("{code}  {}", describe_code(self.id, code)),
                Err(_) => self.value.clone(),
            },
            FieldKind::Decimal { .. } => self.value.clone(),
        }
    }
}

fn describe_code(id: FieldId, code: u8) -> String {
    match id {
        FieldId::Age => age_bracket_label(code),
        FieldId::Sex => Sex::try_from(code)
            .map(|s| s.label().to_string())
            .unwrap_or_default(),
        FieldId::Education => education_label(code).to_string(),
        FieldId::Income => income_label(code).to_string(),
        FieldId::GenHlth => gen_hlth_label(code).to_string(),
        FieldId::MentHlth | FieldId::PhysHlth => format!("{code} days"),
        _ => String::new(),
    }
}

fn flag_text(value: bool) -> String {
    String::from(if value { "1" } else { "0" })
}

/// Survey form state
pub struct SurveyFormState {
    pub fields: Vec<FormField>,
    pub selected_field: usize,
    pub error_message: Option<String>,
}

/// Personal, health and risk-factor groups, in display order.
const GROUPS: [(&str, usize); 3] = [("Personal", 4), ("Health", 4), ("Risk factors", 5)];

impl Default for SurveyFormState {
    fn default() -> Self {
        let code = |(min, max): (u8, u8)| FieldKind::Code { min, max };
        let mut state = Self {
            fields: vec![
                FormField::new(FieldId::Age, "Age group", code(AGE_RANGE)),
                FormField::new(FieldId::Sex, "Sex", code((0, 1))),
                FormField::new(FieldId::Education, "Education", code(EDUCATION_RANGE)),
                FormField::new(FieldId::Income, "Income", code(INCOME_RANGE)),
                FormField::new(
                    FieldId::Bmi,
                    "BMI",
                    FieldKind::Decimal {
                        min: BMI_RANGE.0,
                        max: BMI_RANGE.1,
                    },
                ),
                FormField::new(FieldId::GenHlth, "General health", code(GEN_HLTH_RANGE)),
                FormField::new(FieldId::MentHlth, "Poor mental health days", code(DAYS_RANGE)),
                FormField::new(FieldId::PhysHlth, "Poor physical health days", code(DAYS_RANGE)),
                FormField::new(FieldId::HighBp, "High blood pressure", FieldKind::Flag),
                FormField::new(FieldId::HighChol, "High cholesterol", FieldKind::Flag),
                FormField::new(FieldId::Smoker, "Smoker (100+ cigarettes)", FieldKind::Flag),
                FormField::new(FieldId::PhysActivity, "Physically active", FieldKind::Flag),
                FormField::new(FieldId::DiffWalk, "Difficulty walking", FieldKind::Flag),
            ],
            selected_field: 0,
            error_message: None,
        };
        state.fill_from(&SurveyInputs::default());
        state
    }
}

impl SurveyFormState {
    /// Move to the next field
    pub fn next_field(&mut self) {
        self.selected_field = (self.selected_field + 1) % self.fields.len();
    }

    /// Move to the previous field
    pub fn prev_field(&mut self) {
        if self.selected_field == 0 {
            self.selected_field = self.fields.len() - 1;
        } else {
            self.selected_field -= 1;
        }
    }

    #[must_use]
    pub fn selected(&self) -> &FormField {
        &self.fields[self.selected_field]
    }

    /// Toggle a flag or step a code by `delta` within its domain.
    pub fn step(&mut self, delta: i16) {
        let field = &mut self.fields[self.selected_field];
        match field.kind {
            FieldKind::Flag => {
                let toggled = if field.value == "1" { "0" } else { "1" };
                field.value = toggled.to_string();
            }
            FieldKind::Code { min, max } => {
                // Typed values may lie outside the domain.
                let current = field
                    .value
                    .parse::<i16>()
                    .unwrap_or(i16::from(min))
                    .clamp(i16::from(min), i16::from(max));
                let next = current
                    .saturating_add(delta)
                    .clamp(i16::from(min), i16::from(max));
                field.value = next.to_string();
            }
            FieldKind::Decimal { .. } => return,
        }
        self.error_message = None;
    }

    /// Add a character to the current field
    pub fn input_char(&mut self, c: char) {
        let field = &mut self.fields[self.selected_field];
        let accepted = match field.kind {
            FieldKind::Flag => false,
            FieldKind::Code { .. } => c.is_ascii_digit(),
            FieldKind::Decimal { .. } => c.is_ascii_digit() || (c == '.' && !field.value.contains('.')),
        };
        if accepted && field.value.len() < MAX_INPUT_LEN {
            field.value.push(c);
            self.error_message = None;
        }
    }

    /// Delete the last character
    pub fn delete_char(&mut self) {
        let field = &mut self.fields[self.selected_field];
        if field.kind != FieldKind::Flag {
            field.value.pop();
        }
    }

    /// Clear the current field
    pub fn clear_field(&mut self) {
        let field = &mut self.fields[self.selected_field];
        if field.kind != FieldKind::Flag {
            field.value.zeroize();
        }
    }

    /// Put a calculated BMI into the form, pulled into the accepted range.
    pub fn set_bmi(&mut self, bmi: f64) {
        let clamped = SurveyInputs {
            bmi,
            ..SurveyInputs::default()
        }
        .clamped()
        .bmi;
        if let Some(field) = self.fields.iter_mut().find(|f| f.id == FieldId::Bmi) {
            field.value.zeroize();
            field.value = format!("{clamped:.1}");
        }
        self.error_message = None;
    }

    /// Wipe all field buffers from memory and clear values.
    ///
    /// Called right after a submission so typed answers do not persist in the
    /// UI state.
    pub fn clear_sensitive(&mut self) {
        for field in &mut self.fields {
            field.value.zeroize();
        }
        self.error_message = None;
        self.selected_field = 0;
    }

    fn fill_from(&mut self, inputs: &SurveyInputs) {
        for field in &mut self.fields {
            field.value = match field.id {
                FieldId::Age => inputs.age.to_string(),
                FieldId::Sex => inputs.sex.code().to_string(),
                FieldId::Education => inputs.education.to_string(),
                FieldId::Income => inputs.income.to_string(),
                FieldId::Bmi => format!("{:.1}", inputs.bmi),
                FieldId::GenHlth => inputs.gen_hlth.to_string(),
                FieldId::MentHlth => inputs.ment_hlth.to_string(),
                FieldId::PhysHlth => inputs.phys_hlth.to_string(),
                FieldId::HighBp => flag_text(inputs.high_bp),
                FieldId::HighChol => flag_text(inputs.high_chol),
                FieldId::Smoker => flag_text(inputs.smoker),
                FieldId::PhysActivity => flag_text(inputs.phys_activity),
                FieldId::DiffWalk => flag_text(inputs.diff_walk),
            };
        }
    }

    /// Parse and range-check every field.
    ///
    /// # Errors
    /// Returns a message naming the first field that is empty or out of range.
    pub fn to_survey_inputs(&self) -> Result<SurveyInputs, String> {
        let mut inputs = SurveyInputs::default();

        for field in &self.fields {
            match field.kind {
                FieldKind::Flag => {
                    let value = match field.value.as_str() {
                        "1" => true,
                        "0" => false,
                        _ => return Err(format!("{}: Choose yes or no", field.label)),
                    };
                    match field.id {
                        FieldId::HighBp => inputs.high_bp = value,
                        FieldId::HighChol => inputs.high_chol = value,
                        FieldId::Smoker => inputs.smoker = value,
                        FieldId::PhysActivity => inputs.phys_activity = value,
                        FieldId::DiffWalk => inputs.diff_walk = value,
                        _ => {}
                    }
                }
                FieldKind::Code { min, max } => {
                    let value: u8 = field
                        .value
                        .parse()
                        .map_err(|_| format!("{}: Invalid number", field.label))?;
                    if !(min..=max).contains(&value) {
                        return Err(format!(
                            "{}: Value must be between {} and {}",
                            field.label, min, max
                        ));
                    }
                    match field.id {
                        FieldId::Age => inputs.age = value,
                        FieldId::Sex => {
                            inputs.sex = Sex::try_from(value)
                                .map_err(|_| format!("{}: Invalid code", field.label))?;
                        }
                        FieldId::Education => inputs.education = value,
                        FieldId::Income => inputs.income = value,
                        FieldId::GenHlth => inputs.gen_hlth = value,
                        FieldId::MentHlth => inputs.ment_hlth = value,
                        FieldId::PhysHlth => inputs.phys_hlth = value,
                        _ => {}
                    }
                }
                FieldKind::Decimal { min, max } => {
                    let value: f64 = field
                        .value
                        .parse()
                        .map_err(|_| format!("{}: Invalid number", field.label))?;
                    if !value.is_finite() || value < min || value > max {
                        return Err(format!(
                            "{}: Value must be between {} and {}",
                            field.label, min, max
                        ));
                    }
                    inputs.bmi = value;
                }
            }
        }

        Ok(inputs)
    }

    /// Load the sample respondent (high blood pressure, BMI 32.5, fair health,
    /// age 60-64).
    pub fn load_sample_data(&mut self) {
        let sample = SurveyInputs {
            high_bp: true,
            high_chol: false,
            bmi: 32.5,
            smoker: false,
            phys_activity: true,
            gen_hlth: 4,
            ment_hlth: 5,
            phys_hlth: 3,
            diff_walk: false,
            sex: Sex::Male,
            age: 9,
            education: 4,
            income: 5,
        };
        self.fill_from(&sample);
        self.error_message = None;
    }
}

/// Render the survey form
pub fn render_survey_form(f: &mut Frame, area: Rect, state: &SurveyFormState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Form
            Constraint::Length(3), // Footer/error
        ])
        .split(area);

    render_form_header(f, chunks[0]);
    render_form_fields(f, chunks[1], state);
    render_form_footer(f, chunks[2], state);
}

fn render_form_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", ScreeningTheme::text()),
        Span::styled("Diabetes Risk Survey", ScreeningTheme::title()),
        Span::styled(" │ BRFSS health indicators", ScreeningTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(ScreeningTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_form_fields(f: &mut Frame, area: Rect, state: &SurveyFormState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .margin(1)
        .split(area);

    let mut offset = 0;
    for (column, (title, count)) in columns.iter().zip(GROUPS) {
        render_field_group(
            f,
            *column,
            title,
            &state.fields[offset..offset + count],
            offset,
            state.selected_field,
        );
        offset += count;
    }
}

fn render_field_group(
    f: &mut Frame,
    area: Rect,
    title: &str,
    fields: &[FormField],
    offset: usize,
    selected: usize,
) {
    let constraints: Vec<Constraint> = std::iter::once(Constraint::Length(1))
        .chain(fields.iter().map(|_| Constraint::Length(3)))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    f.render_widget(
        Paragraph::new(Span::styled(title, ScreeningTheme::subtitle())),
        chunks[0],
    );

    for (i, field) in fields.iter().enumerate() {
        let is_selected = offset + i == selected;
        let (border_style, title_style) = if is_selected {
            (ScreeningTheme::border_focused(), ScreeningTheme::focused())
        } else {
            (ScreeningTheme::border(), ScreeningTheme::text_secondary())
        };

        let block = Block::default()
            .title(Span::styled(format!(" {} ", field.label), title_style))
            .borders(Borders::ALL)
            .border_style(border_style);

        let value = field.display();
        let value_style = match (field.kind, field.value.as_str()) {
            (FieldKind::Flag, "1") => ScreeningTheme::warning(),
            _ => ScreeningTheme::text(),
        };

        let mut spans = vec![Span::raw(" "), Span::styled(value, value_style)];
        if is_selected {
            let marker = match field.kind {
                FieldKind::Decimal { .. } => "▌",
                _ => "  ◂ ▸",
            };
            spans.push(Span::styled(marker, ScreeningTheme::cursor()));
        }

        f.render_widget(Paragraph::new(Line::from(spans)).block(block), chunks[i + 1]);
    }
}

fn render_form_footer(f: &mut Frame, area: Rect, state: &SurveyFormState) {
    let content = if let Some(err) = &state.error_message {
        Line::from(vec![
            Span::styled("! ", ScreeningTheme::danger()),
            Span::styled(err.clone(), ScreeningTheme::danger()),
        ])
    } else {
        Line::from(vec![
            Span::styled("[↑↓] ", ScreeningTheme::key_hint()),
            Span::styled("Navigate ", ScreeningTheme::key_desc()),
            Span::styled("[←→/Space] ", ScreeningTheme::key_hint()),
            Span::styled("Change ", ScreeningTheme::key_desc()),
            Span::styled("[Enter] ", ScreeningTheme::key_hint()),
            Span::styled("Assess ", ScreeningTheme::key_desc()),
            Span::styled("[S] ", ScreeningTheme::key_hint()),
            Span::styled("Sample ", ScreeningTheme::key_desc()),
            Span::styled("[B] ", ScreeningTheme::key_hint()),
            Span::styled("BMI calculator ", ScreeningTheme::key_desc()),
            Span::styled("[M] ", ScreeningTheme::key_hint()),
            Span::styled("Model info ", ScreeningTheme::key_desc()),
            Span::styled("[Esc] ", ScreeningTheme::key_hint()),
            Span::styled("Quit", ScreeningTheme::key_desc()),
        ])
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(ScreeningTheme::border()),
    );

    f.render_widget(footer, area);
}
