//! Model information view.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::adapters::gbdt::GbdtClassifier;
use crate::application::RiskAssessmentService;
use crate::domain::format_risk_percentage;
use crate::ports::ModelMetrics;
use crate::tui::styles::ScreeningTheme;

/// Snapshot of the loaded model for display.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInfo {
    pub algorithm: String,
    pub training_data: String,
    pub metrics: Option<ModelMetrics>,
    pub n_features: usize,
    pub n_trees: usize,
    pub threshold: f64,
    pub fingerprint: String,
    pub feature_names: Vec<String>,
}

impl ModelInfo {
    #[must_use]
    pub fn from_service(service: &RiskAssessmentService<GbdtClassifier>) -> Self {
        let artifact = service.artifact();
        let metadata = artifact.metadata();
        Self {
            algorithm: metadata
                .algorithm
                .clone()
                .unwrap_or_else(|| "Gradient-boosted trees".to_string()),
            training_data: metadata
                .training_data
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
            metrics: metadata.metrics,
            n_features: artifact.schema().len(),
            n_trees: artifact.classifier().n_trees(),
            threshold: service.policy().threshold(),
            fingerprint: artifact.fingerprint().unwrap_or("n/a").to_string(),
            feature_names: artifact.schema().names().to_vec(),
        }
    }
}

fn row<'a>(label: &'a str, value: String) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{label:<16}"), ScreeningTheme::text_secondary()),
        Span::styled(value, ScreeningTheme::text()),
    ])
}

/// Render the model information view
pub fn render_model_info(f: &mut Frame, area: Rect, info: &ModelInfo) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(9), // Model card
            Constraint::Length(7), // Metrics
            Constraint::Min(0),    // Features
            Constraint::Length(3), // Footer
        ])
        .split(area);

    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", ScreeningTheme::text()),
        Span::styled("Model Information", ScreeningTheme::title()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(ScreeningTheme::border()),
    );
    f.render_widget(header, chunks[0]);

    let card = Paragraph::new(vec![
        row("Algorithm", info.algorithm.clone()),
        row("Training data", info.training_data.clone()),
        row("Features", info.n_features.to_string()),
        row("Trees", info.n_trees.to_string()),
        row("Threshold", format_risk_percentage(info.threshold)),
        row("SHA-256", info.fingerprint.clone()),
    ])
    .block(
        Block::default()
            .title(Span::styled(" Model ", ScreeningTheme::subtitle()))
            .borders(Borders::ALL)
            .border_style(ScreeningTheme::border()),
    );
    f.render_widget(card, chunks[1]);

    let metrics = match info.metrics {
        Some(m) => vec![
            row("Accuracy", format_risk_percentage(m.accuracy)),
            row("Precision", format_risk_percentage(m.precision)),
            row("Recall", format_risk_percentage(m.recall)),
            row("F1 score", format_risk_percentage(m.f1)),
        ],
        None => vec![Line::from(Span::styled(
            "No evaluation metrics exported with this model",
            ScreeningTheme::text_muted(),
        ))],
    };
    f.render_widget(
        Paragraph::new(metrics).block(
            Block::default()
                .title(Span::styled(" Performance ", ScreeningTheme::subtitle()))
                .borders(Borders::ALL)
                .border_style(ScreeningTheme::border()),
        ),
        chunks[2],
    );

    let features = Paragraph::new(Line::from(Span::styled(
        info.feature_names.join(", "),
        ScreeningTheme::text_secondary(),
    )))
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .title(Span::styled(" Feature order ", ScreeningTheme::subtitle()))
            .borders(Borders::ALL)
            .border_style(ScreeningTheme::border()),
    );
    f.render_widget(features, chunks[3]);

    let footer = Paragraph::new(Line::from(vec![
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::artifacts::{load_artifacts, LoadOptions};
    use crate::domain::ThresholdPolicy;
    use std::path::Path;
    use std::sync::Arc;

    #[test]
    fn test_info_from_bundled_model() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("models");
        let artifact = load_artifacts(&dir, LoadOptions::default()).expect("bundled model");
        let service = RiskAssessmentService::new(Arc::new(artifact), ThresholdPolicy::default());

        let info = ModelInfo::from_service(&service);
        assert_eq!(info.n_features, 23);
        assert_eq!(info.feature_names.len(), 23);
        assert_eq!(info.feature_names.last().map(String::as_str), Some("Age_GenHlth"));
        assert!(info.n_trees > 0);
        assert_eq!(info.fingerprint.len(), 64);
        assert!(info.metrics.is_some());
        assert_eq!(format_risk_percentage(info.threshold), "%30.00");
    }
}
