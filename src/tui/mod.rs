//! TUI module: Terminal User Interface using Ratatui.
//!
//! Screens:
//! - Survey form
//! - Assessment result
//! - BMI calculator
//! - Model information

mod app;
mod styles;
mod ui;

pub use app::App;
pub use styles::ScreeningTheme;
