use serde::Serialize;

use crate::types::PredictionResult;

/// Presentation state the front-end maps to styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Success,
    Warning,
}

/// Headless render of a prediction: everything a front-end needs to display,
/// nothing about how it is displayed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayReport {
    pub headline: String,
    pub severity: Severity,
    pub lines: Vec<String>,
}

/// Probabilities are shown with 2-decimal precision throughout.
pub fn report(result: &PredictionResult) -> DisplayReport {
    match result {
        PredictionResult::Binary {
            label,
            failure_probability,
        } => DisplayReport {
            headline: format!("Failure Prediction: {}", label),
            severity: if *label == "Yes" {
                Severity::Warning
            } else {
                Severity::Success
            },
            lines: vec![format!("Probability of Failure: {:.2}", failure_probability)],
        },
        PredictionResult::MultiClass { label, top_classes } => {
            let mut lines = vec!["Top Failure Predictions:".to_string()];
            for ranked in top_classes {
                lines.push(format!("{}: {:.2}", ranked.name, ranked.probability));
            }

            DisplayReport {
                headline: format!("Predicted Failure Type: {}", label),
                severity: if *label == "No Failure" {
                    Severity::Success
                } else {
                    Severity::Warning
                },
                lines,
            }
        }
    }
}
