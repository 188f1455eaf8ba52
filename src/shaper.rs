use crate::error::{ModelError, PredictError};
use crate::model::Classifier;
use crate::types::{failure_class_name, FeatureRecord, PredictionResult, RankedClass, TaskKind};

/// How many ranked classes a multi-class result carries.
const TOP_N: usize = 3;

/// Single-shot transformation of raw model output into a user-facing result.
/// No retries, no caching; the only side effects are the two model calls.
pub fn shape_result(
    model: &dyn Classifier,
    task: TaskKind,
    readings: &FeatureRecord,
) -> Result<PredictionResult, PredictError> {
    // Fail fast on the zero defaults a numeric input widget starts from.
    // `!(v > 0)` also rejects NaN.
    if readings.values().iter().any(|v| !(*v > 0.0)) {
        return Err(PredictError::InvalidInput(
            "all sensor readings must be greater than zero".to_string(),
        ));
    }

    let index = model.classify(readings)?;
    let proba = model.classify_proba(readings)?;

    match task {
        TaskKind::Binary => {
            let failure_probability = proba.get(1).copied().ok_or_else(|| {
                ModelError::UnexpectedOutput(format!(
                    "binary distribution has {} entries",
                    proba.len()
                ))
            })?;

            Ok(PredictionResult::Binary {
                label: if index == 1 { "Yes" } else { "No" },
                failure_probability,
            })
        }
        TaskKind::MultiClass => {
            let label = failure_class_name(index).ok_or_else(|| {
                ModelError::UnexpectedOutput(format!("class index {} out of range", index))
            })?;

            // Stable sort: equal probabilities keep original class order, so
            // the ranking is deterministic.
            let mut ranked: Vec<usize> = (0..proba.len()).collect();
            ranked.sort_by(|a, b| proba[*b].total_cmp(&proba[*a]));

            if let Some(&top) = ranked.first() {
                if top != index {
                    tracing::warn!(
                        "predicted class {} is not the top-ranked class {}",
                        index,
                        top
                    );
                }
            }

            let top_classes = ranked
                .iter()
                .take(TOP_N)
                .map(|i| {
                    failure_class_name(*i)
                        .map(|name| RankedClass {
                            name,
                            probability: proba[*i],
                        })
                        .ok_or_else(|| {
                            ModelError::UnexpectedOutput(format!(
                                "distribution entry {} has no class label",
                                i
                            ))
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;

            Ok(PredictionResult::MultiClass { label, top_classes })
        }
    }
}
