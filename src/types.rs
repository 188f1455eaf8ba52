use serde::{Deserialize, Serialize};

// ---------- Feature layout ----------

pub const FEATURE_COUNT: usize = 5;

/// Canonical sensor field order. The form, the shaper and the model metas all
/// speak these names; the models' own `feat_list` decides wire order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "air_temperature",
    "process_temperature",
    "rotational_speed",
    "torque",
    "tool_wear",
];

/// One submission's readings, addressable by canonical field name.
/// Built fresh per request; never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureRecord {
    values: [f32; FEATURE_COUNT],
}

impl FeatureRecord {
    pub fn new(values: [f32; FEATURE_COUNT]) -> Self {
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<f32> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|i| self.values[i])
    }

    pub fn values(&self) -> &[f32; FEATURE_COUNT] {
        &self.values
    }
}

// ---------- Failure classes ----------

/// Fixed class-index -> display-name table for the multi-class model.
pub const FAILURE_CLASSES: [&str; 5] = [
    "No Failure",
    "Power Failure",
    "Overstrain Failure",
    "Heat Dissipation Failure",
    "Tool Wear Failure",
];

pub fn failure_class_name(index: usize) -> Option<&'static str> {
    FAILURE_CLASSES.get(index).copied()
}

// ---------- Task / result types ----------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Binary,
    MultiClass,
}

/// One ranked (failure type, probability) pair in a multi-class result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedClass {
    pub name: &'static str,
    pub probability: f32,
}

/// Shaped model output, one variant per task kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PredictionResult {
    Binary {
        label: &'static str,
        failure_probability: f32,
    },
    MultiClass {
        label: &'static str,
        top_classes: Vec<RankedClass>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_record_named_access() {
        let record = FeatureRecord::new([300.0, 310.0, 1500.0, 40.0, 10.0]);
        assert_eq!(record.get("air_temperature"), Some(300.0));
        assert_eq!(record.get("tool_wear"), Some(10.0));
        assert_eq!(record.get("humidity"), None);
    }

    #[test]
    fn test_failure_class_table() {
        assert_eq!(failure_class_name(0), Some("No Failure"));
        assert_eq!(failure_class_name(1), Some("Power Failure"));
        assert_eq!(failure_class_name(2), Some("Overstrain Failure"));
        assert_eq!(failure_class_name(3), Some("Heat Dissipation Failure"));
        assert_eq!(failure_class_name(4), Some("Tool Wear Failure"));
        assert_eq!(failure_class_name(5), None);
    }

    #[test]
    fn test_task_kind_wire_spelling() {
        let binary: TaskKind = serde_json::from_str("\"binary\"").unwrap();
        assert_eq!(binary, TaskKind::Binary);
        let multi: TaskKind = serde_json::from_str("\"multi_class\"").unwrap();
        assert_eq!(multi, TaskKind::MultiClass);
        assert!(serde_json::from_str::<TaskKind>("\"regression\"").is_err());
    }
}
