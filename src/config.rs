use std::path::PathBuf;

/// Artifact stems under the models directory; each pairs a `.onnx` graph with
/// a `.meta.json` sidecar.
pub const BINARY_MODEL: &str = "xgb_model_binary";
pub const MULTI_MODEL: &str = "xgb_model_multi";

/// Runtime configuration, read once at startup. Defaults work when running
/// from the repo root with the artifacts in `models/`.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub models_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8080);
        let models_dir = std::env::var("MODELS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("models"));

        Self { port, models_dir }
    }

    pub fn model_path(&self, stem: &str) -> PathBuf {
        self.models_dir.join(format!("{}.onnx", stem))
    }

    pub fn meta_path(&self, stem: &str) -> PathBuf {
        self.models_dir.join(format!("{}.meta.json", stem))
    }
}
