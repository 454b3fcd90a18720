use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineDiag {
    pub python_exe: String,
    pub python_version: String,
    pub paddleocr_version: Option<String>,
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizeIn {
    pub image_path: String,
    pub lang: String,
    pub use_angle_cls: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextCandidate {
    pub text: String,
    pub score: f64,
}

/// One recognized line; candidates ordered best-first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawLine {
    #[serde(default)]
    pub candidates: Vec<TextCandidate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizeOut {
    pub ok: bool,
    #[serde(default)]
    pub lines: Vec<RawLine>,
    #[serde(default)]
    pub error: Option<String>,
}
