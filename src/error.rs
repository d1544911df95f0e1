use thiserror::Error;

#[derive(Debug, Error)]
pub enum VizError {
    #[error("invalid scene config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("invalid scene config: {0}")]
    InvalidValue(String),

    #[error("element not found: {0}")]
    MissingElement(String),

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("shader error: {0}")]
    Shader(String),

    #[error("graphics context lost")]
    ContextLost,
}

pub type Result<T> = std::result::Result<T, VizError>;

#[cfg(target_arch = "wasm32")]
impl From<VizError> for wasm_bindgen::JsValue {
    fn from(e: VizError) -> Self {
        js_sys::Error::new(&e.to_string()).into()
    }
}
