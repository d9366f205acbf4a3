use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum FxError {
    #[error("no global window")]
    NoWindow,

    #[error("window has no document")]
    NoDocument,

    #[error("javascript error: {0}")]
    Js(String),

    #[error("invalid root margin: {0:?}")]
    InvalidMargin(String),

    #[error("invalid data-landing-fx config: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}

impl From<JsValue> for FxError {
    fn from(value: JsValue) -> Self {
        let message = value
            .as_string()
            .unwrap_or_else(|| format!("{:?}", value));
        FxError::Js(message)
    }
}

pub type Result<T> = std::result::Result<T, FxError>;
