use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceMapError {
  #[error("Invalid source map JSON: {0}")]
  Json(#[from] serde_json::Error),

  #[error("Invalid base64 in source map data url: {0}")]
  Base64(#[from] base64::DecodeError),

  #[error("Unsupported source map data url: {0}")]
  UnsupportedDataUrl(String),
}
