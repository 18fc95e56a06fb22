use std::path::PathBuf;

use stylepack_sourcemap::SourceMapError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SassError {
  #[error("Failed to compile {}: {message}", .path.display())]
  Compile { path: PathBuf, message: String },

  #[error("Failed to read {}: {source}", .path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Invalid sass config in {}: {source}", .path.display())]
  InvalidConfig {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("Invalid filter pattern: {0}")]
  InvalidFilter(#[from] regex::Error),

  #[error(transparent)]
  SourceMap(#[from] SourceMapError),
}
