use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::SourceMapError;

const DATA_URL_PREFIX: &str = "data:application/json;charset=utf-8;base64,";

/// A version 3 source map, as produced by a stylesheet compiler
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMap {
  pub version: u8,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub file: Option<String>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source_root: Option<String>,

  pub sources: Vec<String>,

  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub sources_content: Vec<String>,

  #[serde(default)]
  pub names: Vec<String>,

  pub mappings: String,
}

impl SourceMap {
  pub fn new() -> Self {
    Self {
      version: 3,
      ..Default::default()
    }
  }

  pub fn to_json(&self) -> Result<String, SourceMapError> {
    Ok(serde_json::to_string(self)?)
  }

  /// Decodes a base64 `data:application/json` url
  ///
  /// The charset parameter is optional, any other encoding is rejected.
  pub fn from_data_url(url: &str) -> Result<Self, SourceMapError> {
    let Some(rest) = url.strip_prefix("data:application/json") else {
      return Err(SourceMapError::UnsupportedDataUrl(url.to_string()));
    };

    let Some((params, data)) = rest.split_once(',') else {
      return Err(SourceMapError::UnsupportedDataUrl(url.to_string()));
    };

    if !params.ends_with(";base64") {
      return Err(SourceMapError::UnsupportedDataUrl(url.to_string()));
    }

    let bytes = BASE64_STANDARD.decode(data)?;

    Ok(serde_json::from_slice(&bytes)?)
  }

  pub fn to_data_url(&self) -> Result<String, SourceMapError> {
    let json = self.to_json()?;

    Ok(format!(
      "{DATA_URL_PREFIX}{}",
      BASE64_STANDARD.encode(json.as_bytes())
    ))
  }

  /// The `/*# sourceMappingURL=... */` comment that embeds this map into CSS
  pub fn to_inline_comment(&self) -> Result<String, SourceMapError> {
    Ok(format!("/*# sourceMappingURL={} */", self.to_data_url()?))
  }
}
