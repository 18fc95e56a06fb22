use std::fmt::Display;
use std::fmt::Formatter;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

/// A non-fatal message reported back to the host alongside a load result.
///
/// Usually but not always this is linked to a source-code location.
#[derive(Debug, Deserialize, PartialEq, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
  /// A summary user-facing message
  pub text: String,

  /// Where in the source this diagnostic points to
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub location: Option<Location>,

  /// Tool specific metadata
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub detail: Option<DiagnosticDetail>,
}

#[derive(Debug, Deserialize, PartialEq, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Location {
  pub file: PathBuf,

  /// 1-based line number
  pub line: usize,

  /// 0-based column number
  pub column: usize,

  /// The source text of the line this location points to
  pub line_text: String,
}

#[derive(Debug, Deserialize, PartialEq, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticDetail {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub deprecation: Option<String>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub stack: Option<String>,
}

impl Diagnostic {
  /// A diagnostic without a source location
  pub fn message(text: impl Into<String>) -> Self {
    Self {
      text: text.into(),
      ..Default::default()
    }
  }
}

impl Display for Diagnostic {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match &self.location {
      Some(location) => write!(
        f,
        "{}:{}:{}: {}",
        location.file.display(),
        location.line,
        location.column,
        self.text
      ),
      None => f.write_str(&self.text),
    }
  }
}
