use std::path::Path;

use stylepack_core::{Diagnostic, DiagnosticDetail, Location};

use crate::compiler::url_to_path;
use crate::CompilerWarning;

/// Translates a compiler warning into a host diagnostic
///
/// Warnings without a span keep their message and gain a `sass warning: ` prefix. Spanned warnings
/// point at the span start, in the file being compiled when the span has no url.
pub fn warning_to_diagnostic(warning: CompilerWarning, path: &Path) -> Diagnostic {
  let Some(span) = warning.span else {
    return Diagnostic::message(format!("sass warning: {}", warning.message));
  };

  let file = span
    .url
    .as_ref()
    .and_then(url_to_path)
    .unwrap_or_else(|| path.to_path_buf());

  Diagnostic {
    text: warning.message,
    location: Some(Location {
      file,
      line: span.start.line,
      column: span.start.column,
      line_text: span.text,
    }),
    detail: Some(DiagnosticDetail {
      deprecation: warning.deprecation,
      stack: warning.stack,
    }),
  }
}
