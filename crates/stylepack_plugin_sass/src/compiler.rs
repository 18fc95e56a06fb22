use std::fmt::Debug;
use std::path::{Path, PathBuf};

use stylepack_sourcemap::SourceMap;
use url::Url;

use crate::SassError;

/// Resolves import urls the compiler cannot find on its own
pub trait FileImporter: Debug {
  /// Returns `None` when the url is not handled by this importer, so the compiler can fall back
  /// to its default resolution.
  fn find_file_url(&self, url: &str, from_dir: &Path) -> Option<Url>;
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompileOptions {
  pub source_map: bool,

  /// Embed the original sources in the `sourcesContent` of the source map
  pub source_map_include_sources: bool,

  /// Silence warnings emitted from dependencies
  pub quiet_deps: bool,

  /// Deprecation ids whose warnings are dropped
  pub silence_deprecations: Vec<String>,
}

impl CompileOptions {
  pub fn is_silenced(&self, warning: &CompilerWarning) -> bool {
    warning.deprecation.as_ref().is_some_and(|deprecation| {
      self
        .silence_deprecations
        .iter()
        .any(|silenced| silenced == deprecation)
    })
  }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CompileResult {
  pub css: String,

  /// Every file the compiler read, including the entry
  pub loaded_urls: Vec<Url>,

  pub source_map: Option<SourceMap>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SourcePosition {
  /// 1-based
  pub line: usize,
  /// 0-based
  pub column: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WarningSpan {
  pub url: Option<Url>,
  pub start: SourcePosition,
  pub text: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompilerWarning {
  pub message: String,
  pub span: Option<WarningSpan>,
  pub deprecation: Option<String>,
  pub stack: Option<String>,
}

/// A synchronous stylesheet compiler
pub trait StylesheetCompiler: Debug + Send + Sync {
  fn compile(
    &self,
    path: &Path,
    options: &CompileOptions,
    importer: &dyn FileImporter,
    on_warning: &mut dyn FnMut(CompilerWarning),
  ) -> Result<CompileResult, SassError>;
}

/// Converts the urls reported by a compiler back into file paths
pub(crate) fn url_to_path(url: &Url) -> Option<PathBuf> {
  if url.scheme() != "file" {
    return None;
  }

  url.to_file_path().ok()
}
