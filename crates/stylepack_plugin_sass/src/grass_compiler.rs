use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::path::{Component, Path, PathBuf};

use codemap::SpanLoc;
use indexmap::IndexMap;
use stylepack_filesystem::FileSystemRef;
use stylepack_sourcemap::SourceMap;
use url::Url;

use crate::{
  CompileOptions, CompileResult, CompilerWarning, FileImporter, SassError, SourcePosition,
  StylesheetCompiler, WarningSpan,
};

/// [`StylesheetCompiler`] backed by the grass Sass compiler
#[derive(Debug)]
pub struct GrassCompiler {
  fs: FileSystemRef,
}

impl GrassCompiler {
  pub fn new(fs: FileSystemRef) -> Self {
    Self { fs }
  }
}

impl StylesheetCompiler for GrassCompiler {
  #[tracing::instrument(level = "debug", skip_all, fields(path = %path.display()))]
  fn compile(
    &self,
    path: &Path,
    options: &CompileOptions,
    importer: &dyn FileImporter,
    on_warning: &mut dyn FnMut(CompilerWarning),
  ) -> Result<CompileResult, SassError> {
    let fs = ImportingFs::new(self.fs.clone(), importer);
    let logger = WarningCollector::new(&fs, options);

    let css = {
      let grass_options = grass::Options::default()
        .fs(&fs)
        .logger(&logger)
        .style(grass::OutputStyle::Expanded);

      grass::from_path(path, &grass_options)
    };

    // Warnings are reported even when compilation fails
    for warning in logger.into_warnings() {
      on_warning(warning);
    }

    let css = css.map_err(|error| SassError::Compile {
      path: path.to_path_buf(),
      message: fs.rewrite_paths(error.to_string()),
    })?;

    let loaded = fs.into_loaded();

    let source_map = options.source_map.then(|| {
      let mut source_map = SourceMap::new();
      for (file, contents) in &loaded {
        source_map.sources.push(file_url(file));
        if options.source_map_include_sources {
          source_map
            .sources_content
            .push(String::from_utf8_lossy(contents).into_owned());
        }
      }
      source_map
    });

    let loaded_urls = loaded
      .keys()
      .filter_map(|file| Url::from_file_path(file).ok())
      .collect();

    Ok(CompileResult {
      css,
      loaded_urls,
      source_map,
    })
  }
}

fn file_url(path: &Path) -> String {
  Url::from_file_path(path)
    .map(String::from)
    .unwrap_or_else(|_| path.to_string_lossy().into_owned())
}

/// File system handed to grass
///
/// grass looks imports up relative to the importing file, so `@import "~pkg/a"` from
/// `/app/main.scss` is probed as `/app/~pkg/a.scss`, `/app/~pkg/_a.scss` and so on. Any path with
/// a component starting with `~` is redirected through the importer.
#[derive(Debug)]
struct ImportingFs<'a> {
  fs: FileSystemRef,
  importer: &'a dyn FileImporter,
  /// Probed path -> redirected path
  redirects: RefCell<HashMap<PathBuf, Option<PathBuf>>>,
  /// Files read so far with their contents, in read order
  loaded: RefCell<IndexMap<PathBuf, Vec<u8>>>,
}

impl<'a> ImportingFs<'a> {
  fn new(fs: FileSystemRef, importer: &'a dyn FileImporter) -> Self {
    Self {
      fs,
      importer,
      redirects: Default::default(),
      loaded: Default::default(),
    }
  }

  fn resolve(&self, path: &Path) -> PathBuf {
    if let Some(redirect) = self.redirects.borrow().get(path) {
      return redirect.clone().unwrap_or_else(|| path.to_path_buf());
    }

    let redirect = self.redirect(path);
    let resolved = redirect.clone().unwrap_or_else(|| path.to_path_buf());
    self.redirects.borrow_mut().insert(path.to_path_buf(), redirect);
    resolved
  }

  /// Redirects a probed path through the importer
  ///
  /// The specifier starts at the last `~` component. A `~` import inside a package reached through
  /// `~` is probed below the importing file's `~` path, e.g. `/app/~a/~b/_y.scss`, so the
  /// directory before that component is itself resolved to find the real importing directory.
  fn redirect(&self, path: &Path) -> Option<PathBuf> {
    let components = path.components().collect::<Vec<_>>();
    let position = components.iter().rposition(|component| {
      matches!(component, Component::Normal(name) if name.to_string_lossy().starts_with('~'))
    })?;

    let specifier = components[position..]
      .iter()
      .map(|component| component.as_os_str().to_str())
      .collect::<Option<Vec<_>>>()?
      .join("/");

    let from_dir = self.real_dir(&components[..position].iter().collect::<PathBuf>());

    let url = self.importer.find_file_url(&specifier, &from_dir)?;
    url.to_file_path().ok()
  }

  /// Maps a directory that may contain `~` components to the directory it stands for on disk
  fn real_dir(&self, dir: &Path) -> PathBuf {
    let has_tilde = dir
      .components()
      .any(|component| component.as_os_str().to_string_lossy().starts_with('~'));

    if !has_tilde {
      return dir.to_path_buf();
    }

    // A file inside `dir` has already been read through a redirect, e.g. `/app/~a/_x.scss`
    let sibling = self.redirects.borrow().iter().find_map(|(probed, redirect)| {
      if probed.parent() != Some(dir) {
        return None;
      }

      redirect.as_ref()?.parent().map(Path::to_path_buf)
    });

    sibling.unwrap_or_else(|| self.resolve(dir))
  }

  /// Replaces the probed `~` paths in a compiler message with the files they were redirected to
  fn rewrite_paths(&self, message: String) -> String {
    let map = self.redirects.borrow();
    let mut redirects = map
      .iter()
      .filter_map(|(probed, redirect)| Some((probed.to_string_lossy(), redirect.as_ref()?)))
      .collect::<Vec<_>>();

    // Longest first so a probed path never clobbers a longer one it prefixes
    redirects.sort_by_key(|(probed, _)| std::cmp::Reverse(probed.len()));

    redirects
      .into_iter()
      .fold(message, |message, (probed, real)| {
        message.replace(&*probed, &real.to_string_lossy())
      })
  }

  /// Whether `path` was reached through the importer or lives inside `node_modules`
  fn is_dependency(&self, path: &Path) -> bool {
    let redirected = self
      .redirects
      .borrow()
      .get(path)
      .is_some_and(|redirect| redirect.is_some());

    redirected
      || self
        .resolve(path)
        .components()
        .any(|component| component.as_os_str() == "node_modules")
  }

  fn into_loaded(self) -> IndexMap<PathBuf, Vec<u8>> {
    self.loaded.into_inner()
  }
}

impl grass::Fs for ImportingFs<'_> {
  fn is_dir(&self, path: &Path) -> bool {
    self.fs.is_dir(&self.resolve(path))
  }

  fn is_file(&self, path: &Path) -> bool {
    self.fs.is_file(&self.resolve(path))
  }

  fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
    let resolved = self.resolve(path);
    let contents = self.fs.read(&resolved)?;

    self
      .loaded
      .borrow_mut()
      .entry(resolved)
      .or_insert_with(|| contents.clone());

    Ok(contents)
  }
}

/// `@warn "text"` reaches the logger with its quotes, a lone quoted string is reported bare
fn unquote(message: &str) -> &str {
  for quote in ['"', '\''] {
    if let Some(inner) = message
      .strip_prefix(quote)
      .and_then(|message| message.strip_suffix(quote))
    {
      if !inner.contains(quote) {
        return inner;
      }
    }
  }

  message
}

/// Collects `@warn` output as [`CompilerWarning`]s
struct WarningCollector<'a> {
  fs: &'a ImportingFs<'a>,
  options: &'a CompileOptions,
  warnings: RefCell<Vec<CompilerWarning>>,
}

impl<'a> WarningCollector<'a> {
  fn new(fs: &'a ImportingFs<'a>, options: &'a CompileOptions) -> Self {
    Self {
      fs,
      options,
      warnings: Default::default(),
    }
  }

  fn into_warnings(self) -> Vec<CompilerWarning> {
    self.warnings.into_inner()
  }
}

impl std::fmt::Debug for WarningCollector<'_> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("WarningCollector").finish()
  }
}

impl grass::Logger for WarningCollector<'_> {
  fn debug(&self, location: SpanLoc, message: &str) {
    tracing::debug!(
      "{}:{} DEBUG: {}",
      location.file.name(),
      location.begin.line + 1,
      message
    );
  }

  fn warn(&self, location: SpanLoc, message: &str) {
    let file = PathBuf::from(location.file.name());

    if self.options.quiet_deps && self.fs.is_dependency(&file) {
      tracing::trace!("Dropping warning from dependency {}", file.display());
      return;
    }

    let warning = CompilerWarning {
      message: unquote(message).to_string(),
      span: Some(WarningSpan {
        url: Url::from_file_path(self.fs.resolve(&file)).ok(),
        start: SourcePosition {
          line: location.begin.line + 1,
          column: location.begin.column,
        },
        text: location
          .file
          .source()
          .lines()
          .nth(location.begin.line)
          .unwrap_or_default()
          .to_string(),
      }),
      deprecation: None,
      stack: None,
    };

    if self.options.is_silenced(&warning) {
      return;
    }

    self.warnings.borrow_mut().push(warning);
  }
}
