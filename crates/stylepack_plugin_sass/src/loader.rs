use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexSet;
use stylepack_core::{LoadResult, Loader, OnLoad, OnLoadArgs};

use crate::compiler::url_to_path;
use crate::{
  warning_to_diagnostic, CompileOptions, SassPluginOptions, StylesheetCompiler, TildeImporter,
};

/// Load callback that compiles a stylesheet into CSS
#[derive(Debug)]
pub struct SassLoader {
  options: Arc<SassPluginOptions>,
  source_map: bool,
  compiler: Arc<dyn StylesheetCompiler>,
  importer: TildeImporter,
}

impl SassLoader {
  pub fn new(
    options: Arc<SassPluginOptions>,
    source_map: bool,
    compiler: Arc<dyn StylesheetCompiler>,
    importer: TildeImporter,
  ) -> Self {
    Self {
      options,
      source_map,
      compiler,
      importer,
    }
  }
}

#[async_trait]
impl OnLoad for SassLoader {
  #[tracing::instrument(level = "debug", skip_all, fields(plugin = "sass", path = %args.path.display()))]
  async fn load(&self, args: OnLoadArgs) -> Result<LoadResult, anyhow::Error> {
    let path = args.path;
    let resolve_dir = path
      .parent()
      .map(|parent| parent.to_path_buf())
      .unwrap_or_default();

    let compile_options = CompileOptions {
      source_map: self.source_map,
      source_map_include_sources: true,
      quiet_deps: self.options.quiet_deps,
      silence_deprecations: self.options.silence_deprecations.clone(),
    };

    let mut warnings = Vec::new();
    let result = self.compiler.compile(
      &path,
      &compile_options,
      &self.importer,
      &mut |warning| warnings.push(warning_to_diagnostic(warning, &path)),
    )?;

    let mut css = result.css;

    if let Some(source_map) = &result.source_map {
      let comment = source_map.to_inline_comment()?;
      css.truncate(css.trim_end_matches('\n').len());
      css.push('\n');
      css.push_str(&comment);
    }

    if let Some(transform) = &self.options.transform {
      css = transform.transform(css, &resolve_dir, &path).await?;
    }

    let mut watch_files = IndexSet::new();
    watch_files.insert(path.clone());
    watch_files.extend(result.loaded_urls.iter().filter_map(url_to_path));

    tracing::debug!(
      warnings = warnings.len(),
      watch_files = watch_files.len(),
      "Compiled stylesheet"
    );

    Ok(LoadResult {
      contents: css,
      loader: Loader::Css,
      resolve_dir,
      warnings,
      watch_files: watch_files.into_iter().collect::<Vec<PathBuf>>(),
    })
  }
}

#[cfg(test)]
mod tests {
  use std::path::Path;
  use std::sync::Mutex;

  use async_trait::async_trait;
  use pretty_assertions::assert_eq;
  use stylepack_core::resolver::MockModuleResolver;
  use stylepack_core::{Diagnostic, Location};
  use stylepack_sourcemap::{find_sourcemap_url, SourceMap};
  use url::Url;

  use super::*;
  use crate::{
    CompileResult, CompilerWarning, CssTransform, FileImporter, FnTransform, SassError,
    SourcePosition, WarningSpan,
  };

  /// Replays a canned result and records the options it was called with
  #[derive(Debug, Default)]
  struct FakeCompiler {
    css: String,
    loaded_urls: Vec<Url>,
    source_map: Option<SourceMap>,
    warnings: Vec<CompilerWarning>,
    error: Option<String>,
    received: Mutex<Option<CompileOptions>>,
  }

  impl StylesheetCompiler for FakeCompiler {
    fn compile(
      &self,
      path: &Path,
      options: &CompileOptions,
      _importer: &dyn FileImporter,
      on_warning: &mut dyn FnMut(CompilerWarning),
    ) -> Result<CompileResult, SassError> {
      *self.received.lock().unwrap() = Some(options.clone());

      for warning in &self.warnings {
        on_warning(warning.clone());
      }

      if let Some(message) = &self.error {
        return Err(SassError::Compile {
          path: path.to_path_buf(),
          message: message.clone(),
        });
      }

      Ok(CompileResult {
        css: self.css.clone(),
        loaded_urls: self.loaded_urls.clone(),
        source_map: self.source_map.clone(),
      })
    }
  }

  fn loader(compiler: Arc<FakeCompiler>, options: SassPluginOptions, source_map: bool) -> SassLoader {
    SassLoader::new(
      Arc::new(options),
      source_map,
      compiler,
      TildeImporter::new(Arc::new(MockModuleResolver::new())),
    )
  }

  async fn load(loader: &SassLoader, path: &str) -> Result<LoadResult, anyhow::Error> {
    loader
      .load(OnLoadArgs {
        path: PathBuf::from(path),
      })
      .await
  }

  fn file_url(path: &str) -> Url {
    Url::from_file_path(path).unwrap()
  }

  #[tokio::test]
  async fn returns_compiled_css() {
    let compiler = Arc::new(FakeCompiler {
      css: String::from("a {\n  color: red;\n}\n"),
      loaded_urls: vec![file_url("/styles/main.scss")],
      ..Default::default()
    });

    let result = load(
      &loader(compiler, SassPluginOptions::default(), false),
      "/styles/main.scss",
    )
    .await
    .unwrap();

    assert_eq!(
      result,
      LoadResult {
        contents: String::from("a {\n  color: red;\n}\n"),
        loader: Loader::Css,
        resolve_dir: PathBuf::from("/styles"),
        warnings: Vec::new(),
        watch_files: vec![PathBuf::from("/styles/main.scss")],
      }
    );
  }

  #[tokio::test]
  async fn passes_plugin_options_to_compiler() {
    let compiler = Arc::new(FakeCompiler::default());
    let options = SassPluginOptions {
      quiet_deps: true,
      silence_deprecations: vec![String::from("import")],
      ..Default::default()
    };

    load(&loader(compiler.clone(), options, true), "/styles/main.scss")
      .await
      .unwrap();

    assert_eq!(
      compiler.received.lock().unwrap().clone(),
      Some(CompileOptions {
        source_map: true,
        source_map_include_sources: true,
        quiet_deps: true,
        silence_deprecations: vec![String::from("import")],
      })
    );
  }

  #[tokio::test]
  async fn converts_warnings_into_diagnostics() {
    let compiler = Arc::new(FakeCompiler {
      warnings: vec![
        CompilerWarning {
          message: String::from("No span here"),
          ..Default::default()
        },
        CompilerWarning {
          message: String::from("In the entry"),
          span: Some(WarningSpan {
            url: None,
            start: SourcePosition { line: 3, column: 4 },
            text: String::from("    @warn \"In the entry\";"),
          }),
          ..Default::default()
        },
        CompilerWarning {
          message: String::from("In a partial"),
          span: Some(WarningSpan {
            url: Some(Url::parse("file:///styles/my%20dir/_partial.scss").unwrap()),
            start: SourcePosition { line: 1, column: 0 },
            text: String::from("@warn \"In a partial\";"),
          }),
          ..Default::default()
        },
      ],
      ..Default::default()
    });

    let result = load(
      &loader(compiler, SassPluginOptions::default(), false),
      "/styles/main.scss",
    )
    .await
    .unwrap();

    assert_eq!(result.warnings.len(), 3);
    assert_eq!(
      result.warnings[0],
      Diagnostic::message("sass warning: No span here")
    );
    assert_eq!(
      result.warnings[1].location,
      Some(Location {
        file: PathBuf::from("/styles/main.scss"),
        line: 3,
        column: 4,
        line_text: String::from("    @warn \"In the entry\";"),
      })
    );
    assert_eq!(
      result.warnings[2]
        .location
        .as_ref()
        .map(|location| location.file.clone()),
      Some(PathBuf::from("/styles/my dir/_partial.scss"))
    );
  }

  #[tokio::test]
  async fn appends_a_single_inline_source_map() {
    let mut source_map = SourceMap::new();
    source_map.sources = vec![String::from("file:///styles/main.scss")];
    source_map.sources_content = vec![String::from("a { color: red; }")];

    let compiler = Arc::new(FakeCompiler {
      css: String::from("a {\n  color: red;\n}\n\n"),
      source_map: Some(source_map.clone()),
      ..Default::default()
    });

    let result = load(
      &loader(compiler, SassPluginOptions::default(), true),
      "/styles/main.scss",
    )
    .await
    .unwrap();

    assert!(result
      .contents
      .starts_with("a {\n  color: red;\n}\n/*# sourceMappingURL="));
    assert_eq!(result.contents.matches("sourceMappingURL").count(), 1);

    let found = find_sourcemap_url(&result.contents).unwrap();
    assert_eq!(SourceMap::from_data_url(&found.url).unwrap(), source_map);
  }

  #[tokio::test]
  async fn omits_comment_without_source_map() {
    let compiler = Arc::new(FakeCompiler {
      css: String::from("a {\n  color: red;\n}\n"),
      ..Default::default()
    });

    let result = load(
      &loader(compiler, SassPluginOptions::default(), false),
      "/styles/main.scss",
    )
    .await
    .unwrap();

    assert!(!result.contents.contains("sourceMappingURL"));
  }

  #[tokio::test]
  async fn applies_transform_to_css() {
    let compiler = Arc::new(FakeCompiler {
      css: String::from("a {}\n"),
      ..Default::default()
    });

    let received = Arc::new(Mutex::new(None));
    let transform_received = received.clone();
    let options = SassPluginOptions {
      transform: Some(Arc::new(FnTransform(
        move |css: String, resolve_dir: &Path, file_path: &Path| {
          *transform_received.lock().unwrap() =
            Some((css, resolve_dir.to_path_buf(), file_path.to_path_buf()));
          Ok(String::from("b {}"))
        },
      ))),
      ..Default::default()
    };

    let result = load(&loader(compiler, options, false), "/styles/main.scss")
      .await
      .unwrap();

    assert_eq!(result.contents, "b {}");
    assert_eq!(
      received.lock().unwrap().clone(),
      Some((
        String::from("a {}\n"),
        PathBuf::from("/styles"),
        PathBuf::from("/styles/main.scss"),
      ))
    );
  }

  /// Yields to the runtime before prefixing the CSS with a banner
  #[derive(Debug)]
  struct BannerTransform;

  #[async_trait]
  impl CssTransform for BannerTransform {
    async fn transform(
      &self,
      css: String,
      _resolve_dir: &Path,
      file_path: &Path,
    ) -> Result<String, anyhow::Error> {
      tokio::task::yield_now().await;
      Ok(format!("/* {} */\n{css}", file_path.display()))
    }
  }

  #[tokio::test]
  async fn awaits_async_transforms() {
    let compiler = Arc::new(FakeCompiler {
      css: String::from("a {}\n"),
      ..Default::default()
    });
    let options = SassPluginOptions {
      transform: Some(Arc::new(BannerTransform)),
      ..Default::default()
    };

    let result = load(&loader(compiler, options, false), "/styles/main.scss")
      .await
      .unwrap();

    assert_eq!(result.contents, "/* /styles/main.scss */\na {}\n");
  }

  #[tokio::test]
  async fn propagates_transform_errors() {
    let compiler = Arc::new(FakeCompiler::default());
    let options = SassPluginOptions {
      transform: Some(Arc::new(FnTransform(|_: String, _: &Path, _: &Path| {
        Err(anyhow::anyhow!("postcss exploded"))
      }))),
      ..Default::default()
    };

    let error = load(&loader(compiler, options, false), "/styles/main.scss")
      .await
      .unwrap_err();

    assert_eq!(error.to_string(), "postcss exploded");
  }

  #[tokio::test]
  async fn propagates_compile_errors() {
    let compiler = Arc::new(FakeCompiler {
      error: Some(String::from("expected \"}\".")),
      ..Default::default()
    });

    let error = load(
      &loader(compiler, SassPluginOptions::default(), false),
      "/styles/main.scss",
    )
    .await
    .unwrap_err();

    assert!(matches!(
      error.downcast_ref::<SassError>(),
      Some(SassError::Compile { .. })
    ));
  }

  #[tokio::test]
  async fn watch_files_start_with_entry_and_are_unique() {
    let compiler = Arc::new(FakeCompiler {
      loaded_urls: vec![
        file_url("/styles/main.scss"),
        file_url("/styles/_a.scss"),
        file_url("/styles/_b.scss"),
        file_url("/styles/_a.scss"),
        Url::parse("https://example.com/remote.scss").unwrap(),
      ],
      ..Default::default()
    });

    let result = load(
      &loader(compiler, SassPluginOptions::default(), false),
      "/styles/main.scss",
    )
    .await
    .unwrap();

    assert_eq!(
      result.watch_files,
      vec![
        PathBuf::from("/styles/main.scss"),
        PathBuf::from("/styles/_a.scss"),
        PathBuf::from("/styles/_b.scss"),
      ]
    );
  }
}
