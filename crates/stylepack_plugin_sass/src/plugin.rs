use std::sync::Arc;

use stylepack_core::{ModuleResolverRef, NodeModulesResolver, Plugin, PluginBuild};
use stylepack_filesystem::os_file_system::OsFileSystem;
use stylepack_filesystem::FileSystemRef;

use crate::{GrassCompiler, SassLoader, SassPluginOptions, StylesheetCompiler, TildeImporter};

/// Registers a [`SassLoader`] for every path matching the configured filter
#[derive(Debug)]
pub struct SassPlugin {
  options: Arc<SassPluginOptions>,
  compiler: Arc<dyn StylesheetCompiler>,
  resolver: ModuleResolverRef,
}

impl SassPlugin {
  pub fn new(options: SassPluginOptions) -> Self {
    Self::with_file_system(options, Arc::new(OsFileSystem))
  }

  /// Compiles and resolves packages through `fs` instead of the real file system
  pub fn with_file_system(options: SassPluginOptions, fs: FileSystemRef) -> Self {
    Self {
      options: Arc::new(options),
      compiler: Arc::new(GrassCompiler::new(fs.clone())),
      resolver: Arc::new(NodeModulesResolver::new(fs)),
    }
  }

  pub fn with_compiler(mut self, compiler: Arc<dyn StylesheetCompiler>) -> Self {
    self.compiler = compiler;
    self
  }

  pub fn with_resolver(mut self, resolver: ModuleResolverRef) -> Self {
    self.resolver = resolver;
    self
  }
}

impl Plugin for SassPlugin {
  fn name(&self) -> &str {
    "sass"
  }

  fn setup(&self, build: &mut PluginBuild) -> Result<(), anyhow::Error> {
    let loader = SassLoader::new(
      self.options.clone(),
      build.initial_options.source_map,
      self.compiler.clone(),
      TildeImporter::new(self.resolver.clone()),
    );

    build.on_load(self.options.filter.clone(), Arc::new(loader));

    Ok(())
  }
}
