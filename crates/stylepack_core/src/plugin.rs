use std::fmt::Debug;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::Diagnostic;

/// Options the host was started with, visible to plugins during setup
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildOptions {
  /// Whether the host emits source maps for its output
  pub source_map: bool,
}

/// How the host should interpret the contents returned by a load callback
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Loader {
  #[default]
  Css,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OnLoadArgs {
  /// Absolute path of the file being loaded
  pub path: PathBuf,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadResult {
  pub contents: String,
  pub loader: Loader,

  /// Directory the host resolves relative references in `contents` against
  pub resolve_dir: PathBuf,

  pub warnings: Vec<Diagnostic>,

  /// The result should be invalidated if any of these paths change.
  pub watch_files: Vec<PathBuf>,
}

/// Produces the contents of a file matched by the filter it was registered with
#[async_trait]
pub trait OnLoad: Debug + Send + Sync {
  async fn load(&self, args: OnLoadArgs) -> Result<LoadResult, anyhow::Error>;
}

#[derive(Clone, Debug)]
pub struct OnLoadRegistration {
  /// Name of the plugin that registered this callback
  pub plugin: String,
  pub filter: Regex,
  pub callback: Arc<dyn OnLoad>,
}

/// Handed to [`Plugin::setup`] so plugins can register their hooks
#[derive(Debug)]
pub struct PluginBuild {
  pub initial_options: Arc<BuildOptions>,
  plugin: String,
  registrations: Vec<OnLoadRegistration>,
}

impl PluginBuild {
  pub fn new(initial_options: Arc<BuildOptions>, plugin: impl Into<String>) -> Self {
    Self {
      initial_options,
      plugin: plugin.into(),
      registrations: Vec::new(),
    }
  }

  /// Register a callback for every path matching `filter`
  pub fn on_load(&mut self, filter: Regex, callback: Arc<dyn OnLoad>) {
    tracing::debug!(plugin = %self.plugin, %filter, "Registered load hook");

    self.registrations.push(OnLoadRegistration {
      plugin: self.plugin.clone(),
      filter,
      callback,
    });
  }

  pub fn into_registrations(self) -> Vec<OnLoadRegistration> {
    self.registrations
  }
}

/// A bundler plugin
///
/// Plugins are set up once per build and register the hooks they need.
pub trait Plugin: Debug + Send + Sync {
  fn name(&self) -> &str;

  fn setup(&self, build: &mut PluginBuild) -> Result<(), anyhow::Error>;
}
