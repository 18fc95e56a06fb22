use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::{BuildOptions, LoadResult, OnLoadArgs, OnLoadRegistration, Plugin, PluginBuild};

/// A failure to load a single file
///
/// Other files in the same build are not affected.
#[derive(Clone, Debug, Error, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[error("[plugin {plugin}] {}: {message}", .path.display())]
pub struct BuildError {
  pub path: PathBuf,
  pub plugin: String,
  pub message: String,
}

/// Minimal host that owns the load hooks registered by its plugins
#[derive(Clone, Debug)]
pub struct Build {
  registrations: Arc<Vec<OnLoadRegistration>>,
}

impl Build {
  #[tracing::instrument(level = "debug", skip_all)]
  pub fn new(options: BuildOptions, plugins: &[Arc<dyn Plugin>]) -> Result<Self, anyhow::Error> {
    let options = Arc::new(options);
    let mut registrations = Vec::new();

    for plugin in plugins {
      let mut build = PluginBuild::new(options.clone(), plugin.name());
      plugin.setup(&mut build)?;
      registrations.extend(build.into_registrations());
    }

    Ok(Self {
      registrations: Arc::new(registrations),
    })
  }

  /// Loads a file through the first hook whose filter matches its path
  ///
  /// Returns `Ok(None)` when no hook claims the path.
  #[tracing::instrument(level = "debug", skip_all, fields(path = %path.display()))]
  pub async fn load(&self, path: &Path) -> Result<Option<LoadResult>, BuildError> {
    let path_str = path.to_string_lossy();
    let Some(registration) = self
      .registrations
      .iter()
      .find(|registration| registration.filter.is_match(&path_str))
    else {
      tracing::debug!("No load hook matched");
      return Ok(None);
    };

    let args = OnLoadArgs {
      path: path.to_path_buf(),
    };

    match registration.callback.load(args).await {
      Ok(result) => Ok(Some(result)),
      Err(error) => {
        tracing::debug!(plugin = %registration.plugin, "Load hook failed: {error:#}");
        Err(BuildError {
          path: path.to_path_buf(),
          plugin: registration.plugin.clone(),
          message: format!("{error:#}"),
        })
      }
    }
  }

  /// Loads every path concurrently, one task per file
  ///
  /// Results are returned in the order of `paths`.
  pub async fn load_all(&self, paths: Vec<PathBuf>) -> Vec<Result<Option<LoadResult>, BuildError>> {
    let handles = paths
      .into_iter()
      .map(|path| {
        let build = self.clone();
        let task_path = path.clone();
        let handle = tokio::spawn(async move { build.load(&task_path).await });
        (path, handle)
      })
      .collect::<Vec<_>>();

    let mut results = Vec::with_capacity(handles.len());
    for (path, handle) in handles {
      results.push(handle.await.unwrap_or_else(|error| {
        Err(BuildError {
          path,
          plugin: String::from("<host>"),
          message: format!("Load task failed: {error}"),
        })
      }));
    }

    results
  }
}
