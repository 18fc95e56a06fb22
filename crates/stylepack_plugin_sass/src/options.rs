use std::fmt::Debug;
use std::path::Path;
use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;

use crate::{SassConfig, SassError};

static DEFAULT_FILTER: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\.(s[ac]ss|css)$").unwrap());

/// Post-processes the compiled CSS before it is handed to the host
#[async_trait]
pub trait CssTransform: Debug + Send + Sync {
  async fn transform(
    &self,
    css: String,
    resolve_dir: &Path,
    file_path: &Path,
  ) -> Result<String, anyhow::Error>;
}

/// Adapts a synchronous closure into a [`CssTransform`]
pub struct FnTransform<F>(pub F);

impl<F> Debug for FnTransform<F> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("FnTransform").finish()
  }
}

#[async_trait]
impl<F> CssTransform for FnTransform<F>
where
  F: Fn(String, &Path, &Path) -> Result<String, anyhow::Error> + Send + Sync,
{
  async fn transform(
    &self,
    css: String,
    resolve_dir: &Path,
    file_path: &Path,
  ) -> Result<String, anyhow::Error> {
    (self.0)(css, resolve_dir, file_path)
  }
}

/// Options fixed when the plugin is registered
#[derive(Clone, Debug)]
pub struct SassPluginOptions {
  /// Paths the plugin loads
  pub filter: Regex,

  /// Silence warnings coming from dependencies
  pub quiet_deps: bool,

  /// Deprecation ids to silence
  pub silence_deprecations: Vec<String>,

  pub transform: Option<Arc<dyn CssTransform>>,
}

impl Default for SassPluginOptions {
  fn default() -> Self {
    Self {
      filter: DEFAULT_FILTER.clone(),
      quiet_deps: false,
      silence_deprecations: Vec::new(),
      transform: None,
    }
  }
}

impl TryFrom<SassConfig> for SassPluginOptions {
  type Error = SassError;

  fn try_from(config: SassConfig) -> Result<Self, Self::Error> {
    let filter = match config.filter {
      Some(filter) => Regex::new(&filter)?,
      None => DEFAULT_FILTER.clone(),
    };

    Ok(Self {
      filter,
      quiet_deps: config.quiet_deps,
      silence_deprecations: config.silence_deprecations,
      transform: None,
    })
  }
}
