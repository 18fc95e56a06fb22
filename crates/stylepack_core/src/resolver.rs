use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use stylepack_filesystem::FileSystemRef;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ResolverError {
  #[error("Cannot find module '{specifier}' from '{}'", .from.display())]
  ModuleNotFound { specifier: String, from: PathBuf },

  #[error("Invalid module specifier '{0}'")]
  InvalidSpecifier(String),
}

pub type ModuleResolverRef = Arc<dyn ModuleResolver>;

/// The host's module resolution algorithm
///
/// Resolves a bare package specifier such as `pkg/package.json` to an absolute file path.
#[mockall::automock]
pub trait ModuleResolver: Debug + Send + Sync {
  fn resolve(&self, specifier: &str, from: &Path) -> Result<PathBuf, ResolverError>;
}

/// Looks packages up in the `node_modules` directories of `from` and its ancestors
#[derive(Debug)]
pub struct NodeModulesResolver {
  fs: FileSystemRef,
}

impl NodeModulesResolver {
  pub fn new(fs: FileSystemRef) -> Self {
    Self { fs }
  }
}

impl ModuleResolver for NodeModulesResolver {
  #[tracing::instrument(level = "trace", skip(self), ret)]
  fn resolve(&self, specifier: &str, from: &Path) -> Result<PathBuf, ResolverError> {
    if specifier.is_empty()
      || specifier.starts_with('.')
      || specifier.starts_with('/')
      || Path::new(specifier).is_absolute()
    {
      return Err(ResolverError::InvalidSpecifier(specifier.to_string()));
    }

    for dir in from.ancestors() {
      // Packages are never nested directly inside another node_modules folder
      if dir.file_name().is_some_and(|name| name == "node_modules") {
        continue;
      }

      let candidate = dir.join("node_modules").join(specifier);
      if self.fs.is_file(&candidate) {
        return Ok(candidate);
      }
    }

    Err(ResolverError::ModuleNotFound {
      specifier: specifier.to_string(),
      from: from.to_path_buf(),
    })
  }
}
