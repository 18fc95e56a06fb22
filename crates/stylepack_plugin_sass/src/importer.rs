use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use stylepack_core::ModuleResolverRef;
use url::Url;

use crate::FileImporter;

/// Matches `~<package>/<rest>`, the package name being a single path segment
static TILDE_SPECIFIER: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^~(?<package>.+?)/(?<rest>.+)$").unwrap());

/// Resolves `~package/path` imports against the root of an installed package
///
/// The package root is found by resolving `<package>/package.json` with the host's module
/// resolution, since a package is not guaranteed to have an entry file to resolve instead.
#[derive(Clone, Debug)]
pub struct TildeImporter {
  resolver: ModuleResolverRef,
}

impl TildeImporter {
  pub fn new(resolver: ModuleResolverRef) -> Self {
    Self { resolver }
  }
}

impl FileImporter for TildeImporter {
  fn find_file_url(&self, url: &str, from_dir: &Path) -> Option<Url> {
    if !url.starts_with('~') {
      return None;
    }

    let captures = TILDE_SPECIFIER.captures(url)?;
    let package = captures.name("package")?.as_str();
    let rest = captures.name("rest")?.as_str();

    let manifest = match self
      .resolver
      .resolve(&format!("{package}/package.json"), from_dir)
    {
      Ok(manifest) => manifest,
      Err(error) => {
        tracing::debug!("Not resolving {url}: {error}");
        return None;
      }
    };

    let package_root = manifest.parent()?;

    Url::from_file_path(package_root.join(rest)).ok()
  }
}
