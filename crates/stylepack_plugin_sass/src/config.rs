use std::io::ErrorKind;
use std::path::Path;

use serde::Deserialize;
use stylepack_filesystem::FileSystemRef;

use crate::SassError;

/// Plugin configuration as written in the `"sass"` key of a project's `package.json`
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SassConfig {
  pub filter: Option<String>,

  #[serde(default)]
  pub quiet_deps: bool,

  #[serde(default)]
  pub silence_deprecations: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct PackageJson {
  sass: Option<SassConfig>,
}

impl SassConfig {
  pub fn load_from_package_json(
    fs: &FileSystemRef,
    project_root: &Path,
  ) -> Result<Self, SassError> {
    let path = project_root.join("package.json");

    let contents = match fs.read_to_string(&path) {
      Ok(contents) => contents,
      Err(error) if error.kind() == ErrorKind::NotFound => {
        tracing::debug!("No package.json in {}, using defaults", project_root.display());
        return Ok(Self::default());
      }
      Err(source) => return Err(SassError::Io { path, source }),
    };

    let package_json = serde_json::from_str::<PackageJson>(&contents)
      .map_err(|source| SassError::InvalidConfig { path, source })?;

    Ok(package_json.sass.unwrap_or_default())
  }
}
