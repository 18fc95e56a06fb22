use std::collections::HashMap;
use std::io;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use parking_lot::RwLock;

use crate::FileSystem;

#[cfg(not(target_os = "windows"))]
fn root_dir() -> PathBuf {
  PathBuf::from("/")
}

#[cfg(target_os = "windows")]
fn root_dir() -> PathBuf {
  PathBuf::from("C:/")
}

/// In memory implementation of a file-system entry
#[derive(Debug)]
enum InMemoryFileSystemEntry {
  File { contents: Vec<u8> },
  Directory,
}

/// In memory implementation of the `FileSystem` trait, for testing purposes.
///
/// Relative paths are resolved against the root directory.
#[derive(Debug, Default)]
pub struct InMemoryFileSystem {
  files: RwLock<HashMap<PathBuf, InMemoryFileSystemEntry>>,
}

impl InMemoryFileSystem {
  /// Write a file, creating every missing parent directory
  pub fn write_file(&self, path: &Path, contents: impl Into<String>) {
    let path = self.normalize(path);
    let mut files = self.files.write();

    files.insert(
      path.clone(),
      InMemoryFileSystemEntry::File {
        contents: contents.into().into_bytes(),
      },
    );

    let mut dir = path.parent();
    while let Some(path) = dir {
      files.insert(path.to_path_buf(), InMemoryFileSystemEntry::Directory);
      dir = path.parent();
    }
  }

  fn normalize(&self, path: &Path) -> PathBuf {
    let root = root_dir();
    let mut result = if path.is_absolute() {
      vec![]
    } else {
      root.components().collect()
    };

    for component in path.components() {
      match component {
        Component::Prefix(prefix) => {
          result = vec![Component::Prefix(prefix)];
        }
        Component::RootDir => {
          result.push(Component::RootDir);
        }
        Component::CurDir => {}
        Component::ParentDir => {
          result.pop();
        }
        Component::Normal(path) => {
          result.push(Component::Normal(path));
        }
      }
    }

    PathBuf::from_iter(result)
  }
}

impl FileSystem for InMemoryFileSystem {
  fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
    let path = self.normalize(path);
    let files = self.files.read();
    match files.get(&path) {
      None => Err(io::Error::new(io::ErrorKind::NotFound, "File not found")),
      Some(InMemoryFileSystemEntry::File { contents }) => Ok(contents.clone()),
      Some(InMemoryFileSystemEntry::Directory) => Err(io::Error::new(
        io::ErrorKind::InvalidInput,
        "Path is a directory",
      )),
    }
  }

  fn read_to_string(&self, path: &Path) -> io::Result<String> {
    let bytes = self.read(path)?;
    String::from_utf8(bytes).map_err(|_| io::Error::other("Unable to read file as string"))
  }

  fn is_file(&self, path: &Path) -> bool {
    let path = self.normalize(path);
    matches!(
      self.files.read().get(&path),
      Some(InMemoryFileSystemEntry::File { .. })
    )
  }

  fn is_dir(&self, path: &Path) -> bool {
    let path = self.normalize(path);
    matches!(
      self.files.read().get(&path),
      Some(InMemoryFileSystemEntry::Directory)
    )
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn test_remove_relative_parent_dots() {
    let fs = InMemoryFileSystem::default();
    fs.write_file(&root_dir().join("foo/baz.scss"), "contents");

    let result = fs
      .read_to_string(&root_dir().join("foo/./bar/../baz.scss"))
      .unwrap();
    assert_eq!(result, "contents");
  }

  #[test]
  fn test_relative_paths_resolve_from_root() {
    let fs = InMemoryFileSystem::default();
    fs.write_file(Path::new("./other/foo/./bar/../baz.scss"), "");

    assert!(fs.is_file(&root_dir().join("other/foo/baz.scss")));
    assert!(fs.is_dir(&root_dir().join("other/foo")));
  }

  #[test]
  fn test_read_file() {
    let fs = InMemoryFileSystem::default();
    fs.write_file(&root_dir().join("foo/bar.scss"), "contents");
    let result = fs
      .read_to_string(&root_dir().join("foo/bar.scss"))
      .unwrap();
    assert_eq!(result, "contents");
  }

  #[test]
  fn test_read_file_not_found() {
    let fs = InMemoryFileSystem::default();
    let result = fs.read_to_string(&root_dir().join("foo/bar"));
    assert!(result.is_err());
  }

  #[test]
  fn test_write_creates_parent_directories() {
    let fs = InMemoryFileSystem::default();
    fs.write_file(&root_dir().join("a/b/c.scss"), "");

    assert!(fs.is_dir(&root_dir().join("a")));
    assert!(fs.is_dir(&root_dir().join("a/b")));
    assert!(fs.is_file(&root_dir().join("a/b/c.scss")));
    assert!(!fs.is_file(&root_dir().join("a/b")));
    assert!(!fs.is_dir(&root_dir().join("a/b/c.scss")));
  }

  #[test]
  fn test_read_directory_fails() {
    let fs = InMemoryFileSystem::default();
    fs.write_file(&root_dir().join("a/b.scss"), "");

    let error = fs.read(&root_dir().join("a")).unwrap_err();
    assert_eq!(error.kind(), io::ErrorKind::InvalidInput);
  }
}
