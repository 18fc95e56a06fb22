use std::path::Path;
use std::sync::Arc;

/// In-memory file-system for testing
pub mod in_memory_file_system;

/// File-system implementation using std::fs
pub mod os_file_system;

/// FileSystem abstraction instance
///
/// This should be `OsFileSystem` for non-testing environments and `InMemoryFileSystem` for testing.
pub type FileSystemRef = Arc<dyn FileSystem + Send + Sync>;

/// Trait abstracting the read-only file-system operations stylesheet compilation needs
#[mockall::automock]
pub trait FileSystem: std::fmt::Debug {
  fn read(&self, path: &Path) -> std::io::Result<Vec<u8>>;
  fn read_to_string(&self, path: &Path) -> std::io::Result<String>;
  fn is_file(&self, path: &Path) -> bool;
  fn is_dir(&self, path: &Path) -> bool;
}
