//! Sass load plugin.
//!
//! Compiles `.sass`, `.scss` and `.css` files with [grass] and returns the CSS to the host together
//! with warnings, an optional inline source map and the list of files to watch. Imports starting
//! with `~` are resolved relative to the root of the installed package they name.
mod compiler;
mod config;
mod diagnostics;
mod error;
mod grass_compiler;
mod importer;
mod loader;
mod options;
mod plugin;

pub use compiler::{
  CompileOptions, CompileResult, CompilerWarning, FileImporter, SourcePosition,
  StylesheetCompiler, WarningSpan,
};
pub use config::SassConfig;
pub use diagnostics::warning_to_diagnostic;
pub use error::SassError;
pub use grass_compiler::GrassCompiler;
pub use importer::TildeImporter;
pub use loader::SassLoader;
pub use options::{CssTransform, FnTransform, SassPluginOptions};
pub use plugin::SassPlugin;
