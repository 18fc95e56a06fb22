//! Core types and the load-hook contract shared by stylepack plugins.
//!
//! A host builds a [`Build`] from its [`BuildOptions`] and a list of [`Plugin`]s. Each plugin
//! registers [`OnLoad`] callbacks against a file-path filter during `setup`; the host then
//! dispatches every input path to the first matching callback.
pub mod build;
pub mod diagnostic;
pub mod plugin;
pub mod resolver;
pub mod tracer;

pub use build::{Build, BuildError};
pub use diagnostic::{Diagnostic, DiagnosticDetail, Location};
pub use plugin::{
  BuildOptions, LoadResult, Loader, OnLoad, OnLoadArgs, OnLoadRegistration, Plugin, PluginBuild,
};
pub use resolver::{ModuleResolver, ModuleResolverRef, NodeModulesResolver, ResolverError};
