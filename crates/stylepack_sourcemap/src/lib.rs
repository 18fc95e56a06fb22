mod find_source_map_url;
mod source_map;
mod sourcemap_error;

pub use find_source_map_url::{find_sourcemap_url, SourceMapUrlMatch};
pub use source_map::SourceMap;
pub use sourcemap_error::SourceMapError;
