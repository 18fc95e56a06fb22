use std::sync::LazyLock;

use regex::Regex;

#[derive(Debug, PartialEq)]
pub struct SourceMapUrlMatch {
  /// The comment containing the sourcemap url
  pub code: String,

  /// The url to the sourcemap
  pub url: String,
}

static SOURCEMAP_URL: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"\/[*/][@#]\s*sourceMappingURL\s*=\s*(?<url>\S+)(?:\s*\*\/)?\s*$").unwrap()
});

/// Finds the trailing `sourceMappingURL` comment of a piece of generated code
pub fn find_sourcemap_url(code: &str) -> Option<SourceMapUrlMatch> {
  let captures = SOURCEMAP_URL.captures(code)?;

  match (captures.get(0), captures.name("url")) {
    (Some(code), Some(url)) => Some(SourceMapUrlMatch {
      code: code.as_str().trim().into(),
      url: url.as_str().to_string(),
    }),
    _ => None,
  }
}
