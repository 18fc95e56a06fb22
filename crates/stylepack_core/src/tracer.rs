//! This module configures `tracing_subscriber` to write to standard output.
//!
//! Tracing is disabled by default.
use std::sync::Mutex;

use anyhow::anyhow;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Registry;

const TRACING_MODE_VAR: &str = "STYLEPACK_TRACING_MODE";

static TRACER_INITIALIZED: Mutex<bool> = Mutex::new(false);

#[derive(Debug, PartialEq, Eq)]
pub enum TracerMode {
  /// Output the Tracer logs to Stdout
  Stdout,
}

impl TracerMode {
  /// Reads a comma separated list of modes from `STYLEPACK_TRACING_MODE`
  pub fn from_env() -> anyhow::Result<Vec<Self>> {
    let Ok(mode) = std::env::var(TRACING_MODE_VAR) else {
      return Ok(vec![]);
    };

    let mut tracer_modes = vec![];
    for mode in mode.split(',').map(|s| s.trim()).filter(|s| !s.is_empty()) {
      match mode {
        "stdout" => {
          if !tracer_modes.contains(&Self::Stdout) {
            tracer_modes.push(Self::Stdout);
          }
        }
        value => {
          return Err(anyhow!("Invalid value for {TRACING_MODE_VAR}: {value}"));
        }
      }
    }

    Ok(tracer_modes)
  }
}

/// Installs the global subscriber for the given modes
///
/// Initializing more than once is a no-op.
pub fn init_tracing(options: &[TracerMode]) -> anyhow::Result<()> {
  let mut initialized = TRACER_INITIALIZED
    .lock()
    .map_err(|_| anyhow!("Tracer lock poisoned"))?;

  if *initialized {
    tracing::warn!("Tracing is getting set-up twice, this will no-op");
    return Ok(());
  }

  if options.is_empty() {
    return Ok(());
  }

  let stdout_layer = tracing_subscriber::fmt::layer()
    .with_writer(std::io::stdout)
    .with_span_events(FmtSpan::CLOSE)
    .with_filter(EnvFilter::from_default_env());

  let subscriber = Registry::default().with(stdout_layer);
  tracing::subscriber::set_global_default(subscriber)?;

  *initialized = true;

  Ok(())
}

pub fn init_from_env() -> anyhow::Result<()> {
  init_tracing(&TracerMode::from_env()?)
}
