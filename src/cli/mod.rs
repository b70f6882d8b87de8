//! Command-line tools for the imgset library
//!
//! This module is only available when the "cli" feature is enabled.
//!
//! - [`samples`]: bulk downloader (`imgset-samples`)
//! - [`check`]: reconciliation checker (`imgset-check`)
//! - [`measure`]: JPEG compression sweep (`imgset-measure`)

pub mod check;
pub mod measure;
pub mod samples;

use anyhow::{Context, Result};

/// Initialize tracing based on verbosity level
fn init_tracing(verbose_count: u8) -> Result<()> {
    use crate::tracing_config::{TracingConfig, TracingFormat};

    TracingConfig::new()
        .with_verbosity(verbose_count)
        .with_format(TracingFormat::Console)
        .init()
        .context("Failed to initialize tracing subscriber")
}
