#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared CLI utilities for the theft map toolchain.
//!
//! Provides an `indicatif`-backed implementation of [`ProgressCallback`]
//! plus [`init_logger`], which routes `log` output through
//! `indicatif-log-bridge` so log lines and progress bars don't tear each
//! other while redrawing.

use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use theft_map_geocoder::progress::ProgressCallback;

pub use indicatif::MultiProgress;

/// Template used once the total row count is known.
const BAR_TEMPLATE: &str = "{msg} [{bar:40.green/dim}] {pos}/{len} ({percent}%, eta {eta})";

/// An `indicatif` [`ProgressBar`] behind the [`ProgressCallback`] trait.
///
/// The bar starts as a spinner while the category table is still loading
/// and switches to a counted bar when the pipeline reports the row total.
pub struct IndicatifProgress {
    bar: ProgressBar,
}

impl IndicatifProgress {
    /// Creates the per-category lookup bar, registered on `multi`.
    #[must_use]
    pub fn lookup_bar(multi: &MultiProgress, message: &str) -> Arc<dyn ProgressCallback> {
        let bar = multi.add(ProgressBar::new_spinner());
        bar.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(120));

        Arc::new(Self { bar })
    }
}

impl ProgressCallback for IndicatifProgress {
    fn set_total(&self, total: u64) {
        self.bar.set_style(
            ProgressStyle::with_template(BAR_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        self.bar.set_length(total);
        self.bar.set_position(0);
    }

    fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    fn set_message(&self, msg: String) {
        self.bar.set_message(msg);
    }

    fn finish(&self, msg: String) {
        self.bar.finish_with_message(msg);
    }
}

/// Initializes logging for a binary and returns the [`MultiProgress`] all
/// progress bars must be registered on.
///
/// The `pretty_env_logger` instance is built by hand (honoring `RUST_LOG`)
/// and wrapped in `indicatif-log-bridge`; a second call is a no-op.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let logger = pretty_env_logger::formatted_builder()
        .parse_env("RUST_LOG")
        .build();
    let max_level = logger.filter();

    if indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .is_ok()
    {
        log::set_max_level(max_level);
    }

    multi
}
