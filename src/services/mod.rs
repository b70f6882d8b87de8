//! Services shared by the pipelines
//!
//! - [`io`]: image loading and directory preparation
//! - [`progress`]: progress reporting, decoupled from pipeline logic

pub mod io;
pub mod progress;

pub use io::ImageIOService;
#[cfg(feature = "cli")]
pub use progress::{create_cli_progress_reporter, BarProgressReporter};
pub use progress::{
    ConsoleProgressReporter, ItemProgress, NoOpProgressReporter, ProgressReporter,
    ProgressUpdate, Stage,
};
