//! Bulk sample downloader
//!
//! Fetches numbered placeholder images into a dataset directory.

use imgset::cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    cli::samples::main().await
}
