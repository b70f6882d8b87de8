//! JPEG compression analysis tool
//!
//! Writes the encoded size of every image at every JPEG quality level to a CSV table.

use imgset::cli;

fn main() -> anyhow::Result<()> {
    cli::measure::main()
}
