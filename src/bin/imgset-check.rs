//! Dataset integrity and consistency checker
//!
//! Reports missing identifiers, out-of-range extras and corrupted files.

use imgset::cli;

fn main() -> anyhow::Result<()> {
    cli::check::main()
}
