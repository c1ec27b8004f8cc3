//! Provides workflows in the [cargo-xtask][cargo-xtask] pattern.
//!
//! [cargo-xtask]: https://github.com/matklad/cargo-xtask

use std::{env, path::PathBuf};

use anyhow::Context;
use cbor_tree::DecodeOptions;
use clap::{Parser, Subcommand};
use xshell::{cmd, Shell};

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Runs the formatting, lint, and test gates.
    Ci,
    /// Decodes hex encoded data and prints every top level value.
    Vectors {
        /// Hex digits. Whitespace is ignored.
        hex: String,
        /// Maximum nesting depth.
        #[arg(long, default_value_t = cbor_tree::DEFAULT_MAX_DEPTH)]
        max_depth: usize,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let sh = Shell::new()?;
    sh.change_dir(project_root()?);

    match args.command {
        Commands::Ci => ci(&sh),
        Commands::Vectors { hex, max_depth } => vectors(&hex, max_depth),
    }
}

fn ci(sh: &Shell) -> anyhow::Result<()> {
    cmd!(sh, "cargo fmt --all -- --check").run()?;
    cmd!(
        sh,
        "cargo clippy --workspace --all-targets -- --deny warnings"
    )
    .run()?;
    cmd!(sh, "cargo test --workspace").run()?;
    Ok(())
}

fn vectors(digits: &str, max_depth: usize) -> anyhow::Result<()> {
    let input = parse_hex(digits)?;
    let options = DecodeOptions::default().with_max_depth(max_depth);
    for value in cbor_tree::decode_all(&input, &options)? {
        println!("{value}");
    }
    Ok(())
}

fn parse_hex(digits: &str) -> anyhow::Result<Vec<u8>> {
    hex::decode(digits.split_whitespace().collect::<String>()).context("invalid hex")
}

/// Returns the project root directory.
fn project_root() -> anyhow::Result<PathBuf> {
    let dir =
        env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| env!("CARGO_MANIFEST_DIR").to_owned());
    PathBuf::from(dir)
        .parent()
        .map(PathBuf::from)
        .context("xtask has no parent directory")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() -> anyhow::Result<()> {
        assert_eq!(parse_hex("83 01 02 03")?, [0x83, 0x01, 0x02, 0x03]);
        assert_eq!(parse_hex("a2\n01 02\t03 04")?, [0xa2, 0x01, 0x02, 0x03, 0x04]);
        assert!(parse_hex("").is_ok_and(|bytes| bytes.is_empty()));
        Ok(())
    }

    #[test]
    fn test_parse_hex_rejects_malformed_digits() {
        for input in ["+1", "0", "zz", "0x01"] {
            assert!(parse_hex(input).is_err(), "{input:?}");
        }
    }
}
