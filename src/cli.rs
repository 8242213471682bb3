//! Command-line interface definitions for textmerge.
//!
//! Every stage is a one-shot batch step that reads one artifact and writes
//! the next; `all` runs them back to back.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Crawl the URL lists under ./config into data/raw/news_raw.csv
/// textmerge crawl
///
/// # Whole pipeline against another project root with a custom config
/// textmerge --root /srv/corpus --config /srv/corpus/pipeline.yaml all
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Project root; relative paths in the config resolve against it
    #[arg(short, long, env = "TEXTMERGE_ROOT", default_value = ".")]
    pub root: PathBuf,

    /// Optional path to a YAML pipeline config
    #[arg(short, long, env = "TEXTMERGE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Fetch every URL list and write the crawl table
    Crawl,
    /// Reconcile social-media export CSVs into the export table
    MergeExports,
    /// Unify the crawl and export tables into the canonical dataset
    Build,
    /// Run crawl, merge-exports, and build in order
    All,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["textmerge", "--root", "/srv/corpus", "crawl"]);
        assert_eq!(cli.root, PathBuf::from("/srv/corpus"));
        assert_eq!(cli.command, Command::Crawl);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_cli_short_flags_and_kebab_subcommand() {
        let cli = Cli::parse_from(["textmerge", "-c", "pipeline.yaml", "merge-exports"]);
        assert_eq!(cli.config, Some(PathBuf::from("pipeline.yaml")));
        assert_eq!(cli.command, Command::MergeExports);
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["textmerge"]).is_err());
    }
}
