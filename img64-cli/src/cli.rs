// ABOUTME: CLI argument definitions for the img64 converter
// ABOUTME: Defines the command-line interface structure using clap derive macros

use crate::config::parse_size;
use clap::Parser;
use std::path::PathBuf;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "img64")]
#[command(about = "Convert markdown to HTML with images embedded as data URLs", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Markdown file, `-` for stdin, or an http(s) URL
    pub input: String,

    /// Write HTML to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Resolve image paths against this directory (default: the input file's directory)
    #[arg(long)]
    pub parent_path: Option<PathBuf>,

    /// Resolve image references against this URL
    #[arg(long, conflicts_with = "parent_path")]
    pub base_url: Option<Url>,

    /// Download and embed remote images
    #[arg(long)]
    pub allow_remote: bool,

    /// Emit image URLs even if they look dangerous
    #[arg(long = "unsafe")]
    pub unsafe_html: bool,

    /// Close <img> tags XHTML style
    #[arg(long)]
    pub xhtml: bool,

    /// Timeout in seconds for remote requests
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Largest remote image to embed (e.g. 500KB, 10MB)
    #[arg(long, value_parser = parse_size_arg)]
    pub max_size: Option<u64>,

    /// Read configuration from this file in addition to the standard locations
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(long, short)]
    pub verbose: bool,
}

fn parse_size_arg(value: &str) -> Result<u64, String> {
    parse_size(value).ok_or_else(|| {
        format!(
            "Invalid size '{}'. Expected bytes or a KB/MB/GB suffix, like '500KB'",
            value
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_args() {
        let cli = Cli::try_parse_from(["img64", "README.md"]).unwrap();
        assert_eq!(cli.input, "README.md");
        assert!(cli.output.is_none());
        assert!(!cli.allow_remote);
        assert!(!cli.unsafe_html);
        assert!(!cli.xhtml);
    }

    #[test]
    fn test_all_args() {
        let cli = Cli::try_parse_from([
            "img64",
            "doc.md",
            "-o",
            "doc.html",
            "--parent-path",
            "assets",
            "--allow-remote",
            "--unsafe",
            "--xhtml",
            "--timeout",
            "5",
            "--max-size",
            "2MB",
            "-v",
        ])
        .unwrap();

        assert_eq!(cli.output, Some(PathBuf::from("doc.html")));
        assert_eq!(cli.parent_path, Some(PathBuf::from("assets")));
        assert!(cli.allow_remote && cli.unsafe_html && cli.xhtml && cli.verbose);
        assert_eq!(cli.timeout, Some(5));
        assert_eq!(cli.max_size, Some(2 * 1024 * 1024));
    }

    #[test]
    fn test_parent_path_conflicts_with_base_url() {
        let result = Cli::try_parse_from([
            "img64",
            "doc.md",
            "--parent-path",
            "assets",
            "--base-url",
            "https://example.com/",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Cli::try_parse_from(["img64", "doc.md", "--max-size", "huge"]).is_err());
        assert!(Cli::try_parse_from(["img64", "doc.md", "--timeout", "0"]).is_err());
        assert!(Cli::try_parse_from(["img64", "doc.md", "--base-url", "not a url"]).is_err());
        assert!(Cli::try_parse_from(["img64"]).is_err());
    }
}
