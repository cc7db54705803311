//! CLI argument definitions for suburbscope.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `serve` | Run the HTTP API (default) |
//! | `resolve` | Resolve one resource of one suburb and print it |
//!
//! # Examples
//!
//! ```bash
//! suburbscope serve --port 8080
//! suburbscope resolve melbourne-3000 marketTrends --pretty
//! USE_MOCK_DATA=true suburbscope resolve belmont-north-2280 schools
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Suburb analytics API with live-provider fallback to bundled fixtures.
#[derive(Debug, Parser)]
#[command(
    name = "suburbscope",
    author,
    version,
    about = "Suburb analytics API with live-provider fallback to bundled fixtures"
)]
pub struct Cli {
    /// Fixture directory (overrides DATA_DIR).
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the REST API.
    Serve(ServeArgs),

    /// Resolve one resource and print the response body as JSON.
    ///
    /// Exits with code 3 when neither source has the resource.
    ///
    /// # Examples
    ///
    ///   suburbscope resolve melbourne-3000 marketTrends
    ///   suburbscope resolve belmont-north-2280 streetRankings --property-type unit
    Resolve(ResolveArgs),
}

#[derive(Debug, Default, Args)]
pub struct ServeArgs {
    /// Listen host (overrides HOST).
    #[arg(long)]
    pub host: Option<String>,

    /// Listen port (overrides PORT).
    #[arg(long)]
    pub port: Option<u16>,
}

#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Suburb id, e.g. `melbourne-3000`.
    pub suburb_id: String,

    /// Resource kind, e.g. `schools`, `marketTrends`, `risk`.
    pub kind: String,

    /// `house` or `unit`.
    #[arg(long)]
    pub property_type: Option<String>,

    /// Market metric forwarded to market insights.
    #[arg(long)]
    pub metric: Option<String>,

    /// Ask the provider to omit GeoJSON layers.
    #[arg(long, default_value_t = false)]
    pub no_geojson: bool,

    /// Pretty-print JSON output with indentation.
    #[arg(long, default_value_t = false)]
    pub pretty: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_optional() {
        let cli = Cli::try_parse_from(["suburbscope"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_resolve_arguments() {
        let cli = Cli::try_parse_from([
            "suburbscope",
            "--data-dir",
            "fixtures",
            "resolve",
            "melbourne-3000",
            "marketTrends",
            "--pretty",
        ])
        .expect("parses");

        assert_eq!(cli.data_dir, Some(PathBuf::from("fixtures")));
        match cli.command {
            Some(Command::Resolve(args)) => {
                assert_eq!(args.kind, "marketTrends");
                assert!(args.pretty);
                assert!(!args.no_geojson);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
