//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Link icon resolution and network-locality service
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: linkicon.toml)
    #[arg(short = 'C', long, global = true, default_value = "linkicon.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Write a commented linkicon.toml into the current directory
    #[command(visible_alias = "i")]
    Init {
        /// Print the template instead of writing it
        #[arg(short, long)]
        dry: bool,

        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },

    /// Start the HTTP service
    #[command(visible_alias = "s")]
    Serve {
        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<std::net::IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Resolve the icon of a link and print it
    #[command(visible_alias = "r")]
    Resolve {
        #[command(flatten)]
        args: ResolveArgs,
    },

    /// Classify URLs as internal or external
    #[command(visible_alias = "c")]
    Classify {
        /// URLs to classify
        #[arg(required = true, value_hint = clap::ValueHint::Url)]
        urls: Vec<String>,
    },

    /// Probe whether a private-network host answers
    #[command(visible_alias = "p")]
    Probe {
        /// Host or host:port on a private network
        target: String,
    },

    /// Check whether this machine reaches a running service from inside its network
    #[command(visible_alias = "n")]
    Network {
        /// Origin of the running service (e.g., http://192.168.1.2:5288)
        #[arg(value_hint = clap::ValueHint::Url)]
        origin: String,

        /// Connection medium of this machine (wifi, ethernet, cellular)
        #[arg(short, long)]
        medium: Option<String>,
    },
}

/// Resolve command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct ResolveArgs {
    /// External (or only) URL of the link
    #[arg(value_hint = clap::ValueHint::Url)]
    pub url: String,

    /// Internal URL of the link
    #[arg(short, long, value_hint = clap::ValueHint::Url)]
    pub internal: Option<String>,

    /// Previously stored icon (returned unchanged when present)
    #[arg(short, long)]
    pub stored: Option<String>,

    /// Resolve against the internal URL when one is given
    #[arg(short = 'I', long)]
    pub prefer_internal: bool,

    /// Link title, used for the placeholder letter
    #[arg(short, long)]
    pub title: Option<String>,
}

impl Cli {
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Commands::Init { .. })
    }
    pub const fn is_serve(&self) -> bool {
        matches!(self.command, Commands::Serve { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resolve() {
        let cli = Cli::parse_from([
            "linkicon",
            "resolve",
            "https://nas.example.com",
            "--internal",
            "http://nas.local",
            "-I",
        ]);
        let Commands::Resolve { args } = cli.command else {
            panic!("expected resolve");
        };
        assert_eq!(args.url, "https://nas.example.com");
        assert_eq!(args.internal.as_deref(), Some("http://nas.local"));
        assert!(args.prefer_internal);
        assert!(args.stored.is_none());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["linkicon", "serve", "-p", "8080", "-v", "-C", "alt.toml"]);
        assert!(cli.verbose);
        assert!(cli.is_serve());
        assert_eq!(cli.config, PathBuf::from("alt.toml"));
        assert!(matches!(
            cli.command,
            Commands::Serve {
                port: Some(8080),
                ..
            }
        ));
    }

    #[test]
    fn test_parse_network_medium() {
        let cli = Cli::parse_from(["linkicon", "n", "http://192.168.1.2:5288", "-m", "wifi"]);
        let Commands::Network { origin, medium } = cli.command else {
            panic!("expected network");
        };
        assert_eq!(origin, "http://192.168.1.2:5288");
        assert_eq!(medium.as_deref(), Some("wifi"));
    }

    #[test]
    fn test_classify_requires_url() {
        assert!(Cli::try_parse_from(["linkicon", "classify"]).is_err());
    }
}
