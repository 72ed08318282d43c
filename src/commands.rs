//! CLI command definitions
//!
//! All CLI structs and subcommand enums are defined here.

use clap::{Parser, Subcommand};
use githubby::github::CloneProtocol;
use std::path::PathBuf;

/// Githubby - back up GitHub accounts and prune old releases
#[derive(Parser, Debug)]
#[command(name = "githubby")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (default: ~/.config/githubby/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose/debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Show what would happen without cloning, pulling or deleting anything
    #[arg(short = 'D', long, global = true)]
    pub dry_run: bool,

    /// GitHub token (falls back to `gh auth token`)
    #[arg(short, long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Clone or update every repository of a user or organization
    Backup {
        /// User or organization to back up
        #[arg(short, long)]
        user: String,

        /// Backup root (default: output_directory from config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Maximum number of repositories (0 = all)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Clone over https, ssh or git (default: clone_protocol from config)
        #[arg(long)]
        protocol: Option<CloneProtocol>,
    },

    /// Delete old releases and their tags
    Clean {
        /// Repository as OWNER/REPO
        #[arg(short, long)]
        repository: String,

        /// Delete releases older than this many days
        #[arg(short = 'd', long, allow_negative_numbers = true)]
        filter_days: Option<i64>,

        /// Keep only this many newest releases
        #[arg(short = 'c', long, allow_negative_numbers = true)]
        filter_count: Option<i64>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_backup() {
        let cli = Cli::try_parse_from([
            "githubby", "-D", "backup", "-u", "octocat", "-o", "/tmp/b", "-l", "5", "--protocol",
            "ssh",
        ])
        .unwrap();

        assert!(cli.dry_run);
        match cli.command {
            Commands::Backup {
                user,
                output,
                limit,
                protocol,
            } => {
                assert_eq!(user, "octocat");
                assert_eq!(output, Some(PathBuf::from("/tmp/b")));
                assert_eq!(limit, Some(5));
                assert_eq!(protocol, Some(CloneProtocol::Ssh));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_clean_with_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "githubby", "clean", "-r", "acme/widget", "-d", "30", "-c", "5", "--verbose",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::Clean {
                repository,
                filter_days,
                filter_count,
            } => {
                assert_eq!(repository, "acme/widget");
                assert_eq!(filter_days, Some(30));
                assert_eq!(filter_count, Some(5));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_backup_requires_user() {
        assert!(Cli::try_parse_from(["githubby", "backup"]).is_err());
    }
}
