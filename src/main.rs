//! Githubby - GitHub account backup and release housekeeping
//!
//! Main entry point for the githubby CLI.

mod commands;

use clap::Parser;
use commands::{Cli, Commands};
use githubby::auth::{resolve_token, TokenSource};
use githubby::cleanup::ReleaseFilter;
use githubby::config::{validate_config_result, GithubbyConfig};
use githubby::git::{Git2Backend, GitCredentials};
use githubby::github::{GitHubClient, RetryConfig};
use githubby::orchestrator::{
    BackupRequest, CleanRequest, ConsoleReporter, Orchestrator, RunSettings,
};
use githubby::style;
use githubby::sync::RepositorySyncEngine;
use std::process;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = githubby::logging::init(cli.verbose) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    if let Err(e) = run(cli) {
        eprintln!("{} {}", style::error("Error:"), e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> githubby::Result<()> {
    let config = match cli.config {
        Some(ref path) => GithubbyConfig::load(path)?,
        None => GithubbyConfig::load_default()?,
    };
    validate_config_result(&config)?;

    let token = match resolve_token(cli.token.as_deref()) {
        Some((token, source)) => {
            tracing::debug!(source = ?source, "Resolved GitHub token");
            if source == TokenSource::GhCli && cli.verbose {
                println!("{}", style::dim("Using token from the GitHub CLI"));
            }
            Some(token)
        }
        None => {
            tracing::warn!("No GitHub token found, using unauthenticated API access");
            None
        }
    };

    let client = GitHubClient::new(&config.api_url, token.clone(), config.request_timeout())?
        .with_retry(RetryConfig::from_settings(&config.retry));
    let settings = RunSettings::from_config(&config, cli.dry_run);

    let runtime = tokio::runtime::Runtime::new()?;

    match cli.command {
        Commands::Backup {
            user,
            output,
            limit,
            protocol,
        } => {
            let protocol = protocol.unwrap_or(config.clone_protocol);
            let backend = Git2Backend::new(GitCredentials::with_token(token));
            let engine = RepositorySyncEngine::new(backend, protocol);
            let orchestrator = Orchestrator::new(client, settings).with_engine(engine);

            let request = BackupRequest {
                owner: user,
                output_root: output.unwrap_or_else(|| config.output_directory.clone()),
                limit,
            };
            tracing::info!(
                owner = %request.owner,
                output = %request.output_root.display(),
                protocol = %protocol,
                "Backup requested"
            );

            let mut reporter =
                ConsoleReporter::new(format!("Backing up {}", request.owner), cli.verbose);
            runtime.block_on(orchestrator.backup(&request, &mut reporter))?;
        }

        Commands::Clean {
            repository,
            filter_days,
            filter_count,
        } => {
            let filter = ReleaseFilter::new(filter_days, filter_count)?;
            let request = CleanRequest::from_slug(&repository, filter)?;

            let orchestrator = Orchestrator::new(client, settings);

            let mut reporter = ConsoleReporter::new(
                format!("Cleaning releases of {}/{}", request.owner, request.repo),
                cli.verbose,
            );
            runtime.block_on(orchestrator.clean(&request, &mut reporter))?;
        }
    }

    Ok(())
}
