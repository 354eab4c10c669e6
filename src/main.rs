//! folio-site: portfolio website server.
//!
//! - `serve`: serve the site and its JSON API
//! - `check`: validate the project catalog and report every violation

mod core;
mod render;
mod server;
mod types;

use std::{net::IpAddr, path::PathBuf, process::ExitCode};

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::core::{
    cache::ReloadPolicy,
    data::{ContentError, ContentLoader},
    settings::{Settings, SettingsError, SettingsOverrides},
};

#[derive(Parser)]
#[command(name = "folio-site", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the site.
    Serve(ServeArgs),
    /// Validate the project catalog and exit.
    Check(CheckArgs),
}

#[derive(Args)]
struct ServeArgs {
    /// JSON settings file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind (overrides settings).
    #[arg(long)]
    host: Option<IpAddr>,

    /// Port to bind (overrides settings).
    #[arg(short, long)]
    port: Option<u16>,

    /// Project catalog file (overrides settings).
    #[arg(long)]
    content: Option<PathBuf>,

    /// Directory detail documents are resolved against.
    #[arg(long)]
    content_root: Option<PathBuf>,

    /// Public base URL for canonical links and the sitemap.
    #[arg(long, env = "SITE_BASE_URL")]
    base_url: Option<String>,

    /// Seconds a loaded catalog is served before it is re-read.
    #[arg(long)]
    cache_ttl: Option<u64>,

    /// Keep serving the last good catalog when a reload fails.
    #[arg(long)]
    serve_stale: bool,

    /// Log at info level regardless of RUST_LOG.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Args)]
struct CheckArgs {
    /// JSON settings file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Project catalog file (overrides settings).
    #[arg(long)]
    content: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Settings(#[from] SettingsError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Content(#[from] ContentError),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let verbose = matches!(&cli.command, Command::Serve(args) if args.verbose);
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Command::Serve(args) => actix_web::rt::System::new().block_on(serve(args)),
        Command::Check(args) => check(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn serve(args: ServeArgs) -> Result<(), CliError> {
    let overrides = SettingsOverrides {
        ip_addr: args.host,
        port: args.port,
        content_file: args.content,
        content_root: args.content_root,
        cache_ttl_secs: args.cache_ttl,
        reload_policy: args.serve_stale.then_some(ReloadPolicy::ServeStale),
        base_url: args.base_url,
    };
    let settings = Settings::load(args.config.as_deref(), overrides)?;
    server::start_server(settings).await?;
    Ok(())
}

fn check(args: CheckArgs) -> Result<(), CliError> {
    let overrides = SettingsOverrides {
        content_file: args.content,
        ..SettingsOverrides::default()
    };
    let settings = Settings::load(args.config.as_deref(), overrides)?;
    let loader = ContentLoader::new(&settings.content_file);

    // The loader logs each violation; `main` reports the summary.
    let catalog = loader.load()?;
    println!(
        "{}: {} project(s), {} page(s) OK",
        settings.content_file.display(),
        catalog.len(),
        catalog.ids().len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::ViolationKind;
    use std::fs;

    fn check_file(text: &str) -> Result<(), CliError> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("projects.json");
        fs::write(&path, text).unwrap();
        check(CheckArgs {
            config: None,
            content: Some(path),
        })
    }

    #[test]
    fn test_check_accepts_valid_catalog() {
        let ok = check_file(
            r#"[{"id": "a", "title": "A", "summary": "", "details": "a.md", "image": "/a.png"}]"#,
        );
        assert!(ok.is_ok());
    }

    #[test]
    fn test_check_rejects_invalid_catalog() {
        let err = check_file(r#"[{"id": "a"}, {"id": "a", "title": "A"}]"#).unwrap_err();
        let CliError::Content(ContentError::SchemaValidation { violations, .. }) = &err else {
            panic!("unexpected error: {err}");
        };
        assert!(violations
            .iter()
            .any(|v| v.record == Some(1) && v.kind == ViolationKind::DuplicateId { first: 0 }));
        assert!(err.to_string().contains("failed validation"));
    }
}
