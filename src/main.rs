mod cli;
mod error;
mod logging;

use crate::cli::{Cli, Command};
use crate::error::{ErrorKind, Result};
use clap::Parser;
use exn::ResultExt;
use quire_config::{Config, SourceConfig};
use quire_loader::{Loader, LoaderOptions};
use quire_sanitize::{Policy, extract_title};
use quire_source::{HtmlOnlySource, LocalSource, SourceHandle};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::FAILURE
        },
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    match cli.command {
        Command::Read { id, json } => {
            let loader = loader(&config)?;
            let chapter = loader.load(id).await.or_raise(|| ErrorKind::Load)?;
            match json {
                true => {
                    let value = serde_json::json!({
                        "id": chapter.id.get(),
                        "title": chapter.title,
                        "content": chapter.content,
                        "loaded_at": chapter.loaded_at.unix_timestamp(),
                    });
                    println!("{}", serde_json::to_string_pretty(&value).or_raise(|| ErrorKind::Output)?);
                },
                false => println!("{}", chapter.content),
            }
        },
        Command::Menu => {
            let loader = loader(&config)?;
            let width = loader.total().to_string().len();
            for (id, title) in loader.titles().await {
                println!("{:>width$}  {title}", id.get());
            }
        },
        Command::Sanitize { file, title } => {
            let policy = config.sanitization.policy();
            let output = sanitize_file(&file, &policy, title)?;
            println!("{output}");
        },
    }
    Ok(())
}

fn sanitize_file(file: &Path, policy: &Policy, title: bool) -> Result<String> {
    let bytes = std::fs::read(file).or_raise(|| ErrorKind::Read(file.to_path_buf()))?;
    let document = quire_sanitize::clean(bytes, policy).or_raise(|| ErrorKind::Sanitize(file.to_path_buf()))?;
    Ok(match title {
        true => extract_title(&document, ""),
        false => document.to_html(),
    })
}

fn loader(config: &Config) -> Result<Loader> {
    let options = LoaderOptions {
        total: config.chapters.total,
        cache_enabled: config.cache.enabled,
        default_title: config.chapters.default_title.clone(),
        paths: config.chapters.paths(),
    };
    let source = source(&config.source)?;
    tracing::info!(source = source.name(), total = options.total, "Chapter source ready");
    Ok(Loader::new(source, Arc::new(config.sanitization.policy()), options))
}

fn source(config: &SourceConfig) -> Result<SourceHandle> {
    let source: SourceHandle = match (&config.root, &config.url) {
        (_, Some(url)) => remote(url)?,
        (root, None) => {
            let root = absolute_root(root.as_deref())?;
            Arc::new(LocalSource::new("local", root).or_raise(|| ErrorKind::Source)?)
        },
    };
    let source: SourceHandle = match config.html_only {
        true => Arc::new(HtmlOnlySource::new(source)),
        false => source,
    };
    Ok(source)
}

/// Relative roots (and no root at all) are taken relative to the working directory.
fn absolute_root(root: Option<&Path>) -> Result<PathBuf> {
    match root {
        Some(root) if root.is_absolute() => Ok(root.to_path_buf()),
        root => {
            let cwd = std::env::current_dir().or_raise(|| ErrorKind::Source)?;
            Ok(root.map_or_else(|| cwd.clone(), |root| cwd.join(root)))
        },
    }
}

#[cfg(feature = "http")]
fn remote(url: &str) -> Result<SourceHandle> {
    let source = quire_source::HttpSource::new("http", url).or_raise(|| ErrorKind::Source)?;
    Ok(Arc::new(source))
}

#[cfg(not(feature = "http"))]
fn remote(url: &str) -> Result<SourceHandle> {
    exn::bail!(ErrorKind::Unsupported(format!("cannot fetch from {url}: built without the `http` feature")))
}
