//! `runfile-locate`: resolve logical runfile paths from the command line.

mod logging;

use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use runfile_locator::{ManifestProvider, Resolver, RunfileEntry, Runfiles, RunfilesConfig};
use serde::Serialize;
use tracing::debug;

#[derive(Parser)]
#[command(name = "runfile-locate", version)]
#[command(about = "Resolve logical runfile paths to their on-disk locations")]
struct Cli {
  /// Runfiles MANIFEST file to read.
  #[arg(long, value_name = "FILE")]
  manifest: Option<PathBuf>,
  /// Runfiles directory to search.
  #[arg(long, value_name = "DIR")]
  runfiles_dir: Option<PathBuf>,
  /// Workspace name tried as a prefix when a lookup misses.
  #[arg(long, value_name = "NAME")]
  workspace: Option<String>,
  /// Executable whose `.runfiles_manifest` / `.runfiles` siblings should be used.
  #[arg(long, value_name = "FILE")]
  executable: Option<PathBuf>,
  /// JSON configuration file. Defaults to `runfiles.config.json` in the working directory.
  #[arg(long, value_name = "FILE")]
  config: Option<PathBuf>,
  /// Print every known runfile instead of resolving paths.
  #[arg(long)]
  list: bool,
  /// Emit JSON instead of plain text.
  #[arg(long)]
  json: bool,
  /// Increase log verbosity (-v debug, -vv trace).
  #[arg(short, long, action = clap::ArgAction::Count)]
  verbose: u8,
  /// Logical paths to resolve.
  #[arg(required_unless_present = "list")]
  paths: Vec<String>,
}

#[derive(Serialize)]
struct Resolution<'a> {
  requested: &'a str,
  #[serde(skip_serializing_if = "Option::is_none")]
  physical: Option<PathBuf>,
  #[serde(skip_serializing_if = "Option::is_none")]
  suggestion: Option<&'a str>,
  #[serde(skip_serializing_if = "Option::is_none")]
  error: Option<String>,
}

fn main() -> Result<ExitCode> {
  let cli = Cli::parse();
  logging::init(cli.verbose);

  let config = load_config(&cli)?;
  debug!(?config, "runfiles configuration");
  let runfiles = Runfiles::discover(&config).context("failed to locate runfiles")?;

  if cli.list {
    let entries = runfiles.list_entries().context("failed to list runfiles")?;
    print_entries(&entries, cli.json)?;
    return Ok(ExitCode::SUCCESS);
  }

  let resolver = Resolver::new(runfiles);
  let results: Vec<_> = cli
    .paths
    .iter()
    .map(|path| (path.as_str(), resolver.resolve(path)))
    .collect();
  let failed = results.iter().any(|(_, result)| result.is_err());

  if cli.json {
    let report: Vec<Resolution> = results
      .iter()
      .map(|(requested, result)| match result {
        Ok(physical) => Resolution {
          requested,
          physical: Some(physical.clone()),
          suggestion: None,
          error: None,
        },
        Err(err) => Resolution {
          requested,
          physical: None,
          suggestion: err.suggestion().map(|entry| entry.logical_path.as_str()),
          error: Some(err.to_string()),
        },
      })
      .collect();
    println!("{}", serde_json::to_string_pretty(&report)?);
  } else {
    for (_, result) in &results {
      match result {
        Ok(physical) => println!("{}", physical.display()),
        Err(err) => eprintln!("error: {err}"),
      }
    }
  }

  Ok(if failed {
    ExitCode::FAILURE
  } else {
    ExitCode::SUCCESS
  })
}

/// Flags win over the configuration file, which wins over the environment.
fn load_config(cli: &Cli) -> Result<RunfilesConfig> {
  let flags = RunfilesConfig {
    manifest_file: cli.manifest.clone(),
    runfiles_dir: cli.runfiles_dir.clone(),
    workspace: cli.workspace.clone(),
    executable: cli.executable.clone(),
  };

  let file = match &cli.config {
    Some(path) => {
      let base = path.parent().unwrap_or(Path::new(""));
      RunfilesConfig::from_path(path)
        .with_context(|| format!("failed to load configuration {}", path.display()))?
        .relative_to(base)
    }
    None => {
      let cwd = env::current_dir().context("failed to read working directory")?;
      RunfilesConfig::discover(&cwd).relative_to(&cwd)
    }
  };

  let environment = RunfilesConfig::from_env_with(|key| env::var(key).ok());
  Ok(RunfilesConfig::layered(flags, file, environment))
}

fn print_entries(entries: &[RunfileEntry], json: bool) -> Result<()> {
  if json {
    println!("{}", serde_json::to_string_pretty(entries)?);
    return Ok(());
  }

  for entry in entries {
    println!("{}\t{}", entry.logical_path, entry.physical().display());
  }
  Ok(())
}
