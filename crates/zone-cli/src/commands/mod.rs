//! CLI command definitions and dispatch.

pub mod check;
pub mod get;
pub mod names;
pub mod plan;

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use zone_sdk::Zone;
use zone_sdk::builder::ZoneBuilder;

use crate::output::OutputFormat;

/// zone — inspect dependency-injection containers built from manifests.
#[derive(Parser, Debug)]
#[command(name = "zone", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Path to the binding manifest (YAML, or JSON by extension).
    #[arg(long, short, global = true, env = "ZONE_MANIFEST", default_value = zone_common::constants::DEFAULT_MANIFEST)]
    pub manifest: PathBuf,

    /// Skip registering the `$host`, `$console`, `$storage` and `$Worker` bindings.
    #[arg(long, global = true)]
    pub no_host: bool,

    /// Output format.
    #[arg(long, short, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Log filter directive, overriding `RUST_LOG`.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the public binding names of the container.
    Names(names::NamesArgs),
    /// Resolve one binding and print its value.
    Get(get::GetArgs),
    /// Show namespaces, bindings and alias resolution order.
    Plan(plan::PlanArgs),
    /// Validate the manifest without resolving anything.
    Check(check::CheckArgs),
}

/// Options shared by every command.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Manifest to load.
    pub manifest: PathBuf,
    /// Whether host bindings are registered.
    pub host_bindings: bool,
    /// How results are printed.
    pub output: OutputFormat,
}

impl Settings {
    /// Builds a container from the manifest.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be loaded or applied.
    pub fn zone(&self) -> anyhow::Result<Zone> {
        ZoneBuilder::new()
            .manifest(&self.manifest)
            .host_bindings(self.host_bindings)
            .build()
            .with_context(|| format!("failed to build container from {}", self.manifest.display()))
    }
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let settings = Settings {
        manifest: cli.manifest,
        host_bindings: !cli.no_host,
        output: cli.output,
    };
    let mut out = std::io::stdout().lock();
    match cli.command {
        Command::Names(args) => names::execute(&args, &settings, &mut out),
        Command::Get(args) => get::execute(&args, &settings, &mut out),
        Command::Plan(args) => plan::execute(&args, &settings, &mut out),
        Command::Check(args) => check::execute(&args, &settings, &mut out),
    }?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    use std::path::Path;

    use super::Settings;
    use crate::output::OutputFormat;

    pub(crate) const MANIFEST: &str = r#"
namespaces:
  - path: shared
    values:
      url: "postgres://localhost/app"
      "-token": hidden
  - path: app
    imports: [shared]
    constants:
      retries: 3
    aliases:
      db: url
"#;

    pub(crate) fn settings(dir: &Path, output: OutputFormat) -> Settings {
        let manifest = dir.join("zone.yaml");
        std::fs::write(&manifest, MANIFEST).expect("write manifest");
        Settings {
            manifest,
            host_bindings: false,
            output,
        }
    }

    pub(crate) fn run(
        output: OutputFormat,
        command: impl FnOnce(&Settings, &mut Vec<u8>) -> anyhow::Result<()>,
    ) -> String {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings = settings(dir.path(), output);
        let mut out = Vec::new();
        command(&settings, &mut out).expect("command");
        String::from_utf8(out).expect("utf-8")
    }
}
