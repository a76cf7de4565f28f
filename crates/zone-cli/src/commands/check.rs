//! `zone check` — Validate a manifest without resolving anything.

use std::io::Write;

use anyhow::bail;
use clap::Args;
use serde::Serialize;
use zone_compose::NamespaceSpec;
use zone_sdk::planner::ManifestPlanner;

use super::Settings;
use crate::output::write_structured;

/// Arguments for the `check` command.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Only validate the manifest on its own; do not apply it.
    #[arg(long)]
    pub static_only: bool,
}

#[derive(Debug, Serialize)]
struct CheckReport {
    manifest: String,
    namespaces: usize,
    bindings: usize,
    applied: bool,
}

/// Executes the `check` command.
///
/// Runs the static manifest checks, then applies the manifest to a fresh
/// container and rejects import cycles among its namespaces.
///
/// # Errors
///
/// Returns an error describing the first problem found.
pub fn execute(args: &CheckArgs, settings: &Settings, out: &mut impl Write) -> anyhow::Result<()> {
    let planner = ManifestPlanner::load(&settings.manifest)?;
    let _ = planner.resolution_order()?;

    if !args.static_only {
        let zone = settings.zone()?;
        let cycles = zone.import_cycles();
        if let Some(cycle) = cycles.first() {
            bail!("import cycle between namespaces: {}", cycle.join(" -> "));
        }
    }

    let manifest = planner.manifest();
    let report = CheckReport {
        manifest: settings.manifest.display().to_string(),
        namespaces: manifest.namespaces.len(),
        bindings: manifest
            .namespaces
            .iter()
            .map(NamespaceSpec::binding_count)
            .sum(),
        applied: !args.static_only,
    };
    tracing::info!(manifest = %report.manifest, "manifest is valid");
    if !write_structured(out, settings.output, &report)? {
        writeln!(
            out,
            "{}: ok ({} namespace(s), {} binding(s))",
            report.manifest, report.namespaces, report.bindings
        )?;
    }
    Ok(())
}
