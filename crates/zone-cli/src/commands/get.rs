//! `zone get` — Resolve one binding and print its value.

use std::io::Write;

use clap::Args;

use super::Settings;
use crate::output::{instance_to_json, render_instance, write_structured};

/// Arguments for the `get` command.
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Full dotted name of a public binding, e.g. `app.db.conn`.
    pub name: String,
}

/// Executes the `get` command.
///
/// # Errors
///
/// Returns an error if the container cannot be built or the binding cannot
/// be resolved.
pub fn execute(args: &GetArgs, settings: &Settings, out: &mut impl Write) -> anyhow::Result<()> {
    let zone = settings.zone()?;
    let instance = zone.get(&args.name)?;
    tracing::debug!(name = %args.name, kind = instance.type_name(), "resolved binding");

    if !write_structured(out, settings.output, &instance_to_json(&instance))? {
        writeln!(out, "{}", render_instance(&instance))?;
    }
    Ok(())
}
