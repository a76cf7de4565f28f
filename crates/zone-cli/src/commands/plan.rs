//! `zone plan` — Show namespaces, bindings and alias resolution order.

use std::io::Write;

use clap::Args;
use zone_common::types::AccessLevel;
use zone_sdk::planner::{ManifestPlanner, Plan};

use super::Settings;
use crate::output::write_structured;

/// Arguments for the `plan` command.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Also list private and protected bindings.
    #[arg(long, short)]
    pub all: bool,
}

/// Executes the `plan` command.
///
/// Validates the manifest, builds the alias graph and prints what applying
/// it would register. Nothing is resolved.
///
/// # Errors
///
/// Returns an error if loading, validation or ordering fails.
pub fn execute(args: &PlanArgs, settings: &Settings, out: &mut impl Write) -> anyhow::Result<()> {
    let mut plan = ManifestPlanner::load(&settings.manifest)?.plan()?;
    if !args.all {
        for namespace in &mut plan.namespaces {
            namespace
                .bindings
                .retain(|binding| binding.access == AccessLevel::Public);
        }
    }
    if !write_structured(out, settings.output, &plan)? {
        write_text(out, &settings.manifest.display().to_string(), &plan)?;
    }
    Ok(())
}

fn write_text(out: &mut impl Write, source: &str, plan: &Plan) -> std::io::Result<()> {
    writeln!(out, "Binding plan for: {source}")?;
    writeln!(out, "{}", "\u{2550}".repeat(35))?;
    writeln!(out)?;

    let mut total = 0;
    for namespace in &plan.namespaces {
        let label = if namespace.path.is_empty() {
            "<root>"
        } else {
            namespace.path.as_str()
        };
        match &namespace.imports {
            Some(imports) => writeln!(out, "  {label} (imports: {})", imports.join(", "))?,
            None => writeln!(out, "  {label}")?,
        }
        for binding in &namespace.bindings {
            total += 1;
            match &binding.target {
                Some(target) => writeln!(
                    out,
                    "    + {} [{}] -> {target}",
                    binding.name, binding.access
                )?,
                None => writeln!(out, "    + {} [{}]", binding.name, binding.access)?,
            }
        }
    }

    writeln!(out)?;
    writeln!(
        out,
        "  {total} binding(s) in {} namespace(s).",
        plan.namespaces.len()
    )?;
    writeln!(out)?;
    writeln!(out, "  Resolution order:")?;
    for (index, name) in plan.order.iter().enumerate() {
        writeln!(out, "    {}. {name}", index + 1)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::run;
    use crate::output::OutputFormat;

    #[test]
    fn text_plan_lists_public_bindings() {
        let text = run(OutputFormat::Text, |settings, out| {
            execute(&PlanArgs { all: false }, settings, out)
        });
        assert!(text.contains("  app (imports: shared)"));
        assert!(text.contains("    + app.db [public] -> url"));
        assert!(!text.contains("shared.token"));
        assert!(text.contains("3 binding(s) in 2 namespace(s)."));
    }

    #[test]
    fn all_flag_includes_private_bindings() {
        let text = run(OutputFormat::Text, |settings, out| {
            execute(&PlanArgs { all: true }, settings, out)
        });
        assert!(text.contains("    + shared.token [private]"));
    }

    #[test]
    fn json_plan_orders_targets_first() {
        let text = run(OutputFormat::Json, |settings, out| {
            execute(&PlanArgs { all: true }, settings, out)
        });
        let plan: serde_json::Value = serde_json::from_str(&text).expect("json");
        let order: Vec<&str> = plan["order"]
            .as_array()
            .expect("order")
            .iter()
            .filter_map(serde_json::Value::as_str)
            .collect();
        let pos = |name: &str| order.iter().position(|n| *n == name).expect(name);
        assert!(pos("shared.url") < pos("app.db"));
        assert_eq!(order.len(), 4);
    }
}
