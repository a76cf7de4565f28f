//! `zone names` — List the public binding names of the container.

use std::io::Write;

use clap::Args;
use regex::Regex;

use super::Settings;
use crate::output::write_structured;

/// Arguments for the `names` command.
#[derive(Args, Debug)]
pub struct NamesArgs {
    /// Only list names matching this regular expression.
    #[arg(long, short)]
    pub pattern: Option<String>,
}

/// Executes the `names` command.
///
/// # Errors
///
/// Returns an error if the pattern is invalid or the container cannot be
/// built.
pub fn execute(args: &NamesArgs, settings: &Settings, out: &mut impl Write) -> anyhow::Result<()> {
    let pattern = args.pattern.as_deref().map(Regex::new).transpose()?;
    let zone = settings.zone()?;
    let names = match &pattern {
        Some(pattern) => zone.names_matching(pattern),
        None => zone.names(),
    };
    tracing::debug!(count = names.len(), "listing names");

    if !write_structured(out, settings.output, &names)? {
        for name in &names {
            writeln!(out, "{name}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::run;
    use crate::output::OutputFormat;

    #[test]
    fn lists_public_names_sorted() {
        let text = run(OutputFormat::Text, |settings, out| {
            execute(&NamesArgs { pattern: None }, settings, out)
        });
        assert_eq!(text, "app.db\napp.retries\nshared.url\n");
    }

    #[test]
    fn pattern_filters_names() {
        let text = run(OutputFormat::Json, |settings, out| {
            execute(
                &NamesArgs {
                    pattern: Some("^shared\\.".to_string()),
                },
                settings,
                out,
            )
        });
        let names: Vec<String> = serde_json::from_str(&text).expect("json");
        assert_eq!(names, vec!["shared.url"]);
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings = crate::commands::testing::settings(dir.path(), OutputFormat::Text);
        let args = NamesArgs {
            pattern: Some("(".to_string()),
        };
        assert!(execute(&args, &settings, &mut Vec::new()).is_err());
    }
}
