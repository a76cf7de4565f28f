//! Formatted output helpers for CLI commands.
//!
//! Structured results go out as text, JSON or YAML. Resolved instances are
//! rendered as JSON when they hold manifest data and by type otherwise.

use std::io::Write;

use clap::ValueEnum;
use serde::Serialize;
use zone_sdk::Instance;

/// How a command prints its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    Text,
    /// Pretty-printed JSON.
    Json,
    /// YAML.
    Yaml,
}

/// Writes `value` in a structured format. Returns `false` for
/// [`OutputFormat::Text`], leaving the caller to print it.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn write_structured<T: Serialize>(
    out: &mut impl Write,
    format: OutputFormat,
    value: &T,
) -> anyhow::Result<bool> {
    match format {
        OutputFormat::Text => return Ok(false),
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, value)?;
            writeln!(out)?;
        }
        OutputFormat::Yaml => serde_yaml::to_writer(&mut *out, value)?,
    }
    Ok(true)
}

/// Converts a resolved instance to JSON: manifest data as-is, common
/// scalars by value, anything else as `"<type name>"`.
#[must_use]
pub fn instance_to_json(instance: &Instance) -> serde_json::Value {
    if let Some(value) = instance.downcast_ref::<serde_json::Value>() {
        return value.clone();
    }
    if let Some(text) = instance.downcast_ref::<String>() {
        return serde_json::Value::from(text.as_str());
    }
    if let Some(flag) = instance.downcast_ref::<bool>() {
        return serde_json::Value::from(*flag);
    }
    if let Some(number) = instance.downcast_ref::<i64>() {
        return serde_json::Value::from(*number);
    }
    if let Some(number) = instance.downcast_ref::<f64>() {
        return serde_json::Value::from(*number);
    }
    serde_json::Value::from(format!("<{}>", instance.type_name()))
}

/// Renders an instance for text output: strings unquoted, other JSON
/// compact.
#[must_use]
pub fn render_instance(instance: &Instance) -> String {
    match instance_to_json(instance) {
        serde_json::Value::String(text) => text,
        other => other.to_string(),
    }
}
