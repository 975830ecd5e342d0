//! Code synthesis: turns a retrieved action plus parameter overrides into
//! ready-to-run source text.
//!
//! The emitted program imports the action from its declared module, calls it
//! with resolved arguments, prints and returns the result, and re-raises on
//! failure so the external runner observes a non-zero outcome. The core
//! never executes this text.

use crate::error::{AppError, Result};
use crate::registry::ActionDescriptor;
use serde_json::{Map, Value};

/// True when `s` is usable as a bare identifier in emitted code.
///
/// Names and modules are interpolated into source text verbatim, so anything
/// that is not a plain identifier is an injection vector and must be
/// rejected at the registration boundary.
pub fn is_safe_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// True when `s` is a dotted path of safe identifiers.
pub fn is_safe_module_path(s: &str) -> bool {
    !s.is_empty() && s.split('.').all(is_safe_identifier)
}

/// Emit standalone source text invoking `descriptor` with resolved
/// arguments.
///
/// Argument resolution walks the schema in declared order: an override wins,
/// then a schema default, and a parameter with neither is omitted from the
/// call entirely — the callable's own default applies, or the call fails at
/// execution time. That deferral is deliberate; generation never validates
/// required-ness. Output is byte-identical for identical
/// (descriptor, overrides) input.
pub fn generate(descriptor: &ActionDescriptor, overrides: &Map<String, Value>) -> Result<String> {
    let call = render_call(descriptor, overrides)?;

    Ok(format!(
        r#"from {module} import {name}


def main():
    """Execute {name} with resolved arguments."""
    try:
        result = {call}
        print("Function executed successfully. Result:", result)
        return result
    except Exception as exc:
        print(f"Error executing function: {{exc}}")
        raise


if __name__ == "__main__":
    main()
"#,
        module = descriptor.module,
        name = descriptor.name,
        call = call,
    ))
}

fn render_call(descriptor: &ActionDescriptor, overrides: &Map<String, Value>) -> Result<String> {
    let mut args = Vec::with_capacity(descriptor.parameters.len());
    for (name, spec) in &descriptor.parameters {
        if let Some(value) = overrides.get(name) {
            args.push(format!("{}={}", name, render_value(name, value)?));
        } else if let Some(default) = &spec.default {
            args.push(format!("{}={}", name, render_value(name, default)?));
        }
        // No override and no default: the argument is omitted from the call.
    }
    Ok(format!("{}({})", descriptor.name, args.join(", ")))
}

/// Render one value as a literal. Strings are single-quoted with escaping;
/// non-primitive values have no canonical literal form and are rejected.
fn render_value(name: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(quote_str(s)),
        Value::Bool(true) => Ok("True".to_string()),
        Value::Bool(false) => Ok("False".to_string()),
        Value::Null => Ok("None".to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Array(_) | Value::Object(_) => Err(AppError::Validation(format!(
            "Parameter '{}' has a non-primitive value; only strings, numbers, booleans, and null are renderable",
            name
        ))),
    }
}

fn quote_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}
