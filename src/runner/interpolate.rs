//! Variable interpolation for command arguments
//!
//! Resolution runs five passes in a fixed order. Each pass is a single regex
//! scan, so text inserted by one pass is seen by the later passes only:
//!
//! 1. `?N` - positional argument of the running task (1-based)
//! 2. `?key` - named invocation argument
//! 3. `$NAME` - variable declared at script scope
//! 4. `$NAME` - variable assigned at runtime by a `var` command
//! 5. `$env("NAME")` - environment lookup, empty when unset
//!
//! Pass 3 skips names that also exist at runtime, so pass 4 sees the original
//! reference and a runtime variable always wins. Unknown references are left
//! verbatim.

use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;

static POSITIONAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\?(\d+)").unwrap());
static NAMED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\?(\w+)").unwrap());
static VARIABLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$(\w+)(\()?").unwrap());
static ENV_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\$env\(\s*"?([^")]*)"?\s*\)"#).unwrap());

/// Everything a reference can resolve against
pub struct Scope<'a> {
    /// Positional arguments of the running task
    pub positional: &'a [String],

    /// Invocation-wide named arguments
    pub named: &'a HashMap<String, String>,

    /// Variables declared at script scope
    pub declared: &'a HashMap<String, String>,

    /// Variables assigned by `var` commands
    pub runtime: &'a HashMap<String, String>,

    /// Environment lookup
    pub env: &'a dyn Fn(&str) -> Option<String>,
}

/// Resolve every reference in `text`
pub fn interpolate(text: &str, scope: &Scope<'_>) -> String {
    let text = substitute_positional(text, scope.positional);
    let text = substitute_named(&text, scope.named);
    let text = substitute_declared(&text, scope.declared, scope.runtime);
    let text = substitute_runtime(&text, scope.runtime);
    substitute_env(&text, scope.env)
}

/// Replace `?N` with the N-th positional argument; out of range stays as is
pub fn substitute_positional(text: &str, args: &[String]) -> String {
    POSITIONAL
        .replace_all(text, |caps: &Captures| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|index| args.get(index))
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Replace `?key` with the named argument `key`
pub fn substitute_named(text: &str, named: &HashMap<String, String>) -> String {
    NAMED
        .replace_all(text, |caps: &Captures| {
            named
                .get(&caps[1])
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Replace `$NAME` with a declared variable, unless a runtime variable of
/// the same name shadows it
pub fn substitute_declared(
    text: &str,
    declared: &HashMap<String, String>,
    runtime: &HashMap<String, String>,
) -> String {
    substitute_vars(text, |name| {
        if runtime.contains_key(name) {
            None
        } else {
            declared.get(name)
        }
    })
}

/// Replace `$NAME` with a variable assigned by a `var` command
pub fn substitute_runtime(text: &str, runtime: &HashMap<String, String>) -> String {
    substitute_vars(text, |name| runtime.get(name))
}

// `$env(` belongs to the environment pass.
fn substitute_vars<'v>(text: &str, lookup: impl Fn(&str) -> Option<&'v String>) -> String {
    VARIABLE
        .replace_all(text, |caps: &Captures| {
            let call = caps.get(2).is_some();
            if call && &caps[1] == "env" {
                return caps[0].to_string();
            }
            match lookup(&caps[1]) {
                Some(value) if call => format!("{}(", value),
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Replace `$env("NAME")` with the environment value, or "" when unset
pub fn substitute_env(text: &str, env: &dyn Fn(&str) -> Option<String>) -> String {
    ENV_REF
        .replace_all(text, |caps: &Captures| {
            let name = caps[1].trim();
            if name.is_empty() {
                return String::new();
            }
            env(name).unwrap_or_default()
        })
        .into_owned()
}
