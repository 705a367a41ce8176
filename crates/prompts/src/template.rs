// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Variable substitution for prompt templates.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Pattern for `{{name}}` or `{{namespace.name}}`.
#[allow(clippy::expect_used)]
pub static VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{([a-zA-Z_][a-zA-Z0-9_]*(?:\.[a-zA-Z_][a-zA-Z0-9_-]*)*)\}\}")
        .expect("constant regex pattern is valid")
});

/// Pattern for `{{VAR:-default}}`.
#[allow(clippy::expect_used)]
static DEFAULT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{(\w+):-([^}]*)\}\}").expect("constant regex pattern is valid")
});

/// Substitute `{{name}}` placeholders with values from `vars`.
///
/// `{{VAR:-default}}` falls back to `default` when `VAR` is absent from
/// `vars`. Unknown placeholders without a default are left in the output
/// untouched, so a template with a typo'd marker is easy to spot.
pub fn interpolate(template: &str, vars: &HashMap<String, String>) -> String {
    let result = DEFAULT_PATTERN
        .replace_all(template, |caps: &regex::Captures| {
            let name = &caps[1];
            let default_value = &caps[2];
            vars.get(name).cloned().unwrap_or_else(|| default_value.to_string())
        })
        .to_string();

    VAR_PATTERN
        .replace_all(&result, |caps: &regex::Captures| {
            let name = &caps[1];
            match vars.get(name) {
                Some(val) => val.clone(),
                None => caps[0].to_string(),
            }
        })
        .to_string()
}

/// The names referenced by `{{name}}` markers in `template`, in order of
/// first appearance, without duplicates.
pub fn placeholder_names(template: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut names = Vec::new();
    for caps in VAR_PATTERN.captures_iter(template) {
        let name = caps[1].to_string();
        if seen.insert(name.clone()) {
            names.push(name);
        }
    }
    names
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
