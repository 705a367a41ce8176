// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Masks sensitive substrings before they cross a `tracing` boundary.

use std::sync::LazyLock;

use regex::Regex;

#[allow(clippy::expect_used)]
static SECRET_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(api_key|password|token|authorization)([=:]\s*)([^\s&"']+)"#)
        .expect("constant regex pattern is valid")
});

/// Replace the value half of `key=value`/`key: value` pairs for the
/// sensitive key names named in spec §4.4 with `***`.
pub fn redact(text: &str) -> String {
    SECRET_PATTERN.replace_all(text, "$1$2***").to_string()
}

#[cfg(test)]
#[path = "redact_tests.rs"]
mod tests;
