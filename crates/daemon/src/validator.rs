// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request Validator: input sanitation and bounds (spec §2, §7 `Invalid`).

use patentloom_core::{JobInput, Mode, MAX_ITERATIONS, MIN_ITERATIONS};

#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

/// A filename is file-system safe if it carries no path separators or
/// traversal components; it becomes `<output_name>.md` under a fixed
/// output directory, never an arbitrary path.
fn is_safe_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains('/')
        && !name.contains('\\')
        && name != "."
        && name != ".."
}

pub fn validate(input: &JobInput) -> Result<(), ValidationError> {
    if input.iterations < MIN_ITERATIONS || input.iterations > MAX_ITERATIONS {
        return Err(ValidationError(format!(
            "iterations must be between {MIN_ITERATIONS} and {MAX_ITERATIONS}, got {}",
            input.iterations
        )));
    }

    match input.mode {
        Mode::Idea => {
            let blank = input.idea_text.as_deref().map(str::trim).unwrap_or("").is_empty();
            if blank {
                return Err(ValidationError("ideaText must not be empty in idea mode".to_string()));
            }
        }
        Mode::Code => match &input.project_path {
            Some(path) if path.is_dir() => {}
            Some(path) => {
                return Err(ValidationError(format!("projectPath does not exist: {}", path.display())))
            }
            None => return Err(ValidationError("projectPath is required in code mode".to_string())),
        },
    }

    if let Some(name) = &input.output_name {
        if !is_safe_file_name(name) {
            return Err(ValidationError(format!("outputName is not a valid file name: {name}")));
        }
    }

    if let Some(template_id) = &input.template_id {
        if template_id.trim().is_empty() {
            return Err(ValidationError("templateId must not be blank when provided".to_string()));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
