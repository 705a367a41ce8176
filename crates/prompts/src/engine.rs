// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Prompt Engine: selects the user-custom-or-template prompt for a role and
//! round, expands variables, and enforces the input-length budget.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::LazyLock;

use patentloom_core::Role;
use regex::Regex;

use crate::error::PromptError;
use crate::registry::TemplateRegistry;
use crate::template::interpolate;
use crate::user_prompts::UserPromptStore;

/// The literal marker a user-custom prompt uses to mark where the relevant
/// draft text should be inserted.
pub const DYNAMIC_MARKER: &str = "</text>";

pub const DEFAULT_MAX_INPUT_LENGTH: usize = 12_000;

#[allow(clippy::expect_used)]
static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```").expect("constant regex pattern is valid"));

#[allow(clippy::expect_used)]
static LANGUAGE_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(fn\s+\w+\s*\(|def\s+\w+\s*\(|function\s+\w+\s*\(|class\s+\w+|#include|import\s+[\w.]+|public\s+class)\b")
        .expect("constant regex pattern is valid")
});

/// Strip a generator-produced string down to an empty one if it looks like
/// leaked source code rather than natural-language review text.
fn sanitize_generated(text: &str) -> String {
    if CODE_FENCE.is_match(text) || LANGUAGE_KEYWORD.is_match(text) {
        String::new()
    } else {
        text.to_string()
    }
}

fn truncate_to_fraction(s: &str, fraction: f64) -> String {
    let target = ((s.chars().count() as f64) * fraction).floor() as usize;
    s.chars().take(target).collect()
}

fn relevant_draft<'a>(role: Role, previous_draft: Option<&'a str>, current_draft: Option<&'a str>) -> &'a str {
    match role {
        Role::Modifier => previous_draft.unwrap_or(""),
        Role::Reviewer => current_draft.unwrap_or(""),
        Role::Writer => "",
    }
}

fn variables(
    context: &str,
    previous_draft: Option<&str>,
    previous_review: Option<&str>,
    current_draft: Option<&str>,
    iteration_index: u32,
    total: u32,
    template_id: Option<&str>,
) -> HashMap<String, String> {
    let mut vars = HashMap::new();
    vars.insert("context".to_string(), context.to_string());
    if let Some(d) = previous_draft {
        vars.insert("previous_draft".to_string(), d.to_string());
    }
    if let Some(r) = previous_review {
        vars.insert("previous_review".to_string(), r.to_string());
    }
    if let Some(d) = current_draft {
        vars.insert("current_draft".to_string(), d.to_string());
    }
    vars.insert("iteration".to_string(), iteration_index.to_string());
    vars.insert("total_iterations".to_string(), total.to_string());
    if let Some(id) = template_id {
        vars.insert("template_id".to_string(), id.to_string());
    }
    vars
}

/// Assembles the final prompt text for a role and round, per spec §4.3.
pub struct PromptEngine {
    registry: Arc<TemplateRegistry>,
    user_prompts: Arc<UserPromptStore>,
    max_input_length: usize,
}

impl PromptEngine {
    pub fn new(
        registry: Arc<TemplateRegistry>,
        user_prompts: Arc<UserPromptStore>,
        max_input_length: usize,
    ) -> Self {
        Self { registry, user_prompts, max_input_length }
    }

    /// `build(role, iteration_index, total, context, previous_draft?,
    /// previous_review?, current_draft?, template_id?) -> string`.
    #[allow(clippy::too_many_arguments)]
    pub fn build(
        &self,
        role: Role,
        iteration_index: u32,
        total: u32,
        context: &str,
        previous_draft: Option<&str>,
        previous_review: Option<&str>,
        current_draft: Option<&str>,
        template_id: Option<&str>,
    ) -> Result<String, PromptError> {
        // `context` is user/summarizer-supplied, not model-generated, so it
        // is exempt from the code-leakage filter (the summarizer legitimately
        // emits fenced code blocks).
        let mut context = context.to_string();
        let mut previous_draft = previous_draft.map(sanitize_generated);
        let mut previous_review = previous_review.map(sanitize_generated);
        let current_draft = current_draft.map(sanitize_generated);

        for attempt in 0..4 {
            let assembled = self.assemble(
                role,
                iteration_index,
                total,
                &context,
                previous_draft.as_deref(),
                previous_review.as_deref(),
                current_draft.as_deref(),
                template_id,
            )?;
            if assembled.chars().count() <= self.max_input_length {
                return Ok(assembled);
            }
            if attempt == 3 {
                return Err(PromptError::TooLarge);
            }
            match attempt {
                0 => context = truncate_to_fraction(&context, 0.6),
                1 => {
                    if let Some(d) = previous_draft.as_deref() {
                        previous_draft = Some(truncate_to_fraction(d, 0.6));
                    }
                }
                2 => {
                    if let Some(r) = previous_review.as_deref() {
                        previous_review = Some(truncate_to_fraction(r, 0.6));
                    }
                }
                _ => unreachable!(),
            }
        }
        Err(PromptError::TooLarge)
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        &self,
        role: Role,
        iteration_index: u32,
        total: u32,
        context: &str,
        previous_draft: Option<&str>,
        previous_review: Option<&str>,
        current_draft: Option<&str>,
        template_id: Option<&str>,
    ) -> Result<String, PromptError> {
        let vars =
            variables(context, previous_draft, previous_review, current_draft, iteration_index, total, template_id);

        if let Some(custom) = self.custom_prompt_for(role) {
            let draft = relevant_draft(role, previous_draft, current_draft);
            if custom.contains(DYNAMIC_MARKER) {
                let replaced = custom.replace(DYNAMIC_MARKER, draft);
                return Ok(interpolate(&replaced, &vars));
            }
            let with_context = format!(
                "{custom}\n\n--- 动态上下文 ---\n{draft}\n--- 动态上下文结束 ---\n"
            );
            return Ok(interpolate(&with_context, &vars));
        }

        Ok(self.render_template(role, iteration_index, &vars, template_id))
    }

    fn custom_prompt_for(&self, role: Role) -> Option<String> {
        let record = self.user_prompts.get();
        let text = match role {
            Role::Writer | Role::Modifier => record.writer_prompt,
            Role::Reviewer => record.reviewer_prompt,
        };
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }

    fn render_template(
        &self,
        role: Role,
        iteration_index: u32,
        vars: &HashMap<String, String>,
        template_id: Option<&str>,
    ) -> String {
        let loaded = self.registry.get(role.into());
        let t = &loaded.template;

        let mut out = String::new();
        out.push_str(&t.role_line);
        out.push('\n');
        out.push_str(&t.objective);
        out.push('\n');
        for (i, requirement) in t.requirements.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, requirement));
        }

        let phase = if iteration_index <= 1 {
            &t.iteration_phases.first_iteration.instruction
        } else {
            &t.iteration_phases.subsequent_iteration.instruction
        };
        out.push_str(phase);
        out.push('\n');

        for section in &t.context_sections {
            let included = match &section.condition {
                Some(name) => vars.get(name).is_some_and(|v| !v.trim().is_empty()),
                None => true,
            };
            if !included {
                continue;
            }
            out.push_str(&format!("## {}\n", section.title));
            out.push_str(&interpolate(&section.placeholder, vars));
            out.push('\n');
        }

        if let Some(id) = template_id {
            let label = match self.registry.descriptor_by_id(id) {
                Some(descriptor) => format!("使用模板: {}", descriptor.name),
                None => format!("使用模板ID: {id}"),
            };
            out.push_str(&label);
            out.push('\n');
        }

        out.push_str(&t.final_instruction);
        out
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
