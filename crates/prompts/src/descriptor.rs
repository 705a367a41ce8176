// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Template Descriptor: labeling metadata for a loaded template.

use serde::Serialize;

use crate::registry::LoadedTemplate;
use crate::template::placeholder_names;

/// Describes a loaded template for listing and labeling purposes.
///
/// This never carries template body text; inserting template content into a
/// rendered document is the document renderer's job, not this crate's.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateDescriptor {
    pub id: String,
    pub name: String,
    pub is_default: bool,
    pub is_valid: bool,
    pub placeholder_count: usize,
    pub section_count: usize,
}

pub(crate) fn describe(loaded: &LoadedTemplate) -> TemplateDescriptor {
    let t = &loaded.template;
    let mut text = String::new();
    text.push_str(&t.role_line);
    text.push('\n');
    text.push_str(&t.objective);
    text.push('\n');
    for req in &t.requirements {
        text.push_str(req);
        text.push('\n');
    }
    text.push_str(&t.final_instruction);
    text.push('\n');
    text.push_str(&t.iteration_phases.first_iteration.instruction);
    text.push('\n');
    text.push_str(&t.iteration_phases.subsequent_iteration.instruction);
    for section in &t.context_sections {
        text.push('\n');
        text.push_str(&section.placeholder);
    }

    TemplateDescriptor {
        id: loaded.id.clone(),
        name: loaded.name.clone(),
        is_default: loaded.is_default,
        is_valid: true,
        placeholder_count: placeholder_names(&text).len(),
        section_count: t.context_sections.len(),
    }
}

#[cfg(test)]
#[path = "descriptor_tests.rs"]
mod tests;
