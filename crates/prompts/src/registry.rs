// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Prompt Store & Template Registry: loads role templates from a file tree,
//! validates them, and serves a read-mostly cache that reloads atomically
//! (build a new map, then swap it in).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use patentloom_core::Role;
use serde::Deserialize;

use crate::descriptor::{describe, TemplateDescriptor};
use crate::error::PromptError;

/// The filename the Job Manager writes the canonical role template under
/// (spec §6 persisted-state layout: `prompts/<role>/base_prompt.yaml`).
pub const DEFAULT_TEMPLATE_FILE: &str = "base_prompt";

/// The two roles a Prompt Template can be authored for. Round 1 renders the
/// writer template as-is; rounds 2..N render the same template with its
/// `previous_draft`/`previous_review` context sections populated (the
/// "modifier" variant named in spec §4.2 is not a separate template).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateRole {
    Writer,
    Reviewer,
}

impl TemplateRole {
    pub fn as_str(self) -> &'static str {
        match self {
            TemplateRole::Writer => "writer",
            TemplateRole::Reviewer => "reviewer",
        }
    }
}

impl From<Role> for TemplateRole {
    fn from(role: Role) -> Self {
        match role {
            Role::Writer | Role::Modifier => TemplateRole::Writer,
            Role::Reviewer => TemplateRole::Reviewer,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContextSection {
    pub title: String,
    pub placeholder: String,
    #[serde(default)]
    pub condition: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IterationPhase {
    pub instruction: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IterationPhases {
    pub first_iteration: IterationPhase,
    pub subsequent_iteration: IterationPhase,
}

/// The YAML-defined shape of a role's prompt (spec §3 "Prompt Template").
#[derive(Debug, Clone, Deserialize)]
pub struct PromptTemplate {
    #[serde(default)]
    pub name: Option<String>,
    pub role_line: String,
    pub objective: String,
    pub requirements: Vec<String>,
    pub final_instruction: String,
    #[serde(default)]
    pub context_sections: Vec<ContextSection>,
    pub iteration_phases: IterationPhases,
}

/// A template together with the labeling metadata the registry attaches.
pub struct LoadedTemplate {
    pub id: String,
    pub name: String,
    pub is_default: bool,
    pub role: TemplateRole,
    pub template: PromptTemplate,
}

fn validate(role: TemplateRole, template: &PromptTemplate) -> Result<(), PromptError> {
    let blank = |s: &str| s.trim().is_empty();
    if blank(&template.role_line) {
        return Err(PromptError::InvalidTemplate {
            role: role.as_str(),
            reason: "role_line must be non-empty".into(),
        });
    }
    if blank(&template.objective) || blank(&template.final_instruction) {
        return Err(PromptError::InvalidTemplate {
            role: role.as_str(),
            reason: "objective and final_instruction must be non-empty".into(),
        });
    }
    if template.requirements.is_empty() {
        return Err(PromptError::InvalidTemplate {
            role: role.as_str(),
            reason: "requirements must not be empty".into(),
        });
    }
    if blank(&template.iteration_phases.first_iteration.instruction)
        || blank(&template.iteration_phases.subsequent_iteration.instruction)
    {
        return Err(PromptError::InvalidTemplate {
            role: role.as_str(),
            reason: "iteration_phases instructions must be non-empty".into(),
        });
    }
    Ok(())
}

pub(crate) fn compiled_default(role: TemplateRole) -> PromptTemplate {
    match role {
        TemplateRole::Writer => PromptTemplate {
            name: Some("内置默认撰写模板".to_string()),
            role_line: "你是一名中国发明专利撰写专家。".to_string(),
            objective: "基于给定的技术背景撰写一份结构完整的发明专利申请初稿。".to_string(),
            requirements: vec![
                "使用规范的专利文书语言。".to_string(),
                "完整覆盖技术方案的创新点。".to_string(),
                "包含权利要求、说明书摘要与具体实施方式。".to_string(),
            ],
            final_instruction: "请直接输出完整的专利申请文本。".to_string(),
            context_sections: vec![
                ContextSection {
                    title: "技术背景".to_string(),
                    placeholder: "{{context}}".to_string(),
                    condition: None,
                },
                ContextSection {
                    title: "上一稿".to_string(),
                    placeholder: "{{previous_draft}}".to_string(),
                    condition: Some("previous_draft".to_string()),
                },
                ContextSection {
                    title: "上一轮评审意见".to_string(),
                    placeholder: "{{previous_review}}".to_string(),
                    condition: Some("previous_review".to_string()),
                },
            ],
            iteration_phases: IterationPhases {
                first_iteration: IterationPhase {
                    instruction: "这是第一轮撰写，请从零开始完成初稿。".to_string(),
                },
                subsequent_iteration: IterationPhase {
                    instruction: "请根据上一稿与评审意见修改完善草稿。".to_string(),
                },
            },
        },
        TemplateRole::Reviewer => PromptTemplate {
            name: Some("内置默认评审模板".to_string()),
            role_line: "你是一名中国发明专利审查专家。".to_string(),
            objective: "对给定的专利申请草稿给出结构化的修改意见。".to_string(),
            requirements: vec![
                "逐条列出存在的问题。".to_string(),
                "指出权利要求的保护范围是否清晰。".to_string(),
                "给出具体的修改建议。".to_string(),
            ],
            final_instruction: "请以条目形式输出评审意见。".to_string(),
            context_sections: vec![
                ContextSection {
                    title: "技术背景".to_string(),
                    placeholder: "{{context}}".to_string(),
                    condition: None,
                },
                ContextSection {
                    title: "当前草稿".to_string(),
                    placeholder: "{{current_draft}}".to_string(),
                    condition: Some("current_draft".to_string()),
                },
            ],
            iteration_phases: IterationPhases {
                first_iteration: IterationPhase {
                    instruction: "这是对第一稿的评审。".to_string(),
                },
                subsequent_iteration: IterationPhase {
                    instruction: "这是对修改稿的复审，请关注是否已解决上一轮问题。".to_string(),
                },
            },
        },
    }
}

fn load_one(path: &Path, role: TemplateRole) -> Result<PromptTemplate, PromptError> {
    let text = std::fs::read_to_string(path)?;
    let template: PromptTemplate = serde_yaml::from_str(&text)?;
    validate(role, &template)?;
    Ok(template)
}

/// Read-mostly cache of per-role templates, atomically swapped on reload.
pub struct TemplateRegistry {
    dir: PathBuf,
    per_role: RwLock<HashMap<TemplateRole, Arc<LoadedTemplate>>>,
    catalog: RwLock<Vec<Arc<LoadedTemplate>>>,
}

impl TemplateRegistry {
    /// Load templates from `dir` (expected layout: `<dir>/<role>/*.yaml`).
    /// A template that fails validation is skipped with a `tracing::warn!`
    /// and the compiled-in default is used for that role instead.
    pub fn load(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let (per_role, catalog) = Self::load_all(&dir);
        Self { dir, per_role: RwLock::new(per_role), catalog: RwLock::new(catalog) }
    }

    fn load_all(dir: &Path) -> (HashMap<TemplateRole, Arc<LoadedTemplate>>, Vec<Arc<LoadedTemplate>>) {
        let mut per_role = HashMap::new();
        let mut catalog = Vec::new();

        for role in [TemplateRole::Writer, TemplateRole::Reviewer] {
            let role_dir = dir.join(role.as_str());
            let mut entries: Vec<PathBuf> = std::fs::read_dir(&role_dir)
                .map(|rd| {
                    rd.filter_map(|e| e.ok())
                        .map(|e| e.path())
                        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("yaml"))
                        .collect()
                })
                .unwrap_or_default();
            entries.sort();

            for path in &entries {
                let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("template").to_string();
                match load_one(path, role) {
                    Ok(template) => {
                        let is_default = stem == DEFAULT_TEMPLATE_FILE;
                        let loaded = Arc::new(LoadedTemplate {
                            id: format!("{}/{}", role.as_str(), stem),
                            name: template.name.clone().unwrap_or_else(|| stem.clone()),
                            is_default,
                            role,
                            template,
                        });
                        if is_default || !per_role.contains_key(&role) {
                            per_role.insert(role, loaded.clone());
                        }
                        catalog.push(loaded);
                    }
                    Err(err) => {
                        tracing::warn!(role = role.as_str(), path = %path.display(), %err,
                            "skipping invalid prompt template, falling back to compiled-in default");
                    }
                }
            }

            if !per_role.contains_key(&role) {
                let fallback = Arc::new(LoadedTemplate {
                    id: format!("{}/{DEFAULT_TEMPLATE_FILE}", role.as_str()),
                    name: "默认模板".to_string(),
                    is_default: true,
                    role,
                    template: compiled_default(role),
                });
                per_role.insert(role, fallback.clone());
                catalog.push(fallback);
            }
        }

        (per_role, catalog)
    }

    /// Rebuild the cache from disk and swap it in atomically.
    pub fn reload(&self) {
        let (per_role, catalog) = Self::load_all(&self.dir);
        *self.per_role.write() = per_role;
        *self.catalog.write() = catalog;
        tracing::info!("prompt template registry reloaded");
    }

    /// The active template to render for `role`.
    pub fn get(&self, role: TemplateRole) -> Arc<LoadedTemplate> {
        self.per_role
            .read()
            .get(&role)
            .cloned()
            .unwrap_or_else(|| {
                Arc::new(LoadedTemplate {
                    id: format!("{}/{DEFAULT_TEMPLATE_FILE}", role.as_str()),
                    name: "默认模板".to_string(),
                    is_default: true,
                    role,
                    template: compiled_default(role),
                })
            })
    }

    /// Descriptor for every known template (writer and reviewer), for the
    /// external `/api/templates/` listing.
    pub fn descriptors(&self) -> Vec<TemplateDescriptor> {
        self.catalog.read().iter().map(|t| describe(t)).collect()
    }

    /// Resolve a `template_id` (as recorded on a Job) to its descriptor.
    pub fn descriptor_by_id(&self, id: &str) -> Option<TemplateDescriptor> {
        self.catalog.read().iter().find(|t| t.id == id).map(|t| describe(t))
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
