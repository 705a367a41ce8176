// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Source Summarizer: turns a project directory into a bounded Markdown
//! digest usable as Writer/Reviewer context for `code` mode jobs (spec §4.5).
//!
//! Traversal is breadth-first and lexicographically ordered within each
//! directory so that two runs over an unchanged tree produce byte-identical
//! output.

use std::collections::VecDeque;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::EngineError;

/// Stop accepting files once this many have been collected.
pub const DEFAULT_MAX_FILES: usize = 200;

/// Stop accepting files once their combined (head-truncated) content
/// reaches this many bytes.
pub const DEFAULT_MAX_BYTES: usize = 400_000;

/// Only the first `HEAD_LINES` lines of each accepted file are included.
pub const DEFAULT_HEAD_LINES: usize = 80;

const IGNORED_DIR_NAMES: &[&str] = &[
    ".git", ".hg", ".svn", "node_modules", "target", "dist", "build", ".venv", "venv",
    "__pycache__", "vendor", ".idea", ".vscode",
];

const ALLOWED_EXTENSIONS: &[&str] = &[
    "rs", "py", "js", "jsx", "ts", "tsx", "go", "java", "c", "h", "cpp", "cc", "hpp", "cs", "rb",
    "php", "swift", "kt", "kts", "scala", "sh", "sql", "toml", "yaml", "yml", "proto",
];

#[derive(Debug, Clone, Copy)]
pub struct SummaryLimits {
    pub max_files: usize,
    pub max_bytes: usize,
    pub head_lines: usize,
}

impl Default for SummaryLimits {
    fn default() -> Self {
        Self {
            max_files: DEFAULT_MAX_FILES,
            max_bytes: DEFAULT_MAX_BYTES,
            head_lines: DEFAULT_HEAD_LINES,
        }
    }
}

struct CollectedFile {
    relative_path: String,
    content: String,
    truncated: bool,
}

/// Walk `project_path` breadth-first and render a Markdown digest of the
/// source files found, respecting `limits`.
pub fn summarize(project_path: &Path, limits: SummaryLimits) -> Result<String, EngineError> {
    let files = collect(project_path, limits)?;
    Ok(render(project_path, &files))
}

fn collect(project_path: &Path, limits: SummaryLimits) -> Result<Vec<CollectedFile>, EngineError> {
    let mut queue: VecDeque<PathBuf> = VecDeque::new();
    queue.push_back(project_path.to_path_buf());

    let mut collected = Vec::new();
    let mut total_bytes = 0usize;

    'outer: while let Some(dir) = queue.pop_front() {
        let mut entries: Vec<_> = std::fs::read_dir(&dir)?.filter_map(Result::ok).collect();
        entries.sort_by_key(|entry| entry.file_name());

        let mut subdirs = Vec::new();
        for entry in entries {
            if collected.len() >= limits.max_files || total_bytes >= limits.max_bytes {
                break 'outer;
            }

            let path = entry.path();
            let file_type = entry.file_type()?;

            if file_type.is_dir() {
                let name = entry.file_name();
                let name = name.to_string_lossy();
                if !IGNORED_DIR_NAMES.contains(&name.as_ref()) {
                    subdirs.push(path);
                }
                continue;
            }

            if !file_type.is_file() {
                continue;
            }

            let Some(ext) = path.extension().and_then(|e| e.to_str()) else { continue };
            if !ALLOWED_EXTENSIONS.contains(&ext) {
                continue;
            }

            let (content, truncated) = read_head(&path, limits.head_lines)?;
            total_bytes += content.len();
            let relative_path = path
                .strip_prefix(project_path)
                .unwrap_or(&path)
                .to_string_lossy()
                .replace('\\', "/");
            collected.push(CollectedFile { relative_path, content, truncated });
        }

        queue.extend(subdirs);
    }

    Ok(collected)
}

fn read_head(path: &Path, head_lines: usize) -> Result<(String, bool), std::io::Error> {
    let file = std::fs::File::open(path)?;
    let reader = BufReader::new(file);
    let mut lines = Vec::with_capacity(head_lines);
    let mut truncated = false;
    for (i, line) in reader.lines().enumerate() {
        if i >= head_lines {
            truncated = true;
            break;
        }
        lines.push(line.unwrap_or_default());
    }
    Ok((lines.join("\n"), truncated))
}

fn fence_language(relative_path: &str) -> &'static str {
    match Path::new(relative_path).extension().and_then(|e| e.to_str()) {
        Some("rs") => "rust",
        Some("py") => "python",
        Some("js") | Some("jsx") => "javascript",
        Some("ts") | Some("tsx") => "typescript",
        Some("go") => "go",
        Some("java") => "java",
        Some("c") | Some("h") => "c",
        Some("cpp") | Some("cc") | Some("hpp") => "cpp",
        Some("cs") => "csharp",
        Some("rb") => "ruby",
        Some("php") => "php",
        Some("swift") => "swift",
        Some("kt") | Some("kts") => "kotlin",
        Some("scala") => "scala",
        Some("sh") => "bash",
        Some("sql") => "sql",
        Some("toml") => "toml",
        Some("yaml") | Some("yml") => "yaml",
        Some("proto") => "protobuf",
        _ => "",
    }
}

fn render(project_path: &Path, files: &[CollectedFile]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "# 项目摘要: {}\n\n文件数: {}\n\n",
        project_path.display(),
        files.len()
    ));
    for file in files {
        out.push_str(&format!("### {}\n", file.relative_path));
        out.push_str(&format!("```{}\n", fence_language(&file.relative_path)));
        out.push_str(&file.content);
        if !file.content.ends_with('\n') {
            out.push('\n');
        }
        out.push_str("```\n");
        if file.truncated {
            out.push_str("_(截断)_\n");
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
#[path = "summarizer_tests.rs"]
mod tests;
