use tempfile::tempdir;

use super::*;

fn write_file(dir: &Path, relative: &str, content: &str) {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("mkdir");
    }
    std::fs::write(path, content).expect("write");
}

#[test]
fn collects_allowed_extensions_in_lexicographic_order() {
    let dir = tempdir().expect("tempdir");
    write_file(dir.path(), "b.rs", "fn b() {}");
    write_file(dir.path(), "a.rs", "fn a() {}");
    write_file(dir.path(), "notes.txt", "ignored");

    let out = summarize(dir.path(), SummaryLimits::default()).expect("summarize");
    let pos_a = out.find("### a.rs").expect("a.rs present");
    let pos_b = out.find("### b.rs").expect("b.rs present");
    assert!(pos_a < pos_b);
    assert!(!out.contains("notes.txt"));
}

#[test]
fn ignores_vendored_and_build_directories() {
    let dir = tempdir().expect("tempdir");
    write_file(dir.path(), "src/main.rs", "fn main() {}");
    write_file(dir.path(), "node_modules/pkg/index.js", "console.log(1)");
    write_file(dir.path(), "target/debug/out.rs", "fn unreachable() {}");

    let out = summarize(dir.path(), SummaryLimits::default()).expect("summarize");
    assert!(out.contains("src/main.rs"));
    assert!(!out.contains("node_modules"));
    assert!(!out.contains("target/debug"));
}

#[test]
fn stops_after_max_files() {
    let dir = tempdir().expect("tempdir");
    for i in 0..5 {
        write_file(dir.path(), &format!("f{i}.rs"), "fn f() {}");
    }
    let limits = SummaryLimits { max_files: 2, ..SummaryLimits::default() };
    let out = summarize(dir.path(), limits).expect("summarize");
    assert_eq!(out.matches("### ").count(), 2);
}

#[test]
fn truncates_to_head_lines_and_marks_it() {
    let dir = tempdir().expect("tempdir");
    let body: String = (0..200).map(|i| format!("line {i}\n")).collect();
    write_file(dir.path(), "big.rs", &body);

    let limits = SummaryLimits { head_lines: 10, ..SummaryLimits::default() };
    let out = summarize(dir.path(), limits).expect("summarize");
    assert!(out.contains("line 9"));
    assert!(!out.contains("line 10\n"));
    assert!(out.contains("截断"));
}

#[test]
fn two_runs_over_unchanged_tree_are_byte_identical() {
    let dir = tempdir().expect("tempdir");
    write_file(dir.path(), "src/lib.rs", "pub fn id() {}");
    write_file(dir.path(), "src/util/mod.rs", "pub fn helper() {}");

    let first = summarize(dir.path(), SummaryLimits::default()).expect("summarize");
    let second = summarize(dir.path(), SummaryLimits::default()).expect("summarize");
    assert_eq!(first, second);
}

#[test]
fn empty_directory_yields_zero_file_digest() {
    let dir = tempdir().expect("tempdir");
    let out = summarize(dir.path(), SummaryLimits::default()).expect("summarize");
    assert!(out.contains("文件数: 0"));
}
