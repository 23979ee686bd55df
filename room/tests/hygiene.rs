//! Source hygiene checks for the room crate.
//!
//! Each pattern has a budget that only ever goes down. Files ending in
//! `_test.rs` are exempt.

use std::fs;
use std::path::{Path, PathBuf};

struct SourceFile {
    path: PathBuf,
    content: String,
}

fn source_files() -> Vec<SourceFile> {
    let mut files = Vec::new();
    walk(Path::new("src"), &mut files);
    files
}

fn walk(dir: &Path, out: &mut Vec<SourceFile>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for path in entries.flatten().map(|entry| entry.path()) {
        if path.is_dir() {
            walk(&path, out);
            continue;
        }
        let is_rs = path.extension().is_some_and(|e| e == "rs");
        let is_test = path.to_string_lossy().ends_with("_test.rs");
        if !is_rs || is_test {
            continue;
        }
        if let Ok(content) = fs::read_to_string(&path) {
            out.push(SourceFile { path, content });
        }
    }
}

/// Fail with a per-file breakdown when `pattern` appears on more than `max` lines.
fn enforce(pattern: &str, max: usize) {
    let hits: Vec<(String, usize)> = source_files()
        .iter()
        .map(|file| (file.path.display().to_string(), file.content.lines().filter(|l| l.contains(pattern)).count()))
        .filter(|(_, count)| *count > 0)
        .collect();
    let found: usize = hits.iter().map(|(_, count)| count).sum();
    let detail = hits.iter().map(|(path, count)| format!("  {path}: {count}")).collect::<Vec<_>>().join("\n");
    assert!(found <= max, "`{pattern}` budget exceeded: found {found}, max {max}.\n{detail}");
}

#[test]
fn sources_are_found() {
    assert!(source_files().iter().any(|f| f.path.ends_with("engine.rs")));
}

// Panics.

#[test]
fn unwrap_budget() {
    enforce(".unwrap()", 0);
}

#[test]
fn expect_budget() {
    enforce(".expect(", 0);
}

#[test]
fn panic_budget() {
    enforce("panic!(", 0);
}

#[test]
fn unreachable_budget() {
    enforce("unreachable!(", 0);
}

#[test]
fn todo_budget() {
    enforce("todo!(", 0);
}

#[test]
fn unimplemented_budget() {
    enforce("unimplemented!(", 0);
}

// Silently dropped errors.

#[test]
fn silent_discard_budget() {
    enforce("let _ =", 0);
}

#[test]
fn dot_ok_budget() {
    enforce(".ok()", 0);
}

// Output goes through tracing.

#[test]
fn println_budget() {
    enforce("println!(", 0);
}

#[test]
fn eprintln_budget() {
    enforce("eprintln!(", 0);
}

#[test]
fn allow_dead_code_budget() {
    enforce("#[allow(dead_code)]", 0);
}
