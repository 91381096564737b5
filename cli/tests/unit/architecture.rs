//! Structural tests for layer boundaries.
//!
//! These scan source files so the domain stays pure and I/O stays behind
//! the ports.

use std::path::{Path, PathBuf};

fn src_dir(sub: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("src").join(sub)
}

/// Collect all `.rs` files under a directory recursively.
fn collect_rs_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                files.extend(collect_rs_files(&path));
            } else if path.extension().and_then(|e| e.to_str()) == Some("rs") {
                files.push(path);
            }
        }
    }
    files
}

fn rel(path: &Path) -> String {
    path.strip_prefix(env!("CARGO_MANIFEST_DIR"))
        .unwrap_or(path)
        .display()
        .to_string()
}

/// Read a file and strip comment lines to avoid false positives.
fn read_non_comment_lines(path: &Path) -> Vec<String> {
    let Ok(content) = std::fs::read_to_string(path) else {
        return Vec::new();
    };
    content
        .lines()
        .filter(|l| {
            let trimmed = l.trim();
            !trimmed.starts_with("//") && !trimmed.starts_with("/*") && !trimmed.starts_with('*')
        })
        .map(String::from)
        .collect()
}

/// Track brace depth and report whether a line is inside a `#[cfg(test)]` block.
struct CfgTestTracker {
    in_test_block: bool,
    brace_depth: i32,
    test_block_start_depth: i32,
}

impl CfgTestTracker {
    fn new() -> Self {
        Self {
            in_test_block: false,
            brace_depth: 0,
            test_block_start_depth: 0,
        }
    }

    fn process_line(&mut self, line: &str) -> bool {
        if line.trim().contains("#[cfg(test)]") {
            self.in_test_block = true;
            self.test_block_start_depth = self.brace_depth;
        }
        for ch in line.chars() {
            match ch {
                '{' => self.brace_depth += 1,
                '}' => {
                    self.brace_depth -= 1;
                    if self.in_test_block && self.brace_depth <= self.test_block_start_depth {
                        self.in_test_block = false;
                    }
                }
                _ => {}
            }
        }
        self.in_test_block
    }
}

/// Lines outside `#[cfg(test)]` blocks, with comments dropped.
fn production_lines(path: &Path) -> Vec<(usize, String)> {
    let Ok(content) = std::fs::read_to_string(path) else {
        return Vec::new();
    };
    let mut tracker = CfgTestTracker::new();
    content
        .lines()
        .enumerate()
        .filter_map(|(i, line)| {
            let in_test = tracker.process_line(line);
            let trimmed = line.trim();
            (!in_test && !trimmed.is_empty() && !trimmed.starts_with("//"))
                .then(|| (i + 1, line.to_string()))
        })
        .collect()
}

/// Report every production line in `dir` containing one of `forbidden`.
fn scan(dir: &Path, forbidden: &[&str]) -> Vec<String> {
    let mut violations = Vec::new();
    for file in collect_rs_files(dir) {
        for (lineno, line) in production_lines(&file) {
            for needle in forbidden {
                if line.contains(needle) {
                    violations.push(format!("{}:{lineno}: `{needle}`: {line}", rel(&file)));
                }
            }
        }
    }
    violations
}

// ── Layer boundaries ─────────────────────────────────────────────────────────

#[test]
fn domain_is_free_of_io_and_outer_layers() {
    let violations = scan(
        &src_dir("domain"),
        &[
            "crate::infra",
            "crate::application",
            "crate::commands",
            "crate::output",
            "tokio::",
            "reqwest::",
            "std::fs",
            "std::process",
            "std::net",
        ],
    );
    assert!(
        violations.is_empty(),
        "domain/ must stay pure:\n{}",
        violations.join("\n")
    );
}

#[test]
fn application_has_no_imports_from_outer_layers() {
    let violations = scan(
        &src_dir("application"),
        &[
            "crate::infra",
            "crate::commands",
            "crate::output",
            "reqwest::",
            "std::fs",
            "std::process::Command",
        ],
    );
    assert!(
        violations.is_empty(),
        "application/ must reach I/O through ports:\n{}",
        violations.join("\n")
    );
}

#[test]
fn infra_has_no_imports_from_commands_or_output() {
    let violations = scan(&src_dir("infra"), &["crate::commands", "crate::output"]);
    assert!(
        violations.is_empty(),
        "infra/ must not import from commands/ or output/:\n{}",
        violations.join("\n")
    );
}

#[test]
fn infra_has_no_print_macros_outside_tests() {
    let violations = scan(&src_dir("infra"), &["println!", "eprintln!"]);
    assert!(
        violations.is_empty(),
        "infra/ must not print outside #[cfg(test)]:\n{}",
        violations.join("\n")
    );
}

#[test]
fn services_take_trait_bounds_not_clients() {
    let concrete = [
        "HttpControlPlane",
        "EcrRegistry",
        "CognitoTokenProvider",
        "HttpProbe",
        "TokioCommandRunner",
        "JsonConfigStore",
        "YamlDescriptorStore",
    ];
    let mut violations = Vec::new();
    for file in collect_rs_files(&src_dir("application")) {
        for (i, line) in read_non_comment_lines(&file).iter().enumerate() {
            for ty in &concrete {
                if line.contains(ty) {
                    violations.push(format!("{}:{}: concrete `{ty}`: {line}", rel(&file), i + 1));
                }
            }
        }
    }
    assert!(
        violations.is_empty(),
        "application/ must depend on port traits:\n{}",
        violations.join("\n")
    );
}

// ── Command handlers ─────────────────────────────────────────────────────────

#[test]
fn no_inline_json_branching_in_commands() {
    let mut violations = Vec::new();
    for file in collect_rs_files(&src_dir("commands")) {
        for (i, line) in read_non_comment_lines(&file).iter().enumerate() {
            let trimmed = line.trim();
            if line.contains("json: bool")
                || trimmed.starts_with("if json")
                || trimmed.starts_with("if !json")
                || line.contains("serde_json::to_string")
            {
                violations.push(format!("{}:{}: {line}", rel(&file), i + 1));
            }
        }
    }
    assert!(
        violations.is_empty(),
        "Found inline JSON handling in commands/; use app.renderer() instead:\n{}",
        violations.join("\n")
    );
}

#[test]
fn commands_use_standardized_prompts() {
    let violations = scan(
        &src_dir("commands"),
        &["Confirm::new()", "Password::new()", "stdin().lock()"],
    );
    assert!(
        violations.is_empty(),
        "Commands must prompt through AppContext:\n{}",
        violations.join("\n")
    );
}

/// Handlers stay thin; logic belongs in application services.
#[test]
fn command_handlers_are_reasonably_sized() {
    const LIMIT: usize = 150;
    let mut violations = Vec::new();
    for file in collect_rs_files(&src_dir("commands")) {
        let count = production_lines(&file).len();
        if count > LIMIT {
            violations.push(format!("{}: {count} non-test lines (limit: {LIMIT})", rel(&file)));
        }
    }
    assert!(
        violations.is_empty(),
        "Command handler files too large; extract logic to application services:\n{}",
        violations.join("\n")
    );
}
