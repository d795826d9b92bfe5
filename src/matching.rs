//! Glob-style source file discovery.
//!
//! Shell-glob patterns are translated to anchored regexes and matched against
//! source-relative paths: `**` crosses directory separators, `*` and `?` do
//! not, `[seq]` / `[!seq]` are character classes. Exclusions take priority
//! over inclusions.

use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use walkdir::WalkDir;

lazy_static::lazy_static! {
    static ref PATTERN_CACHE: Mutex<HashMap<String, Regex>> = Mutex::new(HashMap::new());
}

/// Translate a shell-style glob pattern into an anchored regex pattern.
pub fn translate_pattern(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let n = chars.len();
    let mut out = String::from("^");
    let mut i = 0;

    while i < n {
        match chars[i] {
            '*' if i + 1 < n && chars[i + 1] == '*' => {
                if i + 2 < n && chars[i + 2] == '/' {
                    // **/ matches zero or more whole directory components
                    out.push_str("(?:[^/]+/)*");
                    i += 3;
                } else {
                    out.push_str(".*");
                    i += 2;
                }
            }
            '*' => {
                out.push_str("[^/]*");
                i += 1;
            }
            '?' => {
                out.push_str("[^/]");
                i += 1;
            }
            '[' => {
                let mut j = i + 1;
                if j < n && (chars[j] == '!' || chars[j] == '^') {
                    j += 1;
                }
                if j < n && chars[j] == ']' {
                    j += 1;
                }
                while j < n && chars[j] != ']' {
                    j += 1;
                }
                if j >= n {
                    // No closing bracket, treat as literal
                    out.push_str("\\[");
                    i += 1;
                } else {
                    out.push('[');
                    let mut k = i + 1;
                    if chars[k] == '!' || chars[k] == '^' {
                        out.push('^');
                        k += 1;
                    }
                    while k < j {
                        out.push(chars[k]);
                        k += 1;
                    }
                    out.push(']');
                    i = j + 1;
                }
            }
            c @ ('\\' | '.' | '^' | '$' | '+' | '{' | '}' | '|' | '(' | ')') => {
                out.push('\\');
                out.push(c);
                i += 1;
            }
            c => {
                out.push(c);
                i += 1;
            }
        }
    }

    out.push('$');
    out
}

/// Compile a pattern, reusing the process-wide cache.
pub fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    let mut cache = PATTERN_CACHE.lock().unwrap();
    if let Some(regex) = cache.get(pattern) {
        return Ok(regex.clone());
    }
    let regex = Regex::new(&translate_pattern(pattern))?;
    cache.insert(pattern.to_string(), regex.clone());
    Ok(regex)
}

/// Test whether a forward-slashed name matches a glob pattern.
pub fn pattern_match(name: &str, pattern: &str) -> Result<bool, regex::Error> {
    Ok(compile_pattern(pattern)?.is_match(name))
}

/// Normalize a path to forward slashes for matching.
pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Collect files under `root` whose relative path matches some include
/// pattern and no exclude pattern. Results are sorted for determinism.
pub fn get_matching_files(
    root: &Path,
    include_patterns: &[String],
    exclude_patterns: &[String],
) -> anyhow::Result<Vec<PathBuf>> {
    let includes: Vec<Regex> = include_patterns
        .iter()
        .map(|p| compile_pattern(p))
        .collect::<Result<_, _>>()?;
    let excludes: Vec<Regex> = exclude_patterns
        .iter()
        .map(|p| compile_pattern(p))
        .collect::<Result<_, _>>()?;

    let mut matched = Vec::new();
    for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let name = normalize_path(relative);
        if includes.iter().any(|re| re.is_match(&name))
            && !excludes.iter().any(|re| re.is_match(&name))
        {
            matched.push(entry.path().to_path_buf());
        }
    }

    matched.sort();
    Ok(matched)
}
