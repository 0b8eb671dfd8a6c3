//! Static import scanning for program modules.
//!
//! A line-oriented scan, not a parser: it recognizes the static forms
//!
//! ```text
//! import "x";
//! import a, { b } from "x";
//! export * from "x";
//! ```
//!
//! Dynamic `import()` calls are not part of the static graph and are skipped.

use regex::Regex;
use std::sync::LazyLock;

/// Whitespace, spelled out: the crate is built without Unicode Perl classes.
const WS: &str = r"[ \t\r\n]";
/// Binding list between `import`/`export` and `from`.
const BINDINGS: &str = r"[A-Za-z0-9_$*{}, \t\r\n]";

static STATIC_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r#"(?m)^[ \t]*(?:import{WS}*(?:{BINDINGS}+?{WS}*from{WS}*)?|export{WS}*{BINDINGS}*?{WS}*from{WS}*)["']([^"'\n]+)["']"#
    );
    Regex::new(&pattern).unwrap()
});

/// Specifiers of all static imports in `code`, in source order.
pub fn scan_imports(code: &str) -> Vec<String> {
    STATIC_IMPORT
        .captures_iter(code)
        .map(|caps| caps[1].to_owned())
        .collect()
}
