//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

pub fn r#false() -> bool {
    false
}

// ============================================================================
// [build] Section Defaults
// ============================================================================

pub mod build {
    use std::path::PathBuf;

    pub fn entries() -> Vec<PathBuf> {
        vec!["src/index.js".into()]
    }

    pub fn output() -> PathBuf {
        "dist".into()
    }

    pub fn jobs() -> usize {
        0
    }
}

// ============================================================================
// [css] Section Defaults
// ============================================================================

pub mod css {
    pub fn extensions() -> Vec<String> {
        vec![".css".into()]
    }

    pub fn stylesheet_file_names() -> String {
        "styles/[name]/index[extname]".into()
    }

    pub fn loader_file_names() -> String {
        "[name].js".into()
    }
}
