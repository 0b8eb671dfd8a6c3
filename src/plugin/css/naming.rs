//! Output file naming for stylesheet and loader artifacts.

use std::{fmt, sync::Arc};

/// Name components of an import specifier.
///
/// `./theme/button.module.css` → name `button.module`, extension `.css`,
/// base name `button.module.css`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameParts {
    pub name: String,
    /// Extension including the leading dot, empty if none.
    pub extension: String,
    pub base_name: String,
}

impl NameParts {
    pub fn from_specifier(specifier: &str) -> Self {
        let base_name = specifier
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(specifier)
            .to_owned();

        // A leading dot (".hidden") is part of the name, not an extension
        let (name, extension) = match base_name.rfind('.') {
            Some(pos) if pos > 0 => (base_name[..pos].to_owned(), base_name[pos..].to_owned()),
            _ => (base_name.clone(), String::new()),
        };

        Self {
            name,
            extension,
            base_name,
        }
    }
}

type NamerFn = dyn Fn(&NameParts) -> String + Send + Sync;

/// Computes an output file name from [`NameParts`].
#[derive(Clone)]
pub enum FileNamer {
    /// Pattern with `[name]`, `[ext]`, `[extname]` and `[base]` placeholders.
    Pattern(String),
    Custom(Arc<NamerFn>),
}

impl FileNamer {
    pub fn pattern(pattern: impl Into<String>) -> Self {
        Self::Pattern(pattern.into())
    }

    pub fn custom(f: impl Fn(&NameParts) -> String + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }

    pub fn apply(&self, parts: &NameParts) -> String {
        match self {
            Self::Pattern(pattern) => pattern
                .replace("[name]", &parts.name)
                .replace("[extname]", &parts.extension)
                .replace("[ext]", parts.extension.trim_start_matches('.'))
                .replace("[base]", &parts.base_name),
            Self::Custom(f) => f(parts),
        }
    }
}

impl fmt::Debug for FileNamer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pattern(p) => f.debug_tuple("Pattern").field(p).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
