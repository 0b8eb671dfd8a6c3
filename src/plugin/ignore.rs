//! Redirects matching imports to an empty stub module.

use crate::plugin::{ModuleId, Plugin, PluginContext, ResolveOptions, ResolvedId};
use anyhow::Result;
use regex::Regex;

/// Virtual id every ignored import resolves to.
pub const IGNORE_ID: &str = "ignore_id";

/// Source of the stub module.
const STUB_MODULE: &str = "export default {}";

/// Resolves any specifier matching one of `patterns` to [`IGNORE_ID`].
#[derive(Debug, Clone, Default)]
pub struct IgnorePlugin {
    patterns: Vec<Regex>,
}

impl IgnorePlugin {
    pub fn new(patterns: Vec<Regex>) -> Self {
        Self { patterns }
    }

    fn matches(&self, specifier: &str) -> bool {
        // "./x" is matched as "/x"
        let specifier = specifier.strip_prefix('.').filter(|s| s.starts_with('/')).unwrap_or(specifier);
        self.patterns.iter().any(|re| re.is_match(specifier))
    }
}

impl Plugin for IgnorePlugin {
    fn name(&self) -> &'static str {
        "ignore"
    }

    fn resolve_id(
        &self,
        _ctx: &dyn PluginContext,
        specifier: &str,
        _importer: Option<&ModuleId>,
        _options: ResolveOptions,
    ) -> Result<Option<ResolvedId>> {
        let hit = specifier == IGNORE_ID || self.matches(specifier);
        Ok(hit.then(|| ResolvedId::new(IGNORE_ID)))
    }

    fn load(&self, _ctx: &dyn PluginContext, id: &ModuleId) -> Result<Option<String>> {
        Ok((id.as_str() == IGNORE_ID).then(|| STUB_MODULE.to_owned()))
    }
}
