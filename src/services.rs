//! Narrow collaborator contracts consumed by directive handlers.
//!
//! These are injected into the factory at construction time; handlers
//! depend only on the capability they need, never on a service locator.

use crate::data::DataMap;
use serde_json::Value;
use std::collections::HashMap;

/// Localization lookup for the `tr` directive.
pub trait Translator {
    fn translate(&self, key: &str) -> String;
}

/// Authorization predicates for `can`/`cannot`.
pub trait Gate {
    fn allows(&self, ability: &str, context: Option<&Value>) -> bool;

    fn denies(&self, ability: &str, context: Option<&Value>) -> bool {
        !self.allows(ability, context)
    }
}

/// Authentication check for the `auth` directive.
pub trait Auth {
    fn check(&self) -> bool;
}

/// Route and static-asset URL building for `route`/`asset`.
pub trait UrlGenerator {
    fn route(&self, name: &str, params: Option<&Value>) -> String;
    fn asset(&self, path: &str) -> String;
}

/// Template source resolution: a name maps to raw XML or a file path.
pub trait ViewFinder {
    fn find(&self, name: &str) -> Option<String>;
}

/// Echoes the key back; the stand-in when no translation backend exists.
#[derive(Debug, Default)]
pub struct NullTranslator;

impl Translator for NullTranslator {
    fn translate(&self, key: &str) -> String {
        key.to_string()
    }
}

/// Denies every ability.
#[derive(Debug, Default)]
pub struct NullGate;

impl Gate for NullGate {
    fn allows(&self, _ability: &str, _context: Option<&Value>) -> bool {
        false
    }
}

/// No authenticated user.
#[derive(Debug, Default)]
pub struct GuestAuth;

impl Auth for GuestAuth {
    fn check(&self) -> bool {
        false
    }
}

/// Builds `/route-name?k=v`-style URLs without a routing table.
#[derive(Debug, Default)]
pub struct PlainUrlGenerator;

impl UrlGenerator for PlainUrlGenerator {
    fn route(&self, name: &str, params: Option<&Value>) -> String {
        let mut url = format!("/{}", name.replace('.', "/"));
        if let Some(Value::Object(map)) = params {
            let query: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}={}", k, crate::data::value_to_string(v)))
                .collect();
            if !query.is_empty() {
                url.push('?');
                url.push_str(&query.join("&"));
            }
        } else if let Some(v) = params {
            url.push('/');
            url.push_str(&crate::data::value_to_string(v));
        }
        url
    }

    fn asset(&self, path: &str) -> String {
        format!("/{}", path.trim_start_matches('/'))
    }
}

/// An in-memory template registry, the test-time `ViewFinder`.
#[derive(Debug, Default)]
pub struct MemoryFinder {
    templates: HashMap<String, String>,
}

impl MemoryFinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, source: impl Into<String>) -> &mut Self {
        self.templates.insert(name.into(), source.into());
        self
    }
}

impl ViewFinder for MemoryFinder {
    fn find(&self, name: &str) -> Option<String> {
        self.templates.get(name).cloned()
    }
}

/// Resolves names to files under a root directory, trying each registered
/// extension in order.
#[derive(Debug)]
pub struct FileFinder {
    root: std::path::PathBuf,
    extensions: Vec<String>,
}

impl FileFinder {
    pub fn new(root: impl Into<std::path::PathBuf>) -> Self {
        FileFinder {
            root: root.into(),
            extensions: vec!["xml".to_string(), "ixml".to_string()],
        }
    }
}

impl ViewFinder for FileFinder {
    fn find(&self, name: &str) -> Option<String> {
        // Dots namespace templates into directories: `layouts.app` is
        // `layouts/app.xml`.
        let relative = name.replace('.', "/");
        self.extensions.iter().find_map(|ext| {
            let path = self.root.join(format!("{}.{}", relative, ext));
            path.exists().then(|| path.to_string_lossy().into_owned())
        })
    }
}

/// The collaborator bundle handed to the factory.
pub struct Services {
    pub translator: Box<dyn Translator>,
    pub gate: Box<dyn Gate>,
    pub auth: Box<dyn Auth>,
    pub urls: Box<dyn UrlGenerator>,
    pub finder: Box<dyn ViewFinder>,
}

impl Default for Services {
    fn default() -> Self {
        Services {
            translator: Box::new(NullTranslator),
            gate: Box::new(NullGate),
            auth: Box::new(GuestAuth),
            urls: Box::new(PlainUrlGenerator),
            finder: Box::new(MemoryFinder::new()),
        }
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}

/// Process-wide default template data, merged under per-render data.
pub fn merge_data(shared: &DataMap, local: DataMap) -> DataMap {
    let mut merged = shared.clone();
    for (k, v) in local {
        merged.insert(k, v);
    }
    merged
}
