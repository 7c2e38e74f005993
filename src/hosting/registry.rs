use anyhow::Result;

use super::gitee::{self, GiteeProvider};
use super::github::{self, GitHubProvider};
use super::HostingProvider;

type Constructor = fn() -> Result<Box<dyn HostingProvider>>;

/// Selectable provider: kind id, label shown in prompts, constructor
struct ProviderEntry {
    kind: &'static str,
    label: &'static str,
    constructor: Constructor,
}

/// Maps provider kind ids to adapters. Order is the order shown to the user.
pub struct ProviderRegistry {
    entries: Vec<ProviderEntry>,
}

impl ProviderRegistry {
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(github::KIND, "GitHub", || {
            Ok(Box::new(GitHubProvider::new()?))
        });
        registry.register(gitee::KIND, "Gitee", || Ok(Box::new(GiteeProvider::new()?)));
        registry
    }

    pub fn register(&mut self, kind: &'static str, label: &'static str, constructor: Constructor) {
        self.entries.retain(|e| e.kind != kind);
        self.entries.push(ProviderEntry {
            kind,
            label,
            constructor,
        });
    }

    /// `(kind, label)` pairs in registration order
    pub fn choices(&self) -> Vec<(&'static str, &'static str)> {
        self.entries.iter().map(|e| (e.kind, e.label)).collect()
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.entries.iter().any(|e| e.kind == kind)
    }

    /// `Ok(None)` for an unknown kind
    pub fn create(&self, kind: &str) -> Result<Option<Box<dyn HostingProvider>>> {
        match self.entries.iter().find(|e| e.kind == kind) {
            Some(entry) => Ok(Some((entry.constructor)()?)),
            None => Ok(None),
        }
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
