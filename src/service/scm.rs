use std::collections::BTreeMap;

use crate::db::models::Repository;
use crate::types::forms::SelectOption;

/// Source control adapter used by repository settings.
pub trait ScmAdapter: Send + Sync {
    /// Identifier stored in the repository's `type` column.
    fn key(&self) -> &'static str;

    /// Human readable name.
    fn name(&self) -> &'static str;

    /// Normalise the record before it is validated and saved.
    fn before_save(&self, _repo: &mut Repository) {}
}

pub struct Git;

impl ScmAdapter for Git {
    fn key(&self) -> &'static str {
        "git"
    }

    fn name(&self) -> &'static str {
        "Git"
    }

    fn before_save(&self, repo: &mut Repository) {
        repo.location = repo.location.trim().trim_end_matches('/').to_string();
    }
}

pub struct Subversion;

impl ScmAdapter for Subversion {
    fn key(&self) -> &'static str {
        "subversion"
    }

    fn name(&self) -> &'static str {
        "Subversion"
    }

    fn before_save(&self, repo: &mut Repository) {
        let location = repo.location.trim();
        repo.location = if location.is_empty() || location.ends_with('/') {
            location.to_string()
        } else {
            format!("{location}/")
        };
    }
}

/// Available adapters keyed by their identifier.
pub struct ScmRegistry {
    adapters: BTreeMap<&'static str, Box<dyn ScmAdapter>>,
}

impl Default for ScmRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(Git));
        registry.register(Box::new(Subversion));
        registry
    }
}

impl ScmRegistry {
    pub fn empty() -> Self {
        Self {
            adapters: BTreeMap::new(),
        }
    }

    /// Add or replace an adapter.
    pub fn register(&mut self, adapter: Box<dyn ScmAdapter>) {
        self.adapters.insert(adapter.key(), adapter);
    }

    pub fn get(&self, key: &str) -> Option<&dyn ScmAdapter> {
        self.adapters.get(key).map(|a| a.as_ref())
    }

    /// key → display name
    pub fn scm_types(&self) -> BTreeMap<&'static str, &'static str> {
        self.adapters
            .iter()
            .map(|(key, adapter)| (*key, adapter.name()))
            .collect()
    }

    pub fn scm_select_options(&self) -> Vec<SelectOption> {
        self.scm_types()
            .into_iter()
            .map(|(value, label)| SelectOption {
                label: label.to_string(),
                value: value.to_string(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_adapters_are_listed_by_key() {
        let registry = ScmRegistry::default();
        let options = registry.scm_select_options();
        assert_eq!(
            options,
            vec![
                SelectOption {
                    label: "Git".to_string(),
                    value: "git".to_string()
                },
                SelectOption {
                    label: "Subversion".to_string(),
                    value: "subversion".to_string()
                },
            ]
        );
        assert!(registry.get("hg").is_none());
    }

    #[test]
    fn adapters_normalise_locations() {
        let registry = ScmRegistry::default();

        let mut repo = Repository::new_for(1, "git");
        repo.location = " https://example.com/repo.git/ ".to_string();
        registry.get("git").unwrap().before_save(&mut repo);
        assert_eq!(repo.location, "https://example.com/repo.git");

        repo.location = "svn://example.com/trunk".to_string();
        registry.get("subversion").unwrap().before_save(&mut repo);
        assert_eq!(repo.location, "svn://example.com/trunk/");
    }
}
