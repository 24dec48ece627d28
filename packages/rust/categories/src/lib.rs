//! Category directory for marketplace searches.
//!
//! Maps a [`CategoryCode`] to the URL components (subdomain and path prefix)
//! that the crawler splices into search URLs. The directory is an embedded
//! snapshot of the marketplace's public category index, parsed once and
//! shared for the life of the process.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use tracing::debug;

use garimpo_shared::{CURRENT_SCHEMA_VERSION, CategoryCode, GarimpoError, Result};

/// Snapshot of the category index, embedded at compile time.
const SNAPSHOT_JSON: &str = include_str!("../data/categories.json");

static DIRECTORY: LazyLock<CategoryDirectory> = LazyLock::new(|| {
    CategoryDirectory::from_json(SNAPSHOT_JSON).expect("embedded category snapshot")
});

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One searchable child category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEntry {
    /// Position within the parent, 1-based (0 only for the sentinel child).
    pub number: u32,
    /// Display name, as shown on the marketplace.
    pub name: String,
    /// Subdomain the category is served from (`lista` for most).
    pub subdomain: String,
    /// Path prefix spliced before the search term; empty or `/`-terminated.
    pub suffix: String,
}

/// A department with its searchable children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryGroup {
    /// Position within the directory, 0-based (0 is the sentinel).
    pub number: u32,
    /// Department name.
    pub name: String,
    /// Searchable children, in marketplace order.
    pub children: Vec<CategoryEntry>,
}

/// The loaded category snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDirectory {
    /// Snapshot format version.
    pub schema_version: u32,
    /// Departments, sentinel first.
    pub groups: Vec<CategoryGroup>,
}

/// URL components for one category, ready for the crawler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlParts {
    /// Subdomain of the marketplace host.
    pub subdomain: String,
    /// Path prefix before the encoded search term.
    pub suffix: String,
}

// ---------------------------------------------------------------------------
// Directory operations
// ---------------------------------------------------------------------------

impl CategoryDirectory {
    /// The snapshot shipped with the crate.
    pub fn load() -> &'static CategoryDirectory {
        &DIRECTORY
    }

    /// Parse a directory from snapshot JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let directory: CategoryDirectory = serde_json::from_str(json)
            .map_err(|e| GarimpoError::parse(format!("category snapshot: {e}")))?;

        if directory.schema_version != CURRENT_SCHEMA_VERSION {
            return Err(GarimpoError::validation(format!(
                "category snapshot schema_version {} not supported",
                directory.schema_version
            )));
        }

        debug!(groups = directory.groups.len(), "category snapshot loaded");
        Ok(directory)
    }

    /// Resolve a category code to its URL components.
    ///
    /// Matches the `number` fields rather than positions, and never mutates
    /// the directory. An unresolvable code is an error: silently widening to
    /// the whole marketplace would hide a bad input.
    pub fn url_parts(&self, code: CategoryCode) -> Result<UrlParts> {
        self.groups
            .iter()
            .find(|group| group.number == code.parent)
            .and_then(|group| {
                group
                    .children
                    .iter()
                    .find(|child| child.number == code.child)
            })
            .map(|child| UrlParts {
                subdomain: child.subdomain.clone(),
                suffix: child.suffix.clone(),
            })
            .ok_or(GarimpoError::UnknownCategory { code })
    }

    /// Check the structural invariants of the snapshot.
    ///
    /// Group numbers must be contiguous from 0, child numbers contiguous
    /// from 1 within each department, and the first group must be the
    /// all-categories sentinel with its single `lista` child.
    pub fn validate(&self) -> Result<()> {
        if self.schema_version != CURRENT_SCHEMA_VERSION {
            return Err(GarimpoError::validation(format!(
                "category snapshot schema_version {} not supported",
                self.schema_version
            )));
        }

        let sentinel = self
            .groups
            .first()
            .ok_or_else(|| GarimpoError::validation("category snapshot has no groups"))?;
        if sentinel.number != 0 || !sentinel.name.to_lowercase().contains("todas") {
            return Err(GarimpoError::validation(
                "first group must be the all-categories sentinel",
            ));
        }
        let all = match sentinel.children.as_slice() {
            [only] => only,
            _ => {
                return Err(GarimpoError::validation(
                    "sentinel group must have exactly one child",
                ));
            }
        };
        if all.number != 0 || all.subdomain != "lista" || !all.suffix.is_empty() {
            return Err(GarimpoError::validation(
                "sentinel child must be number 0 on `lista` with an empty suffix",
            ));
        }

        for (index, group) in self.groups.iter().enumerate() {
            if group.number != index as u32 {
                return Err(GarimpoError::validation(format!(
                    "group `{}` has number {} at position {index}",
                    group.name, group.number
                )));
            }
            if group.children.is_empty() {
                return Err(GarimpoError::validation(format!(
                    "group `{}` has no children",
                    group.name
                )));
            }
        }

        for group in self.groups.iter().skip(1) {
            for (index, child) in group.children.iter().enumerate() {
                if child.number != index as u32 + 1 {
                    return Err(GarimpoError::validation(format!(
                        "child `{}` of `{}` has number {} at position {index}",
                        child.name, group.name, child.number
                    )));
                }
                if child.subdomain.is_empty() {
                    return Err(GarimpoError::validation(format!(
                        "child `{}` of `{}` has an empty subdomain",
                        child.name, group.name
                    )));
                }
                let suffix_ok = child.suffix.is_empty()
                    || child.suffix.ends_with('/')
                    || child.suffix.ends_with('_');
                if !suffix_ok {
                    return Err(GarimpoError::validation(format!(
                        "child `{}` of `{}` has suffix `{}` that cannot prefix a term",
                        child.name, group.name, child.suffix
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_snapshot_validates() {
        CategoryDirectory::load().validate().expect("valid snapshot");
    }

    #[test]
    fn sentinel_resolves_to_bare_lista() {
        let parts = CategoryDirectory::load()
            .url_parts(CategoryCode::ALL)
            .expect("sentinel resolves");
        assert_eq!(parts.subdomain, "lista");
        assert_eq!(parts.suffix, "");
    }

    #[test]
    fn every_listed_category_resolves() {
        let directory = CategoryDirectory::load();
        for group in &directory.groups {
            for child in &group.children {
                let code = CategoryCode::new(group.number, child.number);
                let parts = directory.url_parts(code).expect("listed code resolves");
                assert_eq!(parts.subdomain, child.subdomain);
                assert_eq!(parts.suffix, child.suffix);
            }
        }
    }

    #[test]
    fn special_subdomain_category_resolves() {
        let parts = CategoryDirectory::load()
            .url_parts(CategoryCode::new(6, 1))
            .expect("imoveis category");
        assert_eq!(parts.subdomain, "imoveis");
        assert_eq!(parts.suffix, "apartamentos/");
    }

    #[test]
    fn unknown_category_is_an_error() {
        let directory = CategoryDirectory::load();

        let err = directory
            .url_parts(CategoryCode::new(999, 1))
            .expect_err("unknown parent");
        assert!(matches!(
            err,
            GarimpoError::UnknownCategory { code } if code == CategoryCode::new(999, 1)
        ));

        // Valid parent, out-of-range child.
        assert!(directory.url_parts(CategoryCode::new(1, 99)).is_err());
    }

    #[test]
    fn lookup_does_not_mutate_the_directory() {
        let directory = CategoryDirectory::load();
        let before = directory.clone();

        let _ = directory.url_parts(CategoryCode::ALL);
        let _ = directory.url_parts(CategoryCode::new(3, 2));
        let _ = directory.url_parts(CategoryCode::new(999, 999));

        assert_eq!(*directory, before);
    }

    #[test]
    fn wrong_schema_version_is_rejected() {
        let json = r#"{ "schema_version": 99, "groups": [] }"#;
        let err = CategoryDirectory::from_json(json).expect_err("unsupported version");
        assert!(err.to_string().contains("schema_version 99"));
    }

    #[test]
    fn validate_catches_gapped_child_numbers() {
        let mut directory = CategoryDirectory::load().clone();
        directory.groups[1].children[0].number = 7;
        assert!(directory.validate().is_err());
    }
}
