//! Static category/document catalog.
//!
//! The menu tree (category → documents) and the field-chain registry
//! (document → ordered fields) are loaded once at startup and shared
//! read-only by every conversation.

use serde::{Deserialize, Serialize};

use crate::error::{BlankoError, Result};
use crate::token::TOKEN_SEPARATOR;

/// Chain element signaling "no more fields, collect the filename and
/// finalize". Never a real field name.
pub const FINAL_STATE: &str = "final_state";

/// One menu category and the documents it offers, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub name: String,
    pub documents: Vec<String>,
}

/// The ordered fields a document requires, as configured (without the
/// terminal sentinel; the registry appends it).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentEntry {
    pub name: String,
    pub fields: Vec<String>,
}

/// Two-level category → document menu. Immutable after construction,
/// iteration order is the configured order.
#[derive(Debug, Clone)]
pub struct MenuTree {
    categories: Vec<CategoryEntry>,
}

impl MenuTree {
    /// Builds the tree, validating that every name is non-empty and safe to
    /// embed in a callback payload.
    pub fn new(categories: Vec<CategoryEntry>) -> Result<Self> {
        for category in &categories {
            validate_name("category", &category.name)?;
            for document in &category.documents {
                validate_name("document", document)?;
            }
        }
        Ok(Self { categories })
    }

    /// Category names in display order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.name.as_str())
    }

    /// Documents offered by a category, in display order.
    pub fn documents(&self, category: &str) -> Result<&[String]> {
        self.categories
            .iter()
            .find(|c| c.name == category)
            .map(|c| c.documents.as_slice())
            .ok_or_else(|| BlankoError::unknown_category(category))
    }
}

/// Maps each document to its ordered field chain, always terminated by
/// [`FINAL_STATE`].
#[derive(Debug, Clone)]
pub struct FieldChainRegistry {
    chains: Vec<(String, Vec<String>)>,
}

impl FieldChainRegistry {
    /// Builds the registry from configured documents, appending the terminal
    /// sentinel to every chain.
    ///
    /// A document listing the sentinel among its own fields is rejected: the
    /// sentinel is reserved and must stay distinct from real field names.
    pub fn new(documents: Vec<DocumentEntry>) -> Result<Self> {
        let mut chains = Vec::with_capacity(documents.len());
        for entry in documents {
            validate_name("document", &entry.name)?;
            if entry.fields.is_empty() {
                return Err(BlankoError::config(format!(
                    "document '{}' has no fields",
                    entry.name
                )));
            }
            for field in &entry.fields {
                validate_name("field", field)?;
                if field == FINAL_STATE {
                    return Err(BlankoError::config(format!(
                        "document '{}' lists the reserved field '{}'",
                        entry.name, FINAL_STATE
                    )));
                }
            }
            let mut chain = entry.fields;
            chain.push(FINAL_STATE.to_string());
            chains.push((entry.name, chain));
        }
        Ok(Self { chains })
    }

    /// The field chain for a document, ending in the terminal sentinel.
    pub fn chain_for(&self, document: &str) -> Result<&[String]> {
        self.chains
            .iter()
            .find(|(name, _)| name == document)
            .map(|(_, chain)| chain.as_slice())
            .ok_or_else(|| BlankoError::unknown_document(document))
    }
}

fn validate_name(kind: &str, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(BlankoError::config(format!("empty {kind} name")));
    }
    if name.contains(TOKEN_SEPARATOR) {
        return Err(BlankoError::config(format!(
            "{kind} name '{name}' contains the reserved character '{TOKEN_SEPARATOR}'"
        )));
    }
    Ok(())
}

/// The built-in menu tree, used when no catalog file is configured.
pub fn default_menu_tree() -> MenuTree {
    MenuTree::new(vec![
        CategoryEntry {
            name: "Category 1".to_string(),
            documents: vec!["diploma_cover".to_string()],
        },
        CategoryEntry {
            name: "Category 2".to_string(),
            documents: vec!["only_text".to_string(), "diploma_cover".to_string()],
        },
    ])
    .expect("built-in menu tree is valid")
}

/// The built-in field chains, used when no catalog file is configured.
pub fn default_field_chains() -> FieldChainRegistry {
    FieldChainRegistry::new(vec![
        DocumentEntry {
            name: "diploma_cover".to_string(),
            fields: vec![
                "name".to_string(),
                "surname".to_string(),
                "patronimic".to_string(),
            ],
        },
        DocumentEntry {
            name: "only_text".to_string(),
            fields: vec!["name".to_string()],
        },
    ])
    .expect("built-in field chains are valid")
}
