//! Collection registry loaded from an external gallery document
//!
//! The registry is an immutable description of every collection: display
//! metadata, asset references, and the optional challenge sequence guarding it.
//! It is loaded once at startup and read-only thereafter. A malformed entry is
//! skipped with a logged diagnostic so the remaining collections still render;
//! a malformed document is a load failure reported to the caller.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

/// One question in a collection's challenge sequence
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Challenge {
    /// Display text shown to the user (opaque to the gate)
    #[serde(rename = "question")]
    pub prompt: String,

    /// Expected answer the submission is matched against
    #[serde(rename = "answer")]
    pub expected_answer: String,

    /// If false, comparison is case-folded
    #[serde(default, rename = "caseSensitive")]
    pub case_sensitive: bool,
}

/// One gated group of images
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    /// Stable key, filled from the document map key
    #[serde(skip)]
    pub id: String,

    /// Display name
    pub name: String,

    /// Display description
    #[serde(default)]
    pub description: String,

    /// Icon shown when no preview image exists
    #[serde(default)]
    pub icon: Option<String>,

    /// Asset references, opaque to the gate
    #[serde(default)]
    pub images: Vec<String>,

    /// If false, the gate always passes through immediately
    #[serde(default)]
    pub protected: bool,

    /// Wrong-answer ceiling before lockout
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Ordered challenge sequence, required when protected
    #[serde(default, rename = "questions")]
    pub challenges: Vec<Challenge>,
}

impl Collection {
    /// Validate a single entry
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Config(format!(
                "Collection '{}' has an empty name",
                self.id
            )));
        }

        if !self.protected {
            return Ok(());
        }

        if self.challenges.is_empty() {
            return Err(Error::Config(format!(
                "Protected collection '{}' has no challenges",
                self.id
            )));
        }

        if self.max_attempts == 0 {
            return Err(Error::Config(format!(
                "Protected collection '{}' must allow at least one attempt",
                self.id
            )));
        }

        for (i, challenge) in self.challenges.iter().enumerate() {
            if challenge.prompt.trim().is_empty() {
                return Err(Error::Config(format!(
                    "Collection '{}' challenge {} has an empty prompt",
                    self.id, i
                )));
            }
            if challenge.expected_answer.trim().is_empty() {
                return Err(Error::Config(format!(
                    "Collection '{}' challenge {} has an empty expected answer",
                    self.id, i
                )));
            }
            if challenge.expected_answer.len() > crate::MAX_ANSWER_LEN {
                return Err(Error::Config(format!(
                    "Collection '{}' challenge {} answer exceeds {} bytes",
                    self.id,
                    i,
                    crate::MAX_ANSWER_LEN
                )));
            }
        }

        Ok(())
    }

    /// Number of images in the collection
    pub fn image_count(&self) -> usize {
        self.images.len()
    }
}

/// Top-level shape of the gallery document
#[derive(Debug, Deserialize)]
struct GalleryDocument {
    categories: BTreeMap<String, Collection>,
}

/// Immutable registry of all collections, keyed by id
#[derive(Debug, Default)]
pub struct Registry {
    collections: BTreeMap<String, Collection>,
}

impl Registry {
    /// Load from a JSON or YAML document file, dispatching on extension
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&contents),
            _ => Self::from_json(&contents),
        }
    }

    /// Parse from a JSON document string
    pub fn from_json(contents: &str) -> Result<Self> {
        let doc: GalleryDocument = serde_json::from_str(contents)?;
        Ok(Self::from_document(doc))
    }

    /// Parse from a YAML document string
    pub fn from_yaml(contents: &str) -> Result<Self> {
        let doc: GalleryDocument = serde_yaml::from_str(contents)?;
        Ok(Self::from_document(doc))
    }

    fn from_document(doc: GalleryDocument) -> Self {
        let mut collections = BTreeMap::new();

        for (id, mut collection) in doc.categories {
            collection.id = id.clone();
            match collection.validate() {
                Ok(()) => {
                    collections.insert(id, collection);
                }
                Err(e) => {
                    warn!(collection = %id, "skipping invalid entry: {}", e);
                }
            }
        }

        Self { collections }
    }

    /// Look up a collection by id
    pub fn get(&self, id: &str) -> Option<&Collection> {
        self.collections.get(id)
    }

    /// Iterate collections in stable id order
    pub fn iter(&self) -> impl Iterator<Item = &Collection> {
        self.collections.values()
    }

    /// Number of valid collections
    pub fn len(&self) -> usize {
        self.collections.len()
    }

    /// Check if no collections loaded
    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}

fn default_max_attempts() -> u32 {
    crate::DEFAULT_MAX_ATTEMPTS
}
