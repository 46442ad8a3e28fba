use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A todo as stored in the `todos` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    /// Milliseconds since the epoch. Set exactly when `completed` is true.
    #[serde(rename = "completedAt", default)]
    pub completed_at: Option<i64>,
}

impl Todo {
    /// Builds an unsaved, incomplete todo, applying the `text` constraint.
    pub fn new(text: Option<String>) -> Result<Self, ValidationError> {
        Ok(Self {
            id: None,
            text: normalize_text(text)?,
            completed: false,
            completed_at: None,
        })
    }
}

/// Fields written by a partial update. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TodoUpdate {
    pub text: Option<String>,
    pub completion: Option<Completion>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Complete { at: i64 },
    Incomplete,
}

impl Completion {
    pub fn from_flag(completed: bool, now_ms: i64) -> Self {
        if completed {
            Completion::Complete { at: now_ms }
        } else {
            Completion::Incomplete
        }
    }
}

impl TodoUpdate {
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.completion.is_none()
    }

    /// Checks and trims `text` if it is being changed.
    pub fn validated(self) -> Result<Self, ValidationError> {
        let text = match self.text {
            Some(text) => Some(normalize_text(Some(text))?),
            None => None,
        };
        Ok(Self { text, ..self })
    }

    /// The `$set` document for this update.
    pub fn to_set_document(&self) -> Document {
        let mut set = Document::new();
        if let Some(text) = &self.text {
            set.insert("text", text.clone());
        }
        match self.completion {
            Some(Completion::Complete { at }) => {
                set.insert("completed", true);
                set.insert("completedAt", at);
            }
            Some(Completion::Incomplete) => {
                set.insert("completed", false);
                set.insert("completedAt", Bson::Null);
            }
            None => {}
        }
        doc! { "$set": set }
    }
}

// `text` is required, trimmed and at least one character long.
fn normalize_text(text: Option<String>) -> Result<String, ValidationError> {
    let text = text.ok_or_else(ValidationError::text_required)?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::text_too_short(&text));
    }
    Ok(trimmed.to_string())
}
