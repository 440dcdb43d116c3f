use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ApiException;

/// Opaque entry identifier, unique within one collection and immutable after
/// creation. Assigned by the store (UUID v4) when an entry is first persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(pub String);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    Achievements,
    Faculty,
    News,
    Events,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 4] = [
        CollectionKind::Achievements,
        CollectionKind::Faculty,
        CollectionKind::News,
        CollectionKind::Events,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionKind::Achievements => "achievements",
            CollectionKind::Faculty => "faculty",
            CollectionKind::News => "news",
            CollectionKind::Events => "events",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "achievements" => Some(CollectionKind::Achievements),
            "faculty" => Some(CollectionKind::Faculty),
            "news" => Some(CollectionKind::News),
            "events" => Some(CollectionKind::Events),
            _ => None,
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveDirection {
    Up,
    Down,
}

/// Structured entry content, one variant per collection. Media references
/// (photos, background images) are opaque URL strings; the asset store behind
/// them is not this system's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryBody {
    Achievement {
        title: String,
        #[serde(default)]
        description: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        year: Option<i32>,
        #[serde(default)]
        featured: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        background_image: Option<String>,
    },
    Faculty {
        name: String,
        position: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        department: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        photo: Option<String>,
        #[serde(default)]
        featured: bool,
    },
    News {
        title: String,
        body: String,
        published_on: NaiveDate,
        #[serde(default)]
        published: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cover_image: Option<String>,
    },
    Event {
        title: String,
        #[serde(default)]
        description: String,
        starts_on: NaiveDate,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        location: Option<String>,
    },
}

impl EntryBody {
    /// The collection this body belongs to. A body can only live in its own
    /// collection; the API layer rejects mismatched writes.
    pub fn collection(&self) -> CollectionKind {
        match self {
            EntryBody::Achievement { .. } => CollectionKind::Achievements,
            EntryBody::Faculty { .. } => CollectionKind::Faculty,
            EntryBody::News { .. } => CollectionKind::News,
            EntryBody::Event { .. } => CollectionKind::Events,
        }
    }

    pub fn headline(&self) -> &str {
        match self {
            EntryBody::Achievement { title, .. } => title,
            EntryBody::Faculty { name, .. } => name,
            EntryBody::News { title, .. } => title,
            EntryBody::Event { title, .. } => title,
        }
    }

    pub fn is_featured(&self) -> bool {
        match self {
            EntryBody::Achievement { featured, .. } => *featured,
            EntryBody::Faculty { featured, .. } => *featured,
            EntryBody::News { .. } | EntryBody::Event { .. } => false,
        }
    }

    /// Date used for "most recent" views; entries without a date-valued field
    /// never win that reduction.
    pub fn display_date(&self) -> Option<NaiveDate> {
        match self {
            EntryBody::News { published_on, .. } => Some(*published_on),
            EntryBody::Event { starts_on, .. } => Some(*starts_on),
            EntryBody::Achievement { .. } | EntryBody::Faculty { .. } => None,
        }
    }

    /// Required-field validation, shared between the editor (fail fast before
    /// any network call) and the API layer (reject before any storage write).
    pub fn validate(&self) -> Result<(), ApiException> {
        match self {
            EntryBody::Achievement { title, .. } => require("title", title),
            EntryBody::Faculty { name, position, .. } => {
                require("name", name)?;
                require("position", position)
            }
            EntryBody::News { title, body, .. } => {
                require("title", title)?;
                require("body", body)
            }
            EntryBody::Event { title, .. } => require("title", title),
        }
    }
}

fn require(field: &'static str, value: &str) -> Result<(), ApiException> {
    if value.trim().is_empty() {
        return Err(ApiException::validation(format!(
            "{field} must not be blank"
        )));
    }
    Ok(())
}
