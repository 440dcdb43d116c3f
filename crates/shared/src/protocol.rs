use serde::{Deserialize, Serialize};

use crate::domain::{EntryBody, EntryId, MoveDirection};

/// Wire form of one persisted entry: `{ id, order, kind, ...fields }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryPayload {
    pub id: EntryId,
    pub order: i64,
    #[serde(flatten)]
    pub body: EntryBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEntryRequest {
    /// Explicit display position; the store appends at `count + 1` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(flatten)]
    pub body: EntryBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateEntryRequest {
    /// Leaves the stored position untouched when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(flatten)]
    pub body: EntryBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderEntryRequest {
    pub direction: MoveDirection,
}
