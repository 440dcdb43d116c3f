use std::sync::Arc;

use serde_json::{Map, Value};
use shared::{
    domain::{CollectionKind, EntryBody, EntryId, MoveDirection},
    protocol::{CreateEntryRequest, EntryPayload, UpdateEntryRequest},
};
use tracing::debug;

use crate::{error::EditorError, store::CollectionStore};

/// An in-progress, not-yet-persisted edit: either a new entry (no id yet) or
/// a deep copy of an existing one. The working value is loose JSON so field
/// paths can be merged freely; validation happens when the draft is saved.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub id: Option<EntryId>,
    pub value: Value,
}

/// Client-side controller for one ordered collection. Owns the last-known
/// snapshot and at most one draft; every successful mutation is followed by
/// an authoritative re-read of the whole collection rather than a local
/// patch, so the snapshot never drifts from the store.
pub struct CollectionEditor {
    store: Arc<dyn CollectionStore>,
    collection: CollectionKind,
    entries: Vec<EntryPayload>,
    draft: Option<Draft>,
}

impl CollectionEditor {
    pub fn new(store: Arc<dyn CollectionStore>, collection: CollectionKind) -> Self {
        Self {
            store,
            collection,
            entries: Vec::new(),
            draft: None,
        }
    }

    pub fn collection(&self) -> CollectionKind {
        self.collection
    }

    /// The last-known collection snapshot. Read-shared with the view layer;
    /// only the editor replaces it, and only after a successful store call.
    pub fn entries(&self) -> &[EntryPayload] {
        &self.entries
    }

    pub fn draft(&self) -> Option<&Draft> {
        self.draft.as_ref()
    }

    /// Replaces the snapshot with the store's current state.
    pub async fn refresh(&mut self) -> Result<(), EditorError> {
        self.entries = self.store.list(self.collection).await?;
        Ok(())
    }

    /// Opens a draft for a new entry, pre-populated with caller-supplied
    /// defaults (kind tag, today's date, ...). No store call. A previously
    /// open draft is discarded, as selecting another row in the admin UI
    /// replaces the edit form.
    pub fn begin_create(&mut self, defaults: Value) -> &Draft {
        self.draft.insert(Draft {
            id: None,
            value: defaults,
        })
    }

    /// Opens a draft holding a deep copy of the matching entry, so in-place
    /// edits never touch the displayed snapshot until saved. Fails when the
    /// id is not in the last-known snapshot.
    pub fn begin_edit(&mut self, id: &EntryId) -> Result<&Draft, EditorError> {
        let entry = self
            .entries
            .iter()
            .find(|entry| &entry.id == id)
            .ok_or_else(|| {
                EditorError::NotFound(format!("no entry '{id}' in the current snapshot"))
            })?;
        let value = serde_json::to_value(&entry.body)
            .map_err(|err| EditorError::Validation(format!("entry body is not editable: {err}")))?;
        let draft = Draft {
            id: Some(entry.id.clone()),
            value,
        };
        Ok(self.draft.insert(draft))
    }

    /// Merges a value at a dot-separated field path into the open draft.
    /// No validation here; `save` validates the assembled body.
    pub fn update_draft_field(&mut self, path: &str, value: Value) -> Result<(), EditorError> {
        let Some(draft) = self.draft.as_mut() else {
            return Err(EditorError::Validation("no draft is open".to_string()));
        };
        set_field(&mut draft.value, path, value);
        Ok(())
    }

    /// Validates the draft locally (fail fast, no network on a blank required
    /// field or a kind mismatch), then persists it: `create` when the draft
    /// has no id yet, `update` otherwise. A failed save keeps the draft
    /// untouched so the user can correct and retry; a successful one discards
    /// it and re-reads the collection.
    pub async fn save(&mut self) -> Result<EntryPayload, EditorError> {
        let Some(draft) = self.draft.as_ref() else {
            return Err(EditorError::Validation("no draft is open".to_string()));
        };

        let body: EntryBody = serde_json::from_value(draft.value.clone())
            .map_err(|err| EditorError::Validation(format!("draft is not a valid entry: {err}")))?;
        if body.collection() != self.collection {
            return Err(EditorError::Validation(format!(
                "draft kind belongs to collection '{}', not '{}'",
                body.collection(),
                self.collection
            )));
        }
        body.validate()
            .map_err(|err| EditorError::Validation(err.message))?;

        let order = draft.value.get("order").and_then(Value::as_i64);
        let saved = match draft.id.clone() {
            None => {
                self.store
                    .create(self.collection, CreateEntryRequest { order, body })
                    .await?
            }
            Some(id) => {
                self.store
                    .update(self.collection, &id, UpdateEntryRequest { order, body })
                    .await?
            }
        };
        debug!(collection = %self.collection, id = %saved.id, "draft saved");

        self.draft = None;
        self.refresh().await?;
        Ok(saved)
    }

    /// Discards the open draft, if any. Always safe and instantaneous; no
    /// store interaction.
    pub fn cancel(&mut self) {
        self.draft = None;
    }

    /// Deletes the entry and re-reads the collection. The surrounding UI must
    /// already have obtained a yes/no confirmation from the user; the editor
    /// assumes it happened.
    pub async fn remove(&mut self, id: &EntryId) -> Result<(), EditorError> {
        self.store.delete(self.collection, id).await?;
        debug!(collection = %self.collection, %id, "entry removed");
        self.refresh().await
    }

    /// Moves the entry one step up or down and re-reads the collection. The
    /// open draft, if any, is untouched.
    pub async fn move_entry(
        &mut self,
        id: &EntryId,
        direction: MoveDirection,
    ) -> Result<(), EditorError> {
        self.store.reorder(self.collection, id, direction).await?;
        self.refresh().await
    }
}

fn set_field(target: &mut Value, path: &str, value: Value) {
    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    if let Value::Object(map) = target {
        match path.split_once('.') {
            None => {
                map.insert(path.to_string(), value);
            }
            Some((head, rest)) => {
                let slot = map.entry(head.to_string()).or_insert(Value::Null);
                set_field(slot, rest, value);
            }
        }
    }
}
