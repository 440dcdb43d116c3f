use shared::{
    domain::{CollectionKind, EntryBody, EntryId, MoveDirection},
    error::{ApiError, ErrorCode},
    protocol::{CreateEntryRequest, EntryPayload, UpdateEntryRequest},
};
use storage::{Storage, StoredEntry};
use tracing::warn;

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

pub async fn list_entries(
    ctx: &ApiContext,
    collection: CollectionKind,
) -> Result<Vec<EntryPayload>, ApiError> {
    let entries = ctx
        .storage
        .list_entries(collection)
        .await
        .map_err(internal)?;
    Ok(entries.into_iter().map(payload).collect())
}

pub async fn create_entry(
    ctx: &ApiContext,
    collection: CollectionKind,
    request: CreateEntryRequest,
) -> Result<EntryPayload, ApiError> {
    ensure_body_belongs_to_collection(collection, &request.body)?;
    request.body.validate().map_err(|err| {
        warn!(%collection, %err, "rejected entry create");
        ApiError::from(err)
    })?;

    let entry = ctx
        .storage
        .create_entry(collection, request.order, &request.body)
        .await
        .map_err(internal)?;
    Ok(payload(entry))
}

pub async fn update_entry(
    ctx: &ApiContext,
    collection: CollectionKind,
    id: &EntryId,
    request: UpdateEntryRequest,
) -> Result<EntryPayload, ApiError> {
    ensure_body_belongs_to_collection(collection, &request.body)?;
    request.body.validate().map_err(|err| {
        warn!(%collection, %id, %err, "rejected entry update");
        ApiError::from(err)
    })?;

    let entry = ctx
        .storage
        .update_entry(collection, id, request.order, &request.body)
        .await
        .map_err(internal)?
        .ok_or_else(|| not_found(collection, id))?;
    Ok(payload(entry))
}

pub async fn delete_entry(
    ctx: &ApiContext,
    collection: CollectionKind,
    id: &EntryId,
) -> Result<(), ApiError> {
    let removed = ctx
        .storage
        .delete_entry(collection, id)
        .await
        .map_err(internal)?;
    if !removed {
        return Err(not_found(collection, id));
    }
    Ok(())
}

pub async fn reorder_entry(
    ctx: &ApiContext,
    collection: CollectionKind,
    id: &EntryId,
    direction: MoveDirection,
) -> Result<Vec<EntryPayload>, ApiError> {
    let entries = ctx
        .storage
        .reorder_entry(collection, id, direction)
        .await
        .map_err(internal)?
        .ok_or_else(|| not_found(collection, id))?;
    Ok(entries.into_iter().map(payload).collect())
}

fn ensure_body_belongs_to_collection(
    collection: CollectionKind,
    body: &EntryBody,
) -> Result<(), ApiError> {
    if body.collection() != collection {
        return Err(ApiError::new(
            ErrorCode::Validation,
            format!(
                "body kind belongs to collection '{}', not '{collection}'",
                body.collection()
            ),
        ));
    }
    Ok(())
}

fn payload(entry: StoredEntry) -> EntryPayload {
    EntryPayload {
        id: entry.id,
        order: entry.position,
        body: entry.body,
    }
}

fn not_found(collection: CollectionKind, id: &EntryId) -> ApiError {
    ApiError::new(
        ErrorCode::NotFound,
        format!("no entry '{id}' in collection '{collection}'"),
    )
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::new(ErrorCode::Internal, err.to_string())
}
