//! CRUD endpoints for guests, rooms and bookings
//!
//! Every collection shares the same five routes; bookings add field checks
//! on write and embed their guest and room on read.

use crate::api::{bookings, error::ApiError};
use crate::auth::User;
use crate::store::{documents::ID_FIELD, Collection, Document, DocumentStore};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// State for the record routes
#[derive(Clone)]
pub struct RecordsState {
    pub documents: Arc<DocumentStore>,
}

/// `/api/<collection>` and `/api/<collection>/:id` for one collection
pub fn records_router(collection: Collection) -> Router<RecordsState> {
    let base = format!("/api/{}", collection.as_str());
    let item = format!("{}/:id", base);

    Router::new()
        .route(
            &base,
            get(move |state: State<RecordsState>| list_records(state, collection)).post(
                move |state: State<RecordsState>,
                      user: Extension<User>,
                      body: Result<Json<Value>, JsonRejection>| {
                    create_record(state, user, collection, body)
                },
            ),
        )
        .route(
            &item,
            get(move |state: State<RecordsState>, id: Path<String>| {
                get_record(state, collection, id)
            })
            .put(
                move |state: State<RecordsState>,
                      user: Extension<User>,
                      id: Path<String>,
                      body: Result<Json<Value>, JsonRejection>| {
                    update_record(state, user, collection, id, body)
                },
            )
            .delete(
                move |state: State<RecordsState>, user: Extension<User>, id: Path<String>| {
                    delete_record(state, user, collection, id)
                },
            ),
        )
}

async fn list_records(
    State(state): State<RecordsState>,
    collection: Collection,
) -> Result<Json<Vec<Document>>, ApiError> {
    let docs = state.documents.find_all(collection)?;

    let docs = match collection {
        Collection::Bookings => docs
            .into_iter()
            .map(|booking| bookings::embed_references(&state.documents, booking))
            .collect::<anyhow::Result<Vec<_>>>()?,
        _ => docs,
    };

    Ok(Json(docs))
}

async fn create_record(
    State(state): State<RecordsState>,
    Extension(user): Extension<User>,
    collection: Collection,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Document>), ApiError> {
    let Json(body) = body?;
    let mut doc = into_document(body)?;
    if collection == Collection::Bookings {
        doc = bookings::prepare_new_booking(doc)?;
    }

    let stored = state.documents.insert(collection, doc)?;
    let id = stored
        .get(ID_FIELD)
        .and_then(|v| v.as_str())
        .unwrap_or_default();

    info!(actor = %user.email, "🆕 Created {} {}", collection.kind(), id);

    Ok((StatusCode::CREATED, Json(stored)))
}

async fn get_record(
    State(state): State<RecordsState>,
    collection: Collection,
    Path(id): Path<String>,
) -> Result<Json<Document>, ApiError> {
    let id = parse_id(&id)?;
    let doc = state
        .documents
        .find_by_id(collection, &id)?
        .ok_or_else(|| not_found(collection))?;

    let doc = match collection {
        Collection::Bookings => bookings::embed_references(&state.documents, doc)?,
        _ => doc,
    };

    Ok(Json(doc))
}

async fn update_record(
    State(state): State<RecordsState>,
    Extension(user): Extension<User>,
    collection: Collection,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Document>, ApiError> {
    let id = parse_id(&id)?;
    let Json(body) = body?;
    let mut fields = into_document(body)?;
    if collection == Collection::Bookings {
        fields = bookings::prepare_booking_update(fields)?;
    }

    let updated = state
        .documents
        .update(collection, &id, fields)?
        .ok_or_else(|| not_found(collection))?;

    info!(actor = %user.email, "✏️  Updated {} {}", collection.kind(), id);

    Ok(Json(updated))
}

async fn delete_record(
    State(state): State<RecordsState>,
    Extension(user): Extension<User>,
    collection: Collection,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    if !state.documents.delete(collection, &id)? {
        return Err(not_found(collection));
    }

    info!(actor = %user.email, "Deleted {} {}", collection.kind(), id);

    Ok(Json(json!({
        "message": format!("{} deleted successfully", collection.kind()),
    })))
}

fn into_document(body: Value) -> Result<Document, ApiError> {
    match body {
        Value::Object(map) => Ok(map),
        _ => Err(ApiError::BadRequest(
            "Request body must be a JSON object".to_string(),
        )),
    }
}

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("Invalid id: {}", raw)))
}

fn not_found(collection: Collection) -> ApiError {
    ApiError::NotFound(format!("{} not found", collection.kind()))
}
