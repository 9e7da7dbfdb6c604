//! Contact endpoints

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use serde::Serialize;

use contactbook_core::store::ContactStore;
use contactbook_core::transfer::{export_contacts, inputs_from_value};
use contactbook_core::{Contact, ContactInput};

use crate::routes::auth::AuthUser;
use crate::routes::{AppError, MessageResponse};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/contacts",
            get(list_contacts)
                .post(create_contact)
                .delete(delete_all_contacts),
        )
        .route("/api/contacts/export", get(export))
        .route("/api/contacts/import", post(import))
        .route(
            "/api/contacts/{id}",
            get(get_contact).put(update_contact).delete(delete_contact),
        )
}

#[derive(Serialize)]
pub struct ContactsResponse {
    pub contacts: Vec<Contact>,
}

#[derive(Serialize)]
pub struct ContactResponse {
    pub contact: Contact,
}

/// GET /api/contacts - All contacts of the signed-in user
async fn list_contacts(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ContactsResponse>, AppError> {
    let contacts = state.store.list_contacts(user.id())?;
    Ok(Json(ContactsResponse { contacts }))
}

/// POST /api/contacts - Create a contact
async fn create_contact(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<ContactInput>,
) -> Result<(StatusCode, Json<ContactResponse>), AppError> {
    let contact = state.store.create_contact(user.id(), input)?;
    Ok((StatusCode::CREATED, Json(ContactResponse { contact })))
}

/// DELETE /api/contacts - Remove every contact of the user
async fn delete_all_contacts(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<MessageResponse>, AppError> {
    let removed = state.store.delete_all_contacts(user.id())?;
    tracing::info!(user = user.id(), removed, "all contacts deleted");
    Ok(MessageResponse::new(format!("Deleted {} contacts", removed)))
}

/// GET /api/contacts/:id
async fn get_contact(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ContactResponse>, AppError> {
    let contact = state.store.get_contact(user.id(), &id)?;
    Ok(Json(ContactResponse { contact }))
}

/// PUT /api/contacts/:id
async fn update_contact(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(input): Json<ContactInput>,
) -> Result<Json<ContactResponse>, AppError> {
    let contact = state.store.update_contact(user.id(), &id, input)?;
    Ok(Json(ContactResponse { contact }))
}

/// DELETE /api/contacts/:id
async fn delete_contact(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    state.store.delete_contact(user.id(), &id)?;
    Ok(MessageResponse::new("Contact deleted"))
}

/// GET /api/contacts/export - Download all contacts as a JSON file
async fn export(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let contacts = state.store.list_contacts(user.id())?;
    let body = export_contacts(&contacts)?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/json"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"contacts.json\"",
            ),
        ],
        body,
    ))
}

#[derive(Serialize)]
pub struct ImportResponse {
    pub message: String,
    pub contacts: Vec<Contact>,
}

/// POST /api/contacts/import - Create contacts from an exported array
async fn import(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<ImportResponse>, AppError> {
    let inputs = inputs_from_value(body)?;
    let contacts = state.store.import_contacts(user.id(), inputs)?;

    Ok(Json(ImportResponse {
        message: format!("Imported {} contacts", contacts.len()),
        contacts,
    }))
}
