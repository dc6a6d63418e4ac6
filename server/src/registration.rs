use axum::{
    Form, Json,
    extract::{FromRequest, Multipart, State},
    http::{StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::{
    AppState,
    db_mongo::{
        Namespace,
        models::{UserRecord, to_document},
    },
    error::AppResult,
};

pub const USERS_DATABASE: &str = "ticketing";
pub const USERS_COLLECTION: &str = "user";

/// Registration fields read from a url-encoded or multipart body.
///
/// A repeated key keeps its last value. Missing `username` and `password`
/// read as empty, a missing `status` reads as `"1"`.
#[derive(Debug)]
pub struct RegistrationForm {
    pub username: String,
    pub password: String,
    pub status: String,
}

impl RegistrationForm {
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut form = Self {
            username: String::new(),
            password: String::new(),
            status: "1".to_string(),
        };
        for (key, value) in pairs {
            match key.as_str() {
                "username" => form.username = value,
                "password" => form.password = value,
                "status" => form.status = value,
                _ => {}
            }
        }
        form
    }
}

impl<S> FromRequest<S> for RegistrationForm
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: axum::extract::Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if !is_multipart {
            let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            return Ok(Self::from_pairs(pairs));
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;

        let mut pairs = Vec::new();
        while let Some(field) = multipart.next_field().await.map_err(|e| {
            (StatusCode::BAD_REQUEST, format!("Failed to read multipart: {}", e)).into_response()
        })? {
            let name = field.name().unwrap_or("").to_string();
            let value = field.text().await.map_err(|e| {
                (StatusCode::BAD_REQUEST, format!("Failed to read field {}: {}", name, e))
                    .into_response()
            })?;
            pairs.push((name, value));
        }

        Ok(Self::from_pairs(pairs))
    }
}

#[derive(Debug, Serialize)]
pub struct RegistrationResponse {
    pub username: String,
    pub status: String,
}

/// `POST /user`
///
/// The record is written before the response is built, so a 200 always
/// means the document reached the store. Dropping the request (client
/// disconnect) drops the pending insert with it.
pub async fn create_user(
    State(state): State<AppState>,
    form: RegistrationForm,
) -> AppResult<Json<RegistrationResponse>> {
    let RegistrationForm {
        username,
        password,
        status,
    } = form;

    tracing::info!(username = %username, status = %status, "registration received");

    let record = UserRecord::new(username.clone(), password, status.clone());
    let target = Namespace::new(USERS_DATABASE, USERS_COLLECTION);
    let id = state.store.insert_one(&target, to_document(&record)?).await?;

    tracing::info!(username = %username, id = %id, "user stored");

    Ok(Json(RegistrationResponse { username, status }))
}
