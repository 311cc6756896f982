//! Request body extractor for concert create/update endpoints.
//!
//! Both endpoints accept either `multipart/form-data` (text parts plus an
//! optional binary `image` part) or a JSON object with the same keys, where
//! `image` is base64 and `maxSeats` may be a number or a numeric string.
//! An empty body is an empty form.

use axum::body::Bytes;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use concert_core::concert::{blank_to_none, parse_event_date, parse_max_seats, require_text};
use concert_core::error::CoreError;
use concert_db::models::concert::{CreateConcert, UpdateConcert};
use serde::Deserialize;

use crate::error::AppError;

/// Raw, unvalidated concert fields as submitted by the client.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConcertForm {
    pub title: Option<String>,
    pub location: Option<String>,
    pub date: Option<String>,
    pub max_seats: Option<String>,
    pub status: Option<String>,
    pub image: Option<Vec<u8>>,
}

impl ConcertForm {
    /// Build the input of a create. Every field but `image` is required.
    pub fn into_create(self) -> Result<CreateConcert, CoreError> {
        let title = require_text("title", self.title)?;
        let location = require_text("location", self.location)?;
        let date = parse_event_date(&require_text("date", self.date)?)?;
        let max_seats = parse_max_seats(&require_text("maxSeats", self.max_seats)?)?;
        let status = require_text("status", self.status)?;

        Ok(CreateConcert {
            title,
            location,
            date,
            max_seats,
            status,
            image: self.image,
        })
    }

    /// Build the input of an update. Omitted or empty fields are left out.
    pub fn into_update(self) -> Result<UpdateConcert, CoreError> {
        let date = blank_to_none(self.date)
            .map(|raw| parse_event_date(&raw))
            .transpose()?;
        let max_seats = blank_to_none(self.max_seats)
            .map(|raw| parse_max_seats(&raw))
            .transpose()?;

        Ok(UpdateConcert {
            title: blank_to_none(self.title),
            location: blank_to_none(self.location),
            date,
            max_seats,
            status: blank_to_none(self.status),
            image: self.image,
        })
    }

    async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?
        {
            let name = field.name().unwrap_or("").to_string();
            match name.as_str() {
                "image" => {
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(e.body_text()))?;
                    // A file input left empty still sends a zero-length part.
                    if !data.is_empty() {
                        form.image = Some(data.to_vec());
                    }
                }
                "title" | "location" | "date" | "maxSeats" | "status" => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.body_text()))?;
                    let slot = match name.as_str() {
                        "title" => &mut form.title,
                        "location" => &mut form.location,
                        "date" => &mut form.date,
                        "maxSeats" => &mut form.max_seats,
                        _ => &mut form.status,
                    };
                    *slot = Some(text);
                }
                _ => {} // ignore unknown fields
            }
        }

        Ok(form)
    }

    fn from_json(bytes: &[u8]) -> Result<Self, AppError> {
        let body: JsonConcertForm = serde_json::from_slice(bytes)
            .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {e}")))?;

        let image = match body.image.filter(|s| !s.is_empty()) {
            Some(encoded) => Some(STANDARD.decode(encoded).map_err(|e| {
                AppError::BadRequest(format!("'image' must be base64 encoded: {e}"))
            })?),
            None => None,
        };

        Ok(Self {
            title: body.title,
            location: body.location,
            date: body.date,
            max_seats: body.max_seats.map(SeatsValue::into_text),
            status: body.status,
            image,
        })
    }
}

impl<S> FromRequest<S> for ConcertForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if is_multipart {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            return Self::from_multipart(multipart).await;
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        if bytes.is_empty() {
            return Ok(Self::default());
        }
        Self::from_json(&bytes)
    }
}

/// JSON shape of [`ConcertForm`].
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonConcertForm {
    title: Option<String>,
    location: Option<String>,
    date: Option<String>,
    #[serde(alias = "max_seats")]
    max_seats: Option<SeatsValue>,
    status: Option<String>,
    image: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SeatsValue {
    Number(i64),
    Text(String),
}

impl SeatsValue {
    fn into_text(self) -> String {
        match self {
            SeatsValue::Number(n) => n.to_string(),
            SeatsValue::Text(s) => s,
        }
    }
}
