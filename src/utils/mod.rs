use actix_web::{web, FromRequest};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use futures_util::future::LocalBoxFuture;
use validator::Validate;

use crate::api::error;

// Keyset cursor: base64url (no padding) of "epochMillis:rowId". The token is
// opaque to clients; only this codec knows the layout.

pub fn encode_cursor(sort_ts: DateTime<Utc>, sort_id: i64) -> String {
    let raw = format!("{}:{}", sort_ts.timestamp_millis(), sort_id);
    URL_SAFE_NO_PAD.encode(raw.as_bytes())
}

/// Pure format check; the id is not checked for existence.
pub fn decode_cursor(cursor: &str) -> Result<(DateTime<Utc>, i64), error::SystemError> {
    let invalid = || error::SystemError::bad_request(format!("Invalid cursor: {cursor}"));

    let bytes = URL_SAFE_NO_PAD.decode(cursor).map_err(|_| invalid())?;
    let raw = String::from_utf8(bytes).map_err(|_| invalid())?;

    let (millis, id) = raw.split_once(':').ok_or_else(invalid)?;
    let millis: i64 = millis.parse().map_err(|_| invalid())?;
    let id: i64 = id.parse().map_err(|_| invalid())?;

    let ts = DateTime::from_timestamp_millis(millis).ok_or_else(invalid)?;
    Ok((ts, id))
}

pub fn blank_to_null(s: Option<String>) -> Option<String> {
    s.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
    })
}

pub fn clamp_page_size(size: Option<i64>) -> i64 {
    size.unwrap_or(crate::constants::DEFAULT_PAGE_SIZE)
        .clamp(1, crate::constants::MAX_PAGE_SIZE)
}

pub struct ValidatedQuery<T>(pub T);

impl<T> FromRequest for ValidatedQuery<T>
where
    T: Validate + serde::de::DeserializeOwned + 'static,
{
    type Error = error::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        let fut = web::Query::<T>::from_request(req, payload);

        Box::pin(async move {
            let query = fut.await.map_err(|e| error::Error::BadRequest(e.to_string().into()))?;
            query.validate().map_err(|e| error::Error::BadRequest(e.to_string().into()))?;
            Ok(ValidatedQuery(query.into_inner()))
        })
    }
}
