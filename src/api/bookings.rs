//! Booking-specific document handling
//!
//! Bookings are ordinary documents with a few extra rules: the guest, room
//! and stay dates must be present on create, stay dates arrive as
//! `YYYY-MM-DD` and are stored as UTC midnight, and reads embed the
//! referenced guest and room.

use crate::api::error::ApiError;
use crate::store::{Collection, Document, DocumentStore};
use anyhow::Result;
use chrono::{DateTime, NaiveDate, SecondsFormat, TimeZone, Utc};
use serde_json::Value;
use uuid::Uuid;

/// Fields a new booking must carry
pub const REQUIRED_FIELDS: [&str; 4] = ["guest_id", "room_id", "check_in", "check_out"];

const DATE_FIELDS: [&str; 2] = ["check_in", "check_out"];
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` stay date as midnight UTC
pub fn parse_stay_date(raw: &str) -> Result<DateTime<Utc>, ApiError> {
    let date = NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| {
        ApiError::BadRequest(format!("Invalid date '{}', expected YYYY-MM-DD", raw))
    })?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| ApiError::BadRequest(format!("Invalid date '{}'", raw)))?;

    Ok(Utc.from_utc_datetime(&midnight))
}

/// Validate and normalise a booking before insert
pub fn prepare_new_booking(mut doc: Document) -> Result<Document, ApiError> {
    let missing: Vec<&str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| doc.get(*field).map_or(true, Value::is_null))
        .collect();

    if !missing.is_empty() {
        return Err(ApiError::BadRequest(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    normalize_dates(&mut doc)?;
    Ok(doc)
}

/// Normalise whichever stay dates an update carries
pub fn prepare_booking_update(mut doc: Document) -> Result<Document, ApiError> {
    normalize_dates(&mut doc)?;
    Ok(doc)
}

fn normalize_dates(doc: &mut Document) -> Result<(), ApiError> {
    for field in DATE_FIELDS {
        let Some(value) = doc.get_mut(field) else {
            continue;
        };

        let Some(raw) = value.as_str() else {
            return Err(ApiError::BadRequest(format!(
                "Field '{}' must be a YYYY-MM-DD string",
                field
            )));
        };

        let parsed = parse_stay_date(raw)?;
        *value = Value::String(parsed.to_rfc3339_opts(SecondsFormat::Secs, true));
    }
    Ok(())
}

/// Attach the referenced guest and room documents (`null` when missing)
pub fn embed_references(store: &DocumentStore, mut booking: Document) -> Result<Document> {
    let guest = lookup(store, Collection::Guests, booking.get("guest_id"))?;
    let room = lookup(store, Collection::Rooms, booking.get("room_id"))?;

    booking.insert("guest".to_string(), guest);
    booking.insert("room".to_string(), room);
    Ok(booking)
}

fn lookup(store: &DocumentStore, collection: Collection, reference: Option<&Value>) -> Result<Value> {
    let Some(id) = reference
        .and_then(Value::as_str)
        .and_then(|raw| Uuid::parse_str(raw).ok())
    else {
        return Ok(Value::Null);
    };

    Ok(store
        .find_by_id(collection, &id)?
        .map(Value::Object)
        .unwrap_or(Value::Null))
}
