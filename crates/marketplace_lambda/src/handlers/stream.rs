use marketplace_core::listing::{ListingRecord, ListingStatus, ListingUpdate};
use serde_json::{Map, Value};

pub const DYNAMODB_EVENT_SOURCE: &str = "aws:dynamodb";
pub const LISTING_ID_ATTRIBUTE: &str = "listingId";

const MODIFY_EVENT: &str = "MODIFY";

pub fn is_dynamodb_stream_event(event: &Value) -> bool {
    event
        .get("Records")
        .and_then(Value::as_array)
        .map(|records| {
            !records.is_empty()
                && records.iter().all(|record| {
                    record
                        .get("eventSource")
                        .and_then(Value::as_str)
                        .map(|source| source == DYNAMODB_EVENT_SOURCE)
                        .unwrap_or(false)
                })
        })
        .unwrap_or(false)
}

/// Decodes each stream record independently so one bad record does not hide
/// the rest of the batch.
pub fn decode_listing_updates(
    event: &Value,
) -> Result<Vec<Result<Option<ListingUpdate>, String>>, String> {
    let records = event
        .get("Records")
        .and_then(Value::as_array)
        .ok_or_else(|| "stream event must include Records array".to_string())?;

    Ok(records.iter().map(decode_stream_record).collect())
}

/// `Ok(None)` for records that are not listing modifications.
pub fn decode_stream_record(record: &Value) -> Result<Option<ListingUpdate>, String> {
    let source = record.get("eventSource").and_then(Value::as_str);
    if source != Some(DYNAMODB_EVENT_SOURCE) {
        return Err(format!(
            "unsupported stream record source: {}",
            source.unwrap_or("<missing>")
        ));
    }

    if record.get("eventName").and_then(Value::as_str) != Some(MODIFY_EVENT) {
        return Ok(None);
    }

    let change = record
        .get("dynamodb")
        .and_then(Value::as_object)
        .ok_or_else(|| "stream record must include a dynamodb object".to_string())?;

    let new_image = image(change, "NewImage");
    let listing_id = change
        .get("Keys")
        .and_then(Value::as_object)
        .and_then(|keys| attribute_string(keys, LISTING_ID_ATTRIBUTE))
        .or_else(|| new_image.and_then(|image| attribute_string(image, LISTING_ID_ATTRIBUTE)))
        .ok_or_else(|| format!("stream record is missing the {LISTING_ID_ATTRIBUTE} key"))?;

    let old_image = image(change, "OldImage").ok_or_else(|| missing_image(&listing_id, "OldImage"))?;
    let new_image = new_image.ok_or_else(|| missing_image(&listing_id, "NewImage"))?;

    Ok(Some(ListingUpdate {
        listing_id,
        before: listing_from_image(old_image),
        after: listing_from_image(new_image),
    }))
}

fn image<'a>(change: &'a Map<String, Value>, name: &str) -> Option<&'a Map<String, Value>> {
    change.get(name).and_then(Value::as_object)
}

fn missing_image(listing_id: &str, name: &str) -> String {
    format!(
        "stream record for listing {listing_id} has no {name}; the stream view type must be NEW_AND_OLD_IMAGES"
    )
}

fn listing_from_image(image: &Map<String, Value>) -> ListingRecord {
    ListingRecord {
        status: attribute_string(image, "status").map(ListingStatus::from),
        seller_id: attribute_string(image, "sellerId").unwrap_or_default(),
        title: attribute_string(image, "title").unwrap_or_default(),
    }
}

/// Reads a string attribute in DynamoDB JSON form, e.g. `{"S": "sold"}`.
fn attribute_string(image: &Map<String, Value>, name: &str) -> Option<String> {
    image
        .get(name)
        .and_then(|attribute| attribute.get("S"))
        .and_then(Value::as_str)
        .map(str::to_string)
}
