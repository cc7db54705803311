use serde_json::Value;

use super::text_field;
use crate::{SuburbId, SuburbSearchResult};

/// Maps one provider search hit (`area_name`, `information.{poa,state}`).
///
/// Hits whose name cannot form a valid suburb id are dropped.
pub fn search_result_from_provider(item: &Value) -> Option<SuburbSearchResult> {
    let object = item.as_object()?;
    let area_name = text_field(object, &["area_name", "name"])?;
    let name = strip_qualifier(&area_name);

    let information = object.get("information").and_then(Value::as_object);
    let postcode = information
        .and_then(|info| text_field(info, &["poa", "postcode"]))
        .or_else(|| text_field(object, &["postcode"]));
    let state = information
        .and_then(|info| text_field(info, &["state"]))
        .or_else(|| text_field(object, &["state"]));

    let slug = slugify(&name);
    let raw_id = match &postcode {
        Some(postcode) => format!("{slug}-{postcode}"),
        None => slug,
    };
    let id = SuburbId::parse(&raw_id).ok()?;

    Some(SuburbSearchResult {
        id,
        name,
        state,
        postcode,
    })
}

/// Reads one catalogue entry from the fixture suburb list.
pub fn search_result_from_fixture(item: &Value) -> Option<SuburbSearchResult> {
    let object = item.as_object()?;
    let id = SuburbId::parse(&text_field(object, &["id"])?).ok()?;

    Some(SuburbSearchResult {
        name: text_field(object, &["name"]).unwrap_or_else(|| id.display_name()),
        postcode: text_field(object, &["postcode"]).or_else(|| id.postcode().map(str::to_owned)),
        state: text_field(object, &["state"]),
        id,
    })
}

/// "Belmont North (NSW)" -> "Belmont North".
fn strip_qualifier(name: &str) -> String {
    match name.split_once(" (") {
        Some((head, _)) => head.trim().to_owned(),
        None => name.trim().to_owned(),
    }
}

fn slugify(name: &str) -> String {
    name.split(|ch: char| !ch.is_ascii_alphabetic())
        .filter(|word| !word.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}
