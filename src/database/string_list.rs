//! JSONB columns holding ordered string lists (features, topics, learning
//! points). The domain only ever sees `Vec<String>`; encoding happens here.

use serde_json::Value;
use sqlx::types::Json;

use crate::database::manager::DatabaseError;

pub fn encode(list: &[String]) -> Json<&[String]> {
    Json(list)
}

/// NULL reads as an empty list; anything but an array of strings is corrupt.
pub fn decode(column: &str, value: Option<Value>) -> Result<Vec<String>, DatabaseError> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                other => Err(DatabaseError::Corrupt(format!(
                    "{}: expected string element, found {}",
                    column, other
                ))),
            })
            .collect(),
        Some(other) => Err(DatabaseError::Corrupt(format!(
            "{}: expected array, found {}",
            column, other
        ))),
    }
}
