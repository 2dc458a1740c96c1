// ── Orderer ──

use thiserror::Error;

use crate::record::Record;
use crate::schema::SortKey;

/// A record lacked the field named by its sort key.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("sort key '{0}' missing from a record")]
pub struct MissingSortKey(pub String);

/// Apply a sort key. `Preserve` returns the input unchanged; `Field` is a
/// stable ascending sort, so records with equal keys keep device order.
pub fn order(mut records: Vec<Record>, key: &SortKey) -> Result<Vec<Record>, MissingSortKey> {
    let SortKey::Field(field) = key else {
        return Ok(records);
    };

    if records.iter().any(|r| !r.contains_key(field)) {
        return Err(MissingSortKey(field.clone()));
    }

    records.sort_by(|a, b| a.get(field).cmp(&b.get(field)));
    Ok(records)
}
