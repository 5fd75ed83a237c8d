//! Resolution of related rows through relation definitions

use crate::config::{RelationDefinition, RelationVia};
use crate::core::error::{ApiResult, RecordError};
use crate::core::service::RecordStore;
use crate::links::registry::RelationDirection;
use serde::Serialize;
use serde_json::Value;

/// A row reached through a relation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelatedRow {
    pub record: Value,
    /// Link-table row connecting the anchor to `record`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<Value>,
}

/// Table the anchor id belongs to for a navigation direction
pub fn anchor_table(relation: &RelationDefinition, direction: RelationDirection) -> &str {
    match direction {
        RelationDirection::Forward => &relation.source,
        RelationDirection::Reverse => &relation.target,
    }
}

/// Table the related rows come from for a navigation direction
pub fn related_table(relation: &RelationDefinition, direction: RelationDirection) -> &str {
    match direction {
        RelationDirection::Forward => &relation.target,
        RelationDirection::Reverse => &relation.source,
    }
}

/// Rows related to `anchor[id]`, in link (or row) id order
///
/// Fails with `RECORD_NOT_FOUND` when the anchor row does not exist.
pub async fn related_rows(
    store: &dyn RecordStore,
    relation: &RelationDefinition,
    direction: RelationDirection,
    id: i64,
) -> ApiResult<Vec<RelatedRow>> {
    let anchor_table = anchor_table(relation, direction);
    let Some(anchor) = store.get(anchor_table, id).await? else {
        return Err(RecordError::NotFound {
            table: anchor_table.to_string(),
            id,
        }
        .into());
    };
    let related_table = related_table(relation, direction);

    match (&relation.via, direction) {
        (
            RelationVia::LinkTable {
                table,
                source_field,
                target_field,
            },
            _,
        ) => {
            let (anchor_field, other_field) = match direction {
                RelationDirection::Forward => (source_field, target_field),
                RelationDirection::Reverse => (target_field, source_field),
            };

            let mut related = Vec::new();
            for link in store.list(table).await? {
                if id_field(&link, anchor_field) != Some(id) {
                    continue;
                }
                let Some(other_id) = id_field(&link, other_field) else {
                    continue;
                };
                if let Some(record) = store.get(related_table, other_id).await? {
                    related.push(RelatedRow {
                        record,
                        link: Some(link),
                    });
                }
            }
            Ok(related)
        }
        (RelationVia::ForeignKey { field }, RelationDirection::Forward) => Ok(store
            .list(related_table)
            .await?
            .into_iter()
            .filter(|row| id_field(row, field) == Some(id))
            .map(|record| RelatedRow { record, link: None })
            .collect()),
        (RelationVia::ForeignKey { field }, RelationDirection::Reverse) => {
            let Some(parent_id) = id_field(&anchor, field) else {
                return Ok(Vec::new());
            };
            Ok(store
                .get(related_table, parent_id)
                .await?
                .map(|record| RelatedRow { record, link: None })
                .into_iter()
                .collect())
        }
    }
}

fn id_field(row: &Value, field: &str) -> Option<i64> {
    row.get(field).and_then(Value::as_i64)
}
