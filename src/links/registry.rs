//! Route registry for relation navigation
//!
//! Resolves `/{table}/{id}/{route}` to a relation definition and a direction
//! (forward from the source table, reverse from the target table).

use crate::config::{RelationDefinition, RelationVia, RelationsConfig};
use crate::core::error::{ApiError, ConfigError, RequestError};
use crate::core::schema::Schema;
use serde::Serialize;
use std::collections::HashMap;

/// Route segment reserved for route introspection
pub const LINKS_ROUTE: &str = "links";

/// Direction of relation navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationDirection {
    /// From source to target
    Forward,
    /// From target to source
    Reverse,
}

/// Registry for resolving route names to relation definitions
#[derive(Debug)]
pub struct RelationRegistry {
    config: RelationsConfig,
    /// Maps (table, route_name) -> (index into config.relations, direction)
    routes: HashMap<(String, String), (usize, RelationDirection)>,
}

impl RelationRegistry {
    /// Build the registry, checking every relation against the schema
    pub fn new(config: RelationsConfig, schema: &Schema) -> Result<Self, ConfigError> {
        let mut routes = HashMap::new();

        for (index, relation) in config.relations.iter().enumerate() {
            validate_relation(relation, schema)?;

            for (table, route, direction) in [
                (
                    &relation.source,
                    &relation.forward_route_name,
                    RelationDirection::Forward,
                ),
                (
                    &relation.target,
                    &relation.reverse_route_name,
                    RelationDirection::Reverse,
                ),
            ] {
                if route.trim().is_empty() || route == LINKS_ROUTE {
                    return Err(invalid(
                        &relation.name,
                        route,
                        format!("route name must be non-empty and not '{}'", LINKS_ROUTE),
                    ));
                }
                let key = (table.clone(), route.clone());
                if routes.insert(key, (index, direction)).is_some() {
                    return Err(invalid(
                        &relation.name,
                        route,
                        format!("route '{}' is declared twice for table '{}'", route, table),
                    ));
                }
            }
        }

        Ok(Self { config, routes })
    }

    /// Resolve a route name for a given table
    pub fn resolve_route(
        &self,
        table: &str,
        route_name: &str,
    ) -> Result<(&RelationDefinition, RelationDirection), ApiError> {
        let key = (table.to_string(), route_name.to_string());
        self.routes
            .get(&key)
            .map(|(index, direction)| (&self.config.relations[*index], *direction))
            .ok_or_else(|| {
                RequestError::RouteNotFound {
                    table: table.to_string(),
                    route: route_name.to_string(),
                }
                .into()
            })
    }

    /// List all available routes for a given table, sorted by route name
    pub fn list_routes_for_table(&self, table: &str) -> Vec<RouteInfo> {
        let mut routes: Vec<RouteInfo> = self
            .routes
            .iter()
            .filter(|((route_table, _), _)| route_table == table)
            .map(|((_, route_name), (index, direction))| {
                let relation = &self.config.relations[*index];
                let connected_to = match direction {
                    RelationDirection::Forward => &relation.target,
                    RelationDirection::Reverse => &relation.source,
                };
                RouteInfo {
                    route_name: route_name.clone(),
                    relation: relation.name.clone(),
                    direction: *direction,
                    connected_to: connected_to.clone(),
                    description: relation.description.clone(),
                }
            })
            .collect();
        routes.sort_by(|a, b| a.route_name.cmp(&b.route_name));
        routes
    }
}

/// Information about a route available for a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteInfo {
    /// The route name (e.g., "dishes")
    pub route_name: String,

    /// Name of the relation behind the route
    pub relation: String,

    pub direction: RelationDirection,

    /// The table this route leads to
    pub connected_to: String,

    pub description: Option<String>,
}

fn validate_relation(relation: &RelationDefinition, schema: &Schema) -> Result<(), ConfigError> {
    for table in [&relation.source, &relation.target] {
        if schema.table(table).is_none() {
            return Err(invalid(&relation.name, table, "unknown table"));
        }
    }

    match &relation.via {
        RelationVia::LinkTable {
            table,
            source_field,
            target_field,
        } => {
            let Some(link) = schema.table(table) else {
                return Err(invalid(&relation.name, table, "unknown link table"));
            };
            for (field, points_at) in [(source_field, &relation.source), (target_field, &relation.target)] {
                let declared = link
                    .foreign_keys
                    .iter()
                    .any(|fk| fk.field == field && fk.table == points_at.as_str());
                if !declared {
                    return Err(invalid(
                        &relation.name,
                        field,
                        format!("'{}.{}' is not a foreign key to '{}'", table, field, points_at),
                    ));
                }
            }
        }
        RelationVia::ForeignKey { field } => {
            let declared = schema.table(&relation.target).is_some_and(|target| {
                target
                    .foreign_keys
                    .iter()
                    .any(|fk| fk.field == field && fk.table == relation.source.as_str())
            });
            if !declared {
                return Err(invalid(
                    &relation.name,
                    field,
                    format!(
                        "'{}.{}' is not a foreign key to '{}'",
                        relation.target, field, relation.source
                    ),
                ));
            }
        }
    }
    Ok(())
}

fn invalid(relation: &str, value: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field: format!("relations.{}", relation),
        value: value.to_string(),
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::{ForeignKey, OnDelete, TableSchema};

    const AUTHORS: TableSchema = TableSchema {
        name: "authors",
        singular: "author",
        fields: &["name"],
        date_field: None,
        foreign_keys: &[],
        unique_keys: &[],
    };

    const BOOKS: TableSchema = TableSchema {
        name: "books",
        singular: "book",
        fields: &["author_id", "title"],
        date_field: None,
        foreign_keys: &[ForeignKey {
            field: "author_id",
            table: "authors",
            on_delete: OnDelete::Restrict,
        }],
        unique_keys: &[],
    };

    const SHELVES: TableSchema = TableSchema {
        name: "shelves",
        singular: "shelf",
        fields: &["label"],
        date_field: None,
        foreign_keys: &[],
        unique_keys: &[],
    };

    const PLACEMENTS: TableSchema = TableSchema {
        name: "placements",
        singular: "placement",
        fields: &["shelf_id", "book_id"],
        date_field: None,
        foreign_keys: &[
            ForeignKey {
                field: "shelf_id",
                table: "shelves",
                on_delete: OnDelete::Cascade,
            },
            ForeignKey {
                field: "book_id",
                table: "books",
                on_delete: OnDelete::Cascade,
            },
        ],
        unique_keys: &[],
    };

    fn schema() -> Schema {
        Schema::new()
            .with_table(AUTHORS)
            .with_table(BOOKS)
            .with_table(SHELVES)
            .with_table(PLACEMENTS)
    }

    fn config() -> RelationsConfig {
        RelationsConfig::from_yaml_str(
            r#"
relations:
  - name: author_books
    source: authors
    target: books
    forward_route_name: books
    reverse_route_name: author
    via: { kind: foreign_key, field: author_id }
  - name: shelf_books
    source: shelves
    target: books
    forward_route_name: books
    reverse_route_name: shelves
    description: Books on a shelf
    via: { kind: link_table, table: placements, source_field: shelf_id, target_field: book_id }
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_resolve_forward_and_reverse() {
        let registry = RelationRegistry::new(config(), &schema()).unwrap();

        let (relation, direction) = registry.resolve_route("shelves", "books").unwrap();
        assert_eq!(relation.name, "shelf_books");
        assert_eq!(direction, RelationDirection::Forward);

        let (relation, direction) = registry.resolve_route("books", "author").unwrap();
        assert_eq!(relation.name, "author_books");
        assert_eq!(direction, RelationDirection::Reverse);
    }

    #[test]
    fn test_unknown_route() {
        let registry = RelationRegistry::new(config(), &schema()).unwrap();
        let err = registry.resolve_route("books", "reviews").unwrap_err();
        assert_eq!(err.error_code(), "ROUTE_NOT_FOUND");
    }

    #[test]
    fn test_list_routes_for_table() {
        let registry = RelationRegistry::new(config(), &schema()).unwrap();
        let routes = registry.list_routes_for_table("books");
        let names: Vec<_> = routes.iter().map(|r| r.route_name.as_str()).collect();
        assert_eq!(names, vec!["author", "shelves"]);
        assert_eq!(routes[1].connected_to, "shelves");
        assert_eq!(routes[1].description.as_deref(), Some("Books on a shelf"));
    }

    #[test]
    fn test_rejects_unknown_table() {
        let mut config = config();
        config.relations[0].target = "novels".to_string();
        let err = RelationRegistry::new(config, &schema()).unwrap_err();
        assert!(err.to_string().contains("novels"));
    }

    #[test]
    fn test_rejects_field_that_is_not_a_foreign_key() {
        let mut config = config();
        config.relations[1].via = RelationVia::LinkTable {
            table: "placements".to_string(),
            source_field: "book_id".to_string(),
            target_field: "shelf_id".to_string(),
        };
        assert!(RelationRegistry::new(config, &schema()).is_err());
    }

    #[test]
    fn test_rejects_duplicate_and_reserved_routes() {
        let mut config = config();
        config.relations[1].reverse_route_name = "author".to_string();
        assert!(RelationRegistry::new(config, &schema()).is_err());

        let mut config = self::config();
        config.relations[0].forward_route_name = LINKS_ROUTE.to_string();
        assert!(RelationRegistry::new(config, &schema()).is_err());
    }
}
