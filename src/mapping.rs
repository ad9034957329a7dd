//! Data-model mapping from logical entities and properties to physical names.
//!
//! The object model that produces expression trees lives outside this crate;
//! it plugs in through [`DataModel`]. Without a model, names pass through
//! unchanged.

use std::collections::HashMap;
use std::fmt;

/// Physical location of an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableName {
    pub schema: Option<String>,
    pub table: String,
}

/// Maps entity and property names to tables and columns.
pub trait DataModel: fmt::Debug + Send + Sync {
    fn table(&self, entity: &str) -> Option<TableName>;

    fn column(&self, entity: &str, property: &str) -> Option<String>;
}

/// Mapping for a single entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityMapping {
    pub name: String,
    pub table: TableName,
    pub columns: HashMap<String, String>,
}

impl EntityMapping {
    pub fn new(name: &str, table: &str) -> Self {
        Self {
            name: name.into(),
            table: TableName {
                schema: None,
                table: table.into(),
            },
            columns: HashMap::new(),
        }
    }

    pub fn with_schema(mut self, schema: &str) -> Self {
        self.table.schema = Some(schema.into());
        self
    }

    pub fn column(mut self, property: &str, column: &str) -> Self {
        self.columns.insert(property.into(), column.into());
        self
    }
}

/// A data model built in code.
#[derive(Debug, Clone, Default)]
pub struct StaticDataModel {
    entities: HashMap<String, EntityMapping>,
}

impl StaticDataModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entity(mut self, mapping: EntityMapping) -> Self {
        self.entities.insert(mapping.name.clone(), mapping);
        self
    }
}

impl DataModel for StaticDataModel {
    fn table(&self, entity: &str) -> Option<TableName> {
        self.entities.get(entity).map(|m| m.table.clone())
    }

    fn column(&self, entity: &str, property: &str) -> Option<String> {
        self.entities.get(entity)?.columns.get(property).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_model_lookup() {
        let model = StaticDataModel::new().entity(
            EntityMapping::new("Person", "person")
                .with_schema("hr")
                .column("firstName", "first_name"),
        );
        let table = model.table("Person").unwrap();
        assert_eq!(table.schema.as_deref(), Some("hr"));
        assert_eq!(table.table, "person");
        assert_eq!(model.column("Person", "firstName").as_deref(), Some("first_name"));
        assert_eq!(model.column("Person", "age"), None);
        assert_eq!(model.table("Order"), None);
    }
}
