use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Well-known property that doubles as an entity's free-text description.
pub const DESCRIPTION_PROPERTY: &str = "MS_Description";

/// Extended property attached to a database, object or column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ExtendedProperty {
    pub name: String,
    pub value: String,
}

/// One level of a three-level property address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressLevel {
    /// Level type keyword (`SCHEMA`, `TABLE`, `VIEW`, `PROCEDURE`, `FUNCTION`, `COLUMN`).
    pub kind: String,
    pub name: String,
}

/// Hierarchical address of an extended property.
///
/// All levels empty addresses the database itself; level 0 is the schema,
/// level 1 the object and level 2 the column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyAddress {
    pub level0: Option<AddressLevel>,
    pub level1: Option<AddressLevel>,
    pub level2: Option<AddressLevel>,
}

impl PropertyAddress {
    pub fn database() -> Self {
        Self::default()
    }

    pub fn object(schema: &str, object_kind: &str, object: &str) -> Self {
        Self {
            level0: Some(level("SCHEMA", schema)),
            level1: Some(level(object_kind, object)),
            level2: None,
        }
    }

    pub fn column(schema: &str, object_kind: &str, object: &str, column: &str) -> Self {
        Self {
            level2: Some(level("COLUMN", column)),
            ..Self::object(schema, object_kind, object)
        }
    }

    /// Dotted rendering used in logs and failure reports.
    pub fn display_name(&self) -> String {
        let parts: Vec<&str> = [&self.level0, &self.level1, &self.level2]
            .into_iter()
            .flatten()
            .map(|level| level.name.as_str())
            .collect();
        if parts.is_empty() {
            "<database>".to_string()
        } else {
            parts.join(".")
        }
    }
}

fn level(kind: &str, name: &str) -> AddressLevel {
    AddressLevel {
        kind: kind.to_string(),
        name: name.to_string(),
    }
}

/// A name/value pair returned by a property lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyValue {
    pub name: String,
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_address_extends_object_address() {
        let address = PropertyAddress::column("dbo", "TABLE", "Orders", "Id");
        assert_eq!(address.level0.as_ref().map(|l| l.kind.as_str()), Some("SCHEMA"));
        assert_eq!(address.level1.as_ref().map(|l| l.name.as_str()), Some("Orders"));
        assert_eq!(address.level2.as_ref().map(|l| l.kind.as_str()), Some("COLUMN"));
        assert_eq!(address.display_name(), "dbo.Orders.Id");
    }

    #[test]
    fn database_address_has_no_levels() {
        assert_eq!(PropertyAddress::database().display_name(), "<database>");
    }
}
