use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Primary key definition preserving column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PrimaryKey {
    pub name: String,
    pub columns: Vec<String>,
}

/// Unique constraint definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct UniqueConstraint {
    pub name: String,
    pub columns: Vec<String>,
}

/// Check constraint; the predicate is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CheckConstraint {
    pub name: String,
    pub expression: String,
}

/// Column default constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DefaultConstraint {
    pub name: String,
    pub column: Option<String>,
    pub expression: String,
}

/// Foreign key referential action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FkAction {
    NoAction,
    Cascade,
    SetNull,
    SetDefault,
    Unknown,
}

impl FkAction {
    /// Parse the action text reported by the catalog (`No Action`, `Set_Null`, ...).
    pub fn from_text(text: &str) -> Self {
        let normalized: String = text
            .trim()
            .chars()
            .filter(|ch| ch.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "noaction" | "" => FkAction::NoAction,
            "cascade" => FkAction::Cascade,
            "setnull" => FkAction::SetNull,
            "setdefault" => FkAction::SetDefault,
            _ => FkAction::Unknown,
        }
    }
}

/// Foreign key definition preserving column ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ForeignKey {
    pub name: String,
    pub columns: Vec<String>,
    /// Target table exactly as written after `REFERENCES` (e.g. `dbo.Customer`).
    pub referenced_table: Option<String>,
    pub referenced_columns: Vec<String>,
    pub on_delete: FkAction,
    pub on_update: FkAction,
    pub enabled: bool,
    pub for_replication: bool,
}

/// Index definition as reported by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Index {
    pub name: String,
    /// Free-text description, e.g. `clustered, unique, primary key located on PRIMARY`.
    pub description: String,
    /// Raw key list, e.g. `LastName, FirstName(-)`.
    pub keys: String,
}

impl Index {
    pub fn is_unique(&self) -> bool {
        self.description_flags().any(|flag| flag == "unique")
    }

    pub fn is_clustered(&self) -> bool {
        self.description_flags().any(|flag| flag == "clustered")
    }

    pub fn is_primary_key(&self) -> bool {
        self.description_flags().any(|flag| flag.starts_with("primary key"))
    }

    /// Key column names with descending markers (`(-)`) stripped.
    pub fn columns(&self) -> Vec<String> {
        self.keys
            .split(',')
            .map(|key| key.trim().trim_end_matches("(-)").trim().to_string())
            .filter(|key| !key.is_empty())
            .collect()
    }

    fn description_flags(&self) -> impl Iterator<Item = String> + '_ {
        self.description
            .split(',')
            .map(|flag| {
                let flag = flag.trim().to_ascii_lowercase();
                match flag.find(" located on") {
                    Some(end) => flag[..end].to_string(),
                    None => flag,
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_referential_actions() {
        assert_eq!(FkAction::from_text("No Action"), FkAction::NoAction);
        assert_eq!(FkAction::from_text("Cascade"), FkAction::Cascade);
        assert_eq!(FkAction::from_text("Set_Null"), FkAction::SetNull);
        assert_eq!(FkAction::from_text("SET DEFAULT"), FkAction::SetDefault);
        assert_eq!(FkAction::from_text("Restrictish"), FkAction::Unknown);
    }

    #[test]
    fn index_flags_come_from_description() {
        let index = Index {
            name: "PK_Orders".to_string(),
            description: "clustered, unique, primary key located on PRIMARY".to_string(),
            keys: "OrderId, LineNo(-)".to_string(),
        };
        assert!(index.is_unique());
        assert!(index.is_clustered());
        assert!(index.is_primary_key());
        assert_eq!(index.columns(), vec!["OrderId", "LineNo"]);

        let plain = Index {
            name: "IX_Orders_Date".to_string(),
            description: "nonclustered located on PRIMARY".to_string(),
            keys: "OrderDate".to_string(),
        };
        assert!(!plain.is_unique());
        assert!(!plain.is_clustered());
        assert!(!plain.is_primary_key());

        let unique = Index {
            name: "UQ_Customer_Email".to_string(),
            description: "nonclustered, unique located on PRIMARY".to_string(),
            keys: "Email".to_string(),
        };
        assert!(unique.is_unique());
        assert!(!unique.is_clustered());
    }
}
