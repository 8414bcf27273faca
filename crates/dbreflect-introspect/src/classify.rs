//! Row classification by signature-key presence.
//!
//! Result sets from one introspection call are heterogeneous; a row is
//! identified by which signature key it carries. Keys are tested in a fixed
//! priority order and the first hit wins, since some keys co-occur across
//! unrelated result sets.

use crate::row::Row;

/// Field names read by the materializers.
pub mod keys {
    pub const COLUMN_NAME: &str = "Column_name";
    pub const TYPE: &str = "Type";
    pub const COMPUTED: &str = "Computed";
    pub const LENGTH: &str = "Length";
    pub const PREC: &str = "Prec";
    pub const SCALE: &str = "Scale";
    pub const NULLABLE: &str = "Nullable";
    pub const COLLATION: &str = "Collation";

    pub const PARAMETER_NAME: &str = "Parameter_name";
    pub const PARAM_ORDER: &str = "Param_order";

    pub const IDENTITY: &str = "Identity";
    pub const SEED: &str = "Seed";
    pub const INCREMENT: &str = "Increment";

    pub const ROWGUIDCOL: &str = "RowGuidCol";

    pub const INDEX_NAME: &str = "index_name";
    pub const INDEX_DESCRIPTION: &str = "index_description";
    pub const INDEX_KEYS: &str = "index_keys";

    pub const CONSTRAINT_TYPE: &str = "constraint_type";
    pub const CONSTRAINT_NAME: &str = "constraint_name";
    pub const DELETE_ACTION: &str = "delete_action";
    pub const UPDATE_ACTION: &str = "update_action";
    pub const STATUS_ENABLED: &str = "status_enabled";
    pub const STATUS_FOR_REPLICATION: &str = "status_for_replication";
    pub const CONSTRAINT_KEYS: &str = "constraint_keys";

    pub const REFERENCED_BY: &str = "Table is referenced by foreign key";
    pub const REFERENCED_BY_LEGACY: &str = "Table is referenced by";
}

/// Entity type a result row describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowKind {
    Column,
    Parameter,
    Identity,
    RowGuidCol,
    Index,
    Constraint,
    ReferencedBy,
}

/// Result-set shape produced by a server generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeVersion {
    /// SQL Server 2000 and earlier.
    Legacy,
    /// SQL Server 2005 and later.
    Modern,
}

const MODERN: &[(RowKind, &str)] = &[
    (RowKind::Column, keys::COLUMN_NAME),
    (RowKind::Parameter, keys::PARAMETER_NAME),
    (RowKind::Identity, keys::IDENTITY),
    (RowKind::RowGuidCol, keys::ROWGUIDCOL),
    (RowKind::Index, keys::INDEX_NAME),
    (RowKind::Constraint, keys::CONSTRAINT_TYPE),
    (RowKind::ReferencedBy, keys::REFERENCED_BY),
];

const LEGACY: &[(RowKind, &str)] = &[
    (RowKind::Column, keys::COLUMN_NAME),
    (RowKind::Parameter, keys::PARAMETER_NAME),
    (RowKind::Identity, keys::IDENTITY),
    (RowKind::RowGuidCol, keys::ROWGUIDCOL),
    (RowKind::Index, keys::INDEX_NAME),
    (RowKind::Constraint, keys::CONSTRAINT_TYPE),
    (RowKind::ReferencedBy, keys::REFERENCED_BY_LEGACY),
];

/// Versioned signature table, selected once per connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowSignatures {
    version: ShapeVersion,
    priority: &'static [(RowKind, &'static str)],
}

impl Default for RowSignatures {
    fn default() -> Self {
        Self::modern()
    }
}

impl RowSignatures {
    pub const fn modern() -> Self {
        Self {
            version: ShapeVersion::Modern,
            priority: MODERN,
        }
    }

    pub const fn legacy() -> Self {
        Self {
            version: ShapeVersion::Legacy,
            priority: LEGACY,
        }
    }

    /// Pick the signature table for a server major version (9 = SQL Server 2005).
    pub fn for_major_version(major: i32) -> Self {
        if major < 9 {
            Self::legacy()
        } else {
            Self::modern()
        }
    }

    pub fn version(&self) -> ShapeVersion {
        self.version
    }

    /// Signature key for a row kind.
    pub fn key(&self, kind: RowKind) -> &'static str {
        self.priority
            .iter()
            .find(|(candidate, _)| *candidate == kind)
            .map(|(_, key)| *key)
            .unwrap_or_default()
    }

    /// Classify a row; `None` means no signature matched and the row is ignored.
    pub fn classify(&self, row: &Row) -> Option<RowKind> {
        self.priority
            .iter()
            .find(|(_, key)| row.contains(key))
            .map(|(kind, _)| *kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(keys: &[&str]) -> Row {
        keys.iter().fold(Row::new(), |row, key| row.with(*key, ""))
    }

    #[test]
    fn classifies_each_signature() {
        let signatures = RowSignatures::modern();
        let cases = [
            (vec!["Column_name", "Type", "Length"], RowKind::Column),
            (vec!["Parameter_name", "Type", "Param_order"], RowKind::Parameter),
            (vec!["Identity", "Seed", "Increment"], RowKind::Identity),
            (vec!["RowGuidCol"], RowKind::RowGuidCol),
            (vec!["index_name", "index_keys"], RowKind::Index),
            (vec!["constraint_type", "constraint_keys"], RowKind::Constraint),
            (vec!["Table is referenced by foreign key"], RowKind::ReferencedBy),
        ];
        for (keys, expected) in cases {
            assert_eq!(signatures.classify(&row(&keys)), Some(expected), "{keys:?}");
        }
    }

    #[test]
    fn priority_decides_co_occurring_keys() {
        let signatures = RowSignatures::modern();
        assert_eq!(
            signatures.classify(&row(&["Identity", "Column_name"])),
            Some(RowKind::Column)
        );
        assert_eq!(
            signatures.classify(&row(&["constraint_type", "index_name"])),
            Some(RowKind::Index)
        );
        assert_eq!(
            signatures.classify(&row(&["RowGuidCol", "Identity"])),
            Some(RowKind::Identity)
        );
    }

    #[test]
    fn unknown_rows_are_ignored() {
        let signatures = RowSignatures::modern();
        assert_eq!(
            signatures.classify(&row(&["Name", "Owner", "Type", "Created_datetime"])),
            None
        );
        assert_eq!(signatures.classify(&row(&["Data_located_on_filegroup"])), None);
    }

    #[test]
    fn legacy_shape_uses_short_reference_note() {
        let legacy = RowSignatures::for_major_version(8);
        assert_eq!(legacy.version(), ShapeVersion::Legacy);
        assert_eq!(
            legacy.classify(&row(&["Table is referenced by"])),
            Some(RowKind::ReferencedBy)
        );
        assert_eq!(
            RowSignatures::for_major_version(16).classify(&row(&["Table is referenced by"])),
            None
        );
    }
}
