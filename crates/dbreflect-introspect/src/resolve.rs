//! Constraint resolution.
//!
//! Raw constraint fragments are resolved in two phases: every fragment is
//! first tagged by [`classify_fragment`], then the tagged list is walked with
//! a cursor on the last open foreign key. A `REFERENCES` fragment is not a
//! constraint of its own; it names the target of that open foreign key.

use dbreflect_core::{
    CheckConstraint, DefaultConstraint, Error, FkAction, ForeignKey, PrimaryKey, Result,
    UniqueConstraint,
};

const REFERENCES: &str = "REFERENCES";

/// One raw constraint row, exactly as the catalog reported it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintDetail {
    pub constraint_type: String,
    pub constraint_name: String,
    pub delete_action: String,
    pub update_action: String,
    pub status_enabled: String,
    pub status_for_replication: String,
    pub constraint_keys: String,
}

impl ConstraintDetail {
    pub fn new(
        constraint_type: impl Into<String>,
        constraint_name: impl Into<String>,
        constraint_keys: impl Into<String>,
    ) -> Self {
        Self {
            constraint_type: constraint_type.into(),
            constraint_name: constraint_name.into(),
            constraint_keys: constraint_keys.into(),
            ..Self::default()
        }
    }
}

/// Tag assigned to a fragment in the first resolution phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    PrimaryKey,
    ForeignKey,
    /// Continuation row naming the target of the preceding foreign key.
    References,
    Unique,
    Check,
    Default,
    Unrecognized,
}

/// Tag one fragment. Order matters: the type text is tested for primary and
/// foreign keys before the key text is tested for `REFERENCES`.
pub fn classify_fragment(detail: &ConstraintDetail) -> FragmentKind {
    let kind = detail.constraint_type.as_str();
    if kind.contains("PRIMARY KEY") {
        FragmentKind::PrimaryKey
    } else if kind.contains("FOREIGN KEY") {
        FragmentKind::ForeignKey
    } else if detail.constraint_keys.contains(REFERENCES) {
        FragmentKind::References
    } else if kind.contains("UNIQUE") {
        FragmentKind::Unique
    } else if kind.contains("CHECK") {
        FragmentKind::Check
    } else if kind.contains("DEFAULT") {
        FragmentKind::Default
    } else {
        FragmentKind::Unrecognized
    }
}

/// Constraints resolved for one table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedConstraints {
    pub primary_key: Option<PrimaryKey>,
    pub foreign_keys: Vec<ForeignKey>,
    pub uniques: Vec<UniqueConstraint>,
    pub checks: Vec<CheckConstraint>,
    pub defaults: Vec<DefaultConstraint>,
}

/// Target parsed from a `REFERENCES` fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub table: String,
    pub columns: Vec<String>,
}

/// Resolve a table's fragments, in call order, into typed constraints.
///
/// A second primary key fragment replaces the first. A `REFERENCES` fragment
/// with no open foreign key fails with [`Error::UnmatchedReference`].
pub fn resolve(details: &[ConstraintDetail]) -> Result<ResolvedConstraints> {
    let tagged: Vec<(FragmentKind, &ConstraintDetail)> = details
        .iter()
        .map(|detail| (classify_fragment(detail), detail))
        .collect();

    let mut resolved = ResolvedConstraints::default();
    let mut open_fk: Option<usize> = None;

    for (kind, detail) in tagged {
        match kind {
            FragmentKind::PrimaryKey => {
                resolved.primary_key = Some(PrimaryKey {
                    name: detail.constraint_name.trim().to_string(),
                    columns: split_keys(&detail.constraint_keys),
                });
            }
            FragmentKind::ForeignKey => {
                resolved.foreign_keys.push(ForeignKey {
                    name: detail.constraint_name.trim().to_string(),
                    columns: split_keys(&detail.constraint_keys),
                    referenced_table: None,
                    referenced_columns: Vec::new(),
                    on_delete: FkAction::from_text(&detail.delete_action),
                    on_update: FkAction::from_text(&detail.update_action),
                    enabled: !detail.status_enabled.trim().eq_ignore_ascii_case("disabled"),
                    for_replication: detail
                        .status_for_replication
                        .trim()
                        .eq_ignore_ascii_case("is_for_replication"),
                });
                open_fk = Some(resolved.foreign_keys.len() - 1);
            }
            FragmentKind::References => {
                let position = open_fk.take().ok_or_else(|| Error::UnmatchedReference {
                    keys: detail.constraint_keys.trim().to_string(),
                })?;
                if let Some(reference) = parse_reference(&detail.constraint_keys) {
                    let fk = &mut resolved.foreign_keys[position];
                    fk.referenced_table = Some(reference.table);
                    fk.referenced_columns = reference.columns;
                }
            }
            FragmentKind::Unique => resolved.uniques.push(UniqueConstraint {
                name: detail.constraint_name.trim().to_string(),
                columns: split_keys(&detail.constraint_keys),
            }),
            FragmentKind::Check => resolved.checks.push(CheckConstraint {
                name: detail.constraint_name.trim().to_string(),
                expression: detail.constraint_keys.clone(),
            }),
            FragmentKind::Default => resolved.defaults.push(DefaultConstraint {
                name: detail.constraint_name.trim().to_string(),
                column: default_column(&detail.constraint_type),
                expression: detail.constraint_keys.trim().to_string(),
            }),
            FragmentKind::Unrecognized => {
                tracing::debug!(
                    event = "constraint_fragment_skipped",
                    constraint_type = %detail.constraint_type,
                    constraint_name = %detail.constraint_name,
                );
            }
        }
    }

    Ok(resolved)
}

/// Split a comma-separated key list, trimming tokens and dropping empty ones.
pub fn split_keys(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse `REFERENCES <table> (<columns>)`. The table is the trimmed text
/// between the marker and the first `(`.
pub fn parse_reference(text: &str) -> Option<Reference> {
    let (_, rest) = text.split_once(REFERENCES)?;
    let (table, columns) = match rest.split_once('(') {
        Some((table, tail)) => {
            let inner = tail.split_once(')').map(|(inner, _)| inner).unwrap_or(tail);
            (table, split_keys(inner))
        }
        None => (rest, Vec::new()),
    };

    Some(Reference {
        table: table.trim().to_string(),
        columns,
    })
}

fn default_column(constraint_type: &str) -> Option<String> {
    constraint_type
        .split_once("on column")
        .map(|(_, column)| column.trim().to_string())
        .filter(|column| !column.is_empty())
}
