use serde::{Deserialize, Serialize};

use crate::graph::build_fk_graph_report;
use crate::schema::Database;

/// Top-level metrics report for an imported database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaMetrics {
    pub schema_version: String,
    pub engine: String,
    pub counts: SchemaCounts,
    pub coverage: CoverageMetrics,
    pub fk_graph: FkGraphMetrics,
    pub warnings: Vec<String>,
}

/// Count summary for imported objects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaCounts {
    pub tables: usize,
    pub views: usize,
    pub stored_procedures: usize,
    pub table_functions: usize,
    pub scalar_functions: usize,
    pub columns: usize,
    pub indexes: usize,
    pub constraints: ConstraintCounts,
}

/// Count summary for constraint types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstraintCounts {
    pub primary_keys: usize,
    pub foreign_keys: usize,
    pub unique: usize,
    pub checks: usize,
    pub defaults: usize,
}

/// Coverage metrics for the schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageMetrics {
    pub tables_with_pk_pct: f64,
    pub tables_documented_pct: f64,
    pub columns_documented_pct: f64,
}

/// FK graph metrics for the schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FkGraphMetrics {
    pub edges: usize,
    pub has_cycle: bool,
    pub cycle: Option<Vec<String>>,
    pub topo_order: Option<Vec<String>>,
}

/// Collect metrics for an imported database.
pub fn collect_schema_metrics(database: &Database) -> SchemaMetrics {
    let mut counts = SchemaCounts {
        tables: database.tables.len(),
        views: database.views.len(),
        stored_procedures: database.stored_procedures.len(),
        table_functions: database.table_functions.len(),
        scalar_functions: database.scalar_functions.len(),
        columns: 0,
        indexes: 0,
        constraints: ConstraintCounts {
            primary_keys: 0,
            foreign_keys: 0,
            unique: 0,
            checks: 0,
            defaults: 0,
        },
    };

    let mut warnings = Vec::new();
    let mut tables_with_pk = 0usize;
    let mut tables_documented = 0usize;
    let mut columns_documented = 0usize;

    for table in &database.tables {
        counts.columns += table.columns.len();
        counts.indexes += table.indexes.len();
        counts.constraints.foreign_keys += table.foreign_keys.len();
        counts.constraints.unique += table.uniques.len();
        counts.constraints.checks += table.checks.len();
        counts.constraints.defaults += table.defaults.len();

        if table.primary_key.is_some() {
            counts.constraints.primary_keys += 1;
            tables_with_pk += 1;
        } else {
            warnings.push(format!("table without primary key: {}", table.full_name()));
        }

        if table.description.is_some() {
            tables_documented += 1;
        }
        columns_documented += table
            .columns
            .iter()
            .filter(|column| column.description.is_some())
            .count();

        for fk in &table.foreign_keys {
            if fk.referenced_table.is_none() {
                warnings.push(format!(
                    "unresolved foreign key: {}.{}",
                    table.full_name(),
                    fk.name
                ));
            }
        }
    }

    for view in &database.views {
        counts.columns += view.columns.len();
        counts.indexes += view.indexes.len();
    }

    let table_columns: usize = database.tables.iter().map(|table| table.columns.len()).sum();

    let coverage = CoverageMetrics {
        tables_with_pk_pct: percentage(tables_with_pk, counts.tables),
        tables_documented_pct: percentage(tables_documented, counts.tables),
        columns_documented_pct: percentage(columns_documented, table_columns),
    };

    let report = build_fk_graph_report(database);
    let fk_graph = FkGraphMetrics {
        edges: report.summary.edges,
        has_cycle: report.cycle.is_some(),
        cycle: report.cycle,
        topo_order: report.topo_order,
    };

    SchemaMetrics {
        schema_version: database.schema_version.clone(),
        engine: database.engine.clone(),
        counts,
        coverage,
        fk_graph,
        warnings,
    }
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::PrimaryKey;
    use crate::testing::table;

    #[test]
    fn counts_and_coverage() {
        let mut customer = table("dbo", "Customer", &["Id", "Email"]);
        customer.primary_key = Some(PrimaryKey {
            name: "PK_Customer".to_string(),
            columns: vec!["Id".to_string()],
        });
        customer.description = Some("Registered customers".to_string());
        customer.columns[0].description = Some("Surrogate key".to_string());
        let audit = table("dbo", "Audit", &["At"]);

        let mut database = Database::new("mssql", None);
        database.tables = vec![customer, audit];

        let metrics = collect_schema_metrics(&database);
        assert_eq!(metrics.counts.tables, 2);
        assert_eq!(metrics.counts.columns, 3);
        assert_eq!(metrics.counts.constraints.primary_keys, 1);
        assert_eq!(metrics.coverage.tables_with_pk_pct, 50.0);
        assert_eq!(metrics.coverage.tables_documented_pct, 50.0);
        assert!((metrics.coverage.columns_documented_pct - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(
            metrics.warnings,
            vec!["table without primary key: dbo.Audit".to_string()]
        );
        assert!(!metrics.fk_graph.has_cycle);
    }
}
