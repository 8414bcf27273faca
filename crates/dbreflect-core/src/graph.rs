use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::schema::{Database, qualified};

/// Summary of FK graph structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FkGraphSummary {
    pub nodes: usize,
    pub edges: usize,
}

/// Report for FK dependency ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FkGraphReport {
    pub summary: FkGraphSummary,
    /// Tables ordered so every referenced table precedes its referrers.
    pub topo_order: Option<Vec<String>>,
    pub cycle: Option<Vec<String>>,
}

/// Split a `REFERENCES` target into schema and table, defaulting to the
/// owning table's schema and stripping bracket quoting. A leading database
/// part (`shop.dbo.Customer`) is ignored.
pub fn resolve_reference(owner_schema: &str, target: &str) -> (String, String) {
    let unquote = |part: &str| {
        part.trim()
            .trim_start_matches('[')
            .trim_end_matches(']')
            .to_string()
    };

    let mut parts = target.trim().rsplitn(3, '.');
    let name = unquote(parts.next().unwrap_or_default());
    match parts.next() {
        Some(schema) => (unquote(schema), name),
        None => (owner_schema.to_string(), name),
    }
}

/// Build a deterministic FK dependency report for an imported database.
pub fn build_fk_graph_report(database: &Database) -> FkGraphReport {
    let graph = build_adjacency(database);
    let nodes = graph.len();
    let edges = graph.values().map(|targets| targets.len()).sum();
    let summary = FkGraphSummary { nodes, edges };

    match toposort(&graph) {
        Ok(order) => FkGraphReport {
            summary,
            topo_order: Some(order),
            cycle: None,
        },
        Err(cycle) => FkGraphReport {
            summary,
            topo_order: None,
            cycle: Some(cycle),
        },
    }
}

fn build_adjacency(database: &Database) -> BTreeMap<String, BTreeSet<String>> {
    let mut graph: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    for table in &database.tables {
        let table_key = table.full_name();
        graph.entry(table_key.clone()).or_default();

        for fk in &table.foreign_keys {
            let Some(target) = fk.referenced_table.as_deref() else {
                continue;
            };
            let (schema, name) = resolve_reference(&table.schema, target);
            let referenced = qualified(&schema, &name);
            if referenced == table_key {
                continue;
            }
            graph
                .entry(referenced)
                .or_default()
                .insert(table_key.clone());
        }
    }

    graph
}

fn toposort(graph: &BTreeMap<String, BTreeSet<String>>) -> Result<Vec<String>, Vec<String>> {
    let mut indegree: BTreeMap<String, usize> = BTreeMap::new();

    for (node, targets) in graph {
        indegree.entry(node.clone()).or_insert(0);
        for target in targets {
            *indegree.entry(target.clone()).or_insert(0) += 1;
        }
    }

    let mut ready: BTreeSet<String> = indegree
        .iter()
        .filter(|(_, count)| **count == 0)
        .map(|(node, _)| node.clone())
        .collect();

    let mut order = Vec::with_capacity(graph.len());

    while let Some(node) = ready.pop_first() {
        if let Some(targets) = graph.get(&node) {
            for target in targets {
                if let Some(count) = indegree.get_mut(target) {
                    *count = count.saturating_sub(1);
                    if *count == 0 {
                        ready.insert(target.clone());
                    }
                }
            }
        }
        order.push(node);
    }

    if order.len() == graph.len() {
        Ok(order)
    } else {
        let cycle_nodes: Vec<String> = indegree
            .into_iter()
            .filter_map(|(node, count)| if count > 0 { Some(node) } else { None })
            .collect();
        Err(cycle_nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::{FkAction, ForeignKey};
    use crate::testing::table;

    fn fk(name: &str, column: &str, target: &str) -> ForeignKey {
        ForeignKey {
            name: name.to_string(),
            columns: vec![column.to_string()],
            referenced_table: Some(target.to_string()),
            referenced_columns: vec!["Id".to_string()],
            on_delete: FkAction::NoAction,
            on_update: FkAction::NoAction,
            enabled: true,
            for_replication: false,
        }
    }

    #[test]
    fn resolves_unqualified_and_bracketed_targets() {
        assert_eq!(
            resolve_reference("sales", "Customer"),
            ("sales".to_string(), "Customer".to_string())
        );
        assert_eq!(
            resolve_reference("sales", "[dbo].[Customer]"),
            ("dbo".to_string(), "Customer".to_string())
        );
        assert_eq!(
            resolve_reference("sales", "shop.dbo.Customer"),
            ("dbo".to_string(), "Customer".to_string())
        );
    }

    #[test]
    fn toposort_orders_dependencies() {
        let mut orders = table("dbo", "Orders", &["Id", "CustomerId"]);
        orders
            .foreign_keys
            .push(fk("FK_Orders_Customer", "CustomerId", "dbo.Customer"));
        let customer = table("dbo", "Customer", &["Id"]);

        let mut database = Database::new("mssql", None);
        database.tables = vec![orders, customer];

        let report = build_fk_graph_report(&database);
        let order = report.topo_order.expect("expected toposort");
        let customer_idx = order.iter().position(|item| item == "dbo.Customer").unwrap();
        let orders_idx = order.iter().position(|item| item == "dbo.Orders").unwrap();
        assert!(customer_idx < orders_idx);
        assert_eq!(report.summary.edges, 1);
    }

    #[test]
    fn self_reference_is_not_a_cycle() {
        let mut employee = table("dbo", "Employee", &["Id", "ManagerId"]);
        employee
            .foreign_keys
            .push(fk("FK_Employee_Manager", "ManagerId", "Employee"));

        let mut database = Database::new("mssql", None);
        database.tables = vec![employee];

        let report = build_fk_graph_report(&database);
        assert_eq!(report.topo_order, Some(vec!["dbo.Employee".to_string()]));
        assert_eq!(report.summary.edges, 0);
    }

    #[test]
    fn toposort_reports_cycle() {
        let mut a = table("dbo", "A", &["Id", "BId"]);
        a.foreign_keys.push(fk("FK_A_B", "BId", "dbo.B"));
        let mut b = table("dbo", "B", &["Id", "AId"]);
        b.foreign_keys.push(fk("FK_B_A", "AId", "dbo.A"));

        let mut database = Database::new("mssql", None);
        database.tables = vec![a, b];

        let report = build_fk_graph_report(&database);
        assert!(report.topo_order.is_none());
        let cycle = report.cycle.expect("expected cycle");
        assert!(cycle.contains(&"dbo.A".to_string()));
        assert!(cycle.contains(&"dbo.B".to_string()));
    }
}
