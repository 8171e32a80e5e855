use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::error::{Error, Result};
use crate::schema::{ForeignKeyConstraint, TableId, TableNode};

/// Foreign key dependency graph over registered tables.
///
/// Tables live in an arena indexed by registration order; edges point from a
/// parent slot to a child slot. Parallel constraints between the same pair of
/// tables collapse into one edge but every constraint stays on the child node.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    tables: Vec<TableNode>,
    slots: HashMap<TableId, usize>,
    children: Vec<Vec<usize>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table. Re-registering an identifier is rejected.
    pub fn add_table(&mut self, node: TableNode) -> Result<()> {
        if self.slots.contains_key(node.id()) {
            return Err(Error::DuplicateTable(node.id().clone()));
        }

        let slot = self.tables.len();
        self.slots.insert(node.id().clone(), slot);
        self.tables.push(node);
        self.children.push(Vec::new());
        Ok(())
    }

    /// Record `constraint` on its child table and add the parent -> child edge.
    ///
    /// Both endpoints must already be registered.
    pub fn add_edge(&mut self, constraint: ForeignKeyConstraint) -> Result<()> {
        let parent = self.slot(&constraint.parent_table)?;
        let child = self.slot(&constraint.child_table)?;

        debug!(
            constraint = %constraint.name,
            parent = %constraint.parent_table,
            child = %constraint.child_table,
            "adding dependency edge"
        );

        if !self.children[parent].contains(&child) {
            self.children[parent].push(child);
        }
        self.tables[child].add_parent_relationship(constraint);
        Ok(())
    }

    pub fn get_table(&self, id: &TableId) -> Result<&TableNode> {
        self.slot(id).map(|slot| &self.tables[slot])
    }

    pub fn contains(&self, id: &TableId) -> bool {
        self.slots.contains_key(id)
    }

    /// Tables in registration order.
    pub fn tables(&self) -> impl Iterator<Item = &TableNode> {
        self.tables.iter()
    }

    /// Distinct `(parent, child)` edges, grouped by parent in registration order.
    pub fn edges(&self) -> Vec<(&TableId, &TableId)> {
        self.children
            .iter()
            .enumerate()
            .flat_map(|(parent, targets)| {
                targets
                    .iter()
                    .map(move |&child| (self.tables[parent].id(), self.tables[child].id()))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.children.iter().map(Vec::len).sum()
    }

    /// Order in which tables can be filled: every parent precedes its children.
    ///
    /// Kahn's algorithm; among tables that are ready at the same time the one
    /// registered first wins, so the order is stable for a fixed registration
    /// sequence.
    pub fn get_fill_order(&self) -> Result<Vec<&TableNode>> {
        let mut in_degree = vec![0_usize; self.tables.len()];
        for targets in &self.children {
            for &child in targets {
                in_degree[child] += 1;
            }
        }

        let mut ready: BTreeSet<usize> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, degree)| **degree == 0)
            .map(|(slot, _)| slot)
            .collect();
        let mut order = Vec::with_capacity(self.tables.len());

        while let Some(slot) = ready.pop_first() {
            order.push(&self.tables[slot]);
            for &child in &self.children[slot] {
                in_degree[child] -= 1;
                if in_degree[child] == 0 {
                    ready.insert(child);
                }
            }
        }

        if order.len() != self.tables.len() {
            return Err(Error::CyclicDependency {
                tables: self.cycle_members(&in_degree),
            });
        }

        Ok(order)
    }

    /// Tables left unordered by Kahn's pass, minus those that merely sit
    /// downstream of a cycle.
    fn cycle_members(&self, in_degree: &[usize]) -> Vec<TableId> {
        let mut remaining: Vec<bool> = in_degree.iter().map(|degree| *degree > 0).collect();

        loop {
            let mut changed = false;
            for slot in 0..remaining.len() {
                if remaining[slot] && !self.children[slot].iter().any(|&child| remaining[child]) {
                    remaining[slot] = false;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        remaining
            .iter()
            .enumerate()
            .filter(|(_, keep)| **keep)
            .map(|(slot, _)| self.tables[slot].id().clone())
            .collect()
    }

    fn slot(&self, id: &TableId) -> Result<usize> {
        self.slots
            .get(id)
            .copied()
            .ok_or_else(|| Error::TableNotFound(id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Column;

    fn table(name: &str) -> TableNode {
        TableNode::new(TableId::new("s", name)).with_column(Column::new("id", "bigint"))
    }

    fn fk(child: &str, column: &str, parent: &str) -> ForeignKeyConstraint {
        ForeignKeyConstraint {
            name: format!("{child}_{column}_fkey"),
            parent_table: TableId::new("s", parent),
            parent_column: "id".to_string(),
            child_table: TableId::new("s", child),
            child_column: column.to_string(),
        }
    }

    fn graph(tables: &[&str], edges: &[(&str, &str, &str)]) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for name in tables {
            graph.add_table(table(name)).unwrap();
        }
        for (child, column, parent) in edges {
            graph.add_edge(fk(child, column, parent)).unwrap();
        }
        graph
    }

    fn names(order: &[&TableNode]) -> Vec<String> {
        order.iter().map(|node| node.id().to_string()).collect()
    }

    #[test]
    fn orders_chain_parents_first() {
        let graph = graph(
            &["items", "orders", "users"],
            &[
                ("orders", "user_id", "users"),
                ("items", "order_id", "orders"),
            ],
        );

        let order = graph.get_fill_order().unwrap();
        assert_eq!(names(&order), vec!["s.users", "s.orders", "s.items"]);
    }

    #[test]
    fn independent_tables_keep_registration_order() {
        let graph = graph(&["c", "a", "b"], &[]);
        let order = graph.get_fill_order().unwrap();
        assert_eq!(names(&order), vec!["s.c", "s.a", "s.b"]);
    }

    #[test]
    fn every_table_appears_once_in_a_diamond() {
        let graph = graph(
            &["lines", "accounts", "orders", "products", "lonely"],
            &[
                ("orders", "account_id", "accounts"),
                ("lines", "order_id", "orders"),
                ("lines", "product_id", "products"),
            ],
        );

        let order = names(&graph.get_fill_order().unwrap());
        assert_eq!(order.len(), 5);
        let position = |name: &str| order.iter().position(|item| item == name).unwrap();
        assert!(position("s.accounts") < position("s.orders"));
        assert!(position("s.orders") < position("s.lines"));
        assert!(position("s.products") < position("s.lines"));
        assert_eq!(
            order.iter().filter(|name| name.as_str() == "s.lonely").count(),
            1
        );
    }

    #[test]
    fn mutual_reference_is_cyclic() {
        let graph = graph(&["a", "b"], &[("a", "b_id", "b"), ("b", "a_id", "a")]);

        match graph.get_fill_order() {
            Err(Error::CyclicDependency { tables }) => {
                assert_eq!(tables, vec![TableId::new("s", "a"), TableId::new("s", "b")]);
            }
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn self_reference_is_cyclic() {
        let graph = graph(&["employees"], &[("employees", "manager_id", "employees")]);
        assert!(matches!(
            graph.get_fill_order(),
            Err(Error::CyclicDependency { .. })
        ));
    }

    #[test]
    fn cycle_report_excludes_downstream_tables() {
        let graph = graph(
            &["a", "b", "c"],
            &[("a", "b_id", "b"), ("b", "a_id", "a"), ("c", "a_id", "a")],
        );

        match graph.get_fill_order() {
            Err(Error::CyclicDependency { tables }) => {
                assert!(!tables.contains(&TableId::new("s", "c")));
                assert_eq!(tables.len(), 2);
            }
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn parallel_constraints_collapse_to_one_edge() {
        let graph = graph(
            &["users", "transfers"],
            &[
                ("transfers", "sender_id", "users"),
                ("transfers", "receiver_id", "users"),
            ],
        );

        assert_eq!(graph.edge_count(), 1);
        let transfers = graph.get_table(&TableId::new("s", "transfers")).unwrap();
        assert_eq!(transfers.parent_relationships().len(), 2);
    }

    #[test]
    fn rejects_duplicate_tables() {
        let mut graph = graph(&["users"], &[]);
        assert!(matches!(
            graph.add_table(table("users")),
            Err(Error::DuplicateTable(id)) if id == TableId::new("s", "users")
        ));
    }

    #[test]
    fn rejects_edges_to_unknown_tables() {
        let mut graph = graph(&["orders"], &[]);
        assert!(matches!(
            graph.add_edge(fk("orders", "user_id", "users")),
            Err(Error::TableNotFound(id)) if id == TableId::new("s", "users")
        ));
        assert!(graph.get_table(&TableId::new("s", "users")).is_err());
    }
}
