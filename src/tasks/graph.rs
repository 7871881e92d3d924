// src/tasks/graph.rs

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::errors::{CssPipeError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskKind {
    Build,
    Watch,
}

impl TaskKind {
    pub fn name(self) -> &'static str {
        match self {
            TaskKind::Build => "build",
            TaskKind::Watch => "watch",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Tasks and their `after` relations.
///
/// Edge direction: dependency -> task, so `build -> watch`.
#[derive(Debug)]
pub struct TaskGraph {
    graph: DiGraphMap<TaskKind, ()>,
    aliases: BTreeMap<&'static str, TaskKind>,
}

impl Default for TaskGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskGraph {
    pub fn new() -> Self {
        let mut graph = DiGraphMap::new();
        graph.add_node(TaskKind::Build);
        graph.add_node(TaskKind::Watch);
        graph.add_edge(TaskKind::Build, TaskKind::Watch, ());

        let aliases = BTreeMap::from([("default", TaskKind::Watch)]);
        Self { graph, aliases }
    }

    /// Map a task name or alias to its task.
    pub fn resolve(&self, name: &str) -> Result<TaskKind> {
        if let Some(task) = self.graph.nodes().find(|t| t.name() == name) {
            return Ok(task);
        }
        self.aliases.get(name).copied().ok_or_else(|| {
            CssPipeError::ConfigError(format!(
                "unknown task {name:?} (expected build, watch or default)"
            ))
        })
    }

    /// Everything `name` needs, in execution order, ending with the task
    /// itself.
    pub fn plan(&self, name: &str) -> Result<Vec<TaskKind>> {
        let target = self.resolve(name)?;

        let mut needed = BTreeSet::from([target]);
        let mut stack = vec![target];
        while let Some(task) = stack.pop() {
            for dep in self.graph.neighbors_directed(task, Direction::Incoming) {
                if needed.insert(dep) {
                    stack.push(dep);
                }
            }
        }

        let order = toposort(&self.graph, None).map_err(|cycle| {
            CssPipeError::ConfigError(format!(
                "cycle detected in task graph involving task '{}'",
                cycle.node_id()
            ))
        })?;
        Ok(order.into_iter().filter(|t| needed.contains(t)).collect())
    }
}
