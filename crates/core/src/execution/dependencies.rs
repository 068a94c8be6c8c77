//! Target dependency management
//!
//! Builds the prerequisite graph over targets and environment pseudo-targets,
//! detects cycles and turns requested goals into an ordered, de-duplicated
//! execution plan.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use petgraph::algo::kosaraju_scc;
use petgraph::prelude::*;
use tracing::debug;

use crate::tasks::{environment_target, Target, ENV_TARGET_PREFIX};
use crate::types::{RookError, RookResult};

/// One unit of work in a plan
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Step {
    /// Provision the named environment
    Provision(String),
    /// Run the named target's action
    Target(String),
}

impl Step {
    fn from_label(label: &str) -> Self {
        match label.strip_prefix(ENV_TARGET_PREFIX) {
            Some(environment) => Step::Provision(environment.to_string()),
            None => Step::Target(label.to_string()),
        }
    }

    pub fn label(&self) -> String {
        match self {
            Step::Provision(environment) => environment_target(environment),
            Step::Target(name) => name.clone(),
        }
    }
}

/// Prerequisite graph over every target and environment
#[derive(Debug)]
pub struct TargetGraph {
    graph: DiGraph<String, ()>,
    nodes: HashMap<String, NodeIndex>,
    prerequisites: BTreeMap<String, Vec<String>>,
    cycles: Vec<Vec<String>>,
}

impl TargetGraph {
    /// Build the graph; every prerequisite must name a target or environment
    pub fn build<'a>(
        targets: impl IntoIterator<Item = &'a Target>,
        environments: impl IntoIterator<Item = &'a str>,
    ) -> RookResult<Self> {
        let mut graph = DiGraph::<String, ()>::new();
        let mut nodes = HashMap::new();
        let mut prerequisites = BTreeMap::new();

        for environment in environments {
            let label = environment_target(environment);
            nodes.insert(label.clone(), graph.add_node(label.clone()));
            prerequisites.insert(label, Vec::new());
        }
        let targets: Vec<&Target> = targets.into_iter().collect();
        for target in &targets {
            nodes.insert(target.name.clone(), graph.add_node(target.name.clone()));
            prerequisites.insert(target.name.clone(), target.prerequisites.clone());
        }

        // Edge: target -> prerequisite (prerequisite runs first)
        for target in &targets {
            let from_node = nodes[&target.name];
            for dep in &target.prerequisites {
                let to_node = nodes.get(dep).ok_or_else(|| {
                    RookError::Config(format!(
                        "Target '{}' depends on '{}' which was not found",
                        target.name, dep
                    ))
                })?;
                graph.add_edge(from_node, *to_node, ());
            }
        }

        let mut cycles: Vec<Vec<String>> = kosaraju_scc(&graph)
            .into_iter()
            .filter_map(|component| {
                if component.len() > 1 {
                    let members: HashSet<&str> =
                        component.iter().map(|node| graph[*node].as_str()).collect();
                    members
                        .iter()
                        .min()
                        .and_then(|start| cycle_path(start, &members, &prerequisites))
                } else {
                    let node = component[0];
                    graph
                        .contains_edge(node, node)
                        .then(|| vec![graph[node].clone()])
                }
            })
            .collect();
        cycles.sort();

        Ok(Self {
            graph,
            nodes,
            prerequisites,
            cycles,
        })
    }

    pub fn cycles(&self) -> &[Vec<String>] {
        &self.cycles
    }

    /// Every node with its direct prerequisites, alphabetically
    pub fn edges(&self) -> Vec<(String, Vec<String>)> {
        self.prerequisites
            .iter()
            .map(|(name, deps)| (name.clone(), deps.clone()))
            .collect()
    }

    /// Ordered execution plan for `goals`.
    ///
    /// Depth-first over declared prerequisites in declared order; every
    /// distinct step appears once, after all of its prerequisites.
    pub fn plan(&self, goals: &[String]) -> RookResult<Vec<Step>> {
        let mut start_nodes = Vec::new();
        for goal in goals {
            let node = self.nodes.get(goal).ok_or_else(|| {
                RookError::Config(format!("Target '{}' not found", goal))
            })?;
            start_nodes.push(*node);
        }

        self.reject_reachable_cycles(&start_nodes)?;

        let mut visited = HashSet::new();
        let mut plan = Vec::new();
        for goal in goals {
            self.visit(goal, &mut visited, &mut plan);
        }

        debug!(
            goals = ?goals,
            plan = ?plan.iter().map(Step::label).collect::<Vec<_>>(),
            "resolved execution plan"
        );
        Ok(plan)
    }

    fn visit(&self, name: &str, visited: &mut HashSet<String>, plan: &mut Vec<Step>) {
        if !visited.insert(name.to_string()) {
            return;
        }
        if let Some(deps) = self.prerequisites.get(name) {
            for dep in deps {
                self.visit(dep, visited, plan);
            }
        }
        plan.push(Step::from_label(name));
    }

    fn reject_reachable_cycles(&self, start_nodes: &[NodeIndex]) -> RookResult<()> {
        if self.cycles.is_empty() {
            return Ok(());
        }

        let mut reachable = HashSet::new();
        let mut queue: VecDeque<NodeIndex> = start_nodes.iter().copied().collect();
        while let Some(node_index) = queue.pop_front() {
            if !reachable.insert(self.graph[node_index].clone()) {
                continue;
            }
            for neighbor in self.graph.neighbors(node_index) {
                queue.push_back(neighbor);
            }
        }

        let relevant: Vec<String> = self
            .cycles
            .iter()
            .filter(|cycle| cycle.iter().any(|name| reachable.contains(name)))
            .map(|cycle| describe_cycle(cycle))
            .collect();

        if relevant.is_empty() {
            Ok(())
        } else {
            Err(RookError::Config(format!(
                "Circular dependency detected: {}",
                relevant.join("; ")
            )))
        }
    }
}

/// Walk declared prerequisites from `start`, staying inside `members`, until
/// an edge leads back to `start`. Returns the nodes in edge order.
fn cycle_path(
    start: &str,
    members: &HashSet<&str>,
    prerequisites: &BTreeMap<String, Vec<String>>,
) -> Option<Vec<String>> {
    fn walk(
        node: &str,
        start: &str,
        members: &HashSet<&str>,
        prerequisites: &BTreeMap<String, Vec<String>>,
        seen: &mut HashSet<String>,
        path: &mut Vec<String>,
    ) -> bool {
        path.push(node.to_string());
        for dep in prerequisites.get(node).into_iter().flatten() {
            if dep == start {
                return true;
            }
            if members.contains(dep.as_str())
                && seen.insert(dep.clone())
                && walk(dep, start, members, prerequisites, seen, path)
            {
                return true;
            }
        }
        path.pop();
        false
    }

    let mut seen = HashSet::from([start.to_string()]);
    let mut path = Vec::new();
    walk(start, start, members, prerequisites, &mut seen, &mut path).then_some(path)
}

/// Render a cycle as `a -> b -> a`
pub fn describe_cycle(cycle: &[String]) -> String {
    let mut path = cycle.to_vec();
    if let Some(first) = path.first().cloned() {
        path.push(first);
    }
    path.join(" -> ")
}
