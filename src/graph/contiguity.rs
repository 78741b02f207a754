use std::collections::VecDeque;

use crate::graph::Graph;

impl Graph {
    /// Mark every node reachable from `start` without leaving the nodes flagged in `member`.
    pub(crate) fn reachable_within(&self, start: usize, member: &[bool]) -> Vec<bool> {
        assert!(member.len() == self.node_count(), "member.len() must equal node_count");
        assert!(member[start], "start node must be a member");

        let mut visited = vec![false; self.node_count()];
        visited[start] = true;

        let mut queue = VecDeque::from([start]);
        while let Some(u) = queue.pop_front() {
            for v in self.edges(u) {
                if member[v] && !visited[v] {
                    visited[v] = true;
                    queue.push_back(v);
                }
            }
        }

        visited
    }

    /// Check if a set of nodes forms a connected subgraph, searching from `root`.
    /// The empty set is treated as connected.
    pub(crate) fn is_connected_from(&self, root: usize, nodes: &[usize]) -> bool {
        if nodes.is_empty() { return true }

        let mut member = vec![false; self.node_count()];
        nodes.iter().for_each(|&u| member[u] = true);
        if !member[root] { return false }

        let visited = self.reachable_within(root, &member);
        nodes.iter().all(|&u| visited[u])
    }

    /// Check if a set of nodes forms a connected subgraph.
    #[inline]
    pub(crate) fn is_connected_subset(&self, nodes: &[usize]) -> bool {
        nodes.first().is_none_or(|&root| self.is_connected_from(root, nodes))
    }

    /// Label the connected components of the whole graph, in order of first appearance.
    pub(crate) fn components(&self) -> Vec<usize> {
        let everyone = vec![true; self.node_count()];
        let mut labels = vec![usize::MAX; self.node_count()];
        let mut next = 0;

        for u in 0..self.node_count() {
            if labels[u] != usize::MAX { continue }
            self.reachable_within(u, &everyone).iter()
                .enumerate()
                .filter(|&(_, &seen)| seen)
                .for_each(|(v, _)| labels[v] = next);
            next += 1;
        }

        labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Path 0 - 1 - 2 - 3 plus an isolated node 4.
    fn make_path_graph() -> Graph {
        Graph::new(5, &[vec![1], vec![0, 2], vec![1, 3], vec![2], vec![]], vec![1.0; 5])
    }

    #[test]
    fn contiguous_subsets() {
        let graph = make_path_graph();

        assert!(graph.is_connected_subset(&[]));
        assert!(graph.is_connected_subset(&[4]));
        assert!(graph.is_connected_subset(&[1, 2, 3]));
        assert!(graph.is_connected_subset(&[3, 2]));
    }

    #[test]
    fn disconnected_subsets() {
        let graph = make_path_graph();

        assert!(!graph.is_connected_subset(&[0, 2]));
        assert!(!graph.is_connected_subset(&[0, 1, 3]));
        assert!(!graph.is_connected_subset(&[3, 4]));
    }

    #[test]
    fn root_outside_subset_is_not_connected() {
        let graph = make_path_graph();
        assert!(!graph.is_connected_from(0, &[1, 2]));
        assert!(graph.is_connected_from(2, &[1, 2]));
    }

    #[test]
    fn reachable_within_stays_inside_members() {
        let graph = make_path_graph();
        let member = vec![true, true, false, true, true];
        assert_eq!(graph.reachable_within(0, &member), vec![true, true, false, false, false]);
    }

    #[test]
    fn components_label_in_order() {
        let graph = make_path_graph();
        assert_eq!(graph.components(), vec![0, 0, 0, 0, 1]);
    }
}
