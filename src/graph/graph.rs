/// A node-weighted, undirected graph in compressed sparse row format.
///
/// Neighbor lists are sorted and deduplicated, carry no self-loops, and every
/// arc `u -> v` has its reverse `v -> u`.
#[derive(Clone, Debug, Default)]
pub(crate) struct Graph {
    size: usize,
    offsets: Vec<u32>,
    edges: Vec<u32>,
    node_weights: Vec<f64>,
}

impl Graph {
    /// Construct a graph from symmetric adjacency lists and node weights.
    pub(crate) fn new(num_nodes: usize, edges: &[Vec<u32>], node_weights: Vec<f64>) -> Self {
        assert!(edges.len() == num_nodes, "edges.len() must equal num_nodes");
        assert!(node_weights.len() == num_nodes, "node_weights.len() must equal num_nodes");

        let edges = edges.iter()
            .enumerate()
            .map(|(u, list)| {
                let mut list = list.iter().copied().filter(|&v| v as usize != u).collect::<Vec<_>>();
                list.iter().for_each(|&v| assert!((v as usize) < num_nodes, "edge target {v} out of range"));
                list.sort_unstable();
                list.dedup();
                list
            })
            .collect::<Vec<_>>();

        let graph = Self {
            size: num_nodes,
            offsets: std::iter::once(0u32).chain(
                edges.iter()
                    .map(|v| v.len() as u32)
                    .scan(0u32, |acc, len| {*acc += len; Some(*acc)})
            ).collect::<Vec<u32>>(),
            edges: edges.into_iter().flatten().collect(),
            node_weights,
        };
        assert!(graph.is_symmetric(), "adjacency lists must be symmetric");
        graph
    }

    /// Construct a graph from possibly one-directional adjacency lists, adding
    /// any missing reverse arcs. Returns the graph and the arcs `(u, v)` whose
    /// reverse had to be added.
    pub(crate) fn symmetrized(adjacency: &[Vec<usize>], node_weights: Vec<f64>) -> (Self, Vec<(usize, usize)>) {
        let num_nodes = adjacency.len();
        let mut lists = adjacency.iter()
            .map(|list| list.iter().map(|&v| v as u32).collect::<Vec<_>>())
            .collect::<Vec<_>>();

        let mut added = Vec::new();
        for (u, list) in adjacency.iter().enumerate() {
            for &v in list.iter().filter(|&&v| v != u) {
                if !adjacency[v].contains(&u) && !lists[v].contains(&(u as u32)) {
                    lists[v].push(u as u32);
                    added.push((u, v));
                }
            }
        }

        (Self::new(num_nodes, &lists, node_weights), added)
    }

    /// Get the number of nodes in the graph.
    #[inline] pub(crate) fn node_count(&self) -> usize { self.size }

    /// Get the number of directed arcs (twice the number of undirected edges).
    #[inline] pub(crate) fn edge_count(&self) -> usize { self.edges.len() }

    /// Get the weight of a node.
    #[inline] pub(crate) fn node_weight(&self, node: usize) -> f64 { self.node_weights[node] }

    /// Get all node weights, indexed by node.
    #[inline] pub(crate) fn node_weights(&self) -> &[f64] { &self.node_weights }

    /// Sum of all node weights.
    #[inline] pub(crate) fn total_weight(&self) -> f64 { self.node_weights.iter().sum() }

    /// Get the range of arc slots for a given node.
    #[inline]
    pub(crate) fn range(&self, node: usize) -> std::ops::Range<usize> {
        self.offsets[node] as usize .. self.offsets[node + 1] as usize
    }

    /// Get an iterator over the neighbors of a given node.
    #[inline]
    pub(crate) fn edges(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.range(node).map(move |v| self.edges[v] as usize)
    }

    /// Get an iterator over the neighbors of a given node with their arc slots.
    #[inline]
    pub(crate) fn edges_with_slots(&self, node: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.range(node).map(move |slot| (self.edges[slot] as usize, slot))
    }

    /// Get the arc slot of `u -> v`, if the nodes are adjacent.
    pub(crate) fn edge_slot(&self, u: usize, v: usize) -> Option<usize> {
        let range = self.range(u);
        self.edges[range.clone()].binary_search(&(v as u32)).ok().map(|i| range.start + i)
    }

    /// For every arc slot `u -> v`, the slot of its reverse `v -> u`.
    pub(crate) fn reverse_slots(&self) -> Vec<usize> {
        (0..self.size)
            .flat_map(|u| self.edges(u).map(move |v| (u, v)))
            .map(|(u, v)| self.edge_slot(v, u).expect("graph must be symmetric"))
            .collect()
    }

    /// Check whether `u` and `v` are adjacent.
    #[inline] pub(crate) fn contains_edge(&self, u: usize, v: usize) -> bool { self.edge_slot(u, v).is_some() }

    /// Iterate over every arc as `(u, v, slot)`, in slot order.
    pub(crate) fn arcs(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        (0..self.size).flat_map(move |u| self.edges_with_slots(u).map(move |(v, slot)| (u, v, slot)))
    }

    /// Iterate over every undirected edge once, as `(u, v, slot of u -> v)` with `u < v`.
    pub(crate) fn undirected_edges(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        self.arcs().filter(|&(u, v, _)| u < v)
    }

    /// Check that every arc has its reverse.
    pub(crate) fn is_symmetric(&self) -> bool {
        (0..self.size).all(|u| self.edges(u).all(|v| self.contains_edge(v, u)))
    }
}
