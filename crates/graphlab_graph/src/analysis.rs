// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph analyses over a store snapshot.
//!
//! Every analysis treats the graph as undirected. Loops never contribute
//! adjacency; they are reported separately where they matter (bipartite and
//! chromatic checks). Traversals use explicit stacks and queues so deep
//! graphs cannot overflow the call stack. Nothing here mutates the store.

use crate::edge::{EdgeId, PairKey};
use crate::graph::GraphStore;
use crate::node::{Color, NodeId};
use crate::presenter::{palette_color, reset_to_defaults, Element, Presenter};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

const UNVISITED: usize = usize::MAX;
const UNCOLORED: usize = usize::MAX;

/// Dense adjacency built from a store, indexed by node insertion order
struct Adjacency {
    ids: Vec<NodeId>,
    neighbors: Vec<Vec<(usize, EdgeId)>>,
    loops: Vec<Option<EdgeId>>,
}

impl Adjacency {
    fn build(graph: &GraphStore) -> Self {
        let ids: Vec<NodeId> = graph.node_ids().collect();
        let mut neighbors = vec![Vec::new(); ids.len()];
        let mut loops = vec![None; ids.len()];

        for edge in graph.edges() {
            let (Some(a), Some(b)) = (graph.node_index(edge.from), graph.node_index(edge.to)) else {
                continue;
            };
            if a == b {
                loops[a].get_or_insert(edge.id);
                continue;
            }
            neighbors[a].push((b, edge.id));
            neighbors[b].push((a, edge.id));
        }

        Self {
            ids,
            neighbors,
            loops,
        }
    }

    fn len(&self) -> usize {
        self.ids.len()
    }

    fn first_loop(&self) -> Option<(usize, EdgeId)> {
        self.loops
            .iter()
            .enumerate()
            .find_map(|(index, edge)| edge.map(|edge| (index, edge)))
    }

    /// Neighbor lists with multiplicity collapsed
    fn simple(&self) -> Vec<Vec<usize>> {
        self.neighbors
            .iter()
            .map(|list| {
                let set: BTreeSet<usize> = list.iter().map(|(v, _)| *v).collect();
                set.into_iter().collect()
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Connected components
// ---------------------------------------------------------------------------

/// Partition of the node set into connected components
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentPartition {
    /// Components in order of their first node; members in discovery order
    pub components: Vec<Vec<NodeId>>,
}

impl ComponentPartition {
    /// Number of components
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether there are no components (empty graph)
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Index of the component holding a node
    pub fn component_of(&self, node_id: NodeId) -> Option<usize> {
        self.components
            .iter()
            .position(|members| members.contains(&node_id))
    }

    /// Palette color for every node, by component
    pub fn color_map(&self) -> IndexMap<NodeId, Color> {
        self.components
            .iter()
            .enumerate()
            .flat_map(|(index, members)| members.iter().map(move |id| (*id, palette_color(index))))
            .collect()
    }

    /// Color nodes and edges by component
    pub fn apply(&self, graph: &GraphStore, presenter: &mut dyn Presenter) {
        reset_to_defaults(graph, presenter);
        let colors = self.color_map();
        for (node_id, color) in &colors {
            presenter.set_color(Element::Node(*node_id), *color);
        }
        for edge in graph.edges() {
            if let Some(color) = colors.get(&edge.from) {
                presenter.set_color(Element::Edge(edge.id), *color);
            }
        }
    }
}

/// Split the graph into connected components (loops ignored)
pub fn connected_components(graph: &GraphStore) -> ComponentPartition {
    let adjacency = Adjacency::build(graph);
    let mut visited = vec![false; adjacency.len()];
    let mut components = Vec::new();
    let mut stack = Vec::new();

    for start in 0..adjacency.len() {
        if visited[start] {
            continue;
        }
        visited[start] = true;
        stack.push(start);
        let mut members = Vec::new();

        while let Some(u) = stack.pop() {
            members.push(adjacency.ids[u]);
            for &(v, _) in &adjacency.neighbors[u] {
                if !visited[v] {
                    visited[v] = true;
                    stack.push(v);
                }
            }
        }
        components.push(members);
    }

    tracing::info!(components = components.len(), "connected components computed");
    ComponentPartition { components }
}

// ---------------------------------------------------------------------------
// Bridges
// ---------------------------------------------------------------------------

/// Edges whose removal disconnects their endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeReport {
    /// Bridge edges
    pub bridges: BTreeSet<EdgeId>,
}

impl BridgeReport {
    /// Whether an edge is a bridge
    pub fn contains(&self, edge_id: EdgeId) -> bool {
        self.bridges.contains(&edge_id)
    }

    /// Number of bridges
    pub fn len(&self) -> usize {
        self.bridges.len()
    }

    /// Whether no bridge was found
    pub fn is_empty(&self) -> bool {
        self.bridges.is_empty()
    }

    /// Highlight bridges over an otherwise default display
    pub fn apply(&self, graph: &GraphStore, presenter: &mut dyn Presenter) {
        reset_to_defaults(graph, presenter);
        for edge_id in &self.bridges {
            presenter.set_color(Element::Edge(*edge_id), Color::HIGHLIGHT);
            presenter.set_highlight(Element::Edge(*edge_id), true);
        }
    }
}

struct Frame {
    node: usize,
    via: Option<EdgeId>,
    next: usize,
}

/// Find bridges with a discovery/low-link depth-first search
///
/// An edge with a parallel sibling is never a bridge.
pub fn find_bridges(graph: &GraphStore) -> BridgeReport {
    let adjacency = Adjacency::build(graph);
    let n = adjacency.len();

    let mut multiplicity: HashMap<PairKey, usize> = HashMap::new();
    for edge in graph.edges().filter(|e| !e.is_loop()) {
        *multiplicity.entry(edge.key()).or_default() += 1;
    }
    let unique: HashSet<EdgeId> = graph
        .edges()
        .filter(|e| !e.is_loop() && multiplicity.get(&e.key()) == Some(&1))
        .map(|e| e.id)
        .collect();

    let mut disc = vec![UNVISITED; n];
    let mut low = vec![0; n];
    let mut timer = 0;
    let mut bridges = BTreeSet::new();
    let mut stack: Vec<Frame> = Vec::new();

    for root in 0..n {
        if disc[root] != UNVISITED {
            continue;
        }
        disc[root] = timer;
        low[root] = timer;
        timer += 1;
        stack.push(Frame {
            node: root,
            via: None,
            next: 0,
        });

        while let Some(frame) = stack.last_mut() {
            let u = frame.node;
            let via = frame.via;

            if let Some(&(v, edge_id)) = adjacency.neighbors[u].get(frame.next) {
                frame.next += 1;
                // Only the exact edge instance we arrived by is skipped;
                // a parallel sibling back to the parent counts as a back edge.
                if via == Some(edge_id) {
                    continue;
                }
                if disc[v] == UNVISITED {
                    disc[v] = timer;
                    low[v] = timer;
                    timer += 1;
                    stack.push(Frame {
                        node: v,
                        via: Some(edge_id),
                        next: 0,
                    });
                } else {
                    low[u] = low[u].min(disc[v]);
                }
                continue;
            }

            stack.pop();
            if let (Some(parent), Some(edge_id)) = (stack.last(), via) {
                let p = parent.node;
                low[p] = low[p].min(low[u]);
                if low[u] > disc[p] && unique.contains(&edge_id) {
                    bridges.insert(edge_id);
                }
            }
        }
    }

    tracing::info!(bridges = bridges.len(), "bridge detection complete");
    BridgeReport { bridges }
}

// ---------------------------------------------------------------------------
// Bipartite check
// ---------------------------------------------------------------------------

/// Why a graph is not bipartite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BipartiteConflict {
    /// A node with a loop cannot take a side
    SelfLoop {
        /// The looped node
        node: NodeId,
        /// The loop edge
        edge: EdgeId,
    },
    /// This edge closed an odd cycle
    OddCycle {
        /// Edge joining two same-side nodes
        edge: EdgeId,
    },
}

/// Outcome of a 2-coloring attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BipartiteResult {
    /// Whether a valid 2-coloring exists
    pub is_bipartite: bool,
    /// Side (0 or 1) of every node, on success
    pub coloring: Option<IndexMap<NodeId, u8>>,
    /// What broke the coloring, on failure
    pub conflict: Option<BipartiteConflict>,
}

impl BipartiteResult {
    fn failure(conflict: BipartiteConflict) -> Self {
        Self {
            is_bipartite: false,
            coloring: None,
            conflict: Some(conflict),
        }
    }

    /// Side of a node, on success
    pub fn side(&self, node_id: NodeId) -> Option<u8> {
        self.coloring.as_ref()?.get(&node_id).copied()
    }

    /// Color the two sides, or highlight the conflict
    pub fn apply(&self, graph: &GraphStore, presenter: &mut dyn Presenter) {
        reset_to_defaults(graph, presenter);
        if let Some(coloring) = &self.coloring {
            for (node_id, side) in coloring {
                presenter.set_color(Element::Node(*node_id), palette_color(*side as usize));
            }
        }
        match self.conflict {
            Some(BipartiteConflict::SelfLoop { node, edge }) => {
                presenter.set_highlight(Element::Node(node), true);
                presenter.set_highlight(Element::Edge(edge), true);
            }
            Some(BipartiteConflict::OddCycle { edge }) => {
                presenter.set_highlight(Element::Edge(edge), true);
            }
            None => {}
        }
    }
}

/// Try to 2-color the graph with a breadth-first search per component
pub fn check_bipartite(graph: &GraphStore) -> BipartiteResult {
    let adjacency = Adjacency::build(graph);

    if let Some((index, edge)) = adjacency.first_loop() {
        let node = adjacency.ids[index];
        tracing::info!(%node, "not bipartite: self-loop");
        return BipartiteResult::failure(BipartiteConflict::SelfLoop { node, edge });
    }

    let mut side: Vec<Option<u8>> = vec![None; adjacency.len()];
    let mut queue = VecDeque::new();

    for start in 0..adjacency.len() {
        if side[start].is_some() {
            continue;
        }
        side[start] = Some(0);
        queue.push_back(start);

        while let Some(u) = queue.pop_front() {
            let u_side = side[u].unwrap_or(0);
            for &(v, edge) in &adjacency.neighbors[u] {
                match side[v] {
                    None => {
                        side[v] = Some(1 - u_side);
                        queue.push_back(v);
                    }
                    Some(v_side) if v_side == u_side => {
                        tracing::info!(%edge, "not bipartite: odd cycle");
                        return BipartiteResult::failure(BipartiteConflict::OddCycle { edge });
                    }
                    Some(_) => {}
                }
            }
        }
    }

    let coloring: IndexMap<NodeId, u8> = adjacency
        .ids
        .iter()
        .zip(&side)
        .map(|(id, s)| (*id, s.unwrap_or(0)))
        .collect();

    tracing::info!(nodes = coloring.len(), "graph is bipartite");
    BipartiteResult {
        is_bipartite: true,
        coloring: Some(coloring),
        conflict: None,
    }
}

// ---------------------------------------------------------------------------
// Chromatic number
// ---------------------------------------------------------------------------

/// Outcome of a minimum coloring search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChromaticResult {
    /// Colors used; `None` when a loop makes proper coloring impossible
    pub chromatic_number: Option<usize>,
    /// Color class of every node (empty when uncolorable)
    pub coloring: IndexMap<NodeId, usize>,
    /// `false` when the search budget ran out and this is a greedy upper bound
    pub exact: bool,
    /// The loop that prevents any proper coloring
    pub blocking_loop: Option<EdgeId>,
}

impl ChromaticResult {
    /// Color nodes by class, or highlight the blocking loop
    pub fn apply(&self, graph: &GraphStore, presenter: &mut dyn Presenter) {
        reset_to_defaults(graph, presenter);
        for (node_id, class) in &self.coloring {
            presenter.set_color(Element::Node(*node_id), palette_color(*class));
        }
        if let Some(edge) = self.blocking_loop {
            presenter.set_highlight(Element::Edge(edge), true);
        }
    }
}

#[derive(Debug)]
struct BudgetExhausted;

/// Backtracking k-coloring search, sharing a step counter across k
struct ColoringSearch<'a> {
    adjacency: &'a [Vec<usize>],
    order: &'a [usize],
    colors: Vec<usize>,
    steps: u64,
    budget: u64,
}

impl ColoringSearch<'_> {
    fn try_k(&mut self, k: usize) -> Result<Option<Vec<usize>>, BudgetExhausted> {
        self.colors.iter_mut().for_each(|c| *c = UNCOLORED);
        if self.assign(0, 0, k)? {
            Ok(Some(self.colors.clone()))
        } else {
            Ok(None)
        }
    }

    fn assign(&mut self, position: usize, used: usize, k: usize) -> Result<bool, BudgetExhausted> {
        let Some(&v) = self.order.get(position) else {
            return Ok(true);
        };
        self.steps += 1;
        if self.steps > self.budget {
            return Err(BudgetExhausted);
        }

        // Color classes are interchangeable: never open more than one new class
        let limit = (used + 1).min(k);
        for color in 0..limit {
            if self.adjacency[v].iter().any(|&w| self.colors[w] == color) {
                continue;
            }
            self.colors[v] = color;
            if self.assign(position + 1, used.max(color + 1), k)? {
                return Ok(true);
            }
            self.colors[v] = UNCOLORED;
        }
        Ok(false)
    }
}

/// Greedy saturation-degree coloring
fn dsatur(adjacency: &[Vec<usize>]) -> Vec<usize> {
    let n = adjacency.len();
    let mut colors = vec![UNCOLORED; n];
    let mut saturation: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); n];

    for _ in 0..n {
        let next = (0..n).filter(|&v| colors[v] == UNCOLORED).max_by(|&a, &b| {
            saturation[a]
                .len()
                .cmp(&saturation[b].len())
                .then(adjacency[a].len().cmp(&adjacency[b].len()))
                .then(b.cmp(&a))
        });
        let Some(v) = next else {
            break;
        };
        let color = (0..n).find(|c| !saturation[v].contains(c)).unwrap_or(n);
        colors[v] = color;
        for &w in &adjacency[v] {
            saturation[w].insert(color);
        }
    }
    colors
}

/// Minimum number of colors for a proper node coloring
///
/// Searches k upward from a trivial lower bound with backtracking. If more
/// than `step_budget` assignments are tried, the greedy coloring is returned
/// with `exact = false`.
pub fn chromatic_number(graph: &GraphStore, step_budget: u64) -> ChromaticResult {
    let adjacency = Adjacency::build(graph);

    if let Some((_, edge)) = adjacency.first_loop() {
        tracing::info!(%edge, "no proper coloring: self-loop");
        return ChromaticResult {
            chromatic_number: None,
            coloring: IndexMap::new(),
            exact: true,
            blocking_loop: Some(edge),
        };
    }

    let n = adjacency.len();
    let simple = adjacency.simple();
    let to_map = |colors: &[usize]| -> IndexMap<NodeId, usize> {
        adjacency.ids.iter().copied().zip(colors.iter().copied()).collect()
    };

    let greedy = dsatur(&simple);
    let upper = greedy.iter().map(|c| c + 1).max().unwrap_or(0);
    let lower = if n == 0 {
        0
    } else if simple.iter().any(|list| !list.is_empty()) {
        2
    } else {
        1
    };

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| simple[b].len().cmp(&simple[a].len()).then(a.cmp(&b)));

    let mut search = ColoringSearch {
        adjacency: &simple,
        order: &order,
        colors: vec![UNCOLORED; n],
        steps: 0,
        budget: step_budget,
    };

    for k in lower..upper {
        match search.try_k(k) {
            Ok(Some(colors)) => {
                tracing::info!(chromatic_number = k, steps = search.steps, "exact coloring found");
                return ChromaticResult {
                    chromatic_number: Some(k),
                    coloring: to_map(&colors),
                    exact: true,
                    blocking_loop: None,
                };
            }
            Ok(None) => {}
            Err(BudgetExhausted) => {
                tracing::warn!(
                    budget = step_budget,
                    upper_bound = upper,
                    "coloring search budget exhausted, using greedy bound"
                );
                return ChromaticResult {
                    chromatic_number: Some(upper),
                    coloring: to_map(&greedy),
                    exact: false,
                    blocking_loop: None,
                };
            }
        }
    }

    tracing::info!(chromatic_number = upper, steps = search.steps, "greedy coloring is optimal");
    ChromaticResult {
        chromatic_number: Some(upper),
        coloring: to_map(&greedy),
        exact: true,
        blocking_loop: None,
    }
}
