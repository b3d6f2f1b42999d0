//! `GraphTask`: an explicit weighted digraph over named states.
//!
//! Operator `i` is edge `i`; state 0 is the initial state. The heuristic is a
//! table with one entry per state, `None` marking a dead end.

use pathwise_harness::SearchWorld;
use pathwise_kernel::{OperatorId, StateHandle, TransitionSystem};
use pathwise_search::evaluator::FnEvaluator;
use pathwise_search::{EvaluationResult, EvaluatorGateway};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Edge {
    from: u32,
    to: u32,
    cost: u32,
}

#[derive(Debug, Clone)]
pub struct GraphTask {
    names: Vec<&'static str>,
    edges: Vec<Edge>,
    goal: u32,
    h: Vec<Option<u32>>,
}

impl GraphTask {
    /// Build a graph from `(from, to, cost)` triples over `names`.
    ///
    /// # Panics
    ///
    /// If `h` does not hold one value per state or an edge or the goal names
    /// a state that does not exist.
    #[must_use]
    pub fn new(
        names: &[&'static str],
        edges: &[(&str, &str, u32)],
        goal: &str,
        h: &[Option<u32>],
    ) -> Self {
        assert_eq!(names.len(), h.len(), "one heuristic value per state");
        let index = |name: &str| -> u32 {
            let i = names
                .iter()
                .position(|n| *n == name)
                .unwrap_or_else(|| panic!("unknown state {name}"));
            u32::try_from(i).unwrap()
        };
        Self {
            names: names.to_vec(),
            edges: edges
                .iter()
                .map(|&(from, to, cost)| Edge {
                    from: index(from),
                    to: index(to),
                    cost,
                })
                .collect(),
            goal: index(goal),
            h: h.to_vec(),
        }
    }

    /// `S → A → B` and `S → B` where the direct edge is expensive and `A`
    /// looks bad, so `B` is closed on the expensive path first.
    ///
    /// ```text
    /// S --1--> A --1--> B --1--> G
    ///  \----------3----/
    /// h: S=3 A=5 B=1 G=0
    /// ```
    #[must_use]
    pub fn diamond() -> Self {
        Self::new(
            &["S", "A", "B", "G"],
            &[("S", "A", 1), ("S", "B", 3), ("A", "B", 1), ("B", "G", 1)],
            "G",
            &[Some(3), Some(5), Some(1), Some(0)],
        )
    }

    /// A line `s0 → s1 → …` whose heuristic values are `h`; the last state is
    /// the goal.
    ///
    /// # Panics
    ///
    /// If `h` is empty.
    #[must_use]
    pub fn line(h: &[u32]) -> Self {
        const NAMES: [&str; 10] = ["s0", "s1", "s2", "s3", "s4", "s5", "s6", "s7", "s8", "s9"];
        assert!(!h.is_empty() && h.len() <= NAMES.len(), "line of 1..=10 states");
        let names = &NAMES[..h.len()];
        let edges: Vec<(&str, &str, u32)> = names.windows(2).map(|w| (w[0], w[1], 1)).collect();
        let h: Vec<Option<u32>> = h.iter().copied().map(Some).collect();
        Self::new(names, &edges, names[names.len() - 1], &h)
    }

    /// # Panics
    ///
    /// If no state is called `name`.
    #[must_use]
    pub fn state(&self, name: &str) -> StateHandle {
        let i = self
            .names
            .iter()
            .position(|n| *n == name)
            .unwrap_or_else(|| panic!("unknown state {name}"));
        StateHandle::new(u32::try_from(i).unwrap())
    }

    /// # Panics
    ///
    /// If there is no edge from `from` to `to`.
    #[must_use]
    pub fn op(&self, from: &str, to: &str) -> OperatorId {
        let (from, to) = (self.state(from), self.state(to));
        let i = self
            .edges
            .iter()
            .position(|e| e.from as usize == from.index() && e.to as usize == to.index())
            .unwrap_or_else(|| panic!("no edge {from} -> {to}"));
        OperatorId::new(u32::try_from(i).unwrap())
    }

    #[must_use]
    pub fn name(&self, state: StateHandle) -> &'static str {
        self.names.get(state.index()).copied().unwrap_or("?")
    }

    /// Names of `states`, in order.
    #[must_use]
    pub fn names(&self, states: &[StateHandle]) -> Vec<&'static str> {
        states.iter().map(|s| self.name(*s)).collect()
    }
}

impl TransitionSystem for GraphTask {
    #[allow(clippy::unnecessary_literal_bound)]
    fn task_id(&self) -> &str {
        "graph"
    }

    fn initial_state(&self) -> StateHandle {
        StateHandle::new(0)
    }

    fn is_goal(&self, state: StateHandle) -> bool {
        state.index() == self.goal as usize
    }

    fn applicable_operators(&self, state: StateHandle, out: &mut Vec<OperatorId>) {
        for (i, edge) in self.edges.iter().enumerate() {
            if edge.from as usize == state.index() {
                out.push(OperatorId::new(u32::try_from(i).unwrap_or(u32::MAX)));
            }
        }
    }

    fn successor(&self, state: StateHandle, op: OperatorId) -> StateHandle {
        self.edges
            .get(op.index())
            .map_or(state, |e| StateHandle::new(e.to))
    }

    fn operator_cost(&self, op: OperatorId) -> u32 {
        self.edges.get(op.index()).map_or(1, |e| e.cost)
    }

    fn operator_name(&self, op: OperatorId) -> String {
        match self.edges.get(op.index()) {
            Some(e) => format!(
                "{}->{}",
                self.name(StateHandle::new(e.from)),
                self.name(StateHandle::new(e.to))
            ),
            None => op.to_string(),
        }
    }
}

impl SearchWorld for GraphTask {
    fn evaluators(&self) -> EvaluatorGateway {
        let h = self.h.clone();
        EvaluatorGateway::single(FnEvaluator::new(
            "table",
            move |state: StateHandle, _g: u64| match h.get(state.index()).copied().flatten() {
                Some(value) => EvaluationResult::value(f64::from(value)),
                None => EvaluationResult::dead_end(),
            },
        ))
    }

    fn describe(&self, state: StateHandle) -> String {
        self.name(state).to_string()
    }
}
