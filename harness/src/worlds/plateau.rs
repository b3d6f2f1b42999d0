//! `PlateauWorld`: a corridor with a flat heuristic stretch and dead-end side
//! branches.
//!
//! The corridor runs `0 ..= length`; the goal is its end. Every corridor
//! state before the end also starts a side branch of `branch_depth` states
//! whose tip is a (reliable) dead end. For the first `plateau` corridor states
//! and for every branch state the heuristic is flat, so greedy search has no
//! gradient there and the stall counter climbs. Past the plateau the
//! heuristic is the remaining corridor distance.

use pathwise_kernel::{OperatorId, StateHandle, TransitionSystem};
use pathwise_search::evaluator::FnEvaluator;
use pathwise_search::{EvaluationResult, EvaluatorGateway};

use crate::contract::{SearchWorld, WorldError};

const FORWARD: OperatorId = OperatorId::new(0);
const SIDE: OperatorId = OperatorId::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Place {
    Corridor(u32),
    /// Branch leaving corridor state `from`, `depth` steps in.
    Branch { from: u32, depth: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    length: u32,
    plateau: u32,
    branch_depth: u32,
}

impl Geometry {
    #[must_use]
    pub fn place(self, state: StateHandle) -> Option<Place> {
        let index = u32::try_from(state.index()).ok()?;
        if index <= self.length {
            return Some(Place::Corridor(index));
        }
        if self.branch_depth == 0 {
            return None;
        }
        let offset = index - self.length - 1;
        let from = offset / self.branch_depth;
        (from < self.length).then_some(Place::Branch {
            from,
            depth: offset % self.branch_depth,
        })
    }

    fn handle(self, place: Place) -> StateHandle {
        StateHandle::new(match place {
            Place::Corridor(i) => i,
            Place::Branch { from, depth } => self.length + 1 + from * self.branch_depth + depth,
        })
    }

    /// Heuristic of `place`; `None` for a dead-end branch tip.
    #[must_use]
    pub fn estimate(self, place: Place) -> Option<u32> {
        let flat = self.length - self.plateau;
        match place {
            Place::Corridor(i) if i < self.plateau => Some(flat),
            Place::Corridor(i) => Some(self.length - i),
            Place::Branch { depth, .. } if depth + 1 == self.branch_depth => None,
            Place::Branch { .. } => Some(flat),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlateauWorld {
    geometry: Geometry,
}

impl PlateauWorld {
    /// # Errors
    ///
    /// [`WorldError::Empty`] for a zero-length corridor or a plateau longer
    /// than it; [`WorldError::TooLarge`] when the states overflow `u32`.
    pub fn new(length: u32, plateau: u32, branch_depth: u32) -> Result<Self, WorldError> {
        if length == 0 || plateau > length {
            return Err(WorldError::Empty);
        }
        length
            .checked_mul(branch_depth)
            .and_then(|branches| branches.checked_add(length))
            .and_then(|states| states.checked_add(1))
            .ok_or(WorldError::TooLarge)?;
        Ok(Self {
            geometry: Geometry {
                length,
                plateau,
                branch_depth,
            },
        })
    }

    #[must_use]
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Total number of states.
    #[must_use]
    pub fn state_count(&self) -> u32 {
        let g = self.geometry;
        g.length + 1 + g.length * g.branch_depth
    }
}

impl TransitionSystem for PlateauWorld {
    #[allow(clippy::unnecessary_literal_bound)]
    fn task_id(&self) -> &str {
        "plateau"
    }

    fn initial_state(&self) -> StateHandle {
        StateHandle::new(0)
    }

    fn is_goal(&self, state: StateHandle) -> bool {
        self.geometry.place(state) == Some(Place::Corridor(self.geometry.length))
    }

    fn applicable_operators(&self, state: StateHandle, out: &mut Vec<OperatorId>) {
        let g = self.geometry;
        match g.place(state) {
            Some(Place::Corridor(i)) if i < g.length => {
                out.push(FORWARD);
                if g.branch_depth > 0 {
                    out.push(SIDE);
                }
            }
            Some(Place::Branch { depth, .. }) if depth + 1 < g.branch_depth => out.push(FORWARD),
            _ => {}
        }
    }

    fn successor(&self, state: StateHandle, op: OperatorId) -> StateHandle {
        let g = self.geometry;
        let next = match (g.place(state), op) {
            (Some(Place::Corridor(i)), FORWARD) => Place::Corridor(i + 1),
            (Some(Place::Corridor(i)), _) => Place::Branch { from: i, depth: 0 },
            (Some(Place::Branch { from, depth }), _) => Place::Branch {
                from,
                depth: depth + 1,
            },
            (None, _) => return state,
        };
        g.handle(next)
    }

    fn operator_cost(&self, _op: OperatorId) -> u32 {
        1
    }

    fn operator_name(&self, op: OperatorId) -> String {
        let name = if op == FORWARD { "forward" } else { "side" };
        name.to_string()
    }
}

impl SearchWorld for PlateauWorld {
    fn evaluators(&self) -> EvaluatorGateway {
        let geometry = self.geometry;
        EvaluatorGateway::single(FnEvaluator::new(
            "corridor",
            move |state: StateHandle, _g: u64| {
                match geometry.place(state).and_then(|p| geometry.estimate(p)) {
                    Some(h) => EvaluationResult::value(f64::from(h)),
                    None => EvaluationResult::dead_end(),
                }
            },
        ))
    }

    fn describe(&self, state: StateHandle) -> String {
        match self.geometry.place(state) {
            Some(Place::Corridor(i)) => format!("c{i}"),
            Some(Place::Branch { from, depth }) => format!("b{from}.{depth}"),
            None => state.to_string(),
        }
    }
}
