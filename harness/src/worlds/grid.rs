//! `GridWorld`: 4-connected grid with walls, parsed from an ASCII map.
//!
//! Map characters: `.` free, `#` wall, `S` start, `G` goal. Free cells are
//! interned in row-major order, so handles are stable for a given map.
//!
//! The Manhattan distance serves as the priority heuristic and the moves
//! that reduce it as preferred operators. [`GridEncoder`] exposes the same
//! geometry as a two-feature vector `[|dx|, |dy|]` for learned evaluators.

use std::rc::Rc;

use pathwise_kernel::{OperatorId, StateHandle, StateRegistry, TransitionSystem};
use pathwise_search::evaluator::{FeatureEncoder, FnEvaluator};
use pathwise_search::{EvaluationResult, EvaluatorGateway};

use crate::contract::{SearchWorld, WorldError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub x: u32,
    pub y: u32,
}

impl Cell {
    #[must_use]
    pub fn manhattan(self, other: Cell) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// Move names and offsets, indexed by operator id.
const MOVES: [(&str, i64, i64); 4] = [("up", 0, -1), ("down", 0, 1), ("left", -1, 0), ("right", 1, 0)];

#[derive(Debug, Clone)]
pub struct GridWorld {
    width: u32,
    height: u32,
    walls: Vec<bool>,
    cells: Rc<StateRegistry<Cell>>,
    start: StateHandle,
    goal: Cell,
}

impl GridWorld {
    /// Parse an ASCII map. Leading and trailing blank lines are ignored.
    ///
    /// # Errors
    ///
    /// [`WorldError`] for empty or ragged maps, unknown characters, or a
    /// start/goal marker that is missing or repeated.
    pub fn parse(map: &str) -> Result<Self, WorldError> {
        let rows: Vec<&str> = map
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let width = rows.first().map_or(0, |r| r.chars().count());
        if width == 0 {
            return Err(WorldError::Empty);
        }

        let mut walls = Vec::with_capacity(width * rows.len());
        let mut free = Vec::new();
        let mut starts = Vec::new();
        let mut goals = Vec::new();
        for (y, row) in rows.iter().enumerate() {
            let actual = row.chars().count();
            if actual != width {
                return Err(WorldError::RaggedRow {
                    row: y,
                    expected: width,
                    actual,
                });
            }
            for (x, ch) in row.chars().enumerate() {
                let cell = Cell {
                    x: u32::try_from(x).map_err(|_| WorldError::TooLarge)?,
                    y: u32::try_from(y).map_err(|_| WorldError::TooLarge)?,
                };
                match ch {
                    '#' => walls.push(true),
                    '.' | 'S' | 'G' => {
                        walls.push(false);
                        free.push(cell);
                        if ch == 'S' {
                            starts.push(cell);
                        } else if ch == 'G' {
                            goals.push(cell);
                        }
                    }
                    _ => return Err(WorldError::UnknownCell { ch, x, y }),
                }
            }
        }
        let start = single(&starts, 'S')?;
        let goal = single(&goals, 'G')?;

        let cells = StateRegistry::from_states(free)?;
        let start = cells.intern(start)?;
        Ok(Self {
            width: u32::try_from(width).map_err(|_| WorldError::TooLarge)?,
            height: u32::try_from(rows.len()).map_err(|_| WorldError::TooLarge)?,
            walls,
            cells: Rc::new(cells),
            start,
            goal,
        })
    }

    /// Wall-free `width x height` grid from the top-left to the bottom-right corner.
    ///
    /// # Errors
    ///
    /// [`WorldError::Empty`] for a zero dimension, or a 1x1 grid (start and
    /// goal would share a cell).
    pub fn open_field(width: usize, height: usize) -> Result<Self, WorldError> {
        let mut map = String::with_capacity((width + 1) * height);
        for y in 0..height {
            for x in 0..width {
                map.push(match (x, y) {
                    (0, 0) => 'S',
                    _ if x + 1 == width && y + 1 == height => 'G',
                    _ => '.',
                });
            }
            map.push('\n');
        }
        Self::parse(&map)
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn goal(&self) -> Cell {
        self.goal
    }

    /// Number of free cells (= states).
    #[must_use]
    pub fn free_cells(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn cell(&self, state: StateHandle) -> Option<Cell> {
        self.cells.lookup(state)
    }

    #[must_use]
    pub fn handle(&self, cell: Cell) -> Option<StateHandle> {
        self.cells.handle_of(&cell)
    }

    /// Encoder sharing this grid's cell table.
    #[must_use]
    pub fn encoder(&self) -> GridEncoder {
        GridEncoder {
            cells: Rc::clone(&self.cells),
            goal: self.goal,
        }
    }

    fn is_wall(&self, x: u32, y: u32) -> bool {
        let index = y as usize * self.width as usize + x as usize;
        self.walls.get(index).copied().unwrap_or(true)
    }

    fn neighbour(&self, cell: Cell, op: OperatorId) -> Option<Cell> {
        let (_, dx, dy) = MOVES.get(op.index())?;
        let x = u32::try_from(i64::from(cell.x) + dx).ok()?;
        let y = u32::try_from(i64::from(cell.y) + dy).ok()?;
        (x < self.width && y < self.height && !self.is_wall(x, y)).then_some(Cell { x, y })
    }
}

fn single(found: &[Cell], marker: char) -> Result<Cell, WorldError> {
    match found {
        [cell] => Ok(*cell),
        _ => Err(WorldError::Marker {
            marker,
            count: found.len(),
        }),
    }
}

/// Operators that move towards `goal` along either axis.
#[allow(clippy::cast_possible_truncation)]
fn moves_towards(cell: Cell, goal: Cell) -> Vec<OperatorId> {
    let mut ops = Vec::new();
    for (i, (_, dx, dy)) in MOVES.iter().enumerate() {
        let closer_x = *dx != 0 && (i64::from(goal.x) - i64::from(cell.x)).signum() == *dx;
        let closer_y = *dy != 0 && (i64::from(goal.y) - i64::from(cell.y)).signum() == *dy;
        if closer_x || closer_y {
            ops.push(OperatorId::new(i as u32));
        }
    }
    ops
}

impl TransitionSystem for GridWorld {
    #[allow(clippy::unnecessary_literal_bound)]
    fn task_id(&self) -> &str {
        "grid"
    }

    fn initial_state(&self) -> StateHandle {
        self.start
    }

    fn is_goal(&self, state: StateHandle) -> bool {
        self.cell(state) == Some(self.goal)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn applicable_operators(&self, state: StateHandle, out: &mut Vec<OperatorId>) {
        let Some(cell) = self.cell(state) else {
            return;
        };
        for i in 0..MOVES.len() {
            let op = OperatorId::new(i as u32);
            if self.neighbour(cell, op).is_some() {
                out.push(op);
            }
        }
    }

    fn successor(&self, state: StateHandle, op: OperatorId) -> StateHandle {
        // only called with applicable operators, whose targets are interned
        self.cell(state)
            .and_then(|cell| self.neighbour(cell, op))
            .and_then(|next| self.handle(next))
            .unwrap_or(state)
    }

    fn operator_cost(&self, _op: OperatorId) -> u32 {
        1
    }

    fn operator_name(&self, op: OperatorId) -> String {
        MOVES
            .get(op.index())
            .map_or_else(|| op.to_string(), |(name, _, _)| (*name).to_string())
    }
}

impl SearchWorld for GridWorld {
    fn evaluators(&self) -> EvaluatorGateway {
        let cells = Rc::clone(&self.cells);
        let goal = self.goal;
        EvaluatorGateway::new().with_priority_and_preferred(FnEvaluator::new(
            "manhattan",
            move |state: StateHandle, _g: u64| match cells.lookup(state) {
                Some(cell) => EvaluationResult::value(f64::from(cell.manhattan(goal)))
                    .with_preferred(moves_towards(cell, goal)),
                None => EvaluationResult::dead_end(),
            },
        ))
    }

    fn describe(&self, state: StateHandle) -> String {
        self.cell(state)
            .map_or_else(|| state.to_string(), |c| format!("({}, {})", c.x, c.y))
    }
}

/// `[|dx|, |dy|]` to the goal; preferred operators move towards it.
#[derive(Debug, Clone)]
pub struct GridEncoder {
    cells: Rc<StateRegistry<Cell>>,
    goal: Cell,
}

impl FeatureEncoder for GridEncoder {
    fn n_features(&self) -> usize {
        2
    }

    fn encode(&mut self, state: StateHandle) -> Option<Vec<f64>> {
        let cell = self.cells.lookup(state)?;
        Some(vec![
            f64::from(cell.x.abs_diff(self.goal.x)),
            f64::from(cell.y.abs_diff(self.goal.y)),
        ])
    }

    fn preferred_operators(&mut self, state: StateHandle) -> Vec<OperatorId> {
        self.cells
            .lookup(state)
            .map(|cell| moves_towards(cell, self.goal))
            .unwrap_or_default()
    }
}
