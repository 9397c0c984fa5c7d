//! Turtle interpretation of an expanded L-system program. The turtle walks
//! the XZ plane, emitting one road per forward step into a [RoadCollection].

use crate::{
    config::{RoadConfig, TurtleConfig},
    network::{RoadCollection, RoadHandle},
    util::cmp_f64,
};
use anyhow::anyhow;
use derive_more::Display;
use log::{trace, warn};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize, Serializer};
use std::{cmp::Ordering, collections::BTreeMap};

/// Position and heading of the turtle. Heading is in radians, measured in the
/// XZ plane, where 0 faces +Z and positive angles rotate towards +X.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurtleState {
    pub position: Point3<f64>,
    pub heading: f64,
}

impl TurtleState {
    pub fn new(position: Point3<f64>, heading: f64) -> Self {
        Self { position, heading }
    }

    /// At the origin, facing +Z
    pub fn origin() -> Self {
        Self::new(Point3::origin(), 0.0)
    }

    /// Unit vector in the direction of the heading. Always horizontal.
    pub fn direction(&self) -> Vector3<f64> {
        Vector3::new(self.heading.sin(), 0.0, self.heading.cos())
    }

    /// The position `distance` units ahead of this one. Y is unchanged.
    pub fn ahead(&self, distance: f64) -> Point3<f64> {
        self.position + self.direction() * distance
    }
}

/// The symbol that produced a segment
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    /// `F`
    Forward,
    /// `X`, which also records a leaf at the segment's end
    Leaf,
}

/// A road emitted by the turtle, as it was handed to the road collection
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct SegmentSpec {
    pub a: Point3<f64>,
    pub b: Point3<f64>,
    pub kind: SegmentKind,
    pub handle: RoadHandle,
}

/// Sort key for a leaf position: x, then y, then z
#[derive(Copy, Clone, Debug)]
struct LeafKey(Point3<f64>);

impl Ord for LeafKey {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_f64(self.0.x, other.0.x)
            .then_with(|| cmp_f64(self.0.y, other.0.y))
            .then_with(|| cmp_f64(self.0.z, other.0.z))
    }
}

impl PartialOrd for LeafKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for LeafKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for LeafKey {}

/// The set of poses where the turtle finished an `X` step. These are the tips
/// of the road tree, kept around to seed later placement. Ordered by
/// position, and deduplicated by position: if two poses land on the same
/// point, the first one inserted is kept.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LeafSet {
    leaves: BTreeMap<LeafKey, TurtleState>,
}

impl LeafSet {
    /// Add a leaf. Returns `false` (and keeps the existing pose) if there is
    /// already a leaf at the same position.
    pub fn insert(&mut self, state: TurtleState) -> bool {
        let mut inserted = false;
        self.leaves.entry(LeafKey(state.position)).or_insert_with(|| {
            inserted = true;
            state
        });
        inserted
    }

    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    pub fn contains(&self, position: Point3<f64>) -> bool {
        self.leaves.contains_key(&LeafKey(position))
    }

    /// All leaves, ordered by position
    pub fn iter(&self) -> impl Iterator<Item = &TurtleState> {
        self.leaves.values()
    }
}

impl Extend<TurtleState> for LeafSet {
    fn extend<T: IntoIterator<Item = TurtleState>>(&mut self, iter: T) {
        for state in iter {
            self.insert(state);
        }
    }
}

impl Serialize for LeafSet {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

/// Everything that happened while interpreting a program from one start pose
#[derive(Clone, Debug, PartialEq)]
pub struct TurtleTrace {
    /// Every road that was added, in program order
    pub segments: Vec<SegmentSpec>,
    pub leaves: LeafSet,
    /// Number of `[` that were executed
    pub pushes: usize,
    /// Number of `]` that were executed
    pub pops: usize,
    /// Number of branches cut short because a road was rejected
    pub abandoned_branches: usize,
    pub start_state: TurtleState,
    /// Turtle pose after the last executed symbol
    pub final_state: TurtleState,
}

impl TurtleTrace {
    fn new(start_state: TurtleState) -> Self {
        Self {
            segments: Vec::new(),
            leaves: LeafSet::default(),
            pushes: 0,
            pops: 0,
            abandoned_branches: 0,
            start_state,
            final_state: start_state,
        }
    }

    /// Number of roads emitted by `F`
    pub fn forward_steps(&self) -> usize {
        self.segments
            .iter()
            .filter(|segment| segment.kind == SegmentKind::Forward)
            .count()
    }
}

/// Interpretation that had to stop partway through a program. Roads added
/// before the failure stay in the collection, and `trace` describes them
/// along with any leaves reached so far.
#[derive(Debug, Display)]
#[display(fmt = "{:#}", error)]
pub struct InterpretError {
    pub trace: TurtleTrace,
    pub error: anyhow::Error,
}

impl std::error::Error for InterpretError {}

/// Interprets a program of turtle symbols:
///
/// | Symbol | Effect                                                   |
/// |--------|----------------------------------------------------------|
/// | `F`    | Move forward one step, emitting a road                   |
/// | `X`    | Same as `F`, then record the new pose as a leaf          |
/// | `+`    | Turn by `-turn_angle`                                    |
/// | `-`    | Turn by `+turn_angle`                                    |
/// | `[`    | Push the current pose                                    |
/// | `]`    | Pop the last pushed pose                                 |
///
/// Anything else is ignored.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TurtleInterpreter {
    step_length: f64,
    /// Radians
    turn_angle: f64,
    road_width: f64,
}

impl TurtleInterpreter {
    /// `turn_angle` is in radians
    pub fn new(step_length: f64, turn_angle: f64, road_width: f64) -> Self {
        Self {
            step_length,
            turn_angle,
            road_width,
        }
    }

    pub fn from_config(turtle: &TurtleConfig, road: &RoadConfig) -> Self {
        Self::new(
            turtle.step_length,
            turtle.turn_angle.to_radians(),
            road.width,
        )
    }

    /// Walk the program from `start`, adding a road to `roads` for every
    /// forward step.
    ///
    /// If the collection rejects a road, the rest of the enclosing branch
    /// (up to its matching `]`) is skipped and interpretation carries on
    /// from there. If that happens outside of any branch, interpretation
    /// stops. Either way, roads that were already added stay.
    ///
    /// Returns an error if the program pops more than it pushes. The error
    /// still carries the trace up to that point.
    pub fn interpret(
        &self,
        program: &str,
        start: TurtleState,
        roads: &mut impl RoadCollection,
    ) -> Result<TurtleTrace, InterpretError> {
        let mut trace = TurtleTrace::new(start);
        match self.walk(program, roads, &mut trace) {
            Ok(()) => Ok(trace),
            Err(error) => Err(InterpretError { trace, error }),
        }
    }

    fn walk(
        &self,
        program: &str,
        roads: &mut impl RoadCollection,
        trace: &mut TurtleTrace,
    ) -> anyhow::Result<()> {
        let mut state = trace.start_state;
        let mut stack: Vec<TurtleState> = Vec::new();
        // While a branch is being skipped, this tracks how many brackets have
        // been opened inside of it
        let mut skipping: Option<usize> = None;

        for (i, symbol) in program.chars().enumerate() {
            if let Some(depth) = skipping {
                match symbol {
                    '[' => skipping = Some(depth + 1),
                    ']' if depth > 0 => skipping = Some(depth - 1),
                    ']' => {
                        skipping = None;
                        state = pop(&mut stack, i)?;
                        trace.pops += 1;
                    }
                    _ => {}
                }
                continue;
            }

            match symbol {
                'F' | 'X' => {
                    let from = state.position;
                    state.position = state.ahead(self.step_length);
                    let added =
                        roads.add_road(from, state.position, self.road_width);
                    match added {
                        Ok(handle) => {
                            let kind = if symbol == 'X' {
                                trace.leaves.insert(state);
                                SegmentKind::Leaf
                            } else {
                                SegmentKind::Forward
                            };
                            trace.segments.push(SegmentSpec {
                                a: from,
                                b: state.position,
                                kind,
                                handle,
                            });
                        }
                        Err(err) => {
                            warn!(
                                "Abandoning branch at symbol {} ({}): {:#}",
                                i, symbol, err
                            );
                            trace.abandoned_branches += 1;
                            if stack.is_empty() {
                                break;
                            }
                            skipping = Some(0);
                        }
                    }
                }
                '+' => state.heading -= self.turn_angle,
                '-' => state.heading += self.turn_angle,
                '[' => {
                    stack.push(state);
                    trace.pushes += 1;
                }
                ']' => {
                    // Where the turtle got stuck, if this pop fails
                    trace.final_state = state;
                    state = pop(&mut stack, i)?;
                    trace.pops += 1;
                }
                _ => {}
            }
        }

        if !stack.is_empty() {
            trace!("{} branch(es) left open at end of program", stack.len());
        }
        trace.final_state = state;
        Ok(())
    }
}

fn pop(
    stack: &mut Vec<TurtleState>,
    index: usize,
) -> anyhow::Result<TurtleState> {
    stack.pop().ok_or_else(|| {
        anyhow!("unbalanced ']' at symbol {}, turtle stack is empty", index)
    })
}
