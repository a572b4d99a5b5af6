use alloc::vec::Vec;
use core::fmt;

use crate::KeccakState;

/// One of the five step mappings of a round, in application order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Theta,
    Rho,
    Pi,
    Chi,
    Iota,
}

impl Stage {
    pub const ALL: [Self; 5] = [Self::Theta, Self::Rho, Self::Pi, Self::Chi, Self::Iota];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Theta => "Theta",
            Self::Rho => "Rho",
            Self::Pi => "Pi",
            Self::Chi => "Chi",
            Self::Iota => "Iota",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Receives the state after every step mapping.
///
/// Observers are called synchronously from inside the permutation and only ever see a shared
/// borrow of the state, so they cannot influence the result.
pub trait StepObserver {
    fn on_step(&mut self, round: usize, stage: Stage, state: &KeccakState);
}

impl<F> StepObserver for F
where
    F: FnMut(usize, Stage, &KeccakState),
{
    fn on_step(&mut self, round: usize, stage: Stage, state: &KeccakState) {
        self(round, stage, state)
    }
}

/// A single observed step: the round index, the stage just applied and the resulting state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepSnapshot {
    pub round: usize,
    pub stage: Stage,
    pub state: KeccakState,
}

/// An observer that keeps an owned snapshot of every step it sees.
#[derive(Clone, Debug, Default)]
pub struct StepRecorder {
    snapshots: Vec<StepSnapshot>,
}

impl StepRecorder {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            snapshots: Vec::new(),
        }
    }

    #[must_use]
    pub fn snapshots(&self) -> &[StepSnapshot] {
        &self.snapshots
    }

    #[must_use]
    pub fn into_snapshots(self) -> Vec<StepSnapshot> {
        self.snapshots
    }
}

impl StepObserver for StepRecorder {
    fn on_step(&mut self, round: usize, stage: Stage, state: &KeccakState) {
        self.snapshots.push(StepSnapshot {
            round,
            stage,
            state: state.clone(),
        });
    }
}
