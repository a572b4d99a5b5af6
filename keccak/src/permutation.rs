use crate::{KeccakState, LaneWidth, Stage, StepObserver, chi, iota, pi, rho, theta};

/// A permutation in the mathematical sense.
pub trait Permutation<T: Clone>: Clone {
    fn permute(&self, mut input: T) -> T {
        self.permute_mut(&mut input);
        input
    }

    fn permute_mut(&self, input: &mut T);
}

/// Keccak-p[25w, rounds]: `rounds` applications of the Keccak round to a state of lane width `w`.
///
/// Round `i` uses the ι constant for index `i`, so running the rounds one at a time with
/// [`KeccakP::apply_round`] gives exactly the same result as [`Permutation::permute_mut`].
/// Any round count is accepted, including zero and reduced-round variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeccakP {
    width: LaneWidth,
    rounds: usize,
}

impl KeccakP {
    #[must_use]
    pub const fn new(width: LaneWidth, rounds: usize) -> Self {
        Self { width, rounds }
    }

    /// Keccak-f: the full-strength member of the family, with `12 + 2l` rounds.
    #[must_use]
    pub const fn keccak_f(width: LaneWidth) -> Self {
        Self::new(width, Self::nominal_rounds(width))
    }

    /// `12 + 2 * floor(log2(w))`, the round count of Keccak-f at this width.
    #[must_use]
    pub const fn nominal_rounds(width: LaneWidth) -> usize {
        12 + 2 * width.log2() as usize
    }

    #[must_use]
    #[inline]
    pub const fn width(&self) -> LaneWidth {
        self.width
    }

    #[must_use]
    #[inline]
    pub const fn rounds(&self) -> usize {
        self.rounds
    }

    /// Applies the single round with index `round`.
    pub fn apply_round(&self, state: &mut KeccakState, round: usize) {
        debug_assert_eq!(state.width(), self.width);
        theta(state);
        rho(state);
        pi(state);
        chi(state);
        iota(state, round);
    }

    /// Applies round `round`, reporting the state to `observer` after each step.
    pub fn apply_round_observed<O>(&self, state: &mut KeccakState, round: usize, observer: &mut O)
    where
        O: StepObserver + ?Sized,
    {
        debug_assert_eq!(state.width(), self.width);
        for stage in Stage::ALL {
            match stage {
                Stage::Theta => theta(state),
                Stage::Rho => rho(state),
                Stage::Pi => pi(state),
                Stage::Chi => chi(state),
                Stage::Iota => iota(state, round),
            }
            observer.on_step(round, stage, state);
        }
    }

    /// Runs the whole permutation, reporting every step to `observer`.
    pub fn permute_observed<O>(&self, state: &mut KeccakState, observer: &mut O)
    where
        O: StepObserver + ?Sized,
    {
        for round in 0..self.rounds {
            self.apply_round_observed(state, round, observer);
        }
    }
}

impl Permutation<KeccakState> for KeccakP {
    fn permute_mut(&self, state: &mut KeccakState) {
        for round in 0..self.rounds {
            self.apply_round(state, round);
        }
    }
}
