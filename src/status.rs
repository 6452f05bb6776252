//! The output status bitset and the structured error type it's built from.

use thiserror::Error;

bitflags::bitflags! {
    /// Bitset describing which stages succeeded and, on failure, exactly
    /// which precondition or invariant was violated.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Status: u32 {
        /// Umbrella bit, always set alongside a specific `ERR_*` flag.
        const ERR = 1 << 0;
        const ERR_ARGS_INVALID = 1 << 1;
        const ERR_INPUT_POSITIONS_LENGTH = 1 << 2;
        const ERR_INPUT_POSITIONS_UNDEFINED_VALUE = 1 << 3;
        const ERR_INPUT_POSITIONS_DUPLICATES = 1 << 4;
        /// Not named in §6's table, but required by §9's "validate
        /// coordinate bounds at input validation time" instruction for
        /// coordinate types with a bounded-safe-arithmetic limit (`i32`).
        const ERR_INPUT_POSITIONS_OUT_OF_RANGE = 1 << 17;
        const ERR_INPUT_CONSTRAINTS_LENGTH = 1 << 5;
        const ERR_INPUT_CONSTRAINTS_OUT_OF_RANGE = 1 << 6;
        const ERR_INPUT_CONSTRAINTS_SELF_LOOP = 1 << 7;
        const ERR_INPUT_CONSTRAINTS_COLLINEAR = 1 << 8;
        const ERR_INPUT_CONSTRAINTS_DUPLICATES = 1 << 9;
        const ERR_INPUT_CONSTRAINTS_INTERSECTING = 1 << 10;
        const ERR_INPUT_HOLES_UNDEFINED_VALUE = 1 << 11;
        const ERR_INPUT_IGNORED_CONSTRAINTS_LENGTH = 1 << 12;
        const ERR_DELAUNAY_DUPLICATES_OR_COLLINEAR = 1 << 13;
        const ERR_SLOAN_ITERS_EXCEEDED = 1 << 14;
        const ERR_REFINEMENT_UNSUPPORTED = 1 << 15;
        /// Not named in the output status table but required by the
        /// concurrency model (§5): "on cancellation the function returns
        /// with Status = CANCELLED".
        const CANCELLED = 1 << 16;
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::empty()
    }
}

impl Status {
    /// `status & ERR != 0` expressed as a method, per §7's single-test
    /// error check.
    pub fn is_ok(self) -> bool {
        !self.intersects(Status::ERR)
    }

    pub fn is_cancelled(self) -> bool {
        self.contains(Status::CANCELLED)
    }

    /// Folds one error into the status word, setting both its specific
    /// flag and the `ERR` umbrella bit.
    pub fn push(&mut self, error: &Error) {
        *self |= error.status_bit() | Status::ERR;
    }
}

/// One variant per specific `ERR_*` status flag, carrying the data needed
/// to explain the failure.
#[derive(Debug, Error)]
pub enum Error {
    #[error("setting {name} has an out-of-range value: {detail}")]
    ArgsInvalid { name: &'static str, detail: String },

    #[error("positions has {0} points, need at least 3")]
    InputPositionsLength(usize),

    #[error("position {0} has a non-finite coordinate")]
    InputPositionsUndefinedValue(usize),

    #[error("positions {0} and {1} are duplicates")]
    InputPositionsDuplicates(usize, usize),

    #[error("position {index} has a coordinate exceeding the safe bound of {bound} for this coordinate type")]
    InputPositionsOutOfRange { index: usize, bound: f64 },

    #[error("constraint_edges has odd length {0}")]
    InputConstraintsLength(usize),

    #[error("constraint pair {pair} references out-of-range point index {index}")]
    InputConstraintsOutOfRange { pair: usize, index: usize },

    #[error("constraint pair {0} is a self-loop on vertex {1}")]
    InputConstraintsSelfLoop(usize, usize),

    #[error("constraint pair {pair} has vertex {vertex} collinear with and between its endpoints")]
    InputConstraintsCollinear { pair: usize, vertex: usize },

    #[error("constraint pairs {0} and {1} are duplicates (possibly reversed)")]
    InputConstraintsDuplicates(usize, usize),

    #[error("constraint pairs {0} and {1} intersect")]
    InputConstraintsIntersecting(usize, usize),

    #[error("hole seed {0} has a non-finite coordinate")]
    InputHolesUndefinedValue(usize),

    #[error("ignore_constraint_for_planting has length {actual}, expected {expected}")]
    InputIgnoredConstraintsLength { actual: usize, expected: usize },

    #[error("no finite seed triangle could be chosen: points are duplicated or collinear")]
    DelaunayDuplicatesOrCollinear,

    #[error("constraint application did not converge within {0} passes")]
    SloanItersExceeded(u32),

    #[error("refinement is not supported for this coordinate type")]
    RefinementUnsupported,
}

impl Error {
    pub fn status_bit(&self) -> Status {
        use Error::*;
        match self {
            ArgsInvalid { .. } => Status::ERR_ARGS_INVALID,
            InputPositionsLength(_) => Status::ERR_INPUT_POSITIONS_LENGTH,
            InputPositionsUndefinedValue(_) => Status::ERR_INPUT_POSITIONS_UNDEFINED_VALUE,
            InputPositionsDuplicates(_, _) => Status::ERR_INPUT_POSITIONS_DUPLICATES,
            InputPositionsOutOfRange { .. } => Status::ERR_INPUT_POSITIONS_OUT_OF_RANGE,
            InputConstraintsLength(_) => Status::ERR_INPUT_CONSTRAINTS_LENGTH,
            InputConstraintsOutOfRange { .. } => Status::ERR_INPUT_CONSTRAINTS_OUT_OF_RANGE,
            InputConstraintsSelfLoop(_, _) => Status::ERR_INPUT_CONSTRAINTS_SELF_LOOP,
            InputConstraintsCollinear { .. } => Status::ERR_INPUT_CONSTRAINTS_COLLINEAR,
            InputConstraintsDuplicates(_, _) => Status::ERR_INPUT_CONSTRAINTS_DUPLICATES,
            InputConstraintsIntersecting(_, _) => Status::ERR_INPUT_CONSTRAINTS_INTERSECTING,
            InputHolesUndefinedValue(_) => Status::ERR_INPUT_HOLES_UNDEFINED_VALUE,
            InputIgnoredConstraintsLength { .. } => Status::ERR_INPUT_IGNORED_CONSTRAINTS_LENGTH,
            DelaunayDuplicatesOrCollinear => Status::ERR_DELAUNAY_DUPLICATES_OR_COLLINEAR,
            SloanItersExceeded(_) => Status::ERR_SLOAN_ITERS_EXCEEDED,
            RefinementUnsupported => Status::ERR_REFINEMENT_UNSUPPORTED,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_is_ok() {
        assert!(Status::empty().is_ok());
        assert!(!Status::ERR.is_ok());
    }

    #[test]
    fn test_push_sets_umbrella_bit() {
        let mut status = Status::empty();
        status.push(&Error::InputPositionsLength(2));
        assert!(status.contains(Status::ERR));
        assert!(status.contains(Status::ERR_INPUT_POSITIONS_LENGTH));
        assert!(!status.is_ok());
    }

    #[test]
    fn test_additive_validation_errors() {
        let mut status = Status::empty();
        status.push(&Error::InputPositionsLength(2));
        status.push(&Error::InputConstraintsLength(3));
        assert!(status.contains(Status::ERR_INPUT_POSITIONS_LENGTH));
        assert!(status.contains(Status::ERR_INPUT_CONSTRAINTS_LENGTH));
    }
}
