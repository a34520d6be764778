use snafu::Snafu;

/// Error returned when restoring a [`Sketch`](crate::Sketch) from raw register contents.
#[derive(Debug, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SketchError {
    #[snafu(display("precision {} is outside of the supported [4..16] range", precision))]
    InvalidPrecision { precision: u8 },

    #[snafu(display("expected {} registers, got {}", expected, actual))]
    RegisterCountMismatch { expected: usize, actual: usize },

    #[snafu(display("register {} holds rank {} above the maximum rank {}", index, value, max_rank))]
    RegisterOutOfRange { index: usize, value: u8, max_rank: u8 },
}
