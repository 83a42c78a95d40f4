/// Errors raised for malformed input to the geometry and camera builders
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("invalid frustum: {0}")]
    InvalidFrustum(&'static str),

    #[error("invalid subdivision count {num_h}x{num_v}, both must be at least 1 and the vertices must fit u32 indices")]
    InvalidSubdivisions { num_h: usize, num_v: usize },

    #[error("a tube ring needs at least 3 segments, got {0}")]
    TooFewSegments(usize),

    #[error("radius must be finite and non-negative, got {0}")]
    InvalidRadius(f32),

    #[error("flat coordinate array of length {0} is not a multiple of 3")]
    RaggedCoordinates(usize),

    #[error("index {index} out of range for {len} elements")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("attribute `{name}` has {got} entries, expected {expected}")]
    AttributeLength {
        name: &'static str,
        got: usize,
        expected: usize,
    },

    #[error("matrix stack underflow")]
    StackUnderflow,

    #[error("buffer too small: need {needed} floats, have {len}")]
    BufferTooSmall { needed: usize, len: usize },

    #[error("STL: {0}")]
    Stl(String),
}

pub type Result<T> = std::result::Result<T, Error>;
