use thiserror::Error;

/// Errors produced while constructing geometry or planning coverage paths.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoverageError {
    /// The input polygon is not simple, or holes overlap the boundary.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// A query point lies outside the work region.
    #[error("point lies outside the work region")]
    OutsideRegion,

    /// An inward offset made an edge vanish or split the polygon.
    #[error("offset collapsed the polygon")]
    OffsetCollapsed,

    /// The input polygon has zero area.
    #[error("degenerate zero-area polygon")]
    Degenerate,

    /// No decomposition cell survived cleanup.
    #[error("decomposition produced no cells")]
    EmptyDecomposition,

    /// The cell is not y-monotone in the requested sweep frame.
    #[error("polygon is not y-monotone")]
    NotYMonotone,

    /// The cell handed to the sweep planner is unusable.
    #[error("invalid cell: {0}")]
    InvalidCell(String),

    /// A geometric invariant the algorithms rely on was broken.
    #[error("internal invariant violated: {0}")]
    InternalInvariant(String),

    /// Two points lie in disconnected components of the free region.
    #[error("no obstacle-avoiding path exists")]
    Unreachable,

    /// The GTSP solver returned a cycle that does not fit the graph.
    #[error("malformed solver solution: {0}")]
    MalformedSolution(String),

    /// The GTSP solver failed to produce any solution.
    #[error("solver failed")]
    SolverFailed,
}

impl CoverageError {
    /// The process exit code a CLI wrapper should report for this error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            CoverageError::InvalidGeometry(_) | CoverageError::OutsideRegion => 1,
            CoverageError::Degenerate
            | CoverageError::EmptyDecomposition
            | CoverageError::OffsetCollapsed => 2,
            CoverageError::NotYMonotone
            | CoverageError::InvalidCell(_)
            | CoverageError::InternalInvariant(_) => 3,
            CoverageError::MalformedSolution(_) | CoverageError::SolverFailed => 4,
            CoverageError::Unreachable => 5,
        }
    }
}

pub type Result<T> = std::result::Result<T, CoverageError>;
