/// An error type for landmark-based rigid alignment.
///
/// Alignment errors isolate a single frame: the caller drops the frame and
/// the remaining frames still merge.
#[derive(thiserror::Error, Debug)]
pub enum AlignmentError {
    /// Error when fewer than three landmark pairs resolved in both frames.
    #[error("Alignment needs at least 3 shared landmarks, found {found}")]
    InsufficientCorrespondences {
        /// Number of landmark pairs resolved in both frames.
        found: usize,
    },

    /// Error when the shared landmarks are collinear or coincident, leaving
    /// the rotation about their axis unconstrained.
    #[error("Shared landmarks do not span a plane, the rotation is not unique")]
    SingularAlignment,
}
