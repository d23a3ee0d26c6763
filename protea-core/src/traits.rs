//! Core trait definitions for the Protea toolkit.

/// A type that carries an integer score (alignment score, matrix maximum, etc.).
pub trait Scored {
    /// The score value.
    fn score(&self) -> i32;
}

/// A type that can produce a summary of its contents.
pub trait Summarizable {
    /// A one-line summary suitable for display.
    fn summary(&self) -> String;
}
