//! Sequence symbols.
//!
//! The engine is generic over the symbol type. Two are provided: single-byte
//! residue codes (`u8`, gap `-`) and integer tokens ([`Token`], gap `0`).

use core::fmt;

/// Integer token. Valid input tokens start at 1; `0` marks an inserted gap.
pub type Token = u32;

/// A symbol that can appear in an input or aligned sequence.
pub trait Symbol: Copy + Eq + fmt::Debug {
    /// The placeholder written opposite an unmatched symbol.
    const GAP: Self;

    /// Printable form used in diagnostics.
    fn label(self) -> String;

    /// Whether this is the gap placeholder.
    fn is_gap(self) -> bool {
        self == Self::GAP
    }
}

impl Symbol for u8 {
    const GAP: u8 = b'-';

    fn label(self) -> String {
        format!("'{}'", self.escape_ascii())
    }
}

impl Symbol for Token {
    const GAP: Token = 0;

    fn label(self) -> String {
        format!("token {self}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gap_symbols() {
        assert!(b'-'.is_gap());
        assert!(!b'A'.is_gap());
        assert!(0u32.is_gap());
        assert!(!7u32.is_gap());
    }

    #[test]
    fn labels() {
        assert_eq!(b'W'.label(), "'W'");
        assert_eq!(b'\n'.label(), "'\\n'");
        assert_eq!(27u32.label(), "token 27");
    }
}
