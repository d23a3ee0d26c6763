//! Anchor search and traceback.
//!
//! The alignment does not start at `(0, 0)`. The best cell on the outer
//! edge (column `j = 0` or row `i = 0`) becomes the anchor and the prefix
//! it skips is emitted against gaps at no cost. From the anchor the
//! predecessor pointers lead to the far corner; whatever remains of the
//! longer sequence when the shorter one runs out is emitted against gaps,
//! also free. The start side is therefore chosen by score while the end
//! side is pinned by the seeded last row and column. This asymmetry is
//! part of the algorithm; do not "fix" it into a corner-to-corner walk.

use protea_core::{Diagnostics, ProteaError, Result};

use crate::matrix::{AlignmentMatrix, Cell};
use crate::model::Score;
use crate::symbol::Symbol;

/// Start cell of the traceback, on the outer edge of the matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Anchor {
    /// Index into `seq1`.
    pub i: usize,
    /// Index into `seq2`.
    pub j: usize,
}

impl Anchor {
    pub fn cell(self) -> Cell {
        (self.i, self.j)
    }
}

/// Find the best-scoring cell on the outer edge.
///
/// The best of column 0 (first index on ties) is compared against the best
/// of row 0; the column wins only if strictly higher.
pub fn find_anchor(matrix: &AlignmentMatrix) -> Anchor {
    let (n1, n2) = matrix.dims();
    let best_i = first_max(n1, |i| matrix.score(i, 0));
    let best_j = first_max(n2, |j| matrix.score(0, j));

    if matrix.score(best_i, 0) > matrix.score(0, best_j) {
        Anchor { i: best_i, j: 0 }
    } else {
        Anchor { i: 0, j: best_j }
    }
}

/// Index of the first maximum of `at` over `0..len`.
fn first_max(len: usize, at: impl Fn(usize) -> Score) -> usize {
    (1..len).fold(0, |best, k| if at(k) > at(best) { k } else { best })
}

fn broken(diagnostics: &Diagnostics, cell: Cell, detail: String) -> ProteaError {
    diagnostics.traceback_inconsistency(cell, detail.clone());
    ProteaError::Traceback(format!("at ({}, {}): {detail}", cell.0, cell.1))
}

/// Append the alignment path starting at `anchor` to `aligned1`/`aligned2`.
///
/// Emits the skipped prefix against gaps, the anchor pair, every step to
/// the far corner, and the unmatched tail. Returns the number of columns
/// appended.
///
/// # Errors
///
/// Returns [`ProteaError::InvalidInput`] if the sequences do not match the
/// matrix or the anchor lies outside it, and [`ProteaError::Traceback`]
/// (after reporting to `diagnostics`) if a predecessor pointer is not a
/// legal step.
pub fn traceback<S: Symbol>(
    matrix: &AlignmentMatrix,
    seq1: &[S],
    seq2: &[S],
    anchor: Anchor,
    diagnostics: &Diagnostics,
    aligned1: &mut Vec<S>,
    aligned2: &mut Vec<S>,
) -> Result<usize> {
    let (n1, n2) = matrix.dims();
    if (seq1.len(), seq2.len()) != (n1, n2) {
        return Err(ProteaError::InvalidInput(format!(
            "sequences of length {} and {} do not match a {n1} x {n2} matrix",
            seq1.len(),
            seq2.len()
        )));
    }
    if anchor.i >= n1 || anchor.j >= n2 {
        return Err(ProteaError::InvalidInput(format!(
            "anchor ({}, {}) outside {n1} x {n2} matrix",
            anchor.i, anchor.j
        )));
    }

    let start = aligned1.len();
    let mut push = |a: S, b: S| {
        aligned1.push(a);
        aligned2.push(b);
    };

    for &a in &seq1[..anchor.i] {
        push(a, S::GAP);
    }
    for &b in &seq2[..anchor.j] {
        push(S::GAP, b);
    }

    let (mut i, mut j) = anchor.cell();
    push(seq1[i], seq2[j]);

    while i < n1 - 1 && j < n2 - 1 {
        let (pi, pj) = matrix
            .predecessor(i, j)
            .ok_or_else(|| broken(diagnostics, (i, j), "predecessor unset".into()))?;

        if (pi, pj) == (i + 1, j + 1) {
            i += 1;
            j += 1;
        } else if pj == j + 1 && pi > i + 1 && pi < n1 {
            i += 1;
            j += 1;
            while i < pi {
                push(seq1[i], S::GAP);
                i += 1;
            }
        } else if pi == i + 1 && pj > j + 1 && pj < n2 {
            i += 1;
            j += 1;
            while j < pj {
                push(S::GAP, seq2[j]);
                j += 1;
            }
        } else {
            return Err(broken(
                diagnostics,
                (i, j),
                format!("predecessor ({pi}, {pj}) is not a legal step"),
            ));
        }
        log::trace!("traceback step to ({i}, {j})");
        push(seq1[i], seq2[j]);
    }

    if i < n1 - 1 {
        for &a in &seq1[i + 1..] {
            push(a, S::GAP);
        }
    } else if j < n2 - 1 {
        for &b in &seq2[j + 1..] {
            push(S::GAP, b);
        }
    }

    Ok(aligned1.len() - start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AlignConfig;
    use crate::model::{Identity, Scorer};
    use protea_core::Diagnostic;
    use std::sync::{Arc, Mutex};

    fn identity_matrix(seq1: &[u8], seq2: &[u8], config: &AlignConfig) -> AlignmentMatrix {
        let diagnostics = Diagnostics::new();
        let scorer = Scorer::new(&Identity, true, &diagnostics);
        AlignmentMatrix::fill(seq1, seq2, &scorer, config).unwrap()
    }

    fn trace(seq1: &[u8], seq2: &[u8], config: &AlignConfig) -> (Anchor, String, String) {
        let matrix = identity_matrix(seq1, seq2, config);
        let anchor = find_anchor(&matrix);
        let (mut a1, mut a2) = (Vec::new(), Vec::new());
        let n = traceback(&matrix, seq1, seq2, anchor, &Diagnostics::new(), &mut a1, &mut a2).unwrap();
        assert_eq!(n, a1.len());
        (
            anchor,
            String::from_utf8(a1).unwrap(),
            String::from_utf8(a2).unwrap(),
        )
    }

    #[test]
    fn self_alignment_anchors_at_origin() {
        let (anchor, a1, a2) = trace(b"HEAGAWGHEE", b"HEAGAWGHEE", &AlignConfig::default());
        assert_eq!(anchor, Anchor { i: 0, j: 0 });
        assert_eq!(a1, "HEAGAWGHEE");
        assert_eq!(a2, "HEAGAWGHEE");
    }

    #[test]
    fn skipped_prefix_of_first_sequence() {
        let (anchor, a1, a2) = trace(b"XXACGT", b"ACGT", &AlignConfig::default());
        assert_eq!(anchor, Anchor { i: 2, j: 0 });
        assert_eq!(a1, "XXACGT");
        assert_eq!(a2, "--ACGT");
    }

    #[test]
    fn row_wins_anchor_ties() {
        let matrix = identity_matrix(b"AC", b"CA", &AlignConfig::default());
        assert_eq!(matrix.score(1, 0), matrix.score(0, 1));
        let (anchor, a1, a2) = trace(b"AC", b"CA", &AlignConfig::default());
        assert_eq!(anchor, Anchor { i: 0, j: 1 });
        assert_eq!(a1, "-AC");
        assert_eq!(a2, "CA-");
    }

    #[test]
    fn interior_gap_and_corner() {
        let (_, a1, a2) = trace(b"AXC", b"AC", &AlignConfig::uniform(0));
        assert_eq!(a1, "AXC");
        assert_eq!(a2, "A-C");
        let (_, a1, a2) = trace(b"AC", b"AYYC", &AlignConfig::uniform(0));
        assert_eq!(a1, "A--C");
        assert_eq!(a2, "AYYC");
    }

    #[test]
    fn unmatched_tail_is_emitted_against_gaps() {
        let (anchor, a1, a2) = trace(b"ACGTTT", b"ACG", &AlignConfig::default());
        assert_eq!(anchor, Anchor { i: 0, j: 0 });
        assert_eq!(a1, "ACGTTT");
        assert_eq!(a2, "ACG---");
    }

    #[test]
    fn appends_after_existing_columns() {
        let matrix = identity_matrix(b"AC", b"AC", &AlignConfig::default());
        let (mut a1, mut a2) = (b"..".to_vec(), b"..".to_vec());
        let n = traceback(&matrix, b"AC", b"AC", Anchor { i: 0, j: 0 }, &Diagnostics::new(), &mut a1, &mut a2)
            .unwrap();
        assert_eq!(n, 2);
        assert_eq!(a1, b"..AC");
    }

    #[test]
    fn illegal_pointer_is_reported_and_fails() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let diagnostics =
            Diagnostics::with_sink(move |d: &Diagnostic| sink.lock().unwrap().push(d.clone()));

        let mut matrix = identity_matrix(b"ACG", b"ACG", &AlignConfig::default());
        matrix.set_predecessor((0, 0), Some((2, 2)));
        let (mut a1, mut a2) = (Vec::new(), Vec::new());
        let err = traceback(&matrix, b"ACG", b"ACG", Anchor { i: 0, j: 0 }, &diagnostics, &mut a1, &mut a2)
            .unwrap_err();
        assert!(matches!(err, ProteaError::Traceback(_)));
        assert!(matches!(
            events.lock().unwrap()[0],
            Diagnostic::TracebackInconsistency { cell: (0, 0), .. }
        ));

        matrix.set_predecessor((0, 0), None);
        let err = traceback(&matrix, b"ACG", b"ACG", Anchor { i: 0, j: 0 }, &diagnostics, &mut a1, &mut a2)
            .unwrap_err();
        assert!(err.to_string().contains("predecessor unset"));
    }

    #[test]
    fn mismatched_inputs_rejected() {
        let matrix = identity_matrix(b"AC", b"AC", &AlignConfig::default());
        let (mut a1, mut a2) = (Vec::new(), Vec::new());
        let d = Diagnostics::new();
        assert!(traceback(&matrix, b"ACG", b"AC", Anchor { i: 0, j: 0 }, &d, &mut a1, &mut a2).is_err());
        assert!(traceback(&matrix, b"AC", b"AC", Anchor { i: 2, j: 0 }, &d, &mut a1, &mut a2).is_err());
    }
}
