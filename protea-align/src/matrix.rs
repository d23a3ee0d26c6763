//! The dynamic-programming score matrix and its predecessor pointers.
//!
//! Both grids are `D x D` with `D = max(n1, n2)`; only the `n1 x n2`
//! corner is meaningful. Cell `(i, j)` holds the best score of aligning
//! `seq1[i..]` against `seq2[j..]` with `seq1[i]` paired to `seq2[j]`.
//!
//! The fill runs backwards from the far corner. The last row
//! (`i = n1 - 1`) and last column (`j = n2 - 1`) are seeded with the bare
//! pair score. The sweep then steps one diagonal at a time towards
//! `(0, 0)`, filling the column segment above and the row segment left of
//! each diagonal cell. A cell takes the best of three predecessors:
//!
//! - the diagonal `(i + 1, j + 1)`
//! - a gap in `seq2`: `(k, j + 1)` for `k > i + 1`, less the cost of the
//!   `k - i - 1` skipped `seq1` symbols
//! - a gap in `seq1`: `(i + 1, l)` for `l > j + 1`, likewise
//!
//! The diagonal wins ties, a `seq2` gap beats a `seq1` gap only when
//! strictly better, and within one axis the shortest run wins ties.

use core::fmt;
use core::ops::{Index, IndexMut};

use protea_core::{ProteaError, Result};

use crate::config::{AlignConfig, GapSearch};
use crate::model::{Score, ScoreModel, Scorer};
use crate::symbol::Symbol;

/// A matrix coordinate `(i, j)`: `i` indexes `seq1`, `j` indexes `seq2`.
pub type Cell = (usize, usize);

/// Best gap landing found so far: adjusted score and landing index.
type Candidate = Option<(Score, usize)>;

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

/// Square row-major grid.
#[derive(Debug, Clone)]
struct Grid<T> {
    dim: usize,
    cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
    fn try_new(dim: usize, init: T, what: &str) -> Result<Self> {
        let len = dim.checked_mul(dim).ok_or_else(|| {
            ProteaError::Allocation(format!("{what}: {dim} x {dim} cells overflow usize"))
        })?;
        let mut cells = Vec::new();
        cells
            .try_reserve_exact(len)
            .map_err(|e| ProteaError::Allocation(format!("{what}: {dim} x {dim} cells: {e}")))?;
        cells.resize(len, init);
        Ok(Self { dim, cells })
    }
}

impl<T> Index<Cell> for Grid<T> {
    type Output = T;

    fn index(&self, (i, j): Cell) -> &T {
        debug_assert!(i < self.dim && j < self.dim, "({i}, {j}) outside {0}x{0} grid", self.dim);
        &self.cells[i * self.dim + j]
    }
}

impl<T> IndexMut<Cell> for Grid<T> {
    fn index_mut(&mut self, (i, j): Cell) -> &mut T {
        debug_assert!(i < self.dim && j < self.dim, "({i}, {j}) outside {0}x{0} grid", self.dim);
        &mut self.cells[i * self.dim + j]
    }
}

// ---------------------------------------------------------------------------
// Gap search
// ---------------------------------------------------------------------------

/// Per-fill state for the gap candidate search.
enum GapTracker {
    Exhaustive,
    /// Best `seq2`-gap and `seq1`-gap candidates of every filled cell.
    Incremental {
        right: Grid<Candidate>,
        down: Grid<Candidate>,
    },
}

impl GapTracker {
    fn new(search: GapSearch, dim: usize) -> Result<Self> {
        Ok(match search {
            GapSearch::Exhaustive => GapTracker::Exhaustive,
            GapSearch::Incremental => GapTracker::Incremental {
                right: Grid::try_new(dim, None, "gap candidates")?,
                down: Grid::try_new(dim, None, "gap candidates")?,
            },
        })
    }
}

/// Prefer `own` (the shorter run) unless `carried` is strictly better.
fn shorter_unless_worse(own: Candidate, carried: Candidate) -> Candidate {
    match (own, carried) {
        (Some(o), Some(c)) => Some(if c.0 > o.0 { c } else { o }),
        (o, c) => o.or(c),
    }
}

// ---------------------------------------------------------------------------
// AlignmentMatrix
// ---------------------------------------------------------------------------

/// Filled score and predecessor matrices for one alignment.
#[derive(Debug, Clone)]
pub struct AlignmentMatrix {
    n1: usize,
    n2: usize,
    scores: Grid<Score>,
    pointers: Grid<Option<Cell>>,
}

impl AlignmentMatrix {
    /// Allocate and fill the matrices for `seq1` against `seq2`.
    ///
    /// # Errors
    ///
    /// Returns [`ProteaError::InvalidInput`] if either sequence is empty and
    /// [`ProteaError::Allocation`] if the `D x D` grids cannot be allocated.
    pub fn fill<S, M>(
        seq1: &[S],
        seq2: &[S],
        scorer: &Scorer<'_, S, M>,
        config: &AlignConfig,
    ) -> Result<Self>
    where
        S: Symbol,
        M: ScoreModel<S> + ?Sized,
    {
        let (n1, n2) = (seq1.len(), seq2.len());
        if n1 == 0 || n2 == 0 {
            return Err(ProteaError::InvalidInput(
                "sequences must not be empty".into(),
            ));
        }
        let dim = n1.max(n2);
        let mut matrix = Self {
            n1,
            n2,
            scores: Grid::try_new(dim, 0, "score matrix")?,
            pointers: Grid::try_new(dim, None, "predecessor matrix")?,
        };
        let mut gaps = GapTracker::new(config.gap_search, dim)?;

        matrix.seed_boundary(seq1, seq2, scorer);

        let (mut i, mut j) = (n1 - 1, n2 - 1);
        while i > 0 && j > 0 {
            i -= 1;
            j -= 1;
            for i1 in (0..=i).rev() {
                matrix.fill_cell((i1, j), seq1, seq2, scorer, config, &mut gaps);
            }
            for j1 in (0..j).rev() {
                matrix.fill_cell((i, j1), seq1, seq2, scorer, config, &mut gaps);
            }
        }

        log::debug!(
            "filled {n1} x {n2} alignment matrix ({:?} gap search)",
            config.gap_search
        );
        Ok(matrix)
    }

    /// Pair scores along the last row and last column. The shared corner
    /// is scored once.
    fn seed_boundary<S, M>(&mut self, seq1: &[S], seq2: &[S], scorer: &Scorer<'_, S, M>)
    where
        S: Symbol,
        M: ScoreModel<S> + ?Sized,
    {
        let (last1, last2) = (self.n1 - 1, self.n2 - 1);
        for (j, &b) in seq2.iter().enumerate() {
            self.scores[(last1, j)] = scorer.score(seq1[last1], b);
        }
        for (i, &a) in seq1.iter().enumerate().take(last1) {
            self.scores[(i, last2)] = scorer.score(a, seq2[last2]);
        }
    }

    fn fill_cell<S, M>(
        &mut self,
        (i, j): Cell,
        seq1: &[S],
        seq2: &[S],
        scorer: &Scorer<'_, S, M>,
        config: &AlignConfig,
        gaps: &mut GapTracker,
    ) where
        S: Symbol,
        M: ScoreModel<S> + ?Sized,
    {
        let (right, down) = match gaps {
            GapTracker::Exhaustive => (self.scan_right((i, j), config), self.scan_down((i, j), config)),
            GapTracker::Incremental { right, down } => {
                let extend = |c: Candidate| c.map(|(s, at)| (s - config.gap_extend, at));
                let r = shorter_unless_worse(self.open_right((i, j), config), extend(right[(i + 1, j)]));
                let d = shorter_unless_worse(self.open_down((i, j), config), extend(down[(i, j + 1)]));
                right[(i, j)] = r;
                down[(i, j)] = d;
                (r, d)
            }
        };

        let gap = match (right, down) {
            (Some((r, k)), Some((d, l))) => Some(if r > d { (r, (k, j + 1)) } else { (d, (i + 1, l)) }),
            (Some((r, k)), None) => Some((r, (k, j + 1))),
            (None, Some((d, l))) => Some((d, (i + 1, l))),
            (None, None) => None,
        };
        let diagonal = (self.scores[(i + 1, j + 1)], (i + 1, j + 1));
        let (best, from) = match gap {
            Some(g) if g.0 > diagonal.0 => g,
            _ => diagonal,
        };

        self.scores[(i, j)] = best + scorer.score(seq1[i], seq2[j]);
        self.pointers[(i, j)] = Some(from);
    }

    /// Shortest `seq2` gap: land on `(i + 2, j + 1)`.
    fn open_right(&self, (i, j): Cell, config: &AlignConfig) -> Candidate {
        (i + 2 < self.n1).then(|| (self.scores[(i + 2, j + 1)] - config.gap_open, i + 2))
    }

    /// Shortest `seq1` gap: land on `(i + 1, j + 2)`.
    fn open_down(&self, (i, j): Cell, config: &AlignConfig) -> Candidate {
        (j + 2 < self.n2).then(|| (self.scores[(i + 1, j + 2)] - config.gap_open, j + 2))
    }

    fn scan_right(&self, (i, j): Cell, config: &AlignConfig) -> Candidate {
        let mut best: Candidate = None;
        for k in i + 2..self.n1 {
            let s = self.scores[(k, j + 1)] - config.gap_cost(k - i - 1);
            if best.map_or(true, |(b, _)| s > b) {
                best = Some((s, k));
            }
        }
        best
    }

    fn scan_down(&self, (i, j): Cell, config: &AlignConfig) -> Candidate {
        let mut best: Candidate = None;
        for l in j + 2..self.n2 {
            let s = self.scores[(i + 1, l)] - config.gap_cost(l - j - 1);
            if best.map_or(true, |(b, _)| s > b) {
                best = Some((s, l));
            }
        }
        best
    }

    /// Sequence lengths `(n1, n2)`.
    pub fn dims(&self) -> (usize, usize) {
        (self.n1, self.n2)
    }

    /// Side `D` of the allocated square grids.
    pub fn side(&self) -> usize {
        self.scores.dim
    }

    fn check(&self, i: usize, j: usize) {
        assert!(
            i < self.n1 && j < self.n2,
            "({i}, {j}) outside {} x {} alignment matrix",
            self.n1,
            self.n2
        );
    }

    /// Score at `(i, j)`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= n1` or `j >= n2`.
    pub fn score(&self, i: usize, j: usize) -> Score {
        self.check(i, j);
        self.scores[(i, j)]
    }

    /// Predecessor of `(i, j)`; `None` on the seeded boundary.
    ///
    /// # Panics
    ///
    /// Panics if `i >= n1` or `j >= n2`.
    pub fn predecessor(&self, i: usize, j: usize) -> Option<Cell> {
        self.check(i, j);
        self.pointers[(i, j)]
    }

    #[cfg(test)]
    pub(crate) fn set_predecessor(&mut self, (i, j): Cell, from: Option<Cell>) {
        self.pointers[(i, j)] = from;
    }
}

/// Diagnostic dump: scores, then predecessors. One line per `j`, one
/// column per `i`; unset predecessors print as `(-1,-1)`.
impl fmt::Display for AlignmentMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Matrix:\n-------")?;
        for j in 0..self.n2 {
            for i in 0..self.n1 {
                write!(f, "{:3} ", self.scores[(i, j)])?;
            }
            writeln!(f)?;
        }
        writeln!(f, "Path:\n-----")?;
        for j in 0..self.n2 {
            for i in 0..self.n1 {
                match self.pointers[(i, j)] {
                    Some((x, y)) => write!(f, "({x:3},{y:3}) ")?,
                    None => write!(f, "({:3},{:3}) ", -1, -1)?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CharScoreModel, Identity, SubstitutionMatrix};
    use protea_core::Diagnostics;

    fn identity_fill(seq1: &[u8], seq2: &[u8], config: &AlignConfig) -> AlignmentMatrix {
        let diagnostics = Diagnostics::new();
        let scorer = Scorer::new(&Identity, true, &diagnostics);
        AlignmentMatrix::fill(seq1, seq2, &scorer, config).unwrap()
    }

    #[test]
    fn two_by_two() {
        let m = identity_fill(b"AC", b"AC", &AlignConfig::default());
        assert_eq!(m.dims(), (2, 2));
        assert_eq!(m.score(1, 1), 1);
        assert_eq!(m.score(1, 0), 0);
        assert_eq!(m.score(0, 1), 0);
        assert_eq!(m.score(0, 0), 2);
        assert_eq!(m.predecessor(0, 0), Some((1, 1)));
        assert_eq!(m.predecessor(1, 0), None);
    }

    #[test]
    fn grids_are_square() {
        let m = identity_fill(b"ACGTA", b"AC", &AlignConfig::default());
        assert_eq!(m.side(), 5);
        assert_eq!(m.dims(), (5, 2));
    }

    #[test]
    fn gap_beats_diagonal_only_when_strictly_better() {
        let free = identity_fill(b"AXC", b"AC", &AlignConfig::uniform(0));
        assert_eq!(free.score(0, 0), 2);
        assert_eq!(free.predecessor(0, 0), Some((2, 1)));
        assert_eq!(free.predecessor(1, 0), Some((2, 1)));

        let costly = identity_fill(b"AXC", b"AC", &AlignConfig::uniform(1));
        assert_eq!(costly.score(0, 0), 1);
        assert_eq!(costly.predecessor(0, 0), Some((1, 1)));
    }

    #[test]
    fn right_beats_down_only_when_strictly_better() {
        // (2,1) and (1,2) both score 1, the diagonal (1,1) scores 0.
        let m = identity_fill(b"ABC", b"ACB", &AlignConfig::uniform(0));
        assert_eq!(m.score(0, 0), 2);
        assert_eq!(m.predecessor(0, 0), Some((1, 2)));

        let m = identity_fill(b"AXXC", b"AC", &AlignConfig::uniform(0));
        assert_eq!(m.predecessor(0, 0), Some((3, 1)));
        let m = identity_fill(b"AC", b"AYYC", &AlignConfig::uniform(0));
        assert_eq!(m.predecessor(0, 0), Some((1, 3)));
    }

    #[test]
    fn shortest_run_wins_ties() {
        // (2,1) and (3,1) both score 1 with free gaps.
        let m = identity_fill(b"AXCC", b"AC", &AlignConfig::uniform(0));
        assert_eq!(m.predecessor(0, 0), Some((2, 1)));
    }

    #[test]
    fn longer_runs_pay_extension() {
        let m = identity_fill(b"AXXC", b"AC", &AlignConfig::new(1, 1));
        // Skipping two symbols costs 1 + 1; the diagonal scores 0.
        assert_eq!(m.score(0, 0), 1);
        assert_eq!(m.predecessor(0, 0), Some((1, 1)));
        let m = identity_fill(b"AXXC", b"AC", &AlignConfig::new(0, 0));
        assert_eq!(m.score(0, 0), 2);
    }

    #[test]
    fn single_symbol_sequences_are_all_boundary() {
        let m = identity_fill(b"A", b"CAT", &AlignConfig::default());
        assert_eq!((m.score(0, 0), m.score(0, 1), m.score(0, 2)), (0, 1, 0));
        assert!((0..3).all(|j| m.predecessor(0, j).is_none()));
    }

    #[test]
    fn corner_is_scored_once() {
        let matrix = SubstitutionMatrix::from_rows(&[vec![1, 0], vec![0, 1]]).unwrap();
        let model = CharScoreModel::new("AC", matrix).unwrap();
        let diagnostics = Diagnostics::new();
        let scorer = Scorer::new(&model, false, &diagnostics);
        AlignmentMatrix::fill(b"X", b"X", &scorer, &AlignConfig::default()).unwrap();
        assert_eq!(diagnostics.unknown_events(), 1);
    }

    #[test]
    fn search_strategies_agree() {
        let seq1 = b"MKTAYIAKQRQISFVKSHFSRQ";
        let seq2 = b"MKTAYAKQRQISFVKSHFSRQLEERLG";
        let model = CharScoreModel::blosum62();
        let diagnostics = Diagnostics::new();
        let scorer = Scorer::new(&model, false, &diagnostics);
        for (open, extend) in [(10, 1), (5, 0), (0, 0), (11, 3)] {
            let base = AlignConfig::new(open, extend);
            let a = AlignmentMatrix::fill(seq1, seq2, &scorer, &base.with_gap_search(GapSearch::Exhaustive)).unwrap();
            let b = AlignmentMatrix::fill(seq1, seq2, &scorer, &base.with_gap_search(GapSearch::Incremental)).unwrap();
            assert_eq!(a.to_string(), b.to_string(), "open {open}, extend {extend}");
        }
    }

    #[test]
    fn empty_sequences_rejected() {
        let diagnostics = Diagnostics::new();
        let scorer = Scorer::new(&Identity, true, &diagnostics);
        assert!(AlignmentMatrix::fill(b"", b"A", &scorer, &AlignConfig::default()).is_err());
        assert!(AlignmentMatrix::fill(b"A", b"", &scorer, &AlignConfig::default()).is_err());
    }

    #[test]
    fn oversized_grid_is_an_allocation_error() {
        let err = Grid::try_new(usize::MAX, 0i32, "score matrix").unwrap_err();
        assert!(matches!(err, ProteaError::Allocation(_)));
        let err = Grid::try_new(1 << 31, 0i32, "score matrix").unwrap_err();
        assert!(matches!(err, ProteaError::Allocation(_)));
    }

    #[test]
    fn dump_layout() {
        let m = identity_fill(b"AC", b"AC", &AlignConfig::default());
        let expected = "Matrix:\n-------\n  2   0 \n  0   1 \n\
                        Path:\n-----\n(  1,  1) ( -1, -1) \n( -1, -1) ( -1, -1) \n";
        assert_eq!(m.to_string(), expected);
    }
}
