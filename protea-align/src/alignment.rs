//! Alignment results and re-scoring.

use protea_core::{ProteaError, Result, Scored, Summarizable};

use crate::config::AlignConfig;
use crate::model::{Score, ScoreModel, Scorer};
use crate::symbol::Symbol;
use crate::traceback::Anchor;

/// Which aligned row a gap run sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    /// Gaps in `aligned1`, opposite symbols of `seq2`.
    First,
    /// Gaps in `aligned2`, opposite symbols of `seq1`.
    Second,
}

/// A maximal run of consecutive gap columns in one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GapRun {
    /// Row holding the gaps.
    pub side: Side,
    /// First gap column.
    pub start: usize,
    /// Number of gap columns.
    pub len: usize,
}

impl GapRun {
    /// Whether the run touches either end of an alignment of `columns`
    /// columns. End runs are free.
    pub fn is_terminal(&self, columns: usize) -> bool {
        self.start == 0 || self.start + self.len == columns
    }
}

/// Gap runs of both rows, ordered by side then start column.
pub fn gap_runs<S: Symbol>(aligned1: &[S], aligned2: &[S]) -> Vec<GapRun> {
    let mut runs = Vec::new();
    for (side, row) in [(Side::First, aligned1), (Side::Second, aligned2)] {
        let mut open: Option<usize> = None;
        for (col, sym) in row.iter().enumerate() {
            match (sym.is_gap(), open) {
                (true, None) => open = Some(col),
                (false, Some(start)) => {
                    runs.push(GapRun { side, start, len: col - start });
                    open = None;
                }
                _ => {}
            }
        }
        if let Some(start) = open {
            runs.push(GapRun { side, start, len: row.len() - start });
        }
    }
    runs
}

/// Score an alignment column by column.
///
/// Pair columns add their substitution score. Each interior gap run of
/// length `L` costs `gap_open + (L - 1) * gap_extend`; runs touching either
/// end are free.
///
/// # Errors
///
/// Returns [`ProteaError::InvalidInput`] if the rows differ in length or a
/// column holds two gaps.
pub fn rescore<S, M>(
    aligned1: &[S],
    aligned2: &[S],
    scorer: &Scorer<'_, S, M>,
    config: &AlignConfig,
) -> Result<Score>
where
    S: Symbol,
    M: ScoreModel<S> + ?Sized,
{
    if aligned1.len() != aligned2.len() {
        return Err(ProteaError::InvalidInput(format!(
            "aligned rows differ in length: {} vs {}",
            aligned1.len(),
            aligned2.len()
        )));
    }
    let mut score = 0;
    for (col, (&a, &b)) in aligned1.iter().zip(aligned2).enumerate() {
        match (a.is_gap(), b.is_gap()) {
            (true, true) => {
                return Err(ProteaError::InvalidInput(format!(
                    "column {col} is a gap in both rows"
                )))
            }
            (false, false) => score += scorer.score(a, b),
            _ => {}
        }
    }
    let columns = aligned1.len();
    for run in gap_runs(aligned1, aligned2) {
        if !run.is_terminal(columns) {
            score -= config.gap_cost(run.len);
        }
    }
    Ok(score)
}

// ---------------------------------------------------------------------------
// Alignment
// ---------------------------------------------------------------------------

/// A pairwise alignment: two equal-length rows with gaps interleaved.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Alignment<S> {
    /// `seq1` with gaps.
    pub aligned1: Vec<S>,
    /// `seq2` with gaps.
    pub aligned2: Vec<S>,
    /// Score of the anchor cell, equal to the re-scored path.
    pub score: Score,
    /// Where the traceback started.
    pub anchor: Anchor,
}

impl<S: Symbol> Alignment<S> {
    /// Number of columns.
    pub fn len(&self) -> usize {
        self.aligned1.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aligned1.is_empty()
    }

    /// Columns pairing two identical symbols.
    pub fn matches(&self) -> usize {
        self.aligned1
            .iter()
            .zip(&self.aligned2)
            .filter(|(a, b)| !a.is_gap() && a == b)
            .count()
    }

    /// Gap symbols in both rows.
    pub fn gaps(&self) -> usize {
        self.aligned1
            .iter()
            .chain(&self.aligned2)
            .filter(|s| s.is_gap())
            .count()
    }

    pub fn gap_runs(&self) -> Vec<GapRun> {
        gap_runs(&self.aligned1, &self.aligned2)
    }

    /// Fraction of columns that are exact matches, in `[0.0, 1.0]`.
    ///
    /// Returns 0.0 if the alignment is empty.
    pub fn identity(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.matches() as f64 / self.len() as f64
    }

    /// `aligned1` with gaps removed.
    pub fn ungapped1(&self) -> Vec<S> {
        self.aligned1.iter().copied().filter(|s| !s.is_gap()).collect()
    }

    /// `aligned2` with gaps removed.
    pub fn ungapped2(&self) -> Vec<S> {
        self.aligned2.iter().copied().filter(|s| !s.is_gap()).collect()
    }
}

impl Alignment<u8> {
    /// Both rows as text.
    pub fn as_strings(&self) -> (String, String) {
        (
            String::from_utf8_lossy(&self.aligned1).into_owned(),
            String::from_utf8_lossy(&self.aligned2).into_owned(),
        )
    }
}

impl<S> Scored for Alignment<S> {
    fn score(&self) -> i32 {
        self.score
    }
}

impl<S: Symbol> Summarizable for Alignment<S> {
    fn summary(&self) -> String {
        format!(
            "score {}, {} columns, {} matches, {} gap runs, {:.1}% identity",
            self.score,
            self.len(),
            self.matches(),
            self.gap_runs().len(),
            self.identity() * 100.0
        )
    }
}
