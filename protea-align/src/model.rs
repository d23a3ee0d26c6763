//! Score models for pairwise alignment.
//!
//! A score model answers one question: what does aligning symbol `a`
//! against symbol `b` score? Three models are provided:
//!
//! - [`CharScoreModel`]: a square [`SubstitutionMatrix`] indexed through a
//!   residue alphabet (BLOSUM, PAM, MDM files, ...)
//! - [`TokenScoreModel`]: the same matrix indexed directly by integer
//!   tokens, token `t` at row/column `t - 1`
//! - [`Identity`]: `+1` for an exact match, `0` otherwise
//!
//! Models never report errors for unknown symbols; they return
//! [`UnknownSymbols`] and the [`Scorer`] turns that into a zero score plus a
//! rate-limited diagnostic.

use core::marker::PhantomData;

use protea_core::{Diagnostics, ProteaError, Result};

use crate::symbol::{Symbol, Token};

/// Score type used by matrices and alignments.
pub type Score = i32;

/// Symbols a lookup could not place in the model's alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownSymbols<S> {
    /// The first symbol, if it was missing.
    pub first: Option<S>,
    /// The second symbol, if it was missing.
    pub second: Option<S>,
}

impl<S: Symbol> UnknownSymbols<S> {
    /// Printable labels of the missing symbols, first then second.
    pub fn labels(&self) -> Vec<String> {
        self.first
            .into_iter()
            .chain(self.second)
            .map(Symbol::label)
            .collect()
    }
}

/// A pairwise substitution score model over symbols of type `S`.
pub trait ScoreModel<S: Symbol> {
    /// Score `a` against `b`, or report which of them the model does not know.
    fn try_score(&self, a: S, b: S) -> core::result::Result<Score, UnknownSymbols<S>>;
}

impl<S: Symbol, M: ScoreModel<S> + ?Sized> ScoreModel<S> for &M {
    fn try_score(&self, a: S, b: S) -> core::result::Result<Score, UnknownSymbols<S>> {
        (**self).try_score(a, b)
    }
}

// ---------------------------------------------------------------------------
// Substitution matrix
// ---------------------------------------------------------------------------

/// A square `k x k` integer score table, stored row-major.
///
/// The table need not be symmetric. Every cell is populated; zero is a
/// legitimate "no data" score.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SubstitutionMatrix {
    dim: usize,
    scores: Vec<Score>,
}

impl SubstitutionMatrix {
    /// Create a matrix from `dim * dim` row-major scores.
    ///
    /// # Errors
    ///
    /// Returns an error if `dim` is zero or `scores` has the wrong length.
    pub fn new(dim: usize, scores: Vec<Score>) -> Result<Self> {
        if dim == 0 {
            return Err(ProteaError::InvalidInput(
                "substitution matrix must have at least one row".into(),
            ));
        }
        if scores.len() != dim * dim {
            return Err(ProteaError::InvalidInput(format!(
                "expected {} scores for a {dim}x{dim} matrix, got {}",
                dim * dim,
                scores.len()
            )));
        }
        Ok(Self { dim, scores })
    }

    /// Create a matrix from a list of rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the rows do not form a non-empty square.
    pub fn from_rows(rows: &[Vec<Score>]) -> Result<Self> {
        let dim = rows.len();
        if let Some((r, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != dim) {
            return Err(ProteaError::InvalidInput(format!(
                "row {r} has {} columns, expected {dim}",
                row.len()
            )));
        }
        Self::new(dim, rows.concat())
    }

    #[cfg(test)]
    pub(crate) fn zeros(dim: usize) -> Self {
        Self {
            dim,
            scores: vec![0; dim * dim],
        }
    }

    /// Side length `k`.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Score at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if either index is `>= dim()`.
    pub fn get(&self, row: usize, col: usize) -> Score {
        assert!(row < self.dim && col < self.dim, "({row}, {col}) outside {0}x{0} matrix", self.dim);
        self.scores[row * self.dim + col]
    }

    #[cfg(test)]
    pub(crate) fn set(&mut self, row: usize, col: usize, score: Score) {
        self.scores[row * self.dim + col] = score;
    }

    /// Row `row` as a slice.
    pub fn row(&self, row: usize) -> &[Score] {
        &self.scores[row * self.dim..(row + 1) * self.dim]
    }

    /// Smallest score in the table.
    pub fn min_score(&self) -> Score {
        self.scores.iter().copied().min().unwrap_or(0)
    }

    /// Largest score in the table.
    pub fn max_score(&self) -> Score {
        self.scores.iter().copied().max().unwrap_or(0)
    }

    /// Whether `get(r, c) == get(c, r)` for every cell.
    pub fn is_symmetric(&self) -> bool {
        (0..self.dim).all(|r| (r + 1..self.dim).all(|c| self.get(r, c) == self.get(c, r)))
    }

    /// Shift every score down by the table minimum so the minimum becomes 0.
    ///
    /// Returns the largest score of the shifted table.
    pub fn zero_floor(&mut self) -> Score {
        let min = self.min_score();
        let max = self.max_score();
        for s in &mut self.scores {
            *s -= min;
        }
        max - min
    }
}

// ---------------------------------------------------------------------------
// Character alphabet model
// ---------------------------------------------------------------------------

/// A substitution matrix indexed by single-byte residue codes.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CharScoreModel {
    alphabet: Vec<u8>,
    matrix: SubstitutionMatrix,
    ignore_case: bool,
    name: Option<String>,
}

impl CharScoreModel {
    /// Pair a matrix with the alphabet that indexes its rows and columns.
    ///
    /// # Errors
    ///
    /// Returns an error if the alphabet length differs from the matrix size.
    pub fn new(alphabet: impl Into<Vec<u8>>, matrix: SubstitutionMatrix) -> Result<Self> {
        let alphabet = alphabet.into();
        if alphabet.len() != matrix.dim() {
            return Err(ProteaError::InvalidInput(format!(
                "alphabet has {} symbols but matrix is {}x{}",
                alphabet.len(),
                matrix.dim(),
                matrix.dim()
            )));
        }
        Ok(Self {
            alphabet,
            matrix,
            ignore_case: false,
            name: None,
        })
    }

    /// Upper-case both residues before looking them up.
    pub fn ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    /// Attach a display name (e.g. the file it was read from).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// BLOSUM62 over `ARNDCQEGHILKMFPSTWYVBZX*`, case-insensitive.
    pub fn blosum62() -> Self {
        Self {
            alphabet: AA_ALPHABET.to_vec(),
            matrix: SubstitutionMatrix {
                dim: AA_DIM,
                scores: BLOSUM62.to_vec(),
            },
            ignore_case: true,
            name: Some("BLOSUM62".into()),
        }
    }

    /// Residue codes in row/column order.
    pub fn alphabet(&self) -> &[u8] {
        &self.alphabet
    }

    /// The underlying score table.
    pub fn matrix(&self) -> &SubstitutionMatrix {
        &self.matrix
    }

    /// Display name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Whether lookups fold case.
    pub fn is_case_insensitive(&self) -> bool {
        self.ignore_case
    }

    /// Row/column index of `residue`. The alphabet is small; a scan is fine.
    pub fn index_of(&self, residue: u8) -> Option<usize> {
        let residue = if self.ignore_case {
            residue.to_ascii_uppercase()
        } else {
            residue
        };
        self.alphabet.iter().position(|&r| r == residue)
    }

    /// See [`SubstitutionMatrix::zero_floor`].
    pub fn zero_floor(&mut self) -> Score {
        self.matrix.zero_floor()
    }
}

impl ScoreModel<u8> for CharScoreModel {
    fn try_score(&self, a: u8, b: u8) -> core::result::Result<Score, UnknownSymbols<u8>> {
        match (self.index_of(a), self.index_of(b)) {
            (Some(i), Some(j)) => Ok(self.matrix.get(i, j)),
            (i, j) => Err(UnknownSymbols {
                first: i.is_none().then_some(a),
                second: j.is_none().then_some(b),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Integer token model
// ---------------------------------------------------------------------------

/// A substitution matrix indexed directly by tokens `1..=k`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TokenScoreModel {
    matrix: SubstitutionMatrix,
}

impl TokenScoreModel {
    /// Wrap a matrix; token `t` scores from row/column `t - 1`.
    pub fn new(matrix: SubstitutionMatrix) -> Self {
        Self { matrix }
    }

    /// The underlying score table.
    pub fn matrix(&self) -> &SubstitutionMatrix {
        &self.matrix
    }

    /// Row/column index of `token`, or `None` outside `1..=k`.
    pub fn index_of(&self, token: Token) -> Option<usize> {
        let index = (token as usize).checked_sub(1)?;
        (index < self.matrix.dim()).then_some(index)
    }

    /// See [`SubstitutionMatrix::zero_floor`].
    pub fn zero_floor(&mut self) -> Score {
        self.matrix.zero_floor()
    }
}

impl ScoreModel<Token> for TokenScoreModel {
    fn try_score(&self, a: Token, b: Token) -> core::result::Result<Score, UnknownSymbols<Token>> {
        match (self.index_of(a), self.index_of(b)) {
            (Some(i), Some(j)) => Ok(self.matrix.get(i, j)),
            (i, j) => Err(UnknownSymbols {
                first: i.is_none().then_some(a),
                second: j.is_none().then_some(b),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// `+1` for identical symbols, `0` otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Identity;

impl Identity {
    /// Score awarded to an exact match.
    pub const MATCH: Score = 1;
}

impl<S: Symbol> ScoreModel<S> for Identity {
    fn try_score(&self, a: S, b: S) -> core::result::Result<Score, UnknownSymbols<S>> {
        Ok(if a == b { Self::MATCH } else { 0 })
    }
}

// ---------------------------------------------------------------------------
// Scorer
// ---------------------------------------------------------------------------

/// Best-effort scoring: a model (or identity) plus the diagnostics channel
/// that hears about unknown symbols.
pub struct Scorer<'a, S, M: ?Sized> {
    model: &'a M,
    use_identity: bool,
    diagnostics: &'a Diagnostics,
    _symbol: PhantomData<fn(S)>,
}

impl<'a, S: Symbol, M: ScoreModel<S> + ?Sized> Scorer<'a, S, M> {
    /// Score with `model`, or with [`Identity`] when `use_identity` is set.
    pub fn new(model: &'a M, use_identity: bool, diagnostics: &'a Diagnostics) -> Self {
        Self {
            model,
            use_identity,
            diagnostics,
            _symbol: PhantomData,
        }
    }

    /// Score `a` against `b`. Unknown symbols score 0 and are reported.
    pub fn score(&self, a: S, b: S) -> Score {
        if self.use_identity {
            return if a == b { Identity::MATCH } else { 0 };
        }
        match self.model.try_score(a, b) {
            Ok(score) => score,
            Err(unknown) => {
                self.diagnostics.unknown_symbols(unknown.labels());
                0
            }
        }
    }
}

// ===========================================================================
// NCBI BLOSUM62
// ===========================================================================

const AA_ALPHABET: &[u8; AA_DIM] = b"ARNDCQEGHILKMFPSTWYVBZX*";

/// Matrix dimension: 20 amino acids plus B, Z, X and *.
const AA_DIM: usize = 24;

/// BLOSUM62, 24x24 flattened, NCBI reference.
#[rustfmt::skip]
const BLOSUM62: [Score; AA_DIM * AA_DIM] = [
//   A   R   N   D   C   Q   E   G   H   I   L   K   M   F   P   S   T   W   Y   V   B   Z   X   *
     4, -1, -2, -2,  0, -1, -1,  0, -2, -1, -1, -1, -1, -2, -1,  1,  0, -3, -2,  0, -2, -1,  0, -4, // A
    -1,  5,  0, -2, -3,  1,  0, -2,  0, -3, -2,  2, -1, -3, -2, -1, -1, -3, -2, -3, -1,  0, -1, -4, // R
    -2,  0,  6,  1, -3,  0,  0,  0,  1, -3, -3,  0, -2, -3, -2,  1,  0, -4, -2, -3,  3,  0, -1, -4, // N
    -2, -2,  1,  6, -3,  0,  2, -1, -1, -3, -4, -1, -3, -3, -1,  0, -1, -4, -3, -3,  4,  1, -1, -4, // D
     0, -3, -3, -3,  9, -3, -4, -3, -3, -1, -1, -3, -1, -2, -3, -1, -1, -2, -2, -1, -3, -3, -2, -4, // C
    -1,  1,  0,  0, -3,  5,  2, -2,  0, -3, -2,  1,  0, -3, -1,  0, -1, -2, -1, -2,  0,  3, -1, -4, // Q
    -1,  0,  0,  2, -4,  2,  5, -2,  0, -3, -3,  1, -2, -3, -1,  0, -1, -3, -2, -2,  1,  4, -1, -4, // E
     0, -2,  0, -1, -3, -2, -2,  6, -2, -4, -4, -2, -3, -3, -2,  0, -2, -2, -3, -3, -1, -2, -1, -4, // G
    -2,  0,  1, -1, -3,  0,  0, -2,  8, -3, -3, -1, -2, -1, -2, -1, -2, -2,  2, -3,  0,  0, -1, -4, // H
    -1, -3, -3, -3, -1, -3, -3, -4, -3,  4,  2, -3,  1,  0, -3, -2, -1, -3, -1,  3, -3, -3, -1, -4, // I
    -1, -2, -3, -4, -1, -2, -3, -4, -3,  2,  4, -2,  2,  0, -3, -2, -1, -2, -1,  1, -4, -3, -1, -4, // L
    -1,  2,  0, -1, -3,  1,  1, -2, -1, -3, -2,  5, -1, -3, -1,  0, -1, -3, -2, -2,  0,  1, -1, -4, // K
    -1, -1, -2, -3, -1,  0, -2, -3, -2,  1,  2, -1,  5,  0, -2, -1, -1, -1, -1,  1, -3, -1, -1, -4, // M
    -2, -3, -3, -3, -2, -3, -3, -3, -1,  0,  0, -3,  0,  6, -4, -2, -2,  1,  3, -1, -3, -3, -1, -4, // F
    -1, -2, -2, -1, -3, -1, -1, -2, -2, -3, -3, -1, -2, -4,  7, -1, -1, -4, -3, -2, -2, -1, -2, -4, // P
     1, -1,  1,  0, -1,  0,  0,  0, -1, -2, -2,  0, -1, -2, -1,  4,  1, -3, -2, -2,  0,  0,  0, -4, // S
     0, -1,  0, -1, -1, -1, -1, -2, -2, -1, -1, -1, -1, -2, -1,  1,  5, -2, -2,  0, -1, -1,  0, -4, // T
    -3, -3, -4, -4, -2, -2, -3, -2, -2, -3, -2, -3, -1,  1, -4, -3, -2, 11,  2, -3, -4, -3, -2, -4, // W
    -2, -2, -2, -3, -2, -1, -2, -3,  2, -1, -1, -2, -1,  3, -3, -2, -2,  2,  7, -1, -3, -2, -1, -4, // Y
     0, -3, -3, -3, -1, -2, -2, -3, -3,  3,  1, -2,  1, -1, -2, -2,  0, -3, -1,  4, -3, -2, -1, -4, // V
    -2, -1,  3,  4, -3,  0,  1, -1,  0, -3, -4,  0, -3, -3, -2,  0, -1, -4, -3, -3,  4,  1, -1, -4, // B
    -1,  0,  0,  1, -3,  3,  4, -2,  0, -3, -3,  1, -1, -3, -1,  0, -1, -3, -2, -2,  1,  4, -1, -4, // Z
     0, -1, -1, -1, -2, -1, -1, -1, -1, -1, -1, -1, -1, -1, -2,  0,  0, -2, -1, -1, -1, -1, -1, -4, // X
    -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4,  1, // *
];
