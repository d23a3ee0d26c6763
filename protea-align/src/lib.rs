//! Pairwise global alignment with affine gap penalties.
//!
//! Aligns two sequences of single-byte residues or integer tokens by
//! dynamic programming over a square score matrix, with full predecessor
//! traceback. The start of the alignment is chosen by an anchor search
//! over the matrix edge, so unmatched prefixes and suffixes cost nothing;
//! interior gap runs of length `L` cost `gap_open + (L - 1) * gap_extend`.
//!
//! Scoring comes from a [`ScoreModel`]: a residue-indexed
//! [`CharScoreModel`] (BLOSUM62 built in, others read from MDM files with
//! [`mdm::MatrixLocator`]), a [`TokenScoreModel`], or [`Identity`].
//!
//! # Quick start
//!
//! ```
//! use protea_align::{align, AlignConfig, CharScoreModel};
//!
//! let model = CharScoreModel::blosum62();
//! let aln = align(b"HEAGAWGHEE", b"HEAGAWGHEE", &model, &AlignConfig::default()).unwrap();
//! assert_eq!(aln.aligned1, aln.aligned2);
//! assert_eq!(aln.gaps(), 0);
//! ```

pub mod alignment;
pub mod config;
pub mod engine;
pub mod matrix;
pub mod mdm;
pub mod model;
pub mod symbol;
pub mod traceback;

pub use alignment::{gap_runs, rescore, Alignment, GapRun, Side};
pub use config::{AlignConfig, GapSearch};
pub use engine::{align, align_simple, Aligner};
pub use matrix::{AlignmentMatrix, Cell};
pub use mdm::{parse_mdm, parse_token_mdm, MatrixLocator};
pub use model::{
    CharScoreModel, Identity, Score, ScoreModel, Scorer, SubstitutionMatrix, TokenScoreModel,
    UnknownSymbols,
};
pub use symbol::{Symbol, Token};
pub use traceback::{find_anchor, traceback, Anchor};
