//! The alignment engine.
//!
//! [`Aligner`] owns the parameters and the diagnostics channel; the score
//! model is passed to every call. One call fills an [`AlignmentMatrix`],
//! finds the anchor, traces the path and drops the matrix again.
//!
//! # Example
//!
//! ```
//! use protea_align::{AlignConfig, Aligner, Identity};
//!
//! let aligner = Aligner::new(AlignConfig::uniform(1).with_identity(true)).unwrap();
//! let aln = aligner.align(b"ACTCLMCT", b"ACTCCT", &Identity).unwrap();
//! assert_eq!(aln.score, 5);
//! assert_eq!(aln.as_strings(), ("ACTCLMCT".to_string(), "ACTC--CT".to_string()));
//! ```

use protea_core::{Diagnostics, ProteaError, Result};

use crate::alignment::{self, Alignment};
use crate::config::AlignConfig;
use crate::matrix::AlignmentMatrix;
use crate::model::{Score, ScoreModel, Scorer};
use crate::symbol::Symbol;
use crate::traceback::{find_anchor, traceback};

/// Reject empty inputs and inputs containing the gap symbol.
fn check_sequences<S: Symbol>(seq1: &[S], seq2: &[S]) -> Result<()> {
    if seq1.is_empty() || seq2.is_empty() {
        return Err(ProteaError::InvalidInput(
            "sequences must not be empty".into(),
        ));
    }
    for (name, seq) in [("seq1", seq1), ("seq2", seq2)] {
        if let Some(pos) = seq.iter().position(|s| s.is_gap()) {
            return Err(ProteaError::InvalidInput(format!(
                "{name} position {pos} holds the gap symbol {}",
                S::GAP.label()
            )));
        }
    }
    Ok(())
}

/// Alignment context: parameters plus the diagnostics channel that hears
/// about unknown symbols and traceback faults.
#[derive(Debug, Default)]
pub struct Aligner {
    config: AlignConfig,
    diagnostics: Diagnostics,
}

impl Aligner {
    /// # Errors
    ///
    /// Returns an error if either gap penalty is negative.
    pub fn new(config: AlignConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            diagnostics: Diagnostics::new(),
        })
    }

    /// Replace the diagnostics channel.
    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn config(&self) -> &AlignConfig {
        &self.config
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    fn scorer<'a, S, M>(&'a self, model: &'a M) -> Scorer<'a, S, M>
    where
        S: Symbol,
        M: ScoreModel<S> + ?Sized,
    {
        Scorer::new(model, self.config.use_identity, &self.diagnostics)
    }

    /// Fill the matrices without tracing them, for inspection.
    pub fn fill<S, M>(&self, seq1: &[S], seq2: &[S], model: &M) -> Result<AlignmentMatrix>
    where
        S: Symbol,
        M: ScoreModel<S> + ?Sized,
    {
        check_sequences(seq1, seq2)?;
        AlignmentMatrix::fill(seq1, seq2, &self.scorer(model), &self.config)
    }

    /// Align `seq1` against `seq2`.
    ///
    /// # Errors
    ///
    /// - [`ProteaError::InvalidInput`] for an empty sequence or one holding
    ///   the gap symbol
    /// - [`ProteaError::Allocation`] if the matrices do not fit in memory
    /// - [`ProteaError::Traceback`] on a broken predecessor pointer
    pub fn align<S, M>(&self, seq1: &[S], seq2: &[S], model: &M) -> Result<Alignment<S>>
    where
        S: Symbol,
        M: ScoreModel<S> + ?Sized,
    {
        let matrix = self.fill(seq1, seq2, model)?;
        let anchor = find_anchor(&matrix);

        let capacity = seq1.len() + seq2.len();
        let mut aligned1 = Vec::with_capacity(capacity);
        let mut aligned2 = Vec::with_capacity(capacity);
        traceback(
            &matrix,
            seq1,
            seq2,
            anchor,
            &self.diagnostics,
            &mut aligned1,
            &mut aligned2,
        )?;
        let score = matrix.score(anchor.i, anchor.j);

        if self.config.verbose {
            log::info!("alignment matrices for {} x {}:\n{matrix}", seq1.len(), seq2.len());
        }
        log::debug!(
            "aligned {} x {}: score {score}, {} columns, anchor ({}, {})",
            seq1.len(),
            seq2.len(),
            aligned1.len(),
            anchor.i,
            anchor.j
        );

        Ok(Alignment {
            aligned1,
            aligned2,
            score,
            anchor,
        })
    }

    /// Align into caller-provided rows, each at least
    /// `seq1.len() + seq2.len()` long. Returns the number of columns
    /// written and the score; positions past the alignment are untouched.
    ///
    /// # Errors
    ///
    /// As [`Aligner::align`], plus [`ProteaError::InvalidInput`] if either
    /// buffer is too short.
    pub fn align_into<S, M>(
        &self,
        seq1: &[S],
        seq2: &[S],
        model: &M,
        out1: &mut [S],
        out2: &mut [S],
    ) -> Result<(usize, Score)>
    where
        S: Symbol,
        M: ScoreModel<S> + ?Sized,
    {
        let needed = seq1.len() + seq2.len();
        if out1.len() < needed || out2.len() < needed {
            return Err(ProteaError::InvalidInput(format!(
                "output buffers hold {} and {} symbols, need {needed}",
                out1.len(),
                out2.len()
            )));
        }
        let aln = self.align(seq1, seq2, model)?;
        let len = aln.len();
        out1[..len].copy_from_slice(&aln.aligned1);
        out2[..len].copy_from_slice(&aln.aligned2);
        Ok((len, aln.score))
    }

    /// Re-score an alignment under this aligner's parameters.
    pub fn rescore<S, M>(&self, aligned1: &[S], aligned2: &[S], model: &M) -> Result<Score>
    where
        S: Symbol,
        M: ScoreModel<S> + ?Sized,
    {
        alignment::rescore(aligned1, aligned2, &self.scorer(model), &self.config)
    }
}

/// Align with a one-off [`Aligner`] using `config`.
pub fn align<S, M>(seq1: &[S], seq2: &[S], model: &M, config: &AlignConfig) -> Result<Alignment<S>>
where
    S: Symbol,
    M: ScoreModel<S> + ?Sized,
{
    Aligner::new(*config)?.align(seq1, seq2, model)
}

/// Align with a single length-independent gap `penalty`.
pub fn align_simple<S, M>(seq1: &[S], seq2: &[S], model: &M, penalty: Score) -> Result<Alignment<S>>
where
    S: Symbol,
    M: ScoreModel<S> + ?Sized,
{
    align(seq1, seq2, model, &AlignConfig::uniform(penalty))
}
