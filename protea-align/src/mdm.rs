//! Mutation data matrix (MDM) readers.
//!
//! Two text layouts are understood.
//!
//! **Character matrices** ([`parse_mdm`]). Lines whose first non-blank
//! character is `!` or `#` are comments. The first non-comment line
//! holding any numeric field fixes the dimension `k` as its number of
//! numeric fields. A line with no numeric fields at all names the residues
//! (first character of each word); it may appear before or after the
//! matrix. Every other line is one row of scores. Non-numeric fields on a
//! row, such as the row labels of BLAST-style files, are skipped:
//!
//! ```text
//! # BLOSUM-like
//!    A  R  N
//! A  4 -1 -2
//! R -1  5  0
//! N -2  0  6
//! ```
//!
//! **Token matrices** ([`parse_token_mdm`]). Same comments, no residue
//! line; the first data line fixes `k` and token `t` scores from row and
//! column `t - 1`.
//!
//! [`MatrixLocator`] finds matrix files on disk, falling back to the
//! directory named by the `DATADIR` environment variable.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use protea_core::{ProteaError, Result};

use crate::model::{CharScoreModel, Score, SubstitutionMatrix, TokenScoreModel};

/// Environment variable naming the shared matrix directory.
pub const DATA_DIR_ENV: &str = "DATADIR";

fn is_comment(line: &str) -> bool {
    line.starts_with('!') || line.starts_with('#')
}

/// A digit, or `-` followed by a digit.
fn is_numeric(word: &str) -> bool {
    match word.as_bytes() {
        [d, ..] if d.is_ascii_digit() => true,
        [b'-', d, ..] => d.is_ascii_digit(),
        _ => false,
    }
}

fn parse_score(word: &str, line_no: usize) -> Result<Score> {
    word.parse().map_err(|_| {
        ProteaError::Parse(format!("line {line_no}: '{word}' is not an integer score"))
    })
}

/// Data lines with their 1-based line numbers, comments and blanks removed.
fn data_lines(input: &str) -> impl Iterator<Item = (usize, &str)> {
    input
        .lines()
        .enumerate()
        .map(|(n, line)| (n + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !is_comment(line))
}

/// Pad short matrices with zero rows, as an incomplete file leaves them.
fn finish_rows(mut rows: Vec<Vec<Score>>, dim: usize) -> Vec<Vec<Score>> {
    if rows.len() < dim {
        log::warn!(
            "matrix has {} of {dim} rows; missing rows score 0",
            rows.len()
        );
        rows.resize(dim, vec![0; dim]);
    }
    rows
}

/// Parse a character-alphabet MDM.
///
/// # Errors
///
/// Returns [`ProteaError::Parse`] if the input has no numeric rows, more
/// rows than columns, a row shorter than the first, or no residue line
/// covering every column.
///
/// # Examples
///
/// ```
/// use protea_align::mdm::parse_mdm;
/// use protea_align::ScoreModel;
///
/// let model = parse_mdm("! tiny\n A C\n 2 -1\n-1  2\n").unwrap();
/// assert_eq!(model.try_score(b'A', b'C'), Ok(-1));
/// ```
pub fn parse_mdm(input: &str) -> Result<CharScoreModel> {
    let mut dim: Option<usize> = None;
    let mut symbols: Option<Vec<u8>> = None;
    let mut rows: Vec<Vec<Score>> = Vec::new();

    for (line_no, line) in data_lines(input) {
        let words: Vec<&str> = line.split_whitespace().collect();
        let numeric: Vec<&str> = words.iter().copied().filter(|w| is_numeric(w)).collect();

        if numeric.is_empty() {
            if symbols.is_some() {
                return Err(ProteaError::Parse(format!(
                    "line {line_no}: second residue line '{line}'"
                )));
            }
            symbols = Some(words.iter().map(|w| w.as_bytes()[0]).collect());
            continue;
        }

        let k = *dim.get_or_insert(numeric.len());
        if rows.len() == k {
            return Err(ProteaError::Parse(format!(
                "line {line_no}: more than {k} matrix rows"
            )));
        }
        if numeric.len() < k {
            return Err(ProteaError::Parse(format!(
                "line {line_no}: row has {} scores, expected {k}",
                numeric.len()
            )));
        }
        let row = numeric
            .iter()
            .take(k)
            .map(|w| parse_score(w, line_no))
            .collect::<Result<Vec<_>>>()?;
        rows.push(row);
    }

    let dim = dim.ok_or_else(|| ProteaError::Parse("no matrix rows found".into()))?;
    let mut symbols =
        symbols.ok_or_else(|| ProteaError::Parse("no residue line found".into()))?;
    if symbols.len() < dim {
        return Err(ProteaError::Parse(format!(
            "residue line names {} residues, matrix has {dim} columns",
            symbols.len()
        )));
    }
    symbols.truncate(dim);

    let matrix = SubstitutionMatrix::from_rows(&finish_rows(rows, dim))?;
    CharScoreModel::new(symbols, matrix)
}

/// Parse an integer-token MDM.
///
/// # Errors
///
/// Returns [`ProteaError::Parse`] on non-integer fields, ragged rows, more
/// rows than columns, or an input with no data.
pub fn parse_token_mdm(input: &str) -> Result<TokenScoreModel> {
    let mut dim: Option<usize> = None;
    let mut rows: Vec<Vec<Score>> = Vec::new();

    for (line_no, line) in data_lines(input) {
        let row = line
            .split_whitespace()
            .map(|w| parse_score(w, line_no))
            .collect::<Result<Vec<_>>>()?;
        let k = *dim.get_or_insert(row.len());
        if rows.len() == k {
            return Err(ProteaError::Parse(format!(
                "line {line_no}: more than {k} matrix rows"
            )));
        }
        if row.len() != k {
            return Err(ProteaError::Parse(format!(
                "line {line_no}: row has {} scores, expected {k}",
                row.len()
            )));
        }
        rows.push(row);
    }

    let dim = dim.ok_or_else(|| ProteaError::Parse("no matrix rows found".into()))?;
    let matrix = SubstitutionMatrix::from_rows(&finish_rows(rows, dim))?;
    Ok(TokenScoreModel::new(matrix))
}

// ---------------------------------------------------------------------------
// File lookup
// ---------------------------------------------------------------------------

/// Resolves matrix file names against the working directory and an
/// optional shared data directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatrixLocator {
    data_dir: Option<PathBuf>,
}

impl MatrixLocator {
    /// A locator with no fallback directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// A locator falling back to the directory in `$DATADIR`, if set.
    pub fn from_env() -> Self {
        Self::with_env_var(DATA_DIR_ENV)
    }

    /// A locator falling back to the directory in `$var`, if set.
    pub fn with_env_var(var: &str) -> Self {
        Self {
            data_dir: env::var_os(var).map(PathBuf::from),
        }
    }

    /// Use `dir` as the fallback directory.
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// The fallback directory, if any.
    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    /// Find `name` as given, else inside the data directory.
    ///
    /// # Errors
    ///
    /// Returns [`ProteaError::Io`] with kind `NotFound` if neither exists.
    pub fn resolve(&self, name: impl AsRef<Path>) -> Result<PathBuf> {
        let name = name.as_ref();
        if name.is_file() {
            return Ok(name.to_path_buf());
        }
        if let Some(dir) = &self.data_dir {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Ok(candidate);
            }
        }
        let searched = match &self.data_dir {
            Some(dir) => format!("{} (also searched {})", name.display(), dir.display()),
            None => name.display().to_string(),
        };
        Err(ProteaError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("matrix file not found: {searched}"),
        )))
    }

    /// Locate and parse a character-alphabet matrix.
    pub fn read_char_model(&self, name: impl AsRef<Path>) -> Result<CharScoreModel> {
        let path = self.resolve(name)?;
        let text = fs::read_to_string(&path)?;
        log::debug!("reading character matrix from {}", path.display());
        let model = parse_mdm(&text)?;
        Ok(match path.file_name() {
            Some(file) => model.with_name(file.to_string_lossy()),
            None => model,
        })
    }

    /// Locate and parse a token matrix.
    pub fn read_token_model(&self, name: impl AsRef<Path>) -> Result<TokenScoreModel> {
        let path = self.resolve(name)?;
        let text = fs::read_to_string(&path)?;
        log::debug!("reading token matrix from {}", path.display());
        parse_token_mdm(&text)
    }
}
