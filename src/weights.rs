//! Evaluation weights and their on-disk format.
//!
//! A weights file is a single line of space-separated decimals, one per
//! feature, in feature order. Saving writes a sibling temporary file and
//! renames it over the target so a crash never leaves a half-written file.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::error::{Result, SliderError};

#[derive(Clone, Debug, PartialEq)]
pub struct Weights(Vec<f64>);

impl Weights {
    /// Wrap a weight vector. Non-finite entries are rejected.
    pub fn new(values: Vec<f64>) -> Result<Self> {
        if let Some(bad) = values.iter().find(|w| !w.is_finite()) {
            return Err(SliderError::WeightValue(bad.to_string()));
        }
        Ok(Self(values))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Weighted sum `w . f` over the common prefix of both vectors.
    pub fn dot(&self, features: &[f64]) -> f64 {
        self.0.iter().zip(features).map(|(w, f)| w * f).sum()
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| SliderError::WeightsIo {
            path: path.to_path_buf(),
            source,
        })?;
        text.parse()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let io_err = |source| SliderError::WeightsIo {
            path: path.to_path_buf(),
            source,
        };
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("weights");
        let tmp = path.with_extension(format!("{ext}.tmp.{}", std::process::id()));
        fs::write(&tmp, format!("{self}\n"))
            .and_then(|()| fs::rename(&tmp, path))
            .map_err(|source| {
                let _ = fs::remove_file(&tmp);
                io_err(source)
            })
    }
}

impl FromStr for Weights {
    type Err = SliderError;

    fn from_str(s: &str) -> Result<Self> {
        let values = s
            .split_whitespace()
            .map(|tok| {
                tok.parse::<f64>()
                    .map_err(|_| SliderError::WeightValue(tok.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(values)
    }
}

impl fmt::Display for Weights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, w) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{w}")?;
        }
        Ok(())
    }
}
