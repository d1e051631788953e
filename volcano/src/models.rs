use std::fmt;

use polars::prelude::{DataFrame, PolarsError, PolarsResult};
use thiserror::Error;

pub const GENE_ID_COL: &str = "GENEID";
pub const FOLD_CHANGE_COL: &str = "log2FoldChange";
pub const PADJ_COL: &str = "padj";
pub const NEG_LOG10_COL: &str = "neg_log10_pval";
pub const LOG2_FC_COL: &str = "log2_fold_change";
pub const CATEGORY_COL: &str = "category";

/// Everything that can go wrong between loading a table and writing the plot.
#[derive(Debug, Error)]
pub enum VolcanoError {
    #[error("gene `{0}` not found in GENEID column")]
    GeneNotFound(String),

    #[error("invalid adjusted p-value {padj} for gene `{gene}` (expected 0 < padj <= 1)")]
    InvalidProbability { gene: String, padj: f64 },

    #[error("missing axis bounds: {}", .0.join(", "))]
    MissingAxisBounds(Vec<&'static str>),

    #[error("invalid {axis} axis bounds: min {min} must be finite and below max {max}")]
    InvalidAxisBounds {
        axis: &'static str,
        min: f64,
        max: f64,
    },

    #[error("missing required parameter `{0}`")]
    MissingParameter(&'static str),

    #[error("invalid p-value cutoff {0} (expected 0 < cutoff <= 1)")]
    InvalidCutoff(f64),

    #[error("unknown colour `{0}`")]
    UnknownColour(String),

    #[error("unsupported output format `{0}` (expected .png or .svg)")]
    UnsupportedFormat(String),

    #[error("plotting failed: {0}")]
    Plot(String),

    #[error(transparent)]
    Polars(#[from] PolarsError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type VolcanoResult<T> = Result<T, VolcanoError>;

/// A source of differential expression results.
pub trait Dataset {
    /// Reads the raw table with `GENEID`, `log2FoldChange` and `padj` columns.
    fn load(&self) -> PolarsResult<DataFrame>;

    /// Raw table extended with the fields the plot is drawn from.
    fn load_derived(&self) -> VolcanoResult<DataFrame>;
}

/// Wraps a plotters drawing error, whose type depends on the backend.
pub fn plot_err<E: fmt::Display>(e: E) -> VolcanoError {
    VolcanoError::Plot(e.to_string())
}

/// Significance class of a single gene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Depleted,
    Enriched,
    NonSignificant,
}

impl Category {
    /// Drawing order: depleted first, non-significant last.
    pub const ALL: [Category; 3] = [Category::Depleted, Category::Enriched, Category::NonSignificant];

    /// Legend text.
    pub fn label(self) -> &'static str {
        match self {
            Category::Depleted => "Depleted",
            Category::Enriched => "Enriched",
            Category::NonSignificant => "Non-significant",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One gene placed on the volcano plane.
#[derive(Debug, Clone, PartialEq)]
pub struct GenePoint {
    pub gene: String,
    pub log2_fold_change: f64,
    pub neg_log10_pval: f64,
}

impl GenePoint {
    pub fn coords(&self) -> (f64, f64) {
        (self.log2_fold_change, self.neg_log10_pval)
    }
}

/// Fixed plotting window, never derived from the data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisBounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl AxisBounds {
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> VolcanoResult<Self> {
        check_axis("x", x_min, x_max)?;
        check_axis("y", y_min, y_max)?;
        Ok(Self { x_min, x_max, y_min, y_max })
    }

    pub fn contains(&self, (x, y): (f64, f64)) -> bool {
        (self.x_min..=self.x_max).contains(&x) && (self.y_min..=self.y_max).contains(&y)
    }
}

fn check_axis(axis: &'static str, min: f64, max: f64) -> VolcanoResult<()> {
    if min.is_finite() && max.is_finite() && min < max {
        Ok(())
    } else {
        Err(VolcanoError::InvalidAxisBounds { axis, min, max })
    }
}

/// `-log10(padj)`, rejecting values that are not probabilities.
pub fn neg_log10_padj(gene: &str, padj: Option<f64>) -> VolcanoResult<f64> {
    match padj {
        Some(p) if p > 0.0 && p <= 1.0 => Ok(-p.log10()),
        other => Err(VolcanoError::InvalidProbability {
            gene: gene.to_string(),
            padj: other.unwrap_or(f64::NAN),
        }),
    }
}

/// Like [`neg_log10_padj`], but a missing or NaN `padj` (DESeq2 writes `NA`
/// for independently filtered genes) becomes NaN instead of an error.
pub fn neg_log10_padj_or_nan(gene: &str, padj: Option<f64>) -> VolcanoResult<f64> {
    match padj {
        None => Ok(f64::NAN),
        Some(p) if p.is_nan() => Ok(f64::NAN),
        valued => neg_log10_padj(gene, valued),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neg_log10_rejects_non_probabilities() {
        assert!((neg_log10_padj("A", Some(0.01)).unwrap() - 2.0).abs() < 1e-12);
        assert_eq!(neg_log10_padj("A", Some(1.0)).unwrap(), 0.0);
        for bad in [Some(0.0), Some(-0.1), Some(1.5), Some(f64::NAN), None] {
            assert!(matches!(
                neg_log10_padj("A", bad),
                Err(VolcanoError::InvalidProbability { .. })
            ));
        }
    }

    #[test]
    fn filtered_padj_becomes_nan() {
        assert!(neg_log10_padj_or_nan("A", None).unwrap().is_nan());
        assert!(neg_log10_padj_or_nan("A", Some(f64::NAN)).unwrap().is_nan());
        assert!((neg_log10_padj_or_nan("A", Some(0.1)).unwrap() - 1.0).abs() < 1e-12);
        for bad in [Some(0.0), Some(-1.0), Some(2.0)] {
            assert!(matches!(
                neg_log10_padj_or_nan("A", bad),
                Err(VolcanoError::InvalidProbability { .. })
            ));
        }
    }

    #[test]
    fn axis_bounds_must_be_ordered() {
        assert!(AxisBounds::new(-5.0, 5.0, 0.0, 10.0).is_ok());
        match AxisBounds::new(-5.0, 5.0, 3.0, 3.0) {
            Err(VolcanoError::InvalidAxisBounds { axis, .. }) => assert_eq!(axis, "y"),
            other => panic!("expected InvalidAxisBounds, got {other:?}"),
        }
        assert!(AxisBounds::new(f64::NEG_INFINITY, 5.0, 0.0, 1.0).is_err());
    }

    #[test]
    fn contains_is_inclusive() {
        let b = AxisBounds::new(-1.0, 1.0, 0.0, 2.0).unwrap();
        assert!(b.contains((1.0, 2.0)));
        assert!(!b.contains((1.01, 1.0)));
        assert!(!b.contains((0.0, f64::NAN)));
    }
}
