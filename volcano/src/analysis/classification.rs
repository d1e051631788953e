//! Splits a derived expression table into the three volcano layers.
//!
//! A row is *depleted* when its fold change is negative and `padj` is below
//! the cutoff, *enriched* when the fold change is positive and `padj` is below
//! the cutoff, and *non-significant* when `padj` is at or above the cutoff.
//! Significant rows with a zero (or missing) fold change fit none of the three
//! and are kept apart as unassigned.

use polars::prelude::*;
use tracing::{info, warn};

use crate::models::{
    Category, GenePoint, VolcanoError, VolcanoResult, CATEGORY_COL, GENE_ID_COL, LOG2_FC_COL,
    NEG_LOG10_COL, PADJ_COL,
};

pub const DEFAULT_PVAL_CUTOFF: f64 = 0.05;

pub fn validate_cutoff(cutoff: f64) -> VolcanoResult<f64> {
    if cutoff > 0.0 && cutoff <= 1.0 {
        Ok(cutoff)
    } else {
        Err(VolcanoError::InvalidCutoff(cutoff))
    }
}

/// `None` marks the boundary gap: `padj < cutoff` with a fold change that is
/// neither positive nor negative. A NaN `padj` compares false both ways and
/// lands here too.
pub fn classify_row(fold_change: f64, padj: f64, cutoff: f64) -> Option<Category> {
    if padj >= cutoff {
        Some(Category::NonSignificant)
    } else if padj < cutoff && fold_change < 0.0 {
        Some(Category::Depleted)
    } else if padj < cutoff && fold_change > 0.0 {
        Some(Category::Enriched)
    } else {
        None
    }
}

/// Genes grouped by category, each list in table order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Classification {
    pub depleted: Vec<GenePoint>,
    pub enriched: Vec<GenePoint>,
    pub non_significant: Vec<GenePoint>,
    pub unassigned: Vec<GenePoint>,
}

impl Classification {
    pub fn layer(&self, category: Category) -> &[GenePoint] {
        match category {
            Category::Depleted => &self.depleted,
            Category::Enriched => &self.enriched,
            Category::NonSignificant => &self.non_significant,
        }
    }

    fn push(&mut self, category: Option<Category>, point: GenePoint) {
        match category {
            Some(Category::Depleted) => self.depleted.push(point),
            Some(Category::Enriched) => self.enriched.push(point),
            Some(Category::NonSignificant) => self.non_significant.push(point),
            None => self.unassigned.push(point),
        }
    }

    pub fn total(&self) -> usize {
        self.depleted.len() + self.enriched.len() + self.non_significant.len() + self.unassigned.len()
    }
}

/// Classifies every row of a table that already carries the derived fields.
pub fn classify(df: &DataFrame, cutoff: f64) -> VolcanoResult<Classification> {
    let cutoff = validate_cutoff(cutoff)?;

    let genes = df.column(GENE_ID_COL)?.str()?;
    let fold_change = df.column(LOG2_FC_COL)?.f64()?;
    let neg_log10 = df.column(NEG_LOG10_COL)?.f64()?;
    let padj = df.column(PADJ_COL)?.f64()?;

    let mut classification = Classification::default();
    for i in 0..df.height() {
        let fc = fold_change.get(i).unwrap_or(f64::NAN);
        let p = padj.get(i).unwrap_or(f64::NAN);
        let point = GenePoint {
            gene: genes.get(i).unwrap_or_default().to_string(),
            log2_fold_change: fc,
            neg_log10_pval: neg_log10.get(i).unwrap_or(f64::NAN),
        };
        classification.push(classify_row(fc, p, cutoff), point);
    }

    info!(
        "Classified {} genes at padj < {}: {} depleted, {} enriched, {} non-significant",
        classification.total(),
        cutoff,
        classification.depleted.len(),
        classification.enriched.len(),
        classification.non_significant.len()
    );
    if !classification.unassigned.is_empty() {
        warn!(
            "{} genes belong to no category (zero fold change at significance or no adjusted p-value)",
            classification.unassigned.len()
        );
    }

    Ok(classification)
}

/// Per-row category names for export; null where the row is unassigned.
pub fn category_column(df: &DataFrame, cutoff: f64) -> VolcanoResult<Series> {
    let cutoff = validate_cutoff(cutoff)?;
    let fold_change = df.column(LOG2_FC_COL)?.f64()?;
    let padj = df.column(PADJ_COL)?.f64()?;

    let categories: Vec<Option<&str>> = fold_change
        .into_iter()
        .zip(padj.into_iter())
        .map(|(fc, p)| {
            classify_row(fc.unwrap_or(f64::NAN), p.unwrap_or(f64::NAN), cutoff).map(Category::label)
        })
        .collect();

    Ok(Series::new(PlSmallStr::from(CATEGORY_COL), categories))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_handling::expression_table::derive_fields;
    use polars::df;

    fn derived(genes: &[&str], fc: &[f64], padj: &[f64]) -> DataFrame {
        let raw = df![
            "GENEID" => genes,
            "log2FoldChange" => fc,
            "padj" => padj
        ]
        .unwrap();
        derive_fields(&raw).unwrap()
    }

    #[test]
    fn predicates_partition_significant_rows_by_sign() {
        assert_eq!(classify_row(1.5, 0.01, 0.05), Some(Category::Enriched));
        assert_eq!(classify_row(-0.8, 0.04, 0.05), Some(Category::Depleted));
        assert_eq!(classify_row(0.3, 0.2, 0.05), Some(Category::NonSignificant));
    }

    #[test]
    fn at_or_above_cutoff_is_non_significant_whatever_the_sign() {
        for fc in [-4.0, 0.0, 4.0, f64::NAN] {
            assert_eq!(classify_row(fc, 0.05, 0.05), Some(Category::NonSignificant));
            assert_eq!(classify_row(fc, 0.9, 0.05), Some(Category::NonSignificant));
        }
    }

    #[test]
    fn zero_fold_change_at_significance_is_in_no_category() {
        assert_eq!(classify_row(0.0, 0.001, 0.05), None);
        assert_eq!(classify_row(-0.0, 0.001, 0.05), None);

        let df = derived(&["FLAT", "UP"], &[0.0, 2.0], &[0.001, 0.001]);
        let c = classify(&df, 0.05).unwrap();
        assert!(c.depleted.is_empty());
        assert!(c.non_significant.is_empty());
        assert_eq!(c.enriched.len(), 1);
        assert_eq!(c.unassigned.len(), 1);
        assert_eq!(c.unassigned[0].gene, "FLAT");
    }

    #[test]
    fn three_rows_one_point_per_layer() {
        let df = derived(&["g1", "g2", "g3"], &[1.5, -0.8, 0.3], &[0.01, 0.04, 0.2]);
        let c = classify(&df, DEFAULT_PVAL_CUTOFF).unwrap();

        assert_eq!(c.layer(Category::Enriched).len(), 1);
        assert_eq!(c.layer(Category::Depleted).len(), 1);
        assert_eq!(c.layer(Category::NonSignificant).len(), 1);
        assert!(c.unassigned.is_empty());

        assert_eq!(c.enriched[0].gene, "g1");
        assert_eq!(c.depleted[0].gene, "g2");
        assert_eq!(c.non_significant[0].gene, "g3");
        assert!((c.enriched[0].neg_log10_pval - 2.0).abs() < 1e-12);
    }

    #[test]
    fn cutoff_is_a_parameter() {
        let df = derived(&["g1"], &[1.0], &[0.04]);
        assert_eq!(classify(&df, 0.05).unwrap().enriched.len(), 1);
        assert_eq!(classify(&df, 0.01).unwrap().non_significant.len(), 1);
    }

    #[test]
    fn invalid_cutoff_rejected() {
        let df = derived(&["g1"], &[1.0], &[0.04]);
        for bad in [0.0, -0.05, 1.5, f64::NAN] {
            assert!(matches!(classify(&df, bad), Err(VolcanoError::InvalidCutoff(_))));
        }
    }

    #[test]
    fn layers_keep_table_order() {
        let df = derived(&["a", "b", "c"], &[3.0, 1.0, 2.0], &[0.01, 0.02, 0.03]);
        let c = classify(&df, 0.05).unwrap();
        let order: Vec<&str> = c.enriched.iter().map(|p| p.gene.as_str()).collect();
        assert_eq!(order, ["a", "b", "c"]);
    }

    #[test]
    fn category_column_marks_gap_as_null() {
        let df = derived(&["g1", "g2", "g3", "g4"], &[1.5, -0.8, 0.3, 0.0], &[0.01, 0.04, 0.2, 0.01]);
        let s = category_column(&df, 0.05).unwrap();
        let s = s.str().unwrap();
        assert_eq!(s.get(0), Some("Enriched"));
        assert_eq!(s.get(1), Some("Depleted"));
        assert_eq!(s.get(2), Some("Non-significant"));
        assert_eq!(s.get(3), None);
    }

    #[test]
    fn filtered_padj_rows_are_unassigned() {
        let raw = df![
            "GENEID" => &["TP53", "MYC", "LOW"],
            "log2FoldChange" => &[-2.0, 1.5, 0.2],
            "padj" => &[Some(0.01), Some(0.001), None]
        ]
        .unwrap();
        let df = derive_fields(&raw).unwrap();
        let c = classify(&df, 0.05).unwrap();
        assert_eq!(c.depleted.len(), 1);
        assert_eq!(c.enriched.len(), 1);
        assert!(c.non_significant.is_empty());
        assert_eq!(c.unassigned.len(), 1);
        assert_eq!(c.unassigned[0].gene, "LOW");
        assert_eq!(category_column(&df, 0.05).unwrap().str().unwrap().get(2), None);
    }
}
