use std::collections::BTreeMap;

use polars::prelude::*;
use tracing::debug;

use crate::models::{
    neg_log10_padj, VolcanoError, VolcanoResult, FOLD_CHANGE_COL, GENE_ID_COL, PADJ_COL,
};

/// Label text (uppercased gene ID) → `(log2 fold change, -log10 padj)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneLabels(pub BTreeMap<String, (f64, f64)>);

impl std::ops::Deref for GeneLabels {
    type Target = BTreeMap<String, (f64, f64)>;
    fn deref(&self) -> &Self::Target { &self.0 }
}
impl std::ops::DerefMut for GeneLabels {
    fn deref_mut(&mut self) -> &mut Self::Target { &mut self.0 }
}

/// Coordinates of the first row whose `GENEID` equals `gene_id` exactly.
///
/// Reads the raw `log2FoldChange` and `padj` columns, so it works on a table
/// with or without the derived fields.
pub fn get_gene_data(gene_id: &str, df: &DataFrame) -> VolcanoResult<(f64, f64)> {
    let genes = df.column(GENE_ID_COL)?.str()?;
    let row = genes
        .into_iter()
        .position(|g| g == Some(gene_id))
        .ok_or_else(|| VolcanoError::GeneNotFound(gene_id.to_string()))?;

    let x = df.column(FOLD_CHANGE_COL)?.f64()?.get(row).unwrap_or(f64::NAN);
    let y = neg_log10_padj(gene_id, df.column(PADJ_COL)?.f64()?.get(row))?;
    Ok((x, y))
}

/// Looks up every requested gene and keys its coordinates by the uppercased ID.
/// IDs that collide after uppercasing keep the coordinates of the last one.
pub fn create_gene_labels<S: AsRef<str>>(gene_ids: &[S], df: &DataFrame) -> VolcanoResult<GeneLabels> {
    let mut labels = GeneLabels::default();
    for gene_id in gene_ids {
        let gene_id = gene_id.as_ref();
        let coords = get_gene_data(gene_id, df)?;
        if let Some(previous) = labels.insert(gene_id.to_uppercase(), coords) {
            debug!("Label {} replaced {:?} with {:?}", gene_id.to_uppercase(), previous, coords);
        }
    }
    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    fn tp53() -> DataFrame {
        df![
            "GENEID" => &["TP53"],
            "log2FoldChange" => &[-2.0],
            "padj" => &[0.01]
        ]
        .unwrap()
    }

    #[test]
    fn lookup_returns_fold_change_and_neg_log10() {
        let (x, y) = get_gene_data("TP53", &tp53()).unwrap();
        assert_eq!(x, -2.0);
        assert!((y - 2.0).abs() < 1e-12);
    }

    #[test]
    fn lookup_is_case_sensitive() {
        assert!(matches!(
            get_gene_data("tp53", &tp53()),
            Err(VolcanoError::GeneNotFound(g)) if g == "tp53"
        ));
    }

    #[test]
    fn absent_gene_fails_instead_of_defaulting() {
        assert!(matches!(
            get_gene_data("BRCA1", &tp53()),
            Err(VolcanoError::GeneNotFound(_))
        ));
    }

    #[test]
    fn first_match_wins_on_duplicates() {
        let df = df![
            "GENEID" => &["A", "DUP", "DUP"],
            "log2FoldChange" => &[0.5, 1.0, -1.0],
            "padj" => &[0.5, 0.1, 0.001]
        ]
        .unwrap();
        let (x, y) = get_gene_data("DUP", &df).unwrap();
        assert_eq!(x, 1.0);
        assert!((y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn labels_are_uppercased() {
        let df = df![
            "GENEID" => &["tp53"],
            "log2FoldChange" => &[-2.0],
            "padj" => &[0.01]
        ]
        .unwrap();
        let labels = create_gene_labels(&["tp53"], &df).unwrap();
        assert_eq!(labels.len(), 1);
        let (x, y) = labels["TP53"];
        assert_eq!(x, -2.0);
        assert!((y - 2.0).abs() < 1e-12);
    }

    #[test]
    fn colliding_ids_collapse_to_last() {
        let df = df![
            "GENEID" => &["g1", "G1"],
            "log2FoldChange" => &[1.0, -3.0],
            "padj" => &[0.1, 0.001]
        ]
        .unwrap();
        let labels = create_gene_labels(&["g1", "G1"], &df).unwrap();
        assert_eq!(labels.len(), 1);
        let (x, y) = labels["G1"];
        assert_eq!(x, -3.0);
        assert!((y - 3.0).abs() < 1e-12);
    }

    #[test]
    fn one_missing_gene_fails_the_whole_set() {
        let err = create_gene_labels(&["TP53".to_string(), "MISSING".to_string()], &tp53()).unwrap_err();
        assert!(matches!(err, VolcanoError::GeneNotFound(g) if g == "MISSING"));
    }

    #[test]
    fn invalid_padj_on_matched_row() {
        let df = df![
            "GENEID" => &["Z"],
            "log2FoldChange" => &[1.0],
            "padj" => &[0.0]
        ]
        .unwrap();
        assert!(matches!(
            get_gene_data("Z", &df),
            Err(VolcanoError::InvalidProbability { .. })
        ));
    }

    #[test]
    fn missing_padj_on_requested_gene_fails() {
        let df = df![
            "GENEID" => &["LOW", "TP53"],
            "log2FoldChange" => &[0.2, -2.0],
            "padj" => &[None, Some(0.01)]
        ]
        .unwrap();
        assert!(matches!(
            get_gene_data("LOW", &df),
            Err(VolcanoError::InvalidProbability { gene, .. }) if gene == "LOW"
        ));
        assert!(get_gene_data("TP53", &df).is_ok());
    }
}
