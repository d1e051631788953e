use std::path::PathBuf;

use polars::prelude::*;
use tracing::{debug, error, info};

use crate::helper_functions::read_csv;
use crate::models::{
    neg_log10_padj_or_nan, Dataset, VolcanoResult, FOLD_CHANGE_COL, GENE_ID_COL, LOG2_FC_COL,
    NEG_LOG10_COL, PADJ_COL,
};

/// Differential expression results on disk (DESeq2-style CSV or TSV).
pub struct ExpressionTable {
    pub path: PathBuf,
}

impl Dataset for ExpressionTable {
    fn load(&self) -> PolarsResult<DataFrame> {
        info!("Reading expression results from {}", self.path.display());
        let df = match read_csv(&self.path) {
            Ok(df) => df,
            Err(e) => {
                error!("Failed to read expression table: {}", e);
                return Err(e);
            }
        };
        debug!("Loaded table with shape {:?}", df.shape());
        normalise_columns(df)
    }

    fn load_derived(&self) -> VolcanoResult<DataFrame> {
        derive_fields(&self.load()?)
    }
}

/// Casts the three input columns to the types the rest of the pipeline reads.
/// Gene IDs that CSV inference turned into numbers become strings again.
pub fn normalise_columns(mut df: DataFrame) -> PolarsResult<DataFrame> {
    for (name, dtype) in [
        (GENE_ID_COL, DataType::String),
        (FOLD_CHANGE_COL, DataType::Float64),
        (PADJ_COL, DataType::Float64),
    ] {
        let column = df.column(name)?;
        if column.dtype() != &dtype {
            debug!("Casting `{}` from {} to {}", name, column.dtype(), dtype);
            let cast = column.cast(&dtype)?;
            df.with_column(cast)?;
        }
    }
    Ok(df)
}

/// Adds `neg_log10_pval` (`-log10(padj)`) and `log2_fold_change` (a copy of
/// `log2FoldChange`). A missing or NaN `padj` yields NaN; any other value
/// outside (0, 1] fails on the first offending row.
pub fn derive_fields(df: &DataFrame) -> VolcanoResult<DataFrame> {
    let mut df = normalise_columns(df.clone())?;

    let (neg_log10, fold_change) = {
        let genes = df.column(GENE_ID_COL)?.str()?;
        let fc = df.column(FOLD_CHANGE_COL)?.f64()?;
        let padj = df.column(PADJ_COL)?.f64()?;

        let mut neg_log10 = Vec::with_capacity(df.height());
        for (gene, p) in genes.into_iter().zip(padj.into_iter()) {
            neg_log10.push(neg_log10_padj_or_nan(gene.unwrap_or(""), p)?);
        }
        let filtered = neg_log10.iter().filter(|v| v.is_nan()).count();
        if filtered > 0 {
            info!("{} genes have no adjusted p-value", filtered);
        }
        let fold_change: Vec<Option<f64>> = fc.into_iter().collect();
        (neg_log10, fold_change)
    };

    df.with_column(Series::new(PlSmallStr::from(NEG_LOG10_COL), neg_log10))?;
    df.with_column(Series::new(PlSmallStr::from(LOG2_FC_COL), fold_change))?;

    debug!("Derived fields for {} rows", df.height());
    Ok(df)
}
