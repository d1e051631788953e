use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "volcano", version, about = "Labelled volcano plot from differential expression results")]
pub struct Cli {
    #[arg(long, help = "CSV/TSV with GENEID, log2FoldChange and padj columns")]
    pub input: PathBuf,

    #[arg(long, help = "JSON configuration; command-line values take precedence")]
    pub config: Option<PathBuf>,

    #[arg(long, default_value = "volcano.png", help = "Output image (.png or .svg)")]
    pub out: PathBuf,

    #[arg(long, help = "Adjusted p-value cutoff [default: 0.05]")]
    pub cutoff: Option<f64>,

    #[arg(long, allow_negative_numbers = true)]
    pub xmin: Option<f64>,

    #[arg(long, allow_negative_numbers = true)]
    pub xmax: Option<f64>,

    #[arg(long, allow_negative_numbers = true)]
    pub ymin: Option<f64>,

    #[arg(long, allow_negative_numbers = true)]
    pub ymax: Option<f64>,

    #[arg(long, value_delimiter = ',', help = "Genes to label (comma separated, case-sensitive lookup)")]
    pub genes: Option<Vec<String>>,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long, help = "Also write the classified table as CSV")]
    pub table_out: Option<PathBuf>,
}
