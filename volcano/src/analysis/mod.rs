pub mod classification;
pub mod gene_labels;
pub mod volcano_plot;
