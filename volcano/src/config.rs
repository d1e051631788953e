//! Run parameters: a JSON file with every field optional, overlaid by the
//! command line. Axis bounds and the gene list have no defaults; asking for
//! them while unset is an error, not a fallback.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::analysis::classification::{validate_cutoff, DEFAULT_PVAL_CUTOFF};
use crate::analysis::volcano_plot::PlotStyle;
use crate::cli::Cli;
use crate::helper_functions::parse_colour;
use crate::models::{AxisBounds, VolcanoError, VolcanoResult};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CategoryColours {
    pub depleted: String,
    pub enriched: String,
    pub non_significant: String,
}

impl Default for CategoryColours {
    fn default() -> Self {
        Self {
            depleted: "blue".into(),
            enriched: "red".into(),
            non_significant: "gray".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct VolcanoConfig {
    pub pval_cutoff: f64,
    pub x_min: Option<f64>,
    pub x_max: Option<f64>,
    pub y_min: Option<f64>,
    pub y_max: Option<f64>,
    pub genes_of_interest: Option<Vec<String>>,
    pub colours: CategoryColours,
    pub width: u32,
    pub height: u32,
    pub point_size: u32,
    pub label_font_size: u32,
    pub title: Option<String>,
}

impl Default for VolcanoConfig {
    fn default() -> Self {
        Self {
            pval_cutoff: DEFAULT_PVAL_CUTOFF,
            x_min: None,
            x_max: None,
            y_min: None,
            y_max: None,
            genes_of_interest: None,
            colours: CategoryColours::default(),
            width: 800,
            height: 600,
            point_size: 3,
            label_font_size: 12,
            title: None,
        }
    }
}

impl VolcanoConfig {
    pub fn from_json_file(path: &Path) -> VolcanoResult<Self> {
        info!("Reading configuration from {}", path.display());
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// File configuration (if any) with command-line values applied on top.
    pub fn resolve(cli: &Cli) -> VolcanoResult<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::from_json_file(path)?,
            None => Self::default(),
        };
        config.apply_cli(cli);
        Ok(config)
    }

    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(cutoff) = cli.cutoff {
            self.pval_cutoff = cutoff;
        }
        for (target, value) in [
            (&mut self.x_min, cli.xmin),
            (&mut self.x_max, cli.xmax),
            (&mut self.y_min, cli.ymin),
            (&mut self.y_max, cli.ymax),
        ] {
            if value.is_some() {
                *target = value;
            }
        }
        // `--genes ""` asks for no labels
        if let Some(genes) = &cli.genes {
            self.genes_of_interest = Some(
                genes
                    .iter()
                    .map(|g| g.trim())
                    .filter(|g| !g.is_empty())
                    .map(str::to_string)
                    .collect(),
            );
        }
        if let Some(title) = &cli.title {
            self.title = Some(title.clone());
        }
    }

    pub fn cutoff(&self) -> VolcanoResult<f64> {
        validate_cutoff(self.pval_cutoff)
    }

    /// Fails listing every bound that was never supplied.
    pub fn axis_bounds(&self) -> VolcanoResult<AxisBounds> {
        match (self.x_min, self.x_max, self.y_min, self.y_max) {
            (Some(x_min), Some(x_max), Some(y_min), Some(y_max)) => {
                AxisBounds::new(x_min, x_max, y_min, y_max)
            }
            _ => {
                let missing = [
                    ("xmin", self.x_min),
                    ("xmax", self.x_max),
                    ("ymin", self.y_min),
                    ("ymax", self.y_max),
                ]
                .into_iter()
                .filter(|(_, v)| v.is_none())
                .map(|(name, _)| name)
                .collect();
                Err(VolcanoError::MissingAxisBounds(missing))
            }
        }
    }

    pub fn genes_of_interest(&self) -> VolcanoResult<&[String]> {
        self.genes_of_interest
            .as_deref()
            .ok_or(VolcanoError::MissingParameter("genes_of_interest"))
    }

    pub fn plot_style(&self) -> VolcanoResult<PlotStyle> {
        Ok(PlotStyle {
            depleted: parse_colour(&self.colours.depleted)?,
            enriched: parse_colour(&self.colours.enriched)?,
            non_significant: parse_colour(&self.colours.non_significant)?,
            width: self.width,
            height: self.height,
            point_size: self.point_size,
            label_font_size: self.label_font_size,
            title: self.title.clone(),
        })
    }
}
