use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters_backend::{DrawingBackend, FontStyle};
use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;
use tracing::{debug, info};

use crate::analysis::classification::Classification;
use crate::analysis::gene_labels::GeneLabels;
use crate::models::{plot_err, AxisBounds, Category, VolcanoError, VolcanoResult};

pub const X_DESC: &str = "Log2 Fold Change";
pub const Y_DESC: &str = "-Log10 p-value";

/// Colours and sizes; resolved from configuration before rendering.
#[derive(Debug, Clone)]
pub struct PlotStyle {
    pub depleted: RGBColor,
    pub enriched: RGBColor,
    pub non_significant: RGBColor,
    pub width: u32,
    pub height: u32,
    pub point_size: u32,
    pub label_font_size: u32,
    pub title: Option<String>,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            depleted: BLUE,
            enriched: RED,
            non_significant: RGBColor(128, 128, 128),
            width: 800,
            height: 600,
            point_size: 3,
            label_font_size: 12,
            title: None,
        }
    }
}

impl PlotStyle {
    pub fn colour_for(&self, category: Category) -> RGBColor {
        match category {
            Category::Depleted => self.depleted,
            Category::Enriched => self.enriched,
            Category::NonSignificant => self.non_significant,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScatterLayer {
    pub category: Category,
    pub colour: RGBColor,
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Svg,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> VolcanoResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "png" => Ok(OutputFormat::Png),
            "svg" => Ok(OutputFormat::Svg),
            _ => Err(VolcanoError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Everything needed to draw the figure, independent of the backend.
#[derive(Debug, Clone)]
pub struct VolcanoPlot {
    pub layers: Vec<ScatterLayer>,
    pub labels: Vec<(String, (f64, f64))>,
    /// Requested labels whose coordinates fall outside `bounds`.
    pub clipped_labels: Vec<String>,
    pub bounds: AxisBounds,
    pub style: PlotStyle,
}

/// One layer per category in depleted, enriched, non-significant order.
/// Points and labels outside `bounds` are dropped, the axes never rescale.
pub fn build_plot(
    classification: &Classification,
    labels: &GeneLabels,
    style: &PlotStyle,
    bounds: AxisBounds,
) -> VolcanoPlot {
    let mut clipped = 0usize;
    let layers = Category::ALL
        .iter()
        .map(|&category| {
            let points: Vec<(f64, f64)> = classification
                .layer(category)
                .iter()
                .map(|p| p.coords())
                .filter(|&xy| {
                    let inside = bounds.contains(xy);
                    if !inside {
                        clipped += 1;
                    }
                    inside
                })
                .collect();
            ScatterLayer { category, colour: style.colour_for(category), points }
        })
        .collect();

    let (inside, outside): (Vec<_>, Vec<_>) = labels
        .iter()
        .map(|(gene, &xy)| (gene.clone(), xy))
        .partition(|&(_, xy)| bounds.contains(xy));
    let clipped_labels: Vec<String> = outside.into_iter().map(|(gene, _)| gene).collect();

    if clipped > 0 {
        debug!("{} points fall outside the axis bounds and are not drawn", clipped);
    }
    if !clipped_labels.is_empty() {
        debug!("Labels outside the axis bounds are not drawn: {}", clipped_labels.join(", "));
    }

    VolcanoPlot { layers, labels: inside, clipped_labels, bounds, style: style.clone() }
}

impl VolcanoPlot {
    /// Writes the figure; the backend is picked from the file extension.
    pub fn draw(&self, output_path: &Path) -> VolcanoResult<()> {
        let format = OutputFormat::from_path(output_path)?;
        let size = (self.style.width, self.style.height);
        match format {
            OutputFormat::Png => {
                let root = BitMapBackend::new(output_path, size).into_drawing_area();
                self.draw_on(&root)?;
            }
            OutputFormat::Svg => {
                let root = SVGBackend::new(output_path, size).into_drawing_area();
                self.draw_on(&root)?;
            }
        }
        info!("Volcano plot saved to {}", output_path.display());
        Ok(())
    }

    fn draw_on<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> VolcanoResult<()> {
        root.fill(&WHITE).map_err(plot_err)?;

        let b = self.bounds;
        let mut builder = ChartBuilder::on(root);
        builder.margin(15).x_label_area_size(50).y_label_area_size(60);
        if let Some(title) = &self.style.title {
            builder.caption(title, ("sans-serif", 24));
        }
        let mut chart = builder
            .build_cartesian_2d(b.x_min..b.x_max, b.y_min..b.y_max)
            .map_err(plot_err)?;

        chart
            .configure_mesh()
            .disable_mesh()
            .x_desc(X_DESC)
            .y_desc(Y_DESC)
            .axis_desc_style(("sans-serif", 18))
            .draw()
            .map_err(plot_err)?;

        let radius = self.style.point_size;
        for layer in &self.layers {
            let colour = layer.colour;
            chart
                .draw_series(
                    layer
                        .points
                        .iter()
                        .map(|&xy| Circle::new(xy, radius, colour.filled())),
                )
                .map_err(plot_err)?
                .label(layer.category.label())
                .legend(move |(x, y)| Circle::new((x, y), 5, colour.filled()));
        }

        let font_size = f64::from(self.style.label_font_size);
        for (gene, xy) in &self.labels {
            chart
                .draw_series(std::iter::once(Text::new(
                    gene.clone(),
                    *xy,
                    ("sans-serif", font_size)
                        .into_font()
                        .style(FontStyle::Bold)
                        .color(&BLACK)
                        .pos(Pos::new(HPos::Center, VPos::Center)),
                )))
                .map_err(plot_err)?;
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(&BLACK)
            .position(SeriesLabelPosition::UpperRight)
            .draw()
            .map_err(plot_err)?;

        root.present().map_err(plot_err)?;
        Ok(())
    }
}
