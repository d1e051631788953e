use std::fs::File;
use std::path::{Path, PathBuf};

use plotters::style::RGBColor;
use polars::prelude::*;
use tracing::info;

use crate::models::{VolcanoError, VolcanoResult};

/// Tab for `.tsv`/`.tab`/`.txt`, comma for everything else.
pub fn separator_for(path: &Path) -> u8 {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("tsv") | Some("tab") | Some("txt") => b'\t',
        _ => b',',
    }
}

pub fn read_csv(file_path: &Path) -> PolarsResult<DataFrame> {
    let separator = separator_for(file_path);
    CsvReadOptions::default()
        .with_has_header(true)
        .map_parse_options(|opts| opts.with_separator(separator))
        .try_into_reader_with_file_path(Some(PathBuf::from(file_path)))?
        .finish()
}

pub fn dataframe_to_csv(df: &mut DataFrame, path: &Path, include_header: bool) -> PolarsResult<()> {
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(include_header)
        .finish(df)?;
    info!("Wrote {} rows to {}", df.height(), path.display());
    Ok(())
}

/// Named colour or `#rrggbb` hex code.
pub fn parse_colour(name: &str) -> VolcanoResult<RGBColor> {
    let key = name.trim().to_ascii_lowercase();
    let colour = match key.as_str() {
        "blue" => RGBColor(0, 0, 255),
        "red" => RGBColor(255, 0, 0),
        "gray" | "grey" => RGBColor(128, 128, 128),
        "lightgray" | "lightgrey" => RGBColor(211, 211, 211),
        "darkgray" | "darkgrey" => RGBColor(169, 169, 169),
        "black" => RGBColor(0, 0, 0),
        "green" => RGBColor(0, 128, 0),
        "orange" => RGBColor(255, 165, 0),
        "purple" => RGBColor(128, 0, 128),
        "navy" => RGBColor(0, 0, 128),
        "firebrick" => RGBColor(178, 34, 34),
        "steelblue" => RGBColor(70, 130, 180),
        hex if hex.len() == 7 && hex.is_ascii() && hex.starts_with('#') => {
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
            match (channel(1), channel(3), channel(5)) {
                (Ok(r), Ok(g), Ok(b)) => RGBColor(r, g, b),
                _ => return Err(VolcanoError::UnknownColour(name.to_string())),
            }
        }
        _ => return Err(VolcanoError::UnknownColour(name.to_string())),
    };
    Ok(colour)
}
