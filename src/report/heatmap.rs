//! Triangle correlation heatmap
//!
//! Only cells strictly below the diagonal are drawn. Colors use the fixed
//! -1..1 BrBG scale and every drawn cell carries a two-decimal annotation.
//! Rendering targets any plotters drawing area supplied by the caller.

use std::path::Path;

use anyhow::{Context, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use polars::prelude::DataFrame;

use super::colormap::{brbg, text_color_for, SCALE_MAX, SCALE_MIN};
use crate::pipeline::{correlation_matrix, CorrelationMatrix, CorrelationMethod};

const FONT: &str = "sans-serif";
const COLORBAR_AREA: i32 = 90;
const COLORBAR_WIDTH: i32 = 18;
const COLORBAR_STEPS: i32 = 100;
const COLORBAR_TICKS: [f64; 5] = [-1.0, -0.5, 0.0, 0.5, 1.0];
const LABEL_GAP: i32 = 6;

/// Appearance of the rendered heatmap
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapStyle {
    pub title: String,
    pub title_font_size: u32,
    /// Space between the title and the grid, in pixels
    pub title_pad: u32,
    pub label_font_size: u32,
    pub max_annotation_font_size: u32,
    pub width: u32,
    pub height: u32,
}

impl Default for HeatmapStyle {
    fn default() -> Self {
        Self {
            title: "Triangle Correlation Heatmap".to_string(),
            title_font_size: 18,
            title_pad: 16,
            label_font_size: 12,
            max_annotation_font_size: 12,
            width: 1600,
            height: 600,
        }
    }
}

impl HeatmapStyle {
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

/// One annotated cell of the lower triangle
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapCell {
    pub row: usize,
    pub col: usize,
    pub value: f64,
    pub label: String,
    pub fill: RGBColor,
}

/// Cells strictly below the diagonal. `NaN` correlations are left blank.
pub fn heatmap_cells(matrix: &CorrelationMatrix) -> Vec<HeatmapCell> {
    matrix
        .lower_triangle()
        .filter(|(_, _, value)| !value.is_nan())
        .map(|(row, col, value)| HeatmapCell {
            row,
            col,
            value,
            label: format!("{:.2}", value),
            fill: brbg(value),
        })
        .collect()
}

/// Pixel geometry of the grid inside the drawing area
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub left: i32,
    pub top: i32,
    pub cell_width: i32,
    pub cell_height: i32,
    pub size: usize,
}

impl GridLayout {
    /// Fit `size` x `size` cells into `width` x `height`, leaving room for
    /// row labels on the left, column labels below and the color bar on the right.
    pub fn fit(width: u32, height: u32, size: usize, label_extent: i32) -> Self {
        let width = width as i32;
        let height = height as i32;
        let cells = size.max(1) as i32;

        let label_w = label_extent.min(width / 3);
        let label_h = label_extent.min(height / 3);
        let avail_w = (width - label_w - COLORBAR_AREA).max(cells);
        let avail_h = (height - label_h - LABEL_GAP).max(cells);

        Self {
            left: label_w,
            top: LABEL_GAP,
            cell_width: (avail_w / cells).max(1),
            cell_height: (avail_h / cells).max(1),
            size,
        }
    }

    pub fn right(&self) -> i32 {
        self.left + self.cell_width * self.size as i32
    }

    pub fn bottom(&self) -> i32 {
        self.top + self.cell_height * self.size as i32
    }

    /// Upper-left and lower-right corners of a cell (row 0 at the top)
    pub fn cell_rect(&self, row: usize, col: usize) -> ((i32, i32), (i32, i32)) {
        let x0 = self.left + self.cell_width * col as i32;
        let y0 = self.top + self.cell_height * row as i32;
        ((x0, y0), (x0 + self.cell_width, y0 + self.cell_height))
    }

    pub fn cell_center(&self, row: usize, col: usize) -> (i32, i32) {
        let ((x0, y0), (x1, y1)) = self.cell_rect(row, col);
        ((x0 + x1) / 2, (y0 + y1) / 2)
    }
}

fn label_extent(columns: &[String], font_size: u32) -> i32 {
    let longest = columns.iter().map(|c| c.chars().count()).max().unwrap_or(0);
    (longest as f64 * font_size as f64 * 0.6).ceil() as i32 + LABEL_GAP * 2
}

/// Draw the heatmap of `matrix` onto `area`.
pub fn render_heatmap<DB>(
    area: &DrawingArea<DB, Shift>,
    matrix: &CorrelationMatrix,
    style: &HeatmapStyle,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    area.fill(&WHITE)?;
    let body = area
        .titled(&style.title, (FONT, style.title_font_size).into_font())?
        .margin(style.title_pad as i32, 0, 0, 0);

    if matrix.is_empty() {
        return Ok(());
    }

    let (width, height) = body.dim_in_pixel();
    let layout = GridLayout::fit(
        width,
        height,
        matrix.len(),
        label_extent(matrix.columns(), style.label_font_size),
    );

    draw_cells(&body, matrix, &layout, style)?;
    draw_axis_labels(&body, matrix.columns(), &layout, style)?;
    draw_colorbar(&body, &layout, style)?;
    Ok(())
}

fn draw_cells<DB>(
    area: &DrawingArea<DB, Shift>,
    matrix: &CorrelationMatrix,
    layout: &GridLayout,
    style: &HeatmapStyle,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let font_size = style
        .max_annotation_font_size
        .min((layout.cell_height.min(layout.cell_width / 3) / 2).max(1) as u32);

    for cell in heatmap_cells(matrix) {
        let (upper_left, lower_right) = layout.cell_rect(cell.row, cell.col);
        area.draw(&Rectangle::new([upper_left, lower_right], cell.fill.filled()))?;

        let text_style = (FONT, font_size)
            .into_font()
            .color(&text_color_for(&cell.fill))
            .pos(Pos::new(HPos::Center, VPos::Center));
        area.draw(&Text::new(
            cell.label,
            layout.cell_center(cell.row, cell.col),
            text_style,
        ))?;
    }
    Ok(())
}

fn draw_axis_labels<DB>(
    area: &DrawingArea<DB, Shift>,
    columns: &[String],
    layout: &GridLayout,
    style: &HeatmapStyle,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    for (idx, name) in columns.iter().enumerate() {
        let (_, cy) = layout.cell_center(idx, 0);
        let row_style = (FONT, style.label_font_size)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Right, VPos::Center));
        area.draw(&Text::new(
            name.as_str(),
            (layout.left - LABEL_GAP, cy),
            row_style,
        ))?;

        let (cx, _) = layout.cell_center(0, idx);
        let col_style = (FONT, style.label_font_size)
            .into_font()
            .transform(FontTransform::Rotate90)
            .color(&BLACK)
            .pos(Pos::new(HPos::Left, VPos::Center));
        area.draw(&Text::new(
            name.as_str(),
            (cx, layout.bottom() + LABEL_GAP),
            col_style,
        ))?;
    }
    Ok(())
}

fn draw_colorbar<DB>(
    area: &DrawingArea<DB, Shift>,
    layout: &GridLayout,
    style: &HeatmapStyle,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let x0 = layout.right() + COLORBAR_WIDTH;
    let x1 = x0 + COLORBAR_WIDTH;
    let top = layout.top;
    let span = (layout.bottom() - top).max(1);
    let value_at = |y: i32| SCALE_MAX - (y - top) as f64 / span as f64 * (SCALE_MAX - SCALE_MIN);

    for step in 0..COLORBAR_STEPS {
        let y0 = top + span * step / COLORBAR_STEPS;
        let y1 = top + span * (step + 1) / COLORBAR_STEPS;
        let color = brbg(value_at((y0 + y1) / 2));
        area.draw(&Rectangle::new([(x0, y0), (x1, y1)], color.filled()))?;
    }
    area.draw(&Rectangle::new([(x0, top), (x1, top + span)], BLACK.stroke_width(1)))?;

    for tick in COLORBAR_TICKS {
        let y = top + ((SCALE_MAX - tick) / (SCALE_MAX - SCALE_MIN) * span as f64).round() as i32;
        area.draw(&PathElement::new(vec![(x1, y), (x1 + 4, y)], &BLACK))?;
        let tick_style = (FONT, style.label_font_size)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Left, VPos::Center));
        area.draw(&Text::new(format!("{:.1}", tick), (x1 + 8, y), tick_style))?;
    }
    Ok(())
}

/// Compute the correlation matrix of `df` and draw it onto `area`.
///
/// An unknown method never reaches this point: it is rejected when the
/// method name is parsed into a [`CorrelationMethod`].
pub fn plot_correlation<DB>(
    area: &DrawingArea<DB, Shift>,
    df: &DataFrame,
    method: CorrelationMethod,
    style: &HeatmapStyle,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let matrix = correlation_matrix(df, method)?;
    render_heatmap(area, &matrix, style)
}

/// Render onto a PNG or SVG surface chosen by the extension of `path`.
pub fn save_heatmap(path: &Path, matrix: &CorrelationMatrix, style: &HeatmapStyle) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    let size = (style.width, style.height);

    match extension.as_str() {
        "png" | "bmp" | "jpg" | "jpeg" => {
            let root = BitMapBackend::new(path, size).into_drawing_area();
            render_heatmap(&root, matrix, style)?;
            root.present()
                .with_context(|| format!("Failed to write image: {}", path.display()))?;
        }
        "svg" => {
            let root = SVGBackend::new(path, size).into_drawing_area();
            render_heatmap(&root, matrix, style)?;
            root.present()
                .with_context(|| format!("Failed to write image: {}", path.display()))?;
        }
        _ => anyhow::bail!(
            "Unsupported image format: {}. Supported formats: png, svg",
            extension
        ),
    }
    Ok(())
}
