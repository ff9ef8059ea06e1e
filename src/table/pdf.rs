//! PDF table extraction on top of the PDFium text layer
//!
//! Characters are grouped into lines by Y proximity, lines are split into
//! cells at wide horizontal gaps, and consecutive multi-cell lines form a
//! table whose first line is the header.

use super::{Table, Value};
use crate::error::{Error, Result};
use crate::source::resolve_pdf;
use pdfium_render::prelude::*;
use std::path::Path;

/// Character information collected from a page
#[derive(Debug, Clone)]
pub struct CharInfo {
    /// The character
    pub char: char,
    /// X coordinate (left)
    pub x: f32,
    /// Y coordinate (top)
    pub y: f32,
    /// Character width
    pub width: f32,
    /// Character height (font size proxy)
    pub height: f32,
}

/// Tuning for table detection
#[derive(Debug, Clone)]
pub struct TableExtractionConfig {
    /// Horizontal gap, relative to the median character height, that
    /// separates two cells
    pub cell_gap_ratio: f32,
    /// Minimum number of lines (header included) for a table
    pub min_rows: usize,
    /// Minimum number of cells on a line for it to belong to a table
    pub min_columns: usize,
}

impl Default for TableExtractionConfig {
    fn default() -> Self {
        Self {
            cell_gap_ratio: 1.0,
            min_rows: 2,
            min_columns: 2,
        }
    }
}

/// A run of text on one line
#[derive(Debug, Clone, PartialEq)]
struct Cell {
    text: String,
    min_x: f32,
    max_x: f32,
}

impl Cell {
    fn center(&self) -> f32 {
        (self.min_x + self.max_x) / 2.0
    }
}

/// Get a PDFium instance, preferring an explicit library directory
pub fn create_pdfium(library_dir: Option<&Path>) -> Result<Pdfium> {
    let explicit = library_dir
        .map(|dir| Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir)));

    let bindings = match explicit {
        Some(Ok(bindings)) => Ok(bindings),
        other => {
            if let Some(Err(e)) = other {
                tracing::warn!(error = %e, "PDFium not found in configured directory, trying defaults");
            }
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
                .or_else(|_| {
                    Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(
                        "/opt/pdfium/lib",
                    ))
                })
                .or_else(|_| Pdfium::bind_to_system_library())
        }
    }
    .map_err(|e| Error::Pdfium {
        reason: format!("Failed to initialize PDFium: {}", e),
    })?;

    Ok(Pdfium::new(bindings))
}

/// Map PDFium errors to our error type
fn map_pdfium_error(err: PdfiumError) -> Error {
    match err {
        PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::PasswordError) => {
            Error::PasswordRequired
        }
        _ => Error::Pdfium {
            reason: format!("{}", err),
        },
    }
}

/// Extract every table on every page
pub fn extract_tables<P: AsRef<Path>>(
    path: P,
    library_dir: Option<&Path>,
    config: &TableExtractionConfig,
) -> Result<Vec<Table>> {
    let resolved = resolve_pdf(path.as_ref())?;
    let pdfium = create_pdfium(library_dir)?;
    let document = pdfium
        .load_pdf_from_byte_slice(&resolved.data, None)
        .map_err(map_pdfium_error)?;
    tracing::debug!(
        source = %resolved.source_name,
        pages = document.pages().len(),
        "loaded PDF for table extraction"
    );

    let mut tables = Vec::new();
    for (index, page) in document.pages().iter().enumerate() {
        let text = page.text().map_err(map_pdfium_error)?;
        let found = tables_from_chars(collect_chars_with_info(&text), config);
        tracing::debug!(page = index + 1, tables = found.len(), "scanned page");
        tables.extend(found);
    }
    Ok(tables)
}

/// Extract all tables from a PDF and stack them into one table.
///
/// Finding no table at all is an error rather than an empty result.
pub fn read_pdf_tables<P: AsRef<Path>>(path: P, library_dir: Option<&Path>) -> Result<Table> {
    let path = path.as_ref();
    let tables = extract_tables(path, library_dir, &TableExtractionConfig::default())?;
    if tables.is_empty() {
        return Err(Error::NoTablesFound {
            path: path.display().to_string(),
        });
    }
    tracing::info!(tables = tables.len(), "extracted PDF tables");
    Ok(Table::concat(tables))
}

/// Collect character information from page text
fn collect_chars_with_info(text_obj: &PdfPageText) -> Vec<CharInfo> {
    let mut chars = Vec::new();

    for segment in text_obj.segments().iter() {
        if let Ok(char_iter) = segment.chars() {
            for char_result in char_iter.iter() {
                if let Some(c) = char_result.unicode_char() {
                    if let Ok(bounds) = char_result.loose_bounds() {
                        chars.push(CharInfo {
                            char: c,
                            x: bounds.left().value,
                            y: bounds.top().value,
                            width: bounds.width().value,
                            height: bounds.height().value,
                        });
                    }
                }
            }
        }
    }

    chars
}

/// Median character height, or `None` when nothing has a height
fn median_height(chars: &[CharInfo]) -> Option<f32> {
    let mut heights: Vec<f32> = chars
        .iter()
        .filter(|c| c.height > 0.0)
        .map(|c| c.height)
        .collect();
    if heights.is_empty() {
        return None;
    }
    heights.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    Some(heights[heights.len() / 2])
}

/// Find tables in the characters of one page
pub fn tables_from_chars(chars: Vec<CharInfo>, config: &TableExtractionConfig) -> Vec<Table> {
    let chars: Vec<CharInfo> = chars
        .into_iter()
        .filter(|c| !c.char.is_whitespace())
        .collect();
    let Some(median) = median_height(&chars) else {
        return Vec::new();
    };

    let y_tolerance = (median * 0.4).max(2.0);
    let space_threshold = (median * 0.3).max(3.0);
    let cell_gap = (median * config.cell_gap_ratio).max(space_threshold * 2.0);

    let lines: Vec<Vec<Cell>> = group_into_lines(chars, y_tolerance)
        .into_iter()
        .map(|line| split_cells(line, space_threshold, cell_gap))
        .collect();

    let mut tables = Vec::new();
    let mut run: Vec<Vec<Cell>> = Vec::new();
    for cells in lines {
        if cells.len() >= config.min_columns {
            run.push(cells);
        } else {
            flush_run(&mut run, config, &mut tables);
        }
    }
    flush_run(&mut run, config, &mut tables);
    tables
}

fn flush_run(run: &mut Vec<Vec<Cell>>, config: &TableExtractionConfig, tables: &mut Vec<Table>) {
    if run.len() >= config.min_rows {
        tables.push(build_table(std::mem::take(run)));
    } else {
        run.clear();
    }
}

/// Group characters into lines, top to bottom
fn group_into_lines(chars: Vec<CharInfo>, y_tolerance: f32) -> Vec<Vec<CharInfo>> {
    let mut sorted_chars = chars;
    // PDF Y grows upwards: descending Y is top to bottom
    sorted_chars.sort_by(|a, b| {
        b.y.partial_cmp(&a.y)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut lines: Vec<Vec<CharInfo>> = Vec::new();
    let mut current: Vec<CharInfo> = Vec::new();
    let mut current_y: Option<f32> = None;

    for char_info in sorted_chars {
        match current_y {
            Some(cur_y) if (cur_y - char_info.y).abs() <= y_tolerance => current.push(char_info),
            _ => {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                current_y = Some(char_info.y);
                current.push(char_info);
            }
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Split one line into cells at gaps wider than `cell_gap`
fn split_cells(mut line: Vec<CharInfo>, space_threshold: f32, cell_gap: f32) -> Vec<Cell> {
    line.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));

    let mut cells: Vec<Cell> = Vec::new();
    for c in line {
        let right = c.x + c.width;
        match cells.last_mut() {
            Some(cell) if c.x - cell.max_x <= cell_gap => {
                if c.x - cell.max_x > space_threshold {
                    cell.text.push(' ');
                }
                cell.text.push(c.char);
                cell.max_x = cell.max_x.max(right);
            }
            _ => cells.push(Cell {
                text: c.char.to_string(),
                min_x: c.x,
                max_x: right,
            }),
        }
    }
    cells
}

/// Turn a run of lines into a table, aligning cells to the header columns
fn build_table(run: Vec<Vec<Cell>>) -> Table {
    let mut lines = run.into_iter();
    let header = lines.next().unwrap_or_default();
    let mut table = Table::new(header.iter().map(|c| c.text.clone()));

    for cells in lines {
        let mut row: Vec<Option<String>> = vec![None; header.len()];
        for cell in cells {
            let column = nearest_column(&header, &cell);
            match &mut row[column] {
                Some(existing) => {
                    existing.push(' ');
                    existing.push_str(&cell.text);
                }
                slot => *slot = Some(cell.text),
            }
        }
        table.push_row(
            row.into_iter()
                .map(|text| text.map(|t| Value::infer(&t)).unwrap_or(Value::Null))
                .collect(),
        );
    }
    table
}

fn nearest_column(header: &[Cell], cell: &Cell) -> usize {
    let distance = |anchor: &Cell| {
        let center = cell.center();
        if center >= anchor.min_x && center <= anchor.max_x {
            0.0
        } else {
            (center - anchor.center()).abs()
        }
    };
    header
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            distance(a)
                .partial_cmp(&distance(b))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(index, _)| index)
        .unwrap_or(0)
}
