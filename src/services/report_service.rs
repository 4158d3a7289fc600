// src/services/report_service.rs
use crate::{
    error::{AppError, AppResult},
    models::allotment::Allotment,
};
use printpdf::{
    path::PaintMode, BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument,
    PdfLayerReference, Point, Rect, Rgb,
};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

pub const REPORT_TITLE: &str = "Class Allotment List";
pub const REPORT_HEADER: [&str; 5] = ["Department", "Year", "Section", "Room No", "Day"];

/// A titled table: what the renderer lays out.
#[derive(Debug, Clone)]
pub struct TableDocument {
    pub title: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableDocument {
    pub fn from_allotments(rows: &[Allotment]) -> Self {
        Self {
            title: REPORT_TITLE.to_string(),
            header: REPORT_HEADER.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|a| {
                    vec![
                        a.department.clone(),
                        a.year.clone(),
                        a.section.clone(),
                        a.room.clone(),
                        a.day.clone(),
                    ]
                })
                .collect(),
        }
    }
}

/// Turns a table into document bytes.
pub trait DocumentRenderer: Send + Sync {
    fn render(&self, document: &TableDocument) -> AppResult<Vec<u8>>;

    /// File extension of the produced document, without the dot.
    fn extension(&self) -> &'static str;
}

/// An exported report, already written to disk.
#[derive(Debug)]
pub struct ReportFile {
    pub filename: String,
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

pub fn report_filename(date: &str, extension: &str) -> String {
    format!("class_allotment_{}.{}", date, extension)
}

/// Renders the rows and writes `class_allotment_<date>.<ext>` into `report_dir`.
pub async fn export_report(
    renderer: Arc<dyn DocumentRenderer>,
    rows: &[Allotment],
    report_dir: &Path,
    date: &str,
) -> AppResult<ReportFile> {
    if rows.is_empty() {
        return Err(AppError::EmptyInput);
    }

    let document = TableDocument::from_allotments(rows);
    let extension = renderer.extension();
    tracing::info!("Rendering report with {} rows...", document.rows.len());

    // Layout is CPU work, keep it off the async workers
    let bytes = tokio::task::spawn_blocking(move || renderer.render(&document))
        .await
        .map_err(|e| {
            tracing::error!("spawn_blocking task failed (render): {:?}", e);
            AppError::InternalServerError
        })??;

    let filename = report_filename(date, extension);
    let path = report_dir.join(&filename);
    tokio::fs::create_dir_all(report_dir).await?;
    tokio::fs::write(&path, &bytes).await?;
    tracing::info!("📄 Report written to {}", path.display());

    Ok(ReportFile { filename, path, bytes })
}

// --- PDF ---

const PAGE_WIDTH: f32 = 210.0; // A4, mm
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
const TITLE_SIZE: f32 = 20.0;
const CELL_SIZE: f32 = 10.0;
const HEADER_HEIGHT: f32 = 10.0;
const ROW_HEIGHT: f32 = 7.0;
const FIRST_TABLE_TOP: f32 = PAGE_HEIGHT - MARGIN - 22.0;
const TABLE_TOP: f32 = PAGE_HEIGHT - MARGIN;
const PT_TO_MM: f32 = 0.3528;

fn dark_blue() -> Color {
    Color::Rgb(Rgb::new(0.0, 0.0, 0.545, None))
}

fn white() -> Color {
    Color::Rgb(Rgb::new(1.0, 1.0, 1.0, None))
}

fn white_smoke() -> Color {
    Color::Rgb(Rgb::new(0.96, 0.96, 0.96, None))
}

fn black() -> Color {
    Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None))
}

/// A4 PDF with a bold dark-blue header row repeated on every page.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfRenderer;

impl PdfRenderer {
    fn rows_fitting_below(top: f32) -> usize {
        (((top - HEADER_HEIGHT - MARGIN) / ROW_HEIGHT).floor() as usize).max(1)
    }
}

impl DocumentRenderer for PdfRenderer {
    fn render(&self, document: &TableDocument) -> AppResult<Vec<u8>> {
        let pdf_err = |e: printpdf::Error| AppError::ReportError(format!("{:?}", e));

        // Helvetica drops anything outside ASCII without complaint
        let mut cells = std::iter::once(&document.title)
            .chain(&document.header)
            .chain(document.rows.iter().flatten());
        if let Some(bad) = cells.find(|c| !is_printable_ascii(c)) {
            return Err(AppError::ReportError(format!(
                "cell '{}' has characters the PDF fonts cannot draw",
                bad
            )));
        }

        let (doc, first_page, first_layer) =
            PdfDocument::new(&document.title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Table");
        let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_err)?;
        let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_err)?;

        let first = doc.get_page(first_page).get_layer(first_layer);
        first.set_fill_color(black());
        let title_baseline = PAGE_HEIGHT - MARGIN - 8.0;
        centered_text(
            &first,
            &document.title,
            TITLE_SIZE,
            PAGE_WIDTH / 2.0,
            title_baseline,
            &bold,
        );

        let mut remaining: &[Vec<String>] = &document.rows;
        let mut layer = first;
        let mut top = FIRST_TABLE_TOP;
        loop {
            let take = Self::rows_fitting_below(top).min(remaining.len());
            let (chunk, rest) = remaining.split_at(take);
            draw_table(&layer, top, &document.header, chunk, &regular, &bold);
            remaining = rest;
            if remaining.is_empty() {
                break;
            }
            let (page, page_layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Table");
            layer = doc.get_page(page).get_layer(page_layer);
            top = TABLE_TOP;
        }

        doc.save_to_bytes().map_err(pdf_err)
    }

    fn extension(&self) -> &'static str {
        "pdf"
    }
}

fn draw_table(
    layer: &PdfLayerReference,
    top: f32,
    header: &[String],
    rows: &[Vec<String>],
    regular: &IndirectFontRef,
    bold: &IndirectFontRef,
) {
    let columns = header.len().max(1);
    let left = MARGIN;
    let right = PAGE_WIDTH - MARGIN;
    let column_width = (right - left) / columns as f32;
    let header_bottom = top - HEADER_HEIGHT;
    let bottom = header_bottom - ROW_HEIGHT * rows.len() as f32;

    // Backgrounds
    layer.set_fill_color(dark_blue());
    layer.add_rect(
        Rect::new(Mm(left), Mm(header_bottom), Mm(right), Mm(top)).with_mode(PaintMode::Fill),
    );
    if !rows.is_empty() {
        layer.set_fill_color(white_smoke());
        layer.add_rect(
            Rect::new(Mm(left), Mm(bottom), Mm(right), Mm(header_bottom))
                .with_mode(PaintMode::Fill),
        );
    }

    // Grid
    layer.set_outline_color(black());
    layer.set_outline_thickness(1.0);
    let mut horizontals = vec![top, header_bottom];
    horizontals.extend((1..=rows.len()).map(|i| header_bottom - ROW_HEIGHT * i as f32));
    for y in horizontals {
        layer.add_line(segment(left, y, right, y));
    }
    for c in 0..=columns {
        let x = left + column_width * c as f32;
        layer.add_line(segment(x, top, x, bottom));
    }

    // Header text, extra room below as bottom padding
    layer.set_fill_color(white());
    for (c, label) in header.iter().enumerate() {
        let center = left + column_width * (c as f32 + 0.5);
        centered_text(layer, label, CELL_SIZE, center, header_bottom + 3.5, bold);
    }

    layer.set_fill_color(black());
    for (r, row) in rows.iter().enumerate() {
        let baseline = header_bottom - ROW_HEIGHT * (r as f32 + 1.0) + 2.2;
        for (c, cell) in row.iter().enumerate().take(columns) {
            let center = left + column_width * (c as f32 + 0.5);
            centered_text(layer, cell, CELL_SIZE, center, baseline, regular);
        }
    }
}

fn is_printable_ascii(text: &str) -> bool {
    text.chars().all(|c| c.is_ascii_graphic() || c == ' ')
}

fn segment(x1: f32, y1: f32, x2: f32, y2: f32) -> Line {
    Line {
        points: vec![
            (Point::new(Mm(x1), Mm(y1)), false),
            (Point::new(Mm(x2), Mm(y2)), false),
        ],
        is_closed: false,
    }
}

// Builtin fonts carry no metrics here, so width uses Helvetica's average glyph
fn centered_text(
    layer: &PdfLayerReference,
    text: &str,
    size: f32,
    center_x: f32,
    baseline: f32,
    font: &IndirectFontRef,
) {
    let width = text.chars().count() as f32 * size * 0.5 * PT_TO_MM;
    layer.use_text(text, size, Mm(center_x - width / 2.0), Mm(baseline), font);
}
