use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};

use super::ReportDocument;
use super::layout::{PageLayout, paginate};
use crate::error::{HrmError, Result};

const TITLE_SIZE: f32 = 16.0;
const TEXT_SIZE: f32 = 9.0;
// rough Helvetica advance per point of font size, in mm
const GLYPH_WIDTH: f32 = 0.19;

fn export_error(e: impl std::fmt::Display) -> HrmError {
    HrmError::Export(e.to_string())
}

/// Cuts a cell so it stays inside its column.
fn fit(text: &str, column_width: f32) -> String {
    let max = (column_width / (TEXT_SIZE * GLYPH_WIDTH)).floor().max(1.0) as usize;
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}

struct Table<'a> {
    layout: PageLayout,
    column_width: f32,
    regular: &'a IndirectFontRef,
    bold: &'a IndirectFontRef,
}

impl Table<'_> {
    fn row(&self, layer: &PdfLayerReference, cells: &[String], top: f32, bold: bool) {
        let font = if bold { self.bold } else { self.regular };
        let y = Mm(self.layout.height - top);
        for (i, cell) in cells.iter().enumerate() {
            let x = Mm(self.layout.margin + i as f32 * self.column_width);
            layer.use_text(fit(cell, self.column_width), TEXT_SIZE, x, y, font);
        }
    }
}

pub(super) fn encode(doc: &ReportDocument) -> Result<Vec<u8>> {
    let layout = PageLayout::default();
    let (pdf, first_page, first_layer) =
        PdfDocument::new(&doc.title, Mm(layout.width), Mm(layout.height), "Layer 1");
    let regular = pdf
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(export_error)?;
    let bold = pdf
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(export_error)?;

    let columns = doc.header.len().max(1) as f32;
    let table = Table {
        layout,
        column_width: (layout.width - 2.0 * layout.margin) / columns,
        regular: &regular,
        bold: &bold,
    };

    for (n, range) in paginate(doc.rows.len(), &layout).into_iter().enumerate() {
        let first = n == 0;
        let layer = if first {
            pdf.get_page(first_page).get_layer(first_layer)
        } else {
            let (page, layer) =
                pdf.add_page(Mm(layout.width), Mm(layout.height), format!("Layer {}", n + 1));
            pdf.get_page(page).get_layer(layer)
        };

        if first {
            let mut top = layout.margin + 4.0;
            layer.use_text(
                &doc.title,
                TITLE_SIZE,
                Mm(layout.margin),
                Mm(layout.height - top),
                &bold,
            );
            for line in doc.preamble() {
                top += layout.line_height;
                layer.use_text(
                    line,
                    TEXT_SIZE,
                    Mm(layout.margin),
                    Mm(layout.height - top),
                    &regular,
                );
            }
        }

        let mut top = layout.table_top(first) + layout.line_height;
        table.row(&layer, &doc.header, top, true);
        for row in &doc.rows[range] {
            top += layout.line_height;
            table.row(&layer, row, top, false);
        }
    }

    pdf.save_to_bytes().map_err(export_error)
}
