//! Minimal multi-page table renderer on top of `pdf-writer`.
//!
//! Text uses the built-in Helvetica with WinAnsi encoding, so accented Latin
//! characters print correctly; anything outside Latin-1 becomes `?`.

use pdf_writer::{Content, Name, Pdf, Rect, Ref, Str};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Average Helvetica glyph width as a fraction of the font size.
const GLYPH_RATIO: f32 = 0.52;

/// Latin-1 bytes for the WinAnsi-encoded font.
fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            0x20..=0x7E | 0xA0..=0xFF => c as u8,
            0x20AC => 0x80,
            _ => b'?',
        })
        .collect()
}

/// Cut `text` so it fits `width` points, ending with `..` when shortened.
fn fit_text(text: &str, width: f32, size: f32) -> String {
    let max = ((width - 8.0) / (size * GLYPH_RATIO)).floor().max(1.0) as usize;
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(2);
    text.chars().take(keep).collect::<String>() + ".."
}

pub struct PdfManager {
    pdf: Pdf,
    catalog_id: Ref,
    pages_id: Ref,
    page_refs: Vec<Ref>,
    current_content_id: Option<Ref>,

    page_w: f32,
    page_h: f32,
    margin: f32,
    row_h: f32,

    next_id: i32,
    font_id: Ref,

    font_size: f32,
    header_font_size: f32,
    title_font_size: f32,

    footer: String,
}

impl Default for PdfManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfManager {
    pub fn new() -> Self {
        let mut pdf = Pdf::new();

        let catalog_id = Ref::new(1);
        let pages_id = Ref::new(2);
        let font_id = Ref::new(3);
        let next_id = 4;

        pdf.type1_font(font_id)
            .base_font(Name(b"Helvetica"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));

        Self {
            pdf,
            catalog_id,
            pages_id,
            page_refs: Vec::new(),
            current_content_id: None,

            page_w: 595.0,
            page_h: 842.0,
            margin: 50.0,
            row_h: 20.0,

            next_id,
            font_id,

            font_size: 10.0,
            header_font_size: 11.0,
            title_font_size: 14.0,

            footer: String::new(),
        }
    }

    /// Switch to A4 landscape; call before writing any table.
    pub fn landscape(mut self) -> Self {
        std::mem::swap(&mut self.page_w, &mut self.page_h);
        self
    }

    /// Text printed bottom-left on every page.
    pub fn with_footer(mut self, footer: &str) -> Self {
        self.footer = footer.to_string();
        self
    }

    /// Next free object id.
    fn fresh_ref(&mut self) -> Ref {
        let id = self.next_id;
        self.next_id += 1;
        Ref::new(id)
    }

    fn new_page(&mut self) -> Content {
        let page_id = self.fresh_ref();
        let content_id = self.fresh_ref();

        self.page_refs.push(page_id);

        let mut page = self.pdf.page(page_id);
        page.parent(self.pages_id)
            .media_box(Rect::new(0.0, 0.0, self.page_w, self.page_h))
            .contents(content_id);

        page.resources().fonts().pair(Name(b"F1"), self.font_id);

        self.current_content_id = Some(content_id);

        Content::new()
    }

    fn finalize_page(&mut self, content: Content) {
        if let Some(id) = self.current_content_id {
            self.pdf.stream(id, &content.finish());
        }
    }

    fn build_pages_tree(&mut self) {
        let mut pages = self.pdf.pages(self.pages_id);
        pages.count(self.page_refs.len() as i32);
        pages.kids(self.page_refs.clone());
    }

    fn draw_text(&self, content: &mut Content, x: f32, y: f32, size: f32, text: &str) {
        content.begin_text();
        content.set_font(Name(b"F1"), size);
        content.set_text_matrix([1.0, 0.0, 0.0, 1.0, x, y]);
        content.show(Str(&encode_text(text)));
        content.end_text();
    }

    fn draw_cell_borders(&self, content: &mut Content, x: f32, y: f32, w: f32, h: f32) {
        content.save_state();
        content.set_stroke_rgb(0.65, 0.65, 0.65);
        content.rect(x, y, w, h);
        content.stroke();
        content.restore_state();
    }

    fn draw_row(
        &self,
        content: &mut Content,
        y: f32,
        col_widths: &[f32],
        x_start: f32,
        row: &[String],
        font_size: f32,
    ) {
        let mut x = x_start;

        for (i, text) in row.iter().enumerate() {
            let w = col_widths.get(i).copied().unwrap_or(0.0);
            self.draw_text(content, x + 4.0, y + 5.0, font_size, &fit_text(text, w, font_size));
            self.draw_cell_borders(content, x, y, w, self.row_h);
            x += w;
        }
    }

    /// Column widths from header and content, shrunk to the printable width.
    fn compute_col_widths(&self, headers: &[&str], rows: &[Vec<String>]) -> Vec<f32> {
        let char_w = self.font_size * GLYPH_RATIO;
        let mut widths: Vec<f32> = headers
            .iter()
            .map(|h| h.chars().count() as f32 * char_w * 1.1 + 8.0)
            .collect();

        for row in rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                // Long free text (notes, addresses) should not starve the other columns.
                let cell_w = cell.chars().count().min(40) as f32 * char_w + 8.0;
                *w = w.max(cell_w);
            }
        }

        let total: f32 = widths.iter().sum();
        let max = self.page_w - 2.0 * self.margin;

        if total > max {
            let scale = max / total;
            for w in &mut widths {
                *w *= scale;
            }
        }

        widths
    }

    fn draw_page_header_footer(&self, content: &mut Content, title: &str, page: usize) {
        self.draw_text(
            content,
            self.margin,
            self.page_h - self.margin + 15.0,
            self.title_font_size,
            title,
        );

        if !self.footer.is_empty() {
            self.draw_text(content, self.margin, self.margin - 35.0, self.font_size, &self.footer);
        }

        let pg = format!("Page {}", page);
        self.draw_text(
            content,
            self.page_w - self.margin - 60.0,
            self.margin - 35.0,
            self.font_size,
            &pg,
        );
    }

    /// Multi-page table; the header row repeats on every page.
    pub fn write_table(&mut self, title: &str, headers: &[&str], rows: &[Vec<String>]) {
        // No rows: still emit one page with the header.
        if rows.is_empty() {
            let col_widths = self.compute_col_widths(headers, &[]);
            let header_row: Vec<String> = headers.iter().map(|s| s.to_string()).collect();

            let mut content = self.new_page();
            self.draw_page_header_footer(&mut content, title, 1);

            let y = self.page_h - self.margin - 30.0;

            content.save_state();
            content.set_fill_rgb(0.85, 0.87, 0.90);
            content.rect(self.margin, y, col_widths.iter().sum(), self.row_h);
            content.fill_nonzero();
            content.restore_state();

            self.draw_row(
                &mut content,
                y,
                &col_widths,
                self.margin,
                &header_row,
                self.header_font_size,
            );

            self.finalize_page(content);
            return;
        }

        let col_widths = self.compute_col_widths(headers, rows);
        let header_row: Vec<String> = headers.iter().map(|s| s.to_string()).collect();

        let mut remaining: &[Vec<String>] = rows;
        let mut page_idx = 1;

        while !remaining.is_empty() {
            let mut content = self.new_page();
            self.draw_page_header_footer(&mut content, title, page_idx);

            let mut y = self.page_h - self.margin - 30.0;

            content.save_state();
            content.set_fill_rgb(0.85, 0.87, 0.90);
            content.rect(self.margin, y, col_widths.iter().sum(), self.row_h);
            content.fill_nonzero();
            content.restore_state();

            self.draw_row(
                &mut content,
                y,
                &col_widths,
                self.margin,
                &header_row,
                self.header_font_size,
            );

            y -= self.row_h;

            let mut consumed = 0;

            for (i, row) in remaining.iter().enumerate() {
                if y - self.row_h < self.margin {
                    break;
                }

                if i % 2 == 0 {
                    content.save_state();
                    content.set_fill_rgb(0.96, 0.96, 0.96);
                    content.rect(self.margin, y, col_widths.iter().sum(), self.row_h);
                    content.fill_nonzero();
                    content.restore_state();
                }

                self.draw_row(
                    &mut content,
                    y,
                    &col_widths,
                    self.margin,
                    row,
                    self.font_size,
                );

                y -= self.row_h;
                consumed += 1;
            }

            self.finalize_page(content);
            remaining = &remaining[consumed..];
            page_idx += 1;
        }
    }

    pub fn save(mut self, path: &Path) -> std::io::Result<()> {
        self.pdf.catalog(self.catalog_id).pages(self.pages_id);
        self.build_pages_tree();

        let bytes = self.pdf.finish();
        let mut f = File::create(path)?;
        f.write_all(&bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accented_text_maps_to_latin1() {
        assert_eq!(encode_text("Allée"), b"All\xe9e".to_vec());
        assert_eq!(encode_text("50 €"), b"50 \x80".to_vec());
        assert_eq!(encode_text("日"), b"?".to_vec());
    }

    #[test]
    fn long_cells_are_shortened() {
        assert_eq!(fit_text("short", 200.0, 10.0), "short");
        let cut = fit_text(&"x".repeat(100), 60.0, 10.0);
        assert!(cut.ends_with(".."));
        assert!(cut.chars().count() < 100);
    }
}
