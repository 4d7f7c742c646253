//! Just enough PDF 1.4 to lay out report pages: Helvetica text lines and
//! one uncompressed RGB picture per page.

use image::RgbImage;

const PAGE_WIDTH: f64 = 612.0;
const PAGE_HEIGHT: f64 = 792.0;
const MARGIN: f64 = 72.0;
/// Pictures are scaled to six inches across.
pub const IMAGE_WIDTH_PT: f64 = 432.0;
const TITLE_SIZE: f64 = 16.0;
const TEXT_SIZE: f64 = 11.0;
const LEADING: f64 = 15.0;

#[derive(Clone, Debug, Default)]
pub struct PdfPage {
    pub title: String,
    pub image: Option<RgbImage>,
    pub lines: Vec<String>,
}

#[derive(Clone, Debug, Default)]
pub struct PdfDocument {
    pages: Vec<PdfPage>,
}

impl PdfDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a page. Lines that run past the bottom margin move on to
    /// continuation pages carrying the same title.
    pub fn push_page(&mut self, page: PdfPage) {
        let PdfPage {
            title,
            mut image,
            mut lines,
        } = page;
        let mut fit = lines_that_fit(text_top(image.as_ref()));
        let mut page_title = title.clone();
        loop {
            let rest = lines.split_off(fit.min(lines.len()));
            self.pages.push(PdfPage {
                title: page_title,
                image: image.take(),
                lines,
            });
            if rest.is_empty() {
                break;
            }
            lines = rest;
            fit = lines_that_fit(text_top(None));
            page_title = format!("{title} (continued)");
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        // 1 catalog, 2 page tree, 3 font, then page/content[/image] per page
        let mut objects: Vec<Vec<u8>> = vec![Vec::new(); 3];
        objects[0] = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();
        objects[2] = b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_vec();

        let mut kids = Vec::with_capacity(self.pages.len());
        for page in &self.pages {
            let page_id = objects.len() + 1;
            let content_id = page_id + 1;
            let xobject = page
                .image
                .as_ref()
                .map(|_| format!(" /XObject << /Im1 {} 0 R >>", page_id + 2))
                .unwrap_or_default();
            objects.push(
                format!(
                    "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
                     /Resources << /Font << /F1 3 0 R >>{xobject} >> /Contents {content_id} 0 R >>"
                )
                .into_bytes(),
            );
            objects.push(stream("", page_content(page).as_bytes()));
            if let Some(image) = &page.image {
                let dict = format!(
                    "/Type /XObject /Subtype /Image /Width {} /Height {} \
                     /ColorSpace /DeviceRGB /BitsPerComponent 8",
                    image.width(),
                    image.height()
                );
                objects.push(stream(&dict, image.as_raw()));
            }
            kids.push(format!("{page_id} 0 R"));
        }
        objects[1] = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            kids.len()
        )
        .into_bytes();

        let mut out = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n".to_vec();
        let mut offsets = Vec::with_capacity(objects.len());
        for (index, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n", index + 1).as_bytes());
            out.extend_from_slice(body);
            out.extend_from_slice(b"\nendobj\n");
        }
        let xref_at = out.len();
        out.extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes());
        for offset in offsets {
            out.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
        }
        out.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
                objects.len() + 1
            )
            .as_bytes(),
        );
        out
    }
}

fn stream(dict: &str, data: &[u8]) -> Vec<u8> {
    let separator = if dict.is_empty() { "" } else { " " };
    let mut body = format!("<< {dict}{separator}/Length {} >>\nstream\n", data.len()).into_bytes();
    body.extend_from_slice(data);
    body.extend_from_slice(b"\nendstream");
    body
}

fn image_height(image: &RgbImage) -> f64 {
    IMAGE_WIDTH_PT * f64::from(image.height()) / f64::from(image.width().max(1))
}

/// Baseline of the first text line below the title and picture.
fn text_top(image: Option<&RgbImage>) -> f64 {
    let below_title = PAGE_HEIGHT - MARGIN - TITLE_SIZE - 12.0;
    match image {
        Some(image) => below_title - image_height(image) - 20.0,
        None => below_title,
    }
}

fn lines_that_fit(top: f64) -> usize {
    if top < MARGIN {
        return 0;
    }
    ((top - MARGIN) / LEADING) as usize + 1
}

fn page_content(page: &PdfPage) -> String {
    let title_y = PAGE_HEIGHT - MARGIN;
    let mut ops = format!(
        "BT /F1 {TITLE_SIZE} Tf {MARGIN} {title_y:.2} Td ({}) Tj ET\n",
        escape_text(&page.title)
    );

    if let Some(image) = &page.image {
        let height = image_height(image);
        let image_y = title_y - TITLE_SIZE - 12.0 - height;
        ops.push_str(&format!(
            "q {IMAGE_WIDTH_PT} 0 0 {height:.2} {MARGIN} {image_y:.2} cm /Im1 Do Q\n"
        ));
    }

    let y = text_top(page.image.as_ref());
    if !page.lines.is_empty() {
        ops.push_str(&format!("BT /F1 {TEXT_SIZE} Tf {LEADING} TL {MARGIN} {y:.2} Td\n"));
        for line in &page.lines {
            ops.push_str(&format!("({}) Tj T*\n", escape_text(line)));
        }
        ops.push_str("ET\n");
    }
    ops
}

/// Literal-string escaping; anything outside printable ASCII becomes `?`.
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '(' | ')' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}
