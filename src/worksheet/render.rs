/*!
 * Worksheet page rendering.
 *
 * A page is laid out as SVG markup on an A4 canvas and rasterized with
 * resvg. The markup is the page's visual handle: the exporter keeps it per
 * page and turns it into pixels only when an export is requested.
 */

use image::RgbaImage;
use log::debug;
use resvg::tiny_skia::{self, Color, Pixmap};
use resvg::usvg::{Options, Tree};
use quick_xml::escape::escape;
use std::fmt;

use crate::app_config::WorksheetConfig;
use crate::errors::ExportError;
use crate::paginator::Page;

/// A4 portrait width in layout units
pub const PAGE_WIDTH: f32 = 595.0;
/// A4 portrait height in layout units
pub const PAGE_HEIGHT: f32 = 842.0;

/// Shown on the page when no sentence has been added yet
pub const EMPTY_STATE_LINES: [&str; 2] = ["왼쪽에서 문장을 추가하면", "여기에 표시됩니다!"];

const MARGIN: f32 = 32.0;
const RULE_SPACING: f32 = 40.0;
const HEADER_RULE_Y: f32 = 168.0;
const FIRST_SENTENCE_Y: f32 = 226.0;
const SENTENCE_SPACING: f32 = 96.0;

const TEXT_COLOR: &str = "#1f2937";
const MUTED_COLOR: &str = "#6b7280";
const PRIMARY_COLOR: &str = "#7c9fd6";
const RULE_COLOR: &str = "#e5e7eb";

const PENCIL_ORNAMENT: &str = r##"<g transform="translate(499 746) scale(0.8) rotate(30 50 50)" opacity="0.7">
<path d="M85,35 L65,15 L25,55 L15,85 L45,75 Z" fill="#FFDDC1" stroke="#E6BFB3" stroke-width="2"/>
<path d="M65,15 L70,20 L30,60 L25,55 Z" fill="#F4C2C2" stroke="#E6BFB3" stroke-width="2"/>
<path d="M65,15 L60,10 L55,15 L60,20 Z" fill="#333333"/>
<circle cx="30" cy="70" r="3" fill="#60A5FA"/>
<path d="M20,80 Q 25 70, 35 75" stroke="#60A5FA" stroke-width="2" fill="none"/>
</g>"##;

/// Lays out worksheet pages and turns them into pixels
pub struct WorksheetRenderer {
    title: String,
    font_family: String,
    pixel_ratio: f32,
    options: Options<'static>,
}

impl fmt::Debug for WorksheetRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorksheetRenderer")
            .field("title", &self.title)
            .field("font_family", &self.font_family)
            .field("pixel_ratio", &self.pixel_ratio)
            .field("fonts", &self.options.fontdb.len())
            .finish()
    }
}

impl WorksheetRenderer {
    /// Create a renderer and load the fonts the configuration asks for
    pub fn new(config: &WorksheetConfig) -> Self {
        let mut options = Options {
            font_family: config.font_family.clone(),
            ..Options::default()
        };

        if let Some(font_path) = &config.font_path {
            if let Err(e) = options.fontdb_mut().load_font_file(font_path) {
                log::warn!("Could not load font {:?}: {}", font_path, e);
            }
        }
        if config.load_system_fonts {
            options.fontdb_mut().load_system_fonts();
        }
        debug!("Worksheet renderer ready with {} font faces", options.fontdb.len());

        Self {
            title: config.title.clone(),
            font_family: config.font_family.clone(),
            pixel_ratio: config.pixel_ratio,
            options,
        }
    }

    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    /// Size in pixels of a rasterized page
    pub fn raster_size(&self) -> (u32, u32) {
        (
            (PAGE_WIDTH * self.pixel_ratio).round() as u32,
            (PAGE_HEIGHT * self.pixel_ratio).round() as u32,
        )
    }

    /// Lay out one page as SVG markup
    pub fn markup(&self, page: &Page<'_>) -> String {
        let family = format!("{}, sans-serif", self.font_family);
        let mut svg = String::with_capacity(4096);

        svg.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="{family}">"#,
            w = PAGE_WIDTH,
            h = PAGE_HEIGHT,
            family = escape(&family),
        ));
        svg.push_str(&format!(
            r##"<rect width="{}" height="{}" fill="#ffffff"/>"##,
            PAGE_WIDTH, PAGE_HEIGHT
        ));

        let mut y = RULE_SPACING;
        while y < PAGE_HEIGHT {
            svg.push_str(&format!(
                r#"<line x1="0" y1="{y}" x2="{w}" y2="{y}" stroke="{c}" stroke-width="1"/>"#,
                w = PAGE_WIDTH,
                c = RULE_COLOR,
            ));
            y += RULE_SPACING;
        }

        svg.push_str(&self.header(page));
        svg.push_str(&self.sentences(page));

        svg.push_str(PENCIL_ORNAMENT);
        svg.push_str("</svg>");
        svg
    }

    fn header(&self, page: &Page<'_>) -> String {
        let center = PAGE_WIDTH / 2.0;
        let mut header = format!(
            r#"<text x="{center}" y="78" text-anchor="middle" font-size="28" font-weight="bold" fill="{c}">{title}</text>"#,
            c = PRIMARY_COLOR,
            title = escape(&self.title),
        );

        // Label, x position and blank width
        let blanks = [("학년:", 90.0, 48.0), ("반:", 250.0, 48.0), ("이름:", 390.0, 96.0)];
        for (label, x, width) in blanks {
            let line_start = x + 10.0 + 17.0 * label.chars().count() as f32;
            header.push_str(&format!(
                r#"<text x="{x}" y="124" font-size="17" fill="{c}">{label}</text>"#,
                c = TEXT_COLOR,
            ));
            header.push_str(&format!(
                r##"<line x1="{line_start}" y1="126" x2="{end}" y2="126" stroke="#9ca3af" stroke-width="1"/>"##,
                end = line_start + width,
            ));
        }

        if page.total_pages > 1 {
            header.push_str(&format!(
                r#"<text x="{center}" y="150" text-anchor="middle" font-size="11" fill="{c}">{n} / {total}</text>"#,
                c = MUTED_COLOR,
                n = page.page_number,
                total = page.total_pages,
            ));
        }

        header.push_str(&format!(
            r#"<line x1="{MARGIN}" y1="{HEADER_RULE_Y}" x2="{end}" y2="{HEADER_RULE_Y}" stroke="{c}" stroke-opacity="0.5" stroke-width="2" stroke-dasharray="6 4"/>"#,
            end = PAGE_WIDTH - MARGIN,
            c = PRIMARY_COLOR,
        ));
        header
    }

    fn sentences(&self, page: &Page<'_>) -> String {
        if page.is_empty() {
            let center = PAGE_WIDTH / 2.0;
            return EMPTY_STATE_LINES
                .iter()
                .enumerate()
                .map(|(i, line)| {
                    format!(
                        r#"<text x="{center}" y="{y}" text-anchor="middle" font-size="17" fill="{c}">{line}</text>"#,
                        y = 360.0 + 26.0 * i as f32,
                        c = MUTED_COLOR,
                    )
                })
                .collect();
        }

        page.numbered()
            .enumerate()
            .map(|(i, (number, sentence))| {
                let y = FIRST_SENTENCE_Y + SENTENCE_SPACING * i as f32;
                format!(
                    r#"<text x="{nx}" y="{y}" font-size="20" font-weight="bold" fill="{c}">{number}.</text><text x="{tx}" y="{y}" font-size="20" fill="{c}" xml:space="preserve">{text}</text>"#,
                    nx = MARGIN + 8.0,
                    tx = MARGIN + 48.0,
                    c = TEXT_COLOR,
                    text = escape(sentence),
                )
            })
            .collect()
    }

    /// Rasterize markup at the configured pixel ratio onto a white canvas
    pub fn rasterize(&self, markup: &str) -> Result<RgbaImage, ExportError> {
        let tree = Tree::from_str(markup, &self.options).map_err(|e| ExportError::Render(e.to_string()))?;

        let (width, height) = self.raster_size();
        let mut pixmap = Pixmap::new(width, height)
            .ok_or_else(|| ExportError::Render(format!("cannot allocate a {}x{} canvas", width, height)))?;
        pixmap.fill(Color::WHITE);

        let transform = tiny_skia::Transform::from_scale(self.pixel_ratio, self.pixel_ratio);
        resvg::render(&tree, transform, &mut pixmap.as_mut());

        RgbaImage::from_raw(width, height, pixmap.take())
            .ok_or_else(|| ExportError::Render("pixel buffer size mismatch".to_string()))
    }
}
