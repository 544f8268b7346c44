/*!
 * Worksheet export.
 *
 * Keeps one rendered handle per page, keyed by page number, and turns a
 * handle into a PNG handed to an `ArtifactSink`. Export never touches the
 * sentence list; a failed export leaves every handle in place.
 */

use anyhow::Result;
use image::{ImageFormat, RgbaImage};
use log::{debug, info};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::io::Cursor;
use std::path::PathBuf;

use super::render::WorksheetRenderer;
use crate::app_config::WorksheetConfig;
use crate::errors::ExportError;
use crate::file_utils::FileManager;
use crate::paginator::Page;

/// Filename for one exported page.
///
/// A single-page worksheet gets the bare base name; otherwise the 1-based
/// page number is embedded so pages never overwrite each other.
pub fn file_name_for(base_name: &str, page_number: usize, total_pages: usize) -> String {
    if total_pages <= 1 {
        format!("{}.png", base_name)
    } else {
        format!("{}-page-{}.png", base_name, page_number)
    }
}

/// Encode a raster as PNG bytes
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    let mut cursor = Cursor::new(Vec::new());
    image
        .write_to(&mut cursor, ImageFormat::Png)
        .map_err(|e| ExportError::Encode(e.to_string()))?;
    Ok(cursor.into_inner())
}

/// SHA-256 of the markup, hex encoded
fn fingerprint(markup: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(markup.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Rendered visual handle bound to one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageHandle {
    /// 1-based page number
    pub page_number: usize,
    /// Page count at the time the handle was bound
    pub total_pages: usize,
    /// SVG markup of the page
    pub markup: String,
    /// Hex SHA-256 of `markup`
    pub fingerprint: String,
}

impl PageHandle {
    pub fn new(page_number: usize, total_pages: usize, markup: String) -> Self {
        Self {
            page_number,
            total_pages,
            fingerprint: fingerprint(&markup),
            markup,
        }
    }

    /// Export filename for this page
    pub fn file_name(&self, base_name: &str) -> String {
        file_name_for(base_name, self.page_number, self.total_pages)
    }
}

/// The host's file-save mechanism
pub trait ArtifactSink: Send + Sync + fmt::Debug {
    /// Store `bytes` under `file_name`, returning where they ended up
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf>;
}

/// Saves artifacts as files in one directory
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }
}

impl ArtifactSink for DirectorySink {
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = FileManager::output_path(&self.dir, file_name);
        FileManager::write_bytes(&path, bytes)?;
        Ok(path)
    }
}

/// Page handle registry plus the render/encode/save pipeline
#[derive(Debug)]
pub struct WorksheetExporter {
    renderer: WorksheetRenderer,
    base_file_name: String,
    handles: BTreeMap<usize, PageHandle>,
    sink: Box<dyn ArtifactSink>,
}

impl WorksheetExporter {
    pub fn new(renderer: WorksheetRenderer, base_file_name: impl Into<String>, sink: Box<dyn ArtifactSink>) -> Self {
        Self {
            renderer,
            base_file_name: base_file_name.into(),
            handles: BTreeMap::new(),
            sink,
        }
    }

    /// Build an exporter saving into the configured output directory
    pub fn from_config(config: &WorksheetConfig) -> Self {
        Self::new(
            WorksheetRenderer::new(config),
            config.base_file_name.clone(),
            Box::new(DirectorySink::new(config.resolved_output_dir())),
        )
    }

    /// Same configuration, different sink
    pub fn with_sink(config: &WorksheetConfig, sink: Box<dyn ArtifactSink>) -> Self {
        Self::new(WorksheetRenderer::new(config), config.base_file_name.clone(), sink)
    }

    pub fn renderer(&self) -> &WorksheetRenderer {
        &self.renderer
    }

    pub fn base_file_name(&self) -> &str {
        &self.base_file_name
    }

    /// Bind a handle for `page`; returns false when the bound handle was already current
    pub fn bind(&mut self, page: &Page<'_>) -> bool {
        let handle = PageHandle::new(page.page_number, page.total_pages, self.renderer.markup(page));
        match self.handles.get(&page.page_number) {
            Some(existing) if existing.fingerprint == handle.fingerprint => false,
            _ => {
                debug!("Bound handle for page {}/{}", page.page_number, page.total_pages);
                self.handles.insert(page.page_number, handle);
                true
            }
        }
    }

    /// Bring the handle map in line with the current pages.
    ///
    /// With no pages a single empty page 1 of 1 is bound. Handles past the
    /// last page are removed. Returns how many handles were (re)bound.
    pub fn sync(&mut self, pages: &[Page<'_>]) -> usize {
        let placeholder = [Page {
            page_number: 1,
            total_pages: 1,
            starting_index: 0,
            sentences: &[],
        }];
        let pages = if pages.is_empty() { &placeholder[..] } else { pages };

        let rebound = pages.iter().filter(|page| self.bind(page)).count();

        let last_page = pages.len();
        let before = self.handles.len();
        self.handles.retain(|&page_number, _| page_number <= last_page);
        let removed = before - self.handles.len();
        if removed > 0 {
            debug!("Removed {} handles past page {}", removed, last_page);
        }

        rebound
    }

    /// Drop every handle
    pub fn invalidate_all(&mut self) {
        if !self.handles.is_empty() {
            debug!("Invalidated {} page handles", self.handles.len());
            self.handles.clear();
        }
    }

    pub fn handle(&self, page_number: usize) -> Option<&PageHandle> {
        self.handles.get(&page_number)
    }

    /// Page numbers with a bound handle, ascending
    pub fn bound_pages(&self) -> Vec<usize> {
        self.handles.keys().copied().collect()
    }

    pub fn handle_count(&self) -> usize {
        self.handles.len()
    }

    /// Render and encode a bound page without saving it
    pub fn render_png(&self, page_number: usize) -> Result<Vec<u8>, ExportError> {
        let handle = self
            .handles
            .get(&page_number)
            .ok_or(ExportError::HandleUnavailable(page_number))?;
        self.encode_handle(handle)
    }

    fn encode_handle(&self, handle: &PageHandle) -> Result<Vec<u8>, ExportError> {
        let image = self.renderer.rasterize(&handle.markup)?;
        encode_png(&image)
    }

    /// Export a bound page as a PNG through the sink
    pub fn export(&self, page_number: usize) -> Result<PathBuf, ExportError> {
        let handle = self
            .handles
            .get(&page_number)
            .ok_or(ExportError::HandleUnavailable(page_number))?;
        self.export_handle(handle)
    }

    /// Export a specific handle
    pub fn export_handle(&self, handle: &PageHandle) -> Result<PathBuf, ExportError> {
        let bytes = self.encode_handle(handle)?;
        let file_name = handle.file_name(&self.base_file_name);

        let path = self.sink.save(&file_name, &bytes).map_err(|e| ExportError::Save {
            file_name: file_name.clone(),
            message: format!("{:#}", e),
        })?;

        info!("Exported page {} to {:?} ({} bytes)", handle.page_number, path, bytes.len());
        Ok(path)
    }
}
