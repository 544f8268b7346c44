/*!
 * Worksheet rendering and export.
 *
 * - `render`: page layout as SVG markup and rasterization
 * - `export`: page handle registry, filenames, PNG encoding, artifact sinks
 */

pub mod export;
pub mod render;

pub use export::{encode_png, file_name_for, ArtifactSink, DirectorySink, PageHandle, WorksheetExporter};
pub use render::{WorksheetRenderer, EMPTY_STATE_LINES, PAGE_HEIGHT, PAGE_WIDTH};
