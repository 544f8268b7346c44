/*!
 * Tests for page rendering and export
 */

use image::ImageFormat;

use dictsheet::errors::ExportError;
use dictsheet::paginator::{paginate, Page, PAGE_SIZE};
use dictsheet::worksheet::{
    encode_png, file_name_for, DirectorySink, PageHandle, WorksheetExporter, WorksheetRenderer, EMPTY_STATE_LINES,
};

use crate::common::{self, MemorySink, PNG_SIGNATURE};

fn renderer() -> WorksheetRenderer {
    WorksheetRenderer::new(&common::fast_worksheet_config())
}

#[test]
fn test_markup_withSentences_shouldNumberFromStartingIndex() {
    let sentences = common::numbered_sentences(8);
    let pages = paginate(&sentences, PAGE_SIZE);

    let markup = renderer().markup(&pages[1]);

    assert!(markup.contains(">7.</text>"));
    assert!(markup.contains(">8.</text>"));
    assert!(!markup.contains(">1.</text>"));
    assert!(markup.contains("문장 7."));
    assert!(markup.contains(">2 / 2</text>"));
}

#[test]
fn test_markup_withSinglePage_shouldOmitPageMarker() {
    let sentences = common::numbered_sentences(3);
    let pages = paginate(&sentences, PAGE_SIZE);

    let markup = renderer().markup(&pages[0]);

    assert!(!markup.contains(" / "));
    assert!(markup.contains("받아쓰기 시험"));
    assert!(markup.contains("이름:"));
}

#[test]
fn test_markup_withEmptyPage_shouldShowPlaceholder() {
    let page = Page {
        page_number: 1,
        total_pages: 1,
        starting_index: 0,
        sentences: &[],
    };

    let markup = renderer().markup(&page);

    for line in EMPTY_STATE_LINES {
        assert!(markup.contains(line));
    }
}

#[test]
fn test_markup_withMarkupCharacters_shouldEscapeThem() {
    let sentences = vec!["<b>\"A & B\"</b>".to_string()];
    let pages = paginate(&sentences, PAGE_SIZE);

    let markup = renderer().markup(&pages[0]);

    assert!(markup.contains("&lt;b&gt;&quot;A &amp; B&quot;&lt;/b&gt;"));
    assert!(!markup.contains("<b>"));
}

#[test]
fn test_rasterize_shouldProduceImageAtPixelRatio() {
    let renderer = renderer();
    let sentences = common::numbered_sentences(2);
    let pages = paginate(&sentences, PAGE_SIZE);

    let image = renderer.rasterize(&renderer.markup(&pages[0])).unwrap();

    assert_eq!((image.width(), image.height()), renderer.raster_size());
    assert_eq!(renderer.raster_size(), (149, 211));
    // Background is opaque white
    assert_eq!(image.get_pixel(0, 0).0, [255, 255, 255, 255]);
}

#[test]
fn test_rasterize_withInvalidMarkup_shouldReturnRenderError() {
    let result = renderer().rasterize("<svg");
    assert!(matches!(result, Err(ExportError::Render(_))));
}

#[test]
fn test_encodePng_shouldWritePngSignature() {
    let renderer = renderer();
    let sentences = common::numbered_sentences(1);
    let pages = paginate(&sentences, PAGE_SIZE);
    let image = renderer.rasterize(&renderer.markup(&pages[0])).unwrap();

    let bytes = encode_png(&image).unwrap();

    assert_eq!(&bytes[..8], &PNG_SIGNATURE);
    assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Png);
}

#[test]
fn test_pageHandle_fileName_shouldFollowPageCount() {
    let single = PageHandle::new(1, 1, "<svg/>".to_string());
    let multi = PageHandle::new(3, 4, "<svg/>".to_string());

    assert_eq!(single.file_name("dictation-worksheet"), "dictation-worksheet.png");
    assert_eq!(multi.file_name("dictation-worksheet"), "dictation-worksheet-page-3.png");
    assert_eq!(file_name_for("sheet", 1, 2), "sheet-page-1.png");
    assert_eq!(single.fingerprint, multi.fingerprint);
}

#[test]
fn test_sync_withNoPages_shouldBindPlaceholder() {
    let sink = MemorySink::new();
    let mut exporter = common::test_exporter(&sink);

    exporter.sync(&[]);

    assert_eq!(exporter.bound_pages(), vec![1]);
    let handle = exporter.handle(1).unwrap();
    assert_eq!(handle.total_pages, 1);
    assert!(handle.markup.contains(EMPTY_STATE_LINES[0]));
}

#[test]
fn test_sync_whenPageCountShrinks_shouldRemoveStaleHandles() {
    let sink = MemorySink::new();
    let mut exporter = common::test_exporter(&sink);
    let thirteen = common::numbered_sentences(13);
    exporter.sync(&paginate(&thirteen, PAGE_SIZE));
    assert_eq!(exporter.bound_pages(), vec![1, 2, 3]);

    let five = common::numbered_sentences(5);
    exporter.sync(&paginate(&five, PAGE_SIZE));

    assert_eq!(exporter.bound_pages(), vec![1]);
    assert!(exporter.handle(3).is_none());
    assert!(matches!(exporter.export(3), Err(ExportError::HandleUnavailable(3))));
}

#[test]
fn test_sync_withUnchangedPages_shouldNotRebind() {
    let sink = MemorySink::new();
    let mut exporter = common::test_exporter(&sink);
    let sentences = common::numbered_sentences(7);
    let pages = paginate(&sentences, PAGE_SIZE);

    assert_eq!(exporter.sync(&pages), 2);
    assert_eq!(exporter.sync(&pages), 0);
}

#[test]
fn test_invalidateAll_shouldDropEveryHandle() {
    let sink = MemorySink::new();
    let mut exporter = common::test_exporter(&sink);
    let sentences = common::numbered_sentences(7);
    exporter.sync(&paginate(&sentences, PAGE_SIZE));

    exporter.invalidate_all();

    assert_eq!(exporter.handle_count(), 0);
    assert!(matches!(exporter.export(1), Err(ExportError::HandleUnavailable(1))));
    assert!(sink.saved().is_empty());
}

#[test]
fn test_export_withBoundPage_shouldSaveNamedPng() {
    let sink = MemorySink::new();
    let mut exporter = common::test_exporter(&sink);
    let sentences = common::numbered_sentences(7);
    exporter.sync(&paginate(&sentences, PAGE_SIZE));

    let path = exporter.export(2).unwrap();

    assert!(path.ends_with("dictation-worksheet-page-2.png"));
    let saved = sink.saved();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].0, "dictation-worksheet-page-2.png");
    assert_eq!(&saved[0].1[..8], &PNG_SIGNATURE);
}

#[test]
fn test_export_twice_shouldProduceIdenticalBytes() {
    let sink = MemorySink::new();
    let mut exporter = common::test_exporter(&sink);
    let sentences = common::numbered_sentences(3);
    exporter.sync(&paginate(&sentences, PAGE_SIZE));

    exporter.export(1).unwrap();
    exporter.export(1).unwrap();

    let saved = sink.saved();
    assert_eq!(saved[0].0, "dictation-worksheet.png");
    assert_eq!(saved[0], saved[1]);
}

#[test]
fn test_export_withFailingSink_shouldReportSaveErrorAndKeepHandles() {
    let sink = MemorySink::failing();
    let mut exporter = common::test_exporter(&sink);
    let sentences = common::numbered_sentences(3);
    exporter.sync(&paginate(&sentences, PAGE_SIZE));

    let err = exporter.export(1).unwrap_err();

    match err {
        ExportError::Save { file_name, message } => {
            assert_eq!(file_name, "dictation-worksheet.png");
            assert!(message.contains("disk full"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(exporter.handle_count(), 1);
}

#[test]
fn test_directorySink_shouldWriteFileIntoDirectory() {
    let temp_dir = common::create_temp_dir().unwrap();
    let out_dir = temp_dir.path().join("exports");
    let mut exporter = WorksheetExporter::with_sink(
        &common::fast_worksheet_config(),
        Box::new(DirectorySink::new(&out_dir)),
    );
    exporter.sync(&[]);

    let path = exporter.export(1).unwrap();

    assert_eq!(path, out_dir.join("dictation-worksheet.png"));
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[..8], &PNG_SIGNATURE);
}
