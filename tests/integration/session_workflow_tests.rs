/*!
 * End-to-end tests of a worksheet session: collecting, editing, paginating and exporting
 */

use dictsheet::app_controller::NoticeLevel;
use dictsheet::errors::StoreError;
use dictsheet::generation::GenerationFailure;
use dictsheet::providers::mock::MockProvider;

use crate::common::{self, MemorySink, PNG_SIGNATURE};

#[tokio::test]
async fn test_generateThenManual_shouldAppendInSourceOrderAcrossTwoPages() {
    let provider = MockProvider::working();
    let sink = MemorySink::new();
    let mut controller = common::test_controller(&provider, &sink);

    let notice = controller.generate().await.unwrap();
    assert_eq!(notice.level, NoticeLevel::Success);
    assert_eq!(notice.title, "성공!");
    assert_eq!(controller.store().len(), 5);

    controller.add_manual("여섯째 문장.\n일곱째 문장.");

    let pages = controller.pages();
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].len(), 6);
    assert_eq!(pages[1].sentences, ["일곱째 문장.".to_string()]);
    assert_eq!(pages[1].display_number(0), 7);
    assert_eq!(controller.exporter().bound_pages(), vec![1, 2]);
}

#[tokio::test]
async fn test_invalidCount_shouldNotifyWithoutProviderCallOrStoreChange() {
    let provider = MockProvider::working();
    let sink = MemorySink::new();
    let mut controller = common::test_controller(&provider, &sink);
    controller.add_manual("기존 문장.");
    controller.form_mut().number_of_sentences = 25;

    let notice = controller.generate().await.unwrap();

    assert_eq!(notice.level, NoticeLevel::Error);
    assert_eq!(notice.title, "오류 발생");
    assert!(notice.description.starts_with(GenerationFailure::VALIDATION_MESSAGE));
    assert_eq!(provider.request_count(), 0);
    assert_eq!(controller.sentences(), ["기존 문장.".to_string()]);
    assert!(!controller.is_busy());
}

#[tokio::test]
async fn test_providerFailure_shouldLeaveStoreUntouched() {
    let provider = MockProvider::failing();
    let sink = MemorySink::new();
    let mut controller = common::test_controller(&provider, &sink);
    controller.add_manual("a\nb");
    let revision = controller.store().revision();

    let notice = controller.generate().await.unwrap();

    assert!(notice.is_error());
    assert_eq!(notice.description, GenerationFailure::GENERATION_MESSAGE);
    assert_eq!(controller.store().revision(), revision);
    assert_eq!(controller.store().len(), 2);
}

#[test]
fn test_deleteSecondOfFive_shouldRenumberFollowingSentences() {
    let sink = MemorySink::new();
    let mut controller = common::test_controller(&MockProvider::working(), &sink);
    controller.add_generated(vec![
        "s1".to_string(),
        "s2".to_string(),
        "s3".to_string(),
        "s4".to_string(),
        "s5".to_string(),
    ]);

    let removed = controller.delete(1).unwrap();

    assert_eq!(removed, "s2");
    let pages = controller.pages();
    let numbered: Vec<(usize, &str)> = pages[0].numbered().collect();
    assert_eq!(numbered, vec![(1, "s1"), (2, "s3"), (3, "s4"), (4, "s5")]);
}

#[test]
fn test_manualBlock_withBlankLines_shouldAddThreeSentences() {
    let sink = MemorySink::new();
    let mut controller = common::test_controller(&MockProvider::working(), &sink);

    let added = controller.add_manual("a\n\nb\n  \nc");

    assert_eq!(added, 3);
    assert_eq!(controller.sentences(), ["a", "b", "c"].map(String::from));
}

#[test]
fn test_editOutOfRange_shouldFailWithoutChanges() {
    let sink = MemorySink::new();
    let mut controller = common::test_controller(&MockProvider::working(), &sink);
    controller.add_manual("a");

    assert_eq!(
        controller.edit(5, "x"),
        Err(StoreError::OutOfRange { position: 5, len: 1 })
    );
    assert!(controller.delete(1).is_err());
    assert_eq!(controller.sentences(), ["a".to_string()]);
}

#[test]
fn test_editSentence_shouldRebindOnlyItsPage() {
    let sink = MemorySink::new();
    let mut controller = common::test_controller(&MockProvider::working(), &sink);
    controller.add_generated(common::numbered_sentences(8));
    let first = controller.exporter().handle(1).unwrap().fingerprint.clone();
    let second = controller.exporter().handle(2).unwrap().fingerprint.clone();

    controller.edit(7, "고친 문장.").unwrap();

    assert_eq!(controller.exporter().handle(1).unwrap().fingerprint, first);
    assert_ne!(controller.exporter().handle(2).unwrap().fingerprint, second);
    assert!(controller.exporter().handle(2).unwrap().markup.contains("고친 문장."));
}

#[test]
fn test_emptySession_shouldExportPlaceholderPage() {
    let sink = MemorySink::new();
    let controller = common::test_controller(&MockProvider::working(), &sink);

    assert!(controller.pages().is_empty());
    assert_eq!(controller.page_count(), 1);

    let path = controller.export_page(1).unwrap();

    assert!(path.ends_with("dictation-worksheet.png"));
    assert_eq!(sink.file_names(), vec!["dictation-worksheet.png"]);
}

#[test]
fn test_exportAll_withThirteenSentences_shouldSaveThreeDistinctFiles() {
    let sink = MemorySink::new();
    let mut controller = common::test_controller(&MockProvider::working(), &sink);
    controller.add_generated(common::numbered_sentences(13));

    let results = controller.export_all();

    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|(_, r)| r.is_ok()));
    assert_eq!(
        sink.file_names(),
        vec![
            "dictation-worksheet-page-1.png",
            "dictation-worksheet-page-2.png",
            "dictation-worksheet-page-3.png",
        ]
    );
    assert!(sink.saved().iter().all(|(_, bytes)| bytes[..8] == PNG_SIGNATURE));
}

#[test]
fn test_exportMissingPage_shouldNotifyAndKeepState() {
    let sink = MemorySink::new();
    let mut controller = common::test_controller(&MockProvider::working(), &sink);
    controller.add_manual("a\nb");
    let revision = controller.store().revision();

    let notice = controller.export_page(4).unwrap_err();

    assert_eq!(notice.title, "이미지 다운로드 오류");
    assert_eq!(notice.description, "이미지를 다운로드하는 중 오류가 발생했습니다.");
    assert_eq!(controller.store().revision(), revision);
    assert!(sink.saved().is_empty());
    assert!(controller.export_page(1).is_ok());
}

#[test]
fn test_exportWithFailingSink_shouldNotify() {
    let sink = MemorySink::failing();
    let mut controller = common::test_controller(&MockProvider::working(), &sink);
    controller.add_manual("a");

    let results = controller.export_all();

    assert_eq!(results.len(), 1);
    assert!(results[0].1.as_ref().unwrap_err().is_error());
    assert_eq!(controller.store().len(), 1);
}

#[test]
fn test_pageShrink_shouldDropHandlesPastLastPage() {
    let sink = MemorySink::new();
    let mut controller = common::test_controller(&MockProvider::working(), &sink);
    controller.add_generated(common::numbered_sentences(7));
    assert_eq!(controller.exporter().bound_pages(), vec![1, 2]);

    controller.delete(6).unwrap();

    assert_eq!(controller.exporter().bound_pages(), vec![1]);
    assert!(controller.export_page(2).is_err());
    // The single remaining page drops its page marker and suffix
    assert!(!controller.exporter().handle(1).unwrap().markup.contains("1 / 2"));
    assert!(controller.export_page(1).unwrap().ends_with("dictation-worksheet.png"));
}

#[test]
fn test_manualFile_shouldLoadThroughFileManager() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(temp_dir.path(), "words.txt", "나무\n\n하늘\n").unwrap();
    let sink = MemorySink::new();
    let mut controller = common::test_controller(&MockProvider::working(), &sink);

    let text = dictsheet::file_utils::FileManager::read_to_string(&path).unwrap();
    controller.add_manual(&text);

    assert_eq!(controller.sentences(), ["나무", "하늘"].map(String::from));
}
