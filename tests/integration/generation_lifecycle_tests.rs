/*!
 * Integration tests for the single generation slot and its interplay with reset
 */

use std::sync::Arc;

use dictsheet::app_controller::NoticeLevel;
use dictsheet::generation::GenerationGateway;
use dictsheet::providers::mock::MockProvider;
use dictsheet::Controller;

use crate::common::{self, MemorySink};

#[test]
fn test_beginGeneration_whileBusy_shouldRefuse() {
    let sink = MemorySink::new();
    let mut controller = common::test_controller(&MockProvider::working(), &sink);

    let ticket = controller.begin_generation().unwrap();
    assert!(controller.is_busy());

    let refused = controller.begin_generation().unwrap_err();
    assert_eq!(refused.level, NoticeLevel::Info);

    controller.finish_generation(ticket, Ok(vec!["a".to_string()]));
    assert!(!controller.is_busy());
    assert!(controller.begin_generation().is_ok());
}

#[tokio::test]
async fn test_resultArrivingAfterReset_shouldBeDiscarded() {
    let provider = MockProvider::working();
    let sink = MemorySink::new();
    let mut controller = common::test_controller(&provider, &sink);
    controller.add_manual("a\nb");

    let ticket = controller.begin_generation().unwrap();
    let result = controller.gateway().submit(controller.form()).await;
    let notice = controller.reset();
    assert_eq!(notice.title, "초기화 완료");

    let outcome = controller.finish_generation(ticket, result);

    assert!(outcome.is_none());
    assert!(controller.store().is_empty());
    assert!(!controller.is_busy());
    assert_eq!(provider.request_count(), 1);
}

#[tokio::test]
async fn test_spawnedGeneration_shouldDeliverThroughChannel() {
    let provider = MockProvider::slow(20);
    let sink = MemorySink::new();
    let config = common::test_config();
    let gateway = GenerationGateway::with_provider(Arc::new(provider.clone()), &config.generation);
    let mut controller = Controller::with_parts(config, gateway, common::test_exporter(&sink));
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

    let ticket = controller.begin_generation().unwrap();
    let gateway = controller.gateway().clone();
    let form = controller.form().clone();
    tokio::spawn(async move {
        let result = gateway.submit(&form).await;
        let _ = tx.send((ticket, result));
    });

    // The session stays usable while the request is in flight
    controller.add_manual("먼저 쓴 문장.");
    assert!(controller.begin_generation().is_err());

    let (ticket, result) = rx.recv().await.unwrap();
    let notice = controller.finish_generation(ticket, result).unwrap();

    assert_eq!(notice.level, NoticeLevel::Success);
    assert_eq!(controller.store().len(), 6);
    assert_eq!(controller.sentences()[0], "먼저 쓴 문장.");
    assert_eq!(controller.pages().len(), 1);
}

#[tokio::test]
async fn test_reset_shouldRestoreFormAndBindPlaceholder() {
    let sink = MemorySink::new();
    let mut controller = common::test_controller(&MockProvider::working(), &sink);
    controller.form_mut().number_of_sentences = 13;
    controller.generate().await.unwrap();
    assert_eq!(controller.exporter().bound_pages(), vec![1, 2, 3]);

    controller.reset();

    assert_eq!(controller.form().number_of_sentences, 5);
    assert_eq!(controller.exporter().bound_pages(), vec![1]);
    assert_eq!(controller.exporter().handle(1).unwrap().total_pages, 1);
    assert!(controller.pages().is_empty());
}

#[tokio::test]
async fn test_generationAfterReset_shouldBeAppliedNormally() {
    let provider = MockProvider::fixed(["새 문장."]);
    let sink = MemorySink::new();
    let mut controller = common::test_controller(&provider, &sink);
    controller.add_manual("old");
    controller.reset();

    let notice = controller.generate().await.unwrap();

    assert_eq!(notice.level, NoticeLevel::Success);
    assert_eq!(controller.sentences(), ["새 문장.".to_string()]);
}

#[test]
fn test_resetOnEmptySession_shouldStillNotify() {
    let sink = MemorySink::new();
    let mut controller = common::test_controller(&MockProvider::working(), &sink);

    let notice = controller.reset();

    assert_eq!(notice.description, "새로운 학습지 만들기를 시작합니다.");
    assert_eq!(controller.exporter().bound_pages(), vec![1]);
}
