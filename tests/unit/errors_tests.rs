/*!
 * Tests for error types
 */

use dictsheet::errors::{AppError, ExportError, ProviderError, StoreError, ValidationError};
use dictsheet::generation::{FailureKind, GenerationFailure};

#[test]
fn test_providerError_fromStatus_shouldPickVariant() {
    assert!(matches!(
        ProviderError::from_status(401, "no".to_string()),
        ProviderError::AuthenticationError(_)
    ));
    assert!(matches!(
        ProviderError::from_status(429, "slow down".to_string()),
        ProviderError::RateLimitExceeded(_)
    ));
    assert!(matches!(
        ProviderError::from_status(500, "oops".to_string()),
        ProviderError::ApiError { status_code: 500, .. }
    ));
}

#[test]
fn test_providerError_isRetryable_shouldOnlyCoverTransientFailures() {
    assert!(ProviderError::ConnectionError("reset".to_string()).is_retryable());
    assert!(ProviderError::from_status(503, String::new()).is_retryable());
    assert!(!ProviderError::from_status(400, String::new()).is_retryable());
    assert!(!ProviderError::ParseError("bad json".to_string()).is_retryable());
}

#[test]
fn test_validationError_display_shouldBeFieldMessage() {
    assert_eq!(ValidationError::GradeLevel.to_string(), "학년을 선택해주세요.");
    assert_eq!(ValidationError::DictationGoal.to_string(), "받아쓰기 목표를 입력해주세요.");
    assert_eq!(ValidationError::ProficiencyLevel.to_string(), "성취 수준을 선택해주세요.");
    assert_eq!(
        ValidationError::NumberOfSentences.to_string(),
        "1에서 20 사이의 숫자를 입력해주세요."
    );
}

#[test]
fn test_generationFailure_fromErrors_shouldKeepKind() {
    let from_validation: GenerationFailure = ValidationError::GradeLevel.into();
    let from_provider: GenerationFailure = ProviderError::ConnectionError("refused".to_string()).into();

    assert_eq!(from_validation.kind, FailureKind::Validation);
    assert_eq!(from_validation.to_string(), "잘못된 입력입니다. 학년을 선택해주세요.");
    assert_eq!(from_provider.kind, FailureKind::Generation);
    assert_eq!(from_provider.to_string(), GenerationFailure::GENERATION_MESSAGE);
    assert!(from_provider.detail.unwrap().contains("refused"));
}

#[test]
fn test_appError_conversions_shouldWrapSourceErrors() {
    let store: AppError = StoreError::OutOfRange { position: 4, len: 2 }.into();
    let export: AppError = ExportError::HandleUnavailable(2).into();
    let io: AppError = std::io::Error::new(std::io::ErrorKind::NotFound, "missing").into();
    let other: AppError = anyhow::anyhow!("boom").into();

    assert!(store.to_string().contains("out of range"));
    assert_eq!(export.to_string(), "Export error: Page 2 has not been rendered yet");
    assert!(matches!(io, AppError::File(_)));
    assert!(matches!(other, AppError::Unknown(_)));
}
