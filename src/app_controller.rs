use anyhow::Result;
use log::{debug, error, info, warn};
use std::fmt;
use std::path::PathBuf;

use crate::app_config::Config;
use crate::errors::{ExportError, StoreError};
use crate::generation::{GenerationFailure, GenerationGateway, GenerationInput, GenerationResult};
use crate::paginator::{self, Page};
use crate::sentence_store::SentenceStore;
use crate::worksheet::WorksheetExporter;

// @module: Session controller for worksheet assembly

/// Severity of a user-facing notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// Non-blocking message shown to the teacher after an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub description: String,
}

impl Notice {
    fn new(level: NoticeLevel, title: &str, description: impl Into<String>) -> Self {
        Self {
            level,
            title: title.to_string(),
            description: description.into(),
        }
    }

    /// Sentences were generated and appended
    pub fn generated() -> Self {
        Self::new(NoticeLevel::Success, "성공!", "AI가 문장을 성공적으로 생성했습니다.")
    }

    /// Generation was rejected or failed
    pub fn generation_failed(failure: &GenerationFailure) -> Self {
        Self::new(NoticeLevel::Error, "오류 발생", failure.message.clone())
    }

    /// A generation is already in flight
    pub fn busy() -> Self {
        Self::new(
            NoticeLevel::Info,
            "생성 중",
            "문장을 생성하는 중입니다. 잠시만 기다려 주세요.",
        )
    }

    /// The worksheet was cleared
    pub fn reset() -> Self {
        Self::new(NoticeLevel::Info, "초기화 완료", "새로운 학습지 만들기를 시작합니다.")
    }

    /// A page could not be exported
    pub fn export_failed() -> Self {
        Self::new(
            NoticeLevel::Error,
            "이미지 다운로드 오류",
            "이미지를 다운로드하는 중 오류가 발생했습니다.",
        )
    }

    /// An edit or delete named a position that does not exist
    pub fn store_failed(err: &StoreError) -> Self {
        Self::new(NoticeLevel::Error, "오류 발생", err.to_string())
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.title, self.description)
    }
}

/// Permission to run one generation.
///
/// Issued by `begin_generation` and consumed by `finish_generation`; it
/// remembers the session epoch so results that outlive a reset are dropped.
#[derive(Debug)]
#[must_use = "a ticket must be passed back to finish_generation"]
pub struct GenerationTicket {
    epoch: u64,
}

impl GenerationTicket {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

/// Owns the sentence store and the page exporter for one worksheet session
#[derive(Debug)]
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Sentence generation boundary
    gateway: GenerationGateway,

    // @field: The ordered sentence list
    store: SentenceStore,

    // @field: Page handle registry and export pipeline
    exporter: WorksheetExporter,

    // @field: Current generation form values
    form: GenerationInput,

    // @field: Store revision the handles were last bound for
    paginated_revision: Option<u64>,

    // @field: Advanced on every reset
    epoch: u64,

    // @field: Whether a ticket is outstanding
    in_flight: bool,
}

impl Controller {
    /// Create a controller talking to the configured provider and output directory
    pub fn with_config(config: Config) -> Result<Self> {
        let gateway = GenerationGateway::new(&config.generation)?;
        let exporter = WorksheetExporter::from_config(&config.worksheet);
        Ok(Self::with_parts(config, gateway, exporter))
    }

    /// Create a controller from prebuilt collaborators
    pub fn with_parts(config: Config, gateway: GenerationGateway, exporter: WorksheetExporter) -> Self {
        let form = config.form_defaults.to_input();
        let mut controller = Self {
            config,
            gateway,
            store: SentenceStore::new(),
            exporter,
            form,
            paginated_revision: None,
            epoch: 0,
            in_flight: false,
        };
        controller.refresh();
        controller
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn gateway(&self) -> &GenerationGateway {
        &self.gateway
    }

    pub fn store(&self) -> &SentenceStore {
        &self.store
    }

    pub fn exporter(&self) -> &WorksheetExporter {
        &self.exporter
    }

    pub fn sentences(&self) -> &[String] {
        self.store.as_slice()
    }

    /// Current generation form values
    pub fn form(&self) -> &GenerationInput {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut GenerationInput {
        &mut self.form
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight
    }

    /// Claim the single generation slot
    pub fn begin_generation(&mut self) -> Result<GenerationTicket, Notice> {
        if self.in_flight {
            debug!("Generation refused: another one is in flight");
            return Err(Notice::busy());
        }
        self.in_flight = true;
        Ok(GenerationTicket { epoch: self.epoch })
    }

    /// Apply a generation result and release the slot.
    ///
    /// Returns `None` when the session was reset after the ticket was issued;
    /// such results are dropped without touching the store.
    pub fn finish_generation(&mut self, ticket: GenerationTicket, result: GenerationResult) -> Option<Notice> {
        self.in_flight = false;

        if ticket.epoch != self.epoch {
            warn!(
                "Discarding generation result from before a reset (epoch {} < {})",
                ticket.epoch, self.epoch
            );
            return None;
        }

        match result {
            Ok(sentences) => {
                let added = self.add_generated(sentences);
                info!("Appended {} generated sentences", added);
                Some(Notice::generated())
            }
            Err(failure) => {
                if failure.is_validation() {
                    warn!("Generation rejected: {}", failure);
                } else {
                    error!(
                        "Generation failed: {}",
                        failure.detail.as_deref().unwrap_or(&failure.message)
                    );
                }
                Some(Notice::generation_failed(&failure))
            }
        }
    }

    /// Run one generation with the current form values to completion
    pub async fn generate(&mut self) -> Option<Notice> {
        let ticket = match self.begin_generation() {
            Ok(ticket) => ticket,
            Err(notice) => return Some(notice),
        };
        let result = self.gateway.submit(&self.form).await;
        self.finish_generation(ticket, result)
    }

    /// Append generated sentences in model order
    pub fn add_generated(&mut self, sentences: Vec<String>) -> usize {
        let added = self.store.append_all(sentences);
        self.refresh();
        added
    }

    /// Append each non-blank line of a typed text block
    pub fn add_manual(&mut self, text: &str) -> usize {
        let added = self.store.ingest_text(text);
        self.refresh();
        added
    }

    /// Replace the sentence at a 0-based position
    pub fn edit(&mut self, position: usize, new_text: &str) -> Result<(), StoreError> {
        self.store.edit(position, new_text)?;
        self.refresh();
        Ok(())
    }

    /// Remove the sentence at a 0-based position
    pub fn delete(&mut self, position: usize) -> Result<String, StoreError> {
        let removed = self.store.delete(position)?;
        self.refresh();
        Ok(removed)
    }

    /// Clear the worksheet, drop every page handle and restore the form defaults
    pub fn reset(&mut self) -> Notice {
        self.store.reset();
        self.epoch += 1;
        self.form = self.config.form_defaults.to_input();
        self.exporter.invalidate_all();
        self.paginated_revision = None;
        self.refresh();
        info!("Worksheet reset");
        Notice::reset()
    }

    /// Re-paginate and re-bind handles if the store changed since the last binding
    fn refresh(&mut self) {
        let revision = self.store.revision();
        if self.paginated_revision == Some(revision) {
            return;
        }

        let pages = paginator::paginate(self.store.as_slice(), self.config.worksheet.page_size);
        let rebound = self.exporter.sync(&pages);
        debug!(
            "Revision {}: {} pages, {} handles rebound",
            revision,
            pages.len(),
            rebound
        );
        self.paginated_revision = Some(revision);
    }

    /// Current pages of the worksheet
    pub fn pages(&self) -> Vec<Page<'_>> {
        paginator::paginate(self.store.as_slice(), self.config.worksheet.page_size)
    }

    /// Number of exportable pages; an empty worksheet still has its blank page
    pub fn page_count(&self) -> usize {
        paginator::page_count(self.store.len(), self.config.worksheet.page_size).max(1)
    }

    /// Export one page (1-based)
    pub fn export_page(&self, page_number: usize) -> Result<PathBuf, Notice> {
        self.exporter.export(page_number).map_err(|e: ExportError| {
            error!("Export of page {} failed: {}", page_number, e);
            Notice::export_failed()
        })
    }

    /// Export every page in order; one failure does not stop the others
    pub fn export_all(&self) -> Vec<(usize, Result<PathBuf, Notice>)> {
        (1..=self.page_count())
            .map(|page_number| (page_number, self.export_page(page_number)))
            .collect()
    }
}
