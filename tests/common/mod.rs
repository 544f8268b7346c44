/*!
 * Common test utilities for the dictsheet test suite
 */

use anyhow::{anyhow, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use dictsheet::app_config::{Config, WorksheetConfig};
use dictsheet::generation::GenerationGateway;
use dictsheet::providers::mock::MockProvider;
use dictsheet::worksheet::{ArtifactSink, WorksheetExporter};
use dictsheet::Controller;

/// Routes library log output to the test harness (RUST_LOG=debug to see it)
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// PNG file signature
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Numbered sentences "문장 1." .. "문장 n."
pub fn numbered_sentences(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("문장 {}.", i)).collect()
}

/// Worksheet settings that render quickly and skip the system font scan
pub fn fast_worksheet_config() -> WorksheetConfig {
    WorksheetConfig {
        pixel_ratio: 0.25,
        load_system_fonts: false,
        ..WorksheetConfig::default()
    }
}

/// Default config with fast worksheet settings
pub fn test_config() -> Config {
    Config {
        worksheet: fast_worksheet_config(),
        ..Config::default()
    }
}

/// Sink that keeps artifacts in memory, optionally refusing every save
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    saved: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
    fail: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Everything saved so far, in order
    pub fn saved(&self) -> Vec<(String, Vec<u8>)> {
        self.saved.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn file_names(&self) -> Vec<String> {
        self.saved().into_iter().map(|(name, _)| name).collect()
    }
}

impl ArtifactSink for MemorySink {
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
        if self.fail {
            return Err(anyhow!("disk full"));
        }
        self.saved
            .lock()
            .map_err(|_| anyhow!("sink poisoned"))?
            .push((file_name.to_string(), bytes.to_vec()));
        Ok(PathBuf::from("memory").join(file_name))
    }
}

/// Exporter writing into `sink`
pub fn test_exporter(sink: &MemorySink) -> WorksheetExporter {
    WorksheetExporter::with_sink(&fast_worksheet_config(), Box::new(sink.clone()))
}

/// Controller backed by a mock provider and an in-memory sink
pub fn test_controller(provider: &MockProvider, sink: &MemorySink) -> Controller {
    init_test_logging();
    let config = test_config();
    let gateway = GenerationGateway::with_provider(Arc::new(provider.clone()), &config.generation);
    let exporter = test_exporter(sink);
    Controller::with_parts(config, gateway, exporter)
}
