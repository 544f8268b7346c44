/*!
 * Tests for file and directory utilities
 */

use anyhow::Result;

use dictsheet::file_utils::FileManager;

use crate::common;

#[test]
fn test_ensureDir_withNestedPath_shouldCreateAllLevels() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let nested = temp_dir.path().join("a").join("b");

    FileManager::ensure_dir(&nested)?;
    FileManager::ensure_dir(&nested)?;

    assert!(FileManager::dir_exists(&nested));
    assert!(!FileManager::file_exists(&nested));
    Ok(())
}

#[test]
fn test_writeBytes_shouldCreateParentAndRoundTrip() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = FileManager::output_path(temp_dir.path().join("out"), "page.png");

    FileManager::write_bytes(&path, &[1, 2, 3])?;

    assert!(FileManager::file_exists(&path));
    assert_eq!(std::fs::read(&path)?, vec![1, 2, 3]);
    Ok(())
}

#[test]
fn test_readToString_withMissingFile_shouldFailWithPath() {
    let err = FileManager::read_to_string("/nonexistent/dictsheet/words.txt").unwrap_err();
    assert!(err.to_string().contains("words.txt"));
}

#[test]
fn test_writeToFile_shouldOverwriteExistingContent() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    FileManager::write_to_file(&path, "{}")?;
    FileManager::write_to_file(&path, "{\"log_level\":\"warn\"}")?;

    assert_eq!(FileManager::read_to_string(&path)?, "{\"log_level\":\"warn\"}");
    Ok(())
}
