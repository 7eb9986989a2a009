use super::types::SelectionState;
use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Default selection file path (~/.config/college-compare/selection.json)
pub fn get_selection_path() -> PathBuf {
    crate::config::get_config_dir().join("selection.json")
}

/// Load the saved selection.
///
/// A missing file yields an empty selection; an unsupported version is an error.
pub fn load_selection(path: &Path) -> Result<SelectionState> {
    if !path.exists() {
        return Ok(SelectionState::new());
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open selection file at {}", path.display()))?;

    let state: SelectionState =
        serde_json::from_reader(file).context("Failed to load saved selection")?;

    if state.version != 1 {
        anyhow::bail!("Unsupported selection file version: {}", state.version);
    }

    Ok(state)
}

/// Save the selection atomically, creating the parent directory if needed
pub fn save_selection(path: &Path, state: &SelectionState) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, state).context("Failed to serialize selection")?;

    file.commit().context("Failed to save selection")?;

    tracing::debug!(path = %path.display(), count = state.college_ids.len(), "saved selection");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_load_missing_file_returns_empty() {
        let temp_path = env::temp_dir().join("college_compare_test_missing_selection.json");
        let _ = std::fs::remove_file(&temp_path);

        let state = load_selection(&temp_path).unwrap();
        assert_eq!(state.version, 1);
        assert!(state.is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let temp_path = env::temp_dir().join("college_compare_test_selection.json");
        let _ = std::fs::remove_file(&temp_path);

        let state = SelectionState {
            version: 1,
            college_ids: vec![4, 1, 9],
            updated_at: Some(chrono::Utc::now()),
        };
        save_selection(&temp_path, &state).unwrap();

        let loaded = load_selection(&temp_path).unwrap();
        assert_eq!(loaded.college_ids, vec![4, 1, 9]);

        let _ = std::fs::remove_file(&temp_path);
    }

    #[test]
    fn test_unsupported_version() {
        let temp_path = env::temp_dir().join("college_compare_test_selection_v2.json");
        std::fs::write(&temp_path, r#"{"version": 2, "college_ids": [1]}"#).unwrap();

        let err = load_selection(&temp_path).unwrap_err();
        assert!(err.to_string().contains("Unsupported selection file version: 2"));

        let _ = std::fs::remove_file(&temp_path);
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let temp_path = env::temp_dir().join("college_compare_test_selection_bad.json");
        std::fs::write(&temp_path, "not json").unwrap();

        assert!(load_selection(&temp_path).is_err());

        let _ = std::fs::remove_file(&temp_path);
    }
}
