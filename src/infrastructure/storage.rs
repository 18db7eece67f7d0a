use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

/// `<stem>_processed_<YYYYmmdd_HHMMSS><ext>`, placed in `output_dir` when
/// given and next to the input otherwise
pub fn processed_output_path(
    input: &Path,
    output_dir: Option<&Path>,
    now: DateTime<Local>,
) -> std::io::Result<PathBuf> {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    let extension = input
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let file_name = format!(
        "{}_processed_{}{}",
        stem,
        now.format("%Y%m%d_%H%M%S"),
        extension
    );

    let dir = match output_dir {
        Some(dir) => {
            ensure_dir(dir)?;
            dir.to_path_buf()
        }
        None => input
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };

    Ok(dir.join(file_name))
}

pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}
