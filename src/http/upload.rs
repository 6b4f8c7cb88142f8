// Upload handling - filename checks and storage for analyzed files

use std::io::{self, Write};
use std::path::Path;

use axum::body::Bytes;
use tempfile::TempPath;
use unicode_normalization::UnicodeNormalization;

/// True when `filename` has an extension in `allowed` (case-insensitive)
pub fn allowed_file(filename: &str, allowed: &[String]) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => {
            let ext = ext.to_ascii_lowercase();
            allowed.iter().any(|a| a.eq_ignore_ascii_case(&ext))
        }
        None => false,
    }
}

/// Error message listing the accepted extensions
pub fn not_allowed_message(allowed: &[String]) -> String {
    format!("File type not allowed. Supported types: {}", allowed.join(", "))
}

/// Reduce a client-supplied filename to a safe, flat ASCII name
///
/// The name is NFKD-decomposed and reduced to ASCII, so accented letters
/// keep their base letter. Path separators become whitespace, runs of
/// whitespace collapse to `_`, everything outside `[A-Za-z0-9_.-]` is
/// dropped, and leading or trailing dots and underscores are stripped. The
/// result may be empty.
pub fn secure_filename(filename: &str) -> String {
    let flattened: String = filename
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");

    joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect::<String>()
        .trim_matches(|c| c == '.' || c == '_')
        .to_string()
}

/// Store `data` under `dir` in a file unique to this upload
///
/// The stored name is `upload_<random>_<filename>`, so the extension the
/// decoder dispatches on is kept. The file is removed when the returned
/// path is dropped.
pub async fn save_upload(dir: &Path, filename: &str, data: Bytes) -> io::Result<TempPath> {
    tokio::fs::create_dir_all(dir).await?;

    let dir = dir.to_path_buf();
    let suffix = format!("_{}", filename);
    tokio::task::spawn_blocking(move || -> io::Result<TempPath> {
        let mut file = tempfile::Builder::new()
            .prefix("upload_")
            .suffix(&suffix)
            .tempfile_in(&dir)?;
        file.write_all(&data)?;
        file.flush()?;
        Ok(file.into_temp_path())
    })
    .await
    .map_err(io::Error::other)?
}
