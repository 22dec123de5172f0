use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use unicode_normalization::UnicodeNormalization;

// ── File names ────────────────────────────────────────────────────────────────

const ALLOWED_EXTENSIONS: &[&str] = &["csv"];

/// True when the text after the last dot is an allowed extension.
/// "prices.CSV" → true | "prices" → false | "prices.csv.exe" → false
pub fn allowed_file(name: &str) -> bool {
    name.rsplit_once('.')
        .map(|(_, ext)| ALLOWED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Reduce a client-supplied name to a flat, ASCII-safe file name.
/// Accents are decomposed (NFKD) first so only the combining marks are lost.
/// "../../etc/passwd" → "etc_passwd" | "my data.csv" → "my_data.csv" | "résumé.csv" → "resume.csv"
pub fn secure_filename(name: &str) -> String {
    let spaced: String = name
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");

    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}

// ── Upload store ──────────────────────────────────────────────────────────────

/// The directory uploaded CSV files live in.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn open(root: &Path) -> Result<Self> {
        std::fs::create_dir_all(root)
            .with_context(|| format!("Could not create upload dir {:?}", root))?;
        Ok(Self { root: root.to_path_buf() })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `bytes` under the sanitised form of `name`, replacing any file of
    /// the same name. Returns the name actually used.
    pub fn save(&self, name: &str, bytes: &[u8]) -> Result<String> {
        let safe = secure_filename(name);
        anyhow::ensure!(!safe.is_empty(), "File name {:?} has no usable characters", name);

        let path = self.root.join(&safe);
        std::fs::write(&path, bytes).with_context(|| format!("Could not write {:?}", path))?;

        info!("Stored {} ({} bytes)", safe, bytes.len());
        Ok(safe)
    }

    /// Uploaded CSV files, sorted by name.
    pub fn list(&self) -> Result<Vec<String>> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(&self.root)
            .with_context(|| format!("Could not read {:?}", self.root))?
        {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if allowed_file(name) {
                    files.push(name.to_string());
                }
            }
        }
        files.sort();
        Ok(files)
    }

    /// Path of an uploaded file, if it exists. The name is sanitised first so
    /// lookups never leave the upload directory.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        let safe = secure_filename(name);
        if safe.is_empty() {
            return None;
        }
        let path = self.root.join(&safe);
        debug!("Resolving {:?} → {:?}", name, path);
        path.is_file().then_some(path)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_file() {
        assert!(allowed_file("nifty.csv"));
        assert!(allowed_file("NIFTY__1D__.CSV"));
        assert!(!allowed_file("nifty"));
        assert!(!allowed_file("nifty.csv.exe"));
        assert!(!allowed_file("nifty.txt"));
    }

    #[test]
    fn test_secure_filename() {
        assert_eq!(secure_filename("My Data.csv"), "My_Data.csv");
        assert_eq!(secure_filename("../../etc/passwd"), "etc_passwd");
        assert_eq!(secure_filename("C:\\Users\\me\\prices.csv"), "C_Users_me_prices.csv");
        assert_eq!(secure_filename("NIFTY__1D__.csv"), "NIFTY__1D__.csv");
        assert_eq!(secure_filename("../.."), "");
    }

    #[test]
    fn test_secure_filename_decomposes_accents() {
        assert_eq!(secure_filename("résumé.csv"), "resume.csv");
        assert_eq!(secure_filename("Ｎｉｆｔｙ.csv"), "Nifty.csv");
        assert_eq!(secure_filename("\u{fb01}le.csv"), "file.csv");
        assert_eq!(secure_filename("日本.csv"), "csv");
    }

    #[test]
    fn test_save_list_resolve() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::open(&dir.path().join("uploads")).unwrap();

        let name = store.save("b prices.csv", b"date,open\n").unwrap();
        assert_eq!(name, "b_prices.csv");
        store.save("a.csv", b"x\n").unwrap();
        store.save("notes.txt", b"x\n").unwrap();

        assert_eq!(store.list().unwrap(), vec!["a.csv", "b_prices.csv"]);
        assert!(store.resolve("b_prices.csv").is_some());
        assert!(store.resolve("missing.csv").is_none());
        assert!(store.resolve("../uploads/a.csv").is_none());
    }

    #[test]
    fn test_save_rejects_empty_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::open(dir.path()).unwrap();
        assert!(store.save("///", b"x").is_err());
    }
}
