//! Filesystem-backed character lookup.
//!
//! A character is a directory under the character root holding a reference
//! audio clip (`ref.wav`) and its transcript (`ref.txt`). Characters are
//! provisioned out-of-band; the store never writes, and every lookup
//! re-reads the disk — character sets are small and this keeps the store
//! free of invalidation concerns.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

const REF_AUDIO_FILE: &str = "ref.wav";
const REF_TEXT_FILE: &str = "ref.txt";

/// A resolved character: reference audio on disk plus its transcript.
#[derive(Debug, Clone)]
pub struct CharacterProfile {
    pub name: String,
    pub ref_audio: PathBuf,
    pub ref_text: String,
}

/// Scans a character root directory. Read-only.
pub struct CharacterStore {
    root: PathBuf,
}

impl CharacterStore {
    /// Open a store over `root`, creating the directory if absent.
    pub fn open(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Enumerate characters with both reference files present, each mapped to
    /// its available style tags. Styles are not yet differentiated per
    /// character: every entry exposes the single `"default"` tag.
    pub fn list(&self) -> io::Result<BTreeMap<String, Vec<String>>> {
        let mut characters = BTreeMap::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let dir = entry.path();
            if !(dir.join(REF_AUDIO_FILE).is_file() && dir.join(REF_TEXT_FILE).is_file()) {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                characters.insert(name.to_string(), vec!["default".to_string()]);
            }
        }
        Ok(characters)
    }

    /// Resolve a character name to its reference pair. Returns `Ok(None)` if
    /// the directory or either reference file is missing. The reference text
    /// is read as UTF-8 and trimmed of surrounding whitespace.
    pub fn resolve(&self, name: &str) -> io::Result<Option<CharacterProfile>> {
        // Names are directory names, never paths.
        if name.is_empty() || name.contains("..") || name.contains('/') || name.contains('\\') {
            return Ok(None);
        }

        let dir = self.root.join(name);
        let ref_audio = dir.join(REF_AUDIO_FILE);
        let ref_text_path = dir.join(REF_TEXT_FILE);
        if !(dir.is_dir() && ref_audio.is_file() && ref_text_path.is_file()) {
            return Ok(None);
        }

        let ref_text = std::fs::read_to_string(&ref_text_path)?;
        Ok(Some(CharacterProfile {
            name: name.to_string(),
            ref_audio,
            ref_text: ref_text.trim().to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn add_character(root: &Path, name: &str, ref_text: &str) {
        let dir = root.join(name);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(REF_AUDIO_FILE), b"RIFF").unwrap();
        std::fs::write(dir.join(REF_TEXT_FILE), ref_text).unwrap();
    }

    #[test]
    fn open_creates_missing_root() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("characters");
        let store = CharacterStore::open(&root).unwrap();
        assert!(root.is_dir());
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn list_includes_only_complete_characters() {
        let tmp = TempDir::new().unwrap();
        add_character(tmp.path(), "alice", "hello there");
        // incomplete: audio only
        let partial = tmp.path().join("carol");
        std::fs::create_dir_all(&partial).unwrap();
        std::fs::write(partial.join(REF_AUDIO_FILE), b"RIFF").unwrap();
        // stray file at the root is not a character
        std::fs::write(tmp.path().join("README.txt"), "notes").unwrap();

        let store = CharacterStore::open(tmp.path()).unwrap();
        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed["alice"], vec!["default"]);
    }

    #[test]
    fn resolve_reads_trimmed_reference_text() {
        let tmp = TempDir::new().unwrap();
        add_character(tmp.path(), "alice", "  hello there\n");

        let store = CharacterStore::open(tmp.path()).unwrap();
        let profile = store.resolve("alice").unwrap().expect("alice exists");
        assert_eq!(profile.name, "alice");
        assert_eq!(profile.ref_text, "hello there");
        assert!(profile.ref_audio.ends_with("alice/ref.wav"));
    }

    #[test]
    fn resolve_absent_for_missing_or_partial_characters() {
        let tmp = TempDir::new().unwrap();
        let partial = tmp.path().join("carol");
        std::fs::create_dir_all(&partial).unwrap();
        std::fs::write(partial.join(REF_TEXT_FILE), "text only").unwrap();

        let store = CharacterStore::open(tmp.path()).unwrap();
        assert!(store.resolve("bob").unwrap().is_none());
        assert!(store.resolve("carol").unwrap().is_none());
    }

    #[test]
    fn resolve_rejects_path_traversal_names() {
        let tmp = TempDir::new().unwrap();
        add_character(tmp.path(), "alice", "hi");

        let store = CharacterStore::open(tmp.path().join("root")).unwrap();
        assert!(store.resolve("../alice").unwrap().is_none());
        assert!(store.resolve("a/b").unwrap().is_none());
        assert!(store.resolve("").unwrap().is_none());
    }
}
