//! Lazy document discovery and per-file reading.

use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{IndexError, Result};

/// Every regular file under a root, recursively, with symlinks followed.
/// Re-create it on the same root to walk again.
pub struct DocumentWalk {
    inner: walkdir::IntoIter,
}

impl DocumentWalk {
    pub fn new<P: AsRef<Path>>(root: P, sorted: bool) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(IndexError::Walk(format!("{} is not a directory", root.display())));
        }
        let mut walker = WalkDir::new(root).follow_links(true);
        if sorted {
            walker = walker.sort_by_file_name();
        }
        Ok(Self { inner: walker.into_iter() })
    }
}

impl Iterator for DocumentWalk {
    /// `Err` carries an entry that could not be listed; the walk goes on.
    type Item = Result<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.inner.next()? {
                Ok(entry) if entry.file_type().is_file() => return Some(Ok(entry.into_path())),
                Ok(_) => continue,
                Err(err) => return Some(Err(IndexError::Walk(err.to_string()))),
            }
        }
    }
}

/// Read a whole document as UTF-8 text.
pub fn read_document(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|source| IndexError::Io { path: path.to_path_buf(), source })?;
    String::from_utf8(bytes).map_err(|source| IndexError::Encoding { path: path.to_path_buf(), source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn finds_nested_files_in_name_order() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("b/deeper")).unwrap();
        fs::write(root.join("c.txt"), "c").unwrap();
        fs::write(root.join("a.txt"), "a").unwrap();
        fs::write(root.join("b/deeper/x.txt"), "x").unwrap();

        let paths: Vec<PathBuf> = DocumentWalk::new(root, true)
            .unwrap()
            .map(|p| p.unwrap().strip_prefix(root).unwrap().to_path_buf())
            .collect();
        assert_eq!(paths, vec![PathBuf::from("a.txt"), PathBuf::from("b/deeper/x.txt"), PathBuf::from("c.txt")]);
    }

    #[test]
    fn walking_twice_gives_the_same_sequence() {
        let dir = tempdir().unwrap();
        for name in ["one", "two", "three"] {
            fs::write(dir.path().join(name), name).unwrap();
        }
        let first: Vec<_> = DocumentWalk::new(dir.path(), true).unwrap().map(|p| p.unwrap()).collect();
        let second: Vec<_> = DocumentWalk::new(dir.path(), true).unwrap().map(|p| p.unwrap()).collect();
        assert_eq!(first.len(), 3);
        assert_eq!(first, second);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_files_are_documents() {
        let dir = tempdir().unwrap();
        let outside = tempdir().unwrap();
        let target = outside.path().join("real.txt");
        fs::write(&target, "linked").unwrap();
        fs::write(dir.path().join("plain.txt"), "plain").unwrap();
        std::os::unix::fs::symlink(&target, dir.path().join("link.txt")).unwrap();

        let paths: Vec<PathBuf> = DocumentWalk::new(dir.path(), true).unwrap().map(|p| p.unwrap()).collect();
        assert_eq!(paths, vec![dir.path().join("link.txt"), dir.path().join("plain.txt")]);
        assert_eq!(read_document(&paths[0]).unwrap(), "linked");
    }

    #[test]
    fn empty_directory_yields_nothing() {
        let dir = tempdir().unwrap();
        assert_eq!(DocumentWalk::new(dir.path(), true).unwrap().count(), 0);
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(matches!(DocumentWalk::new(dir.path().join("nope"), true), Err(IndexError::Walk(_))));
    }

    #[test]
    fn invalid_utf8_is_an_encoding_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("latin1.txt");
        fs::write(&path, [b'c', b'a', b'f', 0xE9]).unwrap();
        assert!(matches!(read_document(&path), Err(IndexError::Encoding { .. })));
        assert!(matches!(read_document(&dir.path().join("gone")), Err(IndexError::Io { .. })));
    }
}
