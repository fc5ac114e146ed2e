use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};

use crate::m4a::M4A_EXT;

/// Recursively collect `.m4a` files under `basedir`, directory entries
/// sorted at each level. A missing or non-directory basedir is an error
/// the caller treats as fatal.
pub fn find_m4a_files(basedir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if !basedir.exists() {
        bail!("{} does not exist", basedir.display());
    }
    if !basedir.is_dir() {
        bail!("{} is not a directory", basedir.display());
    }

    let mut files = Vec::new();
    collect_m4a_files(basedir, &mut files)?;
    Ok(files)
}

fn collect_m4a_files(dir: &Path, files: &mut Vec<PathBuf>) -> anyhow::Result<()> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("reading {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    entries.sort();

    for path in entries {
        if path.is_dir() {
            collect_m4a_files(&path, files)?;
        } else if path.extension().and_then(|ext| ext.to_str()) == Some(M4A_EXT) {
            files.push(path);
        }
    }
    Ok(())
}

/// Move `src` to `dst`. Same-directory moves are a single atomic rename.
pub fn move_file(src: &Path, dst: &Path) -> io::Result<()> {
    fs::rename(src, dst)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_m4a_files_recursive_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("album");
        fs::create_dir(&nested).unwrap();
        fs::write(dir.path().join("b.m4a"), b"x").unwrap();
        fs::write(dir.path().join("a.m4a"), b"x").unwrap();
        fs::write(dir.path().join("cover.jpg"), b"x").unwrap();
        fs::write(nested.join("c.m4a"), b"x").unwrap();

        let files = find_m4a_files(dir.path()).unwrap();
        assert_eq!(
            files,
            vec![
                dir.path().join("a.m4a"),
                nested.join("c.m4a"),
                dir.path().join("b.m4a"),
            ]
        );
    }

    #[test]
    fn test_find_m4a_files_missing_dir() {
        let err = find_m4a_files(Path::new("/no/such/dir")).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_find_m4a_files_not_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file.m4a");
        fs::write(&file, b"x").unwrap();

        let err = find_m4a_files(&file).unwrap_err();
        assert!(err.to_string().contains("is not a directory"));
    }

    #[test]
    fn test_move_file() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.m4a");
        let dst = dir.path().join("dst.m4a");
        fs::write(&src, b"x").unwrap();

        move_file(&src, &dst).unwrap();
        assert!(dst.exists());
        assert!(!src.exists());

        assert!(move_file(&src, &dst).is_err());
    }
}
