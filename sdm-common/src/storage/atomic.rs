//! Whole-file reads and atomic rewrites
//!
//! A rewrite goes to `<target>.tmp`, is synced, then renamed over the
//! target, so readers see either the old file or the new one.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

fn temp_path(target: &Path) -> PathBuf {
    let mut name = OsString::from(target.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

/// Non-blank lines of `path`; a missing file reads as empty
pub fn read_lines(path: &Path) -> io::Result<Vec<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e),
    }
}

/// Atomically replace `path` with `bytes`
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    write_with(path, |w| w.write_all(bytes))
}

/// Atomically replace `path` with one line per item
pub fn write_lines<I, S>(path: &Path, lines: I) -> io::Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    write_with(path, |w| {
        for line in lines {
            w.write_all(line.as_ref().as_bytes())?;
            w.write_all(b"\n")?;
        }
        Ok(())
    })
}

fn write_with<F>(path: &Path, fill: F) -> io::Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let temp = temp_path(path);
    let result = (|| {
        let mut writer = BufWriter::new(File::create(&temp)?);
        fill(&mut writer)?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        fs::rename(&temp, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&temp);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let lines = read_lines(&dir.path().join("absent.csv")).unwrap();
        assert!(lines.is_empty());
    }

    #[test]
    fn test_write_lines_replaces_and_cleans_temp() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("grades.csv");

        write_lines(&target, ["a,b", "c,d"]).unwrap();
        write_lines(&target, ["e,f"]).unwrap();

        assert_eq!(std::fs::read_to_string(&target).unwrap(), "e,f\n");
        assert!(!dir.path().join("grades.csv.tmp").exists());
    }

    #[test]
    fn test_write_creates_parent_folder() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("nested").join("students.csv");
        write_atomic(&target, b"id\n").unwrap();
        assert!(target.exists());
    }

    #[test]
    fn test_read_lines_skips_blank_lines() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("subjects.csv");
        std::fs::write(&target, "a\n\n  \r\nb\r\n").unwrap();
        assert_eq!(read_lines(&target).unwrap(), vec!["a", "b"]);
    }
}
