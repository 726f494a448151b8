//! Result bundling
//!
//! Packs the output directory (images, reports, models, metadata) into a
//! single zip archive for sharing.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Zip every file under `out_dir` into `zip_path`, preserving relative
/// paths. The archive itself is skipped when it lives inside `out_dir`.
pub fn bundle_results(out_dir: &Path, zip_path: &Path) -> Result<usize> {
    let file = File::create(zip_path)
        .with_context(|| format!("Failed to create archive: {}", zip_path.display()))?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default();

    let mut files = Vec::new();
    collect_files(out_dir, &mut files)?;
    files.sort();

    let mut bundled = 0usize;
    for path in files {
        if path == zip_path {
            continue;
        }
        let relative = path
            .strip_prefix(out_dir)
            .unwrap_or(&path)
            .to_string_lossy()
            .replace('\\', "/");

        writer
            .start_file(relative.as_str(), options)
            .with_context(|| format!("Failed to add {} to archive", relative))?;
        let mut contents = Vec::new();
        File::open(&path)
            .with_context(|| format!("Failed to open {}", path.display()))?
            .read_to_end(&mut contents)?;
        writer.write_all(&contents)?;
        bundled += 1;
    }

    writer.finish().context("Failed to finalize archive")?;
    Ok(bundled)
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?
    {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_bundles_nested_files() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("images").join("eda");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("a.svg"), "<svg/>").unwrap();
        std::fs::write(dir.path().join("run_metadata.json"), "{}").unwrap();

        let zip_path = dir.path().join("results.zip");
        let count = bundle_results(dir.path(), &zip_path).unwrap();

        assert_eq!(count, 2);
        assert!(std::fs::metadata(&zip_path).unwrap().len() > 0);
    }

    #[test]
    fn test_archive_skips_itself() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("x.txt"), "x").unwrap();

        let zip_path = dir.path().join("results.zip");
        let count = bundle_results(dir.path(), &zip_path).unwrap();
        assert_eq!(count, 1);
    }
}
