use std::fs::{self, File};
use std::io::{self, Cursor, Write};
use std::path::Path;

use anyhow::{Context, Result};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Read a pre-built contract artifact as the deploy payload.
pub fn read_jar(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("reading contract artifact {}", path.display()))
}

/// Zip a SCORE directory in memory as the deploy payload. Entry names are
/// relative to `dir` and entries are added in sorted order so the archive is
/// deterministic for a given tree.
pub fn zip_directory(dir: &Path) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    add_entries(&mut writer, dir, dir, options)
        .with_context(|| format!("packaging score directory {}", dir.display()))?;
    let cursor = writer.finish()?;
    Ok(cursor.into_inner())
}

fn add_entries(
    writer: &mut ZipWriter<Cursor<Vec<u8>>>,
    root: &Path,
    dir: &Path,
    options: FileOptions,
) -> Result<()> {
    let mut entries = fs::read_dir(dir)?
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("listing {}", dir.display()))?;
    entries.sort_by_key(|entry| entry.path());

    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            add_entries(writer, root, &path, options)?;
        } else {
            let name = path.strip_prefix(root)?.to_string_lossy().into_owned();
            writer.start_file(name, options)?;
            let mut file = File::open(&path)?;
            io::copy(&mut file, writer)?;
        }
    }
    writer.flush()?;
    Ok(())
}
