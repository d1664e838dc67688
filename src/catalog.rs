use anyhow::{Context, Result};
use memmap2::Mmap;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;
use zip::ZipArchive;

use crate::scan::is_descriptor_class;

#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Reads every class entry of a JAR/ZIP archive.
///
/// Returns `Ok(None)` when the file is readable but is not a ZIP archive;
/// I/O failures are errors.
pub fn catalog(artifact_path: &Path) -> Result<Option<Vec<ArchiveEntry>>> {
    let file = File::open(artifact_path)
        .with_context(|| format!("Failed to open archive: {}", artifact_path.display()))?;
    if file.metadata()?.len() == 0 {
        return Ok(None);
    }
    // SAFETY: The file is opened read-only and remains valid for the lifetime of the mmap.
    // The mmap is dropped before the file, ensuring memory safety.
    let mmap = unsafe { Mmap::map(&file) }
        .with_context(|| format!("Failed to mmap archive: {}", artifact_path.display()))?;
    // Reading from the mapping cannot fail with I/O, so any error here is a format error.
    let Ok(mut archive) = ZipArchive::new(Cursor::new(&mmap[..])) else {
        return Ok(None);
    };

    let mut entries = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).with_context(|| {
            format!("Failed to read entry {i} of {}", artifact_path.display())
        })?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();
        if !name.ends_with(".class") || is_descriptor_class(&name) {
            continue;
        }

        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut bytes)
            .with_context(|| format!("Failed to read {name} from {}", artifact_path.display()))?;
        entries.push(ArchiveEntry { name, bytes });
    }
    Ok(Some(entries))
}
