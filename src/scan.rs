use anyhow::{Context, Result};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Keeps the arguments naming an existing regular file or directory, in order.
pub fn find_processable_paths(args: &[String]) -> Vec<String> {
    args.iter()
        .filter(|arg| is_processable(Path::new(arg.as_str())))
        .cloned()
        .collect()
}

fn is_processable(path: &Path) -> bool {
    path.is_file() || path.is_dir()
}

pub fn scan_class_files(base_path: &Path) -> Result<Vec<PathBuf>> {
    let walker = WalkBuilder::new(base_path)
        .hidden(false)
        .ignore(false)
        .parents(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .sort_by_file_path(|a, b| a.cmp(b))
        .build();

    let mut found = Vec::new();
    for entry in walker {
        let entry =
            entry.with_context(|| format!("Failed to walk directory: {}", base_path.display()))?;
        let path = entry.path();
        if entry.file_type().is_some_and(|t| t.is_file()) && is_class_file_name(path) {
            found.push(path.to_path_buf());
        }
    }
    Ok(found)
}

pub fn is_class_file_name(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == "class")
}

/// `module-info` and `package-info` carry no type of their own.
pub fn is_descriptor_class(entry_name: &str) -> bool {
    let file_name = entry_name.rsplit(['/', '\\']).next().unwrap_or(entry_name);
    matches!(file_name, "module-info.class" | "package-info.class")
}
