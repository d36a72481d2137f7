use std::path::{Path, PathBuf};

pub const DEFAULT_BINARY_EXT: &str = "klb";

/// `dir/prog.klt` assembles to `prog.klb` in the working directory.
pub fn default_binary_path(src: &Path) -> PathBuf {
    let stem = src
        .file_stem()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("out"));
    stem.with_extension(DEFAULT_BINARY_EXT)
}
