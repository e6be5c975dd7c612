//! Path string helpers.
//!
//! Paths arrive as plain strings from two sources, the Lightroom plugin and
//! the host application, possibly produced on another OS. These helpers accept
//! both `/` and `\` separators instead of relying on [`std::path::Path`].
//!
//! A backslash is a separator on every platform, so a POSIX file name that
//! itself contains `\` is split at it. Such names are not expected from
//! Lightroom exports.

const SEPARATORS: [char; 2] = ['/', '\\'];

/// Final path component (`/a/b/IMG_1.dng` -> `IMG_1.dng`).
pub fn file_name(path: &str) -> &str {
    path.rsplit(SEPARATORS).next().unwrap_or(path)
}

/// File name with its last extension removed (`IMG_1.dng` -> `IMG_1`).
///
/// A leading dot is part of the name, not an extension separator.
pub fn file_stem(path: &str) -> &str {
    let name = file_name(path);
    match name.rfind('.') {
        Some(idx) if name[..idx].chars().any(|c| c != '.') => &name[..idx],
        _ => name,
    }
}

/// Lower-cased extension including the dot (`IMG_1.JPG` -> `.jpg`).
pub fn extension_lowercase(path: &str) -> Option<String> {
    let name = file_name(path);
    let stem = file_stem(name);
    (stem.len() < name.len()).then(|| name[stem.len()..].to_lowercase())
}

/// Name of the directory containing `path`, if it has one.
pub fn parent_dir_name(path: &str) -> Option<&str> {
    let (parent, _) = path.rsplit_once(SEPARATORS)?;
    let name = file_name(parent);
    (!name.is_empty()).then_some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name() {
        assert_eq!(file_name("/a/b/IMG_1.dng"), "IMG_1.dng");
        assert_eq!(file_name(r"C:\Photos\IMG_1.dng"), "IMG_1.dng");
        assert_eq!(file_name("IMG_1.dng"), "IMG_1.dng");
        assert_eq!(file_name("/a/b/"), "");
    }

    #[test]
    fn test_backslash_splits_on_every_platform() {
        assert_eq!(file_name("/posix/odd\\name.tif"), "name.tif");
        assert_eq!(parent_dir_name("/posix/odd\\name.tif"), Some("odd"));
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("IMG_1.dng"), "IMG_1");
        assert_eq!(file_stem("/x/archive.tar.gz"), "archive.tar");
        assert_eq!(file_stem(".hidden"), ".hidden");
        assert_eq!(file_stem("no_extension"), "no_extension");
    }

    #[test]
    fn test_extension_lowercase() {
        assert_eq!(extension_lowercase("/a/IMG_1.JPG").as_deref(), Some(".jpg"));
        assert_eq!(extension_lowercase("/a/IMG_1.cr3").as_deref(), Some(".cr3"));
        assert_eq!(extension_lowercase("/a/README"), None);
    }

    #[test]
    fn test_parent_dir_name() {
        assert_eq!(parent_dir_name("/photos/2024 Rome/IMG_1.tif"), Some("2024 Rome"));
        assert_eq!(parent_dir_name(r"D:\shoots\day1\IMG_1.tif"), Some("day1"));
        assert_eq!(parent_dir_name("IMG_1.tif"), None);
        assert_eq!(parent_dir_name("/IMG_1.tif"), None);
    }
}
