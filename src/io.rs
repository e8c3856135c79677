use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Characters that cannot appear in a file name on at least one platform
const FORBIDDEN: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Turn a video title into something usable as a file name.
///
/// Path separators and other forbidden characters become `_`.
/// Return `fallback` if nothing usable is left.
pub fn sanitize_title(title: &str, fallback: &str) -> String {
    let sanitized: String = title
        .chars()
        .map(|c| {
            if FORBIDDEN.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    // Windows silently strips trailing dots and spaces
    let sanitized = sanitized
        .trim_start()
        .trim_end_matches(|c: char| c == '.' || c.is_whitespace());

    if sanitized.is_empty() {
        fallback.to_owned()
    } else {
        sanitized.to_owned()
    }
}

/// Create a directory under `root` whose name was not taken yet.
///
/// Format for the 1st directory: `<name>`
/// Format for the 2nd one and up: `<name> (<count>)`
///
/// Any existing entry counts as taken, and the name is claimed by the
/// creation itself so an existing directory is never returned.
pub fn create_unused_dir(root: &Path, name: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(root)
        .map_err(|err| Error::io(format!("Could not create {}", root.display()), err))?;

    let candidates = std::iter::once(name.to_owned())
        .chain((2u16..=u16::MAX).map(|n| format!("{name} ({n})")));

    for candidate in candidates {
        let dir = root.join(candidate);
        match std::fs::create_dir(&dir) {
            Ok(()) => return Ok(dir),
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(err) => {
                return Err(Error::io(format!("Could not create {}", dir.display()), err))
            }
        }
    }

    Err(Error::io(
        format!("Every '{name} (n)' directory is taken in {}", root.display()),
        std::io::ErrorKind::AlreadyExists.into(),
    ))
}

/// Files that must not outlive the job, whatever its outcome.
///
/// They are removed when the handle is dropped. Removal failures are
/// logged only.
#[derive(Debug, Default)]
pub struct ScratchFiles {
    paths: Vec<PathBuf>,
}

impl ScratchFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a path and return it
    pub fn add(&mut self, path: PathBuf) -> &Path {
        self.paths.push(path);
        &self.paths[self.paths.len() - 1]
    }
}

impl Drop for ScratchFiles {
    fn drop(&mut self) {
        for path in &self.paths {
            remove_leftover(path);
        }
    }
}

/// Remove a file if it exists. Failures are logged only.
pub fn remove_leftover(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!("Removed {}", path.display()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => warn!("Could not remove {}: {err}", path.display()),
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn separators_become_underscores() {
        assert_eq!(sanitize_title("AC/DC \\ live", "BV1"), "AC_DC _ live");
        assert_eq!(sanitize_title("a:b*c?d\"e<f>g|h", "BV1"), "a_b_c_d_e_f_g_h");
        assert_eq!(sanitize_title("tab\there", "BV1"), "tab_here");
    }

    #[test]
    fn keeps_unicode_titles() {
        assert_eq!(
            sanitize_title("【4K】字幕君交流场所 ", "BV1"),
            "【4K】字幕君交流场所"
        );
    }

    #[test]
    fn empty_titles_fall_back() {
        assert_eq!(sanitize_title("", "BV1xx411c7mD"), "BV1xx411c7mD");
        assert_eq!(sanitize_title(" ... ", "BV1xx411c7mD"), "BV1xx411c7mD");
        assert_eq!(sanitize_title("end...", "BV1"), "end");
        assert_eq!(sanitize_title("a. .", "BV1"), "a");
        assert_eq!(sanitize_title("v1.0 . . ", "BV1"), "v1.0");
    }

    #[test]
    fn never_reuses_a_directory() {
        let root = tempdir().unwrap();

        let first = create_unused_dir(root.path(), "title").unwrap();
        assert_eq!(first, root.path().join("title"));
        assert!(first.is_dir());

        let second = create_unused_dir(root.path(), "title").unwrap();
        assert_eq!(second, root.path().join("title (2)"));
        assert!(second.is_dir());

        // A file squatting the next name is skipped, not replaced
        std::fs::write(root.path().join("title (3)"), b"not a dir").unwrap();
        let fourth = create_unused_dir(root.path(), "title").unwrap();
        assert_eq!(fourth, root.path().join("title (4)"));
        assert_eq!(
            std::fs::read(root.path().join("title (3)")).unwrap(),
            b"not a dir"
        );
    }

    #[test]
    fn creates_missing_roots() {
        let root = tempdir().unwrap();
        let nested = root.path().join("a").join("b");

        let dir = create_unused_dir(&nested, "title").unwrap();
        assert_eq!(dir, nested.join("title"));
        assert!(dir.is_dir());
    }

    #[test]
    fn scratch_files_are_removed_on_drop() {
        let dir = tempdir().unwrap();
        let kept = dir.path().join("kept.mp4");
        std::fs::write(&kept, b"out").unwrap();

        let mut scratch = ScratchFiles::new();
        let video = scratch.add(dir.path().join("a_video.m4s")).to_path_buf();
        std::fs::write(&video, b"v").unwrap();
        // Never created, must not be a problem
        scratch.add(dir.path().join("a_audio.m4s"));

        drop(scratch);
        assert!(!video.exists());
        assert!(kept.exists());
    }
}
