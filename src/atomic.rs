//! Temp files for write-then-rename updates.
//!
//! The temp file lives in the destination's directory so the final rename
//! never crosses a filesystem. `tempfile` creates it owner-only; it is
//! widened to the destination's current mode, or `0644` for a new file, so
//! a web server running as another user can still read the result.

use std::fs::File;
use std::io;
use std::path::Path;
use tempfile::NamedTempFile;

/// Mode given to files that did not exist before.
#[cfg(unix)]
pub(crate) const NEW_FILE_MODE: u32 = 0o644;

/// Directory that holds `path`, `.` for a bare file name.
pub(crate) fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

/// Create a temp file next to `destination`, ready to be persisted over it.
pub(crate) fn sibling_temp_file(destination: &Path) -> io::Result<NamedTempFile> {
    let file = NamedTempFile::new_in(parent_dir(destination))?;
    match_permissions(file.as_file(), destination)?;
    Ok(file)
}

fn match_permissions(file: &File, destination: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(destination)
            .map(|m| m.permissions().mode() & 0o7777)
            .unwrap_or(NEW_FILE_MODE);
        file.set_permissions(std::fs::Permissions::from_mode(mode))?;
    }
    #[cfg(not(unix))]
    let _ = (file, destination);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn parent_dir_of_bare_name_is_cwd() {
        assert_eq!(parent_dir(Path::new("thumbs.json")), Path::new("."));
        assert_eq!(parent_dir(Path::new("/booth/thumbs.json")), Path::new("/booth"));
    }

    #[test]
    fn temp_file_is_created_next_to_destination() {
        let tmp = tempfile::TempDir::new().unwrap();
        let file = sibling_temp_file(&tmp.path().join("thumbs.json")).unwrap();
        assert_eq!(file.path().parent(), Some(tmp.path()));
    }

    #[test]
    fn missing_directory_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        assert!(sibling_temp_file(&tmp.path().join("missing/thumbs.json")).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn new_file_gets_world_readable_mode() {
        use std::os::unix::fs::PermissionsExt;
        let tmp = tempfile::TempDir::new().unwrap();
        let file = sibling_temp_file(&tmp.path().join("thumbs.json")).unwrap();
        let mode = fs::metadata(file.path()).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, NEW_FILE_MODE);
    }

    #[cfg(unix)]
    #[test]
    fn existing_file_mode_is_kept() {
        use std::os::unix::fs::PermissionsExt;
        let tmp = tempfile::TempDir::new().unwrap();
        let destination = tmp.path().join("thumbs.json");
        fs::write(&destination, "[]").unwrap();
        fs::set_permissions(&destination, fs::Permissions::from_mode(0o664)).unwrap();

        let file = sibling_temp_file(&destination).unwrap();
        let mode = fs::metadata(file.path()).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o664);
    }
}
