use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Sibling path used as the intermediate file for [`write_atomic`].
pub fn tmp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

/// Replace `path` with `contents` via a temporary sibling and a rename.
///
/// Permissions of an existing file carry over. On failure the temporary file
/// is removed and `path` is left as it was.
pub fn write_atomic(path: &Path, contents: &str) -> io::Result<()> {
    let tmp = tmp_path(path);
    let result = (|| {
        fs::write(&tmp, contents)?;
        if let Ok(metadata) = fs::metadata(path) {
            fs::set_permissions(&tmp, metadata.permissions())?;
        }
        fs::rename(&tmp, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

const MAX_LINK_DEPTH: usize = 40;

/// Follow `path` through any symlinks so a rename replaces the real file.
///
/// The destination need not exist; a dangling link resolves to the file it
/// names. Relative targets are taken against the link's directory.
pub fn resolve_link(path: &Path) -> PathBuf {
    let mut current = path.to_path_buf();
    for _ in 0..MAX_LINK_DEPTH {
        let Ok(target) = fs::read_link(&current) else {
            break;
        };
        current = match current.parent() {
            Some(parent) if target.is_relative() => parent.join(target),
            _ => target,
        };
    }
    current
}
