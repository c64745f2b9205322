//! Re-rooting of source paths under the destination tree.

use alac_av::TARGET_EXTENSION;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// Errors produced while mapping source paths to destination paths.
#[derive(Debug, thiserror::Error)]
pub enum MirrorPathError {
    #[error("{} is not inside the base directory {}", path.display(), base.display())]
    OutsideBase { path: PathBuf, base: PathBuf },

    #[error("cannot determine the name of base directory {}", base.display())]
    UnnamedBase { base: PathBuf },

    #[error("{} does not end with .{extension}", name.to_string_lossy())]
    ExtensionMismatch { name: OsString, extension: String },
}

/// A source file and the destination it converts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionJob {
    pub source: PathBuf,
    pub dest: PathBuf,
}

/// Maps directories under the source base onto the destination tree.
///
/// A directory's mirror is the mirror base joined with its path relative to
/// the source base. The mirror base is the target root, or the target root
/// plus the source base's final component when `keep_base_name` is set.
#[derive(Debug, Clone)]
pub struct MirrorLayout {
    source_base: PathBuf,
    mirror_base: PathBuf,
}

impl MirrorLayout {
    pub fn new(
        source_base: &Path,
        target_root: &Path,
        keep_base_name: bool,
    ) -> Result<Self, MirrorPathError> {
        let mirror_base = if keep_base_name {
            let name = match source_base.file_name() {
                Some(name) => name.to_os_string(),
                None => source_base
                    .canonicalize()
                    .ok()
                    .and_then(|p| p.file_name().map(|n| n.to_os_string()))
                    .ok_or_else(|| MirrorPathError::UnnamedBase {
                        base: source_base.to_path_buf(),
                    })?,
            };
            target_root.join(name)
        } else {
            target_root.to_path_buf()
        };

        Ok(Self {
            source_base: source_base.to_path_buf(),
            mirror_base,
        })
    }

    /// Root of the mirrored tree.
    pub fn mirror_base(&self) -> &Path {
        &self.mirror_base
    }

    /// Mirror of a directory under the source base.
    pub fn mirror_dir(&self, dir: &Path) -> Result<PathBuf, MirrorPathError> {
        let relative = dir
            .strip_prefix(&self.source_base)
            .map_err(|_| MirrorPathError::OutsideBase {
                path: dir.to_path_buf(),
                base: self.source_base.clone(),
            })?;

        if relative.as_os_str().is_empty() {
            Ok(self.mirror_base.clone())
        } else {
            Ok(self.mirror_base.join(relative))
        }
    }

    /// Build the job converting `dir/name` into the mirrored directory.
    pub fn job(
        &self,
        dir: &Path,
        mirrored_dir: &Path,
        name: &OsStr,
        extension: &str,
    ) -> Result<ConversionJob, MirrorPathError> {
        let dest_name = target_file_name(name, extension)?;
        Ok(ConversionJob {
            source: dir.join(name),
            dest: mirrored_dir.join(dest_name),
        })
    }
}

/// Replace the trailing `.<extension>` of `name` with `.m4a`.
///
/// Works on the raw name bytes, so names that are not valid UTF-8 keep their
/// stem unchanged.
pub fn target_file_name(name: &OsStr, extension: &str) -> Result<OsString, MirrorPathError> {
    let stem = name
        .as_encoded_bytes()
        .strip_suffix(extension.as_bytes())
        .and_then(|stem| stem.strip_suffix(b"."))
        .ok_or_else(|| MirrorPathError::ExtensionMismatch {
            name: name.to_os_string(),
            extension: extension.to_string(),
        })?;

    // SAFETY: `stem` comes from `name.as_encoded_bytes()` and ends right
    // before an ASCII '.', which is a valid split point for encoded bytes.
    let mut renamed = unsafe { OsStr::from_encoded_bytes_unchecked(stem) }.to_os_string();
    renamed.push(".");
    renamed.push(TARGET_EXTENSION);
    Ok(renamed)
}
