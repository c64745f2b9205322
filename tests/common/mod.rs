//! Shared helpers for integration tests.
//!
//! Provides a sample source tree and a stub `ffmpeg` shell script that
//! records its arguments and creates the destination file, so conversions can
//! be exercised without a real transcoder.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// Build `base/album1/track1.flac`, `base/album2/sub/track2.flac`, an empty
/// directory and a non-matching file. Returns the base directory.
pub fn sample_tree(root: &Path) -> PathBuf {
    let base = root.join("base");
    fs::create_dir_all(base.join("album1")).unwrap();
    fs::create_dir_all(base.join("album2/sub")).unwrap();
    fs::create_dir_all(base.join("empty")).unwrap();
    fs::write(base.join("album1/track1.flac"), b"flac").unwrap();
    fs::write(base.join("album1/cover.jpg"), b"jpg").unwrap();
    fs::write(base.join("album2/sub/track2.flac"), b"flac").unwrap();
    base
}

/// Stub transcoder that appends its arguments to `log` and touches its last
/// argument.
#[cfg(unix)]
pub fn stub_ffmpeg(dir: &Path, log: &Path) -> PathBuf {
    let script = format!(
        "#!/bin/sh\nprintf '%s\\n' \"$*\" >> '{}'\nfor last; do :; done\n: > \"$last\"\n",
        log.display()
    );
    write_script(dir, "fake-ffmpeg", &script)
}

/// Stub transcoder that records how many instances were running at once.
#[cfg(unix)]
pub fn counting_ffmpeg(dir: &Path, running: &Path, counts: &Path) -> PathBuf {
    fs::create_dir_all(running).unwrap();
    let script = format!(
        "#!/bin/sh\nfor last; do :; done\nmarker='{running}'/$$\n: > \"$marker\"\nsleep 0.2\nls '{running}' | wc -l >> '{counts}'\nrm -f \"$marker\"\n: > \"$last\"\n",
        running = running.display(),
        counts = counts.display()
    );
    write_script(dir, "counting-ffmpeg", &script)
}

#[cfg(unix)]
fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}
