//! Helper functions shared by tree operations and the archive codec.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use crate::file_system::volume::Volume;

/// Copies everything from `input` to `output` through a buffer of `buffer_size` bytes.
pub(crate) fn stream(input: &mut dyn Read, output: &mut dyn Write, buffer_size: usize) -> io::Result<u64> {
    let mut buffer = vec![0u8; buffer_size.max(1)];
    let mut total = 0u64;
    loop {
        let read = match input.read(&mut buffer) {
            Ok(0) => return Ok(total),
            Ok(read) => read,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        output.write_all(&buffer[..read])?;
        total += read as u64;
    }
}

/// Children of a directory, sorted by name so traversal order is deterministic.
pub(crate) fn sorted_children(directory: &Path) -> io::Result<Vec<PathBuf>> {
    let mut children = fs::read_dir(directory)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<io::Result<Vec<_>>>()?;
    children.sort();
    Ok(children)
}

/// Deletes `path` with the first volume that manages to.
pub(crate) fn delete_with_fallback(volumes: &[&dyn Volume], path: &Path) -> bool {
    for volume in volumes {
        match volume.delete_recursive(path) {
            Ok(()) => return true,
            Err(e) => log::debug!("Delete: {} volume couldn't delete {}: {}", volume.name(), path.display(), e),
        }
    }
    false
}

/// Flushes file system buffers in the background after a completed write operation.
pub(crate) fn spawn_async_sync() {
    std::thread::spawn(|| {
        // On Unix, call sync() to flush all filesystem buffers
        #[cfg(unix)]
        unsafe {
            libc::sync();
        }
    });
}
