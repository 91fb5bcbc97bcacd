use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use thiserror::Error;

/// How many bytes to pull per backward read. Bounds memory use regardless
/// of file size.
const CHUNK_SIZE: usize = 8 * 1024;

#[derive(Debug, Error)]
pub enum TailError {
    #[error("log file not found at {}", .0.display())]
    NotFound(PathBuf),
    #[error("{0}")]
    Read(#[from] io::Error),
}

/// Read the last `n` lines of the file at `path`, oldest first.
///
/// Scans backward from end-of-file in bounded chunks, so only the chunk
/// buffer, the line in progress, and up to `n` finished lines are ever
/// held in memory. A `\n` run produces no empty lines: only accumulated
/// byte runs become lines, and a final line without a trailing newline
/// still counts. Invalid UTF-8 is replaced per line, never an error.
pub fn tail(path: &Path, n: usize) -> Result<Vec<String>, TailError> {
    let mut file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => TailError::NotFound(path.to_path_buf()),
        _ => TailError::Read(e),
    })?;

    let size = file.metadata()?.len();
    if size == 0 || n == 0 {
        return Ok(Vec::new());
    }

    let mut lines: Vec<String> = Vec::new();
    // Bytes of the line currently being assembled, in reverse order.
    let mut pending: Vec<u8> = Vec::new();
    let mut chunk = vec![0u8; CHUNK_SIZE];
    let mut pos = size;

    'scan: while pos > 0 {
        let read_len = pos.min(CHUNK_SIZE as u64) as usize;
        pos -= read_len as u64;
        file.seek(SeekFrom::Start(pos))?;
        file.read_exact(&mut chunk[..read_len])?;

        for &byte in chunk[..read_len].iter().rev() {
            if byte == b'\n' {
                if !pending.is_empty() {
                    lines.push(take_line(&mut pending));
                    if lines.len() == n {
                        break 'scan;
                    }
                }
            } else {
                pending.push(byte);
            }
        }
    }

    // Whatever is left belongs to the first line of the file.
    if lines.len() < n && !pending.is_empty() {
        lines.push(take_line(&mut pending));
    }

    lines.reverse();
    Ok(lines)
}

/// Flip the reversed bytes forward and decode leniently.
fn take_line(pending: &mut Vec<u8>) -> String {
    pending.reverse();
    let line = String::from_utf8_lossy(pending).into_owned();
    pending.clear();
    line
}
