//! Positional file I/O
//!
//! Every store reads and writes at explicit byte offsets and never moves a
//! shared file cursor, so `&File` can be used from many threads at once.
//! On Unix this is `pread(2)`/`pwrite(2)` via [`std::os::unix::fs::FileExt`].
//! On Windows `seek_read`/`seek_write` move the cursor, which is harmless here
//! because no code path relies on it.

use std::fs::File;
use std::io;

#[cfg(unix)]
use std::os::unix::fs::FileExt;
#[cfg(windows)]
use std::os::windows::fs::FileExt;

/// A source of bytes addressable by absolute offset.
pub trait PositionalRead {
    /// Reads into `buf` starting at `offset`.
    ///
    /// Keeps reading until `buf` is full or the end of data is reached and
    /// returns the number of bytes filled. A short count means end of data.
    fn read_at_most(&self, buf: &mut [u8], offset: u64) -> io::Result<usize>;
}

impl PositionalRead for File {
    fn read_at_most(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match read_once(self, &mut buf[filled..], offset + filled as u64) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }
}

impl PositionalRead for [u8] {
    fn read_at_most(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        let start = match usize::try_from(offset) {
            Ok(start) if start < self.len() => start,
            _ => return Ok(0),
        };
        let n = buf.len().min(self.len() - start);
        buf[..n].copy_from_slice(&self[start..start + n]);
        Ok(n)
    }
}

impl PositionalRead for Vec<u8> {
    fn read_at_most(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        self.as_slice().read_at_most(buf, offset)
    }
}

#[cfg(unix)]
fn read_once(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    file.read_at(buf, offset)
}

#[cfg(windows)]
fn read_once(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    file.seek_read(buf, offset)
}

/// Writes all of `data` to `file` at byte `offset`.
#[cfg(unix)]
pub fn write_all_at(file: &File, data: &[u8], offset: u64) -> io::Result<()> {
    file.write_all_at(data, offset)
}

/// Windows fallback for positional writes.
#[cfg(windows)]
pub fn write_all_at(file: &File, data: &[u8], offset: u64) -> io::Result<()> {
    let mut pos = 0;
    while pos < data.len() {
        let n = file.seek_write(&data[pos..], offset + pos as u64)?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                "failed to write whole buffer",
            ));
        }
        pos += n;
    }
    Ok(())
}
