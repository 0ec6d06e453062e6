//! Read-only handle over an entry's payload.
//!
//! A [`File`] holds its own reference to the entry, so it stays readable
//! after the store evicts or replaces the key it was opened from.

use std::io::{self, BufRead, Read, Seek, SeekFrom, Write};
use std::sync::Arc;

use crate::entry::Entry;
use crate::error::{LazyFsError, LazyFsResult};
use crate::stat::FileStat;

#[derive(Debug, Clone, Copy, Default)]
struct Cursor {
    pos: u64,
    /// Position before the last `read_char`, cleared by every other operation.
    prev_char: Option<u64>,
}

/// An open entry.
///
/// Implements [`Read`], [`BufRead`] and [`Seek`], plus positional reads,
/// byte/char scanning and [`File::write_to`]. Once [`File::close`] is called
/// every operation fails with [`LazyFsError::Closed`].
#[derive(Debug)]
pub struct File {
    entry: Arc<Entry>,
    cursor: Option<Cursor>,
}

impl File {
    pub(crate) fn new(entry: Arc<Entry>) -> Self {
        Self {
            entry,
            cursor: Some(Cursor::default()),
        }
    }

    fn cursor(&self) -> io::Result<&Cursor> {
        self.cursor.as_ref().ok_or_else(|| LazyFsError::Closed.into())
    }

    fn cursor_mut(&mut self) -> io::Result<&mut Cursor> {
        self.cursor.as_mut().ok_or_else(|| LazyFsError::Closed.into())
    }

    fn data(&self) -> &[u8] {
        self.entry.payload()
    }

    /// Unread bytes starting at `pos`, empty when past the end.
    fn rest_at(&self, pos: u64) -> &[u8] {
        let data = self.data();
        let start = usize::try_from(pos).map_or(data.len(), |p| p.min(data.len()));
        &data[start..]
    }

    /// Release the handle. Closing twice is fine.
    pub fn close(&mut self) -> LazyFsResult<()> {
        self.cursor = None;
        Ok(())
    }

    /// True once [`File::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.cursor.is_none()
    }

    /// Metadata of the underlying entry.
    pub fn stat(&self) -> LazyFsResult<FileStat> {
        if self.is_closed() {
            return Err(LazyFsError::Closed);
        }
        Ok(FileStat::new(Arc::clone(&self.entry)))
    }

    /// Total payload length in bytes.
    pub fn len(&self) -> u64 {
        self.data().len() as u64
    }

    /// True if the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.data().is_empty()
    }

    /// Bytes left between the current position and the end.
    pub fn remaining(&self) -> io::Result<u64> {
        let pos = self.cursor()?.pos;
        Ok(self.rest_at(pos).len() as u64)
    }

    /// Read into `buf` starting at `offset` without moving the cursor.
    ///
    /// Returns 0 at or past the end.
    pub fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        self.cursor()?;
        let rest = self.rest_at(offset);
        let n = rest.len().min(buf.len());
        buf[..n].copy_from_slice(&rest[..n]);
        Ok(n)
    }

    /// Read a single byte. Fails with `UnexpectedEof` at the end.
    pub fn read_byte(&mut self) -> io::Result<u8> {
        let pos = self.cursor()?.pos;
        let byte = self
            .rest_at(pos)
            .first()
            .copied()
            .ok_or_else(|| io::Error::from(io::ErrorKind::UnexpectedEof))?;
        let cursor = self.cursor_mut()?;
        cursor.prev_char = None;
        cursor.pos += 1;
        Ok(byte)
    }

    /// Step back one byte.
    pub fn unread_byte(&mut self) -> io::Result<()> {
        let cursor = self.cursor_mut()?;
        if cursor.pos == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "at beginning of file",
            ));
        }
        cursor.prev_char = None;
        cursor.pos -= 1;
        Ok(())
    }

    /// Decode one UTF-8 character, returning it and its encoded width.
    ///
    /// Invalid or truncated sequences yield `U+FFFD` with a width of 1.
    pub fn read_char(&mut self) -> io::Result<(char, usize)> {
        let pos = self.cursor()?.pos;
        let rest = self.rest_at(pos);
        if rest.is_empty() {
            self.cursor_mut()?.prev_char = None;
            return Err(io::Error::from(io::ErrorKind::UnexpectedEof));
        }
        let (ch, width) = decode_char(rest);
        let cursor = self.cursor_mut()?;
        cursor.prev_char = Some(pos);
        cursor.pos += width as u64;
        Ok((ch, width))
    }

    /// Undo the immediately preceding `read_char`.
    pub fn unread_char(&mut self) -> io::Result<()> {
        let cursor = self.cursor_mut()?;
        match cursor.prev_char.take() {
            Some(prev) => {
                cursor.pos = prev;
                Ok(())
            }
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "previous operation was not read_char",
            )),
        }
    }

    /// Copy everything from the cursor to the end into `w`.
    pub fn write_to<W: Write + ?Sized>(&mut self, w: &mut W) -> io::Result<u64> {
        let pos = self.cursor()?.pos;
        let rest = self.rest_at(pos);
        w.write_all(rest)?;
        let n = rest.len() as u64;
        let cursor = self.cursor_mut()?;
        cursor.prev_char = None;
        cursor.pos = pos + n;
        Ok(n)
    }
}

fn decode_char(bytes: &[u8]) -> (char, usize) {
    let width = match bytes[0] {
        0x00..=0x7F => return (bytes[0] as char, 1),
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => return (char::REPLACEMENT_CHARACTER, 1),
    };
    bytes
        .get(..width)
        .and_then(|b| std::str::from_utf8(b).ok())
        .and_then(|s| s.chars().next())
        .map_or((char::REPLACEMENT_CHARACTER, 1), |c| (c, width))
}

impl Read for File {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let pos = self.cursor()?.pos;
        let rest = self.rest_at(pos);
        let n = rest.len().min(buf.len());
        buf[..n].copy_from_slice(&rest[..n]);
        let cursor = self.cursor_mut()?;
        cursor.prev_char = None;
        cursor.pos += n as u64;
        Ok(n)
    }
}

impl BufRead for File {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        let pos = self.cursor()?.pos;
        Ok(self.rest_at(pos))
    }

    fn consume(&mut self, amt: usize) {
        let len = self.len();
        if let Some(cursor) = self.cursor.as_mut() {
            cursor.prev_char = None;
            if cursor.pos < len {
                cursor.pos = cursor.pos.saturating_add(amt as u64).min(len);
            }
        }
    }
}

impl Seek for File {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let len = self.len();
        let cursor = self.cursor_mut()?;
        let target = match pos {
            SeekFrom::Start(n) => Some(n),
            SeekFrom::Current(delta) => cursor.pos.checked_add_signed(delta),
            SeekFrom::End(delta) => len.checked_add_signed(delta),
        }
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "negative position"))?;
        cursor.prev_char = None;
        cursor.pos = target;
        Ok(target)
    }
}
