//! Seekable reader trait and bounds-checked helpers
//!
//! Every decoder in the crate works on a `SeekableReader`. The helpers here
//! are the only places that move the cursor to an absolute offset, and they
//! all refuse to go past the end of the stream.

use std::io::{Read, Seek, SeekFrom};

use crate::errors::{DecodeError, DecodeResult};

/// Trait for readers that can both read and seek
///
/// Files and in-memory cursors both qualify through the blanket
/// implementation below.
pub trait SeekableReader: Read + Seek + Send + Sync {}

impl<T: Read + Seek + Send + Sync> SeekableReader for T {}

/// Returns the total length of the stream, leaving the cursor where it was
pub fn stream_len(reader: &mut dyn SeekableReader) -> DecodeResult<u64> {
    let current_position = reader.stream_position()?;
    let len = reader.seek(SeekFrom::End(0))?;
    reader.seek(SeekFrom::Start(current_position))?;
    Ok(len)
}

/// Checks that `length` bytes starting at `offset` lie inside the stream
pub fn ensure_within(offset: u64, length: u64, stream_len: u64) -> DecodeResult<()> {
    match offset.checked_add(length) {
        Some(end) if end <= stream_len => Ok(()),
        _ => Err(DecodeError::OutOfBounds { offset, length, stream_len }),
    }
}

/// Seeks to `offset` after checking that `length` bytes are readable there
pub fn seek_checked(
    reader: &mut dyn SeekableReader,
    offset: u64,
    length: u64,
    stream_len: u64,
) -> DecodeResult<()> {
    ensure_within(offset, length, stream_len)?;
    reader.seek(SeekFrom::Start(offset))?;
    Ok(())
}

/// Reads exactly `length` bytes at `offset`, bounds-checked
///
/// The cursor is left just after the bytes that were read.
pub fn read_bytes_at(
    reader: &mut dyn SeekableReader,
    offset: u64,
    length: usize,
    stream_len: u64,
) -> DecodeResult<Vec<u8>> {
    seek_checked(reader, offset, length as u64, stream_len)?;
    let mut buffer = vec![0u8; length];
    reader.read_exact(&mut buffer)?;
    Ok(buffer)
}

/// Reads exactly `N` bytes from the current position, bounds-checked
pub fn read_array<const N: usize>(
    reader: &mut dyn SeekableReader,
    stream_len: u64,
) -> DecodeResult<[u8; N]> {
    let position = reader.stream_position()?;
    ensure_within(position, N as u64, stream_len)?;
    let mut buffer = [0u8; N];
    reader.read_exact(&mut buffer)?;
    Ok(buffer)
}
