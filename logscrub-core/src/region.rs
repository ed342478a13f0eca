//! region.rs - Range-checked access to a mutable byte buffer.
//!
//! The engine never touches raw offsets into a mapping. It goes through
//! [`ByteRegion`], whose reads and overwrites are bounds-checked and whose
//! overwrites can never change the buffer's length.
//!
//! License: MIT OR APACHE 2.0

use std::ops::Range;

use crate::errors::ScrubError;

/// A fixed-length, mutable byte buffer with a range-scoped flush.
pub trait ByteRegion {
    /// The region's length in bytes. Constant for the region's lifetime.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrows `range` of the live buffer.
    fn read(&self, range: Range<usize>) -> Result<&[u8], ScrubError>;

    /// Overwrites `bytes.len()` bytes starting at `offset`.
    fn overwrite(&mut self, offset: usize, bytes: &[u8]) -> Result<(), ScrubError>;

    /// Commits `range` to backing storage. A no-op for purely in-memory regions.
    fn flush_range(&mut self, range: Range<usize>) -> Result<(), ScrubError>;
}

/// Validates `range` against a region of `len` bytes.
pub(crate) fn check_range(range: &Range<usize>, len: usize) -> Result<(), ScrubError> {
    if range.start > range.end || range.end > len {
        return Err(ScrubError::RangeOutOfBounds {
            start: range.start,
            end: range.end,
            len,
        });
    }
    Ok(())
}

/// Validates an overwrite of `count` bytes at `offset` and returns its range.
pub(crate) fn overwrite_range(offset: usize, count: usize, len: usize) -> Result<Range<usize>, ScrubError> {
    let end = offset.checked_add(count).ok_or(ScrubError::RangeOutOfBounds {
        start: offset,
        end: usize::MAX,
        len,
    })?;
    let range = offset..end;
    check_range(&range, len)?;
    Ok(range)
}

impl ByteRegion for Vec<u8> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn read(&self, range: Range<usize>) -> Result<&[u8], ScrubError> {
        check_range(&range, self.as_slice().len())?;
        Ok(&self[range])
    }

    fn overwrite(&mut self, offset: usize, bytes: &[u8]) -> Result<(), ScrubError> {
        let range = overwrite_range(offset, bytes.len(), self.as_slice().len())?;
        self[range].copy_from_slice(bytes);
        Ok(())
    }

    fn flush_range(&mut self, range: Range<usize>) -> Result<(), ScrubError> {
        check_range(&range, self.as_slice().len())
    }
}
