//! Framing of buffered entries.
//!
//! A record is the level byte followed by the entry, which itself ends with
//! `\n`. Records are concatenated with no extra separator, so the decoder
//! splits on newlines and strips the leading level byte. This only works
//! because no [`Level::as_byte`] code equals `b'\n'` and entries carry no
//! embedded newline; [`encode_record`] enforces the latter.

use crate::TriggerError;
use condlog_ports::Level;

/// One decoded record borrowing from the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record<'a> {
    /// Severity of the entry.
    pub level: Level,
    /// Entry bytes including the trailing newline.
    pub entry: &'a [u8],
}

/// Append one record to `buffer`.
///
/// The buffer is left untouched when the entry is rejected.
pub fn encode_record(
    buffer: &mut Vec<u8>,
    level: Level,
    entry: &[u8],
) -> Result<(), TriggerError> {
    match entry.split_last() {
        Some((&b'\n', body)) if !body.contains(&b'\n') => {},
        _ => return Err(TriggerError::UnterminatedEntry),
    }

    buffer.reserve(entry.len() + 1);
    buffer.push(level.as_byte());
    buffer.extend_from_slice(entry);
    Ok(())
}

/// Iterate over the records of `buffer` in the order they were appended.
pub const fn decode_records(buffer: &[u8]) -> Records<'_> {
    Records {
        rest: buffer,
        offset: 0,
    }
}

/// Iterator returned by [`decode_records`].
///
/// Yields an error and stops at the first malformed record.
#[derive(Debug, Clone)]
pub struct Records<'a> {
    rest: &'a [u8],
    offset: usize,
}

impl<'a> Iterator for Records<'a> {
    type Item = Result<Record<'a>, TriggerError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }

        let offset = self.offset;
        let record = self
            .rest
            .iter()
            .position(|byte| *byte == b'\n')
            .and_then(|end| self.rest.split_at_checked(end + 1))
            .and_then(|(line, rest)| {
                let (code, entry) = line.split_first()?;
                let level = Level::from_byte(*code)?;
                Some((Record { level, entry }, rest, line.len()))
            });

        match record {
            Some((record, rest, consumed)) if !record.entry.is_empty() => {
                self.rest = rest;
                self.offset += consumed;
                Some(Ok(record))
            },
            _ => {
                self.rest = &[];
                Some(Err(TriggerError::CorruptRecord { offset }))
            },
        }
    }
}
