//! Reader for collapsed ("folded") stack sample files.
//!
//! Format: one unique call path per line, frames joined by `;` from the
//! outermost frame to the leaf, followed by whitespace and a sample count.
//!
//! Example: "java.lang.Thread//run;com.example.Worker//loop 42"
//!
//! Reading is fail-fast: the first malformed line ends the stream with an
//! error that names the line, and nothing read before it should be used.

use crate::utils::config::FRAME_SEPARATOR;
use crate::utils::error::{MalformedReason, ParseError};
use log::debug;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// One collapsed stack line: an ordered stack and how often it was sampled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    /// Frames, outermost first
    pub frames: Vec<String>,

    /// Number of times this exact stack was observed (always > 0)
    pub count: u64,
}

impl Sample {
    pub fn new(frames: Vec<String>, count: u64) -> Self {
        Self { frames, count }
    }
}

/// Lazy iterator of samples over any buffered reader
///
/// Yields `Err` at most once; the iterator is exhausted after an error.
/// Lines are decoded one by one, so a line that is not UTF-8 is reported as
/// malformed with its number. The running sum of counts is checked so that
/// every tree built from the stream fits its totals in a `u64`.
pub struct SampleReader<R> {
    reader: R,
    buffer: Vec<u8>,
    origin: String,
    line_number: usize,
    total_count: u64,
    finished: bool,
}

impl<R: BufRead> SampleReader<R> {
    /// Wrap a reader. `origin` names the source in error messages.
    pub fn new(reader: R, origin: impl Into<String>) -> Self {
        Self {
            reader,
            buffer: Vec::new(),
            origin: origin.into(),
            line_number: 0,
            total_count: 0,
            finished: false,
        }
    }

    /// Number of lines consumed so far (blank lines included)
    pub fn lines_read(&self) -> usize {
        self.line_number
    }

    /// Read, decode and parse the next line; `Ok(None)` for a blank one
    fn next_line(&mut self) -> Result<Option<Sample>, ParseError> {
        let line_number = self.line_number;
        let bytes = strip_line_ending(&self.buffer);

        let Ok(line) = std::str::from_utf8(bytes) else {
            return Err(ParseError::MalformedLine {
                line_number,
                line: String::from_utf8_lossy(bytes).into_owned(),
                reason: MalformedReason::InvalidEncoding,
            });
        };

        let Some(sample) = parse_line(line, line_number)? else {
            return Ok(None);
        };

        match self.total_count.checked_add(sample.count) {
            Some(total) => {
                self.total_count = total;
                Ok(Some(sample))
            }
            None => Err(ParseError::MalformedLine {
                line_number,
                line: line.to_string(),
                reason: MalformedReason::TotalOverflow,
            }),
        }
    }
}

impl<R: BufRead> Iterator for SampleReader<R> {
    type Item = Result<Sample, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            self.buffer.clear();
            match self.reader.read_until(b'\n', &mut self.buffer) {
                Ok(0) => {
                    self.finished = true;
                    return None;
                }
                Ok(_) => self.line_number += 1,
                Err(source) => {
                    self.finished = true;
                    return Some(Err(ParseError::Io {
                        origin: self.origin.clone(),
                        source,
                    }));
                }
            }

            match self.next_line() {
                Ok(Some(sample)) => return Some(Ok(sample)),
                Ok(None) => continue,
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

/// Drop a trailing `\n` or `\r\n`
fn strip_line_ending(bytes: &[u8]) -> &[u8] {
    let bytes = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    bytes.strip_suffix(b"\r").unwrap_or(bytes)
}

/// Open a collapsed stack file for reading
///
/// The file handle lives inside the returned reader and is closed when the
/// reader is dropped, whether iteration finished, failed, or stopped early.
///
/// # Errors
/// * `ParseError::Io` - file missing or unreadable
pub fn open_samples(path: impl AsRef<Path>) -> Result<SampleReader<BufReader<File>>, ParseError> {
    let path = path.as_ref();
    debug!("Opening collapsed stacks: {}", path.display());

    let file = File::open(path).map_err(|source| ParseError::Io {
        origin: path.display().to_string(),
        source,
    })?;

    Ok(SampleReader::new(BufReader::new(file), path.display().to_string()))
}

/// Read every sample of a collapsed stack file into memory
pub fn read_samples(path: impl AsRef<Path>) -> Result<Vec<Sample>, ParseError> {
    open_samples(path)?.collect()
}

/// Parse a single collapsed stack line
///
/// Returns `Ok(None)` for blank lines.
///
/// # Errors
/// * `ParseError::MalformedLine` - no count, bad or zero count, empty stack,
///   or an empty frame between separators
pub fn parse_line(line: &str, line_number: usize) -> Result<Option<Sample>, ParseError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let malformed = |reason| ParseError::MalformedLine {
        line_number,
        line: line.to_string(),
        reason,
    };

    // The count follows the last whitespace run
    let Some((split_at, separator)) = trimmed
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
    else {
        // A lone number is a count without frames
        let reason = match parse_count(trimmed) {
            Ok(_) => MalformedReason::EmptyStack,
            Err(_) => MalformedReason::MissingCount,
        };
        return Err(malformed(reason));
    };

    let count_part = &trimmed[split_at + separator.len_utf8()..];
    let stack_part = trimmed[..split_at].trim_end();

    let count = parse_count(count_part).map_err(malformed)?;

    if stack_part.is_empty() {
        return Err(malformed(MalformedReason::EmptyStack));
    }

    let mut frames = Vec::new();
    for (position, frame) in stack_part.split(FRAME_SEPARATOR).enumerate() {
        if frame.is_empty() {
            return Err(malformed(MalformedReason::EmptyFrame { position }));
        }
        frames.push(frame.to_string());
    }

    Ok(Some(Sample::new(frames, count)))
}

/// Parse a base-10 positive sample count
fn parse_count(raw: &str) -> Result<u64, MalformedReason> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(MalformedReason::InvalidCount(raw.to_string()));
    }

    match raw.parse::<u64>() {
        Ok(0) => Err(MalformedReason::ZeroCount),
        Ok(count) => Ok(count),
        Err(_) => Err(MalformedReason::InvalidCount(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reason_of(line: &str) -> MalformedReason {
        match parse_line(line, 7) {
            Err(ParseError::MalformedLine {
                line_number,
                reason,
                ..
            }) => {
                assert_eq!(line_number, 7);
                reason
            }
            other => panic!("expected malformed line, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_line_basic() {
        let sample = parse_line("frameA;frameB;frameC 42", 1).unwrap().unwrap();
        assert_eq!(sample.frames, vec!["frameA", "frameB", "frameC"]);
        assert_eq!(sample.count, 42);
    }

    #[test]
    fn test_parse_line_splits_at_last_whitespace_run() {
        let sample = parse_line("a b;c\t \t 9\r", 1).unwrap().unwrap();
        assert_eq!(sample.frames, vec!["a b", "c"]);
        assert_eq!(sample.count, 9);
    }

    #[test]
    fn test_parse_line_blank() {
        assert!(parse_line("", 1).unwrap().is_none());
        assert!(parse_line("   \t", 1).unwrap().is_none());
    }

    #[test]
    fn test_parse_line_missing_count() {
        assert_eq!(reason_of("onlyframes_no_count"), MalformedReason::MissingCount);
    }

    #[test]
    fn test_parse_line_invalid_count() {
        assert_eq!(
            reason_of("a;b 12x"),
            MalformedReason::InvalidCount("12x".to_string())
        );
        assert_eq!(
            reason_of("a;b -3"),
            MalformedReason::InvalidCount("-3".to_string())
        );
        assert_eq!(
            reason_of("a;b 99999999999999999999999"),
            MalformedReason::InvalidCount("99999999999999999999999".to_string())
        );
    }

    #[test]
    fn test_parse_line_count_without_frames() {
        assert_eq!(reason_of("  17"), MalformedReason::EmptyStack);
    }

    #[test]
    fn test_parse_line_zero_count() {
        assert_eq!(reason_of("a;b 0"), MalformedReason::ZeroCount);
    }

    #[test]
    fn test_parse_line_empty_frame() {
        assert_eq!(
            reason_of("a;;b 3"),
            MalformedReason::EmptyFrame { position: 1 }
        );
        assert_eq!(
            reason_of("a;b; 3"),
            MalformedReason::EmptyFrame { position: 2 }
        );
    }

    #[test]
    fn test_reader_skips_blank_lines_and_counts_lines() {
        let input = "a;b 1\n\nc 2\n";
        let mut reader = SampleReader::new(input.as_bytes(), "memory");

        assert_eq!(reader.next().unwrap().unwrap().count, 1);
        assert_eq!(reader.next().unwrap().unwrap().frames, vec!["c"]);
        assert!(reader.next().is_none());
        assert_eq!(reader.lines_read(), 3);
    }

    #[test]
    fn test_reader_stops_after_error() {
        let input = "a 1\nbroken\nb 2\n";
        let mut reader = SampleReader::new(input.as_bytes(), "memory");

        assert!(reader.next().unwrap().is_ok());
        let err = reader.next().unwrap().unwrap_err();
        assert_eq!(err.line_number(), Some(2));
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_reader_reports_invalid_utf8_line() {
        let input: &[u8] = b"a;b 1\nc;\xff\xfe 2\nd 3\n";
        let mut reader = SampleReader::new(input, "memory");

        assert!(reader.next().unwrap().is_ok());
        match reader.next().unwrap() {
            Err(ParseError::MalformedLine {
                line_number,
                line,
                reason,
            }) => {
                assert_eq!(line_number, 2);
                assert_eq!(reason, MalformedReason::InvalidEncoding);
                assert!(line.starts_with("c;"));
                assert!(line.ends_with(" 2"));
            }
            other => panic!("expected malformed line, got {:?}", other),
        }
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_reader_handles_crlf_and_missing_final_newline() {
        let input = "a;b 1\r\nc 2";
        let samples: Vec<Sample> = SampleReader::new(input.as_bytes(), "memory")
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(samples[0], Sample::new(vec!["a".into(), "b".into()], 1));
        assert_eq!(samples[1], Sample::new(vec!["c".into()], 2));
    }

    #[test]
    fn test_reader_rejects_total_overflow() {
        let input = "a;b 18446744073709551615\na;c 2\n";
        let mut reader = SampleReader::new(input.as_bytes(), "memory");

        assert_eq!(reader.next().unwrap().unwrap().count, u64::MAX);
        let err = reader.next().unwrap().unwrap_err();
        assert_eq!(err.line_number(), Some(2));
        assert!(err.to_string().contains("a;c 2"));
    }

    #[test]
    fn test_open_missing_file() {
        let result = open_samples("/definitely/not/here.collapsed");
        assert!(matches!(result, Err(ParseError::Io { .. })));
    }
}
