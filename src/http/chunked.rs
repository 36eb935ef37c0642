//! Chunked transfer decoding for response bodies
//!
//! Requests always carry a `Content-Length`, so only the decoding side of
//! chunked transfer encoding is needed.

use super::{Error, Result};

/// Incremental chunked decoder
#[derive(Debug)]
pub struct ChunkedDecoder {
    state: DecoderState,
    chunk_size: usize,
    chunk_read: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DecoderState {
    ChunkSize,
    ChunkData,
    ChunkEnd,
    Trailer,
    Complete,
}

impl ChunkedDecoder {
    pub fn new() -> Self {
        ChunkedDecoder {
            state: DecoderState::ChunkSize,
            chunk_size: 0,
            chunk_read: 0,
        }
    }

    /// Decode as much of `input` as possible, appending data to `output`
    ///
    /// Returns the number of input bytes consumed. Unconsumed bytes must be
    /// passed again, with more data appended, on the next call.
    pub fn decode(&mut self, input: &[u8], output: &mut Vec<u8>) -> Result<usize> {
        let mut pos = 0;

        while pos < input.len() {
            match self.state {
                DecoderState::ChunkSize => {
                    let Some(crlf_pos) = find_crlf(&input[pos..]) else {
                        break;
                    };
                    let line = String::from_utf8_lossy(&input[pos..pos + crlf_pos]);

                    // Chunk extensions after ';' are ignored
                    let size_str = line.split(';').next().unwrap_or_default().trim();
                    self.chunk_size = usize::from_str_radix(size_str, 16)
                        .map_err(|_| Error::InvalidChunkSize(size_str.to_string()))?;

                    pos += crlf_pos + 2;
                    self.chunk_read = 0;
                    self.state = if self.chunk_size == 0 {
                        DecoderState::Trailer
                    } else {
                        DecoderState::ChunkData
                    };
                }

                DecoderState::ChunkData => {
                    let remaining = self.chunk_size - self.chunk_read;
                    let to_copy = remaining.min(input.len() - pos);

                    output.extend_from_slice(&input[pos..pos + to_copy]);
                    pos += to_copy;
                    self.chunk_read += to_copy;

                    if self.chunk_read == self.chunk_size {
                        self.state = DecoderState::ChunkEnd;
                    }
                }

                DecoderState::ChunkEnd => {
                    if input.len() - pos < 2 {
                        break;
                    }
                    if &input[pos..pos + 2] != b"\r\n" {
                        return Err(Error::Protocol("Expected CRLF after chunk".to_string()));
                    }
                    pos += 2;
                    self.state = DecoderState::ChunkSize;
                }

                DecoderState::Trailer => {
                    let Some(crlf_pos) = find_crlf(&input[pos..]) else {
                        break;
                    };
                    pos += crlf_pos + 2;
                    // An empty line ends the trailer section
                    if crlf_pos == 0 {
                        self.state = DecoderState::Complete;
                    }
                }

                DecoderState::Complete => break,
            }
        }

        Ok(pos)
    }

    pub fn is_complete(&self) -> bool {
        self.state == DecoderState::Complete
    }

    pub fn reset(&mut self) {
        self.state = DecoderState::ChunkSize;
        self.chunk_size = 0;
        self.chunk_read = 0;
    }
}

impl Default for ChunkedDecoder {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}

/// Decode a complete chunked body
pub fn decode_chunked_body(input: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = ChunkedDecoder::new();
    let mut output = Vec::new();
    decoder.decode(input, &mut output)?;

    if !decoder.is_complete() {
        return Err(Error::Incomplete);
    }

    Ok(output)
}
