/// Sentinel block marking end of the event stream; never surfaced to callers.
pub const DONE_MARKER: &str = "[DONE]";

/// Incremental decoder for SSE text streams.
///
/// Feed arbitrary byte chunks and drain complete event blocks. A chunk
/// boundary may fall anywhere, including inside a line or a UTF-8 code
/// point; the decoder buffers until a full line is available before acting.
///
/// Framing: `data:` lines contribute their left-trimmed remainder to the
/// current block, a blank line dispatches the block, `:` lines are comments,
/// and other SSE fields are ignored. Blocks containing [`DONE_MARKER`] are
/// suppressed.
#[derive(Debug, Default)]
pub struct SseFrameDecoder {
    /// Incomplete trailing UTF-8 sequence awaiting the next chunk.
    carry: Vec<u8>,
    line_buffer: String,
    block_buffer: String,
}

impl SseFrameDecoder {
    /// Feed one chunk and drain every block completed by it, in order.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        self.decode_chunk(bytes);

        let mut blocks = Vec::new();
        while let Some(eol) = self.line_buffer.find('\n') {
            let line = self.line_buffer[..eol].to_string();
            self.line_buffer.drain(..=eol);
            if let Some(block) = self.accept_line(&line) {
                blocks.push(block);
            }
        }

        blocks
    }

    /// Flush the dangling block when the source ends without a blank line.
    ///
    /// The final line may itself lack a trailing newline; it is processed as
    /// if terminated, then any buffered block is dispatched.
    pub fn finish(&mut self) -> Option<String> {
        if !self.carry.is_empty() {
            let carry = std::mem::take(&mut self.carry);
            self.line_buffer.push_str(&String::from_utf8_lossy(&carry));
        }

        let mut flushed = None;
        if !self.line_buffer.is_empty() {
            let line = std::mem::take(&mut self.line_buffer);
            flushed = self.accept_line(&line);
        }
        if flushed.is_none() && !self.block_buffer.is_empty() {
            flushed = self.dispatch_block();
        }

        flushed
    }

    pub fn is_empty(&self) -> bool {
        self.carry.is_empty() && self.line_buffer.is_empty() && self.block_buffer.is_empty()
    }

    /// Append a chunk to the line buffer, carrying incomplete UTF-8 tails.
    fn decode_chunk(&mut self, bytes: &[u8]) {
        let mut pending = std::mem::take(&mut self.carry);
        pending.extend_from_slice(bytes);
        let mut input: &[u8] = &pending;

        loop {
            match std::str::from_utf8(input) {
                Ok(text) => {
                    self.line_buffer.push_str(text);
                    break;
                }
                Err(error) => {
                    let valid = &input[..error.valid_up_to()];
                    self.line_buffer.push_str(&String::from_utf8_lossy(valid));
                    match error.error_len() {
                        // Incomplete trailing sequence; completed by the next chunk.
                        None => {
                            self.carry = input[error.valid_up_to()..].to_vec();
                            break;
                        }
                        Some(len) => {
                            self.line_buffer.push(char::REPLACEMENT_CHARACTER);
                            input = &input[error.valid_up_to() + len..];
                        }
                    }
                }
            }
        }
    }

    fn accept_line(&mut self, line: &str) -> Option<String> {
        if line.trim().is_empty() {
            if self.block_buffer.is_empty() {
                return None;
            }
            return self.dispatch_block();
        }

        if let Some(data) = line.strip_prefix("data:") {
            self.block_buffer.push_str(data.trim_start());
            self.block_buffer.push('\n');
        }
        // Comment lines (`:`) and reserved SSE fields are ignored.

        None
    }

    fn dispatch_block(&mut self) -> Option<String> {
        let buffered = std::mem::take(&mut self.block_buffer);
        let block = buffered.strip_suffix('\n').unwrap_or(&buffered);
        if block.contains(DONE_MARKER) {
            return None;
        }
        Some(block.to_string())
    }
}
