use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

/// Longest line accepted, terminator excluded.
pub const MAX_LINE_LEN: usize = 8 * 1024;

const READ_CHUNK: usize = 1024;

/// Reads `\n` (or `\r\n`) terminated lines off any byte stream.
///
/// Bytes past the returned line stay buffered for the next call.
pub struct LineReader {
    buffer: BytesMut,
    eof: bool,
}

impl LineReader {
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(READ_CHUNK),
            eof: false,
        }
    }

    /// Returns the next line without its terminator, or `None` once the peer
    /// has closed and nothing is left. A final unterminated line is returned
    /// as-is.
    pub async fn read_line<R>(&mut self, stream: &mut R) -> anyhow::Result<Option<String>>
    where
        R: AsyncRead + Unpin,
    {
        loop {
            if let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
                let len = if pos > 0 && self.buffer[pos - 1] == b'\r' { pos - 1 } else { pos };
                if len > MAX_LINE_LEN {
                    anyhow::bail!("line exceeds {} bytes", MAX_LINE_LEN);
                }
                let mut line = self.buffer.split_to(pos + 1);
                line.truncate(len);
                return Ok(Some(String::from_utf8_lossy(&line).into_owned()));
            }

            // One spare byte for a pending `\r`
            if self.buffer.len() > MAX_LINE_LEN + 1 {
                anyhow::bail!("line exceeds {} bytes", MAX_LINE_LEN);
            }

            if self.eof {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                let rest = String::from_utf8_lossy(&self.buffer).into_owned();
                self.buffer.advance(self.buffer.len());
                return Ok(Some(rest));
            }

            let mut temp = [0u8; READ_CHUNK];
            let n = stream.read(&mut temp).await?;

            if n == 0 {
                self.eof = true;
                continue;
            }

            self.buffer.extend_from_slice(&temp[..n]);
        }
    }
}

impl Default for LineReader {
    fn default() -> Self {
        Self::new()
    }
}
