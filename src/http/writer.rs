use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::http::response::ResponseHead;

/// Body files are copied to the socket in chunks of this size.
pub const BODY_CHUNK_SIZE: usize = 1024;

/// A response ready to go out: the serialized header block and, when the
/// request calls for one, the already opened body file.
pub struct ResponseWriter {
    head: ResponseHead,
    buffer: Vec<u8>,
    written: usize,
    body: Option<File>,
}

impl ResponseWriter {
    pub fn new(head: ResponseHead, body: Option<File>) -> Self {
        Self {
            buffer: head.header_block().into_bytes(),
            head,
            written: 0,
            body,
        }
    }

    pub fn head(&self) -> &ResponseHead {
        &self.head
    }

    /// Writes the header block, then the body, then flushes. Returns the
    /// number of body bytes sent.
    pub async fn write_to_stream<W>(&mut self, stream: &mut W) -> anyhow::Result<u64>
    where
        W: AsyncWrite + Unpin,
    {
        while self.written < self.buffer.len() {
            let n = stream
                .write(&self.buffer[self.written..])
                .await?;

            if n == 0 {
                return Err(anyhow::anyhow!("connection closed while writing"));
            }

            self.written += n;
        }

        let mut sent = 0u64;
        if let Some(file) = self.body.as_mut() {
            let mut chunk = [0u8; BODY_CHUNK_SIZE];
            loop {
                let n = file.read(&mut chunk).await?;
                if n == 0 {
                    break;
                }
                stream.write_all(&chunk[..n]).await?;
                sent += n as u64;
            }
        }

        stream.flush().await?;
        Ok(sent)
    }
}
