use crate::foundation::error::{GifError, GifResult};
use std::io::Write;
use std::sync::mpsc;

/// Consumer of encoded bytes.
///
/// The encoder calls `write_chunk` every time a call appends bytes to the stream (header, each
/// frame, trailer) and `finish` once after the trailer. Chunks arrive in stream order and their
/// concatenation is the complete GIF.
pub trait OutputSink: Send {
    /// Accept the next run of encoded bytes.
    fn write_chunk(&mut self, chunk: &[u8]) -> GifResult<()>;
    /// Terminal signal: the trailer has been delivered and no more chunks follow.
    fn finish(&mut self) -> GifResult<()> {
        Ok(())
    }
}

/// Events delivered by a [`ChannelOutput`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputEvent {
    /// Next run of encoded bytes.
    Bytes(Vec<u8>),
    /// The trailer was delivered; no more bytes follow.
    Finished,
}

/// Forwards chunks over a `std::sync::mpsc` channel so a transport can drain them elsewhere.
#[derive(Debug)]
pub struct ChannelOutput {
    tx: mpsc::Sender<OutputEvent>,
}

/// Create a channel-backed output and the receiving half for the transport.
pub fn channel_output() -> (ChannelOutput, mpsc::Receiver<OutputEvent>) {
    let (tx, rx) = mpsc::channel();
    (ChannelOutput { tx }, rx)
}

impl OutputSink for ChannelOutput {
    fn write_chunk(&mut self, chunk: &[u8]) -> GifResult<()> {
        self.tx
            .send(OutputEvent::Bytes(chunk.to_vec()))
            .map_err(|_| GifError::sink("output channel receiver was dropped"))
    }

    fn finish(&mut self) -> GifResult<()> {
        self.tx
            .send(OutputEvent::Finished)
            .map_err(|_| GifError::sink("output channel receiver was dropped"))
    }
}

/// Streams chunks into any [`std::io::Write`] implementation (file, socket, `Vec<u8>`).
#[derive(Debug)]
pub struct WriterOutput<W: Write + Send> {
    inner: W,
}

impl<W: Write + Send> WriterOutput<W> {
    /// Wrap a writer. Chunks are written as they arrive and flushed on finish.
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Borrow the wrapped writer.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Unwrap the writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write + Send> OutputSink for WriterOutput<W> {
    fn write_chunk(&mut self, chunk: &[u8]) -> GifResult<()> {
        use anyhow::Context as _;
        self.inner
            .write_all(chunk)
            .context("failed to write encoded gif bytes")?;
        Ok(())
    }

    fn finish(&mut self) -> GifResult<()> {
        use anyhow::Context as _;
        self.inner.flush().context("failed to flush gif output")?;
        Ok(())
    }
}

/// Adapts a closure into an [`OutputSink`]; the closure sees every chunk.
pub struct CallbackOutput<F> {
    on_chunk: F,
}

impl<F> CallbackOutput<F>
where
    F: FnMut(&[u8]) -> GifResult<()> + Send,
{
    /// Call `on_chunk` with every chunk.
    pub fn new(on_chunk: F) -> Self {
        Self { on_chunk }
    }
}

impl<F> OutputSink for CallbackOutput<F>
where
    F: FnMut(&[u8]) -> GifResult<()> + Send,
{
    fn write_chunk(&mut self, chunk: &[u8]) -> GifResult<()> {
        (self.on_chunk)(chunk)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/output.rs"]
mod tests;
