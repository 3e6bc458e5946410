//! Bidirectional byte relay between a SOCKS client and its destination.
//!
//! Both directions are driven as independent poll-based state machines inside
//! one future, so a stalled writer on one side never blocks the other side.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::time::Instant;

/// Byte counts transferred by a finished relay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    /// Bytes copied from the client to the destination.
    pub inbound: u64,
    /// Bytes copied from the destination to the client.
    pub outbound: u64,
}

enum Stage {
    Reading,
    Writing { pos: usize, len: usize },
    Flushing,
    ShuttingDown,
    Done,
}

/// One copy direction: read into `buf`, write it out, flush, repeat.
struct Direction {
    buf: Box<[u8]>,
    stage: Stage,
    copied: u64,
}

enum Progress {
    /// A chunk was written and flushed.
    Moved,
    /// Reader hit EOF and the writer was shut down.
    Finished,
}

impl Direction {
    fn new(buffer_size: usize) -> Self {
        Self {
            buf: vec![0u8; buffer_size].into_boxed_slice(),
            stage: Stage::Reading,
            copied: 0,
        }
    }

    fn is_done(&self) -> bool {
        matches!(self.stage, Stage::Done)
    }

    fn poll_step<R, W>(
        &mut self,
        cx: &mut Context<'_>,
        reader: &mut R,
        writer: &mut W,
    ) -> Poll<io::Result<Progress>>
    where
        R: AsyncRead + Unpin + ?Sized,
        W: AsyncWrite + Unpin + ?Sized,
    {
        loop {
            match self.stage {
                Stage::Reading => {
                    let mut read_buf = ReadBuf::new(&mut self.buf);
                    match Pin::new(&mut *reader).poll_read(cx, &mut read_buf) {
                        Poll::Ready(Ok(())) => {
                            let len = read_buf.filled().len();
                            self.stage = if len == 0 {
                                Stage::ShuttingDown
                            } else {
                                Stage::Writing { pos: 0, len }
                            };
                        }
                        Poll::Ready(Err(e)) => return Poll::Ready(Err(e)),
                        Poll::Pending => return Poll::Pending,
                    }
                }
                Stage::Writing { pos, len } => {
                    match Pin::new(&mut *writer).poll_write(cx, &self.buf[pos..len]) {
                        Poll::Ready(Ok(0)) => {
                            return Poll::Ready(Err(io::ErrorKind::WriteZero.into()));
                        }
                        Poll::Ready(Ok(n)) => {
                            self.copied += n as u64;
                            self.stage = if pos + n >= len {
                                Stage::Flushing
                            } else {
                                Stage::Writing { pos: pos + n, len }
                            };
                        }
                        Poll::Ready(Err(e)) => return Poll::Ready(Err(e)),
                        Poll::Pending => return Poll::Pending,
                    }
                }
                Stage::Flushing => match Pin::new(&mut *writer).poll_flush(cx) {
                    Poll::Ready(Ok(())) => {
                        self.stage = Stage::Reading;
                        return Poll::Ready(Ok(Progress::Moved));
                    }
                    Poll::Ready(Err(e)) => return Poll::Ready(Err(e)),
                    Poll::Pending => return Poll::Pending,
                },
                // Shutdown errors are ignored: the peer may already be gone.
                Stage::ShuttingDown => match Pin::new(&mut *writer).poll_shutdown(cx) {
                    Poll::Ready(_) => {
                        self.stage = Stage::Done;
                        return Poll::Ready(Ok(Progress::Finished));
                    }
                    Poll::Pending => return Poll::Pending,
                },
                Stage::Done => return Poll::Ready(Ok(Progress::Finished)),
            }
        }
    }
}

/// Relay bytes between `client` and `target` until both directions reach EOF,
/// an I/O error occurs, or nothing moves for `idle_timeout`.
///
/// Half-close is honored: when one side finishes sending, the other side's
/// write half is shut down while the opposite direction keeps flowing.
pub async fn relay_bidirectional<A, B>(
    client: A,
    target: B,
    idle_timeout: Duration,
    buffer_size: usize,
) -> io::Result<RelayStats>
where
    A: AsyncRead + AsyncWrite + Unpin,
    B: AsyncRead + AsyncWrite + Unpin,
{
    let (mut client_r, mut client_w) = tokio::io::split(client);
    let (mut target_r, mut target_w) = tokio::io::split(target);

    let mut upstream = Direction::new(buffer_size);
    let mut downstream = Direction::new(buffer_size);

    let idle = tokio::time::sleep(idle_timeout);
    tokio::pin!(idle);

    while !(upstream.is_done() && downstream.is_done()) {
        let step = std::future::poll_fn(|cx| {
            let mut ready = false;
            let mut moved = false;

            for (dir, reader, writer) in [
                (
                    &mut upstream,
                    &mut client_r as &mut (dyn AsyncRead + Unpin),
                    &mut target_w as &mut (dyn AsyncWrite + Unpin),
                ),
                (
                    &mut downstream,
                    &mut target_r as &mut (dyn AsyncRead + Unpin),
                    &mut client_w as &mut (dyn AsyncWrite + Unpin),
                ),
            ] {
                if dir.is_done() {
                    continue;
                }
                match dir.poll_step(cx, reader, writer) {
                    Poll::Ready(Ok(Progress::Moved)) => {
                        ready = true;
                        moved = true;
                    }
                    Poll::Ready(Ok(Progress::Finished)) => ready = true,
                    Poll::Ready(Err(e)) => return Poll::Ready(Err(e)),
                    Poll::Pending => {}
                }
            }

            if ready {
                Poll::Ready(Ok(moved))
            } else {
                Poll::Pending
            }
        });

        tokio::select! {
            result = step => {
                if result? {
                    idle.as_mut().reset(Instant::now() + idle_timeout);
                }
            }
            _ = &mut idle => break,
        }
    }

    Ok(RelayStats {
        inbound: upstream.copied,
        outbound: downstream.copied,
    })
}
