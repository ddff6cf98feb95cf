// Streaming Serialization Source
//
// Wraps an item source and turns each pushed item into an output chunk,
// framed by an optional header and trailer. Backpressure from the consumer
// is forwarded to the wrapped source unchanged.

use crate::query::backend::EngineError;
use crate::stream::push::{BoxedSource, Flow, PushSource, SourceEvent};

/// Renders items of one result shape into bytes
pub trait ChunkWriter<T> {
    /// Bytes preceding the first item; may be empty
    fn header(&mut self) -> Result<Vec<u8>, EngineError>;

    fn write(&mut self, item: T) -> Result<Vec<u8>, EngineError>;

    /// Bytes following the last item; may be empty
    fn trailer(&mut self) -> Vec<u8>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Header,
    Body,
    /// Trailer pushed, end still owed
    Ending,
    Done,
}

/// Push source of serialized chunks
pub struct SerializingSource<T, W> {
    upstream: BoxedSource<T>,
    writer: W,
    phase: Phase,
}

impl<T, W: ChunkWriter<T>> SerializingSource<T, W> {
    pub fn new(upstream: BoxedSource<T>, writer: W) -> Self {
        SerializingSource { upstream, writer, phase: Phase::Header }
    }
}

impl<T, W: ChunkWriter<T>> SerializingSource<T, W> {
    /// Writer failure: the upstream has not ended, so release it before
    /// reporting the error
    fn abort(&mut self, listener: &mut dyn FnMut(SourceEvent<Vec<u8>>) -> Flow, err: EngineError) {
        self.phase = Phase::Done;
        self.upstream.close();
        listener(SourceEvent::Error(err));
    }
}

impl<T, W: ChunkWriter<T>> PushSource<Vec<u8>> for SerializingSource<T, W> {
    fn emit(&mut self, listener: &mut dyn FnMut(SourceEvent<Vec<u8>>) -> Flow) {
        match self.phase {
            Phase::Done => return,
            Phase::Ending => {
                self.phase = Phase::Done;
                listener(SourceEvent::End);
                return;
            }
            Phase::Header => {
                self.phase = Phase::Body;
                match self.writer.header() {
                    Ok(chunk) if chunk.is_empty() => {}
                    Ok(chunk) => {
                        if listener(SourceEvent::Data(chunk)) == Flow::Pause {
                            return;
                        }
                    }
                    Err(err) => {
                        self.abort(listener, err);
                        return;
                    }
                }
            }
            Phase::Body => {}
        }

        let writer = &mut self.writer;
        let phase = &mut self.phase;
        let mut failure = None;
        self.upstream.emit(&mut |event| match event {
            SourceEvent::Data(item) => match writer.write(item) {
                Ok(chunk) => listener(SourceEvent::Data(chunk)),
                Err(err) => {
                    failure = Some(err);
                    Flow::Pause
                }
            },
            SourceEvent::End => {
                let trailer = writer.trailer();
                if !trailer.is_empty() && listener(SourceEvent::Data(trailer)) == Flow::Pause {
                    *phase = Phase::Ending;
                    return Flow::Pause;
                }
                *phase = Phase::Done;
                listener(SourceEvent::End);
                Flow::Pause
            }
            SourceEvent::Error(err) => {
                *phase = Phase::Done;
                listener(SourceEvent::Error(err));
                Flow::Pause
            }
        });

        if let Some(err) = failure {
            self.abort(listener, err);
        }
    }

    fn resume(&mut self) {
        self.upstream.resume();
    }

    fn pause(&mut self) {
        self.upstream.pause();
    }

    fn close(&mut self) {
        self.phase = Phase::Done;
        self.upstream.close();
    }
}
