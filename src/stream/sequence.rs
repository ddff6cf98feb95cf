// Lazy Result Sequence
//
// Pull-style adapter over a push source. Items pushed by the source land in
// a small ready buffer; once the buffer reaches its high-water mark the
// adapter detaches from the source and only re-attaches when the consumer
// pulls again. Source callbacks and pulls run in the same cooperative
// context, so the reading flag and the buffer need no locking.

use std::collections::VecDeque;

use log::{debug, trace};

use crate::query::backend::EngineError;
use crate::query::executor::result::{QueryError, QueryResult};
use crate::stream::push::{BoxedSource, Flow, MapSource, PushSource, SourceEvent};

/// Items the adapter keeps ready before pausing the source
pub const DEFAULT_HIGH_WATER_MARK: usize = 1;

/// Terminal state received from the source but not yet delivered
#[derive(Debug)]
enum Terminal {
    End,
    Error(EngineError),
}

/// A finite, ordered, single-pass sequence of items backed by a push source.
///
/// The sequence delivers exactly one terminal outcome: `Ok(None)` for a normal
/// end or `Err(_)` for a source failure, in both cases only after every
/// buffered item has been pulled. Pulling a finished sequence keeps returning
/// `Ok(None)`. Dropping or [`close`](LazySequence::close)-ing an unfinished
/// sequence releases its source.
pub struct LazySequence<T> {
    /// Underlying push source, released once the sequence terminates
    source: Option<BoxedSource<T>>,
    /// Items received but not yet pulled
    buffer: VecDeque<T>,
    /// Buffer size at which the source gets paused
    high_water_mark: usize,
    /// Whether the data listener is attached
    reading: bool,
    /// Terminal event waiting behind buffered items
    terminal: Option<Terminal>,
}

impl<T> LazySequence<T> {
    /// Wrap a source with the default high-water mark
    pub fn new(source: BoxedSource<T>) -> Self {
        Self::with_high_water_mark(source, DEFAULT_HIGH_WATER_MARK)
    }

    /// Wrap a source, pausing it once `high_water_mark` items are ready
    pub fn with_high_water_mark(source: BoxedSource<T>, high_water_mark: usize) -> Self {
        LazySequence {
            source: Some(source),
            buffer: VecDeque::new(),
            high_water_mark: high_water_mark.max(1),
            reading: false,
            terminal: None,
        }
    }

    pub fn from_source<S>(source: S) -> Self
    where
        S: PushSource<T> + 'static,
    {
        Self::new(Box::new(source))
    }

    /// Pull the next item.
    ///
    /// Attaches to the source if needed and runs source turns until an item
    /// or the terminal event is available.
    pub fn pull(&mut self) -> QueryResult<Option<T>> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Ok(Some(item));
            }

            if let Some(terminal) = self.terminal.take() {
                self.release();
                return match terminal {
                    Terminal::End => Ok(None),
                    Terminal::Error(err) => Err(QueryError::Source(err)),
                };
            }

            if self.source.is_none() {
                return Ok(None);
            }

            self.start_reading();
            if self.pump() == 0 {
                debug!("Push source turn delivered no event, closing it");
                if let Some(mut source) = self.source.take() {
                    source.close();
                }
                self.reading = false;
                return Err(QueryError::Stalled);
            }
        }
    }

    /// Release the source without waiting for its end.
    ///
    /// Buffered items are dropped and later pulls return `Ok(None)`.
    pub fn close(&mut self) {
        if let Some(mut source) = self.source.take() {
            if self.terminal.is_none() {
                debug!("Closing result sequence before end, {} buffered item(s) dropped", self.buffer.len());
                source.close();
            }
        }
        self.reading = false;
        self.buffer.clear();
        self.terminal = None;
    }

    /// Whether the adapter is currently attached to its source
    pub fn is_reading(&self) -> bool {
        self.reading
    }

    /// Number of items ready to be pulled without touching the source
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Whether the terminal outcome has been delivered (or the sequence closed)
    pub fn is_finished(&self) -> bool {
        self.source.is_none() && self.buffer.is_empty() && self.terminal.is_none()
    }

    pub fn high_water_mark(&self) -> usize {
        self.high_water_mark
    }

    /// Convert every item with `f`, including items already buffered
    pub fn map_items<U, F>(mut self, mut f: F) -> LazySequence<U>
    where
        T: 'static,
        U: 'static,
        F: FnMut(T) -> U + 'static,
    {
        let buffer: VecDeque<U> = self.buffer.drain(..).map(&mut f).collect();
        let source = self
            .source
            .take()
            .map(|inner| Box::new(MapSource::new(inner, f)) as BoxedSource<U>);

        LazySequence {
            source,
            buffer,
            high_water_mark: self.high_water_mark,
            reading: self.reading,
            terminal: self.terminal.take(),
        }
    }

    fn start_reading(&mut self) {
        if self.reading {
            return;
        }
        if let Some(source) = self.source.as_mut() {
            trace!("Attaching to push source");
            self.reading = true;
            source.resume();
        }
    }

    /// Run one source turn; returns the number of events received
    fn pump(&mut self) -> usize {
        let Some(source) = self.source.as_mut() else {
            return 0;
        };

        let buffer = &mut self.buffer;
        let terminal = &mut self.terminal;
        let reading = &mut self.reading;
        let high_water_mark = self.high_water_mark;
        let mut received = 0;

        source.emit(&mut |event| {
            received += 1;
            if terminal.is_some() {
                return Flow::Pause;
            }
            match event {
                SourceEvent::Data(item) => {
                    buffer.push_back(item);
                    if buffer.len() >= high_water_mark {
                        *reading = false;
                        Flow::Pause
                    } else {
                        Flow::Continue
                    }
                }
                SourceEvent::End => {
                    *terminal = Some(Terminal::End);
                    *reading = false;
                    Flow::Pause
                }
                SourceEvent::Error(err) => {
                    *terminal = Some(Terminal::Error(err));
                    *reading = false;
                    Flow::Pause
                }
            }
        });

        if !self.reading && self.terminal.is_none() {
            trace!("Pausing push source with {} buffered item(s)", self.buffer.len());
            source.pause();
        }
        received
    }

    fn release(&mut self) {
        self.source = None;
        self.reading = false;
    }
}

impl<T> Iterator for LazySequence<T> {
    type Item = QueryResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.pull().transpose()
    }
}

impl<T> Drop for LazySequence<T> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<T> std::fmt::Debug for LazySequence<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazySequence")
            .field("buffered", &self.buffer.len())
            .field("high_water_mark", &self.high_water_mark)
            .field("reading", &self.reading)
            .field("finished", &self.is_finished())
            .finish()
    }
}
