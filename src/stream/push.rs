// Push Sources
//
// A push source delivers items through a listener rather than on request.
// It is driven one scheduling turn at a time: each call to `emit` pushes
// events until the listener asks it to pause, the source terminates, or it
// has nothing more to hand over in this turn.

use crate::query::backend::EngineError;

/// An event pushed by a source
#[derive(Debug)]
pub enum SourceEvent<T> {
    /// The next item, in source order
    Data(T),
    /// Normal end of the source
    End,
    /// The source failed; no further events follow
    Error(EngineError),
}

impl<T> SourceEvent<T> {
    /// Transform the carried item, leaving terminal events untouched
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> SourceEvent<U> {
        match self {
            SourceEvent::Data(item) => SourceEvent::Data(f(item)),
            SourceEvent::End => SourceEvent::End,
            SourceEvent::Error(err) => SourceEvent::Error(err),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, SourceEvent::Data(_))
    }
}

/// Listener answer telling the source whether to keep pushing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Pause,
}

/// A push-style item source.
///
/// Contract for implementors:
/// - `emit` blocks until it can deliver at least one event, then keeps
///   pushing until the listener returns [`Flow::Pause`], a terminal event has
///   been emitted, or nothing more is ready.
/// - After the listener returns `Flow::Pause` no further event is pushed in
///   that turn; the next turn picks up where this one stopped.
/// - At most one terminal event (`End` or `Error`) is ever emitted.
pub trait PushSource<T> {
    /// Run one scheduling turn
    fn emit(&mut self, listener: &mut dyn FnMut(SourceEvent<T>) -> Flow);

    /// A data listener has been attached
    fn resume(&mut self) {}

    /// The data listener has been detached
    fn pause(&mut self) {}

    /// The consumer abandoned the source before its terminal event
    fn close(&mut self) {}
}

/// Owned, type-erased push source
pub type BoxedSource<T> = Box<dyn PushSource<T>>;

/// Push source backed by an iterator of fallible items
pub struct IterSource<I> {
    iter: I,
    done: bool,
}

impl<I> IterSource<I> {
    pub fn new(iter: I) -> Self {
        IterSource { iter, done: false }
    }
}

impl<T> IterSource<std::vec::IntoIter<Result<T, EngineError>>> {
    /// Source over items that cannot fail
    pub fn from_items(items: impl IntoIterator<Item = T>) -> Self {
        let items: Vec<Result<T, EngineError>> = items.into_iter().map(Ok).collect();
        IterSource::new(items.into_iter())
    }
}

impl<T, I> PushSource<T> for IterSource<I>
where
    I: Iterator<Item = Result<T, EngineError>>,
{
    fn emit(&mut self, listener: &mut dyn FnMut(SourceEvent<T>) -> Flow) {
        if self.done {
            return;
        }
        loop {
            match self.iter.next() {
                Some(Ok(item)) => {
                    if listener(SourceEvent::Data(item)) == Flow::Pause {
                        return;
                    }
                }
                Some(Err(err)) => {
                    self.done = true;
                    listener(SourceEvent::Error(err));
                    return;
                }
                None => {
                    self.done = true;
                    listener(SourceEvent::End);
                    return;
                }
            }
        }
    }

    fn close(&mut self) {
        self.done = true;
    }
}

/// Push source applying a per-item transform to an inner source
pub struct MapSource<T, F> {
    inner: BoxedSource<T>,
    map: F,
}

impl<T, F> MapSource<T, F> {
    pub fn new(inner: BoxedSource<T>, map: F) -> Self {
        MapSource { inner, map }
    }
}

impl<T, U, F> PushSource<U> for MapSource<T, F>
where
    F: FnMut(T) -> U,
{
    fn emit(&mut self, listener: &mut dyn FnMut(SourceEvent<U>) -> Flow) {
        let map = &mut self.map;
        self.inner.emit(&mut |event| listener(event.map(&mut *map)));
    }

    fn resume(&mut self) {
        self.inner.resume();
    }

    fn pause(&mut self) {
        self.inner.pause();
    }

    fn close(&mut self) {
        self.inner.close();
    }
}
