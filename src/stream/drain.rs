// Materialization Helpers
//
// Drain a lazy sequence into memory. Both helpers take the sequence by value:
// a sequence is single-pass, so once drained the handle is gone.

use crate::query::executor::result::QueryResult;
use crate::stream::sequence::LazySequence;

/// Pull every item in emission order.
///
/// On a source error the items drained so far are discarded and only the
/// error is returned.
pub fn drain_to_collection<T>(mut seq: LazySequence<T>) -> QueryResult<Vec<T>> {
    let mut items = Vec::new();
    while let Some(item) = seq.pull()? {
        items.push(item);
    }
    Ok(items)
}

/// Pull every byte chunk and decode the concatenation as UTF-8.
///
/// Chunks are joined before decoding, so a multi-byte character split across
/// two chunks decodes correctly.
pub fn drain_to_text(seq: LazySequence<Vec<u8>>) -> QueryResult<String> {
    let bytes = drain_to_collection(seq)?.concat();
    Ok(String::from_utf8(bytes)?)
}
