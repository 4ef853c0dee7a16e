//! Chunk ordering by embedded index.
//!
//! Chunk identities look like `<anything>-<index>`. Lexicographic order puts
//! `x-10` before `x-9`, so every ordering goes through [`chunk_index`].

use std::cmp::Ordering;

use crate::TransferError;
use crate::types::StagedChunk;

/// Extracts the decimal index after the last `-` of a chunk identity.
///
/// An identity without `-` is parsed whole. Returns `None` when the suffix
/// is not a plain run of ASCII digits or overflows `u64`.
pub fn chunk_index(chunk_id: &str) -> Option<u64> {
    let digits = chunk_id
        .rsplit_once('-')
        .map_or(chunk_id, |(_, suffix)| suffix);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Orders chunk identities by numeric index.
///
/// Identities with an index sort before those without; ties and
/// index-less identities fall back to byte order so the result is total.
pub fn compare_chunk_ids(a: &str, b: &str) -> Ordering {
    match (chunk_index(a), chunk_index(b)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Sorts staged chunk names into merge order.
///
/// Every name needs an index and no two may share one, otherwise the
/// byte offsets of the artifact would be ambiguous.
pub(crate) fn order_for_merge(names: Vec<String>) -> Result<Vec<StagedChunk>, TransferError> {
    let mut staged = names
        .into_iter()
        .map(|id| match chunk_index(&id) {
            Some(index) => Ok(StagedChunk { index, id }),
            None => Err(TransferError::InvalidLayout(format!(
                "chunk id has no numeric index: {id}"
            ))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    staged.sort_by_key(|chunk| chunk.index);

    if let Some(pair) = staged.windows(2).find(|w| w[0].index == w[1].index) {
        return Err(TransferError::InvalidLayout(format!(
            "chunks {} and {} share index {}",
            pair[0].id, pair[1].id, pair[0].index
        )));
    }

    Ok(staged)
}
