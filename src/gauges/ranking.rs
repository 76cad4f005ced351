use crate::error::SyncError;
use crate::gauges::filter::normalize_path;
use crate::gauges::store::ViewStore;

/// Adapter boundary toward the content pipeline: anything that can name its
/// canonical URL can be ranked.
pub trait PageRef {
    fn url(&self) -> &str;
}

impl PageRef for String {
    fn url(&self) -> &str {
        self
    }
}

/// Order `items` by descending view count, resolving each count from the
/// store (a never-seen path reads as 0 and gets its baseline record). The
/// sort is stable: ties keep their input order.
pub fn rank<T: PageRef>(store: &ViewStore, items: Vec<T>) -> Result<Vec<T>, SyncError> {
    let mut keyed = Vec::with_capacity(items.len());
    for item in items {
        let views = store.get(&normalize_path(item.url()))?;
        keyed.push((views, item));
    }
    keyed.sort_by(|a, b| b.0.cmp(&a.0));
    Ok(keyed.into_iter().map(|(_, item)| item).collect())
}
