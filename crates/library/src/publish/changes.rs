use bestpub_store::error::Result as StoreResult;
use bestpub_store::{ContentStore, NodeRef};
use time::UtcDateTime;

/// Newest modification time among the descendants of `title` that is
/// strictly after `since`, or any at all when `since` is `None`.
///
/// The title node itself is left out: publishing writes its publish record
/// there, which would otherwise always count as a change.
pub async fn latest_modification_since(
    store: &dyn ContentStore,
    title: NodeRef,
    since: Option<UtcDateTime>,
) -> StoreResult<Option<UtcDateTime>> {
    let mut latest = None;
    let mut pending = vec![title];
    while let Some(node) = pending.pop() {
        for child in store.children(node).await? {
            if child.is_container() {
                pending.push(child.id);
            }
            if since.is_none_or(|since| child.modified > since) {
                latest = latest.max(Some(child.modified));
            }
        }
    }
    Ok(latest)
}
