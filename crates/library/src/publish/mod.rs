mod assemble;
mod changes;
mod deliver;
pub mod error;

pub use self::assemble::{ArtifactEntry, CONTENT_DIR, MIMETYPE, assemble, plan, write};
pub use self::changes::latest_modification_since;
pub use self::deliver::{Delivery, publish, publish_if_changed, try_publish};
pub(crate) use self::deliver::last_published;
