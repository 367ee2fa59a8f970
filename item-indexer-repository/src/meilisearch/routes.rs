//! Endpoint paths of the Meilisearch HTTP API.
//!
//! Paths are relative so they can be joined onto a base URL that may itself
//! carry a path prefix (e.g. behind a reverse proxy).

use item_indexer_shared::TaskUid;

pub const HEALTH: &str = "health";
pub const INDEXES: &str = "indexes";

pub fn index(index_uid: &str) -> String {
    format!("indexes/{}", index_uid)
}

pub fn documents(index_uid: &str) -> String {
    format!("indexes/{}/documents", index_uid)
}

pub fn settings(index_uid: &str) -> String {
    format!("indexes/{}/settings", index_uid)
}

pub fn task(task_uid: TaskUid) -> String {
    format!("tasks/{}", task_uid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        assert_eq!(index("products"), "indexes/products");
        assert_eq!(documents("products"), "indexes/products/documents");
        assert_eq!(settings("products"), "indexes/products/settings");
        assert_eq!(task(42), "tasks/42");
    }
}
