//! Per-user folder navigation history.
//!
//! Each user owns a stack of visited folders. The root folder is implicit and
//! never stored: an empty (or never created) stack means the user is at root.
//! Every operation takes the store lock once, so a single `enter`/`go_back`
//! is atomic. Two clicks from the same user racing across awaited gateway
//! calls are last-write-wins.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::domain::{entry::FolderId, user::UserId};

#[derive(Debug, Default)]
pub struct NavigationStore {
    histories: Mutex<HashMap<UserId, Vec<FolderId>>>,
}

impl NavigationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `user` opened `folder`. Opening root is a no-op.
    pub fn enter(&self, user: &UserId, folder: &FolderId, root: &FolderId) {
        if folder == root {
            return;
        }
        self.lock().entry(user.clone()).or_default().push(folder.clone());
    }

    /// Discards the current folder and returns the one to display next.
    pub fn go_back(&self, user: &UserId, root: &FolderId) -> FolderId {
        let mut histories = self.lock();
        let Some(stack) = histories.get_mut(user) else {
            return root.clone();
        };
        stack.pop();
        stack.last().cloned().unwrap_or_else(|| root.clone())
    }

    pub fn current(&self, user: &UserId, root: &FolderId) -> FolderId {
        self.lock()
            .get(user)
            .and_then(|stack| stack.last().cloned())
            .unwrap_or_else(|| root.clone())
    }

    /// Returns the user to root without dropping their entry.
    pub fn reset(&self, user: &UserId) {
        if let Some(stack) = self.lock().get_mut(user) {
            stack.clear();
        }
    }

    pub fn depth(&self, user: &UserId) -> usize {
        self.lock().get(user).map_or(0, Vec::len)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<UserId, Vec<FolderId>>> {
        // Each mutation is a single push/pop/clear, so a poisoned map is still consistent.
        self.histories.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::NavigationStore;
    use crate::domain::{entry::FolderId, user::UserId};

    fn root() -> FolderId {
        FolderId::new("root")
    }

    fn user(id: &str) -> UserId {
        UserId::new(id)
    }

    #[test]
    fn go_back_without_history_returns_root() {
        let store = NavigationStore::new();
        assert_eq!(store.go_back(&user("U1"), &root()), root());
        assert_eq!(store.depth(&user("U1")), 0);
    }

    #[test]
    fn entering_root_never_pushes() {
        let store = NavigationStore::new();
        store.enter(&user("U1"), &root(), &root());
        store.enter(&user("U1"), &root(), &root());

        assert_eq!(store.depth(&user("U1")), 0);
        assert_eq!(store.current(&user("U1"), &root()), root());
    }

    #[test]
    fn back_twice_from_two_levels_lands_on_root() {
        let store = NavigationStore::new();
        let u = user("U1");
        store.enter(&u, &FolderId::new("A"), &root());
        store.enter(&u, &FolderId::new("B"), &root());

        assert_eq!(store.go_back(&u, &root()), FolderId::new("A"));
        assert_eq!(store.go_back(&u, &root()), root());
        assert_eq!(store.current(&u, &root()), root());
    }

    #[test]
    fn repeated_back_at_root_is_idempotent() {
        let store = NavigationStore::new();
        let u = user("U1");
        store.enter(&u, &FolderId::new("A"), &root());

        for _ in 0..5 {
            assert_eq!(store.go_back(&u, &root()), root());
        }
        assert_eq!(store.depth(&u), 0);
    }

    #[test]
    fn histories_are_isolated_per_user() {
        let store = NavigationStore::new();
        store.enter(&user("U1"), &FolderId::new("A"), &root());
        store.enter(&user("U2"), &FolderId::new("X"), &root());
        store.enter(&user("U2"), &FolderId::new("Y"), &root());

        assert_eq!(store.current(&user("U1"), &root()), FolderId::new("A"));
        assert_eq!(store.go_back(&user("U2"), &root()), FolderId::new("X"));
        assert_eq!(store.current(&user("U1"), &root()), FolderId::new("A"));
    }

    #[test]
    fn reset_returns_user_to_root() {
        let store = NavigationStore::new();
        let u = user("U1");
        store.enter(&u, &FolderId::new("A"), &root());
        store.enter(&u, &FolderId::new("B"), &root());
        store.reset(&u);

        assert_eq!(store.current(&u, &root()), root());
        assert_eq!(store.go_back(&u, &root()), root());
    }

    #[test]
    fn current_is_root_exactly_when_stack_is_empty() {
        let store = NavigationStore::new();
        let u = user("U1");
        let script: [(bool, &str); 9] = [
            (true, "A"),
            (true, "B"),
            (false, ""),
            (true, "C"),
            (false, ""),
            (false, ""),
            (false, ""),
            (true, "root"),
            (true, "D"),
        ];

        for (is_enter, folder) in script {
            if is_enter {
                store.enter(&u, &FolderId::new(folder), &root());
            } else {
                store.go_back(&u, &root());
            }
            let at_root = store.current(&u, &root()) == root();
            assert_eq!(at_root, store.depth(&u) == 0);
        }
    }
}
