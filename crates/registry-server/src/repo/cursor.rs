//! Filtering cursor over raw store iterators
//!
//! One typed cursor contract covers both storage access paths: the full
//! scan, whose entries are serialized documents needing decode, and the
//! index-backed search, whose entries arrive already typed. A chain of
//! in-process predicates is applied conjunctively; only records passing
//! every predicate are produced.
//!
//! Errors are sticky: a decode or store failure moves the cursor into a
//! terminal error state, and every later call observes that same error
//! without re-scanning. Corrupt records are never silently skipped —
//! corruption is a correctness signal, not noise.

use std::sync::Mutex;

use registry_core::{Application, RegistryError};

use crate::storage::{RawEntry, RawIter, StoreError};

/// In-process predicate applied to candidate records
pub type AppFilter = Box<dyn Fn(&Application) -> bool + Send>;

/// Cursor of application records matching a filter chain
///
/// Intended for a single consumer, but all state sits behind a lock so a
/// shared reference across tasks cannot corrupt the lookahead. Closing is
/// idempotent and also happens on drop, so every exit path releases the
/// store-side result set.
pub struct AppCursor {
    inner: Mutex<CursorState>,
}

struct CursorState {
    raw: Box<dyn RawIter>,
    filters: Vec<AppFilter>,
    /// At most one pre-fetched qualifying record
    next: Option<Application>,
    /// Terminal error state, checked first on every call
    err: Option<RegistryError>,
    closed: bool,
}

impl AppCursor {
    pub(crate) fn new(raw: Box<dyn RawIter>, filters: Vec<AppFilter>) -> Self {
        Self {
            inner: Mutex::new(CursorState {
                raw,
                filters,
                next: None,
                err: None,
                closed: false,
            }),
        }
    }

    /// Advance the lookahead until a record passes every filter, then cache
    /// it. Repeated calls without an intervening [`next`](Self::next) do not
    /// advance the underlying iterator again.
    pub fn has_next(&self) -> bool {
        let mut state = self.lock();
        if state.err.is_some() || state.closed {
            return false;
        }
        state.advance();
        state.next.is_some()
    }

    /// Produce the previously located record, or scan inline for one
    ///
    /// `Ok(None)` means clean exhaustion. Once the cursor has failed, every
    /// call returns the same error.
    pub fn next(&self) -> Result<Option<Application>, RegistryError> {
        let mut state = self.lock();
        if let Some(err) = &state.err {
            return Err(err.clone());
        }
        if state.closed {
            return Err(RegistryError::Store("cursor is closed".into()));
        }

        state.advance();
        if let Some(err) = &state.err {
            return Err(err.clone());
        }
        Ok(state.next.take())
    }

    /// Close the underlying iterator; safe to call multiple times
    pub fn close(&self) -> Result<(), RegistryError> {
        let mut state = self.lock();
        state.closed = true;
        state.next = None;
        state.raw.close().map_err(RegistryError::from)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CursorState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for AppCursor {
    fn drop(&mut self) {
        let state = self.inner.get_mut().unwrap_or_else(|e| e.into_inner());
        if !state.closed {
            let _ = state.raw.close();
        }
    }
}

impl std::fmt::Debug for AppCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppCursor").finish_non_exhaustive()
    }
}

impl CursorState {
    fn advance(&mut self) {
        if self.err.is_some() || self.next.is_some() {
            return;
        }

        while self.raw.has_next() {
            let entry = match self.raw.next() {
                Ok(entry) => entry,
                Err(err) => {
                    self.err = Some(err.into());
                    return;
                }
            };

            let app = match entry {
                RawEntry::Record(app) => app,
                RawEntry::Document { key, value } => match serde_json::from_str(&value) {
                    Ok(app) => app,
                    Err(err) => {
                        self.err = Some(
                            StoreError::Corrupt {
                                key,
                                reason: err.to_string(),
                            }
                            .into(),
                        );
                        return;
                    }
                },
            };

            if self.filters.iter().all(|filter| filter(&app)) {
                self.next = Some(app);
                return;
            }
        }
    }
}

/// Drain a cursor into a vector, closing it on every exit path
///
/// On failure the cursor is closed before the error propagates, so the
/// store-side result set is never leaked by an early return.
pub fn drain(cursor: AppCursor) -> Result<Vec<Application>, RegistryError> {
    let mut out = Vec::new();
    loop {
        match cursor.next() {
            Ok(Some(app)) => out.push(app),
            Ok(None) => break,
            Err(err) => {
                let _ = cursor.close();
                return Err(err);
            }
        }
    }
    cursor.close()?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoreError;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Scripted raw iterator for exercising cursor behavior
    struct ScriptedIter {
        entries: VecDeque<Result<RawEntry, StoreError>>,
        pulls: Arc<AtomicUsize>,
        closes: Arc<AtomicUsize>,
    }

    impl ScriptedIter {
        fn new(
            entries: Vec<Result<RawEntry, StoreError>>,
        ) -> (Self, Arc<AtomicUsize>, Arc<AtomicUsize>) {
            let pulls = Arc::new(AtomicUsize::new(0));
            let closes = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    entries: entries.into(),
                    pulls: pulls.clone(),
                    closes: closes.clone(),
                },
                pulls,
                closes,
            )
        }
    }

    impl RawIter for ScriptedIter {
        fn has_next(&mut self) -> bool {
            !self.entries.is_empty()
        }

        fn next(&mut self) -> Result<RawEntry, StoreError> {
            self.pulls.fetch_add(1, Ordering::SeqCst);
            self.entries
                .pop_front()
                .unwrap_or(Err(StoreError::Backend("exhausted".into())))
        }

        fn close(&mut self) -> Result<(), StoreError> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn record(id: &str, owner: &str) -> Result<RawEntry, StoreError> {
        Ok(RawEntry::Record(
            Application::new(id, "s").with_owner(owner),
        ))
    }

    fn document(id: &str, owner: &str) -> Result<RawEntry, StoreError> {
        let app = Application::new(id, "s").with_owner(owner);
        Ok(RawEntry::Document {
            key: id.to_string(),
            value: serde_json::to_string(&app).unwrap(),
        })
    }

    #[test]
    fn both_entry_shapes_normalize_to_records() {
        let (iter, _, _) = ScriptedIter::new(vec![record("a", "alice"), document("b", "bob")]);
        let cursor = AppCursor::new(Box::new(iter), Vec::new());

        let ids: Vec<String> = drain(cursor).unwrap().into_iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn filters_are_conjunctive() {
        let (iter, _, _) = ScriptedIter::new(vec![
            record("a", "alice"),
            record("b", "bob"),
            record("c", "alice"),
        ]);
        let filters: Vec<AppFilter> = vec![
            Box::new(|app| app.info.created_by == "alice"),
            Box::new(|app| app.id != "a"),
        ];
        let cursor = AppCursor::new(Box::new(iter), filters);

        let ids: Vec<String> = drain(cursor).unwrap().into_iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["c"]);
    }

    #[test]
    fn has_next_is_idempotent() {
        let (iter, pulls, _) = ScriptedIter::new(vec![record("a", "alice"), record("b", "bob")]);
        let cursor = AppCursor::new(Box::new(iter), Vec::new());

        assert!(cursor.has_next());
        assert!(cursor.has_next());
        assert!(cursor.has_next());
        // Lookahead pulled exactly one entry
        assert_eq!(pulls.load(Ordering::SeqCst), 1);

        assert_eq!(cursor.next().unwrap().unwrap().id, "a");
        assert_eq!(cursor.next().unwrap().unwrap().id, "b");
        assert!(cursor.next().unwrap().is_none());
    }

    #[test]
    fn decode_error_is_sticky() {
        let (iter, _, _) = ScriptedIter::new(vec![
            record("a", "alice"),
            Ok(RawEntry::Document {
                key: "bad".into(),
                value: "not json".into(),
            }),
            record("c", "carol"),
        ]);
        let cursor = AppCursor::new(Box::new(iter), Vec::new());

        assert_eq!(cursor.next().unwrap().unwrap().id, "a");
        let err = cursor.next().unwrap_err();
        assert!(matches!(err, RegistryError::Decode(_)));

        // Same error on every later call, no rescan past the bad record
        assert_eq!(cursor.next().unwrap_err(), err);
        assert!(!cursor.has_next());
        assert_eq!(cursor.next().unwrap_err(), err);
    }

    #[test]
    fn store_error_is_sticky() {
        let (iter, _, _) = ScriptedIter::new(vec![
            record("a", "alice"),
            Err(StoreError::Backend("connection reset".into())),
        ]);
        let cursor = AppCursor::new(Box::new(iter), Vec::new());

        assert_eq!(cursor.next().unwrap().unwrap().id, "a");
        let err = cursor.next().unwrap_err();
        assert!(matches!(err, RegistryError::Store(_)));
        assert_eq!(cursor.next().unwrap_err(), err);
    }

    #[test]
    fn close_is_idempotent_and_forwards_to_raw() {
        let (iter, _, closes) = ScriptedIter::new(vec![record("a", "alice")]);
        let cursor = AppCursor::new(Box::new(iter), Vec::new());

        cursor.close().unwrap();
        cursor.close().unwrap();
        assert!(!cursor.has_next());
        assert!(cursor.next().is_err());
        drop(cursor);
        // Drop does not re-close an explicitly closed cursor
        assert_eq!(closes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn drop_closes_unclosed_cursor() {
        let (iter, _, closes) = ScriptedIter::new(vec![record("a", "alice")]);
        {
            let cursor = AppCursor::new(Box::new(iter), Vec::new());
            assert!(cursor.has_next());
        }
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drain_closes_on_error() {
        let (iter, _, closes) = ScriptedIter::new(vec![
            record("a", "alice"),
            Err(StoreError::Backend("boom".into())),
        ]);
        let cursor = AppCursor::new(Box::new(iter), Vec::new());

        assert!(drain(cursor).is_err());
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn cursor_is_shareable_across_threads() {
        let entries: Vec<_> = (0..64).map(|i| record(&format!("app-{i:02}"), "alice")).collect();
        let (iter, _, _) = ScriptedIter::new(entries);
        let cursor = Arc::new(AppCursor::new(Box::new(iter), Vec::new()));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cursor = cursor.clone();
                std::thread::spawn(move || {
                    let mut seen = Vec::new();
                    while let Ok(Some(app)) = cursor.next() {
                        seen.push(app.id);
                    }
                    seen
                })
            })
            .collect();

        let mut all: Vec<String> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        all.sort();
        all.dedup();
        // Every record delivered exactly once, no corruption under the race
        assert_eq!(all.len(), 64);
    }
}
