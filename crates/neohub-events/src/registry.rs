//! Ordered listener registry.

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, warn};

use crate::listener::{Listener, ListenerId};
use crate::pattern::Pattern;

/// One registration of a listener under a pattern.
pub struct ListenerEntry<P> {
    id: ListenerId,
    pattern: Pattern,
    listener: Arc<dyn Listener<P>>,
    /// Invocations left before removal; `None` means unlimited.
    remaining: Option<AtomicUsize>,
}

/// Outcome of claiming an invocation from an entry's budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Claim {
    /// The listener may run; `last` is set when this used up the budget.
    Granted { last: bool },
    /// Another emission already used the final invocation.
    Spent,
}

impl<P> ListenerEntry<P> {
    fn new(pattern: Pattern, listener: Arc<dyn Listener<P>>, ttl: Option<NonZeroUsize>) -> Self {
        Self {
            id: ListenerId::new(),
            pattern,
            listener,
            remaining: ttl.map(|n| AtomicUsize::new(n.get())),
        }
    }

    /// Registration id.
    #[must_use]
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Pattern the listener was registered under.
    #[must_use]
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// The registered listener.
    #[must_use]
    pub fn listener(&self) -> &Arc<dyn Listener<P>> {
        &self.listener
    }

    /// Listener debug name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.listener.name()
    }

    /// Invocations left, or `None` for a permanent listener.
    #[must_use]
    pub fn remaining(&self) -> Option<usize> {
        self.remaining.as_ref().map(|r| r.load(Ordering::SeqCst))
    }

    pub(crate) fn claim(&self) -> Claim {
        let Some(remaining) = &self.remaining else {
            return Claim::Granted { last: false };
        };

        match remaining.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1)) {
            Ok(previous) => Claim::Granted {
                last: previous == 1,
            },
            Err(_) => Claim::Spent,
        }
    }
}

impl<P> fmt::Debug for ListenerEntry<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerEntry")
            .field("id", &self.id)
            .field("pattern", &self.pattern.as_str())
            .field("name", &self.listener.name())
            .field("remaining", &self.remaining())
            .finish()
    }
}

struct PatternSlot<P> {
    pattern: Pattern,
    entries: Vec<Arc<ListenerEntry<P>>>,
}

/// Registry of listeners keyed by subscription pattern.
///
/// Patterns keep the position of their first registration, even after all
/// of their listeners are removed, so enumeration order is stable for the
/// lifetime of the registry (until [`clear`](Self::clear)).
///
/// The cost is that slots are never reclaimed individually. Memory grows
/// with the number of distinct patterns ever registered, and `matching`
/// visits every slot, empty or not. Hubs that churn through many one-off
/// patterns should call `clear` periodically or use a fresh hub.
///
/// No listener code runs while the internal lock is held: `matching`
/// returns a snapshot, and removed entries are dropped after the lock is
/// released.
pub struct ListenerRegistry<P> {
    slots: RwLock<Vec<PatternSlot<P>>>,
    wildcard: bool,
    max_listeners: usize,
}

impl<P> fmt::Debug for ListenerRegistry<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = self.read();
        let count: usize = slots.iter().map(|s| s.entries.len()).sum();
        f.debug_struct("ListenerRegistry")
            .field("pattern_count", &slots.len())
            .field("listener_count", &count)
            .field("wildcard", &self.wildcard)
            .finish()
    }
}

impl<P> Default for ListenerRegistry<P> {
    fn default() -> Self {
        Self::new(true, 0)
    }
}

impl<P> ListenerRegistry<P> {
    /// Create an empty registry.
    ///
    /// `max_listeners` is a per-pattern warning threshold; `0` disables it.
    #[must_use]
    pub fn new(wildcard: bool, max_listeners: usize) -> Self {
        Self {
            slots: RwLock::new(Vec::new()),
            wildcard,
            max_listeners,
        }
    }

    /// Whether `*` segments are treated as wildcards.
    #[must_use]
    pub fn wildcard(&self) -> bool {
        self.wildcard
    }

    // Listener code never runs under the lock, so a poisoned guard still
    // protects a consistent Vec.
    fn read(&self) -> RwLockReadGuard<'_, Vec<PatternSlot<P>>> {
        self.slots.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<PatternSlot<P>>> {
        self.slots.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a listener to the sequence for `pattern`.
    ///
    /// Duplicates are allowed; each registration fires independently.
    pub fn add(
        &self,
        pattern: Pattern,
        listener: Arc<dyn Listener<P>>,
        ttl: Option<NonZeroUsize>,
    ) -> ListenerId {
        let entry = Arc::new(ListenerEntry::new(pattern, listener, ttl));
        let id = entry.id();

        let mut slots = self.write();
        let position = slots
            .iter()
            .position(|s| s.pattern.as_str() == entry.pattern().as_str());
        let slot_len = if let Some(i) = position {
            slots[i].entries.push(Arc::clone(&entry));
            slots[i].entries.len()
        } else {
            slots.push(PatternSlot {
                pattern: entry.pattern().clone(),
                entries: vec![Arc::clone(&entry)],
            });
            1
        };
        drop(slots);

        debug!(
            pattern = %entry.pattern(),
            listener_name = %entry.name(),
            listener_id = %id,
            "Listener registered"
        );

        if self.max_listeners > 0 && slot_len > self.max_listeners {
            warn!(
                pattern = %entry.pattern(),
                listener_count = slot_len,
                max_listeners = self.max_listeners,
                "Listener count for pattern exceeds configured maximum"
            );
        }

        id
    }

    /// Remove the first registration of `listener` under exactly `pattern`.
    ///
    /// Identity is `Arc` pointer equality. Returns `true` if an entry was
    /// removed.
    pub fn remove(&self, pattern: &str, listener: &Arc<dyn Listener<P>>) -> bool {
        let removed = {
            let mut slots = self.write();
            slots
                .iter_mut()
                .find(|s| s.pattern.as_str() == pattern)
                .and_then(|slot| {
                    let i = slot
                        .entries
                        .iter()
                        .position(|e| Arc::ptr_eq(e.listener(), listener))?;
                    Some(slot.entries.remove(i))
                })
        };

        Self::log_removed(removed)
    }

    /// Remove the registration with the given id.
    pub fn remove_id(&self, id: ListenerId) -> bool {
        let removed = {
            let mut slots = self.write();
            slots.iter_mut().find_map(|slot| {
                let i = slot.entries.iter().position(|e| e.id() == id)?;
                Some(slot.entries.remove(i))
            })
        };

        Self::log_removed(removed)
    }

    // Takes ownership so the entry (and possibly its listener) drops here,
    // outside the lock.
    fn log_removed(removed: Option<Arc<ListenerEntry<P>>>) -> bool {
        match removed {
            Some(entry) => {
                debug!(
                    pattern = %entry.pattern(),
                    listener_name = %entry.name(),
                    listener_id = %entry.id(),
                    "Listener unregistered"
                );
                true
            },
            None => false,
        }
    }

    /// Snapshot of every entry whose pattern matches `event_name`.
    ///
    /// Patterns are visited in first-registration order and entries within
    /// a pattern in registration order.
    #[must_use]
    pub fn matching(&self, event_name: &str) -> Vec<Arc<ListenerEntry<P>>> {
        let slots = self.read();
        slots
            .iter()
            .filter(|s| s.pattern.matches(event_name, self.wildcard))
            .flat_map(|s| s.entries.iter().map(Arc::clone))
            .collect()
    }

    /// Registered patterns in first-registration order, including ones
    /// whose listeners have all been removed.
    #[must_use]
    pub fn patterns(&self) -> Vec<String> {
        self.read()
            .iter()
            .map(|s| s.pattern.as_str().to_owned())
            .collect()
    }

    /// Number of registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().iter().map(|s| s.entries.len()).sum()
    }

    /// Check if no listener is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().iter().all(|s| s.entries.is_empty())
    }

    /// Remove every registration and forget pattern order.
    pub fn clear(&self) {
        let slots = std::mem::take(&mut *self.write());
        drop(slots);
        debug!("All listeners cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listener::{FnListener, ListenerResult};

    fn noop(name: &str) -> Arc<dyn Listener<()>> {
        Arc::new(FnListener::new(name, |_: &str, _: &()| -> ListenerResult {
            Ok(())
        }))
    }

    fn names(entries: &[Arc<ListenerEntry<()>>]) -> Vec<String> {
        entries.iter().map(|e| e.name().to_owned()).collect()
    }

    fn pattern(raw: &str) -> Pattern {
        Pattern::new(raw).unwrap()
    }

    #[test]
    fn test_add_and_len() {
        let registry = ListenerRegistry::<()>::default();
        assert!(registry.is_empty());

        registry.add(pattern("a.b"), noop("l1"), None);
        registry.add(pattern("a.*"), noop("l2"), None);

        assert_eq!(registry.len(), 2);
        assert!(!registry.is_empty());
        assert_eq!(registry.patterns(), vec!["a.b", "a.*"]);
    }

    #[test]
    fn test_duplicates_are_distinct_entries() {
        let registry = ListenerRegistry::<()>::default();
        let listener = noop("dup");

        let id1 = registry.add(pattern("a"), Arc::clone(&listener), None);
        let id2 = registry.add(pattern("a"), Arc::clone(&listener), None);

        assert_ne!(id1, id2);
        assert_eq!(registry.matching("a").len(), 2);
    }

    #[test]
    fn test_matching_order_within_pattern() {
        let registry = ListenerRegistry::<()>::default();
        registry.add(pattern("a.b"), noop("first"), None);
        registry.add(pattern("a.b"), noop("second"), None);
        registry.add(pattern("a.b"), noop("third"), None);

        for _ in 0..3 {
            assert_eq!(
                names(&registry.matching("a.b")),
                vec!["first", "second", "third"]
            );
        }
    }

    #[test]
    fn test_matching_order_across_patterns() {
        let registry = ListenerRegistry::<()>::default();
        registry.add(pattern("a.*"), noop("wild"), None);
        registry.add(pattern("a.b"), noop("exact"), None);
        registry.add(pattern("*"), noop("all"), None);
        // joins the existing "a.*" slot, ahead of "a.b"
        registry.add(pattern("a.*"), noop("wild2"), None);

        assert_eq!(
            names(&registry.matching("a.b")),
            vec!["wild", "wild2", "exact", "all"]
        );
        assert_eq!(names(&registry.matching("a.c")), vec!["wild", "wild2", "all"]);
        assert_eq!(names(&registry.matching("x")), vec!["all"]);
    }

    #[test]
    fn test_pattern_keeps_position_after_emptying() {
        let registry = ListenerRegistry::<()>::default();
        let first = noop("first");
        registry.add(pattern("a.*"), Arc::clone(&first), None);
        registry.add(pattern("a.b"), noop("exact"), None);

        assert!(registry.remove("a.*", &first));
        registry.add(pattern("a.*"), noop("again"), None);

        assert_eq!(names(&registry.matching("a.b")), vec!["again", "exact"]);
    }

    #[test]
    fn test_remove_first_matching_identity_only() {
        let registry = ListenerRegistry::<()>::default();
        let target = noop("target");
        let other = noop("other");

        registry.add(pattern("a"), Arc::clone(&target), None);
        registry.add(pattern("a"), Arc::clone(&other), None);
        registry.add(pattern("a"), Arc::clone(&target), None);

        assert!(registry.remove("a", &target));
        assert_eq!(names(&registry.matching("a")), vec!["other", "target"]);
    }

    #[test]
    fn test_remove_requires_exact_pattern() {
        let registry = ListenerRegistry::<()>::default();
        let listener = noop("wild");
        registry.add(pattern("a.*"), Arc::clone(&listener), None);

        assert!(!registry.remove("a.b", &listener));
        assert!(!registry.remove("*", &listener));
        assert_eq!(registry.len(), 1);

        assert!(registry.remove("a.*", &listener));
        assert!(!registry.remove("a.*", &listener));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_remove_id() {
        let registry = ListenerRegistry::<()>::default();
        let id = registry.add(pattern("a"), noop("l"), None);

        assert!(registry.remove_id(id));
        assert!(!registry.remove_id(id));
    }

    #[test]
    fn test_wildcard_disabled() {
        let registry = ListenerRegistry::<()>::new(false, 0);
        registry.add(pattern("a.*"), noop("wild"), None);
        registry.add(pattern("*"), noop("all"), None);

        assert!(registry.matching("a.b").is_empty());
        assert_eq!(names(&registry.matching("a.*")), vec!["wild"]);
    }

    #[test]
    fn test_claim_budget() {
        let registry = ListenerRegistry::<()>::default();
        registry.add(pattern("a"), noop("twice"), NonZeroUsize::new(2));
        let entry = registry.matching("a").remove(0);

        assert_eq!(entry.remaining(), Some(2));
        assert_eq!(entry.claim(), Claim::Granted { last: false });
        assert_eq!(entry.claim(), Claim::Granted { last: true });
        assert_eq!(entry.claim(), Claim::Spent);
        assert_eq!(entry.remaining(), Some(0));
    }

    #[test]
    fn test_unlimited_claim() {
        let registry = ListenerRegistry::<()>::default();
        registry.add(pattern("a"), noop("forever"), None);
        let entry = registry.matching("a").remove(0);

        assert_eq!(entry.remaining(), None);
        for _ in 0..10 {
            assert_eq!(entry.claim(), Claim::Granted { last: false });
        }
    }

    #[test]
    fn test_clear() {
        let registry = ListenerRegistry::<()>::default();
        registry.add(pattern("a"), noop("l1"), None);
        registry.add(pattern("b"), noop("l2"), None);

        registry.clear();
        assert!(registry.is_empty());
        assert!(registry.patterns().is_empty());
    }

    #[test]
    fn test_emptied_slots_retained_until_clear() {
        let registry = ListenerRegistry::<()>::default();
        for i in 0..4 {
            let id = registry.add(pattern(&format!("once.{i}")), noop("tmp"), None);
            assert!(registry.remove_id(id));
        }

        assert!(registry.is_empty());
        assert_eq!(registry.patterns().len(), 4);
        assert!(registry.matching("once.0").is_empty());

        registry.clear();
        assert!(registry.patterns().is_empty());
    }

    #[test]
    fn test_max_listeners_still_registers() {
        let registry = ListenerRegistry::<()>::new(true, 1);
        registry.add(pattern("a"), noop("l1"), None);
        registry.add(pattern("a"), noop("l2"), None);

        assert_eq!(registry.len(), 2);
    }
}
