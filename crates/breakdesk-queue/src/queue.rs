// SPDX-FileCopyrightText: 2026 Breakdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The pending break queue.
//!
//! The queue is an `Arc<Breaks>` behind a read-write lock. Writers build the
//! next queue from a copy and swap it in, so a reader either sees the queue
//! before a mutation or after it, never in between, and a failed mutation
//! leaves nothing behind.

use std::sync::{Arc, PoisonError, RwLock};

use breakdesk_core::{Break, BreakPatch, Breaks, BreakdeskError, Order, OrderNumber};
use tracing::debug;

/// Ordered collection of pending breaks, in arrival order.
///
/// Mutations are serialized by the write lock; the duplicate check in
/// [`insert`](Self::insert) runs under the same lock as the append.
#[derive(Debug, Default)]
pub struct BreakQueue {
    breaks: RwLock<Arc<Breaks>>,
}

impl BreakQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing queue, e.g. one restored by an operator tool.
    pub fn from_breaks(breaks: Breaks) -> Self {
        Self {
            breaks: RwLock::new(Arc::new(breaks)),
        }
    }

    /// Append a break for a freshly paid order.
    pub fn insert(&self, order: Order) -> Result<OrderNumber, BreakdeskError> {
        let brk = Break::from_order(order);
        let id = brk.order_id;
        self.commit(|breaks| breaks.push(brk))?;
        debug!(order_number = %id, "break appended");
        Ok(id)
    }

    /// Apply a partial update to a pending break.
    pub fn update(&self, id: OrderNumber, patch: &BreakPatch) -> Result<(), BreakdeskError> {
        self.commit(|breaks| {
            breaks
                .get_mut(id)
                .ok_or(BreakdeskError::NotFound(id))?
                .apply(patch)
        })
    }

    /// Drop a break from the pending view.
    pub fn complete(&self, id: OrderNumber) -> Result<(), BreakdeskError> {
        self.commit(|breaks| breaks.remove(id).map(drop))
    }

    /// The current queue. Cheap; later mutations do not affect it.
    pub fn snapshot(&self) -> Arc<Breaks> {
        Arc::clone(&self.breaks.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn get(&self, id: OrderNumber) -> Option<Break> {
        self.snapshot().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    fn commit<R>(
        &self,
        mutate: impl FnOnce(&mut Breaks) -> Result<R, BreakdeskError>,
    ) -> Result<R, BreakdeskError> {
        // A poisoned lock still holds a whole queue: the swap below is the
        // only write.
        let mut current = self.breaks.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = Breaks::clone(&current);
        let out = mutate(&mut next)?;
        *current = Arc::new(next);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use breakdesk_core::order::{CustomField, OrderLineItem};
    use proptest::prelude::*;

    fn line(name: &str, quantity: u32) -> OrderLineItem {
        OrderLineItem {
            name: name.into(),
            quantity,
            options: vec![],
            custom_text_fields: None,
            media_item: None,
            index: None,
            notes: None,
        }
    }

    fn order(number: u32) -> Order {
        Order {
            order_number: OrderNumber::new(number),
            line_items: vec![line("pack", 4), line("box", 10), line("single", 2)],
            buyer_note: None,
            custom_field: Some(CustomField {
                title: "twitch username".into(),
                value: format!("buyer{number}"),
            }),
        }
    }

    proptest! {
        #[test]
        fn snapshot_preserves_insertion_order(numbers in proptest::collection::hash_set(1u32..100_000, 0..40)) {
            let numbers: Vec<u32> = numbers.into_iter().collect();
            let queue = BreakQueue::new();
            for n in &numbers {
                queue.insert(order(*n)).unwrap();
            }
            let expected: Vec<OrderNumber> = numbers.iter().copied().map(OrderNumber::new).collect();
            prop_assert_eq!(queue.snapshot().order_ids(), expected);
        }
    }

    #[test]
    fn duplicate_insert_keeps_one_break() {
        let queue = BreakQueue::new();
        queue.insert(order(10019)).unwrap();
        let err = queue.insert(order(10019)).unwrap_err();
        assert!(matches!(err, BreakdeskError::DuplicateOrder(_)));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn update_changes_only_the_patched_fields() {
        let queue = BreakQueue::new();
        queue.insert(order(1)).unwrap();
        queue.insert(order(2)).unwrap();
        let before = queue.get(OrderNumber::new(2)).unwrap();

        queue
            .update(OrderNumber::new(2), &BreakPatch::note(0, "hello"))
            .unwrap();

        let after = queue.get(OrderNumber::new(2)).unwrap();
        assert_eq!(after.order.line_items[0].notes.as_deref(), Some("hello"));
        assert_eq!(after.order.line_items[1..], before.order.line_items[1..]);
        assert_eq!(after.order.line_items[0].quantity, 4);
        assert_eq!(after.twitch_username, before.twitch_username);
        assert_eq!(
            queue.snapshot().order_ids(),
            vec![OrderNumber::new(1), OrderNumber::new(2)]
        );
    }

    #[test]
    fn update_of_unknown_order_is_not_found() {
        let queue = BreakQueue::new();
        let err = queue
            .update(OrderNumber::new(404), &BreakPatch::handle("x"))
            .unwrap_err();
        assert!(matches!(err, BreakdeskError::NotFound(n) if n.get() == 404));
    }

    #[test]
    fn completing_twice_leaves_queue_without_break() {
        let queue = BreakQueue::new();
        queue.insert(order(7)).unwrap();
        queue.complete(OrderNumber::new(7)).unwrap();
        assert!(matches!(
            queue.complete(OrderNumber::new(7)),
            Err(BreakdeskError::NotFound(_))
        ));
        assert!(queue.is_empty());
    }

    #[test]
    fn earlier_snapshot_is_isolated_from_later_mutations() {
        let queue = BreakQueue::new();
        queue.insert(order(1)).unwrap();
        let snapshot = queue.snapshot();

        queue
            .update(OrderNumber::new(1), &BreakPatch::note(2, "late"))
            .unwrap();
        queue.insert(order(2)).unwrap();

        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.iter().all(|brk| brk.order.line_items[2].notes.is_none()));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn failed_patch_leaves_queue_untouched() {
        let queue = BreakQueue::new();
        queue.insert(order(1)).unwrap();
        let before = queue.snapshot();

        let patch = BreakPatch::note(0, "applied?").with_note(99, None);
        assert!(queue.update(OrderNumber::new(1), &patch).is_err());
        assert_eq!(*queue.snapshot(), *before);
    }

    #[test]
    fn concurrent_inserts_never_duplicate() {
        let queue = Arc::new(BreakQueue::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let queue = Arc::clone(&queue);
                std::thread::spawn(move || {
                    for n in 0..50 {
                        let _ = queue.insert(order(n));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(queue.len(), 50);
    }
}
