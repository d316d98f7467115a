// SPDX-FileCopyrightText: 2026 Breakdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Breaks: paid orders waiting for the operator, in arrival order.

use serde::{Deserialize, Serialize};

use crate::error::BreakdeskError;
use crate::order::{Order, OrderNumber};

/// Longest accepted operator handle, in characters.
pub const MAX_HANDLE_LEN: usize = 64;

/// One paid order awaiting fulfillment, with operator annotations.
///
/// Per-item operator notes live on the embedded line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Break {
    /// Assigned stream handle.
    pub twitch_username: Option<String>,
    /// Same as `order.order_number`; the key used by mutation commands.
    pub order_id: OrderNumber,
    pub order: Order,
}

impl Break {
    /// Wrap a freshly paid order, taking the handle from its custom field.
    pub fn from_order(order: Order) -> Self {
        Self {
            twitch_username: order.twitch_username().ok(),
            order_id: order.order_number,
            order,
        }
    }

    /// Apply a patch in place. Nothing is changed if the patch is invalid.
    pub fn apply(&mut self, patch: &BreakPatch) -> Result<(), BreakdeskError> {
        patch.validate_for(self)?;

        if let Some(handle) = &patch.twitch_username {
            let handle = handle.trim();
            self.twitch_username = (!handle.is_empty()).then(|| handle.to_string());
        }

        for LineItemNote { index, note } in &patch.line_item_notes {
            self.order.line_items[*index].notes = note.clone();
        }

        Ok(())
    }
}

/// The pending queue. Serialized as `{"ordered_breaks": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breaks {
    ordered_breaks: Vec<Break>,
}

impl Breaks {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Append at the tail. Rejects a second break for the same order.
    pub fn push(&mut self, brk: Break) -> Result<(), BreakdeskError> {
        if self.contains(brk.order_id) {
            return Err(BreakdeskError::DuplicateOrder(brk.order_id));
        }
        self.ordered_breaks.push(brk);
        Ok(())
    }

    /// Remove and return the break for `id`, keeping the others in order.
    pub fn remove(&mut self, id: OrderNumber) -> Result<Break, BreakdeskError> {
        let pos = self
            .ordered_breaks
            .iter()
            .position(|brk| brk.order_id == id)
            .ok_or(BreakdeskError::NotFound(id))?;
        Ok(self.ordered_breaks.remove(pos))
    }

    pub fn get(&self, id: OrderNumber) -> Option<&Break> {
        self.ordered_breaks.iter().find(|brk| brk.order_id == id)
    }

    pub fn get_mut(&mut self, id: OrderNumber) -> Option<&mut Break> {
        self.ordered_breaks.iter_mut().find(|brk| brk.order_id == id)
    }

    pub fn contains(&self, id: OrderNumber) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Break> {
        self.ordered_breaks.iter()
    }

    pub fn len(&self) -> usize {
        self.ordered_breaks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered_breaks.is_empty()
    }

    /// Order numbers in queue order.
    pub fn order_ids(&self) -> Vec<OrderNumber> {
        self.ordered_breaks.iter().map(|brk| brk.order_id).collect()
    }
}

impl FromIterator<Break> for Breaks {
    fn from_iter<T: IntoIterator<Item = Break>>(iter: T) -> Self {
        Self {
            ordered_breaks: Vec::from_iter(iter),
        }
    }
}

impl<'a> IntoIterator for &'a Breaks {
    type Item = &'a Break;
    type IntoIter = std::slice::Iter<'a, Break>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Partial update of a break, as sent by `POST /update_order/{n}`.
///
/// ```json
/// { "twitch_username": "argablarga", "line_item_notes": [{ "index": 0, "note": "hello" }] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BreakPatch {
    /// New handle. An empty string clears it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitch_username: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub line_item_notes: Vec<LineItemNote>,
}

/// Note for the line item at position `index`. `None` clears it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemNote {
    pub index: usize,
    pub note: Option<String>,
}

impl BreakPatch {
    pub fn handle(handle: impl Into<String>) -> Self {
        Self {
            twitch_username: Some(handle.into()),
            ..Self::default()
        }
    }

    pub fn note(index: usize, note: impl Into<String>) -> Self {
        Self::default().with_note(index, Some(note.into()))
    }

    pub fn with_note(mut self, index: usize, note: Option<String>) -> Self {
        self.line_item_notes.push(LineItemNote { index, note });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.twitch_username.is_none() && self.line_item_notes.is_empty()
    }

    /// Check the whole patch against `brk` before any of it is applied.
    pub fn validate_for(&self, brk: &Break) -> Result<(), BreakdeskError> {
        let invalid = |reason: String| BreakdeskError::InvalidPatch {
            order_number: brk.order_id,
            reason,
        };

        if let Some(handle) = &self.twitch_username {
            let len = handle.trim().chars().count();
            if len > MAX_HANDLE_LEN {
                return Err(invalid(format!(
                    "handle is {len} characters, at most {MAX_HANDLE_LEN} allowed"
                )));
            }
        }

        let line_count = brk.order.line_items.len();
        if let Some(note) = self
            .line_item_notes
            .iter()
            .find(|note| note.index >= line_count)
        {
            return Err(invalid(format!(
                "line item {} does not exist (order has {line_count})",
                note.index
            )));
        }

        Ok(())
    }
}
