// SPDX-FileCopyrightText: 2026 Breakdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Terminal rendering of the pending queue.

use std::fmt::Write;

use breakdesk_core::{Break, Breaks};
use colored::Colorize;

/// Render `breaks` as a block of text, one break per paragraph.
///
/// Line items are numbered by position; those positions are what
/// `breakdesk update --note IDX=TEXT` takes.
pub fn render_breaks(breaks: &Breaks) -> String {
    let mut out = String::new();
    let heading = match breaks.len() {
        0 => "no pending breaks".to_string(),
        1 => "1 pending break".to_string(),
        n => format!("{n} pending breaks"),
    };
    let _ = writeln!(out, "{}", heading.bold());
    for brk in breaks.iter() {
        render_break(&mut out, brk);
    }
    out
}

fn render_break(out: &mut String, brk: &Break) {
    let handle = brk.twitch_username.as_deref().unwrap_or("-");
    let _ = writeln!(
        out,
        "\n{}  {}",
        format!("#{}", brk.order_id).cyan().bold(),
        handle.green()
    );
    if let Some(note) = &brk.order.buyer_note {
        let _ = writeln!(out, "    buyer: {note}");
    }
    for (idx, item) in brk.order.line_items.iter().enumerate() {
        let _ = write!(out, "  [{idx}] {:>3} x {}", item.quantity, item.name);
        for option in &item.options {
            let _ = write!(out, "  ({}: {})", option.option, option.selection);
        }
        out.push('\n');
        if let Some(note) = &item.notes {
            let _ = writeln!(out, "        {} {note}", "note:".yellow());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use breakdesk_core::BreakPatch;
    use breakdesk_test_utils::fixtures::{order, order_10019};

    fn plain(breaks: &Breaks) -> String {
        colored::control::set_override(false);
        render_breaks(breaks)
    }

    #[test]
    fn empty_queue() {
        assert_eq!(plain(&Breaks::empty()), "no pending breaks\n");
    }

    #[test]
    fn break_lists_items_by_position() {
        let mut brk = Break::from_order(order_10019());
        brk.apply(&BreakPatch::note(1, "pulled a zard")).unwrap();
        let breaks: Breaks = std::iter::once(brk).collect();

        let text = plain(&breaks);
        assert!(text.starts_with("1 pending break\n"));
        assert!(text.contains("#10019  argablarga"));
        assert!(text.contains("buyer: ship in a toploader please"));
        assert!(text.contains("[0]   4 x Pokemon 151 Booster Pack  (Keep: Holos only)"));
        assert!(text.contains("[1]  10 x Bulk Commons\n        note: pulled a zard"));
        assert!(text.contains("[2]   2 x Surging Sparks Booster Bundle"));
    }

    #[test]
    fn missing_handle_shows_dash() {
        let breaks: Breaks = std::iter::once(Break::from_order(order(7))).collect();
        assert!(plain(&breaks).contains("#7  -"));
    }
}
