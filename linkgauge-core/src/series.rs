//! Sparse Tick Series with Explicit Present/Absent Accounting
//!
//! ## Overview
//!
//! This module stores one node's rolling time series keyed by the node's
//! reported tick index. The backing store must distinguish "no data yet"
//! from "reading value zero" - conflating the two corrupts gap
//! accounting - so slots are held in a sparse ordered map rather than a
//! zero-filled array grown by index.
//!
//! ## Gap accounting
//!
//! A gap is a tick in `[0, frontier]` for which no reading has ever been
//! recorded. The radio reorders freely, so gap state is a property of the
//! *set* of ticks seen, not of arrival order:
//!
//! - a fresh tick beyond the frontier opens one gap per skipped tick
//!   strictly between the old frontier and the new tick;
//! - a fresh tick at or below the frontier closes exactly the one gap it
//!   fills (it was counted as missing when the frontier passed it);
//! - a duplicate tick overwrites the stored value and changes no counts.
//!
//! This bookkeeping keeps `missing()` identical to what a full rescan of
//! `[0, frontier]` would find, for every arrival order of the same set of
//! ticks.
//!
//! ## Memory
//!
//! Profiles live for the process lifetime and ticks are unbounded, so the
//! store is heap-backed (`BTreeMap`). Sparse is the common case: a node
//! at 50% drop rate stores half as many slots as ticks elapsed.

use alloc::collections::BTreeMap;

use crate::messages::Tick;

/// Outcome of inserting one reading into the series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Insert {
    /// First write to this tick slot.
    Fresh {
        /// Gaps newly opened between the old frontier and this tick.
        opened: u32,
        /// Whether this tick closed a previously counted gap.
        backfill: bool,
    },
    /// The tick already held a value; last write wins.
    Overwrite {
        /// The value that was replaced.
        previous: f32,
    },
}

/// Ordered, sparse map from tick index to the last reading at that tick.
#[derive(Debug, Clone, Default)]
pub struct TickSeries {
    slots: BTreeMap<Tick, f32>,
    /// Highest tick ever observed; `None` until the first insert.
    frontier: Option<Tick>,
    /// Ticks in `[0, frontier]` with no recorded reading.
    missing: u32,
}

impl TickSeries {
    /// Create an empty series.
    pub const fn new() -> Self {
        Self {
            slots: BTreeMap::new(),
            frontier: None,
            missing: 0,
        }
    }

    /// Record `value` at `tick`, last write wins.
    pub fn insert(&mut self, tick: Tick, value: f32) -> Insert {
        if let Some(previous) = self.slots.insert(tick, value) {
            return Insert::Overwrite { previous };
        }

        let (opened, backfill) = match self.frontier {
            // First reading ever: ticks 0..tick were skipped outright.
            None => (tick, false),
            Some(frontier) if tick > frontier => {
                // Every tick strictly between the old frontier and this
                // one is absent; the frontier is always a present slot.
                (tick - frontier - 1, false)
            }
            // At or below the frontier and previously empty: this slot
            // was counted as missing when the frontier passed it.
            Some(_) => (0, true),
        };

        self.missing += opened;
        if backfill {
            self.missing -= 1;
        }
        if self.frontier.map_or(true, |f| tick > f) {
            self.frontier = Some(tick);
        }

        Insert::Fresh { opened, backfill }
    }

    /// Last recorded value at `tick`, if any.
    pub fn get(&self, tick: Tick) -> Option<f32> {
        self.slots.get(&tick).copied()
    }

    /// Number of ticks with a recorded reading.
    pub fn present(&self) -> u32 {
        self.slots.len() as u32
    }

    /// Number of ticks in `[0, frontier]` never observed.
    pub fn missing(&self) -> u32 {
        self.missing
    }

    /// Highest tick ever observed, if any reading has arrived.
    pub fn frontier(&self) -> Option<Tick> {
        self.frontier
    }

    /// Whether no reading has ever been recorded.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Iterate over (tick, value) slots in tick order.
    pub fn iter(&self) -> impl Iterator<Item = (Tick, f32)> + '_ {
        self.slots.iter().map(|(t, v)| (*t, *v))
    }
}
