//! Grid layout for the survey builder canvas
//!
//! The canvas is a 12-column grid. Every breakpoint carries the same set of
//! entries; cards are placed left-to-right, top-to-bottom in fixed-size
//! slots.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Number of grid columns.
pub const GRID_COLUMNS: u32 = 12;

/// Default card width in columns.
pub const CARD_WIDTH: u32 = 3;

/// Default card height in rows.
pub const CARD_HEIGHT: u32 = 2;

/// Position and size of one card, keyed by question id (`i`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutItem {
    pub i: String,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl LayoutItem {
    /// Entry for the card at `index` using the slot formula
    /// `x = (index * w) % 12`, `y = floor(index * w / 12) * h`.
    ///
    /// # Examples
    ///
    /// ```
    /// use surveyflow::builder::layout::LayoutItem;
    ///
    /// let item = LayoutItem::at_index("q", 5, 3, 2);
    /// assert_eq!((item.x, item.y), (3, 2));
    /// ```
    pub fn at_index(id: impl Into<String>, index: usize, w: u32, h: u32) -> Self {
        let offset = index as u32 * w;
        Self {
            i: id.into(),
            x: offset % GRID_COLUMNS,
            y: (offset / GRID_COLUMNS) * h,
            w,
            h,
        }
    }

    /// Pulls the entry back inside the grid so that `x + w <= 12`.
    pub fn clamp_to_grid(&mut self) {
        self.w = self.w.clamp(1, GRID_COLUMNS);
        if self.x + self.w > GRID_COLUMNS {
            self.x = GRID_COLUMNS - self.w;
        }
    }
}

/// Responsive breakpoints of the builder grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Breakpoint {
    Lg,
    Md,
    Sm,
    Xs,
    Xxs,
}

impl Breakpoint {
    pub const ALL: [Breakpoint; 5] = [
        Breakpoint::Lg,
        Breakpoint::Md,
        Breakpoint::Sm,
        Breakpoint::Xs,
        Breakpoint::Xxs,
    ];
}

/// Per-breakpoint layout entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Layouts(BTreeMap<Breakpoint, Vec<LayoutItem>>);

impl Default for Layouts {
    fn default() -> Self {
        Self(Breakpoint::ALL.iter().map(|bp| (*bp, Vec::new())).collect())
    }
}

impl Layouts {
    /// Places `ids` in order, one default-size card per slot, identically on
    /// every breakpoint.
    pub fn generate<'a, I>(ids: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let base: Vec<LayoutItem> = ids
            .into_iter()
            .enumerate()
            .map(|(idx, id)| LayoutItem::at_index(id, idx, CARD_WIDTH, CARD_HEIGHT))
            .collect();

        Self(Breakpoint::ALL.iter().map(|bp| (*bp, base.clone())).collect())
    }

    /// Appends `item` to every breakpoint.
    pub fn append(&mut self, item: LayoutItem) {
        for bp in Breakpoint::ALL {
            self.0.entry(bp).or_default().push(item.clone());
        }
    }

    pub fn get(&self, breakpoint: Breakpoint) -> &[LayoutItem] {
        self.0.get(&breakpoint).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Entry for `id` on the largest breakpoint.
    pub fn find(&self, id: &str) -> Option<&LayoutItem> {
        self.get(Breakpoint::Lg).iter().find(|item| item.i == id)
    }

    /// Replaces one breakpoint's entries, clamping each into the grid.
    pub fn set(&mut self, breakpoint: Breakpoint, mut items: Vec<LayoutItem>) {
        items.iter_mut().for_each(LayoutItem::clamp_to_grid);
        self.0.insert(breakpoint, items);
    }

    /// Drops entries whose id is not in `ids`.
    pub fn retain_ids(&mut self, ids: &[&str]) {
        for items in self.0.values_mut() {
            items.retain(|item| ids.contains(&item.i.as_str()));
        }
    }

    pub fn len(&self) -> usize {
        self.get(Breakpoint::Lg).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
