//! Fixed-capacity reference tables for nearest-color classification.

use crate::colors::manhattan_distance;
use heapless::Vec;
use palette::Srgb;

/// Errors from building a [`ColorTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TableError {
    /// Table capacity exceeded.
    CapacityExceeded,
}

impl core::fmt::Display for TableError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TableError::CapacityExceeded => write!(f, "color table capacity exceeded"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TableError {}

/// Labelled reference colors, searched by Manhattan distance.
///
/// # Type Parameters
/// * `L` - Label type (e.g. `&'static str` or an application enum)
/// * `N` - Maximum number of entries
#[derive(Debug, Clone)]
pub struct ColorTable<L, const N: usize> {
    entries: Vec<(L, Srgb<u8>), N>,
}

impl<L, const N: usize> ColorTable<L, N> {
    /// Creates an empty table.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Creates a table builder.
    pub fn builder() -> ColorTableBuilder<L, N> {
        ColorTableBuilder::new()
    }

    /// Appends an entry.
    pub fn push(&mut self, label: L, reference: Srgb<u8>) -> Result<(), TableError> {
        self.entries
            .push((label, reference))
            .map_err(|_| TableError::CapacityExceeded)
    }

    /// Returns the label of the closest reference color.
    ///
    /// Ties resolve to the earliest entry. Returns `None` for an empty table.
    pub fn nearest(&self, sample: Srgb<u8>) -> Option<&L> {
        let mut nearest = None;
        let mut min_dist = u16::MAX;

        for (label, reference) in &self.entries {
            let dist = manhattan_distance(sample, *reference);
            if dist < min_dist {
                min_dist = dist;
                nearest = Some(label);
            }
        }

        nearest
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(label, reference)` entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&L, Srgb<u8>)> {
        self.entries.iter().map(|(label, color)| (label, *color))
    }
}

impl<L, const N: usize> Default for ColorTable<L, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`ColorTable`].
#[derive(Debug)]
pub struct ColorTableBuilder<L, const N: usize> {
    table: ColorTable<L, N>,
}

impl<L, const N: usize> ColorTableBuilder<L, N> {
    /// Creates an empty builder.
    pub const fn new() -> Self {
        Self {
            table: ColorTable::new(),
        }
    }

    /// Adds a labelled reference color.
    ///
    /// # Errors
    /// * `CapacityExceeded` - The table already holds `N` entries
    pub fn entry(mut self, label: L, reference: Srgb<u8>) -> Result<Self, TableError> {
        self.table.push(label, reference)?;
        Ok(self)
    }

    /// Finishes the table.
    pub fn build(self) -> ColorTable<L, N> {
        self.table
    }
}

impl<L, const N: usize> Default for ColorTableBuilder<L, N> {
    fn default() -> Self {
        Self::new()
    }
}
