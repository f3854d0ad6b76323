/// Row-aligned selection of cells that a mechanism turns missing.
///
/// `true` at position `i` means row `i` of the target column receives the
/// missing marker when the mask is applied.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MissingMask {
    rows: Vec<bool>,
}

impl MissingMask {
    #[must_use]
    pub const fn new(rows: Vec<bool>) -> Self {
        Self { rows }
    }

    /// A mask that selects nothing.
    #[must_use]
    pub fn none(len: usize) -> Self {
        Self {
            rows: vec![false; len],
        }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn get(&self, row: usize) -> bool {
        self.rows.get(row).copied().unwrap_or(false)
    }

    /// Number of selected rows.
    #[must_use]
    pub fn count(&self) -> usize {
        self.rows.iter().filter(|&&selected| selected).count()
    }

    /// Indices of the selected rows in ascending order.
    pub fn selected(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows
            .iter()
            .enumerate()
            .filter_map(|(row, &selected)| selected.then_some(row))
    }
}

impl FromIterator<bool> for MissingMask {
    fn from_iter<T: IntoIterator<Item = bool>>(iter: T) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selected_yields_true_positions() {
        let mask: MissingMask = [false, true, true, false, true].into_iter().collect();
        assert_eq!(mask.count(), 3);
        assert_eq!(mask.selected().collect::<Vec<_>>(), vec![1, 2, 4]);
        assert!(!mask.get(0));
        assert!(!mask.get(99));
    }

    #[test]
    fn none_selects_nothing() {
        let mask = MissingMask::none(4);
        assert_eq!(mask.len(), 4);
        assert_eq!(mask.count(), 0);
    }
}
