//! Adaptive frequency models for the Quantum range coder

/// Sum of frequencies above which a model is rescaled
pub const RESCALE_THRESHOLD: u16 = 3800;

/// Frequency added to a symbol each time it is decoded
pub const FREQUENCY_STEP: u16 = 8;

/// Rescales that halve in place before a full rebuild
const HALVINGS_BEFORE_REBUILD: u8 = 4;

/// Rescales between subsequent full rebuilds
const HALVINGS_AFTER_REBUILD: u8 = 50;

/// An ordered table of symbols with cumulative frequencies.
///
/// Entry `i` holds a symbol and the summed frequency of entries `i..`, so
/// `cumulative_frequency(0)` is the model total and the extra sentinel entry
/// at `entries()` is always 0. Frequently decoded symbols drift towards the
/// front on each rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    start: u16,
    symbols: Vec<u16>,
    cumulative: Vec<u16>,
    positions: Vec<u16>,
    halvings_left: u8,
}

impl Model {
    /// Model over symbols `start..start + len`, each with frequency 1
    pub fn new(start: u16, len: usize) -> Self {
        let symbols = (0..len).map(|i| start + i as u16).collect();
        let cumulative = (0..=len).map(|i| (len - i) as u16).collect();
        let positions = (0..len as u16).collect();
        Self {
            start,
            symbols,
            cumulative,
            positions,
            halvings_left: HALVINGS_BEFORE_REBUILD,
        }
    }

    /// Number of symbols
    pub fn entries(&self) -> usize {
        self.symbols.len()
    }

    /// Total frequency, the cumulative frequency of entry 0
    pub fn total_frequency(&self) -> u16 {
        self.cumulative[0]
    }

    /// Cumulative frequency of entry `index` (`index <= entries()`)
    pub fn cumulative_frequency(&self, index: usize) -> u16 {
        self.cumulative[index]
    }

    /// Symbol held by entry `index`
    pub fn symbol_at(&self, index: usize) -> u16 {
        self.symbols[index]
    }

    /// Entry currently holding `symbol`, if the model covers it
    pub fn position_of(&self, symbol: u16) -> Option<usize> {
        let offset = symbol.checked_sub(self.start)? as usize;
        self.positions.get(offset).map(|&p| p as usize)
    }

    /// First entry `i >= 1` whose cumulative frequency is at most `target`
    pub(crate) fn find(&self, target: u32) -> usize {
        let entries = self.entries();
        (1..entries)
            .find(|&i| self.cumulative[i] as u32 <= target)
            .unwrap_or(entries)
    }

    /// Credit the symbol at entry `bound - 1`: every entry below `bound` gains
    /// [`FREQUENCY_STEP`], then the model is rescaled if the total passed
    /// [`RESCALE_THRESHOLD`]
    pub fn update(&mut self, bound: usize) {
        for cum in &mut self.cumulative[..bound] {
            *cum += FREQUENCY_STEP;
        }
        if self.cumulative[0] > RESCALE_THRESHOLD {
            self.rescale();
        }
    }

    fn rescale(&mut self) {
        self.halvings_left -= 1;
        if self.halvings_left > 0 {
            self.halve();
        } else {
            self.halvings_left = HALVINGS_AFTER_REBUILD;
            self.rebuild();
        }
    }

    /// Halve in place, keeping cumulative frequencies strictly decreasing
    fn halve(&mut self) {
        for i in (0..self.entries()).rev() {
            self.cumulative[i] >>= 1;
            if self.cumulative[i] <= self.cumulative[i + 1] {
                self.cumulative[i] = self.cumulative[i + 1] + 1;
            }
        }
        log::trace!("Quantum model halved, total now {}", self.cumulative[0]);
    }

    /// Re-sort by frequency, most frequent first
    fn rebuild(&mut self) {
        let entries = self.entries();
        for i in 0..entries {
            let freq = self.cumulative[i] - self.cumulative[i + 1] + 1;
            self.cumulative[i] = freq >> 1;
        }

        for i in 0..entries.saturating_sub(1) {
            for j in i + 1..entries {
                if self.cumulative[i] < self.cumulative[j] {
                    self.cumulative.swap(i, j);
                    self.symbols.swap(i, j);
                }
            }
        }

        for i in (0..entries).rev() {
            self.cumulative[i] += self.cumulative[i + 1];
        }
        for (index, &symbol) in self.symbols.iter().enumerate() {
            self.positions[(symbol - self.start) as usize] = index as u16;
        }
        log::debug!(
            "Quantum model rebuilt: {} symbols, front symbol {}, total {}",
            entries,
            self.symbols[0],
            self.cumulative[0]
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_well_formed(model: &Model) {
        let entries = model.entries();
        assert_eq!(model.cumulative_frequency(entries), 0);
        for i in 0..entries {
            assert!(model.cumulative_frequency(i) > model.cumulative_frequency(i + 1));
            assert_eq!(model.position_of(model.symbol_at(i)), Some(i));
        }
    }

    #[test]
    fn test_initial_model() {
        let model = Model::new(0x40, 64);
        assert_eq!(model.entries(), 64);
        assert_eq!(model.total_frequency(), 64);
        assert_eq!(model.symbol_at(0), 0x40);
        assert_eq!(model.symbol_at(63), 0x7F);
        assert_eq!(model.position_of(0x41), Some(1));
        assert_eq!(model.position_of(0x3F), None);
        assert_eq!(model.position_of(0x80), None);
        assert_well_formed(&model);
    }

    #[test]
    fn test_single_rescale_in_475_updates() {
        let mut model = Model::new(0, 64);
        let mut drops = Vec::new();
        let mut previous = model.total_frequency();
        for update in 1..=475 {
            model.update(1);
            let total = model.total_frequency();
            if total < previous {
                drops.push(update);
            }
            previous = total;
        }
        assert_eq!(drops, vec![468]);
        assert_well_formed(&model);
    }

    #[test]
    fn test_find_locates_bracket() {
        let model = Model::new(0, 7);
        // cumulative: 7 6 5 4 3 2 1 0
        assert_eq!(model.find(6), 1);
        assert_eq!(model.find(5), 2);
        assert_eq!(model.find(0), 7);
    }

    /// Load cumulative frequencies and trigger a rescale through `update`
    fn force_rescale(model: &mut Model, cumulative: &[u16]) {
        model.cumulative = cumulative.to_vec();
        model.update(0);
    }

    #[test]
    fn test_halve_bumps_entries_onto_successor() {
        let mut model = Model::new(0, 4);
        model.cumulative = vec![3796, 10, 3, 1, 0];
        // Credit entry 1: 3804 18 3 1 0, over the threshold
        model.update(2);
        // 1 >> 1 = 0 and 3 >> 1 = 1 both collide with their successor
        assert_eq!(model.cumulative, vec![1902, 9, 2, 1, 0]);
        assert_eq!(model.symbols, vec![0, 1, 2, 3]);
        assert_eq!(model.halvings_left, 3);
    }

    #[test]
    fn test_fourth_rescale_rebuilds() {
        let mut model = Model::new(0, 4);
        let loaded = [3900, 3000, 100, 50, 0];
        for halvings_left in [3, 2, 1] {
            force_rescale(&mut model, &loaded);
            assert_eq!(model.cumulative, vec![1950, 1500, 50, 25, 0]);
            assert_eq!(model.symbols, vec![0, 1, 2, 3]);
            assert_eq!(model.halvings_left, halvings_left);
        }

        // Frequencies 901 2901 51 51 halve to 450 1450 25 25, then sort
        force_rescale(&mut model, &loaded);
        assert_eq!(model.cumulative, vec![1950, 500, 50, 25, 0]);
        assert_eq!(model.symbols, vec![1, 0, 2, 3]);
        assert_eq!(model.positions, vec![1, 0, 2, 3]);
        assert_eq!(model.halvings_left, 50);

        for halvings_left in (1..50).rev() {
            force_rescale(&mut model, &loaded);
            assert_eq!(model.halvings_left, halvings_left);
            assert_eq!(model.symbols, vec![1, 0, 2, 3]);
        }
        force_rescale(&mut model, &loaded);
        assert_eq!(model.halvings_left, 50);
        assert_eq!(model.symbols, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_rebuild_orders_ties_by_swap_sort() {
        let mut model = Model::new(0, 4);
        model.cumulative = vec![116, 97, 58, 39, 0];
        model.halvings_left = 1;
        // Frequencies 19 39 19 39 become 10 20 10 20; the swaps leave the
        // tied tail as symbols 2, 0 where a stable sort would give 0, 2
        model.rescale();
        assert_eq!(model.cumulative, vec![60, 40, 20, 10, 0]);
        assert_eq!(model.symbols, vec![1, 3, 2, 0]);
        assert_eq!(model.positions, vec![3, 0, 2, 1]);
        assert_eq!(model.halvings_left, 50);
        assert_well_formed(&model);
    }

    #[test]
    fn test_rebuild_moves_frequent_symbol_to_front() {
        let mut model = Model::new(0, 64);
        let mut updates = 0;
        while model.position_of(63) != Some(0) {
            let bound = model.position_of(63).unwrap() + 1;
            model.update(bound);
            updates += 1;
            assert!(updates < 10_000, "symbol 63 never reached the front");
        }
        assert_eq!(model.symbol_at(0), 63);
        assert!(model.total_frequency() <= RESCALE_THRESHOLD);
        assert_well_formed(&model);
    }
}
