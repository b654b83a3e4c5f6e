use rand::seq::SliceRandom;
use rand::Rng;

use super::types::ContentTable;

/// Shuffles the option order of every entry in place.
///
/// Tables that use up their choices show one shared set of options, so
/// every entry gets the same order there.
pub fn shuffle_choices<R: Rng + ?Sized>(table: &mut ContentTable, rng: &mut R) {
    let shared = table.rules.consume_choices;
    let mut entries = table.entries.iter_mut();
    let Some(first) = entries.next() else {
        return;
    };
    first.choices.shuffle(rng);

    if !shared {
        for entry in entries {
            entry.choices.shuffle(rng);
        }
        return;
    }

    let order: Vec<String> = first.choices.iter().map(|c| c.id.clone()).collect();
    for entry in entries {
        entry
            .choices
            .sort_by_key(|c| order.iter().position(|id| *id == c.id));
    }
}

/// Replaces the entries with `count` uniform draws (with replacement) from
/// the current entries. Drawn entries are renumbered 1..=count.
pub fn draw_from_pool<R: Rng + ?Sized>(table: &mut ContentTable, count: usize, rng: &mut R) {
    if table.entries.is_empty() {
        return;
    }
    let pool = std::mem::take(&mut table.entries);
    table.entries = (0..count)
        .map(|i| {
            let mut entry = pool[rng.gen_range(0..pool.len())].clone();
            entry.id = i as u32 + 1;
            entry
        })
        .collect();
}

impl ContentTable {
    /// Applies the table's draw and shuffle rules once, before play.
    pub fn prepare<R: Rng + ?Sized>(mut self, rng: &mut R) -> Self {
        if let Some(count) = self.rules.draw {
            draw_from_pool(&mut self, count, rng);
        }
        if self.rules.shuffle_choices {
            shuffle_choices(&mut self, rng);
        }
        self
    }
}
