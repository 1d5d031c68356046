use rand::RngCore;

use crate::model::DemographicTables;
use crate::model::Gender;
use crate::sampler::PersonSampler;
use crate::tree::FamilyTree;

// ---------------------------------------------------------------------------
// Table constructors
// ---------------------------------------------------------------------------

/// Tables with a single rate entry for the 1950s and nothing else.
/// People born in any other decade get neither partners nor children.
pub fn single_decade_tables(birth_rate: f64, marriage_rate: f64) -> DemographicTables {
    let mut tables = DemographicTables::default();
    tables
        .rates_by_decade
        .insert("1950s".to_string(), (birth_rate, marriage_rate));
    tables
}

/// Fully populated tables covering every decade from the 1900s through the
/// 2120s: steady rates, two first names per gender, two surnames, and a
/// flat life expectancy.
pub fn full_horizon_tables() -> DemographicTables {
    let mut tables = DemographicTables::default();
    for decade_start in (1900..=2120).step_by(10) {
        let decade = format!("{decade_start}s");
        tables.rates_by_decade.insert(decade.clone(), (2.0, 0.9));
        tables.first_names.insert(
            (decade.clone(), Gender::Male),
            vec![("John".to_string(), 3.0), ("Paul".to_string(), 1.0)],
        );
        tables.first_names.insert(
            (decade.clone(), Gender::Female),
            vec![("Mary".to_string(), 3.0), ("Anna".to_string(), 1.0)],
        );
        let mut probs = std::collections::BTreeMap::new();
        probs.insert(Gender::Male, 0.9);
        probs.insert(Gender::Female, 0.9);
        tables.gender_probs.insert(decade.clone(), probs);
        tables.life_expectancy.insert(decade.clone(), 70.0);
        tables.last_names_by_decade.insert(
            decade,
            vec![("Miller".to_string(), 0.6), ("Garcia".to_string(), 0.4)],
        );
    }
    tables.fallback_life_decade = tables.life_expectancy.keys().next_back().cloned();
    tables
}

// ---------------------------------------------------------------------------
// Tree constructors
// ---------------------------------------------------------------------------

/// Build and generate a tree from the given tables and seed.
pub fn generated_tree(tables: DemographicTables, seed: u64) -> FamilyTree {
    let mut tree = FamilyTree::new(PersonSampler::new(tables, seed));
    tree.generate();
    tree
}

// ---------------------------------------------------------------------------
// Deterministic random source
// ---------------------------------------------------------------------------

/// A random source that replays a fixed sequence of words, cycling when it
/// runs out. Useful for forcing a specific branch in sampling code.
pub struct SequenceRng {
    values: Vec<u64>,
    index: usize,
}

impl SequenceRng {
    /// # Panics
    ///
    /// Panics if `values` is empty.
    pub fn new(values: Vec<u64>) -> Self {
        assert!(!values.is_empty(), "SequenceRng needs at least one value");
        Self { values, index: 0 }
    }
}

impl RngCore for SequenceRng {
    fn next_u32(&mut self) -> u32 {
        self.next_u64() as u32
    }

    fn next_u64(&mut self) -> u64 {
        let value = self.values[self.index % self.values.len()];
        self.index += 1;
        value
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}

// ---------------------------------------------------------------------------
// Assertion helpers
// ---------------------------------------------------------------------------

/// Assert a float is approximately equal, with a named context message.
pub fn assert_approx(actual: f64, expected: f64, tolerance: f64, msg: &str) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "{msg}: expected ~{expected} (+-{tolerance}), got {actual}"
    );
}

/// Assert two trees produced from the same seed are identical, person by
/// person.
pub fn assert_deterministic(tree1: &FamilyTree, tree2: &FamilyTree) {
    assert_eq!(
        tree1.total_people(),
        tree2.total_people(),
        "population mismatch: {} vs {}",
        tree1.total_people(),
        tree2.total_people()
    );
    for (first, second) in tree1.people.values().zip(tree2.people.values()) {
        assert_eq!(first, second, "person {} differs between runs", first.id);
    }
}
