use rand::Rng;
use rand::RngCore;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::id::IdGenerator;
use crate::model::{DemographicTables, Gender, Person, decade_of};

/// First name used when no name table covers the requested decade.
pub const DEFAULT_FIRST_NAME: &str = "Alex";
/// Surname used when every surname table is empty.
pub const DEFAULT_LAST_NAME: &str = "Smith";
/// Life expectancy in years when no table covers the requested decade.
pub const DEFAULT_LIFE_EXPECTANCY: f64 = 75.0;

/// Pick one entry from a weighted list.
///
/// Weights are relative and need not sum to one. A non-positive weight
/// total falls back to a uniform pick so malformed tables still sample.
///
/// # Panics
///
/// Panics if `items` is empty.
pub fn weighted_choice<'a, T>(items: &'a [(T, f64)], rng: &mut dyn RngCore) -> &'a T {
    assert!(!items.is_empty(), "weighted_choice: empty item list");
    let total: f64 = items.iter().map(|(_, weight)| *weight).sum();
    if total <= 0.0 {
        return &items[rng.random_range(0..items.len())].0;
    }
    let roll = rng.random::<f64>() * total;
    let mut upto = 0.0;
    for (value, weight) in items {
        upto += weight;
        if upto >= roll {
            return value;
        }
    }
    // Float summation error can leave the roll slightly above the total.
    &items[items.len() - 1].0
}

/// Draws people from the demographic tables.
///
/// Owns the random stream and the id counter, so every person a run
/// produces comes from one seeded sequence of draws.
pub struct PersonSampler {
    tables: DemographicTables,
    rng: Box<dyn RngCore>,
    ids: IdGenerator,
}

impl PersonSampler {
    /// Create a sampler with a deterministic stream seeded from `seed`.
    pub fn new(tables: DemographicTables, seed: u64) -> Self {
        Self::with_rng(tables, Box::new(SmallRng::seed_from_u64(seed)))
    }

    /// Create a sampler over an arbitrary random source.
    pub fn with_rng(tables: DemographicTables, rng: Box<dyn RngCore>) -> Self {
        Self {
            tables,
            rng,
            ids: IdGenerator::new(),
        }
    }

    pub fn tables(&self) -> &DemographicTables {
        &self.tables
    }

    /// Borrow the sampler's random stream for draws made outside it.
    pub fn rng_mut(&mut self) -> &mut dyn RngCore {
        self.rng.as_mut()
    }

    /// Draw a gender with even odds. The decade is accepted but not yet
    /// consulted; a table-driven draw would key off it.
    pub fn sample_gender(&mut self, _decade: &str) -> Gender {
        if self.rng.random_bool(0.5) {
            Gender::Male
        } else {
            Gender::Female
        }
    }

    /// Draw a first name for a birth decade and gender.
    ///
    /// The gender-probability table decides how likely the name is to be
    /// drawn from the matching gender's list. Whichever gender wins the
    /// roll, the other one's list serves as a fallback when the winner has
    /// no names for the decade.
    pub fn sample_first_name(&mut self, decade: &str, gender: Gender) -> String {
        let p_match = self
            .tables
            .gender_probs
            .get(decade)
            .and_then(|probs| probs.get(&gender))
            .copied()
            .unwrap_or(1.0);
        let roll = self.rng.random::<f64>();
        let picked = if roll <= p_match {
            gender
        } else {
            gender.opposite()
        };

        for candidate in [picked, picked.opposite()] {
            let key = (decade.to_string(), candidate);
            if let Some(names) = self.tables.first_names.get(&key)
                && !names.is_empty()
            {
                return weighted_choice(names, self.rng.as_mut()).clone();
            }
        }
        DEFAULT_FIRST_NAME.to_string()
    }

    /// Draw a surname for a birth decade.
    ///
    /// Falls back to the earliest decade with surname data, then to the
    /// default surname.
    pub fn sample_last_name(&mut self, decade: &str) -> String {
        if let Some(names) = self.tables.last_names_by_decade.get(decade)
            && !names.is_empty()
        {
            return weighted_choice(names, self.rng.as_mut()).clone();
        }
        for names in self.tables.last_names_by_decade.values() {
            if !names.is_empty() {
                return weighted_choice(names, self.rng.as_mut()).clone();
            }
        }
        DEFAULT_LAST_NAME.to_string()
    }

    /// Expected years of life for a birth decade.
    ///
    /// Decades past the table's coverage use its latest decade.
    pub fn life_expectancy_years(&self, decade: &str) -> f64 {
        if let Some(&years) = self.tables.life_expectancy.get(decade) {
            return years;
        }
        if let Some(fallback) = &self.tables.fallback_life_decade
            && let Some(&years) = self.tables.life_expectancy.get(fallback)
        {
            return years;
        }
        DEFAULT_LIFE_EXPECTANCY
    }

    /// Create a person born in `birth_year`.
    ///
    /// Direct descendants inherit one of the two founder surnames with
    /// even odds; everyone else samples a surname from the tables. The
    /// death year lands within ten years of the decade's life expectancy
    /// and never precedes the birth year.
    ///
    /// # Panics
    ///
    /// Panics if `is_direct_descendant` is set without founder surnames.
    pub fn create_person(
        &mut self,
        birth_year: i32,
        is_direct_descendant: bool,
        founder_surnames: Option<&(String, String)>,
    ) -> Person {
        let decade = decade_of(birth_year);
        let gender = self.sample_gender(&decade);
        let first_name = self.sample_first_name(&decade, gender);

        let last_name = if is_direct_descendant {
            let pair = founder_surnames.unwrap_or_else(|| {
                panic!("create_person: founder surnames required for direct descendants")
            });
            if self.rng.random_bool(0.5) {
                pair.0.clone()
            } else {
                pair.1.clone()
            }
        } else {
            self.sample_last_name(&decade)
        };

        let expected_death = birth_year as f64 + self.life_expectancy_years(&decade);
        let jitter = self.rng.random_range(-10.0..=10.0);
        let death_year = ((expected_death + jitter).round() as i32).max(birth_year);

        let mut person = Person::new(
            self.ids.next_id(),
            birth_year,
            death_year,
            gender,
            first_name,
            last_name,
        );
        person.is_direct_descendant = is_direct_descendant;
        person
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::SequenceRng;

    fn named_tables() -> DemographicTables {
        let mut tables = DemographicTables::default();
        tables.first_names.insert(
            ("1950s".to_string(), Gender::Male),
            vec![("John".to_string(), 3.0), ("Paul".to_string(), 1.0)],
        );
        tables.first_names.insert(
            ("1950s".to_string(), Gender::Female),
            vec![("Mary".to_string(), 1.0)],
        );
        tables
            .last_names_by_decade
            .insert("1950s".to_string(), vec![("Miller".to_string(), 1.0)]);
        tables.life_expectancy.insert("1950s".to_string(), 70.0);
        tables
    }

    #[test]
    fn weighted_choice_prefers_heavier_items() {
        let items = vec![("heavy".to_string(), 9.0), ("light".to_string(), 1.0)];
        let mut rng = SmallRng::seed_from_u64(7);
        let heavy_count = (0..1000)
            .filter(|_| weighted_choice(&items, &mut rng) == "heavy")
            .count();
        assert!(
            heavy_count > 800,
            "heavy item should dominate, got {heavy_count}/1000"
        );
    }

    #[test]
    fn weighted_choice_zero_total_is_uniform() {
        let items = vec![
            ("a".to_string(), 0.0),
            ("b".to_string(), 0.0),
            ("c".to_string(), 0.0),
        ];
        let mut rng = SmallRng::seed_from_u64(11);
        let mut counts = [0usize; 3];
        for _ in 0..3000 {
            match weighted_choice(&items, &mut rng).as_str() {
                "a" => counts[0] += 1,
                "b" => counts[1] += 1,
                _ => counts[2] += 1,
            }
        }
        for count in counts {
            assert!((800..1200).contains(&count), "skewed pick counts: {counts:?}");
        }
    }

    #[test]
    fn weighted_choice_zero_roll_takes_first_item() {
        let items = vec![("first".to_string(), 1.0), ("second".to_string(), 1.0)];
        let mut rng = SequenceRng::new(vec![0]);
        assert_eq!(weighted_choice(&items, &mut rng), "first");
    }

    #[test]
    #[should_panic(expected = "empty item list")]
    fn weighted_choice_rejects_empty_list() {
        let items: Vec<(String, f64)> = Vec::new();
        let mut rng = SmallRng::seed_from_u64(0);
        weighted_choice(&items, &mut rng);
    }

    #[test]
    fn gender_draws_cover_both_genders() {
        let mut sampler = PersonSampler::new(DemographicTables::default(), 11);
        let mut saw_male = false;
        let mut saw_female = false;
        for _ in 0..64 {
            match sampler.sample_gender("1950s") {
                Gender::Male => saw_male = true,
                Gender::Female => saw_female = true,
            }
        }
        assert!(saw_male && saw_female, "64 draws never changed gender");
    }

    #[test]
    fn first_name_comes_from_decade_table() {
        let mut sampler = PersonSampler::new(named_tables(), 21);
        let name = sampler.sample_first_name("1950s", Gender::Male);
        assert!(name == "John" || name == "Paul", "unexpected name {name}");
    }

    #[test]
    fn first_name_defaults_when_decade_unknown() {
        let mut sampler = PersonSampler::new(named_tables(), 21);
        assert_eq!(sampler.sample_first_name("1800s", Gender::Male), "Alex");
    }

    #[test]
    fn zero_match_probability_crosses_gender() {
        let mut tables = named_tables();
        let mut probs = std::collections::BTreeMap::new();
        probs.insert(Gender::Male, 0.0);
        tables.gender_probs.insert("1950s".to_string(), probs);
        let mut sampler = PersonSampler::new(tables, 3);
        // With p_match at 0.0 every roll sends the pick to the other list.
        for _ in 0..20 {
            assert_eq!(sampler.sample_first_name("1950s", Gender::Male), "Mary");
        }
    }

    #[test]
    fn empty_bucket_falls_back_to_other_gender() {
        let mut tables = named_tables();
        tables
            .first_names
            .remove(&("1950s".to_string(), Gender::Female));
        let mut sampler = PersonSampler::new(tables, 5);
        let name = sampler.sample_first_name("1950s", Gender::Female);
        assert!(name == "John" || name == "Paul", "unexpected name {name}");
    }

    #[test]
    fn last_name_falls_back_to_earliest_decade() {
        let mut tables = named_tables();
        tables
            .last_names_by_decade
            .insert("1970s".to_string(), vec![("Garcia".to_string(), 1.0)]);
        let mut sampler = PersonSampler::new(tables, 9);
        assert_eq!(sampler.sample_last_name("1990s"), "Miller");
    }

    #[test]
    fn last_name_defaults_when_all_tables_empty() {
        let mut tables = named_tables();
        tables.last_names_by_decade.clear();
        tables
            .last_names_by_decade
            .insert("1950s".to_string(), Vec::new());
        let mut sampler = PersonSampler::new(tables, 9);
        assert_eq!(sampler.sample_last_name("1950s"), "Smith");
    }

    #[test]
    fn life_expectancy_uses_fallback_decade() {
        let mut tables = named_tables();
        tables.fallback_life_decade = Some("1950s".to_string());
        let sampler = PersonSampler::new(tables, 0);
        assert_eq!(sampler.life_expectancy_years("2100s"), 70.0);
    }

    #[test]
    fn life_expectancy_defaults_without_tables() {
        let sampler = PersonSampler::new(DemographicTables::default(), 0);
        assert_eq!(
            sampler.life_expectancy_years("1950s"),
            DEFAULT_LIFE_EXPECTANCY
        );
    }

    #[test]
    fn created_person_never_dies_before_birth() {
        let mut tables = named_tables();
        tables.life_expectancy.insert("1950s".to_string(), 1.0);
        let mut sampler = PersonSampler::new(tables, 17);
        for _ in 0..200 {
            let person = sampler.create_person(1950, false, None);
            assert!(person.death_year >= person.birth_year);
        }
    }

    #[test]
    fn descendant_takes_a_founder_surname() {
        let surnames = ("Reyes".to_string(), "Okafor".to_string());
        let mut sampler = PersonSampler::new(named_tables(), 13);
        for _ in 0..50 {
            let person = sampler.create_person(1980, true, Some(&surnames));
            assert!(
                person.last_name == "Reyes" || person.last_name == "Okafor",
                "descendant surname {} not from founders",
                person.last_name
            );
            assert!(person.is_direct_descendant);
        }
    }

    #[test]
    #[should_panic(expected = "founder surnames required")]
    fn descendant_without_surnames_panics() {
        let mut sampler = PersonSampler::new(named_tables(), 13);
        sampler.create_person(1980, true, None);
    }

    #[test]
    fn same_seed_same_people() {
        let mut first = PersonSampler::new(named_tables(), 99);
        let mut second = PersonSampler::new(named_tables(), 99);
        for _ in 0..20 {
            assert_eq!(
                first.create_person(1950, false, None),
                second.create_person(1950, false, None)
            );
        }
    }

    #[test]
    fn ids_are_sequential() {
        let mut sampler = PersonSampler::new(named_tables(), 1);
        let first = sampler.create_person(1950, false, None);
        let second = sampler.create_person(1950, false, None);
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }
}
