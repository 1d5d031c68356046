use std::collections::{BTreeMap, VecDeque};

use rand::Rng;

use crate::model::{Person, decade_of};
use crate::sampler::PersonSampler;

/// Birth year of the two founders.
pub const FOUNDER_BIRTH_YEAR: i32 = 1950;
/// Children born after this year are not added to the tree.
pub const HORIZON_YEAR: i32 = 2120;
/// A spouse's birth year lands within this many years of their partner's.
const PARTNER_YEAR_JITTER: i32 = 10;
/// Spouse birth years never precede this year.
const EARLIEST_SPOUSE_YEAR: i32 = 1900;
/// Years from the elder partner's birth to the earliest child.
const FIRST_CHILD_OFFSET: i32 = 25;
/// Years from the elder partner's birth to the latest child.
const LAST_CHILD_OFFSET: i32 = 45;

/// A synthesized family tree rooted at two founders.
///
/// Generation walks a breadth-first queue of person ids. Each person gets
/// at most one chance at a partner and each couple generates children
/// exactly once, tracked by the `children_generated` flag on both sides.
pub struct FamilyTree {
    sampler: PersonSampler,
    /// Everyone in the tree, keyed by id. Sorted iteration keeps reports
    /// and exports in a stable order for a fixed seed.
    pub people: BTreeMap<u64, Person>,
    founder_ids: Option<(u64, u64)>,
    founder_surnames: Option<(String, String)>,
}

impl FamilyTree {
    pub fn new(sampler: PersonSampler) -> Self {
        Self {
            sampler,
            people: BTreeMap::new(),
            founder_ids: None,
            founder_surnames: None,
        }
    }

    /// Look up a person by id.
    ///
    /// # Panics
    ///
    /// Panics if the id is not in the tree.
    pub fn person(&self, id: u64) -> &Person {
        self.people
            .get(&id)
            .unwrap_or_else(|| panic!("person: id {id} not found"))
    }

    fn person_mut(&mut self, id: u64) -> &mut Person {
        self.people
            .get_mut(&id)
            .unwrap_or_else(|| panic!("person: id {id} not found"))
    }

    fn add_person(&mut self, person: Person) {
        self.people.insert(person.id, person);
    }

    /// Ids of the two founders, once the tree has been generated.
    pub fn founder_ids(&self) -> Option<(u64, u64)> {
        self.founder_ids
    }

    /// Surnames of the two founders, once the tree has been generated.
    pub fn founder_surnames(&self) -> Option<&(String, String)> {
        self.founder_surnames.as_ref()
    }

    /// Build the tree: create two partnered founders born in 1950, then
    /// expand breadth-first until no one born by the horizon year remains
    /// unprocessed. Spouses join the tree but never the queue; only
    /// children are enqueued.
    pub fn generate(&mut self) {
        let mut first = self.sampler.create_person(FOUNDER_BIRTH_YEAR, false, None);
        let mut second = self.sampler.create_person(FOUNDER_BIRTH_YEAR, false, None);
        first.set_partner(second.id);
        second.set_partner(first.id);
        self.founder_ids = Some((first.id, second.id));
        self.founder_surnames = Some((first.last_name.clone(), second.last_name.clone()));

        let mut queue = VecDeque::from([first.id, second.id]);
        self.add_person(first);
        self.add_person(second);

        while let Some(person_id) = queue.pop_front() {
            if self.person(person_id).birth_year > HORIZON_YEAR {
                continue;
            }
            if self.person(person_id).partner_id.is_none() {
                self.maybe_create_partner(person_id);
            }
            queue.extend(self.create_children_for(person_id));
        }

        tracing::debug!("generated family tree with {} people", self.people.len());
    }

    /// Roll for a partner. The odds come from the decade's birth-rate
    /// column, and seeded populations depend on that exact read. Decades
    /// with no rate entry never produce partners.
    fn maybe_create_partner(&mut self, person_id: u64) {
        let birth_year = self.person(person_id).birth_year;
        let decade = decade_of(birth_year);
        let Some(&(birth_rate, _marriage_rate)) =
            self.sampler.tables().rates_by_decade.get(&decade)
        else {
            return;
        };
        if self.sampler.rng_mut().random::<f64>() > birth_rate {
            return;
        }

        let offset = self
            .sampler
            .rng_mut()
            .random_range(-PARTNER_YEAR_JITTER..=PARTNER_YEAR_JITTER);
        let spouse_year = (birth_year + offset).max(EARLIEST_SPOUSE_YEAR);
        let mut spouse = self.sampler.create_person(spouse_year, false, None);
        let spouse_id = spouse.id;
        spouse.set_partner(person_id);
        self.add_person(spouse);
        self.person_mut(person_id).set_partner(spouse_id);
    }

    /// Generate children for `person_id` and return the new child ids.
    ///
    /// The child count is drawn from a window around the decade's birth
    /// rate, minus one when the person has no partner. Children land at
    /// evenly spread years between 25 and 45 years after the elder
    /// partner's birth; any year past the horizon is dropped. Children of
    /// a founder or of a direct descendant are direct descendants and
    /// inherit a founder surname.
    fn create_children_for(&mut self, person_id: u64) -> Vec<u64> {
        let birth_year = self.person(person_id).birth_year;
        let decade = decade_of(birth_year);
        let Some(&(birth_rate, _marriage_rate)) =
            self.sampler.tables().rates_by_decade.get(&decade)
        else {
            return Vec::new();
        };
        if self.person(person_id).children_generated {
            return Vec::new();
        }

        let min_children = ((birth_rate - 1.5).ceil() as i32).max(0);
        let max_children = ((birth_rate + 1.5).ceil() as i32).max(0);
        let mut num_children = if max_children < min_children {
            0
        } else {
            self.sampler
                .rng_mut()
                .random_range(min_children..=max_children)
        };
        let partner_id = self.person(person_id).partner_id;
        if partner_id.is_none() && num_children > 0 {
            num_children -= 1;
        }
        if num_children <= 0 {
            self.person_mut(person_id).children_generated = true;
            return Vec::new();
        }

        let mut elder_birth = birth_year;
        if let Some(partner_id) = partner_id {
            let partner = self.person(partner_id);
            if partner.children_generated {
                // The partner already generated this couple's children.
                return Vec::new();
            }
            elder_birth = elder_birth.min(partner.birth_year);
        }

        let start = elder_birth + FIRST_CHILD_OFFSET;
        let end = elder_birth + LAST_CHILD_OFFSET;
        let span = end - start;

        let (founder_a, founder_b) = self
            .founder_ids
            .unwrap_or_else(|| panic!("create_children_for: no founders recorded"));
        let is_descendant = person_id == founder_a
            || person_id == founder_b
            || self.person(person_id).is_direct_descendant;

        let mut new_ids = Vec::new();
        for i in 0..num_children {
            let child_year = child_birth_year(start, span, i, num_children);
            if child_year > HORIZON_YEAR {
                continue;
            }
            let child =
                self.sampler
                    .create_person(child_year, is_descendant, self.founder_surnames.as_ref());
            let child_id = child.id;
            self.add_person(child);
            self.person_mut(person_id).add_child(child_id);
            if let Some(partner_id) = partner_id {
                self.person_mut(partner_id).add_child(child_id);
            }
            new_ids.push(child_id);
        }

        self.person_mut(person_id).children_generated = true;
        if let Some(partner_id) = partner_id {
            self.person_mut(partner_id).children_generated = true;
        }
        new_ids
    }

    // --- Reports ---

    /// Total number of people in the tree.
    pub fn total_people(&self) -> usize {
        self.people.len()
    }

    /// Number of people born in each decade, keyed by decade label.
    pub fn people_by_decade(&self) -> BTreeMap<String, usize> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for person in self.people.values() {
            *counts.entry(decade_of(person.birth_year)).or_insert(0) += 1;
        }
        counts
    }

    /// Full names shared by more than one person, with their counts.
    pub fn duplicate_names(&self) -> BTreeMap<String, usize> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for person in self.people.values() {
            *counts.entry(person.full_name()).or_insert(0) += 1;
        }
        counts.retain(|_, count| *count > 1);
        counts
    }
}

/// Birth year of the `index`-th of `count` children, spread evenly over
/// `span` years from `start`. The product of span and index can exceed
/// `i32` for extreme rate tables, so the spread runs in f64.
fn child_birth_year(start: i32, span: i32, index: i32, count: i32) -> i32 {
    if count == 1 {
        start
    } else {
        start + (span as f64 * index as f64 / (count - 1) as f64).round() as i32
    }
}
