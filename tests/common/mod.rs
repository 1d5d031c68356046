use family_gen::model::{DemographicTables, Gender, Person};
use family_gen::{FamilyTree, PersonSampler};

/// A small fixed tree: a founder couple, their daughter, and a
/// granddaughter who repeats the first founder's full name.
pub fn build_test_tree() -> FamilyTree {
    let mut tree = FamilyTree::new(PersonSampler::new(DemographicTables::default(), 0));

    let mut alice = Person::new(
        1,
        1950,
        2020,
        Gender::Female,
        "Alice".to_string(),
        "Reyes".to_string(),
    );
    let mut bob = Person::new(
        2,
        1952,
        2031,
        Gender::Male,
        "Bob".to_string(),
        "Okafor".to_string(),
    );
    alice.set_partner(2);
    bob.set_partner(1);
    alice.add_child(3);
    bob.add_child(3);

    let mut carol = Person::new(
        3,
        1980,
        2055,
        Gender::Female,
        "Carol".to_string(),
        "Reyes".to_string(),
    );
    carol.is_direct_descendant = true;
    carol.add_child(4);

    let mut alice_again = Person::new(
        4,
        2010,
        2090,
        Gender::Female,
        "Alice".to_string(),
        "Reyes".to_string(),
    );
    alice_again.is_direct_descendant = true;

    for person in [alice, bob, carol, alice_again] {
        tree.people.insert(person.id, person);
    }
    tree
}

pub fn read_lines(path: &std::path::Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}
