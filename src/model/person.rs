use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn opposite(self) -> Gender {
        match self {
            Gender::Male => Gender::Female,
            Gender::Female => Gender::Male,
        }
    }

    /// Parse the lowercase form used in the CSV inputs.
    pub fn parse(s: &str) -> Option<Gender> {
        match s {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            _ => None,
        }
    }
}

/// A single generated individual. Identity fields are fixed at creation;
/// the relationship fields and the generation flag are filled in during
/// tree expansion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: u64,
    pub birth_year: i32,
    pub death_year: i32,
    pub gender: Gender,
    pub first_name: String,
    pub last_name: String,
    pub partner_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children_ids: Vec<u64>,
    pub is_direct_descendant: bool,

    /// True once child generation has run for this person's couple.
    /// Bookkeeping for the expansion pass, not part of the exported record.
    #[serde(skip)]
    pub children_generated: bool,
}

impl Person {
    pub fn new(
        id: u64,
        birth_year: i32,
        death_year: i32,
        gender: Gender,
        first_name: String,
        last_name: String,
    ) -> Self {
        Self {
            id,
            birth_year,
            death_year,
            gender,
            first_name,
            last_name,
            partner_id: None,
            children_ids: Vec::new(),
            is_direct_descendant: false,
            children_generated: false,
        }
    }

    /// First and last name joined by a single space, the key used for
    /// duplicate detection.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn add_child(&mut self, child_id: u64) {
        self.children_ids.push(child_id);
    }

    /// Link this person to a partner. A partner is set at most once and
    /// never changed or cleared.
    ///
    /// # Panics
    /// Panics if a partner is already set.
    pub fn set_partner(&mut self, partner_id: u64) {
        assert!(
            self.partner_id.is_none(),
            "set_partner: person {} already has a partner",
            self.id
        );
        self.partner_id = Some(partner_id);
    }
}
