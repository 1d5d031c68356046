use std::collections::BTreeMap;

use super::person::Gender;

/// Decade bucket key for a birth year, e.g. 1954 -> "1950s".
pub fn decade_of(year: i32) -> String {
    format!("{}s", year.div_euclid(10) * 10)
}

/// Decade-indexed statistics driving generation. Ordered maps throughout:
/// the surname fallback scan and the per-decade reports iterate these, and
/// iteration order must be identical on every run for a fixed seed.
#[derive(Debug, Clone, Default)]
pub struct DemographicTables {
    /// decade -> (birth_rate, marriage_rate)
    pub rates_by_decade: BTreeMap<String, (f64, f64)>,
    /// (decade, gender) -> [(first name, frequency)]
    pub first_names: BTreeMap<(String, Gender), Vec<(String, f64)>>,
    /// decade -> gender -> probability that a first name matches the gender
    pub gender_probs: BTreeMap<String, BTreeMap<Gender, f64>>,
    /// decade -> average life expectancy at birth
    pub life_expectancy: BTreeMap<String, f64>,
    /// Latest decade present in `life_expectancy`, consulted when a birth
    /// decade has no entry of its own.
    pub fallback_life_decade: Option<String>,
    /// decade -> [(surname, normalized weight)]
    pub last_names_by_decade: BTreeMap<String, Vec<(String, f64)>>,
}
