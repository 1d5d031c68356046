use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::model::{DemographicTables, Gender, decade_of};

const RATES_FILE: &str = "birth_and_marriage_rates.csv";
const FIRST_NAMES_FILE: &str = "first_names.csv";
const GENDER_PROBS_FILE: &str = "gender_name_probability.csv";
const LIFE_EXPECTANCY_FILE: &str = "life_expectancy.csv";
const LAST_NAMES_FILE: &str = "last_names.csv";
const RANK_PROBS_FILE: &str = "rank_to_probability.csv";

/// Load the demographic tables from CSV files in `data_dir`.
///
/// Expects six files:
/// - `birth_and_marriage_rates.csv`: decade, birth_rate, marriage_rate
/// - `first_names.csv`: decade, gender, name, frequency
/// - `gender_name_probability.csv`: decade, gender, probability
/// - `life_expectancy.csv`: Year plus a per-year expectancy column,
///   averaged into decade buckets
/// - `last_names.csv`: Decade, Rank, LastName
/// - `rank_to_probability.csv`: one line of weights indexed by rank
///
/// Columns are addressed by header name. A missing header column fails
/// with `InvalidData`; a malformed value fails with `InvalidData` naming
/// the file, line, and column; rows with an unknown gender or an
/// out-of-range rank are skipped with a warning.
pub fn load_tables(data_dir: &Path) -> io::Result<DemographicTables> {
    let mut tables = DemographicTables::default();
    load_rates(&data_dir.join(RATES_FILE), &mut tables)?;
    load_first_names(&data_dir.join(FIRST_NAMES_FILE), &mut tables)?;
    load_gender_probs(&data_dir.join(GENDER_PROBS_FILE), &mut tables)?;
    load_life_expectancy(&data_dir.join(LIFE_EXPECTANCY_FILE), &mut tables)?;
    load_last_names(
        &data_dir.join(LAST_NAMES_FILE),
        &data_dir.join(RANK_PROBS_FILE),
        &mut tables,
    )?;

    tracing::debug!(
        "loaded tables: {} rate decades, {} first-name buckets, {} surname decades",
        tables.rates_by_decade.len(),
        tables.first_names.len(),
        tables.last_names_by_decade.len()
    );
    Ok(tables)
}

// --- Per-file loaders ---

fn load_rates(path: &Path, tables: &mut DemographicTables) -> io::Result<()> {
    for (line, [decade, birth_rate, marriage_rate]) in
        read_columns(path, ["decade", "birth_rate", "marriage_rate"])?
    {
        let birth_rate = parse_f64(&birth_rate, path, line, "birth_rate")?;
        let marriage_rate = parse_f64(&marriage_rate, path, line, "marriage_rate")?;
        tables
            .rates_by_decade
            .insert(decade, (birth_rate, marriage_rate));
    }
    Ok(())
}

fn load_first_names(path: &Path, tables: &mut DemographicTables) -> io::Result<()> {
    for (line, [decade, gender, name, frequency]) in
        read_columns(path, ["decade", "gender", "name", "frequency"])?
    {
        let Some(gender) = Gender::parse(&gender.to_lowercase()) else {
            tracing::warn!(
                "{}: line {line}: skipping name '{name}' with unknown gender '{gender}'",
                path.display()
            );
            continue;
        };
        let frequency = parse_f64(&frequency, path, line, "frequency")?;
        tables
            .first_names
            .entry((decade, gender))
            .or_default()
            .push((name, frequency));
    }
    Ok(())
}

fn load_gender_probs(path: &Path, tables: &mut DemographicTables) -> io::Result<()> {
    for (line, [decade, gender, probability]) in
        read_columns(path, ["decade", "gender", "probability"])?
    {
        let Some(gender) = Gender::parse(&gender.to_lowercase()) else {
            tracing::warn!(
                "{}: line {line}: skipping probability row with unknown gender '{gender}'",
                path.display()
            );
            continue;
        };
        let probability = parse_f64(&probability, path, line, "probability")?;
        tables
            .gender_probs
            .entry(decade)
            .or_default()
            .insert(gender, probability);
    }
    Ok(())
}

fn load_life_expectancy(path: &Path, tables: &mut DemographicTables) -> io::Result<()> {
    let mut buckets: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for (line, [year, expectancy]) in
        read_columns(path, ["Year", "Period life expectancy at birth"])?
    {
        let year = parse_i32(&year, path, line, "Year")?;
        let expectancy = parse_f64(&expectancy, path, line, "Period life expectancy at birth")?;
        buckets.entry(decade_of(year)).or_default().push(expectancy);
    }

    for (decade, values) in buckets {
        let average = values.iter().sum::<f64>() / values.len() as f64;
        tables.life_expectancy.insert(decade, average);
    }
    tables.fallback_life_decade = tables.life_expectancy.keys().next_back().cloned();
    Ok(())
}

fn load_last_names(
    names_path: &Path,
    ranks_path: &Path,
    tables: &mut DemographicTables,
) -> io::Result<()> {
    let rank_probs = read_rank_probabilities(ranks_path)?;

    for (line, [decade, rank, last_name]) in
        read_columns(names_path, ["Decade", "Rank", "LastName"])?
    {
        let rank = parse_i32(&rank, names_path, line, "Rank")?;
        if rank < 1 || rank as usize > rank_probs.len() {
            tracing::warn!(
                "{}: line {line}: skipping surname '{last_name}' with out-of-range rank {rank}",
                names_path.display()
            );
            continue;
        }
        let weight = rank_probs[rank as usize - 1];
        tables
            .last_names_by_decade
            .entry(decade)
            .or_default()
            .push((last_name, weight));
    }

    // Normalize each decade's weights to sum to one.
    for names in tables.last_names_by_decade.values_mut() {
        let total: f64 = names.iter().map(|(_, weight)| *weight).sum();
        if total > 0.0 {
            for (_, weight) in names.iter_mut() {
                *weight /= total;
            }
        }
    }
    Ok(())
}

fn read_rank_probabilities(path: &Path) -> io::Result<Vec<f64>> {
    let file = File::open(path)?;
    let mut lines = BufReader::new(file).lines();
    let line = lines
        .next()
        .ok_or_else(|| invalid_data(path, "missing probability line"))??;

    let mut probs = Vec::new();
    for field in line.split(',') {
        let field = field.trim();
        if field.is_empty() {
            continue;
        }
        probs.push(parse_f64(field, path, 1, "probability")?);
    }
    Ok(probs)
}

// --- CSV plumbing ---

/// Read the named columns from a headered CSV file, one array per row,
/// each tagged with its 1-based line number for error and warning context.
///
/// Blank lines are skipped. The demographic tables never put commas
/// inside fields, so a plain split with quote stripping is enough.
fn read_columns<const N: usize>(
    path: &Path,
    names: [&str; N],
) -> io::Result<Vec<(usize, [String; N])>> {
    let file = File::open(path)?;
    let mut lines = BufReader::new(file).lines();
    let header = lines
        .next()
        .ok_or_else(|| invalid_data(path, "missing header line"))??;
    let header_fields = split_fields(&header);

    let mut indices = [0usize; N];
    for (slot, name) in indices.iter_mut().zip(names) {
        *slot = header_fields
            .iter()
            .position(|field| field == name)
            .ok_or_else(|| invalid_data(path, format!("missing column '{name}'")))?;
    }

    let mut rows = Vec::new();
    for (index, line) in lines.enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        // The header is line 1.
        let line_number = index + 2;
        let fields = split_fields(&line);
        let mut row: [String; N] = std::array::from_fn(|_| String::new());
        for (slot, (column, name)) in row.iter_mut().zip(indices.iter().zip(names)) {
            let field = fields.get(*column).ok_or_else(|| {
                invalid_data(
                    path,
                    format!("line {line_number}: short row is missing column '{name}'"),
                )
            })?;
            *slot = field.clone();
        }
        rows.push((line_number, row));
    }
    Ok(rows)
}

fn split_fields(line: &str) -> Vec<String> {
    line.split(',')
        .map(|field| field.trim().trim_matches('"').trim().to_string())
        .collect()
}

fn invalid_data(path: &Path, message: impl std::fmt::Display) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        format!("{}: {message}", path.display()),
    )
}

fn parse_f64(value: &str, path: &Path, line: usize, column: &str) -> io::Result<f64> {
    value.parse().map_err(|_| {
        invalid_data(
            path,
            format!("line {line}: column '{column}' has non-numeric value '{value}'"),
        )
    })
}

fn parse_i32(value: &str, path: &Path, line: usize, column: &str) -> io::Result<i32> {
    value.parse().map_err(|_| {
        invalid_data(
            path,
            format!("line {line}: column '{column}' has non-integer value '{value}'"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_file(dir: &Path, name: &str, contents: &str) {
        fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn rates_load_with_reordered_columns() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            RATES_FILE,
            "marriage_rate,decade,birth_rate\n0.9,1950s,2.5\n",
        );
        let mut tables = DemographicTables::default();
        load_rates(&dir.path().join(RATES_FILE), &mut tables).unwrap();
        assert_eq!(tables.rates_by_decade["1950s"], (2.5, 0.9));
    }

    #[test]
    fn missing_column_is_invalid_data() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), RATES_FILE, "decade,birth_rate\n1950s,2.5\n");
        let mut tables = DemographicTables::default();
        let err = load_rates(&dir.path().join(RATES_FILE), &mut tables).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(
            err.to_string().contains("marriage_rate"),
            "unhelpful error: {err}"
        );
    }

    #[test]
    fn quoted_and_padded_fields_are_cleaned() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            LIFE_EXPECTANCY_FILE,
            "Year,\"Period life expectancy at birth\"\n 1951 , 68.2 \n\n1952,69.0\n",
        );
        let mut tables = DemographicTables::default();
        load_life_expectancy(&dir.path().join(LIFE_EXPECTANCY_FILE), &mut tables).unwrap();
        let average = tables.life_expectancy["1950s"];
        assert!((average - 68.6).abs() < 1e-9, "bad average {average}");
        assert_eq!(tables.fallback_life_decade.as_deref(), Some("1950s"));
    }

    #[test]
    fn short_row_is_invalid_data() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            RATES_FILE,
            "decade,birth_rate,marriage_rate\n1950s,2.5\n",
        );
        let mut tables = DemographicTables::default();
        let err = load_rates(&dir.path().join(RATES_FILE), &mut tables).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("line 2"), "unhelpful error: {err}");
    }

    #[test]
    fn bad_value_error_names_file_line_and_column() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            RATES_FILE,
            "decade,birth_rate,marriage_rate\n1950s,2.5,0.9\n\n1960s,2.5,high\n",
        );
        let mut tables = DemographicTables::default();
        let err = load_rates(&dir.path().join(RATES_FILE), &mut tables).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        let message = err.to_string();
        // The blank line still counts toward the reported line number.
        assert!(
            message.contains(RATES_FILE)
                && message.contains("line 4")
                && message.contains("marriage_rate")
                && message.contains("high"),
            "unhelpful error: {message}"
        );
    }
}
