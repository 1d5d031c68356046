use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::tree::FamilyTree;

/// Write an iterator of serializable items to a JSONL file (one JSON object per line).
fn write_jsonl<T: Serialize>(path: &Path, items: impl Iterator<Item = T>) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for item in items {
        serde_json::to_writer(&mut writer, &item)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()
}

#[derive(Serialize)]
struct Summary {
    total_people: usize,
    people_by_decade: BTreeMap<String, usize>,
    duplicate_names: BTreeMap<String, usize>,
}

/// Flush a generated tree to files in the given output directory.
///
/// Creates the output directory if it does not exist. Writes 2 files:
/// - `people.jsonl`: one person per line, in id order
/// - `summary.json`: the report counters for the whole tree
pub fn flush_to_jsonl(tree: &FamilyTree, output_dir: &Path) -> io::Result<()> {
    fs::create_dir_all(output_dir)?;

    write_jsonl(&output_dir.join("people.jsonl"), tree.people.values())?;

    let summary = Summary {
        total_people: tree.total_people(),
        people_by_decade: tree.people_by_decade(),
        duplicate_names: tree.duplicate_names(),
    };
    let mut writer = BufWriter::new(File::create(output_dir.join("summary.json"))?);
    serde_json::to_writer_pretty(&mut writer, &summary)?;
    writer.flush()
}
