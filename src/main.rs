//! family-gen: synthesizes a multi-generation family tree from
//! decade-indexed demographic tables and answers count queries over it.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use family_gen::flush::flush_to_jsonl;
use family_gen::loader::load_tables;
use family_gen::{FamilyTree, PersonSampler};

#[derive(Parser, Debug)]
#[command(name = "family-gen")]
#[command(about = "Generate a family tree from demographic tables")]
struct Cli {
    /// Directory holding the demographic CSV files
    #[arg(long, default_value = ".")]
    data_dir: PathBuf,

    /// Seed for the random stream (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Write people.jsonl and summary.json to this directory
    #[arg(long)]
    export: Option<PathBuf>,

    /// Skip the interactive menu
    #[arg(long)]
    no_menu: bool,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "family_gen=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let tables = match load_tables(&cli.data_dir) {
        Ok(tables) => tables,
        Err(e) => {
            error!("Failed to load tables from {}: {e}", cli.data_dir.display());
            std::process::exit(1);
        }
    };

    let seed = cli.seed.unwrap_or_else(rand::random);
    info!("Generating family tree with seed {seed}");

    let mut tree = FamilyTree::new(PersonSampler::new(tables, seed));
    tree.generate();
    info!("Generated {} people", tree.total_people());

    if let Some(dir) = &cli.export {
        if let Err(e) = flush_to_jsonl(&tree, dir) {
            error!("Failed to export tree to {}: {e}", dir.display());
            std::process::exit(1);
        }
        info!("Exported tree to {}", dir.display());
    }

    if !cli.no_menu
        && let Err(e) = run_menu(&tree)
    {
        error!("Menu input failed: {e}");
        std::process::exit(1);
    }
}

fn print_menu() {
    println!();
    println!("Enter one of the following options:");
    println!("T - total number of people");
    println!("D - number of people born each decade");
    println!("N - number of people with the same name (duplicates)");
    println!("Q - quit");
}

fn run_menu(tree: &FamilyTree) -> io::Result<()> {
    println!("Family tree generated.");
    print_menu();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("Your choice: ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break; // stdin closed
        };
        let choice = line?.trim().to_uppercase();
        match choice.as_str() {
            "T" => println!("Total people: {}", tree.total_people()),
            "D" => {
                for (decade, count) in tree.people_by_decade() {
                    println!("{decade}: {count}");
                }
            }
            "N" => {
                let duplicates = tree.duplicate_names();
                if duplicates.is_empty() {
                    println!("No duplicate full names found.");
                } else {
                    println!("Duplicate full names (with counts):");
                    for (name, count) in duplicates {
                        println!("- {name} ({count})");
                    }
                }
            }
            "Q" => {
                println!("Bye!");
                break;
            }
            _ => println!("Invalid input. Please enter T, D, N, or Q."),
        }
        print_menu();
    }
    Ok(())
}
