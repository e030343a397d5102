//! Command-line inspector for Anki .apkg exports.
//!
//! Opens a package, extracts its collection metadata, and prints either a
//! plain-text summary or the raw record as JSON.

use std::path::PathBuf;
use std::process::ExitCode;

use apkg_inspect::{AnkiPackage, CollectionMetadata, display};
use clap::Parser;
use tracing::info;

/// Inspect an Anki .apkg export: decks, note types, tags, card statistics.
#[derive(Parser, Debug)]
#[command(name = "apkg-inspect")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the .apkg file
    package: PathBuf,

    /// Print the metadata record as pretty JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose logging (use multiple times for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize tracing
    let log_level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> apkg_inspect::Result<()> {
    let file_size = std::fs::metadata(&args.package)?.len();
    let package = AnkiPackage::open(&args.package)?;
    info!(
        package = %args.package.display(),
        member = package.collection_member(),
        "opened package"
    );

    let metadata = package.metadata()?;
    if args.json {
        // Serializing the plain output structs cannot fail.
        println!("{}", serde_json::to_string_pretty(&metadata).unwrap());
    } else {
        print_summary(&metadata, file_size);
    }
    Ok(())
}

fn print_summary(metadata: &CollectionMetadata, file_size: u64) {
    println!("Schema:    {}", metadata.schema);
    println!("Size:      {}", display::format_file_size(file_size));
    println!("Created:   {}", display::format_timestamp(metadata.created));
    println!("Modified:  {}", display::format_timestamp(metadata.modified));
    println!();

    let stats = &metadata.statistics;
    println!(
        "{} notes, {} cards (new {}, learning {}, review {}, relearning {})",
        stats.total_notes,
        stats.total_cards,
        stats.card_distribution.new,
        stats.card_distribution.learning,
        stats.card_distribution.review,
        stats.card_distribution.relearning,
    );
    match stats.average_ease {
        Some(ease) => println!("Average ease: {ease}%"),
        None => println!("Average ease: n/a (no reviewed cards)"),
    }

    if !metadata.decks.is_empty() {
        println!("\nDecks:");
        for deck in &metadata.decks {
            println!(
                "  {} - {} cards ({} new, {} learning, {} review){}",
                deck.name,
                deck.total_cards,
                deck.new_cards,
                deck.learning_cards,
                deck.review_cards,
                if deck.is_dynamic { " [filtered]" } else { "" },
            );
        }
    }

    if !metadata.models.is_empty() {
        println!("\nNote types:");
        for model in &metadata.models {
            print!(
                "  {} ({:?}) - {} notes, {} fields, {} templates",
                model.name, model.kind, model.note_count, model.field_count, model.template_count,
            );
            if model.fields.is_empty() {
                // Config blob decoding is out of scope; without the optional
                // fields/templates tables the field list is unavailable.
                print!(" [field names unavailable]");
            } else {
                print!(": {}", model.fields.join(", "));
            }
            println!();
        }
    }

    if !metadata.tags.is_empty() {
        println!("\nTop tags:");
        for tag in &metadata.tags {
            println!("  {} ({})", tag.tag, tag.count);
        }
    }
}
