//! # CLI Module
//!
//! Command-line interface for the card database builder.
//!
//! ## Layout
//! ```text
//! assets/<Set Name>/          local images (see SetImageScanner)
//! listings/<Set Name>.json    listing manifest of the set
//! ```
//!
//! ## Usage
//! ```bash
//! # Build every set of the catalog
//! card-db build
//!
//! # One set, stricter threshold
//! card-db build --set "Genetic Apex" --threshold 6
//!
//! # Carry desirability values into a rebuilt database
//! card-db transfer-desirability old/GA_Cards_Database.json GA_Cards_Database.json
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::thread;
use tcgp_card_db::core::assembler::{DatabaseAssembler, FullDatabase, RunSummary, SetDatabase, SetSources};
use tcgp_card_db::core::catalog::Catalog;
use tcgp_card_db::core::desirability::{transfer_files, TransferReport};
use tcgp_card_db::core::export::write_database;
use tcgp_card_db::core::hasher::HashAlgorithmKind;
use tcgp_card_db::core::matcher::DEFAULT_MATCH_THRESHOLD;
use tcgp_card_db::core::resolver::CardRecord;
use tcgp_card_db::core::scanner::ScanConfig;
use tcgp_card_db::error::Result;
use tcgp_card_db::events::{AssemblyEvent, Event, EventChannel, MatchEvent};

const FULL_DATABASE: &str = "Full_Cards_Database.json";
const FULL_PROMO_DATABASE: &str = "TCGP_Promo_Cards_Database.json";

/// Card database builder - identify local card images and derive their records
#[derive(Parser, Debug)]
#[command(name = "card-db")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build card databases from local images and listing manifests
    Build {
        /// Directory holding one image directory per set
        #[arg(long, default_value = "assets")]
        assets: PathBuf,

        /// Directory holding one `<Set Name>.json` listing per set
        #[arg(long, default_value = "listings")]
        listings: PathBuf,

        /// Sets to build (default: every set of the catalog)
        #[arg(short, long = "set")]
        sets: Vec<String>,

        /// Where database files are written
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        /// Maximum fingerprint distance for a match (lower = stricter, 0-64)
        #[arg(short, long, default_value_t = DEFAULT_MATCH_THRESHOLD)]
        threshold: u32,

        /// Hash algorithm to use
        #[arg(short, long, default_value = "average")]
        algorithm: Algorithm,

        /// Catalog JSON replacing the built-in set list
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Include hidden files
        #[arg(long)]
        include_hidden: bool,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Copy non-zero desirability values from an old database into a new one
    TransferDesirability {
        /// Database holding the tuned values
        old: PathBuf,

        /// Freshly built database
        new: PathBuf,

        /// Output file (default: overwrite NEW)
        destination: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Algorithm {
    /// Average Hash - Matches the reference databases (default)
    Average,
    /// Difference Hash - Horizontal brightness gradients
    Difference,
    /// Double-gradient Hash - Horizontal and vertical brightness gradients
    Perceptual,
}

impl From<Algorithm> for HashAlgorithmKind {
    fn from(algo: Algorithm) -> Self {
        match algo {
            Algorithm::Average => HashAlgorithmKind::Average,
            Algorithm::Difference => HashAlgorithmKind::Difference,
            Algorithm::Perceptual => HashAlgorithmKind::Perceptual,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (paths only)
    Minimal,
}

struct BuildArgs {
    assets: PathBuf,
    listings: PathBuf,
    sets: Vec<String>,
    output_dir: PathBuf,
    threshold: u32,
    algorithm: HashAlgorithmKind,
    catalog: Option<PathBuf>,
    include_hidden: bool,
    output: OutputFormat,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            assets,
            listings,
            sets,
            output_dir,
            threshold,
            algorithm,
            catalog,
            include_hidden,
            output,
            verbose,
        } => {
            tcgp_card_db::init_tracing(verbose);
            run_build(BuildArgs {
                assets,
                listings,
                sets,
                output_dir,
                threshold,
                algorithm: algorithm.into(),
                catalog,
                include_hidden,
                output,
            })
        }
        Commands::TransferDesirability {
            old,
            new,
            destination,
            output,
            verbose,
        } => {
            tcgp_card_db::init_tracing(verbose);
            run_transfer(&old, &new, destination.as_deref(), output)
        }
    }
}

fn run_build(args: BuildArgs) -> Result<()> {
    let term = Term::stderr();

    if matches!(args.output, OutputFormat::Pretty) {
        term.write_line(&format!(
            "{} {}",
            style("Card Database Builder").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line(&format!(
            "  {} {}",
            style("Fingerprint:").dim(),
            args.algorithm.description()
        ))
        .ok();
        term.write_line("").ok();
    }

    let catalog = match &args.catalog {
        Some(path) => Catalog::load(path)?,
        None => Catalog::pocket(),
    };

    let set_names: Vec<String> = if args.sets.is_empty() {
        catalog.set_names().map(str::to_string).collect()
    } else {
        args.sets.clone()
    };

    let sources: Vec<SetSources> = set_names
        .iter()
        .map(|name| SetSources {
            set_name: name.clone(),
            listing: args.listings.join(format!("{}.json", name)),
            images_dir: args.assets.join(name),
        })
        .collect();

    let assembler = DatabaseAssembler::builder(&catalog)
        .threshold(args.threshold)
        .algorithm(args.algorithm)
        .scan_config(ScanConfig {
            include_hidden: args.include_hidden,
            ..Default::default()
        })
        .build()?;

    let (sender, receiver) = EventChannel::new();

    let progress = if matches!(args.output, OutputFormat::Pretty) {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} {prefix:.bold} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .map(|s| s.progress_chars("█▓░"))
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        let Some(pb) = progress_clone else {
            // Drain so the sender never blocks
            for _ in receiver.iter() {}
            return;
        };

        for event in receiver.iter() {
            match event {
                Event::Assembly(AssemblyEvent::SetStarted { set_name }) => {
                    pb.set_prefix(set_name);
                }
                Event::Assembly(AssemblyEvent::PhaseChanged { phase }) => {
                    pb.set_message(format!("{}", phase));
                }
                Event::Assembly(AssemblyEvent::SetAborted { set_name, reason }) => {
                    pb.println(format!("{} {}: {}", style("✗").red(), set_name, reason));
                }
                Event::Match(MatchEvent::Started { total_images, .. }) => {
                    pb.inc_length(total_images as u64);
                }
                Event::Match(MatchEvent::Matched { .. }) | Event::Match(MatchEvent::Skipped { .. }) => {
                    pb.inc(1);
                }
                _ => {}
            }
        }
        pb.finish_and_clear();
    });

    let full = assembler.run_all(&sources, &sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();

    let written = write_outputs(&args.output_dir, &catalog, &full)?;

    match args.output {
        OutputFormat::Pretty => print_pretty_results(&term, &full, &written),
        OutputFormat::Json => print_json_results(&full, &written),
        OutputFormat::Minimal => print_minimal_results(&full),
    }

    Ok(())
}

/// Per-set files, plus combined files when more than one set was built.
fn write_outputs(output_dir: &Path, catalog: &Catalog, full: &FullDatabase) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    for set in &full.sets {
        let initials = catalog.set(&set.set_name)?.initials();
        if !set.regular.is_empty() {
            let path = output_dir.join(format!("{}_Cards_Database.json", initials));
            write_database(&path, &set.regular)?;
            written.push(path);
        }
        if !set.promo.is_empty() {
            let path = output_dir.join(format!("{}_Promo_Cards_Database.json", initials));
            write_database(&path, &set.promo)?;
            written.push(path);
        }
    }

    if full.sets.len() > 1 {
        let regular: Vec<CardRecord> = full.regular().cloned().collect();
        let promo = full.promo();
        if !regular.is_empty() {
            let path = output_dir.join(FULL_DATABASE);
            write_database(&path, &regular)?;
            written.push(path);
        }
        if !promo.is_empty() {
            let path = output_dir.join(FULL_PROMO_DATABASE);
            write_database(&path, &promo)?;
            written.push(path);
        }
    }

    Ok(written)
}

fn print_pretty_results(term: &Term, full: &FullDatabase, written: &[PathBuf]) {
    term.write_line("").ok();
    term.write_line(&format!("{} Build Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();

    for set in &full.sets {
        print_set_summary(term, set);
    }

    for (set_name, reason) in &full.aborted {
        term.write_line(&format!(
            "  {} {} aborted: {}",
            style("✗").red().bold(),
            style(set_name).bold(),
            reason
        ))
        .ok();
    }

    let total = full.summary();
    if total.manual_review.is_empty() {
        term.write_line(&format!("  {} Every image was identified", style("✓").green()))
            .ok();
    } else {
        term.write_line("").ok();
        term.write_line(&format!(
            "{}",
            style("Needs manual review:").bold().underlined()
        ))
        .ok();
        for path in &total.manual_review {
            term.write_line(&format!("    {} {}", style("○").dim(), path.display()))
                .ok();
        }
    }

    term.write_line("").ok();
    for path in written {
        term.write_line(&format!("  {} {}", style("→").cyan(), path.display()))
            .ok();
    }
}

fn print_set_summary(term: &Term, set: &SetDatabase) {
    let summary: &RunSummary = &set.summary;
    term.write_line(&format!(
        "  {} ({:.1}s)",
        style(&set.set_name).bold(),
        summary.duration_ms as f64 / 1000.0
    ))
    .ok();
    term.write_line(&format!(
        "    {} images, {} records, {} promo records",
        style(summary.images_total).cyan(),
        style(summary.records).cyan(),
        style(summary.promo_records).cyan()
    ))
    .ok();

    if summary.skipped() > 0 || summary.candidates_unavailable > 0 || summary.listing_rejected > 0 {
        term.write_line(&format!(
            "    {} undecodable, {} unmatched, {} unknown rarity, {} reference images missing, {} listing entries rejected",
            style(summary.decode_failures).yellow(),
            style(summary.no_match).yellow(),
            style(summary.unknown_rarity).yellow(),
            style(summary.candidates_unavailable).yellow(),
            style(summary.listing_rejected).yellow()
        ))
        .ok();
    }

    if summary.scan_errors > 0 {
        term.write_line(&format!(
            "    {} unreadable directory entries",
            style(summary.scan_errors).yellow()
        ))
        .ok();
    }

    if summary.duplicates_collapsed > 0 {
        term.write_line(&format!(
            "    {} duplicate matches collapsed",
            style(summary.duplicates_collapsed).dim()
        ))
        .ok();
    }
}

fn print_json_results(full: &FullDatabase, written: &[PathBuf]) {
    let output = serde_json::json!({
        "sets": full.sets.iter().map(|s| &s.summary).collect::<Vec<_>>(),
        "aborted": full.aborted.iter().map(|(set_name, reason)| {
            serde_json::json!({ "set_name": set_name, "reason": reason })
        }).collect::<Vec<_>>(),
        "total": full.summary(),
        "written": written,
    });

    match serde_json::to_string_pretty(&output) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Failed to render summary: {}", e),
    }
}

fn print_minimal_results(full: &FullDatabase) {
    for path in full.summary().manual_review {
        println!("{}", path.display());
    }
}

fn run_transfer(old: &Path, new: &Path, destination: Option<&Path>, output: OutputFormat) -> Result<()> {
    let report = transfer_files(old, new, destination)?;
    let destination = destination.unwrap_or(new);

    match output {
        OutputFormat::Pretty => print_transfer_report(&Term::stderr(), &report, destination),
        OutputFormat::Json => match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("Failed to render report: {}", e),
        },
        OutputFormat::Minimal => {
            for missing in &report.not_found {
                println!("{}", missing.key);
            }
        }
    }

    Ok(())
}

fn print_transfer_report(term: &Term, report: &TransferReport, destination: &Path) {
    term.write_line(&format!("{} Desirability transferred", style("✓").green().bold()))
        .ok();
    term.write_line(&format!(
        "  {} cards in old database",
        style(report.total_old).cyan()
    ))
    .ok();
    term.write_line(&format!("  {} cards updated", style(report.updated).cyan()))
        .ok();

    if !report.not_found.is_empty() {
        term.write_line(&format!(
            "  {} cards not found in new database:",
            style(report.not_found.len()).yellow()
        ))
        .ok();
        for missing in &report.not_found {
            term.write_line(&format!(
                "    {} {} ({}, desirability {})",
                style("○").dim(),
                missing.key,
                missing.name,
                missing.desirability
            ))
            .ok();
        }
    }

    term.write_line(&format!("  {} {}", style("→").cyan(), destination.display()))
        .ok();
}
