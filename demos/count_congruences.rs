//! Counts the right congruences of a presentation up to a class bound and
//! prints the search statistics.
//!
//! ```text
//! cargo run --example count_congruences -- --preset partition-monoid-2 --max-classes 10 --threads 4
//! ```

use clap::{Parser, ValueEnum};
use lowindex::{
    error::Result,
    presentations,
    search::{render_stats_table, LowIndex, Presentation, Settings},
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Preset {
    FreeMonogenic,
    IdempotentMonogenic,
    CyclicGroup6,
    PartitionMonoid2,
}

impl Preset {
    fn presentation(self) -> Presentation {
        match self {
            Preset::FreeMonogenic => presentations::free_monogenic(),
            Preset::IdempotentMonogenic => presentations::idempotent_monogenic(),
            Preset::CyclicGroup6 => presentations::cyclic_group(6),
            Preset::PartitionMonoid2 => presentations::partition_monoid_2(),
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// A built-in presentation to search.
    #[arg(long, value_enum, conflicts_with = "file")]
    preset: Option<Preset>,

    /// A JSON file holding a presentation, as produced by serialising
    /// `Presentation`.
    #[arg(long)]
    file: Option<std::path::PathBuf>,

    /// Upper bound on the number of congruence classes.
    #[arg(long, default_value_t = 5)]
    max_classes: u32,

    #[arg(long, default_value_t = 1)]
    threads: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let presentation = match (&args.preset, &args.file) {
        (Some(preset), _) => preset.presentation(),
        (None, Some(path)) => {
            let text = std::fs::read_to_string(path).expect("could not read presentation file");
            serde_json::from_str(&text).expect("could not parse presentation file")
        }
        (None, None) => presentations::partition_monoid_2(),
    };

    let engine = LowIndex::new(Settings::new(presentation).number_of_threads(args.threads))?;
    let count = engine.number_of_congruences(args.max_classes)?;

    println!(
        "{count} congruence(s) with at most {} classes",
        args.max_classes
    );
    println!("{}", render_stats_table(&engine.stats()));
    Ok(())
}
