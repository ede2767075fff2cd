//! Streams every word graph of the enumeration to stdout, one JSON object
//! per line.
//!
//! ```text
//! cargo run --example enumerate -- --max-classes 3
//! ```

use clap::Parser;
use lowindex::{
    error::Result,
    presentations,
    search::{LowIndex, Settings},
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Upper bound on the number of congruence classes.
    #[arg(long, default_value_t = 4)]
    max_classes: u32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let engine = LowIndex::new(Settings::new(presentations::partition_monoid_2()))?;
    for graph in engine.iter(args.max_classes)? {
        println!("{}", serde_json::to_string(&graph).expect("graph serialises"));
    }
    Ok(())
}
