use std::fs::create_dir_all;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chain_tree::stat::Report;
use chain_tree::{Blake3Hasher, MerkleTree, Result, TreeConfig, entry_for};
use chrono::Local;
use clap::Parser;
use tracing::{Level, debug, info};

#[derive(Parser)]
#[command(name = "chain-tree")]
#[command(author, version, about = "Build an append-only Merkle tree from entries and verify it")]
struct Args {
  /// Entries to append, in order
  entries: Vec<String>,

  /// Number of additional random entries to append
  #[arg(short, long, default_value_t = 0)]
  random: usize,

  /// Maximum number of entries the tree accepts
  #[arg(short, long, default_value_t = TreeConfig::default().max_entries)]
  max_entries: usize,

  /// Measure append time up to this many entries instead of building a single tree
  #[arg(short, long)]
  bench: Option<u64>,

  /// Number of measurement points between 0 and the bench size
  #[arg(long, default_value_t = 8)]
  division: u64,

  /// Repetitions per measurement point
  #[arg(long, default_value_t = 10)]
  trials: usize,

  /// Output directory for measurement reports
  #[arg(short, long, default_value = ".")]
  output: PathBuf,

  #[arg(short, long, default_value_t = Local::now().format("%Y%m%d%H%M%S").to_string())]
  session: String,

  #[arg(short, long, default_value_t = false)]
  verbose: bool,
}

fn main() -> Result<()> {
  let args = Args::parse();
  let level = if args.verbose { Level::DEBUG } else { Level::INFO };
  tracing_subscriber::fmt().with_max_level(level).init();

  let config = TreeConfig::with_max_entries(args.max_entries);
  if let Some(max_n) = args.bench {
    create_dir_all(&args.output)?;
    return run_append(&args.output, &args.session, config, max_n, args.division, args.trials);
  }

  let mut tree = MerkleTree::new(Blake3Hasher, config);
  for entry in args.entries.iter() {
    let key = tree.append(entry)?;
    println!("{key}\t{entry}");
  }
  for key in tree.load_random_entries(args.random)? {
    debug!(key = %key, "random entry");
  }
  tree.verify()?;

  println!("hash:   {}", tree.root_hash());
  println!("leaves: {}", tree.leaves());
  println!("height: {}", tree.height());
  Ok(())
}

/// Time appending n entries into a fresh tree for n in `max_n / division` steps.
fn run_append(dir: &Path, session: &str, config: TreeConfig, max_n: u64, division: u64, trials: usize) -> Result<()> {
  info!(max_n, division, trials, "[append]");
  let step = (max_n / division.max(1)).max(1) as usize;
  let mut report = Report::new();
  for n in (0..=max_n).step_by(step) {
    for _ in 0..trials {
      let mut tree = MerkleTree::new(Blake3Hasher, config);

      let t0 = Instant::now();
      for i in 0..n {
        tree.append(&entry_for(i))?;
      }
      let t1 = Instant::now();

      tree.verify()?;
      report.add(n, t1 - t0);
    }
    if let Some(s) = report.single(n) {
      println!("  n={n}: {s}");
    }
  }

  let path = dir.join(format!("{session}-append.csv"));
  report.save_to_csv(&path)?;
  println!("==> {}", path.to_string_lossy());
  Ok(())
}
