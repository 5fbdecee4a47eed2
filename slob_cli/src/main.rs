use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use slob_core::{Config, FileSource, Slob, Source};

// ── CLI definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "slob",
    about = "Inspect slob dictionary containers and look up their entries",
    version
)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Largest decompressed group to accept, in bytes
    #[arg(long, global = true, default_value_t = slob_core::format::DEFAULT_MAX_GROUP_SIZE)]
    max_group_size: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print header metadata and index sizes
    Inspect {
        /// Slob file to inspect
        file: PathBuf,
    },
    /// Look up a key and print its content
    Find {
        /// Slob file
        file: PathBuf,
        /// Exact key to look up
        key: String,
        /// Write raw content to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the item at a (group, slot) coordinate
    Get {
        /// Slob file
        file: PathBuf,
        /// Zero-based group index
        group: usize,
        /// Zero-based slot within the group
        slot: usize,
        /// Write raw content to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List key records in index order
    Keys {
        /// Slob file
        file: PathBuf,
        /// Stop after this many records
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

// ── Helpers ────────────────────────────────────────────────────────────────

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn open(file: &Path, max_group_size: usize) -> anyhow::Result<Slob<FileSource>> {
    let source = FileSource::open(file).with_context(|| format!("opening {:?}", file))?;
    let config = Config::default().with_max_group_size(max_group_size);
    let slob = Slob::open_with(source, config)
        .with_context(|| format!("reading slob header of {:?}", file))?;
    debug!(path = %file.display(), keys = slob.key_count(), groups = slob.size(), "opened");
    Ok(slob)
}

fn human_bytes(n: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut v = n as f64;
    let mut unit = 0;
    while v >= 1024.0 && unit < UNITS.len() - 1 {
        v /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", n)
    } else {
        format!("{:.2} {}", v, UNITS[unit])
    }
}

fn emit(content: &[u8], output: Option<PathBuf>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            std::fs::write(&path, content).with_context(|| format!("writing {:?}", path))?;
            eprintln!("  written to {:?}", path);
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(content)?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}

// ── Subcommand implementations ─────────────────────────────────────────────

fn run_inspect(file: PathBuf, max_group_size: usize) -> anyhow::Result<()> {
    let slob = open(&file, max_group_size)?;

    println!("=== slob: {:?} ===", file);
    println!();
    println!("  uuid           : {}", slob.uuid());
    println!("  encoding       : {}", slob.encoding());
    let decodable = if slob_codecs::registry().contains(slob.compression()) {
        ""
    } else {
        " (no decompressor registered; lookups will fail)"
    };
    println!("  compression    : {}{}", slob.compression(), decodable);
    println!("  keys           : {}", slob.key_count());
    println!("  groups         : {} (header declares {})", slob.size(), slob.blob_count());
    println!("  store offset   : {}", slob.store_offset());
    println!("  declared size  : {}", human_bytes(slob.total_size()));
    println!("  file on disk   : {}", human_bytes(slob.source().len()));

    println!();
    println!("  content types:");
    for (i, t) in slob.content_types().iter().enumerate() {
        println!("    {:>3}  {}", i, t);
    }

    let mut tags: Vec<_> = slob.tags().iter().collect();
    tags.sort();
    println!();
    println!("  tags:");
    for (k, v) in tags {
        println!("    {:<20} {}", k, v);
    }
    Ok(())
}

fn run_find(
    file: PathBuf,
    key: &str,
    output: Option<PathBuf>,
    max_group_size: usize,
) -> anyhow::Result<()> {
    let slob = open(&file, max_group_size)?;

    let t0 = Instant::now();
    let item = slob.find(key).with_context(|| format!("looking up {:?}", key))?;
    eprintln!(
        "  {} ({}) in {:.3}ms",
        item.content_type,
        human_bytes(item.content.len() as u64),
        t0.elapsed().as_secs_f64() * 1000.0
    );
    emit(&item.content, output)
}

fn run_get(
    file: PathBuf,
    group: usize,
    slot: usize,
    output: Option<PathBuf>,
    max_group_size: usize,
) -> anyhow::Result<()> {
    let slob = open(&file, max_group_size)?;
    let item = slob
        .get(group, slot)
        .with_context(|| format!("reading group {} slot {}", group, slot))?;
    eprintln!("  {} ({})", item.content_type, human_bytes(item.content.len() as u64));
    emit(&item.content, output)
}

fn run_keys(file: PathBuf, limit: Option<usize>, max_group_size: usize) -> anyhow::Result<()> {
    let slob = open(&file, max_group_size)?;
    let mut stdout = io::stdout().lock();
    let limit = limit.unwrap_or(usize::MAX);

    for record in slob.keys().take(limit) {
        let record = record.context("decoding key index")?;
        if record.fragment.is_empty() {
            writeln!(stdout, "{}\t{}/{}", record.key, record.group, record.slot)?;
        } else {
            writeln!(
                stdout,
                "{}\t{}/{}\t#{}",
                record.key, record.group, record.slot, record.fragment
            )?;
        }
    }
    Ok(())
}

// ── Entry point ────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let max = cli.max_group_size;
    match cli.command {
        Commands::Inspect { file } => run_inspect(file, max),
        Commands::Find { file, key, output } => run_find(file, &key, output, max),
        Commands::Get {
            file,
            group,
            slot,
            output,
        } => run_get(file, group, slot, output, max),
        Commands::Keys { file, limit } => run_keys(file, limit, max),
    }
}
