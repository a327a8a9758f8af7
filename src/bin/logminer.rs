use anyhow::Context;
use clap::Parser;
use logminer::{FilePersistence, MinerConfig, PersistenceHandler, SearchStrategy, Snapshot, TemplateMiner};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "logminer", version, about = "Online log template mining")]
struct Cli {
    /// Input files (`-` for stdin). May be repeated.
    #[arg(required = false)]
    input: Vec<String>,

    /// JSON miner configuration; flags below override it
    #[arg(long = "config")]
    config: Option<String>,

    #[arg(long = "depth")] depth: Option<usize>,
    #[arg(long = "similarity")] similarity: Option<f64>,
    #[arg(long = "max-children")] max_children: Option<usize>,
    #[arg(long = "max-clusters")] max_clusters: Option<usize>,
    /// Masking rule as NAME=PATTERN. May be repeated.
    #[arg(long = "mask")] mask: Vec<String>,
    /// Enable the built-in masking rules (timestamps, IPs, numbers, ...)
    #[arg(long = "builtin-masks", default_value_t = false)] builtin_masks: bool,

    /// Resume from a snapshot file
    #[arg(long = "load")] load: Option<String>,
    /// Write a snapshot file when done
    #[arg(long = "save")] save: Option<String>,
    /// Print drift against this baseline snapshot as JSON
    #[arg(long = "baseline")] baseline: Option<String>,

    /// Match-only mode: never | fallback | always
    #[arg(long = "match")] match_strategy: Option<SearchStrategy>,

    /// Final output: status | json | none
    #[arg(long = "output", default_value = "status")] output: String,
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

fn build_config(cli: &Cli) -> anyhow::Result<MinerConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let body = std::fs::read_to_string(path).with_context(|| format!("reading config {path}"))?;
            MinerConfig::from_json_str(&body)?
        }
        None => MinerConfig::default(),
    };
    if let Some(d) = cli.depth { config = config.with_depth(d); }
    if let Some(s) = cli.similarity { config = config.with_similarity(s); }
    if let Some(c) = cli.max_children { config = config.with_max_children(c); }
    if let Some(c) = cli.max_clusters { config = config.with_max_clusters(c); }
    if cli.builtin_masks { config = config.with_builtin_masks(); }
    for rule in &cli.mask {
        let (name, pattern) = rule
            .split_once('=')
            .with_context(|| format!("mask rule {rule:?} is not NAME=PATTERN"))?;
        config = config.with_mask_instruction(pattern, name);
    }
    Ok(config)
}

fn for_each_line<F>(paths: &[String], running: &AtomicBool, mut f: F) -> io::Result<()>
where
    F: FnMut(&str) -> anyhow::Result<()>,
{
    let mut feed = |reader: &mut dyn BufRead| -> io::Result<()> {
        for line in reader.lines() {
            if !running.load(Ordering::SeqCst) {
                break;
            }
            let l = line?;
            if let Err(e) = f(&l) {
                eprintln!("[logminer] {e:#}");
            }
        }
        Ok(())
    };
    if paths.is_empty() {
        return feed(&mut io::stdin().lock());
    }
    for p in paths {
        if p == "-" {
            feed(&mut io::stdin().lock())?;
        } else {
            let f = File::open(p)?;
            feed(&mut BufReader::with_capacity(1 << 20, f))?;
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let running = Arc::new(AtomicBool::new(true));
    {
        let r = running.clone();
        let _ = ctrlc::set_handler(move || r.store(false, Ordering::SeqCst));
    }

    let miner = match &cli.load {
        Some(path) => TemplateMiner::load(&FilePersistence::new(path))
            .with_context(|| format!("loading snapshot {path}"))?,
        None => TemplateMiner::new(&build_config(&cli)?)?,
    };

    if let Some(strategy) = cli.match_strategy {
        for_each_line(&cli.input, &running, |line| {
            let m = miner.match_message(line, strategy);
            let out = serde_json::json!({
                "line": line,
                "cluster_id": m.as_ref().map(|c| c.id),
                "template": m.as_ref().map(|c| c.template()),
            });
            println!("{out}");
            Ok(())
        })?;
        return Ok(());
    }

    for_each_line(&cli.input, &running, |line| {
        miner.add_message(line);
        Ok(())
    })?;

    match cli.output.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&miner.clusters())?),
        "none" => {}
        _ => print!("{}", miner.status()),
    }

    if let Some(path) = &cli.baseline {
        let body = std::fs::read_to_string(path).with_context(|| format!("reading baseline {path}"))?;
        let baseline = Snapshot::from_json(&body)?;
        println!("{}", serde_json::to_string_pretty(&miner.diff(&baseline))?);
    }

    if let Some(path) = &cli.save {
        FilePersistence::new(path).save(&miner.snapshot())?;
    }
    Ok(())
}
