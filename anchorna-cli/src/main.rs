use anchorna_core::{Alphabet, Quota};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod error;

use commands::go::Overrides;
use config::{Config, DEFAULT_CONFIG_FILE};

#[derive(Parser)]
#[command(name = "anchorna")]
#[command(about = "AnchoRNA - anchors in homologous sequences")]
#[command(version)]
#[command(long_about = "
AnchoRNA finds short conserved anchors shared by a set of homologous
sequences without aligning them, and cuts out sequence windows between
positions given relative to anchors or motifs.

Examples:
  anchorna create
  anchorna go --fname seqs.fasta --out anchors.gff
  anchorna print 'anchors.gff|a2:a10' --members
  anchorna cutout anchors.gff 'A3>' 'ATG<+3' --fname seqs.fasta --out cut.fasta
  anchorna combine anchors.gff 'cut_anchors.gff||0' --out combined.gff
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Number of threads to use
    #[arg(short, long, global = true)]
    pub threads: Option<usize>,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write an example configuration file
    Create {
        /// Output file
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        out: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Discover anchors
    Go {
        /// Sequence file (FASTA), overrides [input] fname
        #[arg(long)]
        fname: Option<PathBuf>,

        /// Residue alphabet (nt or aa), overrides [input] alphabet
        #[arg(long)]
        alphabet: Option<Alphabet>,

        /// Anchor output file (GFF, or JSON for .json)
        #[arg(short, long, default_value = "anchors.gff")]
        out: PathBuf,

        /// Output file for anchors removed as contradicting
        #[arg(long)]
        removed: Option<PathBuf>,

        /// Word length
        #[arg(short, long)]
        k: Option<usize>,

        /// Quota of the first round (count, fraction or percentage)
        #[arg(long)]
        initial_quota: Option<Quota>,

        /// Quota for extending anchors
        #[arg(long)]
        extend_quota: Option<Quota>,

        /// Lowest quota an anchor is accepted at
        #[arg(long)]
        add_anchor_quota: Option<Quota>,

        /// Maximum number of search rounds
        #[arg(long)]
        max_rounds: Option<usize>,

        /// Keep anchors whose order contradicts stronger anchors
        #[arg(long)]
        keep_contradicting: bool,

        /// Overwrite existing output files
        #[arg(long)]
        force: bool,
    },

    /// List anchors, given as file|selection|removal
    Print {
        anchors: String,

        /// Show one line per anchor member
        #[arg(short, long)]
        members: bool,
    },

    /// Merge anchor files, each given as file|selection|removal
    Combine {
        #[arg(required = true, num_args = 1..)]
        anchors: Vec<String>,

        /// Output file
        #[arg(short, long)]
        out: PathBuf,

        /// Tolerated overlap between anchors as a share of the shorter span
        #[arg(long, default_value = "0")]
        max_overlap: f64,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Cut out the window between two position expressions
    Cutout {
        /// Anchors, given as file|selection|removal
        anchors: String,

        /// Lower bound, e.g. A3> or ATG<+3 or start
        lower: String,

        /// Upper bound, e.g. A4< or end
        upper: String,

        /// Sequence file (FASTA), overrides [input] fname
        #[arg(long)]
        fname: Option<PathBuf>,

        /// Output file (FASTA)
        #[arg(short, long)]
        out: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn setup_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = Config::load(cli.config.as_deref())?;
    let threads = cli.threads.unwrap_or(config.general.threads);

    match cli.command {
        Commands::Create { out, force } => {
            commands::create::execute(out, force)?;
        }

        Commands::Go {
            fname,
            alphabet,
            out,
            removed,
            k,
            initial_quota,
            extend_quota,
            add_anchor_quota,
            max_rounds,
            keep_contradicting,
            force,
        } => {
            let overrides = Overrides {
                k,
                initial_quota,
                extend_quota,
                add_anchor_quota,
                max_rounds,
                keep_contradicting,
            };
            commands::go::execute(
                &config, threads, fname, alphabet, out, removed, overrides, force,
            )?;
        }

        Commands::Print { anchors, members } => {
            commands::print::execute(&anchors, members)?;
        }

        Commands::Combine { anchors, out, max_overlap, force } => {
            commands::combine::execute(anchors, out, max_overlap, force)?;
        }

        Commands::Cutout { anchors, lower, upper, fname, out, force } => {
            commands::cutout::execute(&config, &anchors, &lower, &upper, fname, out, force)?;
        }
    }

    Ok(())
}
