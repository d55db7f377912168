mod blocks;
mod classify;
mod cli;
mod error;
mod model;
mod output;
mod pedigree;
mod proportions;
mod reader;
mod significance;
mod summary;

use crate::error::Result;
use crate::reader::vcf::VcfTrioReader;
use clap::Parser;
use miette::IntoDiagnostic;
use std::path::PathBuf;

/// Detect uniparental disomy from trio genotype calls.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    /// VCF containing the proband and both parents (plain or bgzip-compressed, optionally indexed).
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    vcf: PathBuf,

    /// Sample ID of the proband in the VCF and pedigree.
    #[arg(long, alias = "proband_id")]
    proband_id: String,

    /// Tab-delimited pedigree file describing the family.
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    ped: PathBuf,

    /// Output name prefix.
    #[arg(long)]
    output: String,

    /// Minimum genotype depth (DP) of every trio member.
    #[arg(long, alias = "min_dp")]
    min_dp: u32,

    /// Block size in base pairs.
    #[arg(long, alias = "block_size")]
    block_size: u64,

    /// Minimum genotype quality (GQ) of every trio member.
    #[arg(long, alias = "min_gq")]
    min_gq: u32,

    /// Minimum site QUAL.
    #[arg(long, alias = "min_qual")]
    min_qual: f64,

    /// Blocks with fewer variants have their proportions masked.
    #[arg(long, alias = "min_variants_per_block")]
    min_variants_per_block: u64,

    /// Nominal p-value, Bonferroni-corrected across all blocks and UPD categories.
    #[arg(long, alias = "p_value")]
    p_value: f64,

    /// Restrict the analysis to a single chromosome.
    #[arg(long)]
    chromosome: Option<String>,

    /// Number of threads for testing and plotting.
    #[arg(short, long)]
    threads: Option<usize>,

    /// Also write raw block counts as an npz archive.
    #[arg(long)]
    npz: bool,
}

fn try_main() -> Result<()> {
    let args = Args::parse();
    let spec = cli::build_run_spec(&args)?;
    spec.print_paths();

    let ped = pedigree::read_ped(&spec.ped)?;
    let trio = pedigree::resolve_trio(&ped, &spec.proband_id)?;
    let chromosomes = cli::chromosomes_to_analyze(trio.sex, spec.chromosome.as_deref())?;

    let mut reader = VcfTrioReader::open(&spec.vcf, trio, &chromosomes)?;
    if reader.is_indexed() {
        println!("Found VCF index, reading requested chromosomes only.");
    }
    cli::run(&spec, &mut reader)?;
    println!();
    println!("Done.");
    Ok(())
}

fn main() -> miette::Result<()> {
    try_main().into_diagnostic()
}
