use crate::Args;
use crate::blocks::{BlockAggregator, GenomicBlock};
use crate::classify::{Category, QcThresholds, classify};
use crate::error::{CustomError, Result};
use crate::model::{Sex, Trio, normalize_chromosome};
use crate::output::{plot_chromosome, write_block_counts_npz, write_block_table};
use crate::reader::TrioReader;
use crate::significance::test_blocks;
use crate::summary::{ChromosomeSummary, summarize};
use indicatif::{ProgressBar, ProgressStyle};
use itertools::Itertools;
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const AUTOSOMES: usize = 22;

/// Validated run configuration.
#[derive(Debug, Clone)]
pub struct RunSpec {
    pub vcf: PathBuf,
    pub ped: PathBuf,
    pub proband_id: String,
    pub output_prefix: String,
    pub qc: QcThresholds,
    pub block_size: u64,
    pub min_variants_per_block: u64,
    pub p_value: f64,
    pub chromosome: Option<String>,
    pub threads: Option<usize>,
    pub npz: bool,
}

impl RunSpec {
    pub fn print_paths(&self) {
        println!("VCF   : {}", self.vcf.display());
        println!("PED   : {}", self.ped.display());
        println!("OUTPUT: {}", self.output_prefix);
        println!();
    }

    fn output_path(&self, suffix: &str) -> PathBuf {
        PathBuf::from(format!("{}{}", self.output_prefix, suffix))
    }

    pub fn table_path(&self) -> PathBuf {
        self.output_path("_UPD_blocks.csv")
    }

    pub fn npz_path(&self) -> PathBuf {
        self.output_path("_block_counts.npz")
    }

    pub fn plot_path(&self, chromosome: &str) -> PathBuf {
        self.output_path(&format!("_chr{chromosome}_UPD.png"))
    }
}

pub fn build_run_spec(args: &Args) -> Result<RunSpec> {
    if args.block_size == 0 {
        return Err(CustomError::BlockSize);
    }
    if args.min_variants_per_block == 0 {
        return Err(CustomError::MinVariantsPerBlock);
    }
    if !(args.p_value > 0.0 && args.p_value <= 1.0) {
        return Err(CustomError::PValue {
            p_value: args.p_value,
        });
    }
    Ok(RunSpec {
        vcf: args.vcf.clone(),
        ped: args.ped.clone(),
        proband_id: args.proband_id.clone(),
        output_prefix: args.output.clone(),
        qc: QcThresholds {
            min_dp: args.min_dp,
            min_gq: args.min_gq,
            min_qual: args.min_qual,
        },
        block_size: args.block_size,
        min_variants_per_block: args.min_variants_per_block,
        p_value: args.p_value,
        chromosome: args.chromosome.clone(),
        threads: args.threads,
        npz: args.npz,
    })
}

/// Chromosomes to analyze for a proband. Male probands never get X.
pub fn chromosomes_to_analyze(sex: Sex, requested: Option<&str>) -> Result<Vec<String>> {
    if let Some(chromosome) = requested {
        let chromosome = normalize_chromosome(chromosome);
        if sex == Sex::Male && chromosome == "X" {
            return Err(CustomError::MaleChromosomeX);
        }
        return Ok(vec![chromosome.to_string()]);
    }

    let mut chromosomes: Vec<String> = (1..=AUTOSOMES).map(|c| c.to_string()).collect();
    if sex == Sex::Female {
        chromosomes.push("X".to_string());
    }
    Ok(chromosomes)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanStats {
    pub n_records: u64,
    pub n_other_chromosome: u64,
    pub n_discarded: u64,
    pub n_classified: u64,
}

/// Classify every call on the requested chromosomes and window it into blocks.
///
/// Returns the blocks of all chromosomes concatenated in `chromosomes` order.
pub fn scan_chromosomes(
    reader: &mut dyn TrioReader,
    chromosomes: &[String],
    qc: &QcThresholds,
    block_size: u64,
) -> Result<(Vec<GenomicBlock>, ScanStats)> {
    let mut aggregators = chromosomes
        .iter()
        .map(|c| BlockAggregator::new(c.as_str(), block_size))
        .collect::<Result<Vec<_>>>()?;
    let lookup: HashMap<String, usize> = chromosomes
        .iter()
        .enumerate()
        .map(|(idx, c)| (c.clone(), idx))
        .collect();

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("[{elapsed_precise}] {spinner} {pos} records {msg}") {
        pb.set_style(style);
    }

    let mut stats = ScanStats::default();
    for call in &mut *reader {
        let call = call?;
        pb.inc(1);
        let Some(&idx) = lookup.get(normalize_chromosome(&call.chromosome)) else {
            stats.n_other_chromosome += 1;
            continue;
        };
        match classify(call, qc) {
            Some(variant) => {
                aggregators[idx].push(&variant)?;
                stats.n_classified += 1;
            }
            None => stats.n_discarded += 1,
        }
    }
    stats.n_records = reader.n_records();
    pb.finish_and_clear();

    let mut blocks = Vec::new();
    for aggregator in aggregators {
        println!(
            "Chromosome {}: {} block(s)",
            aggregator.chromosome(),
            aggregator.n_blocks()
        );
        blocks.extend(aggregator.finish());
    }
    Ok((blocks, stats))
}

fn create_output_parent(prefix: &str) -> Result<()> {
    if let Some(parent) = Path::new(prefix).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| CustomError::OutputDir {
                source: e,
                path: parent.to_path_buf(),
            })?;
        }
    }
    Ok(())
}

/// Run the analysis for one trio. All preconditions are checked before any file is written.
pub fn run(spec: &RunSpec, reader: &mut dyn TrioReader) -> Result<Vec<ChromosomeSummary>> {
    let trio: Trio = reader.trio().clone();
    let chromosomes = chromosomes_to_analyze(trio.sex, spec.chromosome.as_deref())?;
    match (trio.sex, &spec.chromosome) {
        (_, Some(_)) => {}
        (Sex::Female, None) => println!("Proband is female - analysing chromosomes 1-22 and X."),
        _ => println!("Proband is male - analysing chromosomes 1-22 only."),
    }
    println!(
        "Trio ({}): proband {}, mother {}, father {}",
        trio.family_id, trio.proband, trio.mother, trio.father
    );
    println!("Chromosomes: {}", chromosomes.iter().join(", "));
    println!();

    let (blocks, stats) = scan_chromosomes(reader, &chromosomes, &spec.qc, spec.block_size)?;
    println!(
        "Read {} records: {} classified, {} discarded by QC, {} on other chromosomes",
        stats.n_records, stats.n_classified, stats.n_discarded, stats.n_other_chromosome
    );
    if blocks.is_empty() {
        return Err(CustomError::NoBlocks);
    }

    let post_scan = || -> Result<Vec<ChromosomeSummary>> {
        let report = test_blocks(&blocks, spec.p_value)?;
        println!(
            "Bonferroni-corrected threshold: {:.3e} ({} blocks x 4 tests)",
            report.corrected_threshold,
            blocks.len()
        );
        for category in Category::UPD {
            println!(
                "  {}: background rate {:.4}, {} significant block(s)",
                category.label(),
                report.background_rate(category).unwrap_or_default(),
                report.n_significant(category)
            );
        }
        let summaries = summarize(
            &chromosomes,
            blocks.clone(),
            report,
            spec.min_variants_per_block,
        );

        create_output_parent(&spec.output_prefix)?;

        let table_path = spec.table_path();
        println!("Writing block table to {}...", table_path.display());
        write_block_table(&summaries, &table_path)?;

        if spec.npz {
            let npz_path = spec.npz_path();
            println!("Writing block counts to {}...", npz_path.display());
            write_block_counts_npz(&summaries, &npz_path)?;
        }

        println!("Plotting {} chromosome(s)...", summaries.len());
        summaries
            .par_iter()
            .try_for_each(|s| plot_chromosome(s, &spec.plot_path(&s.chromosome)))?;
        Ok(summaries)
    };

    let summaries = match spec.threads {
        Some(n) => ThreadPoolBuilder::new().num_threads(n).build()?.install(post_scan)?,
        None => post_scan()?,
    };

    for summary in &summaries {
        let n_significant = summary.n_significant_blocks();
        if n_significant > 0 {
            println!(
                "Chromosome {}: {} significant block(s), {} masked",
                summary.chromosome,
                n_significant,
                summary.n_masked_blocks()
            );
        }
    }
    Ok(summaries)
}
