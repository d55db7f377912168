use noodles::{bgzf, tabix, vcf};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

pub const BLOCK_SIZE: u64 = 100_000;
pub const VARIANTS_PER_BLOCK: u64 = 20;
pub const CHR1_BLOCKS: u64 = 10;
pub const ENRICHED_BLOCK: u64 = 5;
pub const CHR2_VARIANTS: u64 = 2;
pub const CHRX_VARIANTS: u64 = 6;
pub const MIN_VARIANTS_PER_BLOCK: u64 = 5;

pub const PROBAND: &str = "child";
const MOTHER: &str = "mum";
const FATHER: &str = "dad";

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

#[derive(Clone, Copy)]
pub enum Layout {
    Plain,
    Bgzf,
    /// bgzip-compressed with a tabix index alongside
    Indexed,
}

#[derive(Clone, Copy)]
pub enum Pedigree {
    Female,
    Male,
    MissingFather,
}

pub struct Dataset {
    pub vcf: PathBuf,
    pub ped: PathBuf,
    pub output_dir: PathBuf,
    pub output_prefix: PathBuf,
}

impl Dataset {
    pub fn table_path(&self) -> PathBuf {
        self.with_suffix("_UPD_blocks.csv")
    }

    pub fn npz_path(&self) -> PathBuf {
        self.with_suffix("_block_counts.npz")
    }

    pub fn plot_path(&self, chromosome: &str) -> PathBuf {
        self.with_suffix(&format!("_chr{chromosome}_UPD.png"))
    }

    fn with_suffix(&self, suffix: &str) -> PathBuf {
        let mut name = self.output_prefix.as_os_str().to_owned();
        name.push(suffix);
        PathBuf::from(name)
    }
}

pub fn create_dataset(pedigree: Pedigree, layout: Layout, label: &str) -> io::Result<Dataset> {
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    let base_dir = std::env::temp_dir().join("updog-tests").join(format!(
        "{}-{}-{}",
        std::process::id(),
        id,
        label
    ));
    fs::create_dir_all(&base_dir)?;

    let ped = base_dir.join("family.ped");
    write_ped(&ped, pedigree)?;

    let vcf_text = build_vcf();
    let vcf = match layout {
        Layout::Plain => {
            let path = base_dir.join("trio.vcf");
            fs::write(&path, vcf_text)?;
            path
        }
        Layout::Bgzf | Layout::Indexed => {
            let path = base_dir.join("trio.vcf.gz");
            let mut writer = bgzf::io::Writer::new(File::create(&path)?);
            writer.write_all(vcf_text.as_bytes())?;
            writer.finish()?;
            if matches!(layout, Layout::Indexed) {
                let index = vcf::fs::index(&path)?;
                tabix::fs::write(base_dir.join("trio.vcf.gz.tbi"), &index)?;
            }
            path
        }
    };

    let output_dir = base_dir.join("output");
    let output_prefix = output_dir.join("trio");
    Ok(Dataset {
        vcf,
        ped,
        output_dir,
        output_prefix,
    })
}

fn write_ped(path: &Path, pedigree: Pedigree) -> io::Result<()> {
    let (father, sex) = match pedigree {
        Pedigree::Female => (FATHER, "2"),
        Pedigree::Male => (FATHER, "1"),
        Pedigree::MissingFather => ("0", "2"),
    };
    let mut f = File::create(path)?;
    writeln!(f, "FAM1\t{PROBAND}\t{father}\t{MOTHER}\t{sex}\t2")?;
    writeln!(f, "FAM1\t{FATHER}\t0\t0\t1\t1")?;
    writeln!(f, "FAM1\t{MOTHER}\t0\t0\t2\t1")?;
    Ok(())
}

/// Genotypes as (proband, mother, father).
const BIPARENTAL: (&str, &str, &str) = ("0/1", "0/0", "1/1");
const MATERNAL_ISODISOMY: (&str, &str, &str) = ("0/0", "0/1", "1/1");

fn record(chrom: &str, pos: u64, qual: &str, genotypes: (&str, &str, &str), dp: u32) -> String {
    let (proband, mother, father) = genotypes;
    // Sample columns are ordered father, proband, mother
    format!(
        "{chrom}\t{pos}\t.\tA\tG\t{qual}\tPASS\t.\tGT:AD:DP:GQ\t\
         {father}:15,15:30:60.5\t{proband}:15,15:{dp}:59.5\t{mother}:15,15:30:99\n"
    )
}

/// chr1 carries one maternal isodisomy call per block except the enriched
/// block, where every call is one. chr2 has a single sparse block and two
/// calls failing QC. chrX has one block.
fn build_vcf() -> String {
    let mut vcf = String::new();
    vcf.push_str("##fileformat=VCFv4.2\n");
    for contig in ["chr1", "chr2", "chrX"] {
        vcf.push_str(&format!("##contig=<ID={contig}>\n"));
    }
    vcf.push_str("##FORMAT=<ID=GT,Number=1,Type=String,Description=\"Genotype\">\n");
    vcf.push_str("##FORMAT=<ID=AD,Number=R,Type=Integer,Description=\"Allelic depths\">\n");
    vcf.push_str("##FORMAT=<ID=DP,Number=1,Type=Integer,Description=\"Read depth\">\n");
    vcf.push_str("##FORMAT=<ID=GQ,Number=1,Type=Float,Description=\"Genotype quality\">\n");
    vcf.push_str(&format!(
        "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\t{FATHER}\t{PROBAND}\t{MOTHER}\n"
    ));

    for block in 0..CHR1_BLOCKS {
        for k in 0..VARIANTS_PER_BLOCK {
            let pos = block * BLOCK_SIZE + 1_000 * k + 1;
            let genotypes = if block == ENRICHED_BLOCK || k == 0 {
                MATERNAL_ISODISOMY
            } else {
                BIPARENTAL
            };
            vcf.push_str(&record("chr1", pos, "60", genotypes, 30));
        }
    }

    vcf.push_str(&record("chr2", 10_000, "60", BIPARENTAL, 30));
    vcf.push_str(&record("chr2", 20_000, "60", ("0|1", "0|0", "1|1"), 30));
    vcf.push_str(&record("chr2", 50_000, "60", BIPARENTAL, 3));
    vcf.push_str(&record("chr2", 60_000, ".", BIPARENTAL, 30));

    for k in 0..CHRX_VARIANTS {
        vcf.push_str(&record("chrX", 1_000 + k * 100, "60", BIPARENTAL, 30));
    }
    vcf
}
