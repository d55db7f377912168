use noodles::core::Region;
use noodles::vcf;
use noodles::vcf::variant::RecordBuf;
use noodles::vcf::variant::record::samples::keys::key;
use noodles::vcf::variant::record_buf::samples::sample::Value;
use std::collections::VecDeque;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use crate::error::{CustomError, Result};
use crate::model::{Genotype, SampleCall, Trio, TrioGenotypeCall, normalize_chromosome};
use crate::reader::TrioReader;

const INDEX_EXTENSIONS: [&str; 2] = ["tbi", "csi"];

/// Sample indices of the three trio members in the VCF header.
#[derive(Debug, Clone, Copy)]
struct TrioColumns {
    proband: usize,
    mother: usize,
    father: usize,
}

impl TrioColumns {
    fn resolve(header: &vcf::Header, trio: &Trio) -> Result<Self> {
        let find = |sample: &str| {
            header
                .sample_names()
                .get_index_of(sample)
                .ok_or_else(|| CustomError::VcfUnknownSample {
                    sample: sample.to_string(),
                })
        };
        Ok(Self {
            proband: find(&trio.proband)?,
            mother: find(&trio.mother)?,
            father: find(&trio.father)?,
        })
    }
}

/// All calls on one contig, fetched through the index.
type ContigQuery = Box<dyn FnMut(&str) -> io::Result<Vec<TrioGenotypeCall>>>;

enum Source {
    /// Whole-file scan in file order.
    Stream {
        reader: vcf::io::Reader<Box<dyn BufRead>>,
        header: vcf::Header,
        columns: TrioColumns,
        record: RecordBuf,
    },
    /// Per-contig queries in the order the chromosomes were requested.
    Indexed {
        query: ContigQuery,
        contigs: VecDeque<String>,
        buffered: std::vec::IntoIter<TrioGenotypeCall>,
    },
}

/// Trio calls from a plain or bgzip-compressed VCF.
///
/// When a tabix (`.tbi`) or CSI (`.csi`) index sits next to the file, only the
/// requested chromosomes are read. Otherwise the whole file is streamed.
pub struct VcfTrioReader {
    source: Source,
    path: PathBuf,
    trio: Trio,
    n_records: u64,
    done: bool,
}

fn has_index(path: &Path) -> bool {
    INDEX_EXTENSIONS.iter().any(|ext| {
        let mut index = path.as_os_str().to_owned();
        index.push(".");
        index.push(ext);
        Path::new(&index).exists()
    })
}

impl VcfTrioReader {
    pub fn open(path: &impl AsRef<Path>, trio: Trio, chromosomes: &[String]) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let source = if has_index(&path) {
            Self::open_indexed(&path, &trio, chromosomes)?
        } else {
            Self::open_stream(&path, &trio)?
        };
        Ok(Self {
            source,
            path,
            trio,
            n_records: 0,
            done: false,
        })
    }

    pub fn is_indexed(&self) -> bool {
        matches!(self.source, Source::Indexed { .. })
    }

    fn open_stream(path: &Path, trio: &Trio) -> Result<Source> {
        let read_err = |e| CustomError::ReadWithPath {
            source: e,
            path: path.to_path_buf(),
        };
        // Compression is detected from the file itself
        let mut reader = vcf::io::reader::Builder::default()
            .build_from_path(path)
            .map_err(read_err)?;
        let header = reader.read_header().map_err(read_err)?;
        let columns = TrioColumns::resolve(&header, trio)?;
        Ok(Source::Stream {
            reader,
            header,
            columns,
            record: RecordBuf::default(),
        })
    }

    fn open_indexed(path: &Path, trio: &Trio, chromosomes: &[String]) -> Result<Source> {
        let read_err = |e| CustomError::ReadWithPath {
            source: e,
            path: path.to_path_buf(),
        };
        let mut reader = vcf::io::indexed_reader::Builder::default()
            .build_from_path(path)
            .map_err(read_err)?;
        let header = reader.read_header().map_err(read_err)?;
        let columns = TrioColumns::resolve(&header, trio)?;

        let mut contigs = VecDeque::new();
        for chromosome in chromosomes {
            if header.contigs().is_empty() {
                contigs.push_back(chromosome.clone());
                contigs.push_back(format!("chr{chromosome}"));
            } else {
                contigs.extend(
                    header
                        .contigs()
                        .keys()
                        .filter(|name| normalize_chromosome(name) == chromosome.as_str())
                        .cloned(),
                );
            }
        }

        let query: ContigQuery = Box::new(move |contig: &str| -> io::Result<Vec<TrioGenotypeCall>> {
            let region: Region = contig
                .parse()
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
            let records = match reader.query(&header, &region) {
                Ok(records) => records,
                // Contig with no records in the index
                Err(e) if e.kind() == io::ErrorKind::InvalidInput => return Ok(Vec::new()),
                Err(e) => return Err(e),
            };
            records
                .map(|result| -> io::Result<TrioGenotypeCall> {
                    let record = result?;
                    let record = RecordBuf::try_from_variant_record(&header, &record)?;
                    Ok(trio_call(&record, columns))
                })
                .collect()
        });

        Ok(Source::Indexed {
            query,
            contigs,
            buffered: Vec::new().into_iter(),
        })
    }
}

impl TrioReader for VcfTrioReader {
    fn trio(&self) -> &Trio {
        &self.trio
    }

    fn n_records(&self) -> u64 {
        self.n_records
    }
}

impl Iterator for VcfTrioReader {
    type Item = Result<TrioGenotypeCall>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let next = match &mut self.source {
            Source::Stream {
                reader,
                header,
                columns,
                record,
            } => match reader.read_record_buf(header, record) {
                Ok(0) => None,
                Ok(_) => Some(Ok(trio_call(record, *columns))),
                Err(e) => Some(Err(CustomError::VcfRecord {
                    source: e,
                    path: self.path.clone(),
                    record_num: self.n_records + 1,
                })),
            },
            Source::Indexed {
                query,
                contigs,
                buffered,
            } => loop {
                if let Some(call) = buffered.next() {
                    break Some(Ok(call));
                }
                let Some(contig) = contigs.pop_front() else {
                    break None;
                };
                match query(contig.as_str()) {
                    Ok(calls) => *buffered = calls.into_iter(),
                    Err(e) => {
                        break Some(Err(CustomError::VcfQuery {
                            source: e,
                            path: self.path.clone(),
                            chromosome: contig,
                        }));
                    }
                }
            },
        };
        match &next {
            Some(Ok(_)) => self.n_records += 1,
            // Poison iterator to prevent further reads
            Some(Err(_)) | None => self.done = true,
        }
        next
    }
}

fn trio_call(record: &RecordBuf, columns: TrioColumns) -> TrioGenotypeCall {
    let samples = record.samples();
    let sample = |idx: usize| {
        samples
            .get_index(idx)
            .map(|s| SampleCall {
                genotype: s.get(key::GENOTYPE).flatten().and_then(genotype),
                dp: s.get(key::READ_DEPTH).flatten().and_then(numeric),
                gq: s
                    .get(key::CONDITIONAL_GENOTYPE_QUALITY)
                    .flatten()
                    .and_then(numeric),
            })
            .unwrap_or_default()
    };
    TrioGenotypeCall {
        chromosome: record.reference_sequence_name().to_string(),
        position: record
            .variant_start()
            .map(|p| p.get() as u64)
            .unwrap_or_default(),
        qual: record.quality_score().map(f64::from),
        proband: sample(columns.proband),
        mother: sample(columns.mother),
        father: sample(columns.father),
    }
}

/// Diploid GT with both alleles called. Haploid and partially missing calls yield `None`.
fn genotype(value: &Value) -> Option<Genotype> {
    let Value::Genotype(genotype) = value else {
        return None;
    };
    let [a, b] = genotype.as_ref() else {
        return None;
    };
    let a = u32::try_from(a.position()?).ok()?;
    let b = u32::try_from(b.position()?).ok()?;
    Some(Genotype::new(a, b))
}

/// DP and GQ may be declared `Integer` or `Float` in the header.
fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Integer(n) => Some(f64::from(*n)),
        Value::Float(x) => Some(f64::from(*x)),
        _ => None,
    }
}
