use thiserror::Error;

#[derive(Debug, Error)]
pub enum CustomError {
    #[error("could not read {path}")]
    ReadWithPath {
        #[source]
        source: std::io::Error,
        path: std::path::PathBuf,
    },

    #[error("could not write to {path}")]
    Write {
        #[source]
        source: std::io::Error,
        path: std::path::PathBuf,
    },

    #[error("could not create output directory {path}")]
    OutputDir {
        #[source]
        source: std::io::Error,
        path: std::path::PathBuf,
    },

    #[error("could not write to CSV")]
    CsvWrite(#[from] csv::Error),

    #[error("could not write block count matrix")]
    NpzWrite(#[from] ndarray_npy::WriteNpzError),

    #[error("could not embed block labels in npz archive")]
    Zip(#[from] zip::result::ZipError),

    #[error("could not serialize block labels")]
    Json(#[from] serde_json::Error),

    #[error("could not plot chromosome {chromosome}")]
    Plot {
        chromosome: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("could not load plot font")]
    Font,

    #[error("could not build thread pool")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("expected {expected} fields (got {n_fields}) in line {line_num} of pedigree file")]
    PedFields {
        line_num: usize,
        n_fields: usize,
        expected: usize,
    },

    #[error("proband {proband} not found in pedigree file")]
    ProbandNotInPed { proband: String },

    #[error(
        "cannot run on proband {proband}: both the mother and the father must be in the pedigree file"
    )]
    MissingParent { proband: String },

    #[error("chromosome cannot be X if proband is male")]
    MaleChromosomeX,

    #[error("sample {sample} not found in VCF header")]
    VcfUnknownSample { sample: String },

    #[error("could not read record {record_num} of {path}")]
    VcfRecord {
        #[source]
        source: std::io::Error,
        path: std::path::PathBuf,
        record_num: u64,
    },

    #[error("could not query chromosome {chromosome} in {path}")]
    VcfQuery {
        #[source]
        source: std::io::Error,
        path: std::path::PathBuf,
        chromosome: String,
    },

    #[error(
        "variants on chromosome {chromosome} are not sorted (position {position} after {previous})"
    )]
    UnsortedVariants {
        chromosome: String,
        previous: u64,
        position: u64,
    },

    #[error("block size must be at least 1")]
    BlockSize,

    #[error("minimum variants per block must be at least 1")]
    MinVariantsPerBlock,

    #[error("p-value must lie in (0, 1] (got {p_value})")]
    PValue { p_value: f64 },

    #[error("background rate {rate} is not a valid probability")]
    BackgroundRate { rate: f64 },

    #[error("no variants passed filters on the requested chromosome(s)")]
    NoBlocks,
}

pub type Result<T> = std::result::Result<T, CustomError>;
