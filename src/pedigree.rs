use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{CustomError, Result};
use crate::model::{Sex, Trio};

pub(crate) const PED_FIELDS: usize = 6;
const UNKNOWN_PARENT: &str = "0";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PedRecord {
    pub family_id: String,
    pub sample_id: String,
    pub paternal_id: String,
    pub maternal_id: String,
    pub sex: Sex,
}

pub fn read_ped(path: &impl AsRef<Path>) -> Result<Vec<PedRecord>> {
    let f = File::open(path).map_err(|e| CustomError::ReadWithPath {
        source: e,
        path: path.as_ref().to_path_buf(),
    })?;
    parse_ped(BufReader::new(f), path)
}

fn parse_ped(reader: impl BufRead, path: &impl AsRef<Path>) -> Result<Vec<PedRecord>> {
    let mut records = Vec::new();
    for (line_idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| CustomError::ReadWithPath {
            source: e,
            path: path.as_ref().to_path_buf(),
        })?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != PED_FIELDS {
            return Err(CustomError::PedFields {
                line_num: line_idx + 1,
                n_fields: fields.len(),
                expected: PED_FIELDS,
            });
        }
        records.push(PedRecord {
            family_id: fields[0].to_string(),
            sample_id: fields[1].to_string(),
            paternal_id: fields[2].to_string(),
            maternal_id: fields[3].to_string(),
            sex: Sex::from_ped_code(fields[4]),
        });
    }
    Ok(records)
}

/// Look up the proband and both parents. Either parent being unknown is fatal.
pub fn resolve_trio(records: &[PedRecord], proband_id: &str) -> Result<Trio> {
    let record = records
        .iter()
        .find(|r| r.sample_id == proband_id)
        .ok_or_else(|| CustomError::ProbandNotInPed {
            proband: proband_id.to_string(),
        })?;

    if record.paternal_id == UNKNOWN_PARENT || record.maternal_id == UNKNOWN_PARENT {
        return Err(CustomError::MissingParent {
            proband: proband_id.to_string(),
        });
    }

    Ok(Trio {
        family_id: record.family_id.clone(),
        proband: record.sample_id.clone(),
        mother: record.maternal_id.clone(),
        father: record.paternal_id.clone(),
        sex: record.sex,
    })
}
