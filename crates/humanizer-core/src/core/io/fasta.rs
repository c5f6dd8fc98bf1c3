use bio::io::fasta;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;
use thiserror::Error;

/// A named protein sequence; `name` is the full header line (id plus description).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    pub name: String,
    pub sequence: String,
}

impl FastaRecord {
    pub fn new(name: impl Into<String>, sequence: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sequence: sequence.into(),
        }
    }

    /// Splits the header back into the id and the optional description.
    fn id_and_desc(&self) -> (&str, Option<&str>) {
        match self.name.split_once(char::is_whitespace) {
            Some((id, desc)) => (id, Some(desc.trim_start())),
            None => (self.name.as_str(), None),
        }
    }

    fn to_record(&self) -> fasta::Record {
        let (id, desc) = self.id_and_desc();
        fasta::Record::with_attrs(id, desc, self.sequence.as_bytes())
    }
}

impl TryFrom<fasta::Record> for FastaRecord {
    type Error = FastaError;

    fn try_from(record: fasta::Record) -> Result<Self, Self::Error> {
        let name = match record.desc() {
            Some(desc) => format!("{} {}", record.id(), desc),
            None => record.id().to_string(),
        };
        record.check().map_err(|reason| FastaError::InvalidRecord {
            name: name.clone(),
            reason: reason.to_string(),
        })?;
        if record.seq().is_empty() {
            return Err(FastaError::EmptySequence { name });
        }
        // `check` guarantees ASCII.
        let sequence = String::from_utf8_lossy(record.seq()).into_owned();
        Ok(Self { name, sequence })
    }
}

#[derive(Debug, Error)]
pub enum FastaError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Record '{name}' is malformed: {reason}")]
    InvalidRecord { name: String, reason: String },
    #[error("Record '{name}' has an empty sequence")]
    EmptySequence { name: String },
}

/// Reader and writer for FASTA files of protein sequences, backed by `bio::io::fasta`.
pub struct FastaFile;

impl FastaFile {
    pub fn read_from(reader: impl Read) -> Result<Vec<FastaRecord>, FastaError> {
        fasta::Reader::new(reader)
            .records()
            .map(|record| FastaRecord::try_from(record?))
            .collect()
    }

    pub fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<FastaRecord>, FastaError> {
        Self::read_from(File::open(path)?)
    }

    /// Writes one header line and one sequence line per record.
    pub fn write_to(records: &[FastaRecord], writer: impl Write) -> Result<(), FastaError> {
        let mut writer = fasta::Writer::new(writer);
        for record in records {
            writer.write_record(&record.to_record())?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn write_to_path<P: AsRef<Path>>(
        records: &[FastaRecord],
        path: P,
    ) -> Result<(), FastaError> {
        Self::write_to(records, File::create(path)?)
    }
}
