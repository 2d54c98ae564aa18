// Delimited text import

use std::io::Read;
use std::path::Path;

use bomrecon_recon::model::RawDataset;

use crate::error::IoError;
use crate::{clean_headers, drop_blank_rows, text_cell};

/// Import a delimited file, sniffing the delimiter. Every value is kept as
/// text so identifiers such as `00012345` keep their leading zeros.
pub fn import(path: &Path) -> Result<RawDataset, IoError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    import_from_string(&content, delimiter).map_err(|e| lift(path, e))
}

pub fn import_tsv(path: &Path) -> Result<RawDataset, IoError> {
    let content = read_file_as_utf8(path)?;
    import_from_string(&content, b'\t').map_err(|e| lift(path, e))
}

fn lift(path: &Path, e: ImportError) -> IoError {
    match e {
        ImportError::Csv(msg) => IoError::parse(path, msg),
        ImportError::Dataset(e) => IoError::Dataset(e),
    }
}

#[derive(Debug)]
enum ImportError {
    Csv(String),
    Dataset(bomrecon_recon::ReconError),
}

const DELIMITER_CANDIDATES: [u8; 4] = [b'\t', b';', b',', b'|'];
const SNIFF_LINES: usize = 10;

/// Guess the field delimiter from the first non-blank lines.
///
/// A candidate must split the header into at least two fields. The winner is
/// the candidate whose header width recurs on the most sample lines, weighted
/// by that width. Earlier candidates win ties; comma when nothing splits.
pub fn sniff_delimiter(content: &str) -> u8 {
    let sample: Vec<&str> = content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(SNIFF_LINES)
        .collect();
    let Some(header) = sample.first() else {
        return b',';
    };

    let mut chosen = (b',', 0usize);
    for delimiter in DELIMITER_CANDIDATES {
        let width = field_count(header, delimiter);
        if width < 2 {
            continue;
        }
        let agreeing = sample
            .iter()
            .filter(|line| field_count(line, delimiter) == width)
            .count();
        let score = agreeing * width;
        if score > chosen.1 {
            chosen = (delimiter, score);
        }
    }
    chosen.0
}

/// Fields on one line with quoting honoured. A line the parser rejects is one field.
fn field_count(line: &str, delimiter: u8) -> usize {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes())
        .records()
        .next()
        .and_then(Result::ok)
        .map_or(1, |record| record.len())
}

/// Read file and convert to UTF-8 if needed (Excel exports are often Windows-1252).
pub fn read_file_as_utf8(path: &Path) -> Result<String, IoError> {
    let mut file = std::fs::File::open(path).map_err(|e| IoError::read(path, e))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| IoError::read(path, e))?;

    let text = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            log::debug!("{} is not UTF-8, decoding as Windows-1252", path.display());
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    };

    Ok(match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    })
}

fn import_from_string(content: &str, delimiter: u8) -> Result<RawDataset, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = reader.records();
    let headers = match records.next() {
        Some(rec) => clean_headers(rec.map_err(|e| ImportError::Csv(e.to_string()))?.iter()),
        None => Vec::new(),
    };

    let mut rows = Vec::new();
    for result in records {
        let record = result.map_err(|e| ImportError::Csv(e.to_string()))?;
        rows.push(record.iter().map(text_cell).collect());
    }

    RawDataset::new(headers, drop_blank_rows(rows)).map_err(ImportError::Dataset)
}
