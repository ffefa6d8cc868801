// Raw source loaders: every format becomes a list of JSON records

use std::io::Read;
use std::path::Path;

use serde_json::{Map, Value};
use sidebar_recon::RawFormat;

use crate::error::IoError;

/// Load every raw record of the file at `path`.
pub fn load_records(path: &Path, format: RawFormat) -> Result<Vec<Value>, IoError> {
    let content = read_file_as_utf8(path)?;
    let records = parse_records(&content, format).map_err(|message| IoError::Parse {
        path: path.to_path_buf(),
        message,
    })?;
    log::debug!("{}: {} raw records ({format})", path.display(), records.len());
    Ok(records)
}

/// Split `content` into raw records according to `format`.
pub fn parse_records(content: &str, format: RawFormat) -> Result<Vec<Value>, String> {
    let content = content.trim_start_matches('\u{feff}');
    match format {
        RawFormat::Csv => rows_from_delimited(content, sniff_delimiter(content)),
        RawFormat::Tsv => rows_from_delimited(content, b'\t'),
        RawFormat::Ndjson => ndjson(content),
        RawFormat::Json => match parse_json(content)? {
            Value::Array(records) => Ok(records),
            other => Err(format!("expected a JSON array of records, found {}", kind(&other))),
        },
        RawFormat::Jsonld => match parse_json(content)? {
            Value::Object(mut doc) => match doc.remove("@graph") {
                Some(Value::Array(nodes)) => Ok(nodes),
                Some(other) => Err(format!("@graph is {}, not an array", kind(&other))),
                None => Ok(vec![Value::Object(doc)]),
            },
            Value::Array(nodes) => Ok(nodes),
            other => Err(format!("expected a JSON-LD document, found {}", kind(&other))),
        },
        RawFormat::Geojson | RawFormat::Lpf => match parse_json(content)? {
            Value::Object(mut doc) => match doc.remove("features") {
                Some(Value::Array(features)) => Ok(features),
                _ => Err("expected a FeatureCollection with a 'features' array".into()),
            },
            other => Err(format!("expected a FeatureCollection, found {}", kind(&other))),
        },
        RawFormat::KeyedJson => match parse_json(content)? {
            Value::Object(doc) => Ok(doc
                .into_iter()
                .map(|(key, value)| {
                    let mut record = match value {
                        Value::Object(fields) => fields,
                        other => {
                            let mut fields = Map::new();
                            fields.insert("value".into(), other);
                            fields
                        }
                    };
                    record.insert("@id".into(), Value::String(key));
                    Value::Object(record)
                })
                .collect()),
            other => Err(format!("expected a JSON object keyed by URI, found {}", kind(&other))),
        },
    }
}

fn parse_json(content: &str) -> Result<Value, String> {
    serde_json::from_str(content).map_err(|e| e.to_string())
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn ndjson(content: &str) -> Result<Vec<Value>, String> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| serde_json::from_str(line).map_err(|e| format!("line {}: {e}", i + 1)))
        .collect()
}

/// Header row names the fields; every later row becomes an object of strings.
fn rows_from_delimited(content: &str, delimiter: u8) -> Result<Vec<Value>, String> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader.headers().map_err(|e| e.to_string())?.clone();
    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| e.to_string())?;
        let mut row = Map::new();
        for (i, name) in headers.iter().enumerate() {
            let field = record.get(i).unwrap_or("");
            row.insert(name.to_string(), Value::String(field.to_string()));
        }
        rows.push(Value::Object(row));
    }
    Ok(rows)
}

/// Gazetteer CSV exports come comma- or semicolon-separated. Pick the one
/// whose header splits into more fields and whose sampled rows agree with
/// that width; comma on a tie.
fn sniff_delimiter(content: &str) -> u8 {
    let width = |line: &str, delim: u8| {
        csv::ReaderBuilder::new()
            .delimiter(delim)
            .has_headers(false)
            .from_reader(line.as_bytes())
            .records()
            .next()
            .and_then(Result::ok)
            .map_or(0, |r| r.len())
    };
    let score = |delim: u8| {
        let mut lines = content.lines().filter(|l| !l.trim().is_empty()).take(20);
        let header = lines.next().map_or(0, |l| width(l, delim));
        if header <= 1 {
            return 0;
        }
        header * (1 + lines.filter(|l| width(l, delim) == header).count())
    };

    if score(b';') > score(b',') {
        b';'
    } else {
        b','
    }
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, IoError> {
    let mut file = std::fs::File::open(path).map_err(|e| IoError::read(path, e))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| IoError::read(path, e))?;

    // Try UTF-8 first; on failure, recover the buffer from the error
    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            log::warn!("{} is not UTF-8, decoding as Windows-1252", path.display());
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}
