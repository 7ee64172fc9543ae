//! Header-keyed CSV parsing with encoding and delimiter auto-detection.
//!
//! Converts exported sheets into [`Row`] maps. Cells after the last
//! non-empty cell of a row are absent from its map, the same shape the
//! sheets API returns for short rows.

use std::borrow::Cow;

use thiserror::Error;

use crate::sheets::Row;

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Parsed rows, keyed by header
    pub rows: Vec<Row>,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
    /// Column headers
    pub headers: Vec<String>,
}

/// Failure while turning raw bytes into rows.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The bytes are not valid in the detected encoding.
    #[error("Content is not valid {0}")]
    Encoding(String),

    /// CSV syntax error.
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes using the named encoding (a BOM, if present, wins).
///
/// Unknown labels decode as UTF-8.
pub fn decode_content<'a>(bytes: &'a [u8], encoding: &str) -> Result<Cow<'a, str>, ParseError> {
    let codec = encoding_rs::Encoding::for_label(encoding.as_bytes()).unwrap_or(encoding_rs::UTF_8);
    let (text, used, had_errors) = codec.decode(bytes);
    if had_errors {
        return Err(ParseError::Encoding(used.name().to_string()));
    }
    Ok(text)
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse CSV text into header-keyed rows.
///
/// The first record is the header row. Blank records are skipped.
pub fn parse_rows(content: &str, delimiter: char) -> Result<(Vec<String>, Vec<Row>), csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter as u8)
        .from_reader(content.as_bytes());

    let mut records = reader.records();

    let headers: Vec<String> = match records.next() {
        Some(header) => header?.iter().map(|h| h.trim().to_string()).collect(),
        None => return Ok((Vec::new(), Vec::new())),
    };

    let mut rows = Vec::new();
    for record in records {
        let record = record?;
        let cells: Vec<&str> = record.iter().collect();
        if cells.iter().all(|c| c.is_empty()) {
            continue;
        }
        rows.push(to_row(&headers, &cells));
    }

    Ok((headers, rows))
}

/// Build a row from headers and cells; trailing empty cells are dropped.
pub fn to_row<S: AsRef<str>>(headers: &[String], cells: &[S]) -> Row {
    let present = cells
        .iter()
        .rposition(|c| !c.as_ref().is_empty())
        .map_or(0, |last| last + 1);

    headers
        .iter()
        .zip(cells.iter().take(present))
        .map(|(h, c)| (h.clone(), c.as_ref().to_string()))
        .collect()
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> Result<ParseResult, ParseError> {
    // Detect encoding
    let encoding = detect_encoding(bytes);

    // Decode content
    let content = decode_content(bytes, &encoding)?;

    // Detect delimiter
    let delimiter = detect_delimiter(&content);

    let (headers, rows) = parse_rows(&content, delimiter)?;

    Ok(ParseResult {
        rows,
        encoding,
        delimiter,
        headers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_csv() {
        let (headers, rows) = parse_rows("name,age\nAlice,30\nBob,25", ',').unwrap();

        assert_eq!(headers, vec!["name", "age"]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["name"], "Alice");
        assert_eq!(rows[0]["age"], "30");
        assert_eq!(rows[1]["name"], "Bob");
    }

    #[test]
    fn test_quoted_values() {
        let csv = "Source,Source Field\n\"LDAP\",\"umPrimaryCampusRoom, Bldg\"";
        let (_, rows) = parse_rows(csv, ',').unwrap();

        assert_eq!(rows[0]["Source"], "LDAP");
        assert_eq!(rows[0]["Source Field"], "umPrimaryCampusRoom, Bldg");
    }

    #[test]
    fn test_empty_lines_skipped() {
        let (_, rows) = parse_rows("a;b\n1;2\n\n3;4\n;\n", ';').unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_short_and_trailing_empty_cells_absent() {
        let csv = "Cost Center,Division,Department,Unit\n032200,,Communications\n031800,,Dev,";
        let (_, rows) = parse_rows(csv, ',').unwrap();

        assert_eq!(rows[0].get("Division").map(String::as_str), Some(""));
        assert_eq!(rows[0]["Department"], "Communications");
        assert!(!rows[0].contains_key("Unit"));
        assert!(!rows[1].contains_key("Unit"));
    }

    #[test]
    fn test_extra_cells_ignored() {
        let (_, rows) = parse_rows("a,b\n1,2,3,4", ',').unwrap();
        assert_eq!(rows[0].len(), 2);
    }

    #[test]
    fn test_empty_input() {
        let (headers, rows) = parse_rows("", ',').unwrap();
        assert!(headers.is_empty());
        assert!(rows.is_empty());
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), '\t');
        assert_eq!(detect_delimiter("a|b|c\n1|2|3"), '|');
        assert_eq!(detect_delimiter("single"), ',');
    }

    #[test]
    fn test_auto_parse() {
        let result = parse_bytes_auto(b"Abbreviation,Full Text\nAbbr1,Abbreviation 1\n").unwrap();

        assert_eq!(result.delimiter, ',');
        assert_eq!(result.encoding, "utf-8");
        assert_eq!(result.headers, vec!["Abbreviation", "Full Text"]);
        assert_eq!(result.rows[0]["Full Text"], "Abbreviation 1");
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1").unwrap();
        assert_eq!(decoded, "Société");
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let bytes: &[u8] = &[0x53, 0xE9, 0x74];
        let err = decode_content(bytes, "utf-8").unwrap_err();
        assert!(matches!(err, ParseError::Encoding(_)));
        assert_eq!(err.to_string(), "Content is not valid UTF-8");
    }
}
