use crate::error::ImportError;

use csv::{ReaderBuilder, Trim};
use tracing::debug;

/// One data line of the input, cells in header order.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// 1-based line number in the source text.
    pub line: usize,
    pub cells: Vec<String>,
}

impl RawRow {
    pub fn cell(&self, index: usize) -> &str {
        self.cells.get(index).map(|c| c.as_str()).unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCsv {
    /// Lower-cased, trimmed column names.
    pub header: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl ParsedCsv {
    /// Index of `name` in the header, ignoring case and surrounding spaces.
    pub fn column(&self, name: &str) -> Option<usize> {
        let name = name.trim().to_lowercase();
        self.header.iter().position(|h| *h == name)
    }
}

pub struct CsvParser {
    delimiter: u8,
}

impl Default for CsvParser {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Splits `text` into a header and its non-empty data rows. Quoted cells
    /// may contain the delimiter.
    pub fn parse(&self, text: &str) -> Result<ParsedCsv, ImportError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(text.as_bytes());

        let mut header: Option<Vec<String>> = None;
        let mut rows = Vec::new();

        for result in reader.records() {
            let record = result?;
            if record.iter().all(|cell| cell.is_empty()) {
                continue;
            }

            let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
            if header.is_none() {
                header = Some(record.iter().map(|c| c.to_lowercase()).collect());
            } else {
                rows.push(RawRow {
                    line,
                    cells: record.iter().map(str::to_string).collect(),
                });
            }
        }

        let header = header.ok_or(ImportError::NoDataRows)?;
        if rows.is_empty() {
            return Err(ImportError::NoDataRows);
        }
        debug!(columns = ?header, rows = rows.len(), "Parsed CSV");

        Ok(ParsedCsv { header, rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_is_lowercased_and_trimmed() {
        let parsed = CsvParser::new()
            .parse(" Shop ID , Date,AMOUNT\nS1,2023-01-01,10\n")
            .unwrap();

        assert_eq!(parsed.header, vec!["shop id", "date", "amount"]);
        assert_eq!(parsed.column("Amount"), Some(2));
        assert_eq!(parsed.column("payment mode"), None);
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let parsed = CsvParser::new()
            .parse("name,email\n\nAna,ana@example.com\n   \n\nBo,bo@example.com\n")
            .unwrap();

        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.rows[0].cells, vec!["Ana", "ana@example.com"]);
        assert_eq!(parsed.rows[1].line, 6);
    }

    #[test]
    fn test_header_only_is_structural_error() {
        let result = CsvParser::new().parse("shop id,date,amount,payment mode\n");
        assert!(matches!(result, Err(ImportError::NoDataRows)));

        let result = CsvParser::new().parse("");
        assert!(matches!(result, Err(ImportError::NoDataRows)));
    }

    #[test]
    fn test_quoted_cells_keep_commas() {
        let parsed = CsvParser::new()
            .parse("name,region\n\"Ng, Ana\",North\n")
            .unwrap();

        assert_eq!(parsed.rows[0].cells, vec!["Ng, Ana", "North"]);
    }

    #[test]
    fn test_short_rows_read_missing_cells_as_empty() {
        let parsed = CsvParser::new().parse("a,b,c\n1\n").unwrap();

        assert_eq!(parsed.rows[0].cell(0), "1");
        assert_eq!(parsed.rows[0].cell(2), "");
    }

    #[test]
    fn test_custom_delimiter() {
        let parsed = CsvParser::new()
            .with_delimiter(b';')
            .parse("name;email\nAna;ana@example.com\n")
            .unwrap();

        assert_eq!(parsed.rows[0].cells, vec!["Ana", "ana@example.com"]);
    }

    #[test]
    fn test_byte_order_mark_is_ignored() {
        let parsed = CsvParser::new().parse("\u{feff}Name,Email\nAna,a@b.c\n").unwrap();
        assert_eq!(parsed.header[0], "name");
    }
}
