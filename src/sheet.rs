use std::collections::HashMap;

use anyhow::Context;

/// Read-side spreadsheet capability consumed by the upload paths.
/// Rows and columns are 1-based like the office tools the files come from;
/// out-of-range cells read as empty.
pub trait Sheet {
    fn cell(&self, row: u32, col: u32) -> &str;
    fn last_used_column(&self) -> u32;
}

/// CSV-backed sheet. The office exports its ledgers as CSV; cells are kept
/// verbatim, trimming happens at the call sites that care.
pub struct CsvSheet {
    rows: Vec<Vec<String>>,
    width: u32,
}

impl CsvSheet {
    pub fn open(bytes: &[u8]) -> anyhow::Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(bytes);

        let mut rows = Vec::new();
        let mut width = 0u32;
        for record in reader.records() {
            let record = record.context("malformed CSV row")?;
            width = width.max(record.len() as u32);
            rows.push(record.iter().map(str::to_string).collect());
        }
        Ok(Self { rows, width })
    }
}

impl Sheet for CsvSheet {
    fn cell(&self, row: u32, col: u32) -> &str {
        if row == 0 || col == 0 {
            return "";
        }
        self.rows
            .get(row as usize - 1)
            .and_then(|r| r.get(col as usize - 1))
            .map(String::as_str)
            .unwrap_or("")
    }

    fn last_used_column(&self) -> u32 {
        self.width
    }
}

/// Lowercased column name -> 1-based column index, first occurrence wins.
pub fn header_map(sheet: &dyn Sheet, row: u32) -> HashMap<String, u32> {
    let mut map = HashMap::new();
    for col in 1..=sheet.last_used_column() {
        let name = sheet.cell(row, col).trim().to_lowercase();
        if !name.is_empty() {
            map.entry(name).or_insert(col);
        }
    }
    map
}

pub struct HeaderResolution {
    pub header_row: u32,
    pub columns: HashMap<String, u32>,
    /// Non-empty when no candidate row satisfied the requirement; carries the
    /// missing column names of the last attempt.
    pub missing: Vec<String>,
}

/// Try candidate header rows in order and keep the first one where `missing`
/// comes back empty. Uploaded ledgers carry their captions on row 1 or,
/// with a title row above, on row 2.
pub fn probe_header(
    sheet: &dyn Sheet,
    candidates: &[u32],
    missing: impl Fn(&HashMap<String, u32>) -> Vec<String>,
) -> HeaderResolution {
    let mut last = HeaderResolution {
        header_row: candidates.first().copied().unwrap_or(1),
        columns: HashMap::new(),
        missing: Vec::new(),
    };
    for &row in candidates {
        let columns = header_map(sheet, row);
        let miss = missing(&columns);
        let done = miss.is_empty();
        last = HeaderResolution {
            header_row: row,
            columns,
            missing: miss,
        };
        if done {
            break;
        }
    }
    last
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(text: &str) -> CsvSheet {
        CsvSheet::open(text.as_bytes()).unwrap()
    }

    #[test]
    fn cells_are_one_based_and_safe() {
        let s = sheet("a,b\nc\n");
        assert_eq!(s.cell(1, 1), "a");
        assert_eq!(s.cell(1, 2), "b");
        assert_eq!(s.cell(2, 2), "");
        assert_eq!(s.cell(9, 9), "");
        assert_eq!(s.last_used_column(), 2);
    }

    #[test]
    fn header_map_is_case_insensitive_first_wins() {
        let s = sheet("Name, PF ,name\n");
        let map = header_map(&s, 1);
        assert_eq!(map.get("name"), Some(&1));
        assert_eq!(map.get("pf"), Some(&2));
    }

    #[test]
    fn probe_falls_through_to_second_row() {
        let s = sheet("Wage Ledger\nname,pf,esi\n");
        let res = probe_header(&s, &[1, 2], |cols| {
            ["name", "pf"]
                .iter()
                .filter(|c| !cols.contains_key(**c))
                .map(|c| c.to_string())
                .collect()
        });
        assert_eq!(res.header_row, 2);
        assert!(res.missing.is_empty());
    }

    #[test]
    fn probe_reports_missing_from_last_attempt() {
        let s = sheet("foo,bar\nbaz\n");
        let res = probe_header(&s, &[1, 2], |cols| {
            if cols.contains_key("name") {
                vec![]
            } else {
                vec!["name".to_string()]
            }
        });
        assert_eq!(res.header_row, 2);
        assert_eq!(res.missing, vec!["name".to_string()]);
    }
}
