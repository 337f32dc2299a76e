use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// One row of an RCM (read-cluster map) file: a read identifier and the
/// cluster it was assigned to by the reconstruction step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RcmEntry {
    pub id: String,
    pub clique: i64,
}

/// Reads an RCM file into its entries, preserving file order.
///
/// The format is `READ_ID<TAB>CLUSTER` with no header row. Any malformed row
/// is a fatal error; there is no best-effort recovery.
pub fn read_rcm(path: &str) -> Result<Vec<RcmEntry>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("Unable to open RCM file {path}"))?;

    let mut entries = Vec::new();
    for (row, record) in rdr.deserialize().enumerate() {
        let entry: RcmEntry =
            record.with_context(|| format!("Malformed RCM row {}", row + 1))?;
        entries.push(entry);
    }

    Ok(entries)
}

/// Writes entries as an RCM file.
pub fn write_rcm<'a, W: Write>(
    writer: W,
    entries: impl IntoIterator<Item = &'a RcmEntry>,
) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_writer(writer);

    for entry in entries {
        wtr.serialize(entry)?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn roundtrip() {
        let entries = vec![
            RcmEntry { id: "read_1".to_string(), clique: 1 },
            RcmEntry { id: "read_2".to_string(), clique: 17 },
        ];

        let mut buf = Vec::new();
        write_rcm(&mut buf, &entries).unwrap();
        assert_eq!(String::from_utf8(buf.clone()).unwrap(), "read_1\t1\nread_2\t17\n");

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&buf).unwrap();
        let read_back = read_rcm(file.path().to_str().unwrap()).unwrap();
        assert_eq!(read_back, entries);
    }

    #[test]
    fn malformed_row_is_fatal() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "read_1\tnot_a_number").unwrap();

        let err = read_rcm(file.path().to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("Malformed RCM row 1"));
    }
}
