//! JSON I/O handling for CLI

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use serde_json::Value;

use super::errors::{CliError, CliResult};
use crate::api::parse_filters;
use crate::filter::FilterDescriptor;

/// Read filter descriptors from a file, or from stdin when the path is "-"
pub fn read_filters(source: &Path) -> CliResult<Vec<FilterDescriptor>> {
    let bytes = if source == Path::new("-") {
        let mut buf = Vec::new();
        io::stdin().lock().read_to_end(&mut buf)?;
        buf
    } else {
        fs::read(source)?
    };

    parse_filters(&bytes).map_err(|e| CliError::Filters(e.to_string()))
}

/// Write a JSON value to stdout, pretty-printed
pub fn write_json(value: &Value) -> CliResult<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_filters_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("filters.json");
        fs::write(&path, r#"[{"field": "Price", "operator": ">", "value": 30}]"#).unwrap();

        let filters = read_filters(&path).unwrap();
        assert_eq!(filters, vec![FilterDescriptor::new("Price", ">", "30")]);
    }

    #[test]
    fn test_read_filters_rejects_objects() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("filters.json");
        fs::write(&path, r#"{"field": "Price"}"#).unwrap();
        assert!(read_filters(&path).is_err());
    }
}
