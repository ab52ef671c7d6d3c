use std::fs;
use std::path::Path;

use itertools::Itertools;
use log::{trace, warn};

use crate::ParserError;

/// Where the importer gets its tables from. The file system is the only real source, the trait
/// exists so the import pipeline can be driven by instrumented sources.
pub trait TableSource: Send + Sync {
    /// File names (not paths) of all candidate table files directly inside `dir`.
    fn list_files(&self, dir: &Path) -> Result<Vec<String>, ParserError>;

    /// All lines of one file, header included.
    fn read_lines(&self, dir: &Path, file_name: &str) -> Result<Vec<String>, ParserError>;
}

pub const TABLE_EXTENSION: &str = ".csv";

#[derive(Debug, Default, Clone, Copy)]
pub struct FileSystemSource;

impl TableSource for FileSystemSource {
    fn list_files(&self, dir: &Path) -> Result<Vec<String>, ParserError> {
        let entries = fs::read_dir(dir).map_err(|source| ParserError::DirectoryError {
            path: dir.display().to_string(),
            source,
        })?;

        // Flat scan: the export never nests its tables.
        let files = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| is_table_file(name))
            .sorted()
            .collect_vec();

        trace!("Found {} table files in {}", files.len(), dir.display());
        Ok(files)
    }

    fn read_lines(&self, dir: &Path, file_name: &str) -> Result<Vec<String>, ParserError> {
        let bytes = fs::read(dir.join(file_name))?;
        let text = decode_text(&bytes, file_name)?;
        Ok(text.lines().map(str::to_owned).collect_vec())
    }
}

pub fn is_table_file(file_name: &str) -> bool {
    file_name.len() > TABLE_EXTENSION.len()
        && file_name.to_ascii_lowercase().ends_with(TABLE_EXTENSION)
}

/// The exporter writes with whatever encoding the editor's locale picked: UTF-8 (with or without
/// BOM) or UTF-16 with BOM.
pub fn decode_text(bytes: &[u8], file_name: &str) -> Result<String, ParserError> {
    match bytes {
        [0xEF, 0xBB, 0xBF, rest @ ..] => Ok(decode_utf8_lossy(rest, file_name)),
        [0xFF, 0xFE, rest @ ..] => decode_utf16(rest, u16::from_le_bytes),
        [0xFE, 0xFF, rest @ ..] => decode_utf16(rest, u16::from_be_bytes),
        _ => Ok(decode_utf8_lossy(bytes, file_name)),
    }
}

fn decode_utf8_lossy(bytes: &[u8], file_name: &str) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_owned(),
        Err(_) => {
            warn!("{} is not valid UTF-8, replacing invalid sequences", file_name);
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}

fn decode_utf16(bytes: &[u8], to_unit: fn([u8; 2]) -> u16) -> Result<String, ParserError> {
    let units = bytes
        .chunks_exact(2)
        .map(|pair| to_unit([pair[0], pair[1]]))
        .collect_vec();
    Ok(String::from_utf16(&units)?)
}

#[cfg(test)]
mod tests {
    use crate::source::{decode_text, is_table_file, FileSystemSource, TableSource};

    #[test]
    fn table_files_by_extension() {
        assert!(is_table_file("Foo_BoundsTable_LOD0.csv"));
        assert!(is_table_file("Foo_BoundsTable_LOD0.CSV"));
        assert!(!is_table_file("Foo_BoundsTable_LOD0.csv.bak"));
        assert!(!is_table_file(".csv"));
    }

    #[test]
    fn decodes_utf8_with_bom() -> Result<(), anyhow::Error> {
        let bytes = [&b"\xEF\xBB\xBF"[..], "Id,Name\r\n0,Würfel".as_bytes()].concat();
        assert_eq!(decode_text(&bytes, "test.csv")?, "Id,Name\r\n0,Würfel");
        Ok(())
    }

    #[test]
    fn decodes_utf16_by_bom() -> Result<(), anyhow::Error> {
        let text = "Id,Name\n0,Würfel";
        let le = [0xFF, 0xFE]
            .into_iter()
            .chain(text.encode_utf16().flat_map(u16::to_le_bytes))
            .collect::<Vec<u8>>();
        let be = [0xFE, 0xFF]
            .into_iter()
            .chain(text.encode_utf16().flat_map(u16::to_be_bytes))
            .collect::<Vec<u8>>();

        assert_eq!(decode_text(&le, "le.csv")?, text);
        assert_eq!(decode_text(&be, "be.csv")?, text);
        Ok(())
    }

    #[test]
    fn invalid_utf8_is_replaced() -> Result<(), anyhow::Error> {
        let decoded = decode_text(&[b'a', 0xFF, b'b'], "broken.csv")?;
        assert_eq!(decoded, "a\u{FFFD}b");
        Ok(())
    }

    #[test]
    fn lists_only_tables_sorted() -> Result<(), anyhow::Error> {
        let dir = std::env::current_dir()?.join("test-data").join("World_Cube");
        let files = FileSystemSource.list_files(&dir)?;
        assert_eq!(files, vec!["Cube_BoundsTable_LOD0.csv", "Cube_StaticMeshesTable_LOD0.csv"]);

        let lines = FileSystemSource.read_lines(&dir, &files[0])?;
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Id,"));
        Ok(())
    }
}
