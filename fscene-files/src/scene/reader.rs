use std::path::Path;

use itertools::Itertools;
use log::{debug, info, warn};

use crate::common::reader::tokenize_row;
use crate::discovery::{discover_tables, TableDirectory};
use crate::scene::builder::{ImportDiagnostics, SceneSetBuilder, TableRows};
use crate::scene::types::SceneDataSet;
use crate::source::TableSource;

#[derive(Debug, Clone, Default)]
pub struct SceneImport {
    /// One set per LOD, index 0 is the most detailed. Never empty.
    pub lod_sets: Vec<SceneDataSet>,
    pub diagnostics: ImportDiagnostics,
}

pub struct SceneDirectoryReader {}

impl SceneDirectoryReader {
    /// Runs the whole pipeline over the export in `dir`. This never fails: files that cannot be
    /// read leave their tables empty, and an unreadable directory yields a single empty LOD.
    pub fn read(source: &dyn TableSource, dir: &Path) -> SceneImport {
        let mut diagnostics = ImportDiagnostics::default();

        let directory = match source.list_files(dir) {
            Ok(file_names) => discover_tables(dir, &file_names),
            Err(error) => {
                warn!("Cannot list {}: {}", dir.display(), error);
                diagnostics.directory_error = Some(error.to_string());
                TableDirectory {
                    tables: Vec::new(),
                    lod_count: 1,
                }
            }
        };

        info!(
            "Found {} tables over {} LODs in {}",
            directory.tables.len(),
            directory.lod_count,
            dir.display()
        );

        let tables = Self::load_tables(source, dir, &directory, &mut diagnostics);
        let lod_sets = SceneSetBuilder::new(&tables, &mut diagnostics).build(directory.lod_count);

        SceneImport { lod_sets, diagnostics }
    }

    fn load_tables(
        source: &dyn TableSource,
        dir: &Path,
        directory: &TableDirectory,
        diagnostics: &mut ImportDiagnostics,
    ) -> TableRows {
        let mut tables = TableRows::new();

        for table in directory.tables.iter().filter(|table| table.kind.is_some()) {
            let lines = match source.read_lines(dir, &table.file_name) {
                Ok(lines) => lines,
                Err(error) => {
                    warn!("Cannot read {}: {}", table.file_name, error);
                    diagnostics.unreadable_files.push(table.file_name.clone());
                    continue;
                }
            };

            let rows = tokenize_lines(&lines);
            debug!("Loaded {} ({} rows)", table.key, rows.len());
            tables.insert(table.key.clone(), rows);
        }

        tables
    }
}

/// Tokenizes every line after the header, skipping blank ones.
pub fn tokenize_lines(lines: &[String]) -> Vec<Vec<String>> {
    lines
        .iter()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| tokenize_row(line))
        .collect_vec()
}
