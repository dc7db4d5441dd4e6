use stagedist_engine::{TableKind, TableSource};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("cannot read {}", path.display())]
pub struct ReadError {
    path: PathBuf,
    #[source]
    source: io::Error,
}

/// Reads the stage config and ratio tables from disk.
#[derive(Debug, Clone)]
pub struct FsTableSource {
    pub stage_config: PathBuf,
    pub block_floor: PathBuf,
    pub obj_in_block: PathBuf,
    pub floor_in_block: PathBuf,
}

impl FsTableSource {
    #[must_use]
    pub fn table_path(&self, table: TableKind) -> &Path {
        match table {
            TableKind::BlockFloor => &self.block_floor,
            TableKind::ObjInBlock => &self.obj_in_block,
            TableKind::FloorInBlock => &self.floor_in_block,
        }
    }
}

fn read_text(path: &Path) -> Result<String, ReadError> {
    let text = fs::read_to_string(path).map_err(|source| ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    // spreadsheet exports often lead with a BOM
    Ok(match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    })
}

impl TableSource for FsTableSource {
    type Error = ReadError;

    fn load_stage_config(&self) -> Result<String, Self::Error> {
        read_text(&self.stage_config)
    }

    fn load_table(&self, table: TableKind) -> Result<String, Self::Error> {
        read_text(self.table_path(table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(label: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "stagedist-source-{label}-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn source_in(dir: &Path) -> FsTableSource {
        FsTableSource {
            stage_config: dir.join("config_base.json"),
            block_floor: dir.join("bf.csv"),
            obj_in_block: dir.join("ob.csv"),
            floor_in_block: dir.join("fb.csv"),
        }
    }

    #[test]
    fn reads_tables_by_kind_and_strips_bom() {
        let dir = temp_dir("read");
        fs::write(dir.join("ob.csv"), "\u{feff}h\nh\n").unwrap();
        let source = source_in(&dir);
        assert_eq!(source.load_table(TableKind::ObjInBlock).unwrap(), "h\nh\n");
        assert!(source.table_path(TableKind::FloorInBlock).ends_with("fb.csv"));
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = temp_dir("missing");
        let source = source_in(&dir);
        let err = source.load_stage_config().unwrap_err();
        assert!(err.to_string().contains("config_base.json"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
