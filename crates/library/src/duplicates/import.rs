use super::error::{ErrorKind, Result};
use exn::ResultExt;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

/// One file of a duplicate group, as listed in the import file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateFile {
    pub filename: String,
    /// Library-relative folder; `\` separators are accepted.
    pub folder: String,
}

/// Files known to hold identical content. The first file is the one kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    pub group_id: String,
    pub files: Vec<DuplicateFile>,
}

#[derive(Debug, Deserialize)]
struct Row {
    group_id: String,
    filename: String,
    folder: String,
}

/// Parse a `group_id,filename,folder` CSV (header required).
///
/// Groups come out in order of first appearance and keep their rows in file
/// order, even when a group's rows are not contiguous.
pub fn read_groups(reader: impl Read) -> Result<Vec<DuplicateGroup>> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut groups: Vec<DuplicateGroup> = Vec::new();
    for (index, row) in reader.deserialize::<Row>().enumerate() {
        let row = row.or_raise(|| ErrorKind::InvalidRow(index + 2))?;
        if row.group_id.is_empty() || row.filename.is_empty() {
            exn::bail!(ErrorKind::InvalidRow(index + 2));
        }
        let file = DuplicateFile { filename: row.filename, folder: row.folder };
        match groups.iter_mut().find(|g| g.group_id == row.group_id) {
            Some(group) => group.files.push(file),
            None => groups.push(DuplicateGroup { group_id: row.group_id, files: vec![file] }),
        }
    }
    Ok(groups)
}

pub fn read_groups_from_path(path: &Path) -> Result<Vec<DuplicateGroup>> {
    let file = std::fs::File::open(path).or_raise(|| ErrorKind::Import(path.to_path_buf()))?;
    read_groups(file).or_raise(|| ErrorKind::Import(path.to_path_buf()))
}
