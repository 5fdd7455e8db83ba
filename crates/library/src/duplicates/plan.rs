use super::error::{ErrorKind, Result};
use super::import::{DuplicateFile, DuplicateGroup};
use crate::batch::Keyed;
use crate::naming::{OccurrenceIdentifier, merge_duplicate_paths};
use exn::{OptionExt, ResultExt};
use shoebox_storage::validate_path;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// What merging one duplicate group will do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeItem {
    pub group_id: String,
    /// The file that survives.
    pub keep: PathBuf,
    /// Every other copy, deleted once verified.
    pub copies: Vec<PathBuf>,
    /// Where `keep` ends up.
    pub destination: PathBuf,
}

impl Keyed for MergeItem {
    fn key(&self) -> String {
        self.group_id.clone()
    }
}

/// Decide every group's destination before anything moves.
///
/// Groups whose merged destination coincide are numbered `name-1.ext`,
/// `name-2.ext`, ... in group order. The plan only depends on the import
/// file, so a resumed run hands out the same numbers.
pub fn plan(groups: &[DuplicateGroup]) -> Result<Vec<MergeItem>> {
    let targets = groups.iter().map(target).collect::<Result<Vec<_>>>()?;
    let mut occurrences = OccurrenceIdentifier::from_names(targets.iter().map(|t| t.to_string_lossy()));

    groups
        .iter()
        .zip(targets)
        .map(|(group, target)| {
            let mut paths = group.files.iter().map(|file| file_path(group, file));
            let keep = paths.next().ok_or_raise(|| ErrorKind::InvalidGroup(group.group_id.clone()))??;
            // Rows repeating a file (or the kept one) would be deleted twice.
            let mut seen = BTreeSet::from([keep.clone()]);
            let mut copies = Vec::new();
            for path in paths {
                let path = path?;
                if seen.insert(path.clone()) {
                    copies.push(path);
                }
            }
            let destination = occurrences.assign(&target.to_string_lossy(), &target);
            Ok(MergeItem { group_id: group.group_id.clone(), keep, copies, destination })
        })
        .collect()
}

/// The merged folder joined with the name of the group's first file.
fn target(group: &DuplicateGroup) -> Result<PathBuf> {
    let first = group.files.first().ok_or_raise(|| ErrorKind::InvalidGroup(group.group_id.clone()))?;
    let folders: Vec<&str> = group.files.iter().map(|f| f.folder.as_str()).collect();
    let folder = merge_duplicate_paths(&folders);
    validate_path(format!("{folder}/{}", first.filename)).or_raise(|| ErrorKind::InvalidGroup(group.group_id.clone()))
}

fn file_path(group: &DuplicateGroup, file: &DuplicateFile) -> Result<PathBuf> {
    let folder = file.folder.replace('\\', "/");
    validate_path(format!("{folder}/{}", file.filename)).or_raise(|| ErrorKind::InvalidGroup(group.group_id.clone()))
}
