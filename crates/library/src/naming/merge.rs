/// Combine the folders of a duplicate group into one destination folder.
///
/// Separators are normalized to `/`. The prefix shared by every folder is
/// kept once; after it, every segment past the point of divergence is
/// appended, folder by folder in input order, unless it repeats the segment
/// placed just before, shared prefix included. `A`, `A/B` and `A/C` merge into
/// `A/B/C`, while `A` and `A/A` merge into `A`.
///
/// An empty group merges into `""`; a single folder is returned normalized.
/// A leading `/` on the first folder is preserved.
pub fn merge_duplicate_paths<S: AsRef<str>>(paths: &[S]) -> String {
    let Some(first) = paths.first() else {
        return String::new();
    };
    let normalized: Vec<String> = paths.iter().map(|p| p.as_ref().replace('\\', "/")).collect();
    let absolute = normalized[0].starts_with('/');
    let segmented: Vec<Vec<&str>> =
        normalized.iter().map(|p| p.split('/').filter(|s| !s.is_empty()).collect()).collect();

    let shared = segmented
        .iter()
        .skip(1)
        .fold(segmented[0].len(), |shared, segments| {
            shared.min(segments.iter().zip(&segmented[0]).take_while(|(a, b)| a == b).count())
        });

    let mut merged: Vec<&str> = segmented[0][..shared].to_vec();
    for segments in &segmented {
        for &segment in &segments[shared..] {
            if merged.last() == Some(&segment) {
                continue;
            }
            merged.push(segment);
        }
    }

    let joined = merged.join("/");
    tracing::trace!(first = first.as_ref(), paths = paths.len(), merged = %joined, "merged duplicate folders");
    match absolute {
        true => format!("/{joined}"),
        false => joined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(&[], "")]
    #[case(&["A"], "A")]
    #[case(&["A", "A/B", "A/C"], "A/B/C")]
    #[case(&["Photos/Vacances", "Photos/Vacances/Plage", "Photos/Vacances/Montagne"], "Photos/Vacances/Plage/Montagne")]
    #[case(&["A/B", "A/B"], "A/B")]
    #[case(&["A/B", "A/C"], "A/B/C")]
    #[case(&["A/X/Y", "A/X/Z"], "A/X/Y/Z")]
    #[case(&["A/B/C", "A/B/D/E"], "A/B/C/D/E")]
    #[case(&["A/B", "A/C", "A/C"], "A/B/C")]
    #[case(&["A/B", "A/C", "A/B"], "A/B/C/B")]
    #[case(&["X", "Y"], "X/Y")]
    #[case(&["A", "A/A"], "A")]
    #[case(&["A/B", "A/B/B/C"], "A/B/C")]
    #[case(&["C:\\Photos\\2019", "C:\\Photos\\Trip"], "C:/Photos/2019/Trip")]
    #[case(&["/mnt/photos/a", "/mnt/photos/b"], "/mnt/photos/a/b")]
    #[case(&["A//B/", "A/B"], "A/B")]
    fn test_merge_duplicate_paths(#[case] paths: &[&str], #[case] expected: &str) {
        assert_eq!(merge_duplicate_paths(paths), expected);
    }
}
