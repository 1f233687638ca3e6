use quiz_core::model::QuizId;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ResolveError {
    #[error(
        "ambiguous target '{target}' matches both:\n- Folder: {folder}\n- File: {file}\nUse a more specific path to disambiguate."
    )]
    AmbiguousTarget {
        target: String,
        folder: String,
        file: QuizId,
    },
}

const QUIZ_EXTENSIONS: [&str; 2] = [".yaml", ".yml"];

fn normalize_target(target: &str) -> String {
    let mut target = target.trim().replace('\\', "/");
    for ext in QUIZ_EXTENSIONS {
        if let Some(stripped) = target.strip_suffix(ext) {
            target = stripped.to_owned();
            break;
        }
    }
    target.trim_end_matches('/').to_owned()
}

fn strip_extension(path: &str) -> &str {
    QUIZ_EXTENSIONS
        .iter()
        .find_map(|ext| path.strip_suffix(ext))
        .unwrap_or(path)
}

fn is_within(folder: &str, prefix: &str) -> bool {
    folder == prefix
        || folder
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Sorted, de-duplicated non-empty folders holding at least one quiz.
fn folders(ids: &[QuizId]) -> Vec<&str> {
    let mut folders: Vec<&str> = ids
        .iter()
        .map(QuizId::folder)
        .filter(|f| !f.is_empty())
        .collect();
    folders.sort_unstable();
    folders.dedup();
    folders
}

fn match_folder(ids: &[QuizId], target: &str) -> Option<String> {
    let folders = folders(ids);

    if target.contains('/') {
        if let Some(found) = folders.iter().find(|f| is_within(f, target)) {
            tracing::debug!(query = %target, folder = %found, "matched folder path");
            return Some(target.to_owned());
        }
    }

    folders.iter().find_map(|folder| {
        let parts: Vec<&str> = folder.split('/').collect();
        parts
            .iter()
            .position(|part| *part == target)
            .map(|idx| parts[..=idx].join("/"))
    })
}

fn match_file<'a>(ids: &'a [QuizId], target: &str) -> Option<&'a QuizId> {
    if target.contains('/') {
        if let Some(found) = ids.iter().find(|id| strip_extension(id.as_str()) == target) {
            return Some(found);
        }
    }
    ids.iter().find(|id| id.stem() == target)
}

/// Resolve a folder or quiz name against the known quiz ids.
///
/// A name matches a folder when any component of a folder path equals it;
/// every quiz in that folder and below is selected. A name matches a quiz
/// when it equals the file stem. Names containing `/` may also address a
/// folder path or a quiz path directly, and a trailing `/` restricts the
/// match to folders. No match yields an empty list.
///
/// # Errors
///
/// Returns `ResolveError::AmbiguousTarget` when both a folder and a file match.
pub fn resolve_target(ids: &[QuizId], target: &str) -> Result<Vec<QuizId>, ResolveError> {
    let folder_only = target.trim().ends_with(['/', '\\']);
    let target = normalize_target(target);
    if target.is_empty() {
        return Ok(Vec::new());
    }

    let folder = match_folder(ids, &target);
    let file = if folder_only {
        None
    } else {
        match_file(ids, &target)
    };

    match (folder, file) {
        (Some(folder), Some(file)) => Err(ResolveError::AmbiguousTarget {
            target,
            folder,
            file: file.clone(),
        }),
        (Some(folder), None) => Ok(ids
            .iter()
            .filter(|id| is_within(id.folder(), &folder))
            .cloned()
            .collect()),
        (None, Some(file)) => Ok(vec![file.clone()]),
        (None, None) => Ok(Vec::new()),
    }
}

/// Folder components and quiz names that differ from `target` only by case.
#[must_use]
pub fn near_misses(ids: &[QuizId], target: &str) -> Vec<String> {
    let wanted = normalize_target(target).to_lowercase();
    let mut found: Vec<String> = ids
        .iter()
        .flat_map(|id| {
            id.folder()
                .split('/')
                .filter(|part| !part.is_empty())
                .chain(std::iter::once(id.stem()))
                .collect::<Vec<_>>()
        })
        .filter(|name| name.to_lowercase() == wanted)
        .map(str::to_owned)
        .collect();
    found.sort();
    found.dedup();
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<QuizId> {
        let mut ids: Vec<QuizId> = [
            "CompTIA/A+/hardware.yaml",
            "CompTIA/A+/software.yaml",
            "CompTIA/Net+/ports.yaml",
            "CompTIA/Net+/Advanced/routing.yaml",
            "CompTIA/Network/cabling.yaml",
            "basics.yaml",
        ]
        .into_iter()
        .map(QuizId::new)
        .collect();
        ids.sort();
        ids
    }

    fn paths(ids: &[QuizId]) -> Vec<&str> {
        ids.iter().map(QuizId::as_str).collect()
    }

    #[test]
    fn folder_name_selects_folder_and_subfolders() {
        let resolved = resolve_target(&corpus(), "Net+").unwrap();
        assert_eq!(
            paths(&resolved),
            vec!["CompTIA/Net+/Advanced/routing.yaml", "CompTIA/Net+/ports.yaml"]
        );
    }

    #[test]
    fn folder_prefix_does_not_capture_siblings() {
        let ids: Vec<QuizId> = ["Net/a.yaml", "Network/b.yaml"]
            .into_iter()
            .map(QuizId::new)
            .collect();
        let resolved = resolve_target(&ids, "Net").unwrap();
        assert_eq!(paths(&resolved), vec!["Net/a.yaml"]);
    }

    #[test]
    fn top_folder_selects_everything_below() {
        let resolved = resolve_target(&corpus(), "CompTIA").unwrap();
        assert_eq!(resolved.len(), 5);
    }

    #[test]
    fn file_stem_selects_single_quiz() {
        let resolved = resolve_target(&corpus(), "ports").unwrap();
        assert_eq!(paths(&resolved), vec!["CompTIA/Net+/ports.yaml"]);

        let resolved = resolve_target(&corpus(), "basics.yaml").unwrap();
        assert_eq!(paths(&resolved), vec!["basics.yaml"]);
    }

    #[test]
    fn folder_and_file_with_same_name_is_ambiguous() {
        let ids: Vec<QuizId> = ["Net/dns.yaml", "Other/Net.yaml"]
            .into_iter()
            .map(QuizId::new)
            .collect();
        let err = resolve_target(&ids, "Net").unwrap_err();
        assert_eq!(
            err,
            ResolveError::AmbiguousTarget {
                target: "Net".into(),
                folder: "Net".into(),
                file: QuizId::new("Other/Net.yaml"),
            }
        );
        let message = err.to_string();
        assert!(message.contains("Folder: Net"));
        assert!(message.contains("File: Other/Net.yaml"));
    }

    #[test]
    fn paths_disambiguate() {
        let ids: Vec<QuizId> = ["Net/dns.yaml", "Other/Net.yaml"]
            .into_iter()
            .map(QuizId::new)
            .collect();
        let resolved = resolve_target(&ids, "Other/Net").unwrap();
        assert_eq!(paths(&resolved), vec!["Other/Net.yaml"]);

        let resolved = resolve_target(&ids, "Net/").unwrap();
        assert_eq!(paths(&resolved), vec!["Net/dns.yaml"]);

        let resolved = resolve_target(&corpus(), "CompTIA/A+").unwrap();
        assert_eq!(resolved.len(), 2);
    }

    #[test]
    fn unknown_name_resolves_to_nothing() {
        assert!(resolve_target(&corpus(), "nothing").unwrap().is_empty());
        assert!(resolve_target(&corpus(), "  ").unwrap().is_empty());
        assert!(resolve_target(&corpus(), "net+").unwrap().is_empty());
    }

    #[test]
    fn near_misses_report_case_differences() {
        assert_eq!(near_misses(&corpus(), "net+"), vec!["Net+".to_string()]);
        assert_eq!(near_misses(&corpus(), "PORTS"), vec!["ports".to_string()]);
        assert!(near_misses(&corpus(), "zzz").is_empty());
    }
}
