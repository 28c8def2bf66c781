//! Resolves a bare identifier to a candidate defining file on disk (spec
//! §4.G: "search_for(name, optional base_dir) -> optional candidate").

use std::path::{Path, PathBuf};

/// A file the search path found that might define the identifier being
/// resolved, plus the directory it was found in (its "parent package").
#[derive(Debug, Clone)]
pub struct SearchCandidate {
    pub defining_file: PathBuf,
    pub parent_package: PathBuf,
}

/// An ordered list of directories to search, built either from a
/// colon-delimited string (`MTYPE_PATH`-style) or a newline-delimited path
/// file (`--path-file`).
#[derive(Debug, Clone, Default)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    pub fn from_colon_delimited(s: &str) -> Self {
        Self {
            dirs: s
                .split(':')
                .map(PathBuf::from)
                .filter(|p| !p.as_os_str().is_empty())
                .collect(),
        }
    }

    pub fn from_path_file(path: &Path) -> std::io::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(Self {
            dirs: contents
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(PathBuf::from)
                .collect(),
        })
    }

    pub fn push_dir(&mut self, dir: impl Into<PathBuf>) {
        self.dirs.push(dir.into());
    }

    /// Looks for `<dir>/<name>.m` across `base_dir` (searched first, if
    /// given — a file's own directory takes priority over the global path)
    /// then every directory on the path, in order.
    pub fn search_for(&self, name: &str, base_dir: Option<&Path>) -> Option<SearchCandidate> {
        let filename = format!("{name}.m");
        let candidates = base_dir.into_iter().chain(self.dirs.iter().map(PathBuf::as_path));
        for dir in candidates {
            let defining_file = dir.join(&filename);
            if defining_file.is_file() {
                return Some(SearchCandidate {
                    defining_file,
                    parent_package: dir.to_path_buf(),
                });
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colon_delimited_path_splits_on_colons() {
        let path = SearchPath::from_colon_delimited("/a:/b:/c");
        assert_eq!(path.dirs.len(), 3);
    }

    #[test]
    fn empty_segments_are_dropped() {
        let path = SearchPath::from_colon_delimited("/a::/b");
        assert_eq!(path.dirs.len(), 2);
    }

    #[test]
    fn finds_a_file_on_disk() {
        let dir = std::env::temp_dir().join("mtype_pipeline_search_path_test");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("widget.m"), "function y = widget(x)\ny = x;\nend\n").unwrap();

        let path = SearchPath {
            dirs: vec![dir.clone()],
        };
        let found = path.search_for("widget", None).unwrap();
        assert_eq!(found.parent_package, dir);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_file_is_none() {
        let path = SearchPath::from_colon_delimited("/nonexistent/path/xyz");
        assert!(path.search_for("nope", None).is_none());
    }
}
