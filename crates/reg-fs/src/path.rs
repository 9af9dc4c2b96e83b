//! Normalized path handling for cross-platform compatibility

use std::path::{Path, PathBuf};

/// A path normalized to use forward slashes internally.
///
/// Registry manifests, import templates and install targets are all
/// compared as strings, so every path that crosses a module boundary is
/// stored in this form: forward slashes, no empty or `.` segments, and
/// `a/../` pairs folded lexically. Leading `..` segments of a relative
/// path are kept because they are meaningful in import specifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath {
    /// Internal representation always uses forward slashes
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path_str = path.as_ref().to_string_lossy();
        Self {
            inner: clean(&path_str.replace('\\', "/")),
        }
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Whether the path is rooted (`/x` or a drive prefix such as `C:/x`).
    pub fn is_absolute(&self) -> bool {
        self.inner.starts_with('/') || has_drive_prefix(&self.inner)
    }

    /// Join this path with a segment.
    ///
    /// The segment is always treated as relative to `self`.
    pub fn join(&self, segment: &str) -> Self {
        let segment_normalized = segment.replace('\\', "/");
        let segment_normalized = segment_normalized.trim_start_matches('/');
        if segment_normalized.is_empty() {
            return self.clone();
        }
        let joined = if self.inner == "." {
            segment_normalized.to_string()
        } else if self.inner.ends_with('/') {
            format!("{}{}", self.inner, segment_normalized)
        } else {
            format!("{}/{}", self.inner, segment_normalized)
        };
        Self {
            inner: clean(&joined),
        }
    }

    /// Get the parent directory.
    pub fn parent(&self) -> Option<Self> {
        let trimmed = self.inner.trim_end_matches('/');
        match trimmed.rfind('/') {
            Some(0) if trimmed.len() > 1 => Some(Self {
                inner: "/".to_string(),
            }),
            Some(idx) if idx > 0 => Some(Self {
                inner: trimmed[..idx].to_string(),
            }),
            _ if trimmed != "." && !trimmed.is_empty() && !self.is_absolute() => Some(Self {
                inner: ".".to_string(),
            }),
            _ => None,
        }
    }

    /// Get the file name component.
    pub fn file_name(&self) -> Option<&str> {
        let trimmed = self.inner.trim_end_matches('/');
        trimmed.rsplit('/').next().filter(|name| !name.is_empty())
    }

    /// Get the extension if present.
    pub fn extension(&self) -> Option<&str> {
        self.file_name().and_then(|name| {
            let idx = name.rfind('.')?;
            if idx == 0 {
                None
            } else {
                Some(&name[idx + 1..])
            }
        })
    }

    /// The file name without its extension.
    pub fn file_stem(&self) -> Option<&str> {
        self.file_name().map(|name| match name.rfind('.') {
            Some(idx) if idx > 0 => &name[..idx],
            _ => name,
        })
    }

    /// Return this path with its extension removed.
    pub fn without_extension(&self) -> Self {
        match self.extension() {
            Some(ext) => Self {
                inner: self.inner[..self.inner.len() - ext.len() - 1].to_string(),
            },
            None => self.clone(),
        }
    }

    /// Return this path with its extension replaced (or added).
    pub fn with_extension(&self, ext: &str) -> Self {
        let stem = self.without_extension();
        let ext = ext.trim_start_matches('.');
        if ext.is_empty() {
            return stem;
        }
        Self {
            inner: format!("{}.{}", stem.inner, ext),
        }
    }

    /// Whether `self` equals `base` or lies underneath it.
    pub fn starts_with(&self, base: &NormalizedPath) -> bool {
        self.strip_prefix(base).is_some()
    }

    /// Remove `base` from the front of this path.
    ///
    /// Returns `"."` when the paths are equal.
    pub fn strip_prefix(&self, base: &NormalizedPath) -> Option<Self> {
        if base.inner == "." && !self.is_absolute() {
            return Some(self.clone());
        }
        if self.inner == base.inner {
            return Some(Self {
                inner: ".".to_string(),
            });
        }
        let prefix = if base.inner.ends_with('/') {
            base.inner.clone()
        } else {
            format!("{}/", base.inner)
        };
        self.inner.strip_prefix(&prefix).map(|rest| Self {
            inner: rest.to_string(),
        })
    }

    /// Compute the path that leads from the directory `base` to `self`.
    ///
    /// Both paths must be of the same kind (both absolute or both
    /// relative). Returns `None` when no lexical answer exists, e.g. when
    /// `base` climbs above its own root with leading `..` segments that
    /// `self` does not share.
    ///
    /// ```
    /// use reg_fs::NormalizedPath;
    ///
    /// let file = NormalizedPath::new("src/lib/utils.ts");
    /// let dir = NormalizedPath::new("src/components/ui");
    /// assert_eq!(file.relative_to(&dir).unwrap().as_str(), "../../lib/utils.ts");
    /// ```
    pub fn relative_to(&self, base: &NormalizedPath) -> Option<Self> {
        if self.is_absolute() != base.is_absolute() {
            return None;
        }
        let target: Vec<&str> = segments(&self.inner);
        let from: Vec<&str> = segments(&base.inner);

        let common = target
            .iter()
            .zip(from.iter())
            .take_while(|(a, b)| a == b)
            .count();

        if from[common..].iter().any(|s| *s == "..") {
            return None;
        }

        let mut parts: Vec<&str> = std::iter::repeat_n("..", from.len() - common).collect();
        parts.extend(&target[common..]);

        if parts.is_empty() {
            return Some(Self {
                inner: ".".to_string(),
            });
        }
        Some(Self {
            inner: parts.join("/"),
        })
    }

    /// Check if this path exists on the filesystem.
    pub fn exists(&self) -> bool {
        self.to_native().exists()
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.to_native().is_dir()
    }

    /// Check if this is a file.
    pub fn is_file(&self) -> bool {
        self.to_native().is_file()
    }

    /// Resolve symlinks and make the path absolute.
    ///
    /// Falls back to the lexical path when the file does not exist.
    pub fn canonicalize(&self) -> Self {
        match dunce::canonicalize(self.to_native()) {
            Ok(path) => Self::new(path),
            Err(_) => self.clone(),
        }
    }
}

fn has_drive_prefix(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

fn segments(s: &str) -> Vec<&str> {
    s.split('/')
        .filter(|seg| !seg.is_empty() && *seg != ".")
        .collect()
}

/// Lexically clean a forward-slash path.
fn clean(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }
    let absolute = path.starts_with('/');
    let mut out: Vec<&str> = Vec::new();

    for seg in path.split('/') {
        match seg {
            "" | "." => {}
            ".." => match out.last() {
                Some(last) if *last != ".." && !(out.len() == 1 && has_drive_prefix(last)) => {
                    out.pop();
                }
                _ if absolute => {}
                Some(last) if has_drive_prefix(last) => {}
                _ => out.push(".."),
            },
            other => out.push(other),
        }
    }

    let joined = out.join("/");
    match (absolute, joined.is_empty()) {
        (true, _) => format!("/{}", joined),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}
