//! Segment-based glob matching
//!
//! Patterns are split on `/` into segments and matched against the segments
//! of a relative path:
//!
//! - `?` matches exactly one character within a segment
//! - `*` matches zero or more characters within a segment
//! - a segment that is exactly `**` matches zero or more whole segments
//!
//! Inside a longer segment, runs of `*` (including `**`) collapse to a single
//! "match anything within this segment" span. Case-insensitive matching
//! compares characters through upper/lower case equivalence only.

/// Recursive wildcard segment
const RECURSIVE: &str = "**";

/// Patterns excluded by default when a collector opts into them
pub const DEFAULT_EXCLUDES: &[&str] = &[
    // Miscellaneous typical temporary files
    "**/*~",
    "**/#*#",
    "**/.#*",
    "**/%*%",
    "**/._*",
    // CVS
    "**/CVS",
    "**/CVS/**",
    "**/.cvsignore",
    // RCS
    "**/RCS",
    "**/RCS/**",
    // SCCS
    "**/SCCS",
    "**/SCCS/**",
    // Visual SourceSafe
    "**/vssver.scc",
    // Subversion
    "**/.svn",
    "**/.svn/**",
    // Arch
    "**/.arch-ids",
    "**/.arch-ids/**",
    // Bazaar
    "**/.bzr",
    "**/.bzr/**",
    // SurroundSCM
    "**/.MySCMServerInfo",
    // Mac
    "**/.DS_Store",
    // Serena Dimensions
    "**/.metadata",
    "**/.metadata/**",
    // Mercurial
    "**/.hg",
    "**/.hg/**",
    // git
    "**/.git",
    "**/.git/**",
    // BitKeeper
    "**/BitKeeper",
    "**/BitKeeper/**",
    "**/ChangeSet",
    "**/ChangeSet/**",
    // darcs
    "**/_darcs",
    "**/_darcs/**",
    "**/.darcsrepo",
    "**/.darcsrepo/**",
    "**/-darcs-backup*",
    "**/.darcs-temp-mail",
];

/// A normalized, pre-split path pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    normalized: String,
    rooted: bool,
    segments: Vec<String>,
}

impl PathPattern {
    /// Normalize and split a pattern.
    ///
    /// Surrounding whitespace is trimmed, `\` becomes `/`, and a trailing `/`
    /// gets `**` appended so `dir/` selects everything below `dir`.
    pub fn new(pattern: &str) -> Self {
        let mut normalized = pattern.trim().replace('\\', "/");
        if normalized.ends_with('/') {
            normalized.push_str(RECURSIVE);
        }

        let rooted = normalized.starts_with('/');
        let segments = split_segments(&normalized)
            .into_iter()
            .map(str::to_string)
            .collect();

        Self {
            normalized,
            rooted,
            segments,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.normalized
    }

    /// Whether the whole relative `path` matches this pattern
    pub fn matches(&self, path: &str, case_sensitive: bool) -> bool {
        if path.starts_with('/') != self.rooted {
            return false;
        }
        let segments: Vec<&str> = self.segments.iter().map(String::as_str).collect();
        match_segments(&segments, &split_segments(path), case_sensitive)
    }

    /// Whether something below the directory `path` could still match.
    ///
    /// Compares segments up to the first `**`. Once the pattern reaches a
    /// `**` the answer is optimistic.
    pub fn could_match_below(&self, path: &str, case_sensitive: bool) -> bool {
        if path.starts_with('/') != self.rooted {
            return false;
        }

        let path_segments = split_segments(path);
        let mut pattern_iter = self.segments.iter();
        let mut path_iter = path_segments.iter();

        loop {
            match (pattern_iter.next(), path_iter.next()) {
                (_, None) => return true,
                (None, Some(_)) => return false,
                (Some(pattern), Some(_)) if pattern == RECURSIVE => return true,
                (Some(pattern), Some(segment)) => {
                    if !match_segment(pattern, segment, case_sensitive) {
                        return false;
                    }
                }
            }
        }
    }
}

/// Include/exclude pattern set with a case-sensitivity flag
#[derive(Debug, Clone)]
pub struct PatternSet {
    includes: Vec<PathPattern>,
    excludes: Vec<PathPattern>,
    case_sensitive: bool,
}

impl PatternSet {
    /// Build a pattern set. An empty include list means "everything".
    pub fn new<I, E>(includes: I, excludes: E, case_sensitive: bool) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        let mut includes: Vec<PathPattern> = includes
            .into_iter()
            .map(|p| PathPattern::new(p.as_ref()))
            .collect();
        if includes.is_empty() {
            includes.push(PathPattern::new(RECURSIVE));
        }

        let excludes = excludes
            .into_iter()
            .map(|p| PathPattern::new(p.as_ref()))
            .collect();

        Self {
            includes,
            excludes,
            case_sensitive,
        }
    }

    /// Append the default VCS/editor exclude set
    #[must_use]
    pub fn with_default_excludes(mut self) -> Self {
        self.excludes
            .extend(DEFAULT_EXCLUDES.iter().map(|p| PathPattern::new(p)));
        self
    }

    pub fn is_included(&self, path: &str) -> bool {
        self.includes
            .iter()
            .any(|p| p.matches(path, self.case_sensitive))
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        self.excludes
            .iter()
            .any(|p| p.matches(path, self.case_sensitive))
    }

    /// Included and not excluded
    pub fn is_selected(&self, path: &str) -> bool {
        self.is_included(path) && !self.is_excluded(path)
    }

    pub fn could_hold_included(&self, path: &str) -> bool {
        self.includes
            .iter()
            .any(|p| p.could_match_below(path, self.case_sensitive))
    }

    pub fn includes(&self) -> &[PathPattern] {
        &self.includes
    }

    pub fn excludes(&self) -> &[PathPattern] {
        &self.excludes
    }
}

/// Split on `/`, dropping empty segments
fn split_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn all_recursive(segments: &[&str]) -> bool {
    segments.iter().all(|s| *s == RECURSIVE)
}

/// Match pattern segments against path segments, `**` spanning whole segments
fn match_segments(pattern: &[&str], path: &[&str], case_sensitive: bool) -> bool {
    let (mut pat_start, mut pat_end) = (0, pattern.len());
    let (mut str_start, mut str_end) = (0, path.len());

    // Up to the first `**`
    while pat_start < pat_end && str_start < str_end {
        if pattern[pat_start] == RECURSIVE {
            break;
        }
        if !match_segment(pattern[pat_start], path[str_start], case_sensitive) {
            return false;
        }
        pat_start += 1;
        str_start += 1;
    }
    if str_start == str_end {
        return all_recursive(&pattern[pat_start..pat_end]);
    }
    if pat_start == pat_end {
        return false;
    }

    // Back from the end, up to the last `**`
    while pat_start < pat_end && str_start < str_end {
        if pattern[pat_end - 1] == RECURSIVE {
            break;
        }
        if !match_segment(pattern[pat_end - 1], path[str_end - 1], case_sensitive) {
            return false;
        }
        pat_end -= 1;
        str_end -= 1;
    }
    if str_start == str_end {
        return all_recursive(&pattern[pat_start..pat_end]);
    }

    // pattern[pat_start] and pattern[pat_end - 1] are both `**` here
    while pat_start + 1 < pat_end && str_start < str_end {
        let Some(next_recursive) =
            (pat_start + 1..pat_end).find(|&i| pattern[i] == RECURSIVE)
        else {
            break;
        };
        if next_recursive == pat_start + 1 {
            // `**/**`
            pat_start += 1;
            continue;
        }

        let run = &pattern[pat_start + 1..next_recursive];
        let window = str_end - str_start;
        if run.len() > window {
            return false;
        }
        let found = (0..=window - run.len()).find(|&offset| {
            run.iter().enumerate().all(|(j, segment_pattern)| {
                match_segment(segment_pattern, path[str_start + offset + j], case_sensitive)
            })
        });
        let Some(offset) = found else {
            return false;
        };
        pat_start = next_recursive;
        str_start += offset + run.len();
    }

    all_recursive(&pattern[pat_start..pat_end])
}

/// Match a single segment against a single path segment
pub fn match_segment(pattern: &str, segment: &str, case_sensitive: bool) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = segment.chars().collect();

    let (mut p, mut t) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && pattern[p] == '*' {
            backtrack = Some((p, t));
            p += 1;
        } else if p < pattern.len()
            && (pattern[p] == '?' || chars_equal(pattern[p], text[t], case_sensitive))
        {
            p += 1;
            t += 1;
        } else if let Some((star, mark)) = backtrack {
            p = star + 1;
            t = mark + 1;
            backtrack = Some((star, mark + 1));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|c| *c == '*')
}

fn chars_equal(a: char, b: char, case_sensitive: bool) -> bool {
    if a == b {
        return true;
    }
    !case_sensitive
        && (a.to_uppercase().eq(b.to_uppercase()) || a.to_lowercase().eq(b.to_lowercase()))
}
