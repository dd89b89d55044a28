//! Line-oriented script registry (`scripts.conf`).
//!
//! Each non-blank line is `kind:status:alias:description:filename`; `#` starts
//! a comment running to end of line. Malformed lines are dropped with a
//! [`ParseWarning`] and never fail the parse.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, ShelfError};
use crate::util::fsutil;

const COMMENT: char = '#';
const SEPARATOR: char = ':';
const FIELD_COUNT: usize = 5;

/// What an entry materializes into when enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    /// Sourced from the shell profile.
    Startup,
    /// Exposed as a command in the bin directory.
    Tool,
    /// Anything else; kept verbatim so a rewrite does not lose it.
    Unknown(String),
}

impl Kind {
    pub fn from_name(name: &str) -> Self {
        match name {
            "startup" => Kind::Startup,
            "tools" => Kind::Tool,
            other => Kind::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Kind::Startup => "startup",
            Kind::Tool => "tools",
            Kind::Unknown(name) => name,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Enabled,
    Disabled,
}

impl Status {
    /// `enable` is the only truthy spelling; anything else reads as disabled.
    pub fn from_name(name: &str) -> Self {
        if name == "enable" {
            Status::Enabled
        } else {
            Status::Disabled
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Enabled => "enable",
            Status::Disabled => "disable",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Status::Enabled => Status::Disabled,
            Status::Disabled => Status::Enabled,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One managed script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub kind: Kind,
    pub status: Status,
    pub alias: Option<String>,
    pub description: String,
    pub filename: String,
    /// Comment-stripped, trimmed source text.
    raw: String,
    /// 1-based physical line number in the registry file.
    line: usize,
}

impl Entry {
    fn from_line(text: &str, line: usize) -> std::result::Result<Self, String> {
        let fields: Vec<&str> = text.splitn(FIELD_COUNT, SEPARATOR).map(str::trim).collect();
        if fields.len() < FIELD_COUNT {
            return Err(format!(
                "expected kind:status:alias:description:filename, found {} field(s)",
                fields.len()
            ));
        }

        let filename = fields[4];
        if filename.is_empty() {
            return Err("filename field is empty".to_string());
        }

        let alias = Some(fields[2])
            .filter(|alias| !alias.is_empty())
            .map(str::to_string);

        Ok(Self {
            kind: Kind::from_name(fields[0]),
            status: Status::from_name(fields[1]),
            alias,
            description: fields[3].to_string(),
            filename: filename.to_string(),
            raw: text.to_string(),
            line,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.status == Status::Enabled
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn line(&self) -> usize {
        self.line
    }

    /// Alias for tools, filename otherwise.
    pub fn label(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.filename)
    }

    /// Registry line for this entry carrying `status`.
    pub fn render(&self, status: Status) -> String {
        format!(
            "{kind}:{status}:{alias}:{description}:{filename}",
            kind = self.kind,
            alias = self.alias.as_deref().unwrap_or(""),
            description = self.description,
            filename = self.filename,
        )
    }
}

/// Recoverable problem with a single registry line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    pub line: usize,
    pub message: String,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// Ordered snapshot of the registry file; position is the addressing key.
#[derive(Debug, Clone)]
pub struct Registry {
    path: PathBuf,
    entries: Vec<Entry>,
    warnings: Vec<ParseWarning>,
}

impl Registry {
    /// Read and parse the registry at `path`.
    pub fn parse(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => ShelfError::NotFound {
                path: path.to_path_buf(),
            },
            _ => ShelfError::Unreadable {
                path: path.to_path_buf(),
                source,
            },
        })?;

        let registry = Self::from_contents(path, &contents);
        debug!(
            path = %path.display(),
            entries = registry.len(),
            malformed = registry.warnings.len(),
            "parsed registry"
        );

        Ok(registry)
    }

    pub fn from_contents(path: &Path, contents: &str) -> Self {
        let mut entries = Vec::new();
        let mut warnings = Vec::new();

        for (idx, physical) in contents.lines().enumerate() {
            let line = idx + 1;
            let text = strip_comment(physical).trim();
            if text.is_empty() {
                continue;
            }

            match Entry::from_line(text, line) {
                Ok(entry) => entries.push(entry),
                Err(message) => warnings.push(ParseWarning { line, message }),
            }
        }

        Self {
            path: path.to_path_buf(),
            entries,
            warnings,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn warnings(&self) -> &[ParseWarning] {
        &self.warnings
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    /// Resolve a user-supplied position against this snapshot.
    pub fn checked_index(&self, index: i64) -> Result<usize> {
        usize::try_from(index)
            .ok()
            .filter(|&idx| idx < self.entries.len())
            .ok_or(ShelfError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            })
    }
}

/// Flip the status of entry `index` and persist it to `path`.
///
/// The entry is located by the physical line it was parsed from, which must
/// still hold the same text. Indentation and any trailing comment on that line
/// survive the rewrite. Returns the new status.
pub fn toggle(path: &Path, index: i64, registry: &Registry) -> Result<Status> {
    let idx = registry.checked_index(index)?;
    let entry = &registry.entries[idx];
    let status = entry.status.toggled();

    let contents = fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ShelfError::NotFound {
            path: path.to_path_buf(),
        },
        _ => ShelfError::Unreadable {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let stale = || ShelfError::StaleEntry {
        path: path.to_path_buf(),
        line: entry.line,
    };
    let physical = contents
        .split_inclusive('\n')
        .nth(entry.line - 1)
        .ok_or_else(stale)?;
    if strip_comment(physical).trim() != entry.raw {
        return Err(stale());
    }

    let replacement = rewrite_line(physical, &entry.render(status));
    let updated: String = contents
        .split_inclusive('\n')
        .enumerate()
        .map(|(idx, line)| {
            if idx + 1 == entry.line {
                replacement.as_str()
            } else {
                line
            }
        })
        .collect();

    fsutil::write_atomic(path, &updated).map_err(|source| ShelfError::write(path, source))?;
    debug!(
        path = %path.display(),
        line = entry.line,
        status = %status,
        "rewrote registry entry"
    );

    Ok(status)
}

fn strip_comment(line: &str) -> &str {
    match line.find(COMMENT) {
        Some(pos) => &line[..pos],
        None => line,
    }
}

/// Swap the entry text of `physical` for `replacement`, keeping layout.
fn rewrite_line(physical: &str, replacement: &str) -> String {
    let body = physical.trim_end_matches(['\n', '\r']);
    let ending = &physical[body.len()..];

    let code = strip_comment(body);
    let comment = &body[code.len()..];
    let indent = &code[..code.len() - code.trim_start().len()];
    let gap = &code[code.trim_end().len()..];

    if comment.is_empty() {
        format!("{indent}{replacement}{ending}")
    } else {
        format!("{indent}{replacement}{gap}{comment}{ending}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    const SCENARIO_A: &str = "startup:enable::greeting:greet.sh\ntools:disable:gr:grep helper:g.sh\n";

    fn write_registry(contents: &str) -> (TempDir, PathBuf) {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("scripts.conf");
        fs::write(&path, contents).unwrap();
        (temp, path)
    }

    #[test]
    fn test_parse_scenario_a() {
        let (_temp, path) = write_registry(SCENARIO_A);
        let registry = Registry::parse(&path).unwrap();

        assert_eq!(registry.len(), 2);
        let greet = registry.get(0).unwrap();
        assert_eq!(greet.kind, Kind::Startup);
        assert_eq!(greet.status, Status::Enabled);
        assert_eq!(greet.alias, None);
        assert_eq!(greet.description, "greeting");
        assert_eq!(greet.filename, "greet.sh");
        assert_eq!(greet.line(), 1);

        let grep = registry.get(1).unwrap();
        assert_eq!(grep.kind, Kind::Tool);
        assert_eq!(grep.status, Status::Disabled);
        assert_eq!(grep.alias.as_deref(), Some("gr"));
        assert_eq!(grep.label(), "gr");
        assert!(registry.warnings().is_empty());
    }

    #[test]
    fn test_parse_is_deterministic() {
        let (_temp, path) = write_registry(SCENARIO_A);
        let first = Registry::parse(&path).unwrap();
        let second = Registry::parse(&path).unwrap();
        assert_eq!(first.entries(), second.entries());
    }

    #[test]
    fn test_malformed_line_is_a_warning() {
        let (_temp, path) = write_registry(
            "startup:enable::greeting:greet.sh\nnot a valid line\ntools:disable:gr:grep helper:g.sh\n",
        );
        let registry = Registry::parse(&path).unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.warnings().len(), 1);
        assert_eq!(registry.warnings()[0].line, 2);
        assert_eq!(registry.get(1).unwrap().line(), 3);
    }

    #[test]
    fn test_comments_and_whitespace() {
        let (_temp, path) = write_registry(
            "# header comment\n\n   \n  startup : enable :  : say hi : hi.sh   # trailing\n#tools:enable:x:y:z.sh\n",
        );
        let registry = Registry::parse(&path).unwrap();

        assert_eq!(registry.len(), 1);
        let entry = registry.get(0).unwrap();
        assert_eq!(entry.description, "say hi");
        assert_eq!(entry.filename, "hi.sh");
        assert_eq!(entry.raw(), "startup : enable :  : say hi : hi.sh");
        assert_eq!(entry.line(), 4);
    }

    #[test]
    fn test_empty_registry_parses() {
        let (_temp, path) = write_registry("# nothing here\n");
        let registry = Registry::parse(&path).unwrap();
        assert!(registry.is_empty());
        assert!(registry.warnings().is_empty());
    }

    #[rstest]
    #[case("startup:enable::desc:a.sh", Kind::Startup, Status::Enabled)]
    #[case("tools:disable:x:desc:a.sh", Kind::Tool, Status::Disabled)]
    #[case("tools:yes:x:desc:a.sh", Kind::Tool, Status::Disabled)]
    #[case("plugin:enable:x:desc:a.sh", Kind::Unknown("plugin".into()), Status::Enabled)]
    fn test_kind_and_status(#[case] line: &str, #[case] kind: Kind, #[case] status: Status) {
        let registry = Registry::from_contents(Path::new("r"), line);
        let entry = registry.get(0).unwrap();
        assert_eq!(entry.kind, kind);
        assert_eq!(entry.status, status);
    }

    #[rstest]
    #[case("startup:enable:greet.sh")]
    #[case("startup:enable::greeting:")]
    #[case("just text")]
    fn test_rejected_lines(#[case] line: &str) {
        let registry = Registry::from_contents(Path::new("r"), line);
        assert!(registry.is_empty());
        assert_eq!(registry.warnings().len(), 1);
    }

    #[test]
    fn test_filename_keeps_extra_colons() {
        let registry = Registry::from_contents(Path::new("r"), "tools:enable:t:desc:dir:name.sh");
        assert_eq!(registry.get(0).unwrap().filename, "dir:name.sh");
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let temp = TempDir::new().unwrap();
        let err = Registry::parse(&temp.path().join("absent.conf")).unwrap_err();
        assert!(matches!(err, ShelfError::NotFound { .. }));
    }

    #[test]
    fn test_unreadable_registry() {
        let temp = TempDir::new().unwrap();
        let err = Registry::parse(temp.path()).unwrap_err();

        assert!(matches!(err, ShelfError::Unreadable { .. }));
        assert!(err
            .to_string()
            .starts_with(&format!("{} is not readable", temp.path().display())));
    }

    #[test]
    fn test_toggle_flips_only_target() {
        let (_temp, path) = write_registry(SCENARIO_A);
        let registry = Registry::parse(&path).unwrap();

        let status = toggle(&path, 1, &registry).unwrap();
        assert_eq!(status, Status::Enabled);

        let reparsed = Registry::parse(&path).unwrap();
        assert_eq!(reparsed.get(0), registry.get(0));
        assert_eq!(reparsed.get(1).unwrap().status, Status::Enabled);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "startup:enable::greeting:greet.sh\ntools:enable:gr:grep helper:g.sh\n"
        );
        assert!(!fsutil::tmp_path(&path).exists());
    }

    #[rstest]
    #[case(-1)]
    #[case(2)]
    #[case(99)]
    fn test_toggle_out_of_range_leaves_file(#[case] index: i64) {
        let (_temp, path) = write_registry(SCENARIO_A);
        let registry = Registry::parse(&path).unwrap();

        let err = toggle(&path, index, &registry).unwrap_err();
        assert!(matches!(err, ShelfError::IndexOutOfRange { len: 2, .. }));
        assert_eq!(fs::read(&path).unwrap(), SCENARIO_A.as_bytes());
    }

    #[test]
    fn test_toggle_duplicate_lines_by_position() {
        let contents = "startup:enable::dup:d.sh\nstartup:enable::dup:d.sh\n";
        let (_temp, path) = write_registry(contents);
        let registry = Registry::parse(&path).unwrap();

        toggle(&path, 1, &registry).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "startup:enable::dup:d.sh\nstartup:disable::dup:d.sh\n"
        );
    }

    #[test]
    fn test_toggle_preserves_indent_and_comment() {
        let (_temp, path) = write_registry("  tools:disable:gr:grep helper:g.sh   # keep me\n");
        let registry = Registry::parse(&path).unwrap();

        toggle(&path, 0, &registry).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "  tools:enable:gr:grep helper:g.sh   # keep me\n"
        );
    }

    #[test]
    fn test_toggle_detects_stale_snapshot() {
        let (_temp, path) = write_registry(SCENARIO_A);
        let registry = Registry::parse(&path).unwrap();
        let changed = format!("# inserted\n{SCENARIO_A}");
        fs::write(&path, &changed).unwrap();

        let err = toggle(&path, 0, &registry).unwrap_err();
        assert!(matches!(err, ShelfError::StaleEntry { line: 1, .. }));
        assert!(err
            .to_string()
            .starts_with(&format!("Line 1 of {} no longer matches", path.display())));
        assert_eq!(fs::read_to_string(&path).unwrap(), changed);
    }

    #[test]
    fn test_toggle_write_failure_leaves_file() {
        let (_temp, path) = write_registry(SCENARIO_A);
        let registry = Registry::parse(&path).unwrap();
        fs::create_dir(fsutil::tmp_path(&path)).unwrap();

        let err = toggle(&path, 0, &registry).unwrap_err();

        assert!(matches!(err, ShelfError::WriteFailure { .. }));
        assert_eq!(fs::read(&path).unwrap(), SCENARIO_A.as_bytes());
    }

    #[test]
    fn test_rewrite_line_without_newline() {
        assert_eq!(rewrite_line("a:b:c:d:e", "x"), "x");
        assert_eq!(rewrite_line("a:b:c:d:e\r\n", "x"), "x\r\n");
    }
}
