//! Run configuration file parser.
//!
//! One directive per line:
//!
//! | Directive | Action |
//! |-----------|--------|
//! | `cols = <n>` / `rows = <n>` | board size |
//! | `start_x = <n>` / `start_y = <n>` | actor start cell |
//! | `step_delay_ms = <n>` | pause after every move |
//! | `max_depth = <n>` | nesting bound for blocks and calls |
//! | `var <name> = <int>` | preset script variable |
//! | Lines starting with `;` or `#` | comment, ignored |
//!
//! Malformed lines are reported as [`ConfigError`]s and skipped; the rest of
//! the file still loads.

use std::path::{Path, PathBuf};

use crate::script::interp::DEFAULT_MAX_DEPTH;
use crate::script::token::is_identifier;
use crate::var::Variables;

/// Environment variable naming a config file to use.
pub const CONFIG_ENV: &str = "GRIDSCRIPT_CONFIG";

/// Config file looked for in the working directory.
pub const LOCAL_CONFIG: &str = ".gridscriptrc";

// ── Public API ────────────────────────────────────────────────────────────────

/// A non-fatal error encountered while loading a config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub line: usize,
    pub message: String,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Settings for one `gridscript` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub cols: i64,
    pub rows: i64,
    pub start_x: i64,
    pub start_y: i64,
    pub step_delay_ms: u64,
    pub max_depth: usize,
    /// Variables the script starts with.
    pub presets: Variables,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            cols: 15,
            rows: 15,
            start_x: 7,
            start_y: 7,
            step_delay_ms: 450,
            max_depth: DEFAULT_MAX_DEPTH,
            presets: Variables::new(),
        }
    }
}

impl RunConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config string.
    ///
    /// Returns the config and a list of errors for the lines that were
    /// skipped.
    pub fn load_str(s: &str) -> (Self, Vec<ConfigError>) {
        let mut config = RunConfig::new();
        let mut errors = Vec::new();

        for (i, raw) in s.lines().enumerate() {
            let line = raw.trim();

            // blank lines and comments
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            if let Err(message) = config.apply_line(line) {
                errors.push(ConfigError { line: i + 1, message });
            }
        }

        (config, errors)
    }

    /// Read and parse a config file from disk.
    pub fn load_file(path: &Path) -> std::io::Result<(Self, Vec<ConfigError>)> {
        let s = std::fs::read_to_string(path)?;
        Ok(Self::load_str(&s))
    }

    fn apply_line(&mut self, line: &str) -> Result<(), String> {
        let (lhs, value) = line
            .split_once('=')
            .ok_or_else(|| format!("expected 'key = value', got '{line}'"))?;
        let value = value.trim();

        if let Some(name) = lhs.trim().strip_prefix("var") {
            // `var` must be followed by whitespace; `variance = 3` is a key.
            if name.starts_with(|c: char| c.is_ascii_whitespace()) {
                let name = name.trim();
                if !is_identifier(name) || matches!(name, "true" | "false") {
                    return Err(format!("invalid variable name: '{name}'"));
                }
                self.presets.set(name, parse_num(name, value)?);
                return Ok(());
            }
        }

        let key = lhs.trim();
        match key {
            "cols" => self.cols = parse_positive(key, value)?,
            "rows" => self.rows = parse_positive(key, value)?,
            "start_x" => self.start_x = parse_num(key, value)?,
            "start_y" => self.start_y = parse_num(key, value)?,
            "step_delay_ms" => self.step_delay_ms = parse_num(key, value)?,
            "max_depth" => self.max_depth = parse_num(key, value)?,
            _ => return Err(format!("unknown setting '{key}'")),
        }
        Ok(())
    }
}

fn parse_num<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, String> {
    value
        .parse()
        .map_err(|_| format!("{key}: invalid number '{value}'"))
}

fn parse_positive(key: &str, value: &str) -> Result<i64, String> {
    let n: i64 = parse_num(key, value)?;
    if n < 1 {
        return Err(format!("{key}: must be at least 1, got {n}"));
    }
    Ok(n)
}

// ── Path helpers ──────────────────────────────────────────────────────────────

/// Search for the config file in the standard locations.
///
/// Order: `$GRIDSCRIPT_CONFIG`, `./.gridscriptrc`, then `config` in the
/// platform configuration directory.  Returns the first path that exists.
pub fn find_config() -> Option<PathBuf> {
    let from_env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
    let platform = directories::ProjectDirs::from("", "", "gridscript")
        .map(|dirs| dirs.config_dir().join("config"));

    from_env
        .into_iter()
        .chain(std::iter::once(PathBuf::from(LOCAL_CONFIG)))
        .chain(platform)
        .find(|p| p.exists())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let c = RunConfig::default();
        assert_eq!((c.cols, c.rows), (15, 15));
        assert_eq!((c.start_x, c.start_y), (7, 7));
        assert_eq!(c.step_delay_ms, 450);
        assert_eq!(c.max_depth, DEFAULT_MAX_DEPTH);
        assert!(c.presets.is_empty());
    }

    #[test]
    fn settings() {
        let (c, errs) = RunConfig::load_str(
            "cols = 20\nrows=10\nstart_x = 0\nstart_y = 9\nstep_delay_ms = 0\nmax_depth = 32",
        );
        assert!(errs.is_empty(), "{errs:?}");
        assert_eq!((c.cols, c.rows, c.start_x, c.start_y), (20, 10, 0, 9));
        assert_eq!(c.step_delay_ms, 0);
        assert_eq!(c.max_depth, 32);
    }

    #[test]
    fn preset_variables() {
        let (c, errs) = RunConfig::load_str("var speed = 3\nvar  offset=-2");
        assert!(errs.is_empty(), "{errs:?}");
        assert_eq!(c.presets.get("speed"), Some(3));
        assert_eq!(c.presets.get("offset"), Some(-2));
    }

    #[test]
    fn comments_and_blanks_ignored() {
        let (c, errs) = RunConfig::load_str(
            ";; grid setup\n\
             # also a comment\n\
             \n\
             cols = 9",
        );
        assert!(errs.is_empty(), "{errs:?}");
        assert_eq!(c.cols, 9);
    }

    #[test]
    fn bad_lines_reported_and_skipped() {
        let (c, errs) = RunConfig::load_str(
            "cols = wide\n\
             rows = 0\n\
             colour = red\n\
             var 2x = 1\n\
             just words\n\
             start_x = 3",
        );
        assert_eq!(errs.iter().map(|e| e.line).collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
        assert_eq!(c.cols, 15);
        assert_eq!(c.rows, 15);
        assert_eq!(c.start_x, 3);
        assert_eq!(errs[2].to_string(), "line 3: unknown setting 'colour'");
    }

    #[test]
    fn var_prefix_is_not_a_directive_without_space() {
        let (_, errs) = RunConfig::load_str("variance = 3");
        assert_eq!(errs.len(), 1);
        assert!(errs[0].message.contains("variance"));
    }

    #[test]
    fn load_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "step_delay_ms = 5\nvar lap = 4").unwrap();
        let (c, errs) = RunConfig::load_file(file.path()).unwrap();
        assert!(errs.is_empty(), "{errs:?}");
        assert_eq!(c.step_delay_ms, 5);
        assert_eq!(c.presets.get("lap"), Some(4));
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(RunConfig::load_file(&dir.path().join("absent")).is_err());
    }
}
