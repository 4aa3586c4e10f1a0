//! Command-line argument parsing.
//!
//! Usage:
//!   gridscript [-f[<file>]] [-D<name>=<value>]… [-x<delay_ms>] [-dq] [<script>|-]

use std::path::PathBuf;

// ── Public types ──────────────────────────────────────────────────────────────

/// Parsed command-line arguments.
#[derive(Debug, Default)]
pub struct CliArgs {
    /// Which config file to load.
    pub config: ConfigFile,
    /// Preset variables from `-D name=value`, in command-line order.
    pub defines: Vec<(String, i64)>,
    /// Step delay override in milliseconds (`-x<ms>`).
    pub step_delay_ms: Option<u64>,
    /// Debug logging (`-d`).
    pub debug: bool,
    /// Don't print the position trace (`-q`).
    pub quiet: bool,
    /// Where to read the script from.
    pub script: ScriptSource,
}

/// How to choose the config file.
#[derive(Debug, Default)]
pub enum ConfigFile {
    /// `$GRIDSCRIPT_CONFIG`, `./.gridscriptrc`, then the platform config dir.
    #[default]
    Search,
    /// `-f` with no file argument: skip config.
    Skip,
    /// `-f<file>`: load this specific file.
    Explicit(PathBuf),
}

/// Where the script text comes from.
#[derive(Debug, Default, PartialEq, Eq)]
pub enum ScriptSource {
    /// No path, or `-`.
    #[default]
    Stdin,
    File(PathBuf),
}

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Parse `std::env::args()` and return [`CliArgs`] or an error message.
pub fn parse_args() -> Result<CliArgs, String> {
    let raw: Vec<String> = std::env::args().collect();
    parse_argv(raw.get(1..).unwrap_or_default())
}

/// Parse a slice of argument strings (exposed for testing).
pub fn parse_argv(argv: &[String]) -> Result<CliArgs, String> {
    let mut args = CliArgs::default();
    let mut positional: Vec<String> = Vec::new();
    let mut i = 0;

    while i < argv.len() {
        let arg = argv[i].as_str();

        // `--` ends flag processing.
        if arg == "--" {
            i += 1;
            positional.extend(argv[i..].iter().cloned());
            break;
        }

        // Non-flag argument.
        if !arg.starts_with('-') || arg == "-" {
            positional.push(arg.to_owned());
            i += 1;
            continue;
        }

        // Flag argument: iterate over characters after the leading `-`.
        let chars: Vec<char> = arg[1..].chars().collect();
        let mut j = 0;
        while j < chars.len() {
            match chars[j] {
                'd' => args.debug = true,
                'q' => args.quiet = true,

                // -f[<file>]
                'f' => {
                    if j + 1 < chars.len() {
                        // Embedded: -f<file>
                        let file: String = chars[j + 1..].iter().collect();
                        args.config = ConfigFile::Explicit(PathBuf::from(file));
                        j = chars.len(); // consumed rest of this arg
                    } else if i + 1 < argv.len() && !argv[i + 1].starts_with('-') {
                        // Separate: -f <file>
                        i += 1;
                        args.config = ConfigFile::Explicit(PathBuf::from(&argv[i]));
                    } else {
                        // -f alone → skip config
                        args.config = ConfigFile::Skip;
                    }
                }

                // -D<name>=<value>
                'D' => {
                    let def = if j + 1 < chars.len() {
                        let s: String = chars[j + 1..].iter().collect();
                        j = chars.len();
                        s
                    } else if i + 1 < argv.len() {
                        i += 1;
                        argv[i].clone()
                    } else {
                        return Err("-D requires a name=value argument".to_owned());
                    };
                    args.defines.push(parse_define(&def)?);
                }

                // -x<delay_ms>
                'x' => {
                    let ms = if j + 1 < chars.len() {
                        let s: String = chars[j + 1..].iter().collect();
                        j = chars.len();
                        s
                    } else if i + 1 < argv.len() {
                        i += 1;
                        argv[i].clone()
                    } else {
                        return Err("-x requires a delay in milliseconds".to_owned());
                    };
                    let ms: u64 = ms
                        .parse()
                        .map_err(|_| format!("invalid step delay: {ms}"))?;
                    args.step_delay_ms = Some(ms);
                }

                c => return Err(format!("unknown option: -{c}")),
            }
            j += 1;
        }
        i += 1;
    }

    // Positional argument → script source.
    match positional.len() {
        0 => {}
        1 => {
            let path = positional.remove(0);
            if path != "-" {
                args.script = ScriptSource::File(PathBuf::from(path));
            }
        }
        n => return Err(format!("too many arguments ({n})")),
    }

    Ok(args)
}

/// Parse `name=value` into a preset variable.
fn parse_define(s: &str) -> Result<(String, i64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("-D expects name=value, got '{s}'"))?;
    let name = name.trim();
    if !crate::script::token::is_identifier(name) {
        return Err(format!("invalid variable name: '{name}'"));
    }
    let value: i64 = value
        .trim()
        .parse()
        .map_err(|_| format!("value of '{name}' is not an integer: '{}'", value.trim()))?;
    Ok((name.to_owned(), value))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|&s| s.to_owned()).collect()
    }

    #[test]
    fn empty_args() {
        let a = parse_argv(&argv(&[])).unwrap();
        assert!(!a.debug);
        assert!(matches!(a.config, ConfigFile::Search));
        assert_eq!(a.script, ScriptSource::Stdin);
    }

    #[test]
    fn script_positional() {
        let a = parse_argv(&argv(&["walk.gs"])).unwrap();
        assert_eq!(a.script, ScriptSource::File(PathBuf::from("walk.gs")));

        let a = parse_argv(&argv(&["-"])).unwrap();
        assert_eq!(a.script, ScriptSource::Stdin);
    }

    #[test]
    fn bool_flags() {
        let a = parse_argv(&argv(&["-d", "-q"])).unwrap();
        assert!(a.debug);
        assert!(a.quiet);

        let a = parse_argv(&argv(&["-dq"])).unwrap();
        assert!(a.debug && a.quiet);
    }

    #[test]
    fn config_skip() {
        let a = parse_argv(&argv(&["-f"])).unwrap();
        assert!(matches!(a.config, ConfigFile::Skip));
    }

    #[test]
    fn config_explicit_embedded() {
        let a = parse_argv(&argv(&["-fgrid.rc"])).unwrap();
        assert!(matches!(&a.config, ConfigFile::Explicit(p) if p == &PathBuf::from("grid.rc")));
    }

    #[test]
    fn config_explicit_separate() {
        let a = parse_argv(&argv(&["-f", "grid.rc", "walk.gs"])).unwrap();
        assert!(matches!(&a.config, ConfigFile::Explicit(p) if p == &PathBuf::from("grid.rc")));
        assert_eq!(a.script, ScriptSource::File(PathBuf::from("walk.gs")));
    }

    #[test]
    fn defines() {
        let a = parse_argv(&argv(&["-Dspeed=3", "-D", "step = -2"])).unwrap();
        assert_eq!(a.defines, vec![("speed".to_owned(), 3), ("step".to_owned(), -2)]);
    }

    #[test]
    fn bad_defines() {
        assert!(parse_argv(&argv(&["-Dspeed"])).is_err());
        assert!(parse_argv(&argv(&["-D1x=3"])).is_err());
        assert!(parse_argv(&argv(&["-Dspeed=fast"])).is_err());
        assert!(parse_argv(&argv(&["-D"])).is_err());
    }

    #[test]
    fn step_delay() {
        let a = parse_argv(&argv(&["-x0"])).unwrap();
        assert_eq!(a.step_delay_ms, Some(0));
        let a = parse_argv(&argv(&["-x", "120"])).unwrap();
        assert_eq!(a.step_delay_ms, Some(120));
        assert!(parse_argv(&argv(&["-xsoon"])).is_err());
    }

    #[test]
    fn too_many_positional() {
        assert!(parse_argv(&argv(&["a", "b"])).is_err());
    }

    #[test]
    fn unknown_flag() {
        assert!(parse_argv(&argv(&["-z"])).is_err());
    }
}
