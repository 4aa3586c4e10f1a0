use tokio::io::AsyncReadExt;
use tracing::warn;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use gridscript::cli::{self, ConfigFile, ScriptSource};
use gridscript::config::{self, RunConfig};
use gridscript::grid::Grid;
use gridscript::script::Interpreter;

const USAGE: &str = "Usage: gridscript [-f[<file>]] [-D<name>=<value>] [-x<delay_ms>] [-dq] [<script>|-]";

#[tokio::main]
async fn main() {
    let args = match cli::parse_args() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("gridscript: {e}");
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    };

    init_tracing(args.debug);

    // ── Load config ───────────────────────────────────────────────────────────
    let path = match args.config {
        ConfigFile::Skip => None, // -f alone: skip config
        ConfigFile::Explicit(path) => Some(path),
        ConfigFile::Search => config::find_config(),
    };
    let mut run_config = match path {
        None => RunConfig::default(),
        Some(path) => match RunConfig::load_file(&path) {
            Ok((cfg, errors)) => {
                for e in errors {
                    warn!(file = %path.display(), "{e}");
                }
                cfg
            }
            Err(e) => {
                eprintln!("gridscript: {}: {e}", path.display());
                std::process::exit(2);
            }
        },
    };
    if let Some(ms) = args.step_delay_ms {
        run_config.step_delay_ms = ms;
    }
    for (name, value) in args.defines {
        run_config.presets.set(name, value);
    }

    // ── Read script ───────────────────────────────────────────────────────────
    let source = match &args.script {
        ScriptSource::File(path) => tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("{}: {e}", path.display())),
        ScriptSource::Stdin => {
            let mut s = String::new();
            tokio::io::stdin()
                .read_to_string(&mut s)
                .await
                .map(|_| s)
                .map_err(|e| format!("stdin: {e}"))
        }
    };
    let source = match source {
        Ok(s) => s,
        Err(e) => {
            eprintln!("gridscript: {e}");
            std::process::exit(2);
        }
    };

    // ── Run ───────────────────────────────────────────────────────────────────
    let mut grid = Grid::from_config(&run_config);
    if !args.quiet {
        grid = grid.with_observer(|mv| println!("{mv}"));
    }

    let mut interp = Interpreter::new(grid.commands()).with_max_depth(run_config.max_depth);
    let result = interp.run_with(&source, run_config.presets).await;

    let (x, y) = grid.position();
    if !args.quiet {
        println!("position: ({x}, {y})");
    }
    if let (Some(line), Some(message)) = (result.line, result.error_message()) {
        eprintln!("gridscript: line {line}: {message}");
        std::process::exit(1);
    }
}

/// Log to stderr, filtered by `RUST_LOG` (default `gridscript=warn`).
fn init_tracing(debug: bool) {
    let default = if debug { "gridscript=debug" } else { "gridscript=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(filter)
        .init();
}
