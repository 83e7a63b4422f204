//! `wlang`: CLI front end for the While static analyzer.
//!
//! Two subcommands (§6): `cfg` dumps the control-flow graph as Graphviz, and
//! `analyze pinterval` runs the parametric-interval fixpoint analysis and
//! prints the resulting state at every program point. Following the
//! teacher's convention, each subcommand is implemented as a `run_*`
//! function returning a process exit code; `main` is the only place that
//! calls `process::exit`.

mod bound;
mod dot;
mod error;
mod init_file;

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use error::CliError;
use wlang_analysis::{cfg, threshold, worklist, AnalysisOptions};
use wlang_core::{parse, AbstractState, Bound, Domain, IntervalDomain, Params, VarTable};

/// Abstract interpreter for the minimal While imperative language.
#[derive(Parser)]
#[command(name = "wlang", about = "Abstract interpreter for the While language")]
struct Cli {
    /// Raise log verbosity to `debug` regardless of `RUST_LOG`.
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dump the control-flow graph of a program in Graphviz form.
    Cfg {
        /// Path to a While source file.
        source: PathBuf,
    },
    /// Run an analysis over a program.
    #[command(subcommand)]
    Analyze(AnalyzeCommands),
}

#[derive(Subcommand)]
enum AnalyzeCommands {
    /// Parametric-interval abstract interpretation.
    Pinterval {
        /// Path to a While source file.
        source: PathBuf,

        /// Lower domain parameter (integer, "-INF", or "+INF"). Default: -INF.
        ///
        /// Collected as a `Vec` (rather than a plain `Option`) purely so a
        /// repeated occurrence can be rejected below instead of clap's
        /// default last-value-wins behavior (§6: "a repeated option is a
        /// parse error").
        #[arg(long, allow_hyphen_values = true, action = clap::ArgAction::Append)]
        m: Vec<String>,

        /// Upper domain parameter (integer, "-INF", or "+INF"). Default: +INF.
        #[arg(long, allow_hyphen_values = true, action = clap::ArgAction::Append)]
        n: Vec<String>,

        /// Loop iterations before widening kicks in. Omit to disable widening.
        #[arg(long, action = clap::ArgAction::Append)]
        wdelay: Vec<u32>,

        /// Descending narrowing iterations after the ascending fixpoint.
        #[arg(long, action = clap::ArgAction::Append)]
        dsteps: Vec<u32>,

        /// Initial-state file (§6): one `var: TOP|BOTTOM|[LO,HI]` per line.
        #[arg(long, action = clap::ArgAction::Append)]
        init: Vec<PathBuf>,
    },
}

/// Rejects a repeated occurrence of a flag that clap's derive `Vec` collected
/// but which §6 requires to appear at most once.
fn at_most_one<T>(mut values: Vec<T>, flag: &str) -> Result<Option<T>, CliError> {
    match values.len() {
        0 => Ok(None),
        1 => Ok(Some(values.remove(0))),
        _ => Err(CliError::RepeatedFlag(flag.to_string())),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let exit_code = match cli.command {
        Commands::Cfg { source } => run_cfg(&source),
        Commands::Analyze(AnalyzeCommands::Pinterval {
            source,
            m,
            n,
            wdelay,
            dsteps,
            init,
        }) => run_analyze(&source, m, n, wdelay, dsteps, init),
    };
    process::exit(exit_code);
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn read_source(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::ReadSource {
        path: path.to_path_buf(),
        source,
    })
}

fn run_cfg(source: &Path) -> i32 {
    match run_cfg_inner(source) {
        Ok(dot) => {
            println!("{dot}");
            0
        }
        Err(e) => {
            eprintln!("error: {e}");
            1
        }
    }
}

fn run_cfg_inner(source: &Path) -> Result<String, CliError> {
    let text = read_source(source)?;
    let program = parse(&text)?;
    let vars = VarTable::from_program(&program);
    let graph = cfg::build(&program, &vars);
    Ok(dot::render(&graph, &vars))
}

#[allow(clippy::too_many_arguments)]
fn run_analyze(
    source: &Path,
    m: Vec<String>,
    n: Vec<String>,
    wdelay: Vec<u32>,
    dsteps: Vec<u32>,
    init: Vec<PathBuf>,
) -> i32 {
    match run_analyze_inner(source, m, n, wdelay, dsteps, init) {
        Ok(report) => {
            println!("{report}");
            0
        }
        Err(e) => {
            eprintln!("error: {e}");
            1
        }
    }
}

fn run_analyze_inner(
    source: &Path,
    m: Vec<String>,
    n: Vec<String>,
    wdelay: Vec<u32>,
    dsteps: Vec<u32>,
    init: Vec<PathBuf>,
) -> Result<String, CliError> {
    let m = at_most_one(m, "m")?;
    let n = at_most_one(n, "n")?;
    let wdelay = at_most_one(wdelay, "wdelay")?;
    let dsteps = at_most_one(dsteps, "dsteps")?.unwrap_or(0);
    let init = at_most_one(init, "init")?;

    let m = m.as_deref().map(bound::parse_bound).transpose()?.unwrap_or(Bound::NegInf);
    let n = n.as_deref().map(bound::parse_bound).transpose()?.unwrap_or(Bound::PosInf);
    let params = Params::new(m, n);

    let text = read_source(source)?;
    let program = parse(&text)?;
    let vars = VarTable::from_program(&program);
    let graph = cfg::build(&program, &vars);
    let thresholds = threshold::collect(&program, &vars);
    let domain = IntervalDomain::new(params, &vars, &thresholds);

    let init_state = match init {
        Some(path) => {
            let content = read_source(&path)?;
            Some(init_file::apply(&content, &vars, params, domain.top()))
        }
        None => None,
    };

    let options = AnalysisOptions {
        widening_delay: wdelay,
        descending_steps: dsteps,
    };
    let result = worklist::analyze(&graph, &domain, &options, init_state);

    Ok(render_report(&graph, &vars, &result, &options, params))
}

fn render_report(
    graph: &cfg::Cfg,
    vars: &VarTable,
    result: &worklist::StateVector<AbstractState>,
    options: &AnalysisOptions,
    params: Params,
) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    writeln!(
        out,
        "m={}, n={}, wdelay={}, dsteps={}",
        params.m,
        params.n,
        options
            .widening_delay
            .map_or("disabled".to_string(), |d| d.to_string()),
        options.descending_steps
    )
    .unwrap();

    for node in graph.nodes() {
        writeln!(out, "[P{}]", node.index()).unwrap();
        let state = result.get(node);
        for (id, name) in vars.iter() {
            writeln!(out, "  {name} = {}", state[id]).unwrap();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_m_flag_is_a_parse_error() {
        let err = run_analyze_inner(
            Path::new("/tmp/does-not-matter.w"),
            vec!["0".to_string(), "1".to_string()],
            vec![],
            vec![],
            vec![],
            vec![],
        )
        .unwrap_err();
        assert!(matches!(err, CliError::RepeatedFlag(flag) if flag == "m"));
    }

    #[test]
    fn repeated_init_flag_is_a_parse_error() {
        let err = run_analyze_inner(
            Path::new("/tmp/does-not-matter.w"),
            vec![],
            vec![],
            vec![],
            vec![],
            vec![PathBuf::from("a"), PathBuf::from("b")],
        )
        .unwrap_err();
        assert!(matches!(err, CliError::RepeatedFlag(flag) if flag == "init"));
    }

    #[test]
    fn single_occurrence_of_each_flag_is_accepted() {
        assert_eq!(at_most_one(Vec::<u32>::new(), "wdelay").unwrap(), None);
        assert_eq!(at_most_one(vec![3u32], "wdelay").unwrap(), Some(3));
    }
}
