use pedflow_core::{
    AnalysisConfig, CellSize, DiagramReport, FrameRange, FrameWindow, Geometry, InputFormat,
    ProfileReport, ResolvedWindow, detect_format, diagram_report, export, observed_range,
    parse_geometry, parse_ifd, parse_trajectory_txt, pedestrian_count_series, profile_report,
    resolve_window,
};
use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Core(pedflow_core::Error),
    Json(serde_json::Error),
    WrongInput {
        path: String,
        expected: &'static str,
        found: InputFormat,
    },
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Core(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::WrongInput {
                path,
                expected,
                found,
            } => write!(f, "{path}: expected {expected}, found {found:?} content"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<pedflow_core::Error> for CliError {
    fn from(value: pedflow_core::Error) -> Self {
        Self::Core(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Profiles,
    Diagram,
    Window,
    Count,
    Detect,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    geometry: Option<String>,
    ifd: Option<String>,
    trajectory: Option<String>,
    input: Option<String>,
    config: Option<String>,
    dx: Option<f64>,
    dy: Option<f64>,
    begin: Option<i64>,
    end: Option<i64>,
    framerate: Option<f64>,
    out_dir: Option<String>,
    pretty: bool,
    verbose: bool,
}

#[derive(Serialize)]
struct ProfilesOut<'a> {
    geometry: &'a Geometry,
    profile: &'a ProfileReport,
}

#[derive(Serialize)]
struct WindowOut {
    observed: FrameRange,
    window: ResolvedWindow,
}

fn usage() -> &'static str {
    "pedflow-cli\n\
\n\
USAGE:\n\
  pedflow-cli [profiles] --geometry <xml> --ifd <path> [--cell <size>] [--dx <x>] [--dy <y>] [--begin <frame>] [--end <frame>] [--config <json>] [--out-dir <dir>] [--pretty]\n\
  pedflow-cli diagram --ifd <path> [--begin <frame>] [--end <frame>] [--config <json>] [--out-dir <dir>] [--pretty]\n\
  pedflow-cli window --ifd <path> [--begin <frame>] [--end <frame>]\n\
  pedflow-cli count --trajectory <path> [--framerate <fps>] [--out-dir <dir>] [--pretty]\n\
  pedflow-cli detect [<path>|-]\n\
\n\
NOTES:\n\
  - Results are printed as JSON; --out-dir writes tab-separated .dat files instead.\n\
  - --dx/--dy/--begin/--end override the values from --config.\n\
  - count accepts a plain-text trajectory or an IFD file (identified by content).\n\
  - Set RUST_LOG (e.g. RUST_LOG=pedflow_core=debug) or pass --verbose for diagnostics.\n\
"
}

fn next_value<'a>(it: &mut impl Iterator<Item = &'a String>) -> Result<&'a String, CliError> {
    it.next().ok_or(CliError::Usage(usage()))
}

fn parse_num<T: std::str::FromStr>(raw: &str) -> Result<T, CliError> {
    raw.trim().parse::<T>().map_err(|_| CliError::Usage(usage()))
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1).peekable();
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "profiles" => args.command = Command::Profiles,
            "diagram" => args.command = Command::Diagram,
            "window" => args.command = Command::Window,
            "count" => args.command = Command::Count,
            "detect" => args.command = Command::Detect,
            "--pretty" => args.pretty = true,
            "--verbose" | "-v" => args.verbose = true,
            "--geometry" => args.geometry = Some(next_value(&mut it)?.clone()),
            "--ifd" => args.ifd = Some(next_value(&mut it)?.clone()),
            "--trajectory" => args.trajectory = Some(next_value(&mut it)?.clone()),
            "--config" => args.config = Some(next_value(&mut it)?.clone()),
            "--out-dir" => args.out_dir = Some(next_value(&mut it)?.clone()),
            "--cell" => {
                let size: f64 = parse_num(next_value(&mut it)?)?;
                args.dx = Some(size);
                args.dy = Some(size);
            }
            "--dx" => args.dx = Some(parse_num(next_value(&mut it)?)?),
            "--dy" => args.dy = Some(parse_num(next_value(&mut it)?)?),
            "--begin" => args.begin = Some(parse_num(next_value(&mut it)?)?),
            "--end" => args.end = Some(parse_num(next_value(&mut it)?)?),
            "--framerate" => {
                let fps: f64 = parse_num(next_value(&mut it)?)?;
                if !(fps.is_finite() && fps > 0.0) {
                    return Err(CliError::Usage(usage()));
                }
                args.framerate = Some(fps);
            }
            other if other.starts_with('-') && other != "-" => {
                return Err(CliError::Usage(usage()));
            }
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn required<'a>(value: &'a Option<String>) -> Result<&'a str, CliError> {
    value.as_deref().ok_or(CliError::Usage(usage()))
}

/// Reads `path` and checks that its content is `expected`.
fn read_checked(
    path: &str,
    expected: InputFormat,
    expected_name: &'static str,
) -> Result<String, CliError> {
    let text = read_input(Some(path))?;
    let found = detect_format(&text)?;
    if found != expected {
        return Err(CliError::WrongInput {
            path: path.to_string(),
            expected: expected_name,
            found,
        });
    }
    Ok(text)
}

fn build_config(args: &Args) -> Result<AnalysisConfig, CliError> {
    let mut config = match args.config.as_deref() {
        Some(path) => AnalysisConfig::from_json_str(&read_input(Some(path))?)?,
        None => AnalysisConfig::default(),
    };
    let cell = CellSize {
        dx: args.dx.unwrap_or(config.cell_size.dx),
        dy: args.dy.unwrap_or(config.cell_size.dy),
    };
    let window = FrameWindow::new(
        args.begin.or(config.window.begin),
        args.end.or(config.window.end),
    );
    config = config.with_cell_size(cell).with_window(window);
    Ok(config)
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    use std::io::Write;
    let mut out = std::io::stdout().lock();
    if pretty {
        serde_json::to_writer_pretty(&mut out, value)?;
    } else {
        serde_json::to_writer(&mut out, value)?;
    }
    writeln!(out)?;
    Ok(())
}

fn write_files(dir: &str, files: &[(&str, String)]) -> Result<(), CliError> {
    let dir = PathBuf::from(dir);
    std::fs::create_dir_all(&dir)?;
    for (name, text) in files {
        let path = dir.join(name);
        std::fs::write(&path, text)?;
        tracing::info!(path = %path.display(), "wrote");
    }
    Ok(())
}

fn load_samples(args: &Args) -> Result<Vec<pedflow_core::Sample>, CliError> {
    let path = required(&args.ifd)?;
    let text = read_checked(path, InputFormat::IndividualFd, "IFD data")?;
    Ok(parse_ifd(&text)?)
}

fn run_profiles(args: &Args) -> Result<(), CliError> {
    let config = build_config(args)?;
    let geometry_path = required(&args.geometry)?;
    let geometry = parse_geometry(&read_checked(
        geometry_path,
        InputFormat::Geometry,
        "geometry XML",
    )?)?;
    let samples = load_samples(args)?;
    let report = profile_report(&geometry, &samples, &config)?;

    match args.out_dir.as_deref() {
        Some(dir) => write_files(
            dir,
            &[
                (
                    "density_profile.dat",
                    export::field_to_tsv(&report.fields.density),
                ),
                (
                    "velocity_profile.dat",
                    export::field_to_tsv(&report.fields.velocity),
                ),
                ("x_edges.dat", export::edges_to_tsv(&report.grid.x)),
                ("y_edges.dat", export::edges_to_tsv(&report.grid.y)),
            ],
        ),
        None => write_json(
            &ProfilesOut {
                geometry: &geometry,
                profile: &report,
            },
            args.pretty,
        ),
    }
}

fn run_diagram(args: &Args) -> Result<(), CliError> {
    let config = build_config(args)?;
    let samples = load_samples(args)?;
    let report: DiagramReport = diagram_report(&samples, &config)?;

    match args.out_dir.as_deref() {
        Some(dir) => write_files(
            dir,
            &[
                ("rho_v.dat", export::frame_series_to_tsv(&report.series)),
                (
                    "diagram_points.dat",
                    export::diagram_points_to_tsv(&report.points),
                ),
            ],
        ),
        None => write_json(&report, args.pretty),
    }
}

fn run_window(args: &Args) -> Result<(), CliError> {
    let config = build_config(args)?;
    let samples = load_samples(args)?;
    let observed = observed_range(&samples)?;
    let window = resolve_window(observed, config.window)?;
    write_json(&WindowOut { observed, window }, args.pretty)
}

fn run_count(args: &Args) -> Result<(), CliError> {
    let path = required(&args.trajectory)?;
    let text = read_input(Some(path))?;
    let counts = match detect_format(&text)? {
        InputFormat::TrajectoryText => {
            let traj = parse_trajectory_txt(&text)?;
            pedestrian_count_series(&traj.points, args.framerate.or(traj.framerate))
        }
        InputFormat::IndividualFd => {
            let samples = parse_ifd(&text)?;
            pedestrian_count_series(&samples, args.framerate)
        }
        found => {
            return Err(CliError::WrongInput {
                path: path.to_string(),
                expected: "trajectory text or IFD data",
                found,
            });
        }
    };

    match args.out_dir.as_deref() {
        Some(dir) => write_files(dir, &[("N_t.dat", export::count_series_to_tsv(&counts))]),
        None => write_json(&counts, args.pretty),
    }
}

fn run_detect(args: &Args) -> Result<(), CliError> {
    let text = read_input(args.input.as_deref())?;
    let format = detect_format(&text)?;
    let name = serde_json::to_value(format)?;
    println!("{}", name.as_str().unwrap_or_default());
    Ok(())
}

fn run(args: Args) -> Result<(), CliError> {
    match args.command {
        Command::Profiles => run_profiles(&args),
        Command::Diagram => run_diagram(&args),
        Command::Window => run_window(&args),
        Command::Count => run_count(&args),
        Command::Detect => run_detect(&args),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "pedflow_core=debug,pedflow_cli=debug"
    } else {
        "pedflow_core=warn,pedflow_cli=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn exit_code(err: &CliError) -> i32 {
    match err {
        CliError::Usage(_) => 2,
        CliError::Core(pedflow_core::Error::UnknownFormat(_)) | CliError::WrongInput { .. } => 3,
        _ => 1,
    }
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(exit_code(&err));
        }
    };

    init_tracing(args.verbose);

    if let Err(err) = run(args) {
        tracing::debug!(error = ?err, "command failed");
        eprintln!("{err}");
        std::process::exit(exit_code(&err));
    }
}
