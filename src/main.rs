//! Sensorless vector control of a 2.2-kW induction motor drive fed by a
//! three-level converter.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::{info, LevelFilter};
use motorsim::{config::DemoConfig, export, plot, plot_extra, Simulation};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

#[derive(Debug, Parser)]
#[command(author, version, about = "Vector control of a 2.2-kW induction motor with three-level PWM")]
struct Cli {
    /// JSON file overriding the default scenario
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output directory for the plots
    #[arg(long, default_value = "output")]
    output: PathBuf,

    /// Simulation stop time in seconds
    #[arg(long)]
    t_stop: Option<f64>,

    /// Number of converter levels per phase (2 or 3)
    #[arg(long)]
    n_levels: Option<usize>,

    /// Apply averaged voltages instead of simulating the switching
    #[arg(long)]
    no_pwm: bool,

    /// Use the measured rotor speed
    #[arg(long)]
    sensored: bool,

    /// Plot in SI units instead of per unit
    #[arg(long)]
    si: bool,

    /// Also write the recorded signals as CSV
    #[arg(long)]
    csv: bool,

    /// Log progress and field-weakening transitions
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    TermLogger::init(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto)?;

    let mut cfg = match &cli.config {
        Some(path) => DemoConfig::from_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => DemoConfig::default(),
    };
    if let Some(v) = cli.t_stop {
        cfg.t_stop = v;
    }
    if let Some(v) = cli.n_levels {
        cfg.n_levels = v;
    }
    if cli.no_pwm {
        cfg.pwm = false;
    }
    if cli.sensored {
        cfg.sensorless = false;
    }

    let base = cfg.base();
    let (mdl, ctrl) = cfg.build()?;
    let result = Simulation::new(mdl, ctrl, cfg.pwm).simulate(cfg.t_stop)?;

    let base = (!cli.si).then_some(&base);
    let plot_path = cli.output.join("vector_ctrl.png");
    plot(&result, base, &plot_path)?;
    info!("plot: {}", plot_path.display());

    if cfg.t_span.0 < result.t_end() {
        let extra_path = cli.output.join("vector_ctrl_extra.png");
        plot_extra(&result, cfg.t_span, base, &extra_path)?;
        info!("zoomed plot: {}", extra_path.display());
    }

    if cli.csv {
        export::write_csv(&result, &cli.output)?;
        info!("signals: {}", cli.output.display());
    }

    Ok(())
}
