//! Plotting of simulation results.

use std::fs;
use std::path::Path;

use num_complex::Complex64;
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::{control::ControlSample, model::PlantSample, BaseValues, SimulationResult};

/// Scaling of the plotted signals: per unit, or SI with mechanical speeds.
struct Scale {
    u: f64,
    i: f64,
    w: f64,
    psi: f64,
    tau: f64,
    n_p: f64,
    per_unit: bool,
}

impl Scale {
    fn new(base: Option<&BaseValues>, n_p: u32) -> Self {
        let n_p = n_p as f64;
        match base {
            Some(base) => Self {
                u: base.u,
                i: base.i,
                w: base.w,
                psi: base.psi,
                tau: base.tau,
                n_p,
                per_unit: true,
            },
            None => Self {
                u: 1.,
                i: 1.,
                w: n_p,
                psi: 1.,
                tau: 1.,
                n_p,
                per_unit: false,
            },
        }
    }

    /// Axis label with the unit of the scaling.
    fn desc(&self, name: &str, si: &str) -> String {
        if self.per_unit {
            format!("{name} (p.u.)")
        } else {
            format!("{name} ({si})")
        }
    }
}

struct Trace {
    label: &'static str,
    color: RGBColor,
    points: Vec<(f64, f64)>,
}

impl Trace {
    fn new(label: &'static str, color: RGBColor, points: Vec<(f64, f64)>) -> Self {
        Self {
            label,
            color,
            points,
        }
    }
}

/// Range covering all points, padded so that flat signals stay visible.
fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    if lo > hi {
        (-1., 1.)
    } else if hi - lo < 1e-9 {
        (lo - 1., hi + 1.)
    } else {
        let pad = 0.05 * (hi - lo);
        (lo - pad, hi + pad)
    }
}

fn draw_panel(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    x_desc: &str,
    y_desc: &str,
    traces: &[Trace],
) -> anyhow::Result<()> {
    let points = || traces.iter().flat_map(|trace| trace.points.iter());
    let (x0, x1) = bounds(points().map(|p| p.0));
    let (y0, y1) = bounds(points().map(|p| p.1));

    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc(y_desc)
        .draw()?;

    for trace in traces {
        let color = trace.color;
        chart
            .draw_series(LineSeries::new(trace.points.iter().copied(), &color))?
            .label(trace.label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .border_style(BLACK)
        .background_style(WHITE.mix(0.7))
        .draw()?;

    Ok(())
}

/// Plot the speeds, torques, currents, voltage and flux of a simulation.
///
/// Quantities are per unit when `base` is given, SI otherwise.
pub fn plot(result: &SimulationResult, base: Option<&BaseValues>, path: &Path) -> anyhow::Result<()> {
    anyhow::ensure!(!result.is_empty(), "nothing to plot: the result is empty");
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let s = Scale::new(base, result.n_p);
    let ctrl_series = |f: fn(&ControlSample, &Scale) -> f64| {
        result.ctrl.iter().map(|c| (c.t, f(c, &s))).collect::<Vec<_>>()
    };
    let plant_series = |f: fn(&PlantSample, &Scale) -> f64| {
        result.plant.iter().map(|p| (p.t, f(p, &s))).collect::<Vec<_>>()
    };

    let root = BitMapBackend::new(path, (1280, 1600)).into_drawing_area();
    root.fill(&WHITE)?;
    let panels = root.split_evenly((5, 1));
    let t_desc = "Time (s)";

    draw_panel(
        &panels[0],
        t_desc,
        &s.desc("Speed", "rad/s"),
        &[
            Trace::new("w_m_ref", BLUE, ctrl_series(|c, s| c.w_m_ref / s.w)),
            Trace::new("w_m", RED, plant_series(|p, s| p.w_m * s.n_p / s.w)),
            Trace::new("w_m (ctrl)", GREEN, ctrl_series(|c, s| c.w_m / s.w)),
        ],
    )?;

    draw_panel(
        &panels[1],
        t_desc,
        &s.desc("Torque", "Nm"),
        &[
            Trace::new("tau_L", BLACK, plant_series(|p, s| p.tau_l / s.tau)),
            Trace::new("tau_M", RED, plant_series(|p, s| p.tau_m / s.tau)),
            Trace::new("tau_M_ref", BLUE, ctrl_series(|c, s| c.tau_m_ref / s.tau)),
        ],
    )?;

    draw_panel(
        &panels[2],
        t_desc,
        &s.desc("Current", "A"),
        &[
            Trace::new("i_sd", BLUE, ctrl_series(|c, s| c.i_s.re / s.i)),
            Trace::new("i_sq", RED, ctrl_series(|c, s| c.i_s.im / s.i)),
            Trace::new("i_sd_ref", CYAN, ctrl_series(|c, s| c.i_s_ref.re / s.i)),
            Trace::new("i_sq_ref", MAGENTA, ctrl_series(|c, s| c.i_s_ref.im / s.i)),
        ],
    )?;

    draw_panel(
        &panels[3],
        t_desc,
        &s.desc("Voltage", "V"),
        &[
            Trace::new("|u_s_ref|", BLUE, ctrl_series(|c, s| c.u_s_ref.norm() / s.u)),
            Trace::new("u_dc/sqrt(3)", BLACK, ctrl_series(|c, s| c.u_dc / 3f64.sqrt() / s.u)),
        ],
    )?;

    draw_panel(
        &panels[4],
        t_desc,
        &s.desc("Flux linkage", "Vs"),
        &[
            Trace::new("|psi_s|", BLUE, plant_series(|p, s| p.psi_ss.norm() / s.psi)),
            Trace::new("|psi_r|", RED, plant_series(|p, s| p.psi_rs.norm() / s.psi)),
            Trace::new("psi_R (ctrl)", GREEN, ctrl_series(|c, s| c.psi / s.psi)),
        ],
    )?;

    root.present()?;
    Ok(())
}

/// Plot a zoomed window of the phase-a waveforms and the space vectors.
///
/// The switched voltage is drawn as a staircase since each plant sample
/// holds the voltage applied during the preceding interval.
pub fn plot_extra(
    result: &SimulationResult,
    t_span: (f64, f64),
    base: Option<&BaseValues>,
    path: &Path,
) -> anyhow::Result<()> {
    let (t0, t1) = t_span;
    let in_span = |t: f64| t >= t0 && t <= t1;
    let plant: Vec<_> = result.plant.iter().filter(|p| in_span(p.t)).collect();
    let ctrl: Vec<_> = result.ctrl.iter().filter(|c| in_span(c.t)).collect();
    anyhow::ensure!(
        !plant.is_empty() && !ctrl.is_empty(),
        "nothing to plot in the window {} s to {} s",
        t0,
        t1
    );
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let s = Scale::new(base, result.n_p);

    // Stator-frame voltage reference of the controller
    let u_s_ref = |c: &ControlSample| Complex64::from_polar(1., c.theta_s) * c.u_s_ref;

    let mut u_a = Vec::with_capacity(2 * plant.len());
    for pair in plant.windows(2) {
        let u = pair[1].u_ss.re / s.u;
        u_a.push((pair[0].t, u));
        u_a.push((pair[1].t, u));
    }

    let root = BitMapBackend::new(path, (1280, 1200)).into_drawing_area();
    root.fill(&WHITE)?;
    let rows = root.split_evenly((3, 1));
    let t_desc = "Time (s)";

    draw_panel(
        &rows[0],
        t_desc,
        &s.desc("Phase current", "A"),
        &[Trace::new(
            "i_sa",
            BLUE,
            plant.iter().map(|p| (p.t, p.i_ss.re / s.i)).collect(),
        )],
    )?;

    draw_panel(
        &rows[1],
        t_desc,
        &s.desc("Phase voltage", "V"),
        &[
            Trace::new("u_sa", RED, u_a),
            Trace::new(
                "u_sa_ref",
                BLUE,
                ctrl.iter().map(|&c| (c.t, u_s_ref(c).re / s.u)).collect(),
            ),
        ],
    )?;

    let vectors = rows[2].split_evenly((1, 2));
    draw_panel(
        &vectors[0],
        &s.desc("Re", "A"),
        &s.desc("Im", "A"),
        &[Trace::new(
            "i_s",
            BLUE,
            plant.iter().map(|p| (p.i_ss.re / s.i, p.i_ss.im / s.i)).collect(),
        )],
    )?;
    draw_panel(
        &vectors[1],
        &s.desc("Re", "V"),
        &s.desc("Im", "V"),
        &[
            Trace::new(
                "u_s",
                RED,
                plant.iter().map(|p| (p.u_ss.re / s.u, p.u_ss.im / s.u)).collect(),
            ),
            Trace::new(
                "u_s_ref",
                BLUE,
                ctrl.iter()
                    .map(|&c| {
                        let u = u_s_ref(c);
                        (u.re / s.u, u.im / s.u)
                    })
                    .collect(),
            ),
        ],
    )?;

    root.present()?;
    Ok(())
}
