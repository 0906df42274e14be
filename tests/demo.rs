use motorsim::{
    config::DemoConfig, control::VhzCtrl, export, BaseValues, Model, Simulation,
    SimulationResult, Step,
};
use num_complex::Complex64;

fn run(cfg: &DemoConfig) -> SimulationResult {
    let (mdl, ctrl) = cfg.build().unwrap();
    Simulation::new(mdl, ctrl, cfg.pwm)
        .simulate(cfg.t_stop)
        .unwrap()
}

#[test]
fn base_values_are_positive() {
    let base = DemoConfig::default().base();
    for value in [base.u, base.i, base.w, base.psi, base.p, base.z, base.l, base.tau] {
        assert!(value.is_finite() && value > 0.);
    }
    assert_eq!(base, BaseValues::new(400., 5., 50., 14.6, 2.2e3, 2));
}

#[test]
fn drives_are_independent() {
    let cfg = DemoConfig::default();
    let mut a = cfg.drive().unwrap();
    let mut b = cfg.drive().unwrap();

    a.machine.psi_ss = Complex64::new(0.5, 0.);
    a.mechanics.w_m = 10.;

    assert_eq!(b.machine.psi_ss, Complex64::new(0., 0.));
    assert_eq!(b.mechanics.w_m, 0.);
    assert_ne!(a.phase_currents(), b.phase_currents());
    assert_eq!(b.rotor_speed(), Some(0.));
}

#[test]
fn speed_reference_steps_after_0_2_s() {
    let cfg = DemoConfig::default();
    let base = cfg.base();
    let ctrl = cfg.controller().unwrap();

    assert_eq!(ctrl.w_m_ref.at(0.), 0.);
    assert_eq!(ctrl.w_m_ref.at(0.2), 0.);
    assert_eq!(ctrl.w_m_ref.at(0.2 + 1e-9), base.w);
    assert_eq!(ctrl.w_m_ref.at(1.5), base.w);
}

#[test]
fn load_torque_steps_after_0_75_s() {
    let cfg = DemoConfig::default();
    let drive = cfg.drive().unwrap();

    assert_eq!(drive.mechanics.load_torque(0.75, 0.), 0.);
    assert_eq!(drive.mechanics.load_torque(0.75 + 1e-9, 0.), 14.6);
}

#[test]
fn full_demo_run_is_plottable() {
    let cfg = DemoConfig::default();
    let base = cfg.base();
    let result = run(&cfg);

    assert!(!result.is_empty());
    assert!(result.t_end() >= 1.5);
    assert!((6000..=6002).contains(&result.ctrl.len()));
    assert!(result.plant.len() > result.ctrl.len());
    assert!(result
        .plant
        .iter()
        .all(|p| p.i_ss.is_finite() && p.w_m.is_finite() && p.tau_m.is_finite()));

    // References are sampled by the controller
    for c in &result.ctrl {
        if c.t < 0.2 - 1e-6 {
            assert_eq!(c.w_m_ref, 0.);
        } else if c.t > 0.2 + 1e-6 {
            assert_eq!(c.w_m_ref, base.w);
        }
    }
    for p in &result.plant {
        if p.t < 0.75 - 1e-6 {
            assert_eq!(p.tau_l, 0.);
        } else if p.t > 0.75 + 1e-6 {
            assert_eq!(p.tau_l, base.tau_nom);
        }
    }

    // Nominal load is carried at the base speed, and the estimate follows
    let w_m = result.plant.last().unwrap().w_m;
    assert!((w_m - base.w_mech()).abs() < 0.05 * base.w_mech());
    let w_m_est = result.ctrl.last().unwrap().w_m / cfg.ratings.n_p as f64;
    assert!((w_m_est - w_m).abs() < 0.05 * base.w_mech());

    // The zoomed window holds both plant and controller samples
    let (t0, t1) = cfg.t_span;
    assert!(result.plant.iter().any(|p| p.t >= t0 && p.t <= t1));
    assert!(result.ctrl.iter().any(|c| c.t >= t0 && c.t <= t1));

    let dir = tempfile::tempdir().unwrap();
    export::write_csv(&result, dir.path()).unwrap();
    assert!(dir.path().join("plant.csv").exists());
}

#[test]
fn sensored_averaged_drive_tracks_speed_under_load() {
    let cfg = DemoConfig {
        sensorless: false,
        pwm: false,
        ..Default::default()
    };
    let base = cfg.base();
    let result = run(&cfg);

    let w_m = result.plant.last().unwrap().w_m;
    assert!((w_m - base.w_mech()).abs() < 0.05 * base.w_mech());
}

#[test]
fn vhz_drive_settles_near_reference_under_load() {
    let cfg = DemoConfig::default();
    let base = cfg.base();
    let drive = cfg.drive().unwrap();
    let mut ctrl = VhzCtrl::builder(cfg.ctrl, base.psi)
        .n_levels(cfg.n_levels)
        .build()
        .unwrap();
    ctrl.w_m_ref = Box::new(Step::new(cfg.speed_step_t, base.w));

    let result = Simulation::new(drive, ctrl, true)
        .simulate(cfg.t_stop)
        .unwrap();

    let w_m = result.plant.last().unwrap().w_m;
    assert!(result.plant.last().unwrap().tau_l > 0.);
    assert!((w_m - base.w_mech()).abs() < 0.05 * base.w_mech());
}

#[test]
fn zero_stop_time_is_rejected() {
    let (mdl, ctrl) = DemoConfig::default().build().unwrap();
    assert!(Simulation::new(mdl, ctrl, true).simulate(0.).is_err());
}
