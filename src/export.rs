//! CSV export of the recorded signals.

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::Serialize;

use crate::{control::ControlSample, model::PlantSample, SimulationResult};

/// Flat plant record, one row per switching interval.
#[derive(Debug, Clone, Serialize)]
pub struct PlantRecord {
    pub t: f64,
    pub i_s_re: f64,
    pub i_s_im: f64,
    pub psi_s_re: f64,
    pub psi_s_im: f64,
    pub psi_r_re: f64,
    pub psi_r_im: f64,
    pub u_s_re: f64,
    pub u_s_im: f64,
    pub q_a: f64,
    pub q_b: f64,
    pub q_c: f64,
    pub u_dc: f64,
    pub w_m: f64,
    pub theta_m: f64,
    pub tau_m: f64,
    pub tau_l: f64,
}

impl From<&PlantSample> for PlantRecord {
    fn from(s: &PlantSample) -> Self {
        Self {
            t: s.t,
            i_s_re: s.i_ss.re,
            i_s_im: s.i_ss.im,
            psi_s_re: s.psi_ss.re,
            psi_s_im: s.psi_ss.im,
            psi_r_re: s.psi_rs.re,
            psi_r_im: s.psi_rs.im,
            u_s_re: s.u_ss.re,
            u_s_im: s.u_ss.im,
            q_a: s.q_abc[0],
            q_b: s.q_abc[1],
            q_c: s.q_abc[2],
            u_dc: s.u_dc,
            w_m: s.w_m,
            theta_m: s.theta_m,
            tau_m: s.tau_m,
            tau_l: s.tau_l,
        }
    }
}

/// Flat controller record, one row per sampling instant.
#[derive(Debug, Clone, Serialize)]
pub struct ControlRecord {
    pub t: f64,
    pub w_m_ref: f64,
    pub w_m: f64,
    pub i_sd_ref: f64,
    pub i_sq_ref: f64,
    pub i_sd: f64,
    pub i_sq: f64,
    pub u_sd_ref: f64,
    pub u_sq_ref: f64,
    pub psi: f64,
    pub tau_m_ref: f64,
    pub theta_s: f64,
    pub w_s: f64,
    pub u_dc: f64,
    pub d_a: f64,
    pub d_b: f64,
    pub d_c: f64,
}

impl From<&ControlSample> for ControlRecord {
    fn from(s: &ControlSample) -> Self {
        Self {
            t: s.t,
            w_m_ref: s.w_m_ref,
            w_m: s.w_m,
            i_sd_ref: s.i_s_ref.re,
            i_sq_ref: s.i_s_ref.im,
            i_sd: s.i_s.re,
            i_sq: s.i_s.im,
            u_sd_ref: s.u_s_ref.re,
            u_sq_ref: s.u_s_ref.im,
            psi: s.psi,
            tau_m_ref: s.tau_m_ref,
            theta_s: s.theta_s,
            w_s: s.w_s,
            u_dc: s.u_dc,
            d_a: s.d_abc_ref[0],
            d_b: s.d_abc_ref[1],
            d_c: s.d_abc_ref[2],
        }
    }
}

fn write_records<R: Serialize>(path: &Path, records: impl Iterator<Item = R>) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to open CSV path {}", path.display()))?;

    for record in records {
        writer.serialize(record)?;
    }

    writer.flush()?;
    Ok(())
}

/// Write `plant.csv` and `ctrl.csv` into `dir`.
pub fn write_csv(result: &SimulationResult, dir: &Path) -> anyhow::Result<()> {
    write_records(
        &dir.join("plant.csv"),
        result.plant.iter().map(PlantRecord::from),
    )?;
    write_records(
        &dir.join("ctrl.csv"),
        result.ctrl.iter().map(ControlRecord::from),
    )?;
    Ok(())
}
