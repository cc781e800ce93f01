//! Radiometric unit math: backscatter coefficient (BSC), bidirectional reflectance
//! distribution function (BRDF), bidirectional reflectance factor (BRF), and the
//! linear/decibel scales.
//!
//! ```text
//! BRDF = BSC / (cos(iza) * cos(vza) * 4π)
//! BSC  = BRDF * cos(iza) * cos(vza) * 4π
//! BRF  = π * BRDF
//! dB   = 10 * log10(x)
//! ```
use std::f64::consts::PI;

use ndarray::{ArrayD, IxDyn, Zip};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::AngleUnit;

const FOUR_PI: f64 = 4.0 * PI;

/// A zenith angle: one value for the whole grid, or a per-pixel grid broadcast
/// against the data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ZenithAngle {
    Scalar(f64),
    Grid(ArrayD<f64>),
}

impl From<f64> for ZenithAngle {
    fn from(value: f64) -> Self {
        ZenithAngle::Scalar(value)
    }
}

impl From<ArrayD<f64>> for ZenithAngle {
    fn from(value: ArrayD<f64>) -> Self {
        ZenithAngle::Grid(value)
    }
}

#[inline]
fn radians(angle: f64, unit: AngleUnit) -> f64 {
    match unit {
        AngleUnit::Rad => angle,
        AngleUnit::Deg => angle.to_radians(),
    }
}

#[inline]
pub fn decibel(x: f64) -> f64 {
    10.0 * x.log10()
}

#[inline]
pub fn linear(x_db: f64) -> f64 {
    10f64.powf(x_db / 10.0)
}

/// Scalar BSC -> BRDF.
pub fn brdf_value(bsc: f64, iza: f64, vza: f64, unit: AngleUnit) -> f64 {
    bsc / (radians(iza, unit).cos() * radians(vza, unit).cos() * FOUR_PI)
}

/// Scalar BRDF -> BSC.
pub fn bsc_value(brdf: f64, iza: f64, vza: f64, unit: AngleUnit) -> f64 {
    brdf * radians(iza, unit).cos() * radians(vza, unit).cos() * FOUR_PI
}

pub fn brf_value(brdf: f64) -> f64 {
    PI * brdf
}

/// Linear -> dB. Zero maps to `-inf` and negative values to NaN; neither is an error.
pub fn to_decibel(x: &ArrayD<f64>) -> ArrayD<f64> {
    x.mapv(decibel)
}

/// dB -> linear.
pub fn to_linear(x_db: &ArrayD<f64>) -> ArrayD<f64> {
    x_db.mapv(linear)
}

pub fn brf(brdf: &ArrayD<f64>) -> ArrayD<f64> {
    brdf.mapv(brf_value)
}

/// BSC -> BRDF over a whole array.
pub fn brdf(
    bsc: &ArrayD<f64>,
    iza: &ZenithAngle,
    vza: &ZenithAngle,
    unit: AngleUnit,
) -> Result<ArrayD<f64>> {
    Ok(match geometry_factor(iza, vza, unit, bsc.shape())? {
        Factor::Scalar(f) => bsc.mapv(|v| v / f),
        Factor::Grid(f) => bsc / &f,
    })
}

/// BRDF -> BSC over a whole array.
pub fn bsc(
    brdf: &ArrayD<f64>,
    iza: &ZenithAngle,
    vza: &ZenithAngle,
    unit: AngleUnit,
) -> Result<ArrayD<f64>> {
    Ok(match geometry_factor(iza, vza, unit, brdf.shape())? {
        Factor::Scalar(f) => brdf.mapv(|v| v * f),
        Factor::Grid(f) => brdf * &f,
    })
}

/// `cos(iza) * cos(vza) * 4π`, scalar when both angles are.
enum Factor {
    Scalar(f64),
    Grid(ArrayD<f64>),
}

fn geometry_factor(
    iza: &ZenithAngle,
    vza: &ZenithAngle,
    unit: AngleUnit,
    shape: &[usize],
) -> Result<Factor> {
    if let (ZenithAngle::Scalar(i), ZenithAngle::Scalar(v)) = (iza, vza) {
        return Ok(Factor::Scalar(
            radians(*i, unit).cos() * radians(*v, unit).cos() * FOUR_PI,
        ));
    }
    let cos_i = cosines(iza, unit, shape, "iza")?;
    let cos_v = cosines(vza, unit, shape, "vza")?;
    let mut factor = ArrayD::<f64>::zeros(IxDyn(shape));
    Zip::from(&mut factor)
        .and(&cos_i)
        .and(&cos_v)
        .for_each(|f, &ci, &cv| *f = ci * cv * FOUR_PI);
    Ok(Factor::Grid(factor))
}

fn cosines(
    angle: &ZenithAngle,
    unit: AngleUnit,
    shape: &[usize],
    arg: &'static str,
) -> Result<ArrayD<f64>> {
    match angle {
        ZenithAngle::Scalar(a) => Ok(ArrayD::from_elem(IxDyn(shape), radians(*a, unit).cos())),
        ZenithAngle::Grid(grid) => {
            let view = grid.broadcast(IxDyn(shape)).ok_or_else(|| Error::InvalidArgument {
                arg,
                value: format!(
                    "angle grid of shape {:?} cannot be broadcast to {:?}",
                    grid.shape(),
                    shape
                ),
            })?;
            Ok(view.mapv(|a| radians(a, unit).cos()))
        }
    }
}
