//! Radiometric conversion engine. A conversion runs in three steps on every
//! per-source array: dB input is linearized, the unit-system chain is applied,
//! and dB output is produced with invalid results replaced by the no-data value.
use std::f64::consts::PI;

use ndarray::ArrayD;
use tracing::debug;

use crate::core::params::ConversionParams;
use crate::core::radiometry::{self, ZenithAngle};
use crate::error::{Error, Result};
use crate::types::{Scale, UnitSystem};

/// One link of a unit-system conversion chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// BSC -> BRDF, needs angles
    ToBrdf,
    /// BRDF -> BSC, needs angles
    ToBsc,
    /// BRDF -> BRF
    ToBrf,
    /// BRF -> BRDF
    DivPi,
}

impl Step {
    fn needs_geometry(&self) -> bool {
        matches!(self, Step::ToBrdf | Step::ToBsc)
    }
}

pub fn chain(system: UnitSystem, to: UnitSystem) -> &'static [Step] {
    use UnitSystem::*;
    match (system, to) {
        (Bsc, Brdf) => &[Step::ToBrdf],
        (Bsc, Brf) => &[Step::ToBrdf, Step::ToBrf],
        (Brdf, Bsc) => &[Step::ToBsc],
        (Brdf, Brf) => &[Step::ToBrf],
        (Brf, Bsc) => &[Step::DivPi, Step::ToBsc],
        (Brf, Brdf) => &[Step::DivPi],
        (Bsc, Bsc) | (Brdf, Brdf) | (Brf, Brf) => &[],
    }
}

impl ConversionParams {
    pub fn needs_geometry(&self) -> bool {
        chain(self.system, self.to).iter().any(Step::needs_geometry)
    }

    /// Fail early when the chain needs zenith angles that were not given.
    pub fn validate(&self) -> Result<()> {
        if self.needs_geometry() {
            self.geometry()?;
        }
        Ok(())
    }

    fn geometry(&self) -> Result<(&ZenithAngle, &ZenithAngle)> {
        let missing = |arg| Error::InvalidArgument {
            arg,
            value: format!(
                "required for {} -> {} conversion",
                self.system, self.to
            ),
        };
        let iza = self.iza.as_ref().ok_or_else(|| missing("iza"))?;
        let vza = self.vza.as_ref().ok_or_else(|| missing("vza"))?;
        Ok((iza, vza))
    }
}

/// Convert one array; `no_data` replaces NaN produced on the dB output branch.
pub fn convert_array(
    array: &ArrayD<f64>,
    params: &ConversionParams,
    no_data: f64,
) -> Result<ArrayD<f64>> {
    let mut out = match params.system_scale {
        Scale::Db => radiometry::to_linear(array),
        Scale::Linear => array.clone(),
    };

    for step in chain(params.system, params.to) {
        out = match step {
            Step::ToBrdf => {
                let (iza, vza) = params.geometry()?;
                radiometry::brdf(&out, iza, vza, params.angle_unit)?
            }
            Step::ToBsc => {
                let (iza, vza) = params.geometry()?;
                radiometry::bsc(&out, iza, vza, params.angle_unit)?
            }
            Step::ToBrf => radiometry::brf(&out),
            Step::DivPi => out.mapv(|v| v / PI),
        };
    }

    if params.output_scale == Scale::Db {
        out = radiometry::to_decibel(&out);
        out.mapv_inplace(|v| if v.is_nan() { no_data } else { v });
    }
    Ok(out)
}

/// Convert every per-source array; nothing is returned unless all succeed.
pub fn convert_arrays(
    arrays: &[ArrayD<f64>],
    params: &ConversionParams,
    no_data: &[f64],
) -> Result<Vec<ArrayD<f64>>> {
    params.validate()?;
    debug!(
        "convert: {} ({}) -> {} ({}), steps {:?}",
        params.system,
        params.system_scale,
        params.to,
        params.output_scale,
        chain(params.system, params.to)
    );
    arrays
        .iter()
        .zip(no_data)
        .map(|(array, &nd)| convert_array(array, params, nd))
        .collect()
}
