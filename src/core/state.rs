//! Array state of a loaded grid. The layout of the per-source arrays is tracked
//! by an explicit `Layout` tag rather than re-derived from `ndim`.
use ndarray::{ArrayD, ArrayViewD, Axis, IxDyn};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::types::PixelType;

/// Shape family of the loaded arrays. All sources share one layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Layout {
    /// 1-D `rows*cols`, every source has a single band
    Flat,
    /// 2-D `bands x rows*cols`
    PerBandFlat,
    /// 3-D `bands x rows x cols`, or 2-D `rows x cols` when restored from `Flat`
    Shaped,
}

impl Layout {
    /// Layout `to_array` flattens to: `Flat` only when every source has one band.
    pub fn flat_for(extents: &[Extent]) -> Layout {
        if extents.iter().all(|e| e.bands == 1) {
            Layout::Flat
        } else {
            Layout::PerBandFlat
        }
    }

    pub fn is_flat(&self) -> bool {
        !matches!(self, Layout::Shaped)
    }
}

/// Loaded band count and current pixel extent of one source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extent {
    pub bands: usize,
    pub rows: usize,
    pub cols: usize,
}

impl Extent {
    pub fn pixels(&self) -> usize {
        self.rows * self.cols
    }

    fn shape(&self, layout: Layout, from: Layout) -> Vec<usize> {
        match layout {
            Layout::Flat => vec![self.pixels()],
            Layout::PerBandFlat => vec![self.bands, self.pixels()],
            Layout::Shaped if from == Layout::Flat => vec![self.rows, self.cols],
            Layout::Shaped => vec![self.bands, self.rows, self.cols],
        }
    }
}

/// Which pixels `set_no_data` rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NoDataRule {
    #[default]
    NanOnly,
    NanAndZero,
}

/// The arrays of a loaded grid, one per source.
#[derive(Debug, Clone)]
pub struct GridData {
    pub(crate) arrays: Vec<ArrayD<f64>>,
    pub(crate) layout: Layout,
    pub(crate) extents: Vec<Extent>,
    pub(crate) pixel_types: Vec<PixelType>,
    /// Layout `flatten` returns to. `Flat` only for single-band data loaded flat.
    pub(crate) flat: Layout,
}

impl GridData {
    /// Wrap freshly read `(bands, rows, cols)` arrays. With `flatten`, single-band
    /// grids collapse to 1-D `Flat`; shaped loads always flatten per band later.
    pub(crate) fn load(
        arrays: Vec<ArrayD<f64>>,
        extents: Vec<Extent>,
        pixel_types: Vec<PixelType>,
        flatten: bool,
    ) -> Result<Self> {
        let flat = if flatten {
            Layout::flat_for(&extents)
        } else {
            Layout::PerBandFlat
        };
        let mut data = GridData {
            arrays,
            layout: Layout::Shaped,
            extents,
            pixel_types,
            flat,
        };
        if flatten {
            data.flatten()?;
        }
        Ok(data)
    }

    pub fn arrays(&self) -> &[ArrayD<f64>] {
        &self.arrays
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn extents(&self) -> &[Extent] {
        &self.extents
    }

    pub fn pixel_types(&self) -> &[PixelType] {
        &self.pixel_types
    }

    /// Shaped copies of the arrays, leaving `self` untouched.
    pub fn shaped_arrays(&self) -> Result<Vec<ArrayD<f64>>> {
        if self.layout == Layout::Shaped {
            return Ok(self.arrays.clone());
        }
        self.arrays
            .iter()
            .zip(&self.extents)
            .map(|(a, e)| relayout(a, &e.shape(Layout::Shaped, self.layout)))
            .collect()
    }

    /// Flat -> Shaped. No-op when already shaped.
    pub fn reshape(&mut self) -> Result<()> {
        if self.layout == Layout::Shaped {
            debug!("reshape: arrays already shaped, nothing to do");
            return Ok(());
        }
        self.arrays = self.shaped_arrays()?;
        self.layout = Layout::Shaped;
        Ok(())
    }

    /// Shaped -> PerBandFlat, or back to Flat for data reshaped from Flat.
    /// No-op when already flat.
    pub fn flatten(&mut self) -> Result<()> {
        if self.layout.is_flat() {
            debug!("flatten: arrays already flat, nothing to do");
            return Ok(());
        }
        let layout = self.flat;
        let arrays = self
            .arrays
            .iter()
            .zip(&self.extents)
            .map(|(a, e)| relayout(a, &e.shape(layout, Layout::Shaped)))
            .collect::<Result<Vec<_>>>()?;
        self.arrays = arrays;
        self.layout = layout;
        Ok(())
    }

    pub fn replace_no_data(&mut self, no_data: &[f64], rule: NoDataRule) {
        for (array, &value) in self.arrays.iter_mut().zip(no_data) {
            replace_no_data(array, value, rule);
        }
    }

    /// Per-band rows of every source as `(rows*cols, bands)` columns. Needs a flat layout.
    pub(crate) fn unfold(&self) -> Result<Vec<ArrayD<f64>>> {
        self.arrays
            .iter()
            .map(|a| {
                let rows: Vec<ArrayViewD<f64>> = a.outer_iter().collect();
                column_stack(&rows)
            })
            .collect()
    }
}

/// Copy `array` into `shape`, reading elements in logical (row-major) order.
pub(crate) fn relayout(array: &ArrayD<f64>, shape: &[usize]) -> Result<ArrayD<f64>> {
    Ok(ArrayD::from_shape_vec(
        IxDyn(shape),
        array.iter().copied().collect(),
    )?)
}

pub(crate) fn replace_no_data(array: &mut ArrayD<f64>, value: f64, rule: NoDataRule) {
    match rule {
        NoDataRule::NanOnly => array.mapv_inplace(|v| if v.is_nan() { value } else { v }),
        NoDataRule::NanAndZero => {
            array.mapv_inplace(|v| if v.is_nan() || v == 0.0 { value } else { v })
        }
    }
}

/// Stack arrays as columns: 1-D arrays become columns, higher-rank arrays are
/// joined along axis 1.
pub(crate) fn column_stack(arrays: &[ArrayViewD<f64>]) -> Result<ArrayD<f64>> {
    let columns: Vec<ArrayViewD<f64>> = arrays
        .iter()
        .map(|a| {
            if a.ndim() == 1 {
                a.clone().insert_axis(Axis(1))
            } else {
                a.clone()
            }
        })
        .collect();
    Ok(ndarray::concatenate(Axis(1), &columns)?)
}

/// Column-joined arrays built by `Grid::dstack`.
#[derive(Debug, Clone)]
pub struct Stack {
    pub(crate) arrays: Vec<ArrayD<f64>>,
    pub(crate) unfolded: bool,
}

impl Stack {
    /// One array for a plain stack, one per source for an unfolded stack.
    pub fn arrays(&self) -> &[ArrayD<f64>] {
        &self.arrays
    }

    pub fn is_unfolded(&self) -> bool {
        self.unfolded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array, arr1, arr2};

    fn data(bands: usize, rows: usize, cols: usize, sources: usize) -> GridData {
        let n = bands * rows * cols;
        let cube = Array::from_shape_vec(
            IxDyn(&[bands, rows, cols]),
            (0..n).map(|v| v as f64).collect(),
        )
        .unwrap();
        GridData {
            arrays: vec![cube; sources],
            layout: Layout::Shaped,
            extents: vec![Extent { bands, rows, cols }; sources],
            pixel_types: vec![PixelType::Float64; sources],
            flat: Layout::PerBandFlat,
        }
    }

    #[test]
    fn flatten_then_reshape_is_exact() {
        let mut d = data(3, 4, 5, 1);
        let original = d.arrays[0].clone();
        d.flatten().unwrap();
        assert_eq!(d.layout, Layout::PerBandFlat);
        assert_eq!(d.arrays[0].shape(), &[3, 20]);
        d.reshape().unwrap();
        assert_eq!(d.layout, Layout::Shaped);
        assert_eq!(d.arrays[0], original);
    }

    #[test]
    fn single_band_loaded_flat_is_one_dimensional() {
        let planes = data(1, 4, 5, 2);
        let mut d = GridData::load(planes.arrays, planes.extents, planes.pixel_types, true).unwrap();
        assert_eq!(d.layout, Layout::Flat);
        assert_eq!(d.arrays[1].shape(), &[20]);
        d.reshape().unwrap();
        assert_eq!(d.arrays[1].shape(), &[4, 5]);
        assert_eq!(d.arrays[1][[3, 4]], 19.0);
        d.flatten().unwrap();
        assert_eq!(d.layout, Layout::Flat);
        assert_eq!(d.arrays[1].shape(), &[20]);
    }

    #[test]
    fn single_band_loaded_shaped_keeps_its_band_axis() {
        let planes = data(1, 3, 4, 1);
        let mut d = GridData::load(planes.arrays, planes.extents, planes.pixel_types, false).unwrap();
        let original = d.arrays[0].clone();
        d.flatten().unwrap();
        assert_eq!(d.layout, Layout::PerBandFlat);
        assert_eq!(d.arrays[0].shape(), &[1, 12]);
        d.reshape().unwrap();
        assert_eq!(d.arrays[0], original);
        assert_eq!(d.arrays[0].shape(), &[1, 3, 4]);
    }

    #[test]
    fn mixed_band_counts_share_the_per_band_layout() {
        let mut d = data(2, 2, 2, 2);
        d.arrays[1] = d.arrays[1].slice(ndarray::s![0..1, .., ..]).to_owned().into_dyn();
        d.extents[1].bands = 1;
        d.flatten().unwrap();
        assert_eq!(d.layout, Layout::PerBandFlat);
        assert_eq!(d.arrays[0].shape(), &[2, 4]);
        assert_eq!(d.arrays[1].shape(), &[1, 4]);
    }

    #[test]
    fn repeated_transitions_are_no_ops() {
        let mut d = data(2, 3, 3, 1);
        d.reshape().unwrap();
        assert_eq!(d.arrays[0].shape(), &[2, 3, 3]);
        d.flatten().unwrap();
        let flat = d.arrays[0].clone();
        d.flatten().unwrap();
        assert_eq!(d.arrays[0], flat);
    }

    #[test]
    fn shaped_arrays_leave_the_state_alone() {
        let mut d = data(2, 3, 3, 1);
        d.flatten().unwrap();
        let shaped = d.shaped_arrays().unwrap();
        assert_eq!(shaped[0].shape(), &[2, 3, 3]);
        assert_eq!(d.layout, Layout::PerBandFlat);
    }

    #[test]
    fn column_stack_matches_numpy() {
        let a = arr1(&[1.0, 2.0, 3.0]).into_dyn();
        let b = arr1(&[4.0, 5.0, 6.0]).into_dyn();
        let stacked = column_stack(&[a.view(), b.view()]).unwrap();
        assert_eq!(stacked, arr2(&[[1.0, 4.0], [2.0, 5.0], [3.0, 6.0]]).into_dyn());

        let m = arr2(&[[1.0, 2.0], [3.0, 4.0]]).into_dyn();
        let joined = column_stack(&[m.view(), m.view()]).unwrap();
        assert_eq!(joined.shape(), &[2, 4]);

        let short = arr1(&[1.0]).into_dyn();
        assert!(column_stack(&[a.view(), short.view()]).is_err());
    }

    #[test]
    fn no_data_rules() {
        let mut a = arr1(&[f64::NAN, 0.0, 2.0]).into_dyn();
        replace_no_data(&mut a, -1.0, NoDataRule::NanOnly);
        assert_eq!(a, arr1(&[-1.0, 0.0, 2.0]).into_dyn());
        replace_no_data(&mut a, -1.0, NoDataRule::NanAndZero);
        assert_eq!(a, arr1(&[-1.0, -1.0, 2.0]).into_dyn());
    }

    #[test]
    fn unfold_turns_bands_into_columns() {
        let mut d = data(3, 2, 2, 1);
        d.flatten().unwrap();
        let unfolded = d.unfold().unwrap();
        assert_eq!(unfolded[0].shape(), &[4, 3]);
        assert_eq!(unfolded[0][[1, 2]], 9.0);
    }
}
