//! Conversion between the unit grids of two fonts

/// Scale factors from a donor's unit grid to the base's
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitScale {
    /// `base_upm / donor_upm`
    pub grid: f64,
    /// `grid * fill_factor`, applied to imported outlines
    pub combined: f64,
}

impl UnitScale {
    pub fn new(base_upm: u16, donor_upm: u16, fill_factor: f64) -> Self {
        let grid = grid_scale(base_upm, donor_upm);
        Self { grid, combined: grid * fill_factor }
    }
}

/// Factor that maps donor font units onto base font units
///
/// Exactly 1 when both fonts share a grid.
pub fn grid_scale(base_upm: u16, donor_upm: u16) -> f64 {
    if base_upm == donor_upm {
        return 1.0;
    }
    base_upm as f64 / donor_upm as f64
}
