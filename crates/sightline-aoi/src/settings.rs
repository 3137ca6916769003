//! Plane and cell dimensions of a [`SpatialIndex`](crate::SpatialIndex).

use crate::error::AoiError;

/// Upper bound on `columns * rows` of the grid an index allocates.
pub const MAX_GRID_CELLS: usize = 1 << 22;

/// Dimensions and event policy of a spatial index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AoiSettings {
    /// Width of the tracked plane.
    pub width: f64,
    /// Height of the tracked plane.
    pub height: f64,
    /// Width of one grid cell.
    pub cell_width: f64,
    /// Height of one grid cell.
    pub cell_height: f64,
    /// Fire leave events when `refresh` evicts a member that moved out of
    /// range. When `false`, refresh eviction is silent and only
    /// `delete_entity` produces leave events.
    pub leave_on_refresh: bool,
}

impl Default for AoiSettings {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 1000.0,
            cell_width: 100.0,
            cell_height: 100.0,
            leave_on_refresh: true,
        }
    }
}

impl AoiSettings {
    /// Settings for a `width` x `height` plane split into
    /// `cell_width` x `cell_height` cells.
    pub fn new(width: f64, height: f64, cell_width: f64, cell_height: f64) -> Self {
        Self {
            width,
            height,
            cell_width,
            cell_height,
            ..Self::default()
        }
    }

    /// Builder-style override of [`leave_on_refresh`](Self::leave_on_refresh).
    pub fn with_leave_on_refresh(mut self, enabled: bool) -> Self {
        self.leave_on_refresh = enabled;
        self
    }

    /// Reject any dimension that is not finite and strictly positive, and
    /// any cell size that would need more than [`MAX_GRID_CELLS`] cells.
    pub fn validate(&self) -> Result<(), AoiError> {
        self.grid_dimensions().map(|_| ())
    }

    /// Grid `(columns, rows)`: `ceil(extent / cell) + 1` per axis. The slack
    /// column and row absorb positions on the far border.
    pub fn grid_dimensions(&self) -> Result<(usize, usize), AoiError> {
        check_dimension("width", self.width)?;
        check_dimension("height", self.height)?;
        check_dimension("cell_width", self.cell_width)?;
        check_dimension("cell_height", self.cell_height)?;

        let columns = (self.width / self.cell_width).ceil() + 1.0;
        let rows = (self.height / self.cell_height).ceil() + 1.0;
        // Compared in f64 so huge ratios never reach an integer cast.
        if !(columns * rows <= MAX_GRID_CELLS as f64) {
            return Err(AoiError::GridTooLarge {
                columns,
                rows,
                max: MAX_GRID_CELLS,
            });
        }
        Ok((columns as usize, rows as usize))
    }
}

pub(crate) fn check_dimension(name: &'static str, value: f64) -> Result<(), AoiError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(AoiError::InvalidDimension { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = AoiSettings::default();
        assert!(settings.validate().is_ok());
        assert!(settings.leave_on_refresh);
    }

    #[test]
    fn test_zero_cell_width_rejected() {
        let settings = AoiSettings::new(1000.0, 1000.0, 0.0, 100.0);
        assert_eq!(
            settings.validate(),
            Err(AoiError::InvalidDimension {
                name: "cell_width",
                value: 0.0
            })
        );
    }

    #[test]
    fn test_negative_and_non_finite_rejected() {
        assert!(AoiSettings::new(-1.0, 10.0, 1.0, 1.0).validate().is_err());
        assert!(AoiSettings::new(10.0, f64::NAN, 1.0, 1.0).validate().is_err());
        assert!(
            AoiSettings::new(10.0, 10.0, 1.0, f64::INFINITY)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_grid_dimensions_include_slack() {
        assert_eq!(AoiSettings::default().grid_dimensions(), Ok((11, 11)));
        assert_eq!(
            AoiSettings::new(250.0, 90.0, 100.0, 100.0).grid_dimensions(),
            Ok((4, 2))
        );
    }

    #[test]
    fn test_oversized_grid_rejected() {
        for settings in [
            AoiSettings::new(1e20, 10.0, 1.0, 10.0),
            AoiSettings::new(1000.0, 1000.0, 1e-300, 100.0),
            AoiSettings::new(1e6, 1e6, 1.0, 1.0),
        ] {
            assert!(matches!(
                settings.validate(),
                Err(AoiError::GridTooLarge {
                    max: MAX_GRID_CELLS,
                    ..
                })
            ));
        }
    }

    #[test]
    fn test_grid_at_limit_accepted() {
        // 2047 + 1 columns by 2047 + 1 rows = exactly MAX_GRID_CELLS.
        let settings = AoiSettings::new(2047.0, 2047.0, 1.0, 1.0);
        assert_eq!(settings.grid_dimensions(), Ok((2048, 2048)));
        assert!(AoiSettings::new(2048.0, 2047.0, 1.0, 1.0).validate().is_err());
    }

    #[test]
    fn test_leave_policy_builder() {
        let settings = AoiSettings::new(10.0, 10.0, 1.0, 1.0).with_leave_on_refresh(false);
        assert!(!settings.leave_on_refresh);
        assert_eq!(settings.cell_height, 1.0);
    }
}
