//! Disc brush for painting cells.

use std::str::FromStr;

use lifegrid_kernel::{CellState, SimulationCore, WorldCoord};

/// Energy of a painted cell.
pub const BRUSH_ENERGY: f32 = 1.5;

/// Radius of a new brush.
pub const DEFAULT_BRUSH_RADIUS: u32 = 2;

/// What a stroke does to the cells under the brush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrushMode {
    /// Bring cells to life
    Alive,
    /// Kill cells
    Dead,
}

/// Filled disc of cells around a center.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Brush {
    /// Disc radius in cells
    pub radius: u32,
}

impl Default for Brush {
    fn default() -> Self {
        Self::new(DEFAULT_BRUSH_RADIUS)
    }
}

impl Brush {
    /// Creates a brush.
    #[must_use]
    pub const fn new(radius: u32) -> Self {
        Self { radius }
    }

    /// Offsets covered by the disc (`x² + y² <= r²`), row-major.
    #[must_use]
    pub fn offsets(&self) -> Vec<(i32, i32)> {
        let r = self.radius.min(i16::MAX as u32) as i32;
        let r2 = i64::from(r) * i64::from(r);
        let mut offsets = Vec::new();
        for y in -r..=r {
            for x in -r..=r {
                if i64::from(x) * i64::from(x) + i64::from(y) * i64::from(y) <= r2 {
                    offsets.push((x, y));
                }
            }
        }
        offsets
    }

    /// Paints the disc around `center`. Returns the number of cells covered.
    pub fn paint(&self, core: &mut SimulationCore, center: WorldCoord, mode: BrushMode) -> usize {
        let cells: Vec<WorldCoord> = self
            .offsets()
            .into_iter()
            .map(|(dx, dy)| center.offset(dx, dy))
            .collect();
        let covered = cells.len();

        match mode {
            BrushMode::Alive => {
                let state = CellState::new(BRUSH_ENERGY, 0);
                core.set_cells_alive(cells.into_iter().map(|coord| (coord, state)));
            },
            BrushMode::Dead => {
                for coord in cells {
                    core.set_cell_dead(coord.x, coord.y);
                }
            },
        }
        covered
    }
}

/// A brush stroke given on the command line as `x,y[,radius]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaintStroke {
    /// Disc center
    pub center: WorldCoord,
    /// Brush used
    pub brush: Brush,
}

impl FromStr for PaintStroke {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let number = |part: &str| {
            part.parse::<i32>()
                .map_err(|e| format!("invalid number '{part}' in stroke '{s}': {e}"))
        };

        match parts.as_slice() {
            [x, y] => Ok(Self {
                center: WorldCoord::new(number(x)?, number(y)?),
                brush: Brush::default(),
            }),
            [x, y, radius] => {
                let radius = radius
                    .parse::<u32>()
                    .map_err(|e| format!("invalid radius '{radius}' in stroke '{s}': {e}"))?;
                Ok(Self {
                    center: WorldCoord::new(number(x)?, number(y)?),
                    brush: Brush::new(radius),
                })
            },
            _ => Err(format!("expected x,y or x,y,radius, got '{s}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifegrid_kernel::SimulationSettings;

    #[test]
    fn test_disc_sizes() {
        assert_eq!(Brush::new(0).offsets(), vec![(0, 0)]);
        assert_eq!(Brush::new(1).offsets().len(), 5);
        assert_eq!(Brush::new(2).offsets().len(), 13);
    }

    #[test]
    fn test_paint_alive_then_dead() {
        let mut core = SimulationCore::new(SimulationSettings::with_chunk_size(8));
        let brush = Brush::new(2);
        let center = WorldCoord::new(-1, 7);

        let covered = brush.paint(&mut core, center, BrushMode::Alive);
        assert_eq!(covered, 13);
        assert_eq!(core.population(), 13);
        assert!((core.energy(-1, 9) - BRUSH_ENERGY).abs() < f32::EPSILON);
        assert!(!core.is_alive(1, 9));

        brush.paint(&mut core, center, BrushMode::Dead);
        assert_eq!(core.population(), 0);
        assert!(core.active_chunks().is_empty());
    }

    #[test]
    fn test_parse_stroke() {
        let stroke: PaintStroke = "3, -4".parse().expect("parse");
        assert_eq!(stroke.center, WorldCoord::new(3, -4));
        assert_eq!(stroke.brush.radius, DEFAULT_BRUSH_RADIUS);

        let stroke: PaintStroke = "0,0,5".parse().expect("parse");
        assert_eq!(stroke.brush.radius, 5);

        assert!("1".parse::<PaintStroke>().is_err());
        assert!("a,b".parse::<PaintStroke>().is_err());
        assert!("0,0,-1".parse::<PaintStroke>().is_err());
    }
}
