use skirmish_core::{GridBounds, GridQuery, PositionRegistry, TileCoord, UnitId};

/// Dense tile grid tracking static obstacles and unit registrations.
#[derive(Clone, Debug)]
pub(crate) struct OccupancyGrid {
    bounds: GridBounds,
    cells: Vec<Cell>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum Cell {
    #[default]
    Free,
    Obstacle,
    Occupied(UnitId),
}

impl OccupancyGrid {
    pub(crate) fn new(bounds: GridBounds) -> Self {
        let capacity_u64 = u64::from(bounds.columns()) * u64::from(bounds.rows());
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            bounds,
            cells: vec![Cell::Free; capacity],
        }
    }

    /// Rebuilds the grid with new bounds, keeping what still fits.
    pub(crate) fn resized(&self, bounds: GridBounds) -> Self {
        let mut grid = Self::new(bounds);
        for (index, cell) in self.cells.iter().enumerate() {
            if *cell == Cell::Free {
                continue;
            }
            if let Some(tile) = self.tile_at(index) {
                if let Some(slot) = grid.slot_mut(tile) {
                    *slot = *cell;
                }
            }
        }
        grid
    }

    pub(crate) const fn bounds(&self) -> GridBounds {
        self.bounds
    }

    pub(crate) fn cell(&self, tile: TileCoord) -> Option<Cell> {
        self.index(tile).and_then(|index| self.cells.get(index).copied())
    }

    /// Passability as seen by `unit`: its own registration does not block it.
    pub(crate) fn passable_for(&self, unit: UnitId, tile: TileCoord) -> bool {
        match self.cell(tile) {
            Some(Cell::Free) => true,
            Some(Cell::Occupied(occupant)) => occupant == unit,
            Some(Cell::Obstacle) | None => false,
        }
    }

    pub(crate) fn place_obstacle(&mut self, tile: TileCoord) -> bool {
        match self.slot_mut(tile) {
            Some(slot) if *slot == Cell::Free => {
                *slot = Cell::Obstacle;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn remove_obstacle(&mut self, tile: TileCoord) -> bool {
        match self.slot_mut(tile) {
            Some(slot) if *slot == Cell::Obstacle => {
                *slot = Cell::Free;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn obstacles(&self) -> impl Iterator<Item = TileCoord> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell == Cell::Obstacle)
            .filter_map(|(index, _)| self.tile_at(index))
    }

    fn slot_mut(&mut self, tile: TileCoord) -> Option<&mut Cell> {
        let index = self.index(tile)?;
        self.cells.get_mut(index)
    }

    fn index(&self, tile: TileCoord) -> Option<usize> {
        if !self.bounds.contains(tile) {
            return None;
        }
        let row = usize::try_from(tile.y()).ok()?;
        let column = usize::try_from(tile.x()).ok()?;
        let width = usize::try_from(self.bounds.columns()).ok()?;
        Some(row * width + column)
    }

    fn tile_at(&self, index: usize) -> Option<TileCoord> {
        let width = usize::try_from(self.bounds.columns()).ok()?;
        if width == 0 {
            return None;
        }
        let x = i32::try_from(index % width).ok()?;
        let y = i32::try_from(index / width).ok()?;
        Some(TileCoord::new(x, y))
    }
}

impl GridQuery for OccupancyGrid {
    fn is_passable(&self, tile: TileCoord) -> bool {
        self.cell(tile) == Some(Cell::Free)
    }
}

impl PositionRegistry for OccupancyGrid {
    fn register_position(&mut self, unit: UnitId, tile: TileCoord) {
        if let Some(slot) = self.slot_mut(tile) {
            *slot = Cell::Occupied(unit);
        }
    }

    fn update_position(&mut self, unit: UnitId, from: TileCoord, to: TileCoord) {
        self.remove_position(unit, from);
        self.register_position(unit, to);
    }

    fn remove_position(&mut self, unit: UnitId, tile: TileCoord) {
        if let Some(slot) = self.slot_mut(tile) {
            if *slot == Cell::Occupied(unit) {
                *slot = Cell::Free;
            }
        }
    }

    fn occupant(&self, tile: TileCoord) -> Option<UnitId> {
        match self.cell(tile) {
            Some(Cell::Occupied(unit)) => Some(unit),
            _ => None,
        }
    }
}
