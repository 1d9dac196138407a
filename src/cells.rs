//! Cell Index
//!
//! Flattens every cell of every bed into one variable space and computes the
//! Moore (8-direction) neighbor graph. Beds never share neighbors.
//!
//! Cells are addressed two ways:
//!   - `CellId`: structured `(bed_id, row, col)` key, used at the API boundary
//!   - dense position (`usize`): index into `CellIndex::cells()`, used in hot loops
//!
//! Positions are assigned bed by bed in input order, row-major within a bed.

use crate::data::GardenBedConfig;
use crate::error::{PlannerError, Result};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

/// Moore neighborhood offsets, excluding (0, 0)
const NEIGHBOR_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Composite address of one cell
///
/// Equality and hashing cover all three parts, so bed ids may contain any
/// character (including `-` and `,`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId {
    pub bed_id: Arc<str>,
    pub row: usize,
    pub col: usize,
}

impl CellId {
    /// The `"row,col"` key used in solution output
    pub fn coord_key(&self) -> String {
        format!("{},{}", self.row, self.col)
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{},{}]", self.bed_id, self.row, self.col)
    }
}

/// Neighbor list for one cell (never more than 8 entries)
pub type NeighborList = SmallVec<[usize; 8]>;

/// All cells across all beds plus their adjacency
#[derive(Debug, Clone)]
pub struct CellIndex {
    beds: Vec<GardenBedConfig>,
    cells: Vec<CellId>,
    /// First cell position of each bed
    bed_offsets: Vec<usize>,
    /// Bed ordinal (into `beds`) for each cell position
    cell_bed: Vec<usize>,
    positions: FxHashMap<CellId, usize>,
    neighbors: Vec<NeighborList>,
}

impl CellIndex {
    /// Enumerate cells and compute neighbors for an ordered list of beds
    pub fn build(beds: &[GardenBedConfig]) -> Result<Self> {
        let mut seen_ids: FxHashSet<&str> = FxHashSet::default();
        let mut total = 0usize;

        for bed in beds {
            if bed.grid_size == 0 {
                return Err(PlannerError::InvalidGridSize {
                    bed_id: bed.id.clone(),
                    grid_size: bed.grid_size,
                });
            }
            if !seen_ids.insert(bed.id.as_str()) {
                return Err(PlannerError::DuplicateBedId(bed.id.clone()));
            }
            total += bed.grid_size * bed.grid_size;
        }

        let mut cells = Vec::with_capacity(total);
        let mut cell_bed = Vec::with_capacity(total);
        let mut neighbors = Vec::with_capacity(total);
        let mut bed_offsets = Vec::with_capacity(beds.len());

        for (bed_ordinal, bed) in beds.iter().enumerate() {
            let bed_id: Arc<str> = Arc::from(bed.id.as_str());
            let offset = cells.len();
            let size = bed.grid_size;
            bed_offsets.push(offset);

            for row in 0..size {
                for col in 0..size {
                    cells.push(CellId {
                        bed_id: Arc::clone(&bed_id),
                        row,
                        col,
                    });
                    cell_bed.push(bed_ordinal);
                    neighbors.push(bed_neighbors(offset, size, row, col));
                }
            }
        }

        let positions = cells
            .iter()
            .enumerate()
            .map(|(idx, cell)| (cell.clone(), idx))
            .collect();

        Ok(Self {
            beds: beds.to_vec(),
            bed_offsets,
            cells,
            cell_bed,
            positions,
            neighbors,
        })
    }

    /// Validated constructor for a `CellId`
    pub fn cell_id(&self, bed_id: &str, row: usize, col: usize) -> Result<CellId> {
        let out_of_bounds = |grid_size| PlannerError::CellOutOfBounds {
            bed_id: bed_id.to_string(),
            row,
            col,
            grid_size,
        };

        let ordinal = self
            .beds
            .iter()
            .position(|b| b.id == bed_id)
            .ok_or_else(|| out_of_bounds(0))?;
        let size = self.beds[ordinal].grid_size;

        if row >= size || col >= size {
            return Err(out_of_bounds(size));
        }

        Ok(self.cells[self.bed_offsets[ordinal] + row * size + col].clone())
    }

    pub fn beds(&self) -> &[GardenBedConfig] {
        &self.beds
    }

    pub fn cells(&self) -> &[CellId] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell(&self, position: usize) -> &CellId {
        &self.cells[position]
    }

    pub fn position_of(&self, cell: &CellId) -> Option<usize> {
        self.positions.get(cell).copied()
    }

    /// Bed that owns the cell at `position`
    pub fn bed_at(&self, position: usize) -> &GardenBedConfig {
        &self.beds[self.cell_bed[position]]
    }

    /// `CellId → bedId` lookup
    pub fn bed_of(&self, cell: &CellId) -> Option<&GardenBedConfig> {
        self.position_of(cell).map(|p| self.bed_at(p))
    }

    pub fn neighbors(&self, position: usize) -> &[usize] {
        &self.neighbors[position]
    }

    pub fn neighbor_ids(&self, cell: &CellId) -> Vec<&CellId> {
        match self.position_of(cell) {
            Some(p) => self.neighbors[p].iter().map(|&n| &self.cells[n]).collect(),
            None => Vec::new(),
        }
    }

    pub fn are_neighbors(&self, a: usize, b: usize) -> bool {
        self.neighbors[a].contains(&b)
    }

    /// Neighbor graph keyed by `CellId`, the shape the search primitive takes
    pub fn neighbor_map(&self) -> FxHashMap<CellId, Vec<CellId>> {
        self.cells
            .iter()
            .zip(&self.neighbors)
            .map(|(cell, list)| {
                let ids = list.iter().map(|&n| self.cells[n].clone()).collect();
                (cell.clone(), ids)
            })
            .collect()
    }
}

/// In-bounds Moore neighbors of `(row, col)` within one bed starting at `offset`
fn bed_neighbors(offset: usize, size: usize, row: usize, col: usize) -> NeighborList {
    let mut list = NeighborList::new();
    for (dr, dc) in NEIGHBOR_OFFSETS {
        let (Some(r), Some(c)) = (row.checked_add_signed(dr), col.checked_add_signed(dc)) else {
            continue;
        };
        if r < size && c < size {
            list.push(offset + r * size + c);
        }
    }
    list
}
