use thiserror::Error;

/// Side length of one grid cell in world units.
pub const TILE_SIZE: f32 = 16.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TileKind {
    #[default]
    Air,
    SpawnPoint,
    Block,
    EggableBlock,
    Platform,
    Gate,
    ShadowGate,
    Door,
}

impl TileKind {
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '.' => Some(Self::Air),
            '*' => Some(Self::SpawnPoint),
            '#' => Some(Self::Block),
            '&' => Some(Self::EggableBlock),
            '-' => Some(Self::Platform),
            '%' => Some(Self::Gate),
            '$' => Some(Self::ShadowGate),
            '@' => Some(Self::Door),
            _ => None,
        }
    }
}

/// Collision capability carried by every physical body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyKind {
    Inert,
    PrimaryCharacter,
    SecondaryCharacter,
}

/// What the oracle needs to know about the body asking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionProbe {
    pub kind: BodyKind,
    pub vy: f32,
}

pub trait TileOracle {
    fn is_collidable(&self, tile_x: i32, tile_y: i32, probe: CollisionProbe) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("layout has no rows")]
    Empty,
    #[error("unknown tile symbol {symbol:?} at row {row}, column {column}")]
    UnknownSymbol {
        row: usize,
        column: usize,
        symbol: char,
    },
}

/// Row-major tile storage. Rows may differ in length; every cell outside the
/// stored rows reads as air.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TileGrid {
    rows: Vec<Vec<TileKind>>,
}

impl TileGrid {
    pub fn new(rows: Vec<Vec<TileKind>>) -> Self {
        Self { rows }
    }

    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn tile_at(&self, x: i32, y: i32) -> TileKind {
        if x < 0 || y < 0 {
            return TileKind::Air;
        }
        self.rows
            .get(y as usize)
            .and_then(|row| row.get(x as usize))
            .copied()
            .unwrap_or(TileKind::Air)
    }

    pub fn cells(&self) -> impl Iterator<Item = (i32, i32, TileKind)> + '_ {
        self.rows.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .map(move |(x, kind)| (x as i32, y as i32, *kind))
        })
    }
}

impl TileOracle for TileGrid {
    fn is_collidable(&self, tile_x: i32, tile_y: i32, probe: CollisionProbe) -> bool {
        match self.tile_at(tile_x, tile_y) {
            TileKind::Block | TileKind::EggableBlock => true,
            TileKind::Platform => probe.vy > 0.0,
            TileKind::Gate => probe.kind != BodyKind::PrimaryCharacter,
            TileKind::ShadowGate => probe.kind != BodyKind::SecondaryCharacter,
            TileKind::Air | TileKind::SpawnPoint | TileKind::Door => false,
        }
    }
}

/// Parses a text layout, one row per line, surrounding whitespace ignored.
pub fn parse_layout(layout: &str) -> Result<TileGrid, LayoutError> {
    let trimmed = layout.trim();
    if trimmed.is_empty() {
        return Err(LayoutError::Empty);
    }
    let rows = trimmed
        .lines()
        .enumerate()
        .map(|(row, line)| parse_row(row, line))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(TileGrid::new(rows))
}

pub(crate) fn parse_rows<S: AsRef<str>>(rows: &[S]) -> Result<TileGrid, LayoutError> {
    if rows.is_empty() {
        return Err(LayoutError::Empty);
    }
    let rows = rows
        .iter()
        .enumerate()
        .map(|(row, line)| parse_row(row, line.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(TileGrid::new(rows))
}

fn parse_row(row: usize, line: &str) -> Result<Vec<TileKind>, LayoutError> {
    line.trim()
        .chars()
        .enumerate()
        .map(|(column, symbol)| {
            TileKind::from_symbol(symbol).ok_or(LayoutError::UnknownSymbol {
                row,
                column,
                symbol,
            })
        })
        .collect()
}
