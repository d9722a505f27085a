use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tiles::{parse_layout, parse_rows, LayoutError, TileGrid};

/// A playable level: the parsed grid plus its egg budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    pub name: String,
    pub eggs: u32,
    pub grid: TileGrid,
    /// Id of the tutorial script driving this level, if any.
    pub script: Option<String>,
}

impl Level {
    pub fn parse(name: impl Into<String>, eggs: u32, layout: &str) -> Result<Self, LayoutError> {
        Ok(Self {
            name: name.into(),
            eggs,
            grid: parse_layout(layout)?,
            script: None,
        })
    }

    pub fn with_script(mut self, script: impl Into<String>) -> Self {
        self.script = Some(script.into());
        self
    }
}

/// On-disk form of a level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LevelDef {
    pub name: String,
    pub eggs: u32,
    pub layout: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
}

impl LevelDef {
    pub fn to_level(&self) -> Result<Level, LayoutError> {
        Ok(Level {
            name: self.name.clone(),
            eggs: self.eggs,
            grid: parse_rows(&self.layout)?,
            script: self.script.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct LevelPackFile {
    levels: Vec<LevelDef>,
}

#[derive(Debug, Error)]
pub enum LevelPackError {
    #[error("failed to read level pack {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("level pack json is invalid at {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("level {index} ({name}) has a bad layout: {source}")]
    Layout {
        index: usize,
        name: String,
        #[source]
        source: LayoutError,
    },
    #[error("level pack has no levels")]
    Empty,
}

/// An ordered, validated list of levels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelPack {
    levels: Vec<Level>,
}

impl LevelPack {
    pub fn new(levels: Vec<Level>) -> Result<Self, LevelPackError> {
        if levels.is_empty() {
            return Err(LevelPackError::Empty);
        }
        Ok(Self { levels })
    }

    pub fn from_defs(defs: &[LevelDef]) -> Result<Self, LevelPackError> {
        let levels = defs
            .iter()
            .enumerate()
            .map(|(index, def)| {
                def.to_level().map_err(|source| LevelPackError::Layout {
                    index,
                    name: def.name.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(levels)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, LevelPackError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        let file: LevelPackFile = serde_path_to_error::deserialize(&mut deserializer).map_err(
            |error| LevelPackError::Decode {
                path: error.path().to_string(),
                source: error.into_inner(),
            },
        )?;
        Self::from_defs(&file.levels)
    }

    pub fn load(path: &Path) -> Result<Self, LevelPackError> {
        let raw = fs::read_to_string(path).map_err(|source| LevelPackError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Level> {
        self.levels.get(index)
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }
}
