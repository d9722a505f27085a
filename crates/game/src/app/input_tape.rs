use std::fs;
use std::path::{Path, PathBuf};

use fregg_engine::{Button, ButtonSet};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum InputTapeError {
    #[error("failed to read input tape {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("input tape json is invalid at {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("input tape step {index} at frame {frame} comes before frame {previous}")]
    Unsorted {
        index: usize,
        frame: u64,
        previous: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
struct TapeStep {
    frame: u64,
    #[serde(default)]
    down: Vec<Button>,
    #[serde(default)]
    click: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
struct TapeFile {
    steps: Vec<TapeStep>,
}

/// Scripted input for headless runs. Each step's held buttons apply from its
/// frame until the next step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct InputTape {
    steps: Vec<(u64, ButtonSet, bool)>,
}

impl InputTape {
    pub(crate) fn idle() -> Self {
        Self::default()
    }

    pub(crate) fn from_json_str(raw: &str) -> Result<Self, InputTapeError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        let file: TapeFile = serde_path_to_error::deserialize(&mut deserializer).map_err(
            |error| InputTapeError::Decode {
                path: error.path().to_string(),
                source: error.into_inner(),
            },
        )?;

        let mut steps = Vec::with_capacity(file.steps.len());
        for (index, step) in file.steps.into_iter().enumerate() {
            if let Some(&(previous, _, _)) = steps.last() {
                if step.frame < previous {
                    return Err(InputTapeError::Unsorted {
                        index,
                        frame: step.frame,
                        previous,
                    });
                }
            }
            let held: ButtonSet = step.down.into_iter().collect();
            steps.push((step.frame, held, step.click));
        }
        Ok(Self { steps })
    }

    pub(crate) fn load(path: &Path) -> Result<Self, InputTapeError> {
        let raw = fs::read_to_string(path).map_err(|source| InputTapeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Buttons held and pointer state on `frame`.
    pub(crate) fn at(&self, frame: u64) -> (ButtonSet, bool) {
        let upcoming = self.steps.partition_point(|(start, _, _)| *start <= frame);
        match upcoming.checked_sub(1).and_then(|index| self.steps.get(index)) {
            Some(&(_, held, click)) => (held, click),
            None => (ButtonSet::empty(), false),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.steps.len()
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    const TAPE: &str = r#"{
        "steps": [
            { "frame": 10, "down": ["right"] },
            { "frame": 20, "down": ["right", "up"], "click": true },
            { "frame": 25 }
        ]
    }"#;

    #[test]
    fn held_set_spans_until_the_next_step() {
        let tape = InputTape::from_json_str(TAPE).expect("tape");
        assert_eq!(tape.len(), 3);
        assert_eq!(tape.at(0), (ButtonSet::empty(), false));
        assert_eq!(tape.at(10), (ButtonSet::empty().with(Button::Right), false));
        assert_eq!(tape.at(19), (ButtonSet::empty().with(Button::Right), false));
        let jump = ButtonSet::empty().with(Button::Right).with(Button::Up);
        assert_eq!(tape.at(20), (jump, true));
        assert_eq!(tape.at(1000), (ButtonSet::empty(), false));
    }

    #[test]
    fn idle_tape_never_presses_anything() {
        assert_eq!(InputTape::idle().at(42), (ButtonSet::empty(), false));
    }

    #[test]
    fn rejects_out_of_order_steps() {
        let raw = r#"{ "steps": [ { "frame": 5 }, { "frame": 3 } ] }"#;
        assert!(matches!(
            InputTape::from_json_str(raw),
            Err(InputTapeError::Unsorted {
                index: 1,
                frame: 3,
                previous: 5
            })
        ));
    }

    #[test]
    fn unknown_button_reports_its_path() {
        let raw = r#"{ "steps": [ { "frame": 0, "down": ["start"] } ] }"#;
        let error = InputTape::from_json_str(raw).expect_err("start is not a button");
        assert!(error.to_string().contains("steps[0].down[0]"), "{error}");
    }

    #[test]
    fn loads_from_disk() {
        let temp = TempDir::new().expect("temp");
        let path = temp.path().join("tape.json");
        fs::write(&path, TAPE).expect("write");
        assert_eq!(InputTape::load(&path).expect("load").len(), 3);
        assert!(matches!(
            InputTape::load(&temp.path().join("nope.json")),
            Err(InputTapeError::Io { .. })
        ));
    }
}
