use std::path::PathBuf;

use fregg_engine::{LevelPack, Session};
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::input_tape::InputTape;
use super::{scripts, AppError};

const START_LEVEL_ENV_VAR: &str = "FREGG_LEVEL";
const FRAMES_ENV_VAR: &str = "FREGG_FRAMES";
const LEVELS_ENV_VAR: &str = "FREGG_LEVELS";
const INPUT_ENV_VAR: &str = "FREGG_INPUT";
const TUTORIALS_ENV_VAR: &str = "FREGG_TUTORIALS";

const BUILTIN_LEVELS: &str = include_str!("../../assets/levels.json");

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RunConfig {
    pub(crate) start_level: usize,
    /// Ticks to simulate before the run ends.
    pub(crate) frames: u64,
    pub(crate) levels_path: Option<PathBuf>,
    pub(crate) input_path: Option<PathBuf>,
    pub(crate) tutorials_enabled: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            start_level: 0,
            frames: 60 * 60,
            levels_path: None,
            input_path: None,
            tutorials_enabled: true,
        }
    }
}

impl RunConfig {
    pub(crate) fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Overrides the defaults with whatever `lookup` reports as set.
    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let mut config = Self::default();
        if let Some(raw) = lookup(START_LEVEL_ENV_VAR) {
            config.start_level = parse_number(START_LEVEL_ENV_VAR, &raw)?;
        }
        if let Some(raw) = lookup(FRAMES_ENV_VAR) {
            config.frames = parse_number(FRAMES_ENV_VAR, &raw)?;
        }
        config.levels_path = lookup(LEVELS_ENV_VAR)
            .filter(|raw| !raw.trim().is_empty())
            .map(PathBuf::from);
        config.input_path = lookup(INPUT_ENV_VAR)
            .filter(|raw| !raw.trim().is_empty())
            .map(PathBuf::from);
        if let Some(raw) = lookup(TUTORIALS_ENV_VAR) {
            config.tutorials_enabled = match raw.trim() {
                "0" | "false" | "off" => false,
                "1" | "true" | "on" => true,
                _ => {
                    return Err(AppError::Config {
                        var: TUTORIALS_ENV_VAR,
                        value: raw,
                        reason: "expected 0 or 1".to_string(),
                    })
                }
            };
        }
        Ok(config)
    }
}

fn parse_number<T>(var: &'static str, raw: &str) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|err| AppError::Config {
        var,
        value: raw.to_string(),
        reason: err.to_string(),
    })
}

pub(crate) struct AppWiring {
    pub(crate) config: RunConfig,
    pub(crate) session: Session,
    pub(crate) tape: InputTape,
}

pub(crate) fn build_app() -> Result<AppWiring, AppError> {
    init_tracing();
    info!("=== Fregg Startup ===");

    let config = RunConfig::from_env()?;
    wire(config)
}

pub(crate) fn wire(config: RunConfig) -> Result<AppWiring, AppError> {
    let pack = match &config.levels_path {
        Some(path) => LevelPack::load(path)?,
        None => LevelPack::from_json_str(BUILTIN_LEVELS)?,
    };
    let tape = match &config.input_path {
        Some(path) => InputTape::load(path)?,
        None => InputTape::idle(),
    };
    info!(
        levels = pack.len(),
        start_level = config.start_level,
        frames = config.frames,
        tape_steps = tape.len(),
        tutorials = config.tutorials_enabled,
        "run_configured"
    );
    let session = Session::new(
        pack,
        scripts::script_for,
        config.tutorials_enabled,
        config.start_level,
    )?;

    Ok(AppWiring {
        config,
        session,
        tape,
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_without_overrides() {
        let config = RunConfig::from_lookup(lookup(&[])).expect("config");
        assert_eq!(config, RunConfig::default());
    }

    #[test]
    fn env_overrides_are_parsed() {
        let config = RunConfig::from_lookup(lookup(&[
            (START_LEVEL_ENV_VAR, "2"),
            (FRAMES_ENV_VAR, " 90 "),
            (LEVELS_ENV_VAR, "pack.json"),
            (TUTORIALS_ENV_VAR, "0"),
        ]))
        .expect("config");
        assert_eq!(config.start_level, 2);
        assert_eq!(config.frames, 90);
        assert_eq!(config.levels_path, Some(PathBuf::from("pack.json")));
        assert_eq!(config.input_path, None);
        assert!(!config.tutorials_enabled);
    }

    #[test]
    fn invalid_values_are_startup_errors() {
        let err = RunConfig::from_lookup(lookup(&[(FRAMES_ENV_VAR, "lots")]))
            .expect_err("frames must be a number");
        assert!(matches!(err, AppError::Config { var: FRAMES_ENV_VAR, .. }));

        let err = RunConfig::from_lookup(lookup(&[(TUTORIALS_ENV_VAR, "maybe")]))
            .expect_err("tutorials flag must be boolean");
        assert!(err.to_string().contains(TUTORIALS_ENV_VAR));
    }

    #[test]
    fn builtin_pack_wires_a_session() {
        let app = wire(RunConfig::default()).expect("wire");
        assert_eq!(app.session.level_index(), 0);
        assert_eq!(app.session.level_count(), 6);
        assert_eq!(
            app.session.level().and_then(|level| level.script.as_deref()),
            Some(scripts::WAKE_UP)
        );
        assert_eq!(app.tape, InputTape::idle());
    }

    #[test]
    fn start_level_past_the_pack_fails() {
        let config = RunConfig {
            start_level: 99,
            ..RunConfig::default()
        };
        assert!(matches!(wire(config), Err(AppError::Session(_))));
    }

    #[test]
    fn level_pack_and_tape_load_from_disk() {
        let temp = TempDir::new().expect("temp");
        let levels = temp.path().join("levels.json");
        let tape = temp.path().join("tape.json");
        fs::write(
            &levels,
            r###"{ "levels": [ { "name": "only", "eggs": 0, "layout": ["*@", "##"] } ] }"###,
        )
        .expect("write levels");
        fs::write(&tape, r#"{ "steps": [ { "frame": 0, "down": ["right"] } ] }"#)
            .expect("write tape");

        let app = wire(RunConfig {
            levels_path: Some(levels),
            input_path: Some(tape),
            ..RunConfig::default()
        })
        .expect("wire");
        assert_eq!(app.session.level_count(), 1);
        assert_eq!(app.tape.len(), 1);

        let broken = temp.path().join("broken.json");
        fs::write(&broken, "{").expect("write broken");
        let err = wire(RunConfig {
            levels_path: Some(broken),
            ..RunConfig::default()
        })
        .err()
        .expect("broken pack");
        assert!(matches!(err, AppError::LevelPack(_)));
    }
}
