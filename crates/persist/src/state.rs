//! Plain-text program state file.
//!
//! Layout, one value per line:
//! ```text
//! clear_color.r
//! clear_color.g
//! clear_color.b
//! overlay_enabled      (0 or 1)
//! camera_position.x
//! camera_position.y
//! camera_position.z
//! camera_front.x
//! camera_front.y
//! camera_front.z
//! ```
//! Readers split on any whitespace, so hand-edited files with values on
//! one line load as well.

use glam::Vec3;
use std::fmt::Write as _;
use std::path::Path;

/// Field names in file order.
const FIELDS: [&str; 10] = [
    "clear_color.r",
    "clear_color.g",
    "clear_color.b",
    "overlay_enabled",
    "camera_position.x",
    "camera_position.y",
    "camera_position.z",
    "camera_front.x",
    "camera_front.y",
    "camera_front.z",
];

/// Errors from reading or writing the state file.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid value for {field}: {value:?}")]
    Parse { field: &'static str, value: String },
    #[error("state file ends before {field}")]
    Truncated { field: &'static str },
}

/// Session state that survives restarts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgramState {
    pub clear_color: Vec3,
    pub overlay_enabled: bool,
    pub camera_position: Vec3,
    pub camera_front: Vec3,
}

impl Default for ProgramState {
    fn default() -> Self {
        Self {
            clear_color: Vec3::ZERO,
            overlay_enabled: false,
            camera_position: Vec3::new(0.0, 0.0, 3.0),
            camera_front: Vec3::NEG_Z,
        }
    }
}

impl ProgramState {
    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StateError> {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("no state file at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        let state = Self::parse(&text)?;
        tracing::info!("program state loaded from {}", path.display());
        Ok(state)
    }

    /// Write to `path`, replacing any previous file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), StateError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_text())?;
        tracing::info!("program state saved to {}", path.display());
        Ok(())
    }

    /// Parse the whitespace-separated field sequence. Trailing tokens are ignored.
    pub fn parse(text: &str) -> Result<Self, StateError> {
        let mut tokens = text.split_whitespace();
        let mut floats = [0.0_f32; 9];
        let mut overlay_enabled = false;
        let mut next_float = 0;

        for field in FIELDS {
            let token = tokens.next().ok_or(StateError::Truncated { field })?;
            if field == "overlay_enabled" {
                overlay_enabled = parse_bool(field, token)?;
            } else {
                floats[next_float] = token.parse().map_err(|_| StateError::Parse {
                    field,
                    value: token.to_string(),
                })?;
                next_float += 1;
            }
        }

        Ok(Self {
            clear_color: Vec3::new(floats[0], floats[1], floats[2]),
            overlay_enabled,
            camera_position: Vec3::new(floats[3], floats[4], floats[5]),
            camera_front: Vec3::new(floats[6], floats[7], floats[8]),
        })
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for v in self.clear_color.to_array() {
            let _ = writeln!(out, "{v}");
        }
        let _ = writeln!(out, "{}", u8::from(self.overlay_enabled));
        for v in self
            .camera_position
            .to_array()
            .into_iter()
            .chain(self.camera_front.to_array())
        {
            let _ = writeln!(out, "{v}");
        }
        out
    }
}

fn parse_bool(field: &'static str, token: &str) -> Result<bool, StateError> {
    match token {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(StateError::Parse {
            field,
            value: token.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ProgramState {
        ProgramState {
            clear_color: Vec3::new(0.1, 0.2, 0.3),
            overlay_enabled: true,
            camera_position: Vec3::new(4.5, 1.25, -8.0),
            camera_front: Vec3::new(0.0, -0.6, -0.8),
        }
    }

    #[test]
    fn missing_file_yields_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let state = ProgramState::load(tmp.path().join("program_state.txt")).unwrap();
        assert_eq!(state, ProgramState::default());
    }

    #[test]
    fn save_then_load() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("resources").join("program_state.txt");
        sample().save(&path).unwrap();
        assert_eq!(ProgramState::load(&path).unwrap(), sample());
    }

    #[test]
    fn file_has_one_value_per_line_in_field_order() {
        let text = sample().to_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), FIELDS.len());
        assert_eq!(lines[0], "0.1");
        assert_eq!(lines[3], "1");
        assert_eq!(lines[6], "-8");
    }

    #[test]
    fn parses_values_on_a_single_line() {
        let state = ProgramState::parse("0 0 0 0 1 2 3 0 0 -1").unwrap();
        assert!(!state.overlay_enabled);
        assert_eq!(state.camera_position, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn truncated_file_is_reported() {
        match ProgramState::parse("0.5\n0.5\n0.5\n1\n") {
            Err(StateError::Truncated { field }) => assert_eq!(field, "camera_position.x"),
            other => panic!("expected Truncated, got {other:?}"),
        }
    }

    #[test]
    fn bad_flag_is_reported() {
        match ProgramState::parse("0 0 0 yes 0 0 3 0 0 -1") {
            Err(StateError::Parse { field, value }) => {
                assert_eq!(field, "overlay_enabled");
                assert_eq!(value, "yes");
            }
            other => panic!("expected Parse, got {other:?}"),
        }
    }

    #[test]
    fn bad_float_is_reported() {
        let err = ProgramState::parse("0 0 0 0 x 0 3 0 0 -1").unwrap_err();
        assert!(err.to_string().contains("camera_position.x"));
    }
}
