//! strum.toml - optional settings file
//!
//! Every section is optional. A missing file means defaults everywhere:
//! standard tuning, default note shaping, no chords (open strings only).
//!
//! ```toml
//! [synth]
//! master_gain = 0.4
//!
//! [output]
//! max_voices = 24
//!
//! [keys]
//! strings = "asdfgh"
//!
//! [[chords]]
//! name = "Em"
//! frets = [0, 2, 2, 0, 0, 0]
//! ```

use std::path::{Path, PathBuf};

use color_eyre::eyre::{bail, eyre, Result as EyreResult, WrapErr};
use serde::Deserialize;
use strum_dsp::{
    fretboard::{ChordShape, StringTuning, Tuning, BASE_FREQ, STRING_COUNT},
    io::OutputOptions,
    synth::SynthParams,
};
use tracing::info;

/// File picked up from the working directory when no --config is given.
pub const DEFAULT_CONFIG_FILE: &str = "strum.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StrumConfig {
    pub synth: SynthParams,
    pub output: OutputOptions,
    pub tuning: Option<TuningConfig>,
    pub chords: Vec<ChordShape>,
    pub keys: KeyConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TuningConfig {
    #[serde(default = "default_base_frequency")]
    pub base_frequency: f64,
    pub strings: Vec<StringTuning>,
}

fn default_base_frequency() -> f64 {
    BASE_FREQ
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KeyConfig {
    /// One key per string, low E first
    pub strings: String,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            strings: "asdfgh".to_string(),
        }
    }
}

impl KeyConfig {
    pub fn string_keys(&self) -> EyreResult<[char; STRING_COUNT]> {
        let keys: Vec<char> = self.strings.chars().map(|c| c.to_ascii_lowercase()).collect();
        let keys: [char; STRING_COUNT] = keys.try_into().map_err(|keys: Vec<char>| {
            eyre!(
                "[keys] strings needs {} keys, got {} ({:?})",
                STRING_COUNT,
                keys.len(),
                self.strings
            )
        })?;

        for (i, key) in keys.iter().enumerate() {
            if key.is_ascii_digit() || *key == ' ' || *key == 'q' {
                bail!("key {:?} for string {} clashes with a built-in binding", key, i);
            }
            if keys[..i].contains(key) {
                bail!("key {:?} is bound to more than one string", key);
            }
        }

        Ok(keys)
    }
}

impl StrumConfig {
    /// Load `path`, or `strum.toml` from the working directory if it exists,
    /// or fall back to defaults.
    pub fn load(path: Option<&Path>) -> EyreResult<Self> {
        let path: PathBuf = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !fallback.exists() {
                    return Ok(Self::default());
                }
                fallback
            }
        };

        let text = std::fs::read_to_string(&path)
            .wrap_err_with(|| format!("failed to read {}", path.display()))?;
        let config = Self::parse(&text).wrap_err_with(|| format!("invalid config {}", path.display()))?;

        info!(path = %path.display(), chords = config.chords.len(), "loaded config");
        Ok(config)
    }

    pub fn parse(text: &str) -> EyreResult<Self> {
        let config: Self = toml::from_str(text)?;
        // Fail early on bad tunings and key maps rather than mid-session
        config.tuning()?;
        config.keys.string_keys()?;
        Ok(config)
    }

    pub fn tuning(&self) -> EyreResult<Tuning> {
        match &self.tuning {
            None => Ok(Tuning::standard()),
            Some(custom) => Tuning::new(custom.strings.clone(), custom.base_frequency)
                .wrap_err("invalid [tuning]"),
        }
    }

    /// Case-sensitive lookup ("Am" and "AM" are different chords).
    pub fn chord(&self, name: &str) -> Option<&ChordShape> {
        self.chords.iter().find(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        let config = StrumConfig::parse("").unwrap();
        assert_eq!(config.synth, SynthParams::default());
        assert_eq!(config.output, OutputOptions::default());
        assert!(config.chords.is_empty());
        assert_eq!(config.tuning().unwrap(), Tuning::standard());
        assert_eq!(config.keys.string_keys().unwrap(), ['a', 's', 'd', 'f', 'g', 'h']);
    }

    #[test]
    fn reads_chords_and_partial_sections() {
        let config = StrumConfig::parse(
            r#"
            [synth]
            master_gain = 0.3

            [output]
            max_voices = 12

            [[chords]]
            name = "Am"
            frets = [-1, 0, 2, 2, 1, 0]
            "#,
        )
        .unwrap();

        assert_eq!(config.synth.master_gain, 0.3);
        assert_eq!(config.synth.duration, 3.0);
        assert_eq!(config.output.max_voices, Some(12));
        assert!(config.chord("Am").unwrap().is_muted(0));
        assert!(config.chord("am").is_none());
    }

    #[test]
    fn rejects_invalid_tuning() {
        let err = StrumConfig::parse(
            r#"
            [tuning]
            strings = [
                { name = "E", semitone_offset = 0 },
                { name = "A", semitone_offset = 5 },
            ]
            "#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn rejects_bad_key_maps() {
        assert!(StrumConfig::parse("[keys]\nstrings = \"asd\"").is_err());
        assert!(StrumConfig::parse("[keys]\nstrings = \"aadfgh\"").is_err());
        assert!(StrumConfig::parse("[keys]\nstrings = \"a1dfgh\"").is_err());
    }
}
