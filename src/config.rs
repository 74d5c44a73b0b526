//! Configuration store: parse, validate, resolve
//!
//! Implements the two-level configuration model: a global `[ADMUTE]` section
//! plus one section per mode (only `[MUTIFY]` today). Mode-specific entries
//! override global entries at resolution time.
//!
//! # Validation
//!
//! Section and entry names are checked against static allow-lists; unknown
//! names are errors, never silently ignored. Values are validated where a
//! contract exists (`Mode` must name a known mode, `WaitBeforeUnmute` must be
//! a non-negative float). `ShowNotification` is never invalid: any raw value
//! other than a case-insensitive `"false"` coerces to `true`.
//!
//! # Lifecycle
//!
//! The store is immutable once built. `resolve()` and the lookup operations
//! are pure queries over the parsed state and idempotent.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::{Ini, Properties};

use crate::error::ConfigError;

/// Name of the global configuration section
pub const GLOBAL_SECTION: &str = "ADMUTE";

/// Entry name for the mode selector
pub const MODE: &str = "Mode";
/// Entry name for the notification toggle
pub const SHOW_NOTIFICATION: &str = "ShowNotification";
/// Entry name for the unmute delay in seconds
pub const WAIT_BEFORE_UNMUTE: &str = "WaitBeforeUnmute";

const GLOBAL_ENTRIES: &[&str] = &[MODE, SHOW_NOTIFICATION, WAIT_BEFORE_UNMUTE];
const MODE_ENTRIES: &[&str] = &[SHOW_NOTIFICATION, WAIT_BEFORE_UNMUTE];

/// Mute mode selector
///
/// Currently only one mode exists, but the configuration schema and the
/// strategy factory anticipate more.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Mutify,
}

impl Mode {
    /// All recognized modes, for validation hints
    pub const ALL: &'static [Mode] = &[Mode::Mutify];

    pub fn parse(name: &str) -> Option<Mode> {
        match name {
            "MUTIFY" => Some(Mode::Mutify),
            _ => None,
        }
    }

    /// The mode's configuration section name (identical to its value syntax)
    pub fn section_name(&self) -> &'static str {
        match self {
            Mode::Mutify => "MUTIFY",
        }
    }

    fn allowed_hint() -> String {
        Mode::ALL
            .iter()
            .map(Mode::section_name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.section_name())
    }
}

/// A typed configuration value
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Mode(Mode),
    Bool(bool),
    Seconds(f64),
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Mode(mode) => write!(f, "{mode}"),
            ConfigValue::Bool(value) => write!(f, "{value}"),
            ConfigValue::Seconds(value) => write!(f, "{value}"),
        }
    }
}

/// Result of a single key lookup
///
/// A key naming a section yields the whole section mapping; anything else
/// yields the entry value resolved mode-first.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Section(BTreeMap<String, ConfigValue>),
    Entry(ConfigValue),
}

/// The fully merged configuration view
///
/// Computed once after a successful parse (or from compiled-in defaults) and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveConfig {
    pub mode: Mode,
    pub show_notification: bool,
    pub wait_before_unmute: f64,
}

impl EffectiveConfig {
    /// Unmute delay as a Duration
    pub fn wait_duration(&self) -> Duration {
        Duration::from_secs_f64(self.wait_before_unmute)
    }

    /// Entries in stable order, for the startup configuration dump
    pub fn entries(&self) -> [(&'static str, String); 3] {
        [
            (MODE, self.mode.to_string()),
            (SHOW_NOTIFICATION, self.show_notification.to_string()),
            (WAIT_BEFORE_UNMUTE, self.wait_before_unmute.to_string()),
        ]
    }
}

/// Parsed and validated configuration
#[derive(Debug, Clone)]
pub struct ConfigStore {
    file: Option<PathBuf>,
    global: BTreeMap<String, ConfigValue>,
    mode_sections: BTreeMap<&'static str, BTreeMap<String, ConfigValue>>,
}

impl Default for ConfigStore {
    /// Compiled-in defaults: `Mode=MUTIFY`, `ShowNotification=true`,
    /// `WaitBeforeUnmute=0`
    fn default() -> Self {
        let mut global = BTreeMap::new();
        global.insert(MODE.to_string(), ConfigValue::Mode(Mode::Mutify));
        global.insert(SHOW_NOTIFICATION.to_string(), ConfigValue::Bool(true));
        global.insert(WAIT_BEFORE_UNMUTE.to_string(), ConfigValue::Seconds(0.0));

        let mode_sections = Mode::ALL
            .iter()
            .map(|mode| (mode.section_name(), BTreeMap::new()))
            .collect();

        ConfigStore {
            file: None,
            global,
            mode_sections,
        }
    }
}

impl ConfigStore {
    /// Parse and validate a configuration file
    ///
    /// Fails with `FileNotFound` when the path does not exist (the caller is
    /// expected to fall back to defaults with a warning), and with the other
    /// `ConfigError` kinds on malformed input. A parsed file must declare
    /// `Mode` in the global section; the other entries keep their compiled-in
    /// defaults when missing.
    pub fn parse(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let parsed =
            Ini::load_from_file(path).map_err(|err| ConfigError::Parse(err.to_string()))?;

        let mut store = Self::from_ini(&parsed)?;
        store.file = Some(path.to_path_buf());
        Ok(store)
    }

    fn from_ini(parsed: &Ini) -> Result<Self, ConfigError> {
        validate_sections(parsed)?;
        validate_entries(parsed)?;
        validate_mode(parsed)?;
        validate_wait_before_unmute(parsed)?;

        let mut store = Self::default();
        if let Some(props) = parsed.section(Some(GLOBAL_SECTION)) {
            apply_section(&mut store.global, props);
        }
        for mode in Mode::ALL {
            if let Some(props) = parsed.section(Some(mode.section_name())) {
                if let Some(section) = store.mode_sections.get_mut(mode.section_name()) {
                    apply_section(section, props);
                }
            }
        }
        Ok(store)
    }

    /// The file this store was parsed from, if any
    pub fn configuration_file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// The mode selected by the global section
    pub fn configured_mode(&self) -> Mode {
        match self.global.get(MODE) {
            Some(ConfigValue::Mode(mode)) => *mode,
            _ => Mode::Mutify,
        }
    }

    /// Merge the global section with the configured mode's overrides
    ///
    /// Always succeeds: defaults guarantee every entry has a value. Idempotent
    /// over the same parsed input.
    pub fn resolve(&self) -> EffectiveConfig {
        let mode = self.configured_mode();
        let overrides = &self.mode_sections[mode.section_name()];

        let show_notification = match overrides
            .get(SHOW_NOTIFICATION)
            .or_else(|| self.global.get(SHOW_NOTIFICATION))
        {
            Some(ConfigValue::Bool(value)) => *value,
            _ => true,
        };
        let wait_before_unmute = match overrides
            .get(WAIT_BEFORE_UNMUTE)
            .or_else(|| self.global.get(WAIT_BEFORE_UNMUTE))
        {
            Some(ConfigValue::Seconds(value)) => *value,
            _ => 0.0,
        };

        EffectiveConfig {
            mode,
            show_notification,
            wait_before_unmute,
        }
    }

    /// Look up a single key
    ///
    /// Resolution order: (1) a section name returns that whole section's
    /// mapping; (2) otherwise the configured mode's section is consulted
    /// first; (3) then the global section; (4) `None` when nothing matches.
    pub fn lookup_one(&self, key: &str) -> Option<Lookup> {
        if key == GLOBAL_SECTION {
            return Some(Lookup::Section(self.global.clone()));
        }
        if let Some(mode) = Mode::parse(key) {
            return Some(Lookup::Section(self.mode_sections[mode.section_name()].clone()));
        }

        let mode = self.configured_mode();
        if let Some(value) = self.mode_sections[mode.section_name()].get(key) {
            return Some(Lookup::Entry(value.clone()));
        }
        self.global.get(key).cloned().map(Lookup::Entry)
    }

    /// Batched form of `lookup_one`
    ///
    /// Returns a mapping from each requested key to its resolved value, with
    /// an explicit `None` for keys that resolve nowhere.
    pub fn lookup_many<'a, I>(&self, keys: I) -> BTreeMap<String, Option<Lookup>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        keys.into_iter()
            .map(|key| (key.to_string(), self.lookup_one(key)))
            .collect()
    }
}

fn valid_section(name: &str) -> bool {
    name == GLOBAL_SECTION || Mode::parse(name).is_some()
}

fn allowed_entries(section: &str) -> &'static [&'static str] {
    if section == GLOBAL_SECTION {
        GLOBAL_ENTRIES
    } else {
        MODE_ENTRIES
    }
}

fn validate_sections(parsed: &Ini) -> Result<(), ConfigError> {
    for (name, props) in parsed.iter() {
        match name {
            Some(name) if valid_section(name) => {}
            Some(name) => {
                return Err(ConfigError::InvalidSection {
                    section: name.to_string(),
                })
            }
            // Entries before the first section header
            None if props.iter().next().is_some() => {
                return Err(ConfigError::Parse(
                    "entries outside of any section".to_string(),
                ))
            }
            None => {}
        }
    }
    Ok(())
}

fn validate_entries(parsed: &Ini) -> Result<(), ConfigError> {
    for (name, props) in parsed.iter() {
        let Some(section) = name else { continue };
        for (entry, _) in props.iter() {
            if !allowed_entries(section).contains(&entry) {
                return Err(ConfigError::InvalidEntry {
                    section: section.to_string(),
                    entry: entry.to_string(),
                });
            }
        }
    }
    Ok(())
}

fn validate_mode(parsed: &Ini) -> Result<(), ConfigError> {
    let raw = parsed
        .section(Some(GLOBAL_SECTION))
        .and_then(|props| props.get(MODE));
    // A parsed file must declare its mode; compiled-in defaults only apply
    // when no file is given or the file is absent
    match raw {
        Some(raw) if Mode::parse(raw).is_some() => Ok(()),
        Some(raw) => Err(ConfigError::InvalidValue {
            entry: MODE.to_string(),
            value: raw.to_string(),
            allowed: Mode::allowed_hint(),
        }),
        None => Err(ConfigError::InvalidValue {
            entry: MODE.to_string(),
            value: "(not set)".to_string(),
            allowed: Mode::allowed_hint(),
        }),
    }
}

fn validate_wait_before_unmute(parsed: &Ini) -> Result<(), ConfigError> {
    for section in [GLOBAL_SECTION].iter().copied().chain(
        Mode::ALL.iter().map(Mode::section_name),
    ) {
        let raw = parsed
            .section(Some(section))
            .and_then(|props| props.get(WAIT_BEFORE_UNMUTE));
        let Some(raw) = raw else { continue };
        // Empty raw value counts as absent (falls back to global / default)
        if raw.trim().is_empty() {
            continue;
        }

        let parsed_value = raw.trim().parse::<f64>().map_err(|_| ConfigError::InvalidValue {
            entry: WAIT_BEFORE_UNMUTE.to_string(),
            value: raw.to_string(),
            allowed: "of type float".to_string(),
        })?;
        // `!(x >= 0)` also rejects NaN
        if !(parsed_value >= 0.0) {
            return Err(ConfigError::InvalidValue {
                entry: WAIT_BEFORE_UNMUTE.to_string(),
                value: raw.to_string(),
                allowed: "greater or equal zero".to_string(),
            });
        }
    }
    Ok(())
}

/// Coerce raw entries into typed values; validation has already passed
fn apply_section(section: &mut BTreeMap<String, ConfigValue>, props: &Properties) {
    for (entry, raw) in props.iter() {
        let value = match entry {
            MODE => Mode::parse(raw).map(ConfigValue::Mode),
            // Anything but a case-insensitive "false" is true
            SHOW_NOTIFICATION => Some(ConfigValue::Bool(!raw.eq_ignore_ascii_case("false"))),
            WAIT_BEFORE_UNMUTE => {
                if raw.trim().is_empty() {
                    None
                } else {
                    raw.trim().parse::<f64>().ok().map(ConfigValue::Seconds)
                }
            }
            _ => None,
        };
        if let Some(value) = value {
            section.insert(entry.to_string(), value);
        }
    }
}
