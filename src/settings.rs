//! Toy settings and preferences
//!
//! Persisted in LocalStorage as one JSON document. Every tunable is an
//! explicit field; the pattern menu edits them through [`PatternSetting`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::platform;
use crate::sim::ColorRange;

/// Errors from the settings form protocol
#[derive(Debug, Error, PartialEq)]
pub enum SettingsError {
    #[error("unknown setting: {0}")]
    UnknownField(String),
    #[error("invalid value {value:?} for setting {field}")]
    InvalidValue { field: String, value: String },
}

/// Where new pattern buds start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OriginChoice {
    /// Canvas center with jitter, random target
    #[default]
    Center,
    /// Anywhere on the canvas, random target
    Full,
    /// Mirrored around the cursor, cursor is the target
    Cursor,
}

impl OriginChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            OriginChoice::Center => "center",
            OriginChoice::Full => "full",
            OriginChoice::Cursor => "cursor",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "center" => Some(OriginChoice::Center),
            "full" => Some(OriginChoice::Full),
            "cursor" => Some(OriginChoice::Cursor),
            _ => None,
        }
    }
}

/// Bouncing cubes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CubeConfig {
    pub count: usize,
    pub min_size: i32,
    pub max_size: i32,
    /// Per-axis step range (pixels per frame)
    pub min_speed: i32,
    pub max_speed: i32,
    pub color_range: ColorRange,
    pub frame_delay_ms: f64,
}

impl Default for CubeConfig {
    fn default() -> Self {
        Self {
            count: 1000,
            min_size: 3,
            max_size: 5,
            min_speed: 1,
            max_speed: 20,
            color_range: ColorRange::default(),
            frame_delay_ms: 30.0,
        }
    }
}

/// Translucent full-canvas overlay
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fade {
    pub enabled: bool,
    pub color: [u8; 3],
    /// Alpha (0.0 - 1.0)
    pub strength: f64,
}

impl Fade {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            color: [0, 0, 0],
            strength: 0.02,
        }
    }
}

/// When a fade is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeTrigger {
    AfterAnimated,
    AfterTarget,
    AfterMaxIteration,
}

impl FadeTrigger {
    pub const ALL: [FadeTrigger; 3] = [
        FadeTrigger::AfterAnimated,
        FadeTrigger::AfterTarget,
        FadeTrigger::AfterMaxIteration,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            FadeTrigger::AfterAnimated => "after_animated",
            FadeTrigger::AfterTarget => "after_target",
            FadeTrigger::AfterMaxIteration => "after_max_iteration",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "after_animated" => Some(FadeTrigger::AfterAnimated),
            "after_target" => Some(FadeTrigger::AfterTarget),
            "after_max_iteration" => Some(FadeTrigger::AfterMaxIteration),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FadeConfig {
    pub after_animated: Fade,
    pub after_target: Fade,
    pub after_max_iteration: Fade,
}

impl Default for FadeConfig {
    fn default() -> Self {
        Self {
            after_animated: Fade::new(true),
            after_target: Fade::new(false),
            after_max_iteration: Fade::new(false),
        }
    }
}

impl FadeConfig {
    pub fn get(&self, trigger: FadeTrigger) -> &Fade {
        match trigger {
            FadeTrigger::AfterAnimated => &self.after_animated,
            FadeTrigger::AfterTarget => &self.after_target,
            FadeTrigger::AfterMaxIteration => &self.after_max_iteration,
        }
    }

    pub fn get_mut(&mut self, trigger: FadeTrigger) -> &mut Fade {
        match trigger {
            FadeTrigger::AfterAnimated => &mut self.after_animated,
            FadeTrigger::AfterTarget => &mut self.after_target,
            FadeTrigger::AfterMaxIteration => &mut self.after_max_iteration,
        }
    }
}

/// Debug marker drawn around a point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hitbox {
    pub enabled: bool,
    pub width: i32,
    pub height: i32,
    pub color: [u8; 3],
    pub strength: f64,
}

/// Which point a hitbox marks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitboxKind {
    OfTarget,
    OfPos,
}

impl HitboxKind {
    pub const ALL: [HitboxKind; 2] = [HitboxKind::OfTarget, HitboxKind::OfPos];

    pub fn key(&self) -> &'static str {
        match self {
            HitboxKind::OfTarget => "of_target",
            HitboxKind::OfPos => "of_pos",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "of_target" => Some(HitboxKind::OfTarget),
            "of_pos" => Some(HitboxKind::OfPos),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitboxConfig {
    pub of_target: Hitbox,
    pub of_pos: Hitbox,
}

impl Default for HitboxConfig {
    fn default() -> Self {
        Self {
            of_target: Hitbox {
                enabled: false,
                width: 20,
                height: 20,
                color: [255, 0, 0],
                strength: 1.0,
            },
            of_pos: Hitbox {
                enabled: false,
                width: 10,
                height: 10,
                color: [0, 128, 0],
                strength: 0.5,
            },
        }
    }
}

impl HitboxConfig {
    pub fn get(&self, kind: HitboxKind) -> &Hitbox {
        match kind {
            HitboxKind::OfTarget => &self.of_target,
            HitboxKind::OfPos => &self.of_pos,
        }
    }

    pub fn get_mut(&mut self, kind: HitboxKind) -> &mut Hitbox {
        match kind {
            HitboxKind::OfTarget => &mut self.of_target,
            HitboxKind::OfPos => &mut self.of_pos,
        }
    }
}

/// Pattern drawer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Step size per axis
    pub margin: i32,
    /// Probability of a random step instead of the greedy one
    pub variance: f64,
    pub bud_count: usize,
    pub line_width: f64,
    /// Rejected-candidate retries before a bud is replaced
    pub max_iterations: u32,
    pub frame_delay_ms: f64,
    pub origin: OriginChoice,
    pub center_jitter: i32,
    pub cursor_jitter: i32,
    pub color_range: ColorRange,
    pub fade: FadeConfig,
    pub hitbox: HitboxConfig,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            margin: 5,
            variance: 0.5,
            bud_count: 1000,
            line_width: 3.0,
            max_iterations: 8,
            frame_delay_ms: 0.0,
            origin: OriginChoice::Center,
            center_jitter: 200,
            cursor_jitter: 100,
            color_range: ColorRange::default(),
            fade: FadeConfig::default(),
            hitbox: HitboxConfig::default(),
        }
    }
}

/// One edit coming from the pattern menu
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PatternSetting {
    Margin(i32),
    Variance(f64),
    BudCount(usize),
    LineWidth(f64),
    MaxIterations(u32),
    FrameDelay(f64),
    Origin(OriginChoice),
    CenterJitter(i32),
    CursorJitter(i32),
    ColorMin(i32),
    ColorMax(i32),
    FadeEnabled(FadeTrigger, bool),
    FadeStrength(FadeTrigger, f64),
    HitboxEnabled(HitboxKind, bool),
    HitboxSize(HitboxKind, i32),
}

/// Input widget of a menu field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldInput {
    Number,
    Checkbox,
    Text,
}

impl FieldInput {
    /// HTML `type` attribute
    pub fn html_type(&self) -> &'static str {
        match self {
            FieldInput::Number => "number",
            FieldInput::Checkbox => "checkbox",
            FieldInput::Text => "text",
        }
    }
}

/// One input of the pattern menu, named so [`PatternSetting::parse`] accepts it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub value: String,
    pub input: FieldInput,
}

impl FormField {
    fn number(name: impl Into<String>, value: impl ToString) -> Self {
        Self {
            name: name.into(),
            value: value.to_string(),
            input: FieldInput::Number,
        }
    }

    fn checkbox(name: impl Into<String>, checked: bool) -> Self {
        Self {
            name: name.into(),
            value: checked.to_string(),
            input: FieldInput::Checkbox,
        }
    }

    /// Menu section: first path segment, `general` for top-level fields
    pub fn group(&self) -> &str {
        self.name.split_once('.').map(|(group, _)| group).unwrap_or("general")
    }

    /// Human label without the group
    pub fn label(&self) -> String {
        let rest = self.name.split_once('.').map(|(_, rest)| rest).unwrap_or(&self.name);
        rest.replace(['.', '_'], " ")
    }

    pub fn is_checked(&self) -> bool {
        self.input == FieldInput::Checkbox && self.value == "true"
    }
}

fn parse_value<T: std::str::FromStr>(field: &str, value: &str) -> Result<T, SettingsError> {
    value.trim().parse().map_err(|_| SettingsError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    })
}

impl PatternSetting {
    /// Parse a form field. Names are dotted paths such as `fade.after_target.enabled`.
    pub fn parse(field: &str, value: &str) -> Result<Self, SettingsError> {
        let parts: Vec<&str> = field.split('.').collect();
        let unknown = || SettingsError::UnknownField(field.to_string());

        let setting = match parts.as_slice() {
            ["margin"] => PatternSetting::Margin(parse_value(field, value)?),
            ["variance"] => PatternSetting::Variance(parse_value(field, value)?),
            ["bud_count"] => PatternSetting::BudCount(parse_value(field, value)?),
            ["line_width"] => PatternSetting::LineWidth(parse_value(field, value)?),
            ["max_iterations"] => PatternSetting::MaxIterations(parse_value(field, value)?),
            ["frame_delay"] => PatternSetting::FrameDelay(parse_value(field, value)?),
            ["origin"] => PatternSetting::Origin(OriginChoice::from_str(value).ok_or_else(|| {
                SettingsError::InvalidValue {
                    field: field.to_string(),
                    value: value.to_string(),
                }
            })?),
            ["center_jitter"] => PatternSetting::CenterJitter(parse_value(field, value)?),
            ["cursor_jitter"] => PatternSetting::CursorJitter(parse_value(field, value)?),
            ["color_range", "min"] => PatternSetting::ColorMin(parse_value(field, value)?),
            ["color_range", "max"] => PatternSetting::ColorMax(parse_value(field, value)?),
            ["fade", trigger, "enabled"] => PatternSetting::FadeEnabled(
                FadeTrigger::from_key(trigger).ok_or_else(unknown)?,
                parse_value(field, value)?,
            ),
            ["fade", trigger, "strength"] => PatternSetting::FadeStrength(
                FadeTrigger::from_key(trigger).ok_or_else(unknown)?,
                parse_value(field, value)?,
            ),
            ["hitbox", kind, "enabled"] => PatternSetting::HitboxEnabled(
                HitboxKind::from_key(kind).ok_or_else(unknown)?,
                parse_value(field, value)?,
            ),
            ["hitbox", kind, "size"] => PatternSetting::HitboxSize(
                HitboxKind::from_key(kind).ok_or_else(unknown)?,
                parse_value(field, value)?,
            ),
            _ => return Err(unknown()),
        };
        Ok(setting)
    }
}

impl PatternConfig {
    /// Apply one edit, clamping it into a usable range
    pub fn apply(&mut self, setting: PatternSetting) {
        match setting {
            PatternSetting::Margin(v) => self.margin = v.max(1),
            PatternSetting::Variance(v) => self.variance = v.clamp(0.0, 1.0),
            PatternSetting::BudCount(v) => self.bud_count = v,
            PatternSetting::LineWidth(v) => self.line_width = v.max(0.1),
            PatternSetting::MaxIterations(v) => self.max_iterations = v,
            PatternSetting::FrameDelay(v) => self.frame_delay_ms = v.max(0.0),
            PatternSetting::Origin(v) => self.origin = v,
            PatternSetting::CenterJitter(v) => self.center_jitter = v.abs(),
            PatternSetting::CursorJitter(v) => self.cursor_jitter = v.abs(),
            PatternSetting::ColorMin(v) => {
                self.color_range = ColorRange { min: v, ..self.color_range }.normalized()
            }
            PatternSetting::ColorMax(v) => {
                self.color_range = ColorRange { max: v, ..self.color_range }.normalized()
            }
            PatternSetting::FadeEnabled(trigger, on) => self.fade.get_mut(trigger).enabled = on,
            PatternSetting::FadeStrength(trigger, s) => {
                self.fade.get_mut(trigger).strength = s.clamp(0.0, 1.0)
            }
            PatternSetting::HitboxEnabled(kind, on) => self.hitbox.get_mut(kind).enabled = on,
            PatternSetting::HitboxSize(kind, size) => {
                let hitbox = self.hitbox.get_mut(kind);
                hitbox.width = size.max(1);
                hitbox.height = size.max(1);
            }
        }
    }

    /// Every editable setting with its current value, in menu order
    pub fn form_fields(&self) -> Vec<FormField> {
        let mut fields = vec![
            FormField::number("margin", self.margin),
            FormField::number("variance", self.variance),
            FormField::number("bud_count", self.bud_count),
            FormField::number("line_width", self.line_width),
            FormField::number("max_iterations", self.max_iterations),
            FormField::number("frame_delay", self.frame_delay_ms),
            FormField {
                name: "origin".to_string(),
                value: self.origin.as_str().to_string(),
                input: FieldInput::Text,
            },
            FormField::number("center_jitter", self.center_jitter),
            FormField::number("cursor_jitter", self.cursor_jitter),
            FormField::number("color_range.min", self.color_range.min),
            FormField::number("color_range.max", self.color_range.max),
        ];

        for trigger in FadeTrigger::ALL {
            let fade = self.fade.get(trigger);
            fields.push(FormField::checkbox(format!("fade.{}.enabled", trigger.key()), fade.enabled));
            fields.push(FormField::number(format!("fade.{}.strength", trigger.key()), fade.strength));
        }
        for kind in HitboxKind::ALL {
            let hitbox = self.hitbox.get(kind);
            fields.push(FormField::checkbox(format!("hitbox.{}.enabled", kind.key()), hitbox.enabled));
            fields.push(FormField::number(format!("hitbox.{}.size", kind.key()), hitbox.width));
        }
        fields
    }

    /// Parse and apply a whole submitted form. Stops at the first bad field.
    pub fn apply_form<'a, I>(&mut self, fields: I) -> Result<usize, SettingsError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut applied = 0;
        for (name, value) in fields {
            self.apply(PatternSetting::parse(name, value)?);
            applied += 1;
        }
        Ok(applied)
    }
}

/// Snake game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnakeConfig {
    /// Grid size and step length
    pub margin: i32,
    pub frame_delay_ms: f64,
    /// Subdivision levels tried by food placement before the fallback
    pub placement_depth: u32,
    pub snake_color: [u8; 3],
    pub apple_color: [u8; 3],
}

impl Default for SnakeConfig {
    fn default() -> Self {
        Self {
            margin: 20,
            frame_delay_ms: 100.0,
            placement_depth: 3,
            snake_color: [0, 128, 0],
            apple_color: [255, 0, 0],
        }
    }
}

/// Loop tracker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub margin: i32,
    pub frame_delay_ms: f64,
    pub max_width: i32,
    pub max_height: i32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            margin: 5,
            frame_delay_ms: 200.0,
            max_width: 255,
            max_height: 255,
        }
    }
}

/// Clip playback for the loop tracker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    pub muted: bool,
    pub clip_url: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            muted: false,
            clip_url: "audio/walking-snow.mp3".to_string(),
        }
    }
}

/// All settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub cubes: CubeConfig,
    pub pattern: PatternConfig,
    pub snake: SnakeConfig,
    pub tracker: TrackerConfig,
    pub audio: AudioConfig,
}

impl Settings {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "canvas_toys_settings";

    /// Load settings from LocalStorage, falling back to defaults
    pub fn load() -> Self {
        let Some(json) = platform::local_storage_get(Self::STORAGE_KEY) else {
            log::info!("Using default settings");
            return Self::default();
        };
        match serde_json::from_str(&json) {
            Ok(settings) => {
                log::info!("Loaded settings from LocalStorage");
                settings
            }
            Err(e) => {
                log::warn!("Discarding unreadable settings: {}", e);
                Self::default()
            }
        }
    }

    /// Save settings to LocalStorage
    pub fn save(&self) {
        match serde_json::to_string(self) {
            Ok(json) => {
                if platform::local_storage_set(Self::STORAGE_KEY, &json) {
                    log::info!("Settings saved");
                }
            }
            Err(e) => log::warn!("Failed to encode settings: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_toys() {
        let s = Settings::default();
        assert_eq!(s.snake.margin, 20);
        assert_eq!(s.snake.frame_delay_ms, 100.0);
        assert_eq!(s.pattern.margin, 5);
        assert_eq!(s.pattern.max_iterations, 8);
        assert!(s.pattern.fade.after_animated.enabled);
        assert!(!s.pattern.fade.after_target.enabled);
        assert_eq!(s.tracker.max_width, 255);
        assert_eq!(s.cubes.frame_delay_ms, 30.0);
    }

    #[test]
    fn test_parse_known_fields() {
        assert_eq!(
            PatternSetting::parse("margin", " 7 "),
            Ok(PatternSetting::Margin(7))
        );
        assert_eq!(
            PatternSetting::parse("origin", "Cursor"),
            Ok(PatternSetting::Origin(OriginChoice::Cursor))
        );
        assert_eq!(
            PatternSetting::parse("fade.after_target.enabled", "true"),
            Ok(PatternSetting::FadeEnabled(FadeTrigger::AfterTarget, true))
        );
        assert_eq!(
            PatternSetting::parse("hitbox.of_pos.size", "12"),
            Ok(PatternSetting::HitboxSize(HitboxKind::OfPos, 12))
        );
    }

    #[test]
    fn test_parse_rejects_unknown_and_bad_values() {
        assert_eq!(
            PatternSetting::parse("constructor.prototype", "1"),
            Err(SettingsError::UnknownField("constructor.prototype".to_string()))
        );
        assert_eq!(
            PatternSetting::parse("fade.sometimes.enabled", "true"),
            Err(SettingsError::UnknownField("fade.sometimes.enabled".to_string()))
        );
        assert!(matches!(
            PatternSetting::parse("variance", "lots"),
            Err(SettingsError::InvalidValue { .. })
        ));
        assert!(matches!(
            PatternSetting::parse("origin", "corner"),
            Err(SettingsError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_apply_clamps() {
        let mut config = PatternConfig::default();
        config.apply(PatternSetting::Margin(0));
        config.apply(PatternSetting::Variance(4.0));
        config.apply(PatternSetting::ColorMin(300));
        assert_eq!(config.margin, 1);
        assert_eq!(config.variance, 1.0);
        assert!(config.color_range.min <= config.color_range.max);
    }

    #[test]
    fn test_apply_form() {
        let mut config = PatternConfig::default();
        let applied = config
            .apply_form([("bud_count", "50"), ("hitbox.of_target.enabled", "true")])
            .unwrap();
        assert_eq!(applied, 2);
        assert_eq!(config.bud_count, 50);
        assert!(config.hitbox.of_target.enabled);

        let err = config.apply_form([("line_width", "2"), ("nope", "1")]);
        assert!(err.is_err());
        assert_eq!(config.line_width, 2.0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{"snake":{"margin":10},"pattern":{"origin":"Full"}}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.snake.margin, 10);
        assert_eq!(s.snake.frame_delay_ms, 100.0);
        assert_eq!(s.pattern.origin, OriginChoice::Full);
        assert_eq!(s.cubes, CubeConfig::default());
    }

    #[test]
    fn test_native_load_is_default() {
        #[cfg(not(target_arch = "wasm32"))]
        assert_eq!(Settings::load(), Settings::default());
    }

    #[test]
    fn test_menu_fields_feed_back_into_apply_form() {
        let mut custom = PatternConfig {
            margin: 7,
            variance: 0.25,
            bud_count: 40,
            line_width: 1.5,
            origin: OriginChoice::Cursor,
            color_range: ColorRange { min: 40, max: 200 },
            ..PatternConfig::default()
        };
        custom.fade.after_target.enabled = true;
        custom.fade.after_max_iteration.strength = 0.3;
        custom.hitbox.of_pos.enabled = true;

        let fields = custom.form_fields();
        let mut edited = PatternConfig::default();
        let applied = edited
            .apply_form(fields.iter().map(|f| (f.name.as_str(), f.value.as_str())))
            .unwrap();
        assert_eq!(applied, fields.len());
        assert_eq!(edited, custom);
    }

    #[test]
    fn test_menu_fields_cover_every_setting() {
        let fields = PatternConfig::default().form_fields();
        for field in &fields {
            assert!(PatternSetting::parse(&field.name, &field.value).is_ok(), "{}", field.name);
        }
        let fade = fields.iter().find(|f| f.name == "fade.after_animated.enabled").unwrap();
        assert_eq!(fade.input, FieldInput::Checkbox);
        assert!(fade.is_checked());
        assert_eq!(fade.group(), "fade");
        assert_eq!(fade.label(), "after animated enabled");

        let margin = fields.iter().find(|f| f.name == "margin").unwrap();
        assert_eq!(margin.group(), "general");
        assert_eq!(margin.input.html_type(), "number");
        assert_eq!(fields.iter().filter(|f| f.group() == "hitbox").count(), 4);
    }
}
