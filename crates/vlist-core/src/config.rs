#![forbid(unsafe_code)]

//! Virtualization tunables.
//!
//! All controllers share one [`VirtualizationConfig`]. Values can be set with
//! builder methods or overridden from the process environment, which lets a
//! host tune overscan on a slow machine without a rebuild.
//!
//! # Environment Variables
//! - `VLIST_DEFAULT_ITEM_HEIGHT` (f32, > 0)
//! - `VLIST_EXTRA_VISIBLE_ITEMS` (usize)
//! - `VLIST_ADDITIONAL_ITEMS` (usize)
//! - `VLIST_STICK_TO_BOTTOM_EPSILON` (f32, >= 0)
//! - `VLIST_PIXELS_PER_POINT` (f32, > 0)
//! - `VLIST_ALWAYS_REBIND_ON_REFRESH` (bool)
//!
//! Unparseable values are reported and the default is kept.

use std::env;

use crate::error::{ConfigError, Error};

const ENV_DEFAULT_ITEM_HEIGHT: &str = "VLIST_DEFAULT_ITEM_HEIGHT";
const ENV_EXTRA_VISIBLE_ITEMS: &str = "VLIST_EXTRA_VISIBLE_ITEMS";
const ENV_ADDITIONAL_ITEMS: &str = "VLIST_ADDITIONAL_ITEMS";
const ENV_STICK_TO_BOTTOM_EPSILON: &str = "VLIST_STICK_TO_BOTTOM_EPSILON";
const ENV_PIXELS_PER_POINT: &str = "VLIST_PIXELS_PER_POINT";
const ENV_ALWAYS_REBIND_ON_REFRESH: &str = "VLIST_ALWAYS_REBIND_ON_REFRESH";

/// Shared tunables for fixed and dynamic virtualization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VirtualizationConfig {
    /// Height assumed for rows that have never been measured.
    pub default_item_height: f32,
    /// Rows kept beyond the visible count in fixed mode.
    pub extra_visible_items: usize,
    /// Rows laid out past the edge in the direction of travel (dynamic mode).
    pub additional_items: usize,
    /// Distance from the bottom within which the view sticks to the end.
    pub stick_to_bottom_epsilon: f32,
    /// Device pixels per logical point used when snapping heights.
    pub pixels_per_point: f32,
    /// Rebind still-visible rows on every non-rebuild refresh.
    pub always_rebind_on_refresh: bool,
}

impl Default for VirtualizationConfig {
    fn default() -> Self {
        Self {
            default_item_height: 22.0,
            extra_visible_items: 2,
            additional_items: 5,
            stick_to_bottom_epsilon: 0.5,
            pixels_per_point: 1.0,
            always_rebind_on_refresh: true,
        }
    }
}

/// Parsed config plus any per-variable errors.
#[derive(Debug, Clone)]
pub struct ConfigParse {
    pub config: VirtualizationConfig,
    pub errors: Vec<ConfigError>,
}

impl VirtualizationConfig {
    /// Parse config from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with_diagnostics().config
    }

    /// Parse config from environment variables and return diagnostics.
    #[must_use]
    pub fn from_env_with_diagnostics() -> ConfigParse {
        from_env_with(|key| env::var(key).ok())
    }

    #[must_use]
    pub fn with_default_item_height(mut self, height: f32) -> Self {
        self.default_item_height = height;
        self
    }

    #[must_use]
    pub fn with_extra_visible_items(mut self, count: usize) -> Self {
        self.extra_visible_items = count;
        self
    }

    #[must_use]
    pub fn with_additional_items(mut self, count: usize) -> Self {
        self.additional_items = count;
        self
    }

    #[must_use]
    pub fn with_stick_to_bottom_epsilon(mut self, epsilon: f32) -> Self {
        self.stick_to_bottom_epsilon = epsilon;
        self
    }

    #[must_use]
    pub fn with_pixels_per_point(mut self, scale: f32) -> Self {
        self.pixels_per_point = scale;
        self
    }

    #[must_use]
    pub fn with_always_rebind_on_refresh(mut self, enabled: bool) -> Self {
        self.always_rebind_on_refresh = enabled;
        self
    }

    /// Validate config constraints and return all violations.
    pub fn validate(&self) -> Result<(), Vec<ConfigError>> {
        let mut errors = Vec::new();
        validate_positive("default_item_height", self.default_item_height, &mut errors);
        validate_positive("pixels_per_point", self.pixels_per_point, &mut errors);
        if !(self.stick_to_bottom_epsilon.is_finite() && self.stick_to_bottom_epsilon >= 0.0) {
            errors.push(ConfigError::new(
                "stick_to_bottom_epsilon",
                self.stick_to_bottom_epsilon.to_string(),
                "must be finite and >= 0",
            ));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Consume `self`, returning it only if it validates.
    pub fn validated(self) -> crate::Result<Self> {
        self.validate().map_err(Error::Config)?;
        Ok(self)
    }

    /// Snap `value` to this config's pixel grid.
    #[inline]
    #[must_use]
    pub fn snap(&self, value: f32) -> f32 {
        crate::geometry::round_to_pixel_grid(value, self.pixels_per_point)
    }
}

fn from_env_with<F>(mut get: F) -> ConfigParse
where
    F: FnMut(&str) -> Option<String>,
{
    let mut config = VirtualizationConfig::default();
    let mut errors = Vec::new();

    if let Some(value) = get(ENV_DEFAULT_ITEM_HEIGHT) {
        match parse_f32(&value) {
            Some(parsed) => config.default_item_height = parsed,
            None => errors.push(ConfigError::new(
                "default_item_height",
                value,
                "expected a number",
            )),
        }
    }
    if let Some(value) = get(ENV_EXTRA_VISIBLE_ITEMS) {
        match parse_usize(&value) {
            Some(parsed) => config.extra_visible_items = parsed,
            None => errors.push(ConfigError::new(
                "extra_visible_items",
                value,
                "expected a non-negative integer",
            )),
        }
    }
    if let Some(value) = get(ENV_ADDITIONAL_ITEMS) {
        match parse_usize(&value) {
            Some(parsed) => config.additional_items = parsed,
            None => errors.push(ConfigError::new(
                "additional_items",
                value,
                "expected a non-negative integer",
            )),
        }
    }
    if let Some(value) = get(ENV_STICK_TO_BOTTOM_EPSILON) {
        match parse_f32(&value) {
            Some(parsed) => config.stick_to_bottom_epsilon = parsed,
            None => errors.push(ConfigError::new(
                "stick_to_bottom_epsilon",
                value,
                "expected a number",
            )),
        }
    }
    if let Some(value) = get(ENV_PIXELS_PER_POINT) {
        match parse_f32(&value) {
            Some(parsed) => config.pixels_per_point = parsed,
            None => errors.push(ConfigError::new(
                "pixels_per_point",
                value,
                "expected a number",
            )),
        }
    }
    if let Some(value) = get(ENV_ALWAYS_REBIND_ON_REFRESH) {
        match parse_bool(&value) {
            Some(parsed) => config.always_rebind_on_refresh = parsed,
            None => errors.push(ConfigError::new(
                "always_rebind_on_refresh",
                value,
                "expected bool (1/0/true/false)",
            )),
        }
    }

    if let Err(invalid) = config.validate() {
        // Out-of-range overrides fall back to defaults field by field.
        let defaults = VirtualizationConfig::default();
        for err in &invalid {
            match err.field {
                "default_item_height" => config.default_item_height = defaults.default_item_height,
                "pixels_per_point" => config.pixels_per_point = defaults.pixels_per_point,
                "stick_to_bottom_epsilon" => {
                    config.stick_to_bottom_epsilon = defaults.stick_to_bottom_epsilon;
                }
                _ => {}
            }
        }
        errors.extend(invalid);
    }

    ConfigParse { config, errors }
}

#[inline]
fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[inline]
fn parse_usize(value: &str) -> Option<usize> {
    value.trim().parse::<usize>().ok()
}

#[inline]
fn parse_f32(value: &str) -> Option<f32> {
    value.trim().parse::<f32>().ok()
}

fn validate_positive(field: &'static str, value: f32, errors: &mut Vec<ConfigError>) {
    if !(value.is_finite() && value > 0.0) {
        errors.push(ConfigError::new(
            field,
            value.to_string(),
            "must be finite and > 0",
        ));
    }
}
