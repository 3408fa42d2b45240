//! Declarative fill rules and their resolved color allocators.
//!
//! A fill rule maps a role's value range to colors -- a solid fill or a
//! two-/three-stop gradient. Rules arrive from the host as shared,
//! immutable descriptions; an eval context resolves each rule against the
//! observed data range once and memoizes the resulting allocator for the
//! rest of the pass.

use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::value::Value;

/// One gradient stop. An absent `value` falls back to the observed data
/// minimum (first stop) or maximum (last stop) at resolution time.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientStop {
    pub color: String,
    pub value: Option<Value>,
}

impl GradientStop {
    pub fn new(color: impl Into<String>) -> Self {
        GradientStop {
            color: color.into(),
            value: None,
        }
    }

    pub fn at(color: impl Into<String>, value: Value) -> Self {
        GradientStop {
            color: color.into(),
            value: Some(value),
        }
    }
}

/// The shape of a fill rule.
#[derive(Debug, Clone, PartialEq)]
pub enum FillRuleKind {
    /// Constant color, ignoring the input value
    Solid { color: String },

    /// Linear gradient between two stops
    LinearGradient2 {
        min: GradientStop,
        max: GradientStop,
    },

    /// Linear gradient through a middle stop
    LinearGradient3 {
        min: GradientStop,
        mid: GradientStop,
        max: GradientStop,
    },
}

/// Declarative fill rule: a color mapping driven by one input role.
///
/// Hosts hold rules behind `Arc` so eval contexts can memoize resolved
/// allocators by rule identity.
#[derive(Debug, Clone, PartialEq)]
pub struct FillRule {
    /// Role whose per-row value drives the rule
    pub input_role: String,
    pub kind: FillRuleKind,
}

impl FillRule {
    pub fn new(input_role: impl Into<String>, kind: FillRuleKind) -> Arc<Self> {
        Arc::new(FillRule {
            input_role: input_role.into(),
            kind,
        })
    }
}

/// Invalid fill-rule description.
#[derive(Debug, Clone)]
pub enum ColorError {
    /// Color literal is not `#rgb` or `#rrggbb`
    InvalidColor(String),
}

impl fmt::Display for ColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorError::InvalidColor(literal) => {
                write!(f, "invalid color literal '{literal}': expected #rgb or #rrggbb")
            }
        }
    }
}

impl std::error::Error for ColorError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Rgb {
    r: u8,
    g: u8,
    b: u8,
}

fn parse_color(literal: &str) -> Result<Rgb, ColorError> {
    let valid = Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$")
        .map(|re| re.is_match(literal))
        .unwrap_or(false);
    if !valid {
        return Err(ColorError::InvalidColor(literal.to_string()));
    }
    let hex = &literal[1..];
    let channel = |s: &str| u8::from_str_radix(s, 16).unwrap_or(0);
    if hex.len() == 3 {
        // Shorthand widens each nibble: #fa0 -> #ffaa00
        let wide = |s: &str| channel(&format!("{s}{s}"));
        Ok(Rgb {
            r: wide(&hex[0..1]),
            g: wide(&hex[1..2]),
            b: wide(&hex[2..3]),
        })
    } else {
        Ok(Rgb {
            r: channel(&hex[0..2]),
            g: channel(&hex[2..4]),
            b: channel(&hex[4..6]),
        })
    }
}

fn format_color(rgb: Rgb) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb.r, rgb.g, rgb.b)
}

#[derive(Debug, Clone)]
struct GradientAllocator {
    /// Stops in ascending value order; always at least one
    stops: Vec<(f64, Rgb)>,
}

impl GradientAllocator {
    fn sample(&self, x: f64) -> Rgb {
        let first = self.stops[0];
        let last = self.stops[self.stops.len() - 1];
        if self.stops.len() == 1 || x <= first.0 {
            return first.1;
        }
        if x >= last.0 {
            return last.1;
        }
        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if x <= b.0 {
                let span = b.0 - a.0;
                if span <= 0.0 {
                    return a.1;
                }
                let t = (x - a.0) / span;
                return Rgb {
                    r: lerp_channel(a.1.r, b.1.r, t),
                    g: lerp_channel(a.1.g, b.1.g, t),
                    b: lerp_channel(a.1.b, b.1.b, t),
                };
            }
        }
        last.1
    }
}

fn lerp_channel(a: u8, b: u8, t: f64) -> u8 {
    let mixed = f64::from(a) + (f64::from(b) - f64::from(a)) * t;
    mixed.round().clamp(0.0, 255.0) as u8
}

/// Resolved value-to-color function for one fill rule.
#[derive(Debug, Clone)]
pub enum ColorAllocator {
    /// Constant color
    Solid { color: String },

    /// Interpolating gradient
    Gradient(GradientAllocatorHandle),
}

/// Opaque handle keeping the gradient internals private.
#[derive(Debug, Clone)]
pub struct GradientAllocatorHandle(GradientAllocator);

impl ColorAllocator {
    /// Resolves a rule against the observed data range. Stop values
    /// default to the data minimum/maximum; a missing middle stop sits at
    /// the midpoint. When no numeric range can be established the
    /// gradient degenerates to its minimum stop color.
    pub fn for_rule(
        rule: &FillRule,
        data_min: Option<&Value>,
        data_max: Option<&Value>,
    ) -> Result<ColorAllocator, ColorError> {
        match &rule.kind {
            FillRuleKind::Solid { color } => {
                let rgb = parse_color(color)?;
                Ok(ColorAllocator::Solid {
                    color: format_color(rgb),
                })
            }
            FillRuleKind::LinearGradient2 { min, max } => {
                let lo_color = parse_color(&min.color)?;
                let hi_color = parse_color(&max.color)?;
                let lo = stop_value(min, data_min);
                let hi = stop_value(max, data_max);
                let stops = match (lo, hi) {
                    (Some(lo), Some(hi)) if hi > lo => vec![(lo, lo_color), (hi, hi_color)],
                    _ => vec![(0.0, lo_color)],
                };
                Ok(ColorAllocator::Gradient(GradientAllocatorHandle(
                    GradientAllocator { stops },
                )))
            }
            FillRuleKind::LinearGradient3 { min, mid, max } => {
                let lo_color = parse_color(&min.color)?;
                let mid_color = parse_color(&mid.color)?;
                let hi_color = parse_color(&max.color)?;
                let lo = stop_value(min, data_min);
                let hi = stop_value(max, data_max);
                let stops = match (lo, hi) {
                    (Some(lo), Some(hi)) if hi > lo => {
                        let center = mid
                            .value
                            .as_ref()
                            .and_then(Value::as_float)
                            .unwrap_or((lo + hi) / 2.0)
                            .clamp(lo, hi);
                        vec![(lo, lo_color), (center, mid_color), (hi, hi_color)]
                    }
                    _ => vec![(0.0, lo_color)],
                };
                Ok(ColorAllocator::Gradient(GradientAllocatorHandle(
                    GradientAllocator { stops },
                )))
            }
        }
    }

    /// Color for one input value. Non-numeric input to a gradient has no
    /// color; a solid fill ignores the value entirely.
    pub fn color(&self, value: &Value) -> Option<String> {
        match self {
            ColorAllocator::Solid { color } => Some(color.clone()),
            ColorAllocator::Gradient(handle) => {
                let x = value.as_float()?;
                Some(format_color(handle.0.sample(x)))
            }
        }
    }
}

fn stop_value(stop: &GradientStop, data: Option<&Value>) -> Option<f64> {
    stop.value
        .as_ref()
        .or(data)
        .and_then(Value::as_float)
}
