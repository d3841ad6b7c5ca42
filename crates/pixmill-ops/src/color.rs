//! Named color modifications applied as an ordered pipeline.
//!
//! A [`ColorAction`] is one modification with typed parameters. A list of
//! actions runs left to right on every pixel, each action seeing the
//! previous one's output. Alpha is never touched.
//!
//! Lightness, saturation and hue changes go through HSL; the rest work on
//! RGB directly.
//!
//! # Example
//!
//! ```rust
//! use pixmill_core::{Bitmap, Rgba};
//! use pixmill_ops::color::{ColorAction, ColorParam, ColorPipeline};
//!
//! let mut bitmap = Bitmap::filled(2, 2, 0xFF0000FF);
//! let pipeline = ColorPipeline::new()
//!     .then(ColorAction::Spin(120.0))
//!     .then(ColorAction::parse("xor", &[ColorParam::Color(Rgba::rgb(0, 255, 0))]).unwrap());
//! pipeline.apply(&mut bitmap).unwrap();
//! assert_eq!(bitmap.get_pixel_color(0, 0).unwrap(), 0x000000FF);
//! ```

use pixmill_core::{limit255, Bitmap, Rgba};
use tracing::debug;

use crate::adjust::greyscale_pixel;
use crate::guard::ensure_range;
use crate::{OpsError, OpsResult};

/// Default amount for lighten, darken, brighten, saturate and desaturate.
pub const DEFAULT_SHIFT: f64 = 10.0;

/// Default amount for mix, tint and shade.
pub const DEFAULT_MIX: f64 = 50.0;

/// One color modification.
///
/// Amounts are percentages in `[0, 100]` unless noted.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "apply", content = "params", rename_all = "lowercase")
)]
pub enum ColorAction {
    /// Rotate hue by degrees.
    Hue(f64),
    /// Rotate hue by degrees.
    Spin(f64),
    /// Raise HSL lightness.
    Lighten(f64),
    /// Lower HSL lightness.
    Darken(f64),
    /// Add `255 * amount / 100` to each RGB channel.
    Brighten(f64),
    /// Raise HSL saturation.
    Saturate(f64),
    /// Lower HSL saturation.
    Desaturate(f64),
    /// Interpolate toward `color` by `amount` percent.
    Mix {
        /// Target color.
        color: Rgba,
        /// Percentage moved toward the target.
        amount: f64,
    },
    /// Mix toward white.
    Tint(f64),
    /// Mix toward black.
    Shade(f64),
    /// XOR each RGB channel with the color's channel.
    Xor(Rgba),
    /// Replace RGB with BT.709 luma.
    Greyscale,
    /// Add a signed amount in `[-255, 255]` to red.
    Red(f64),
    /// Add a signed amount in `[-255, 255]` to green.
    Green(f64),
    /// Add a signed amount in `[-255, 255]` to blue.
    Blue(f64),
}

/// A loosely typed action argument, as it arrives from named input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorParam {
    /// A numeric amount.
    Number(f64),
    /// A color operand.
    Color(Rgba),
}

impl From<f64> for ColorParam {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<Rgba> for ColorParam {
    fn from(color: Rgba) -> Self {
        Self::Color(color)
    }
}

impl ColorAction {
    /// Builds an action from its name and positional parameters.
    ///
    /// Omitted amounts take their defaults ([`DEFAULT_SHIFT`] or
    /// [`DEFAULT_MIX`]). Unknown names fail with `UnknownOperation`;
    /// missing, mistyped or out-of-range parameters fail with
    /// `InvalidParameter`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pixmill_core::Rgba;
    /// use pixmill_ops::color::{ColorAction, ColorParam};
    ///
    /// let a = ColorAction::parse("lighten", &[]).unwrap();
    /// assert_eq!(a, ColorAction::Lighten(10.0));
    ///
    /// let m = ColorAction::parse("mix", &[ColorParam::Color(Rgba::WHITE)]).unwrap();
    /// assert_eq!(m, ColorAction::Mix { color: Rgba::WHITE, amount: 50.0 });
    ///
    /// assert!(ColorAction::parse("sparkle", &[]).is_err());
    /// ```
    pub fn parse(name: &str, params: &[ColorParam]) -> OpsResult<Self> {
        let op = name.trim().to_ascii_lowercase();
        let number = |i: usize, default: Option<f64>| -> OpsResult<f64> {
            match (params.get(i), default) {
                (Some(ColorParam::Number(v)), _) => Ok(*v),
                (None, Some(d)) => Ok(d),
                (Some(ColorParam::Color(_)), _) => Err(OpsError::InvalidParameter(format!(
                    "{op}: parameter {i} must be a number"
                ))),
                (None, None) => Err(OpsError::InvalidParameter(format!(
                    "{op}: missing parameter {i}"
                ))),
            }
        };
        let color = |i: usize| -> OpsResult<Rgba> {
            match params.get(i) {
                Some(ColorParam::Color(c)) => Ok(*c),
                _ => Err(OpsError::InvalidParameter(format!(
                    "{op}: parameter {i} must be a color"
                ))),
            }
        };

        let action = match op.as_str() {
            "hue" => Self::Hue(number(0, None)?),
            "spin" => Self::Spin(number(0, None)?),
            "lighten" => Self::Lighten(number(0, Some(DEFAULT_SHIFT))?),
            "darken" => Self::Darken(number(0, Some(DEFAULT_SHIFT))?),
            "brighten" => Self::Brighten(number(0, Some(DEFAULT_SHIFT))?),
            "saturate" => Self::Saturate(number(0, Some(DEFAULT_SHIFT))?),
            "desaturate" => Self::Desaturate(number(0, Some(DEFAULT_SHIFT))?),
            "mix" => Self::Mix {
                color: color(0)?,
                amount: number(1, Some(DEFAULT_MIX))?,
            },
            "tint" => Self::Tint(number(0, Some(DEFAULT_MIX))?),
            "shade" => Self::Shade(number(0, Some(DEFAULT_MIX))?),
            "xor" => Self::Xor(color(0)?),
            "greyscale" | "grayscale" => Self::Greyscale,
            "red" => Self::Red(number(0, None)?),
            "green" => Self::Green(number(0, None)?),
            "blue" => Self::Blue(number(0, None)?),
            _ => return Err(OpsError::UnknownOperation(name.to_string())),
        };
        action.validate()?;
        Ok(action)
    }

    /// The operation name, as accepted by [`ColorAction::parse`].
    pub fn name(&self) -> &'static str {
        match self {
            Self::Hue(_) => "hue",
            Self::Spin(_) => "spin",
            Self::Lighten(_) => "lighten",
            Self::Darken(_) => "darken",
            Self::Brighten(_) => "brighten",
            Self::Saturate(_) => "saturate",
            Self::Desaturate(_) => "desaturate",
            Self::Mix { .. } => "mix",
            Self::Tint(_) => "tint",
            Self::Shade(_) => "shade",
            Self::Xor(_) => "xor",
            Self::Greyscale => "greyscale",
            Self::Red(_) => "red",
            Self::Green(_) => "green",
            Self::Blue(_) => "blue",
        }
    }

    /// Checks the parameter ranges.
    pub fn validate(&self) -> OpsResult<()> {
        let op = self.name();
        match *self {
            Self::Hue(deg) | Self::Spin(deg) => {
                if !deg.is_finite() {
                    return Err(OpsError::InvalidParameter(format!(
                        "{op}: angle {deg} is not finite"
                    )));
                }
                Ok(())
            }
            Self::Lighten(v)
            | Self::Darken(v)
            | Self::Brighten(v)
            | Self::Saturate(v)
            | Self::Desaturate(v)
            | Self::Tint(v)
            | Self::Shade(v)
            | Self::Mix { amount: v, .. } => ensure_range(op, v, 0.0, 100.0),
            Self::Red(v) | Self::Green(v) | Self::Blue(v) => ensure_range(op, v, -255.0, 255.0),
            Self::Xor(_) | Self::Greyscale => Ok(()),
        }
    }

    /// Applies this action to one RGB triple.
    pub fn apply_rgb(&self, rgb: [u8; 3]) -> [u8; 3] {
        match *self {
            Self::Hue(deg) | Self::Spin(deg) => {
                let (h, s, l) = rgb_to_hsl(rgb);
                hsl_to_rgb(((h * 360.0 + deg).rem_euclid(360.0)) / 360.0, s, l)
            }
            Self::Lighten(v) => shift_hsl(rgb, |s, l| (s, l + v / 100.0)),
            Self::Darken(v) => shift_hsl(rgb, |s, l| (s, l - v / 100.0)),
            Self::Saturate(v) => shift_hsl(rgb, |s, l| (s + v / 100.0, l)),
            Self::Desaturate(v) => shift_hsl(rgb, |s, l| (s - v / 100.0, l)),
            Self::Brighten(v) => {
                let delta = (255.0 * v / 100.0).round();
                rgb.map(|c| limit255(c as f64 + delta))
            }
            Self::Mix { color, amount } => mix(rgb, color, amount),
            Self::Tint(v) => mix(rgb, Rgba::WHITE, v),
            Self::Shade(v) => mix(rgb, Rgba::BLACK, v),
            Self::Xor(color) => [rgb[0] ^ color.r, rgb[1] ^ color.g, rgb[2] ^ color.b],
            Self::Greyscale => {
                let mut px = [rgb[0], rgb[1], rgb[2], 255];
                greyscale_pixel(&mut px);
                [px[0], px[1], px[2]]
            }
            Self::Red(v) => [limit255(rgb[0] as f64 + v), rgb[1], rgb[2]],
            Self::Green(v) => [rgb[0], limit255(rgb[1] as f64 + v), rgb[2]],
            Self::Blue(v) => [rgb[0], rgb[1], limit255(rgb[2] as f64 + v)],
        }
    }
}

/// An ordered list of [`ColorAction`]s.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColorPipeline {
    actions: Vec<ColorAction>,
}

impl ColorPipeline {
    /// Creates an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an action.
    pub fn then(mut self, action: ColorAction) -> Self {
        self.actions.push(action);
        self
    }

    /// The actions, in application order.
    pub fn actions(&self) -> &[ColorAction] {
        &self.actions
    }

    /// Runs the pipeline over every pixel; see [`apply_actions`].
    pub fn apply(&self, bitmap: &mut Bitmap) -> OpsResult<()> {
        apply_actions(bitmap, &self.actions)
    }
}

impl From<Vec<ColorAction>> for ColorPipeline {
    fn from(actions: Vec<ColorAction>) -> Self {
        Self { actions }
    }
}

/// Applies `actions` in order to every pixel.
///
/// All actions are validated first; an invalid one fails the whole call
/// before any pixel changes.
pub fn apply_actions(bitmap: &mut Bitmap, actions: &[ColorAction]) -> OpsResult<()> {
    for action in actions {
        action.validate()?;
    }
    debug!(
        count = actions.len(),
        ops = ?actions.iter().map(ColorAction::name).collect::<Vec<_>>(),
        "color pipeline"
    );
    if actions.is_empty() {
        return Ok(());
    }

    bitmap.for_each_pixel_mut(|_, _, px| {
        let rgb = actions
            .iter()
            .fold([px[0], px[1], px[2]], |rgb, action| action.apply_rgb(rgb));
        px[..3].copy_from_slice(&rgb);
    });
    Ok(())
}

fn shift_hsl<F>(rgb: [u8; 3], f: F) -> [u8; 3]
where
    F: Fn(f64, f64) -> (f64, f64),
{
    let (h, s, l) = rgb_to_hsl(rgb);
    let (s, l) = f(s, l);
    hsl_to_rgb(h, s.clamp(0.0, 1.0), l.clamp(0.0, 1.0))
}

fn mix(rgb: [u8; 3], color: Rgba, amount: f64) -> [u8; 3] {
    let p = amount / 100.0;
    let target = [color.r, color.g, color.b];
    let mut out = [0u8; 3];
    for c in 0..3 {
        let from = rgb[c] as f64;
        out[c] = limit255((target[c] as f64 - from) * p + from);
    }
    out
}

/// Converts RGB to `(h, s, l)`, each in `[0, 1]`.
///
/// # Example
///
/// ```rust
/// use pixmill_ops::color::rgb_to_hsl;
///
/// let (h, s, l) = rgb_to_hsl([0, 255, 0]);
/// assert!((h - 1.0 / 3.0).abs() < 1e-12);
/// assert_eq!((s, l), (1.0, 0.5));
/// ```
pub fn rgb_to_hsl(rgb: [u8; 3]) -> (f64, f64, f64) {
    let [r, g, b] = rgb.map(|c| c as f64 / 255.0);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if max == min {
        return (0.0, 0.0, l);
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };
    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };
    (h / 6.0, s, l)
}

/// Converts `(h, s, l)` in `[0, 1]` back to rounded RGB.
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> [u8; 3] {
    if s == 0.0 {
        let v = limit255(l * 255.0);
        return [v, v, v];
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    [h + 1.0 / 3.0, h, h - 1.0 / 3.0].map(|t| limit255(hue_to_channel(p, q, t) * 255.0))
}

fn hue_to_channel(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: [u8; 3] = [255, 0, 0];

    #[test]
    fn test_hsl_roundtrip() {
        for rgb in [RED, [0, 0, 0], [255, 255, 255], [12, 200, 99], [128, 64, 32]] {
            let (h, s, l) = rgb_to_hsl(rgb);
            assert_eq!(hsl_to_rgb(h, s, l), rgb);
        }
    }

    #[test]
    fn test_hue_rotation() {
        assert_eq!(ColorAction::Spin(120.0).apply_rgb(RED), [0, 255, 0]);
        assert_eq!(ColorAction::Hue(-120.0).apply_rgb(RED), [0, 0, 255]);
        assert_eq!(ColorAction::Hue(360.0).apply_rgb(RED), RED);
        assert_eq!(
            ColorAction::Hue(480.0).apply_rgb([10, 20, 30]),
            ColorAction::Spin(120.0).apply_rgb([10, 20, 30])
        );
    }

    #[test]
    fn test_lightness_and_saturation() {
        assert_eq!(ColorAction::Lighten(100.0).apply_rgb(RED), [255, 255, 255]);
        assert_eq!(ColorAction::Darken(100.0).apply_rgb(RED), [0, 0, 0]);
        assert_eq!(ColorAction::Desaturate(100.0).apply_rgb(RED), [128, 128, 128]);
        assert_eq!(ColorAction::Saturate(100.0).apply_rgb([100, 100, 100]), [200, 0, 0]);
    }

    #[test]
    fn test_mix_family() {
        let blue = Rgba::rgb(0, 0, 255);
        assert_eq!(ColorAction::Mix { color: blue, amount: 50.0 }.apply_rgb(RED), [128, 0, 128]);
        assert_eq!(ColorAction::Tint(50.0).apply_rgb(RED), [255, 128, 128]);
        assert_eq!(ColorAction::Shade(50.0).apply_rgb([255, 255, 255]), [128, 128, 128]);
        assert_eq!(ColorAction::Mix { color: blue, amount: 0.0 }.apply_rgb(RED), RED);
    }

    #[test]
    fn test_channel_ops() {
        assert_eq!(ColorAction::Xor(Rgba::WHITE).apply_rgb([1, 2, 3]), [254, 253, 252]);
        assert_eq!(ColorAction::Brighten(20.0).apply_rgb([0, 100, 250]), [51, 151, 255]);
        assert!(ColorAction::Red(-300.0).validate().is_err());
        assert_eq!(ColorAction::Green(10.0).apply_rgb([0, 250, 0]), [0, 255, 0]);
        assert_eq!(ColorAction::Greyscale.apply_rgb(RED), [54, 54, 54]);
    }

    #[test]
    fn test_parse() {
        assert_eq!(ColorAction::parse("Darken", &[]).unwrap(), ColorAction::Darken(10.0));
        assert_eq!(
            ColorAction::parse("tint", &[ColorParam::Number(20.0)]).unwrap(),
            ColorAction::Tint(20.0)
        );
        assert!(matches!(
            ColorAction::parse("glow", &[]),
            Err(OpsError::UnknownOperation(_))
        ));
        assert!(matches!(
            ColorAction::parse("hue", &[]),
            Err(OpsError::InvalidParameter(_))
        ));
        assert!(ColorAction::parse("xor", &[ColorParam::Number(1.0)]).is_err());
        assert!(ColorAction::parse("lighten", &[ColorParam::Number(150.0)]).is_err());
    }

    #[test]
    fn test_pipeline_order_and_alpha() {
        let mut bitmap = Bitmap::filled(3, 3, 0xFF000040);
        let actions = [ColorAction::Tint(100.0), ColorAction::Xor(Rgba::WHITE)];
        apply_actions(&mut bitmap, &actions).unwrap();
        assert_eq!(bitmap.get_pixel_color(1, 1).unwrap(), 0x00000040);

        // Reverse order gives a different result
        let mut other = Bitmap::filled(3, 3, 0xFF000040);
        apply_actions(&mut other, &[ColorAction::Xor(Rgba::WHITE), ColorAction::Tint(100.0)])
            .unwrap();
        assert_eq!(other.get_pixel_color(1, 1).unwrap(), 0xFFFFFF40);
    }

    #[test]
    fn test_invalid_action_leaves_bitmap() {
        let mut bitmap = Bitmap::filled(2, 2, 0x10203040);
        let before = bitmap.clone();
        let result = apply_actions(&mut bitmap, &[ColorAction::Tint(10.0), ColorAction::Lighten(-5.0)]);
        assert!(result.is_err());
        assert_eq!(bitmap, before);
    }
}
