//! CSS-like timing strings
//!
//! Widgets describe their animation timings as short strings such as
//! `"1s linear"` or `"200ms 50ms ease-in"`: a duration, an optional delay
//! and an optional easing, in that order.
//!
//! - Bare numbers are milliseconds (`"300"` is `"300ms"`).
//! - The delay may be negative, which starts the step part-way through.
//!   The duration may not.
//! - The easing is a keyword or `cubic-bezier(x1, y1, x2, y2)`, with both
//!   x values in `[0, 1]`.

use arclet_core::memo::{MemoArg, Primitive, PrimitiveArg};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Errors produced while parsing a timing string
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimingParseError {
    #[error("timing string is empty")]
    Empty,

    #[error("invalid time value '{0}' (expected e.g. '1s' or '250ms')")]
    InvalidTime(String),

    #[error("unknown easing '{0}'")]
    UnknownEasing(String),

    #[error("invalid cubic-bezier easing '{0}'")]
    InvalidCubicBezier(String),

    #[error("unexpected token '{0}' in timing string")]
    UnexpectedToken(String),
}

/// Control points of a `cubic-bezier(x1, y1, x2, y2)` easing
#[derive(Clone, Copy, Debug)]
pub struct CubicBezier {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl CubicBezier {
    fn points(&self) -> [f64; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }
}

impl PartialEq for CubicBezier {
    fn eq(&self, other: &Self) -> bool {
        self.points().map(f64::to_bits) == other.points().map(f64::to_bits)
    }
}

impl Eq for CubicBezier {}

impl Hash for CubicBezier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.points().map(f64::to_bits).hash(state);
    }
}

impl fmt::Display for CubicBezier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cubic-bezier({}, {}, {}, {})",
            self.x1, self.y1, self.x2, self.y2
        )
    }
}

impl FromStr for CubicBezier {
    type Err = TimingParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TimingParseError::InvalidCubicBezier(s.to_string());

        let args = s
            .strip_prefix("cubic-bezier(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(invalid)?;
        let values = args
            .split(',')
            .map(|v| v.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| invalid())?;

        let &[x1, y1, x2, y2] = values.as_slice() else {
            return Err(invalid());
        };
        let in_unit = |x: f64| (0.0..=1.0).contains(&x);
        if !in_unit(x1) || !in_unit(x2) || !y1.is_finite() || !y2.is_finite() {
            return Err(invalid());
        }
        Ok(CubicBezier { x1, y1, x2, y2 })
    }
}

/// Easing of a timing string
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Easing {
    Linear,
    #[default]
    Ease,
    EaseIn,
    EaseOut,
    EaseInOut,
    CubicBezier(CubicBezier),
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Easing::Linear => f.write_str("linear"),
            Easing::Ease => f.write_str("ease"),
            Easing::EaseIn => f.write_str("ease-in"),
            Easing::EaseOut => f.write_str("ease-out"),
            Easing::EaseInOut => f.write_str("ease-in-out"),
            Easing::CubicBezier(curve) => fmt::Display::fmt(curve, f),
        }
    }
}

impl FromStr for Easing {
    type Err = TimingParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear" => Ok(Easing::Linear),
            "ease" => Ok(Easing::Ease),
            "ease-in" => Ok(Easing::EaseIn),
            "ease-out" => Ok(Easing::EaseOut),
            "ease-in-out" => Ok(Easing::EaseInOut),
            curve if curve.starts_with("cubic-bezier(") => curve.parse().map(Easing::CubicBezier),
            other => Err(TimingParseError::UnknownEasing(other.to_string())),
        }
    }
}

/// Signed start offset of a step
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Delay {
    pub amount: Duration,
    /// Start `amount` into the step instead of waiting for it
    pub negative: bool,
}

impl Delay {
    pub const ZERO: Delay = Delay {
        amount: Duration::ZERO,
        negative: false,
    };

    pub fn after(amount: Duration) -> Self {
        Self {
            amount,
            negative: false,
        }
    }

    pub fn ahead(amount: Duration) -> Self {
        Self {
            amount,
            negative: true,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }
}

impl From<Duration> for Delay {
    fn from(amount: Duration) -> Self {
        Delay::after(amount)
    }
}

impl fmt::Display for Delay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative && !self.is_zero() {
            f.write_str("-")?;
        }
        write!(f, "{}s", self.amount.as_secs_f64())
    }
}

/// Duration, delay and easing of one animation step
///
/// Displays in seconds, so `"250ms"` is written back as `"0.25s ease"`.
/// Parsing the displayed form always yields the same timing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timing {
    pub duration: Duration,
    pub delay: Delay,
    pub easing: Easing,
}

impl Timing {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            delay: Delay::ZERO,
            easing: Easing::default(),
        }
    }

    pub fn with_delay(mut self, delay: impl Into<Delay>) -> Self {
        self.delay = delay.into();
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Time from play until the step ends
    ///
    /// A negative delay shortens the step, never below zero.
    pub fn total(&self) -> Duration {
        if self.delay.negative {
            self.duration.saturating_sub(self.delay.amount)
        } else {
            self.duration + self.delay.amount
        }
    }
}

/// Parse a time value, returning its magnitude and whether it was negative
fn parse_time(token: &str) -> Option<(Duration, bool)> {
    let (number, nanos_per_unit) = if let Some(ms) = token.strip_suffix("ms") {
        (ms, 1e6)
    } else if let Some(s) = token.strip_suffix('s') {
        (s, 1e9)
    } else {
        (token, 1e6)
    };

    let value: f64 = number.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    let nanos = (value.abs() * nanos_per_unit).round();
    if nanos > u64::MAX as f64 {
        return None;
    }
    Some((Duration::from_nanos(nanos as u64), value < 0.0))
}

fn looks_like_time(token: &str) -> bool {
    token.starts_with(|c: char| c.is_ascii_digit() || c == '.' || c == '-')
}

impl FromStr for Timing {
    type Err = TimingParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tokens = s.split_whitespace().peekable();

        let first = tokens.next().ok_or(TimingParseError::Empty)?;
        let duration = match parse_time(first) {
            Some((duration, false)) => duration,
            _ => return Err(TimingParseError::InvalidTime(first.to_string())),
        };
        let mut timing = Timing::new(duration);

        if let Some(token) = tokens.next_if(|t| looks_like_time(t)) {
            let (amount, negative) =
                parse_time(token).ok_or_else(|| TimingParseError::InvalidTime(token.to_string()))?;
            timing.delay = Delay { amount, negative };
        }

        let rest: Vec<&str> = tokens.collect();
        match rest.split_first() {
            None => {}
            Some((first, _)) if first.starts_with("cubic-bezier(") => {
                timing.easing = rest.join(" ").parse()?;
            }
            Some((easing, [])) => timing.easing = easing.parse()?,
            Some((easing, [extra, ..])) => {
                easing.parse::<Easing>()?;
                return Err(TimingParseError::UnexpectedToken(extra.to_string()));
            }
        }
        Ok(timing)
    }
}

impl fmt::Display for Timing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.duration.as_secs_f64())?;
        if !self.delay.is_zero() {
            write!(f, " {}", self.delay)?;
        }
        write!(f, " {}", self.easing)
    }
}

impl TryFrom<String> for Timing {
    type Error = TimingParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Timing> for String {
    fn from(timing: Timing) -> Self {
        timing.to_string()
    }
}

/// Timings key memoized animation factories by their string form
impl MemoArg for Timing {
    fn to_primitive(&self) -> Option<Primitive> {
        Some(self.primitive())
    }
}

impl PrimitiveArg for Timing {
    fn primitive(&self) -> Primitive {
        Primitive::Text(self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_widget_defaults() {
        let t: Timing = "1s linear".parse().unwrap();
        assert_eq!(t.duration, Duration::from_secs(1));
        assert_eq!(t.delay, Delay::ZERO);
        assert_eq!(t.easing, Easing::Linear);

        let t: Timing = "0.225s linear".parse().unwrap();
        assert_eq!(t.duration, Duration::from_millis(225));
    }

    #[test]
    fn test_parse_delay_and_milliseconds() {
        let t: Timing = "200ms 50ms ease-in".parse().unwrap();
        assert_eq!(t.duration, Duration::from_millis(200));
        assert_eq!(t.delay, Delay::after(Duration::from_millis(50)));
        assert_eq!(t.easing, Easing::EaseIn);
        assert_eq!(t.total(), Duration::from_millis(250));
    }

    #[test]
    fn test_easing_defaults_to_ease() {
        let t: Timing = "2s".parse().unwrap();
        assert_eq!(t.easing, Easing::Ease);
    }

    #[test]
    fn test_display() {
        assert_eq!("1s linear".parse::<Timing>().unwrap().to_string(), "1s linear");
        assert_eq!(
            "0.225s linear".parse::<Timing>().unwrap().to_string(),
            "0.225s linear"
        );
        assert_eq!(
            "250ms 1s ease-out".parse::<Timing>().unwrap().to_string(),
            "0.25s 1s ease-out"
        );
    }

    #[test]
    fn test_display_parses_back() {
        for s in ["1s linear", "0.6s", "125ms 10ms ease-in-out", "0s ease"] {
            let t: Timing = s.parse().unwrap();
            assert_eq!(t.to_string().parse::<Timing>().unwrap(), t);
        }
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<Timing>(), Err(TimingParseError::Empty));
        assert_eq!(
            "fast linear".parse::<Timing>(),
            Err(TimingParseError::InvalidTime("fast".into()))
        );
        assert_eq!(
            "-1s".parse::<Timing>(),
            Err(TimingParseError::InvalidTime("-1s".into()))
        );
        assert_eq!(
            "1s bouncy".parse::<Timing>(),
            Err(TimingParseError::UnknownEasing("bouncy".into()))
        );
        assert_eq!(
            "1s linear 2".parse::<Timing>(),
            Err(TimingParseError::UnexpectedToken("2".into()))
        );
    }

    #[test]
    fn test_bare_numbers_are_milliseconds() {
        let t: Timing = "300 100 linear".parse().unwrap();
        assert_eq!(t.duration, Duration::from_millis(300));
        assert_eq!(t.delay, Delay::after(Duration::from_millis(100)));
        assert_eq!(t.to_string(), "0.3s 0.1s linear");
    }

    #[test]
    fn test_negative_delay() {
        let t: Timing = "1s -250ms ease-out".parse().unwrap();
        assert_eq!(t.delay, Delay::ahead(Duration::from_millis(250)));
        assert_eq!(t.total(), Duration::from_millis(750));
        assert_eq!(t.to_string(), "1s -0.25s ease-out");
        assert_eq!(t.to_string().parse::<Timing>().unwrap(), t);

        let t: Timing = "200ms -1s".parse().unwrap();
        assert_eq!(t.total(), Duration::ZERO);
    }

    #[test]
    fn test_cubic_bezier_easing() {
        let t: Timing = "225ms cubic-bezier(0.4, 0.0, 0.2, 1)".parse().unwrap();
        assert_eq!(
            t.easing,
            Easing::CubicBezier(CubicBezier {
                x1: 0.4,
                y1: 0.0,
                x2: 0.2,
                y2: 1.0,
            })
        );
        assert_eq!(t.to_string(), "0.225s cubic-bezier(0.4, 0, 0.2, 1)");
        assert_eq!(t.to_string().parse::<Timing>().unwrap(), t);

        let t: Timing = "1s 50ms cubic-bezier(0,-0.5,1,1.5)".parse().unwrap();
        assert_eq!(t.delay, Delay::after(Duration::from_millis(50)));
        assert!(matches!(t.easing, Easing::CubicBezier(c) if c.y1 == -0.5));
    }

    #[test]
    fn test_cubic_bezier_errors() {
        for s in [
            "1s cubic-bezier(1.5, 0, 0.2, 1)",
            "1s cubic-bezier(0.4, 0, 0.2)",
            "1s cubic-bezier(a, b, c, d)",
            "1s cubic-bezier(0.4, 0, 0.2, 1) linear",
        ] {
            assert!(
                matches!(s.parse::<Timing>(), Err(TimingParseError::InvalidCubicBezier(_))),
                "{s}"
            );
        }
    }

    #[test]
    fn test_memo_key_is_string_form() {
        use arclet_core::memo::PrimitiveArgs;

        let t: Timing = "0.225s linear".parse().unwrap();
        assert_eq!((1.5_f64, t).key(), "1.5:0.225s linear");
    }

    #[test]
    fn test_serde_uses_string_form() {
        #[derive(Deserialize, Serialize)]
        struct Table {
            timing: Timing,
        }

        let table: Table = toml::from_str("timing = \"0.5s ease-out\"").unwrap();
        assert_eq!(table.timing.duration, Duration::from_millis(500));
        assert_eq!(table.timing.easing, Easing::EaseOut);

        let out = toml::to_string(&table).unwrap();
        assert_eq!(out.trim(), "timing = \"0.5s ease-out\"");

        assert!(toml::from_str::<Table>("timing = \"soon\"").is_err());
    }
}
