//! Numeric helpers shared by the geometry builders

/// Round a value to 4 significant figures
///
/// Rendered SVG attributes and golden values in tests should not carry
/// floating-point noise such as `9.600000000000001`. Ties round away from
/// zero on the exact binary value, so `1.0625` becomes `1.063`.
///
/// ```rust
/// use arclet_core::numeric::precise;
///
/// assert_eq!(precise(24.0 * 0.4), 9.6);
/// assert_eq!(precise(8.41457), 8.415);
/// assert_eq!(precise(1.0625), 1.063);
/// ```
pub fn precise(value: f64) -> f64 {
    if !value.is_finite() || value == 0.0 {
        return value;
    }

    // Every f64 has at most 767 significant decimal digits, so this expansion is exact
    let exact = format!("{:.767e}", value.abs());
    let Some((mantissa, exponent)) = exact.split_once('e') else {
        return value;
    };
    let Ok(mut exponent) = exponent.parse::<i32>() else {
        return value;
    };

    let mut digits = mantissa.bytes().filter(u8::is_ascii_digit).map(|b| u32::from(b - b'0'));
    let mut kept = 0u32;
    for _ in 0..4 {
        kept = kept * 10 + digits.next().unwrap_or(0);
    }
    if digits.next().unwrap_or(0) >= 5 {
        kept += 1;
        if kept == 10_000 {
            kept = 1_000;
            exponent += 1;
        }
    }

    let sign = if value.is_sign_negative() { "-" } else { "" };
    format!("{sign}{kept}e{}", exponent - 3)
        .parse()
        .unwrap_or(value)
}

/// Clamp a percentage to `[0, 100]`
///
/// `NaN` is treated as `0`.
pub fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}
