//! Output rendering: `LineO`, `MathO`, `SciO` (spec §4.F / §6).
//!
//! `render` is the inverse of the evaluator's number parsing — it turns a
//! [`Value`] into the string a REPL or CLI front end would print. The three
//! modes share plain-value formatting (`Text`, `Boolean`, containers) and
//! diverge only in how a `Number` is rendered.

use crate::{
    evaluator::{Evaluator, OutputMode},
    value::{bigdecimal::BigDecimal, HeapObject, Value},
};

const PI: f64 = std::f64::consts::PI;

/// Renders `value` under `evaluator`'s configured [`OutputMode`].
pub fn render(evaluator: &Evaluator, value: &Value) -> String {
    match value {
        Value::Undefined => "Undefined".to_string(),
        Value::Number(n) => render_number(evaluator, n),
        Value::Complex(re, im) => render_complex(evaluator, *re, *im),
        Value::Boolean(b) => b.to_string(),
        Value::Text(s) => s.clone(),
        Value::DateTime(instant) => instant.to_rfc3339(),
        Value::TimeSpan(span) => format!("{}ms", span.0),
        Value::Matrix(reference) => render_matrix(evaluator, reference),
        Value::Tuple(reference) => render_sequence(evaluator, reference, '(', ')'),
        Value::LinkedList(reference) => render_linked_list(evaluator, reference),
        Value::Set(reference) | Value::HashSet(reference) => render_set(evaluator, reference),
        Value::Lambda(_) => "<lambda>".to_string(),
        Value::Reference(inner) => render(evaluator, inner),
        Value::ClassInstance(_) => "<instance>".to_string(),
    }
}

fn render_number(evaluator: &Evaluator, n: &BigDecimal) -> String {
    if n.is_undefined() {
        return "Undefined".to_string();
    }
    let Some(value) = n.to_f64() else {
        return n.to_string();
    };
    match evaluator.config.output_mode {
        OutputMode::LineO => render_line(value),
        OutputMode::SciO => render_sci(value),
        OutputMode::MathO => render_math(value).unwrap_or_else(|| n.to_string()),
    }
}

fn render_complex(evaluator: &Evaluator, re: f64, im: f64) -> String {
    let real = render_number(evaluator, &BigDecimal::from_f64_exact(re));
    let imag_abs = render_number(evaluator, &BigDecimal::from_f64_exact(im.abs()));
    let sign = if im < 0.0 { "-" } else { "+" };
    if re == 0.0 {
        return format!("{}{imag_abs}i", if im < 0.0 { "-" } else { "" });
    }
    format!("{real} {sign} {imag_abs}i")
}

/// 4-decimal fixed; extremes fall back to scientific, per spec §6.
fn render_line(value: f64) -> String {
    if value != 0.0 && (value.abs() < 1e-4 || value.abs() >= 1e15) {
        return render_sci(value);
    }
    format!("{value:.4}")
}

/// `"<mantissa> x 10^<exponent>"`; exponent is `floor(log10|value|)`.
fn render_sci(value: f64) -> String {
    if value == 0.0 {
        return "0 x 10^0".to_string();
    }
    let exponent = value.abs().log10().floor() as i32;
    let mantissa = value / 10f64.powi(exponent);
    format!("{mantissa} x 10^{exponent}")
}

/// Symbolic rendering (spec §4.F/§6): π-multiples, then radicals, then
/// scaled rationals, then a plain Stern-Brocot fraction. The first branch
/// to match within epsilon wins (`DESIGN.md` Open Question 3).
fn render_math(value: f64) -> Option<String> {
    const EPS: f64 = 1e-9;
    if value.abs() < EPS {
        return Some("0".to_string());
    }
    if (value - value.round()).abs() < EPS && value.abs() < 1e15 {
        return Some(format!("{}", value.round() as i64));
    }
    if let Some(s) = render_pi_multiple(value, EPS) {
        return Some(s);
    }
    if let Some(s) = render_radical(value, EPS) {
        return Some(s);
    }
    if let Some(s) = render_scaled_rational_radical(value, EPS) {
        return Some(s);
    }
    if let Some((num, den)) = crate::builtins::numeric::stern_brocot(value, 1_000_000, 50_000) {
        return Some(format!("{num}/{den}"));
    }
    None
}

fn gcd(a: i64, b: i64) -> i64 {
    if b == 0 {
        a.abs()
    } else {
        gcd(b, a % b)
    }
}

fn render_pi_multiple(value: f64, eps: f64) -> Option<String> {
    for k in 1..=20i64 {
        for j in -50..=50i64 {
            if j == 0 {
                continue;
            }
            let candidate = (j as f64) * PI / (k as f64);
            if (candidate - value).abs() < eps.max(value.abs() * 1e-9) {
                let g = gcd(j, k);
                let (j, k) = (j / g, k / g);
                return Some(format_pi_fraction(j, k));
            }
        }
    }
    None
}

fn format_pi_fraction(j: i64, k: i64) -> String {
    let sign = if j < 0 { "-" } else { "" };
    let j = j.abs();
    match (j, k) {
        (1, 1) => format!("{sign}\u{3c0}"),
        (_, 1) => format!("{sign}{j}\u{3c0}"),
        (1, _) => format!("{sign}\u{3c0}/{k}"),
        _ => format!("{sign}{j}\u{3c0}/{k}"),
    }
}

/// Radicals of index 2 (`\u{221a}n`) and 3 (`\u{221b}n`), radicand bounded
/// by 10000, with an integer leading coefficient.
fn render_radical(value: f64, eps: f64) -> Option<String> {
    let sign = if value < 0.0 { "-" } else { "" };
    let magnitude = value.abs();
    for coefficient in 1..=20i64 {
        for radicand in 2..=10_000i64 {
            let root = (radicand as f64).sqrt();
            if root.fract().abs() < 1e-9 {
                continue;
            }
            let candidate = coefficient as f64 * root;
            if (candidate - magnitude).abs() < eps.max(magnitude * 1e-9) {
                let prefix = if coefficient == 1 { String::new() } else { coefficient.to_string() };
                return Some(format!("{sign}{prefix}\u{221a}{radicand}"));
            }
            let cube_root = (radicand as f64).cbrt();
            if cube_root.fract().abs() >= 1e-9 {
                let candidate = coefficient as f64 * cube_root;
                if (candidate - magnitude).abs() < eps.max(magnitude * 1e-9) {
                    let prefix = if coefficient == 1 { String::new() } else { coefficient.to_string() };
                    return Some(format!("{sign}{prefix}\u{221b}{radicand}"));
                }
            }
        }
    }
    None
}

/// `(j + \u{221a}n)/k` — the quadratic-formula shape, denominator bounded
/// `2..40`, integer offset bounded `0..40`.
fn render_scaled_rational_radical(value: f64, eps: f64) -> Option<String> {
    for k in 2..=40i64 {
        for j in -40..=40i64 {
            for radicand in 2..=400i64 {
                let root = (radicand as f64).sqrt();
                if root.fract().abs() < 1e-9 {
                    continue;
                }
                let candidate = (j as f64 + root) / k as f64;
                if (candidate - value).abs() < eps.max(value.abs() * 1e-9) {
                    let sign = if j == 0 { String::new() } else { format!("{j} + ") };
                    return Some(format!("({sign}\u{221a}{radicand})/{k}"));
                }
            }
        }
    }
    None
}

fn render_matrix(evaluator: &Evaluator, reference: &crate::reference::Reference) -> String {
    let Some(HeapObject::Matrix { data, rows, cols }) = evaluator.arena().get(reference) else {
        return "[]".to_string();
    };
    let mut rendered_rows = Vec::with_capacity(*rows);
    for r in 0..*rows {
        let mut row = Vec::with_capacity(*cols);
        for c in 0..*cols {
            if let Some(v) = data.get(r * cols + c) {
                row.push(render(evaluator, v));
            }
        }
        rendered_rows.push(format!("[{}]", row.join(",")));
    }
    format!("[{}]", rendered_rows.join(","))
}

fn render_sequence(evaluator: &Evaluator, reference: &crate::reference::Reference, open: char, close: char) -> String {
    let Some(HeapObject::Tuple(items)) = evaluator.arena().get(reference) else {
        return format!("{open}{close}");
    };
    let rendered: Vec<String> = items.iter().map(|v| render(evaluator, v)).collect();
    format!("{open}{}{close}", rendered.join(","))
}

fn render_linked_list(evaluator: &Evaluator, reference: &crate::reference::Reference) -> String {
    let Some(HeapObject::LinkedList(items)) = evaluator.arena().get(reference) else {
        return "[]".to_string();
    };
    let rendered: Vec<String> = items.iter().map(|v| render(evaluator, v)).collect();
    format!("[{}]", rendered.join(","))
}

fn render_set(evaluator: &Evaluator, reference: &crate::reference::Reference) -> String {
    let (Some(HeapObject::Set(items)) | Some(HeapObject::HashSet(items))) = evaluator.arena().get(reference) else {
        return "{}".to_string();
    };
    let rendered: Vec<String> = items.iter().map(|v| render(evaluator, &v.0)).collect();
    format!("{{{}}}", rendered.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::{AngleMode, EvaluatorConfig};

    fn math_evaluator() -> Evaluator {
        let mut config = EvaluatorConfig::default();
        config.output_mode = OutputMode::MathO;
        config.angle_mode = AngleMode::Degrees;
        Evaluator::new(config)
    }

    #[test]
    fn renders_sqrt_two() {
        let evaluator = math_evaluator();
        let value = Value::Number(BigDecimal::from_f64_exact(2.0f64.sqrt()));
        assert_eq!(render(&evaluator, &value), "\u{221a}2");
    }

    #[test]
    fn renders_one_half_as_fraction() {
        let evaluator = math_evaluator();
        let value = Value::Number(BigDecimal::from_f64_exact(0.5));
        assert_eq!(render(&evaluator, &value), "1/2");
    }

    #[test]
    fn renders_negative_integer_plainly() {
        let evaluator = math_evaluator();
        let value = Value::Number(BigDecimal::from_i64(-2));
        assert_eq!(render(&evaluator, &value), "-2");
    }

    #[test]
    fn line_mode_falls_back_to_scientific_for_extremes() {
        let evaluator = Evaluator::new(EvaluatorConfig::default());
        let value = Value::Number(BigDecimal::from_f64_exact(1e20));
        assert!(render(&evaluator, &value).contains("x 10^"));
    }
}
