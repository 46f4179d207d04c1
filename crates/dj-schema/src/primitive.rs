//! # Primitive Coercion
//!
//! Validates a raw scalar against a [`PrimitiveSchema`] and converts it into
//! its canonical in-memory form. Pure functions of their input.
//!
//! ## Accepted Raw Forms
//!
//! | kind | accepts |
//! |---|---|
//! | string | text |
//! | integer | whole numbers (`7`, `7.0`), whole numeric text (`"7"`) |
//! | float | numbers, numeric text; non-finite results rejected |
//! | decimal | numbers, numeric text (plain or scientific) |
//! | boolean | `true` / `false` only |
//! | bytes | standard base64 text |
//! | date / date-time / uuid | text in the respective format |
//! | any | everything, unchanged |
//! | null | `null` only |
//!
//! Booleans never coerce to numbers and numbers never coerce to text.
//! Well-formed numbers beyond the target's range (`"1e40"` for integer,
//! `1e300` for decimal) fail as a `range` constraint, not a type mismatch.

use std::cmp::Ordering;
use std::str::FromStr;

use base64::Engine as _;
use dj_core::temporal::{parse_date, parse_datetime};
use dj_core::ValidationError;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde_json::{Number, Value};
use uuid::Uuid;

use crate::instance::Instance;
use crate::schema::{Constraints, PrimitiveKind, PrimitiveSchema};

/// Shape name of a raw value, for error messages.
pub fn raw_shape(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

/// Coerce a raw value through a primitive schema, then check its constraints.
pub(crate) fn coerce(schema: &PrimitiveSchema, raw: &Value) -> Result<Instance, ValidationError> {
    let kind = schema.kind();
    let instance = coerce_kind(kind, raw)
        .ok_or_else(|| ValidationError::type_mismatch(kind.type_name(), raw_shape(raw)))??;
    check_constraints(schema.constraints(), &instance)?;
    Ok(instance)
}

/// Raw-shape check used by union resolution: would `coerce` get past the
/// kind conversion? Constraints are not consulted.
pub(crate) fn accepts_shape(kind: PrimitiveKind, raw: &Value) -> bool {
    matches!(coerce_kind(kind, raw), Some(Ok(_)))
}

/// `None` means the raw shape is wrong for the kind; `Some(Err)` means the
/// shape is right but the value is out of the representable range.
fn coerce_kind(kind: PrimitiveKind, raw: &Value) -> Option<Result<Instance, ValidationError>> {
    let instance = match (kind, raw) {
        (PrimitiveKind::Any, v) => Instance::Any(v.clone()),
        (PrimitiveKind::Null, Value::Null) => Instance::Null,
        (PrimitiveKind::String, Value::String(s)) => Instance::String(s.clone()),
        (PrimitiveKind::Boolean, Value::Bool(b)) => Instance::Bool(*b),
        (PrimitiveKind::Integer, Value::Number(n)) => return integer_from_number(n),
        (PrimitiveKind::Integer, Value::String(s)) => return integer_from_text(s),
        (PrimitiveKind::Float, Value::Number(n)) => match n.as_f64().filter(|f| f.is_finite()) {
            Some(f) => Instance::Float(f),
            None => return Some(Err(out_of_range(&n.to_string(), "float"))),
        },
        (PrimitiveKind::Float, Value::String(s)) => return float_from_text(s.trim()),
        (PrimitiveKind::Decimal, Value::Number(n)) => match parse_decimal(&n.to_string()) {
            Some(d) => Instance::Decimal(d),
            None => return Some(Err(out_of_range(&n.to_string(), "decimal"))),
        },
        (PrimitiveKind::Decimal, Value::String(s)) => return decimal_from_text(s.trim()),
        (PrimitiveKind::Bytes, Value::String(s)) => Instance::Bytes(
            base64::engine::general_purpose::STANDARD.decode(s).ok()?,
        ),
        (PrimitiveKind::Date, Value::String(s)) => Instance::Date(parse_date(s).ok()?),
        (PrimitiveKind::DateTime, Value::String(s)) => Instance::DateTime(parse_datetime(s).ok()?),
        (PrimitiveKind::Uuid, Value::String(s)) => Instance::Uuid(Uuid::parse_str(s).ok()?),
        _ => return None,
    };
    Some(Ok(instance))
}

fn integer_from_number(n: &Number) -> Option<Result<Instance, ValidationError>> {
    if let Some(i) = n.as_i64() {
        return Some(Ok(Instance::Int(i)));
    }
    if n.is_u64() {
        return Some(Err(out_of_range(&n.to_string(), INTEGER_RANGE)));
    }
    let Some(f) = n.as_f64().filter(|f| f.is_finite()) else {
        return Some(Err(out_of_range(&n.to_string(), INTEGER_RANGE)));
    };
    if f.fract() != 0.0 {
        return None;
    }
    Some(
        Decimal::from_f64(f)
            .and_then(|d| d.to_i64())
            .map(Instance::Int)
            .ok_or_else(|| out_of_range(&n.to_string(), INTEGER_RANGE)),
    )
}

fn integer_from_text(s: &str) -> Option<Result<Instance, ValidationError>> {
    let s = s.trim();
    if let Ok(i) = i64::from_str(s) {
        return Some(Ok(Instance::Int(i)));
    }
    let Some(d) = parse_decimal(s) else {
        // Well-formed but beyond the decimal range: whole values are too
        // large for an integer, fractional ones are not integers at all.
        let f = numeric_literal(s)?;
        return (f.fract() == 0.0 || !f.is_finite()).then(|| Err(out_of_range(s, INTEGER_RANGE)));
    };
    if !d.fract().is_zero() {
        return None;
    }
    Some(d.to_i64().map(Instance::Int).ok_or_else(|| out_of_range(s, INTEGER_RANGE)))
}

fn float_from_text(s: &str) -> Option<Result<Instance, ValidationError>> {
    let f = numeric_literal(s)?;
    Some(if f.is_finite() {
        Ok(Instance::Float(f))
    } else {
        Err(out_of_range(s, "float"))
    })
}

fn decimal_from_text(s: &str) -> Option<Result<Instance, ValidationError>> {
    match parse_decimal(s) {
        Some(d) => Some(Ok(Instance::Decimal(d))),
        None => numeric_literal(s).map(|_| Err(out_of_range(s, "decimal"))),
    }
}

/// Parses digits, sign, point and exponent only; `inf` and `NaN` are text,
/// not numbers. The result may be infinite for literals beyond `f64`.
fn numeric_literal(s: &str) -> Option<f64> {
    let well_formed = s.bytes().any(|b| b.is_ascii_digit())
        && s.bytes().all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
    if !well_formed {
        return None;
    }
    f64::from_str(s).ok()
}

const INTEGER_RANGE: &str = "a 64-bit signed integer";

fn out_of_range(literal: &str, target: &str) -> ValidationError {
    ValidationError::constraint("range", format!("{literal} does not fit {target}"))
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

fn check_constraints(c: &Constraints, instance: &Instance) -> Result<(), ValidationError> {
    let length = match instance {
        Instance::String(s) => Some(s.chars().count()),
        Instance::Bytes(b) => Some(b.len()),
        _ => None,
    };
    if let Some(len) = length {
        if let Some(min) = c.min_length {
            if len < min {
                return Err(ValidationError::constraint(
                    "min_length",
                    format!("length {len} is below the minimum of {min}"),
                ));
            }
        }
        if let Some(max) = c.max_length {
            if len > max {
                return Err(ValidationError::constraint(
                    "max_length",
                    format!("length {len} exceeds the maximum of {max}"),
                ));
            }
        }
    }

    if let (Some(pattern), Instance::String(s)) = (&c.pattern, instance) {
        if !pattern.is_match(s) {
            return Err(ValidationError::constraint(
                "pattern",
                format!("{s:?} does not match {:?}", pattern.as_str()),
            ));
        }
    }

    if let Some(n) = Numeric::of(instance) {
        let bounds: [(&str, Option<Decimal>, fn(Ordering) -> bool); 4] = [
            ("minimum", c.minimum, Ordering::is_ge),
            ("maximum", c.maximum, Ordering::is_le),
            ("exclusive_minimum", c.exclusive_minimum, Ordering::is_gt),
            ("exclusive_maximum", c.exclusive_maximum, Ordering::is_lt),
        ];
        for (name, bound, holds) in bounds {
            let Some(bound) = bound else { continue };
            if let Some(ordering) = n.cmp_to(&bound) {
                if !holds(ordering) {
                    return Err(ValidationError::constraint(
                        name,
                        format!("{} violates {name} {bound}", instance.encode()),
                    ));
                }
            }
        }
    }

    if let Some(allowed) = &c.allowed {
        let encoded = instance.encode();
        if !allowed.contains(&encoded) {
            let listed: Vec<String> = allowed.iter().map(Value::to_string).collect();
            return Err(ValidationError::constraint(
                "enum",
                format!("{encoded} is not one of [{}]", listed.join(", ")),
            ));
        }
    }

    Ok(())
}

/// Numeric view used for range checks.
enum Numeric {
    Exact(Decimal),
    Approx(f64),
}

impl Numeric {
    fn of(instance: &Instance) -> Option<Self> {
        match instance {
            Instance::Int(i) => Some(Numeric::Exact(Decimal::from(*i))),
            Instance::Decimal(d) => Some(Numeric::Exact(*d)),
            Instance::Float(f) => Some(match Decimal::from_f64(*f) {
                Some(d) => Numeric::Exact(d),
                None => Numeric::Approx(*f),
            }),
            _ => None,
        }
    }

    fn cmp_to(&self, bound: &Decimal) -> Option<Ordering> {
        match self {
            Numeric::Exact(d) => Some(d.cmp(bound)),
            Numeric::Approx(f) => f.partial_cmp(&bound.to_f64()?),
        }
    }
}
