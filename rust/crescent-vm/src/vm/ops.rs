//! Station semantics.
//!
//! Every visit is first planned as a single [`Effect`] from the current
//! accumulator, the destination cell and the call stack, without touching
//! the machine. Only a successful plan is applied, so a failing operator
//! leaves the state exactly as it was.

use super::{CallFrame, VmError};
use crate::operations::{BinaryOp, Operation, UnaryOp};
use crescent_core::{LocationId, Value};
use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};
use once_cell::sync::Lazy;
use regex::Regex;

static NUMERIC_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-?[0-9]+").expect("numeric prefix pattern is valid"));

/// What a single visit does to the machine.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Effect {
    /// Exchange accumulator and cell.
    Swap,
    /// Cell takes the old accumulator, accumulator takes the result.
    Combine(Value),
    /// Accumulator takes the value, cell is untouched.
    Load(Value),
    /// Both registers get new values.
    Split { accumulator: Value, cell: Value },
    /// Swap, then copy the new cell value into `alias`.
    Store { alias: LocationId },
    Retrieve,
    Mark,
    Jump(CallFrame),
    Unmark,
    Emit,
    /// Branch not taken.
    Stay,
}

pub(crate) fn plan(
    op: Option<&Operation>,
    accumulator: &Value,
    cell: &Value,
    stack: &[CallFrame],
) -> Result<Effect, VmError> {
    let Some(op) = op else {
        return Ok(Effect::Swap);
    };
    let effect = match op {
        Operation::Binary(bin) => {
            binary(*bin, accumulator, cell)?.map_or(Effect::Swap, Effect::Combine)
        }
        Operation::Unary(UnaryOp::ParsePrefix) => parse_prefix(accumulator),
        Operation::Unary(UnaryOp::Constant(n)) => Effect::Load(Value::from(*n)),
        Operation::Unary(un) => unary(*un, cell)?.map_or(Effect::Swap, Effect::Combine),
        Operation::Store { alias } => Effect::Store {
            alias: alias.clone(),
        },
        Operation::Retrieve => Effect::Retrieve,
        Operation::Mark => Effect::Mark,
        Operation::BranchIfNonZero => {
            if accumulator.is_nonzero_integer() {
                let top = stack.last().ok_or(VmError::EmptyStack)?;
                Effect::Jump(top.clone())
            } else {
                Effect::Stay
            }
        }
        Operation::Unmark => {
            if stack.is_empty() {
                return Err(VmError::EmptyStack);
            }
            Effect::Unmark
        }
        Operation::Emit => Effect::Emit,
    };
    Ok(effect)
}

/// Apply a binary operator to `(a, b)` = `(accumulator, cell)`.
///
/// `Ok(None)` means the operand types don't fit the operator.
pub(crate) fn binary(op: BinaryOp, a: &Value, b: &Value) -> Result<Option<Value>, VmError> {
    match op {
        BinaryOp::LeftSubstring | BinaryOp::RightSubstring => substring(op, a, b),
        BinaryOp::Concat => Ok(match (a, b) {
            (Value::Text(a), Value::Text(b)) => Some(Value::Text(format!("{}{}", b, a))),
            _ => None,
        }),
        _ => match (a, b) {
            (Value::Integer(a), Value::Integer(b)) => Ok(integer_op(op, a, b)),
            _ => Ok(None),
        },
    }
}

fn integer_op(op: BinaryOp, a: &BigInt, b: &BigInt) -> Option<Value> {
    let result = match op {
        BinaryOp::Add => Value::Integer(a + b),
        BinaryOp::Multiply => Value::Integer(a * b),
        BinaryOp::Divide if a.is_zero() => Value::empty_text(),
        BinaryOp::Divide => Value::Integer(floor_div(b, a)),
        BinaryOp::Remainder if a.is_zero() => Value::empty_text(),
        BinaryOp::Remainder => Value::Integer(floor_mod(b, a)),
        BinaryOp::Max => Value::Integer(a.max(b).clone()),
        BinaryOp::Nor => Value::Integer(!(a | b)),
        BinaryOp::And => Value::Integer(a & b),
        BinaryOp::ShiftLeft => Value::Integer(b << a.to_u32()?),
        BinaryOp::ShiftRight => Value::Integer(b >> a.to_u32()?),
        BinaryOp::Concat | BinaryOp::LeftSubstring | BinaryOp::RightSubstring => return None,
    };
    Some(result)
}

/// Apply a unary operator to the cell. Constants don't read the cell and
/// are planned as a load instead.
pub(crate) fn unary(op: UnaryOp, b: &Value) -> Result<Option<Value>, VmError> {
    let result = match (op, b) {
        (UnaryOp::Square, Value::Integer(n)) => Value::Integer(n * n),
        (UnaryOp::Complement, Value::Integer(n)) => Value::Integer(!n),
        (UnaryOp::CharCode, Value::Text(s)) => {
            Value::from(s.chars().next().map_or(0, |c| i64::from(u32::from(c))))
        }
        (UnaryOp::CharCode, Value::Integer(n)) => {
            let ch = n.to_u32().and_then(char::from_u32).ok_or_else(|| {
                VmError::InvalidOperand(format!("{} is not a character code point", n))
            })?;
            Value::Text(ch.to_string())
        }
        (UnaryOp::Uppercase, Value::Text(s)) => Value::Text(s.to_uppercase()),
        (UnaryOp::Lowercase, Value::Text(s)) => Value::Text(s.to_lowercase()),
        (UnaryOp::Reverse, Value::Text(s)) => Value::Text(s.chars().rev().collect()),
        _ => return Ok(None),
    };
    Ok(Some(result))
}

/// Split a leading integer off a Text accumulator. The integer becomes the
/// accumulator and whatever follows it becomes the cell.
fn parse_prefix(accumulator: &Value) -> Effect {
    let Value::Text(text) = accumulator else {
        return Effect::Swap;
    };
    match NUMERIC_PREFIX.find(text) {
        Some(m) => match m.as_str().parse::<BigInt>() {
            Ok(n) => Effect::Split {
                accumulator: Value::Integer(n),
                cell: Value::Text(text[m.end()..].to_string()),
            },
            Err(_) => Effect::Swap,
        },
        None => Effect::Split {
            accumulator: Value::from(0),
            cell: Value::empty_text(),
        },
    }
}

fn substring(op: BinaryOp, a: &Value, b: &Value) -> Result<Option<Value>, VmError> {
    let (text, length) = match (a, b) {
        (Value::Integer(n), Value::Text(s)) | (Value::Text(s), Value::Integer(n)) => (s, n),
        _ => return Ok(None),
    };
    if length.is_negative() {
        return Err(VmError::InvalidOperand(format!(
            "substring length cannot be negative (got {})",
            length
        )));
    }
    let length = length.to_usize().unwrap_or(usize::MAX);
    let result = if op == BinaryOp::LeftSubstring {
        text.chars().take(length).collect()
    } else {
        let total = text.chars().count();
        text.chars().skip(total.saturating_sub(length)).collect()
    };
    Ok(Some(Value::Text(result)))
}

fn floor_div(n: &BigInt, d: &BigInt) -> BigInt {
    let q = n / d;
    let r = n % d;
    if !r.is_zero() && (r.is_negative() != d.is_negative()) {
        q - 1
    } else {
        q
    }
}

fn floor_mod(n: &BigInt, d: &BigInt) -> BigInt {
    let r = n % d;
    if !r.is_zero() && (r.is_negative() != d.is_negative()) {
        r + d
    } else {
        r
    }
}
