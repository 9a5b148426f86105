//! Evaluation of the ECMAScript expressions embedded in statecharts.
//!
//! The compiler treats guards, assignments and parameters as opaque strings.
//! Evaluation is only ever requested to check the default values of generated variables,
//! through the [`ExpressionInterpreter`] capability injected into the [`Orchestrator`](crate::Orchestrator).

use boa_ast::{
    Expression, Statement, StatementListItem,
    expression::{
        literal::Literal,
        operator::{
            binary::{ArithmeticOp, BinaryOp, LogicalOp, RelationalOp},
            unary::UnaryOp,
        },
    },
    scope::Scope,
};
use boa_interner::{Interner, Sym};
use log::trace;
use ordered_float::OrderedFloat;
use std::{collections::HashMap, fmt};
use thiserror::Error;

/// Values an expression can evaluate to.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum Value {
    /// Boolean values.
    Boolean(bool),
    /// Integer values.
    Integer(i64),
    /// Floating-point values.
    Float(OrderedFloat<f64>),
    /// String values.
    String(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::String(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(OrderedFloat(value))
    }
}

impl Value {
    fn as_float(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(x) => Some(x.into_inner()),
            _ => None,
        }
    }
}

/// The error type of expression evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpressionError {
    /// The expression is not syntactically valid.
    #[error("syntax error in expression `{expr}`: {reason}")]
    Syntax {
        /// The offending expression.
        expr: String,
        /// Description of the problem.
        reason: String,
    },
    /// The expression references a name that is not bound.
    #[error("undefined reference `{name}` in expression `{expr}`")]
    UndefinedReference {
        /// The offending expression.
        expr: String,
        /// The unbound name.
        name: String,
    },
    /// The expression uses a construct the interpreter does not support.
    #[error("unsupported construct in expression `{expr}`")]
    Unsupported {
        /// The offending expression.
        expr: String,
    },
    /// Operands have types incompatible with the operator.
    #[error("type error in expression `{expr}`")]
    Type {
        /// The offending expression.
        expr: String,
    },
}

/// The capability of evaluating an expression given values for its free names.
pub trait ExpressionInterpreter {
    /// Evaluates `expr`, resolving identifiers through `bindings`.
    ///
    /// Fails with [`ExpressionError`] on syntax errors or references to unbound names.
    fn evaluate(&self, expr: &str, bindings: &HashMap<String, Value>)
    -> Result<Value, ExpressionError>;
}

/// Interpreter for a side-effect-free subset of ECMAScript:
/// literals, bound identifiers, unary `-`, `+`, `!`,
/// arithmetic, relational and logical operators.
///
/// ```
/// # use rosfm_core::{EcmaScriptInterpreter, ExpressionInterpreter, Value};
/// # use std::collections::HashMap;
/// let interpreter = EcmaScriptInterpreter::new();
/// let bindings = HashMap::from([("x".to_owned(), Value::Integer(2))]);
/// assert_eq!(interpreter.evaluate("x * 3 + 1", &bindings), Ok(Value::Integer(7)));
/// assert_eq!(interpreter.evaluate("!(x > 1)", &bindings), Ok(Value::Boolean(false)));
/// assert!(interpreter.evaluate("y", &bindings).is_err());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct EcmaScriptInterpreter;

impl EcmaScriptInterpreter {
    /// Creates a new [`EcmaScriptInterpreter`].
    pub fn new() -> Self {
        Self
    }

    fn parse(&self, code: &str, interner: &mut Interner) -> Result<Expression, ExpressionError> {
        let script = boa_parser::Parser::new(boa_parser::Source::from_bytes(code))
            .parse_script(&Scope::new_global(), interner)
            .map_err(|err| ExpressionError::Syntax {
                expr: code.to_owned(),
                reason: err.to_string(),
            })?;
        if script.statements().len() != 1 {
            return Err(ExpressionError::Syntax {
                expr: code.to_owned(),
                reason: "code must be made by a single statement".to_owned(),
            });
        }
        match script.statements().first() {
            Some(StatementListItem::Statement(Statement::Expression(expr))) => Ok(expr.to_owned()),
            _ => Err(ExpressionError::Syntax {
                expr: code.to_owned(),
                reason: "statement is not an expression".to_owned(),
            }),
        }
    }
}

impl ExpressionInterpreter for EcmaScriptInterpreter {
    fn evaluate(
        &self,
        expr: &str,
        bindings: &HashMap<String, Value>,
    ) -> Result<Value, ExpressionError> {
        trace!("evaluating `{expr}`");
        let mut interner = Interner::new();
        let ast = self.parse(expr, &mut interner)?;
        Evaluator {
            code: expr,
            interner: &interner,
            bindings,
        }
        .eval(&ast)
    }
}

struct Evaluator<'a> {
    code: &'a str,
    interner: &'a Interner,
    bindings: &'a HashMap<String, Value>,
}

impl Evaluator<'_> {
    fn unsupported(&self) -> ExpressionError {
        ExpressionError::Unsupported {
            expr: self.code.to_owned(),
        }
    }

    fn type_error(&self) -> ExpressionError {
        ExpressionError::Type {
            expr: self.code.to_owned(),
        }
    }

    fn resolve(&self, sym: Sym) -> Result<String, ExpressionError> {
        self.interner
            .resolve(sym)
            .and_then(|s| s.utf8())
            .map(str::to_owned)
            .ok_or_else(|| self.unsupported())
    }

    fn eval(&self, expr: &Expression) -> Result<Value, ExpressionError> {
        match expr {
            Expression::Identifier(ident) => {
                let name = self.resolve(ident.sym())?;
                self.bindings.get(&name).cloned().ok_or_else(|| {
                    ExpressionError::UndefinedReference {
                        expr: self.code.to_owned(),
                        name,
                    }
                })
            }
            Expression::Literal(lit) => match lit {
                Literal::String(sym) => self.resolve(*sym).map(Value::String),
                Literal::Num(x) => Ok(Value::from(*x)),
                Literal::Int(i) => Ok(Value::Integer(i64::from(*i))),
                Literal::Bool(b) => Ok(Value::Boolean(*b)),
                Literal::BigInt(_) | Literal::Null | Literal::Undefined => Err(self.unsupported()),
            },
            Expression::Parenthesized(inner) => self.eval(inner.expression()),
            Expression::Unary(unary) => {
                let val = self.eval(unary.target())?;
                match (unary.op(), val) {
                    (UnaryOp::Minus, Value::Integer(i)) => i
                        .checked_neg()
                        .map(Value::Integer)
                        .ok_or_else(|| self.type_error()),
                    (UnaryOp::Minus, Value::Float(x)) => Ok(Value::Float(-x)),
                    (UnaryOp::Plus, val @ (Value::Integer(_) | Value::Float(_))) => Ok(val),
                    (UnaryOp::Not, Value::Boolean(b)) => Ok(Value::Boolean(!b)),
                    (UnaryOp::Minus | UnaryOp::Plus | UnaryOp::Not, _) => Err(self.type_error()),
                    _ => Err(self.unsupported()),
                }
            }
            Expression::Binary(bin) => {
                let lhs = self.eval(bin.lhs())?;
                let rhs = self.eval(bin.rhs())?;
                match bin.op() {
                    BinaryOp::Arithmetic(op) => self.arithmetic(op, lhs, rhs),
                    BinaryOp::Relational(op) => self.relational(op, lhs, rhs),
                    BinaryOp::Logical(op) => match (op, lhs, rhs) {
                        (LogicalOp::And, Value::Boolean(l), Value::Boolean(r)) => {
                            Ok(Value::Boolean(l && r))
                        }
                        (LogicalOp::Or, Value::Boolean(l), Value::Boolean(r)) => {
                            Ok(Value::Boolean(l || r))
                        }
                        (LogicalOp::And | LogicalOp::Or, _, _) => Err(self.type_error()),
                        _ => Err(self.unsupported()),
                    },
                    _ => Err(self.unsupported()),
                }
            }
            _ => Err(self.unsupported()),
        }
    }

    fn arithmetic(&self, op: ArithmeticOp, lhs: Value, rhs: Value) -> Result<Value, ExpressionError> {
        match (op, lhs, rhs) {
            (ArithmeticOp::Add, Value::String(l), Value::String(r)) => Ok(Value::String(l + &r)),
            (ArithmeticOp::Add, Value::Integer(l), Value::Integer(r)) => l
                .checked_add(r)
                .map(Value::Integer)
                .ok_or_else(|| self.type_error()),
            (ArithmeticOp::Sub, Value::Integer(l), Value::Integer(r)) => l
                .checked_sub(r)
                .map(Value::Integer)
                .ok_or_else(|| self.type_error()),
            (ArithmeticOp::Mul, Value::Integer(l), Value::Integer(r)) => l
                .checked_mul(r)
                .map(Value::Integer)
                .ok_or_else(|| self.type_error()),
            (ArithmeticOp::Mod, Value::Integer(l), Value::Integer(r)) => l
                .checked_rem(r)
                .map(Value::Integer)
                .ok_or_else(|| self.type_error()),
            (op, lhs, rhs) => {
                let (l, r) = lhs
                    .as_float()
                    .zip(rhs.as_float())
                    .ok_or_else(|| self.type_error())?;
                match op {
                    ArithmeticOp::Add => Ok(Value::from(l + r)),
                    ArithmeticOp::Sub => Ok(Value::from(l - r)),
                    ArithmeticOp::Mul => Ok(Value::from(l * r)),
                    ArithmeticOp::Div => Ok(Value::from(l / r)),
                    ArithmeticOp::Mod => Ok(Value::from(l % r)),
                    ArithmeticOp::Exp => Ok(Value::from(l.powf(r))),
                }
            }
        }
    }

    fn relational(
        &self,
        op: RelationalOp,
        lhs: Value,
        rhs: Value,
    ) -> Result<Value, ExpressionError> {
        use std::cmp::Ordering;

        let ordering = match (&lhs, &rhs) {
            (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
            (Value::Boolean(l), Value::Boolean(r)) => Some(l.cmp(r)),
            _ => lhs
                .as_float()
                .zip(rhs.as_float())
                .and_then(|(l, r)| l.partial_cmp(&r)),
        };
        let result = match op {
            RelationalOp::Equal | RelationalOp::StrictEqual => {
                ordering.is_some_and(Ordering::is_eq)
            }
            RelationalOp::NotEqual | RelationalOp::StrictNotEqual => {
                !ordering.is_some_and(Ordering::is_eq)
            }
            RelationalOp::GreaterThan => ordering.ok_or_else(|| self.type_error())?.is_gt(),
            RelationalOp::GreaterThanOrEqual => ordering.ok_or_else(|| self.type_error())?.is_ge(),
            RelationalOp::LessThan => ordering.ok_or_else(|| self.type_error())?.is_lt(),
            RelationalOp::LessThanOrEqual => ordering.ok_or_else(|| self.type_error())?.is_le(),
            RelationalOp::In | RelationalOp::InstanceOf => return Err(self.unsupported()),
        };
        Ok(Value::Boolean(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(expr: &str) -> Result<Value, ExpressionError> {
        EcmaScriptInterpreter::new().evaluate(expr, &HashMap::new())
    }

    #[test]
    fn literals() {
        assert_eq!(eval("true"), Ok(Value::Boolean(true)));
        assert_eq!(eval("42"), Ok(Value::Integer(42)));
        assert_eq!(eval("-3"), Ok(Value::Integer(-3)));
        assert_eq!(eval("0.5"), Ok(Value::from(0.5)));
        assert_eq!(eval("\"\""), Ok(Value::String(String::new())));
        assert_eq!(eval("'ab' + 'c'"), Ok(Value::String("abc".to_owned())));
    }

    #[test]
    fn operators() {
        assert_eq!(eval("1 + 2 * 3"), Ok(Value::Integer(7)));
        assert_eq!(eval("(1 + 2) * 3"), Ok(Value::Integer(9)));
        assert_eq!(eval("1 / 2"), Ok(Value::from(0.5)));
        assert_eq!(eval("7 % 4"), Ok(Value::Integer(3)));
        assert_eq!(eval("1 < 2 && 2 <= 2"), Ok(Value::Boolean(true)));
        assert_eq!(eval("1 === 1.0"), Ok(Value::Boolean(true)));
        assert_eq!(eval("false || !true"), Ok(Value::Boolean(false)));
    }

    #[test]
    fn bindings() {
        let interpreter = EcmaScriptInterpreter::new();
        let bindings = HashMap::from([
            ("speed".to_owned(), Value::from(1.5)),
            ("enabled".to_owned(), Value::Boolean(true)),
        ]);
        assert_eq!(
            interpreter.evaluate("enabled && speed > 1", &bindings),
            Ok(Value::Boolean(true))
        );
        assert_eq!(
            interpreter.evaluate("distance", &bindings),
            Err(ExpressionError::UndefinedReference {
                expr: "distance".to_owned(),
                name: "distance".to_owned(),
            })
        );
    }

    #[test]
    fn errors() {
        assert!(matches!(eval("1 +"), Err(ExpressionError::Syntax { .. })));
        assert!(matches!(eval("1; 2"), Err(ExpressionError::Syntax { .. })));
        assert!(matches!(eval("!1"), Err(ExpressionError::Type { .. })));
        assert!(matches!(eval("null"), Err(ExpressionError::Unsupported { .. })));
        // Negating i64::MIN.
        assert!(matches!(
            eval("-((0 - 2147483647 - 1) * (2147483647 + 1) * 2)"),
            Err(ExpressionError::Type { .. })
        ));
        assert_eq!(
            eval("-(0 - 2147483647 - 1)"),
            Ok(Value::Integer(2147483648))
        );
    }
}
