//! Integer expressions and conditions of the rule language

use std::fmt;

/// Integer-valued expression over the fields of the current state
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Const(i64),
    Field(String),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
}

#[allow(clippy::should_implement_trait)]
impl Expr {
    pub fn field(name: impl Into<String>) -> Self {
        Expr::Field(name.into())
    }

    pub fn constant(value: i64) -> Self {
        Expr::Const(value)
    }

    pub fn add(self, other: Expr) -> Self {
        Expr::Add(Box::new(self), Box::new(other))
    }

    pub fn sub(self, other: Expr) -> Self {
        Expr::Sub(Box::new(self), Box::new(other))
    }

    pub fn mul(self, other: Expr) -> Self {
        Expr::Mul(Box::new(self), Box::new(other))
    }

    pub fn eq(self, other: Expr) -> Condition {
        Condition::Compare(CmpOp::Eq, self, other)
    }

    pub fn ne(self, other: Expr) -> Condition {
        Condition::Compare(CmpOp::Ne, self, other)
    }

    pub fn lt(self, other: Expr) -> Condition {
        Condition::Compare(CmpOp::Lt, self, other)
    }

    pub fn le(self, other: Expr) -> Condition {
        Condition::Compare(CmpOp::Le, self, other)
    }

    pub fn gt(self, other: Expr) -> Condition {
        Condition::Compare(CmpOp::Gt, self, other)
    }

    pub fn ge(self, other: Expr) -> Condition {
        Condition::Compare(CmpOp::Ge, self, other)
    }

    /// Collect the names of every field the expression reads
    pub fn fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Const(_) => {}
            Expr::Field(name) => out.push(name),
            Expr::Add(l, r) | Expr::Sub(l, r) | Expr::Mul(l, r) => {
                l.fields(out);
                r.fields(out);
            }
        }
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Expr::Const(value)
    }
}

impl From<i32> for Expr {
    fn from(value: i32) -> Self {
        Expr::Const(i64::from(value))
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Const(v) => write!(f, "{}", v),
            Expr::Field(name) => write!(f, "{}", name),
            Expr::Add(l, r) => write!(f, "({} + {})", l, r),
            Expr::Sub(l, r) => write!(f, "({} - {})", l, r),
            Expr::Mul(l, r) => write!(f, "({} * {})", l, r),
        }
    }
}

/// Comparison operators usable in conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    /// Evaluate the comparison on concrete values
    pub fn holds(self, lhs: i64, rhs: i64) -> bool {
        match self {
            CmpOp::Eq => lhs == rhs,
            CmpOp::Ne => lhs != rhs,
            CmpOp::Lt => lhs < rhs,
            CmpOp::Le => lhs <= rhs,
            CmpOp::Gt => lhs > rhs,
            CmpOp::Ge => lhs >= rhs,
        }
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        };
        write!(f, "{}", op)
    }
}

/// Boolean condition guarding a rule
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Condition {
    Always,
    Compare(CmpOp, Expr, Expr),
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Not(Box<Condition>),
}

#[allow(clippy::should_implement_trait)]
impl Condition {
    pub fn all(conditions: Vec<Condition>) -> Self {
        Condition::And(conditions)
    }

    pub fn any(conditions: Vec<Condition>) -> Self {
        Condition::Or(conditions)
    }

    pub fn not(self) -> Self {
        Condition::Not(Box::new(self))
    }

    /// Collect the names of every field the condition reads
    pub fn fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Condition::Always => {}
            Condition::Compare(_, l, r) => {
                l.fields(out);
                r.fields(out);
            }
            Condition::And(parts) | Condition::Or(parts) => {
                for part in parts {
                    part.fields(out);
                }
            }
            Condition::Not(inner) => inner.fields(out),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Always => write!(f, "true"),
            Condition::Compare(op, l, r) => write!(f, "{} {} {}", l, op, r),
            Condition::And(parts) | Condition::Or(parts) => {
                if parts.is_empty() {
                    let empty = matches!(self, Condition::And(_));
                    return write!(f, "{}", empty);
                }
                let sep = if matches!(self, Condition::And(_)) {
                    " && "
                } else {
                    " || "
                };
                let rendered: Vec<_> = parts.iter().map(|p| format!("({})", p)).collect();
                write!(f, "{}", rendered.join(sep))
            }
            Condition::Not(inner) => write!(f, "!({})", inner),
        }
    }
}
