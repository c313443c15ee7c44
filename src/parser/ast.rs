// AST (Abstract Syntax Tree) definitions for the expression language

use std::fmt;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinOp {
    /// Map an operator symbol (`+ - * /`) to its operator.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(BinOp::Add),
            "-" => Some(BinOp::Sub),
            "*" => Some(BinOp::Mul),
            "/" => Some(BinOp::Div),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            BinOp::Add => '+',
            BinOp::Sub => '-',
            BinOp::Mul => '*',
            BinOp::Div => '/',
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Expression nodes. Every node owns its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    IntLiteral(i64),
    Identifier(String),
    BinaryOp {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Assignment {
        target: String,
        value: Box<Expr>,
    },
    IfElse {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Option<Box<Expr>>,
    },
}

impl Expr {
    pub fn binary(op: BinOp, left: Expr, right: Expr) -> Self {
        Expr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn assign(target: impl Into<String>, value: Expr) -> Self {
        Expr::Assignment {
            target: target.into(),
            value: Box::new(value),
        }
    }
}

/// Infix rendering used as the AST text form between the parse and lowering
/// stages. Binary operators are written without parentheses, so only
/// left-nested trees (the only shape the parser builds) read back unchanged.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::IntLiteral(value) => write!(f, "{}", value),
            Expr::Identifier(name) => write!(f, "{}", name),
            Expr::BinaryOp { op, left, right } => {
                write!(f, "{} {} {}", left, op, right)
            }
            Expr::Assignment { target, value } => {
                write!(f, "{} = {}", target, value)
            }
            Expr::IfElse {
                condition,
                then_branch,
                else_branch,
            } => {
                writeln!(f, "If-else")?;
                writeln!(f, "Condition: {}", condition)?;
                writeln!(f, "If branch: {}", then_branch)?;
                match else_branch {
                    Some(branch) => writeln!(f, "Else branch: {}", branch),
                    None => writeln!(f, "Else branch:"),
                }
            }
        }
    }
}
