use pest::Parser;
use std::f64::consts::{E, PI};
use std::fmt;

use crate::base::Base;
use crate::errors::CalcError;

#[derive(Parser)]
#[grammar = "calc.pest"]
pub struct CalcParser;

/// Calculator operating mode
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Real arithmetic with trigonometric/logarithmic functions
    Scientific,
    /// Integer arithmetic in a selectable base with bitwise operators
    Programmer,
}

/// Arithmetic operator symbol
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

/// Bitwise keyword operator
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BitOp {
    And,
    Or,
    Xor,
    Not,
}

/// Built-in single-argument function
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Func {
    Sin,
    Cos,
    Tan,
    Ln,
    Log,
    Sqrt,
    Fact,
}

/// Named constant resolved to an f64 literal at lexing time
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Const {
    Pi,
    E,
}

impl Const {
    pub fn value(self) -> f64 {
        match self {
            Const::Pi => PI,
            Const::E => E,
        }
    }
}

/// A single lexical token. Immutable once produced by `tokenize`.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    /// Digit run with at most one decimal point. Kept as the raw digit
    /// string so Programmer mode can interpret it in the active base.
    Number(String),
    Op(ArithOp),
    Bit(BitOp),
    Func(Func),
    Const(Const),
    OpenB,
    CloseB,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::Number(s) => write!(f, "{}", s),
            Token::Op(ArithOp::Add) => write!(f, "+"),
            Token::Op(ArithOp::Sub) => write!(f, "-"),
            Token::Op(ArithOp::Mul) => write!(f, "×"),
            Token::Op(ArithOp::Div) => write!(f, "÷"),
            Token::Op(ArithOp::Pow) => write!(f, "^"),
            Token::Bit(BitOp::And) => write!(f, "AND"),
            Token::Bit(BitOp::Or) => write!(f, "OR"),
            Token::Bit(BitOp::Xor) => write!(f, "XOR"),
            Token::Bit(BitOp::Not) => write!(f, "NOT"),
            Token::Func(func) => write!(f, "{}", func.name()),
            Token::Const(Const::Pi) => write!(f, "π"),
            Token::Const(Const::E) => write!(f, "e"),
            Token::OpenB => write!(f, "("),
            Token::CloseB => write!(f, ")"),
        }
    }
}

impl Func {
    pub fn name(self) -> &'static str {
        match self {
            Func::Sin => "sin",
            Func::Cos => "cos",
            Func::Tan => "tan",
            Func::Ln => "ln",
            Func::Log => "log",
            Func::Sqrt => "sqrt",
            Func::Fact => "fact",
        }
    }
}

// A number token is validated against the active mode and base before it
// is accepted: Scientific numbers are plain decimal, Programmer numbers
// must fit the base alphabet and cannot carry a decimal point.
fn number_token(val: &str, mode: Mode, base: Base) -> Result<Token, CalcError> {
    match mode {
        Mode::Scientific => {
            // 'e' and '-' only ever appear inside an exponent suffix,
            // the grammar guarantees the shape
            for c in val.chars() {
                if !c.is_ascii_digit() && c != '.' && c != 'e' && c != '-' {
                    return Err(CalcError::InvalidDigit(c, 10));
                }
            }
        }
        Mode::Programmer => {
            for c in val.chars() {
                if c == '.' {
                    return Err(CalcError::UnexpectedToken(".".to_string()));
                }
                if !base.digit_legal(c) {
                    return Err(CalcError::InvalidDigit(c, base.radix()));
                }
            }
        }
    }
    Ok(Token::Number(val.to_string()))
}

/// Splits an expression string into tokens, left to right, longest match
/// first for keywords. Display glyphs are canonicalized here: `×` and `*`
/// both become Mul, `÷` and `/` Div, `√` becomes the sqrt function, and
/// `π`/`e` become constants carrying their f64 values.
///
/// Legality is mode-dependent: functions, constants, and decimal points
/// belong to Scientific mode, bitwise keywords to Programmer mode, and
/// the `A`-`F` digits require the Hexadecimal base. Whitespace between
/// tokens is ignored. Any other character fails the whole expression.
pub fn tokenize(expr: &str, mode: Mode, base: Base) -> Result<Vec<Token>, CalcError> {
    let pairs = match CalcParser::parse(Rule::expr, expr) {
        Ok(p) => p,
        Err(..) => return Err(CalcError::ParseFailed("invalid expression".to_string())),
    };

    let mut tokens = Vec::new();
    for pair in pairs {
        let rule = pair.as_rule();
        let val = pair.as_span().as_str();
        match rule {
            Rule::number => tokens.push(number_token(val, mode, base)?),
            Rule::operator => {
                let op = match val {
                    "+" => ArithOp::Add,
                    "-" => ArithOp::Sub,
                    "×" | "*" => ArithOp::Mul,
                    "÷" | "/" => ArithOp::Div,
                    "^" => ArithOp::Pow,
                    _ => return Err(CalcError::ParseFailed("invalid expression".to_string())),
                };
                tokens.push(Token::Op(op));
            }
            Rule::func | Rule::root => {
                if mode != Mode::Scientific {
                    return Err(CalcError::UnexpectedToken(val.to_string()));
                }
                let func = match val {
                    "sin" => Func::Sin,
                    "cos" => Func::Cos,
                    "tan" => Func::Tan,
                    "ln" => Func::Ln,
                    "log" => Func::Log,
                    "sqrt" | "√" => Func::Sqrt,
                    "fact" => Func::Fact,
                    _ => return Err(CalcError::ParseFailed("invalid expression".to_string())),
                };
                tokens.push(Token::Func(func));
            }
            Rule::konst => {
                if mode != Mode::Scientific {
                    return Err(CalcError::UnexpectedToken(val.to_string()));
                }
                let c = if val == "π" { Const::Pi } else { Const::E };
                tokens.push(Token::Const(c));
            }
            Rule::bitop => {
                if mode != Mode::Programmer {
                    return Err(CalcError::UnexpectedToken(val.to_string()));
                }
                let op = match val {
                    "AND" => BitOp::And,
                    "OR" => BitOp::Or,
                    "XOR" => BitOp::Xor,
                    "NOT" => BitOp::Not,
                    _ => return Err(CalcError::ParseFailed("invalid expression".to_string())),
                };
                tokens.push(Token::Bit(op));
            }
            Rule::open_b => tokens.push(Token::OpenB),
            Rule::close_b => tokens.push(Token::CloseB),
            Rule::EOI => {}
            _ => return Err(CalcError::ParseFailed("invalid expression".to_string())),
        }
    }
    Ok(tokens)
}
