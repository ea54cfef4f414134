use std::f64::consts::PI;

use crate::base::{self, Base};
use crate::errors::{CalcError, CalcResult};
use crate::parse::{tokenize, ArithOp, BitOp, Func, Mode, Token};

/// Trigonometric argument interpretation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AngleUnit {
    Degrees,
    Radians,
}

/// Binary operator of an expression node
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    And,
    Or,
    Xor,
}

/// Unary operator of an expression node
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
}

/// Expression tree. Each node exclusively owns its children; the whole
/// tree is dropped right after evaluation.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Literal(f64),
    Unary(UnOp, Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Call(Func, Box<Expr>),
}

// Binding strength of a binary operator plus right-associativity.
// AND/OR/XOR share a single level below addition, left-associative.
fn priority(op: BinOp) -> (i32, bool) {
    match op {
        BinOp::Pow => (17, true),
        BinOp::Mul | BinOp::Div => (12, false),
        BinOp::Add | BinOp::Sub => (8, false),
        BinOp::And | BinOp::Or | BinOp::Xor => (5, false),
    }
}

// Unary minus and NOT bind tighter than power: -2^2 is (-2)^2
const PRI_UNARY: i32 = 20;

struct TokenStream<'a> {
    tokens: &'a [Token],
    pos: usize,
    mode: Mode,
    base: Base,
}

impl<'a> TokenStream<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn expect_close(&mut self) -> Result<(), CalcError> {
        match self.advance() {
            Some(Token::CloseB) => Ok(()),
            Some(t) => Err(CalcError::UnexpectedToken(t.to_string())),
            None => Err(CalcError::UnexpectedEnd),
        }
    }

    fn literal(&self, s: &str) -> CalcResult {
        match self.mode {
            Mode::Scientific => s.parse::<f64>().map_err(|_| CalcError::ParseFailed(s.to_string())),
            Mode::Programmer => {
                let i = base::digits_to_decimal(s, self.base)?;
                base::int_to_f64(&i)
            }
        }
    }

    // A prefix position: literal, constant, unary sign, NOT, a function
    // call with a mandatory parenthesized argument, or a bracketed group
    fn parse_prefix(&mut self) -> Result<Expr, CalcError> {
        match self.advance() {
            None => Err(CalcError::UnexpectedEnd),
            Some(Token::Number(s)) => Ok(Expr::Literal(self.literal(&s)?)),
            Some(Token::Const(c)) => Ok(Expr::Literal(c.value())),
            Some(Token::Op(ArithOp::Add)) => self.parse_prefix(),
            Some(Token::Op(ArithOp::Sub)) => {
                let operand = self.parse_expr(PRI_UNARY)?;
                Ok(Expr::Unary(UnOp::Neg, Box::new(operand)))
            }
            Some(Token::Bit(BitOp::Not)) => {
                let operand = self.parse_expr(PRI_UNARY)?;
                Ok(Expr::Unary(UnOp::Not, Box::new(operand)))
            }
            Some(Token::Func(func)) => {
                match self.advance() {
                    Some(Token::OpenB) => {}
                    Some(t) => return Err(CalcError::UnexpectedToken(t.to_string())),
                    None => return Err(CalcError::UnexpectedEnd),
                }
                let arg = self.parse_expr(0)?;
                self.expect_close()?;
                Ok(Expr::Call(func, Box::new(arg)))
            }
            Some(Token::OpenB) => {
                let inner = self.parse_expr(0)?;
                self.expect_close()?;
                Ok(inner)
            }
            Some(t) => Err(CalcError::UnexpectedToken(t.to_string())),
        }
    }

    fn parse_expr(&mut self, min_pri: i32) -> Result<Expr, CalcError> {
        let mut lhs = self.parse_prefix()?;
        loop {
            let op = match self.peek() {
                Some(Token::Op(ArithOp::Add)) => BinOp::Add,
                Some(Token::Op(ArithOp::Sub)) => BinOp::Sub,
                Some(Token::Op(ArithOp::Mul)) => BinOp::Mul,
                Some(Token::Op(ArithOp::Div)) => BinOp::Div,
                Some(Token::Op(ArithOp::Pow)) => BinOp::Pow,
                Some(Token::Bit(BitOp::And)) => BinOp::And,
                Some(Token::Bit(BitOp::Or)) => BinOp::Or,
                Some(Token::Bit(BitOp::Xor)) => BinOp::Xor,
                _ => break,
            };
            let (pri, right_assoc) = priority(op);
            if pri < min_pri {
                break;
            }
            self.advance();
            let next_min = if right_assoc { pri } else { pri + 1 };
            let rhs = self.parse_expr(next_min)?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }
}

/// Builds an expression tree from a token sequence. Number literals are
/// interpreted here: plain decimal in Scientific mode, active-base digits
/// in Programmer mode.
pub fn parse(tokens: &[Token], mode: Mode, base: Base) -> Result<Expr, CalcError> {
    if tokens.is_empty() {
        return Err(CalcError::EmptyExpression);
    }
    let mut stream = TokenStream {
        tokens,
        pos: 0,
        mode,
        base,
    };
    let expr = stream.parse_expr(0)?;
    match stream.peek() {
        Some(t) => Err(CalcError::UnexpectedToken(t.to_string())),
        None => Ok(expr),
    }
}

fn to_radians(v: f64, angle: AngleUnit) -> f64 {
    match angle {
        AngleUnit::Degrees => v * PI / 180.0,
        AngleUnit::Radians => v,
    }
}

/// Applies a built-in function to an already evaluated argument. Domain
/// failures of the float library (sqrt or log of a negative number)
/// propagate as NaN values, not as errors.
pub fn apply_function(func: Func, v: f64, angle: AngleUnit) -> CalcResult {
    match func {
        Func::Sin => Ok(to_radians(v, angle).sin()),
        Func::Cos => Ok(to_radians(v, angle).cos()),
        Func::Tan => Ok(to_radians(v, angle).tan()),
        Func::Ln => Ok(v.ln()),
        Func::Log => Ok(v.log10()),
        Func::Sqrt => Ok(v.sqrt()),
        Func::Fact => factorial(v),
    }
}

/// Factorial over f64: the argument is truncated toward zero first, a
/// negative argument is a domain error, 0! is 1. 171! already overflows
/// f64, so anything above 170 short-circuits to infinity.
pub fn factorial(v: f64) -> CalcResult {
    if v.is_nan() || v.is_infinite() {
        return Err(CalcError::FloatToInt(v));
    }
    let n = v.trunc();
    if n < 0.0 {
        return Err(CalcError::NegativeFactorial);
    }
    if n > 170.0 {
        return Ok(f64::INFINITY);
    }
    let mut res = 1.0;
    let mut i = 2.0;
    while i <= n {
        res *= i;
        i += 1.0;
    }
    Ok(res)
}

// Bitwise operand: truncated toward zero, must be a finite integer
fn bits(v: f64) -> Result<num_bigint::BigInt, CalcError> {
    base::f64_to_int(v.trunc())
}

/// Recursively evaluates an expression tree
pub fn eval(expr: &Expr, angle: AngleUnit) -> CalcResult {
    match expr {
        Expr::Literal(v) => Ok(*v),
        Expr::Unary(UnOp::Neg, e) => Ok(-eval(e, angle)?),
        Expr::Unary(UnOp::Not, e) => {
            let i = bits(eval(e, angle)?)?;
            base::int_to_f64(&!i)
        }
        Expr::Binary(op, l, r) => {
            let a = eval(l, angle)?;
            let b = eval(r, angle)?;
            match op {
                BinOp::Add => Ok(a + b),
                BinOp::Sub => Ok(a - b),
                BinOp::Mul => Ok(a * b),
                // division by zero yields a signed infinity (or NaN for
                // 0/0) which is displayed, not treated as a failure
                BinOp::Div => Ok(a / b),
                BinOp::Pow => Ok(a.powf(b)),
                BinOp::And => base::int_to_f64(&(bits(a)? & bits(b)?)),
                BinOp::Or => base::int_to_f64(&(bits(a)? | bits(b)?)),
                BinOp::Xor => base::int_to_f64(&(bits(a)? ^ bits(b)?)),
            }
        }
        Expr::Call(func, arg) => {
            let v = eval(arg, angle)?;
            apply_function(*func, v, angle)
        }
    }
}

/// Full pipeline for one expression string: tokenize, parse, evaluate
pub fn evaluate(expr: &str, mode: Mode, base: Base, angle: AngleUnit) -> CalcResult {
    let tokens = tokenize(expr, mode, base)?;
    let ast = parse(&tokens, mode, base)?;
    eval(&ast, angle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sci(expr: &str, angle: AngleUnit) -> CalcResult {
        evaluate(expr, Mode::Scientific, Base::Decimal, angle)
    }

    fn prog(expr: &str, base: Base) -> CalcResult {
        evaluate(expr, Mode::Programmer, base, AngleUnit::Degrees)
    }

    #[test]
    fn test_precedence() {
        assert_eq!(sci("3+4×2", AngleUnit::Degrees), Ok(11.0));
        assert_eq!(sci("(1+2)×3", AngleUnit::Degrees), Ok(9.0));
        assert_eq!(sci("10-4-3", AngleUnit::Degrees), Ok(3.0));
        assert_eq!(sci("7÷2", AngleUnit::Degrees), Ok(3.5));
        assert_eq!(sci("2+3×4^2", AngleUnit::Degrees), Ok(50.0));
    }

    #[test]
    fn test_exponent_literals() {
        assert_eq!(sci("1e-7×2", AngleUnit::Degrees), Ok(2e-7));
        assert_eq!(sci("1.5e2", AngleUnit::Degrees), Ok(150.0));
    }

    #[test]
    fn test_power_right_associative() {
        assert_eq!(sci("2^3^2", AngleUnit::Degrees), Ok(512.0));
        assert_eq!(sci("(2^3)^2", AngleUnit::Degrees), Ok(64.0));
        assert_eq!(sci("2^-2", AngleUnit::Degrees), Ok(0.25));
    }

    #[test]
    fn test_unary_minus() {
        assert_eq!(sci("-3+5", AngleUnit::Degrees), Ok(2.0));
        assert_eq!(sci("5×-3", AngleUnit::Degrees), Ok(-15.0));
        assert_eq!(sci("--4", AngleUnit::Degrees), Ok(4.0));
        // unary minus binds tighter than power
        assert_eq!(sci("-2^2", AngleUnit::Degrees), Ok(4.0));
    }

    #[test]
    fn test_trigonometry() {
        let v = sci("sin(30)", AngleUnit::Degrees).unwrap();
        assert!((v - 0.5).abs() < 1e-12);
        let v = sci("sin(π÷2)", AngleUnit::Radians).unwrap();
        assert!((v - 1.0).abs() < 1e-12);
        let v = sci("cos(60)", AngleUnit::Degrees).unwrap();
        assert!((v - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_logs_and_roots() {
        let v = sci("log(1000)", AngleUnit::Degrees).unwrap();
        assert!((v - 3.0).abs() < 1e-12);
        let v = sci("ln(e)", AngleUnit::Degrees).unwrap();
        assert!((v - 1.0).abs() < 1e-12);
        assert_eq!(sci("sqrt(16)", AngleUnit::Degrees), Ok(4.0));
        assert_eq!(sci("√(81)", AngleUnit::Degrees), Ok(9.0));
        // sqrt of a negative propagates NaN, it is not an error
        assert!(sci("sqrt(0-4)", AngleUnit::Degrees).unwrap().is_nan());
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(sci("5÷0", AngleUnit::Degrees), Ok(f64::INFINITY));
        assert_eq!(sci("-5÷0", AngleUnit::Degrees), Ok(f64::NEG_INFINITY));
        assert!(sci("0÷0", AngleUnit::Degrees).unwrap().is_nan());
    }

    #[test]
    fn test_factorial() {
        assert_eq!(factorial(0.0), Ok(1.0));
        assert_eq!(factorial(5.0), Ok(120.0));
        assert_eq!(factorial(5.9), Ok(120.0)); // truncated, not rounded
        assert_eq!(factorial(-1.0), Err(CalcError::NegativeFactorial));
        assert_eq!(factorial(171.0), Ok(f64::INFINITY));
        assert_eq!(sci("fact(5)", AngleUnit::Degrees), Ok(120.0));
        assert_eq!(sci("fact(0-1)", AngleUnit::Degrees), Err(CalcError::NegativeFactorial));
    }

    #[test]
    fn test_bitwise() {
        assert_eq!(prog("5 AND 3", Base::Decimal), Ok(1.0));
        assert_eq!(prog("5 OR 3", Base::Decimal), Ok(7.0));
        assert_eq!(prog("5 XOR 3", Base::Decimal), Ok(6.0));
        assert_eq!(prog("NOT 0", Base::Decimal), Ok(-1.0));
        // bitwise sits below arithmetic: 5 AND (3+1)
        assert_eq!(prog("5 AND 3+1", Base::Decimal), Ok(4.0));
        assert_eq!(prog("(5 OR 3)×2", Base::Decimal), Ok(14.0));
        assert_eq!(prog("FF XOR F", Base::Hexadecimal), Ok(240.0));
        assert_eq!(prog("1010 AND 110", Base::Binary), Ok(2.0));
    }

    #[test]
    fn test_malformed() {
        assert_eq!(sci("5+", AngleUnit::Degrees), Err(CalcError::UnexpectedEnd));
        assert_eq!(sci("(1+2", AngleUnit::Degrees), Err(CalcError::UnexpectedEnd));
        assert_eq!(
            sci(")5", AngleUnit::Degrees),
            Err(CalcError::UnexpectedToken(")".to_string()))
        );
        assert_eq!(
            sci("1+2)", AngleUnit::Degrees),
            Err(CalcError::UnexpectedToken(")".to_string()))
        );
        assert_eq!(sci("", AngleUnit::Degrees), Err(CalcError::EmptyExpression));
        // function argument must be parenthesized
        assert!(sci("sin 30", AngleUnit::Degrees).is_err());
    }
}
