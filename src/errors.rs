use std::fmt;

/// Reasons an expression can fail to evaluate. All of them are terminal
/// for the current expression only: the session survives and the user can
/// always recover with clear or delete.
#[derive(Clone, PartialEq)]
pub enum CalcError {
    /// The expression did not lex or parse
    ParseFailed(String),
    /// A digit is not part of the active base's alphabet
    InvalidDigit(char, u32),
    /// Factorial of a negative number
    NegativeFactorial,
    /// A float could not be converted to an integer (NaN, infinite)
    FloatToInt(f64),
    /// An integer too large to represent as a float
    IntToFloat(String),
    /// Nothing to calculate
    EmptyExpression,
    /// A token in a position where it cannot appear
    UnexpectedToken(String),
    /// Expression ended while an operand or bracket was still expected
    UnexpectedEnd,
}

/// Expression evaluation outcome: either a numeric value or the error
/// that stopped it
pub type CalcResult = Result<f64, CalcError>;

impl fmt::Display for CalcError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self {
            CalcError::ParseFailed(s) => write!(f, "Failed to parse expression: {}", s),
            CalcError::InvalidDigit(c, base) => write!(f, "Digit '{}' is not valid in base {}", c, base),
            CalcError::NegativeFactorial => write!(f, "Factorial is not defined for negative numbers"),
            CalcError::FloatToInt(v) => write!(f, "Failed to convert float {} to integer", v),
            CalcError::IntToFloat(s) => write!(f, "Failed to convert integer {} to float", s),
            CalcError::EmptyExpression => write!(f, "Nothing to calculate"),
            CalcError::UnexpectedToken(s) => write!(f, "Unexpected '{}'", s),
            CalcError::UnexpectedEnd => write!(f, "Expression is incomplete"),
        }
    }
}

impl fmt::Debug for CalcError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
