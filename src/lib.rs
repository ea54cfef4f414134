//! # Calculator evaluation core
//!
//! The engine behind a scientific/programmer calculator UI: it turns a
//! user-typed expression string into a formatted display string. The UI
//! drives a [`session::Session`] with button tokens and reads back the
//! display and live-preview lines; everything numeric happens here.
//!
//! Two modes are supported:
//! * Scientific - real arithmetic in IEEE-754 double precision with
//!   trigonometric functions (degrees or radians), logarithms, square
//!   root, and factorial
//! * Programmer - integer arithmetic entered and displayed in binary,
//!   octal, decimal, or hexadecimal, with bitwise `AND`, `OR`, `XOR`,
//!   and `NOT`
//!
//! Operators (starting from highest priority):
//! * `-` - unary minus (`NOT` - bitwise complement - binds the same way)
//! * `^` - power, right-associative: `2^3^2` is `512`
//! * `×`, `÷` - multiplication and division (`*` and `/` work too)
//! * `+`, `-` - addition and subtraction
//! * `AND`, `OR`, `XOR` - bitwise operators, below arithmetic
//!
//! The list of supported functions: sin, cos, tan, ln, log (base 10),
//! sqrt (also spelled `√`), fact. A function argument must be
//! parenthesized: `sin(30)`.
//!
//! Predefined constants:
//! * `π` - 3.14159...
//! * `e` - 2.71828...
//!
//! Results are rounded to 12 significant digits for display, so
//! `0.1+0.2` shows `0.3` rather than `0.30000000000000004`. Division by
//! zero is not an error: it displays as `Infinity` (or `NaN` for `0÷0`).

#[macro_use]
extern crate pest_derive;

pub mod base;
pub mod errors;
pub mod eval;
pub mod format;
pub mod parse;
pub mod session;
