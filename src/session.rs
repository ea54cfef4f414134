use lazy_static::lazy_static;

use crate::base::Base;
use crate::errors::CalcResult;
use crate::eval::{self, AngleUnit};
use crate::format;
use crate::parse::{Func, Mode};

/// What the display shows when an expression fails
pub const ERROR_DISPLAY: &str = "Error";

/// Session display state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    /// Nothing typed yet
    Empty,
    /// An expression is being composed
    Composing,
    /// The buffer holds the formatted result of the last evaluation
    Result,
    /// The buffer holds the error indicator
    Error,
}

/// Memory register operation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemoryOp {
    Clear,
    Recall,
    Add,
    Subtract,
}

lazy_static! {
    static ref FUNC_WORDS: Vec<&'static str> =
        vec!["sin", "cos", "tan", "ln", "log", "sqrt", "fact"];
    static ref BIT_WORDS: Vec<&'static str> = vec!["AND", "OR", "XOR", "NOT"];
}

fn is_binary_operator(tok: &str) -> bool {
    match tok.trim() {
        "+" | "-" | "×" | "÷" | "*" | "/" | "^" | "AND" | "OR" | "XOR" => true,
        _ => false,
    }
}

/// One interactive calculator session: the input buffer, the current
/// modes, the memory register, and the live preview. Owned by a single
/// interactive loop, never persisted, recreated at session start.
pub struct Session {
    buffer: String,
    preview: String,
    state: State,
    memory: f64,
    mode: Mode,
    angle: AngleUnit,
    base: Base,
}

impl Default for Session {
    fn default() -> Session {
        Session {
            buffer: String::new(),
            preview: String::new(),
            state: State::Empty,
            memory: 0.0,
            mode: Mode::Scientific,
            angle: AngleUnit::Degrees,
            base: Base::Decimal,
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Default::default()
    }

    /// Current display line: the buffer being composed, the last result,
    /// or the error indicator. Empty when nothing has been typed.
    pub fn display_text(&self) -> &str {
        &self.buffer
    }

    /// Live preview line; empty when there is nothing to preview
    pub fn preview_text(&self) -> &str {
        &self.preview
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn base(&self) -> Base {
        self.base
    }

    pub fn angle_unit(&self) -> AngleUnit {
        self.angle
    }

    pub fn memory_value(&self) -> f64 {
        self.memory
    }

    // Single-character legality for the current mode and base. The `e`
    // glyph doubles as the Euler constant in Scientific mode and as a
    // hex digit (uppercase) in Programmer mode.
    fn char_allowed(&self, c: char) -> bool {
        if c == ' ' {
            return true;
        }
        match self.mode {
            Mode::Scientific => {
                c.is_ascii_digit()
                    || match c {
                        '.' | '+' | '-' | '×' | '÷' | '*' | '/' | '^' | '(' | ')' | 'π' | 'e'
                        | '√' => true,
                        _ => false,
                    }
            }
            Mode::Programmer => {
                self.base.digit_legal(c)
                    || match c {
                        '+' | '-' | '×' | '÷' | '*' | '/' | '^' | '(' | ')' => true,
                        _ => false,
                    }
            }
        }
    }

    // Buffer invariant: only tokens legal for the current mode/base ever
    // reach the buffer; everything else is dropped before it gets there.
    fn append_allowed(&self, tok: &str) -> bool {
        let t = tok.trim();
        if t.is_empty() {
            return false;
        }
        // multi-letter words are function names or bitwise keywords,
        // possibly with the opening bracket a function button attaches
        let word = t.strip_suffix('(').unwrap_or(t);
        if word.chars().count() > 1 && word.chars().all(|c| c.is_ascii_alphabetic()) {
            return match self.mode {
                Mode::Scientific => FUNC_WORDS.iter().any(|w| *w == word),
                Mode::Programmer => BIT_WORDS.iter().any(|w| *w == word),
            };
        }
        t.chars().all(|c| self.char_allowed(c))
    }

    /// Appends a button token to the buffer. After a result, a binary
    /// operator continues the chain while anything else starts a fresh
    /// expression. Tokens illegal for the current mode/base are rejected
    /// silently with no state change.
    pub fn append(&mut self, tok: &str) {
        if !self.append_allowed(tok) {
            return;
        }
        match self.state {
            State::Result if is_binary_operator(tok) => self.buffer.push_str(tok),
            State::Result | State::Error => {
                self.buffer.clear();
                self.buffer.push_str(tok);
            }
            State::Empty | State::Composing => self.buffer.push_str(tok),
        }
        self.state = State::Composing;
        self.refresh_preview();
    }

    /// Resets the buffer and preview
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.preview.clear();
        self.state = State::Empty;
    }

    /// Removes the last character. On an error display this acts as a
    /// full clear; an emptied buffer returns to the Empty state.
    pub fn delete_last(&mut self) {
        if self.state == State::Error {
            self.clear();
            return;
        }
        self.buffer.pop();
        self.state = if self.buffer.is_empty() {
            State::Empty
        } else {
            State::Composing
        };
        self.refresh_preview();
    }

    /// Evaluates the whole buffer. Success replaces the buffer with the
    /// formatted result; any failure shows the error indicator. A
    /// non-finite numeric result (5÷0) is a success and displays as
    /// Infinity or NaN.
    pub fn evaluate(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        match eval::evaluate(&self.buffer, self.mode, self.base, self.angle) {
            Ok(v) => self.show_result(v),
            Err(..) => self.show_error(),
        }
    }

    /// The `x!` button: factorial of the evaluated buffer value
    pub fn factorial(&mut self) {
        match self.eval_or_zero().and_then(eval::factorial) {
            Ok(v) => self.show_result(v),
            Err(..) => self.show_error(),
        }
    }

    /// The `1/x` button: evaluates immediately, no preview interplay
    pub fn reciprocal(&mut self) {
        match self.eval_or_zero() {
            Ok(v) => self.show_result(1.0 / v),
            Err(..) => self.show_error(),
        }
    }

    /// A scientific function button: evaluates the current expression
    /// first and applies the function to that value (an empty buffer
    /// counts as zero), honoring the angle unit for trigonometry.
    pub fn apply_function(&mut self, func: Func) {
        if self.mode != Mode::Scientific {
            return;
        }
        let applied = self
            .eval_or_zero()
            .and_then(|v| eval::apply_function(func, v, self.angle));
        match applied {
            Ok(v) => self.show_result(v),
            Err(..) => self.show_error(),
        }
    }

    /// Memory register operations
    pub fn memory(&mut self, op: MemoryOp) {
        match op {
            MemoryOp::Clear => self.memory = 0.0,
            MemoryOp::Recall => {
                // a non-finite register has no legal spelling in the
                // buffer; the recall is dropped like any rejected key
                if !self.memory.is_finite() {
                    return;
                }
                let text = format::format_value(self.memory, self.mode, self.base);
                match self.state {
                    State::Result | State::Error => self.buffer = text,
                    State::Empty | State::Composing => self.buffer.push_str(&text),
                }
                self.state = State::Composing;
                self.refresh_preview();
            }
            MemoryOp::Add | MemoryOp::Subtract => match self.eval_or_zero() {
                Ok(v) => {
                    if op == MemoryOp::Add {
                        self.memory += v;
                    } else {
                        self.memory -= v;
                    }
                    self.show_result(v);
                }
                Err(..) => self.show_error(),
            },
        }
    }

    /// Switching the mode clears the buffer: an expression composed for
    /// one mode is not guaranteed legal in the other
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
        self.clear();
    }

    /// Switching the base clears the buffer for the same reason
    pub fn set_base(&mut self, base: Base) {
        self.base = base;
        self.clear();
    }

    /// The angle unit does not affect buffer legality, so the expression
    /// survives; only the preview is recomputed
    pub fn set_angle_unit(&mut self, angle: AngleUnit) {
        self.angle = angle;
        self.refresh_preview();
    }

    fn eval_or_zero(&self) -> CalcResult {
        if self.buffer.is_empty() {
            return Ok(0.0);
        }
        eval::evaluate(&self.buffer, self.mode, self.base, self.angle)
    }

    fn show_result(&mut self, v: f64) {
        self.buffer = format::format_value(v, self.mode, self.base);
        self.state = State::Result;
        self.preview.clear();
    }

    fn show_error(&mut self) {
        self.buffer = ERROR_DISPLAY.to_string();
        self.state = State::Error;
        self.preview.clear();
    }

    // Recomputed synchronously after every buffer mutation. Failures of
    // any kind, including half-typed expressions, swallow to no preview.
    fn refresh_preview(&mut self) {
        self.preview.clear();
        if self.mode != Mode::Scientific || self.state != State::Composing {
            return;
        }
        if let Ok(v) = eval::evaluate(&self.buffer, self.mode, self.base, self.angle) {
            self.preview = format::format_preview(v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pressed(s: &mut Session, keys: &[&str]) {
        for k in keys {
            s.append(k);
        }
    }

    #[test]
    fn test_compose_and_evaluate() {
        let mut s = Session::new();
        pressed(&mut s, &["5", "+", "3"]);
        assert_eq!(s.display_text(), "5+3");
        assert_eq!(s.state(), State::Composing);
        s.evaluate();
        assert_eq!(s.display_text(), "8");
        assert_eq!(s.state(), State::Result);
        assert_eq!(s.preview_text(), "");
    }

    #[test]
    fn test_result_chaining() {
        let mut s = Session::new();
        pressed(&mut s, &["5", "+", "3"]);
        s.evaluate();
        // operator continues from the previous result
        pressed(&mut s, &["×", "2"]);
        assert_eq!(s.display_text(), "8×2");
        s.evaluate();
        assert_eq!(s.display_text(), "16");
        // non-operator starts a fresh expression
        s.append("7");
        assert_eq!(s.display_text(), "7");
        assert_eq!(s.state(), State::Composing);
    }

    #[test]
    fn test_incomplete_expression_errors() {
        let mut s = Session::new();
        pressed(&mut s, &["5", "+"]);
        s.evaluate();
        assert_eq!(s.display_text(), ERROR_DISPLAY);
        assert_eq!(s.state(), State::Error);
        s.delete_last();
        assert_eq!(s.display_text(), "");
        assert_eq!(s.state(), State::Empty);
    }

    #[test]
    fn test_division_by_zero_is_displayable() {
        let mut s = Session::new();
        pressed(&mut s, &["5", "÷", "0"]);
        s.evaluate();
        assert_eq!(s.display_text(), "Infinity");
        assert_eq!(s.state(), State::Result);
    }

    #[test]
    fn test_illegal_tokens_rejected_silently() {
        let mut s = Session::new();
        s.append("AND");
        assert_eq!(s.display_text(), "");
        assert_eq!(s.state(), State::Empty);
        s.set_mode(Mode::Programmer);
        s.set_base(Base::Binary);
        s.append("2");
        s.append("sin(");
        assert_eq!(s.display_text(), "");
        s.append("1");
        s.append("0");
        assert_eq!(s.display_text(), "10");
    }

    #[test]
    fn test_mode_and_base_switch_clears() {
        let mut s = Session::new();
        s.set_mode(Mode::Programmer);
        s.set_base(Base::Binary);
        pressed(&mut s, &["1", "0", "1", "0"]);
        assert_eq!(s.display_text(), "1010");
        s.set_base(Base::Hexadecimal);
        assert_eq!(s.display_text(), "");
        assert_eq!(s.state(), State::Empty);
    }

    #[test]
    fn test_programmer_evaluation() {
        let mut s = Session::new();
        s.set_mode(Mode::Programmer);
        s.set_base(Base::Hexadecimal);
        pressed(&mut s, &["F", "F", " AND ", "F"]);
        s.evaluate();
        assert_eq!(s.display_text(), "F");
        s.set_base(Base::Decimal);
        pressed(&mut s, &["5", " XOR ", "3"]);
        s.evaluate();
        assert_eq!(s.display_text(), "6");
    }

    #[test]
    fn test_live_preview() {
        let mut s = Session::new();
        pressed(&mut s, &["1", "+", "2"]);
        assert_eq!(s.preview_text(), "3");
        s.append("+");
        // incomplete expression: preview disappears, never errors
        assert_eq!(s.preview_text(), "");
        assert_eq!(s.state(), State::Composing);
        // programmer mode has no preview
        s.set_mode(Mode::Programmer);
        pressed(&mut s, &["1", "+", "2"]);
        assert_eq!(s.preview_text(), "");
    }

    #[test]
    fn test_preview_precision() {
        let mut s = Session::new();
        pressed(&mut s, &["1", "÷", "3"]);
        assert_eq!(s.preview_text(), "0.33333333");
    }

    #[test]
    fn test_memory_register() {
        let mut s = Session::new();
        pressed(&mut s, &["5", "+", "3"]);
        s.memory(MemoryOp::Add);
        assert_eq!(s.memory_value(), 8.0);
        assert_eq!(s.display_text(), "8");
        assert_eq!(s.state(), State::Result);
        s.clear();
        s.append("2");
        s.memory(MemoryOp::Subtract);
        assert_eq!(s.memory_value(), 6.0);
        s.clear();
        s.memory(MemoryOp::Recall);
        assert_eq!(s.display_text(), "6");
        assert_eq!(s.state(), State::Composing);
        s.memory(MemoryOp::Clear);
        assert_eq!(s.memory_value(), 0.0);
    }

    #[test]
    fn test_memory_recall_skips_nonfinite() {
        let mut s = Session::new();
        pressed(&mut s, &["5", "÷", "0"]);
        s.memory(MemoryOp::Add);
        assert_eq!(s.memory_value(), f64::INFINITY);
        s.clear();
        s.memory(MemoryOp::Recall);
        // an infinite register cannot be recalled into the buffer
        assert_eq!(s.display_text(), "");
        assert_eq!(s.state(), State::Empty);
        s.append("5");
        s.memory(MemoryOp::Recall);
        assert_eq!(s.display_text(), "5");
        assert_eq!(s.state(), State::Composing);
    }

    #[test]
    fn test_small_result_chaining() {
        let mut s = Session::new();
        pressed(&mut s, &["1", "÷", "1", "0", "0", "0", "0", "0", "0", "0"]);
        s.evaluate();
        assert_eq!(s.display_text(), "1e-7");
        // a result shown in exponent notation still chains
        pressed(&mut s, &["×", "2"]);
        assert_eq!(s.display_text(), "1e-7×2");
        s.evaluate();
        assert_eq!(s.display_text(), "2e-7");
        assert_eq!(s.state(), State::Result);
    }

    #[test]
    fn test_memory_recall_overwrites_result() {
        let mut s = Session::new();
        s.append("4");
        s.memory(MemoryOp::Add);
        // state is Result: recall overwrites instead of appending
        s.memory(MemoryOp::Recall);
        assert_eq!(s.display_text(), "4");
        // while composing it appends
        s.append("+");
        s.memory(MemoryOp::Recall);
        assert_eq!(s.display_text(), "4+4");
    }

    #[test]
    fn test_factorial_button() {
        let mut s = Session::new();
        s.append("5");
        s.factorial();
        assert_eq!(s.display_text(), "120");
        assert_eq!(s.state(), State::Result);
        s.clear();
        s.factorial();
        // empty buffer counts as zero and 0! is 1
        assert_eq!(s.display_text(), "1");
        s.clear();
        pressed(&mut s, &["0", "-", "1"]);
        s.factorial();
        assert_eq!(s.display_text(), ERROR_DISPLAY);
        assert_eq!(s.state(), State::Error);
    }

    #[test]
    fn test_reciprocal_button() {
        let mut s = Session::new();
        s.append("4");
        s.reciprocal();
        assert_eq!(s.display_text(), "0.25");
        s.clear();
        s.append("0");
        s.reciprocal();
        assert_eq!(s.display_text(), "Infinity");
        assert_eq!(s.state(), State::Result);
    }

    #[test]
    fn test_function_buttons() {
        let mut s = Session::new();
        pressed(&mut s, &["3", "0"]);
        s.apply_function(Func::Sin);
        assert_eq!(s.display_text(), "0.5");
        assert_eq!(s.state(), State::Result);
        // empty buffer operates on zero
        s.clear();
        s.apply_function(Func::Cos);
        assert_eq!(s.display_text(), "1");
        // in-expression call syntax works too
        s.clear();
        pressed(&mut s, &["sin(", "3", "0", ")", "+", "1"]);
        s.evaluate();
        assert_eq!(s.display_text(), "1.5");
    }

    #[test]
    fn test_angle_unit() {
        let mut s = Session::new();
        s.set_angle_unit(AngleUnit::Radians);
        pressed(&mut s, &["sin(", "π", "÷", "2", ")"]);
        s.evaluate();
        assert_eq!(s.display_text(), "1");
        // angle switch keeps the buffer
        s.append("+");
        s.set_angle_unit(AngleUnit::Degrees);
        assert_eq!(s.display_text(), "1+");
    }

    #[test]
    fn test_delete_multibyte() {
        let mut s = Session::new();
        s.append("π");
        assert_eq!(s.display_text(), "π");
        s.delete_last();
        assert_eq!(s.display_text(), "");
        assert_eq!(s.state(), State::Empty);
    }
}
