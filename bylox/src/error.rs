use std::fmt;

use crate::Position;

/// Top-level interpreter errors
#[derive(Debug)]
pub enum Error {
    /// A compilation error happened
    Compile,
    /// A runtime error happened
    Runtime,
}

impl std::error::Error for Error {}
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compile => write!(f, "Compilation error(s) occurred."),
            Self::Runtime => write!(f, "Runtime error(s) occurred."),
        }
    }
}

/// Error while scanning source code. These play the role of error tokens; a
/// diagnostic is reported for each and carries no lexeme segment.
#[derive(Debug, Clone)]
pub enum ScanError {
    /// A string literal is unterminated
    UnterminatedString(Position),
    /// Invalid character
    UnexpectedCharacter(Position, char),
}

impl std::error::Error for ScanError {}
impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnterminatedString(pos) => write!(f, "{} Error: Unterminated string.", pos),
            Self::UnexpectedCharacter(pos, c) => {
                write!(f, "{} Error: Unexpected character '{}'.", pos, c)
            }
        }
    }
}

/// Error while parsing source code into bytecode. Diagnostics point at the
/// token that triggered them; a `None` lexeme means the end of the input.
#[derive(Debug)]
pub enum ParseError {
    /// A wrong or missing token
    UnexpectedToken(Position, Option<String>, String),
    /// A scope violation or a capacity limit, detected during code generation
    Invalid(Position, String, String),
    /// The input ended in the middle of an expression
    UnexpectedEof(Position),
}

impl std::error::Error for ParseError {}
impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedToken(pos, Some(lexeme), msg) => {
                write!(f, "{} Error at '{}': {}", pos, lexeme, msg)
            }
            Self::UnexpectedToken(pos, None, msg) => {
                write!(f, "{} Error at end: {}", pos, msg)
            }
            Self::Invalid(pos, lexeme, msg) => {
                write!(f, "{} Error at '{}': {}", pos, lexeme, msg)
            }
            Self::UnexpectedEof(pos) => {
                write!(f, "{} Error at end: Expect expression.", pos)
            }
        }
    }
}

/// Virtual machine errors
#[derive(Debug)]
pub enum RuntimeError {
    /// Push on a full stack
    StackOverflow,
    /// Pop or peek on an empty stack
    StackUnderflow,
    /// Accessing an undefined variable
    UndefinedVariable(Position, String),
    /// A single number operand was expected
    ExpectedNumber(Position),
    /// Two number operands were expected
    ExpectedTwoNumbers(Position),
    /// Operands given to the add opcode are invalid
    InvalidAddOperands(Position),
    /// A byte that does not encode any opcode
    InvalidOpcode(Position, u8),
    /// An opcode the interpreter cannot execute
    UnsupportedOpcode(Position, &'static str),
}

impl std::error::Error for RuntimeError {}
impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StackOverflow => write!(f, "Stack overflow."),
            Self::StackUnderflow => write!(f, "Stack underflow."),
            Self::UndefinedVariable(pos, name) => {
                write!(f, "{} Undefined variable '{}'.", pos, name)
            }
            Self::ExpectedNumber(pos) => write!(f, "{} Operand must be a number.", pos),
            Self::ExpectedTwoNumbers(pos) => write!(f, "{} Operands must be numbers.", pos),
            Self::InvalidAddOperands(pos) => {
                write!(f, "{} Operands must be two numbers or two strings.", pos)
            }
            Self::InvalidOpcode(pos, byte) => {
                write!(f, "{} Unknown opcode {:#04x}.", pos, byte)
            }
            Self::UnsupportedOpcode(pos, name) => {
                write!(f, "{} Opcode {} is not supported.", pos, name)
            }
        }
    }
}
