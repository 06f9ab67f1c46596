//! Error codes for all compiler diagnostics.
//!
//! Each error code is a unique identifier (e.g., `E3030`) with the first digit
//! indicating the compiler phase.

use std::fmt;

/// Error codes for all compiler diagnostics.
///
/// Format: E#### where first digit indicates phase:
/// - E0xxx: Lexer errors
/// - E1xxx: Parser errors
/// - E2xxx: Host type-checking errors
/// - E3xxx: Pattern matching errors
/// - E6xxx: Runtime / eval errors
/// - E9xxx: Internal compiler errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Lexer Errors (E0xxx)
    /// Invalid character in source
    E0002,
    /// Invalid number literal
    E0003,
    /// Unterminated character literal
    E0004,

    // Parser Errors (E1xxx)
    /// Unexpected token
    E1001,
    /// Expected expression
    E1002,
    /// Unclosed delimiter
    E1003,
    /// Expected identifier
    E1004,
    /// Expected type
    E1005,
    /// Invalid function definition
    E1006,
    /// Invalid pattern syntax
    E1008,
    /// Invalid guard syntax
    E1009,

    // Host Type Errors (E2xxx)
    /// Type mismatch
    E2001,
    /// Unknown identifier
    E2002,
    /// Unknown type or constraint
    E2003,
    /// Invalid operand type
    E2004,
    /// Wrong number of arguments
    E2005,
    /// Expression is not assignable
    E2006,
    /// `break`/`continue` outside a loop
    E2007,
    /// Unsupported construct
    E2008,

    // Pattern Errors (E3xxx)
    /// Invalid initialization of a pattern declaration
    E3010,
    /// Optional chain deeper than the configured limit
    E3011,
    /// Destructuring protocol is incompletely configured
    E3020,
    /// No alternative of a closed sum satisfies the discriminant
    E3030,
    /// Constraint discriminant cannot be resolved by downcast
    E3031,
    /// Subject cannot be decomposed with the requested arity
    E3040,
    /// Guard is not convertible to bool
    E3050,
    /// Conflicting result types across arms
    E3060,
    /// Invalid jump action
    E3070,
    /// Non-constant test in a `match constexpr`
    E3080,
    /// Dependent construct reached lowering
    E3090,

    // Runtime Errors (E6xxx)
    /// Read through a reference whose storage was destroyed
    E6001,
    /// Use of a binding that was never initialized
    E6002,
    /// Null pointer dereference
    E6003,
    /// Division by zero
    E6004,
    /// Index out of bounds
    E6005,
    /// Evaluation of a construct whose checking was deferred
    E6006,
    /// Access to an alternative or payload that is not active
    E6007,
    /// No arm of a match-select matched
    E6020,
    /// Call of an unknown function
    E6030,

    // Internal Errors (E9xxx)
    /// Internal compiler error
    E9001,
}

impl ErrorCode {
    /// All error code variants, for exhaustive testing.
    ///
    /// Kept in sync with `as_str()`; the `test_all_codes_unique` test catches
    /// an omission.
    pub const ALL: &[ErrorCode] = &[
        // Lexer
        ErrorCode::E0002,
        ErrorCode::E0003,
        ErrorCode::E0004,
        // Parser
        ErrorCode::E1001,
        ErrorCode::E1002,
        ErrorCode::E1003,
        ErrorCode::E1004,
        ErrorCode::E1005,
        ErrorCode::E1006,
        ErrorCode::E1008,
        ErrorCode::E1009,
        // Host types
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E2003,
        ErrorCode::E2004,
        ErrorCode::E2005,
        ErrorCode::E2006,
        ErrorCode::E2007,
        ErrorCode::E2008,
        // Patterns
        ErrorCode::E3010,
        ErrorCode::E3011,
        ErrorCode::E3020,
        ErrorCode::E3030,
        ErrorCode::E3031,
        ErrorCode::E3040,
        ErrorCode::E3050,
        ErrorCode::E3060,
        ErrorCode::E3070,
        ErrorCode::E3080,
        ErrorCode::E3090,
        // Runtime
        ErrorCode::E6001,
        ErrorCode::E6002,
        ErrorCode::E6003,
        ErrorCode::E6004,
        ErrorCode::E6005,
        ErrorCode::E6006,
        ErrorCode::E6007,
        ErrorCode::E6020,
        ErrorCode::E6030,
        // Internal
        ErrorCode::E9001,
    ];

    /// Get the string representation (e.g. `"E3030"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E0002 => "E0002",
            ErrorCode::E0003 => "E0003",
            ErrorCode::E0004 => "E0004",
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E1006 => "E1006",
            ErrorCode::E1008 => "E1008",
            ErrorCode::E1009 => "E1009",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E2007 => "E2007",
            ErrorCode::E2008 => "E2008",
            ErrorCode::E3010 => "E3010",
            ErrorCode::E3011 => "E3011",
            ErrorCode::E3020 => "E3020",
            ErrorCode::E3030 => "E3030",
            ErrorCode::E3031 => "E3031",
            ErrorCode::E3040 => "E3040",
            ErrorCode::E3050 => "E3050",
            ErrorCode::E3060 => "E3060",
            ErrorCode::E3070 => "E3070",
            ErrorCode::E3080 => "E3080",
            ErrorCode::E3090 => "E3090",
            ErrorCode::E6001 => "E6001",
            ErrorCode::E6002 => "E6002",
            ErrorCode::E6003 => "E6003",
            ErrorCode::E6004 => "E6004",
            ErrorCode::E6005 => "E6005",
            ErrorCode::E6006 => "E6006",
            ErrorCode::E6007 => "E6007",
            ErrorCode::E6020 => "E6020",
            ErrorCode::E6030 => "E6030",
            ErrorCode::E9001 => "E9001",
        }
    }

    /// Check if this is a parser (or lexer) error.
    pub fn is_parser_error(&self) -> bool {
        matches!(self.as_str().as_bytes()[1], b'0' | b'1')
    }

    /// Check if this is a pattern-matching error (E3xxx).
    pub fn is_pattern_error(&self) -> bool {
        self.as_str().starts_with("E3")
    }

    /// Check if this is a runtime error (E6xxx).
    pub fn is_eval_error(&self) -> bool {
        self.as_str().starts_with("E6")
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse an error code string like `"E3030"`. Case-insensitive.
impl std::str::FromStr for ErrorCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ErrorCode::ALL
            .iter()
            .find(|code| code.as_str().eq_ignore_ascii_case(s))
            .copied()
            .ok_or(())
    }
}
