//! Error codes for all Dialect diagnostics.
//!
//! Each error code is a unique identifier (e.g., `E4005`) with the first digit
//! indicating the phase that reports it.

use std::fmt;

/// Error codes for all Dialect diagnostics.
///
/// Format: E#### where first digit indicates phase:
/// - E1xxx: Literal parsing errors
/// - E2xxx: Type errors
/// - E3xxx: Evaluation errors
/// - E4xxx: Schema violations found while transforming a document
/// - E5xxx: Schema build errors (E51xx: schema warnings)
/// - E9xxx: Internal errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Literal Errors (E1xxx)
    /// Malformed literal
    E1001,
    /// Integer literal out of range
    E1002,
    /// Invalid escape sequence in text literal
    E1003,
    /// Invalid date or time literal
    E1004,
    /// Invalid cardinality literal
    E1005,

    // Type Errors (E2xxx)
    /// No common type for two kinds
    E2001,
    /// Value cannot be coerced to the target kind
    E2002,
    /// Value has no representation in the target kind
    E2003,
    /// Symbol changed kind after its kind was fixed
    E2004,
    /// Operator not defined for the operand kinds
    E2005,

    // Evaluation Errors (E3xxx)
    /// Operand value invalid for the operator
    E3001,
    /// Division by zero
    E3002,
    /// Arithmetic overflow
    E3003,
    /// No function matches the call
    E3004,
    /// Unresolved symbol
    E3005,
    /// Function invocation failed
    E3006,
    /// Tree node is not an expression
    E3007,

    // Schema Violations (E4xxx)
    /// Unknown root object
    E4001,
    /// Unknown member
    E4002,
    /// Value without a governing member
    E4003,
    /// Value of the wrong kind
    E4004,
    /// Occurrence count outside the declared cardinality
    E4005,
    /// Duplicate map key
    E4006,
    /// Map entry without a key
    E4007,
    /// Duplicate set value
    E4008,
    /// Second value for a singleton member
    E4009,
    /// Member not declared by the object
    E4010,
    /// Property constraint violated
    E4011,
    /// Object factory failed
    E4012,

    // Schema Build Errors (E5xxx)
    /// Duplicate rule key
    E5001,
    /// Member refers to an unknown rule
    E5002,
    /// Member declared with zero cardinality
    E5003,
    /// Collection kind contradicts cardinality
    E5004,
    /// Member declared twice
    E5005,
    /// Map over an object without a key member
    E5006,
    /// Key member is not a required singleton property
    E5007,
    /// Object rule without a factory
    E5008,
    /// Two roots share a name
    E5009,
    /// Schema declares no root
    E5010,
    /// Property constraint cannot be built
    E5011,

    // Schema Warnings (E51xx)
    /// Rule is never referenced
    E5101,

    // Internal Errors (E9xxx)
    /// Internal error
    E9001,
    /// Too many errors
    E9002,
}

impl ErrorCode {
    /// All error codes, in declaration order.
    pub const ALL: &[ErrorCode] = &[
        ErrorCode::E1001,
        ErrorCode::E1002,
        ErrorCode::E1003,
        ErrorCode::E1004,
        ErrorCode::E1005,
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E2003,
        ErrorCode::E2004,
        ErrorCode::E2005,
        ErrorCode::E3001,
        ErrorCode::E3002,
        ErrorCode::E3003,
        ErrorCode::E3004,
        ErrorCode::E3005,
        ErrorCode::E3006,
        ErrorCode::E3007,
        ErrorCode::E4001,
        ErrorCode::E4002,
        ErrorCode::E4003,
        ErrorCode::E4004,
        ErrorCode::E4005,
        ErrorCode::E4006,
        ErrorCode::E4007,
        ErrorCode::E4008,
        ErrorCode::E4009,
        ErrorCode::E4010,
        ErrorCode::E4011,
        ErrorCode::E4012,
        ErrorCode::E5001,
        ErrorCode::E5002,
        ErrorCode::E5003,
        ErrorCode::E5004,
        ErrorCode::E5005,
        ErrorCode::E5006,
        ErrorCode::E5007,
        ErrorCode::E5008,
        ErrorCode::E5009,
        ErrorCode::E5010,
        ErrorCode::E5011,
        ErrorCode::E5101,
        ErrorCode::E9001,
        ErrorCode::E9002,
    ];

    /// Get the string representation of this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E3003 => "E3003",
            ErrorCode::E3004 => "E3004",
            ErrorCode::E3005 => "E3005",
            ErrorCode::E3006 => "E3006",
            ErrorCode::E3007 => "E3007",
            ErrorCode::E4001 => "E4001",
            ErrorCode::E4002 => "E4002",
            ErrorCode::E4003 => "E4003",
            ErrorCode::E4004 => "E4004",
            ErrorCode::E4005 => "E4005",
            ErrorCode::E4006 => "E4006",
            ErrorCode::E4007 => "E4007",
            ErrorCode::E4008 => "E4008",
            ErrorCode::E4009 => "E4009",
            ErrorCode::E4010 => "E4010",
            ErrorCode::E4011 => "E4011",
            ErrorCode::E4012 => "E4012",
            ErrorCode::E5001 => "E5001",
            ErrorCode::E5002 => "E5002",
            ErrorCode::E5003 => "E5003",
            ErrorCode::E5004 => "E5004",
            ErrorCode::E5005 => "E5005",
            ErrorCode::E5006 => "E5006",
            ErrorCode::E5007 => "E5007",
            ErrorCode::E5008 => "E5008",
            ErrorCode::E5009 => "E5009",
            ErrorCode::E5010 => "E5010",
            ErrorCode::E5011 => "E5011",
            ErrorCode::E5101 => "E5101",
            ErrorCode::E9001 => "E9001",
            ErrorCode::E9002 => "E9002",
        }
    }

    /// One-line description of the problem class.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "malformed literal",
            ErrorCode::E1002 => "integer literal out of range",
            ErrorCode::E1003 => "invalid escape sequence in text literal",
            ErrorCode::E1004 => "invalid date or time literal",
            ErrorCode::E1005 => "invalid cardinality literal",
            ErrorCode::E2001 => "no common type for two kinds",
            ErrorCode::E2002 => "value cannot be coerced to the target kind",
            ErrorCode::E2003 => "value has no representation in the target kind",
            ErrorCode::E2004 => "symbol changed kind after its kind was fixed",
            ErrorCode::E2005 => "operator not defined for the operand kinds",
            ErrorCode::E3001 => "operand value invalid for the operator",
            ErrorCode::E3002 => "division by zero",
            ErrorCode::E3003 => "arithmetic overflow",
            ErrorCode::E3004 => "no function matches the call",
            ErrorCode::E3005 => "unresolved symbol",
            ErrorCode::E3006 => "function invocation failed",
            ErrorCode::E3007 => "tree node is not an expression",
            ErrorCode::E4001 => "unknown root object",
            ErrorCode::E4002 => "unknown member",
            ErrorCode::E4003 => "value without a governing member",
            ErrorCode::E4004 => "value of the wrong kind",
            ErrorCode::E4005 => "occurrence count outside the declared cardinality",
            ErrorCode::E4006 => "duplicate map key",
            ErrorCode::E4007 => "map entry without a key",
            ErrorCode::E4008 => "duplicate set value",
            ErrorCode::E4009 => "second value for a singleton member",
            ErrorCode::E4010 => "member not declared by the object",
            ErrorCode::E4011 => "property constraint violated",
            ErrorCode::E4012 => "object factory failed",
            ErrorCode::E5001 => "duplicate rule key",
            ErrorCode::E5002 => "member refers to an unknown rule",
            ErrorCode::E5003 => "member declared with zero cardinality",
            ErrorCode::E5004 => "collection kind contradicts cardinality",
            ErrorCode::E5005 => "member declared twice",
            ErrorCode::E5006 => "map over an object without a key member",
            ErrorCode::E5007 => "key member is not a required singleton property",
            ErrorCode::E5008 => "object rule without a factory",
            ErrorCode::E5009 => "two roots share a name",
            ErrorCode::E5010 => "schema declares no root",
            ErrorCode::E5011 => "invalid property constraint",
            ErrorCode::E5101 => "rule is never referenced",
            ErrorCode::E9001 => "internal error",
            ErrorCode::E9002 => "too many errors",
        }
    }

    /// Check if this is a literal parsing error (E1xxx range).
    pub fn is_literal_error(&self) -> bool {
        self.as_str().starts_with("E1")
    }

    /// Check if this is a type error (E2xxx range).
    pub fn is_type_error(&self) -> bool {
        self.as_str().starts_with("E2")
    }

    /// Check if this is an evaluation error (E3xxx range).
    pub fn is_eval_error(&self) -> bool {
        self.as_str().starts_with("E3")
    }

    /// Check if this is a schema violation (E4xxx range).
    pub fn is_violation(&self) -> bool {
        self.as_str().starts_with("E4")
    }

    /// Check if this is a schema build error (E50xx range).
    pub fn is_schema_error(&self) -> bool {
        self.as_str().starts_with("E50")
    }

    /// Check if this code is reported as a warning (E51xx range).
    pub fn is_warning(&self) -> bool {
        self.as_str().starts_with("E51")
    }

    /// Check if this is an internal error (E9xxx range).
    pub fn is_internal_error(&self) -> bool {
        self.as_str().starts_with("E9")
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse an error code string like `"E4005"`.
///
/// Case-insensitive. Derived from [`ErrorCode::ALL`] and [`ErrorCode::as_str()`].
impl std::str::FromStr for ErrorCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        Self::ALL
            .iter()
            .find(|code| code.as_str() == upper)
            .copied()
            .ok_or(())
    }
}
