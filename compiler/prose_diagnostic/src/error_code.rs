use std::fmt;

/// Error codes for all Prose diagnostics.
///
/// Format: E#### where the first digit is the phase:
/// - E0xxx: Lexer errors
/// - E1xxx: Parser and declaration errors
/// - E2xxx: Static type errors (`--check`)
/// - E3xxx: Runtime errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Lexer Errors (E0xxx)
    /// No token rule matches at this character
    E0001,
    /// Unterminated string literal
    E0002,
    /// Integer literal out of range
    E0003,

    // Parser Errors (E1xxx)
    /// Unexpected token
    E1001,
    /// Expected expression
    E1002,
    /// Expected type
    E1003,
    /// Variable already declared in this scope
    E1004,
    /// Function or struct name already declared
    E1005,
    /// Unknown type name
    E1006,
    /// Struct literal argument count differs from field count
    E1007,
    /// Statement not allowed in this position
    E1008,
    /// Duplicate parameter or field name
    E1009,
    /// Invalid assignment target
    E1010,

    // Static Type Errors (E2xxx)
    /// Type mismatch
    E2001,
    /// Operator applied to unsupported operand types
    E2002,
    /// Condition is not boolean
    E2003,
    /// Called value is not a function
    E2004,
    /// Wrong number of arguments
    E2005,
    /// Undefined name
    E2006,
    /// Unknown member
    E2007,
    /// Assignment to a constant
    E2008,
    /// `return` outside of a function
    E2009,
    /// Value is not iterable or indexable
    E2010,

    // Runtime Errors (E3xxx)
    /// Undefined identifier
    E3001,
    /// Called value is not a function
    E3002,
    /// Wrong number of arguments
    E3003,
    /// Index out of range
    E3004,
    /// Division by zero
    E3005,
    /// Module not found
    E3006,
    /// Unknown member
    E3007,
    /// Value does not match the declared type
    E3008,
    /// Operator applied to unsupported operand kinds
    E3009,
    /// Assignment to a constant
    E3010,
    /// Selectively imported name is missing from the module
    E3011,
    /// Circular import
    E3012,
    /// Input could not be parsed as the target type
    E3013,
    /// Call depth limit exceeded
    E3014,
    /// Imported module failed to lex or parse
    E3015,
    /// Reading input or module source failed
    E3016,
    /// Integer arithmetic overflowed
    E3017,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            // Lexer
            ErrorCode::E0001 => "E0001",
            ErrorCode::E0002 => "E0002",
            ErrorCode::E0003 => "E0003",
            // Parser
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E1006 => "E1006",
            ErrorCode::E1007 => "E1007",
            ErrorCode::E1008 => "E1008",
            ErrorCode::E1009 => "E1009",
            ErrorCode::E1010 => "E1010",
            // Type
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E2007 => "E2007",
            ErrorCode::E2008 => "E2008",
            ErrorCode::E2009 => "E2009",
            ErrorCode::E2010 => "E2010",
            // Runtime
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E3003 => "E3003",
            ErrorCode::E3004 => "E3004",
            ErrorCode::E3005 => "E3005",
            ErrorCode::E3006 => "E3006",
            ErrorCode::E3007 => "E3007",
            ErrorCode::E3008 => "E3008",
            ErrorCode::E3009 => "E3009",
            ErrorCode::E3010 => "E3010",
            ErrorCode::E3011 => "E3011",
            ErrorCode::E3012 => "E3012",
            ErrorCode::E3013 => "E3013",
            ErrorCode::E3014 => "E3014",
            ErrorCode::E3015 => "E3015",
            ErrorCode::E3016 => "E3016",
            ErrorCode::E3017 => "E3017",
        }
    }

    /// Lexer and parser errors: the unit never ran.
    pub fn is_static(&self) -> bool {
        !self.is_runtime()
    }

    pub fn is_runtime(&self) -> bool {
        self.as_str().starts_with("E3")
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_variant() {
        assert_eq!(ErrorCode::E1001.to_string(), "E1001");
        assert_eq!(ErrorCode::E3016.as_str(), "E3016");
    }

    #[test]
    fn phase_ranges() {
        assert!(ErrorCode::E0002.is_static());
        assert!(ErrorCode::E2003.is_static());
        assert!(ErrorCode::E3005.is_runtime());
        assert!(!ErrorCode::E1004.is_runtime());
    }
}
