//! Diagnostic codes.

use std::fmt;

/// Stable code attached to every reported error.
///
/// The first digit names the phase:
/// - E0xxx: lexer
/// - E1xxx: parser
/// - E2xxx: checker and declaration table
/// - E9xxx: internal errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    /// Unterminated interpreted string or rune literal
    E0001,
    /// Invalid character in source
    E0002,
    /// Malformed number literal
    E0003,
    /// Invalid escape sequence
    E0004,

    /// Unexpected token
    E1001,
    /// Expected expression
    E1002,
    /// Expected type
    E1003,
    /// Expected identifier
    E1004,
    /// Malformed receiver
    E1005,
    /// Malformed statement form
    E1006,
    /// Unexpected end of input
    E1007,

    /// Undefined name
    E2001,
    /// Mismatched or unassignable types
    E2002,
    /// Wrong number of arguments
    E2003,
    /// Assignment count mismatch
    E2004,
    /// Unknown field or method
    E2005,
    /// Call of non-function
    E2006,
    /// Invalid method receiver
    E2007,
    /// Field and method with the same name
    E2008,
    /// No new variables on left side of `:=`
    E2009,
    /// Operator not defined on operand
    E2010,
    /// Misplaced branch statement
    E2011,
    /// Constant expression required
    E2012,
    /// Value computed but not used
    E2013,
    /// Function declared without body
    E2014,
    /// Invalid composite literal
    E2015,
    /// Name is not a type
    E2016,
    /// Wrong number of return values
    E2017,

    /// Internal front-end error
    E9001,
    /// Construct the Lua emitter does not translate
    E9002,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "E0001",
            ErrorCode::E0002 => "E0002",
            ErrorCode::E0003 => "E0003",
            ErrorCode::E0004 => "E0004",
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E1006 => "E1006",
            ErrorCode::E1007 => "E1007",
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
            ErrorCode::E2011 => "E2011",
            ErrorCode::E2012 => "E2012",
            ErrorCode::E2013 => "E2013",
            ErrorCode::E2014 => "E2014",
            ErrorCode::E2015 => "E2015",
            ErrorCode::E2016 => "E2016",
            ErrorCode::E2017 => "E2017",
            ErrorCode::E9001 => "E9001",
            ErrorCode::E9002 => "E9002",
        }
    }

    pub fn is_syntax_error(&self) -> bool {
        matches!(
            self,
            ErrorCode::E0001
                | ErrorCode::E0002
                | ErrorCode::E0003
                | ErrorCode::E0004
                | ErrorCode::E1001
                | ErrorCode::E1002
                | ErrorCode::E1003
                | ErrorCode::E1004
                | ErrorCode::E1005
                | ErrorCode::E1006
                | ErrorCode::E1007
        )
    }

    pub fn is_type_error(&self) -> bool {
        self.as_str().starts_with("E2")
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
