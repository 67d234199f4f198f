//! Command vocabulary and name lookup.

use lazy_static::lazy_static;
use std::collections::HashMap;

/// Fixed vocabulary of engine commands.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    // solver lifecycle
    Create,
    Factorize,
    Solve,
    Diagonal,
    HalfProj,
    Delete,
    // elementwise unary
    Abs,
    Sqrt,
    Negate,
    Not,
    Double,
    Boolean,
    // elementwise comparisons and logic
    Lt,
    Gt,
    Ne,
    Or,
    And,
    // elementwise arithmetic
    Plus,
    Minus,
    Times,
    Divide,
    Max,
    Min,
    // column reductions
    ColMax,
    ColMin,
    ColSum,
    ColProd,
    // structural
    Transpose,
    MatMul,
    Backslash,
    Chol,
    Eps,
}

lazy_static! {
    static ref COMMANDS: HashMap<&'static str, Command> = {
        use Command::*;
        HashMap::from([
            ("create", Create),
            ("factorize", Factorize),
            ("solve", Solve),
            ("diagonal", Diagonal),
            ("halfproj", HalfProj),
            ("delete", Delete),
            ("abs", Abs),
            ("sqrt", Sqrt),
            ("negate", Negate),
            ("not", Not),
            ("double", Double),
            ("boolean", Boolean),
            ("lt", Lt),
            ("gt", Gt),
            ("ne", Ne),
            ("or", Or),
            ("and", And),
            ("plus", Plus),
            ("minus", Minus),
            ("times", Times),
            ("divide", Divide),
            ("max", Max),
            ("min", Min),
            ("cmax", ColMax),
            ("cmin", ColMin),
            ("csum", ColSum),
            ("cprod", ColProd),
            ("transpose", Transpose),
            ("mmul", MatMul),
            ("backslash", Backslash),
            ("chol", Chol),
            ("eps", Eps),
        ])
    };
}

impl Command {
    /// Resolve a command name, if it belongs to the vocabulary.
    pub fn lookup(name: &str) -> Option<Command> {
        COMMANDS.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_names_resolve() {
        assert_eq!(Command::lookup("create"), Some(Command::Create));
        assert_eq!(Command::lookup("cprod"), Some(Command::ColProd));
        assert_eq!(Command::lookup("eps"), Some(Command::Eps));
    }

    #[test]
    fn unknown_names_do_not() {
        assert_eq!(Command::lookup("bogus"), None);
        assert_eq!(Command::lookup(""), None);
        assert_eq!(Command::lookup("PLUS"), None);
    }
}
