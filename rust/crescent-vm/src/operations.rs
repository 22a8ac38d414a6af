//! Station roles: which stations compute something when visited.
//!
//! The table is data. The semantics of each role live in `vm::ops`.

use crescent_core::LocationId;
use std::collections::BTreeMap;
use std::fmt;

/// Operators taking the accumulator `a` and the destination cell `b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Multiply,
    /// `floor(b / a)`
    Divide,
    /// `b mod a`, floored
    Remainder,
    Max,
    Nor,
    And,
    /// `b << a`
    ShiftLeft,
    /// `b >> a`
    ShiftRight,
    /// `b ++ a`
    Concat,
    LeftSubstring,
    RightSubstring,
}

/// Operators taking the destination cell alone, except `ParsePrefix`, which
/// reads the accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Square,
    Complement,
    Constant(i64),
    CharCode,
    Uppercase,
    Lowercase,
    Reverse,
    ParsePrefix,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Binary(BinaryOp),
    Unary(UnaryOp),
    /// Swap into this cell and copy the result into `alias` as well.
    Store { alias: LocationId },
    /// Copy the cell into the accumulator; the cell keeps its value.
    Retrieve,
    /// Push the current instruction pointer.
    Mark,
    /// Jump back to the latest mark while the accumulator is a nonzero Integer.
    BranchIfNonZero,
    /// Pop the latest mark.
    Unmark,
    /// Write the accumulator to the output.
    Emit,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Binary(op) => match op {
                BinaryOp::Add => "add",
                BinaryOp::Multiply => "multiply",
                BinaryOp::Divide => "divide",
                BinaryOp::Remainder => "remainder",
                BinaryOp::Max => "max",
                BinaryOp::Nor => "nor",
                BinaryOp::And => "and",
                BinaryOp::ShiftLeft => "shift-left",
                BinaryOp::ShiftRight => "shift-right",
                BinaryOp::Concat => "concat",
                BinaryOp::LeftSubstring => "left-substring",
                BinaryOp::RightSubstring => "right-substring",
            },
            Operation::Unary(op) => match op {
                UnaryOp::Square => "square",
                UnaryOp::Complement => "complement",
                UnaryOp::Constant(_) => "constant",
                UnaryOp::CharCode => "char-code",
                UnaryOp::Uppercase => "uppercase",
                UnaryOp::Lowercase => "lowercase",
                UnaryOp::Reverse => "reverse",
                UnaryOp::ParsePrefix => "parse-prefix",
            },
            Operation::Store { .. } => "store",
            Operation::Retrieve => "retrieve",
            Operation::Mark => "mark",
            Operation::BranchIfNonZero => "branch-if-nonzero",
            Operation::Unmark => "unmark",
            Operation::Emit => "emit",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Station → role mapping. Stations without an entry just swap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationTable {
    roles: BTreeMap<LocationId, Operation>,
}

/// Home station of the London network.
pub const LONDON_HOME: &str = "Mornington Crescent";

impl OperationTable {
    /// An empty table apart from `home`, which always emits.
    pub fn new(home: impl Into<LocationId>) -> Self {
        let mut roles = BTreeMap::new();
        roles.insert(home.into(), Operation::Emit);
        Self { roles }
    }

    /// Assign (or replace) the role of a station.
    pub fn with(mut self, location: impl Into<LocationId>, op: Operation) -> Self {
        self.roles.insert(location.into(), op);
        self
    }

    pub fn get(&self, location: &str) -> Option<&Operation> {
        self.roles.get(location)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LocationId, &Operation)> {
        self.roles.iter()
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// The standard roles of the London Underground stations.
    pub fn london() -> Self {
        use BinaryOp::*;
        use UnaryOp::*;

        Self::new(LONDON_HOME)
            .with("Upminster", Operation::Binary(Add))
            .with("Chalfont & Latimer", Operation::Binary(Multiply))
            .with("Cannon Street", Operation::Binary(Divide))
            .with("Preston Road", Operation::Binary(Remainder))
            .with("Bounds Green", Operation::Binary(Max))
            .with("Manor House", Operation::Binary(Nor))
            .with("Holland Park", Operation::Binary(And))
            .with("Turnham Green", Operation::Binary(ShiftRight))
            .with("Stepney Green", Operation::Binary(ShiftLeft))
            .with("Russell Square", Operation::Unary(Square))
            .with("Notting Hill Gate", Operation::Unary(Complement))
            .with("Parsons Green", Operation::Unary(ParsePrefix))
            .with("Seven Sisters", Operation::Unary(Constant(7)))
            .with("Charing Cross", Operation::Unary(CharCode))
            .with("Paddington", Operation::Binary(Concat))
            .with("Gunnersbury", Operation::Binary(LeftSubstring))
            .with("Mile End", Operation::Binary(RightSubstring))
            .with("Upney", Operation::Unary(Uppercase))
            .with("Hounslow Central", Operation::Unary(Lowercase))
            .with("Turnpike Lane", Operation::Unary(Reverse))
            .with(
                "Bank",
                Operation::Store {
                    alias: LocationId::from("Hammersmith"),
                },
            )
            .with("Hammersmith", Operation::Retrieve)
            .with("Temple", Operation::Mark)
            .with("Angel", Operation::BranchIfNonZero)
            .with("Marble Arch", Operation::Unmark)
    }

    /// The London roles on a network whose home is `home`. The home emits
    /// and Mornington Crescent loses its role unless it is the home.
    pub fn london_with_home(home: impl Into<LocationId>) -> Self {
        let mut table = Self::london();
        table.roles.remove(LONDON_HOME);
        table.roles.insert(home.into(), Operation::Emit);
        table
    }
}

impl Default for OperationTable {
    fn default() -> Self {
        Self::london()
    }
}
