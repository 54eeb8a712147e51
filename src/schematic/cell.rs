use rand::Rng;
use serde::{Deserialize, Serialize};

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GateType {
    AND = 0,  // a & b,
    NAND = 1, // !(a & b),
    OR = 2,   // a | b,
    NOR = 3,  // !(a | b),
    XNOR = 4, // !(a ^ b),
    XOR = 5,  // a ^ b,
}

impl GateType {
    pub const COUNT: u8 = 6;
    pub const ALL: [Self; Self::COUNT as usize] = [
        Self::AND,
        Self::NAND,
        Self::OR,
        Self::NOR,
        Self::XNOR,
        Self::XOR,
    ];

    pub const fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::AND,
            1 => Self::NAND,
            2 => Self::OR,
            3 => Self::NOR,
            4 => Self::XNOR,
            5 => Self::XOR,
            _ => unreachable!(),
        }
    }

    #[inline]
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::from_u8(rng.random_range(0..Self::COUNT))
    }

    pub const fn evaluate(&self, a: bool, b: bool) -> bool {
        match self {
            Self::AND => a & b,
            Self::NAND => !(a & b),
            Self::OR => a | b,
            Self::NOR => !(a | b),
            Self::XNOR => !(a ^ b),
            Self::XOR => a ^ b,
        }
    }

    pub const fn glyph(&self) -> char {
        match self {
            Self::AND => '&',
            Self::NAND => '*',
            Self::OR => ')',
            Self::NOR => '(',
            Self::XNOR => '%',
            Self::XOR => '^',
        }
    }
}

/// Wiring drawn between two rows of the schematic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Motif {
    /// One signal split towards both neighbours.
    Fork,
    /// Two runs joining in the middle of a gap.
    Merge,
    Run,
    /// Wire converging with the cell to its left.
    DualUp,
    /// Wire converging with the cell to its right.
    DualDown,
    DualBendUp,
    DualBendDown,
    CurveUp,
    CurveDown,
}

impl Motif {
    /// Whether two wires end in this cell, so the row ahead holds a gate here.
    pub const fn is_connection_point(&self) -> bool {
        matches!(
            self,
            Self::Merge | Self::DualUp | Self::DualDown | Self::DualBendUp | Self::DualBendDown
        )
    }

    pub const fn glyph(&self) -> char {
        match self {
            Self::Fork => '┤',
            Self::Merge => '┼',
            Self::Run => '│',
            Self::DualUp => '┴',
            Self::DualDown => '┬',
            Self::DualBendUp => '╯',
            Self::DualBendDown => '╮',
            Self::CurveUp => '┘',
            Self::CurveDown => '┐',
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Blank,
    /// Input number `i`, labelled with the `i`-th letter.
    Input(usize),
    Wire(Motif),
    Placeholder,
    Gate(GateType),
}

impl Cell {
    pub const PLACEHOLDER_GLYPH: char = '□';

    /// Slot that takes a gate, with or without a concrete type.
    pub const fn is_gate_slot(&self) -> bool {
        matches!(self, Self::Placeholder | Self::Gate(_))
    }

    pub fn glyph(&self) -> char {
        match self {
            Self::Blank => ' ',
            Self::Input(i) => input_label(*i),
            Self::Wire(m) => m.glyph(),
            Self::Placeholder => Self::PLACEHOLDER_GLYPH,
            Self::Gate(g) => g.glyph(),
        }
    }
}

/// Letter naming input `index`; wraps after `z`.
pub fn input_label(index: usize) -> char {
    (b'a' + (index % 26) as u8) as char
}
