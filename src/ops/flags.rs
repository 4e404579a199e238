//! BLAS-style operation flags shared by the batched kernels and the solvers

/// Which side the triangular operand multiplies from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// `op(A) * X = alpha * B`
    Left,
    /// `X * op(A) = alpha * B`
    Right,
}

/// Which triangle of the operand holds the stored entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Uplo {
    /// Upper triangular
    Upper,
    /// Lower triangular
    Lower,
}

/// Operation applied to an operand before multiplication
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transpose {
    /// `op(A) = A`
    NoTrans,
    /// `op(A) = A^T`
    Trans,
    /// `op(A) = A^H` (same as `Trans` for real types)
    ConjTrans,
}

/// Whether the operand's diagonal is implicitly one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Diag {
    /// Use the stored diagonal entries
    NonUnit,
    /// Assume unit diagonal; stored diagonal entries are never read
    Unit,
}

/// Region copied by a batched matrix copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CopyMode {
    /// Entire `m x n` matrix
    Full,
    /// Upper triangle including the diagonal
    Upper,
    /// Lower triangle including the diagonal
    Lower,
}

impl Side {
    /// Parse a LAPACK side character (`L`/`R`, case-insensitive)
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'L' => Some(Self::Left),
            'R' => Some(Self::Right),
            _ => None,
        }
    }
}

impl Uplo {
    /// Parse a LAPACK uplo character (`U`/`L`, case-insensitive)
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'U' => Some(Self::Upper),
            'L' => Some(Self::Lower),
            _ => None,
        }
    }

    /// The other triangle
    pub fn flip(self) -> Self {
        match self {
            Self::Upper => Self::Lower,
            Self::Lower => Self::Upper,
        }
    }
}

impl Transpose {
    /// Parse a LAPACK trans character (`N`/`T`/`C`, case-insensitive)
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'N' => Some(Self::NoTrans),
            'T' => Some(Self::Trans),
            'C' => Some(Self::ConjTrans),
            _ => None,
        }
    }

    /// True for `Trans` and `ConjTrans`
    #[inline]
    pub fn is_transposed(self) -> bool {
        !matches!(self, Self::NoTrans)
    }

    /// True when elements are conjugated on load
    #[inline]
    pub fn conjugates(self) -> bool {
        matches!(self, Self::ConjTrans)
    }
}

impl Diag {
    /// Parse a LAPACK diag character (`N`/`U`, case-insensitive)
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'N' => Some(Self::NonUnit),
            'U' => Some(Self::Unit),
            _ => None,
        }
    }

    /// True for `Unit`
    #[inline]
    pub fn is_unit(self) -> bool {
        matches!(self, Self::Unit)
    }
}
