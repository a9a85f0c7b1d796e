use std::{
    fmt,
    ops::{Index, IndexMut},
    str::FromStr,
};

use anyhow::{bail, Result};

/// The side a piece belongs to.
///
/// The renderer only cares about color when picking the paint used to fill a
/// piece's silhouette, so this stays deliberately small.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Color {
    #[default]
    White,
    Black,
}

impl Color {
    /// Number of color variants.
    pub const COUNT: usize = 2;

    /// An array of both colors, starting with White.
    pub const fn all() -> [Self; Self::COUNT] {
        [Self::White, Self::Black]
    }

    /// An iterator over both colors, starting with White.
    pub fn iter() -> impl Iterator<Item = Self> {
        Self::all().into_iter()
    }

    /// Creates a [`Color`] from the ASCII case of a piece letter: uppercase is White, lowercase is Black.
    ///
    /// # Example
    /// ```
    /// # use types::Color;
    /// assert_eq!(Color::from_case('N'), Color::White);
    /// assert_eq!(Color::from_case('k'), Color::Black);
    /// ```
    pub const fn from_case(c: char) -> Self {
        if c.is_ascii_lowercase() {
            Self::Black
        } else {
            Self::White
        }
    }

    /// Returns `true` if this [`Color`] is White.
    pub const fn is_white(&self) -> bool {
        matches!(self, Self::White)
    }

    /// Returns `true` if this [`Color`] is Black.
    pub const fn is_black(&self) -> bool {
        matches!(self, Self::Black)
    }

    /// Returns the other [`Color`].
    ///
    /// # Example
    /// ```
    /// # use types::Color;
    /// assert_eq!(Color::White.opponent(), Color::Black);
    /// assert_eq!(Color::Black.opponent(), Color::White);
    /// ```
    pub const fn opponent(&self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    /// `0` for White, `1` for Black.
    pub const fn index(&self) -> usize {
        *self as usize
    }

    /// Single-letter form, `w` or `b`.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::White => "w",
            Self::Black => "b",
        }
    }

    /// Human-readable name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Black => "black",
        }
    }

    fn from_letter(c: char) -> Result<Self> {
        match c {
            'w' | 'W' => Ok(Self::White),
            'b' | 'B' => Ok(Self::Black),
            _ => bail!("Color must be either 'w' or 'b' (case-insensitive). Found {c:?}"),
        }
    }

    const fn letter(&self) -> char {
        match self {
            Self::White => 'w',
            Self::Black => 'b',
        }
    }
}

/// The kind of a chess piece, independent of its color.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// Number of piece kinds.
    pub const COUNT: usize = 6;

    /// All kinds, in the order `Pawn`, `Knight`, `Bishop`, `Rook`, `Queen`, `King`.
    pub const fn all() -> [Self; Self::COUNT] {
        use PieceKind::*;
        [Pawn, Knight, Bishop, Rook, Queen, King]
    }

    /// An iterator over all [`PieceKind`]s, starting with Pawn.
    pub fn iter() -> impl Iterator<Item = Self> {
        Self::all().into_iter()
    }

    /// Index of this kind in `0..6`, used to look up its sprite.
    pub const fn index(&self) -> usize {
        *self as usize
    }

    /// Parses a piece letter, ignoring case.
    ///
    /// # Example
    /// ```
    /// # use types::PieceKind;
    /// assert_eq!(PieceKind::from_letter('q').unwrap(), PieceKind::Queen);
    /// assert_eq!(PieceKind::from_letter('N').unwrap(), PieceKind::Knight);
    /// assert!(PieceKind::from_letter('x').is_err());
    /// ```
    pub fn from_letter(kind: char) -> Result<Self> {
        match kind.to_ascii_lowercase() {
            'p' => Ok(Self::Pawn),
            'n' => Ok(Self::Knight),
            'b' => Ok(Self::Bishop),
            'r' => Ok(Self::Rook),
            'q' => Ok(Self::Queen),
            'k' => Ok(Self::King),
            _ => bail!("Invalid char for PieceKind: Must be one of [p, n, b, r, q, k]. Got {kind:?}"),
        }
    }

    /// Lowercase letter for this kind.
    pub const fn letter(&self) -> char {
        match self {
            Self::Pawn => 'p',
            Self::Knight => 'n',
            Self::Bishop => 'b',
            Self::Rook => 'r',
            Self::Queen => 'q',
            Self::King => 'k',
        }
    }

    /// Lowercase letter for this kind, as a `str`.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pawn => "p",
            Self::Knight => "n",
            Self::Bishop => "b",
            Self::Rook => "r",
            Self::Queen => "q",
            Self::King => "k",
        }
    }

    /// Human-readable name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Pawn => "pawn",
            Self::Knight => "knight",
            Self::Bishop => "bishop",
            Self::Rook => "rook",
            Self::Queen => "queen",
            Self::King => "king",
        }
    }
}

/// A piece identifier as stored in a [`crate::Board`] cell: a [`Color`] and a [`PieceKind`].
///
/// White pieces are written with uppercase letters and Black pieces with lowercase ones.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Piece {
    color: Color,
    kind: PieceKind,
}

impl Piece {
    pub const WHITE_PAWN: Self = Self::new(Color::White, PieceKind::Pawn);
    pub const WHITE_KNIGHT: Self = Self::new(Color::White, PieceKind::Knight);
    pub const WHITE_BISHOP: Self = Self::new(Color::White, PieceKind::Bishop);
    pub const WHITE_ROOK: Self = Self::new(Color::White, PieceKind::Rook);
    pub const WHITE_QUEEN: Self = Self::new(Color::White, PieceKind::Queen);
    pub const WHITE_KING: Self = Self::new(Color::White, PieceKind::King);

    pub const BLACK_PAWN: Self = Self::new(Color::Black, PieceKind::Pawn);
    pub const BLACK_KNIGHT: Self = Self::new(Color::Black, PieceKind::Knight);
    pub const BLACK_BISHOP: Self = Self::new(Color::Black, PieceKind::Bishop);
    pub const BLACK_ROOK: Self = Self::new(Color::Black, PieceKind::Rook);
    pub const BLACK_QUEEN: Self = Self::new(Color::Black, PieceKind::Queen);
    pub const BLACK_KING: Self = Self::new(Color::Black, PieceKind::King);

    /// Number of unique pieces.
    pub const COUNT: usize = Color::COUNT * PieceKind::COUNT;

    /// Creates a new [`Piece`] from the given [`Color`] and [`PieceKind`].
    ///
    /// # Example
    /// ```
    /// # use types::{Piece, Color, PieceKind};
    /// let white_knight = Piece::new(Color::White, PieceKind::Knight);
    /// assert_eq!(white_knight.to_string(), "N");
    /// ```
    pub const fn new(color: Color, kind: PieceKind) -> Self {
        Self { color, kind }
    }

    /// Fetches the [`Color`] of this [`Piece`].
    pub const fn color(&self) -> Color {
        self.color
    }

    /// Fetches the [`PieceKind`] of this [`Piece`].
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    /// Returns `true` if this [`Piece`] is White.
    ///
    /// # Example
    /// ```
    /// # use types::Piece;
    /// assert!(Piece::WHITE_KNIGHT.is_white());
    /// assert!(!Piece::BLACK_KNIGHT.is_white());
    /// ```
    pub const fn is_white(&self) -> bool {
        self.color.is_white()
    }

    /// Returns `true` if this [`Piece`] is Black.
    pub const fn is_black(&self) -> bool {
        self.color.is_black()
    }

    /// Returns `true` if this [`Piece`] is a Rook.
    pub const fn is_rook(&self) -> bool {
        matches!(self.kind, PieceKind::Rook)
    }

    /// Returns `true` if this [`Piece`] is a King.
    pub const fn is_king(&self) -> bool {
        matches!(self.kind, PieceKind::King)
    }

    /// Index in `0..12`: White pieces first, then Black, each in [`PieceKind`] order.
    ///
    /// # Example
    /// ```
    /// # use types::Piece;
    /// assert_eq!(Piece::WHITE_PAWN.index(), 0);
    /// assert_eq!(Piece::BLACK_KING.index(), 11);
    /// ```
    pub const fn index(&self) -> usize {
        self.color.index() * PieceKind::COUNT + self.kind.index()
    }

    /// Parses a piece letter: uppercase for White, lowercase for Black.
    ///
    /// # Example
    /// ```
    /// # use types::{Piece, Color, PieceKind};
    /// let black_rook = Piece::from_letter('r').unwrap();
    /// assert_eq!(black_rook.color(), Color::Black);
    /// assert_eq!(black_rook.kind(), PieceKind::Rook);
    /// ```
    pub fn from_letter(piece: char) -> Result<Self> {
        let kind = PieceKind::from_letter(piece)?;
        Ok(Self::new(Color::from_case(piece), kind))
    }

    /// Converts this [`Piece`] into its letter.
    pub const fn letter(&self) -> char {
        match self.color {
            Color::White => self.kind.letter().to_ascii_uppercase(),
            Color::Black => self.kind.letter(),
        }
    }

    /// Converts this [`Piece`] into its letter, as a `str`.
    pub const fn as_str(&self) -> &'static str {
        match self.color {
            Color::White => match self.kind {
                PieceKind::Pawn => "P",
                PieceKind::Knight => "N",
                PieceKind::Bishop => "B",
                PieceKind::Rook => "R",
                PieceKind::Queen => "Q",
                PieceKind::King => "K",
            },
            Color::Black => self.kind.as_str(),
        }
    }

    /// Human-readable name, such as `"white knight"`.
    pub fn name(&self) -> String {
        format!("{} {}", self.color.name(), self.kind.name())
    }
}

impl<T> Index<Piece> for [T; PieceKind::COUNT] {
    type Output = T;
    /// [`Piece`] can be used to index into a list of six per-kind elements.
    fn index(&self, index: Piece) -> &Self::Output {
        &self[index.kind().index()]
    }
}

impl<T> IndexMut<Piece> for [T; PieceKind::COUNT] {
    fn index_mut(&mut self, index: Piece) -> &mut Self::Output {
        &mut self[index.kind().index()]
    }
}

macro_rules! impl_common_traits {
    ($type:ty) => {
        impl FromStr for $type {
            type Err = anyhow::Error;
            /// Parses a single letter.
            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::from_letter(c),
                    _ => bail!("Invalid str for {}: Must be a single letter. Got {s:?}", stringify!($type)),
                }
            }
        }

        impl AsRef<str> for $type {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl fmt::Display for $type {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.letter())
            }
        }

        impl fmt::Debug for $type {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "\"{self}\" ({})", self.index())
            }
        }
    };
}

impl_common_traits!(Piece);
impl_common_traits!(PieceKind);
impl_common_traits!(Color);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piece_letters() {
        for color in Color::iter() {
            for kind in PieceKind::iter() {
                let piece = Piece::new(color, kind);
                let parsed: Piece = piece.to_string().parse().unwrap();
                assert_eq!(parsed, piece);
                assert_eq!(piece.as_str(), piece.to_string());
            }
        }

        assert!("".parse::<Piece>().is_err());
        assert!("Qq".parse::<Piece>().is_err());
        assert_eq!("w".parse::<Color>().unwrap(), Color::White);
    }

    #[test]
    fn test_piece_indices_are_unique() {
        let mut seen = [false; Piece::COUNT];
        for color in Color::iter() {
            for kind in PieceKind::iter() {
                let index = Piece::new(color, kind).index();
                assert!(!seen[index], "duplicate index {index}");
                seen[index] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_kind_indexing() {
        let names = PieceKind::all().map(|kind| kind.name());
        assert_eq!(names[Piece::BLACK_QUEEN], "queen");
        assert_eq!(Piece::WHITE_KNIGHT.name(), "white knight");
    }
}
