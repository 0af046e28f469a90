/// A position in source text.
///
/// Rows are 1-based (the first line is row 1); columns are 0-based (the
/// first character on a line is column 0). This matches the convention
/// CPython uses for `SyntaxError.lineno`/`offset`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Location {
    row: u32,
    column: u32,
}

impl Location {
    /// Creates a new `Location` at the given row and column.
    pub const fn new(row: u32, column: u32) -> Self {
        Location { row, column }
    }

    /// The location of the very first character of a source file.
    pub const fn start() -> Self {
        Location { row: 1, column: 0 }
    }

    pub const fn row(&self) -> u32 {
        self.row
    }

    pub const fn column(&self) -> u32 {
        self.column
    }

    pub fn go_right(&mut self) {
        self.column += 1;
    }

    pub fn go_right_by(&mut self, n: u32) {
        self.column += n;
    }

    pub fn newline(&mut self) {
        self.row += 1;
        self.column = 0;
    }

    pub const fn with_col_offset(&self, offset: i32) -> Self {
        Location {
            row: self.row,
            column: (self.column as i32 + offset) as u32,
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}, column {}", self.row, self.column)
    }
}

/// A half-open span of source text, from `start` (inclusive) to `end` (exclusive).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SourceSpan {
    pub start: Location,
    pub end: Location,
}

impl SourceSpan {
    pub const fn new(start: Location, end: Location) -> Self {
        SourceSpan { start, end }
    }

    /// A zero-width span at `loc`, used for synthetic nodes.
    pub const fn at(loc: Location) -> Self {
        SourceSpan { start: loc, end: loc }
    }

    /// The smallest span covering both `self` and `other`.
    pub fn cover(self, other: SourceSpan) -> SourceSpan {
        let start = if self.start.row < other.start.row
            || (self.start.row == other.start.row && self.start.column <= other.start.column)
        {
            self.start
        } else {
            other.start
        };
        let end = if self.end.row > other.end.row
            || (self.end.row == other.end.row && self.end.column >= other.end.column)
        {
            self.end
        } else {
            other.end
        };
        SourceSpan { start, end }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering() {
        assert!(Location::new(1, 2) > Location::new(1, 1));
        assert!(Location::new(2, 1) > Location::new(1, 5));
    }

    #[test]
    fn newline_resets_column() {
        let mut loc = Location::new(3, 7);
        loc.newline();
        assert_eq!(loc, Location::new(4, 0));
    }

    #[test]
    fn cover_spans_both_ranges() {
        let a = SourceSpan::new(Location::new(1, 0), Location::new(1, 5));
        let b = SourceSpan::new(Location::new(2, 0), Location::new(2, 3));
        let covered = a.cover(b);
        assert_eq!(covered.start, Location::new(1, 0));
        assert_eq!(covered.end, Location::new(2, 3));
    }
}
