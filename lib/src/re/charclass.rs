/*! Sets of code points used by character classes like `[a-z0-9]`.

A [`CharClass`] can take one of four representations:

* [`CharClass::Ascii`]: a 128-bit mask covering code points 0-127. This is
  the representation used for most classes found in real-life patterns,
  membership is tested with a shift and a mask.
* [`CharClass::Ranges`]: a sorted list of non-overlapping inclusive ranges.
  Membership is tested with a binary search.
* [`CharClass::Complement`]: wraps another class and inverts membership.
  Used only when the wrapped class can't be complemented directly.
* [`CharClass::Union`]: a list of classes, a code point is contained in the
  union if any of the members contains it. Unions are never nested.

Classes are built while parsing and are never modified once the pattern is
compiled, so they can be shared by all the threads that execute a match.
 */

use std::fmt::{Display, Formatter};

/// Largest code point a class can contain.
pub const MAX_CODEPOINT: u32 = char::MAX as u32;

/// An inclusive range of code points.
///
/// Ranges produced by the parser have a stride of 1, meaning that every
/// code point from `lo` to `hi` is part of the range. Ranges with a larger
/// stride contain only `lo`, `lo + stride`, `lo + 2 * stride`, and so on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ClassRange {
    lo: u32,
    hi: u32,
    stride: u32,
}

impl ClassRange {
    /// Creates a range that contains every code point from `lo` to `hi`,
    /// both inclusive. The bounds are swapped if `lo > hi`.
    pub fn new(lo: u32, hi: u32) -> Self {
        Self::with_stride(lo, hi, 1)
    }

    /// Creates a range with the given stride. A stride of zero is
    /// interpreted as 1.
    pub fn with_stride(lo: u32, hi: u32, stride: u32) -> Self {
        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        Self { lo, hi: hi.min(MAX_CODEPOINT), stride: stride.max(1) }
    }

    #[inline]
    pub fn lo(&self) -> u32 {
        self.lo
    }

    #[inline]
    pub fn hi(&self) -> u32 {
        self.hi
    }

    #[inline]
    pub fn stride(&self) -> u32 {
        self.stride
    }

    #[inline]
    pub fn contains(&self, c: u32) -> bool {
        self.lo <= c && c <= self.hi && (c - self.lo) % self.stride == 0
    }

    #[inline]
    fn is_unit(&self) -> bool {
        self.stride == 1
    }
}

/// A sorted list of disjoint code point ranges.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct RangeSet {
    ranges: Vec<ClassRange>,
}

impl RangeSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self { ranges: Vec::new() }
    }

    /// Creates a set containing the code points from `lo` to `hi`.
    pub fn from_chars(lo: char, hi: char) -> Self {
        Self { ranges: vec![ClassRange::new(lo as u32, hi as u32)] }
    }

    /// Creates a set from an arbitrary sequence of ranges.
    ///
    /// Unit-stride ranges are sorted and coalesced, so they can be given
    /// in any order and may overlap. Ranges with a larger stride must not
    /// overlap each other, they are only sorted.
    pub fn from_ranges<I>(ranges: I) -> Self
    where
        I: IntoIterator<Item = ClassRange>,
    {
        let mut ranges: Vec<ClassRange> = ranges.into_iter().collect();
        ranges.sort_unstable_by_key(|r| (r.lo, r.hi));

        if !ranges.iter().all(ClassRange::is_unit) {
            return Self { ranges };
        }

        let mut result = Self::new();
        for range in ranges {
            result.push_coalescing(range);
        }
        result
    }

    /// Returns the ranges in the set, in ascending order.
    #[inline]
    pub fn ranges(&self) -> &[ClassRange] {
        self.ranges.as_slice()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Returns true if every range in the set has a stride of 1.
    pub fn is_unit_stride(&self) -> bool {
        self.ranges.iter().all(ClassRange::is_unit)
    }

    /// Returns true if the set contains the code point `c`.
    pub fn contains(&self, c: u32) -> bool {
        // Index of the first range that ends at `c` or after it. As ranges
        // are sorted and disjoint, this is the only one that can contain `c`.
        let i = self.ranges.partition_point(|r| r.hi < c);
        matches!(self.ranges.get(i), Some(r) if r.contains(c))
    }

    /// Returns the largest code point in the set.
    pub fn max_codepoint(&self) -> Option<u32> {
        self.ranges.last().map(|r| r.hi)
    }

    /// If the set contains exactly one code point, returns it.
    pub fn single(&self) -> Option<u32> {
        match self.ranges.as_slice() {
            [r] if r.lo == r.hi => Some(r.lo),
            _ => None,
        }
    }

    /// Computes the union of two unit-stride sets.
    ///
    /// This is a single sweep over both lists, in the same way the merge
    /// step of a merge-sort works. Two ranges are coalesced when they
    /// overlap or when one starts right after the other ends.
    pub fn union(&self, other: &RangeSet) -> RangeSet {
        debug_assert!(self.is_unit_stride() && other.is_unit_stride());

        let mut result = RangeSet {
            ranges: Vec::with_capacity(self.ranges.len() + other.ranges.len()),
        };

        let mut a = self.ranges.iter().peekable();
        let mut b = other.ranges.iter().peekable();

        loop {
            let next = match (a.peek(), b.peek()) {
                (Some(x), Some(y)) if x.lo <= y.lo => a.next(),
                (Some(_), Some(_)) => b.next(),
                (Some(_), None) => a.next(),
                (None, Some(_)) => b.next(),
                (None, None) => break,
            };
            if let Some(range) = next {
                result.push_coalescing(*range);
            }
        }

        result
    }

    /// Returns the complement of this set, i.e: every code point from 0 to
    /// [`MAX_CODEPOINT`] that is not contained in this set.
    ///
    /// Returns [`None`] if the set contains ranges with a stride larger
    /// than 1, such sets can't be complemented range by range.
    pub fn complement(&self) -> Option<RangeSet> {
        if !self.is_unit_stride() {
            return None;
        }

        let mut result = RangeSet::new();
        let mut start = 0_u32;

        for range in &self.ranges {
            if start < range.lo {
                result.ranges.push(ClassRange::new(start, range.lo - 1));
            }
            // When the range ends at MAX_CODEPOINT there's no gap after it.
            match range.hi.checked_add(1) {
                Some(next) if next <= MAX_CODEPOINT => start = next,
                _ => return Some(result),
            }
        }

        result.ranges.push(ClassRange::new(start, MAX_CODEPOINT));
        Some(result)
    }

    /// Appends a unit-stride range that starts at or after the start of the
    /// last range in the set, merging both if they overlap or are adjacent.
    fn push_coalescing(&mut self, range: ClassRange) {
        if let Some(last) = self.ranges.last_mut() {
            if range.lo <= last.hi.saturating_add(1) {
                last.hi = last.hi.max(range.hi);
                return;
            }
        }
        self.ranges.push(range);
    }
}

/// A bitmask for code points in the ASCII range.
///
/// When `negated` is false the mask represents the code points whose bits
/// are set, and code points outside the ASCII range are never contained.
/// When `negated` is true, the code points outside the ASCII range are all
/// contained. This is what you get when complementing a class that only
/// contained ASCII characters, like `[^0-9]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct AsciiMask {
    lo: u64,
    hi: u64,
    negated: bool,
}

impl AsciiMask {
    /// Creates a mask from its two 64-bit words. Bit N of `lo` corresponds
    /// to code point N, and bit N of `hi` corresponds to code point N + 64.
    pub fn from_words(lo: u64, hi: u64, negated: bool) -> Self {
        Self { lo, hi, negated }
    }

    /// Builds a mask with the same content as `set`, if all the code points
    /// in the set are lower than 128.
    pub fn from_range_set(set: &RangeSet) -> Option<Self> {
        if set.max_codepoint().is_some_and(|max| max >= 128) {
            return None;
        }
        let mut mask = Self::default();
        for range in set.ranges() {
            for c in (range.lo..=range.hi).step_by(range.stride as usize) {
                mask.set(c);
            }
        }
        Some(mask)
    }

    #[inline]
    pub fn words(&self) -> (u64, u64) {
        (self.lo, self.hi)
    }

    #[inline]
    pub fn is_negated(&self) -> bool {
        self.negated
    }

    #[inline]
    pub fn contains(&self, c: u32) -> bool {
        match c {
            0..=63 => self.lo >> c & 1 == 1,
            64..=127 => self.hi >> (c - 64) & 1 == 1,
            _ => self.negated,
        }
    }

    /// Returns the complement of this mask.
    pub fn negate(self) -> Self {
        Self { lo: !self.lo, hi: !self.hi, negated: !self.negated }
    }

    /// Returns the number of ASCII code points in the mask.
    pub fn count_ascii(&self) -> u32 {
        self.lo.count_ones() + self.hi.count_ones()
    }

    /// Returns the ASCII code points contained in the mask, as ranges.
    fn ascii_ranges(&self) -> RangeSet {
        RangeSet::from_ranges(
            (0..128).filter(|c| self.contains(*c)).map(|c| ClassRange::new(c, c)),
        )
    }

    fn set(&mut self, c: u32) {
        match c {
            0..=63 => self.lo |= 1 << c,
            64..=127 => self.hi |= 1 << (c - 64),
            _ => {}
        }
    }
}

/// A set of code points matched by a character class.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CharClass {
    Ascii(AsciiMask),
    Ranges(RangeSet),
    Complement(Box<CharClass>),
    Union(Vec<CharClass>),
}

impl CharClass {
    /// Returns true if `c` belongs to the class.
    #[inline]
    pub fn contains(&self, c: char) -> bool {
        self.contains_codepoint(c as u32)
    }

    /// Same as [`CharClass::contains`] but receives a raw code point.
    pub fn contains_codepoint(&self, c: u32) -> bool {
        match self {
            CharClass::Ascii(mask) => mask.contains(c),
            CharClass::Ranges(set) => set.contains(c),
            CharClass::Complement(class) => !class.contains_codepoint(c),
            CharClass::Union(members) => {
                members.iter().any(|m| m.contains_codepoint(c))
            }
        }
    }

    /// Returns the complement of a class.
    ///
    /// Masks and unit-stride range sets are complemented directly, other
    /// classes are wrapped in a [`CharClass::Complement`].
    pub fn negate(self) -> CharClass {
        match self {
            CharClass::Ascii(mask) => CharClass::Ascii(mask.negate()),
            CharClass::Ranges(set) => match set.complement() {
                Some(complement) => CharClass::Ranges(complement),
                None => CharClass::Complement(Box::new(CharClass::Ranges(set))),
            },
            CharClass::Complement(class) => *class,
            class @ CharClass::Union(_) => {
                CharClass::Complement(Box::new(class))
            }
        }
    }

    /// Merges multiple classes into a single one that contains the code
    /// points of all of them.
    ///
    /// Nested unions are flattened and all the unit-stride range sets are
    /// coalesced into a single one. Classes that can't be coalesced are
    /// kept as separate members of the resulting union. When only one
    /// member remains it is returned as is.
    pub fn merge<I>(classes: I) -> CharClass
    where
        I: IntoIterator<Item = CharClass>,
    {
        let mut merged: Option<RangeSet> = None;
        let mut others = Vec::new();

        let flattened = classes.into_iter().flat_map(|class| match class {
            CharClass::Union(members) => members,
            class => vec![class],
        });

        for class in flattened {
            match class {
                CharClass::Ranges(set) if set.is_unit_stride() => {
                    merged = Some(match merged {
                        Some(acc) => acc.union(&set),
                        None => set,
                    });
                }
                class => others.push(class),
            }
        }

        let mut members = Vec::with_capacity(others.len() + 1);
        if let Some(set) = merged {
            members.push(CharClass::Ranges(set));
        }
        members.append(&mut others);

        match members.len() {
            0 => CharClass::Ranges(RangeSet::new()),
            1 => members.remove(0),
            _ => CharClass::Union(members),
        }
    }

    /// Converts a range set that only contains ASCII characters into the
    /// more efficient [`CharClass::Ascii`] representation. Any other class
    /// is returned unchanged.
    pub fn narrow_to_ascii(self) -> CharClass {
        match self {
            CharClass::Ranges(set) => match AsciiMask::from_range_set(&set) {
                Some(mask) if !set.is_empty() => CharClass::Ascii(mask),
                _ => CharClass::Ranges(set),
            },
            class => class,
        }
    }

    /// If the class contains exactly one code point, returns it.
    pub fn single_char(&self) -> Option<char> {
        let c = match self {
            CharClass::Ascii(mask) if !mask.negated && mask.count_ascii() == 1 => {
                mask.ascii_ranges().single()
            }
            CharClass::Ranges(set) => set.single(),
            _ => None,
        }?;
        char::from_u32(c)
    }
}

impl From<RangeSet> for CharClass {
    fn from(set: RangeSet) -> Self {
        CharClass::Ranges(set)
    }
}

impl Display for CharClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CharClass::Ascii(mask) if mask.negated => {
                write!(f, "^{}", mask.negate().ascii_ranges())
            }
            CharClass::Ascii(mask) => write!(f, "{}", mask.ascii_ranges()),
            CharClass::Ranges(set) => write!(f, "{}", set),
            CharClass::Complement(class) => write!(f, "^{}", class),
            CharClass::Union(members) => {
                for member in members {
                    match member {
                        CharClass::Complement(_) => write!(f, "[{}]", member)?,
                        member => write!(f, "{}", member)?,
                    }
                }
                Ok(())
            }
        }
    }
}

impl Display for RangeSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for range in &self.ranges {
            write_codepoint(f, range.lo)?;
            if range.hi > range.lo {
                write!(f, "-")?;
                write_codepoint(f, range.hi)?;
            }
            if range.stride > 1 {
                write!(f, "/{}", range.stride)?;
            }
        }
        Ok(())
    }
}

/// Writes a code point in a form that is valid inside a class.
fn write_codepoint(f: &mut Formatter<'_>, c: u32) -> std::fmt::Result {
    match char::from_u32(c) {
        Some(ch @ ('\\' | ']' | '[' | '^' | '-')) => write!(f, "\\{}", ch),
        Some(ch) if ch.is_control() && c < 256 => write!(f, "\\{:03o}", c),
        Some(ch) if !ch.is_control() => write!(f, "{}", ch),
        _ => write!(f, "\\u{{{:x}}}", c),
    }
}
