use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const PLACEHOLDER: char = 'x';
pub const DEFAULT_PATTERN: &str = "(xxx) xxx-xxxx";

/// Key that was pressed right before the text changed.
///
/// Deleting a separator leaves the digit sequence untouched, so the masker
/// needs to know a deletion happened to remove the neighbouring digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PendingKey {
    #[default]
    None,
    Backspace,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Digit,
    Literal(char),
}

/// A phone-style mask where `x` is a digit slot and anything else is literal.
#[derive(Clone, PartialEq, Eq)]
pub struct MaskTemplate {
    pattern: String,
    slots: Vec<Slot>,
    capacity: usize,
    /// Literals in front of the first placeholder.
    prefix: Vec<char>,
}

/// Result of re-deriving masked text from an edit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MaskedText {
    pub digits: String,
    pub formatted: String,
    /// Char offset into `formatted`.
    pub caret: usize,
}

impl MaskTemplate {
    pub fn parse(pattern: &str) -> Self {
        let slots: Vec<Slot> = pattern
            .chars()
            .map(|ch| {
                if ch == PLACEHOLDER {
                    Slot::Digit
                } else {
                    Slot::Literal(ch)
                }
            })
            .collect();
        let capacity = slots.iter().filter(|slot| **slot == Slot::Digit).count();
        let prefix = if capacity == 0 {
            Vec::new()
        } else {
            slots
                .iter()
                .map_while(|slot| match slot {
                    Slot::Literal(ch) => Some(*ch),
                    Slot::Digit => None,
                })
                .collect()
        };
        Self {
            pattern: pattern.to_string(),
            slots,
            capacity,
            prefix,
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Number of digit slots. Zero means the template formats nothing.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn is_identity(&self) -> bool {
        self.capacity == 0
    }

    /// Char offset of the first placeholder; the caret never sits left of it
    /// once something is formatted.
    pub fn first_slot_offset(&self) -> usize {
        self.prefix.len()
    }

    /// Find the leading literals in `raw`, allowing one stray char typed
    /// into them or one of them erased.
    ///
    /// Returns where the prefix region ends and the index of the stray char.
    fn leading_region(&self, raw: &[char]) -> Option<(usize, Option<usize>)> {
        let prefix = self.prefix.as_slice();
        let len = prefix.len();
        if raw.starts_with(prefix) {
            return Some((len, None));
        }
        if raw.len() > len {
            for split in 0..=len {
                if raw[..split] == prefix[..split] && raw[split + 1..].starts_with(&prefix[split..]) {
                    return Some((len + 1, Some(split)));
                }
            }
        }
        for gap in 0..len {
            let mut shortened = prefix.to_vec();
            shortened.remove(gap);
            if raw.starts_with(&shortened) {
                return Some((len - 1, None));
            }
        }
        None
    }

    /// Char indices in `raw` that hold digits destined for placeholders.
    ///
    /// Characters that line up with the template's literals are skipped, so
    /// digits inside literals (e.g. a `+91` prefix) are not mistaken for
    /// user input, even when an edit has damaged the prefix.
    fn digit_positions(&self, raw: &str) -> (Vec<usize>, usize) {
        let chars: Vec<char> = raw.chars().collect();
        if self.is_identity() {
            let positions = chars
                .iter()
                .enumerate()
                .filter(|(_, ch)| ch.is_ascii_digit())
                .map(|(idx, _)| idx)
                .collect();
            return (positions, 0);
        }
        let mut positions = Vec::new();
        let (start, mut cursor) = match self.leading_region(&chars) {
            Some((end, stray)) => {
                if let Some(idx) = stray
                    && chars[idx].is_ascii_digit()
                {
                    positions.push(idx);
                }
                (end, self.prefix.len())
            }
            None => (0, 0),
        };
        for (idx, ch) in chars.iter().enumerate().skip(start) {
            if let Some(Slot::Literal(literal)) = self.slots.get(cursor)
                && literal == ch
            {
                cursor += 1;
                continue;
            }
            if !ch.is_ascii_digit() {
                continue;
            }
            while let Some(Slot::Literal(_)) = self.slots.get(cursor) {
                cursor += 1;
            }
            positions.push(idx);
            cursor += 1;
        }
        (positions, start)
    }

    /// Digits the user entered, truncated to the template capacity.
    pub fn extract(&self, raw: &str) -> String {
        let chars: Vec<char> = raw.chars().collect();
        let mut digits: String = self
            .digit_positions(raw)
            .0
            .into_iter()
            .map(|idx| chars[idx])
            .collect();
        if !self.is_identity() {
            digits.truncate(self.capacity);
        }
        digits
    }

    /// Lay `digits` into the template, stopping after the last placed digit.
    pub fn format(&self, digits: &str) -> String {
        if self.is_identity() {
            return digits.to_string();
        }
        let mut out = String::new();
        let mut pending = String::new();
        let mut remaining = digits.chars().take(self.capacity);
        for slot in &self.slots {
            match slot {
                Slot::Literal(ch) => pending.push(*ch),
                Slot::Digit => match remaining.next() {
                    Some(digit) => {
                        out.push_str(&pending);
                        pending.clear();
                        out.push(digit);
                    }
                    None => break,
                },
            }
        }
        out
    }

    /// Char offset in the formatted text just before digit `index`, or the
    /// end of the text when `index` is past the last digit.
    pub fn caret_for_digit(&self, index: usize, digit_count: usize) -> usize {
        if self.is_identity() {
            return index.min(digit_count);
        }
        let digit_count = digit_count.min(self.capacity);
        if digit_count == 0 {
            return 0;
        }
        let mut offset = 0usize;
        let mut placed = 0usize;
        for slot in &self.slots {
            match slot {
                Slot::Digit => {
                    if placed == index || placed == digit_count {
                        return offset;
                    }
                    placed += 1;
                    offset += 1;
                }
                Slot::Literal(_) => offset += 1,
            }
        }
        offset
    }

    /// Re-derive masked text after an edit.
    ///
    /// `raw` is the text after the host applied the keystroke and `caret` the
    /// char offset the host left the cursor at; `previous` is the digit
    /// sequence before the edit.
    pub fn apply(&self, raw: &str, caret: usize, previous: &str, pending: PendingKey) -> MaskedText {
        let (positions, prefix_end) = self.digit_positions(raw);
        let caret = caret.max(prefix_end);
        let digits_before = positions.iter().filter(|idx| **idx < caret).count();
        let mut digits = self.extract(raw);

        let unchanged = digits == previous;
        let target = match pending {
            PendingKey::Backspace if unchanged => {
                let idx = digits_before.saturating_sub(1);
                if digits_before > 0 && idx < digits.len() {
                    digits.remove(idx);
                }
                idx
            }
            PendingKey::Delete if unchanged => {
                if digits_before < digits.len() {
                    digits.remove(digits_before);
                }
                digits_before
            }
            _ => digits_before,
        };

        let formatted = self.format(&digits);
        let caret = self
            .caret_for_digit(target, digits.chars().count())
            .min(formatted.chars().count());
        MaskedText {
            digits,
            formatted,
            caret,
        }
    }
}

impl Default for MaskTemplate {
    fn default() -> Self {
        Self::parse(DEFAULT_PATTERN)
    }
}

impl fmt::Debug for MaskTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MaskTemplate").field(&self.pattern).finish()
    }
}

impl fmt::Display for MaskTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

impl FromStr for MaskTemplate {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl Serialize for MaskTemplate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.pattern)
    }
}

impl<'de> Deserialize<'de> for MaskTemplate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let pattern = String::deserialize(deserializer)?;
        Ok(Self::parse(&pattern))
    }
}
