use core::fmt;

/// Number of low-order bits holding the locally incremented sequence.
pub const SEQUENCE_BITS: u32 = 36;

/// Number of bits holding the epoch when no section tag is in use.
pub const EPOCH_BITS: u32 = 28;

/// Number of high-order bits holding the section tag.
pub const SECTION_BITS: u32 = 4;

/// Number of bits holding the epoch once a section tag is in use. The section
/// is carved out of the epoch, the sequence keeps its full width.
pub const SECTIONED_EPOCH_BITS: u32 = EPOCH_BITS - SECTION_BITS;

/// Largest section tag that fits in [`SECTION_BITS`].
pub const MAX_SECTION: u8 = (1 << SECTION_BITS) - 1;

/// Errors raised when a component does not fit its allotted bits.
///
/// Composing a value never truncates. A component that is too wide would
/// silently alias numbers from another epoch or section.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum LayoutError {
    /// The epoch is wider than the epoch field of the layout.
    #[error("epoch {epoch} exceeds the {bits}-bit epoch field (max {max})")]
    EpochOverflow { epoch: u64, bits: u32, max: u64 },

    /// The sequence is wider than [`SEQUENCE_BITS`].
    #[error("sequence {sequence} exceeds the 36-bit sequence field")]
    SequenceOverflow { sequence: u64 },

    /// The section tag is zero or wider than [`SECTION_BITS`].
    #[error("section {section} is outside [1, 15]")]
    SectionOverflow { section: u8 },
}

/// The bit-layout policy for one generator.
///
/// Without a section tag:
///
/// ```text
///  Bit Index:  63             36 35             0
///              +----------------+---------------+
///  Field:      |   epoch (28)   | sequence (36) |
///              +----------------+---------------+
///              |<-- MSB -- 64 bits -- LSB ----->|
/// ```
///
/// With a section tag:
///
/// ```text
///  Bit Index:  63           60 59           36 35             0
///              +--------------+---------------+---------------+
///  Field:      | section (4)  |  epoch (24)   | sequence (36) |
///              +--------------+---------------+---------------+
///              |<----------- MSB -- 64 bits -- LSB ---------->|
/// ```
///
/// # Example
///
/// ```
/// use wuid::Layout;
///
/// let layout = Layout::sectioned(3).unwrap();
/// let raw = layout.compose(5, 7).unwrap();
/// assert_eq!(raw >> 60, 3);
/// assert_eq!(layout.decompose_epoch(raw), 5);
/// assert_eq!(Layout::decompose_sequence(raw), 7);
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Layout {
    section: u8,
}

impl Layout {
    /// Bitmask for extracting the sequence field. Occupies bits 0 through 35.
    pub const SEQUENCE_MASK: u64 = (1 << SEQUENCE_BITS) - 1;

    /// Number of bits to shift the epoch to its correct position (bit 36).
    pub const EPOCH_SHIFT: u32 = SEQUENCE_BITS;

    /// Number of bits to shift the section to its correct position (bit 60).
    pub const SECTION_SHIFT: u32 = SEQUENCE_BITS + SECTIONED_EPOCH_BITS;

    /// The layout without a section tag.
    pub const PLAIN: Self = Self { section: 0 };

    /// Returns the layout without a section tag.
    pub const fn plain() -> Self {
        Self::PLAIN
    }

    /// Returns the layout reserving the top 4 bits for `section`.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::SectionOverflow`] unless `section` is within
    /// `[1, 15]`. Zero is reserved for the plain layout.
    pub const fn sectioned(section: u8) -> Result<Self, LayoutError> {
        if section == 0 || section > MAX_SECTION {
            return Err(LayoutError::SectionOverflow { section });
        }
        Ok(Self { section })
    }

    /// The section tag, or `0` for the plain layout.
    pub const fn section(&self) -> u8 {
        self.section
    }

    pub const fn has_section(&self) -> bool {
        self.section != 0
    }

    /// Width of the epoch field under this layout.
    pub const fn epoch_bits(&self) -> u32 {
        if self.has_section() {
            SECTIONED_EPOCH_BITS
        } else {
            EPOCH_BITS
        }
    }

    /// Largest epoch representable under this layout, also the epoch mask.
    pub const fn max_epoch(&self) -> u64 {
        (1 << self.epoch_bits()) - 1
    }

    /// Largest sequence representable by any layout.
    pub const fn max_sequence() -> u64 {
        Self::SEQUENCE_MASK
    }

    /// Checks that `epoch` fits the epoch field without truncation.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::EpochOverflow`] if it does not.
    pub const fn check_epoch(&self, epoch: u64) -> Result<(), LayoutError> {
        if epoch > self.max_epoch() {
            return Err(LayoutError::EpochOverflow {
                epoch,
                bits: self.epoch_bits(),
                max: self.max_epoch(),
            });
        }
        Ok(())
    }

    /// Packs `epoch` and `sequence` (plus the section tag, if any) into a
    /// single value.
    ///
    /// # Errors
    ///
    /// Fails fast if either component is wider than its field.
    pub const fn compose(&self, epoch: u64, sequence: u64) -> Result<u64, LayoutError> {
        if let Err(e) = self.check_epoch(epoch) {
            return Err(e);
        }
        if sequence > Self::SEQUENCE_MASK {
            return Err(LayoutError::SequenceOverflow { sequence });
        }
        Ok(self.section_prefix() | (epoch << Self::EPOCH_SHIFT) | sequence)
    }

    /// Extracts the epoch field from `value`, ignoring any section tag.
    pub const fn decompose_epoch(&self, value: u64) -> u64 {
        (value >> Self::EPOCH_SHIFT) & self.max_epoch()
    }

    /// Extracts the sequence field from `value`.
    pub const fn decompose_sequence(value: u64) -> u64 {
        value & Self::SEQUENCE_MASK
    }

    /// Extracts the top 4 bits of `value`. Only meaningful for sectioned
    /// layouts.
    pub const fn decompose_section(value: u64) -> u8 {
        (value >> Self::SECTION_SHIFT) as u8
    }

    /// Overwrites the top 4 bits of `value` with this layout's section.
    ///
    /// A counter that ran past the largest epoch carries into the section
    /// bits; this keeps every handed-out number in its own section. The plain
    /// layout returns `value` unchanged.
    pub const fn apply_section(&self, value: u64) -> u64 {
        if !self.has_section() {
            return value;
        }
        let section_mask = (MAX_SECTION as u64) << Self::SECTION_SHIFT;
        (value & !section_mask) | self.section_prefix()
    }

    const fn section_prefix(&self) -> u64 {
        (self.section as u64) << Self::SECTION_SHIFT
    }
}

impl fmt::Debug for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_section() {
            write!(
                f,
                "Layout {{ section (4): {}, epoch ({}), sequence ({}) }}",
                self.section,
                self.epoch_bits(),
                SEQUENCE_BITS
            )
        } else {
            write!(
                f,
                "Layout {{ epoch ({}), sequence ({}) }}",
                self.epoch_bits(),
                SEQUENCE_BITS
            )
        }
    }
}

/// Packs `epoch` and `sequence` for the given section (`0` for none).
///
/// # Errors
///
/// Returns a [`LayoutError`] if the section is above 15 or a component does
/// not fit its field.
pub const fn compose(epoch: u64, sequence: u64, section: u8) -> Result<u64, LayoutError> {
    let layout = if section == 0 {
        Layout::PLAIN
    } else {
        match Layout::sectioned(section) {
            Ok(layout) => layout,
            Err(e) => return Err(e),
        }
    };
    layout.compose(epoch, sequence)
}

/// Extracts the epoch of `value` for the given section (`0` for none).
///
/// Only the presence of a section matters here: any non-zero `section`
/// selects the 24-bit epoch field, without a range check.
pub const fn decompose_epoch(value: u64, section: u8) -> u64 {
    let layout = if section == 0 {
        Layout::PLAIN
    } else {
        // The value is never composed, so the tag itself is irrelevant.
        Layout { section: 1 }
    };
    layout.decompose_epoch(value)
}
