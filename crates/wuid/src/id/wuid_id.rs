use core::fmt;

use crate::id::{Layout, LayoutError};

/// A 64-bit unique number produced by a [`Wuid`] generator, paired with the
/// layout it was composed under.
///
/// The raw value is what callers store and compare; the layout is kept so the
/// epoch can be extracted without guessing whether a section tag is present.
///
/// ```
/// use wuid::{Layout, WuidId};
///
/// let id = WuidId::from_components(Layout::plain(), 5, 1).unwrap();
/// assert_eq!(id.to_raw(), (5 << 36) + 1);
/// assert_eq!(id.epoch(), 5);
/// assert_eq!(id.sequence(), 1);
/// assert_eq!(id.section(), None);
/// ```
///
/// [`Wuid`]: crate::Wuid
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WuidId {
    id: u64,
    layout: Layout,
}

impl WuidId {
    /// Packs the components under `layout`.
    ///
    /// # Errors
    ///
    /// Returns a [`LayoutError`] if `epoch` or `sequence` is too wide.
    pub const fn from_components(
        layout: Layout,
        epoch: u64,
        sequence: u64,
    ) -> Result<Self, LayoutError> {
        match layout.compose(epoch, sequence) {
            Ok(id) => Ok(Self { id, layout }),
            Err(e) => Err(e),
        }
    }

    /// Wraps a raw value previously produced under `layout`.
    pub const fn from_raw(id: u64, layout: Layout) -> Self {
        Self { id, layout }
    }

    pub const fn to_raw(&self) -> u64 {
        self.id
    }

    pub const fn layout(&self) -> Layout {
        self.layout
    }

    /// Extracts the section tag, if the layout reserves one.
    pub const fn section(&self) -> Option<u8> {
        if self.layout.has_section() {
            Some(Layout::decompose_section(self.id))
        } else {
            None
        }
    }

    /// Extracts the epoch from the packed value.
    pub const fn epoch(&self) -> u64 {
        self.layout.decompose_epoch(self.id)
    }

    /// Extracts the sequence number from the packed value.
    pub const fn sequence(&self) -> u64 {
        Layout::decompose_sequence(self.id)
    }

    /// Returns the value as a zero-padded 20-digit string.
    pub fn to_padded_string(&self) -> String {
        format!("{:020}", self.id)
    }
}

impl From<WuidId> for u64 {
    fn from(id: WuidId) -> Self {
        id.id
    }
}

impl fmt::Display for WuidId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Debug for WuidId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "WuidId {{")?;
        writeln!(f, "    raw id     : 0x{:016x} ({})", self.id, self.id)?;
        if let Some(section) = self.section() {
            writeln!(f, "    section (4): {section}")?;
        }
        writeln!(
            f,
            "    epoch ({}): {} (0x{:x})",
            self.layout.epoch_bits(),
            self.epoch(),
            self.epoch()
        )?;
        writeln!(
            f,
            "    sequence (36): {} (0x{:x})",
            self.sequence(),
            self.sequence()
        )?;
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_id_fields_and_bounds() {
        let layout = Layout::plain();
        let id =
            WuidId::from_components(layout, layout.max_epoch(), Layout::max_sequence()).unwrap();
        println!("ID: {id:?}");
        assert_eq!(id.to_raw(), u64::MAX);
        assert_eq!(id.epoch(), layout.max_epoch());
        assert_eq!(id.sequence(), Layout::max_sequence());
        assert_eq!(id.section(), None);
        assert_eq!(WuidId::from_raw(u64::MAX, layout), id);
    }

    #[test]
    fn sectioned_id_fields_and_bounds() {
        let layout = Layout::sectioned(9).unwrap();
        let id = WuidId::from_components(layout, 0x12_3456, 77).unwrap();
        println!("ID: {id:?}");
        assert_eq!(id.section(), Some(9));
        assert_eq!(id.epoch(), 0x12_3456);
        assert_eq!(id.sequence(), 77);
        assert_eq!(u64::from(id) >> 60, 9);
    }

    #[test]
    fn ids_order_by_raw_value() {
        let layout = Layout::plain();
        let a = WuidId::from_components(layout, 5, Layout::max_sequence()).unwrap();
        let b = WuidId::from_components(layout, 6, 0).unwrap();
        assert!(a < b);
        assert_eq!(b.to_padded_string(), format!("{:020}", 6u64 << 36));
        assert_eq!(b.to_string(), (6u64 << 36).to_string());
    }
}
