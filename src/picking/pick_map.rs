//! Typed pick-target resolution from read-back selection pixels.

use super::id_pool::IdPoolHandle;

/// The domain object a picking id was assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PickTarget {
    /// A single atom, by index into its structure's atom table.
    Atom {
        /// Owning structure id.
        structure: u32,
        /// Atom index.
        atom: u32,
    },
    /// A residue, by index into its structure's residue table.
    Residue {
        /// Owning structure id.
        structure: u32,
        /// Residue index.
        residue: u32,
    },
    /// A bond between two atoms of the same structure.
    Bond {
        /// Owning structure id.
        structure: u32,
        /// Atom indices of the two bond partners.
        atoms: [u32; 2],
    },
}

impl PickTarget {
    /// Structure the target belongs to.
    pub fn structure(&self) -> u32 {
        match *self {
            Self::Atom { structure, .. }
            | Self::Residue { structure, .. }
            | Self::Bond { structure, .. } => structure,
        }
    }
}

/// A decoded selection-pass pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickResult {
    /// Picking id written by the fragment.
    pub id: u16,
    /// Index of the symmetry transform the fragment was drawn with (0 for
    /// the asymmetric unit).
    pub symmetry_index: u8,
}

/// Largest symmetry index a selection pixel can carry. Copies past it all
/// read back as this index.
pub const MAX_PICK_SYMMETRY_INDEX: u8 = u8::MAX;

/// Symmetry index as written by the selection pass, saturating at
/// [`MAX_PICK_SYMMETRY_INDEX`].
#[must_use]
pub fn pick_symmetry_index(symmetry_index: u32) -> u8 {
    u8::try_from(symmetry_index).unwrap_or(MAX_PICK_SYMMETRY_INDEX)
}

/// Encode an id and symmetry index the way the selection shader writes
/// them: `[id & 0xff, id >> 8, symmetry_index, 255]`.
pub fn encode_pick_pixel(id: u16, symmetry_index: u8) -> [u8; 4] {
    let [lo, hi] = id.to_le_bytes();
    [lo, hi, symmetry_index, u8::MAX]
}

/// Decode a read-back RGBA pixel. Alpha `0` means nothing was drawn there.
pub fn decode_pick_pixel(pixel: [u8; 4]) -> Option<PickResult> {
    let [lo, hi, symmetry_index, alpha] = pixel;
    if alpha == 0 {
        return None;
    }
    Some(PickResult {
        id: u16::from_le_bytes([lo, hi]),
        symmetry_index,
    })
}

/// Resolve a read-back pixel straight to its owning object.
///
/// Returns `None` for background pixels and for ids that are no longer
/// assigned (their geometry was destroyed since the pixel was rendered).
pub fn resolve_pixel(
    pool: &IdPoolHandle,
    pixel: [u8; 4],
) -> Option<(PickTarget, u8)> {
    let hit = decode_pick_pixel(pixel)?;
    pool.lookup(hit.id).map(|target| (target, hit.symmetry_index))
}
