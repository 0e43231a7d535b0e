//! GPU picking support: the 16-bit id pool and pixel decoding.
//!
//! Each pickable vertex carries an id assigned from an [`IdRange`]. The
//! selection pass renders those ids into an offscreen target; reading back
//! the pixel under the cursor and passing it through [`resolve_pixel`]
//! recovers the atom, residue or bond that produced it.

mod id_pool;
mod pick_map;

pub use id_pool::{IdPool, IdPoolHandle, IdRange, PoolStats, MAX_IDS};
pub use pick_map::{
    decode_pick_pixel, encode_pick_pixel, pick_symmetry_index, resolve_pixel,
    PickResult, PickTarget, MAX_PICK_SYMMETRY_INDEX,
};
