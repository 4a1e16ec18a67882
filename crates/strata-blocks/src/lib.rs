//! Block symbols, the block registry with hierarchy-based overwrite resolution,
//! and slice/column containers shared by the terrain engine and the session.

pub mod registry;
pub mod slice_map;

pub use registry::{BlockDef, BlockRegistry, RegistryError, symbols};
pub use slice_map::{Column, SliceMap, chunk_index, chunk_origin};
