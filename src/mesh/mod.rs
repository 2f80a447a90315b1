pub mod traits;

pub use traits::{CellId, MeshSource, VertexId};
