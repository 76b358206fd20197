pub mod graph;
pub mod render;
pub mod repository;

pub use graph::{ChangeEntry, ChangeRecord, CommitEntry, GraphBuilder};
pub use render::render;
pub use repository::{RangeWalk, Repository};
