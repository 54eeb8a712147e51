pub mod gray;
pub mod map;
pub mod tree;

pub use gray::gray_code;
pub use map::{split_inputs, KarnaughMap};
pub use tree::{Node, OutputTree, OutputTrees};
