pub mod storage;
pub mod types;

pub use storage::{get_selection_path, load_selection, save_selection};
pub use types::SelectionState;
