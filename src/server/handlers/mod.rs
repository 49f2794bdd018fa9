pub mod directions;
pub mod forms;
