pub mod batch;
pub mod inspect;
pub mod predict;
