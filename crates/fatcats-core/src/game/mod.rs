pub mod action;
pub mod env;
pub mod episode;
pub mod observation;
pub mod summary;
