pub mod diff;
pub mod show;
pub mod sync;
pub mod validate;
