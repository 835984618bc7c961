pub mod binder;
pub mod graph;
pub mod locator;
pub mod recorder;
pub mod scheduler;
pub mod scope;
pub mod sync;
