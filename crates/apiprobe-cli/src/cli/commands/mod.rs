pub mod dispatch;
pub(crate) mod list;
pub(crate) mod run;

pub use dispatch::dispatch;
