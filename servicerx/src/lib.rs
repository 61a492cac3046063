mod action;
mod action_creator;
mod bind;
mod select;
mod service;
mod store;

pub use action::*;
pub use action_creator::*;
pub use bind::*;
pub use select::*;
pub use service::*;
pub use store::*;
