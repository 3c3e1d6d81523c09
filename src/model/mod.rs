pub mod ack;
pub mod category;
pub mod config;
pub mod task;
pub mod view;

pub use ack::*;
pub use category::*;
pub use config::*;
pub use task::*;
pub use view::*;
