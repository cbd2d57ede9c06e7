#![deny(unused_must_use)]

#[macro_use]
extern crate log;
#[macro_use]
extern crate async_trait;

pub mod config;
pub mod error;
pub mod format;
pub mod metrics;
pub mod process;

pub mod task;
pub mod table;
pub mod stream;
pub mod store;


pub use config::Config;
pub use error::{Error, Result};
pub use process::{Processor, Record};
pub use stream::{KSink, KStream};
pub use table::join::TableJoin;
pub use table::{Change, View, ViewSupplier};
pub use store::InMemory;
