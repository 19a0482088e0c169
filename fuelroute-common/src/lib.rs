///! Wire types shared between the fuel route client and its test backends.

mod types;

pub use types::*;
