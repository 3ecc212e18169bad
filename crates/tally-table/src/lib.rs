// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod filter;
pub mod sort;
pub mod table;
pub mod value;
pub mod window;

pub use filter::*;
pub use sort::*;
pub use table::*;
pub use value::*;
pub use window::*;
