// SPDX-License-Identifier: MIT

pub mod condition;
pub mod impact;
pub mod loader;
pub mod selections;
pub mod tree;
