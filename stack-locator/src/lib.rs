// Copyright 2026 The stack-locator Developers. See the COPYRIGHT
// file at the top-level directory of this distribution.

//! A library for finding out who called a function, by walking the calling
//! thread's stack.
//!
//! Logging facades use this to attribute an event to the application code
//! that emitted it rather than to the facade itself. The entry point is
//! [`StackLocator::instance`], which offers lookups by sentinel class and
//! predicate, by class name and package prefix, by anchor class and by
//! depth, as well as the full chain of classes on the stack.
//!
//! Since Rust has no runtime classes, the class of a frame is the path of
//! the type or module that owns the executing function (see [`symbol`]).
//! [`class_of`] gives the class of a type, to use as a sentinel or anchor.
//!
//! Lookups that find nothing return `None`. Errors are reserved for
//! arguments that can never match, see [`LocatorError`].

mod error;
mod frame;
mod locator;
pub mod symbol;
mod walker;

pub use error::*;
pub use frame::*;
pub use locator::*;
pub use symbol::class_of;
pub use walker::*;
