// Copyright 2026 The stack-locator Developers. See the COPYRIGHT
// file at the top-level directory of this distribution.

/// An error caused by calling a [`StackLocator`](crate::StackLocator)
/// operation with arguments that can never describe a frame.
///
/// Both kinds are reported before the stack is captured. A lookup that
/// simply finds nothing is not an error.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LocatorError {
    /// A required class name was empty.
    #[error("{0} cannot be empty")]
    InvalidArgument(&'static str),
    /// A stack depth was negative.
    #[error("stack depth {0} is out of bounds")]
    OutOfBounds(isize),
}
