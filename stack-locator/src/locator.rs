// Copyright 2026 The stack-locator Developers. See the COPYRIGHT
// file at the top-level directory of this distribution.

//! Caller lookups over a stack.
//!
//! Every lookup is a chain of skip-while rules over the frames of a
//! [`FrameSource`], innermost first. The rules are written so that a class
//! occurring several times in a row (recursion, overloads calling each other,
//! a facade forwarding to itself) is skipped as a whole.

use tracing::trace;

use crate::error::LocatorError;
use crate::frame::{Location, StackFrame};
use crate::symbol::class_of;
use crate::walker::{FrameSource, StackWalker, WalkOptions};

pub(crate) const LOCATOR_CLASS: &str = concat!(module_path!(), "::StackLocator");

static INSTANCE: StackLocator = StackLocator::with_walkers(
    StackWalker::new(WalkOptions::CLASSES),
    StackWalker::new(WalkOptions::LOCATIONS),
);

/// Determines the caller of a function from the call stack.
///
/// The process-wide locator walks the calling thread's live stack:
///
/// ```
/// use stack_locator::StackLocator;
///
/// struct App;
///
/// impl App {
///     #[inline(never)]
///     fn run() -> Option<String> {
///         StackLocator::instance().caller_class_at(0).unwrap()
///     }
/// }
///
/// let class = App::run().unwrap();
/// assert!(class.ends_with("App"));
/// ```
///
/// Locators over other [`FrameSource`]s, such as a captured
/// [`Snapshot`](crate::Snapshot) or a list of frames, run the same lookups
/// against those frames.
#[derive(Clone, Debug)]
pub struct StackLocator<S = StackWalker> {
    /// Walks used for class lookups.
    classes: S,
    /// Walks used for lookups that return a [`Location`].
    locations: S,
}

impl StackLocator {
    /// The process-wide locator over the live stack.
    pub fn instance() -> &'static StackLocator {
        &INSTANCE
    }
}

impl<S> StackLocator<S> {
    pub const fn with_walkers(classes: S, locations: S) -> StackLocator<S> {
        StackLocator { classes, locations }
    }
}

impl<S: FrameSource + Clone> StackLocator<S> {
    /// A locator whose class and location lookups walk the same source.
    pub fn from_source(source: S) -> StackLocator<S> {
        StackLocator::with_walkers(source.clone(), source)
    }
}

impl<S: FrameSource> StackLocator<S> {
    /// Find the first caller below `sentinel` whose class satisfies
    /// `predicate`.
    ///
    /// Frames are skipped until `sentinel` is found, then for as long as they
    /// are still `sentinel` or fail `predicate`. The result is never the
    /// sentinel itself.
    ///
    /// Fails with [`LocatorError::InvalidArgument`] if `sentinel` is empty.
    pub fn caller_class<P>(
        &self,
        sentinel: &str,
        predicate: P,
    ) -> Result<Option<String>, LocatorError>
    where
        P: Fn(&str) -> bool,
    {
        if sentinel.is_empty() {
            return Err(LocatorError::InvalidArgument("sentinel class"));
        }
        Ok(self.find_after_sentinel(sentinel, predicate))
    }

    /// [`caller_class`](Self::caller_class) with the class of `T` as the
    /// sentinel.
    pub fn caller_class_of<T: ?Sized, P>(&self, predicate: P) -> Option<String>
    where
        P: Fn(&str) -> bool,
    {
        self.find_after_sentinel(&class_of::<T>(), predicate)
    }

    fn find_after_sentinel<P>(&self, sentinel: &str, predicate: P) -> Option<String>
    where
        P: Fn(&str) -> bool,
    {
        let caller = self.classes.walk(|frames| {
            frames
                .map(|frame| frame.class_name)
                .skip_while(|class| class != sentinel)
                .find(|class| class != sentinel && predicate(class))
        });
        trace!("caller below sentinel {}: {:?}", sentinel, caller);
        caller
    }

    /// Find the first caller of `fqcn` whose class starts with `pkg`.
    ///
    /// Frames are skipped until a frame of `fqcn` is found, then while they
    /// are still `fqcn`, then until one's class starts with `pkg`. An empty
    /// `pkg` accepts the first frame after `fqcn`.
    pub fn caller_class_in_package(&self, fqcn: &str, pkg: &str) -> Option<String> {
        let caller = self.classes.walk(|frames| {
            frames
                .map(|frame| frame.class_name)
                .skip_while(|class| class != fqcn)
                .skip_while(|class| class == fqcn)
                .find(|class| class.starts_with(pkg))
        });
        trace!("caller of {} in package {:?}: {:?}", fqcn, pkg, caller);
        caller
    }

    /// The class of the first frame after the frames of `fqcn`.
    pub fn caller_class_after(&self, fqcn: &str) -> Option<String> {
        self.caller_class_in_package(fqcn, "")
    }

    /// The class of the frame that called into `anchor`.
    ///
    /// When `anchor` recurses, this is the caller of the outermost
    /// consecutive `anchor` frame.
    pub fn caller_class_by_anchor(&self, anchor: &str) -> Option<String> {
        self.classes.walk(|frames| {
            frames
                .skip_while(|frame| !frame.is_class(anchor))
                .find(|frame| !frame.is_class(anchor))
                .map(|frame| frame.class_name)
        })
    }

    /// [`caller_class_by_anchor`](Self::caller_class_by_anchor) with the
    /// class of `T` as the anchor.
    pub fn caller_of<T: ?Sized>(&self) -> Option<String> {
        self.caller_class_by_anchor(&class_of::<T>())
    }

    /// The class of the frame `depth` frames below the caller.
    ///
    /// Depth 0 is the function calling this method. Returns `Ok(None)` if
    /// the stack is not that deep, and fails with
    /// [`LocatorError::OutOfBounds`] if `depth` is negative.
    pub fn caller_class_at(&self, depth: isize) -> Result<Option<String>, LocatorError> {
        let depth = usize::try_from(depth).map_err(|_| LocatorError::OutOfBounds(depth))?;
        Ok(self.frame_at(&self.classes, depth).map(|frame| frame.class_name))
    }

    /// The declaring classes of every frame, starting with the caller.
    pub fn current_stack_trace(&self) -> Vec<String> {
        self.classes
            .walk(|frames| frames.map(|frame| frame.class_name).collect())
    }

    /// The location of the frame that called into the logging facade
    /// `fqcn_of_logger`.
    ///
    /// Nested facade frames are skipped, so a facade method that forwards to
    /// another facade method still reports the application frame.
    pub fn calc_location(&self, fqcn_of_logger: &str) -> Option<Location> {
        let location = self.locations.walk(|frames| {
            frames
                .skip_while(|frame| !frame.is_class(fqcn_of_logger))
                .find(|frame| !frame.is_class(fqcn_of_logger))
                .map(Location::from)
        });
        if location.is_none() {
            trace!("no caller of {} on the stack", fqcn_of_logger);
        }
        location
    }

    /// The location of the frame `depth` frames below the caller.
    ///
    /// Negative depths fail with [`LocatorError::OutOfBounds`], like
    /// [`caller_class_at`](Self::caller_class_at).
    pub fn stack_trace_element(&self, depth: isize) -> Result<Option<Location>, LocatorError> {
        let depth = usize::try_from(depth).map_err(|_| LocatorError::OutOfBounds(depth))?;
        Ok(self.frame_at(&self.locations, depth).map(Location::from))
    }

    fn frame_at(&self, source: &S, depth: usize) -> Option<StackFrame> {
        source.walk(|frames| frames.skip(depth).next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack(classes: &[&str]) -> StackLocator<Vec<StackFrame>> {
        let frames = classes
            .iter()
            .enumerate()
            .map(|(i, class)| {
                StackFrame::new(*class, format!("m{}", i)).with_source("lib.rs", i as u32 + 1)
            })
            .collect();
        StackLocator::from_source(frames)
    }

    #[test]
    fn test_sentinel_skips_recursion() {
        let locator = stack(&["Impl", "Sentinel", "Sentinel", "Sentinel", "Helper", "App", "Main"]);
        assert_eq!(
            locator.caller_class("Sentinel", |_| true).unwrap().as_deref(),
            Some("Helper")
        );
        assert_eq!(
            locator.caller_class("Sentinel", |c| c == "App").unwrap().as_deref(),
            Some("App")
        );
        // The predicate is never offered the sentinel, and "Impl" is above it.
        assert_eq!(
            locator.caller_class("Sentinel", |c| c == "Impl" || c == "Sentinel").unwrap(),
            None
        );
    }

    #[test]
    fn test_empty_sentinel_is_invalid() {
        let locator = stack(&["App"]);
        assert_eq!(
            locator.caller_class("", |_| true),
            Err(LocatorError::InvalidArgument("sentinel class"))
        );
    }

    #[test]
    fn test_package_prefix() {
        let locator = stack(&["Log", "Log", "lib::Wrap", "app::Work", "Main"]);
        assert_eq!(locator.caller_class_in_package("Log", "app::").as_deref(), Some("app::Work"));
        assert_eq!(locator.caller_class_in_package("Log", "").as_deref(), Some("lib::Wrap"));
        assert_eq!(locator.caller_class_after("Log").as_deref(), Some("lib::Wrap"));
        assert_eq!(locator.caller_class_in_package("Log", "none::"), None);
        assert_eq!(locator.caller_class_in_package("Missing", ""), None);
    }

    #[test]
    fn test_depth() {
        let locator = stack(&["A", "B", "C"]);
        assert_eq!(locator.caller_class_at(0).unwrap().as_deref(), Some("A"));
        assert_eq!(locator.caller_class_at(2).unwrap().as_deref(), Some("C"));
        assert_eq!(locator.caller_class_at(3).unwrap(), None);
        assert_eq!(locator.caller_class_at(-1), Err(LocatorError::OutOfBounds(-1)));

        let element = locator.stack_trace_element(1).unwrap().unwrap();
        assert_eq!(element.to_string(), "B::m1(lib.rs:2)");
        assert_eq!(
            locator.stack_trace_element(-3),
            Err(LocatorError::OutOfBounds(-3))
        );
    }

    #[test]
    fn test_location_class_identity() {
        assert!(LOCATOR_CLASS.ends_with("locator::StackLocator"));
        assert_eq!(class_of::<StackLocator>(), LOCATOR_CLASS);
    }
}
