// Copyright 2026 The stack-locator Developers. See the COPYRIGHT
// file at the top-level directory of this distribution.

//! Walk the current thread's stack.
//!
//! Capturing is split in two steps. [`StackWalker::capture`] records the raw
//! instruction pointers of every frame, which is cheap and releases the
//! unwinder before any matching happens. Iterating the resulting [`Snapshot`]
//! then resolves symbols one frame at a time, so a lookup that matches near
//! the top of the stack never pays for symbolizing the rest of it.

use std::collections::VecDeque;
use std::path::Path;
use std::slice;

use tracing::{trace, warn};

use crate::frame::StackFrame;
use crate::locator::LOCATOR_CLASS;

const WALKER_MODULE: &str = module_path!();
/// Any `FrameSource::walk`, including the blanket impl for references whose
/// symbol names no concrete type.
const FRAME_SOURCE_IMPL: &str = concat!(" as ", module_path!(), "::FrameSource>::walk");

/// Something that can produce the frames of a stack, innermost first.
pub trait FrameSource {
    /// Walk the stack, handing a lazily produced sequence of frames to
    /// `visit`.
    ///
    /// Frame 0 is the caller of the operation that started the walk.
    /// `visit` may stop consuming at any point.
    fn walk<R, F>(&self, visit: F) -> R
    where
        F: FnOnce(&mut dyn Iterator<Item = StackFrame>) -> R;
}

impl FrameSource for [StackFrame] {
    fn walk<R, F>(&self, visit: F) -> R
    where
        F: FnOnce(&mut dyn Iterator<Item = StackFrame>) -> R,
    {
        visit(&mut self.iter().cloned())
    }
}

impl FrameSource for Vec<StackFrame> {
    fn walk<R, F>(&self, visit: F) -> R
    where
        F: FnOnce(&mut dyn Iterator<Item = StackFrame>) -> R,
    {
        self.as_slice().walk(visit)
    }
}

impl<T: FrameSource + ?Sized> FrameSource for &T {
    fn walk<R, F>(&self, visit: F) -> R
    where
        F: FnOnce(&mut dyn Iterator<Item = StackFrame>) -> R,
    {
        (**self).walk(visit)
    }
}

/// Options controlling what a [`StackWalker`] resolves for each frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WalkOptions {
    /// Resolve source file, line and column for each frame.
    ///
    /// Lookups that only care about classes leave this off and skip the
    /// allocation of a path per frame.
    pub retain_locations: bool,
}

impl WalkOptions {
    /// Resolve classes and methods only.
    pub const CLASSES: WalkOptions = WalkOptions {
        retain_locations: false,
    };
    /// Resolve classes, methods and source locations.
    pub const LOCATIONS: WalkOptions = WalkOptions {
        retain_locations: true,
    };
}

impl Default for WalkOptions {
    fn default() -> WalkOptions {
        WalkOptions::LOCATIONS
    }
}

/// A [`FrameSource`] over the calling thread's live stack.
#[derive(Clone, Copy, Debug)]
pub struct StackWalker {
    options: WalkOptions,
}

impl StackWalker {
    pub const fn new(options: WalkOptions) -> StackWalker {
        StackWalker { options }
    }

    /// Capture the calling thread's stack.
    ///
    /// The returned snapshot starts at the function that called `capture`,
    /// or at the function that called into the [`StackLocator`] when the
    /// capture happens on its behalf.
    ///
    /// [`StackLocator`]: crate::StackLocator
    #[inline(never)]
    pub fn capture(&self) -> Snapshot {
        let mut raw = Vec::new();
        backtrace::trace(|frame| {
            raw.push(frame.clone());
            true
        });
        let mut snapshot = Snapshot {
            raw,
            options: self.options,
            origin: 0,
        };
        snapshot.origin = snapshot.find_origin();
        trace!(
            "captured {} frames, walk starts at frame {}",
            snapshot.raw.len(),
            snapshot.origin
        );
        snapshot
    }
}

impl Default for StackWalker {
    fn default() -> StackWalker {
        StackWalker::new(WalkOptions::default())
    }
}

impl FrameSource for StackWalker {
    fn walk<R, F>(&self, visit: F) -> R
    where
        F: FnOnce(&mut dyn Iterator<Item = StackFrame>) -> R,
    {
        let snapshot = self.capture();
        let result = visit(&mut snapshot.frames());
        result
    }
}

/// The raw frames of one stack capture.
///
/// A snapshot never changes after capture. Every call to
/// [`frames`](Snapshot::frames) starts a fresh walk from the top.
#[derive(Clone, Debug)]
pub struct Snapshot {
    raw: Vec<backtrace::Frame>,
    options: WalkOptions,
    /// Number of resolved frames that belong to the capture itself.
    origin: usize,
}

impl Snapshot {
    /// The frames of this snapshot, innermost first, resolved as they are
    /// consumed.
    pub fn frames(&self) -> impl Iterator<Item = StackFrame> + '_ {
        self.resolve(self.options.retain_locations)
            .map(|resolved| resolved.frame)
            .skip(self.origin)
    }

    fn resolve(&self, retain_locations: bool) -> Resolved<'_> {
        Resolved {
            raw: self.raw.iter(),
            pending: VecDeque::new(),
            retain_locations,
        }
    }

    /// Find the first frame past the capture machinery: the unwinder, the
    /// `backtrace` crate, this module and the locator.
    fn find_origin(&self) -> usize {
        let mut frames = self.resolve(false).enumerate();
        if !frames.any(|(_, resolved)| is_walker_frame(&resolved)) {
            warn!("capture frame not found in stack, walking from the top");
            return 0;
        }
        frames
            .find(|(_, resolved)| !is_capture_machinery(resolved))
            .map_or(usize::MAX, |(index, _)| index)
    }
}

impl FrameSource for Snapshot {
    fn walk<R, F>(&self, visit: F) -> R
    where
        F: FnOnce(&mut dyn Iterator<Item = StackFrame>) -> R,
    {
        visit(&mut self.frames())
    }
}

fn is_walker_frame(resolved: &ResolvedFrame) -> bool {
    let class = resolved.frame.class_name.as_str();
    class == LOCATOR_CLASS
        || class
            .strip_prefix(WALKER_MODULE)
            .map_or(false, |rest| rest.is_empty() || rest.starts_with("::"))
        || resolved.symbol.contains(FRAME_SOURCE_IMPL)
}

fn is_capture_machinery(resolved: &ResolvedFrame) -> bool {
    let class = resolved.frame.class_name.as_str();
    is_walker_frame(resolved)
        || class.is_empty()
        || class.starts_with("backtrace::")
        || class.starts_with("core::ops::function")
}

/// A frame along with the demangled symbol it was resolved from.
struct ResolvedFrame {
    symbol: String,
    frame: StackFrame,
}

/// Resolves raw frames lazily. Inlined functions become frames of their own,
/// innermost first.
struct Resolved<'a> {
    raw: slice::Iter<'a, backtrace::Frame>,
    pending: VecDeque<ResolvedFrame>,
    retain_locations: bool,
}

impl Iterator for Resolved<'_> {
    type Item = ResolvedFrame;

    fn next(&mut self) -> Option<ResolvedFrame> {
        loop {
            if let Some(frame) = self.pending.pop_front() {
                return Some(frame);
            }
            let raw = self.raw.next()?;
            let instruction = raw.ip() as usize as u64;
            let retain_locations = self.retain_locations;
            let pending = &mut self.pending;
            backtrace::resolve_frame(raw, |symbol| {
                let name = symbol
                    .name()
                    .map(|name| format!("{:#}", name))
                    .unwrap_or_default();
                let mut frame = StackFrame::from_symbol(instruction, &name);
                if retain_locations {
                    frame.source_file_name = symbol.filename().map(Path::to_path_buf);
                    frame.source_line = symbol.lineno();
                    frame.source_column = symbol.colno();
                }
                pending.push_back(ResolvedFrame {
                    symbol: name,
                    frame,
                });
            });
            if self.pending.is_empty() {
                // Unresolvable frames still count towards depth.
                self.pending.push_back(ResolvedFrame {
                    symbol: String::new(),
                    frame: StackFrame::from_symbol(instruction, ""),
                });
            }
        }
    }
}
