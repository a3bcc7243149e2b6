// Copyright 2026 The stack-locator Developers. See the COPYRIGHT
// file at the top-level directory of this distribution.

//! Synthetic call stacks for testing
//!
//! This exists primarily as an internal dev-dependency of stack-locator. Live
//! stacks depend on the compiler's inlining decisions and on the test
//! harness, so most lookups are tested against a [SynthStack][] instead.
//!
//! Basic usage is to create a [SynthStack][] and push calls onto it
//! outermost first, the way a program would make them. The stack then walks
//! innermost first like a live one.

use std::sync::atomic::{AtomicUsize, Ordering};

use stack_locator::{FrameSource, StackFrame};

/// A call stack built by hand.
#[derive(Debug, Default)]
pub struct SynthStack {
    /// Frames, outermost first.
    frames: Vec<StackFrame>,
    /// How many frames the last walk consumed.
    pulled: AtomicUsize,
}

impl SynthStack {
    pub fn new() -> SynthStack {
        Default::default()
    }

    /// Push a call to `class::method`, at a made-up source location.
    pub fn call(self, class: &str, method: &str) -> SynthStack {
        let line = 10 * (self.frames.len() as u32 + 1);
        let file = format!("{}.rs", class.replace("::", "/"));
        self.call_at(class, method, &file, line)
    }

    /// Push a call to `class::method` at `file:line`.
    pub fn call_at(mut self, class: &str, method: &str, file: &str, line: u32) -> SynthStack {
        let mut frame = StackFrame::new(class, method).with_source(file, line);
        frame.instruction = 0x1000 + 0x10 * self.frames.len() as u64;
        self.frames.push(frame);
        self
    }

    /// Repeat the innermost call `times` more times.
    pub fn recurse(mut self, times: usize) -> SynthStack {
        if let Some(last) = self.frames.last().cloned() {
            for _ in 0..times {
                let mut frame = last.clone();
                frame.instruction = 0x1000 + 0x10 * self.frames.len() as u64;
                self.frames.push(frame);
            }
        }
        self
    }

    /// The frames as a walk yields them, innermost first.
    pub fn frames(&self) -> Vec<StackFrame> {
        self.frames.iter().rev().cloned().collect()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// The number of frames the most recent walk consumed.
    pub fn frames_pulled(&self) -> usize {
        self.pulled.load(Ordering::SeqCst)
    }
}

impl FrameSource for SynthStack {
    fn walk<R, F>(&self, visit: F) -> R
    where
        F: FnOnce(&mut dyn Iterator<Item = StackFrame>) -> R,
    {
        self.pulled.store(0, Ordering::SeqCst);
        let pulled = &self.pulled;
        let mut frames = self.frames.iter().rev().cloned().inspect(|_| {
            pulled.fetch_add(1, Ordering::SeqCst);
        });
        visit(&mut frames)
    }
}
