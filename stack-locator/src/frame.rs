// Copyright 2026 The stack-locator Developers. See the COPYRIGHT
// file at the top-level directory of this distribution.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::symbol::split_symbol;

/// One activation record of a walked stack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StackFrame {
    /// The program counter location for this frame, or 0 for frames that
    /// were not captured from a live stack.
    pub instruction: u64,
    /// The declaring class of the executing function.
    ///
    /// Empty when the symbol has no path or could not be resolved.
    pub class_name: String,
    /// The name of the executing function, without its class.
    pub method_name: String,
    /// The source file this frame's instruction maps to, if known.
    pub source_file_name: Option<PathBuf>,
    /// The (1-based) source line this frame's instruction maps to, if known.
    pub source_line: Option<u32>,
    /// The (1-based) source column, if known.
    pub source_column: Option<u32>,
}

impl StackFrame {
    pub fn new(class_name: impl Into<String>, method_name: impl Into<String>) -> StackFrame {
        StackFrame {
            instruction: 0,
            class_name: class_name.into(),
            method_name: method_name.into(),
            source_file_name: None,
            source_line: None,
            source_column: None,
        }
    }

    /// Create a frame for a demangled symbol name at `instruction`.
    pub fn from_symbol(instruction: u64, symbol: &str) -> StackFrame {
        let (class_name, method_name) = split_symbol(symbol);
        StackFrame {
            instruction,
            ..StackFrame::new(class_name, method_name)
        }
    }

    /// Set the source file and line this frame represents.
    pub fn with_source(mut self, file: impl Into<PathBuf>, line: u32) -> StackFrame {
        self.source_file_name = Some(file.into());
        self.source_line = Some(line);
        self
    }

    pub fn is_class(&self, class_name: &str) -> bool {
        self.class_name == class_name
    }

    /// Detach the source location of this frame.
    pub fn to_location(&self) -> Location {
        Location {
            class_name: self.class_name.clone(),
            method_name: self.method_name.clone(),
            file: self.source_file_name.clone(),
            line: self.source_line,
            column: self.source_column,
        }
    }
}

impl From<StackFrame> for Location {
    fn from(frame: StackFrame) -> Location {
        Location {
            class_name: frame.class_name,
            method_name: frame.method_name,
            file: frame.source_file_name,
            line: frame.source_line,
            column: frame.source_column,
        }
    }
}

/// The source location of a frame, as recorded in log events.
///
/// Displays as `class::method(file:line)`, or `class::method(Unknown Source)`
/// when no debug information was available.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Location {
    class_name: String,
    method_name: String,
    file: Option<PathBuf>,
    line: Option<u32>,
    column: Option<u32>,
}

impl Location {
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub fn line(&self) -> Option<u32> {
        self.line
    }

    pub fn column(&self) -> Option<u32> {
        self.column
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.class_name.is_empty() {
            write!(f, "{}::", self.class_name)?;
        }
        write!(f, "{}(", self.method_name)?;
        match (&self.file, self.line) {
            (Some(file), Some(line)) => write!(f, "{}:{}", file.display(), line)?,
            (Some(file), None) => write!(f, "{}", file.display())?,
            (None, _) => f.write_str("Unknown Source")?,
        }
        f.write_str(")")
    }
}
