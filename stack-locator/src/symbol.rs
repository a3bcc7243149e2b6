// Copyright 2026 The stack-locator Developers. See the COPYRIGHT
// file at the top-level directory of this distribution.

//! Mapping of demangled symbols onto a declaring class and a method.
//!
//! Rust has no runtime classes, so the "class" of a frame is the path of the
//! item that owns the executing function: the type for methods, the module
//! for free functions. Generic arguments are erased, closures and shims are
//! folded into the function that contains them, and `<Type as Trait>::method`
//! is attributed to `Type`.
//!
//! | symbol                                       | class                 | method      |
//! |----------------------------------------------|-----------------------|-------------|
//! | `app::worker::Worker::run`                   | `app::worker::Worker` | `run`       |
//! | `app::worker::do_work`                       | `app::worker`         | `do_work`   |
//! | `<app::Sink as core::fmt::Write>::write_str` | `app::Sink`           | `write_str` |
//! | `app::Worker::run::{{closure}}`              | `app::Worker`         | `run`       |
//! | `<app::Pool<u8>>::spawn::<u8>`               | `app::Pool`           | `spawn`     |
//! | `_Unwind_Backtrace`                          | (empty)               | `_Unwind_Backtrace` |
//! | `<fn() as core::ops::FnOnce<()>>::call_once` | (empty)               | `call_once` |
//!
//! Types that are not paths (function pointers, tuples, slices, arrays) have
//! no class.

use std::any;

/// Split a demangled symbol into its declaring class and method name.
///
/// A symbol without a path (`_start`, `_Unwind_Backtrace`) has an empty
/// class.
pub fn split_symbol(symbol: &str) -> (String, String) {
    let mut segments = path_segments(strip_hash(symbol.trim()));
    let method = segments.pop().unwrap_or_default();
    (segments.join("::"), method)
}

/// Normalize a type or module path the same way [`split_symbol`] normalizes
/// the class part of a symbol.
pub fn normalize_class(path: &str) -> String {
    path_segments(path.trim()).join("::")
}

/// The class name frames of `T`'s methods are attributed to.
///
/// ```
/// use stack_locator::class_of;
///
/// assert_eq!(class_of::<String>(), "alloc::string::String");
/// assert_eq!(class_of::<Vec<u8>>(), "alloc::vec::Vec");
/// ```
pub fn class_of<T: ?Sized>() -> String {
    normalize_class(any::type_name::<T>())
}

/// Legacy mangling leaves a `::h0123456789abcdef` hash on the last segment.
fn strip_hash(symbol: &str) -> &str {
    match symbol.rsplit_once("::") {
        Some((head, tail))
            if tail.len() == 17
                && tail.starts_with('h')
                && tail[1..].bytes().all(|b| b.is_ascii_hexdigit()) =>
        {
            head
        }
        _ => symbol,
    }
}

fn strip_indirection(mut path: &str) -> &str {
    loop {
        let next = path
            .trim_start_matches('&')
            .trim_start_matches("mut ")
            .trim_start_matches("*const ")
            .trim_start_matches("*mut ")
            .trim_start_matches("dyn ")
            .trim_start();
        if next.len() == path.len() {
            return path;
        }
        path = next;
    }
}

fn path_segments(path: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let path = strip_indirection(path);
    if !is_path(path) {
        return segments;
    }
    for (index, raw) in split_top_level(path).into_iter().enumerate() {
        let raw = raw.trim();
        // `{{closure}}`, `{closure#0}`, `{shim:vtable#0}`
        if raw.is_empty() || raw.starts_with('{') {
            continue;
        }
        if raw.starts_with('<') {
            if index == 0 {
                segments.extend(path_segments(qualified_self(raw)));
            }
            // Anything else is a turbofish or an `<impl ...>` block.
            continue;
        }
        segments.push(erase_generics(raw).to_owned());
    }
    segments
}

fn is_path(path: &str) -> bool {
    let named = path.starts_with(|c: char| c == '<' || c == '_' || c.is_alphabetic());
    named
        && !["fn(", "fn (", "unsafe ", "extern ", "for<", "impl "]
            .iter()
            .any(|keyword| path.starts_with(keyword))
}

/// Split `path` on `::` separators that are not nested in brackets.
fn split_top_level(path: &str) -> Vec<&str> {
    let bytes = path.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'<' | b'(' | b'[' | b'{' => depth += 1,
            b'>' if i > 0 && bytes[i - 1] == b'-' => {}
            b'>' | b')' | b']' | b'}' => depth = depth.saturating_sub(1),
            b':' if depth == 0 && bytes.get(i + 1) == Some(&b':') => {
                parts.push(&path[start..i]);
                i += 2;
                start = i;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    parts.push(&path[start..]);
    parts
}

/// `<Type as Trait>` and `<Type>` both name `Type`.
fn qualified_self(segment: &str) -> &str {
    let inner = segment.strip_prefix('<').unwrap_or(segment);
    let inner = inner.strip_suffix('>').unwrap_or(inner);
    let bytes = inner.as_bytes();
    let mut depth = 0usize;
    for i in 0..bytes.len() {
        match bytes[i] {
            b'<' | b'(' | b'[' | b'{' => depth += 1,
            b'>' if i > 0 && bytes[i - 1] == b'-' => {}
            b'>' | b')' | b']' | b'}' => depth = depth.saturating_sub(1),
            b' ' if depth == 0 && inner[i..].starts_with(" as ") => return &inner[..i],
            _ => {}
        }
    }
    inner
}

fn erase_generics(segment: &str) -> &str {
    segment.find('<').map_or(segment, |i| &segment[..i])
}
