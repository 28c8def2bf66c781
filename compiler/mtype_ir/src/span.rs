//! Source spans and file descriptors.

use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A half-open byte range `[start, end)` into a file's retained contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end, "span start must not exceed end");
        Self { start, end }
    }

    pub fn len(self) -> u32 {
        self.end - self.start
    }

    pub fn is_empty(self) -> bool {
        self.start == self.end
    }
}

/// Identifies a source file for diagnostics. `<anonymous>` is used for
/// synthetic tokens manufactured for root identifiers (see
/// `mtype_pipeline::pre_import`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CodeFileDescriptor {
    pub path: PathBuf,
}

impl CodeFileDescriptor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn anonymous() -> Self {
        Self::new("<anonymous>")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// The retained contents of a scanned file, shared cheaply between the
/// tokens that slice into it and the `TokenSourceMap` used for error
/// rendering.
#[derive(Debug, Clone)]
pub struct SourceText(Arc<str>);

impl SourceText {
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn slice(&self, span: Span) -> &str {
        &self.0[span.start as usize..span.end as usize]
    }
}
