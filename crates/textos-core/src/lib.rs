#![warn(missing_docs)]
//! Textos Core - Headless Paginated Editor Kernel
//!
//! # Overview
//!
//! `textos-core` splits a plain-text document into fixed-size A4 pages and keeps the document,
//! the pages and the caret consistent while the user edits any page. It does not render; the host
//! draws pages, optionally measures them, and feeds edits, keys and measurements back in.
//!
//! # Core Features
//!
//! - **Width estimation**: pluggable [`TextMeasurer`] with a fixed-ratio fallback
//! - **Pagination**: greedy line-based page breaking, lossless (`pages.join("\n") == text`)
//! - **Offset mapping**: absolute caret offset ⇄ (page, local offset)
//! - **Page-boundary editing**: backspace/delete merges and arrow navigation across pages
//! - **Overflow reconciliation**: re-paginate when a rendered page is taller than its content box
//! - **Session**: file workflow, dirty tracking, search, character count and settings
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Session (file workflow, search, settings)  │  ← Application API
//! ├─────────────────────────────────────────────┤
//! │  PagedEditor (events, idle queue)           │  ← Surface API
//! ├─────────────────────────────────────────────┤
//! │  Boundary editing & Overflow reconciler     │  ← Edit Handling
//! ├─────────────────────────────────────────────┤
//! │  Paginator & Offset mapper                  │  ← Page Layout
//! ├─────────────────────────────────────────────┤
//! │  Width estimator & Page geometry            │  ← Text Metrics
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use textos_core::{FormattingSettings, paginate};
//!
//! // Two 24px lines fit in a 48px content box.
//! let pages = paginate("Line1\nLine2\nLine3", &FormattingSettings::default(), 48.0);
//! assert_eq!(pages, vec!["Line1\nLine2", "Line3"]);
//! assert_eq!(pages.join("\n"), "Line1\nLine2\nLine3");
//! ```
//!
//! # Module Description
//!
//! - [`geometry`] - A4 page constants and scroll helpers
//! - [`formatting`] - font, colors and line height
//! - [`measure`] - text width estimation
//! - [`paginate`] - page breaking
//! - [`offsets`] - absolute/page-local offset mapping
//! - [`boundary`] - edits and keys at page boundaries
//! - [`reconcile`] - overflow detection state machine
//! - [`surface`] - the paged editing surface
//! - [`search`] - find bar
//! - [`document`] - document model and storage
//! - [`config`] - persisted settings
//! - [`session`] - application session
//!
//! # Units
//!
//! - Offsets are counted in Unicode scalar values (`char`s), never bytes
//! - Geometry is in device units (1/96 inch); font sizes are points

pub mod boundary;
pub mod config;
pub mod document;
pub mod error;
pub mod formatting;
pub mod geometry;
pub mod line_ending;
pub mod measure;
pub mod offsets;
pub mod paginate;
pub mod reconcile;
pub mod search;
pub mod session;
pub mod surface;

pub use boundary::{
    BoundaryAction, BoundaryKey, LocalEdit, LocalSelection, apply_local_edit, handle_boundary_key,
};
pub use config::{AppSettings, ConfigError, ResolvedTheme, Theme, ViewMode};
pub use document::{
    CharCountRule, Document, DocumentStore, FileData, FsDocumentStore, StoreError, char_count,
};
pub use error::TextosError;
pub use formatting::{Color, FontSpec, FormattingSettings};
pub use geometry::{
    OVERFLOW_TOLERANCE, PAGE_GAP, PAGE_HEIGHT, PAGE_MARGIN, PAGE_WIDTH, PageGeometry,
    points_to_device,
};
pub use line_ending::LineEnding;
pub use measure::{CellWidthMeasurer, FallbackMeasurer, TextMeasurer, estimate_width};
pub use offsets::{PagePosition, to_absolute, to_page_local};
pub use paginate::{Paginator, join_pages, paginate};
pub use reconcile::{OverflowReconciler, OverflowVerdict, ReconcileState, check_overflow};
pub use search::{SearchError, SearchMatch, SearchOptions, SearchState};
pub use session::{EditorSession, SessionOutcome, StatusSnapshot};
pub use surface::{IdleTask, KeyOutcome, PagedEditor, SurfaceCallback, SurfaceEvent};
