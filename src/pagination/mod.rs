//! Pagination module
//!
//! Supports: Cursor token, Offset, Page Number
//!
//! # Overview
//!
//! The pagination module describes how an endpoint pages through results.
//! Each strategy hands out the first cursor, then inspects every response
//! to decide the next cursor or why paging stops. The fetcher exposes the
//! current cursor to request templates as `{{ cursor }}`, `{{ offset }}`
//! and `{{ page }}`.

mod strategies;
mod types;

pub use strategies::{CursorPaginator, NoPaginator, OffsetPaginator, PageNumberPaginator};
pub use types::{Cursor, NextPage, PaginationConfig, Paginator, StopReason};
