//! Derivation core for the waste-export dashboard.
//!
//! Everything here is a pure, synchronous function of the loaded records and
//! the caller-owned [`data::filter::FilterState`]; the viewer binary calls
//! [`view::DashboardView::compute`] whenever the selection changes.

pub mod color;
pub mod data;
pub mod spatial;
pub mod view;
