//! # formpdf
//!
//! Lays out JSON form descriptions as paginated, fillable PDF forms.
//!
//! - **Loading**: find the field list anywhere in the input JSON and
//!   normalize every option payload into ordered `(key, label)` pairs
//! - **Layout**: a cursor threaded through the renderers, with multi-column
//!   groups and row reconciliation
//! - **Pagination**: page breaks from a height estimate, letterhead on every
//!   page, and "Page i of N" footers from a measurement pass
//! - **Output**: AcroForm text boxes, combo boxes, checkboxes and radio
//!   groups written without external PDF tooling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use formpdf::config::FormConfig;
//! use formpdf::form::load_form;
//! use formpdf::generator::FormGenerator;
//! use std::path::Path;
//!
//! let document = load_form(Path::new("form.json")).expect("invalid form");
//! FormGenerator::new(document, FormConfig::default())
//!     .generate_pdf(Path::new("generated_form.pdf"))
//!     .expect("failed to write PDF");
//! ```
//!
//! ## Modules
//!
//! - [`form`]: input model and JSON loader
//! - [`config`]: page geometry, palette, letterhead and group columns
//! - [`layout`]: layout cursor and group/column manager
//! - [`pagination`]: height estimates, page chrome and footers
//! - [`fields`]: one renderer per field type
//! - [`generator`]: the two-pass driver
//! - [`canvas`], [`widgets`], [`pdf_generator`]: drawing surface and PDF output

pub mod builder;
pub mod canvas;
pub mod config;
pub mod error;
pub mod fields;
pub mod form;
pub mod generator;
pub mod image;
pub mod layout;
pub mod metrics;
pub mod pagination;
pub mod pdf_generator;
pub mod styles;
pub mod text;
pub mod widgets;
