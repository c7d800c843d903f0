//! Teen phone insights - cleaning and filtering for adolescent phone-usage surveys.
//!
//! The survey file is loaded and normalized once into an immutable
//! [`Dataset`](data::Dataset), shared behind an `Arc`. Consumers narrow it
//! with a [`FilterSpec`](data::FilterSpec) and compute aggregates on the
//! resulting [`Subset`](data::Subset).

pub mod data;
pub mod state;

pub use data::{apply, load_dataset, DataError, Dataset, FilterSpec, Subset};
pub use state::DashboardState;
