pub mod options;
pub mod presentation;

pub use presentation::{ChartPresentation, ChartPresentationBuilder, Dataset, ValueAxis};
