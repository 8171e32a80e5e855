//! Artifacts written next to a run: the dependency listing, the Graphviz
//! graph and CSV header templates.

pub mod csv;
pub mod listing;

pub use self::csv::{template_file_name, write_csv_templates};
pub use listing::{
    render_dependency_listing, render_dot, render_fill_order, write_dependency_listing, write_dot,
};
