pub mod formatter;
pub mod writer;

pub use formatter::{
    format_fit_detail, format_fit_table, format_json, format_score, format_tsv, should_use_colors,
};
pub use writer::{result_headers, result_row, write_results_csv};
