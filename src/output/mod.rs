pub mod export;
pub mod formatter;

pub use export::export_feature_sets;
pub use formatter::{
    format_age, format_city_detail, format_json, format_ranked_table, format_tier, format_tsv,
    format_value, should_use_colors,
};
