pub mod formatter;

pub use formatter::{
    format_drivers, format_import_summary, format_participants, format_race_detail,
    format_race_list, format_standings, format_standings_tsv, format_submission, format_teams,
    should_use_colors,
};
