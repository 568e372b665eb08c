pub mod history_list;
pub mod progress_bar;
pub mod question_view;
pub mod unit_list;
