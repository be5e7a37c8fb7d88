//! 애플리케이션 유스케이스 모음.

pub mod inspect_config;
pub mod map_patch;
pub mod reply_comment;
pub mod review_lines;
mod session;
pub mod summarize_pr;
