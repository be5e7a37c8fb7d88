//! GitHub REST API, OpenAI 호환 API, 설정 파일처럼 외부와 맞닿는 구현.

pub mod adapters;
pub mod config;
pub mod providers;
pub mod render;
pub mod vcs;
