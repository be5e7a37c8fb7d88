//! Interface layer
//! CLI 입력을 유스케이스 실행으로 연결한다.

pub mod cli;
