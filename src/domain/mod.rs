//! Domain layer
//! diff 매핑, finding 중복 제거, 정적 검사 규칙, 요약/답글 규칙을 I/O 없이 표현한다.

pub mod dedupe;
pub mod diff;
pub mod finding;
pub mod conversation;
pub mod lint;
pub mod lint_config;
pub mod policy;
pub mod review;
pub mod target;
