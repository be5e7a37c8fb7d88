//! 오프라인 patch 매핑 확인 유스케이스.

use anyhow::{Context, Result};

use crate::domain::diff::{build_line_mapping, changed_lines_only};

/// patch 텍스트의 라인 -> diff position 매핑(또는 추가된 라인 목록)을 JSON으로 만든다.
pub struct MapPatchUseCase;

impl MapPatchUseCase {
    pub fn execute(&self, patch: &str, changed_only: bool) -> Result<String> {
        let rendered = if changed_only {
            serde_json::to_string_pretty(&changed_lines_only(patch))
        } else {
            serde_json::to_string_pretty(&build_line_mapping(patch))
        };
        rendered.context("failed to serialize line mapping")
    }
}
