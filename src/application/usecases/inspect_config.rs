//! `linepilot config`: 병합된 설정과 토큰/API 키 해석 상태를 보여주는 유스케이스.

use anyhow::{Context, Result};
use tracing::debug;

use crate::application::ports::ConfigRepository;

pub struct InspectConfigUseCase<'a> {
    pub config_repo: &'a dyn ConfigRepository,
}

impl InspectConfigUseCase<'_> {
    /// 진단 JSON을 반환한다. 비밀값은 출처 라벨로만 표기된다.
    pub fn execute(&self) -> Result<String> {
        let json = self
            .config_repo
            .inspect_pretty_json()
            .context("failed to inspect linepilot config")?;
        debug!(bytes = json.len(), "config inspection rendered");
        Ok(json)
    }
}
