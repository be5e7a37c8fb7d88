//! 이전 실행에서 이미 게시한 코멘트와 겹치는 finding을 걸러내는 규칙.
//!
//! exact-match가 아닌 휴리스틱 필터이므로 비슷한 표현을 놓치거나(false negative)
//! 같은 키워드를 쓰는 다른 이슈를 걸러내는(false positive) 경우가 있다.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::domain::finding::{Finding, PostedComment};

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.70;

/// 흔한 finding 유형을 가리키는 고정 키워드 목록.
pub const DEFAULT_DUPLICATE_KEYWORDS: &[&str] = &[
    "들여쓰기",
    "indentation",
    "네이밍",
    "naming",
    "camelcase",
    "메모리 누수",
    "memory leak",
    "성능",
    "performance",
    "안티패턴",
    "anti-pattern",
    "복잡도",
    "complexity",
    "동시성",
    "concurrency",
    "보안",
    "security",
    "중복",
    "duplication",
    "매직 넘버",
    "magic number",
    "매개변수",
    "와일드카드",
    "wildcard",
    "force cast",
    "console",
];

/// 리뷰 코멘트 조회 키(`file:line`).
pub fn comment_key(file: &str, line: u32) -> String {
    format!("{file}:{line}")
}

/// (file, line, body) 목록으로 실행 단위 조회 테이블을 만든다.
/// 같은 키가 여러 번 나오면 뒤(최신) 코멘트가 남는다.
///
/// 한계: 라인 하나에 코멘트 하나만 비교한다. 이전 실행이 같은 라인에
/// 정적 검사 코멘트와 모델 코멘트를 함께 남겼다면 앞선 쪽은 비교 대상에서 빠지므로,
/// 그 finding은 실행할 때마다 다시 게시될 수 있다.
pub fn index_posted_comments<'a, I>(comments: I) -> HashMap<String, PostedComment>
where
    I: IntoIterator<Item = (&'a str, u32, &'a str)>,
{
    comments
        .into_iter()
        .map(|(file, line, body)| (comment_key(file, line), PostedComment::parse(body)))
        .collect()
}

#[derive(Debug, Clone)]
pub struct FindingDeduplicator {
    keywords: Vec<String>,
    similarity_threshold: f64,
}

impl Default for FindingDeduplicator {
    fn default() -> Self {
        Self::new(
            DEFAULT_DUPLICATE_KEYWORDS.iter().map(|k| k.to_string()),
            DEFAULT_SIMILARITY_THRESHOLD,
        )
    }
}

impl FindingDeduplicator {
    /// 키워드는 소문자로 정규화해 보관한다. 빈 키워드는 무시한다.
    pub fn new(keywords: impl IntoIterator<Item = String>, similarity_threshold: f64) -> Self {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            similarity_threshold,
        }
    }

    pub fn similarity_threshold(&self) -> f64 {
        self.similarity_threshold
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// priority와 category가 같고, 공통 키워드가 있거나 메시지 유사도가 임계값을 넘으면 중복이다.
    pub fn is_duplicate(&self, finding: &Finding, existing: &PostedComment) -> bool {
        if finding.priority != existing.priority || finding.category != existing.category {
            return false;
        }

        let new_msg = finding.message.to_lowercase();
        let old_msg = existing.message.to_lowercase();

        let shares_keyword = self
            .keywords
            .iter()
            .any(|k| new_msg.contains(k.as_str()) && old_msg.contains(k.as_str()));

        shares_keyword || jaccard_similarity(&new_msg, &old_msg) > self.similarity_threshold
    }

    /// 파일별 finding 중 같은 `file:line`의 기존 코멘트와 중복인 것을 제거한다.
    /// 모두 제거된 파일은 결과에서 빠진다.
    pub fn filter_duplicates(
        &self,
        findings: BTreeMap<String, Vec<Finding>>,
        existing: &HashMap<String, PostedComment>,
    ) -> BTreeMap<String, Vec<Finding>> {
        findings
            .into_iter()
            .filter_map(|(file, items)| {
                let kept: Vec<Finding> = items
                    .into_iter()
                    .filter(|f| {
                        existing
                            .get(&comment_key(&file, f.line))
                            .is_none_or(|posted| !self.is_duplicate(f, posted))
                    })
                    .collect();
                (!kept.is_empty()).then_some((file, kept))
            })
            .collect()
    }
}

/// 공백 분리 + 소문자 토큰 집합의 Jaccard 유사도. 양쪽 모두 비면 0이다.
pub fn jaccard_similarity(a: &str, b: &str) -> f64 {
    let left: HashSet<String> = a.split_whitespace().map(str::to_lowercase).collect();
    let right: HashSet<String> = b.split_whitespace().map(str::to_lowercase).collect();

    let union = left.union(&right).count();
    if union == 0 {
        return 0.0;
    }
    left.intersection(&right).count() as f64 / union as f64
}
