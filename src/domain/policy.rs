//! 도메인 정책(코멘트 가능한 라인 제한, 라인 코멘트 배치 규칙).

use crate::domain::diff::LineMapping;
use crate::domain::finding::Finding;
use crate::domain::review::InlineComment;

/// 코멘트를 달 수 있는 finding만 남긴다.
/// 매핑에 없는 라인은 diff에서 가리킬 수 없으므로 항상 제외하고,
/// `changed_only`면 추가된 라인만 허용한다.
pub fn retain_addressable(
    findings: Vec<Finding>,
    mapping: &LineMapping,
    changed_lines: &[u32],
    changed_only: bool,
) -> Vec<Finding> {
    findings
        .into_iter()
        .filter(|f| mapping.contains(f.line))
        .filter(|f| !changed_only || changed_lines.contains(&f.line))
        .collect()
}

/// 같은 라인에 같은 priority/category/message가 두 번 나오면 하나만 남긴다.
/// 정적 검사와 모델이 같은 위반을 동시에 보고하는 경우가 있다.
pub fn collapse_repeats(findings: Vec<Finding>) -> Vec<Finding> {
    let mut out: Vec<Finding> = Vec::with_capacity(findings.len());
    for finding in findings {
        let seen = out.iter().any(|f| {
            f.line == finding.line
                && f.priority == finding.priority
                && f.category == finding.category
                && f.message == finding.message
        });
        if !seen {
            out.push(finding);
        }
    }
    out.sort_by_key(|f| (f.line, f.priority));
    out
}

/// finding을 diff position 기반 라인 코멘트로 바꾼다.
/// 매핑에 없는 라인은 건너뛴다.
pub fn place_inline_comments<F>(
    path: &str,
    findings: &[Finding],
    mapping: &LineMapping,
    render: F,
) -> Vec<InlineComment>
where
    F: Fn(&Finding) -> String,
{
    findings
        .iter()
        .filter_map(|finding| {
            let position = mapping.position(finding.line)?;
            Some(InlineComment {
                path: path.to_string(),
                line: finding.line,
                position,
                body: render(finding),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::diff::build_line_mapping;
    use crate::domain::finding::Priority;

    fn finding(line: u32, message: &str) -> Finding {
        Finding {
            line,
            priority: Priority::P3,
            category: "네이밍".to_string(),
            message: message.to_string(),
            suggestion: None,
        }
    }

    const PATCH: &str = "@@ -1,3 +1,4 @@\n a\n+b\n c\n d";

    #[test]
    fn only_changed_and_mapped_lines_survive() {
        let mapping = build_line_mapping(PATCH);
        let findings = vec![finding(1, "ctx"), finding(2, "added"), finding(9, "outside")];

        let changed = retain_addressable(findings.clone(), &mapping, &[2], true);
        assert_eq!(changed.iter().map(|f| f.line).collect::<Vec<_>>(), vec![2]);

        let any = retain_addressable(findings, &mapping, &[2], false);
        assert_eq!(any.iter().map(|f| f.line).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn repeats_on_same_line_collapse() {
        let out = collapse_repeats(vec![finding(4, "x"), finding(2, "y"), finding(4, "x")]);
        assert_eq!(out.iter().map(|f| f.line).collect::<Vec<_>>(), vec![2, 4]);
    }

    #[test]
    fn inline_comments_use_diff_positions() {
        let mapping = build_line_mapping(PATCH);
        let comments =
            place_inline_comments("a.kt", &[finding(2, "m"), finding(7, "gone")], &mapping, |f| {
                f.message.clone()
            });
        assert_eq!(
            comments,
            vec![InlineComment {
                path: "a.kt".to_string(),
                line: 2,
                position: 2,
                body: "m".to_string(),
            }]
        );
    }
}
