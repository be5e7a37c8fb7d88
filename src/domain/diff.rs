//! unified diff patch를 최종 파일 라인 번호 -> diff position 매핑으로 변환한다.
//!
//! position은 GitHub 레거시 리뷰 코멘트 API가 쓰는 번호 체계로,
//! 첫 hunk 헤더를 0으로 두고 이후 patch 본문의 모든 물리 라인을 하나씩 센다.

use std::collections::BTreeMap;

use serde::Serialize;

/// hunk 내부 라인의 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffLineKind {
    Added,
    Removed,
    Context,
}

impl DiffLineKind {
    /// 선행 문자(`+`, `-`, 공백)로 라인 종류를 판별한다.
    pub fn classify(raw: &str) -> Option<Self> {
        match raw.as_bytes().first() {
            Some(b'+') => Some(Self::Added),
            Some(b'-') => Some(Self::Removed),
            Some(b' ') => Some(Self::Context),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub kind: DiffLineKind,
    /// 선행 마커를 제외한 본문
    pub text: String,
    pub position: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffHunk {
    pub header: String,
    /// 헤더에서 `+` 뒤 숫자를 읽지 못하면 None
    pub new_start: Option<u32>,
    /// 헤더 라인 자신의 position
    pub position: u32,
    pub lines: Vec<DiffLine>,
}

/// 최종 파일 라인 번호(1부터) -> diff position(0부터) 매핑.
/// 생성 이후에는 읽기 전용이다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LineMapping {
    positions: BTreeMap<u32, u32>,
}

impl LineMapping {
    pub fn position(&self, line: u32) -> Option<u32> {
        self.positions.get(&line).copied()
    }

    pub fn contains(&self, line: u32) -> bool {
        self.positions.contains_key(&line)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// (라인, position) 쌍을 라인 오름차순으로 순회한다.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.positions.iter().map(|(line, pos)| (*line, *pos))
    }
}

/// `@@ -a,b +c,d @@` 헤더에서 `c`를 추출한다.
pub fn parse_hunk_new_start(line: &str) -> Option<u32> {
    if !line.starts_with("@@") {
        return None;
    }

    let plus_pos = line.find('+')?;
    let digits: String = line[plus_pos + 1..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();

    digits.parse().ok()
}

/// hunk 목록을 따라가며 mapping과 추가 라인 목록을 함께 만든다.
/// Added/Context 라인만 최종 파일에 존재하므로 이 둘만 기록한다.
fn walk(patch: &str) -> (LineMapping, Vec<u32>) {
    let mut mapping = LineMapping::default();
    let mut added = Vec::new();
    let mut current_line: Option<u32> = None;

    for hunk in parse_hunks(patch) {
        // 잘못된 헤더는 카운터를 그대로 둔다.
        if let Some(start) = hunk.new_start {
            current_line = Some(start.saturating_sub(1));
        }

        for line in &hunk.lines {
            if line.kind == DiffLineKind::Removed {
                continue;
            }
            // u32 범위를 넘는 라인은 매핑하지 않고, 다음 정상 헤더까지 카운터를 비운다.
            let Some(file_line) = current_line.and_then(|l| l.checked_add(1)) else {
                current_line = None;
                continue;
            };
            current_line = Some(file_line);

            mapping.positions.entry(file_line).or_insert(line.position);
            if line.kind == DiffLineKind::Added {
                added.push(file_line);
            }
        }
    }

    (mapping, added)
}

/// 최종 파일 라인 번호 -> diff position 매핑을 만든다.
/// 빈 patch나 hunk가 없는 patch는 빈 매핑을 반환한다.
pub fn build_line_mapping(patch: &str) -> LineMapping {
    walk(patch).0
}

/// 추가(`+`) 라인의 최종 파일 라인 번호만 등장 순서대로 반환한다.
pub fn changed_lines_only(patch: &str) -> Vec<u32> {
    walk(patch).1
}

/// patch를 hunk 단위로 나눈다.
///
/// position은 첫 헤더를 0으로 두고 이후 모든 물리 라인마다 1씩 증가한다.
/// 첫 헤더 이전 텍스트(`diff --git`, `---`/`+++`)는 세지 않고 버린다.
/// 마커가 없는 라인(`\ No newline at end of file` 등)은 position만 차지한다.
pub fn parse_hunks(patch: &str) -> Vec<DiffHunk> {
    let mut hunks: Vec<DiffHunk> = Vec::new();
    let mut position: Option<u32> = None;

    for raw in patch.lines() {
        let is_header = raw.starts_with("@@");
        let pos = match (position, is_header) {
            (None, false) => continue,
            (None, true) => 0,
            (Some(prev), _) => prev.saturating_add(1),
        };
        position = Some(pos);

        if is_header {
            hunks.push(DiffHunk {
                header: raw.to_string(),
                new_start: parse_hunk_new_start(raw),
                position: pos,
                lines: Vec::new(),
            });
            continue;
        }

        let (Some(hunk), Some(kind)) = (hunks.last_mut(), DiffLineKind::classify(raw)) else {
            continue;
        };
        hunk.lines.push(DiffLine {
            kind,
            text: raw[1..].to_string(),
            position: pos,
        });
    }

    hunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(mapping: &LineMapping) -> Vec<(u32, u32)> {
        mapping.iter().collect()
    }

    #[test]
    fn empty_patch_has_no_mapping() {
        assert!(build_line_mapping("").is_empty());
        assert!(changed_lines_only("").is_empty());
        assert!(build_line_mapping("Binary files differ").is_empty());
    }

    #[test]
    fn single_hunk_maps_every_surviving_line() {
        let patch = "@@ -1,3 +1,4 @@\n a\n+b\n c\n d";
        let mapping = build_line_mapping(patch);
        assert_eq!(pairs(&mapping), vec![(1, 1), (2, 2), (3, 3), (4, 4)]);
        assert_eq!(changed_lines_only(patch), vec![2]);
    }

    #[test]
    fn removed_lines_are_never_keys() {
        let patch = "@@ -1,2 +1,1 @@\n-x\n y";
        let mapping = build_line_mapping(patch);
        assert_eq!(pairs(&mapping), vec![(1, 2)]);
        assert!(changed_lines_only(patch).is_empty());
    }

    #[test]
    fn each_hunk_resets_the_line_counter() {
        let patch = "@@ -1,2 +1,3 @@\n a\n+b\n c\n@@ -10,2 +11,2 @@\n-old\n+new\n tail";
        let mapping = build_line_mapping(patch);
        // 두 번째 헤더도 position 하나를 차지한다.
        assert_eq!(
            pairs(&mapping),
            vec![(1, 1), (2, 2), (3, 3), (11, 6), (12, 7)]
        );
        assert_eq!(changed_lines_only(patch), vec![2, 11]);
    }

    #[test]
    fn malformed_header_keeps_previous_counter() {
        let patch = "@@ -1,1 +5,2 @@\n a\n@@ broken @@\n+b";
        let mapping = build_line_mapping(patch);
        assert_eq!(pairs(&mapping), vec![(5, 1), (6, 3)]);
    }

    #[test]
    fn lines_before_first_header_do_not_count() {
        let patch = "diff --git a/x b/x\n--- a/x\n+++ b/x\n@@ -0,0 +1,2 @@\n+one\n+two";
        let mapping = build_line_mapping(patch);
        assert_eq!(pairs(&mapping), vec![(1, 1), (2, 2)]);
        assert_eq!(changed_lines_only(patch), vec![1, 2]);
    }

    #[test]
    fn no_newline_marker_takes_a_position_without_mapping() {
        let patch = "@@ -1 +1 @@\n-a\n\\ No newline at end of file\n+b";
        let mapping = build_line_mapping(patch);
        assert_eq!(pairs(&mapping), vec![(1, 3)]);
    }

    #[test]
    fn mapping_is_idempotent() {
        let patch = "@@ -3,4 +3,5 @@\n x\n+y\n-z\n w\n+v";
        assert_eq!(build_line_mapping(patch), build_line_mapping(patch));
    }

    #[test]
    fn header_start_is_parsed_after_plus() {
        assert_eq!(parse_hunk_new_start("@@ -12,7 +15,9 @@ fn main()"), Some(15));
        assert_eq!(parse_hunk_new_start("@@ -1 +1 @@"), Some(1));
        assert_eq!(parse_hunk_new_start("@@ -1,2 @@"), None);
        assert_eq!(parse_hunk_new_start(" context"), None);
    }

    #[test]
    fn hunks_are_split_with_markers_stripped() {
        let hunks = parse_hunks("@@ -1,1 +1,2 @@\n a\n+b\n@@ nope @@\n-c");
        assert_eq!(hunks.len(), 2);
        assert_eq!(hunks[0].new_start, Some(1));
        assert_eq!(hunks[0].lines[1].kind, DiffLineKind::Added);
        assert_eq!(hunks[0].lines[1].text, "b");
        assert_eq!(hunks[1].new_start, None);
        assert_eq!(hunks[1].position, 3);
        assert_eq!(hunks[1].lines[0].kind, DiffLineKind::Removed);
        assert_eq!(hunks[1].lines[0].position, 4);
    }

    #[test]
    fn lines_under_a_malformed_first_header_count_but_never_map() {
        let patch = "@@ bad @@\n a\n+b\n@@ -1 +1 @@\n c";
        let mapping = build_line_mapping(patch);
        assert_eq!(pairs(&mapping), vec![(1, 4)]);
        assert!(changed_lines_only(patch).is_empty());
    }

    #[test]
    fn overlapping_hunks_keep_the_first_position() {
        let patch = "@@ -1,2 +1,2 @@\n a\n b\n@@ -5,1 +2,1 @@\n c";
        let mapping = build_line_mapping(patch);
        assert_eq!(pairs(&mapping), vec![(1, 1), (2, 2)]);
    }

    #[test]
    fn line_counter_overflow_stops_mapping_until_next_header() {
        let patch = "@@ -1 +4294967295,2 @@\n a\n b";
        let mapping = build_line_mapping(patch);
        assert_eq!(pairs(&mapping), vec![(u32::MAX, 1)]);

        let patch = "@@ -1 +4294967295,2 @@\n a\n+b\n+c\n@@ -9 +9 @@\n+d";
        assert_eq!(pairs(&build_line_mapping(patch)), vec![(9, 5), (u32::MAX, 1)]);
        assert_eq!(changed_lines_only(patch), vec![9]);
    }
}
