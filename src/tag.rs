use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TrackerError;
use crate::time_entry::TimeEntry;

/// タイムエントリーの分類を表すタグ。
///
/// 組み込みのタグに加えて、`TagSet`に登録したユーザー定義タグを`Custom`で表す。
/// どのタグにも該当しないエントリーは`Unknown`に集計する。
///
/// 並び順は組み込みタグの宣言順、ユーザー定義タグの名前順、`Unknown`の順になる。
/// ユーザー定義タグは大文字小文字、空白、記号を区別せずに比較するため、
/// `gym`と`Gym`は同じタグとして集計される。
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Tag {
    Sleep,
    Productive,
    SelfCare,
    Unproductive,
    Social,
    Transit,
    ClassBlocked,
    Custom(String),
    Unknown,
}

impl Tag {
    /// 組み込みタグの一覧。
    pub const BUILTIN: [Tag; 7] = [
        Tag::Sleep,
        Tag::Productive,
        Tag::SelfCare,
        Tag::Unproductive,
        Tag::Social,
        Tag::Transit,
        Tag::ClassBlocked,
    ];

    /// 表示用の名前を返す。
    pub fn name(&self) -> &str {
        match self {
            Tag::Sleep => "Sleep",
            Tag::Productive => "Productive",
            Tag::SelfCare => "Self-Care",
            Tag::Unproductive => "Unproductive",
            Tag::Social => "Social",
            Tag::Transit => "Transit",
            Tag::ClassBlocked => "Class-Blocked",
            Tag::Custom(name) => name,
            Tag::Unknown => "Unknown",
        }
    }

    /// 名前が組み込みタグに一致する場合はそのタグを返す。
    ///
    /// 大文字小文字、空白、記号は区別しないため、`Class (Blocked)`も`ClassBlocked`になる。
    pub fn builtin(name: &str) -> Option<Tag> {
        let key = normalize(name);
        Tag::BUILTIN
            .iter()
            .find(|tag| normalize(tag.name()) == key)
            .cloned()
    }

    /// 集計時に利用するバケットを返す。
    ///
    /// 名前が空のユーザー定義タグは`Unknown`として扱う。
    pub fn bucket(&self) -> Tag {
        match self {
            Tag::Custom(name) if name.trim().is_empty() => Tag::Unknown,
            tag => tag.clone(),
        }
    }

    /// 比較に利用するキー。
    fn key(&self) -> (u8, String) {
        let rank = match self {
            Tag::Sleep => 0,
            Tag::Productive => 1,
            Tag::SelfCare => 2,
            Tag::Unproductive => 3,
            Tag::Social => 4,
            Tag::Transit => 5,
            Tag::ClassBlocked => 6,
            Tag::Custom(_) => 7,
            Tag::Unknown => 8,
        };
        match self {
            Tag::Custom(name) => (rank, normalize(name)),
            _ => (rank, String::new()),
        }
    }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Tag {}

impl PartialOrd for Tag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Tag {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl Hash for Tag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<Tag> for String {
    fn from(tag: Tag) -> Self {
        tag.name().to_string()
    }
}

/// 保存済みのデータから読み込む場合の変換。
///
/// 組み込みタグ以外は表記を保ったままユーザー定義タグとする。
/// 登録済みのタグかどうかは`TagSet`で確認する。
impl From<String> for Tag {
    fn from(name: String) -> Self {
        if let Some(tag) = Tag::builtin(&name) {
            return tag;
        }
        let key = normalize(&name);
        if key.is_empty() || key == "unknown" {
            Tag::Unknown
        } else {
            Tag::Custom(name.trim().to_string())
        }
    }
}

/// 組み込みタグのみを受け付ける。
impl FromStr for Tag {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tag::builtin(s).ok_or_else(|| TrackerError::UnknownTag(s.to_string()))
    }
}

/// 利用可能なタグの集合。
///
/// 組み込みタグに加えて、明示的に登録したユーザー定義タグのみを受け付ける。
/// 打ち間違いによって新しいタグが作られることを防ぐ。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagSet {
    custom: BTreeSet<String>,
}

impl TagSet {
    /// 新しい`TagSet`を返す。
    ///
    /// 空の名前と組み込みタグと重複する名前は登録しない。
    ///
    /// # Arguments
    ///
    /// * `custom` - 追加で登録するタグ名
    pub fn new<I, S>(custom: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let custom = custom
            .into_iter()
            .map(|name| name.into().trim().to_string())
            .filter(|name| !normalize(name).is_empty())
            .filter(|name| Tag::builtin(name).is_none() && normalize(name) != "unknown")
            .collect();

        Self { custom }
    }

    /// タグ名を厳密に解釈する。
    ///
    /// 組み込みタグ、登録済みのユーザー定義タグ、`Unknown`以外はエラーとする。
    pub fn parse(&self, raw: &str) -> Result<Tag, TrackerError> {
        if let Some(tag) = self.lookup(raw) {
            return Ok(tag);
        }
        if normalize(raw) == "unknown" {
            return Ok(Tag::Unknown);
        }
        Err(TrackerError::UnknownTag(raw.to_string()))
    }

    /// タグ名を解釈し、該当しない場合は`Unknown`を返す。
    pub fn resolve(&self, raw: &str) -> Tag {
        self.lookup(raw).unwrap_or(Tag::Unknown)
    }

    /// 登録済みのユーザー定義タグを返す。
    pub fn custom_tags(&self) -> impl Iterator<Item = Tag> + '_ {
        self.custom.iter().map(|name| Tag::Custom(name.clone()))
    }

    fn lookup(&self, raw: &str) -> Option<Tag> {
        if let Some(tag) = Tag::builtin(raw) {
            return Some(tag);
        }
        let key = normalize(raw);
        if key.is_empty() {
            return None;
        }
        self.custom
            .iter()
            .find(|name| normalize(name) == key)
            .map(|name| Tag::Custom(name.clone()))
    }
}

/// 選択肢として表示するタグの一覧を返す。
///
/// 組み込みタグ、登録済みのタグ、エントリーで利用されているタグを重複なく並べる。
pub fn available_tags(tag_set: &TagSet, entries: &[TimeEntry]) -> Vec<Tag> {
    let tags: BTreeSet<Tag> = Tag::BUILTIN
        .iter()
        .cloned()
        .chain(tag_set.custom_tags())
        .chain(entries.iter().map(|entry| entry.tag.bucket()))
        .collect();

    tags.into_iter().collect()
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{available_tags, Tag, TagSet};
    use crate::error::TrackerError;

    /// 組み込みタグは表記揺れを吸収して解釈できることを確認する。
    #[rstest]
    #[case::exact("Productive", Tag::Productive)]
    #[case::lower("sleep", Tag::Sleep)]
    #[case::hyphen("self-care", Tag::SelfCare)]
    #[case::no_hyphen("SelfCare", Tag::SelfCare)]
    #[case::parenthesis("Class (Blocked)", Tag::ClassBlocked)]
    #[case::padded("  Transit ", Tag::Transit)]
    fn test_builtin(#[case] input: &str, #[case] expected: Tag) {
        assert_eq!(Tag::builtin(input), Some(expected.clone()));
        assert_eq!(input.parse::<Tag>(), Ok(expected));
    }

    #[test]
    fn test_from_str_rejects_custom() {
        assert_eq!(
            "Gym".parse::<Tag>(),
            Err(TrackerError::UnknownTag("Gym".to_string()))
        );
    }

    /// 登録済みのタグは元の表記で返されることを確認する。
    #[test]
    fn test_parse_registered_custom_tag() {
        let tag_set = TagSet::new(["Gym", "Reading"]);

        assert_eq!(tag_set.parse("gym"), Ok(Tag::Custom("Gym".to_string())));
        assert_eq!(tag_set.parse("Sleep"), Ok(Tag::Sleep));
        assert_eq!(tag_set.parse("unknown"), Ok(Tag::Unknown));
    }

    /// 打ち間違いは新しいタグにならないことを確認する。
    #[test]
    fn test_parse_typo() {
        let tag_set = TagSet::new(["Gym"]);

        assert_eq!(
            tag_set.parse("Productiv"),
            Err(TrackerError::UnknownTag("Productiv".to_string()))
        );
        assert_eq!(tag_set.resolve("Productiv"), Tag::Unknown);
        assert_eq!(tag_set.resolve(""), Tag::Unknown);
    }

    /// 組み込みタグと重複する名前や空の名前は登録されないことを確認する。
    #[test]
    fn test_new_skips_builtin_and_blank() {
        let tag_set = TagSet::new(["productive", " ", "Unknown", "Gym"]);

        assert_eq!(
            tag_set.custom_tags().collect::<Vec<_>>(),
            vec![Tag::Custom("Gym".to_string())]
        );
    }

    /// 保存済みの文字列からの変換を確認する。
    #[rstest]
    #[case::builtin("Class-Blocked", Tag::ClassBlocked)]
    #[case::custom("Gym", Tag::Custom("Gym".to_string()))]
    #[case::blank("", Tag::Unknown)]
    #[case::unknown("Unknown", Tag::Unknown)]
    fn test_from_string(#[case] input: &str, #[case] expected: Tag) {
        assert_eq!(Tag::from(input.to_string()), expected);
    }

    /// 表記揺れのあるユーザー定義タグは同じタグになることを確認する。
    #[test]
    fn test_custom_tag_ignores_spelling() {
        use std::collections::HashSet;

        let lower = Tag::from("gym".to_string());
        let upper = Tag::from(" Gym ".to_string());

        assert_eq!(lower, upper);
        assert_eq!(HashSet::from([lower.clone(), upper.clone()]).len(), 1);
        assert_ne!(lower, Tag::Custom("Gyms".to_string()));
        assert!(Tag::ClassBlocked < lower && lower < Tag::Unknown);
    }

    #[test]
    fn test_serde_uses_name() {
        let json = serde_json::to_string(&vec![Tag::SelfCare, Tag::Custom("Gym".into())]).unwrap();
        assert_eq!(json, r#"["Self-Care","Gym"]"#);

        let tags: Vec<Tag> = serde_json::from_str(&json).unwrap();
        assert_eq!(tags, vec![Tag::SelfCare, Tag::Custom("Gym".into())]);
    }

    #[test]
    fn test_bucket() {
        assert_eq!(Tag::Custom(" ".to_string()).bucket(), Tag::Unknown);
        assert_eq!(Tag::Social.bucket(), Tag::Social);
    }

    /// 利用可能なタグは重複なく並ぶことを確認する。
    #[test]
    fn test_available_tags() {
        use chrono::{NaiveDate, NaiveTime};

        use crate::time_entry::{NewTimeEntry, TimeEntry};

        let tag_set = TagSet::new(["Gym"]);
        let entry = TimeEntry::new(
            "1",
            NewTimeEntry {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                end_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
                description: "imported".to_string(),
                tag: Tag::Custom("Chores".to_string()),
            },
        );
        let mut duplicate = entry.clone();
        duplicate.tag = Tag::Productive;

        let tags = available_tags(&tag_set, &[entry, duplicate]);

        assert_eq!(
            tags,
            vec![
                Tag::Sleep,
                Tag::Productive,
                Tag::SelfCare,
                Tag::Unproductive,
                Tag::Social,
                Tag::Transit,
                Tag::ClassBlocked,
                Tag::Custom("Chores".to_string()),
                Tag::Custom("Gym".to_string()),
            ]
        );
    }
}
