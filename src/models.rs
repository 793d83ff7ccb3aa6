use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use rand::Rng;
use regex::Regex;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::reconcile;

pub const DEFAULT_SUBJECT: &str = "Untitled Study Plan";
pub const PLACEHOLDER_THUMBNAIL: &str = "https://i.ytimg.com/vi/placeholder/hqdefault.jpg";
pub const PLACEHOLDER_VIDEO_ID: &str = "placeholder";

pub const MIN_IMPORTANCE: u8 = 1;
pub const MAX_IMPORTANCE: u8 = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" | "e" => Some(Difficulty::Easy),
            "medium" | "m" => Some(Difficulty::Medium),
            "hard" | "h" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

// Which source tab an entry lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Videos,
    Articles,
    Questions,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Videos => "videos",
            ItemType::Articles => "articles",
            ItemType::Questions => "questions",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "videos" | "video" | "topic" | "topics" | "v" => Some(ItemType::Videos),
            "articles" | "article" | "a" => Some(ItemType::Articles),
            "questions" | "question" | "q" => Some(ItemType::Questions),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ItemType::Videos => "Video",
            ItemType::Articles => "Article",
            ItemType::Questions => "Question",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Video {
    pub title: String,
    pub url: String,
    pub channel: String,
    pub duration: String,
    pub thumbnail: String,
    pub video_id: String,
    pub views: String,
}

/// A video-based study unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub topic_name: String,
    pub importance: u8,
    pub prep_time_minutes: u32,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub videos: Vec<Video>,
}

impl Topic {
    /// Total watch time of all linked videos, in minutes.
    pub fn watch_minutes(&self) -> u32 {
        sum_minutes(self.videos.iter().map(|v| parse_duration(&v.duration)))
    }

    pub fn primary_video(&self) -> Option<&Video> {
        self.videos.first()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ItemBody {
    Articles {
        #[serde(default)]
        content: String,
        #[serde(rename = "readTime", default)]
        read_time_minutes: u32,
    },
    Questions {
        #[serde(default)]
        question: String,
        #[serde(default)]
        answer: String,
    },
}

/// An article or flashcard-style question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(flatten)]
    pub body: ItemBody,
}

impl Item {
    pub fn item_type(&self) -> ItemType {
        match self.body {
            ItemBody::Articles { .. } => ItemType::Articles,
            ItemBody::Questions { .. } => ItemType::Questions,
        }
    }
}

/// Borrowed view of any entry in a plan, topic or item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PlanEntry<'a> {
    Topic(&'a Topic),
    Item(&'a Item),
}

impl<'a> PlanEntry<'a> {
    pub fn id(&self) -> &'a str {
        match *self {
            PlanEntry::Topic(t) => &t.id,
            PlanEntry::Item(i) => &i.id,
        }
    }

    pub fn title(&self) -> &'a str {
        match *self {
            PlanEntry::Topic(t) => &t.topic_name,
            PlanEntry::Item(i) => &i.title,
        }
    }

    pub fn completed(&self) -> bool {
        match self {
            PlanEntry::Topic(t) => t.completed,
            PlanEntry::Item(i) => i.completed,
        }
    }

    pub fn item_type(&self) -> ItemType {
        match self {
            PlanEntry::Topic(_) => ItemType::Videos,
            PlanEntry::Item(i) => i.item_type(),
        }
    }
}

// The three source collections. `completed` is derived and only exists on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Tabs {
    #[serde(default)]
    pub videos: Vec<Topic>,
    #[serde(default)]
    pub articles: Vec<Item>,
    #[serde(default)]
    pub questions: Vec<Item>,
}

impl Tabs {
    pub fn total_count(&self) -> usize {
        self.videos.len() + self.articles.len() + self.questions.len()
    }

    pub fn completed(&self) -> Vec<PlanEntry<'_>> {
        reconcile::completed_view(self)
    }

    pub fn entries(&self) -> impl Iterator<Item = PlanEntry<'_>> + '_ {
        self.videos
            .iter()
            .map(PlanEntry::Topic)
            .chain(self.articles.iter().map(PlanEntry::Item))
            .chain(self.questions.iter().map(PlanEntry::Item))
    }

    pub fn find(&self, id: &str) -> Option<PlanEntry<'_>> {
        self.entries().find(|e| e.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }
}

impl Serialize for Tabs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Tabs", 4)?;
        state.serialize_field("videos", &self.videos)?;
        state.serialize_field("articles", &self.articles)?;
        state.serialize_field("questions", &self.questions)?;
        state.serialize_field("completed", &self.completed())?;
        state.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyPlan {
    pub subject: String,
    pub created_at: DateTime<Utc>,
    pub total_time: u32,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub tabs: Tabs,
}

impl StudyPlan {
    pub fn empty() -> Self {
        Self {
            subject: DEFAULT_SUBJECT.to_string(),
            created_at: Utc::now(),
            total_time: 0,
            difficulty: Difficulty::Medium,
            progress: 0,
            tabs: Tabs::default(),
        }
    }
}

/// Field set of the add/edit form. Which fields apply depends on `item_type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemForm {
    pub item_type: ItemType,
    pub title: String,
    pub url: String,
    pub channel: String,
    pub duration: String,
    pub content: String,
    pub question: String,
    pub answer: String,
    pub topic_name: String,
    pub importance: u8,
    pub prep_time_minutes: u32,
}

impl Default for ItemForm {
    fn default() -> Self {
        Self {
            item_type: ItemType::Videos,
            title: String::new(),
            url: String::new(),
            channel: String::new(),
            duration: String::new(),
            content: String::new(),
            question: String::new(),
            answer: String::new(),
            topic_name: String::new(),
            importance: 5,
            prep_time_minutes: 30,
        }
    }
}

impl ItemForm {
    /// Prefill the form from an existing entry, as the edit dialog does.
    pub fn from_entry(entry: PlanEntry<'_>) -> Self {
        match entry {
            PlanEntry::Topic(topic) => {
                let video = topic.primary_video().cloned().unwrap_or_default();
                let title = if video.title.is_empty() {
                    topic.topic_name.clone()
                } else {
                    video.title
                };
                Self {
                    item_type: ItemType::Videos,
                    title,
                    url: video.url,
                    channel: video.channel,
                    duration: video.duration,
                    topic_name: topic.topic_name.clone(),
                    importance: topic.importance,
                    prep_time_minutes: topic.prep_time_minutes,
                    ..Self::default()
                }
            }
            PlanEntry::Item(item) => {
                let mut form = Self {
                    item_type: item.item_type(),
                    title: item.title.clone(),
                    ..Self::default()
                };
                match &item.body {
                    ItemBody::Articles { content, .. } => form.content = content.clone(),
                    ItemBody::Questions { question, answer } => {
                        form.question = question.clone();
                        form.answer = answer.clone();
                    }
                }
                form
            }
        }
    }

    /// Topic name falls back to the title when left blank.
    pub fn effective_topic_name(&self) -> &str {
        if self.topic_name.trim().is_empty() {
            &self.title
        } else {
            &self.topic_name
        }
    }
}

// === Backend payloads ===

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanMetadata {
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub class_level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionPayload {
    pub question: String,
    #[serde(default)]
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicPayload {
    pub topic_name: String,
    #[serde(default = "default_importance", deserialize_with = "importance_from_number")]
    pub importance: u8,
    #[serde(default, deserialize_with = "minutes_from_number")]
    pub prep_time_minutes: u32,
    #[serde(default)]
    pub videos: Vec<Video>,
}

fn default_importance() -> u8 {
    5
}

// Generated numbers may be fractional, negative, quoted or null.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| match v {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
        .filter(|n| n.is_finite()))
}

fn importance_from_number<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_number(deserializer)?
        .map(|n| n.round().clamp(MIN_IMPORTANCE as f64, MAX_IMPORTANCE as f64) as u8)
        .unwrap_or_else(default_importance))
}

fn minutes_from_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_number(deserializer)?
        .map(|n| n.round().clamp(0.0, u32::MAX as f64) as u32)
        .unwrap_or(0))
}

/// Response of the plan generation endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationPayload {
    #[serde(default)]
    pub metadata: Option<PlanMetadata>,
    // Absent means the payload is not a study plan at all.
    #[serde(default)]
    pub study_plan: Option<Vec<QuestionPayload>>,
    #[serde(default)]
    pub topics_with_videos: Vec<TopicPayload>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityAuthor {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Community {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub upvotes: i64,
    #[serde(default)]
    pub downvotes: i64,
    #[serde(default)]
    pub member_count: Option<i64>,
    #[serde(default)]
    pub user: Option<CommunityAuthor>,
}

impl Community {
    pub fn score(&self) -> i64 {
        self.upvotes - self.downvotes
    }

    pub fn author_name(&self) -> &str {
        self.user.as_ref().map_or("Anonymous", |u| u.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub preferences: Vec<String>,
    #[serde(default)]
    pub role: Option<String>,
}

// JSON output wrapper for CLI
#[derive(Debug, Serialize)]
pub struct JsonOutput<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

// === Helpers ===

/// Base-36 timestamp followed by base-36 random entropy.
pub fn generate_id() -> String {
    let millis = Utc::now().timestamp_millis().max(0) as u64;
    let entropy: u64 = rand::thread_rng().gen();
    let mut suffix = to_base36(entropy);
    suffix.truncate(11);
    format!("{}{}", to_base36(millis), suffix)
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

pub fn clamp_importance(importance: u8) -> u8 {
    importance.clamp(MIN_IMPORTANCE, MAX_IMPORTANCE)
}

/// Minute totals saturate at `u32::MAX` instead of wrapping.
pub fn sum_minutes(minutes: impl IntoIterator<Item = u32>) -> u32 {
    minutes.into_iter().fold(0, u32::saturating_add)
}

/// Reading time in minutes at a thousand characters per minute.
pub fn read_time_minutes(content: &str) -> u32 {
    let chars = u32::try_from(content.chars().count()).unwrap_or(u32::MAX);
    chars.div_ceil(1000)
}

fn iso_duration_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?").expect("valid duration regex")
    })
}

fn minutes_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)\s*minutes?").expect("valid minutes regex"))
}

/// Convert a video duration (`PT12M30S` or `10 minutes`) to whole minutes.
pub fn parse_duration(duration: &str) -> u32 {
    if duration.is_empty() {
        return 0;
    }

    if let Some(caps) = iso_duration_re().captures(duration) {
        let part = |i: usize| -> Option<u32> { caps.get(i).and_then(|m| m.as_str().parse().ok()) };
        let (hours, minutes, seconds) = (part(1), part(2), part(3));
        if hours.is_some() || minutes.is_some() || seconds.is_some() {
            let rounded = seconds.unwrap_or(0).saturating_add(30) / 60;
            return hours
                .unwrap_or(0)
                .saturating_mul(60)
                .saturating_add(minutes.unwrap_or(0))
                .saturating_add(rounded);
        }
    }

    minutes_re()
        .captures(duration)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}
