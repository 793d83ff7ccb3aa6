//! The study plan store.
//!
//! `StudyPlanStore` owns one plan and is the only place it is mutated. Each
//! mutation finishes by recomputing progress and writing the plan back to the
//! key-value storage, so a snapshot read after any call is always consistent
//! and durable.

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::db::KeyValueStore;
use crate::error::{Error, Result};
use crate::models::{
    clamp_importance, generate_id, read_time_minutes, sum_minutes, Difficulty, GenerationPayload,
    Item, ItemBody, ItemForm, ItemType, PlanEntry, StudyPlan, Tabs, Topic, Video,
    DEFAULT_SUBJECT, PLACEHOLDER_THUMBNAIL, PLACEHOLDER_VIDEO_ID,
};
use crate::reconcile;

/// The user's persisted plan.
pub const PLAN_KEY: &str = "studyPlan";
/// A freshly generated backend payload waiting to be hydrated.
pub const PAYLOAD_KEY: &str = "Data";
/// The most recent payload, kept after hydration.
pub const LAST_GENERATION_KEY: &str = "lastGeneration";

pub struct StudyPlanStore<S: KeyValueStore> {
    storage: S,
    plan: StudyPlan,
}

impl<S: KeyValueStore> StudyPlanStore<S> {
    /// Pending payload first, then the saved plan, then an empty plan. Never fails.
    pub fn load(storage: S) -> Self {
        let plan = Self::read_plan(&storage);
        let mut store = Self { storage, plan };
        if let Err(e) = store.commit() {
            warn!(error = %e, "could not persist loaded plan");
        }
        store
    }

    /// Re-read the plan from storage, picking up writes made elsewhere.
    pub fn reload(&mut self) -> Result<()> {
        self.plan = Self::read_plan(&self.storage);
        self.commit()
    }

    pub fn plan(&self) -> &StudyPlan {
        &self.plan
    }

    pub fn find(&self, id: &str) -> Option<PlanEntry<'_>> {
        self.plan.tabs.find(id)
    }

    /// Stage a backend payload and hydrate the plan from it.
    ///
    /// A payload that fails to parse is reported as is and never staged.
    pub fn import_generation(&mut self, payload: &serde_json::Value) -> Result<()> {
        let parsed = GenerationPayload::deserialize(payload)?;
        if parsed.study_plan.is_none() {
            return Err(Error::InvalidInput(
                "backend response does not contain a study plan".to_string(),
            ));
        }

        self.storage.save_json(PAYLOAD_KEY, payload)?;
        match Self::hydrate_pending(&self.storage) {
            Some(plan) => {
                self.plan = plan;
                self.commit()
            }
            None => {
                self.storage.remove(PAYLOAD_KEY)?;
                Err(Error::InvalidInput(
                    "staged payload could not be hydrated".to_string(),
                ))
            }
        }
    }

    /// Returns the id of the new entry.
    pub fn add_item(&mut self, form: &ItemForm) -> Result<String> {
        let id = self.fresh_id();

        match form.item_type {
            ItemType::Videos => {
                let topic = Topic {
                    id: id.clone(),
                    topic_name: form.effective_topic_name().to_string(),
                    importance: clamp_importance(form.importance),
                    prep_time_minutes: form.prep_time_minutes,
                    completed: false,
                    videos: vec![Video {
                        title: form.title.clone(),
                        url: form.url.clone(),
                        channel: form.channel.clone(),
                        duration: form.duration.clone(),
                        thumbnail: PLACEHOLDER_THUMBNAIL.to_string(),
                        video_id: PLACEHOLDER_VIDEO_ID.to_string(),
                        views: "0".to_string(),
                    }],
                };
                self.plan.total_time =
                    self.plan.total_time.saturating_add(form.prep_time_minutes);
                self.plan.tabs.videos.push(topic);
            }
            ItemType::Articles => self.plan.tabs.articles.push(Item {
                id: id.clone(),
                title: form.title.clone(),
                completed: false,
                body: ItemBody::Articles {
                    content: form.content.clone(),
                    read_time_minutes: read_time_minutes(&form.content),
                },
            }),
            ItemType::Questions => self.plan.tabs.questions.push(Item {
                id: id.clone(),
                title: form.title.clone(),
                completed: false,
                body: ItemBody::Questions {
                    question: form.question.clone(),
                    answer: form.answer.clone(),
                },
            }),
        }

        info!(%id, kind = form.item_type.as_str(), "added item");
        self.commit()?;
        Ok(id)
    }

    /// Replace the editable fields of an entry in place. `Ok(false)` if no entry has `id`.
    pub fn edit_item(&mut self, id: &str, form: &ItemForm) -> Result<bool> {
        let tabs = &mut self.plan.tabs;

        if let Some(topic) = tabs.videos.iter_mut().find(|t| t.id == id) {
            topic.topic_name = form.effective_topic_name().to_string();
            topic.importance = clamp_importance(form.importance);
            topic.prep_time_minutes = form.prep_time_minutes;
            if let Some(video) = topic.videos.first_mut() {
                video.title = form.title.clone();
                video.channel = form.channel.clone();
                video.duration = form.duration.clone();
                video.url = form.url.clone();
            }
        } else if let Some(item) = find_item_mut(tabs, id) {
            item.title = form.title.clone();
            match &mut item.body {
                ItemBody::Articles {
                    content,
                    read_time_minutes: minutes,
                } => {
                    *content = form.content.clone();
                    *minutes = read_time_minutes(content);
                }
                ItemBody::Questions { question, answer } => {
                    *question = form.question.clone();
                    *answer = form.answer.clone();
                }
            }
        } else {
            debug!(%id, "edit: no such item");
            return Ok(false);
        }

        info!(%id, "edited item");
        self.commit()?;
        Ok(true)
    }

    /// `Ok(false)` if no entry has `id`.
    pub fn delete_item(&mut self, id: &str) -> Result<bool> {
        let tabs = &mut self.plan.tabs;
        let before = tabs.total_count();

        tabs.videos.retain(|t| t.id != id);
        tabs.articles.retain(|i| i.id != id);
        tabs.questions.retain(|i| i.id != id);

        if tabs.total_count() == before {
            debug!(%id, "delete: no such item");
            return Ok(false);
        }

        info!(%id, "deleted item");
        self.commit()?;
        Ok(true)
    }

    /// Returns the new completion state, or `None` if no entry has `id`.
    pub fn toggle_complete(&mut self, id: &str) -> Result<Option<bool>> {
        let tabs = &mut self.plan.tabs;

        let flag = if let Some(topic) = tabs.videos.iter_mut().find(|t| t.id == id) {
            &mut topic.completed
        } else if let Some(item) = find_item_mut(tabs, id) {
            &mut item.completed
        } else {
            debug!(%id, "toggle: no such item");
            return Ok(None);
        };

        *flag = !*flag;
        let completed = *flag;

        info!(%id, completed, "toggled item");
        self.commit()?;
        Ok(Some(completed))
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) -> Result<()> {
        info!(difficulty = difficulty.as_str(), "set difficulty");
        self.plan.difficulty = difficulty;
        self.commit()
    }

    pub fn rename_subject(&mut self, subject: &str) -> Result<()> {
        self.plan.subject = subject.to_string();
        self.commit()
    }

    /// Drop the current plan and start over with an empty one.
    pub fn reset(&mut self) -> Result<()> {
        info!("resetting study plan");
        self.plan = StudyPlan::empty();
        self.commit()
    }

    fn commit(&mut self) -> Result<()> {
        reconcile::refresh_progress(&mut self.plan);
        self.storage.save_json(PLAN_KEY, &self.plan)
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = generate_id();
            if !self.plan.tabs.contains(&id) {
                return id;
            }
        }
    }

    fn read_plan(storage: &S) -> StudyPlan {
        Self::hydrate_pending(storage)
            .or_else(|| Self::load_saved(storage))
            .unwrap_or_else(|| {
                debug!("no stored plan, starting empty");
                StudyPlan::empty()
            })
    }

    fn hydrate_pending(storage: &S) -> Option<StudyPlan> {
        let raw = match storage.load(PAYLOAD_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "could not read pending payload");
                return None;
            }
        };

        let payload: GenerationPayload = match serde_json::from_str(&raw) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "pending payload is not valid JSON, ignoring");
                return None;
            }
        };

        let plan = hydrate(payload)?;

        // Archive so the next load starts from the user's edits, not the payload.
        if let Err(e) = storage
            .save(LAST_GENERATION_KEY, &raw)
            .and_then(|_| storage.remove(PAYLOAD_KEY))
        {
            warn!(error = %e, "could not archive generation payload");
        }

        info!(
            subject = %plan.subject,
            topics = plan.tabs.videos.len(),
            questions = plan.tabs.questions.len(),
            "hydrated plan from generation payload"
        );
        Some(plan)
    }

    fn load_saved(storage: &S) -> Option<StudyPlan> {
        match storage.load_json::<StudyPlan>(PLAN_KEY) {
            Ok(plan) => plan,
            Err(e) => {
                warn!(error = %e, "saved plan is unreadable, ignoring");
                None
            }
        }
    }
}

fn find_item_mut<'a>(tabs: &'a mut Tabs, id: &str) -> Option<&'a mut Item> {
    tabs.articles
        .iter_mut()
        .chain(tabs.questions.iter_mut())
        .find(|i| i.id == id)
}

/// Build a plan from a generation payload. `None` when it carries no study plan.
pub fn hydrate(payload: GenerationPayload) -> Option<StudyPlan> {
    let questions = payload.study_plan?;

    let videos: Vec<Topic> = payload
        .topics_with_videos
        .into_iter()
        .map(|t| Topic {
            id: generate_id(),
            topic_name: t.topic_name,
            importance: clamp_importance(t.importance),
            prep_time_minutes: t.prep_time_minutes,
            completed: false,
            videos: t.videos,
        })
        .collect();

    let questions: Vec<Item> = questions
        .into_iter()
        .map(|q| Item {
            id: generate_id(),
            title: q.question.clone(),
            completed: false,
            body: ItemBody::Questions {
                question: q.question,
                answer: q.recommendation,
            },
        })
        .collect();

    let subject = payload
        .metadata
        .and_then(|m| m.subject)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SUBJECT.to_string());

    let mut plan = StudyPlan::empty();
    plan.subject = subject;
    plan.total_time = sum_minutes(videos.iter().map(|t| t.prep_time_minutes));
    plan.tabs = Tabs {
        videos,
        articles: Vec::new(),
        questions,
    };
    Some(reconcile::recompute(plan))
}
