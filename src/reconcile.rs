//! Derived state of a study plan.
//!
//! The three source tabs (`videos`, `articles`, `questions`) are canonical.
//! Everything here is computed from them: the `completed` view, the progress
//! percentage and the dashboard summary. Nothing in this module mutates the
//! source lists.

use serde::Serialize;

use crate::models::{sum_minutes, ItemBody, PlanEntry, StudyPlan, Tabs};

/// Pure progress recompute. Calling it twice yields the same plan.
pub fn recompute(mut plan: StudyPlan) -> StudyPlan {
    refresh_progress(&mut plan);
    plan
}

pub fn refresh_progress(plan: &mut StudyPlan) {
    plan.progress = progress_of(&plan.tabs);
}

/// `round(100 * completed / total)`, rounding half up, `0` for an empty plan.
pub fn progress_of(tabs: &Tabs) -> u8 {
    let total = tabs.total_count();
    if total == 0 {
        return 0;
    }
    let done = completed_count(tabs);
    ((200 * done + total) / (2 * total)) as u8
}

pub fn completed_count(tabs: &Tabs) -> usize {
    tabs.entries().filter(|e| e.completed()).count()
}

/// Completed entries in source order: videos, then articles, then questions.
pub fn completed_view(tabs: &Tabs) -> Vec<PlanEntry<'_>> {
    tabs.entries().filter(|e| e.completed()).collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlanSummary {
    pub videos: usize,
    pub articles: usize,
    pub questions: usize,
    pub completed: usize,
    pub total: usize,
    pub progress: u8,
    pub watch_minutes: u32,
    pub remaining_prep_minutes: u32,
    pub reading_minutes: u32,
}

pub fn summarize(plan: &StudyPlan) -> PlanSummary {
    let tabs = &plan.tabs;
    let remaining_prep_minutes = sum_minutes(
        tabs.videos
            .iter()
            .filter(|t| !t.completed)
            .map(|t| t.prep_time_minutes),
    );
    let reading_minutes = sum_minutes(tabs.articles.iter().map(|a| match a.body {
        ItemBody::Articles {
            read_time_minutes, ..
        } => read_time_minutes,
        ItemBody::Questions { .. } => 0,
    }));

    PlanSummary {
        videos: tabs.videos.len(),
        articles: tabs.articles.len(),
        questions: tabs.questions.len(),
        completed: completed_count(tabs),
        total: tabs.total_count(),
        progress: progress_of(tabs),
        watch_minutes: sum_minutes(tabs.videos.iter().map(|t| t.watch_minutes())),
        remaining_prep_minutes,
        reading_minutes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Item, Topic, Video};

    fn topic(id: &str, completed: bool, prep: u32) -> Topic {
        Topic {
            id: id.to_string(),
            topic_name: id.to_string(),
            importance: 5,
            prep_time_minutes: prep,
            completed,
            videos: vec![Video {
                duration: "PT5M0S".to_string(),
                ..Video::default()
            }],
        }
    }

    fn article(id: &str, completed: bool) -> Item {
        Item {
            id: id.to_string(),
            title: id.to_string(),
            completed,
            body: ItemBody::Articles {
                content: String::new(),
                read_time_minutes: 3,
            },
        }
    }

    fn question(id: &str, completed: bool) -> Item {
        Item {
            id: id.to_string(),
            title: id.to_string(),
            completed,
            body: ItemBody::Questions {
                question: String::new(),
                answer: String::new(),
            },
        }
    }

    fn plan_with(tabs: Tabs) -> StudyPlan {
        StudyPlan {
            tabs,
            ..StudyPlan::empty()
        }
    }

    mod progress_tests {
        use super::*;

        #[test]
        fn empty_plan_is_zero() {
            assert_eq!(recompute(StudyPlan::empty()).progress, 0);
        }

        #[test]
        fn all_complete_is_hundred() {
            let plan = plan_with(Tabs {
                videos: vec![topic("t1", true, 10)],
                articles: vec![article("a1", true)],
                questions: vec![question("q1", true)],
            });
            assert_eq!(recompute(plan).progress, 100);
        }

        #[test]
        fn one_of_three_rounds_down() {
            let plan = plan_with(Tabs {
                videos: vec![topic("t1", true, 10)],
                articles: vec![article("a1", false)],
                questions: vec![question("q1", false)],
            });
            assert_eq!(recompute(plan).progress, 33);
        }

        #[test]
        fn two_of_three_rounds_up() {
            let plan = plan_with(Tabs {
                videos: vec![topic("t1", true, 10)],
                articles: vec![article("a1", true)],
                questions: vec![question("q1", false)],
            });
            assert_eq!(recompute(plan).progress, 67);
        }

        #[test]
        fn half_rounds_up() {
            // 1 of 8 = 12.5%
            let mut questions: Vec<Item> = (0..7).map(|i| question(&format!("q{i}"), false)).collect();
            questions.push(question("done", true));
            let plan = plan_with(Tabs {
                questions,
                ..Tabs::default()
            });
            assert_eq!(recompute(plan).progress, 13);
        }

        #[test]
        fn recompute_is_idempotent() {
            let plan = plan_with(Tabs {
                videos: vec![topic("t1", true, 10), topic("t2", false, 10)],
                ..Tabs::default()
            });
            let once = recompute(plan);
            let twice = recompute(once.clone());
            assert_eq!(once, twice);
            assert_eq!(twice.progress, 50);
        }

        #[test]
        fn stale_progress_is_overwritten() {
            let mut plan = plan_with(Tabs::default());
            plan.progress = 80;
            assert_eq!(recompute(plan).progress, 0);
        }
    }

    mod completed_view_tests {
        use super::*;

        #[test]
        fn only_completed_entries_in_source_order() {
            let tabs = Tabs {
                videos: vec![topic("t1", false, 10), topic("t2", true, 10)],
                articles: vec![article("a1", true)],
                questions: vec![question("q1", true), question("q2", false)],
            };
            let ids: Vec<&str> = completed_view(&tabs).iter().map(|e| e.id()).collect();
            assert_eq!(ids, vec!["t2", "a1", "q1"]);
        }

        #[test]
        fn view_never_exceeds_sources() {
            let tabs = Tabs {
                videos: vec![topic("t1", true, 10)],
                articles: vec![],
                questions: vec![question("q1", true)],
            };
            let view = completed_view(&tabs);
            assert!(view.len() <= tabs.total_count());
            assert!(view.iter().all(|e| tabs.contains(e.id())));
        }
    }

    mod summary_tests {
        use super::*;

        #[test]
        fn summarize_counts_and_minutes() {
            let plan = recompute(plan_with(Tabs {
                videos: vec![topic("t1", true, 20), topic("t2", false, 45)],
                articles: vec![article("a1", false)],
                questions: vec![question("q1", false)],
            }));
            let summary = summarize(&plan);
            assert_eq!(summary.videos, 2);
            assert_eq!(summary.articles, 1);
            assert_eq!(summary.questions, 1);
            assert_eq!(summary.completed, 1);
            assert_eq!(summary.total, 4);
            assert_eq!(summary.progress, 25);
            assert_eq!(summary.watch_minutes, 10);
            assert_eq!(summary.remaining_prep_minutes, 45);
            assert_eq!(summary.reading_minutes, 3);
        }

        #[test]
        fn summarize_saturates_huge_minutes() {
            let mut long = topic("t1", false, u32::MAX);
            long.videos[0].duration = "PT71582789H".to_string();
            let plan = recompute(plan_with(Tabs {
                videos: vec![long, topic("t2", false, 10)],
                articles: Vec::new(),
                questions: Vec::new(),
            }));
            let summary = summarize(&plan);
            assert_eq!(summary.watch_minutes, u32::MAX);
            assert_eq!(summary.remaining_prep_minutes, u32::MAX);
        }
    }
}
