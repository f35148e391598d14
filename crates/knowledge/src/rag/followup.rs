//! Template-driven follow-up questions.
//!
//! Suggestions come from fixed per-topic templates so they stay available
//! when answer generation is down.

use handbook_core::RetrievalConfig;
use handbook_prompt::render_template;
use std::collections::HashSet;

use crate::text::normalize_phrase;
use crate::types::{Topic, Turn};

/// Templates shared by every topic, tried after the topic's own.
const SHARED_TEMPLATES: &[&str] = &[
    "How does {{topic}} work in practice at scale?",
    "What metrics define success for {{topic}}?",
    "Can you give an example of {{topic}}?",
];

/// Used when no topic was touched or every candidate was filtered out.
const GENERIC_PROMPTS: &[&str] = &[
    "Which part of the handbook would you like to explore: onboarding, culture, remote work, performance or product strategy?",
    "Could you rephrase the question with a bit more detail?",
    "Would you like an overview of how the company works?",
];

fn topic_templates(topic: Topic) -> &'static [&'static str] {
    match topic {
        Topic::Onboarding => &[
            "What should I focus on during my first week?",
            "How does the onboarding buddy program work?",
        ],
        Topic::Culture => &[
            "How are the company values applied day to day?",
            "How does transparency shape decision making?",
        ],
        Topic::RemoteWork => &[
            "How do teams collaborate across time zones?",
            "What tools support asynchronous work?",
        ],
        Topic::Performance => &[
            "How often do performance reviews happen?",
            "How does the promotion process work?",
        ],
        Topic::ProductStrategy => &[
            "What are the current product priorities?",
            "How does customer feedback shape the roadmap?",
        ],
        Topic::Other => &[],
    }
}

/// Everything the generator looks at for one turn.
#[derive(Debug, Clone, Copy)]
pub struct TurnContext<'a> {
    pub query: &'a str,

    pub answer: &'a str,

    /// Topics of the turn's sources, in source order
    pub topics: &'a [Topic],

    /// Earlier turns, oldest first
    pub history: &'a [Turn],
}

#[derive(Debug, Clone)]
pub struct FollowUpGenerator {
    max_follow_ups: usize,
    history_window: usize,
}

impl FollowUpGenerator {
    pub fn new(config: &RetrievalConfig) -> Self {
        Self {
            max_follow_ups: config.max_follow_ups,
            history_window: config.history_window,
        }
    }

    /// Up to `max_follow_ups` suggestions, round-robin across topics.
    ///
    /// A suggestion is dropped when its normalized text matches the current
    /// query, one of the last `history_window` queries, or an earlier
    /// suggestion, or when the answer already contains it.
    pub fn generate(&self, context: &TurnContext<'_>) -> Vec<String> {
        let mut seen: HashSet<String> = context
            .history
            .iter()
            .rev()
            .take(self.history_window)
            .map(|turn| normalize_phrase(&turn.query_text))
            .collect();
        seen.insert(normalize_phrase(context.query));

        let answer = normalize_phrase(context.answer);
        let mut accept = |candidate: String, out: &mut Vec<String>| {
            let key = normalize_phrase(&candidate);
            if key.is_empty() || (!answer.is_empty() && answer.contains(&key)) {
                return;
            }
            if seen.insert(key) {
                out.push(candidate);
            }
        };

        let mut topics: Vec<Topic> = Vec::new();
        for topic in context.topics {
            if !topics.contains(topic) {
                topics.push(*topic);
            }
        }

        let queues: Vec<Vec<String>> = topics.iter().map(|t| candidates_for(*t)).collect();
        let mut out = Vec::new();

        let mut round = 0;
        'rounds: loop {
            let mut any = false;
            for queue in &queues {
                if let Some(candidate) = queue.get(round) {
                    any = true;
                    accept(candidate.clone(), &mut out);
                    if out.len() >= self.max_follow_ups {
                        break 'rounds;
                    }
                }
            }
            if !any {
                break;
            }
            round += 1;
        }

        if out.is_empty() {
            for prompt in GENERIC_PROMPTS {
                if out.len() >= self.max_follow_ups {
                    break;
                }
                accept(prompt.to_string(), &mut out);
            }
        }

        tracing::debug!(
            topics = topics.len(),
            suggestions = out.len(),
            "Generated follow-ups"
        );
        out
    }
}

/// Rendered candidates for one topic, topic-specific first.
fn candidates_for(topic: Topic) -> Vec<String> {
    let data = serde_json::json!({ "topic": topic.label() });

    topic_templates(topic)
        .iter()
        .chain(SHARED_TEMPLATES)
        .filter_map(|template| match render_template(template, &data) {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!("Skipping follow-up template for {}: {}", topic, e);
                None
            }
        })
        .collect()
}
