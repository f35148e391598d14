//! Built-in curated handbook corpus.
//!
//! Used when the workspace has no persisted store yet. One document per topic.

use chrono::{DateTime, Utc};

use crate::types::{Document, SourceKind, Topic};

struct CuratedEntry {
    id: &'static str,
    topic: Topic,
    title: &'static str,
    url: &'static str,
    keywords: &'static [&'static str],
    body: &'static str,
}

const CURATED: &[CuratedEntry] = &[
    CuratedEntry {
        id: "onboarding",
        topic: Topic::Onboarding,
        title: "Onboarding Guide",
        url: "https://handbook.gitlab.com/handbook/people-group/general-onboarding/",
        keywords: &["onboarding", "new hire", "welcome", "training", "setup"],
        body: "The onboarding process for new team members includes a welcome call with \
               the People Operations team and full access to the handbook for self-paced \
               learning. New hires are introduced to their immediate team and key \
               cross-functional stakeholders. Technical setup covers tool access and \
               security training. Managers hold structured 30-60-90 day check-ins. Every \
               new hire is paired with an experienced onboarding buddy. Culture and values \
               training, security awareness and compliance modules, and product overview \
               sessions round out the first weeks. Feedback from each cohort is used to \
               improve the onboarding experience.",
    },
    CuratedEntry {
        id: "culture",
        topic: Topic::Culture,
        title: "Company Values and Culture",
        url: "https://handbook.gitlab.com/handbook/values/",
        keywords: &["culture", "values", "transparency", "collaboration", "remote"],
        body: "Company culture is built on transparency and collaboration. Company \
               information is public by default, which fosters trust. Teams work across \
               functions with open communication. Iteration means continuous improvement in \
               small, measurable steps. Results matter more than hours worked. Efficiency \
               comes from automation and clear processes. Diversity and inclusion create a \
               welcoming environment for everyone. Asynchronous communication respects \
               global time zones, and decisions are made transparently in public.",
    },
    CuratedEntry {
        id: "remote-work",
        topic: Topic::RemoteWork,
        title: "All-Remote Work",
        url: "https://handbook.gitlab.com/company/culture/all-remote/",
        keywords: &["remote", "work from home", "distributed", "async", "flexible"],
        body: "The company has been fully remote since 2011 with no physical offices. \
               Asynchronous communication is preferred over real-time meetings. Working \
               hours are flexible and respect personal schedules and time zones. The global \
               team spans multiple continents. The toolstack covers source control, chat, \
               video calls and shared documents. Teams hold regular structured meetings and \
               individual one-on-ones. Knowledge sharing is documentation-first. Hiring, \
               onboarding and collaboration processes are designed for a distributed team, \
               with strong support for work-life balance and mental health.",
    },
    CuratedEntry {
        id: "performance",
        topic: Topic::Performance,
        title: "Performance and Development",
        url: "https://handbook.gitlab.com/handbook/people-group/performance-and-development/",
        keywords: &["performance", "review", "feedback", "development", "promotion"],
        body: "Performance management runs on quarterly review cycles with clear \
               expectations. Reviews gather 360-degree feedback from peers, reports and \
               managers. Goals are aligned with company objectives and individual growth. \
               Managers hold regular career development discussions and structured \
               one-on-ones. Peer recognition programs acknowledge good work publicly. \
               Performance improvement plans carry clear metrics and timelines. Promotion \
               processes and career paths are transparent, and training stipends support \
               continuous learning.",
    },
    CuratedEntry {
        id: "product-strategy",
        topic: Topic::ProductStrategy,
        title: "Product Direction",
        url: "https://about.gitlab.com/direction/",
        keywords: &["product", "strategy", "devops", "platform", "direction", "vision"],
        body: "The product strategy is a single DevOps platform covering the entire \
               software development lifecycle. The company is committed to its open source \
               community and contributions. Enterprise customers get security, compliance \
               and scalability features. Cloud-native solutions target modern \
               infrastructure. AI integration improves developer productivity, and the \
               roadmap focuses on developer experience and workflow efficiency. Market \
               expansion, customer success programs and community feedback drive \
               continuous innovation.",
    },
];

/// The curated documents, all stamped with `now`.
pub fn default_documents(now: DateTime<Utc>) -> Vec<Document> {
    CURATED
        .iter()
        .map(|entry| {
            Document::new(
                entry.id,
                entry.topic,
                entry.title,
                entry.body,
                entry.url,
                SourceKind::Curated,
                now,
                entry.keywords,
            )
        })
        .collect()
}
