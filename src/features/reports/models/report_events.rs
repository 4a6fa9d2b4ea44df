use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Allowed event tags, in `reports_events` column order.
///
/// Positional SQL (`INSERT ... VALUES ($2, ..., $12)`) relies on this order; do not reorder.
pub const EVENT_NAMES: [&str; 11] = [
    "lights",
    "out_of_body",
    "seen_spirits",
    "tunnel_vision",
    "watched_life_movie",
    "feel_peace_and_love",
    "dont_want_come_back",
    "no_more_death_fear",
    "seen_death_parents",
    "other_dimension",
    "need_finish_mission",
];

/// Exact, case-sensitive membership in [`EVENT_NAMES`]
pub fn is_known_event(tag: &str) -> bool {
    EVENT_NAMES.contains(&tag)
}

/// Phenomena reported in one experience, one flag per `reports_events` column
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema,
)]
#[serde(deny_unknown_fields)]
pub struct EventRecord {
    pub lights: bool,
    pub out_of_body: bool,
    pub seen_spirits: bool,
    pub tunnel_vision: bool,
    pub watched_life_movie: bool,
    pub feel_peace_and_love: bool,
    pub dont_want_come_back: bool,
    pub no_more_death_fear: bool,
    pub seen_death_parents: bool,
    pub other_dimension: bool,
    pub need_finish_mission: bool,
}

impl EventRecord {
    /// A flag is set iff its exact name occurs in `tags`; unknown tags are ignored.
    pub fn from_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut record = Self::default();
        for tag in tags {
            if let Some(flag) = record.flag_mut(tag.as_ref()) {
                *flag = true;
            }
        }
        record
    }

    fn flag_mut(&mut self, name: &str) -> Option<&mut bool> {
        match name {
            "lights" => Some(&mut self.lights),
            "out_of_body" => Some(&mut self.out_of_body),
            "seen_spirits" => Some(&mut self.seen_spirits),
            "tunnel_vision" => Some(&mut self.tunnel_vision),
            "watched_life_movie" => Some(&mut self.watched_life_movie),
            "feel_peace_and_love" => Some(&mut self.feel_peace_and_love),
            "dont_want_come_back" => Some(&mut self.dont_want_come_back),
            "no_more_death_fear" => Some(&mut self.no_more_death_fear),
            "seen_death_parents" => Some(&mut self.seen_death_parents),
            "other_dimension" => Some(&mut self.other_dimension),
            "need_finish_mission" => Some(&mut self.need_finish_mission),
            _ => None,
        }
    }

    /// `(column, value)` pairs in [`EVENT_NAMES`] order
    pub fn columns(&self) -> [(&'static str, bool); 11] {
        [
            ("lights", self.lights),
            ("out_of_body", self.out_of_body),
            ("seen_spirits", self.seen_spirits),
            ("tunnel_vision", self.tunnel_vision),
            ("watched_life_movie", self.watched_life_movie),
            ("feel_peace_and_love", self.feel_peace_and_love),
            ("dont_want_come_back", self.dont_want_come_back),
            ("no_more_death_fear", self.no_more_death_fear),
            ("seen_death_parents", self.seen_death_parents),
            ("other_dimension", self.other_dimension),
            ("need_finish_mission", self.need_finish_mission),
        ]
    }

    /// Parallel column-name and value lists for an INSERT
    pub fn to_columns(&self) -> (Vec<&'static str>, Vec<bool>) {
        self.columns().into_iter().unzip()
    }

    /// Tags of the flags that are set, in column order
    pub fn tags(&self) -> Vec<&'static str> {
        self.columns()
            .into_iter()
            .filter_map(|(name, set)| set.then_some(name))
            .collect()
    }
}
