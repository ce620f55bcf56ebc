//! Per-relation counters reported by a merge.

use serde::Serialize;

/// Transferred / collapsed counts for one relation type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelationStats {
    pub transferred: u64,
    pub deleted: u64,
}

impl RelationStats {
    pub fn total(&self) -> u64 {
        self.transferred + self.deleted
    }
}

/// Counters for every relation a merge touches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub alternative_names: RelationStats,
    pub cast_credits: RelationStats,
    pub crew_credits: RelationStats,
    pub links: RelationStats,
    pub nationalities: RelationStats,
    pub image_appearances: RelationStats,
    pub awards: RelationStats,
    pub jury_seats: RelationStats,
    pub award_wins: RelationStats,
    pub page_views: RelationStats,
}

/// Wire shape of [`MergeStats`] in the merge response.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MergeStatsReport {
    pub alternative_names_transferred: u64,
    pub alternative_names_deleted: u64,
    pub cast_credits_transferred: u64,
    pub cast_credits_deleted: u64,
    pub crew_credits_transferred: u64,
    pub crew_credits_deleted: u64,
    pub links_transferred: u64,
    pub links_deleted: u64,
    pub nationalities_added: u64,
    pub nationalities_deleted: u64,
    pub image_appearances_transferred: u64,
    pub image_appearances_deleted: u64,
    pub awards_reassigned: u64,
    pub jury_reassigned: u64,
    pub jury_deleted: u64,
    pub award_winners_reassigned: u64,
    pub page_views_reassigned: u64,
}

impl From<&MergeStats> for MergeStatsReport {
    fn from(s: &MergeStats) -> Self {
        Self {
            alternative_names_transferred: s.alternative_names.transferred,
            alternative_names_deleted: s.alternative_names.deleted,
            cast_credits_transferred: s.cast_credits.transferred,
            cast_credits_deleted: s.cast_credits.deleted,
            crew_credits_transferred: s.crew_credits.transferred,
            crew_credits_deleted: s.crew_credits.deleted,
            links_transferred: s.links.transferred,
            links_deleted: s.links.deleted,
            nationalities_added: s.nationalities.transferred,
            nationalities_deleted: s.nationalities.deleted,
            image_appearances_transferred: s.image_appearances.transferred,
            image_appearances_deleted: s.image_appearances.deleted,
            awards_reassigned: s.awards.transferred,
            jury_reassigned: s.jury_seats.transferred,
            jury_deleted: s.jury_seats.deleted,
            award_winners_reassigned: s.award_wins.transferred,
            page_views_reassigned: s.page_views.transferred,
        }
    }
}
