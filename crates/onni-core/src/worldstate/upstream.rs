//! Raw upstream shapes.
//!
//! These mirror the feed's key casing (which is inconsistent between sections)
//! and are converted into the public view types right after deserialization.

use serde::Deserialize;
use serde_json::Value;
use time::OffsetDateTime;

use super::*;
use super::{date, lenient};
use crate::error::Result;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    fn into_first(self) -> Option<T> {
        match self {
            Self::Many(items) => items.into_iter().next(),
            Self::One(item) => Some(item),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct Oid {
    #[serde(rename = "$oid", default, deserialize_with = "lenient::string")]
    oid: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub(crate) struct RawWorldState {
    #[serde(deserialize_with = "lenient::string")]
    world_seed: String,
    #[serde(deserialize_with = "lenient::opt_int")]
    version: Option<i64>,
    #[serde(deserialize_with = "lenient::string")]
    mobile_version: String,
    #[serde(deserialize_with = "lenient::string")]
    build_label: String,
    #[serde(deserialize_with = "date::option_seconds")]
    time: Option<OffsetDateTime>,
    #[serde(deserialize_with = "lenient::section")]
    events: Vec<RawEvent>,
    #[serde(deserialize_with = "lenient::section")]
    alerts: Vec<RawAlert>,
    sorties: Option<OneOrMany<RawSortie>>,
    #[serde(deserialize_with = "lenient::section")]
    syndicate_missions: Vec<RawSyndicateMission>,
    #[serde(deserialize_with = "lenient::section")]
    active_missions: Vec<RawFissure>,
    #[serde(deserialize_with = "lenient::section")]
    global_upgrades: Vec<RawGlobalUpgrade>,
    #[serde(deserialize_with = "lenient::section")]
    void_traders: Vec<RawVoidTrader>,
    #[serde(deserialize_with = "lenient::section")]
    daily_deals: Vec<RawDailyDeal>,
    #[serde(deserialize_with = "lenient::section")]
    invasions: Vec<RawInvasion>,
    #[serde(
        rename = "PVPChallengeInstances",
        deserialize_with = "lenient::section"
    )]
    pvp_challenge_instances: Vec<RawPvpChallenge>,
    #[serde(deserialize_with = "lenient::floats")]
    project_pct: Vec<f64>,
    #[serde(deserialize_with = "lenient::section")]
    featured_guilds: Vec<RawGuild>,
    season_info: Option<RawSeasonInfo>,
    #[serde(alias = "PrimeVaultTraders")]
    prime_resurgence: Option<OneOrMany<RawPrimeResurgence>>,
    #[serde(deserialize_with = "lenient::boolean")]
    prime_token_availability: bool,
}

impl RawWorldState {
    pub(crate) fn into_view(self) -> Result<WorldState> {
        let void_fissures = self
            .active_missions
            .into_iter()
            .map(RawFissure::into_view)
            .collect::<Result<Vec<_>>>()?;

        Ok(WorldState {
            world_seed: self.world_seed,
            version: self.version,
            mobile_version: self.mobile_version,
            build_label: self.build_label,
            date: self.time,
            events: self.events.into_iter().map(Into::into).collect(),
            alerts: self.alerts.into_iter().map(Into::into).collect(),
            sortie: self.sorties.and_then(OneOrMany::into_first).map(Into::into),
            syndicate_missions: self.syndicate_missions.into_iter().map(Into::into).collect(),
            void_fissures,
            global_boosts: self.global_upgrades.into_iter().map(Into::into).collect(),
            void_traders: self.void_traders.into_iter().map(Into::into).collect(),
            daily_deals: self.daily_deals.into_iter().map(Into::into).collect(),
            invasions: self.invasions.into_iter().map(Into::into).collect(),
            pvp_challenges: self
                .pvp_challenge_instances
                .into_iter()
                .map(Into::into)
                .collect(),
            construction_progress: self.project_pct,
            featured_dojos: self.featured_guilds.into_iter().map(Into::into).collect(),
            season_info: self.season_info.map(Into::into),
            prime_resurgence: self
                .prime_resurgence
                .and_then(OneOrMany::into_first)
                .map(Into::into),
            prime_token_availability: self.prime_token_availability,
        })
    }
}

// ---- events ----

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct RawMessage {
    #[serde(deserialize_with = "lenient::string")]
    language_code: String,
    #[serde(deserialize_with = "lenient::string")]
    message: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct RawLink {
    #[serde(deserialize_with = "lenient::string")]
    language_code: String,
    #[serde(deserialize_with = "lenient::string")]
    link: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct RawEvent {
    #[serde(deserialize_with = "lenient::seq")]
    messages: Vec<RawMessage>,
    #[serde(deserialize_with = "lenient::seq")]
    links: Vec<RawLink>,
    #[serde(deserialize_with = "lenient::string")]
    prop: String,
    #[serde(deserialize_with = "lenient::string")]
    icon: String,
    #[serde(deserialize_with = "lenient::string")]
    image_url: String,
    #[serde(deserialize_with = "lenient::boolean")]
    priority: bool,
    #[serde(deserialize_with = "lenient::boolean")]
    mobile_only: bool,
    #[serde(deserialize_with = "lenient::boolean")]
    community: bool,
    #[serde(deserialize_with = "lenient::boolean")]
    hide_end_date_modifier: bool,
    #[serde(deserialize_with = "date::option")]
    date: Option<OffsetDateTime>,
    #[serde(deserialize_with = "date::option")]
    event_start_date: Option<OffsetDateTime>,
    #[serde(deserialize_with = "date::option")]
    event_end_date: Option<OffsetDateTime>,
}

impl From<RawEvent> for Event {
    fn from(raw: RawEvent) -> Self {
        Self {
            messages: raw
                .messages
                .into_iter()
                .map(|m| Message {
                    language_code: m.language_code,
                    message: m.message,
                })
                .collect(),
            links: raw
                .links
                .into_iter()
                .map(|l| Link {
                    language_code: l.language_code,
                    link: l.link,
                })
                .collect(),
            prop: raw.prop,
            icon: raw.icon,
            image_url: raw.image_url,
            priority: raw.priority,
            mobile_only: raw.mobile_only,
            community: raw.community,
            hide_end_date_modifier: raw.hide_end_date_modifier,
            date: raw.date,
            start_date: raw.event_start_date,
            end_date: raw.event_end_date,
        }
    }
}

// ---- rewards ----

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct RawCountedItem {
    #[serde(deserialize_with = "lenient::string")]
    item_type: String,
    #[serde(deserialize_with = "lenient::int")]
    item_count: i64,
}

impl From<RawCountedItem> for RewardItem {
    fn from(raw: RawCountedItem) -> Self {
        Self {
            item_type: raw.item_type,
            item_count: raw.item_count,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawMissionReward {
    #[serde(deserialize_with = "lenient::int")]
    credits: i64,
    #[serde(deserialize_with = "lenient::strings")]
    items: Vec<String>,
    #[serde(deserialize_with = "lenient::seq")]
    counted_items: Vec<RawCountedItem>,
}

impl From<RawMissionReward> for MissionReward {
    fn from(raw: RawMissionReward) -> Self {
        Self {
            credits: raw.credits,
            items: raw.items,
            counted_items: raw.counted_items.into_iter().map(Into::into).collect(),
        }
    }
}

/// Invasion rewards arrive as an object, or as `[]` when a side offers nothing.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawRewardField {
    Reward(RawMissionReward),
    List(Vec<Value>),
}

impl RawRewardField {
    fn into_items(self) -> Vec<RewardItem> {
        match self {
            Self::Reward(reward) => reward.counted_items.into_iter().map(Into::into).collect(),
            Self::List(_) => Vec::new(),
        }
    }
}

// ---- alerts ----

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawMissionInfo {
    #[serde(deserialize_with = "lenient::string")]
    location: String,
    #[serde(deserialize_with = "lenient::string")]
    mission_type: String,
    #[serde(deserialize_with = "lenient::string")]
    faction: String,
    #[serde(deserialize_with = "lenient::float")]
    difficulty: f64,
    #[serde(deserialize_with = "lenient::nested")]
    mission_reward: RawMissionReward,
    #[serde(deserialize_with = "lenient::string")]
    level_override: String,
    #[serde(deserialize_with = "lenient::string")]
    enemy_spec: String,
    #[serde(deserialize_with = "lenient::int")]
    min_enemy_level: i64,
    #[serde(deserialize_with = "lenient::int")]
    max_enemy_level: i64,
    #[serde(deserialize_with = "lenient::string")]
    desc_text: String,
    #[serde(deserialize_with = "lenient::int")]
    max_wave_num: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct RawAlert {
    #[serde(deserialize_with = "date::option")]
    activation: Option<OffsetDateTime>,
    #[serde(deserialize_with = "date::option")]
    expiry: Option<OffsetDateTime>,
    #[serde(deserialize_with = "lenient::nested")]
    mission_info: RawMissionInfo,
    #[serde(deserialize_with = "lenient::string")]
    tag: String,
    #[serde(deserialize_with = "lenient::boolean")]
    force_unlock: bool,
}

impl From<RawAlert> for Alert {
    fn from(raw: RawAlert) -> Self {
        let mi = raw.mission_info;
        Self {
            activation: raw.activation,
            expiry: raw.expiry,
            mission_info: MissionInfo {
                location: mi.location,
                mission_type: mi.mission_type,
                faction: mi.faction,
                difficulty: mi.difficulty,
                reward: mi.mission_reward.into(),
                level_override: mi.level_override,
                enemy_spec: mi.enemy_spec,
                min_enemy_level: mi.min_enemy_level,
                max_enemy_level: mi.max_enemy_level,
                description: mi.desc_text,
                max_wave_num: mi.max_wave_num,
            },
            tag: raw.tag,
            force_unlock: raw.force_unlock,
        }
    }
}

// ---- sortie ----

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawSortieVariant {
    #[serde(deserialize_with = "lenient::string")]
    mission_type: String,
    #[serde(deserialize_with = "lenient::string")]
    modifier_type: String,
    #[serde(deserialize_with = "lenient::string")]
    node: String,
    #[serde(deserialize_with = "lenient::string")]
    tileset: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct RawSortie {
    #[serde(deserialize_with = "date::option")]
    activation: Option<OffsetDateTime>,
    #[serde(deserialize_with = "date::option")]
    expiry: Option<OffsetDateTime>,
    #[serde(deserialize_with = "lenient::string")]
    boss: String,
    #[serde(deserialize_with = "lenient::string")]
    reward: String,
    #[serde(deserialize_with = "lenient::int")]
    seed: i64,
    #[serde(deserialize_with = "lenient::strings")]
    extra_drops: Vec<String>,
    #[serde(deserialize_with = "lenient::seq")]
    variants: Vec<RawSortieVariant>,
}

impl From<RawSortie> for Sortie {
    fn from(raw: RawSortie) -> Self {
        Self {
            activation: raw.activation,
            expiry: raw.expiry,
            boss: raw.boss,
            reward: raw.reward,
            seed: raw.seed,
            extra_drops: raw.extra_drops,
            missions: raw
                .variants
                .into_iter()
                .map(|v| SortieMission {
                    mission_type: v.mission_type,
                    modifier: v.modifier_type,
                    node: v.node,
                    tileset: v.tileset,
                })
                .collect(),
        }
    }
}

// ---- syndicates ----

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawJob {
    #[serde(deserialize_with = "lenient::string")]
    job_type: String,
    #[serde(deserialize_with = "lenient::string")]
    rewards: String,
    #[serde(rename = "masteryReq", deserialize_with = "lenient::int")]
    mastery_required: i64,
    #[serde(deserialize_with = "lenient::int")]
    min_enemy_level: i64,
    #[serde(deserialize_with = "lenient::int")]
    max_enemy_level: i64,
    #[serde(deserialize_with = "lenient::ints")]
    xp_amounts: Vec<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct RawSyndicateMission {
    #[serde(deserialize_with = "date::option")]
    activation: Option<OffsetDateTime>,
    #[serde(deserialize_with = "date::option")]
    expiry: Option<OffsetDateTime>,
    #[serde(deserialize_with = "lenient::string")]
    tag: String,
    #[serde(deserialize_with = "lenient::int")]
    seed: i64,
    #[serde(deserialize_with = "lenient::strings")]
    nodes: Vec<String>,
    #[serde(deserialize_with = "lenient::opt_seq")]
    jobs: Option<Vec<RawJob>>,
}

impl From<RawSyndicateMission> for SyndicateMission {
    fn from(raw: RawSyndicateMission) -> Self {
        Self {
            activation: raw.activation,
            expiry: raw.expiry,
            tag: raw.tag,
            seed: raw.seed,
            nodes: raw.nodes,
            jobs: raw.jobs.map(|jobs| {
                jobs.into_iter()
                    .map(|j| OpenWorldJob {
                        job_type: j.job_type,
                        rewards: j.rewards,
                        mastery_required: j.mastery_required,
                        min_enemy_level: j.min_enemy_level,
                        max_enemy_level: j.max_enemy_level,
                        xp_amounts: j.xp_amounts,
                    })
                    .collect()
            }),
        }
    }
}

// ---- fissures ----

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct RawFissure {
    #[serde(deserialize_with = "date::option")]
    activation: Option<OffsetDateTime>,
    #[serde(deserialize_with = "date::option")]
    expiry: Option<OffsetDateTime>,
    #[serde(deserialize_with = "lenient::string")]
    node: String,
    #[serde(deserialize_with = "lenient::string")]
    mission_type: String,
    #[serde(deserialize_with = "lenient::int")]
    region: i64,
    #[serde(deserialize_with = "lenient::int")]
    seed: i64,
    #[serde(deserialize_with = "lenient::string")]
    modifier: String,
    #[serde(deserialize_with = "lenient::boolean")]
    hard: bool,
}

impl RawFissure {
    fn into_view(self) -> Result<VoidFissure> {
        Ok(VoidFissure {
            activation: self.activation,
            expiry: self.expiry,
            node: self.node,
            mission_type: self.mission_type,
            region: self.region,
            seed: self.seed,
            era: RelicEra::from_tier(&self.modifier)?,
            hard: self.hard,
        })
    }
}

// ---- boosts, traders, deals ----

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct RawGlobalUpgrade {
    #[serde(deserialize_with = "date::option")]
    activation: Option<OffsetDateTime>,
    #[serde(deserialize_with = "date::option")]
    expiry_date: Option<OffsetDateTime>,
    #[serde(deserialize_with = "lenient::string")]
    upgrade_type: String,
    #[serde(deserialize_with = "lenient::string")]
    operation_type: String,
    #[serde(deserialize_with = "lenient::float")]
    value: f64,
}

impl From<RawGlobalUpgrade> for GlobalBoost {
    fn from(raw: RawGlobalUpgrade) -> Self {
        Self {
            kind: BoostKind::from_upgrade_type(&raw.upgrade_type),
            activation: raw.activation,
            expiry: raw.expiry_date,
            operation: raw.operation_type,
            value: raw.value,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct RawTraderItem {
    #[serde(deserialize_with = "lenient::string")]
    item_type: String,
    #[serde(deserialize_with = "lenient::int")]
    prime_price: i64,
    #[serde(deserialize_with = "lenient::int")]
    regular_price: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct RawVoidTrader {
    #[serde(deserialize_with = "date::option")]
    activation: Option<OffsetDateTime>,
    #[serde(deserialize_with = "date::option")]
    expiry: Option<OffsetDateTime>,
    #[serde(deserialize_with = "lenient::string")]
    character: String,
    #[serde(deserialize_with = "lenient::string")]
    node: String,
    #[serde(deserialize_with = "lenient::seq")]
    manifest: Vec<RawTraderItem>,
}

impl From<RawVoidTrader> for VoidTrader {
    fn from(raw: RawVoidTrader) -> Self {
        Self {
            activation: raw.activation,
            expiry: raw.expiry,
            character: raw.character,
            node: raw.node,
            manifest: raw
                .manifest
                .into_iter()
                .map(|i| TraderItem {
                    item_type: i.item_type,
                    prime_price: i.prime_price,
                    regular_price: i.regular_price,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct RawDailyDeal {
    #[serde(deserialize_with = "date::option")]
    activation: Option<OffsetDateTime>,
    #[serde(deserialize_with = "date::option")]
    expiry: Option<OffsetDateTime>,
    #[serde(deserialize_with = "lenient::string")]
    store_item: String,
    #[serde(deserialize_with = "lenient::int")]
    discount: i64,
    #[serde(deserialize_with = "lenient::int")]
    original_price: i64,
    #[serde(deserialize_with = "lenient::int")]
    sale_price: i64,
    #[serde(deserialize_with = "lenient::int")]
    amount_total: i64,
    #[serde(deserialize_with = "lenient::int")]
    amount_sold: i64,
}

impl From<RawDailyDeal> for DailyDeal {
    fn from(raw: RawDailyDeal) -> Self {
        Self {
            activation: raw.activation,
            expiry: raw.expiry,
            item: raw.store_item,
            discount: raw.discount,
            original_price: raw.original_price,
            sale_price: raw.sale_price,
            total_amount: raw.amount_total,
            sold_amount: raw.amount_sold,
        }
    }
}

// ---- invasions ----

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct RawInvasion {
    #[serde(deserialize_with = "date::option")]
    activation: Option<OffsetDateTime>,
    #[serde(deserialize_with = "lenient::string")]
    node: String,
    #[serde(deserialize_with = "lenient::string")]
    loc_tag: String,
    #[serde(deserialize_with = "lenient::string")]
    faction: String,
    #[serde(deserialize_with = "lenient::string")]
    defender_faction: String,
    #[serde(deserialize_with = "lenient::int")]
    count: i64,
    #[serde(deserialize_with = "lenient::int")]
    goal: i64,
    #[serde(deserialize_with = "lenient::boolean")]
    completed: bool,
    #[serde(deserialize_with = "lenient::nested")]
    attacker_reward: Option<RawRewardField>,
    #[serde(deserialize_with = "lenient::nested")]
    defender_reward: Option<RawRewardField>,
}

impl From<RawInvasion> for Invasion {
    fn from(raw: RawInvasion) -> Self {
        Self {
            activation: raw.activation,
            node: raw.node,
            loc_tag: raw.loc_tag,
            attacker_faction: raw.faction,
            defender_faction: raw.defender_faction,
            count: raw.count,
            goal: raw.goal,
            completed: raw.completed,
            attacker_reward: raw
                .attacker_reward
                .map(RawRewardField::into_items)
                .unwrap_or_default(),
            defender_reward: raw
                .defender_reward
                .map(RawRewardField::into_items)
                .unwrap_or_default(),
        }
    }
}

// ---- conclave ----

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawPvpChallenge {
    #[serde(rename = "startDate", deserialize_with = "date::option")]
    start_date: Option<OffsetDateTime>,
    #[serde(rename = "endDate", deserialize_with = "date::option")]
    end_date: Option<OffsetDateTime>,
    #[serde(rename = "Category", deserialize_with = "lenient::string")]
    category: String,
    #[serde(rename = "PVPMode", deserialize_with = "lenient::string")]
    pvp_mode: String,
    #[serde(rename = "challengeTypeRefID", deserialize_with = "lenient::string")]
    challenge_type: String,
    #[serde(rename = "subChallenges", deserialize_with = "lenient::seq")]
    sub_challenges: Vec<Oid>,
}

impl From<RawPvpChallenge> for ConclaveChallenge {
    fn from(raw: RawPvpChallenge) -> Self {
        let pvp_mode = raw
            .pvp_mode
            .strip_prefix("PVPMODE_")
            .unwrap_or(&raw.pvp_mode)
            .to_ascii_uppercase();
        Self {
            activation: raw.start_date,
            expiry: raw.end_date,
            category: raw.category,
            pvp_mode,
            challenge_type: raw.challenge_type,
            sub_challenges: raw.sub_challenges.into_iter().map(|o| o.oid).collect(),
        }
    }
}

// ---- dojos & seasons ----

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct RawGuild {
    #[serde(deserialize_with = "lenient::nested")]
    alliance_id: Option<Oid>,
    #[serde(deserialize_with = "lenient::string")]
    name: String,
    #[serde(deserialize_with = "lenient::int")]
    tier: i64,
    #[serde(deserialize_with = "lenient::boolean")]
    emblem: bool,
    #[serde(deserialize_with = "lenient::int")]
    icon_override: i64,
}

impl From<RawGuild> for FeaturedDojo {
    fn from(raw: RawGuild) -> Self {
        Self {
            alliance_id: raw.alliance_id.map(|o| o.oid).unwrap_or_default(),
            name: raw.name,
            tier: raw.tier,
            has_emblem: raw.emblem,
            icon_override: raw.icon_override,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct RawSeasonChallenge {
    #[serde(deserialize_with = "date::option")]
    activation: Option<OffsetDateTime>,
    #[serde(deserialize_with = "date::option")]
    expiry: Option<OffsetDateTime>,
    #[serde(deserialize_with = "lenient::string")]
    challenge: String,
    #[serde(deserialize_with = "lenient::boolean")]
    daily: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct RawSeasonInfo {
    #[serde(deserialize_with = "date::option")]
    activation: Option<OffsetDateTime>,
    #[serde(deserialize_with = "date::option")]
    expiry: Option<OffsetDateTime>,
    #[serde(deserialize_with = "lenient::string")]
    affiliation_tag: String,
    #[serde(deserialize_with = "lenient::int")]
    season: i64,
    #[serde(deserialize_with = "lenient::int")]
    phase: i64,
    #[serde(deserialize_with = "lenient::string")]
    params: String,
    #[serde(deserialize_with = "lenient::seq")]
    active_challenges: Vec<RawSeasonChallenge>,
}

impl From<RawSeasonInfo> for SeasonInfo {
    fn from(raw: RawSeasonInfo) -> Self {
        Self {
            activation: raw.activation,
            expiry: raw.expiry,
            affiliation_tag: raw.affiliation_tag,
            season: raw.season,
            phase: raw.phase,
            parameters: raw.params,
            active_challenges: raw
                .active_challenges
                .into_iter()
                .map(|c| SeasonChallenge {
                    activation: c.activation,
                    expiry: c.expiry,
                    challenge: c.challenge,
                    daily: c.daily,
                })
                .collect(),
        }
    }
}

// ---- prime resurgence ----

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct RawResurgenceItem {
    #[serde(deserialize_with = "lenient::string")]
    item_type: String,
    #[serde(deserialize_with = "lenient::int")]
    prime_price: i64,
    #[serde(deserialize_with = "lenient::int")]
    regular_price: i64,
}

impl From<RawResurgenceItem> for PrimeResurgenceItem {
    fn from(raw: RawResurgenceItem) -> Self {
        // Evergreen entries are priced in regular currency only.
        let price = if raw.prime_price != 0 {
            raw.prime_price
        } else {
            raw.regular_price
        };
        Self {
            item_type: raw.item_type,
            price,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct RawResurgenceSchedule {
    #[serde(deserialize_with = "date::option")]
    expiry: Option<OffsetDateTime>,
    #[serde(deserialize_with = "lenient::string")]
    featured_item: String,
    #[serde(deserialize_with = "date::option")]
    preview_hidden_until: Option<OffsetDateTime>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct RawPrimeResurgence {
    #[serde(deserialize_with = "date::option")]
    activation: Option<OffsetDateTime>,
    #[serde(deserialize_with = "date::option")]
    expiry: Option<OffsetDateTime>,
    #[serde(deserialize_with = "date::option")]
    initial_start_date: Option<OffsetDateTime>,
    #[serde(deserialize_with = "lenient::string")]
    node: String,
    #[serde(deserialize_with = "lenient::seq")]
    manifest: Vec<RawResurgenceItem>,
    #[serde(deserialize_with = "lenient::seq")]
    evergreen_manifest: Vec<RawResurgenceItem>,
    #[serde(deserialize_with = "lenient::seq")]
    schedule_info: Vec<RawResurgenceSchedule>,
}

impl From<RawPrimeResurgence> for PrimeResurgence {
    fn from(raw: RawPrimeResurgence) -> Self {
        Self {
            activation: raw.activation,
            expiry: raw.expiry,
            initial_start_date: raw.initial_start_date,
            node: raw.node,
            manifest: raw.manifest.into_iter().map(Into::into).collect(),
            evergreen_manifest: raw.evergreen_manifest.into_iter().map(Into::into).collect(),
            schedule: raw
                .schedule_info
                .into_iter()
                .map(|s| ResurgenceSchedule {
                    expiry: s.expiry,
                    featured_item: s.featured_item,
                    preview_hidden_until: s.preview_hidden_until,
                })
                .collect(),
        }
    }
}
