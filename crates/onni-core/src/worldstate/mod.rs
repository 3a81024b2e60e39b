//! Normalized projection of the upstream world-state feed.
//!
//! The upstream document uses PascalCase keys, Mongo extended JSON for ids and
//! dates, and changes shape between game updates. [`WorldState`] is the stable
//! view handed to clients: snake_case keys, RFC 3339 timestamps, enums where
//! the value set is closed.
//!
//! Parsing is lenient below the top level: missing sections become empty and
//! leaf values of an unexpected type are coerced or defaulted, since upstream
//! renames and retypes fields between game updates. A top-level section of
//! the wrong JSON type, an unreadable timestamp or an unknown relic tier is
//! still an error, so a corrupted document is rejected instead of cached.

mod date;
mod lenient;
mod upstream;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use crate::error::{ParseError, Result};

/// Projects a raw upstream document into a [`WorldState`].
///
/// # Errors
///
/// Returns [`ParseError::NotAnObject`] if `raw` is not a JSON object,
/// [`ParseError::Malformed`] if a section has the wrong shape, and
/// [`ParseError::InvalidRelicTier`] for unknown void fissure tiers.
pub fn parse_worldstate(raw: &Value) -> Result<WorldState> {
    if !raw.is_object() {
        return Err(ParseError::NotAnObject(json_kind(raw)));
    }
    let document = upstream::RawWorldState::deserialize(raw)?;
    document.into_view()
}

/// Returns `true` if `raw` carries a non-null top-level `field`.
pub fn has_marker(raw: &Value, field: &str) -> bool {
    raw.get(field).is_some_and(|v| !v.is_null())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldState {
    pub world_seed: String,
    pub version: Option<i64>,
    pub mobile_version: String,
    pub build_label: String,
    /// Server clock at generation time.
    #[serde(with = "time::serde::rfc3339::option")]
    pub date: Option<OffsetDateTime>,
    pub events: Vec<Event>,
    pub alerts: Vec<Alert>,
    pub sortie: Option<Sortie>,
    pub syndicate_missions: Vec<SyndicateMission>,
    pub void_fissures: Vec<VoidFissure>,
    pub global_boosts: Vec<GlobalBoost>,
    pub void_traders: Vec<VoidTrader>,
    pub daily_deals: Vec<DailyDeal>,
    pub invasions: Vec<Invasion>,
    pub pvp_challenges: Vec<ConclaveChallenge>,
    /// Fomorian / Razorback construction progress, in percent.
    pub construction_progress: Vec<f64>,
    pub featured_dojos: Vec<FeaturedDojo>,
    pub season_info: Option<SeasonInfo>,
    /// Varzia's rotating prime vault.
    pub prime_resurgence: Option<PrimeResurgence>,
    pub prime_token_availability: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub language_code: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub language_code: String,
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub messages: Vec<Message>,
    pub links: Vec<Link>,
    pub prop: String,
    pub icon: String,
    pub image_url: String,
    pub priority: bool,
    pub mobile_only: bool,
    pub community: bool,
    pub hide_end_date_modifier: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub date: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub start_date: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub end_date: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardItem {
    pub item_type: String,
    pub item_count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MissionReward {
    pub credits: i64,
    pub items: Vec<String>,
    pub counted_items: Vec<RewardItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionInfo {
    pub location: String,
    pub mission_type: String,
    pub faction: String,
    pub difficulty: f64,
    pub reward: MissionReward,
    pub level_override: String,
    pub enemy_spec: String,
    pub min_enemy_level: i64,
    pub max_enemy_level: i64,
    pub description: String,
    pub max_wave_num: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(with = "time::serde::rfc3339::option")]
    pub activation: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub expiry: Option<OffsetDateTime>,
    pub mission_info: MissionInfo,
    pub tag: String,
    pub force_unlock: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortieMission {
    pub mission_type: String,
    pub modifier: String,
    pub node: String,
    pub tileset: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sortie {
    #[serde(with = "time::serde::rfc3339::option")]
    pub activation: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub expiry: Option<OffsetDateTime>,
    pub boss: String,
    pub reward: String,
    pub seed: i64,
    pub extra_drops: Vec<String>,
    pub missions: Vec<SortieMission>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenWorldJob {
    pub job_type: String,
    pub rewards: String,
    pub mastery_required: i64,
    pub min_enemy_level: i64,
    pub max_enemy_level: i64,
    pub xp_amounts: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyndicateMission {
    #[serde(with = "time::serde::rfc3339::option")]
    pub activation: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub expiry: Option<OffsetDateTime>,
    pub tag: String,
    pub seed: i64,
    pub nodes: Vec<String>,
    /// Bounty jobs; `None` for syndicates without open-world missions.
    pub jobs: Option<Vec<OpenWorldJob>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelicEra {
    Lith,
    Meso,
    Neo,
    Axi,
    Requiem,
    Omnia,
}

impl RelicEra {
    /// Maps an upstream `VoidT<n>` modifier to its relic era.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidRelicTier`] for anything outside `VoidT1`..`VoidT6`.
    pub fn from_tier(tier: &str) -> Result<Self> {
        match tier {
            "VoidT1" => Ok(Self::Lith),
            "VoidT2" => Ok(Self::Meso),
            "VoidT3" => Ok(Self::Neo),
            "VoidT4" => Ok(Self::Axi),
            "VoidT5" => Ok(Self::Requiem),
            "VoidT6" => Ok(Self::Omnia),
            other => Err(ParseError::invalid_relic_tier(other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoidFissure {
    #[serde(with = "time::serde::rfc3339::option")]
    pub activation: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub expiry: Option<OffsetDateTime>,
    pub node: String,
    pub mission_type: String,
    pub region: i64,
    pub seed: i64,
    pub era: RelicEra,
    /// Steel Path variant.
    pub hard: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoostKind {
    Affinity,
    Credits,
    Resources,
    ResourceChance,
    Other(String),
}

impl BoostKind {
    pub fn from_upgrade_type(upgrade_type: &str) -> Self {
        match upgrade_type {
            "GAMEPLAY_KILL_XP_AMOUNT" => Self::Affinity,
            "GAMEPLAY_MONEY_PICKUP_AMOUNT" | "GAMEPLAY_MONEY_REWARD_AMOUNT" => Self::Credits,
            "GAMEPLAY_PICKUP_AMOUNT" => Self::Resources,
            "GAMEPLAY_PICKUP_RATE" => Self::ResourceChance,
            other => Self::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalBoost {
    pub kind: BoostKind,
    #[serde(with = "time::serde::rfc3339::option")]
    pub activation: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub expiry: Option<OffsetDateTime>,
    pub operation: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraderItem {
    pub item_type: String,
    pub prime_price: i64,
    pub regular_price: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoidTrader {
    #[serde(with = "time::serde::rfc3339::option")]
    pub activation: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub expiry: Option<OffsetDateTime>,
    pub character: String,
    pub node: String,
    pub manifest: Vec<TraderItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyDeal {
    #[serde(with = "time::serde::rfc3339::option")]
    pub activation: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub expiry: Option<OffsetDateTime>,
    pub item: String,
    pub discount: i64,
    pub original_price: i64,
    pub sale_price: i64,
    pub total_amount: i64,
    pub sold_amount: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invasion {
    #[serde(with = "time::serde::rfc3339::option")]
    pub activation: Option<OffsetDateTime>,
    pub node: String,
    pub loc_tag: String,
    pub attacker_faction: String,
    pub defender_faction: String,
    pub count: i64,
    pub goal: i64,
    pub completed: bool,
    pub attacker_reward: Vec<RewardItem>,
    pub defender_reward: Vec<RewardItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConclaveChallenge {
    #[serde(with = "time::serde::rfc3339::option")]
    pub activation: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub expiry: Option<OffsetDateTime>,
    pub category: String,
    /// Upstream `PVPMODE_*` value without its prefix, e.g. `CAPTURETHEFLAG`.
    pub pvp_mode: String,
    pub challenge_type: String,
    pub sub_challenges: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturedDojo {
    pub alliance_id: String,
    pub name: String,
    pub tier: i64,
    pub has_emblem: bool,
    pub icon_override: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonChallenge {
    #[serde(with = "time::serde::rfc3339::option")]
    pub activation: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub expiry: Option<OffsetDateTime>,
    pub challenge: String,
    pub daily: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonInfo {
    #[serde(with = "time::serde::rfc3339::option")]
    pub activation: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub expiry: Option<OffsetDateTime>,
    pub affiliation_tag: String,
    pub season: i64,
    pub phase: i64,
    pub parameters: String,
    pub active_challenges: Vec<SeasonChallenge>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimeResurgenceItem {
    pub item_type: String,
    pub price: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResurgenceSchedule {
    #[serde(with = "time::serde::rfc3339::option")]
    pub expiry: Option<OffsetDateTime>,
    pub featured_item: String,
    #[serde(with = "time::serde::rfc3339::option")]
    pub preview_hidden_until: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimeResurgence {
    #[serde(with = "time::serde::rfc3339::option")]
    pub activation: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub expiry: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub initial_start_date: Option<OffsetDateTime>,
    pub node: String,
    pub manifest: Vec<PrimeResurgenceItem>,
    pub evergreen_manifest: Vec<PrimeResurgenceItem>,
    pub schedule: Vec<ResurgenceSchedule>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_feed() -> Value {
        json!({
            "WorldSeed": "seed-123",
            "Version": 10,
            "MobileVersion": "3.4.1",
            "BuildLabel": "2024.05.01.12.00/",
            "Time": 1714564800,
            "Events": [{
                "Messages": [{"LanguageCode": "en", "Message": "Operation: Test"}],
                "Links": [{"LanguageCode": "en", "Link": "https://example.com"}],
                "Prop": "",
                "ImageUrl": "https://example.com/a.png",
                "Priority": true,
                "MobileOnly": false,
                "Community": true,
                "Date": {"$date": {"$numberLong": "1714564800000"}}
            }],
            "Alerts": [{
                "Activation": {"$date": {"$numberLong": "1714564800000"}},
                "Expiry": {"$date": {"$numberLong": "1714568400000"}},
                "MissionInfo": {
                    "missionType": "MT_SURVIVAL",
                    "faction": "FC_GRINEER",
                    "location": "SolNode1",
                    "difficulty": 0.5,
                    "minEnemyLevel": 10,
                    "maxEnemyLevel": 15,
                    "missionReward": {
                        "credits": 5000,
                        "countedItems": [{"ItemType": "/Lotus/Types/Items/Fieldron", "ItemCount": 2}]
                    }
                },
                "Tag": "LotusGift"
            }],
            "Sorties": [{
                "Boss": "SORTIE_BOSS_HYENA",
                "Reward": "/Lotus/Types/Game/MissionDecks/SortieRewards",
                "Seed": 42,
                "Variants": [
                    {"missionType": "MT_EXTERMINATION", "modifierType": "SORTIE_MODIFIER_FIRE", "node": "SolNode2", "tileset": "GrineerShipyardsTileset"}
                ]
            }],
            "SyndicateMissions": [
                {"Tag": "CetusSyndicate", "Seed": 7, "Nodes": [], "Jobs": [
                    {"jobType": "/Lotus/Types/Gameplay/Eidolon/Jobs/AttritionBountyLib", "rewards": "TableA", "masteryReq": 0, "minEnemyLevel": 5, "maxEnemyLevel": 15, "xpAmounts": [100, 200]}
                ]},
                {"Tag": "ArbitersSyndicate", "Nodes": ["SolNode3"]}
            ],
            "ActiveMissions": [
                {"Region": 3, "Seed": 99, "Node": "SolNode4", "MissionType": "MT_DEFENSE", "Modifier": "VoidT2", "Hard": true}
            ],
            "GlobalUpgrades": [
                {"UpgradeType": "GAMEPLAY_KILL_XP_AMOUNT", "OperationType": "MULTIPLY", "Value": 2}
            ],
            "VoidTraders": [
                {"Character": "Baro'Ki Teel", "Node": "PlutoHUB", "Manifest": [
                    {"ItemType": "/Lotus/StoreItems/Upgrades/Mods/Primed", "PrimePrice": 350, "RegularPrice": 110000}
                ]}
            ],
            "DailyDeals": [
                {"StoreItem": "/Lotus/StoreItems/Weapons/Soma", "Discount": 40, "OriginalPrice": 100, "SalePrice": 60, "AmountTotal": 200, "AmountSold": 12}
            ],
            "Invasions": [
                {"Faction": "FC_GRINEER", "DefenderFaction": "FC_CORPUS", "Node": "SolNode5", "Count": -500, "Goal": 30000, "LocTag": "/Lotus/Language/Menu/InvasionGeneric",
                 "Completed": false, "AttackerReward": [], "DefenderReward": {"countedItems": [{"ItemType": "/Lotus/Types/Items/Detonite", "ItemCount": 3}]}}
            ],
            "PVPChallengeInstances": [
                {"challengeTypeRefID": "/Lotus/PVPChallengeTypes/PVPTimedChallengeKillsA", "PVPMode": "PVPMODE_CAPTURETHEFLAG", "Category": "PVPChallengeTypeCategory_WEEKLY",
                 "subChallenges": [{"$oid": "abc"}, {"$oid": "def"}]}
            ],
            "ProjectPct": [12.5, 40.0, 0.0],
            "FeaturedGuilds": [
                {"AllianceId": {"$oid": "alliance-1"}, "Name": "Dojo", "Tier": 5, "Emblem": true, "IconOverride": 2}
            ],
            "SeasonInfo": {
                "AffiliationTag": "RadioLegion3Syndicate",
                "Season": 13,
                "Phase": 0,
                "Params": "",
                "ActiveChallenges": [{"Challenge": "/Lotus/Types/Challenges/Seasons/Daily/SeasonDailyKillEnemies", "Daily": true}]
            },
            "PrimeResurgence": [{
                "Activation": {"$date": {"$numberLong": "1714564800000"}},
                "Expiry": {"$date": {"$numberLong": "1715169600000"}},
                "InitialStartDate": {"$date": {"$numberLong": "1600000000000"}},
                "Node": "TradeHUB1",
                "Manifest": [{"ItemType": "/Lotus/StoreItems/Types/Game/Projections/T1VoidProjectionVaultA", "PrimePrice": 3}],
                "EvergreenManifest": [{"ItemType": "/Lotus/StoreItems/Types/Items/MiscItems/Forma", "RegularPrice": 20}],
                "ScheduleInfo": [
                    {"Expiry": {"$date": {"$numberLong": "1715169600000"}}, "FeaturedItem": "/Lotus/Types/Game/VaultPacks/NovaPrime", "PreviewHiddenUntil": {"$date": {"$numberLong": "1714564800000"}}}
                ]
            }],
            "PrimeTokenAvailability": true
        })
    }

    #[test]
    fn parses_full_feed() {
        let ws = parse_worldstate(&sample_feed()).unwrap();

        assert_eq!(ws.world_seed, "seed-123");
        assert_eq!(ws.version, Some(10));
        assert_eq!(ws.date.unwrap().unix_timestamp(), 1_714_564_800);
        assert_eq!(ws.events.len(), 1);
        assert_eq!(ws.events[0].messages[0].message, "Operation: Test");
        assert_eq!(ws.alerts[0].mission_info.reward.credits, 5000);
        assert_eq!(ws.alerts[0].mission_info.reward.counted_items[0].item_count, 2);
        assert_eq!(ws.sortie.as_ref().unwrap().missions.len(), 1);
        assert_eq!(ws.syndicate_missions[0].jobs.as_ref().unwrap()[0].xp_amounts, vec![100, 200]);
        assert!(ws.syndicate_missions[1].jobs.is_none());
        assert_eq!(ws.void_fissures[0].era, RelicEra::Meso);
        assert!(ws.void_fissures[0].hard);
        assert_eq!(ws.global_boosts[0].kind, BoostKind::Affinity);
        assert_eq!(ws.void_traders[0].manifest[0].prime_price, 350);
        assert_eq!(ws.daily_deals[0].sale_price, 60);
        assert!(ws.invasions[0].attacker_reward.is_empty());
        assert_eq!(ws.invasions[0].defender_reward[0].item_count, 3);
        assert_eq!(ws.pvp_challenges[0].pvp_mode, "CAPTURETHEFLAG");
        assert_eq!(ws.pvp_challenges[0].sub_challenges, vec!["abc", "def"]);
        assert_eq!(ws.construction_progress, vec![12.5, 40.0, 0.0]);
        assert_eq!(ws.featured_dojos[0].alliance_id, "alliance-1");
        assert_eq!(ws.season_info.as_ref().unwrap().active_challenges.len(), 1);
        assert!(ws.prime_token_availability);
    }

    #[test]
    fn parses_prime_resurgence() {
        let ws = parse_worldstate(&sample_feed()).unwrap();
        let vault = ws.prime_resurgence.unwrap();
        assert_eq!(vault.node, "TradeHUB1");
        assert_eq!(vault.initial_start_date.unwrap().unix_timestamp(), 1_600_000_000);
        assert_eq!(vault.manifest[0].price, 3);
        assert_eq!(vault.evergreen_manifest[0].price, 20);
        assert_eq!(vault.schedule.len(), 1);
        assert_eq!(vault.schedule[0].featured_item, "/Lotus/Types/Game/VaultPacks/NovaPrime");
        assert!(vault.schedule[0].preview_hidden_until.is_some());

        // Current feeds publish the same section under another key, as one object.
        let ws = parse_worldstate(&json!({
            "PrimeVaultTraders": {"Node": "TradeHUB1", "Manifest": [{"ItemType": "x", "PrimePrice": 1}]}
        }))
        .unwrap();
        assert_eq!(ws.prime_resurgence.unwrap().manifest.len(), 1);
    }

    #[test]
    fn tolerates_retyped_leaves() {
        let ws = parse_worldstate(&json!({
            "WorldSeed": "x",
            "Version": "7",
            "Alerts": [{"Tag": null, "MissionInfo": null}],
            "Events": [{"Priority": 1, "Messages": null, "Community": "true"}],
            "Invasions": [{"Count": "12", "AttackerReward": "none", "Completed": 0}],
            "SyndicateMissions": [{"Tag": "CetusSyndicate", "Jobs": null, "Nodes": [null, "SolNode1"]}],
            "FeaturedGuilds": [{"AllianceId": null, "Name": 5}]
        }))
        .unwrap();

        assert_eq!(ws.version, Some(7));
        assert_eq!(ws.alerts[0].tag, "");
        assert_eq!(ws.alerts[0].mission_info.reward.credits, 0);
        assert!(ws.events[0].priority);
        assert!(ws.events[0].community);
        assert!(ws.events[0].messages.is_empty());
        assert_eq!(ws.invasions[0].count, 12);
        assert!(ws.invasions[0].attacker_reward.is_empty());
        assert!(!ws.invasions[0].completed);
        assert!(ws.syndicate_missions[0].jobs.is_none());
        assert_eq!(ws.syndicate_missions[0].nodes, vec!["SolNode1"]);
        assert_eq!(ws.featured_dojos[0].alliance_id, "");
        assert_eq!(ws.featured_dojos[0].name, "5");
    }

    #[test]
    fn null_sections_read_as_empty() {
        let ws = parse_worldstate(&json!({"WorldSeed": "x", "Alerts": null, "SeasonInfo": null})).unwrap();
        assert!(ws.alerts.is_empty());
        assert!(ws.season_info.is_none());
    }

    #[test]
    fn rejects_unreadable_nested_timestamp() {
        let err = parse_worldstate(&json!({
            "Alerts": [{"Activation": {"$date": {"$numberLong": "soon"}}}]
        }))
        .unwrap_err();
        assert!(matches!(err, ParseError::Malformed(_)));
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let ws = parse_worldstate(&json!({"WorldSeed": "x"})).unwrap();
        assert_eq!(ws.world_seed, "x");
        assert!(ws.version.is_none());
        assert!(ws.alerts.is_empty());
        assert!(ws.sortie.is_none());
        assert!(ws.season_info.is_none());
    }

    #[test]
    fn accepts_single_sortie_object() {
        let ws = parse_worldstate(&json!({"Sorties": {"Boss": "SORTIE_BOSS_VOR", "Seed": 1}})).unwrap();
        assert_eq!(ws.sortie.unwrap().boss, "SORTIE_BOSS_VOR");
    }

    #[test]
    fn rejects_non_object_payload() {
        let err = parse_worldstate(&json!("nope")).unwrap_err();
        assert!(matches!(err, ParseError::NotAnObject("string")));
    }

    #[test]
    fn rejects_wrong_section_shape() {
        let err = parse_worldstate(&json!({"ActiveMissions": "oops"})).unwrap_err();
        assert!(matches!(err, ParseError::Malformed(_)));
    }

    #[test]
    fn rejects_unknown_relic_tier() {
        let err = parse_worldstate(&json!({"ActiveMissions": [{"Modifier": "VoidT9"}]})).unwrap_err();
        assert!(matches!(err, ParseError::InvalidRelicTier(ref t) if t == "VoidT9"));
    }

    #[test]
    fn view_round_trips_through_json() {
        let ws = parse_worldstate(&sample_feed()).unwrap();
        let encoded = serde_json::to_value(&ws).unwrap();
        assert_eq!(encoded["void_fissures"][0]["era"], "Meso");
        let decoded: WorldState = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, ws);
    }

    #[test]
    fn marker_detection() {
        assert!(has_marker(&json!({"WorldSeed": "a"}), "WorldSeed"));
        assert!(!has_marker(&json!({"WorldSeed": null}), "WorldSeed"));
        assert!(!has_marker(&json!({"Other": 1}), "WorldSeed"));
        assert!(!has_marker(&json!([1]), "WorldSeed"));
    }
}
