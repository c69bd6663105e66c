//! Turns the three raw offset documents into a complete [`ResolvedOffsets`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::error;

use super::layout::{ClassLayout, FieldLookup};

/// Module whose subsections the documents are keyed by
pub const GAME_MODULE: &str = "client.dll";

/// Bone array offset inside the game scene node. Not published by any dump.
pub const BONE_ARRAY_OFFSET: u64 = 528;

/// Keys read directly from the offsets document
const GLOBAL_KEYS: [&str; 4] = [
    "dwEntityList",
    "dwLocalPlayerPawn",
    "dwLocalPlayerController",
    "dwViewMatrix",
];

/// Output key and the buttons document key it comes from
const BUTTON_KEYS: [(&str, &str); 1] = [("dwForceJump", "jump")];

/// Output key, owning class, field name
const FIELD_KEYS: [(&str, &str, &str); 16] = [
    ("m_iHealth", "C_BaseEntity", "m_iHealth"),
    ("m_iTeamNum", "C_BaseEntity", "m_iTeamNum"),
    ("m_pGameSceneNode", "C_BaseEntity", "m_pGameSceneNode"),
    ("m_vOldOrigin", "C_BasePlayerPawn", "m_vOldOrigin"),
    ("m_vecAbsOrigin", "CGameSceneNode", "m_vecAbsOrigin"),
    ("m_pWeaponServices", "C_BasePlayerPawn", "m_pWeaponServices"),
    ("m_iIDEntIndex", "C_CSPlayerPawn", "m_iIDEntIndex"),
    ("m_flFlashDuration", "C_CSPlayerPawnBase", "m_flFlashDuration"),
    ("m_pClippingWeapon", "C_CSPlayerPawn", "m_pClippingWeapon"),
    ("m_hPlayerPawn", "CCSPlayerController", "m_hPlayerPawn"),
    ("m_iszPlayerName", "CBasePlayerController", "m_iszPlayerName"),
    ("m_hActiveWeapon", "CPlayer_WeaponServices", "m_hActiveWeapon"),
    ("m_bDormant", "CGameSceneNode", "m_bDormant"),
    ("m_AttributeManager", "C_EconEntity", "m_AttributeManager"),
    ("m_Item", "C_AttributeContainer", "m_Item"),
    ("m_iItemDefinitionIndex", "C_EconItemView", "m_iItemDefinitionIndex"),
];

const BONE_ARRAY_KEY: &str = "m_pBoneArray";

/// Every key a resolved map carries, in output order
pub const REQUIRED_KEYS: [&str; 22] = [
    "dwEntityList",
    "dwLocalPlayerPawn",
    "dwLocalPlayerController",
    "dwViewMatrix",
    "dwForceJump",
    "m_iHealth",
    "m_iTeamNum",
    "m_pGameSceneNode",
    "m_vOldOrigin",
    "m_vecAbsOrigin",
    "m_pWeaponServices",
    "m_iIDEntIndex",
    "m_flFlashDuration",
    "m_pClippingWeapon",
    "m_hPlayerPawn",
    "m_iszPlayerName",
    "m_hActiveWeapon",
    "m_bDormant",
    "m_AttributeManager",
    "m_Item",
    "m_iItemDefinitionIndex",
    "m_pBoneArray",
];

/// Why a document triple could not be resolved
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Missing top-level keys {missing:?}")]
pub struct ResolveError {
    pub missing: Vec<&'static str>,
    /// Field lookups that failed, with the class/field they failed on
    pub lookups: Vec<(&'static str, FieldLookup)>,
}

/// Complete, validated offset set. Never exists partially filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedOffsets {
    #[serde(rename = "dwEntityList")]
    pub entity_list: u64,
    #[serde(rename = "dwLocalPlayerPawn")]
    pub local_player_pawn: u64,
    #[serde(rename = "dwLocalPlayerController")]
    pub local_player_controller: u64,
    #[serde(rename = "dwViewMatrix")]
    pub view_matrix: u64,
    #[serde(rename = "dwForceJump")]
    pub force_jump: u64,
    #[serde(rename = "m_iHealth")]
    pub health: u64,
    #[serde(rename = "m_iTeamNum")]
    pub team_num: u64,
    #[serde(rename = "m_pGameSceneNode")]
    pub game_scene_node: u64,
    #[serde(rename = "m_vOldOrigin")]
    pub old_origin: u64,
    #[serde(rename = "m_vecAbsOrigin")]
    pub abs_origin: u64,
    #[serde(rename = "m_pWeaponServices")]
    pub weapon_services: u64,
    #[serde(rename = "m_iIDEntIndex")]
    pub id_ent_index: u64,
    #[serde(rename = "m_flFlashDuration")]
    pub flash_duration: u64,
    #[serde(rename = "m_pClippingWeapon")]
    pub clipping_weapon: u64,
    #[serde(rename = "m_hPlayerPawn")]
    pub player_pawn: u64,
    #[serde(rename = "m_iszPlayerName")]
    pub player_name: u64,
    #[serde(rename = "m_hActiveWeapon")]
    pub active_weapon: u64,
    #[serde(rename = "m_bDormant")]
    pub dormant: u64,
    #[serde(rename = "m_AttributeManager")]
    pub attribute_manager: u64,
    #[serde(rename = "m_Item")]
    pub item: u64,
    #[serde(rename = "m_iItemDefinitionIndex")]
    pub item_definition_index: u64,
    #[serde(rename = "m_pBoneArray")]
    pub bone_array: u64,
}

impl ResolvedOffsets {
    /// Assemble from a flat name map; fails with the absent keys if any
    /// required key is missing.
    pub fn from_values(values: &HashMap<&str, u64>) -> Result<Self, Vec<&'static str>> {
        let mut missing = Vec::new();
        let mut take = |key: &'static str| match values.get(key) {
            Some(value) => *value,
            None => {
                missing.push(key);
                0
            }
        };

        let resolved = Self {
            entity_list: take("dwEntityList"),
            local_player_pawn: take("dwLocalPlayerPawn"),
            local_player_controller: take("dwLocalPlayerController"),
            view_matrix: take("dwViewMatrix"),
            force_jump: take("dwForceJump"),
            health: take("m_iHealth"),
            team_num: take("m_iTeamNum"),
            game_scene_node: take("m_pGameSceneNode"),
            old_origin: take("m_vOldOrigin"),
            abs_origin: take("m_vecAbsOrigin"),
            weapon_services: take("m_pWeaponServices"),
            id_ent_index: take("m_iIDEntIndex"),
            flash_duration: take("m_flFlashDuration"),
            clipping_weapon: take("m_pClippingWeapon"),
            player_pawn: take("m_hPlayerPawn"),
            player_name: take("m_iszPlayerName"),
            active_weapon: take("m_hActiveWeapon"),
            dormant: take("m_bDormant"),
            attribute_manager: take("m_AttributeManager"),
            item: take("m_Item"),
            item_definition_index: take("m_iItemDefinitionIndex"),
            bone_array: take(BONE_ARRAY_KEY),
        };

        if missing.is_empty() {
            Ok(resolved)
        } else {
            Err(missing)
        }
    }

    /// `(name, value)` pairs in [`REQUIRED_KEYS`] order
    pub fn entries(&self) -> [(&'static str, u64); 22] {
        [
            ("dwEntityList", self.entity_list),
            ("dwLocalPlayerPawn", self.local_player_pawn),
            ("dwLocalPlayerController", self.local_player_controller),
            ("dwViewMatrix", self.view_matrix),
            ("dwForceJump", self.force_jump),
            ("m_iHealth", self.health),
            ("m_iTeamNum", self.team_num),
            ("m_pGameSceneNode", self.game_scene_node),
            ("m_vOldOrigin", self.old_origin),
            ("m_vecAbsOrigin", self.abs_origin),
            ("m_pWeaponServices", self.weapon_services),
            ("m_iIDEntIndex", self.id_ent_index),
            ("m_flFlashDuration", self.flash_duration),
            ("m_pClippingWeapon", self.clipping_weapon),
            ("m_hPlayerPawn", self.player_pawn),
            ("m_iszPlayerName", self.player_name),
            ("m_hActiveWeapon", self.active_weapon),
            ("m_bDormant", self.dormant),
            ("m_AttributeManager", self.attribute_manager),
            ("m_Item", self.item),
            ("m_iItemDefinitionIndex", self.item_definition_index),
            ("m_pBoneArray", self.bone_array),
        ]
    }

    pub fn get(&self, key: &str) -> Option<u64> {
        self.entries()
            .into_iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value)
    }
}

fn module_section<'a>(document: &'a Value) -> Option<&'a Value> {
    document.get(GAME_MODULE)
}

/// Class layout from a class dump document (`client.dll.classes`)
pub fn class_layout(client_dll: &Value) -> ClassLayout {
    module_section(client_dll)
        .and_then(|module| module.get("classes"))
        .map(ClassLayout::from_classes)
        .unwrap_or_default()
}

/// Resolve every required key, reporting all misses at once.
pub fn try_extract(
    offsets: &Value,
    client_dll: &Value,
    buttons: &Value,
) -> Result<ResolvedOffsets, ResolveError> {
    let globals = module_section(offsets);
    let button_map = module_section(buttons);
    let layout = class_layout(client_dll);

    let mut values: HashMap<&str, u64> = HashMap::with_capacity(REQUIRED_KEYS.len());
    let mut lookups = Vec::new();

    for key in GLOBAL_KEYS {
        if let Some(value) = globals.and_then(|g| g.get(key)).and_then(Value::as_u64) {
            values.insert(key, value);
        }
    }

    for (key, button) in BUTTON_KEYS {
        if let Some(value) = button_map
            .and_then(|b| b.get(button))
            .and_then(Value::as_u64)
        {
            values.insert(key, value);
        }
    }

    for (key, class, field) in FIELD_KEYS {
        match layout.lookup(class, field) {
            FieldLookup::Found { offset, .. } => {
                values.insert(key, offset);
            }
            miss => lookups.push((key, miss)),
        }
    }

    values.insert(BONE_ARRAY_KEY, BONE_ARRAY_OFFSET);

    ResolvedOffsets::from_values(&values).map_err(|missing| ResolveError { missing, lookups })
}

/// Resolve the documents, logging precisely what is missing on failure.
///
/// Never panics or propagates: an unresolvable triple is `None`.
pub fn extract(offsets: &Value, client_dll: &Value, buttons: &Value) -> Option<ResolvedOffsets> {
    match try_extract(offsets, client_dll, buttons) {
        Ok(resolved) => Some(resolved),
        Err(e) => {
            for (key, lookup) in &e.lookups {
                error!(key = *key, "Offset initialization error: {} ({})", lookup, key);
            }
            error!("Offset initialization error: {}", e);
            None
        }
    }
}
